//! GraphQL documents for the GitHub v4 API
//!
//! Each document pages one activity family. The user-scoped queries walk
//! backwards from the newest node so the client can stop paging once a
//! page falls entirely before the query window.

pub const USER_ISSUE_COMMENTS: &str = r#"
query($username: String!, $count: Int = 100, $before: String) {
  user(login: $username) {
    issueComments(last: $count, before: $before) {
      pageInfo {
        hasPreviousPage
        startCursor
      }
      nodes {
        publishedAt
        url
        issue {
          author {
            login
          }
          repository {
            nameWithOwner
          }
          number
          title
        }
        pullRequest {
          merged
        }
      }
    }
  }
}
"#;

pub const USER_PR_REVIEWS: &str = r#"
query($username: String!, $count: Int = 100, $after: String) {
  user(login: $username) {
    contributionsCollection {
      pullRequestReviewContributions(first: $count, after: $after) {
        pageInfo {
          hasPreviousPage
          startCursor
        }
        nodes {
          occurredAt
          pullRequest {
            author {
              login
            }
            number
            title
            merged
          }
          pullRequestReview {
            url
            state
          }
          repository {
            nameWithOwner
          }
        }
      }
    }
  }
}
"#;

pub const REPO_ACTIVITY: &str = r#"
query(
  $owner: String!,
  $repo: String!,
  $since: DateTime!,
  $issuesPageSize: Int = 50,
  $issuesCursor: String,
  $prsPageSize: Int = 50,
  $prsCursor: String,
  $includeIssues: Boolean! = true,
  $includePRs: Boolean! = true
) {
  repository(owner: $owner, name: $repo) {
    issues(
      first: $issuesPageSize,
      after: $issuesCursor,
      orderBy: {field: UPDATED_AT, direction: DESC},
      filterBy: {since: $since}
    ) @include(if: $includeIssues) {
      pageInfo {
        hasNextPage
        endCursor
      }
      nodes {
        number
        title
        url
        createdAt
        updatedAt
        author {
          login
        }
        timelineItems(last: 50, itemTypes: [LABELED_EVENT, CLOSED_EVENT]) {
          nodes {
            __typename
            ... on LabeledEvent {
              createdAt
              actor { login }
              label { name }
            }
            ... on ClosedEvent {
              createdAt
              actor { login }
            }
          }
        }
      }
    }
    pullRequests(
      first: $prsPageSize,
      after: $prsCursor,
      orderBy: {field: UPDATED_AT, direction: DESC},
      states: [OPEN, CLOSED, MERGED]
    ) @include(if: $includePRs) {
      pageInfo {
        hasNextPage
        endCursor
      }
      nodes {
        number
        title
        url
        state
        createdAt
        updatedAt
        author {
          login
        }
        timelineItems(last: 50, itemTypes: [CLOSED_EVENT, MERGED_EVENT]) {
          nodes {
            __typename
            ... on ClosedEvent {
              createdAt
              actor { login }
            }
            ... on MergedEvent {
              createdAt
              actor { login }
            }
          }
        }
      }
    }
  }
}
"#;

pub const TEAM_ISSUE_ACTIVITY: &str = r#"
query(
  $owner: String!,
  $repo: String!,
  $since: DateTime!,
  $cursor: String,
  $pageSize: Int = 100
) {
  repository(owner: $owner, name: $repo) {
    issues(
      first: $pageSize,
      after: $cursor,
      filterBy: {since: $since},
      orderBy: {field: CREATED_AT, direction: DESC}
    ) {
      pageInfo {
        hasNextPage
        endCursor
      }
      nodes {
        number
        title
        url
        createdAt
        author { login }

        comments(first: 100) {
          nodes {
            author { login }
            createdAt
          }
        }

        timelineItems(first: 100, itemTypes: [LABELED_EVENT, CLOSED_EVENT]) {
          nodes {
            __typename
            ... on LabeledEvent {
              createdAt
              actor { login }
              label { name }
            }
            ... on ClosedEvent {
              createdAt
              actor { login }
            }
          }
        }
      }
    }
  }
}
"#;

pub const TEAM_PR_ACTIVITY: &str = r#"
query(
  $owner: String!,
  $repo: String!,
  $cursor: String,
  $pageSize: Int = 100
) {
  repository(owner: $owner, name: $repo) {
    pullRequests(
      first: $pageSize,
      after: $cursor,
      orderBy: {field: CREATED_AT, direction: DESC}
    ) {
      pageInfo {
        hasNextPage
        endCursor
      }
      nodes {
        number
        title
        url
        state
        createdAt
        author { login }

        comments(first: 100) {
          nodes {
            author { login }
            createdAt
          }
        }

        reviews(first: 100) {
          nodes {
            author { login }
            createdAt
            state
            url
          }
        }

        timelineItems(first: 50, itemTypes: [MERGED_EVENT, CLOSED_EVENT]) {
          nodes {
            __typename
            ... on MergedEvent {
              createdAt
              actor { login }
            }
            ... on ClosedEvent {
              createdAt
              actor { login }
            }
          }
        }
      }
    }
  }
}
"#;
