//! GitHub GraphQL client implementation
//!
//! The only module that sees raw API payloads. Everything it returns is a
//! fully-populated [`ContributionEvent`]; the filtering rules that shape
//! the dashboard's numbers (own-PR exclusion, triage-label allowlist,
//! merge-triggered close marking) live here, at the boundary.

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};

use super::queries;
use crate::domain::entities::{
    ContributionEvent, DateRange, EventDetail, RepoRef, ReviewState, TargetKind,
};
use crate::domain::ports::ActivitySource;
use crate::error::GithubError;

const DEFAULT_ENDPOINT: &str = "https://api.github.com/graphql";

/// An issue close this soon after one of the merges in scope is treated as
/// triggered by that merge. The GraphQL timeline does not link a
/// ClosedEvent to the merge that caused it, so proximity is the only
/// observable signal.
const MERGE_CLOSE_WINDOW_SECS: i64 = 3;

/// Labels that count as triage work when applied
const TRIAGE_LABEL_PREFIXES: [&str; 2] = ["Resolution-", "WG-"];

pub struct GithubGraphql {
    http: Client,
    endpoint: String,
    token: String,
}

impl GithubGraphql {
    pub fn new(token: String) -> Self {
        Self::with_endpoint(DEFAULT_ENDPOINT.to_string(), token)
    }

    pub fn with_endpoint(endpoint: String, token: String) -> Self {
        Self {
            http: Client::new(),
            endpoint,
            token,
        }
    }

    async fn graphql(&self, query: &'static str, variables: Value) -> Result<Value, GithubError> {
        if self.token.is_empty() {
            return Err(GithubError::Unauthorized);
        }

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.token)
            .json(&json!({ "query": query, "variables": variables }))
            .send()
            .await?;

        let status = response.status();
        match status.as_u16() {
            401 => return Err(GithubError::Unauthorized),
            403 | 429 => return Err(GithubError::RateLimited),
            s if !status.is_success() => {
                let message = response.text().await.unwrap_or_default();
                return Err(GithubError::Api { status: s, message });
            }
            _ => {}
        }

        let mut payload: Value = response.json().await?;
        if let Some(errors) = payload.get("errors").and_then(Value::as_array) {
            if let Some(first) = errors.first() {
                let kind = first.get("type").and_then(Value::as_str).unwrap_or_default();
                if kind == "RATE_LIMITED" {
                    return Err(GithubError::RateLimited);
                }
                let message = first
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or("GraphQL query failed")
                    .to_string();
                return Err(GithubError::Api {
                    status: status.as_u16(),
                    message,
                });
            }
        }

        Ok(payload.get_mut("data").map(Value::take).unwrap_or(Value::Null))
    }

    fn parse<T>(value: Value) -> Result<T, GithubError>
    where
        T: for<'de> Deserialize<'de>,
    {
        serde_json::from_value(value).map_err(|e| GithubError::Deserialization(e.to_string()))
    }
}

fn take(value: &mut Value, pointer: &str) -> Value {
    value.pointer_mut(pointer).map(Value::take).unwrap_or(Value::Null)
}

fn iso(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn lower(actor: &Option<Actor>) -> Option<String> {
    actor.as_ref().map(|a| a.login.to_lowercase())
}

fn is_triage_label(name: &str) -> bool {
    TRIAGE_LABEL_PREFIXES.iter().any(|p| name.starts_with(p))
}

/// Close-origin predicate: within the window after any merge instant.
fn is_merge_triggered(closed_at: DateTime<Utc>, merges: &[DateTime<Utc>]) -> bool {
    merges.iter().any(|merge| {
        let diff = (closed_at - *merge).num_seconds();
        (0..=MERGE_CLOSE_WINDOW_SECS).contains(&diff)
    })
}

// ============================================================================
// Raw GraphQL shapes
// ============================================================================

#[derive(Debug, Deserialize)]
struct Actor {
    login: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct PageInfo {
    has_next_page: bool,
    has_previous_page: bool,
    end_cursor: Option<String>,
    start_cursor: Option<String>,
}

/// Connection wrapper; GitHub may null out individual nodes
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Connection<T> {
    #[serde(default)]
    page_info: PageInfo,
    #[serde(default = "Vec::new")]
    nodes: Vec<Option<T>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RepoName {
    name_with_owner: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommentNode {
    published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    url: String,
    issue: Option<CommentIssue>,
    pull_request: Option<CommentPullRequest>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommentIssue {
    author: Option<Actor>,
    repository: Option<RepoName>,
    number: i64,
    #[serde(default)]
    title: String,
}

#[derive(Debug, Deserialize)]
struct CommentPullRequest {
    #[serde(default)]
    #[allow(dead_code)]
    merged: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReviewContribution {
    occurred_at: DateTime<Utc>,
    pull_request: Option<ReviewPullRequest>,
    pull_request_review: Option<ReviewInfo>,
    repository: Option<RepoName>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReviewPullRequest {
    author: Option<Actor>,
    number: i64,
    #[serde(default)]
    title: String,
}

#[derive(Debug, Deserialize)]
struct ReviewInfo {
    url: Option<String>,
    state: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LabelName {
    name: String,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "__typename")]
enum TimelineEvent {
    #[serde(rename_all = "camelCase")]
    LabeledEvent {
        created_at: Option<DateTime<Utc>>,
        actor: Option<Actor>,
        label: Option<LabelName>,
    },
    #[serde(rename_all = "camelCase")]
    ClosedEvent {
        created_at: Option<DateTime<Utc>>,
        actor: Option<Actor>,
    },
    #[serde(rename_all = "camelCase")]
    MergedEvent {
        created_at: Option<DateTime<Utc>>,
        actor: Option<Actor>,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IssueNode {
    number: i64,
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    author: Option<Actor>,
    timeline_items: Option<Connection<TimelineEvent>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PullRequestNode {
    number: i64,
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    state: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    author: Option<Actor>,
    timeline_items: Option<Connection<TimelineEvent>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TeamComment {
    author: Option<Actor>,
    created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TeamReview {
    author: Option<Actor>,
    created_at: Option<DateTime<Utc>>,
    state: Option<String>,
    #[serde(default)]
    #[allow(dead_code)]
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TeamIssueNode {
    number: i64,
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    created_at: DateTime<Utc>,
    author: Option<Actor>,
    comments: Option<Connection<TeamComment>>,
    timeline_items: Option<Connection<TimelineEvent>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TeamPullRequestNode {
    number: i64,
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    state: String,
    created_at: DateTime<Utc>,
    author: Option<Actor>,
    comments: Option<Connection<TeamComment>>,
    reviews: Option<Connection<TeamReview>>,
    timeline_items: Option<Connection<TimelineEvent>>,
}

fn timeline(conn: Option<Connection<TimelineEvent>>) -> Vec<TimelineEvent> {
    conn.map(|c| c.nodes.into_iter().flatten().collect())
        .unwrap_or_default()
}

// ============================================================================
// Fetching
// ============================================================================

impl GithubGraphql {
    /// Comments the subject left on issues and PRs of the repository,
    /// paged backwards from the newest until the window is exhausted.
    async fn user_issue_comments(
        &self,
        repo: &RepoRef,
        login: &str,
        range: &DateRange,
    ) -> Result<Vec<ContributionEvent>, GithubError> {
        let repo_full = repo.full_name();
        let actor = login.to_lowercase();
        let mut events = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let mut data = self
                .graphql(
                    queries::USER_ISSUE_COMMENTS,
                    json!({ "username": login, "count": 100, "before": cursor }),
                )
                .await?;
            if data.pointer("/user").map_or(true, Value::is_null) {
                return Err(GithubError::UserNotFound(login.to_string()));
            }
            let conn_value = take(&mut data, "/user/issueComments");
            if conn_value.is_null() {
                break;
            }
            let conn: Connection<CommentNode> = Self::parse(conn_value)?;

            let mut past_window = false;
            for node in conn.nodes.into_iter().flatten() {
                let Some(published) = node.published_at else {
                    past_window = true;
                    continue;
                };
                let Some(issue) = node.issue else { continue };
                let in_repo = issue
                    .repository
                    .as_ref()
                    .map(|r| r.name_with_owner == repo_full)
                    .unwrap_or(false);
                if !in_repo {
                    continue;
                }
                if published < range.from_instant() {
                    past_window = true;
                    continue;
                }
                if published > range.to_instant() {
                    continue;
                }

                let is_pr = node.pull_request.is_some();
                // Comments on the subject's own PRs are not review work.
                if is_pr && lower(&issue.author).as_deref() == Some(actor.as_str()) {
                    continue;
                }

                events.push(ContributionEvent {
                    target_kind: if is_pr {
                        TargetKind::PullRequest
                    } else {
                        TargetKind::Issue
                    },
                    target_number: issue.number,
                    target_title: issue.title,
                    target_url: node.url,
                    author_login: login.to_string(),
                    occurred_at: published,
                    detail: EventDetail::Commented,
                });
            }

            if past_window || !conn.page_info.has_previous_page {
                break;
            }
            cursor = conn.page_info.start_cursor;
            if cursor.is_none() {
                break;
            }
        }
        Ok(events)
    }

    /// Reviews the subject submitted on PRs of the repository.
    async fn user_pr_reviews(
        &self,
        repo: &RepoRef,
        login: &str,
        range: &DateRange,
    ) -> Result<Vec<ContributionEvent>, GithubError> {
        let repo_full = repo.full_name();
        let actor = login.to_lowercase();
        let mut events = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let mut data = self
                .graphql(
                    queries::USER_PR_REVIEWS,
                    json!({ "username": login, "count": 100, "after": cursor }),
                )
                .await?;
            if data.pointer("/user").map_or(true, Value::is_null) {
                return Err(GithubError::UserNotFound(login.to_string()));
            }
            let conn_value = take(
                &mut data,
                "/user/contributionsCollection/pullRequestReviewContributions",
            );
            if conn_value.is_null() {
                break;
            }
            let conn: Connection<ReviewContribution> = Self::parse(conn_value)?;

            let mut past_window = false;
            for node in conn.nodes.into_iter().flatten() {
                let in_repo = node
                    .repository
                    .as_ref()
                    .map(|r| r.name_with_owner == repo_full)
                    .unwrap_or(false);
                if !in_repo {
                    continue;
                }
                if node.occurred_at < range.from_instant() {
                    past_window = true;
                    continue;
                }
                if node.occurred_at > range.to_instant() {
                    continue;
                }
                let Some(pr) = node.pull_request else { continue };
                // Reviews on the subject's own PRs do not count.
                if lower(&pr.author).as_deref() == Some(actor.as_str()) {
                    continue;
                }

                let review = node.pull_request_review;
                let state = review
                    .as_ref()
                    .and_then(|r| r.state.as_deref())
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(ReviewState::Pending);
                events.push(ContributionEvent {
                    target_kind: TargetKind::PullRequest,
                    target_number: pr.number,
                    target_title: pr.title,
                    target_url: review.and_then(|r| r.url).unwrap_or_default(),
                    author_login: login.to_string(),
                    occurred_at: node.occurred_at,
                    detail: EventDetail::ReviewSubmitted { state },
                });
            }

            if past_window || !conn.page_info.has_previous_page {
                break;
            }
            cursor = conn.page_info.start_cursor;
            if cursor.is_none() {
                break;
            }
        }
        Ok(events)
    }

    /// Issues updated since the window start, newest-updated first.
    async fn recent_issues(
        &self,
        repo: &RepoRef,
        since: DateTime<Utc>,
    ) -> Result<Vec<IssueNode>, GithubError> {
        let mut results = Vec::new();
        let mut cursor: Option<String> = None;
        loop {
            let mut data = self
                .graphql(
                    queries::REPO_ACTIVITY,
                    json!({
                        "owner": repo.owner,
                        "repo": repo.repo,
                        "since": iso(since),
                        "issuesPageSize": 50,
                        "issuesCursor": cursor,
                        "includeIssues": true,
                        "includePRs": false,
                    }),
                )
                .await?;
            if data.pointer("/repository").map_or(true, Value::is_null) {
                return Err(GithubError::RepoNotFound {
                    owner: repo.owner.clone(),
                    repo: repo.repo.clone(),
                });
            }
            let conn_value = take(&mut data, "/repository/issues");
            if conn_value.is_null() {
                break;
            }
            let conn: Connection<IssueNode> = Self::parse(conn_value)?;
            for issue in conn.nodes.into_iter().flatten() {
                if issue.updated_at < since {
                    return Ok(results);
                }
                results.push(issue);
            }
            if !conn.page_info.has_next_page {
                break;
            }
            cursor = conn.page_info.end_cursor;
        }
        Ok(results)
    }

    /// PRs updated since the window start, newest-updated first.
    async fn recent_prs(
        &self,
        repo: &RepoRef,
        since: DateTime<Utc>,
    ) -> Result<Vec<PullRequestNode>, GithubError> {
        let mut results = Vec::new();
        let mut cursor: Option<String> = None;
        loop {
            let mut data = self
                .graphql(
                    queries::REPO_ACTIVITY,
                    json!({
                        "owner": repo.owner,
                        "repo": repo.repo,
                        "since": iso(since),
                        "prsPageSize": 50,
                        "prsCursor": cursor,
                        "includeIssues": false,
                        "includePRs": true,
                    }),
                )
                .await?;
            if data.pointer("/repository").map_or(true, Value::is_null) {
                return Err(GithubError::RepoNotFound {
                    owner: repo.owner.clone(),
                    repo: repo.repo.clone(),
                });
            }
            let conn_value = take(&mut data, "/repository/pullRequests");
            if conn_value.is_null() {
                break;
            }
            let conn: Connection<PullRequestNode> = Self::parse(conn_value)?;
            for pr in conn.nodes.into_iter().flatten() {
                if pr.updated_at < since {
                    return Ok(results);
                }
                results.push(pr);
            }
            if !conn.page_info.has_next_page {
                break;
            }
            cursor = conn.page_info.end_cursor;
        }
        Ok(results)
    }

    async fn team_issues(
        &self,
        repo: &RepoRef,
        range: &DateRange,
    ) -> Result<Vec<TeamIssueNode>, GithubError> {
        let mut results = Vec::new();
        let mut cursor: Option<String> = None;
        loop {
            let mut data = self
                .graphql(
                    queries::TEAM_ISSUE_ACTIVITY,
                    json!({
                        "owner": repo.owner,
                        "repo": repo.repo,
                        "since": iso(range.from_instant()),
                        "cursor": cursor,
                        "pageSize": 100,
                    }),
                )
                .await?;
            if data.pointer("/repository").map_or(true, Value::is_null) {
                return Err(GithubError::RepoNotFound {
                    owner: repo.owner.clone(),
                    repo: repo.repo.clone(),
                });
            }
            let conn_value = take(&mut data, "/repository/issues");
            if conn_value.is_null() {
                break;
            }
            let conn: Connection<TeamIssueNode> = Self::parse(conn_value)?;
            for issue in conn.nodes.into_iter().flatten() {
                results.push(issue);
            }
            if !conn.page_info.has_next_page {
                break;
            }
            cursor = conn.page_info.end_cursor;
        }
        Ok(results)
    }

    async fn team_prs(
        &self,
        repo: &RepoRef,
        range: &DateRange,
    ) -> Result<Vec<TeamPullRequestNode>, GithubError> {
        let mut results = Vec::new();
        let mut cursor: Option<String> = None;
        loop {
            let mut data = self
                .graphql(
                    queries::TEAM_PR_ACTIVITY,
                    json!({
                        "owner": repo.owner,
                        "repo": repo.repo,
                        "cursor": cursor,
                        "pageSize": 100,
                    }),
                )
                .await?;
            if data.pointer("/repository").map_or(true, Value::is_null) {
                return Err(GithubError::RepoNotFound {
                    owner: repo.owner.clone(),
                    repo: repo.repo.clone(),
                });
            }
            let conn_value = take(&mut data, "/repository/pullRequests");
            if conn_value.is_null() {
                break;
            }
            let conn: Connection<TeamPullRequestNode> = Self::parse(conn_value)?;
            let mut past_window = false;
            for pr in conn.nodes.into_iter().flatten() {
                // Created-descending order: once a PR predates the window,
                // the rest do too.
                if pr.created_at < range.from_instant() {
                    past_window = true;
                    break;
                }
                results.push(pr);
            }
            if past_window || !conn.page_info.has_next_page {
                break;
            }
            cursor = conn.page_info.end_cursor;
        }
        Ok(results)
    }
}

// ============================================================================
// Event extraction
// ============================================================================

impl GithubGraphql {
    fn user_issue_events(
        issues: Vec<IssueNode>,
        actor: &str,
        range: &DateRange,
        events: &mut Vec<ContributionEvent>,
        closes: &mut Vec<ContributionEvent>,
    ) {
        for issue in issues {
            if lower(&issue.author).as_deref() == Some(actor)
                && range.contains(issue.created_at)
            {
                events.push(ContributionEvent {
                    target_kind: TargetKind::Issue,
                    target_number: issue.number,
                    target_title: issue.title.clone(),
                    target_url: issue.url.clone(),
                    author_login: actor.to_string(),
                    occurred_at: issue.created_at,
                    detail: EventDetail::Opened,
                });
            }

            let mut labeled_found = false;
            let mut closed_found = false;
            for item in timeline(issue.timeline_items) {
                match item {
                    TimelineEvent::LabeledEvent {
                        created_at: Some(at),
                        actor: Some(by),
                        label: Some(label),
                    } if !labeled_found
                        && is_triage_label(&label.name)
                        && by.login.to_lowercase() == actor
                        && range.contains(at) =>
                    {
                        events.push(ContributionEvent {
                            target_kind: TargetKind::Issue,
                            target_number: issue.number,
                            target_title: issue.title.clone(),
                            target_url: issue.url.clone(),
                            author_login: actor.to_string(),
                            occurred_at: at,
                            detail: EventDetail::Labeled { label: label.name },
                        });
                        labeled_found = true;
                    }
                    TimelineEvent::ClosedEvent {
                        created_at: Some(at),
                        actor: Some(by),
                    } if !closed_found
                        && by.login.to_lowercase() == actor
                        && range.contains(at) =>
                    {
                        closes.push(ContributionEvent {
                            target_kind: TargetKind::Issue,
                            target_number: issue.number,
                            target_title: issue.title.clone(),
                            target_url: issue.url.clone(),
                            author_login: actor.to_string(),
                            occurred_at: at,
                            detail: EventDetail::Closed {
                                closed_by: by.login,
                                via_merge: false,
                            },
                        });
                        closed_found = true;
                    }
                    _ => {}
                }
                if labeled_found && closed_found {
                    break;
                }
            }
        }
    }

    fn user_pr_events(
        prs: Vec<PullRequestNode>,
        actor: &str,
        range: &DateRange,
        events: &mut Vec<ContributionEvent>,
        merge_instants: &mut Vec<DateTime<Utc>>,
    ) {
        for pr in prs {
            if lower(&pr.author).as_deref() == Some(actor) && range.contains(pr.created_at) {
                events.push(ContributionEvent {
                    target_kind: TargetKind::PullRequest,
                    target_number: pr.number,
                    target_title: pr.title.clone(),
                    target_url: pr.url.clone(),
                    author_login: actor.to_string(),
                    occurred_at: pr.created_at,
                    detail: EventDetail::Opened,
                });
            }

            let merged_pr = pr.state == "MERGED";
            for item in timeline(pr.timeline_items) {
                let (at, by, merged_event) = match item {
                    TimelineEvent::ClosedEvent {
                        created_at: Some(at),
                        actor: Some(by),
                    } => (at, by, false),
                    TimelineEvent::MergedEvent {
                        created_at: Some(at),
                        actor: Some(by),
                    } => (at, by, true),
                    _ => continue,
                };
                if by.login.to_lowercase() != actor || !range.contains(at) {
                    continue;
                }

                let detail = if merged_event {
                    merge_instants.push(at);
                    EventDetail::Merged { merged_by: by.login }
                } else {
                    if merged_pr {
                        merge_instants.push(at);
                    }
                    EventDetail::Closed {
                        closed_by: by.login,
                        via_merge: merged_pr,
                    }
                };
                events.push(ContributionEvent {
                    target_kind: TargetKind::PullRequest,
                    target_number: pr.number,
                    target_title: pr.title.clone(),
                    target_url: pr.url.clone(),
                    author_login: actor.to_string(),
                    occurred_at: at,
                    detail,
                });
                break;
            }
        }
    }

    fn team_issue_events(
        issues: Vec<TeamIssueNode>,
        range: &DateRange,
        merge_instants: &[DateTime<Utc>],
        events: &mut Vec<ContributionEvent>,
    ) {
        for issue in issues {
            if !range.contains(issue.created_at) {
                continue;
            }
            let opener = issue
                .author
                .as_ref()
                .map(|a| a.login.clone())
                .unwrap_or_default();
            events.push(ContributionEvent {
                target_kind: TargetKind::Issue,
                target_number: issue.number,
                target_title: issue.title.clone(),
                target_url: issue.url.clone(),
                author_login: opener,
                occurred_at: issue.created_at,
                detail: EventDetail::Opened,
            });

            for comment in issue
                .comments
                .into_iter()
                .flat_map(|c| c.nodes)
                .flatten()
            {
                let (Some(at), Some(by)) = (comment.created_at, comment.author) else {
                    continue;
                };
                if !range.contains(at) {
                    continue;
                }
                events.push(ContributionEvent {
                    target_kind: TargetKind::Issue,
                    target_number: issue.number,
                    target_title: issue.title.clone(),
                    target_url: issue.url.clone(),
                    author_login: by.login,
                    occurred_at: at,
                    detail: EventDetail::Commented,
                });
            }

            for item in timeline(issue.timeline_items) {
                match item {
                    TimelineEvent::LabeledEvent {
                        created_at: Some(at),
                        actor: Some(by),
                        label: Some(label),
                    } if is_triage_label(&label.name) && range.contains(at) => {
                        events.push(ContributionEvent {
                            target_kind: TargetKind::Issue,
                            target_number: issue.number,
                            target_title: issue.title.clone(),
                            target_url: issue.url.clone(),
                            author_login: by.login,
                            occurred_at: at,
                            detail: EventDetail::Labeled { label: label.name },
                        });
                    }
                    TimelineEvent::ClosedEvent {
                        created_at: Some(at),
                        actor: Some(by),
                    } if range.contains(at) => {
                        events.push(ContributionEvent {
                            target_kind: TargetKind::Issue,
                            target_number: issue.number,
                            target_title: issue.title.clone(),
                            target_url: issue.url.clone(),
                            author_login: by.login.clone(),
                            occurred_at: at,
                            detail: EventDetail::Closed {
                                closed_by: by.login,
                                via_merge: is_merge_triggered(at, merge_instants),
                            },
                        });
                    }
                    _ => {}
                }
            }
        }
    }

    fn team_pr_events(
        prs: Vec<TeamPullRequestNode>,
        range: &DateRange,
        events: &mut Vec<ContributionEvent>,
    ) {
        for pr in prs {
            if !range.contains(pr.created_at) {
                continue;
            }
            let opener = pr
                .author
                .as_ref()
                .map(|a| a.login.clone())
                .unwrap_or_default();
            events.push(ContributionEvent {
                target_kind: TargetKind::PullRequest,
                target_number: pr.number,
                target_title: pr.title.clone(),
                target_url: pr.url.clone(),
                author_login: opener,
                occurred_at: pr.created_at,
                detail: EventDetail::Opened,
            });

            for comment in pr.comments.into_iter().flat_map(|c| c.nodes).flatten() {
                let (Some(at), Some(by)) = (comment.created_at, comment.author) else {
                    continue;
                };
                if !range.contains(at) {
                    continue;
                }
                events.push(ContributionEvent {
                    target_kind: TargetKind::PullRequest,
                    target_number: pr.number,
                    target_title: pr.title.clone(),
                    target_url: pr.url.clone(),
                    author_login: by.login,
                    occurred_at: at,
                    detail: EventDetail::Commented,
                });
            }

            for review in pr.reviews.into_iter().flat_map(|r| r.nodes).flatten() {
                let (Some(at), Some(by)) = (review.created_at, review.author) else {
                    continue;
                };
                if !range.contains(at) {
                    continue;
                }
                let state = review
                    .state
                    .as_deref()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(ReviewState::Pending);
                events.push(ContributionEvent {
                    target_kind: TargetKind::PullRequest,
                    target_number: pr.number,
                    target_title: pr.title.clone(),
                    target_url: pr.url.clone(),
                    author_login: by.login,
                    occurred_at: at,
                    detail: EventDetail::ReviewSubmitted { state },
                });
            }

            let merged_pr = pr.state == "MERGED";
            for item in timeline(pr.timeline_items) {
                match item {
                    TimelineEvent::MergedEvent {
                        created_at: Some(at),
                        actor: Some(by),
                    } if range.contains(at) => {
                        events.push(ContributionEvent {
                            target_kind: TargetKind::PullRequest,
                            target_number: pr.number,
                            target_title: pr.title.clone(),
                            target_url: pr.url.clone(),
                            author_login: by.login.clone(),
                            occurred_at: at,
                            detail: EventDetail::Merged { merged_by: by.login },
                        });
                    }
                    TimelineEvent::ClosedEvent {
                        created_at: Some(at),
                        actor: Some(by),
                    } if range.contains(at) => {
                        events.push(ContributionEvent {
                            target_kind: TargetKind::PullRequest,
                            target_number: pr.number,
                            target_title: pr.title.clone(),
                            target_url: pr.url.clone(),
                            author_login: by.login.clone(),
                            occurred_at: at,
                            detail: EventDetail::Closed {
                                closed_by: by.login,
                                via_merge: merged_pr,
                            },
                        });
                    }
                    _ => {}
                }
            }
        }
    }

    /// Merge instants across a PR sweep, for the issue close-origin check.
    fn collect_merge_instants(prs: &[TeamPullRequestNode], range: &DateRange) -> Vec<DateTime<Utc>> {
        let mut instants = Vec::new();
        for pr in prs {
            if let Some(conn) = &pr.timeline_items {
                for item in conn.nodes.iter().flatten() {
                    if let TimelineEvent::MergedEvent {
                        created_at: Some(at),
                        ..
                    } = item
                    {
                        if range.contains(*at) {
                            instants.push(*at);
                        }
                    }
                }
            }
        }
        instants
    }
}

#[async_trait]
impl ActivitySource for GithubGraphql {
    async fn user_contributions(
        &self,
        repo: &RepoRef,
        login: &str,
        range: &DateRange,
    ) -> Result<Vec<ContributionEvent>, GithubError> {
        let actor = login.to_lowercase();
        let since = range.from_instant();

        let (comments, reviews, issues, prs) = tokio::try_join!(
            self.user_issue_comments(repo, login, range),
            self.user_pr_reviews(repo, login, range),
            self.recent_issues(repo, since),
            self.recent_prs(repo, since),
        )?;

        let mut events = comments;
        events.extend(reviews);

        let mut issue_closes = Vec::new();
        Self::user_issue_events(issues, &actor, range, &mut events, &mut issue_closes);

        let mut merge_instants = Vec::new();
        Self::user_pr_events(prs, &actor, range, &mut events, &mut merge_instants);

        // Issue closes that ride along on one of the subject's merges are
        // not triage work in the per-user view.
        events.extend(
            issue_closes
                .into_iter()
                .filter(|close| !is_merge_triggered(close.occurred_at, &merge_instants)),
        );

        Ok(events)
    }

    async fn repo_activity(
        &self,
        repo: &RepoRef,
        range: &DateRange,
    ) -> Result<Vec<ContributionEvent>, GithubError> {
        let (issues, prs) = tokio::try_join!(
            self.team_issues(repo, range),
            self.team_prs(repo, range),
        )?;

        let merge_instants = Self::collect_merge_instants(&prs, range);

        let mut events = Vec::new();
        Self::team_issue_events(issues, range, &merge_instants, &mut events);
        Self::team_pr_events(prs, range, &mut events);
        Ok(events)
    }
}
