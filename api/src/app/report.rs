//! Report assembly
//!
//! Builds the meta/summary/data document consumed by the dashboard
//! front-end. Every timestamp in the payload is an ISO-8601 UTC instant
//! with a trailing `Z`; the request timezone decides which events are in
//! range, never how times are rendered. Kind-specific string fields are
//! present-but-empty when they do not apply, so consumers never have to
//! existence-check.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use crate::domain::entities::{
    CategoryBuckets, CategoryCounts, ContributionEvent, DateRange, EventDetail, RepoRef,
    TargetKind, TeamEngagement, TeamRoster,
};

/// ISO-8601 with `Z`, the only timestamp format this API emits
pub fn iso_utc(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[derive(Debug, Clone, Serialize)]
pub struct Period {
    pub days: i64,
    pub start: String,
    pub end: String,
}

impl Period {
    fn from_range(range: &DateRange) -> Self {
        Self {
            days: range.days(),
            start: iso_utc(range.from_instant()),
            end: iso_utc(range.to_instant()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UserMeta {
    pub user: String,
    pub repository: String,
    pub period: Period,
    pub fetched_at: String,
}

#[derive(Debug, Serialize)]
pub struct Summary {
    pub total_actions: usize,
    pub by_category: CategoryCounts,
}

/// Canonical item shape shared by every bucket
#[derive(Debug, Clone, Serialize)]
pub struct ActivityItem {
    pub number: i64,
    pub title: String,
    pub url: String,
    pub timestamp: String,
    pub author: String,
    pub label: String,
    pub state: String,
    pub action: String,
    pub closed_by: String,
    pub merged_by: String,
}

impl ActivityItem {
    fn from_event(event: &ContributionEvent) -> Self {
        let mut item = Self {
            number: event.target_number,
            title: event.target_title.clone(),
            url: event.target_url.clone(),
            timestamp: iso_utc(event.occurred_at),
            author: event.author_login.clone(),
            label: String::new(),
            state: String::new(),
            action: String::new(),
            closed_by: String::new(),
            merged_by: String::new(),
        };
        match &event.detail {
            EventDetail::Opened => item.action = "opened".to_string(),
            EventDetail::Commented => {}
            EventDetail::Labeled { label } => {
                item.action = "labeled".to_string();
                item.label = label.clone();
            }
            EventDetail::Closed {
                closed_by,
                via_merge,
            } => {
                if *via_merge && event.target_kind == TargetKind::PullRequest {
                    item.action = "merged".to_string();
                    item.merged_by = closed_by.clone();
                } else {
                    item.action = "closed".to_string();
                    item.closed_by = closed_by.clone();
                }
            }
            EventDetail::ReviewSubmitted { state } => item.state = state.to_string(),
            EventDetail::Merged { merged_by } => {
                item.action = "merged".to_string();
                item.merged_by = merged_by.clone();
            }
        }
        item
    }

    fn from_events(events: &[ContributionEvent]) -> Vec<Self> {
        events.iter().map(Self::from_event).collect()
    }
}

#[derive(Debug, Serialize)]
pub struct TriageData {
    pub comments: Vec<ActivityItem>,
    pub labeled: Vec<ActivityItem>,
    pub closed: Vec<ActivityItem>,
}

#[derive(Debug, Serialize)]
pub struct ReviewData {
    pub comments: Vec<ActivityItem>,
    pub reviews: Vec<ActivityItem>,
    pub merged: Vec<ActivityItem>,
    pub closed: Vec<ActivityItem>,
}

#[derive(Debug, Serialize)]
pub struct CategoryData {
    pub issues_opened: Vec<ActivityItem>,
    pub prs_opened: Vec<ActivityItem>,
    pub issue_triage: TriageData,
    pub code_reviews: ReviewData,
}

/// The single-subject result document
#[derive(Debug, Serialize)]
pub struct ActivityReport {
    pub meta: UserMeta,
    pub summary: Summary,
    pub data: CategoryData,
}

impl ActivityReport {
    pub fn assemble(
        user: &str,
        repo: &RepoRef,
        range: &DateRange,
        buckets: &CategoryBuckets,
        fetched_at: DateTime<Utc>,
    ) -> Self {
        let counts = buckets.counts();
        Self {
            meta: UserMeta {
                user: user.to_string(),
                repository: repo.full_name(),
                period: Period::from_range(range),
                fetched_at: iso_utc(fetched_at),
            },
            summary: Summary {
                total_actions: counts.total_actions(),
                by_category: counts,
            },
            data: CategoryData {
                issues_opened: ActivityItem::from_events(&buckets.issues_opened),
                prs_opened: ActivityItem::from_events(&buckets.prs_opened),
                issue_triage: TriageData {
                    comments: ActivityItem::from_events(&buckets.triage_comments),
                    labeled: ActivityItem::from_events(&buckets.triage_labeled),
                    closed: ActivityItem::from_events(&buckets.triage_closed),
                },
                code_reviews: ReviewData {
                    comments: ActivityItem::from_events(&buckets.review_comments),
                    reviews: ActivityItem::from_events(&buckets.review_reviews),
                    merged: ActivityItem::from_events(&buckets.review_merged),
                    closed: ActivityItem::from_events(&buckets.review_closed),
                },
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TeamMeta {
    pub team: Vec<String>,
    pub repository: String,
    pub period: Period,
    pub fetched_at: String,
}

/// The team-mode result document
#[derive(Debug, Serialize)]
pub struct TeamReport {
    pub meta: TeamMeta,
    pub engagement: TeamEngagement,
}

impl TeamReport {
    pub fn assemble(
        roster: &TeamRoster,
        repo: &RepoRef,
        range: &DateRange,
        engagement: TeamEngagement,
        fetched_at: DateTime<Utc>,
    ) -> Self {
        Self {
            meta: TeamMeta {
                team: roster.logins().to_vec(),
                repository: repo.full_name(),
                period: Period::from_range(range),
                fetched_at: iso_utc(fetched_at),
            },
            engagement,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{ReviewState, ValidTimezone};

    fn range() -> DateRange {
        DateRange::resolve(
            "2026-02-01",
            "2026-02-07",
            ValidTimezone::UTC,
            "2026-07-30T12:00:00Z".parse().unwrap(),
        )
        .unwrap()
    }

    fn event(kind: TargetKind, number: i64, detail: EventDetail) -> ContributionEvent {
        ContributionEvent {
            target_kind: kind,
            target_number: number,
            target_title: format!("item {}", number),
            target_url: format!("https://github.com/o/r/{}", number),
            author_login: "alice".to_string(),
            occurred_at: "2026-02-03T10:00:00Z".parse().unwrap(),
            detail,
        }
    }

    fn fetched() -> DateTime<Utc> {
        "2026-02-08T00:00:00Z".parse().unwrap()
    }

    #[test]
    fn timestamps_carry_trailing_z() {
        assert_eq!(
            iso_utc("2026-02-03T10:00:00Z".parse().unwrap()),
            "2026-02-03T10:00:00Z"
        );
    }

    #[test]
    fn empty_buckets_serialize_as_empty_arrays_not_missing_keys() {
        let repo = RepoRef::new("o", "r");
        let report =
            ActivityReport::assemble("alice", &repo, &range(), &CategoryBuckets::default(), fetched());
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["summary"]["total_actions"], 0);
        for key in ["issues_opened", "prs_opened"] {
            assert!(json["data"][key].as_array().unwrap().is_empty());
        }
        for key in ["comments", "labeled", "closed"] {
            assert!(json["data"]["issue_triage"][key].as_array().unwrap().is_empty());
        }
        for key in ["comments", "reviews", "merged", "closed"] {
            assert!(json["data"]["code_reviews"][key].as_array().unwrap().is_empty());
        }
    }

    #[test]
    fn meta_reflects_subject_repository_and_period() {
        let repo = RepoRef::new("PowerShell", "PowerShell");
        let report =
            ActivityReport::assemble("alice", &repo, &range(), &CategoryBuckets::default(), fetched());
        assert_eq!(report.meta.user, "alice");
        assert_eq!(report.meta.repository, "PowerShell/PowerShell");
        assert_eq!(report.meta.period.days, 7);
        assert_eq!(report.meta.period.start, "2026-02-01T00:00:00Z");
        assert!(report.meta.period.end.ends_with('Z'));
        assert_eq!(report.meta.fetched_at, "2026-02-08T00:00:00Z");
    }

    #[test]
    fn kind_specific_fields_are_present_but_empty_elsewhere() {
        let buckets = CategoryBuckets::collect(vec![
            event(
                TargetKind::Issue,
                1,
                EventDetail::Labeled { label: "Resolution-Fixed".to_string() },
            ),
            event(
                TargetKind::PullRequest,
                2,
                EventDetail::ReviewSubmitted { state: ReviewState::ChangesRequested },
            ),
        ]);
        let repo = RepoRef::new("o", "r");
        let report = ActivityReport::assemble("alice", &repo, &range(), &buckets, fetched());
        let json = serde_json::to_value(&report).unwrap();

        let labeled = &json["data"]["issue_triage"]["labeled"][0];
        assert_eq!(labeled["label"], "Resolution-Fixed");
        assert_eq!(labeled["action"], "labeled");
        assert_eq!(labeled["state"], "");

        let review = &json["data"]["code_reviews"]["reviews"][0];
        assert_eq!(review["state"], "CHANGES_REQUESTED");
        assert_eq!(review["label"], "");
        assert_eq!(review["merged_by"], "");
    }

    #[test]
    fn merged_close_renders_as_merged_action() {
        let buckets = CategoryBuckets::collect(vec![event(
            TargetKind::PullRequest,
            5,
            EventDetail::Closed { closed_by: "alice".to_string(), via_merge: true },
        )]);
        let repo = RepoRef::new("o", "r");
        let report = ActivityReport::assemble("alice", &repo, &range(), &buckets, fetched());
        let item = &report.data.code_reviews.merged[0];
        assert_eq!(item.action, "merged");
        assert_eq!(item.merged_by, "alice");
        assert_eq!(item.closed_by, "");
    }
}
