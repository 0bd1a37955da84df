//! Test fixtures
//!
//! Factory functions for contribution events with sensible defaults.

use chrono::{DateTime, Utc};

use crate::domain::entities::{ContributionEvent, EventDetail, ReviewState, TargetKind};

pub fn instant(s: &str) -> DateTime<Utc> {
    s.parse().expect("test timestamp")
}

pub fn event(
    kind: TargetKind,
    number: i64,
    author: &str,
    at: &str,
    detail: EventDetail,
) -> ContributionEvent {
    ContributionEvent {
        target_kind: kind,
        target_number: number,
        target_title: format!("item {}", number),
        target_url: format!("https://github.com/o/r/{}", number),
        author_login: author.to_string(),
        occurred_at: instant(at),
        detail,
    }
}

pub fn issue_opened(number: i64, author: &str, at: &str) -> ContributionEvent {
    event(TargetKind::Issue, number, author, at, EventDetail::Opened)
}

pub fn issue_commented(number: i64, author: &str, at: &str) -> ContributionEvent {
    event(TargetKind::Issue, number, author, at, EventDetail::Commented)
}

pub fn issue_labeled(number: i64, author: &str, label: &str, at: &str) -> ContributionEvent {
    event(
        TargetKind::Issue,
        number,
        author,
        at,
        EventDetail::Labeled {
            label: label.to_string(),
        },
    )
}

pub fn issue_closed(number: i64, author: &str, via_merge: bool, at: &str) -> ContributionEvent {
    event(
        TargetKind::Issue,
        number,
        author,
        at,
        EventDetail::Closed {
            closed_by: author.to_string(),
            via_merge,
        },
    )
}

pub fn pr_opened(number: i64, author: &str, at: &str) -> ContributionEvent {
    event(
        TargetKind::PullRequest,
        number,
        author,
        at,
        EventDetail::Opened,
    )
}

pub fn pr_commented(number: i64, author: &str, at: &str) -> ContributionEvent {
    event(
        TargetKind::PullRequest,
        number,
        author,
        at,
        EventDetail::Commented,
    )
}

pub fn pr_review(number: i64, author: &str, state: ReviewState, at: &str) -> ContributionEvent {
    event(
        TargetKind::PullRequest,
        number,
        author,
        at,
        EventDetail::ReviewSubmitted { state },
    )
}

pub fn pr_closed(number: i64, author: &str, via_merge: bool, at: &str) -> ContributionEvent {
    event(
        TargetKind::PullRequest,
        number,
        author,
        at,
        EventDetail::Closed {
            closed_by: author.to_string(),
            via_merge,
        },
    )
}

pub fn pr_merged(number: i64, author: &str, at: &str) -> ContributionEvent {
    event(
        TargetKind::PullRequest,
        number,
        author,
        at,
        EventDetail::Merged {
            merged_by: author.to_string(),
        },
    )
}
