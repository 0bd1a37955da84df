//! Contribution event entity
//!
//! One atomic activity by one author against one issue or pull request.
//! Events are populated once at the data-source boundary; nothing downstream
//! performs defensive multi-field lookups on raw API payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What the event targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetKind {
    Issue,
    PullRequest,
}

/// Review verdict, carried through as metadata and never used for
/// classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReviewState {
    Approved,
    ChangesRequested,
    Commented,
    Dismissed,
    Pending,
}

impl std::fmt::Display for ReviewState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ReviewState::Approved => "APPROVED",
            ReviewState::ChangesRequested => "CHANGES_REQUESTED",
            ReviewState::Commented => "COMMENTED",
            ReviewState::Dismissed => "DISMISSED",
            ReviewState::Pending => "PENDING",
        };
        write!(f, "{}", s)
    }
}

impl std::str::FromStr for ReviewState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "APPROVED" => Ok(ReviewState::Approved),
            "CHANGES_REQUESTED" => Ok(ReviewState::ChangesRequested),
            "COMMENTED" => Ok(ReviewState::Commented),
            "DISMISSED" => Ok(ReviewState::Dismissed),
            "PENDING" => Ok(ReviewState::Pending),
            _ => Err(format!("Unknown review state: {}", s)),
        }
    }
}

/// Kind-specific payload for an event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EventDetail {
    Opened,
    Commented,
    Labeled {
        label: String,
    },
    /// `via_merge` marks a close that happened as a side effect of a merge:
    /// for pull requests, a close on an already-merged PR; for issues, a
    /// close the data source attributed to a linked PR merge.
    Closed {
        closed_by: String,
        via_merge: bool,
    },
    ReviewSubmitted {
        state: ReviewState,
    },
    Merged {
        merged_by: String,
    },
}

/// One atomic activity against one target at one instant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContributionEvent {
    pub target_kind: TargetKind,
    pub target_number: i64,
    pub target_title: String,
    pub target_url: String,
    /// Case-insensitive identity of whoever performed the event
    pub author_login: String,
    /// UTC instant; the API guarantees UTC-normalized timestamps
    pub occurred_at: DateTime<Utc>,
    pub detail: EventDetail,
}

impl ContributionEvent {
    pub fn is_issue(&self) -> bool {
        self.target_kind == TargetKind::Issue
    }

    pub fn is_pull_request(&self) -> bool {
        self.target_kind == TargetKind::PullRequest
    }

    /// Identity key for "same item" checks across events
    pub fn item_key(&self) -> (TargetKind, i64) {
        (self.target_kind, self.target_number)
    }
}
