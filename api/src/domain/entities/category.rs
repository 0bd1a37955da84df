//! Contribution categories
//!
//! The classification table maps every event to at most one category.
//! Combinations outside the table (a review on an issue, a label on a PR)
//! are upstream noise and are dropped silently; that drop is load-bearing
//! and covered by tests, not an accidental gap.

use serde::Serialize;

use super::event::{ContributionEvent, EventDetail, TargetKind};

/// Sub-buckets of issue triage work
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TriageKind {
    Comments,
    Labeled,
    Closed,
}

/// Sub-buckets of code review work
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewKind {
    Comments,
    Reviews,
    Merged,
    Closed,
}

/// Canonical category taxonomy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryKey {
    IssuesOpened,
    PrsOpened,
    IssueTriage(TriageKind),
    CodeReviews(ReviewKind),
}

impl CategoryKey {
    /// Classify an event, or `None` for combinations outside the table.
    ///
    /// A merged pull request reaches us as either a `Merged` timeline event
    /// or a `Closed` event carrying the merged flag, depending on which the
    /// upstream emitted first; both land in the merged bucket.
    pub fn classify(event: &ContributionEvent) -> Option<Self> {
        use CategoryKey::*;
        match (event.target_kind, &event.detail) {
            (TargetKind::Issue, EventDetail::Opened) => Some(IssuesOpened),
            (TargetKind::PullRequest, EventDetail::Opened) => Some(PrsOpened),

            (TargetKind::Issue, EventDetail::Commented) => {
                Some(IssueTriage(TriageKind::Comments))
            }
            (TargetKind::Issue, EventDetail::Labeled { .. }) => {
                Some(IssueTriage(TriageKind::Labeled))
            }
            (TargetKind::Issue, EventDetail::Closed { .. }) => {
                Some(IssueTriage(TriageKind::Closed))
            }

            (TargetKind::PullRequest, EventDetail::Commented) => {
                Some(CodeReviews(ReviewKind::Comments))
            }
            (TargetKind::PullRequest, EventDetail::ReviewSubmitted { .. }) => {
                Some(CodeReviews(ReviewKind::Reviews))
            }
            (TargetKind::PullRequest, EventDetail::Closed { via_merge: true, .. })
            | (TargetKind::PullRequest, EventDetail::Merged { .. }) => {
                Some(CodeReviews(ReviewKind::Merged))
            }
            (TargetKind::PullRequest, EventDetail::Closed { via_merge: false, .. }) => {
                Some(CodeReviews(ReviewKind::Closed))
            }

            _ => None,
        }
    }
}

/// Classified events grouped per category, arrival order preserved.
/// Every bucket is always present; an untouched category is an empty vector.
#[derive(Debug, Clone, Default)]
pub struct CategoryBuckets {
    pub issues_opened: Vec<ContributionEvent>,
    pub prs_opened: Vec<ContributionEvent>,
    pub triage_comments: Vec<ContributionEvent>,
    pub triage_labeled: Vec<ContributionEvent>,
    pub triage_closed: Vec<ContributionEvent>,
    pub review_comments: Vec<ContributionEvent>,
    pub review_reviews: Vec<ContributionEvent>,
    pub review_merged: Vec<ContributionEvent>,
    pub review_closed: Vec<ContributionEvent>,
}

/// Per-category counts for the summary section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CategoryCounts {
    pub issues_opened: usize,
    pub prs_opened: usize,
    pub issue_triage: usize,
    pub code_reviews: usize,
}

impl CategoryCounts {
    pub fn total_actions(&self) -> usize {
        self.issues_opened + self.prs_opened + self.issue_triage + self.code_reviews
    }
}

impl CategoryBuckets {
    /// Group events by classification, dropping unmatched ones.
    pub fn collect<I>(events: I) -> Self
    where
        I: IntoIterator<Item = ContributionEvent>,
    {
        let mut buckets = Self::default();
        for event in events {
            let Some(key) = CategoryKey::classify(&event) else {
                tracing::debug!(
                    number = event.target_number,
                    "dropping unclassifiable event"
                );
                continue;
            };
            buckets.bucket_mut(key).push(event);
        }
        buckets
    }

    fn bucket_mut(&mut self, key: CategoryKey) -> &mut Vec<ContributionEvent> {
        match key {
            CategoryKey::IssuesOpened => &mut self.issues_opened,
            CategoryKey::PrsOpened => &mut self.prs_opened,
            CategoryKey::IssueTriage(TriageKind::Comments) => &mut self.triage_comments,
            CategoryKey::IssueTriage(TriageKind::Labeled) => &mut self.triage_labeled,
            CategoryKey::IssueTriage(TriageKind::Closed) => &mut self.triage_closed,
            CategoryKey::CodeReviews(ReviewKind::Comments) => &mut self.review_comments,
            CategoryKey::CodeReviews(ReviewKind::Reviews) => &mut self.review_reviews,
            CategoryKey::CodeReviews(ReviewKind::Merged) => &mut self.review_merged,
            CategoryKey::CodeReviews(ReviewKind::Closed) => &mut self.review_closed,
        }
    }

    pub fn counts(&self) -> CategoryCounts {
        CategoryCounts {
            issues_opened: self.issues_opened.len(),
            prs_opened: self.prs_opened.len(),
            issue_triage: self.triage_comments.len()
                + self.triage_labeled.len()
                + self.triage_closed.len(),
            code_reviews: self.review_comments.len()
                + self.review_reviews.len()
                + self.review_merged.len()
                + self.review_closed.len(),
        }
    }

    /// Total events across every leaf bucket
    pub fn total(&self) -> usize {
        self.counts().total_actions()
    }
}
