//! Activity source port trait
//!
//! The upstream boundary: given a repository, a subject, and a resolved
//! window, produce the flat list of contribution events. Implementations
//! own all raw-payload handling; only well-formed `ContributionEvent`
//! values cross this seam. Failures propagate unmodified - the core never
//! retries.

use async_trait::async_trait;

use crate::domain::entities::{ContributionEvent, DateRange, RepoRef};
use crate::error::GithubError;

#[async_trait]
pub trait ActivitySource: Send + Sync {
    /// Everything one user did against the repository inside the window,
    /// in upstream arrival order.
    async fn user_contributions(
        &self,
        repo: &RepoRef,
        login: &str,
        range: &DateRange,
    ) -> Result<Vec<ContributionEvent>, GithubError>;

    /// Everything anyone did against items of the repository inside the
    /// window. Used for team engagement ratios.
    async fn repo_activity(
        &self,
        repo: &RepoRef,
        range: &DateRange,
    ) -> Result<Vec<ContributionEvent>, GithubError>;
}
