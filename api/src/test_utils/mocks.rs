//! In-memory activity source

use async_trait::async_trait;

use crate::domain::entities::{ContributionEvent, DateRange, RepoRef};
use crate::domain::ports::ActivitySource;
use crate::error::GithubError;

/// Upstream failure modes a test can force
#[derive(Debug, Clone, Copy)]
pub enum UpstreamFailure {
    RateLimited,
    UserNotFound,
    Unauthorized,
}

/// Activity source backed by a fixed event list. Events outside the
/// requested range are filtered out, like the real adapter does.
#[derive(Default)]
pub struct StaticActivitySource {
    user_events: Vec<ContributionEvent>,
    repo_events: Vec<ContributionEvent>,
    failure: Option<UpstreamFailure>,
}

impl StaticActivitySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user_events(mut self, events: Vec<ContributionEvent>) -> Self {
        self.user_events = events;
        self
    }

    pub fn with_repo_events(mut self, events: Vec<ContributionEvent>) -> Self {
        self.repo_events = events;
        self
    }

    pub fn failing_with(mut self, failure: UpstreamFailure) -> Self {
        self.failure = Some(failure);
        self
    }

    fn fail_if_configured(&self, login: &str) -> Result<(), GithubError> {
        match self.failure {
            Some(UpstreamFailure::RateLimited) => Err(GithubError::RateLimited),
            Some(UpstreamFailure::UserNotFound) => {
                Err(GithubError::UserNotFound(login.to_string()))
            }
            Some(UpstreamFailure::Unauthorized) => Err(GithubError::Unauthorized),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ActivitySource for StaticActivitySource {
    async fn user_contributions(
        &self,
        _repo: &RepoRef,
        login: &str,
        range: &DateRange,
    ) -> Result<Vec<ContributionEvent>, GithubError> {
        self.fail_if_configured(login)?;
        Ok(self
            .user_events
            .iter()
            .filter(|e| range.contains(e.occurred_at))
            .cloned()
            .collect())
    }

    async fn repo_activity(
        &self,
        _repo: &RepoRef,
        range: &DateRange,
    ) -> Result<Vec<ContributionEvent>, GithubError> {
        self.fail_if_configured("")?;
        Ok(self
            .repo_events
            .iter()
            .filter(|e| range.contains(e.occurred_at))
            .cloned()
            .collect())
    }
}
