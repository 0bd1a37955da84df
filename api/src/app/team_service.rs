//! Team engagement service
//!
//! Team mode answers a different question than the per-user view: of the
//! items touched in the window, how many did the team get to, and how did
//! closed items get closed.

use std::sync::Arc;

use chrono::Utc;

use crate::app::report::TeamReport;
use crate::domain::entities::{DateRange, RepoRef, TeamEngagement, TeamRoster};
use crate::domain::ports::ActivitySource;
use crate::error::{AppError, DomainError};

pub struct TeamEngagementService<S>
where
    S: ActivitySource,
{
    source: Arc<S>,
    roster: TeamRoster,
}

impl<S> TeamEngagementService<S>
where
    S: ActivitySource,
{
    pub fn new(source: Arc<S>, roster: TeamRoster) -> Self {
        Self { source, roster }
    }

    pub fn roster(&self) -> &TeamRoster {
        &self.roster
    }

    pub async fn team_activity(
        &self,
        repo: &RepoRef,
        range: &DateRange,
    ) -> Result<TeamReport, AppError> {
        if self.roster.is_empty() {
            return Err(AppError::Domain(DomainError::InvalidParameter(
                "team roster is not configured; set TEAM_MEMBERS".to_string(),
            )));
        }

        let events = self.source.repo_activity(repo, range).await?;
        tracing::info!(
            repo = %repo,
            events = events.len(),
            roster = self.roster.logins().len(),
            "collected repository activity"
        );

        let engagement = TeamEngagement::from_events(&events, &self.roster);
        Ok(TeamReport::assemble(
            &self.roster,
            repo,
            range,
            engagement,
            Utc::now(),
        ))
    }
}
