//! Single-subject metrics service
//!
//! Orchestrates the pipeline for one user: fetch events through the
//! activity source, classify and bucket them, assemble the report.
//! Classification and aggregation run on the complete event list or not at
//! all; an upstream failure leaves no partial state behind.

use std::sync::Arc;

use chrono::Utc;

use crate::app::report::ActivityReport;
use crate::domain::entities::{CategoryBuckets, DateRange, RepoRef};
use crate::domain::ports::ActivitySource;
use crate::error::AppError;

pub struct MetricsService<S>
where
    S: ActivitySource,
{
    source: Arc<S>,
}

impl<S> MetricsService<S>
where
    S: ActivitySource,
{
    pub fn new(source: Arc<S>) -> Self {
        Self { source }
    }

    pub async fn user_activity(
        &self,
        repo: &RepoRef,
        user: &str,
        range: &DateRange,
    ) -> Result<ActivityReport, AppError> {
        let events = self.source.user_contributions(repo, user, range).await?;
        tracing::info!(
            user,
            repo = %repo,
            events = events.len(),
            "collected contribution events"
        );

        let buckets = CategoryBuckets::collect(events);
        Ok(ActivityReport::assemble(
            user,
            repo,
            range,
            &buckets,
            Utc::now(),
        ))
    }
}
