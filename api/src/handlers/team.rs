//! Team engagement handler

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::Utc;
use serde::Deserialize;

use super::metrics::{resolve_repo, resolve_window};
use crate::app::report::TeamReport;
use crate::error::AppError;
use crate::AppState;

/// Query parameters for GET /api/team/metrics
#[derive(Debug, Default, Deserialize)]
pub struct TeamMetricsQuery {
    pub days: Option<String>,
    pub from_date: Option<String>,
    pub to_date: Option<String>,
    pub timezone: Option<String>,
    pub owner: Option<String>,
    pub repo: Option<String>,
}

/// GET /api/team/metrics
///
/// Engagement metrics for the configured team roster.
pub async fn get_team_metrics(
    State(state): State<AppState>,
    Query(query): Query<TeamMetricsQuery>,
) -> Result<Json<TeamReport>, AppError> {
    let repo = resolve_repo(query.owner.as_deref(), query.repo.as_deref(), &state)?;
    let range = resolve_window(
        query.days.as_deref(),
        query.from_date.as_deref(),
        query.to_date.as_deref(),
        query.timezone.as_deref(),
        state.config.default_days_back,
        Utc::now(),
    )?;

    tracing::info!(repo = %repo, days = range.days(), "fetching team engagement");
    let report = state.team.team_activity(&repo, &range).await?;
    Ok(Json(report))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_query_defaults() {
        let query: TeamMetricsQuery = serde_json::from_str(r#"{}"#).unwrap();
        assert!(query.days.is_none());
        assert!(query.owner.is_none());
    }

    #[test]
    fn parse_query_with_dates() {
        let json = r#"{"from_date": "2026-02-01", "to_date": "2026-02-07"}"#;
        let query: TeamMetricsQuery = serde_json::from_str(json).unwrap();
        assert_eq!(query.from_date.as_deref(), Some("2026-02-01"));
        assert_eq!(query.to_date.as_deref(), Some("2026-02-07"));
    }
}
