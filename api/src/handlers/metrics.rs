//! Single-subject metrics handler
//!
//! All range parameters funnel through [`resolve_window`], shared with the
//! team handler, so both endpoints validate identically.

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::app::report::ActivityReport;
use crate::domain::entities::{DateRange, RepoRef, ValidTimezone};
use crate::error::{AppError, DomainError};
use crate::AppState;

/// Query parameters for GET /api/metrics
#[derive(Debug, Default, Deserialize)]
pub struct MetricsQuery {
    pub user: Option<String>,
    /// Kept as a string so a non-integer value surfaces as
    /// INVALID_PARAMETER rather than a bare extractor rejection
    pub days: Option<String>,
    pub from_date: Option<String>,
    pub to_date: Option<String>,
    pub timezone: Option<String>,
    pub owner: Option<String>,
    pub repo: Option<String>,
}

/// Resolve the query window from the mutually exclusive `days` and
/// `from_date`/`to_date` parameter families.
pub(crate) fn resolve_window(
    days: Option<&str>,
    from_date: Option<&str>,
    to_date: Option<&str>,
    timezone: Option<&str>,
    default_days: u32,
    now: DateTime<Utc>,
) -> Result<DateRange, AppError> {
    let tz = ValidTimezone::parse(timezone.unwrap_or_default())?;

    match (days, from_date, to_date) {
        (Some(_), Some(_), _) | (Some(_), _, Some(_)) => Err(DomainError::InvalidParameter(
            "specify either days or from_date/to_date, not both".to_string(),
        )
        .into()),
        (None, Some(from), Some(to)) => Ok(DateRange::resolve(from, to, tz, now)?),
        (None, Some(_), None) => {
            Err(DomainError::MissingParameter("to_date".to_string()).into())
        }
        (None, None, Some(_)) => {
            Err(DomainError::MissingParameter("from_date".to_string()).into())
        }
        (Some(days), None, None) => {
            let n: u32 = days.trim().parse().map_err(|_| {
                DomainError::InvalidParameter("days must be an integer".to_string())
            })?;
            Ok(DateRange::last_n_days(n, tz, now)?)
        }
        (None, None, None) => Ok(DateRange::last_n_days(default_days, tz, now)?),
    }
}

pub(crate) fn resolve_repo(
    owner: Option<&str>,
    repo: Option<&str>,
    state: &AppState,
) -> Result<RepoRef, AppError> {
    let owner = owner
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(state.config.github_owner.as_str());
    let repo = repo
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(state.config.github_repo.as_str());
    if owner.is_empty() || repo.is_empty() {
        return Err(DomainError::InvalidParameter(
            "owner and repo must be non-empty strings".to_string(),
        )
        .into());
    }
    Ok(RepoRef::new(owner, repo))
}

/// GET /api/metrics
///
/// Activity metrics for one GitHub user over a date range.
pub async fn get_metrics(
    State(state): State<AppState>,
    Query(query): Query<MetricsQuery>,
) -> Result<Json<ActivityReport>, AppError> {
    let user = query.user.as_deref().map(str::trim).unwrap_or_default();
    if user.is_empty() {
        return Err(DomainError::MissingParameter("user".to_string()).into());
    }

    let repo = resolve_repo(query.owner.as_deref(), query.repo.as_deref(), &state)?;
    let range = resolve_window(
        query.days.as_deref(),
        query.from_date.as_deref(),
        query.to_date.as_deref(),
        query.timezone.as_deref(),
        state.config.default_days_back,
        Utc::now(),
    )?;

    tracing::info!(user, repo = %repo, days = range.days(), "fetching metrics");
    let report = state.metrics.user_activity(&repo, user, &range).await?;
    tracing::info!(
        user,
        total_actions = report.summary.total_actions,
        "metrics collected"
    );
    Ok(Json(report))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_query_defaults() {
        let query: MetricsQuery = serde_json::from_str(r#"{}"#).unwrap();
        assert!(query.user.is_none());
        assert!(query.days.is_none());
        assert!(query.timezone.is_none());
    }

    #[test]
    fn parse_query_with_all_params() {
        let json = r#"{"user": "alice", "days": "7", "timezone": "UTC", "owner": "o", "repo": "r"}"#;
        let query: MetricsQuery = serde_json::from_str(json).unwrap();
        assert_eq!(query.user.as_deref(), Some("alice"));
        assert_eq!(query.days.as_deref(), Some("7"));
    }

    fn now() -> DateTime<Utc> {
        "2026-07-30T12:00:00Z".parse().unwrap()
    }

    #[test]
    fn window_defaults_when_no_parameters() {
        let range = resolve_window(None, None, None, None, 7, now()).unwrap();
        assert_eq!(range.days(), 7);
    }

    #[test]
    fn window_rejects_days_combined_with_dates() {
        let err = resolve_window(Some("7"), Some("2026-02-01"), None, None, 7, now()).unwrap_err();
        assert!(matches!(
            err,
            AppError::Domain(DomainError::InvalidParameter(_))
        ));
    }

    #[test]
    fn window_rejects_bare_from_date() {
        let err = resolve_window(None, Some("2026-02-01"), None, None, 7, now()).unwrap_err();
        assert!(matches!(
            err,
            AppError::Domain(DomainError::MissingParameter(ref p)) if p == "to_date"
        ));
    }

    #[test]
    fn window_rejects_non_integer_days() {
        let err = resolve_window(Some("week"), None, None, None, 7, now()).unwrap_err();
        assert!(matches!(
            err,
            AppError::Domain(DomainError::InvalidParameter(_))
        ));
    }

    #[test]
    fn window_rejects_days_out_of_bounds() {
        for bad in ["0", "201", "-3"] {
            let err = resolve_window(Some(bad), None, None, None, 7, now()).unwrap_err();
            assert!(
                matches!(err, AppError::Domain(DomainError::InvalidParameter(_))),
                "days={} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn window_resolves_explicit_dates() {
        let range = resolve_window(
            None,
            Some("2026-02-01"),
            Some("2026-02-07"),
            Some("America/Los_Angeles"),
            7,
            now(),
        )
        .unwrap();
        assert_eq!(range.days(), 7);
        assert_eq!(range.timezone().name(), "America/Los_Angeles");
    }

    #[test]
    fn window_rejects_abbreviated_timezone() {
        let err = resolve_window(
            None,
            Some("2026-02-01"),
            Some("2026-02-07"),
            Some("PST"),
            7,
            now(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            AppError::Domain(DomainError::InvalidTimezone(ref tz)) if tz == "PST"
        ));
    }
}
