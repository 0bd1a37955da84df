//! Maintainer Activity Dashboard API
//!
//! Queries the GitHub GraphQL API for one user's or one team's activity in
//! a repository over a date range, classifies the events into fixed
//! categories, and serves the aggregate as JSON for the dashboard
//! front-end. Uses hexagonal (ports & adapters) architecture: the GitHub
//! client is an adapter behind the `ActivitySource` port, and everything
//! downstream of it is pure, request-scoped computation.

use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod adapters;
mod app;
mod config;
mod domain;
mod error;
mod handlers;

#[cfg(test)]
mod test_utils;


use adapters::GithubGraphql;
use app::{MetricsService, TeamEngagementService};
use config::Config;
use domain::entities::TeamRoster;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub metrics: Arc<MetricsService<GithubGraphql>>,
    pub team: Arc<TeamEngagementService<GithubGraphql>>,
    pub config: Config,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(handlers::health))
        .route("/api/metrics", get(handlers::get_metrics))
        .route("/api/team/metrics", get(handlers::get_team_metrics))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,dashboard_api=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting maintainer activity dashboard API...");

    let config = Config::from_env();
    if config.github_token.is_empty() {
        tracing::warn!("GITHUB_TOKEN is not set; GitHub requests will fail");
    }
    tracing::info!(
        "Default repository: {}/{}",
        config.github_owner,
        config.github_repo
    );

    let github = Arc::new(GithubGraphql::new(config.github_token.clone()));
    let metrics = Arc::new(MetricsService::new(github.clone()));
    let team = Arc::new(TeamEngagementService::new(
        github.clone(),
        TeamRoster::new(config.team_members.clone()),
    ));

    let state = AppState {
        metrics,
        team,
        config: config.clone(),
    };

    tracing::info!("Listening on {}", config.bind_addr);
    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .expect("failed to bind listen address");
    axum::serve(listener, router(state))
        .await
        .expect("server error");
}
