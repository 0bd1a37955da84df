use std::env;
use std::net::SocketAddr;

#[derive(Clone)]
pub struct Config {
    /// GitHub API token; requests fail with AUTHENTICATION_ERROR when unset
    pub github_token: String,
    /// Default repository owner for requests that do not pass one
    pub github_owner: String,
    /// Default repository name for requests that do not pass one
    pub github_repo: String,
    /// Team roster for engagement metrics, comma-separated logins
    pub team_members: Vec<String>,
    /// Window applied when a request carries neither `days` nor explicit dates
    pub default_days_back: u32,
    pub bind_addr: SocketAddr,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let team_members = env::var("TEAM_MEMBERS")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Self {
            github_token: env::var("GITHUB_TOKEN").unwrap_or_default(),
            github_owner: env::var("GITHUB_OWNER").unwrap_or_else(|_| "PowerShell".to_string()),
            github_repo: env::var("GITHUB_REPO").unwrap_or_else(|_| "PowerShell".to_string()),
            team_members,
            default_days_back: env::var("DEFAULT_DAYS_BACK")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(7),
            bind_addr: env::var("BIND_ADDR")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 8080))),
        }
    }
}
