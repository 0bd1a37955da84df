//! Adapter implementations of the domain ports

pub mod github;

pub use github::GithubGraphql;
