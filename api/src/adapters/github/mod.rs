//! GitHub GraphQL adapter

mod client;
mod queries;

pub use client::GithubGraphql;
