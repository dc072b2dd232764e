//! GitHub adapters for issueflow
//!
//! `GithubClient` implements both `IssueTracker` (issue reads) and
//! `ChangeRequestWriter` (branch, commit and pull request through the git
//! data API) against the GitHub REST API.

mod client;
mod error;
mod issues;
mod pulls;

pub use client::{GithubClient, GithubConfig, DEFAULT_API_URL};
