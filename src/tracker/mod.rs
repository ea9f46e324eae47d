//! Issue tracker collaborators.
//!
//! The engine talks to the tracker only through [`IssueTracker`]:
//! - [`GitHubClient`] - the GitHub REST API
//! - [`InMemoryTracker`] - an in-process fake that records mutations
//!
//! Retries and rate-limit handling belong to implementations, not the engine.

mod github;
mod memory;

pub use github::GitHubClient;
pub use memory::{InMemoryTracker, Mutation};

use async_trait::async_trait;
use futures::stream::BoxStream;
use thiserror::Error;

use crate::models::*;

/// Tracker errors. Every one of them aborts the run.
#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: GITHUB_TOKEN missing or invalid")]
    Unauthorized,

    #[error("Rejected: {0}")]
    Rejected(String),

    #[error("Server error: {0}")]
    Server(String),
}

/// Issues are produced lazily; implementations fetch pages on demand.
pub type IssueStream<'a> = BoxStream<'a, Result<TrackedIssue, TrackerError>>;

#[async_trait]
pub trait IssueTracker: Send + Sync {
    /// Every issue carrying `label`.
    fn list_issues<'a>(&'a self, label: &'a str) -> IssueStream<'a>;

    async fn create_issue(&self, issue: &NewIssue) -> Result<CreatedIssue, TrackerError>;

    /// Replace title and body. Labels are left alone.
    async fn update_issue(&self, number: u64, update: &IssueUpdate) -> Result<(), TrackerError>;
}
