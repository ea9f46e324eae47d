use serde::{Deserialize, Serialize};

/// A tracking issue as read from the tracker.
///
/// The engine never mutates these; it only proposes updates through
/// [`IssueUpdate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedIssue {
    pub number: u64,
    pub title: String,
    pub body: String,
    pub url: String,
    /// Count of positive (`+1`) reactions.
    pub votes: u64,
    /// Structured identity, for trackers that support custom metadata.
    /// Takes precedence over the marker embedded in `body`.
    #[serde(default)]
    pub feature_id: Option<String>,
}

/// Input for creating a new issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewIssue {
    pub title: String,
    pub body: String,
    pub labels: Vec<String>,
}

/// Input for updating an existing issue. Labels are deliberately absent so
/// manual curation on the tracker survives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueUpdate {
    pub title: String,
    pub body: String,
}

/// What the tracker hands back after creating an issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedIssue {
    pub number: u64,
    pub url: String,
}
