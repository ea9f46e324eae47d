//! Identity → issue lookup built from the live tracker state.
//!
//! The index is rebuilt from scratch on every run. Issues filed under an
//! identity that has since moved are indexed under the new identity, so a
//! rename never produces a second issue. Two issues for one identity abort
//! the run.

use std::collections::BTreeMap;

use futures::{Stream, TryStreamExt};
use thiserror::Error;

use crate::catalog::Catalog;
use crate::marker::Marker;
use crate::models::TrackedIssue;
use crate::tracker::TrackerError;

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("Duplicate issues for {feature}: {first} and {second}")]
    Duplicate {
        feature: String,
        first: String,
        second: String,
    },

    #[error("Failed to list issues: {0}")]
    Tracker(#[from] TrackerError),
}

/// One issue per feature identity.
#[derive(Debug, Clone, Default)]
pub struct IssueIndex {
    issues: BTreeMap<String, TrackedIssue>,
}

impl IssueIndex {
    pub fn get(&self, id: &str) -> Option<&TrackedIssue> {
        self.issues.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.issues.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Accumulates issues into an [`IssueIndex`].
pub struct IndexBuilder<'a> {
    catalog: &'a Catalog,
    marker: &'a Marker,
    issues: BTreeMap<String, TrackedIssue>,
}

impl<'a> IndexBuilder<'a> {
    pub fn new(catalog: &'a Catalog, marker: &'a Marker) -> Self {
        Self {
            catalog,
            marker,
            issues: BTreeMap::new(),
        }
    }

    /// Identity an issue tracks, before redirects. The structured field wins
    /// over the marker in the body.
    fn identity_of(&self, issue: &TrackedIssue) -> Option<String> {
        if let Some(id) = &issue.feature_id {
            return Some(id.clone());
        }

        let marked = self.marker.extract_all(&issue.body);
        let first = marked.first()?;
        if marked.iter().any(|id| id != first) {
            tracing::warn!(
                issue = issue.number,
                url = %issue.url,
                using = %first,
                "Issue body carries more than one marker"
            );
        }
        Some(first.to_string())
    }

    pub fn add(&mut self, issue: TrackedIssue) -> Result<(), IndexError> {
        let Some(marked) = self.identity_of(&issue) else {
            tracing::warn!(issue = issue.number, url = %issue.url, "Issue has no feature marker");
            return Ok(());
        };

        let id = self.catalog.resolve(&marked).to_string();
        if id != marked {
            tracing::info!(
                issue = issue.number,
                from = %marked,
                to = %id,
                "Indexing issue under moved feature"
            );
        }

        if let Some(existing) = self.issues.get(&id) {
            return Err(IndexError::Duplicate {
                feature: id,
                first: existing.url.clone(),
                second: issue.url,
            });
        }
        self.issues.insert(id, issue);
        Ok(())
    }

    pub fn finish(self) -> IssueIndex {
        IssueIndex {
            issues: self.issues,
        }
    }
}

/// Drain `issues` completely and index them.
pub async fn build_index<S>(
    issues: S,
    catalog: &Catalog,
    marker: &Marker,
) -> Result<IssueIndex, IndexError>
where
    S: Stream<Item = Result<TrackedIssue, TrackerError>>,
{
    let mut builder = IndexBuilder::new(catalog, marker);
    futures::pin_mut!(issues);
    while let Some(issue) = issues.try_next().await? {
        builder.add(issue)?;
    }
    let index = builder.finish();
    tracing::info!(issues = index.len(), "Built issue index");
    Ok(index)
}
