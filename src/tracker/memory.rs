use std::sync::Mutex;

use async_trait::async_trait;
use futures::stream::{self, StreamExt};

use super::{IssueStream, IssueTracker, TrackerError};
use crate::models::*;

/// A mutation the tracker received, in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    Create { number: u64, issue: NewIssue },
    Update { number: u64, update: IssueUpdate },
}

#[derive(Debug, Clone)]
struct StoredIssue {
    issue: TrackedIssue,
    labels: Vec<String>,
}

/// Issue tracker held entirely in memory.
///
/// Behaves like a single GitHub repository: numbers are assigned in creation
/// order and URLs are `<base_url>/<number>`.
pub struct InMemoryTracker {
    base_url: String,
    issues: Mutex<Vec<StoredIssue>>,
    mutations: Mutex<Vec<Mutation>>,
}

impl InMemoryTracker {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            issues: Mutex::new(Vec::new()),
            mutations: Mutex::new(Vec::new()),
        }
    }

    /// Seed an existing issue without recording a mutation.
    pub fn insert(&self, issue: TrackedIssue, labels: Vec<String>) {
        let mut issues = self.issues.lock().expect("tracker lock poisoned");
        issues.push(StoredIssue { issue, labels });
    }

    /// Seed an issue with the given title and body, returning its number.
    pub fn seed(&self, title: &str, body: &str, label: &str, votes: u64) -> u64 {
        let number = self.next_number();
        self.insert(
            TrackedIssue {
                number,
                title: title.to_string(),
                body: body.to_string(),
                url: self.url_for(number),
                votes,
                feature_id: None,
            },
            vec![label.to_string()],
        );
        number
    }

    pub fn issue(&self, number: u64) -> Option<TrackedIssue> {
        let issues = self.issues.lock().expect("tracker lock poisoned");
        issues
            .iter()
            .find(|s| s.issue.number == number)
            .map(|s| s.issue.clone())
    }

    pub fn labels(&self, number: u64) -> Vec<String> {
        let issues = self.issues.lock().expect("tracker lock poisoned");
        issues
            .iter()
            .find(|s| s.issue.number == number)
            .map(|s| s.labels.clone())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.issues.lock().expect("tracker lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn mutations(&self) -> Vec<Mutation> {
        self.mutations.lock().expect("tracker lock poisoned").clone()
    }

    pub fn clear_mutations(&self) {
        self.mutations.lock().expect("tracker lock poisoned").clear();
    }

    fn next_number(&self) -> u64 {
        let issues = self.issues.lock().expect("tracker lock poisoned");
        issues.iter().map(|s| s.issue.number).max().unwrap_or(0) + 1
    }

    fn url_for(&self, number: u64) -> String {
        format!("{}/{}", self.base_url, number)
    }
}

#[async_trait]
impl IssueTracker for InMemoryTracker {
    fn list_issues<'a>(&'a self, label: &'a str) -> IssueStream<'a> {
        let matching: Vec<TrackedIssue> = self
            .issues
            .lock()
            .expect("tracker lock poisoned")
            .iter()
            .filter(|s| s.labels.iter().any(|l| l == label))
            .map(|s| s.issue.clone())
            .collect();
        stream::iter(matching.into_iter().map(Ok)).boxed()
    }

    async fn create_issue(&self, issue: &NewIssue) -> Result<CreatedIssue, TrackerError> {
        let number = self.next_number();
        let url = self.url_for(number);
        self.insert(
            TrackedIssue {
                number,
                title: issue.title.clone(),
                body: issue.body.clone(),
                url: url.clone(),
                votes: 0,
                feature_id: None,
            },
            issue.labels.clone(),
        );
        self.mutations
            .lock()
            .expect("tracker lock poisoned")
            .push(Mutation::Create {
                number,
                issue: issue.clone(),
            });
        Ok(CreatedIssue { number, url })
    }

    async fn update_issue(&self, number: u64, update: &IssueUpdate) -> Result<(), TrackerError> {
        {
            let mut issues = self.issues.lock().expect("tracker lock poisoned");
            let stored = issues
                .iter_mut()
                .find(|s| s.issue.number == number)
                .ok_or_else(|| TrackerError::NotFound(format!("issue #{}", number)))?;
            stored.issue.title = update.title.clone();
            stored.issue.body = update.body.clone();
        }
        self.mutations
            .lock()
            .expect("tracker lock poisoned")
            .push(Mutation::Update {
                number,
                update: update.clone(),
            });
        Ok(())
    }
}
