//! The reconciliation engine.
//!
//! Features are visited in ranked order, one at a time. For each one the
//! engine decides between skipping it, leaving its issue alone, updating the
//! issue, or creating one, and at most one tracker mutation is in flight at
//! any moment. Dry runs go through the same decisions and only stop short of
//! calling the tracker.

use std::collections::BTreeSet;

use thiserror::Error;

use crate::catalog::Catalog;
use crate::index::{build_index, IndexError, IssueIndex};
use crate::manifest::Manifest;
use crate::marker::Marker;
use crate::models::*;
use crate::ranking;
use crate::render::IssueRenderer;
use crate::tracker::{IssueTracker, TrackerError};

#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error(transparent)]
    Index(#[from] IndexError),

    #[error("Tracker mutation failed: {0}")]
    Tracker(#[from] TrackerError),
}

/// Why a feature gets no mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Ranked, but absent from the catalog.
    NotInCatalog,
    /// Its issue, if any, is indexed under the target.
    Moved { to: String },
    /// No migration path yet.
    Split { to: Vec<String> },
    UnknownKind { kind: String },
    /// A vendor opposes the feature.
    Opposed { reason: String },
    Discouraged {
        according_to: Vec<String>,
        alternatives: Vec<String>,
    },
    /// Baseline widely available and never tracked.
    WidelyAvailable,
}

/// The outcome for one feature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Skip(SkipReason),
    Unchanged { number: u64 },
    Update { number: u64 },
    Create,
}

impl Decision {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Skip(_) => "skip",
            Self::Unchanged { .. } => "unchanged",
            Self::Update { .. } => "update",
            Self::Create => "create",
        }
    }
}

/// Everything a pass decided, in the order it decided it.
#[derive(Debug, Clone, Default)]
pub struct Report {
    pub decisions: Vec<(String, Decision)>,
    pub manifest: Manifest,
    pub dry_run: bool,
}

impl Report {
    fn count(&self, f: impl Fn(&Decision) -> bool) -> usize {
        self.decisions.iter().filter(|(_, d)| f(d)).count()
    }

    pub fn created(&self) -> usize {
        self.count(|d| matches!(d, Decision::Create))
    }

    pub fn updated(&self) -> usize {
        self.count(|d| matches!(d, Decision::Update { .. }))
    }

    pub fn unchanged(&self) -> usize {
        self.count(|d| matches!(d, Decision::Unchanged { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|d| matches!(d, Decision::Skip(_)))
    }

    pub fn decision(&self, id: &str) -> Option<&Decision> {
        self.decisions
            .iter()
            .find(|(decided, _)| decided == id)
            .map(|(_, d)| d)
    }
}

/// A decision together with what it needs for execution.
enum Plan<'i> {
    Skip(SkipReason),
    Unchanged(&'i TrackedIssue),
    Update(&'i TrackedIssue, IssueUpdate),
    Create(IssueUpdate),
}

pub struct Engine<'a> {
    catalog: &'a Catalog,
    skip_list: &'a SkipList,
    marker: &'a Marker,
    label: String,
    dry_run: bool,
}

impl<'a> Engine<'a> {
    pub fn new(
        catalog: &'a Catalog,
        skip_list: &'a SkipList,
        marker: &'a Marker,
        label: impl Into<String>,
    ) -> Self {
        Self {
            catalog,
            skip_list,
            marker,
            label: label.into(),
            dry_run: false,
        }
    }

    /// Decide everything but never mutate the tracker.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Index the tracker and reconcile every catalog feature in ranked order.
    pub async fn run(&self, tracker: &dyn IssueTracker) -> Result<Report, ReconcileError> {
        let order = ranking::rank(self.catalog);
        self.reconcile(tracker, &order).await
    }

    /// Index the tracker and reconcile the identities in `order`.
    pub async fn reconcile(
        &self,
        tracker: &dyn IssueTracker,
        order: &[String],
    ) -> Result<Report, ReconcileError> {
        let index = build_index(tracker.list_issues(&self.label), self.catalog, self.marker).await?;
        self.apply(tracker, &index, order).await
    }

    /// Reconcile against an already built index.
    pub async fn apply(
        &self,
        tracker: &dyn IssueTracker,
        index: &IssueIndex,
        order: &[String],
    ) -> Result<Report, ReconcileError> {
        let renderer = IssueRenderer::new(self.catalog, self.marker);
        let mut report = Report {
            dry_run: self.dry_run,
            ..Report::default()
        };
        let mut seen = BTreeSet::new();

        for id in order {
            if !seen.insert(id.as_str()) {
                tracing::debug!(feature = %id, "Already reconciled");
                continue;
            }

            let decision = match self.plan(id, index, &renderer) {
                Plan::Skip(reason) => {
                    log_skip(id, &reason);
                    Decision::Skip(reason)
                }
                Plan::Unchanged(issue) => {
                    report.manifest.insert(id.as_str(), issue.url.as_str(), issue.votes);
                    Decision::Unchanged {
                        number: issue.number,
                    }
                }
                Plan::Update(issue, desired) => {
                    if self.dry_run {
                        tracing::info!(feature = %id, issue = issue.number, "Would update issue");
                    } else {
                        tracing::info!(feature = %id, issue = issue.number, "Updating issue");
                        tracker.update_issue(issue.number, &desired).await?;
                    }
                    report.manifest.insert(id.as_str(), issue.url.as_str(), issue.votes);
                    Decision::Update {
                        number: issue.number,
                    }
                }
                Plan::Create(desired) => {
                    if self.dry_run {
                        tracing::info!(feature = %id, title = %desired.title, "Would create issue");
                    } else {
                        let created = tracker
                            .create_issue(&NewIssue {
                                title: desired.title,
                                body: desired.body,
                                labels: vec![self.label.clone()],
                            })
                            .await?;
                        tracing::info!(
                            feature = %id,
                            issue = created.number,
                            url = %created.url,
                            "Created issue"
                        );
                        report.manifest.insert(id.as_str(), created.url, 0);
                    }
                    Decision::Create
                }
            };
            tracing::debug!(feature = %id, decision = decision.as_str(), "Decided");
            report.decisions.push((id.clone(), decision));
        }

        tracing::info!(
            dry_run = self.dry_run,
            created = report.created(),
            updated = report.updated(),
            unchanged = report.unchanged(),
            skipped = report.skipped(),
            "Reconciliation finished"
        );
        Ok(report)
    }

    fn plan<'i>(&self, id: &str, index: &'i IssueIndex, renderer: &IssueRenderer) -> Plan<'i> {
        let Some(feature) = self.catalog.get(id) else {
            return Plan::Skip(SkipReason::NotInCatalog);
        };

        match &feature.kind {
            FeatureKind::Normal => {}
            FeatureKind::Moved { to } => {
                return Plan::Skip(SkipReason::Moved { to: to.clone() });
            }
            FeatureKind::Split { to } => {
                return Plan::Skip(SkipReason::Split { to: to.clone() });
            }
            FeatureKind::Unknown { tag } => {
                return Plan::Skip(SkipReason::UnknownKind { kind: tag.clone() });
            }
        }

        if let Some(reason) = self.skip_list.get(id) {
            return Plan::Skip(SkipReason::Opposed {
                reason: reason.clone(),
            });
        }

        if let Some(discouraged) = &feature.discouraged {
            return Plan::Skip(SkipReason::Discouraged {
                according_to: discouraged.according_to.clone(),
                alternatives: discouraged.alternatives.clone(),
            });
        }

        let existing = index.get(id);
        if existing.is_none() && feature.baseline.is_widely_available() {
            return Plan::Skip(SkipReason::WidelyAvailable);
        }

        let desired = renderer.render(feature);
        match existing {
            Some(issue) if issue.title == desired.title && issue.body == desired.body => {
                Plan::Unchanged(issue)
            }
            Some(issue) => Plan::Update(issue, desired),
            None => Plan::Create(desired),
        }
    }
}

fn log_skip(id: &str, reason: &SkipReason) {
    match reason {
        SkipReason::NotInCatalog => {
            tracing::warn!(feature = %id, "Ranked feature missing from catalog")
        }
        SkipReason::UnknownKind { kind } => {
            tracing::warn!(feature = %id, kind = %kind, "Unknown feature kind")
        }
        SkipReason::Moved { to } => {
            tracing::info!(feature = %id, to = %to, "Skipping moved feature")
        }
        SkipReason::Split { to } => {
            tracing::info!(feature = %id, to = ?to, "Skipping split feature until migration is supported")
        }
        SkipReason::Opposed { reason } => {
            tracing::info!(feature = %id, reason = %reason, "Skipping opposed feature")
        }
        SkipReason::Discouraged {
            according_to,
            alternatives,
        } => {
            tracing::info!(
                feature = %id,
                according_to = ?according_to,
                alternatives = ?alternatives,
                "Skipping discouraged feature"
            )
        }
        SkipReason::WidelyAvailable => {
            tracing::info!(feature = %id, "Skipping widely available feature")
        }
    }
}
