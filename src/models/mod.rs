//! Domain models for feature-signals.
//!
//! # Core Concepts
//!
//! ## Catalog Snapshots
//!
//! Read once per run and never modified:
//!
//! - [`FeatureRecord`]: One identity from the web-features catalog, with its
//!   [`FeatureKind`], [`Baseline`] status and per-browser support.
//! - [`StandardsPosition`]: A browser vendor's stance on a feature. Negative
//!   positions feed the [`SkipList`].
//!
//! ## Tracker State
//!
//! Owned by the issue tracker and re-read on every run:
//!
//! - [`TrackedIssue`]: An existing tracking issue with its vote count.
//! - [`NewIssue`] / [`IssueUpdate`]: Mutations the engine asks for.

mod feature;
mod issue;
mod position;

pub use feature::*;
pub use issue::*;
pub use position::*;
