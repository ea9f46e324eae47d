//! Keeps one GitHub tracking issue per web platform feature.
//!
//! Each run reads the web-features catalog and the vendors' standards
//! positions, indexes the existing tracking issues by the marker embedded in
//! their bodies, and then creates or updates issues so every eligible
//! feature has exactly one, with content matching the catalog. The run ends
//! by writing a manifest of feature → issue URL and vote count.

pub mod catalog;
pub mod config;
pub mod index;
pub mod manifest;
pub mod marker;
pub mod models;
pub mod positions;
pub mod ranking;
pub mod reconcile;
pub mod render;
pub mod sync;
pub mod tracker;
