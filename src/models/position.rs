use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One organization's published position on a feature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StandardsPosition {
    pub organization: String,
    pub position: String,
    #[serde(default)]
    pub url: String,
}

/// The standards-position feed: feature identity to every known position.
pub type PositionFeed = BTreeMap<String, Vec<StandardsPosition>>;

/// Feature identity to the reason it must not get a tracking issue.
pub type SkipList = BTreeMap<String, String>;
