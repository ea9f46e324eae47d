use std::collections::BTreeMap;

use serde::Serialize;

/// One entry of the web-features catalog.
///
/// Records are read-only snapshots for the duration of a run. Redirect
/// entries (moved or split features) carry only an identity and a
/// [`FeatureKind`]; every other field is left empty for them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeatureRecord {
    pub id: String,
    pub name: String,
    /// Plain-text description, suitable for Markdown output.
    pub description: String,
    pub kind: FeatureKind,
    pub discouraged: Option<Discouraged>,
    pub baseline: Baseline,
    /// Browser key (e.g. `chrome`, `firefox_android`) to the first version
    /// with support. Browsers without support are absent.
    pub support: BTreeMap<String, String>,
    pub spec: Vec<String>,
    pub caniuse: Vec<String>,
}

impl FeatureRecord {
    /// Create a normal feature with no status data.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            kind: FeatureKind::Normal,
            discouraged: None,
            baseline: Baseline::None,
            support: BTreeMap::new(),
            spec: Vec::new(),
            caniuse: Vec::new(),
        }
    }

    /// Create a redirect entry pointing at another identity.
    pub fn moved(id: impl Into<String>, to: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            kind: FeatureKind::Moved { to: to.into() },
            ..Self::new(id.clone(), id)
        }
    }

    /// Create a split entry pointing at several identities.
    pub fn split(id: impl Into<String>, to: Vec<String>) -> Self {
        let id = id.into();
        Self {
            kind: FeatureKind::Split { to },
            ..Self::new(id.clone(), id)
        }
    }

    pub fn is_discouraged(&self) -> bool {
        self.discouraged.is_some()
    }
}

/// Lifecycle of a catalog identity.
///
/// - `Normal`: a live feature that may get a tracking issue
/// - `Moved`: renamed; issues filed under the old identity belong to `to`
/// - `Split`: replaced by several features; no migration path yet
/// - `Unknown`: a kind this build does not understand, kept so the run can
///   log and continue instead of rejecting the whole catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FeatureKind {
    Normal,
    Moved { to: String },
    Split { to: Vec<String> },
    Unknown { tag: String },
}

impl FeatureKind {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Normal => "feature",
            Self::Moved { .. } => "moved",
            Self::Split { .. } => "split",
            Self::Unknown { tag } => tag.as_str(),
        }
    }
}

/// Attribution for a feature the catalog advises against using.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Discouraged {
    /// URLs of the sources that discourage the feature.
    pub according_to: Vec<String>,
    /// Identities of features to use instead.
    pub alternatives: Vec<String>,
}

/// Baseline status of a feature.
///
/// Dates are kept as the catalog writes them, which may include a `≤`
/// prefix for approximate dates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "baseline", rename_all = "snake_case")]
pub enum Baseline {
    /// Limited availability: not yet in all core browsers.
    None,
    /// Newly available: in all core browsers since `since`.
    Low { since: Option<String> },
    /// Widely available: newly available for long enough.
    High { since: Option<String> },
}

impl Baseline {
    pub fn is_widely_available(&self) -> bool {
        matches!(self, Self::High { .. })
    }
}
