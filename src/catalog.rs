//! Loader for the web-features `data.json` catalog.
//!
//! The file has two top-level maps: `browsers` (release history per browser)
//! and `features` (one entry per identity). Entries are converted into
//! [`FeatureRecord`]s up front so the rest of the engine never sees the raw
//! shape.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::models::*;

/// Catalog loading errors. All of them abort the run.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to read catalog {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse catalog: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Malformed catalog entry {id}: {reason}")]
    Malformed { id: String, reason: String },
}

/// A browser and the date each of its versions shipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Browser {
    pub name: String,
    releases: BTreeMap<String, String>,
}

impl Browser {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            releases: BTreeMap::new(),
        }
    }

    pub fn with_release(mut self, version: impl Into<String>, date: impl Into<String>) -> Self {
        self.releases.insert(version.into(), date.into());
        self
    }

    /// Release date of `version`. Approximate versions (`≤79`) resolve to the
    /// named version's date.
    pub fn release_date(&self, version: &str) -> Option<&str> {
        let version = version.trim_start_matches('≤');
        self.releases.get(version).map(String::as_str)
    }
}

/// The full feature catalog for one run.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    browsers: BTreeMap<String, Browser>,
    features: BTreeMap<String, FeatureRecord>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read and parse a catalog file.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&content)
    }

    /// Parse a catalog from the `data.json` text.
    pub fn from_json(content: &str) -> Result<Self, CatalogError> {
        let raw: RawCatalog = serde_json::from_str(content)?;

        let mut catalog = Self::new();
        for (key, browser) in raw.browsers {
            let mut entry = Browser::new(browser.name);
            for release in browser.releases {
                entry = entry.with_release(release.version, release.date);
            }
            catalog.browsers.insert(key, entry);
        }
        for (id, feature) in raw.features {
            let record = feature.into_record(id)?;
            catalog.insert(record);
        }

        tracing::debug!(
            features = catalog.features.len(),
            browsers = catalog.browsers.len(),
            "Loaded feature catalog"
        );
        Ok(catalog)
    }

    pub fn with_browser(mut self, key: impl Into<String>, browser: Browser) -> Self {
        self.browsers.insert(key.into(), browser);
        self
    }

    pub fn with_feature(mut self, record: FeatureRecord) -> Self {
        self.insert(record);
        self
    }

    pub fn insert(&mut self, record: FeatureRecord) {
        self.features.insert(record.id.clone(), record);
    }

    pub fn get(&self, id: &str) -> Option<&FeatureRecord> {
        self.features.get(id)
    }

    /// All records, ordered by identity.
    pub fn features(&self) -> impl Iterator<Item = &FeatureRecord> {
        self.features.values()
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Browser keys in sorted order.
    pub fn browser_keys(&self) -> impl Iterator<Item = &str> {
        self.browsers.keys().map(String::as_str)
    }

    pub fn browser(&self, key: &str) -> Option<&Browser> {
        self.browsers.get(key)
    }

    pub fn release_date(&self, browser: &str, version: &str) -> Option<&str> {
        self.browsers.get(browser)?.release_date(version)
    }

    /// Follow `Moved` redirects from `id` to the identity it lives under now.
    ///
    /// Cycles are cut after as many hops as the catalog has entries.
    pub fn resolve<'a>(&'a self, id: &'a str) -> &'a str {
        let mut current = id;
        for _ in 0..=self.features.len() {
            match self.features.get(current).map(|f| &f.kind) {
                Some(FeatureKind::Moved { to }) => current = to.as_str(),
                _ => return current,
            }
        }
        tracing::warn!(feature = %id, "Redirect cycle in catalog");
        current
    }
}

// ============================================================
// Raw data.json shape
// ============================================================

#[derive(Debug, Deserialize)]
struct RawCatalog {
    #[serde(default)]
    browsers: BTreeMap<String, RawBrowser>,
    features: BTreeMap<String, RawFeature>,
}

#[derive(Debug, Deserialize)]
struct RawBrowser {
    name: String,
    #[serde(default)]
    releases: Vec<RawRelease>,
}

#[derive(Debug, Deserialize)]
struct RawRelease {
    version: String,
    date: String,
}

#[derive(Debug, Deserialize)]
struct RawFeature {
    #[serde(default = "default_kind")]
    kind: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    status: Option<RawStatus>,
    #[serde(default)]
    discouraged: Option<RawDiscouraged>,
    #[serde(default)]
    spec: Option<OneOrMany>,
    #[serde(default)]
    caniuse: Option<OneOrMany>,
    #[serde(default)]
    redirect_target: Option<String>,
    #[serde(default)]
    redirect_targets: Option<Vec<String>>,
}

fn default_kind() -> String {
    "feature".to_string()
}

#[derive(Debug, Deserialize)]
struct RawStatus {
    baseline: BaselineFlag,
    #[serde(default)]
    baseline_low_date: Option<String>,
    #[serde(default)]
    baseline_high_date: Option<String>,
    #[serde(default)]
    support: BTreeMap<String, String>,
}

/// `baseline` is `false`, `"low"` or `"high"`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum BaselineFlag {
    Flag(bool),
    Level(String),
}

#[derive(Debug, Deserialize)]
struct RawDiscouraged {
    #[serde(default)]
    according_to: Vec<String>,
    #[serde(default)]
    alternatives: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl From<OneOrMany> for Vec<String> {
    fn from(value: OneOrMany) -> Self {
        match value {
            OneOrMany::One(s) => vec![s],
            OneOrMany::Many(v) => v,
        }
    }
}

impl RawFeature {
    fn into_record(self, id: String) -> Result<FeatureRecord, CatalogError> {
        let malformed = |reason: &str| CatalogError::Malformed {
            id: id.clone(),
            reason: reason.to_string(),
        };

        let kind = match self.kind.as_str() {
            "feature" => FeatureKind::Normal,
            "moved" => FeatureKind::Moved {
                to: self
                    .redirect_target
                    .ok_or_else(|| malformed("moved entry without redirect_target"))?,
            },
            "split" => FeatureKind::Split {
                to: self
                    .redirect_targets
                    .ok_or_else(|| malformed("split entry without redirect_targets"))?,
            },
            other => FeatureKind::Unknown {
                tag: other.to_string(),
            },
        };

        if kind != FeatureKind::Normal {
            let mut record = FeatureRecord::new(id.clone(), self.name.unwrap_or(id));
            record.kind = kind;
            return Ok(record);
        }

        let name = self.name.ok_or_else(|| malformed("feature without name"))?;
        let status = self.status.ok_or_else(|| malformed("feature without status"))?;
        let baseline = match status.baseline {
            BaselineFlag::Flag(false) => Baseline::None,
            BaselineFlag::Level(level) if level == "low" => Baseline::Low {
                since: status.baseline_low_date,
            },
            BaselineFlag::Level(level) if level == "high" => Baseline::High {
                since: status.baseline_high_date,
            },
            _ => return Err(malformed("unrecognized baseline value")),
        };

        Ok(FeatureRecord {
            id,
            name,
            description: self.description.unwrap_or_default(),
            kind,
            discouraged: self.discouraged.map(|d| Discouraged {
                according_to: d.according_to,
                alternatives: d.alternatives,
            }),
            baseline,
            support: status.support,
            spec: self.spec.map(Into::into).unwrap_or_default(),
            caniuse: self.caniuse.map(Into::into).unwrap_or_default(),
        })
    }
}
