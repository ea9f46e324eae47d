//! The persisted summary of tracker state.
//!
//! A manifest maps each tracked feature to its issue URL and vote count. It
//! is rebuilt from scratch on every run and written as a whole; there is no
//! merging with the previous file.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub url: String,
    pub votes: u64,
}

/// Feature identity → entry, serialized with keys in ascending order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Manifest {
    entries: BTreeMap<String, ManifestEntry>,
}

/// Identities that appeared or disappeared between two manifests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManifestDiff {
    pub added: Vec<String>,
    pub removed: Vec<String>,
}

impl Manifest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: impl Into<String>, url: impl Into<String>, votes: u64) {
        self.entries.insert(
            id.into(),
            ManifestEntry {
                url: url.into(),
                votes,
            },
        );
    }

    pub fn get(&self, id: &str) -> Option<&ManifestEntry> {
        self.entries.get(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn to_json(&self) -> Result<String> {
        let mut json =
            serde_json::to_string_pretty(self).context("Failed to serialize manifest")?;
        json.push('\n');
        Ok(json)
    }

    /// Read a manifest written by [`Manifest::write`]. A missing file reads
    /// as empty.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read manifest {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse manifest {}", path.display()))
    }

    /// Replace the manifest at `path`. The new content is written to a
    /// sibling temporary file and renamed over the old one.
    pub fn write(&self, path: &Path) -> Result<()> {
        let json = self.to_json()?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).context("Failed to create manifest directory")?;
        }

        let mut tmp_name = path.as_os_str().to_owned();
        tmp_name.push(".tmp");
        let tmp = PathBuf::from(tmp_name);
        std::fs::write(&tmp, json)
            .with_context(|| format!("Failed to write {}", tmp.display()))?;
        std::fs::rename(&tmp, path)
            .with_context(|| format!("Failed to replace manifest {}", path.display()))?;

        tracing::info!(path = %path.display(), entries = self.len(), "Wrote manifest");
        Ok(())
    }

    /// What changed going from `previous` to `self`.
    pub fn diff(&self, previous: &Manifest) -> ManifestDiff {
        ManifestDiff {
            added: self
                .entries
                .keys()
                .filter(|id| !previous.entries.contains_key(*id))
                .cloned()
                .collect(),
            removed: previous
                .entries
                .keys()
                .filter(|id| !self.entries.contains_key(*id))
                .cloned()
                .collect(),
        }
    }
}
