//! Skip list derived from browser vendors' standards positions.
//!
//! Features that a vendor opposes never get a tracking issue: asking
//! developers to vote for them would be noise. The feed is fetched fresh on
//! every run and any failure aborts the run, since a stale or missing skip
//! list would let opposed features through.

use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;

use crate::config::Config;
use crate::models::*;

/// Standards-position feed errors. All of them abort the run.
#[derive(Debug, Error)]
pub enum PositionError {
    #[error("Failed to fetch standards positions: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Standards positions feed {url} returned {status}")]
    Status { url: String, status: u16 },

    #[error("Failed to parse standards positions: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Where the standards-position feed comes from.
#[async_trait]
pub trait PositionSource: Send + Sync {
    async fn fetch(&self) -> Result<PositionFeed, PositionError>;
}

/// Fetches the feed as a JSON document over HTTP.
#[derive(Debug, Clone)]
pub struct HttpPositionSource {
    url: String,
    client: Client,
}

impl HttpPositionSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            client: Client::new(),
        }
    }
}

#[async_trait]
impl PositionSource for HttpPositionSource {
    async fn fetch(&self) -> Result<PositionFeed, PositionError> {
        tracing::info!(url = %self.url, "Fetching standards positions");
        let response = self.client.get(&self.url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(PositionError::Status {
                url: self.url.clone(),
                status: status.as_u16(),
            });
        }
        let text = response.text().await?;
        Ok(serde_json::from_str(&text)?)
    }
}

/// A feed already in memory.
#[derive(Debug, Clone, Default)]
pub struct StaticPositionSource(pub PositionFeed);

#[async_trait]
impl PositionSource for StaticPositionSource {
    async fn fetch(&self) -> Result<PositionFeed, PositionError> {
        Ok(self.0.clone())
    }
}

/// Decides which positions count as opposition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkipPolicy {
    negative: Vec<String>,
    organizations: Vec<String>,
}

impl SkipPolicy {
    /// `negative` is the position vocabulary that counts as opposition.
    /// An empty `organizations` list accepts positions from anyone.
    pub fn new(negative: Vec<String>, organizations: Vec<String>) -> Self {
        Self {
            negative: negative.into_iter().map(|s| s.to_lowercase()).collect(),
            organizations: organizations.into_iter().map(|s| s.to_lowercase()).collect(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.negative_positions.clone(),
            config.organizations.clone(),
        )
    }

    fn is_negative(&self, position: &StandardsPosition) -> bool {
        let organization = position.organization.to_lowercase();
        let accepted = self.organizations.is_empty() || self.organizations.contains(&organization);
        accepted && self.negative.contains(&position.position.to_lowercase())
    }

    /// Build the skip list for every feature in `feed`.
    pub fn resolve(&self, feed: &PositionFeed) -> SkipList {
        feed.iter()
            .filter_map(|(id, positions)| {
                let reasons: Vec<String> = positions
                    .iter()
                    .filter(|p| self.is_negative(p))
                    .map(describe)
                    .collect();
                if reasons.is_empty() {
                    None
                } else {
                    Some((id.clone(), reasons.join("; ")))
                }
            })
            .collect()
    }
}

fn describe(position: &StandardsPosition) -> String {
    if position.url.is_empty() {
        format!("{} position: {}", position.organization, position.position)
    } else {
        format!(
            "{} position: {} ({})",
            position.organization, position.position, position.url
        )
    }
}

/// Fetch the feed and derive the skip list in one step.
pub async fn resolve_skip_list(
    source: &dyn PositionSource,
    policy: &SkipPolicy,
) -> Result<SkipList, PositionError> {
    let feed = source.fetch().await?;
    let skip_list = policy.resolve(&feed);
    tracing::info!(
        features = feed.len(),
        skipped = skip_list.len(),
        "Resolved skip list"
    );
    Ok(skip_list)
}
