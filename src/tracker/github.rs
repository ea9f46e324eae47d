//! GitHub REST API client.
//!
//! Issues are listed page by page as the stream is polled, 100 per page,
//! until a short page comes back.

use async_trait::async_trait;
use futures::stream::{self, StreamExt, TryStreamExt};
use reqwest::header::{ACCEPT, USER_AGENT};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::{IssueStream, IssueTracker, TrackerError};
use crate::models::*;

const PER_PAGE: usize = 100;
const USER_AGENT_VALUE: &str = concat!("feature-signals/", env!("CARGO_PKG_VERSION"));
const GITHUB_JSON: &str = "application/vnd.github+json";

#[derive(Debug, Clone)]
pub struct GitHubClient {
    base_url: String,
    repository: String,
    token: Option<String>,
    client: Client,
}

impl GitHubClient {
    /// `base_url` is the API root (`https://api.github.com`), `repository`
    /// is `owner/name`.
    pub fn new(
        base_url: impl Into<String>,
        repository: impl Into<String>,
        token: Option<String>,
    ) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            repository: repository.into(),
            token,
            client: Client::new(),
        }
    }

    /// Build a request with GitHub headers and optional auth.
    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}/repos/{}{}", self.base_url, self.repository, path);
        let mut req = self
            .client
            .request(method, &url)
            .header(USER_AGENT, USER_AGENT_VALUE)
            .header(ACCEPT, GITHUB_JSON);
        if let Some(ref token) = self.token {
            req = req.bearer_auth(token);
        }
        req
    }

    /// Handle response, converting HTTP errors to TrackerError.
    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, TrackerError> {
        let status = response.status();
        if status.is_success() {
            Ok(response.json().await?)
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(status_error(status, body))
        }
    }

    /// One page of issues. Also returns the raw entry count, which includes
    /// pull requests, so the caller can tell whether more pages follow.
    async fn fetch_page(
        &self,
        label: &str,
        page: usize,
    ) -> Result<(Vec<TrackedIssue>, usize), TrackerError> {
        tracing::debug!(label, page, "Fetching issue page");
        let response = self
            .request(reqwest::Method::GET, "/issues")
            .query(&[
                ("labels", label.to_string()),
                ("state", "open".to_string()),
                ("per_page", PER_PAGE.to_string()),
                ("page", page.to_string()),
            ])
            .send()
            .await?;
        let raw: Vec<RawIssue> = self.handle_response(response).await?;
        let count = raw.len();
        let issues = raw
            .into_iter()
            .filter(|issue| issue.pull_request.is_none())
            .map(RawIssue::into_tracked)
            .collect();
        Ok((issues, count))
    }
}

fn status_error(status: StatusCode, body: String) -> TrackerError {
    match status {
        StatusCode::NOT_FOUND => TrackerError::NotFound(body),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => TrackerError::Unauthorized,
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => TrackerError::Rejected(body),
        _ => TrackerError::Server(format!("{}: {}", status, body)),
    }
}

#[async_trait]
impl IssueTracker for GitHubClient {
    fn list_issues<'a>(&'a self, label: &'a str) -> IssueStream<'a> {
        stream::try_unfold(Some(1usize), move |page| async move {
            let Some(page) = page else {
                return Ok::<_, TrackerError>(None);
            };
            let (issues, count) = self.fetch_page(label, page).await?;
            let next = (count >= PER_PAGE).then_some(page + 1);
            Ok(Some((issues, next)))
        })
        .map_ok(|issues| stream::iter(issues.into_iter().map(Ok::<_, TrackerError>)))
        .try_flatten()
        .boxed()
    }

    async fn create_issue(&self, issue: &NewIssue) -> Result<CreatedIssue, TrackerError> {
        let response = self
            .request(reqwest::Method::POST, "/issues")
            .json(issue)
            .send()
            .await?;
        let created: RawCreated = self.handle_response(response).await?;
        Ok(CreatedIssue {
            number: created.number,
            url: created.html_url,
        })
    }

    async fn update_issue(&self, number: u64, update: &IssueUpdate) -> Result<(), TrackerError> {
        let response = self
            .request(reqwest::Method::PATCH, &format!("/issues/{}", number))
            .json(update)
            .send()
            .await?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(status_error(status, body))
        }
    }
}

// ============================================================
// Wire types
// ============================================================

#[derive(Debug, Deserialize)]
struct RawIssue {
    number: u64,
    title: String,
    #[serde(default)]
    body: Option<String>,
    html_url: String,
    #[serde(default)]
    reactions: Option<RawReactions>,
    #[serde(default)]
    pull_request: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct RawReactions {
    #[serde(rename = "+1", default)]
    plus_one: u64,
}

#[derive(Debug, Deserialize)]
struct RawCreated {
    number: u64,
    html_url: String,
}

impl RawIssue {
    fn into_tracked(self) -> TrackedIssue {
        TrackedIssue {
            number: self.number,
            title: self.title,
            body: self.body.unwrap_or_default(),
            url: self.html_url,
            votes: self.reactions.map(|r| r.plus_one).unwrap_or(0),
            feature_id: None,
        }
    }
}
