use reqwest::StatusCode;
use serde_json::Value;
use std::time::Duration;
use tracing::instrument;

use super::MirrorInstance;
use crate::domain::VideoId;

/// One metadata request to one mirror instance. Owns the reqwest client so
/// the per-attempt timeout and the user-agent are applied uniformly.
#[derive(Clone)]
pub struct MirrorClient {
    http_client: reqwest::Client,
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum FetchError {
    #[error("mirror did not respond within the configured timeout")]
    Timeout,
    #[error("mirror could not be reached")]
    Unreachable,
    #[error("mirror returned a response that could not be interpreted")]
    MalformedResponse,
    #[error("mirror answered with status {0}")]
    UpstreamError(StatusCode),
}

impl MirrorClient {
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self, reqwest::Error> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;
        Ok(Self { http_client })
    }

    /// Fetches the metadata document for `id` from one instance. A 200 body
    /// only counts as a response if it parses as JSON and carries a
    /// title-like top-level field; anything else is classified so the
    /// caller can decide between retrying and moving on.
    #[instrument(
        name = "Fetching mirror metadata",
        skip_all,
        fields(instance = %instance.base_url, %id),
        err(level = "debug")
    )]
    pub async fn fetch(
        &self,
        instance: &MirrorInstance,
        id: &VideoId,
    ) -> Result<Value, FetchError> {
        // An instance whose template cannot form a URL is as good as down.
        let url = instance.metadata_url(id).ok_or(FetchError::Unreachable)?;
        let body = self.get_json(url).await?;
        if !has_title_like_field(&body) {
            return Err(FetchError::MalformedResponse);
        }
        Ok(body)
    }

    /// Runs a free-text search against one instance. Search responses have
    /// no title-like contract, so only transport and parse classification
    /// applies.
    #[instrument(
        name = "Searching mirror",
        skip_all,
        fields(instance = %instance.base_url, query = %query),
        err(level = "debug")
    )]
    pub async fn search(
        &self,
        instance: &MirrorInstance,
        query: &str,
    ) -> Result<Value, FetchError> {
        let url = instance.search_url(query).ok_or(FetchError::Unreachable)?;
        self.get_json(url).await
    }

    async fn get_json(&self, url: reqwest::Url) -> Result<Value, FetchError> {
        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(classify_transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::UpstreamError(status));
        }

        response.json().await.map_err(classify_body)
    }
}

fn classify_transport(e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout
    } else {
        // Connection refused, DNS, TLS: nothing a retry of the same request
        // would change.
        FetchError::Unreachable
    }
}

fn classify_body(e: reqwest::Error) -> FetchError {
    // The body read can also hit the deadline mid-stream.
    if e.is_timeout() {
        FetchError::Timeout
    } else {
        FetchError::MalformedResponse
    }
}

fn has_title_like_field(body: &Value) -> bool {
    ["title", "videoTitle", "name"]
        .iter()
        .any(|key| body.get(key).is_some_and(Value::is_string))
}
