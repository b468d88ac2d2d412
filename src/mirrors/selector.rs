use reqwest::Url;
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, instrument, warn};

use super::client::{FetchError, MirrorClient};
use super::normalize;
use crate::domain::VideoId;

/// One mirror endpoint: a base URL plus the path templates of its family.
#[derive(Debug, Clone)]
pub struct MirrorInstance {
    pub base_url: Url,
    pub path_template: String,
    pub search_path: String,
}

impl MirrorInstance {
    pub fn metadata_url(&self, id: &VideoId) -> Option<Url> {
        let path = self
            .path_template
            .replace("{id}", &urlencoding::encode(id.as_ref()));
        self.base_url.join(&path).ok()
    }

    pub fn search_url(&self, query: &str) -> Option<Url> {
        let mut url = self.base_url.join(&self.search_path).ok()?;
        url.query_pairs_mut()
            .append_pair("q", query)
            .append_pair("filter", "videos");
        Some(url)
    }
}

/// A family of mirrors sharing one response schema, tried in instance order.
#[derive(Debug, Clone)]
pub struct MirrorGroup {
    pub name: String,
    pub instances: Vec<MirrorInstance>,
}

/// A raw mirror document tagged with where it came from.
#[derive(Debug)]
pub struct MirrorResponse {
    pub body: Value,
    pub group: String,
    pub instance: Url,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SelectorError {
    #[error("every configured mirror was exhausted without a usable response")]
    AllMirrorsExhausted,
}

/// Drives the mirror client across groups and instances in fixed priority
/// order, stopping at the first structurally usable response (one with at
/// least an extractable audio candidate). Community mirrors disappear and
/// rate-limit routinely; per-instance fetch failures are absorbed here and
/// only full exhaustion surfaces.
#[derive(Clone)]
pub struct MirrorSelector {
    pub(crate) client: MirrorClient,
    pub(crate) groups: Arc<Vec<MirrorGroup>>,
    pub(crate) max_attempts: u32,
}

impl MirrorSelector {
    pub fn new(client: MirrorClient, groups: Vec<MirrorGroup>, max_attempts: u32) -> Self {
        Self {
            client,
            groups: Arc::new(groups),
            max_attempts: max_attempts.max(1),
        }
    }

    pub fn instance_count(&self) -> usize {
        self.groups.iter().map(|group| group.instances.len()).sum()
    }

    #[instrument(name = "Selecting mirror", skip_all, fields(%id))]
    pub async fn resolve_raw(&self, id: &VideoId) -> Result<MirrorResponse, SelectorError> {
        for group in self.groups.iter() {
            for instance in &group.instances {
                if let Some(body) = self.try_instance(group, instance, id).await {
                    info!(
                        group = %group.name,
                        instance = %instance.base_url,
                        "mirror produced a usable response"
                    );
                    return Ok(MirrorResponse {
                        body,
                        group: group.name.clone(),
                        instance: instance.base_url.clone(),
                    });
                }
            }
        }
        Err(SelectorError::AllMirrorsExhausted)
    }

    // Retry table: Timeout may be transient and consumes one bounded
    // attempt; Unreachable and MalformedResponse are deterministic for the
    // same request and skip straight to the next instance. A body that
    // parses but holds no audio candidate also skips: re-asking the same
    // instance cannot change it.
    async fn try_instance(
        &self,
        group: &MirrorGroup,
        instance: &MirrorInstance,
        id: &VideoId,
    ) -> Option<Value> {
        for attempt in 1..=self.max_attempts {
            match self.client.fetch(instance, id).await {
                Ok(body) => {
                    if normalize::audio_candidates(&body).is_empty() {
                        warn!(
                            group = %group.name,
                            instance = %instance.base_url,
                            "response carries no audio candidate, moving on"
                        );
                        return None;
                    }
                    return Some(body);
                }
                Err(FetchError::Timeout) => {
                    warn!(
                        group = %group.name,
                        instance = %instance.base_url,
                        attempt,
                        max_attempts = self.max_attempts,
                        "mirror timed out"
                    );
                }
                Err(e) => {
                    warn!(
                        group = %group.name,
                        instance = %instance.base_url,
                        error = %e,
                        "skipping mirror instance"
                    );
                    return None;
                }
            }
        }
        None
    }
}
