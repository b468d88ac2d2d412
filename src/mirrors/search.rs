use serde_json::Value;
use tracing::{instrument, warn};

use super::client::FetchError;
use super::selector::{MirrorSelector, SelectorError};
use crate::domain::VideoId;

impl MirrorSelector {
    /// Free-text entry path: asks the mirrors' search endpoint for the
    /// query and returns the first result's video id, under the same group
    /// order and skip/retry policy as metadata resolution.
    #[instrument(name = "Searching for a video id", skip(self))]
    pub async fn search(&self, query: &str) -> Result<VideoId, SelectorError> {
        for group in self.groups.iter() {
            for instance in &group.instances {
                for attempt in 1..=self.max_attempts {
                    match self.client.search(instance, query).await {
                        Ok(results) => {
                            match first_video_id(&results) {
                                Some(id) => return Ok(id),
                                None => {
                                    warn!(
                                        group = %group.name,
                                        instance = %instance.base_url,
                                        "search results carry no video id, moving on"
                                    );
                                }
                            }
                            break;
                        }
                        Err(FetchError::Timeout) => {
                            warn!(
                                group = %group.name,
                                instance = %instance.base_url,
                                attempt,
                                "mirror search timed out"
                            );
                        }
                        Err(e) => {
                            warn!(
                                group = %group.name,
                                instance = %instance.base_url,
                                error = %e,
                                "skipping mirror instance for search"
                            );
                            break;
                        }
                    }
                }
            }
        }
        Err(SelectorError::AllMirrorsExhausted)
    }
}

/// Pulls the first video id out of a search response. Invidious answers
/// with a bare array of entries carrying `videoId`; Piped nests entries
/// under `items` with a relative watch URL, which the ordinary extractor
/// already understands.
fn first_video_id(results: &Value) -> Option<VideoId> {
    let entries = results
        .as_array()
        .or_else(|| results.get("items").and_then(Value::as_array))?;

    entries.iter().find_map(|entry| {
        entry
            .get("videoId")
            .and_then(Value::as_str)
            .and_then(|s| VideoId::parse(s.to_owned()).ok())
            .or_else(|| {
                entry
                    .get("url")
                    .and_then(Value::as_str)
                    .and_then(|url| VideoId::extract(url).ok())
            })
    })
}
