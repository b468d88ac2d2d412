use serde::Serialize;

use super::VideoId;

/// The canonical resolution result. Everything except `video_id` and
/// `audio_url` is best-effort: mirrors disagree on which metadata they
/// expose, and absent stays absent (`null`) rather than becoming a
/// fabricated default.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedStream {
    pub video_id: VideoId,
    pub title: Option<String>,
    pub duration: Option<DurationField>,
    pub thumbnail: Option<String>,
    pub audio_url: String,
    pub bitrate: Option<u64>,
    pub mime_type: Option<String>,
    pub source_instance: Option<String>,
}

/// Mirror families disagree on duration encoding (integer seconds vs a
/// preformatted string); the value passes through as-is.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DurationField {
    Seconds(u64),
    Text(String),
}
