use serde_json::Value;

use crate::domain::{DurationField, ResolvedStream, VideoId};

/// One plausible audio-only asset pulled out of a mirror response.
/// Transient: candidates are compared within a single resolution and
/// discarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioCandidate {
    pub url: String,
    pub bitrate: Option<u64>,
    pub content_length: Option<u64>,
    pub mime_type: Option<String>,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum NormalizeError {
    #[error("the mirror response contained no audio stream candidate")]
    NoAudioCandidate,
}

/// Keys that hold explicit stream lists, per mirror family. `audioStreams`
/// (Piped) is audio-only by construction; the others mix audio and video
/// and get filtered.
const FORMAT_LIST_KEYS: [&str; 3] = ["adaptiveFormats", "formatStreams", "formats"];

const MAX_SCAN_DEPTH: usize = 8;

/// Projects one mirror document into the canonical result, or fails when no
/// audio candidate exists under any discovery strategy. Pure; deterministic
/// for a fixed document.
pub fn normalize(
    raw: &Value,
    video_id: VideoId,
    source_instance: Option<String>,
) -> Result<ResolvedStream, NormalizeError> {
    let winner =
        best_candidate(audio_candidates(raw)).ok_or(NormalizeError::NoAudioCandidate)?;

    Ok(ResolvedStream {
        video_id,
        title: first_string(raw, &["title", "videoTitle", "name"]),
        duration: duration_of(raw),
        thumbnail: thumbnail_of(raw),
        audio_url: winner.url,
        bitrate: winner.bitrate,
        mime_type: winner.mime_type,
        source_instance,
    })
}

/// Candidate discovery, in fixed strategy order; the first strategy that
/// yields anything wins. The structural scan is the last resort for mirror
/// schemas we have never seen.
pub fn audio_candidates(raw: &Value) -> Vec<AudioCandidate> {
    let from_audio_streams = candidates_in_list(raw.get("audioStreams"));
    if !from_audio_streams.is_empty() {
        return from_audio_streams;
    }

    for key in FORMAT_LIST_KEYS {
        let filtered = candidates_in_list(raw.get(key));
        if !filtered.is_empty() {
            return filtered;
        }
    }

    scan_for_candidate(raw, 0).into_iter().collect()
}

/// Deterministic ranking: bitrate, else contentLength, else zero. Strict
/// comparison keeps the first-encountered candidate on ties.
fn best_candidate(candidates: Vec<AudioCandidate>) -> Option<AudioCandidate> {
    let mut best: Option<(u64, AudioCandidate)> = None;
    for candidate in candidates {
        let score = candidate.bitrate.or(candidate.content_length).unwrap_or(0);
        match &best {
            Some((best_score, _)) if score <= *best_score => {}
            _ => best = Some((score, candidate)),
        }
    }
    best.map(|(_, candidate)| candidate)
}

fn candidates_in_list(list: Option<&Value>) -> Vec<AudioCandidate> {
    list.and_then(Value::as_array)
        .map(|entries| entries.iter().filter_map(audio_candidate_from).collect())
        .unwrap_or_default()
}

/// An entry qualifies when it has a string `url` and a `mimeType`/`type`
/// field that marks it as audio.
fn audio_candidate_from(entry: &Value) -> Option<AudioCandidate> {
    let url = entry.get("url")?.as_str()?;
    let mime = entry
        .get("mimeType")
        .or_else(|| entry.get("type"))?
        .as_str()?;
    if !mime.contains("audio") {
        return None;
    }
    Some(AudioCandidate {
        url: url.to_owned(),
        bitrate: u64_lenient(entry.get("bitrate")),
        content_length: u64_lenient(entry.get("contentLength")),
        mime_type: Some(mime.to_owned()),
    })
}

/// Walks the whole document (objects and arrays only) looking for anything
/// candidate-shaped. `serde_json::Value` is a tree, so a depth bound alone
/// keeps the walk finite.
fn scan_for_candidate(value: &Value, depth: usize) -> Option<AudioCandidate> {
    if depth > MAX_SCAN_DEPTH {
        return None;
    }
    match value {
        Value::Object(map) => audio_candidate_from(value)
            .or_else(|| map.values().find_map(|v| scan_for_candidate(v, depth + 1))),
        Value::Array(items) => items.iter().find_map(|v| scan_for_candidate(v, depth + 1)),
        _ => None,
    }
}

/// Invidious encodes numbers like `bitrate` as strings; tolerate both.
fn u64_lenient(value: Option<&Value>) -> Option<u64> {
    let value = value?;
    if let Some(n) = value.as_u64() {
        Some(n)
    } else if let Some(s) = value.as_str() {
        s.parse().ok()
    } else {
        None
    }
}

fn first_string(raw: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|key| raw.get(key).and_then(Value::as_str))
        .map(ToOwned::to_owned)
}

fn duration_of(raw: &Value) -> Option<DurationField> {
    ["duration", "lengthSeconds", "duration_seconds"]
        .iter()
        .find_map(|key| raw.get(key))
        .and_then(|value| {
            if let Some(seconds) = value.as_u64() {
                Some(DurationField::Seconds(seconds))
            } else {
                value.as_str().map(|s| DurationField::Text(s.to_owned()))
            }
        })
}

fn thumbnail_of(raw: &Value) -> Option<String> {
    first_string(raw, &["thumbnailUrl", "thumbnail"]).or_else(|| {
        ["videoThumbnails", "thumbnails"]
            .iter()
            .find_map(|key| raw.get(key))
            .and_then(Value::as_array)
            .and_then(|entries| entries.first())
            .and_then(|entry| entry.get("url"))
            .and_then(Value::as_str)
            .map(ToOwned::to_owned)
    })
}
