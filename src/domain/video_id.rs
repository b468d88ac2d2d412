use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;
use tracing::instrument;

/// The 11-character identifier YouTube assigns to a video.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct VideoId(String);

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    #[error("no video id could be extracted from the input")]
    InvalidInput,
}

const ID_LEN: usize = 11;

static SHORT_LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"youtu\.be/([0-9A-Za-z_-]{11})").unwrap());
static QUERY_PARAM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[?&]v=([0-9A-Za-z_-]{11})").unwrap());
static PATH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/(?:embed|v|shorts)/([0-9A-Za-z_-]{11})").unwrap());
// An exact 11-character run of the id alphabet, anywhere in the input. Last
// resort only: an unrelated 11-character word is indistinguishable from an
// id at this level, a known false positive.
static BARE_RUN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|[^0-9A-Za-z_-])([0-9A-Za-z_-]{11})(?:[^0-9A-Za-z_-]|$)").unwrap()
});

fn is_raw_id(s: &str) -> bool {
    s.len() == ID_LEN
        && s.bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
}

fn capture_group_1<'a>(re: &Regex, input: &'a str) -> Option<&'a str> {
    re.captures(input)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

impl VideoId {
    /// Accepts an exact raw id, nothing else.
    pub fn parse(s: String) -> Result<Self, ExtractionError> {
        if is_raw_id(s.trim()) {
            Ok(Self(s.trim().to_owned()))
        } else {
            Err(ExtractionError::InvalidInput)
        }
    }

    /// Extracts an id from arbitrary input text: a raw id, a `youtu.be`
    /// short link, a `v=` query parameter, an `/embed/`-style path, or (as
    /// a last resort) any bare 11-character run of the id alphabet.
    #[instrument(name = "Extracting video id", err(level = "debug"))]
    pub fn extract(input: &str) -> Result<Self, ExtractionError> {
        let input = input.trim();
        if is_raw_id(input) {
            return Ok(Self(input.to_owned()));
        }
        capture_group_1(&SHORT_LINK_RE, input)
            .or_else(|| capture_group_1(&QUERY_PARAM_RE, input))
            .or_else(|| capture_group_1(&PATH_RE, input))
            .or_else(|| capture_group_1(&BARE_RUN_RE, input))
            .map(|id| Self(id.to_owned()))
            .ok_or(ExtractionError::InvalidInput)
    }
}

impl AsRef<str> for VideoId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for VideoId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for VideoId {
    type Error = ExtractionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}
