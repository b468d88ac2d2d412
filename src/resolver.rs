use std::time::Duration;
use tokio::time::timeout;
use tracing::{info, instrument};

use crate::configuration::{MirrorSettings, ResolverSettings};
use crate::domain::{ExtractionError, ResolvedStream, VideoId};
use crate::mirrors::{
    MirrorClient, MirrorSelector, NormalizeError, SelectorError, normalize,
};

/// The whole pipeline: extract an id, select a mirror, normalize its
/// response. Holds no mutable state, so it is freely shared across
/// concurrent requests.
#[derive(Clone)]
pub struct Resolver {
    selector: MirrorSelector,
    overall_deadline: Duration,
}

#[derive(thiserror::Error)]
pub enum ResolveError {
    #[error("the input does not contain a recognizable video reference")]
    InvalidInput(#[from] ExtractionError),
    #[error("no mirror could provide data for this video")]
    MirrorsExhausted(#[from] SelectorError),
    #[error("the mirror response contained no audio stream")]
    NoAudioCandidate(#[from] NormalizeError),
    #[error("resolution did not complete before the overall deadline")]
    DeadlineExceeded,
}

impl std::fmt::Debug for ResolveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl Resolver {
    pub fn new(
        mirrors_cfg: &MirrorSettings,
        resolver_cfg: &ResolverSettings,
    ) -> Result<Self, reqwest::Error> {
        let client = MirrorClient::new(resolver_cfg.timeout_ms, &resolver_cfg.user_agent)?;
        let selector = MirrorSelector::new(client, mirrors_cfg.groups(), resolver_cfg.max_attempts);
        let worst_case = resolver_cfg.timeout_ms
            * resolver_cfg.max_attempts
            * selector.instance_count() as u32;
        tracing::debug!(
            "Worst-case mirror walk is {:?}; overall deadline is {:?}",
            worst_case,
            resolver_cfg.overall_deadline_ms
        );
        Ok(Self {
            selector,
            overall_deadline: resolver_cfg.overall_deadline_ms,
        })
    }

    /// Cap on one whole resolution. Without it the worst case is
    /// per-attempt timeout x max_attempts x instance count; the deadline
    /// bounds a resolution independently of how the mirror walk goes.
    pub fn overall_deadline(&self) -> Duration {
        self.overall_deadline
    }

    /// Resolves a video reference (URL, short link, embed link or raw id)
    /// into a playable audio stream plus metadata. One typed failure or one
    /// complete result; never anything partial.
    #[instrument(name = "Resolving video reference", skip(self))]
    pub async fn resolve(&self, input: &str) -> Result<ResolvedStream, ResolveError> {
        let id = VideoId::extract(input)?;
        self.resolve_id(id).await
    }

    /// Free-text variant: a mirror search produces the id, then the
    /// ordinary pipeline takes over.
    #[instrument(name = "Resolving search query", skip(self))]
    pub async fn resolve_query(&self, query: &str) -> Result<ResolvedStream, ResolveError> {
        let id = timeout(self.overall_deadline, self.selector.search(query))
            .await
            .map_err(|_| ResolveError::DeadlineExceeded)??;
        info!(%id, "search query mapped to a video id");
        self.resolve_id(id).await
    }

    async fn resolve_id(&self, id: VideoId) -> Result<ResolvedStream, ResolveError> {
        let response = timeout(self.overall_deadline, self.selector.resolve_raw(&id))
            .await
            .map_err(|_| ResolveError::DeadlineExceeded)??;
        let stream = normalize(
            &response.body,
            id,
            Some(response.instance.to_string()),
        )?;
        Ok(stream)
    }
}

pub(crate) fn error_chain_fmt(
    e: &impl std::error::Error,
    f: &mut std::fmt::Formatter<'_>,
) -> std::fmt::Result {
    writeln!(f, "{}\n", e)?;
    let mut current = e.source();
    while let Some(cause) = current {
        writeln!(f, "Caused by:\n\t{}", cause)?;
        current = cause.source();
    }
    Ok(())
}
