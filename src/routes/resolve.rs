use axum::{
    Json,
    extract::{Query, State},
    response::Redirect,
};
use serde::Deserialize;
use tracing::{info, instrument};

use crate::{
    domain::ResolvedStream,
    resolver::{ResolveError, Resolver},
};

#[derive(Deserialize)]
pub struct ResolveParams {
    url: String,
}

#[instrument(name = "Resolving a video reference", skip_all, fields(input = %params.url))]
pub async fn resolve(
    State(resolver): State<Resolver>,
    Query(params): Query<ResolveParams>,
) -> Result<Json<ResolvedStream>, ResolveError> {
    let stream = resolver.resolve(&params.url).await?;
    info!(
        "Resolved '{}' to a {}-bps audio stream",
        stream.video_id,
        stream
            .bitrate
            .map_or_else(|| "unknown".into(), |b| b.to_string())
    );
    Ok(Json(stream))
}

/// Redirect variant of `/resolve` for clients that just want to play the
/// stream.
#[instrument(name = "Redirecting to audio stream", skip_all, fields(input = %params.url))]
pub async fn listen(
    State(resolver): State<Resolver>,
    Query(params): Query<ResolveParams>,
) -> Result<Redirect, ResolveError> {
    let stream = resolver.resolve(&params.url).await?;
    Ok(Redirect::temporary(&stream.audio_url))
}
