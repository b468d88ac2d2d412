use axum::response::{IntoResponse, Response};
use hyper::StatusCode;
use tracing::{error, info};

use crate::resolver::ResolveError;

impl IntoResponse for ResolveError {
    fn into_response(self) -> Response {
        // Stable statuses, short fixed messages. Mirror-internal details
        // stay in the logs and never reach the caller.
        match self {
            ResolveError::InvalidInput(_) => {
                info!("Rejected input: {:?}", self);
                (
                    StatusCode::BAD_REQUEST,
                    "not a recognizable YouTube video reference",
                )
                    .into_response()
            }
            ResolveError::NoAudioCandidate(_) => (
                StatusCode::NOT_FOUND,
                "no audio stream was found for this video",
            )
                .into_response(),
            ResolveError::MirrorsExhausted(_) => {
                error!("Mirror walk failed: {:?}", self);
                (
                    StatusCode::BAD_GATEWAY,
                    "no upstream mirror could satisfy the request",
                )
                    .into_response()
            }
            ResolveError::DeadlineExceeded => {
                error!("Resolution deadline exceeded: {:?}", self);
                (
                    StatusCode::BAD_GATEWAY,
                    "resolution did not complete in time",
                )
                    .into_response()
            }
        }
    }
}
