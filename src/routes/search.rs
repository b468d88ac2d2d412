use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use tracing::instrument;

use crate::{
    domain::ResolvedStream,
    resolver::{ResolveError, Resolver},
};

#[derive(Deserialize)]
pub struct SearchParams {
    q: String,
}

#[instrument(name = "Resolving a search query", skip_all, fields(query = %params.q))]
pub async fn search(
    State(resolver): State<Resolver>,
    Query(params): Query<SearchParams>,
) -> Result<Json<ResolvedStream>, ResolveError> {
    let stream = resolver.resolve_query(&params.q).await?;
    Ok(Json(stream))
}
