use axum::extract::FromRef;

use crate::resolver::Resolver;

#[derive(Clone)]
pub struct AppState {
    pub resolver: Resolver,
}

impl FromRef<AppState> for Resolver {
    fn from_ref(state: &AppState) -> Self {
        state.resolver.clone()
    }
}
