//! Route construction. Entity routes are parameterized on the path segment;
//! handlers resolve the entity from the catalog, so one route group serves
//! all six record types.

use crate::handlers::entity::{create, destroy, list, show, update};
use crate::handlers::ops::{health, ready, version};
use crate::state::AppState;
use axum::{routing::get, Router};

/// GET/POST `/{entity}` and GET/PUT/DELETE `/{entity}/{id}`.
pub fn entity_routes(state: AppState) -> Router {
    Router::new()
        .route("/:segment", get(list).post(create))
        .route("/:segment/:id", get(show).put(update).delete(destroy))
        .with_state(state)
}

/// GET /health, /ready, /version. Static routes take priority over the
/// `/:segment` captures when the routers are merged.
pub fn ops_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/ready", get(ready))
        .route("/version", get(version))
        .with_state(state)
}

/// The full application router.
pub fn app(state: AppState) -> Router {
    ops_routes(state.clone()).merge(entity_routes(state))
}
