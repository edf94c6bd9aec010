pub mod corrections;
pub mod health;
pub mod web;

use axum::Router;

use crate::state::AppState;

/// Build the `/api` route tree.
///
/// ```text
/// /health                 service, store and model status
/// /corrections            list, create
/// /corrections/{id}       get, delete
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .nest("/corrections", corrections::router())
}
