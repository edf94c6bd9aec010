use axum::routing::{get, post};
use axum::Router;

use crate::handlers::web;
use crate::state::AppState;

/// Human-facing pages, mounted at the root.
///
/// ```text
/// GET  /                  -> index
/// POST /correct           -> correct
/// GET  /history           -> history
/// POST /delete/{id}       -> delete (303 to /history)
/// GET  /static/style.css  -> stylesheet
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(web::index))
        .route("/correct", post(web::correct))
        .route("/history", get(web::history))
        .route("/delete/{id}", post(web::delete))
        .route("/static/style.css", get(web::stylesheet))
}
