//! Route definitions for the `/corrections` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::corrections;
use crate::state::AppState;

/// Routes mounted at `/corrections`.
///
/// ```text
/// GET    /        -> list_corrections
/// POST   /        -> create_correction
/// GET    /{id}    -> get_correction
/// DELETE /{id}    -> delete_correction
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(corrections::list_corrections).post(corrections::create_correction),
        )
        .route(
            "/{id}",
            get(corrections::get_correction).delete(corrections::delete_correction),
        )
}
