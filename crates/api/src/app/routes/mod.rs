use axum::Router;

pub mod camps;
pub mod speakers;
pub mod system;
pub mod talks;

/// Router for every `/api` endpoint.
pub fn router() -> Router {
    Router::new()
        .merge(camps::router())
        .merge(talks::router())
        .merge(speakers::router())
}
