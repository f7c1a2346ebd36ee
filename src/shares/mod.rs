pub mod dto;
pub mod handlers;
pub mod repo;
pub mod token;

use axum::Router;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(handlers::owner_routes())
        .merge(handlers::public_routes())
}
