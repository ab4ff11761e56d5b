pub mod auth;
pub mod lists;
pub mod todos;

use axum::{routing::get, Router};

use crate::domain::store::Store;

use super::AppState;

pub fn app<R: Store>(state: AppState<R>) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .merge(auth::router(state.clone()))
        .merge(lists::router(state.clone()))
        .merge(todos::router(state))
}
