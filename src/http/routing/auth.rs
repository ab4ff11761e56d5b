use axum::http::{HeaderMap, StatusCode};
use axum::{extract::State, routing::post, Json, Router};

use crate::application::auth_service::AuthService;
use crate::domain::store::Store;
use crate::domain::user::Credentials;
use crate::http::types::{session_token, ApiResult};
use crate::http::AppState;

pub fn router<R: Store>(state: AppState<R>) -> Router {
    Router::new()
        .route("/auth/register", post(register::<R>))
        .route("/auth/login", post(login::<R>))
        .route("/auth/logout", post(logout::<R>))
        .route("/auth/account", axum::routing::delete(delete_account::<R>))
        .with_state(state)
}

async fn register<R: Store>(
    State(state): State<AppState<R>>,
    Json(payload): Json<Credentials>,
) -> ApiResult<Json<serde_json::Value>> {
    let (user, token) = state.auth.register(payload).await?;
    Ok(Json(serde_json::json!({
        "token": token,
        "user": { "id": user.id.0, "email": user.email },
    })))
}

async fn login<R: Store>(
    State(state): State<AppState<R>>,
    Json(payload): Json<Credentials>,
) -> ApiResult<Json<serde_json::Value>> {
    let (user, token) = state.auth.login(payload).await?;
    Ok(Json(serde_json::json!({
        "token": token,
        "user": { "id": user.id.0, "email": user.email },
    })))
}

async fn logout<R: Store>(
    State(state): State<AppState<R>>,
    headers: HeaderMap,
) -> ApiResult<StatusCode> {
    let token = session_token(&headers)?;
    state.auth.logout(token).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn delete_account<R: Store>(
    State(state): State<AppState<R>>,
    headers: HeaderMap,
) -> ApiResult<StatusCode> {
    let token = session_token(&headers)?;
    state.auth.delete_account(token).await?;
    Ok(StatusCode::NO_CONTENT)
}
