use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, put};
use axum::{Json, Router};
use serde::Deserialize;

use crate::application::list_service::ListService;
use crate::domain::error::Error;
use crate::domain::list::{CreateList, ListId, TodoList, UpdateList};
use crate::domain::store::Store;
use crate::http::types::{session_token, ApiError, ApiResult};
use crate::http::AppState;

pub fn router<R: Store>(state: AppState<R>) -> Router {
    Router::new()
        .route("/lists", get(list_lists::<R>).post(create_list::<R>))
        .route(
            "/lists/:id",
            get(get_list::<R>).put(update_list::<R>).delete(delete_list::<R>),
        )
        .route("/lists/:id/move", put(move_list::<R>))
        .with_state(state)
}

#[derive(Deserialize)]
struct MoveBody {
    to: usize,
}

async fn create_list<R: Store>(
    State(state): State<AppState<R>>,
    headers: HeaderMap,
    Json(payload): Json<CreateList>,
) -> ApiResult<Json<TodoList>> {
    let token = session_token(&headers)?;
    Ok(Json(state.lists.create(token, payload).await?))
}

async fn list_lists<R: Store>(
    State(state): State<AppState<R>>,
    headers: HeaderMap,
) -> ApiResult<Json<serde_json::Value>> {
    let token = session_token(&headers)?;
    let lists = state.lists.list(token).await?;
    Ok(Json(serde_json::json!({ "items": lists })))
}

async fn get_list<R: Store>(
    State(state): State<AppState<R>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> ApiResult<Json<TodoList>> {
    let token = session_token(&headers)?;
    Ok(Json(state.lists.get(token, parse_id(&id)?).await?))
}

async fn update_list<R: Store>(
    State(state): State<AppState<R>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(payload): Json<UpdateList>,
) -> ApiResult<Json<TodoList>> {
    let token = session_token(&headers)?;
    Ok(Json(state.lists.update(token, parse_id(&id)?, payload).await?))
}

async fn delete_list<R: Store>(
    State(state): State<AppState<R>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let token = session_token(&headers)?;
    state.lists.delete(token, parse_id(&id)?).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn move_list<R: Store>(
    State(state): State<AppState<R>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(payload): Json<MoveBody>,
) -> ApiResult<Json<TodoList>> {
    let token = session_token(&headers)?;
    Ok(Json(state.lists.move_to(token, parse_id(&id)?, payload.to).await?))
}

fn parse_id(s: &str) -> ApiResult<ListId> {
    uuid::Uuid::parse_str(s)
        .map(ListId)
        .map_err(|_| ApiError(Error::InvalidInput("invalid list id".into())))
}
