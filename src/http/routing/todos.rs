use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, put};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::application::todo_service::TodoService;
use crate::domain::error::Error;
use crate::domain::list::ListId;
use crate::domain::store::Store;
use crate::domain::todo::{CreateTodo, Priority, Todo, TodoFilter, TodoId, UpdateTodo};
use crate::http::types::{session_token, ApiError, ApiResult};
use crate::http::AppState;

pub fn router<R: Store>(state: AppState<R>) -> Router {
    Router::new()
        .route("/lists/:id/todos", get(find_todos::<R>).post(create_todo::<R>))
        .route(
            "/todos/:id",
            get(get_todo::<R>).put(update_todo::<R>).delete(delete_todo::<R>),
        )
        .route("/todos/:id/move", put(move_todo::<R>))
        .with_state(state)
}

#[derive(Deserialize)]
struct CreateBody {
    title: String,
    notes: Option<String>,
    due_date: Option<DateTime<Utc>>,
    priority: Option<String>,
}

#[derive(Deserialize)]
struct UpdateBody {
    title: Option<String>,
    notes: Option<String>,
    due_date: Option<DateTime<Utc>>,
    priority: Option<String>,
    completed: Option<bool>,
}

#[derive(Deserialize)]
struct FindQuery {
    q: Option<String>,
    priority: Option<String>,
}

#[derive(Deserialize)]
struct MoveBody {
    to: usize,
}

async fn create_todo<R: Store>(
    State(state): State<AppState<R>>,
    headers: HeaderMap,
    Path(list_id): Path<String>,
    Json(payload): Json<CreateBody>,
) -> ApiResult<Json<Todo>> {
    let token = session_token(&headers)?;
    let input = CreateTodo {
        title: payload.title,
        notes: payload.notes,
        due_date: payload.due_date,
        priority: payload.priority.as_deref().map(parse_priority).transpose()?,
    };
    Ok(Json(state.todos.create(token, parse_list_id(&list_id)?, input).await?))
}

async fn find_todos<R: Store>(
    State(state): State<AppState<R>>,
    headers: HeaderMap,
    Path(list_id): Path<String>,
    Query(query): Query<FindQuery>,
) -> ApiResult<Json<serde_json::Value>> {
    let token = session_token(&headers)?;
    // Reads are permissive: an unrecognized priority means "no filter".
    let filter = TodoFilter {
        text: query.q,
        priority: query.priority.as_deref().and_then(Priority::parse),
    };
    let todos = state.todos.find(token, parse_list_id(&list_id)?, filter).await?;
    Ok(Json(serde_json::json!({ "items": todos })))
}

async fn get_todo<R: Store>(
    State(state): State<AppState<R>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> ApiResult<Json<Todo>> {
    let token = session_token(&headers)?;
    Ok(Json(state.todos.get(token, parse_id(&id)?).await?))
}

async fn update_todo<R: Store>(
    State(state): State<AppState<R>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(payload): Json<UpdateBody>,
) -> ApiResult<Json<Todo>> {
    let token = session_token(&headers)?;
    // Writes are strict: an unrecognized priority is an input error.
    let input = UpdateTodo {
        title: payload.title,
        notes: payload.notes,
        due_date: payload.due_date,
        priority: payload.priority.as_deref().map(parse_priority).transpose()?,
        completed: payload.completed,
    };
    Ok(Json(state.todos.update(token, parse_id(&id)?, input).await?))
}

async fn delete_todo<R: Store>(
    State(state): State<AppState<R>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let token = session_token(&headers)?;
    state.todos.delete(token, parse_id(&id)?).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn move_todo<R: Store>(
    State(state): State<AppState<R>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(payload): Json<MoveBody>,
) -> ApiResult<Json<Todo>> {
    let token = session_token(&headers)?;
    Ok(Json(state.todos.move_to(token, parse_id(&id)?, payload.to).await?))
}

fn parse_priority(s: &str) -> ApiResult<Priority> {
    Priority::parse(s)
        .ok_or_else(|| ApiError(Error::InvalidInput(format!("unknown priority: {s}"))))
}

fn parse_id(s: &str) -> ApiResult<TodoId> {
    uuid::Uuid::parse_str(s)
        .map(TodoId)
        .map_err(|_| ApiError(Error::InvalidInput("invalid todo id".into())))
}

fn parse_list_id(s: &str) -> ApiResult<ListId> {
    uuid::Uuid::parse_str(s)
        .map(ListId)
        .map_err(|_| ApiError(Error::InvalidInput("invalid list id".into())))
}
