use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::user::UserId;

pub const DEFAULT_COLOR: &str = "#6b7280";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct ListId(pub Uuid);

impl Default for ListId {
    fn default() -> Self { Self(Uuid::new_v4()) }
}

/// A named todo list. `position` is this list's rank among the owner's
/// lists: contiguous, zero-based, unique per owner.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct TodoList {
    pub id: ListId,
    #[serde(skip)]
    pub user_id: UserId,
    pub name: String,
    pub color: String,
    pub position: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateList {
    pub name: String,
    pub color: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateList {
    pub name: Option<String>,
    pub color: Option<String>,
}
