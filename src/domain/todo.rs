use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::list::ListId;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct TodoId(pub Uuid);

impl Default for TodoId {
    fn default() -> Self { Self(Uuid::new_v4()) }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    #[default]
    Low,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }

    /// Parses a priority string; anything outside the three known values
    /// yields `None` so callers can decide between "no filter" and an
    /// input error.
    pub fn parse(s: &str) -> Option<Priority> {
        if s.eq_ignore_ascii_case("high") {
            Some(Priority::High)
        } else if s.eq_ignore_ascii_case("medium") {
            Some(Priority::Medium)
        } else if s.eq_ignore_ascii_case("low") {
            Some(Priority::Low)
        } else {
            None
        }
    }
}

/// A todo item. `position` is its rank within the owning list: contiguous,
/// zero-based, unique per list.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Todo {
    pub id: TodoId,
    pub list_id: ListId,
    pub title: String,
    pub notes: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub priority: Priority,
    pub completed: bool,
    pub position: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateTodo {
    pub title: String,
    pub notes: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub priority: Option<Priority>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateTodo {
    pub title: Option<String>,
    pub notes: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub priority: Option<Priority>,
    pub completed: Option<bool>,
}

/// Combinable read-only predicates over a list's todos. Both fields
/// optional; unset means "match any". Filtering never mutates positions.
#[derive(Debug, Clone, Default)]
pub struct TodoFilter {
    pub text: Option<String>,
    pub priority: Option<Priority>,
}

impl TodoFilter {
    pub fn matches(&self, todo: &Todo) -> bool {
        let text_ok = match self.text.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(q) => todo.title.to_lowercase().contains(&q.to_lowercase()),
        };
        let priority_ok = self.priority.map_or(true, |p| todo.priority == p);
        text_ok && priority_ok
    }
}
