use crate::domain::error::{Error, Result};
use crate::domain::list::{ListId, TodoList};
use crate::domain::store::Store;
use crate::domain::todo::{Todo, TodoId};
use crate::domain::user::UserId;

use super::sessions::SessionRegistry;

/// How an ownership failure is reported to the caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OwnershipPolicy {
    /// An entity owned by someone else looks absent (anti-enumeration).
    #[default]
    Conceal,
    /// Owned-by-someone-else is reported as `Unauthorized`, distinct from
    /// a genuinely missing entity.
    Distinguish,
}

/// The single authorization capability. Every service operation resolves
/// the session and checks ownership through here before touching or
/// returning any list or todo.
#[derive(Clone)]
pub struct AccessGuard<R: Store> {
    sessions: SessionRegistry,
    store: R,
    policy: OwnershipPolicy,
}

impl<R: Store> AccessGuard<R> {
    pub fn new(sessions: SessionRegistry, store: R) -> Self {
        Self::with_policy(sessions, store, OwnershipPolicy::default())
    }

    pub fn with_policy(sessions: SessionRegistry, store: R, policy: OwnershipPolicy) -> Self {
        Self { sessions, store, policy }
    }

    pub fn sessions(&self) -> &SessionRegistry {
        &self.sessions
    }

    /// Resolves the session only; for operations that target no specific
    /// entity yet (list creation, listing).
    pub fn user(&self, token: &str) -> Result<UserId> {
        self.sessions.resolve(token)
    }

    pub async fn list_access(&self, token: &str, list_id: ListId) -> Result<TodoList> {
        let user_id = self.sessions.resolve(token)?;
        let Some(list) = self.store.get_list(list_id).await? else {
            return Err(Error::NotFound);
        };
        if list.user_id != user_id {
            return Err(self.foreign());
        }
        Ok(list)
    }

    /// Todo ownership runs through the parent list.
    pub async fn todo_access(&self, token: &str, todo_id: TodoId) -> Result<(TodoList, Todo)> {
        let user_id = self.sessions.resolve(token)?;
        let Some(todo) = self.store.get_todo(todo_id).await? else {
            return Err(Error::NotFound);
        };
        let Some(list) = self.store.get_list(todo.list_id).await? else {
            // Orphaned todo; cascade should make this unreachable.
            return Err(Error::NotFound);
        };
        if list.user_id != user_id {
            return Err(self.foreign());
        }
        Ok((list, todo))
    }

    fn foreign(&self) -> Error {
        match self.policy {
            OwnershipPolicy::Conceal => Error::NotFound,
            OwnershipPolicy::Distinguish => Error::Unauthorized,
        }
    }
}
