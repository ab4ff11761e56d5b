use async_trait::async_trait;

use crate::domain::error::{Error, Result};
use crate::domain::list::{CreateList, ListId, TodoList, UpdateList};
use crate::domain::store::Store;

use super::guard::AccessGuard;

#[async_trait]
pub trait ListService: Send + Sync + 'static {
    async fn create(&self, token: &str, input: CreateList) -> Result<TodoList>;
    /// The caller's lists in sidebar (position) order.
    async fn list(&self, token: &str) -> Result<Vec<TodoList>>;
    async fn get(&self, token: &str, id: ListId) -> Result<TodoList>;
    async fn update(&self, token: &str, id: ListId, input: UpdateList) -> Result<TodoList>;
    async fn delete(&self, token: &str, id: ListId) -> Result<()>;
    async fn move_to(&self, token: &str, id: ListId, to: usize) -> Result<TodoList>;
}

#[derive(Clone)]
pub struct ListServiceImpl<R: Store> {
    guard: AccessGuard<R>,
    store: R,
}

impl<R: Store> ListServiceImpl<R> {
    pub fn new(guard: AccessGuard<R>, store: R) -> Self {
        Self { guard, store }
    }
}

#[async_trait]
impl<R: Store> ListService for ListServiceImpl<R> {
    async fn create(&self, token: &str, input: CreateList) -> Result<TodoList> {
        let user_id = self.guard.user(token)?;
        if input.name.trim().is_empty() {
            return Err(Error::InvalidInput("list name must not be empty".into()));
        }
        self.store.create_list(user_id, input).await
    }

    async fn list(&self, token: &str) -> Result<Vec<TodoList>> {
        let user_id = self.guard.user(token)?;
        self.store.lists_for_user(user_id).await
    }

    async fn get(&self, token: &str, id: ListId) -> Result<TodoList> {
        self.guard.list_access(token, id).await
    }

    async fn update(&self, token: &str, id: ListId, input: UpdateList) -> Result<TodoList> {
        self.guard.list_access(token, id).await?;
        if let Some(name) = &input.name {
            if name.trim().is_empty() {
                return Err(Error::InvalidInput("list name must not be empty".into()));
            }
        }
        self.store.update_list(id, input).await?.ok_or(Error::NotFound)
    }

    async fn delete(&self, token: &str, id: ListId) -> Result<()> {
        self.guard.list_access(token, id).await?;
        if self.store.delete_list(id).await? {
            Ok(())
        } else {
            Err(Error::NotFound)
        }
    }

    async fn move_to(&self, token: &str, id: ListId, to: usize) -> Result<TodoList> {
        self.guard.list_access(token, id).await?;
        self.store.move_list(id, to).await
    }
}
