use async_trait::async_trait;

use crate::domain::error::{Error, Result};
use crate::domain::list::ListId;
use crate::domain::store::Store;
use crate::domain::todo::{CreateTodo, Todo, TodoFilter, TodoId, UpdateTodo};

use super::guard::AccessGuard;

#[async_trait]
pub trait TodoService: Send + Sync + 'static {
    async fn create(&self, token: &str, list_id: ListId, input: CreateTodo) -> Result<Todo>;
    async fn get(&self, token: &str, id: TodoId) -> Result<Todo>;
    /// Filtered read over one list, always in ascending position order.
    async fn find(&self, token: &str, list_id: ListId, filter: TodoFilter) -> Result<Vec<Todo>>;
    async fn update(&self, token: &str, id: TodoId, input: UpdateTodo) -> Result<Todo>;
    async fn delete(&self, token: &str, id: TodoId) -> Result<()>;
    async fn move_to(&self, token: &str, id: TodoId, to: usize) -> Result<Todo>;
}

#[derive(Clone)]
pub struct TodoServiceImpl<R: Store> {
    guard: AccessGuard<R>,
    store: R,
}

impl<R: Store> TodoServiceImpl<R> {
    pub fn new(guard: AccessGuard<R>, store: R) -> Self {
        Self { guard, store }
    }
}

#[async_trait]
impl<R: Store> TodoService for TodoServiceImpl<R> {
    async fn create(&self, token: &str, list_id: ListId, input: CreateTodo) -> Result<Todo> {
        self.guard.list_access(token, list_id).await?;
        if input.title.trim().is_empty() {
            return Err(Error::InvalidInput("title must not be empty".into()));
        }
        self.store.create_todo(list_id, input).await
    }

    async fn get(&self, token: &str, id: TodoId) -> Result<Todo> {
        let (_, todo) = self.guard.todo_access(token, id).await?;
        Ok(todo)
    }

    async fn find(&self, token: &str, list_id: ListId, filter: TodoFilter) -> Result<Vec<Todo>> {
        self.guard.list_access(token, list_id).await?;
        self.store.find_todos(list_id, &filter).await
    }

    async fn update(&self, token: &str, id: TodoId, input: UpdateTodo) -> Result<Todo> {
        self.guard.todo_access(token, id).await?;
        if let Some(title) = &input.title {
            if title.trim().is_empty() {
                return Err(Error::InvalidInput("title must not be empty".into()));
            }
        }
        self.store.update_todo(id, input).await?.ok_or(Error::NotFound)
    }

    async fn delete(&self, token: &str, id: TodoId) -> Result<()> {
        self.guard.todo_access(token, id).await?;
        if self.store.delete_todo(id).await? {
            Ok(())
        } else {
            Err(Error::NotFound)
        }
    }

    async fn move_to(&self, token: &str, id: TodoId, to: usize) -> Result<Todo> {
        self.guard.todo_access(token, id).await?;
        self.store.move_todo(id, to).await
    }
}
