use async_trait::async_trait;

use super::error::Result;
use super::list::{CreateList, ListId, TodoList, UpdateList};
use super::todo::{CreateTodo, Todo, TodoFilter, TodoId, UpdateTodo};
use super::user::{User, UserId};

/// Persistence seam. Implementations own the position invariant: after any
/// committed call, every parent's children sit at positions {0..n-1}.
/// Delete and move re-pack siblings transactionally; no caller may observe
/// a duplicate or a gap.
#[async_trait]
pub trait Store: Clone + Send + Sync + 'static {
    async fn init(&self) -> Result<()>;

    // users
    async fn create_user(&self, email: &str, password_hash: &str) -> Result<User>;
    async fn user_by_email(&self, email: &str) -> Result<Option<User>>;
    /// Cascades to the user's lists and their todos.
    async fn delete_user(&self, id: UserId) -> Result<bool>;

    // lists
    async fn create_list(&self, user_id: UserId, input: CreateList) -> Result<TodoList>;
    async fn get_list(&self, id: ListId) -> Result<Option<TodoList>>;
    async fn lists_for_user(&self, user_id: UserId) -> Result<Vec<TodoList>>;
    async fn update_list(&self, id: ListId, input: UpdateList) -> Result<Option<TodoList>>;
    async fn delete_list(&self, id: ListId) -> Result<bool>;
    async fn move_list(&self, id: ListId, to: usize) -> Result<TodoList>;

    // todos
    async fn create_todo(&self, list_id: ListId, input: CreateTodo) -> Result<Todo>;
    async fn get_todo(&self, id: TodoId) -> Result<Option<Todo>>;
    async fn find_todos(&self, list_id: ListId, filter: &TodoFilter) -> Result<Vec<Todo>>;
    async fn update_todo(&self, id: TodoId, input: UpdateTodo) -> Result<Option<Todo>>;
    async fn delete_todo(&self, id: TodoId) -> Result<bool>;
    async fn move_todo(&self, id: TodoId, to: usize) -> Result<Todo>;
}
