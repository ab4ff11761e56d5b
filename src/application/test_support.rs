//! In-memory `Store` used by the service unit tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;

use crate::domain::error::{Error, Result};
use crate::domain::list::{CreateList, ListId, TodoList, UpdateList, DEFAULT_COLOR};
use crate::domain::ordering;
use crate::domain::store::Store;
use crate::domain::todo::{CreateTodo, Todo, TodoFilter, TodoId, UpdateTodo};
use crate::domain::user::{User, UserId};

#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<State>>,
}

#[derive(Default)]
struct State {
    users: Vec<User>,
    lists: Vec<TodoList>,
    todos: Vec<Todo>,
}

#[async_trait]
impl Store for MemoryStore {
    async fn init(&self) -> Result<()> {
        Ok(())
    }

    async fn create_user(&self, email: &str, password_hash: &str) -> Result<User> {
        let user = User {
            id: UserId::default(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            created_at: Utc::now(),
        };
        self.inner.lock().unwrap().users.push(user.clone());
        Ok(user)
    }

    async fn user_by_email(&self, email: &str) -> Result<Option<User>> {
        let state = self.inner.lock().unwrap();
        Ok(state.users.iter().find(|u| u.email == email).cloned())
    }

    async fn delete_user(&self, id: UserId) -> Result<bool> {
        let mut state = self.inner.lock().unwrap();
        let before = state.users.len();
        state.users.retain(|u| u.id != id);
        let gone: Vec<ListId> = state
            .lists
            .iter()
            .filter(|l| l.user_id == id)
            .map(|l| l.id)
            .collect();
        state.lists.retain(|l| l.user_id != id);
        state.todos.retain(|t| !gone.contains(&t.list_id));
        Ok(state.users.len() < before)
    }

    async fn create_list(&self, user_id: UserId, input: CreateList) -> Result<TodoList> {
        let mut state = self.inner.lock().unwrap();
        let siblings = state.lists.iter().filter(|l| l.user_id == user_id).count();
        let list = TodoList {
            id: ListId::default(),
            user_id,
            name: input.name,
            color: input.color.unwrap_or_else(|| DEFAULT_COLOR.to_string()),
            position: ordering::append_position(siblings),
            created_at: Utc::now(),
        };
        state.lists.push(list.clone());
        Ok(list)
    }

    async fn get_list(&self, id: ListId) -> Result<Option<TodoList>> {
        let state = self.inner.lock().unwrap();
        Ok(state.lists.iter().find(|l| l.id == id).cloned())
    }

    async fn lists_for_user(&self, user_id: UserId) -> Result<Vec<TodoList>> {
        let state = self.inner.lock().unwrap();
        let mut lists: Vec<TodoList> = state
            .lists
            .iter()
            .filter(|l| l.user_id == user_id)
            .cloned()
            .collect();
        lists.sort_by_key(|l| (l.position, l.created_at));
        Ok(lists)
    }

    async fn update_list(&self, id: ListId, input: UpdateList) -> Result<Option<TodoList>> {
        let mut state = self.inner.lock().unwrap();
        let Some(list) = state.lists.iter_mut().find(|l| l.id == id) else {
            return Ok(None);
        };
        if let Some(name) = input.name {
            list.name = name;
        }
        if let Some(color) = input.color {
            list.color = color;
        }
        Ok(Some(list.clone()))
    }

    async fn delete_list(&self, id: ListId) -> Result<bool> {
        let mut state = self.inner.lock().unwrap();
        let Some(removed) = state.lists.iter().find(|l| l.id == id).cloned() else {
            return Ok(false);
        };
        state.lists.retain(|l| l.id != id);
        state.todos.retain(|t| t.list_id != id);
        for list in &mut state.lists {
            if list.user_id == removed.user_id && list.position > removed.position {
                list.position -= 1;
            }
        }
        Ok(true)
    }

    async fn move_list(&self, id: ListId, to: usize) -> Result<TodoList> {
        let mut state = self.inner.lock().unwrap();
        let Some(moved) = state.lists.iter().find(|l| l.id == id).cloned() else {
            return Err(Error::NotFound);
        };
        let count = state
            .lists
            .iter()
            .filter(|l| l.user_id == moved.user_id)
            .count();
        let to = ordering::clamp_target(count, to) as i64;
        let from = moved.position;
        if to != from {
            for list in &mut state.lists {
                if list.user_id != moved.user_id {
                    continue;
                }
                if list.id == id {
                    list.position = to;
                } else {
                    if list.position > from {
                        list.position -= 1;
                    }
                    if list.position >= to {
                        list.position += 1;
                    }
                }
            }
        }
        let mut positions: Vec<i64> = state
            .lists
            .iter()
            .filter(|l| l.user_id == moved.user_id)
            .map(|l| l.position)
            .collect();
        positions.sort_unstable();
        if !ordering::is_packed(&positions) {
            return Err(Error::ConflictOnReorder);
        }
        Ok(state.lists.iter().find(|l| l.id == id).cloned().unwrap())
    }

    async fn create_todo(&self, list_id: ListId, input: CreateTodo) -> Result<Todo> {
        let mut state = self.inner.lock().unwrap();
        let siblings = state.todos.iter().filter(|t| t.list_id == list_id).count();
        let now = Utc::now();
        let todo = Todo {
            id: TodoId::default(),
            list_id,
            title: input.title,
            notes: input.notes,
            due_date: input.due_date,
            priority: input.priority.unwrap_or_default(),
            completed: false,
            position: ordering::append_position(siblings),
            created_at: now,
            updated_at: now,
        };
        state.todos.push(todo.clone());
        Ok(todo)
    }

    async fn get_todo(&self, id: TodoId) -> Result<Option<Todo>> {
        let state = self.inner.lock().unwrap();
        Ok(state.todos.iter().find(|t| t.id == id).cloned())
    }

    async fn find_todos(&self, list_id: ListId, filter: &TodoFilter) -> Result<Vec<Todo>> {
        let state = self.inner.lock().unwrap();
        let mut todos: Vec<Todo> = state
            .todos
            .iter()
            .filter(|t| t.list_id == list_id && filter.matches(t))
            .cloned()
            .collect();
        todos.sort_by_key(|t| (t.position, t.created_at));
        Ok(todos)
    }

    async fn update_todo(&self, id: TodoId, input: UpdateTodo) -> Result<Option<Todo>> {
        let mut state = self.inner.lock().unwrap();
        let Some(todo) = state.todos.iter_mut().find(|t| t.id == id) else {
            return Ok(None);
        };
        if let Some(title) = input.title {
            todo.title = title;
        }
        if let Some(notes) = input.notes {
            todo.notes = Some(notes);
        }
        if let Some(due) = input.due_date {
            todo.due_date = Some(due);
        }
        if let Some(priority) = input.priority {
            todo.priority = priority;
        }
        if let Some(completed) = input.completed {
            todo.completed = completed;
        }
        todo.updated_at = Utc::now();
        Ok(Some(todo.clone()))
    }

    async fn delete_todo(&self, id: TodoId) -> Result<bool> {
        let mut state = self.inner.lock().unwrap();
        let Some(removed) = state.todos.iter().find(|t| t.id == id).cloned() else {
            return Ok(false);
        };
        state.todos.retain(|t| t.id != id);
        for todo in &mut state.todos {
            if todo.list_id == removed.list_id && todo.position > removed.position {
                todo.position -= 1;
            }
        }
        Ok(true)
    }

    async fn move_todo(&self, id: TodoId, to: usize) -> Result<Todo> {
        let mut state = self.inner.lock().unwrap();
        let Some(moved) = state.todos.iter().find(|t| t.id == id).cloned() else {
            return Err(Error::NotFound);
        };
        let count = state
            .todos
            .iter()
            .filter(|t| t.list_id == moved.list_id)
            .count();
        let to = ordering::clamp_target(count, to) as i64;
        let from = moved.position;
        if to != from {
            for todo in &mut state.todos {
                if todo.list_id != moved.list_id {
                    continue;
                }
                if todo.id == id {
                    todo.position = to;
                } else {
                    if todo.position > from {
                        todo.position -= 1;
                    }
                    if todo.position >= to {
                        todo.position += 1;
                    }
                }
            }
        }
        let mut positions: Vec<i64> = state
            .todos
            .iter()
            .filter(|t| t.list_id == moved.list_id)
            .map(|t| t.position)
            .collect();
        positions.sort_unstable();
        if !ordering::is_packed(&positions) {
            return Err(Error::ConflictOnReorder);
        }
        Ok(state.todos.iter().find(|t| t.id == id).cloned().unwrap())
    }
}
