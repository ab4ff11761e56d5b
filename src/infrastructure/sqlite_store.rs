use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Pool, Row, Sqlite};
use uuid::Uuid;

use crate::domain::error::{Error, Result};
use crate::domain::list::{CreateList, ListId, TodoList, UpdateList, DEFAULT_COLOR};
use crate::domain::ordering;
use crate::domain::store::Store;
use crate::domain::todo::{CreateTodo, Priority, Todo, TodoFilter, TodoId, UpdateTodo};
use crate::domain::user::{User, UserId};

#[derive(Clone)]
pub struct SqliteStore {
    pool: Arc<Pool<Sqlite>>,
}

impl SqliteStore {
    pub async fn connect(database_url: &str) -> anyhow::Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true);
        // A pooled in-memory database is one database per connection, so
        // memory URLs get a single connection.
        let max_connections = if database_url.contains(":memory:") { 1 } else { 5 };
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;
        Ok(Self { pool: Arc::new(pool) })
    }
}

#[async_trait]
impl Store for SqliteStore {
    async fn init(&self) -> Result<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                email TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,
                created_at TEXT NOT NULL
            )",
        )
        .execute(&*self.pool)
        .await?;
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS lists (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                name TEXT NOT NULL,
                color TEXT NOT NULL,
                position INTEGER NOT NULL,
                created_at TEXT NOT NULL
            )",
        )
        .execute(&*self.pool)
        .await?;
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS todos (
                id TEXT PRIMARY KEY,
                list_id TEXT NOT NULL REFERENCES lists(id) ON DELETE CASCADE,
                title TEXT NOT NULL,
                notes TEXT,
                due_date TEXT,
                priority TEXT NOT NULL,
                completed INTEGER NOT NULL DEFAULT 0,
                position INTEGER NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
        )
        .execute(&*self.pool)
        .await?;
        sqlx::query("CREATE INDEX IF NOT EXISTS idx_lists_user ON lists(user_id, position)")
            .execute(&*self.pool)
            .await?;
        sqlx::query("CREATE INDEX IF NOT EXISTS idx_todos_list ON todos(list_id, position)")
            .execute(&*self.pool)
            .await?;
        Ok(())
    }

    async fn create_user(&self, email: &str, password_hash: &str) -> Result<User> {
        let now = Utc::now();
        let id = UserId(Uuid::new_v4());
        sqlx::query(
            "INSERT INTO users (id, email, password_hash, created_at) VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(id.0.to_string())
        .bind(email)
        .bind(password_hash)
        .bind(now.to_rfc3339())
        .execute(&*self.pool)
        .await?;
        Ok(User {
            id,
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            created_at: now,
        })
    }

    async fn user_by_email(&self, email: &str) -> Result<Option<User>> {
        let row = sqlx::query(
            "SELECT id, email, password_hash, created_at FROM users WHERE email = ?1",
        )
        .bind(email)
        .fetch_optional(&*self.pool)
        .await?;
        row.map(|r| row_to_user(&r)).transpose()
    }

    async fn delete_user(&self, id: UserId) -> Result<bool> {
        // ON DELETE CASCADE takes lists and todos with it.
        let result = sqlx::query("DELETE FROM users WHERE id = ?1")
            .bind(id.0.to_string())
            .execute(&*self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn create_list(&self, user_id: UserId, input: CreateList) -> Result<TodoList> {
        let mut tx = self.pool.begin().await?;
        let siblings: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM lists WHERE user_id = ?1")
            .bind(user_id.0.to_string())
            .fetch_one(&mut *tx)
            .await?;
        let now = Utc::now();
        let list = TodoList {
            id: ListId(Uuid::new_v4()),
            user_id,
            name: input.name,
            color: input.color.unwrap_or_else(|| DEFAULT_COLOR.to_string()),
            position: ordering::append_position(siblings as usize),
            created_at: now,
        };
        sqlx::query(
            "INSERT INTO lists (id, user_id, name, color, position, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .bind(list.id.0.to_string())
        .bind(user_id.0.to_string())
        .bind(&list.name)
        .bind(&list.color)
        .bind(list.position)
        .bind(now.to_rfc3339())
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(list)
    }

    async fn get_list(&self, id: ListId) -> Result<Option<TodoList>> {
        let row = sqlx::query(
            "SELECT id, user_id, name, color, position, created_at FROM lists WHERE id = ?1",
        )
        .bind(id.0.to_string())
        .fetch_optional(&*self.pool)
        .await?;
        row.map(|r| row_to_list(&r)).transpose()
    }

    async fn lists_for_user(&self, user_id: UserId) -> Result<Vec<TodoList>> {
        // created_at is the tie break should positions ever collide.
        let rows = sqlx::query(
            "SELECT id, user_id, name, color, position, created_at FROM lists
             WHERE user_id = ?1 ORDER BY position, created_at",
        )
        .bind(user_id.0.to_string())
        .fetch_all(&*self.pool)
        .await?;
        rows.iter().map(row_to_list).collect()
    }

    async fn update_list(&self, id: ListId, input: UpdateList) -> Result<Option<TodoList>> {
        let Some(mut list) = self.get_list(id).await? else { return Ok(None) };
        if let Some(name) = input.name {
            list.name = name;
        }
        if let Some(color) = input.color {
            list.color = color;
        }
        sqlx::query("UPDATE lists SET name = ?2, color = ?3 WHERE id = ?1")
            .bind(id.0.to_string())
            .bind(&list.name)
            .bind(&list.color)
            .execute(&*self.pool)
            .await?;
        Ok(Some(list))
    }

    async fn delete_list(&self, id: ListId) -> Result<bool> {
        let mut tx = self.pool.begin().await?;
        let row = sqlx::query("SELECT user_id, position FROM lists WHERE id = ?1")
            .bind(id.0.to_string())
            .fetch_optional(&mut *tx)
            .await?;
        let Some(row) = row else { return Ok(false) };
        let user_id: String = row.get("user_id");
        let position: i64 = row.get("position");
        sqlx::query("DELETE FROM lists WHERE id = ?1")
            .bind(id.0.to_string())
            .execute(&mut *tx)
            .await?;
        sqlx::query(
            "UPDATE lists SET position = position - 1 WHERE user_id = ?1 AND position > ?2",
        )
        .bind(&user_id)
        .bind(position)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(true)
    }

    async fn move_list(&self, id: ListId, to: usize) -> Result<TodoList> {
        let mut tx = self.pool.begin().await?;
        let row = sqlx::query(
            "SELECT id, user_id, name, color, position, created_at FROM lists WHERE id = ?1",
        )
        .bind(id.0.to_string())
        .fetch_optional(&mut *tx)
        .await?;
        let Some(row) = row else { return Err(Error::NotFound) };
        let mut list = row_to_list(&row)?;
        let user_id = list.user_id.0.to_string();
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM lists WHERE user_id = ?1")
            .bind(&user_id)
            .fetch_one(&mut *tx)
            .await?;
        let to = ordering::clamp_target(count as usize, to) as i64;
        let from = list.position;
        if to != from {
            // Close the old slot, open the new one, drop the entity in.
            sqlx::query(
                "UPDATE lists SET position = position - 1
                 WHERE user_id = ?1 AND position > ?2 AND id != ?3",
            )
            .bind(&user_id)
            .bind(from)
            .bind(id.0.to_string())
            .execute(&mut *tx)
            .await?;
            sqlx::query(
                "UPDATE lists SET position = position + 1
                 WHERE user_id = ?1 AND position >= ?2 AND id != ?3",
            )
            .bind(&user_id)
            .bind(to)
            .bind(id.0.to_string())
            .execute(&mut *tx)
            .await?;
            sqlx::query("UPDATE lists SET position = ?2 WHERE id = ?1")
                .bind(id.0.to_string())
                .bind(to)
                .execute(&mut *tx)
                .await?;
            list.position = to;
        }
        let positions: Vec<i64> =
            sqlx::query_scalar("SELECT position FROM lists WHERE user_id = ?1 ORDER BY position")
                .bind(&user_id)
                .fetch_all(&mut *tx)
                .await?;
        if !ordering::is_packed(&positions) {
            tx.rollback().await?;
            return Err(Error::ConflictOnReorder);
        }
        tx.commit().await?;
        Ok(list)
    }

    async fn create_todo(&self, list_id: ListId, input: CreateTodo) -> Result<Todo> {
        let mut tx = self.pool.begin().await?;
        let siblings: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM todos WHERE list_id = ?1")
            .bind(list_id.0.to_string())
            .fetch_one(&mut *tx)
            .await?;
        let now = Utc::now();
        let todo = Todo {
            id: TodoId(Uuid::new_v4()),
            list_id,
            title: input.title,
            notes: input.notes,
            due_date: input.due_date,
            priority: input.priority.unwrap_or_default(),
            completed: false,
            position: ordering::append_position(siblings as usize),
            created_at: now,
            updated_at: now,
        };
        sqlx::query(
            "INSERT INTO todos (id, list_id, title, notes, due_date, priority, completed,
                                position, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        )
        .bind(todo.id.0.to_string())
        .bind(list_id.0.to_string())
        .bind(&todo.title)
        .bind(&todo.notes)
        .bind(todo.due_date.map(|d| d.to_rfc3339()))
        .bind(todo.priority.as_str())
        .bind(todo.completed)
        .bind(todo.position)
        .bind(now.to_rfc3339())
        .bind(now.to_rfc3339())
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(todo)
    }

    async fn get_todo(&self, id: TodoId) -> Result<Option<Todo>> {
        let row = sqlx::query(&format!("{TODO_COLUMNS} WHERE id = ?1"))
            .bind(id.0.to_string())
            .fetch_optional(&*self.pool)
            .await?;
        row.map(|r| row_to_todo(&r)).transpose()
    }

    async fn find_todos(&self, list_id: ListId, filter: &TodoFilter) -> Result<Vec<Todo>> {
        // Pure read. instr() gives substring semantics without LIKE
        // wildcard surprises; created_at breaks position ties.
        let text = filter.text.as_deref().unwrap_or("").trim().to_lowercase();
        let priority = filter.priority.map(|p| p.as_str()).unwrap_or("");
        let rows = sqlx::query(&format!(
            "{TODO_COLUMNS}
             WHERE list_id = ?1
               AND (?2 = '' OR instr(lower(title), ?2) > 0)
               AND (?3 = '' OR priority = ?3)
             ORDER BY position, created_at"
        ))
        .bind(list_id.0.to_string())
        .bind(text)
        .bind(priority)
        .fetch_all(&*self.pool)
        .await?;
        rows.iter().map(row_to_todo).collect()
    }

    async fn update_todo(&self, id: TodoId, input: UpdateTodo) -> Result<Option<Todo>> {
        let Some(mut todo) = self.get_todo(id).await? else { return Ok(None) };
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
        sqlx::query(
            "UPDATE todos SET title = ?2, notes = ?3, due_date = ?4, priority = ?5,
                              completed = ?6, updated_at = ?7
             WHERE id = ?1",
        )
        .bind(id.0.to_string())
        .bind(&todo.title)
        .bind(&todo.notes)
        .bind(todo.due_date.map(|d| d.to_rfc3339()))
        .bind(todo.priority.as_str())
        .bind(todo.completed)
        .bind(todo.updated_at.to_rfc3339())
        .execute(&*self.pool)
        .await?;
        Ok(Some(todo))
    }

    async fn delete_todo(&self, id: TodoId) -> Result<bool> {
        let mut tx = self.pool.begin().await?;
        let row = sqlx::query("SELECT list_id, position FROM todos WHERE id = ?1")
            .bind(id.0.to_string())
            .fetch_optional(&mut *tx)
            .await?;
        let Some(row) = row else { return Ok(false) };
        let list_id: String = row.get("list_id");
        let position: i64 = row.get("position");
        sqlx::query("DELETE FROM todos WHERE id = ?1")
            .bind(id.0.to_string())
            .execute(&mut *tx)
            .await?;
        sqlx::query(
            "UPDATE todos SET position = position - 1 WHERE list_id = ?1 AND position > ?2",
        )
        .bind(&list_id)
        .bind(position)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(true)
    }

    async fn move_todo(&self, id: TodoId, to: usize) -> Result<Todo> {
        let mut tx = self.pool.begin().await?;
        let row = sqlx::query(&format!("{TODO_COLUMNS} WHERE id = ?1"))
            .bind(id.0.to_string())
            .fetch_optional(&mut *tx)
            .await?;
        let Some(row) = row else { return Err(Error::NotFound) };
        let mut todo = row_to_todo(&row)?;
        let list_id = todo.list_id.0.to_string();
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM todos WHERE list_id = ?1")
            .bind(&list_id)
            .fetch_one(&mut *tx)
            .await?;
        let to = ordering::clamp_target(count as usize, to) as i64;
        let from = todo.position;
        if to != from {
            sqlx::query(
                "UPDATE todos SET position = position - 1
                 WHERE list_id = ?1 AND position > ?2 AND id != ?3",
            )
            .bind(&list_id)
            .bind(from)
            .bind(id.0.to_string())
            .execute(&mut *tx)
            .await?;
            sqlx::query(
                "UPDATE todos SET position = position + 1
                 WHERE list_id = ?1 AND position >= ?2 AND id != ?3",
            )
            .bind(&list_id)
            .bind(to)
            .bind(id.0.to_string())
            .execute(&mut *tx)
            .await?;
            sqlx::query("UPDATE todos SET position = ?2 WHERE id = ?1")
                .bind(id.0.to_string())
                .bind(to)
                .execute(&mut *tx)
                .await?;
            todo.position = to;
        }
        let positions: Vec<i64> =
            sqlx::query_scalar("SELECT position FROM todos WHERE list_id = ?1 ORDER BY position")
                .bind(&list_id)
                .fetch_all(&mut *tx)
                .await?;
        if !ordering::is_packed(&positions) {
            tx.rollback().await?;
            return Err(Error::ConflictOnReorder);
        }
        tx.commit().await?;
        Ok(todo)
    }
}

const TODO_COLUMNS: &str = "SELECT id, list_id, title, notes, due_date, priority, completed,
                                   position, created_at, updated_at FROM todos";

fn row_to_user(row: &SqliteRow) -> Result<User> {
    Ok(User {
        id: UserId(parse_uuid(&row.get::<String, _>("id"))?),
        email: row.get("email"),
        password_hash: row.get("password_hash"),
        created_at: parse_ts(&row.get::<String, _>("created_at"))?,
    })
}

fn row_to_list(row: &SqliteRow) -> Result<TodoList> {
    Ok(TodoList {
        id: ListId(parse_uuid(&row.get::<String, _>("id"))?),
        user_id: UserId(parse_uuid(&row.get::<String, _>("user_id"))?),
        name: row.get("name"),
        color: row.get("color"),
        position: row.get("position"),
        created_at: parse_ts(&row.get::<String, _>("created_at"))?,
    })
}

fn row_to_todo(row: &SqliteRow) -> Result<Todo> {
    let due_date: Option<String> = row.get("due_date");
    let priority: String = row.get("priority");
    Ok(Todo {
        id: TodoId(parse_uuid(&row.get::<String, _>("id"))?),
        list_id: ListId(parse_uuid(&row.get::<String, _>("list_id"))?),
        title: row.get("title"),
        notes: row.get("notes"),
        due_date: due_date.as_deref().map(parse_ts).transpose()?,
        priority: Priority::parse(&priority).unwrap_or_default(),
        completed: row.get("completed"),
        position: row.get("position"),
        created_at: parse_ts(&row.get::<String, _>("created_at"))?,
        updated_at: parse_ts(&row.get::<String, _>("updated_at"))?,
    })
}

fn parse_uuid(s: &str) -> Result<Uuid> {
    Uuid::parse_str(s).map_err(|e| Error::Internal(anyhow::Error::new(e)))
}

fn parse_ts(s: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|d| d.with_timezone(&Utc))
        .map_err(|e| Error::Internal(anyhow::Error::new(e)))
}
