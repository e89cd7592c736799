use std::sync::Arc;

use async_trait::async_trait;
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;

use super::{StoreError, TodoStore, sample_todo};
use crate::ids::IdGenerator;
use crate::models::Todo;

const SQL_CREATE: &str = r#"
    CREATE TABLE IF NOT EXISTS todo (
        id INTEGER PRIMARY KEY,
        title TEXT,
        completed INTEGER,
        "order" INTEGER,
        url TEXT
    )
"#;

const SQL_UPSERT: &str = r#"
    INSERT INTO todo (id, title, completed, "order", url)
    VALUES (?1, ?2, ?3, ?4, ?5)
    ON CONFLICT(id) DO UPDATE SET
        title = excluded.title,
        completed = excluded.completed,
        "order" = excluded."order",
        url = excluded.url
"#;

const SQL_QUERY_ALL: &str = r#"SELECT id, title, completed, "order", url FROM todo"#;

const SQL_QUERY: &str = r#"SELECT id, title, completed, "order", url FROM todo WHERE id = ?1"#;

const SQL_UPDATE: &str = r#"
    UPDATE todo
    SET title = ?1,
        completed = ?2,
        "order" = ?3,
        url = ?4
    WHERE id = ?5
"#;

/// Relational backend over a single `todo` table.
pub struct SqliteTodoStore {
    db: SqlitePool,
    ids: Arc<dyn IdGenerator>,
}

impl SqliteTodoStore {
    /// Wraps an existing pool and makes sure the table exists.
    pub async fn new(db: SqlitePool, ids: Arc<dyn IdGenerator>) -> Result<Self, StoreError> {
        let store = Self { db, ids };
        store.ensure_schema().await?;
        Ok(store)
    }

    pub async fn connect(
        database_url: &str,
        max_connections: u32,
        ids: Arc<dyn IdGenerator>,
    ) -> Result<Self, StoreError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Self::new(pool, ids).await
    }

    async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::query(SQL_CREATE).execute(&self.db).await?;
        Ok(())
    }
}

#[async_trait]
impl TodoStore for SqliteTodoStore {
    fn backend_name(&self) -> &'static str {
        "sqlite"
    }

    fn ids(&self) -> &dyn IdGenerator {
        self.ids.as_ref()
    }

    async fn init_data(&self) -> Result<(), StoreError> {
        self.ensure_schema().await?;
        self.insert(sample_todo(self.ids.next_id())).await?;
        Ok(())
    }

    async fn insert(&self, todo: Todo) -> Result<Todo, StoreError> {
        sqlx::query(SQL_UPSERT)
            .bind(todo.id)
            .bind(&todo.title)
            .bind(todo.completed)
            .bind(todo.order)
            .bind(&todo.url)
            .execute(&self.db)
            .await?;
        Ok(todo)
    }

    async fn get_all(&self) -> Result<Vec<Todo>, StoreError> {
        let todos = sqlx::query_as::<_, Todo>(SQL_QUERY_ALL)
            .fetch_all(&self.db)
            .await?;
        Ok(todos)
    }

    async fn get_certain(&self, id: i64) -> Result<Option<Todo>, StoreError> {
        let todo = sqlx::query_as::<_, Todo>(SQL_QUERY)
            .bind(id)
            .fetch_optional(&self.db)
            .await?;
        Ok(todo)
    }

    // No transaction around the read and the write.
    async fn update(&self, id: i64, incoming: &Todo) -> Result<Option<Todo>, StoreError> {
        let Some(existing) = self.get_certain(id).await? else {
            return Ok(None);
        };
        let merged = existing.merge(incoming);

        sqlx::query(SQL_UPDATE)
            .bind(&merged.title)
            .bind(merged.completed)
            .bind(merged.order)
            .bind(&merged.url)
            .bind(id)
            .execute(&self.db)
            .await?;

        Ok(Some(merged))
    }

    async fn delete(&self, id: i64) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM todo WHERE id = ?1")
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(())
    }

    async fn delete_all(&self) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM todo").execute(&self.db).await?;
        Ok(())
    }
}
