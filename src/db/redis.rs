//! Key-value backend: every todo lives in one Redis hash, keyed by its id,
//! with the JSON-encoded todo as the value.

use std::sync::Arc;

use async_trait::async_trait;
use deadpool_redis::{Config, Connection, Pool, Runtime};
use redis::AsyncCommands;

use super::{StoreError, TodoStore, sample_todo};
use crate::ids::IdGenerator;
use crate::models::Todo;

/// Hash holding all todos.
pub const TODO_KEY: &str = "VERT_TODO";

pub struct RedisTodoStore {
    pool: Pool,
    ids: Arc<dyn IdGenerator>,
}

impl RedisTodoStore {
    pub fn new(pool: Pool, ids: Arc<dyn IdGenerator>) -> Self {
        Self { pool, ids }
    }

    /// Connections are opened lazily, so an unreachable server only shows up
    /// on the first command.
    pub fn from_url(redis_url: &str, ids: Arc<dyn IdGenerator>) -> Result<Self, StoreError> {
        let pool = Config::from_url(redis_url).create_pool(Some(Runtime::Tokio1))?;
        Ok(Self::new(pool, ids))
    }

    async fn connection(&self) -> Result<Connection, StoreError> {
        Ok(self.pool.get().await?)
    }
}

#[async_trait]
impl TodoStore for RedisTodoStore {
    fn backend_name(&self) -> &'static str {
        "redis"
    }

    fn ids(&self) -> &dyn IdGenerator {
        self.ids.as_ref()
    }

    async fn init_data(&self) -> Result<(), StoreError> {
        self.insert(sample_todo(self.ids.next_id())).await?;
        Ok(())
    }

    async fn insert(&self, todo: Todo) -> Result<Todo, StoreError> {
        let encoded = todo.to_json()?;
        let mut conn = self.connection().await?;
        let _: () = conn.hset(TODO_KEY, todo.id, encoded).await?;
        Ok(todo)
    }

    async fn get_all(&self) -> Result<Vec<Todo>, StoreError> {
        let mut conn = self.connection().await?;
        let values: Vec<String> = conn.hvals(TODO_KEY).await?;
        let mut todos = Vec::with_capacity(values.len());
        for encoded in values {
            todos.push(Todo::from_json(encoded.as_bytes())?);
        }
        Ok(todos)
    }

    async fn get_certain(&self, id: i64) -> Result<Option<Todo>, StoreError> {
        let mut conn = self.connection().await?;
        let value: Option<String> = conn.hget(TODO_KEY, id).await?;
        match value {
            Some(encoded) => Ok(Some(Todo::from_json(encoded.as_bytes())?)),
            None => Ok(None),
        }
    }

    async fn delete(&self, id: i64) -> Result<(), StoreError> {
        let mut conn = self.connection().await?;
        let _: () = conn.hdel(TODO_KEY, id).await?;
        Ok(())
    }

    async fn delete_all(&self) -> Result<(), StoreError> {
        let mut conn = self.connection().await?;
        let _: () = conn.del(TODO_KEY).await?;
        Ok(())
    }
}
