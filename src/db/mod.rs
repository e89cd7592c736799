pub mod memory;
pub mod redis;
pub mod sqlite;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::config::{BackendKind, Config, IdStrategy};
use crate::ids::{IdGenerator, RandomIds, SequentialIds};
use crate::models::{DecodeError, Todo};

pub use self::memory::MemoryTodoStore;
pub use self::redis::RedisTodoStore;
pub use self::sqlite::SqliteTodoStore;

/// Every variant means the backend could not serve the call.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Redis error: {0}")]
    Redis(#[from] ::redis::RedisError),

    #[error("Redis pool error: {0}")]
    Pool(#[from] deadpool_redis::PoolError),

    #[error("Redis pool setup error: {0}")]
    PoolSetup(#[from] deadpool_redis::CreatePoolError),

    #[error("Encoding error: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Stored todo is corrupt: {0}")]
    Corrupt(#[from] DecodeError),
}

#[async_trait]
pub trait TodoStore: Send + Sync {
    fn backend_name(&self) -> &'static str;

    /// Id source owned by this store instance.
    fn ids(&self) -> &dyn IdGenerator;

    /// Prepares the backend and seeds one sample record.
    async fn init_data(&self) -> Result<(), StoreError>;

    /// Stores `todo` under its id, replacing any record with the same id.
    async fn insert(&self, todo: Todo) -> Result<Todo, StoreError>;

    async fn get_all(&self) -> Result<Vec<Todo>, StoreError>;

    async fn get_certain(&self, id: i64) -> Result<Option<Todo>, StoreError>;

    /// Read, merge, write. The pair is not atomic: concurrent updates of the
    /// same id are last-write-wins.
    async fn update(&self, id: i64, incoming: &Todo) -> Result<Option<Todo>, StoreError> {
        let Some(existing) = self.get_certain(id).await? else {
            return Ok(None);
        };
        let merged = existing.merge(incoming);
        self.insert(merged).await.map(Some)
    }

    /// Absent ids are not an error.
    async fn delete(&self, id: i64) -> Result<(), StoreError>;

    async fn delete_all(&self) -> Result<(), StoreError>;
}

pub fn sample_todo(id: i64) -> Todo {
    Todo::new(
        id,
        Some("Something to do...".to_string()),
        Some(false),
        Some(1),
        Some("todo/ex".to_string()),
    )
}

pub fn id_generator(strategy: IdStrategy) -> Arc<dyn IdGenerator> {
    match strategy {
        IdStrategy::Sequential => Arc::new(SequentialIds::new()),
        IdStrategy::Random => Arc::new(RandomIds),
    }
}

/// Builds the backend selected by `config`.
pub async fn open(config: &Config) -> Result<Arc<dyn TodoStore>, StoreError> {
    let ids = id_generator(config.id_strategy);
    let store: Arc<dyn TodoStore> = match config.backend {
        BackendKind::Redis => Arc::new(RedisTodoStore::from_url(&config.redis_url, ids)?),
        BackendKind::Sqlite => Arc::new(
            SqliteTodoStore::connect(&config.database_url, config.database_max_connections, ids)
                .await?,
        ),
        BackendKind::Memory => Arc::new(MemoryTodoStore::new(ids)),
    };
    info!("using {} backend", store.backend_name());
    Ok(store)
}

/// Start-up preparation. Failures are logged, not fatal: the backend may
/// become reachable later.
pub async fn bootstrap(store: &dyn TodoStore, seed_sample: bool) {
    // Existing ids first, so the sample cannot overwrite a stored record.
    match store.get_all().await {
        Ok(todos) => {
            if let Some(max) = todos.iter().map(|t| t.id).max() {
                store.ids().observe(max);
            }
            info!("{} backend holds {} todos", store.backend_name(), todos.len());
        }
        Err(e) => warn!("could not read existing todos: {}", e),
    }

    if seed_sample {
        if let Err(e) = store.init_data().await {
            error!("persistence service is not running: {}", e);
        }
    }
}
