use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{StoreError, TodoStore, sample_todo};
use crate::ids::IdGenerator;
use crate::models::Todo;

/// Process-local key-value store with the same layout as the Redis hash:
/// id -> JSON-encoded todo.
pub struct MemoryTodoStore {
    entries: RwLock<HashMap<i64, String>>,
    ids: Arc<dyn IdGenerator>,
}

impl MemoryTodoStore {
    pub fn new(ids: Arc<dyn IdGenerator>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ids,
        }
    }
}

#[async_trait]
impl TodoStore for MemoryTodoStore {
    fn backend_name(&self) -> &'static str {
        "memory"
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
        self.entries.write().await.insert(todo.id, encoded);
        Ok(todo)
    }

    async fn get_all(&self) -> Result<Vec<Todo>, StoreError> {
        let entries = self.entries.read().await;
        let mut todos = Vec::with_capacity(entries.len());
        for encoded in entries.values() {
            todos.push(Todo::from_json(encoded.as_bytes())?);
        }
        Ok(todos)
    }

    async fn get_certain(&self, id: i64) -> Result<Option<Todo>, StoreError> {
        let entries = self.entries.read().await;
        match entries.get(&id) {
            Some(encoded) => Ok(Some(Todo::from_json(encoded.as_bytes())?)),
            None => Ok(None),
        }
    }

    async fn delete(&self, id: i64) -> Result<(), StoreError> {
        self.entries.write().await.remove(&id);
        Ok(())
    }

    async fn delete_all(&self) -> Result<(), StoreError> {
        self.entries.write().await.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::SequentialIds;

    fn store() -> MemoryTodoStore {
        MemoryTodoStore::new(Arc::new(SequentialIds::new()))
    }

    fn todo(id: i64, title: &str) -> Todo {
        Todo::new(id, Some(title.to_string()), None, None, Some(format!("/todos/{}", id)))
    }

    #[tokio::test]
    async fn test_init_data_seeds_sample() {
        let store = store();
        store.init_data().await.expect("init");

        let todos = store.get_all().await.expect("get_all");
        assert_eq!(todos.len(), 1);
        assert_eq!(todos[0].id, 1);
        assert_eq!(todos[0].title.as_deref(), Some("Something to do..."));
        assert_eq!(todos[0].order, Some(1));
    }

    #[tokio::test]
    async fn test_insert_overwrites_same_id() {
        let store = store();
        store.insert(todo(3, "first")).await.expect("insert");
        store.insert(todo(3, "second")).await.expect("insert");

        let todos = store.get_all().await.expect("get_all");
        assert_eq!(todos.len(), 1);
        assert_eq!(todos[0].title.as_deref(), Some("second"));
    }

    #[tokio::test]
    async fn test_get_certain_missing_is_none() {
        let store = store();
        assert!(store.get_certain(999_999).await.expect("get").is_none());
    }

    #[tokio::test]
    async fn test_insert_keeps_absent_fields_absent() {
        let store = store();
        store.insert(todo(4, "raw")).await.expect("insert");

        let fetched = store.get_certain(4).await.expect("get").expect("present");
        assert_eq!(fetched.completed, None);
        assert_eq!(fetched.order, None);
        assert_eq!(fetched.url.as_deref(), Some("/todos/4"));
    }

    #[tokio::test]
    async fn test_update_merges_and_persists() {
        let store = store();
        store.insert(todo(5, "X")).await.expect("insert");

        let incoming = Todo::new(0, None, Some(true), None, Some("/other".to_string()));
        let updated = store
            .update(5, &incoming)
            .await
            .expect("update")
            .expect("present");
        assert_eq!(updated.title.as_deref(), Some("X"));
        assert_eq!(updated.completed, Some(true));
        assert_eq!(updated.url.as_deref(), Some("/todos/5"));

        let fetched = store.get_certain(5).await.expect("get").expect("present");
        assert!(fetched.is_completed());
    }

    #[tokio::test]
    async fn test_update_missing_is_none() {
        let store = store();
        let result = store.update(8, &Todo::default()).await.expect("update");
        assert!(result.is_none());
        assert!(store.get_all().await.expect("get_all").is_empty());
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let store = store();
        store.insert(todo(6, "gone")).await.expect("insert");
        store.delete(6).await.expect("delete");
        store.delete(6).await.expect("delete again");
        assert!(store.get_certain(6).await.expect("get").is_none());
    }

    #[tokio::test]
    async fn test_delete_all_clears() {
        let store = store();
        store.insert(todo(1, "a")).await.expect("insert");
        store.insert(todo(2, "b")).await.expect("insert");
        store.delete_all().await.expect("delete_all");
        assert!(store.get_all().await.expect("get_all").is_empty());
    }
}
