use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("Failed to decode todo: {0}")]
pub struct DecodeError(#[from] serde_json::Error);

/// A single task record.
///
/// `completed` and `order` stay `None` until a client sets them; readers go
/// through [`Todo::is_completed`] and [`Todo::order`], which substitute the
/// defaults. `url` is assigned by the HTTP layer and excluded from equality.
#[derive(Debug, Clone, Default, Serialize, Deserialize, FromRow)]
pub struct Todo {
    #[serde(default)]
    pub id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl Todo {
    pub fn new(
        id: i64,
        title: Option<String>,
        completed: Option<bool>,
        order: Option<i64>,
        url: Option<String>,
    ) -> Self {
        Self { id, title, completed, order, url }
    }

    /// Decodes a todo from a JSON object. Unknown fields are ignored.
    pub fn from_json(bytes: &[u8]) -> Result<Self, DecodeError> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Encodes with absent fields dropped rather than written as `null`.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn is_completed(&self) -> bool {
        self.completed.unwrap_or(false)
    }

    pub fn order(&self) -> i64 {
        self.order.unwrap_or(0)
    }

    /// Copy with `completed` and `order` filled in as a reader observes them.
    pub fn resolved(&self) -> Self {
        Self {
            completed: Some(self.is_completed()),
            order: Some(self.order()),
            ..self.clone()
        }
    }

    /// Partial update: fields present in `incoming` win, the rest are kept.
    /// `id` and `url` always come from `self`.
    pub fn merge(&self, incoming: &Todo) -> Self {
        Self {
            id: self.id,
            title: incoming.title.clone().or_else(|| self.title.clone()),
            completed: incoming.completed.or(self.completed),
            order: incoming.order.or(self.order),
            url: self.url.clone(),
        }
    }
}

impl PartialEq for Todo {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.title == other.title
            && self.is_completed() == other.is_completed()
            && self.order() == other.order()
    }
}

impl Eq for Todo {}
