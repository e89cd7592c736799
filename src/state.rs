use std::sync::Arc;

use crate::db::TodoStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn TodoStore>,
    /// `host:port` used for resource URLs when a request carries no `Host` header.
    pub authority: String,
}

impl AppState {
    pub fn new(store: Arc<dyn TodoStore>, authority: impl Into<String>) -> Self {
        Self {
            store,
            authority: authority.into(),
        }
    }
}
