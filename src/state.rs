//! Shared application state.

use std::sync::Arc;

use crate::store::EventStore;

/// State handed to every request handler.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn EventStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn EventStore>) -> Self {
        Self { store }
    }
}
