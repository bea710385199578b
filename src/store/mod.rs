//! Event persistence.
//!
//! `EventStore` is the only seam between the request handlers and storage.
//! `PgEventStore` backs production deployments, `MemoryEventStore` backs
//! local development without a database and the test suite.

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{ConstraintError, Event, EventFilter, NewEvent};

pub mod memory;
pub mod postgres;

pub use memory::MemoryEventStore;
pub use postgres::PgEventStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Constraint(#[from] ConstraintError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait EventStore: Send + Sync {
    /// Validates and persists a candidate, assigning its id and timestamps.
    async fn insert(&self, candidate: NewEvent) -> Result<Event, StoreError>;

    /// Returns matching events, latest `dateOfEvent` first. Events sharing a
    /// date keep insertion order.
    async fn find(&self, filter: &EventFilter) -> Result<Vec<Event>, StoreError>;
}
