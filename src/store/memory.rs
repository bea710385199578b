use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{EventStore, StoreError};
use crate::models::{Event, EventFilter, NewEvent};

/// Process-local event store. Contents are lost on restart.
#[derive(Debug, Default)]
pub struct MemoryEventStore {
    events: RwLock<Vec<Event>>,
}

impl MemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.events.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.events.read().await.is_empty()
    }
}

#[async_trait]
impl EventStore for MemoryEventStore {
    async fn insert(&self, candidate: NewEvent) -> Result<Event, StoreError> {
        let event = candidate.sanitize()?.into_event(Uuid::new_v4(), Utc::now());
        self.events.write().await.push(event.clone());
        Ok(event)
    }

    async fn find(&self, filter: &EventFilter) -> Result<Vec<Event>, StoreError> {
        let mut matching: Vec<Event> = self
            .events
            .read()
            .await
            .iter()
            .filter(|event| filter.matches(event))
            .cloned()
            .collect();

        // Stable sort keeps insertion order among events on the same date.
        matching.sort_by(|a, b| b.date_of_event.cmp(&a.date_of_event));
        Ok(matching)
    }
}
