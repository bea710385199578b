use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::{EventStore, StoreError};
use crate::models::{Event, EventFilter, NewEvent};

const EVENT_COLUMNS: &str = "id, event_name, club_name, category, date_of_event, time_of_event, \
     timestamp, venue, description, image, organizer_name, organizer_phone, created_at, updated_at";

/// PostgreSQL-backed event store. Schema lives in `migrations/`.
#[derive(Debug, Clone)]
pub struct PgEventStore {
    pool: PgPool,
}

impl PgEventStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EventStore for PgEventStore {
    async fn insert(&self, candidate: NewEvent) -> Result<Event, StoreError> {
        let event = candidate.sanitize()?.into_event(Uuid::new_v4(), Utc::now());

        let sql = format!(
            "INSERT INTO events ({EVENT_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14) \
             RETURNING {EVENT_COLUMNS}"
        );

        let stored = sqlx::query_as::<_, Event>(&sql)
            .bind(event.id)
            .bind(&event.event_name)
            .bind(&event.club_name)
            .bind(&event.category)
            .bind(event.date_of_event)
            .bind(&event.time_of_event)
            .bind(event.timestamp)
            .bind(&event.venue)
            .bind(&event.description)
            .bind(&event.image)
            .bind(&event.organizer_name)
            .bind(&event.organizer_phone)
            .bind(event.created_at)
            .bind(event.updated_at)
            .fetch_one(&self.pool)
            .await?;

        Ok(stored)
    }

    async fn find(&self, filter: &EventFilter) -> Result<Vec<Event>, StoreError> {
        let mut query = select_events(filter);
        let events = query.build_query_as::<Event>().fetch_all(&self.pool).await?;
        Ok(events)
    }
}

fn select_events(filter: &EventFilter) -> QueryBuilder<'_, Postgres> {
    let mut query = QueryBuilder::new(format!("SELECT {EVENT_COLUMNS} FROM events"));
    let mut clause = " WHERE ";

    if let Some(category) = filter.category.as_deref() {
        query.push(clause).push("category = ").push_bind(category);
        clause = " AND ";
    }
    if let Some(club_name) = filter.club_name.as_deref() {
        query.push(clause).push("club_name = ").push_bind(club_name);
    }

    query.push(" ORDER BY date_of_event DESC, created_at ASC, id ASC");
    query
}
