//! Create and list handlers for the events collection.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use tracing::{debug, info, instrument};

use crate::models::event::{parse_event_date, parse_timestamp};
use crate::models::{ConstraintError, EventField, EventFilter, NewEvent};
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::response::{created, list};

/// Body of `POST /api/events`.
///
/// Every slot keeps the raw JSON value so a missing field can be told apart
/// from one of the wrong type. Unknown keys are ignored.
#[derive(Debug, Default)]
pub struct CreateEventRequest {
    pub event_name: Option<Value>,
    pub club_name: Option<Value>,
    pub category: Option<Value>,
    pub date_of_event: Option<Value>,
    pub time_of_event: Option<Value>,
    pub timestamp: Option<Value>,
    pub venue: Option<Value>,
    pub description: Option<Value>,
    pub image: Option<Value>,
    pub organizer_name: Option<Value>,
    pub organizer_phone: Option<Value>,
}

impl From<Map<String, Value>> for CreateEventRequest {
    fn from(mut fields: Map<String, Value>) -> Self {
        let mut take = |field: EventField| fields.remove(field.as_str());
        Self {
            event_name: take(EventField::EventName),
            club_name: take(EventField::ClubName),
            category: take(EventField::Category),
            date_of_event: take(EventField::DateOfEvent),
            time_of_event: take(EventField::TimeOfEvent),
            timestamp: take(EventField::Timestamp),
            venue: take(EventField::Venue),
            description: take(EventField::Description),
            image: take(EventField::Image),
            organizer_name: take(EventField::OrganizerName),
            organizer_phone: take(EventField::OrganizerPhone),
        }
    }
}

impl TryFrom<Value> for CreateEventRequest {
    type Error = AppError;

    /// Only a JSON object carries fields. Any other body is missing all of
    /// them, so the first required field is reported.
    fn try_from(body: Value) -> Result<Self, Self::Error> {
        match body {
            Value::Object(fields) => Ok(fields.into()),
            _ => Err(AppError::MissingField(EventField::REQUIRED[0])),
        }
    }
}

impl CreateEventRequest {
    /// Checks required fields in canonical order and coerces the submission
    /// into a store candidate. `now` fills in an omitted `timestamp`.
    pub fn into_candidate(self, now: DateTime<Utc>) -> Result<NewEvent, AppError> {
        if let Some(field) = self.first_missing() {
            return Err(AppError::MissingField(field));
        }

        let date_of_event = parse_event_date(
            EventField::DateOfEvent,
            &text(EventField::DateOfEvent, self.date_of_event)?,
        )?;
        let timestamp = match self.timestamp.filter(|value| !is_falsy(value)) {
            Some(value) => parse_timestamp(
                EventField::Timestamp,
                &text(EventField::Timestamp, Some(value))?,
            )?,
            None => now,
        };

        Ok(NewEvent {
            event_name: text(EventField::EventName, self.event_name)?,
            club_name: text(EventField::ClubName, self.club_name)?,
            category: text(EventField::Category, self.category)?,
            date_of_event,
            time_of_event: text(EventField::TimeOfEvent, self.time_of_event)?,
            timestamp,
            venue: text(EventField::Venue, self.venue)?,
            description: text(EventField::Description, self.description)?,
            image: text(EventField::Image, self.image)?,
            organizer_name: text(EventField::OrganizerName, self.organizer_name)?,
            organizer_phone: text(EventField::OrganizerPhone, self.organizer_phone)?,
        })
    }

    fn first_missing(&self) -> Option<EventField> {
        EventField::REQUIRED
            .into_iter()
            .find(|field| self.slot(*field).map_or(true, is_falsy))
    }

    fn slot(&self, field: EventField) -> Option<&Value> {
        match field {
            EventField::EventName => self.event_name.as_ref(),
            EventField::ClubName => self.club_name.as_ref(),
            EventField::Category => self.category.as_ref(),
            EventField::DateOfEvent => self.date_of_event.as_ref(),
            EventField::TimeOfEvent => self.time_of_event.as_ref(),
            EventField::Timestamp => self.timestamp.as_ref(),
            EventField::Venue => self.venue.as_ref(),
            EventField::Description => self.description.as_ref(),
            EventField::Image => self.image.as_ref(),
            EventField::OrganizerName => self.organizer_name.as_ref(),
            EventField::OrganizerPhone => self.organizer_phone.as_ref(),
        }
    }
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

fn text(field: EventField, value: Option<Value>) -> Result<String, ConstraintError> {
    match value {
        Some(Value::String(s)) => Ok(s),
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(Value::Bool(b)) => Ok(b.to_string()),
        Some(Value::Array(_) | Value::Object(_)) => {
            Err(ConstraintError::new(field, "Cast to string failed"))
        }
        Some(Value::Null) | None => Err(ConstraintError::required(field)),
    }
}

/// Query string of `GET /api/events`.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ListEventsQuery {
    pub category: Option<String>,
    pub club_name: Option<String>,
}

impl ListEventsQuery {
    /// The first occurrence of a repeated parameter wins. Unknown parameters
    /// are ignored.
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut query = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "category" => &mut query.category,
                "clubName" => &mut query.club_name,
                _ => continue,
            };
            slot.get_or_insert(value);
        }
        query
    }

    /// Empty parameters count as not supplied.
    pub fn into_filter(self) -> EventFilter {
        EventFilter {
            category: self.category.filter(|value| !value.is_empty()),
            club_name: self.club_name.filter(|value| !value.is_empty()),
        }
    }
}

/// POST /api/events
#[instrument(skip(state, payload))]
pub async fn create_event(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(body) = payload?;
    let candidate = CreateEventRequest::try_from(body)?.into_candidate(Utc::now())?;

    let event = state.store.insert(candidate).await?;
    info!(event_id = %event.id, club = %event.club_name, "Event created");

    Ok(created(event, "Event created successfully").into_response())
}

/// GET /api/events
#[instrument(skip(state, query))]
pub async fn list_events(
    State(state): State<AppState>,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Result<Response, AppError> {
    let Query(pairs) = query?;
    let filter = ListEventsQuery::from_pairs(pairs).into_filter();

    let events = state.store.find(&filter).await?;
    debug!(count = events.len(), ?filter, "Events listed");

    Ok(list(events).into_response())
}
