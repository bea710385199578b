use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use thiserror::Error;
use uuid::Uuid;

/// A persisted campus event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: Uuid,
    pub event_name: String,
    pub club_name: String,
    pub category: String,
    pub date_of_event: NaiveDate,
    pub time_of_event: String,
    pub timestamp: DateTime<Utc>,
    pub venue: String,
    pub description: String,
    /// Encoded image payload, stored exactly as submitted.
    pub image: String,
    pub organizer_name: String,
    pub organizer_phone: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Business fields of an event record, in canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventField {
    EventName,
    ClubName,
    Category,
    DateOfEvent,
    TimeOfEvent,
    Timestamp,
    Venue,
    Description,
    Image,
    OrganizerName,
    OrganizerPhone,
}

impl EventField {
    /// Fields a submission must carry, in the order they are checked.
    pub const REQUIRED: [EventField; 10] = [
        EventField::EventName,
        EventField::ClubName,
        EventField::Category,
        EventField::DateOfEvent,
        EventField::TimeOfEvent,
        EventField::Venue,
        EventField::Description,
        EventField::Image,
        EventField::OrganizerName,
        EventField::OrganizerPhone,
    ];

    /// Wire name of the field.
    pub fn as_str(self) -> &'static str {
        match self {
            EventField::EventName => "eventName",
            EventField::ClubName => "clubName",
            EventField::Category => "category",
            EventField::DateOfEvent => "dateOfEvent",
            EventField::TimeOfEvent => "timeOfEvent",
            EventField::Timestamp => "timestamp",
            EventField::Venue => "venue",
            EventField::Description => "description",
            EventField::Image => "image",
            EventField::OrganizerName => "organizerName",
            EventField::OrganizerPhone => "organizerPhone",
        }
    }

    fn label(self) -> &'static str {
        match self {
            EventField::EventName => "Event name",
            EventField::ClubName => "Club name",
            EventField::Category => "Category",
            EventField::DateOfEvent => "Date of event",
            EventField::TimeOfEvent => "Time of event",
            EventField::Timestamp => "Timestamp",
            EventField::Venue => "Venue",
            EventField::Description => "Description",
            EventField::Image => "Image",
            EventField::OrganizerName => "Organizer name",
            EventField::OrganizerPhone => "Organizer phone",
        }
    }

    /// Whether surrounding whitespace is stripped before storing.
    pub fn is_trimmed(self) -> bool {
        matches!(
            self,
            EventField::EventName
                | EventField::ClubName
                | EventField::Category
                | EventField::Venue
                | EventField::OrganizerName
                | EventField::OrganizerPhone
        )
    }
}

impl fmt::Display for EventField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A candidate record violated a field constraint.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Event validation failed: {field}: {reason}")]
pub struct ConstraintError {
    pub field: EventField,
    pub reason: String,
}

impl ConstraintError {
    pub fn new(field: EventField, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }

    pub fn required(field: EventField) -> Self {
        Self::new(field, format!("{} is required", field.label()))
    }

    pub fn invalid_date(field: EventField, raw: &str) -> Self {
        Self::new(field, format!("Cast to date failed for value \"{raw}\""))
    }
}

/// An event that has not been persisted yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEvent {
    pub event_name: String,
    pub club_name: String,
    pub category: String,
    pub date_of_event: NaiveDate,
    pub time_of_event: String,
    pub timestamp: DateTime<Utc>,
    pub venue: String,
    pub description: String,
    pub image: String,
    pub organizer_name: String,
    pub organizer_phone: String,
}

impl NewEvent {
    /// Trims the designated text fields and rejects any that end up empty.
    ///
    /// Stores call this before writing so no partial record is persisted.
    pub fn sanitize(mut self) -> Result<Self, ConstraintError> {
        for field in EventField::REQUIRED {
            let Some(value) = self.text_mut(field) else {
                continue;
            };
            if field.is_trimmed() {
                let trimmed = value.trim();
                if trimmed.len() != value.len() {
                    *value = trimmed.to_string();
                }
            }
            if value.is_empty() {
                return Err(ConstraintError::required(field));
            }
            // Postgres TEXT cannot hold NUL
            if value.contains('\0') {
                return Err(ConstraintError::new(field, "must not contain NUL characters"));
            }
        }
        Ok(self)
    }

    /// Completes the candidate with generated metadata.
    pub fn into_event(self, id: Uuid, now: DateTime<Utc>) -> Event {
        Event {
            id,
            event_name: self.event_name,
            club_name: self.club_name,
            category: self.category,
            date_of_event: self.date_of_event,
            time_of_event: self.time_of_event,
            timestamp: self.timestamp,
            venue: self.venue,
            description: self.description,
            image: self.image,
            organizer_name: self.organizer_name,
            organizer_phone: self.organizer_phone,
            created_at: now,
            updated_at: now,
        }
    }

    fn text_mut(&mut self, field: EventField) -> Option<&mut String> {
        match field {
            EventField::EventName => Some(&mut self.event_name),
            EventField::ClubName => Some(&mut self.club_name),
            EventField::Category => Some(&mut self.category),
            EventField::TimeOfEvent => Some(&mut self.time_of_event),
            EventField::Venue => Some(&mut self.venue),
            EventField::Description => Some(&mut self.description),
            EventField::Image => Some(&mut self.image),
            EventField::OrganizerName => Some(&mut self.organizer_name),
            EventField::OrganizerPhone => Some(&mut self.organizer_phone),
            EventField::DateOfEvent | EventField::Timestamp => None,
        }
    }
}

/// Exact-match listing constraints. `None` matches every record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventFilter {
    pub category: Option<String>,
    pub club_name: Option<String>,
}

impl EventFilter {
    pub fn matches(&self, event: &Event) -> bool {
        self.category
            .as_deref()
            .map_or(true, |category| event.category == category)
            && self
                .club_name
                .as_deref()
                .map_or(true, |club_name| event.club_name == club_name)
    }
}

const NAIVE_DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parses a calendar date from `YYYY-MM-DD`, a full datetime, or epoch
/// milliseconds.
///
/// Datetimes with an offset contribute their UTC date.
pub fn parse_event_date(field: EventField, raw: &str) -> Result<NaiveDate, ConstraintError> {
    let value = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Ok(date);
    }
    parse_datetime(value)
        .or_else(|| parse_epoch_millis(value))
        .map(|datetime| datetime.date_naive())
        .ok_or_else(|| ConstraintError::invalid_date(field, raw))
}

/// Parses a point in time. Values without an offset are taken as UTC and
/// bare integers as milliseconds since the Unix epoch.
pub fn parse_timestamp(field: EventField, raw: &str) -> Result<DateTime<Utc>, ConstraintError> {
    let value = raw.trim();
    if let Some(datetime) = parse_datetime(value) {
        return Ok(datetime);
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Ok(date.and_time(NaiveTime::MIN).and_utc());
    }
    parse_epoch_millis(value).ok_or_else(|| ConstraintError::invalid_date(field, raw))
}

fn parse_epoch_millis(value: &str) -> Option<DateTime<Utc>> {
    value
        .parse::<i64>()
        .ok()
        .and_then(DateTime::<Utc>::from_timestamp_millis)
}

fn parse_datetime(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(datetime) = DateTime::parse_from_rfc3339(value) {
        return Some(datetime.with_timezone(&Utc));
    }
    NAIVE_DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn candidate() -> NewEvent {
        NewEvent {
            event_name: "  Hack Night ".to_string(),
            club_name: "CS Club".to_string(),
            category: "Tech".to_string(),
            date_of_event: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            time_of_event: " 18:00 ".to_string(),
            timestamp: Utc.with_ymd_and_hms(2024, 4, 1, 12, 0, 0).unwrap(),
            venue: "Lab 3\n".to_string(),
            description: "  bring a laptop  ".to_string(),
            image: "data:image/png;base64,AAAA".to_string(),
            organizer_name: "Ana".to_string(),
            organizer_phone: " 555-0100".to_string(),
        }
    }

    #[test]
    fn test_sanitize_trims_only_designated_fields() {
        let event = candidate().sanitize().unwrap();
        assert_eq!(event.event_name, "Hack Night");
        assert_eq!(event.venue, "Lab 3");
        assert_eq!(event.organizer_phone, "555-0100");
        assert_eq!(event.time_of_event, " 18:00 ");
        assert_eq!(event.description, "  bring a laptop  ");
    }

    #[test]
    fn test_sanitize_rejects_whitespace_only_trimmed_field() {
        let mut event = candidate();
        event.club_name = "   ".to_string();

        let err = event.sanitize().unwrap_err();
        assert_eq!(err.field, EventField::ClubName);
        assert_eq!(
            err.to_string(),
            "Event validation failed: clubName: Club name is required"
        );
    }

    #[test]
    fn test_sanitize_keeps_whitespace_in_untrimmed_field() {
        let mut event = candidate();
        event.description = "  ".to_string();
        assert_eq!(event.sanitize().unwrap().description, "  ");
    }

    #[test]
    fn test_sanitize_rejects_nul_in_any_text_field() {
        let mut event = candidate();
        event.image = "data:image/png;base64,AA\0AA".to_string();

        let err = event.sanitize().unwrap_err();
        assert_eq!(err.field, EventField::Image);
        assert_eq!(
            err.to_string(),
            "Event validation failed: image: must not contain NUL characters"
        );
    }

    #[test]
    fn test_into_event_sets_matching_metadata() {
        let now = Utc::now();
        let id = Uuid::new_v4();
        let event = candidate().into_event(id, now);
        assert_eq!(event.id, id);
        assert_eq!(event.created_at, now);
        assert_eq!(event.updated_at, now);
    }

    #[test]
    fn test_event_serializes_with_camel_case_keys() {
        let event = candidate().into_event(Uuid::new_v4(), Utc::now());
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["dateOfEvent"], "2024-05-01");
        assert_eq!(json["organizerPhone"], " 555-0100");
        assert!(json.get("createdAt").is_some());
        assert!(json.get("event_name").is_none());
    }

    #[test]
    fn test_filter_matches_conjunction() {
        let event = candidate().sanitize().unwrap().into_event(Uuid::new_v4(), Utc::now());

        assert!(EventFilter::default().matches(&event));
        assert!(EventFilter {
            category: Some("Tech".to_string()),
            club_name: Some("CS Club".to_string()),
        }
        .matches(&event));
        assert!(!EventFilter {
            category: Some("Tech".to_string()),
            club_name: Some("Chess Club".to_string()),
        }
        .matches(&event));
        assert!(!EventFilter {
            category: Some("tech".to_string()),
            club_name: None,
        }
        .matches(&event));
    }

    #[test]
    fn test_parse_event_date_accepts_plain_and_full_dates() {
        let expected = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        assert_eq!(
            parse_event_date(EventField::DateOfEvent, "2024-05-01").unwrap(),
            expected
        );
        assert_eq!(
            parse_event_date(EventField::DateOfEvent, "2024-05-01T18:00:00Z").unwrap(),
            expected
        );
        assert_eq!(
            parse_event_date(EventField::DateOfEvent, "2024-05-01T01:00:00+02:00").unwrap(),
            NaiveDate::from_ymd_opt(2024, 4, 30).unwrap()
        );
    }

    #[test]
    fn test_parse_event_date_accepts_epoch_millis() {
        assert_eq!(
            parse_event_date(EventField::DateOfEvent, "1714521600000").unwrap(),
            NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
        );
    }

    #[test]
    fn test_parse_event_date_rejects_garbage() {
        let err = parse_event_date(EventField::DateOfEvent, "next tuesday").unwrap_err();
        assert_eq!(err.field, EventField::DateOfEvent);
        assert!(err.reason.contains("next tuesday"));
    }

    #[test]
    fn test_parse_timestamp_formats() {
        let expected = Utc.with_ymd_and_hms(2024, 4, 1, 12, 0, 0).unwrap();
        for raw in [
            "2024-04-01T12:00:00Z",
            "2024-04-01T14:00:00+02:00",
            "2024-04-01T12:00:00",
            "2024-04-01 12:00:00.000",
            "1711972800000",
        ] {
            assert_eq!(
                parse_timestamp(EventField::Timestamp, raw).unwrap(),
                expected,
                "{raw}"
            );
        }
        assert_eq!(
            parse_timestamp(EventField::Timestamp, "2024-04-01").unwrap(),
            Utc.with_ymd_and_hms(2024, 4, 1, 0, 0, 0).unwrap()
        );
        assert!(parse_timestamp(EventField::Timestamp, "yesterday").is_err());
    }
}
