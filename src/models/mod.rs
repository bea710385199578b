pub mod event;

pub use event::{ConstraintError, Event, EventField, EventFilter, NewEvent};
