//! Calendar-facing side of MIA
//!
//! Builds event drafts and day windows from utterances and hands them to a
//! [`CalendarService`].

mod event;
mod service;
mod validation;
mod window;

pub use event::*;
pub use service::*;
pub use validation::*;
pub use window::*;

/// ISO-8601 layout sent to the calendar service, e.g. `2025-12-10T15:00:00-03:00`
pub const ISO_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%:z";

/// Custom error type for calendar operations
#[derive(Debug, thiserror::Error)]
pub enum CalendarError {
    #[error("Invalid event: {0}")]
    InvalidEvent(String),
    #[error("Invalid day window: {0}")]
    InvalidWindow(String),
    #[error("Invalid date/time format: {0}")]
    InvalidDateTime(String),
}
