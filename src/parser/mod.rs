//! MIA parser module
//!
//! Date/time resolution and title extraction for Portuguese utterances.

pub mod fallback;
pub mod patterns;
pub mod resolver;
pub mod title;

use chrono::{DateTime, Duration, NaiveDateTime, TimeZone};
use chrono_tz::Tz;

pub use fallback::{FallbackConfig, FallbackParser, ParsedInstant, PortugueseDateParser};
pub use patterns::{RelativeDay, Signals, TemporalSignal};
pub use resolver::{TemporalResolver, Tier};
pub use title::{extract_title, extract_title_or};

/// Message shown to the user when no date or time could be understood
pub const PARSE_FAILURE_MESSAGE: &str = "Não consegui entender a data e hora do evento.";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("Não consegui entender a data e hora em '{text}'")]
    TemporalParseFailure { text: String },
}

impl ParseError {
    pub fn text(&self) -> &str {
        match self {
            ParseError::TemporalParseFailure { text } => text,
        }
    }

    pub fn user_message(&self) -> &'static str {
        PARSE_FAILURE_MESSAGE
    }
}

/// Attach `tz` to a wall-clock time. Ambiguous times take the earlier
/// instant; times skipped by a DST jump move one hour forward.
pub(crate) fn localize(tz: &Tz, naive: NaiveDateTime) -> Option<DateTime<Tz>> {
    tz.from_local_datetime(&naive)
        .earliest()
        .or_else(|| tz.from_local_datetime(&(naive + Duration::hours(1))).earliest())
}
