use chrono::{DateTime, NaiveTime};
use chrono_tz::Tz;
use log::debug;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::ISO_FORMAT;
use crate::parser::{FallbackParser, ParseError, PortugueseDateParser, TemporalResolver, localize};

/// First and last second of one calendar day
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayWindow {
    pub start: DateTime<Tz>,
    pub end: DateTime<Tz>,
}

/// Range query for the calendar service's list call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayWindowQuery {
    pub time_min: String,
    pub time_max: String,
}

impl DayWindow {
    pub fn to_query(&self) -> DayWindowQuery {
        DayWindowQuery {
            time_min: self.start.format(ISO_FORMAT).to_string(),
            time_max: self.end.format(ISO_FORMAT).to_string(),
        }
    }

    pub fn contains(&self, instant: &DateTime<Tz>) -> bool {
        self.start <= *instant && *instant <= self.end
    }
}

/// Resolves the day an utterance talks about, ignoring its time of day
pub struct DayRangeQueryBuilder<P = PortugueseDateParser> {
    resolver: Arc<TemporalResolver<P>>,
}

impl<P: FallbackParser> DayRangeQueryBuilder<P> {
    pub fn new(resolver: Arc<TemporalResolver<P>>) -> Self {
        Self { resolver }
    }

    pub fn build_day_window(
        &self,
        text: &str,
        reference: &DateTime<Tz>,
    ) -> Result<DayWindow, ParseError> {
        let day = self.resolver.resolve_day(text, reference)?;
        let tz = self.resolver.timezone();
        let failure = || ParseError::TemporalParseFailure { text: text.to_string() };

        let last_second = NaiveTime::from_hms_opt(23, 59, 59).ok_or_else(failure)?;
        let start = localize(&tz, day.and_time(NaiveTime::MIN)).ok_or_else(failure)?;
        let end = localize(&tz, day.and_time(last_second)).ok_or_else(failure)?;

        debug!("Day window for '{}': {} .. {}", text, start, end);
        Ok(DayWindow { start, end })
    }
}
