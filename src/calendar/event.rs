use chrono::{DateTime, Duration};
use chrono_tz::Tz;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::ISO_FORMAT;
use crate::config::Config;
use crate::parser::{
    FallbackParser, ParseError, PortugueseDateParser, TemporalResolver, extract_title_or,
};

/// An event ready to be written to the calendar
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventDraft {
    pub title: String,
    pub start: DateTime<Tz>,
    pub end: DateTime<Tz>,
}

/// `start`/`end` member of an event body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDateTime {
    pub date_time: String,
    pub time_zone: String,
}

/// Event body in the shape the calendar service accepts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventBody {
    pub summary: String,
    pub start: EventDateTime,
    pub end: EventDateTime,
}

impl EventDateTime {
    pub fn from_instant(instant: &DateTime<Tz>) -> Self {
        Self {
            date_time: instant.format(ISO_FORMAT).to_string(),
            time_zone: instant.timezone().name().to_string(),
        }
    }
}

impl EventDraft {
    pub fn to_body(&self) -> EventBody {
        EventBody {
            summary: self.title.clone(),
            start: EventDateTime::from_instant(&self.start),
            end: EventDateTime::from_instant(&self.end),
        }
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }
}

/// Combines the resolved start, a fixed duration and the extracted title
pub struct EventAssembler<P = PortugueseDateParser> {
    resolver: Arc<TemporalResolver<P>>,
    duration: Duration,
    default_title: String,
}

impl EventAssembler<PortugueseDateParser> {
    pub fn from_config(
        resolver: Arc<TemporalResolver<PortugueseDateParser>>,
        config: &Config,
    ) -> Self {
        Self::new(resolver)
            .with_duration(Duration::minutes(config.event.duration_minutes))
            .with_default_title(&config.event.default_title)
    }
}

impl<P: FallbackParser> EventAssembler<P> {
    /// Thirty-minute events titled "Reunião" when nothing else is left
    pub fn new(resolver: Arc<TemporalResolver<P>>) -> Self {
        Self { resolver, duration: Duration::minutes(30), default_title: "Reunião".to_string() }
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    pub fn with_default_title(mut self, title: &str) -> Self {
        self.default_title = title.to_string();
        self
    }

    pub fn build_event(
        &self,
        text: &str,
        reference: &DateTime<Tz>,
    ) -> Result<EventDraft, ParseError> {
        let start = self.resolver.resolve(text, reference)?;
        let title = extract_title_or(text, &self.default_title);
        let end = start + self.duration;

        debug!("Built event '{}' from '{}'", title, text);
        info!("Event '{}' from {} to {}", title, start, end);
        Ok(EventDraft { title, start, end })
    }
}
