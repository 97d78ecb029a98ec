use log::{debug, info};

use super::{
    CalendarError, DayWindowQuery, EventBody, parse_iso_datetime, validate_event_body,
    validate_window_query,
};

/// The calendar that stores events. Authentication, retries and persistence
/// guarantees belong to the implementation.
pub trait CalendarService {
    /// Store an event, returning its id
    fn insert_event(&mut self, event: &EventBody) -> Result<String, CalendarError>;

    /// Events starting inside the query window, earliest first
    fn list_events(&self, query: &DayWindowQuery) -> Result<Vec<EventBody>, CalendarError>;
}

/// Process-local calendar used by the terminal front end
#[derive(Debug, Default)]
pub struct InMemoryCalendar {
    events: Vec<(String, EventBody)>,
}

impl InMemoryCalendar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl CalendarService for InMemoryCalendar {
    fn insert_event(&mut self, event: &EventBody) -> Result<String, CalendarError> {
        validate_event_body(event)?;
        let id = format!("evt-{}", self.events.len() + 1);
        self.events.push((id.clone(), event.clone()));
        info!("Stored event '{}' as {}", event.summary, id);
        Ok(id)
    }

    fn list_events(&self, query: &DayWindowQuery) -> Result<Vec<EventBody>, CalendarError> {
        validate_window_query(query)?;
        let min = parse_iso_datetime(&query.time_min)?;
        let max = parse_iso_datetime(&query.time_max)?;

        let mut found = Vec::new();
        for (_, event) in &self.events {
            let start = parse_iso_datetime(&event.start.date_time)?;
            if min <= start && start <= max {
                found.push((start, event.clone()));
            }
        }
        found.sort_by_key(|(start, _)| *start);
        debug!("{} events between {} and {}", found.len(), query.time_min, query.time_max);

        Ok(found.into_iter().map(|(_, event)| event).collect())
    }
}
