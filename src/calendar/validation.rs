//! Validation functions for event bodies and range queries.
//!
//! Runs before anything is handed to the calendar service.

use chrono::{DateTime, FixedOffset};
use chrono_tz::Tz;
use log::warn;

use super::{CalendarError, DayWindowQuery, EventBody};

/// Parse an ISO-8601 string produced by [`super::ISO_FORMAT`]
pub fn parse_iso_datetime(value: &str) -> Result<DateTime<FixedOffset>, CalendarError> {
    DateTime::parse_from_rfc3339(value)
        .map_err(|e| CalendarError::InvalidDateTime(format!("'{}': {}", value, e)))
}

/// Validate a timezone name against the tz database
pub fn validate_timezone(name: &str) -> Result<Tz, CalendarError> {
    name.parse::<Tz>()
        .map_err(|_| CalendarError::InvalidDateTime(format!("Unknown timezone '{}'", name)))
}

pub fn validate_event_body(body: &EventBody) -> Result<(), CalendarError> {
    if body.summary.trim().is_empty() {
        return Err(CalendarError::InvalidEvent("Event summary cannot be empty".to_string()));
    }
    if body.summary.len() > 250 {
        warn!("Event summary is very long: {} characters", body.summary.len());
    }

    validate_timezone(&body.start.time_zone)?;
    validate_timezone(&body.end.time_zone)?;

    let start = parse_iso_datetime(&body.start.date_time)?;
    let end = parse_iso_datetime(&body.end.date_time)?;
    if end <= start {
        return Err(CalendarError::InvalidEvent(format!(
            "Event ends ({}) before it starts ({})",
            body.end.date_time, body.start.date_time
        )));
    }
    Ok(())
}

pub fn validate_window_query(query: &DayWindowQuery) -> Result<(), CalendarError> {
    let min = parse_iso_datetime(&query.time_min)?;
    let max = parse_iso_datetime(&query.time_max)?;
    if max < min {
        return Err(CalendarError::InvalidWindow(format!(
            "timeMax {} is before timeMin {}",
            query.time_max, query.time_min
        )));
    }
    if min.date_naive() != max.date_naive() {
        return Err(CalendarError::InvalidWindow(format!(
            "{} and {} are on different days",
            query.time_min, query.time_max
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::EventDateTime;

    fn body(summary: &str, start: &str, end: &str) -> EventBody {
        EventBody {
            summary: summary.to_string(),
            start: EventDateTime {
                date_time: start.to_string(),
                time_zone: "America/Sao_Paulo".to_string(),
            },
            end: EventDateTime { date_time: end.to_string(), time_zone: "America/Sao_Paulo".to_string() },
        }
    }

    #[test]
    fn test_valid_event_body() {
        let b = body("Felipe", "2025-12-10T15:00:00-03:00", "2025-12-10T15:30:00-03:00");
        assert!(validate_event_body(&b).is_ok());
    }

    #[test]
    fn test_invalid_event_bodies() {
        let empty = body("  ", "2025-12-10T15:00:00-03:00", "2025-12-10T15:30:00-03:00");
        assert!(matches!(validate_event_body(&empty), Err(CalendarError::InvalidEvent(_))));

        let backwards = body("Felipe", "2025-12-10T15:30:00-03:00", "2025-12-10T15:00:00-03:00");
        assert!(matches!(validate_event_body(&backwards), Err(CalendarError::InvalidEvent(_))));

        let garbled = body("Felipe", "10/12/2025 15h", "2025-12-10T15:30:00-03:00");
        assert!(matches!(validate_event_body(&garbled), Err(CalendarError::InvalidDateTime(_))));

        let mut bad_zone = body("Felipe", "2025-12-10T15:00:00-03:00", "2025-12-10T15:30:00-03:00");
        bad_zone.start.time_zone = "Brasil/Recife".to_string();
        assert!(validate_event_body(&bad_zone).is_err());
    }

    #[test]
    fn test_window_query_validation() {
        let ok = DayWindowQuery {
            time_min: "2025-12-10T00:00:00-03:00".to_string(),
            time_max: "2025-12-10T23:59:59-03:00".to_string(),
        };
        assert!(validate_window_query(&ok).is_ok());

        let two_days = DayWindowQuery {
            time_min: "2025-12-10T00:00:00-03:00".to_string(),
            time_max: "2025-12-11T23:59:59-03:00".to_string(),
        };
        assert!(matches!(validate_window_query(&two_days), Err(CalendarError::InvalidWindow(_))));
    }
}
