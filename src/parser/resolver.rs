//! Temporal resolver
//!
//! Turns an utterance plus a reference instant into one timezone-aware
//! instant. Resolution runs through [`Tier::ORDER`]; the first tier that
//! produces an instant wins; that instant is then localized to the target
//! zone and rolled over to the next day when it is already in the past.

use chrono::{DateTime, Datelike, Days, NaiveDate, NaiveTime};
use chrono_tz::Tz;
use log::{debug, info, warn};

use super::fallback::{FallbackConfig, FallbackParser, ParsedInstant, PortugueseDateParser};
use super::patterns::{self, DateSignal, Signals, TimeSignal};
use super::{ParseError, localize};
use crate::config::Config;

/// Malformed explicit date or time fields. Never leaves this module.
#[derive(Debug, thiserror::Error)]
enum ConstructionError {
    #[error("Invalid date fields {day}/{month}/{year}")]
    NumericConstructionFailure { day: u32, month: u32, year: i32 },
    #[error("Invalid time fields {hour}:{minute:02}")]
    InvalidTime { hour: u32, minute: u32 },
    #[error("Local time {0} does not exist in the target zone")]
    Nonexistent(String),
}

/// One resolution strategy, in priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    /// Date written out in the text, merged with any time signal
    ExplicitDate,
    /// Time without a date, anchored to the reference day or the relative day named
    TimeOnly,
    /// Relative-day keyword handed to the fallback parser
    RelativeDay,
    /// Last resort: an isolated temporal phrase handed to the fallback parser
    IsolatedPhrase,
}

impl Tier {
    pub const ORDER: [Tier; 4] =
        [Tier::ExplicitDate, Tier::TimeOnly, Tier::RelativeDay, Tier::IsolatedPhrase];
}

/// Per-call inputs shared by every tier
struct Attempt<'a> {
    text: &'a str,
    signals: Signals,
    reference: DateTime<Tz>,
}

pub struct TemporalResolver<P = PortugueseDateParser> {
    timezone: Tz,
    default_time: NaiveTime,
    fallback: P,
}

impl TemporalResolver<PortugueseDateParser> {
    pub fn new(timezone: Tz) -> Self {
        Self::with_fallback(timezone, PortugueseDateParser::new())
    }

    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let default_time =
            NaiveTime::from_hms_opt(config.resolver.default_hour, config.resolver.default_minute, 0)
                .ok_or_else(|| {
                    anyhow::anyhow!(
                        "Invalid default time {}:{:02}",
                        config.resolver.default_hour,
                        config.resolver.default_minute
                    )
                })?;
        Ok(Self::new(config.tz()?).with_default_time(default_time))
    }
}

impl<P: FallbackParser> TemporalResolver<P> {
    pub fn with_fallback(timezone: Tz, fallback: P) -> Self {
        let default_time = NaiveTime::from_hms_opt(9, 0, 0).unwrap_or(NaiveTime::MIN);
        Self { timezone, default_time, fallback }
    }

    /// Time used when an explicit date comes without a time
    pub fn with_default_time(mut self, default_time: NaiveTime) -> Self {
        self.default_time = default_time;
        self
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    /// Resolve `text` against `reference` into a localized, rolled-over instant
    pub fn resolve(&self, text: &str, reference: &DateTime<Tz>) -> Result<DateTime<Tz>, ParseError> {
        let attempt = self.attempt_for(text, reference);
        let failure = || ParseError::TemporalParseFailure { text: text.to_string() };

        let (_, instant) = self.first_tier(&attempt).ok_or_else(failure)?;
        self.normalize(instant, &attempt).ok_or_else(failure)
    }

    /// The calendar day `text` talks about
    ///
    /// A day written out in the text, as a date or a relative keyword, is taken
    /// as is. Only a day inferred from a bare time goes through the rollover.
    pub fn resolve_day(&self, text: &str, reference: &DateTime<Tz>) -> Result<NaiveDate, ParseError> {
        let attempt = self.attempt_for(text, reference);
        let failure = || ParseError::TemporalParseFailure { text: text.to_string() };

        let (tier, instant) = self.first_tier(&attempt).ok_or_else(failure)?;
        let names_a_day = tier == Tier::ExplicitDate || attempt.signals.relative.is_some();
        let resolved = if names_a_day {
            self.localize_parsed(instant)
        } else {
            self.normalize(instant, &attempt)
        };
        resolved.map(|dt| dt.date_naive()).ok_or_else(failure)
    }

    /// Run a single tier in isolation, without normalization
    pub fn resolve_tier(
        &self,
        tier: Tier,
        text: &str,
        reference: &DateTime<Tz>,
    ) -> Option<ParsedInstant> {
        self.run_tier(tier, &self.attempt_for(text, reference))
    }

    fn attempt_for<'a>(&self, text: &'a str, reference: &DateTime<Tz>) -> Attempt<'a> {
        Attempt {
            text,
            signals: patterns::scan(text),
            reference: reference.with_timezone(&self.timezone),
        }
    }

    fn first_tier(&self, attempt: &Attempt<'_>) -> Option<(Tier, ParsedInstant)> {
        debug!("Signals in '{}': {:?}", attempt.text, attempt.signals);
        let found = Tier::ORDER
            .iter()
            .find_map(|tier| self.run_tier(*tier, attempt).map(|instant| (*tier, instant)));

        match found {
            Some((tier, instant)) => debug!("Tier {:?} produced {:?}", tier, instant),
            None => info!("No tier could resolve '{}'", attempt.text),
        }
        found
    }

    fn run_tier(&self, tier: Tier, attempt: &Attempt<'_>) -> Option<ParsedInstant> {
        match tier {
            Tier::ExplicitDate => self.explicit_date(attempt),
            Tier::TimeOnly => self.time_only(attempt),
            Tier::RelativeDay => self.relative_day(attempt),
            Tier::IsolatedPhrase => self.isolated_phrase(attempt),
        }
    }

    fn explicit_date(&self, attempt: &Attempt<'_>) -> Option<ParsedInstant> {
        let date = attempt.signals.date?;
        match self.build_explicit(date, attempt.signals.time, &attempt.reference) {
            Ok(instant) => Some(ParsedInstant::Aware(instant.fixed_offset())),
            Err(e) => {
                warn!("Explicit date in '{}' rejected: {}", attempt.text, e);
                None
            }
        }
    }

    fn build_explicit(
        &self,
        date: DateSignal,
        time: Option<TimeSignal>,
        reference: &DateTime<Tz>,
    ) -> Result<DateTime<Tz>, ConstructionError> {
        let year = date.year.unwrap_or_else(|| reference.year());
        let day = NaiveDate::from_ymd_opt(year, date.month, date.day).ok_or(
            ConstructionError::NumericConstructionFailure { day: date.day, month: date.month, year },
        )?;
        let time = match time {
            Some(t) => NaiveTime::from_hms_opt(t.hour, t.minute, 0)
                .ok_or(ConstructionError::InvalidTime { hour: t.hour, minute: t.minute })?,
            None => self.default_time,
        };
        let naive = day.and_time(time);
        localize(&self.timezone, naive).ok_or_else(|| ConstructionError::Nonexistent(naive.to_string()))
    }

    fn time_only(&self, attempt: &Attempt<'_>) -> Option<ParsedInstant> {
        if attempt.signals.date.is_some() {
            return None;
        }
        let signal = attempt.signals.time?;
        let time = NaiveTime::from_hms_opt(signal.hour, signal.minute, 0)?;
        let offset = attempt.signals.relative.map_or(0, |relative| relative.offset_days());
        let day = attempt.reference.date_naive().checked_add_days(Days::new(offset))?;
        let mut instant = localize(&self.timezone, day.and_time(time))?;

        if offset == 0 && instant < attempt.reference && patterns::mentions_tomorrow(attempt.text) {
            debug!("'{}' is past and says amanhã, moving to the next day", attempt.text);
            instant = add_one_day(instant);
        }
        Some(ParsedInstant::Aware(instant.fixed_offset()))
    }

    fn relative_day(&self, attempt: &Attempt<'_>) -> Option<ParsedInstant> {
        if attempt.signals.date.is_some() {
            return None;
        }
        let relative = attempt.signals.relative?;
        let phrase = match attempt.signals.time {
            Some(time) => format!("{} {}", relative.keyword(), time.to_phrase()),
            None => relative.keyword().to_string(),
        };
        self.ask_fallback(&phrase, attempt)
    }

    fn isolated_phrase(&self, attempt: &Attempt<'_>) -> Option<ParsedInstant> {
        let signals = &attempt.signals;
        let mut phrases = Vec::new();
        if let (Some(relative), Some(time)) = (signals.relative, signals.time) {
            phrases.push(format!("{} {}", relative.keyword(), time.to_phrase()));
        }
        if let Some(relative) = signals.relative {
            phrases.push(relative.keyword().to_string());
        }
        if let Some(time) = signals.time {
            phrases.push(time.to_phrase());
        }
        if let Some(verbose) = patterns::find_verbose_date_phrase(attempt.text) {
            phrases.push(verbose.to_string());
        }

        if phrases.is_empty() {
            debug!("Nothing temporal left to hand over in '{}'", attempt.text);
        }
        phrases.iter().find_map(|phrase| self.ask_fallback(phrase, attempt))
    }

    fn ask_fallback(&self, phrase: &str, attempt: &Attempt<'_>) -> Option<ParsedInstant> {
        let config = FallbackConfig::portuguese(self.timezone, attempt.reference);
        let parsed = self.fallback.parse(phrase, &config);
        debug!("Fallback parser on '{}' returned {:?}", phrase, parsed);
        parsed
    }

    /// Localize naive instants, then roll past instants to the next day unless
    /// the text says "hoje"
    fn normalize(&self, instant: ParsedInstant, attempt: &Attempt<'_>) -> Option<DateTime<Tz>> {
        let localized = self.localize_parsed(instant)?;

        let now = attempt.reference;
        if localized < now && !patterns::mentions_today(attempt.text) {
            debug!("{} is before {}, rolling over one day", localized, now);
            return Some(add_one_day(localized));
        }
        Some(localized)
    }

    fn localize_parsed(&self, instant: ParsedInstant) -> Option<DateTime<Tz>> {
        match instant {
            ParsedInstant::Aware(dt) => Some(dt.with_timezone(&self.timezone)),
            ParsedInstant::Naive(naive) => localize(&self.timezone, naive),
        }
    }
}

fn add_one_day(instant: DateTime<Tz>) -> DateTime<Tz> {
    instant.checked_add_days(Days::new(1)).unwrap_or(instant + chrono::Duration::days(1))
}
