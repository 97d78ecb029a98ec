//! Generic free-text date parser used as the resolver's last resort
//!
//! The resolver only hands isolated temporal phrases to a [`FallbackParser`]
//! ("amanhã", "amanhã 15:00", "25 de dezembro"), never a whole utterance.
//! [`PortugueseDateParser`] is the built-in pt-BR engine; anything else that
//! implements the trait can replace it.

use chrono::{DateTime, Datelike, Days, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use chrono_tz::Tz;
use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;

use super::localize;
use super::patterns::month_from_name;

/// How ambiguous numeric dates are read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateOrder {
    DayMonthYear,
    MonthDayYear,
}

/// Settings handed to the fallback parser on every call
#[derive(Debug, Clone)]
pub struct FallbackConfig {
    pub language: &'static str,
    pub date_order: DateOrder,
    /// Push ambiguous results (bare times, dates without a year) into the future
    pub prefer_future: bool,
    pub timezone: Tz,
    /// Return timezone-aware instants instead of naive ones
    pub return_aware: bool,
    pub relative_base: DateTime<Tz>,
}

impl FallbackConfig {
    pub fn portuguese(timezone: Tz, relative_base: DateTime<Tz>) -> Self {
        Self {
            language: "pt",
            date_order: DateOrder::DayMonthYear,
            prefer_future: true,
            timezone,
            return_aware: true,
            relative_base: relative_base.with_timezone(&timezone),
        }
    }
}

/// An instant produced by a resolution step, possibly still without a zone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParsedInstant {
    Aware(DateTime<FixedOffset>),
    Naive(NaiveDateTime),
}

/// Free-text date/time parser capability
pub trait FallbackParser: Send + Sync {
    /// Parse an isolated temporal phrase, or `None` when it cannot be understood
    fn parse(&self, phrase: &str, config: &FallbackConfig) -> Option<ParsedInstant>;
}

static RELATIVE_PREFIX_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(depois\s+de\s+amanh[ãa]|amanh[ãa]|hoje|ontem|agora)\b\s*(.*)$").unwrap()
});

static VERBOSE_PREFIX_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{1,2})\s+de\s+([a-zç]+)(?:\s+de\s+(\d{4}))?\b\s*(.*)$").unwrap()
});

static NUMERIC_PREFIX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{1,2})[/-](\d{1,2})(?:[/-](\d{4}|\d{2}))?\b\s*(.*)$").unwrap());

static TIME_ONLY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:(?:às|as|a)\s+)?(\d{1,2})(?::(\d{2})|h(\d{2})?)$").unwrap());

/// Day part of a phrase
enum DayPart {
    Relative(i64),
    Now,
    Explicit { date: NaiveDate, year_given: bool },
    Unspecified,
}

/// Built-in Brazilian Portuguese phrase parser
#[derive(Debug, Clone, Copy, Default)]
pub struct PortugueseDateParser;

impl PortugueseDateParser {
    pub fn new() -> Self {
        Self
    }

    fn split_day_part<'a>(
        &self,
        phrase: &'a str,
        config: &FallbackConfig,
    ) -> Option<(DayPart, &'a str)> {
        let base = config.relative_base.date_naive();

        if let Some(caps) = RELATIVE_PREFIX_RE.captures(phrase) {
            let keyword = caps[1].split_whitespace().collect::<Vec<_>>().join(" ");
            let part = match keyword.as_str() {
                "hoje" => DayPart::Relative(0),
                "amanhã" | "amanha" => DayPart::Relative(1),
                "depois de amanhã" | "depois de amanha" => DayPart::Relative(2),
                "ontem" => DayPart::Relative(-1),
                _ => DayPart::Now,
            };
            return Some((part, caps.get(2).map_or("", |m| m.as_str())));
        }

        if let Some(caps) = VERBOSE_PREFIX_RE.captures(phrase) {
            let day: u32 = caps[1].parse().ok()?;
            let month = month_from_name(&caps[2])?;
            let year = match caps.get(3) {
                Some(y) => Some(y.as_str().parse::<i32>().ok()?),
                None => None,
            };
            let date = NaiveDate::from_ymd_opt(year.unwrap_or(base.year()), month, day)?;
            let rest = caps.get(4).map_or("", |m| m.as_str());
            return Some((DayPart::Explicit { date, year_given: year.is_some() }, rest));
        }

        if let Some(caps) = NUMERIC_PREFIX_RE.captures(phrase) {
            let first: u32 = caps[1].parse().ok()?;
            let second: u32 = caps[2].parse().ok()?;
            let (day, month) = match config.date_order {
                DateOrder::DayMonthYear => (first, second),
                DateOrder::MonthDayYear => (second, first),
            };
            let year = match caps.get(3) {
                Some(y) => Some(y.as_str().parse::<i32>().ok()?),
                None => None,
            };
            let date = NaiveDate::from_ymd_opt(year.unwrap_or(base.year()), month, day)?;
            let rest = caps.get(4).map_or("", |m| m.as_str());
            return Some((DayPart::Explicit { date, year_given: year.is_some() }, rest));
        }

        Some((DayPart::Unspecified, phrase))
    }

    fn parse_time(&self, rest: &str) -> Option<Option<NaiveTime>> {
        let rest = rest.trim();
        if rest.is_empty() {
            return Some(None);
        }
        let caps = TIME_ONLY_RE.captures(rest)?;
        let hour: u32 = caps[1].parse().ok()?;
        let minute: u32 = match caps.get(2).or_else(|| caps.get(3)) {
            Some(m) => m.as_str().parse().ok()?,
            None => 0,
        };
        NaiveTime::from_hms_opt(hour, minute, 0).map(Some)
    }
}

impl FallbackParser for PortugueseDateParser {
    fn parse(&self, phrase: &str, config: &FallbackConfig) -> Option<ParsedInstant> {
        if config.language != "pt" {
            warn!("Portuguese parser asked to parse language '{}'", config.language);
            return None;
        }

        let phrase = phrase.trim().to_lowercase();
        let phrase = phrase.trim_start_matches("às ").trim_start_matches("as ").trim();
        if phrase.is_empty() {
            return None;
        }

        let base = config.relative_base.naive_local();
        let (day_part, rest) = self.split_day_part(phrase, config)?;
        let time = self.parse_time(rest)?;

        let naive = match (day_part, time) {
            (DayPart::Now, None) => base,
            (DayPart::Now, Some(_)) => return None,
            (DayPart::Relative(offset), time) => {
                let date = if offset >= 0 {
                    base.date().checked_add_days(Days::new(offset.unsigned_abs()))?
                } else {
                    base.date().checked_sub_days(Days::new(offset.unsigned_abs()))?
                };
                date.and_time(time.unwrap_or(base.time()))
            }
            (DayPart::Explicit { date, year_given }, time) => {
                let mut naive = date.and_time(time.unwrap_or(NaiveTime::MIN));
                if config.prefer_future && !year_given && naive < base {
                    naive = naive.with_year(naive.year() + 1)?;
                }
                naive
            }
            (DayPart::Unspecified, Some(time)) => {
                let mut naive = base.date().and_time(time);
                if config.prefer_future && naive < base {
                    naive = naive.checked_add_days(Days::new(1))?;
                }
                naive
            }
            (DayPart::Unspecified, None) => return None,
        };

        debug!("Fallback parser read '{}' as {}", phrase, naive);

        if config.return_aware {
            localize(&config.timezone, naive).map(|dt| ParsedInstant::Aware(dt.fixed_offset()))
        } else {
            Some(ParsedInstant::Naive(naive))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Timelike};
    use chrono_tz::America::Sao_Paulo;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    fn config_at(y: i32, m: u32, d: u32, h: u32, min: u32) -> FallbackConfig {
        let base = Sao_Paulo.with_ymd_and_hms(y, m, d, h, min, 0).unwrap();
        FallbackConfig::portuguese(Sao_Paulo, base)
    }

    fn naive_of(parsed: ParsedInstant) -> NaiveDateTime {
        match parsed {
            ParsedInstant::Aware(dt) => dt.naive_local(),
            ParsedInstant::Naive(naive) => naive,
        }
    }

    fn ymd_hm(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(h, min, 0).unwrap()
    }

    #[test_case("hoje", ymd_hm(2025, 1, 1, 10, 0) ; "today keeps base time")]
    #[test_case("amanhã", ymd_hm(2025, 1, 2, 10, 0) ; "tomorrow keeps base time")]
    #[test_case("amanha 15:00", ymd_hm(2025, 1, 2, 15, 0) ; "tomorrow with time")]
    #[test_case("depois de amanhã às 8h", ymd_hm(2025, 1, 3, 8, 0) ; "day after tomorrow")]
    #[test_case("ontem", ymd_hm(2024, 12, 31, 10, 0) ; "yesterday")]
    #[test_case("agora", ymd_hm(2025, 1, 1, 10, 0) ; "now")]
    #[test_case("15:30", ymd_hm(2025, 1, 1, 15, 30) ; "later today")]
    #[test_case("9:00", ymd_hm(2025, 1, 2, 9, 0) ; "past time prefers tomorrow")]
    #[test_case("25 de dezembro", ymd_hm(2025, 12, 25, 0, 0) ; "verbose date")]
    #[test_case("25 de dezembro de 2024", ymd_hm(2024, 12, 25, 0, 0) ; "verbose date with past year")]
    #[test_case("1 de janeiro às 8h", ymd_hm(2026, 1, 1, 8, 0) ; "past verbose date prefers next year")]
    #[test_case("10/12/2025 15:00", ymd_hm(2025, 12, 10, 15, 0) ; "numeric day first")]
    fn test_parse_phrases(phrase: &str, expected: NaiveDateTime) {
        let config = config_at(2025, 1, 1, 10, 0);
        let parsed = PortugueseDateParser::new().parse(phrase, &config).unwrap();
        assert_eq!(naive_of(parsed), expected);
    }

    #[test_case("" ; "empty")]
    #[test_case("reunião com felipe" ; "no temporal content")]
    #[test_case("amanhã reunião" ; "trailing noise")]
    #[test_case("25:00" ; "hour out of range")]
    #[test_case("31 de fevereiro" ; "impossible date")]
    #[test_case("agora 15:00" ; "now with a time")]
    fn test_parse_rejects(phrase: &str) {
        let config = config_at(2025, 1, 1, 10, 0);
        assert_eq!(PortugueseDateParser::new().parse(phrase, &config), None);
    }

    #[test]
    fn test_month_first_order() {
        let mut config = config_at(2025, 1, 1, 10, 0);
        config.date_order = DateOrder::MonthDayYear;
        let parsed = PortugueseDateParser::new().parse("12/10/2025", &config).unwrap();
        assert_eq!(naive_of(parsed), ymd_hm(2025, 12, 10, 0, 0));
    }

    #[test]
    fn test_naive_and_aware_output() {
        let mut config = config_at(2025, 6, 1, 10, 0);
        let parsed = PortugueseDateParser::new().parse("amanhã 14:00", &config).unwrap();
        match parsed {
            ParsedInstant::Aware(dt) => {
                assert_eq!(dt.offset().local_minus_utc(), -3 * 3600);
                assert_eq!(dt.hour(), 14);
            }
            ParsedInstant::Naive(_) => panic!("expected an aware instant"),
        }

        config.return_aware = false;
        let parsed = PortugueseDateParser::new().parse("amanhã 14:00", &config).unwrap();
        assert_eq!(parsed, ParsedInstant::Naive(ymd_hm(2025, 6, 2, 14, 0)));
    }

    #[test]
    fn test_other_language_is_refused() {
        let mut config = config_at(2025, 1, 1, 10, 0);
        config.language = "en";
        assert_eq!(PortugueseDateParser::new().parse("amanhã", &config), None);
    }
}
