//! Pattern library for Brazilian Portuguese date and time expressions
//!
//! Every matcher is compiled once and shared between calls. The `find_*`
//! functions return the leftmost match only: an utterance is assumed to carry
//! at most one date expression and one time expression. Not finding anything
//! is a normal `None`, never an error.

use once_cell::sync::Lazy;
use regex::Regex;
use std::borrow::Cow;

/// `D/M/Y`, `D-M-Y` (two or four digit year) and `D/M`
static NUMERIC_DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d{1,2})[/-](\d{1,2})(?:[/-](\d{4}|\d{2}))?\b").unwrap());

/// `D de <mês> [de Y]`
static VERBOSE_DATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\b(\d{1,2})\s+de\s+(janeiro|fevereiro|mar[çc]o|abril|maio|junho|julho|agosto|setembro|outubro|novembro|dezembro)(?:\s+de\s+(\d{4}))?\b",
    )
    .unwrap()
});

/// `H:MM`, `HhMM` and `Hh`
static TIME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d{1,2})(?::(\d{2})|h(\d{2})?)\b").unwrap());

static RELATIVE_DAY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(depois\s+de\s+amanh[ãa]|amanh[ãa]|hoje)\b").unwrap());

static TODAY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bhoje\b").unwrap());

static TOMORROW_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bamanh[ãa]\b").unwrap());

/// Title tokens shaped like `D`, `D/M`, `D/M/Y` or `D-M-Y`
pub(crate) static TITLE_DATE_TOKEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{1,2}(?:[/-]\d{1,2}(?:[/-]\d{2,4})?)?$").unwrap());

/// Title tokens shaped like `15h`, `15h30` or `15:30`
pub(crate) static TITLE_TIME_TOKEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{1,2}(?:h\d{0,2}|:\d{2})$").unwrap());

/// Stand-alone years and other bare 2-4 digit numbers
pub(crate) static TITLE_NUMBER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{2,4}$").unwrap());

/// Filler words dropped from event titles
pub const NOISE_WORDS: &[&str] = &[
    "marcar", "marque", "reunião", "agenda", "evento", "de", "do", "da", "para", "pro", "a", "o",
    "com", "às", "as", "hoje", "amanhã", "amanha", "depois",
];

/// Characters replaced by spaces before a title is tokenized
pub const TITLE_PUNCTUATION: &[char] = &['/', ',', '.', ':', ';', '@', '#', '\n'];

/// A calendar date written out in the text. `year` is `None` for `D/M`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateSignal {
    pub day: u32,
    pub month: u32,
    pub year: Option<i32>,
}

/// A clock time written out in the text, not yet range checked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeSignal {
    pub hour: u32,
    pub minute: u32,
}

impl TimeSignal {
    /// Colon form handed to the fallback parser, e.g. `15:00`
    pub fn to_phrase(&self) -> String {
        format!("{}:{:02}", self.hour, self.minute)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelativeDay {
    Today,
    Tomorrow,
    DayAfterTomorrow,
}

impl RelativeDay {
    pub fn keyword(&self) -> &'static str {
        match self {
            RelativeDay::Today => "hoje",
            RelativeDay::Tomorrow => "amanhã",
            RelativeDay::DayAfterTomorrow => "depois de amanhã",
        }
    }

    /// Days between the reference day and the day this keyword names
    pub fn offset_days(&self) -> u64 {
        match self {
            RelativeDay::Today => 0,
            RelativeDay::Tomorrow => 1,
            RelativeDay::DayAfterTomorrow => 2,
        }
    }

    fn from_keyword(keyword: &str) -> Option<Self> {
        let normalized = keyword.split_whitespace().collect::<Vec<_>>().join(" ");
        match normalized.as_str() {
            "hoje" => Some(RelativeDay::Today),
            "amanhã" | "amanha" => Some(RelativeDay::Tomorrow),
            "depois de amanhã" | "depois de amanha" => Some(RelativeDay::DayAfterTomorrow),
            _ => None,
        }
    }
}

/// One thing detected in an utterance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemporalSignal {
    ExplicitDate(DateSignal),
    ExplicitTime(TimeSignal),
    RelativeDay(RelativeDay),
}

/// Everything [`scan`] found. Several signals may be present at once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Signals {
    pub date: Option<DateSignal>,
    pub time: Option<TimeSignal>,
    pub relative: Option<RelativeDay>,
}

impl Signals {
    pub fn is_empty(&self) -> bool {
        self.date.is_none() && self.time.is_none() && self.relative.is_none()
    }

    pub fn to_vec(&self) -> Vec<TemporalSignal> {
        let mut signals = Vec::new();
        if let Some(date) = self.date {
            signals.push(TemporalSignal::ExplicitDate(date));
        }
        if let Some(time) = self.time {
            signals.push(TemporalSignal::ExplicitTime(time));
        }
        if let Some(relative) = self.relative {
            signals.push(TemporalSignal::RelativeDay(relative));
        }
        signals
    }
}

/// Run every matcher over `text`
pub fn scan(text: &str) -> Signals {
    Signals { date: find_date(text), time: find_time(text), relative: find_relative_day(text) }
}

/// Leftmost numeric or verbose date
pub fn find_date(text: &str) -> Option<DateSignal> {
    let numeric = NUMERIC_DATE_RE
        .captures_iter(text)
        .find(|caps| caps.get(0).is_some_and(|m| !continues_a_date(text, m.start())))
        .and_then(|caps| {
            let start = caps.get(0)?.start();
            let day = caps[1].parse().ok()?;
            let month = caps[2].parse().ok()?;
            let year = match caps.get(3) {
                Some(y) => Some(y.as_str().parse().ok()?),
                None => None,
            };
            Some((start, DateSignal { day, month, year }))
        });

    let verbose = VERBOSE_DATE_RE.captures(text).and_then(|caps| {
        let start = caps.get(0)?.start();
        let day = caps[1].parse().ok()?;
        let month = month_from_name(&caps[2])?;
        let year = match caps.get(3) {
            Some(y) => Some(y.as_str().parse().ok()?),
            None => None,
        };
        Some((start, DateSignal { day, month, year }))
    });

    match (numeric, verbose) {
        (Some(n), Some(v)) => Some(if v.0 < n.0 { v.1 } else { n.1 }),
        (n, v) => n.or(v).map(|(_, signal)| signal),
    }
}

/// `12-10` inside `2025-12-10` is not a date of its own
fn continues_a_date(text: &str, start: usize) -> bool {
    text[..start].ends_with(&['-', '/'][..])
}

/// Leftmost time in colon or `h` notation; a bare `15h` means `15:00`
pub fn find_time(text: &str) -> Option<TimeSignal> {
    let caps = TIME_RE.captures(text)?;
    let hour = caps[1].parse().ok()?;
    let minute = match caps.get(2).or_else(|| caps.get(3)) {
        Some(m) => m.as_str().parse().ok()?,
        None => 0,
    };
    Some(TimeSignal { hour, minute })
}

/// Leftmost relative-day keyword, matched as a whole word
pub fn find_relative_day(text: &str) -> Option<RelativeDay> {
    RELATIVE_DAY_RE.find(text).and_then(|m| RelativeDay::from_keyword(m.as_str()))
}

/// The verbose date exactly as written, e.g. `10 de dezembro de 2025`
pub fn find_verbose_date_phrase(text: &str) -> Option<&str> {
    VERBOSE_DATE_RE.find(text).map(|m| m.as_str())
}

/// `text` with every verbose date blanked out
pub fn strip_verbose_dates(text: &str) -> Cow<'_, str> {
    VERBOSE_DATE_RE.replace_all(text, " ")
}

pub fn mentions_today(text: &str) -> bool {
    TODAY_RE.is_match(text)
}

pub fn mentions_tomorrow(text: &str) -> bool {
    TOMORROW_RE.is_match(text)
}

pub fn is_noise_word(token: &str) -> bool {
    let lower = token.to_lowercase();
    NOISE_WORDS.contains(&lower.as_str())
}

pub fn month_from_name(name: &str) -> Option<u32> {
    let month = match name {
        "janeiro" => 1,
        "fevereiro" => 2,
        "março" | "marco" => 3,
        "abril" => 4,
        "maio" => 5,
        "junho" => 6,
        "julho" => 7,
        "agosto" => 8,
        "setembro" => 9,
        "outubro" => 10,
        "novembro" => 11,
        "dezembro" => 12,
        _ => return None,
    };
    Some(month)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    #[test_case("reunião 10/12/2025 às 15h", 10, 12, Some(2025) ; "slash with four digit year")]
    #[test_case("reunião 10-12-2025", 10, 12, Some(2025) ; "hyphen separators")]
    #[test_case("dentista 5/3/26", 5, 3, Some(26) ; "two digit year kept literal")]
    #[test_case("almoço 10/12", 10, 12, None ; "no year")]
    #[test_case("festa 25 de dezembro", 25, 12, None ; "verbose without year")]
    #[test_case("prova 2 de março de 2026", 2, 3, Some(2026) ; "verbose with year")]
    #[test_case("prova 2 de marco", 2, 3, None ; "verbose without cedilla")]
    fn test_find_date(text: &str, day: u32, month: u32, year: Option<i32>) {
        assert_eq!(find_date(text), Some(DateSignal { day, month, year }));
    }

    #[test]
    fn test_find_date_prefers_leftmost() {
        let signal = find_date("1 de maio ou 10/12").unwrap();
        assert_eq!(signal, DateSignal { day: 1, month: 5, year: None });

        let signal = find_date("10/12 ou 1 de maio").unwrap();
        assert_eq!(signal, DateSignal { day: 10, month: 12, year: None });
    }

    #[test]
    fn test_find_date_skips_iso_dates() {
        assert_eq!(find_date("2025-12-10"), None);
        let signal = find_date("log 2025-12-10, prova 3/4").unwrap();
        assert_eq!(signal, DateSignal { day: 3, month: 4, year: None });
    }

    #[test]
    fn test_strip_verbose_dates() {
        assert_eq!(strip_verbose_dates("festa 25 de dezembro de 2025 às 20h"), "festa   às 20h");
        assert_eq!(strip_verbose_dates("festa em dezembro"), "festa em dezembro");
    }

    #[test]
    fn test_find_date_ignores_times() {
        assert_eq!(find_date("às 15:30"), None);
        assert_eq!(find_date("às 15h"), None);
    }

    #[test_case("às 15h", 15, 0 ; "bare hour")]
    #[test_case("às 15h30", 15, 30 ; "h with minutes")]
    #[test_case("às 9:05", 9, 5 ; "colon form")]
    #[test_case("10/12/2025 às 8h", 8, 0 ; "after a date")]
    fn test_find_time(text: &str, hour: u32, minute: u32) {
        assert_eq!(find_time(text), Some(TimeSignal { hour, minute }));
    }

    #[test]
    fn test_find_time_absent() {
        assert_eq!(find_time("reunião 10/12/2025"), None);
        assert_eq!(find_time("ligar para 15 pessoas"), None);
        assert_eq!(find_time("15hrs"), None);
    }

    #[test]
    fn test_find_time_keeps_out_of_range_values() {
        // range checks belong to the resolver
        assert_eq!(find_time("às 25h"), Some(TimeSignal { hour: 25, minute: 0 }));
    }

    #[test_case("reunião hoje", Some(RelativeDay::Today) ; "today")]
    #[test_case("reunião amanhã às 10h", Some(RelativeDay::Tomorrow) ; "tomorrow")]
    #[test_case("reunião amanha", Some(RelativeDay::Tomorrow) ; "tomorrow without tilde")]
    #[test_case("depois de amanhã", Some(RelativeDay::DayAfterTomorrow) ; "day after tomorrow")]
    #[test_case("depois  de amanha", Some(RelativeDay::DayAfterTomorrow) ; "extra spaces")]
    #[test_case("hojeeee", None ; "not a whole word")]
    #[test_case("desamanha", None ; "embedded in another word")]
    fn test_find_relative_day(text: &str, expected: Option<RelativeDay>) {
        assert_eq!(find_relative_day(text), expected);
    }

    #[test]
    fn test_keyword_checks() {
        assert!(mentions_today("hoje às 15h"));
        assert!(!mentions_today("hojes"));
        assert!(mentions_tomorrow("depois de amanhã"));
        assert!(!mentions_tomorrow("amanhecer"));
    }

    #[test]
    fn test_scan_collects_every_signal() {
        let signals = scan("marcar reunião amanhã 10/12 às 15h30");
        assert_eq!(
            signals.to_vec(),
            vec![
                TemporalSignal::ExplicitDate(DateSignal { day: 10, month: 12, year: None }),
                TemporalSignal::ExplicitTime(TimeSignal { hour: 15, minute: 30 }),
                TemporalSignal::RelativeDay(RelativeDay::Tomorrow),
            ]
        );
        assert!(scan("comprar pão").is_empty());
    }

    #[test]
    fn test_verbose_phrase_and_noise() {
        assert_eq!(find_verbose_date_phrase("festa 25 de dezembro às 20h"), Some("25 de dezembro"));
        assert!(is_noise_word("Reunião"));
        assert!(is_noise_word("COM"));
        assert!(!is_noise_word("felipe"));
        assert_eq!(TimeSignal { hour: 9, minute: 0 }.to_phrase(), "9:00");
    }
}
