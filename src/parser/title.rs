//! Event title extraction
//!
//! Strips filler words and date/time fragments from an utterance and keeps
//! whatever is left as the title.

use log::debug;

use super::patterns::{
    TITLE_DATE_TOKEN_RE, TITLE_NUMBER_RE, TITLE_PUNCTUATION, TITLE_TIME_TOKEN_RE, is_noise_word,
    strip_verbose_dates,
};

pub const DEFAULT_TITLE: &str = "Evento";

/// Title for `text`, falling back to "Evento"
pub fn extract_title(text: &str) -> String {
    extract_title_or(text, DEFAULT_TITLE)
}

/// Title for `text`, falling back to `default` when nothing survives
pub fn extract_title_or(text: &str, default: &str) -> String {
    let spaced: String = strip_verbose_dates(text)
        .chars()
        .map(|c| if TITLE_PUNCTUATION.contains(&c) { ' ' } else { c })
        .collect();

    let kept: Vec<&str> = spaced.split_whitespace().filter(|token| !is_filtered(token)).collect();
    let title = capitalize(kept.join(" ").trim());

    if title.is_empty() {
        debug!("No title left in '{}', using '{}'", text, default);
        default.to_string()
    } else {
        title
    }
}

fn is_filtered(token: &str) -> bool {
    is_noise_word(token)
        || TITLE_DATE_TOKEN_RE.is_match(token)
        || TITLE_TIME_TOKEN_RE.is_match(token)
        || TITLE_NUMBER_RE.is_match(token)
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
