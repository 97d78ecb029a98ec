//! MIA: turns Brazilian Portuguese requests such as
//! "marcar reunião amanhã às 15h" into timezone-aware calendar events.

pub mod app;
pub mod calendar;
pub mod config;
pub mod parser;

// Re-export commonly used types
pub use calendar::{DayRangeQueryBuilder, DayWindow, EventAssembler, EventBody, EventDraft};
pub use config::Config;
pub use parser::{ParseError, TemporalResolver, extract_title};

/// Logging to stderr with a timestamp, `info` unless `RUST_LOG` says otherwise
pub fn init_logger() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format(|buf, record| {
            use chrono::Local;
            use std::io::Write;
            writeln!(
                buf,
                "{} [{}] {}",
                Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .init();
}
