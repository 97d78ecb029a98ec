use crate::calendar::{
    CalendarService, DayRangeQueryBuilder, EventAssembler, InMemoryCalendar, parse_iso_datetime,
};
use crate::config::Config;
use crate::parser::TemporalResolver;
use anyhow::Result;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use rustyline::DefaultEditor;
use std::sync::Arc;

/// What the assistant answers to one line of input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Text(String),
    Silent,
    Exit,
}

const HELP: &str = "Comandos:
  marcar <descrição com data/hora>  - cria um evento (ex.: marcar reunião com ana amanhã às 15h)
  agenda [dia]                      - lista os eventos do dia (ex.: agenda 10/12)
  ajuda                             - mostra esta ajuda
  sair                              - encerra";

pub struct Application {
    timezone: Tz,
    assembler: EventAssembler,
    windows: DayRangeQueryBuilder,
    calendar: InMemoryCalendar,
}

impl Application {
    pub fn new(config: &Config) -> Result<Self> {
        let resolver = Arc::new(TemporalResolver::from_config(config)?);
        Ok(Self {
            timezone: resolver.timezone(),
            assembler: EventAssembler::from_config(resolver.clone(), config),
            windows: DayRangeQueryBuilder::new(resolver),
            calendar: InMemoryCalendar::new(),
        })
    }

    /// Current instant in the configured zone
    pub fn now(&self) -> DateTime<Tz> {
        Utc::now().with_timezone(&self.timezone)
    }

    pub fn run(&mut self) -> Result<()> {
        log::info!("Starting MIA terminal in {}", self.timezone.name());
        let mut rl = DefaultEditor::new()?;

        println!("Bem-vindo ao assistente de agenda! Digite 'ajuda' para ver os comandos.");

        loop {
            match rl.readline("Você: ") {
                Ok(line) => {
                    let _ = rl.add_history_entry(line.as_str());
                    let now = self.now();
                    match self.handle_line(&line, &now) {
                        Ok(Reply::Text(text)) => println!("Assistente: {}", text),
                        Ok(Reply::Silent) => {}
                        Ok(Reply::Exit) => {
                            println!("Desligando...");
                            break;
                        }
                        Err(err) => log::error!("Failed to process input: {:?}", err),
                    }
                }
                Err(rustyline::error::ReadlineError::Interrupted) => {
                    println!("CTRL-C");
                    break;
                }
                Err(rustyline::error::ReadlineError::Eof) => {
                    println!("CTRL-D");
                    break;
                }
                Err(err) => {
                    println!("Error: {:?}", err);
                    break;
                }
            }
        }

        Ok(())
    }

    /// Answer one line of input as if it was typed at `now`
    pub fn handle_line(&mut self, line: &str, now: &DateTime<Tz>) -> Result<Reply> {
        let lowered = line.trim().to_lowercase();
        let text = lowered.trim_start_matches('/').trim();
        log::debug!("Handling input '{}'", text);

        let command = text.split_whitespace().next().unwrap_or("");
        match command {
            "" => Ok(Reply::Silent),
            "sair" | "exit" => Ok(Reply::Exit),
            "ajuda" | "help" => Ok(Reply::Text(HELP.to_string())),
            "agenda" | "listar" => self.list_day(text, now),
            _ => self.create_event(text, now),
        }
    }

    fn create_event(&mut self, text: &str, now: &DateTime<Tz>) -> Result<Reply> {
        let draft = match self.assembler.build_event(text, now) {
            Ok(draft) => draft,
            Err(e) => {
                log::warn!("{}", e);
                return Ok(Reply::Text(e.user_message().to_string()));
            }
        };

        let body = draft.to_body();
        let id = self.calendar.insert_event(&body)?;
        log::debug!("Calendar accepted {} as {}", body.summary, id);

        Ok(Reply::Text(format!(
            "Evento criado: {} em {}\n{}",
            body.summary,
            draft.start.format("%d/%m/%Y às %H:%M"),
            serde_json::to_string_pretty(&body)?
        )))
    }

    fn list_day(&self, text: &str, now: &DateTime<Tz>) -> Result<Reply> {
        // A bare "agenda" asks for today
        let text = if text.split_whitespace().count() == 1 { "hoje" } else { text };

        let window = match self.windows.build_day_window(text, now) {
            Ok(window) => window,
            Err(e) => {
                log::warn!("{}", e);
                return Ok(Reply::Text(e.user_message().to_string()));
            }
        };

        let events = self.calendar.list_events(&window.to_query())?;
        let day = window.start.format("%d/%m/%Y");
        if events.is_empty() {
            return Ok(Reply::Text(format!("Nenhum evento em {}.", day)));
        }

        let mut lines = vec![format!("Eventos em {}:", day)];
        for event in events {
            let start = parse_iso_datetime(&event.start.date_time)?;
            lines.push(format!("- {} {}", start.format("%H:%M"), event.summary));
        }
        Ok(Reply::Text(lines.join("\n")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono_tz::America::Sao_Paulo;
    use pretty_assertions::assert_eq;

    fn app() -> Application {
        Application::new(&Config::default()).unwrap()
    }

    fn now() -> DateTime<Tz> {
        Sao_Paulo.with_ymd_and_hms(2025, 1, 1, 10, 0, 0).unwrap()
    }

    fn text_of(reply: Reply) -> String {
        match reply {
            Reply::Text(text) => text,
            other => panic!("expected text, got {:?}", other),
        }
    }

    #[test]
    fn test_exit_and_help() {
        let mut app = app();
        assert_eq!(app.handle_line("sair", &now()).unwrap(), Reply::Exit);
        assert_eq!(app.handle_line("EXIT", &now()).unwrap(), Reply::Exit);
        assert_eq!(app.handle_line("   ", &now()).unwrap(), Reply::Silent);
        assert!(text_of(app.handle_line("/ajuda", &now()).unwrap()).contains("agenda"));
    }

    #[test]
    fn test_create_then_list() {
        let mut app = app();
        let created =
            text_of(app.handle_line("/Marcar reunião com Felipe amanhã às 15h", &now()).unwrap());
        assert!(created.starts_with("Evento criado: Felipe em 02/01/2025 às 15:00"));
        assert!(created.contains("\"dateTime\": \"2025-01-02T15:00:00-03:00\""));

        let listed = text_of(app.handle_line("agenda amanhã", &now()).unwrap());
        assert_eq!(listed, "Eventos em 02/01/2025:\n- 15:00 Felipe");

        let empty = text_of(app.handle_line("agenda", &now()).unwrap());
        assert_eq!(empty, "Nenhum evento em 01/01/2025.");
    }

    #[test]
    fn test_unparseable_date_is_a_message() {
        let mut app = app();
        let reply = text_of(app.handle_line("marcar reunião com felipe", &now()).unwrap());
        assert_eq!(reply, crate::parser::PARSE_FAILURE_MESSAGE);
    }
}
