// Result and diagnostic rendering for the lexflow CLI.
//
// Results go to stdout and diagnostics to stderr. A terminal gets text,
// anything else gets one JSON object per line. `--json` forces JSON.

use std::io::{self, IsTerminal, Write};

use anyhow::Context;
use lexflow_sync::backend::BackendError;
use lexflow_sync::config::ENV_GOOGLE_CLIENT_ID;
use lexflow_sync::SyncError;
use serde::Serialize;

const ANSI_RED: &str = "\x1b[31m";
const ANSI_YELLOW: &str = "\x1b[33m";
const ANSI_RESET: &str = "\x1b[0m";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Human,
    Json,
}

impl OutputFormat {
    /// JSON if `--json` was passed or stdout is not a terminal.
    pub fn detect(json_flag: bool) -> Self {
        if json_flag {
            return Self::Json;
        }
        Self::detect_from_terminal(io::stdout().is_terminal())
    }

    pub fn detect_from_terminal(is_tty: bool) -> Self {
        if is_tty {
            Self::Human
        } else {
            Self::Json
        }
    }
}

/// The text printed for a command result. `human_fn` only runs for `Human`.
pub fn render<T, F>(format: OutputFormat, value: &T, human_fn: F) -> serde_json::Result<String>
where
    T: Serialize,
    F: FnOnce(&T) -> String,
{
    match format {
        OutputFormat::Human => Ok(human_fn(value)),
        OutputFormat::Json => serde_json::to_string(value),
    }
}

pub fn print_output<T, F>(format: OutputFormat, value: &T, human_fn: F) -> anyhow::Result<()>
where
    T: Serialize,
    F: FnOnce(&T) -> String,
{
    let text = render(format, value, human_fn).context("failed to encode command output")?;
    writeln!(io::stdout().lock(), "{text}").context("failed to write command output")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Severity {
    Error,
    Warning,
}

impl Severity {
    fn label(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
        }
    }

    fn colour(self) -> &'static str {
        match self {
            Self::Error => ANSI_RED,
            Self::Warning => ANSI_YELLOW,
        }
    }
}

/// A stable code plus a message the user can act on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub code: &'static str,
    pub message: String,
}

impl Diagnostic {
    fn new(code: &'static str, message: impl Into<String>) -> Self {
        Self { code, message: message.into() }
    }

    fn render(&self, severity: Severity, format: OutputFormat, colour: bool) -> String {
        match format {
            OutputFormat::Human if colour => {
                format!("{}{}:{ANSI_RESET} {}", severity.colour(), severity.label(), self.message)
            }
            OutputFormat::Human => format!("{}: {}", severity.label(), self.message),
            OutputFormat::Json => {
                let mut object = serde_json::Map::new();
                object.insert(
                    severity.label().to_string(),
                    serde_json::json!({ "code": self.code, "message": self.message }),
                );
                serde_json::Value::Object(object).to_string()
            }
        }
    }

    fn print(&self, severity: Severity, format: OutputFormat) {
        let line = self.render(severity, format, io::stderr().is_terminal());
        let _ = writeln!(io::stderr().lock(), "{line}");
    }
}

pub fn print_warning(format: OutputFormat, code: &'static str, message: impl Into<String>) {
    Diagnostic::new(code, message).print(Severity::Warning, format);
}

pub fn print_anyhow_error(format: OutputFormat, error: &anyhow::Error) {
    diagnose(error).print(Severity::Error, format);
}

/// Map a command failure to its code and a next step.
pub fn diagnose(error: &anyhow::Error) -> Diagnostic {
    let message = format!("{error:#}");

    for cause in error.chain() {
        if let Some(SyncError::UnknownRecord { kind, id }) = cause.downcast_ref::<SyncError>() {
            return Diagnostic::new(
                "RECORD_NOT_FOUND",
                format!("No {kind} with id {id}. Run: lexflow ls {} to see available records", kind.table()),
            );
        }
        let backend_err = match cause.downcast_ref::<SyncError>() {
            Some(SyncError::Backend(inner)) => Some(inner),
            _ => cause.downcast_ref::<BackendError>(),
        };
        match backend_err {
            Some(BackendError::Transport(_)) => {
                return Diagnostic::new(
                    "NETWORK_ERROR",
                    format!("Could not reach the remote table service ({message}). Nothing was changed."),
                );
            }
            Some(BackendError::Http { status, body }) => {
                return Diagnostic::new(
                    "REMOTE_REJECTED",
                    format!(
                        "The remote table service rejected the write ({status}): {}. Nothing was changed.",
                        remote_message(body)
                    ),
                );
            }
            _ => {}
        }
    }

    let lower = message.to_ascii_lowercase();
    if lower.contains("client id is not configured") {
        return Diagnostic::new(
            "CALENDAR_NOT_CONFIGURED",
            format!("Calendar is not configured. Set calendar.client_id in ~/.lexflow/config.toml or {ENV_GOOGLE_CLIENT_ID}"),
        );
    }

    if lower.contains("unknown ") {
        if let Some(label) = backticked(&message) {
            return Diagnostic::new("INVALID_ARGUMENT", format!("Unrecognised value {label}: {message}"));
        }
    }

    Diagnostic::new("ERROR", message)
}

/// PostgREST errors carry a JSON body with a `message`; anything else is shown as-is.
fn remote_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| value.get("message")?.as_str().map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string())
}

fn backticked(message: &str) -> Option<&str> {
    message.split('`').nth(1).map(str::trim).filter(|label| !label.is_empty())
}
