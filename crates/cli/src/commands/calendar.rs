// `lexflow calendar`: connect or disconnect the calendar mirror, or build
// a pre-filled event link without any connection.

use anyhow::bail;
use clap::{Args, Subcommand};
use lexflow_common::calendar::{case_hearing_event, task_deadline_event, template_url};
use lexflow_common::types::RecordKind;
use lexflow_sync::calendar::credentials::DEFAULT_EXPIRES_IN_SECS;
use lexflow_sync::store::RecordStore;
use lexflow_sync::SyncError;
use serde::Serialize;
use uuid::Uuid;

use super::{block_on, emit, open_context};
use crate::output::OutputFormat;

#[derive(Debug, Subcommand)]
pub enum CalendarCommand {
    /// Print the consent URL to open in a browser
    AuthUrl(AuthUrlArgs),
    /// Store the access token from the redirect URL, or a bare token
    Connect(ConnectArgs),
    /// Forget the stored access token
    Disconnect(DisconnectArgs),
    /// Print a pre-filled event link for a case hearing or task deadline
    Link(LinkArgs),
}

#[derive(Debug, Args)]
pub struct AuthUrlArgs {
    /// Opaque value echoed back in the redirect; random when omitted.
    #[arg(long)]
    state: Option<String>,
    /// Force JSON output.
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Args)]
pub struct ConnectArgs {
    /// The full redirect URL, its `#access_token=...` fragment, or a bare token.
    callback: String,
    /// Token lifetime when a bare token is given.
    #[arg(long, default_value_t = DEFAULT_EXPIRES_IN_SECS)]
    expires_in: i64,
    /// Force JSON output.
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Args)]
pub struct DisconnectArgs {
    /// Force JSON output.
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Args)]
pub struct LinkArgs {
    /// case or task.
    kind: RecordKind,
    id: String,
    /// Force JSON output.
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct CalendarResult {
    pub connected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

pub fn run(cmd: CalendarCommand) -> anyhow::Result<()> {
    match cmd {
        CalendarCommand::AuthUrl(args) => {
            let format = OutputFormat::detect(args.json);
            let result = block_on(auth_url(&args)).and_then(|inner| inner);
            emit(format, result, |result| {
                format!("Open this URL to connect the calendar:\n{}", result.url.as_deref().unwrap_or_default())
            })
        }
        CalendarCommand::Connect(args) => {
            let format = OutputFormat::detect(args.json);
            let result = block_on(connect(&args)).and_then(|inner| inner);
            emit(format, result, format_connection)
        }
        CalendarCommand::Disconnect(args) => {
            let format = OutputFormat::detect(args.json);
            let result = block_on(disconnect()).and_then(|inner| inner);
            emit(format, result, format_connection)
        }
        CalendarCommand::Link(args) => {
            let format = OutputFormat::detect(args.json);
            let result = block_on(link(&args)).and_then(|inner| inner);
            emit(format, result, |result| result.url.clone().unwrap_or_default())
        }
    }
}

async fn auth_url(args: &AuthUrlArgs) -> anyhow::Result<CalendarResult> {
    let context = open_context().await?;
    let state = args.state.clone().unwrap_or_else(|| Uuid::new_v4().to_string());
    let url = context.calendar_authorization_url(&state)?;
    Ok(CalendarResult { connected: context.calendar_connected(), url: Some(url.to_string()) })
}

async fn connect(args: &ConnectArgs) -> anyhow::Result<CalendarResult> {
    let context = open_context().await?;
    if !context.calendar_configured() {
        bail!("calendar client id is not configured");
    }
    if looks_like_callback(&args.callback) {
        context.connect_calendar_from_callback(&args.callback)?;
    } else {
        context.connect_calendar(args.callback.trim(), args.expires_in)?;
    }
    Ok(CalendarResult { connected: context.calendar_connected(), url: None })
}

async fn disconnect() -> anyhow::Result<CalendarResult> {
    let context = open_context().await?;
    context.disconnect_calendar()?;
    Ok(CalendarResult { connected: false, url: None })
}

async fn link(args: &LinkArgs) -> anyhow::Result<CalendarResult> {
    let context = open_context().await?;
    let url = event_link(context.store(), args.kind, &args.id)?;
    Ok(CalendarResult { connected: context.calendar_connected(), url: Some(url) })
}

fn looks_like_callback(value: &str) -> bool {
    value.contains('#') || value.contains("access_token=") || value.contains("error=")
}

fn event_link(store: &RecordStore, kind: RecordKind, id: &str) -> anyhow::Result<String> {
    let unknown = || SyncError::UnknownRecord { kind, id: id.to_string() };
    match kind {
        RecordKind::Case => {
            let case = store.case(id).ok_or_else(unknown)?;
            let Some(event) = case_hearing_event(&case) else {
                bail!("case `{id}` has no scheduled hearing");
            };
            Ok(template_url(&event, Some(&case.court)))
        }
        RecordKind::Task => {
            let task = store.task(id).ok_or_else(unknown)?;
            let Some(event) = task_deadline_event(&task) else {
                bail!("task `{id}` has no due date or deadline");
            };
            Ok(template_url(&event, task.workplace.as_deref()))
        }
        other => bail!("calendar links exist for cases and tasks, not {}", other.table()),
    }
}

fn format_connection(result: &CalendarResult) -> String {
    if result.connected {
        "Calendar connected. New hearings and deadlines will be mirrored.".to_string()
    } else {
        "Calendar disconnected.".to_string()
    }
}
