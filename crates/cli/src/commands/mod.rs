// CLI subcommand dispatch.

use std::future::Future;

use anyhow::Context;
use clap::Subcommand;
use lexflow_sync::config::GlobalConfig;
use lexflow_sync::PracticeContext;
use serde::Serialize;
use tracing::debug;

use crate::output::{self, OutputFormat};

pub mod add_case;
pub mod add_client;
pub mod add_document;
pub mod add_task;
pub mod agenda;
pub mod calendar;
pub mod config;
pub mod export;
pub mod hearing;
pub mod ls;
pub mod move_task;
pub mod rm;
pub mod status;

#[derive(Subcommand)]
pub enum Command {
    /// Backend, load sources, calendar connection and today's dashboard
    Status(status::StatusArgs),
    /// List clients, cases, tasks or documents
    Ls(ls::LsArgs),
    /// Add a client
    AddClient(add_client::AddClientArgs),
    /// Add a case
    AddCase(add_case::AddCaseArgs),
    /// Add a task
    AddTask(add_task::AddTaskArgs),
    /// Record an uploaded file, or store a written document
    AddDocument(add_document::AddDocumentArgs),
    /// Move a task to another board column
    MoveTask(move_task::MoveTaskArgs),
    /// Record a hearing against a case
    Hearing(hearing::HearingArgs),
    /// Delete a record
    Rm(rm::RmArgs),
    /// Hearings and deadlines for a month
    Agenda(agenda::AgendaArgs),
    /// Connect, disconnect or link to the calendar
    #[command(subcommand)]
    Calendar(calendar::CalendarCommand),
    /// Write a stored document's content out
    Export(export::ExportArgs),
    /// Show or edit the config file
    #[command(subcommand)]
    Config(config::ConfigCommand),
}

pub fn run(cmd: Command) -> anyhow::Result<()> {
    match cmd {
        Command::Status(args) => status::run(args),
        Command::Ls(args) => ls::run(args),
        Command::AddClient(args) => add_client::run(args),
        Command::AddCase(args) => add_case::run(args),
        Command::AddTask(args) => add_task::run(args),
        Command::AddDocument(args) => add_document::run(args),
        Command::MoveTask(args) => move_task::run(args),
        Command::Hearing(args) => hearing::run(args),
        Command::Rm(args) => rm::run(args),
        Command::Agenda(args) => agenda::run(args),
        Command::Calendar(cmd) => calendar::run(cmd),
        Command::Export(args) => export::run(args),
        Command::Config(cmd) => config::run(cmd),
    }
}

// ── Shared plumbing ─────────────────────────────────────────────────

/// Drive `future` to completion on a single-threaded runtime.
pub(crate) fn block_on<F: Future>(future: F) -> anyhow::Result<F::Output> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    Ok(runtime.block_on(future))
}

pub(crate) async fn open_context() -> anyhow::Result<PracticeContext> {
    let context = PracticeContext::open(GlobalConfig::load())
        .await
        .context("failed to open practice data")?;
    debug!(backend = %context.backend_kind(), "practice data opened");
    Ok(context)
}

/// Print a command's result, or its mapped error.
pub(crate) fn emit<T, F>(format: OutputFormat, result: anyhow::Result<T>, human_fn: F) -> anyhow::Result<()>
where
    T: Serialize,
    F: FnOnce(&T) -> String,
{
    match result {
        Ok(value) => {
            output::print_output(format, &value, human_fn)?;
            Ok(())
        }
        Err(error) => {
            output::print_anyhow_error(format, &error);
            Err(error)
        }
    }
}

/// The trimmed value, unless it is missing or blank.
pub(crate) fn given(value: &Option<String>) -> Option<String> {
    value.as_deref().map(str::trim).filter(|value| !value.is_empty()).map(str::to_string)
}

pub(crate) fn today() -> String {
    chrono::Local::now().date_naive().format("%Y-%m-%d").to_string()
}
