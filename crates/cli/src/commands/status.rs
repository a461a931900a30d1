// `lexflow status`: where the data came from, calendar state and today's dashboard.

use clap::Args;
use lexflow_common::agenda::{dashboard, DashboardSummary};
use lexflow_common::types::Case;
use lexflow_sync::LoadReport;
use serde::Serialize;

use super::ls::{case_line, task_line};
use super::{block_on, emit, open_context};
use crate::output::{self, OutputFormat};

#[derive(Debug, Args)]
pub struct StatusArgs {
    /// Force JSON output.
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusResult {
    pub load: LoadReport,
    pub counts: Counts,
    pub calendar: CalendarState,
    pub dashboard: DashboardSummary,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Counts {
    pub clients: usize,
    pub cases: usize,
    pub tasks: usize,
    pub documents: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CalendarState {
    NotConfigured,
    Disconnected,
    Connected,
}

pub fn run(args: StatusArgs) -> anyhow::Result<()> {
    let format = OutputFormat::detect(args.json);
    let result = block_on(collect()).and_then(|inner| inner);
    if let Ok(status) = &result {
        if let Some(reason) = &status.load.remote_error {
            output::print_warning(
                format,
                "REMOTE_UNAVAILABLE",
                &format!("remote read failed, showing local data: {reason}"),
            );
        }
    }
    emit(format, result, format_human)
}

async fn collect() -> anyhow::Result<StatusResult> {
    let context = open_context().await?;
    let store = context.store();
    let (cases, tasks) = (store.cases(), store.tasks());

    let calendar = if context.calendar_connected() {
        CalendarState::Connected
    } else if context.calendar_configured() {
        CalendarState::Disconnected
    } else {
        CalendarState::NotConfigured
    };

    Ok(StatusResult {
        load: context.load_report().clone(),
        counts: Counts {
            clients: store.clients().len(),
            cases: cases.len(),
            tasks: tasks.len(),
            documents: store.documents().len(),
        },
        calendar,
        dashboard: dashboard(chrono::Local::now().date_naive(), &cases, &tasks),
    })
}

fn listings(label: &str, date: &str, cases: &[Case], lines: &mut Vec<String>) {
    if cases.is_empty() {
        lines.push(format!("{label} ({date}): no listings"));
        return;
    }
    lines.push(format!("{label} ({date}): {} listing(s)", cases.len()));
    lines.extend(cases.iter().map(|case| format!("  {}", case_line(case))));
}

fn format_human(status: &StatusResult) -> String {
    let load = &status.load;
    let counts = status.counts;
    let board = &status.dashboard;

    let mut lines = vec![
        format!("Backend: {}", load.backend),
        format!(
            "  clients: {}, cases: {}, tasks: {}, documents: {}",
            load.clients, load.cases, load.tasks, load.documents
        ),
        format!(
            "Records: {} clients, {} cases, {} tasks, {} documents",
            counts.clients, counts.cases, counts.tasks, counts.documents
        ),
        format!(
            "Calendar: {}",
            match status.calendar {
                CalendarState::Connected => "connected",
                CalendarState::Disconnected => "not connected (run: lexflow calendar auth-url)",
                CalendarState::NotConfigured => "not configured",
            }
        ),
        String::new(),
    ];

    listings("Today", &board.today, &board.todays_listings, &mut lines);
    listings("Tomorrow", &board.tomorrow, &board.tomorrows_listings, &mut lines);
    lines.push(format!(
        "Active cases: {}, pending tasks: {}",
        board.active_cases, board.pending_tasks
    ));
    if !board.high_priority_tasks.is_empty() {
        lines.push("High priority:".to_string());
        lines.extend(board.high_priority_tasks.iter().map(|task| format!("  {}", task_line(task))));
    }
    if !board.upcoming_hearings.is_empty() {
        lines.push("Upcoming hearings:".to_string());
        lines.extend(board.upcoming_hearings.iter().map(|case| format!("  {}", case_line(case))));
    }
    lines.join("\n")
}
