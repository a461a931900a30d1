// `lexflow ls`: list one kind of record, optionally filtered or grouped.

use anyhow::bail;
use clap::Args;
use lexflow_common::query::{
    case_counts_by_client, group_by_workplace, kanban, search_cases, search_clients,
    search_documents, search_tasks, KanbanBoard, WorkplaceGroup,
};
use lexflow_common::types::{
    is_scheduled, Case, CaseStatus, Client, LegalDocument, RecordKind, Task, TaskStatus,
};
use serde::Serialize;

use super::{block_on, emit, open_context};
use crate::output::OutputFormat;

#[derive(Debug, Args)]
pub struct LsArgs {
    /// clients, cases, tasks or documents.
    kind: RecordKind,
    /// Case-insensitive search term.
    #[arg(long, short)]
    search: Option<String>,
    /// Only cases or tasks with this status.
    #[arg(long)]
    status: Option<String>,
    /// Show tasks as board columns.
    #[arg(long, conflicts_with = "by_workplace")]
    board: bool,
    /// Group cases and tasks by workplace.
    #[arg(long)]
    by_workplace: bool,
    /// Force JSON output.
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientRow {
    #[serde(flatten)]
    pub client: Client,
    pub case_count: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Listing {
    Clients(Vec<ClientRow>),
    Cases(Vec<Case>),
    Tasks(Vec<Task>),
    Documents(Vec<LegalDocument>),
    Board(KanbanBoard),
    Workplaces(Vec<WorkplaceGroup>),
}

pub fn run(args: LsArgs) -> anyhow::Result<()> {
    let format = OutputFormat::detect(args.json);
    let result = block_on(list(&args)).and_then(|inner| inner);
    emit(format, result, format_human)
}

async fn list(args: &LsArgs) -> anyhow::Result<Listing> {
    let context = open_context().await?;
    let store = context.store();
    build_listing(args, &store.clients(), &store.cases(), &store.tasks(), &store.documents())
}

fn build_listing(
    args: &LsArgs,
    clients: &[Client],
    cases: &[Case],
    tasks: &[Task],
    documents: &[LegalDocument],
) -> anyhow::Result<Listing> {
    let term = args.search.as_deref().unwrap_or_default();

    if args.status.is_some() && !matches!(args.kind, RecordKind::Case | RecordKind::Task) {
        bail!("--status applies to cases and tasks, not {}", args.kind.table());
    }
    if args.board && args.kind != RecordKind::Task {
        bail!("--board applies to tasks only");
    }

    let case_status = match (args.kind, args.status.as_deref()) {
        (RecordKind::Case, Some(label)) => Some(label.parse::<CaseStatus>()?),
        _ => None,
    };
    let task_status = match (args.kind, args.status.as_deref()) {
        (RecordKind::Task, Some(label)) => Some(label.parse::<TaskStatus>()?),
        _ => None,
    };
    let matching_cases = || -> Vec<Case> {
        search_cases(cases, term, case_status).into_iter().cloned().collect()
    };
    let matching_tasks = || -> Vec<Task> {
        search_tasks(tasks, term)
            .into_iter()
            .filter(|task| task_status.is_none_or(|status| task.status == status))
            .cloned()
            .collect()
    };

    if args.by_workplace {
        return match args.kind {
            RecordKind::Case | RecordKind::Task => {
                Ok(Listing::Workplaces(group_by_workplace(&matching_cases(), &matching_tasks())))
            }
            other => bail!("--by-workplace applies to cases and tasks, not {}", other.table()),
        };
    }

    Ok(match args.kind {
        RecordKind::Client => {
            let counts = case_counts_by_client(cases);
            Listing::Clients(
                search_clients(clients, term)
                    .into_iter()
                    .map(|client| ClientRow {
                        case_count: counts.get(&client.id).copied().unwrap_or(0),
                        client: client.clone(),
                    })
                    .collect(),
            )
        }
        RecordKind::Case => Listing::Cases(matching_cases()),
        RecordKind::Task if args.board => Listing::Board(kanban(&matching_tasks())),
        RecordKind::Task => Listing::Tasks(matching_tasks()),
        RecordKind::Document => {
            Listing::Documents(search_documents(documents, term).into_iter().cloned().collect())
        }
    })
}

// ── Human output ────────────────────────────────────────────────────

pub(crate) fn case_line(case: &Case) -> String {
    let next = if is_scheduled(&case.next_hearing) { case.next_hearing.as_str() } else { "none" };
    format!(
        "{}  {}  {} ({}) [{}] next hearing: {}",
        case.id, case.case_number, case.title, case.client_name, case.status, next
    )
}

pub(crate) fn task_line(task: &Task) -> String {
    let mut line = format!("{}  {} [{}, {}]", task.id, task.title, task.priority, task.status);
    let due = task.effective_date();
    if is_scheduled(due) {
        line.push_str(&format!(" due {due}"));
    }
    if !task.assignee.trim().is_empty() {
        line.push_str(&format!(" ({})", task.assignee));
    }
    line
}

pub(crate) fn document_line(document: &LegalDocument) -> String {
    let mut line = format!("{}  {}  {}, {}", document.id, document.name, document.file_type, document.size);
    if !document.tags.is_empty() {
        line.push_str(&format!("  tags: {}", document.tags.join(", ")));
    }
    if document.downloadable_content().is_some() {
        line.push_str("  (exportable)");
    }
    line
}

fn counted(lines: Vec<String>, noun: &str) -> String {
    if lines.is_empty() {
        return format!("No {noun}s.");
    }
    let mut out = vec![format!("{} {noun}(s)", lines.len())];
    out.extend(lines.into_iter().map(|line| format!("  {line}")));
    out.join("\n")
}

fn format_human(listing: &Listing) -> String {
    match listing {
        Listing::Clients(rows) => counted(
            rows.iter()
                .map(|row| {
                    format!(
                        "{}  {} <{}> {}, {}  {} case(s)",
                        row.client.id,
                        row.client.name,
                        row.client.email,
                        row.client.category,
                        row.client.status,
                        row.case_count
                    )
                })
                .collect(),
            "client",
        ),
        Listing::Cases(cases) => counted(cases.iter().map(case_line).collect(), "case"),
        Listing::Tasks(tasks) => counted(tasks.iter().map(task_line).collect(), "task"),
        Listing::Documents(documents) => {
            counted(documents.iter().map(document_line).collect(), "document")
        }
        Listing::Board(board) => {
            let mut lines = Vec::new();
            for status in TaskStatus::ALL {
                let column = board.column(*status);
                lines.push(format!("{status} ({})", column.len()));
                lines.extend(column.iter().map(|task| format!("  {}", task_line(task))));
            }
            lines.join("\n")
        }
        Listing::Workplaces(groups) => {
            let mut lines = Vec::new();
            for group in groups {
                lines.push(format!(
                    "{}: {} case(s), {} task(s)",
                    group.name,
                    group.cases.len(),
                    group.tasks.len()
                ));
                lines.extend(group.cases.iter().map(|case| format!("  {}", case_line(case))));
                lines.extend(group.tasks.iter().map(|task| format!("  {}", task_line(task))));
            }
            lines.join("\n")
        }
    }
}
