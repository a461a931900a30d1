// `lexflow add-case`: add a case, snapshotting the client's name onto it.

use clap::Args;
use lexflow_common::hearing::snapshot_client_name;
use lexflow_common::types::{Case, CaseStatus, Client, UNSCHEDULED};

use super::ls::case_line;
use super::{block_on, emit, given, open_context};
use crate::output::OutputFormat;

#[derive(Debug, Args)]
pub struct AddCaseArgs {
    /// Court case number, e.g. CIV/2024/17.
    case_number: String,
    title: String,
    /// Id of the client the case belongs to.
    #[arg(long)]
    client: String,
    #[arg(long, default_value = "")]
    court: String,
    #[arg(long = "type", default_value = "")]
    case_type: String,
    /// Open, Closed, Pending or On Appeal.
    #[arg(long, default_value_t = CaseStatus::Open)]
    status: CaseStatus,
    /// Next hearing date (YYYY-MM-DD).
    #[arg(long)]
    next_hearing: Option<String>,
    #[arg(long)]
    workplace: Option<String>,
    #[arg(long)]
    judge: Option<String>,
    #[arg(long)]
    cnr: Option<String>,
    #[arg(long)]
    first_party: Option<String>,
    #[arg(long)]
    opposite_party: Option<String>,
    #[arg(long)]
    notes: Option<String>,
    /// Force JSON output.
    #[arg(long)]
    json: bool,
}

pub fn run(args: AddCaseArgs) -> anyhow::Result<()> {
    let format = OutputFormat::detect(args.json);
    let result = block_on(add(&args)).and_then(|inner| inner);
    emit(format, result, format_human)
}

async fn add(args: &AddCaseArgs) -> anyhow::Result<Case> {
    let context = open_context().await?;
    let case = new_case(args, &context.store().clients());
    let added = context.orchestrator().add(case).await?;
    context.orchestrator().settle_mirrors().await;
    Ok(context.store().case(&added.id).unwrap_or(added))
}

fn new_case(args: &AddCaseArgs, clients: &[Client]) -> Case {
    Case {
        case_number: args.case_number.trim().to_string(),
        title: args.title.trim().to_string(),
        client_id: args.client.trim().to_string(),
        client_name: snapshot_client_name(args.client.trim(), clients),
        court: args.court.trim().to_string(),
        case_type: args.case_type.trim().to_string(),
        status: args.status,
        next_hearing: given(&args.next_hearing).unwrap_or_else(|| UNSCHEDULED.to_string()),
        workplace: given(&args.workplace),
        judge: given(&args.judge),
        cnr_number: given(&args.cnr),
        first_party: given(&args.first_party),
        opposite_party: given(&args.opposite_party),
        notes: given(&args.notes),
        ..Case::default()
    }
}

fn format_human(case: &Case) -> String {
    let mut text = format!("Added case {}", case_line(case));
    if let Some(event_id) = &case.google_calendar_event_id {
        text.push_str(&format!("\nCalendar event: {event_id}"));
    }
    text
}
