// `lexflow rm`: delete a record. Deleting an id that is already gone succeeds.

use clap::Args;
use lexflow_common::types::{Case, Client, LegalDocument, RecordKind, Task};
use serde::Serialize;

use super::{block_on, emit, open_context};
use crate::output::OutputFormat;

#[derive(Debug, Args)]
pub struct RmArgs {
    /// client, case, task or document.
    kind: RecordKind,
    id: String,
    /// Force JSON output.
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct RmResult {
    pub kind: RecordKind,
    pub id: String,
    /// Whether the record was present before the delete.
    pub existed: bool,
}

pub fn run(args: RmArgs) -> anyhow::Result<()> {
    let format = OutputFormat::detect(args.json);
    let result = block_on(remove(&args)).and_then(|inner| inner);
    emit(format, result, format_human)
}

async fn remove(args: &RmArgs) -> anyhow::Result<RmResult> {
    let context = open_context().await?;
    let store = context.store();
    let orchestrator = context.orchestrator();
    let id = args.id.as_str();

    let existed = match args.kind {
        RecordKind::Client => store.client(id).is_some(),
        RecordKind::Case => store.case(id).is_some(),
        RecordKind::Task => store.task(id).is_some(),
        RecordKind::Document => store.document(id).is_some(),
    };
    match args.kind {
        RecordKind::Client => orchestrator.delete::<Client>(id).await?,
        RecordKind::Case => orchestrator.delete::<Case>(id).await?,
        RecordKind::Task => orchestrator.delete::<Task>(id).await?,
        RecordKind::Document => orchestrator.delete::<LegalDocument>(id).await?,
    }
    orchestrator.settle_mirrors().await;

    Ok(RmResult { kind: args.kind, id: args.id.clone(), existed })
}

fn format_human(result: &RmResult) -> String {
    if result.existed {
        format!("Removed {} {}", result.kind, result.id)
    } else {
        format!("No {} {} to remove", result.kind, result.id)
    }
}
