// `lexflow hearing`: record a hearing against a case, or show its history.

use clap::Args;
use lexflow_common::hearing::HearingDraft;
use lexflow_common::types::{is_scheduled, Case, RecordKind};
use lexflow_sync::SyncError;

use super::{block_on, emit, open_context};
use crate::output::OutputFormat;

#[derive(Debug, Args)]
pub struct HearingArgs {
    /// Case id.
    case_id: String,
    /// Date the hearing took place; defaults to today.
    #[arg(long)]
    date: Option<String>,
    /// Defaults to "Hearing".
    #[arg(long)]
    purpose: Option<String>,
    /// Next hearing date; also moves the case's next hearing.
    #[arg(long)]
    next: Option<String>,
    #[arg(long)]
    notes: Option<String>,
    /// Only show the recorded history.
    #[arg(long, conflicts_with_all = ["date", "purpose", "next", "notes"])]
    list: bool,
    /// Force JSON output.
    #[arg(long)]
    json: bool,
}

pub fn run(args: HearingArgs) -> anyhow::Result<()> {
    let format = OutputFormat::detect(args.json);
    let result = block_on(record(&args)).and_then(|inner| inner);
    emit(format, result, format_human)
}

async fn record(args: &HearingArgs) -> anyhow::Result<Case> {
    let context = open_context().await?;
    if !args.list {
        let draft = HearingDraft {
            date: args.date.clone(),
            purpose: args.purpose.clone(),
            next_hearing_date: args.next.clone(),
            notes: args.notes.clone(),
        };
        context.orchestrator().add_hearing(&args.case_id, draft).await?;
        context.orchestrator().settle_mirrors().await;
    }
    let case = context
        .store()
        .case(&args.case_id)
        .ok_or_else(|| SyncError::UnknownRecord { kind: RecordKind::Case, id: args.case_id.clone() })?;
    Ok(case)
}

fn format_human(case: &Case) -> String {
    let mut lines = vec![format!("{}  {}  {}", case.id, case.case_number, case.title)];
    if is_scheduled(&case.next_hearing) {
        lines.push(format!("Next hearing: {}", case.next_hearing));
    } else {
        lines.push("Next hearing: none".to_string());
    }

    let history = case.hearing_history_newest_first();
    if history.is_empty() {
        lines.push("No hearings recorded.".to_string());
        return lines.join("\n");
    }
    lines.push(format!("{} hearing(s):", history.len()));
    for entry in history {
        let mut line = format!("  {}  {}", entry.date, entry.purpose);
        if !entry.next_hearing_date.is_empty() {
            line.push_str(&format!(", next {}", entry.next_hearing_date));
        }
        if !entry.notes.is_empty() {
            line.push_str(&format!(" ({})", entry.notes));
        }
        lines.push(line);
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use lexflow_common::seed;
    use lexflow_common::types::HearingEntry;

    fn entry(id: &str, date: &str, next: &str, notes: &str) -> HearingEntry {
        HearingEntry {
            id: id.into(),
            date: date.into(),
            purpose: "Arguments".into(),
            next_hearing_date: next.into(),
            notes: notes.into(),
        }
    }

    #[test]
    fn history_is_listed_newest_first() {
        let mut case = seed::cases().remove(0);
        case.hearing_history = vec![
            entry("h1", "2023-10-01", "2023-11-15", ""),
            entry("h2", "2023-11-15", "", "Adjourned"),
        ];
        let text = format_human(&case);
        assert_eq!(
            text,
            "101  CIV/2023/452  Kumar vs. State of MH\n\
             Next hearing: 2023-11-15\n\
             2 hearing(s):\n  \
             2023-11-15  Arguments (Adjourned)\n  \
             2023-10-01  Arguments, next 2023-11-15"
        );
    }

    #[test]
    fn empty_history() {
        let case = seed::cases().remove(2);
        let text = format_human(&case);
        assert!(text.contains("Next hearing: none"));
        assert!(text.ends_with("No hearings recorded."));
    }
}
