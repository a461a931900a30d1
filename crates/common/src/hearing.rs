// Case-side helpers: client-name snapshots and hearing history entries.

use chrono::NaiveDate;

use crate::calendar::parse_day;
use crate::types::{Case, CasePatch, Client, HearingEntry};

pub const UNKNOWN_CLIENT: &str = "Unknown Client";
pub const DEFAULT_HEARING_PURPOSE: &str = "Hearing";

/// Name to copy into a case's `clientName` when it is written. The copy is
/// not refreshed if the client is renamed later.
pub fn snapshot_client_name(client_id: &str, clients: &[Client]) -> String {
    clients
        .iter()
        .find(|client| client.id == client_id)
        .map(|client| client.name.clone())
        .unwrap_or_else(|| UNKNOWN_CLIENT.to_string())
}

/// Input for recording one hearing against a case.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HearingDraft {
    /// Defaults to today.
    pub date: Option<String>,
    /// Defaults to "Hearing".
    pub purpose: Option<String>,
    /// When given, also becomes the case's `nextHearing`.
    pub next_hearing_date: Option<String>,
    pub notes: Option<String>,
}

fn filled(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|value| !value.is_empty())
}

impl Case {
    /// Patch that appends `draft` to the hearing history. The history is
    /// replaced wholesale; `nextHearing` moves along when the draft names a
    /// next date.
    pub fn hearing_patch(&self, draft: &HearingDraft, entry_id: String, today: NaiveDate) -> CasePatch {
        let entry = HearingEntry {
            id: entry_id,
            date: filled(&draft.date)
                .map(str::to_string)
                .unwrap_or_else(|| today.format("%Y-%m-%d").to_string()),
            purpose: filled(&draft.purpose).unwrap_or(DEFAULT_HEARING_PURPOSE).to_string(),
            next_hearing_date: filled(&draft.next_hearing_date).unwrap_or_default().to_string(),
            notes: filled(&draft.notes).unwrap_or_default().to_string(),
        };

        let next_hearing =
            (!entry.next_hearing_date.is_empty()).then(|| entry.next_hearing_date.clone());
        let mut history = self.hearing_history.clone();
        history.push(entry);

        CasePatch { hearing_history: Some(history), next_hearing, ..CasePatch::default() }
    }

    /// History ordered for display: latest hearing first, undated entries last.
    pub fn hearing_history_newest_first(&self) -> Vec<&HearingEntry> {
        let mut entries: Vec<&HearingEntry> = self.hearing_history.iter().collect();
        entries.sort_by_key(|entry| std::cmp::Reverse(parse_day(&entry.date)));
        entries
    }
}
