// Translation between application records and remote table rows.
//
// Remote columns are snake_case, application fields camelCase. Writing a
// patch emits only the columns the patch names and never the id. Reading a
// row never fails: missing values decode to empty strings, `None`, or empty
// lists, and unknown enum labels decode to the enum's default.

use std::fmt::Display;

use serde_json::{json, Map, Value};

use crate::types::{
    Case, CasePatch, CaseStatus, Client, ClientCategory, ClientPatch, ClientStatus, HearingEntry,
    LegalDocument, LegalDocumentPatch, Record, Task, TaskPatch, TaskPriority, TaskStatus,
};

/// A row as exchanged with the remote table service.
pub type RemoteRow = Map<String, Value>;

/// Records that can be written to and read from a remote table.
pub trait RemoteMapped: Record {
    /// Remote column map holding exactly the fields present in `patch`.
    fn to_remote_row(patch: &Self::Patch) -> RemoteRow;

    /// Total decoding of a remote row.
    fn from_remote_row(row: &Value) -> Self;
}

// ── Writing ─────────────────────────────────────────────────────────

#[derive(Default)]
struct RowWriter {
    row: RemoteRow,
}

impl RowWriter {
    fn text(&mut self, column: &str, value: &Option<String>) {
        if let Some(value) = value {
            self.row.insert(column.to_string(), Value::String(value.clone()));
        }
    }

    fn label<T: Display>(&mut self, column: &str, value: &Option<T>) {
        if let Some(value) = value {
            self.row.insert(column.to_string(), Value::String(value.to_string()));
        }
    }

    fn flag(&mut self, column: &str, value: &Option<bool>) {
        if let Some(value) = value {
            self.row.insert(column.to_string(), Value::Bool(*value));
        }
    }

    fn list(&mut self, column: &str, value: &Option<Vec<String>>) {
        if let Some(values) = value {
            let items = values.iter().cloned().map(Value::String).collect();
            self.row.insert(column.to_string(), Value::Array(items));
        }
    }

    fn hearings(&mut self, column: &str, value: &Option<Vec<HearingEntry>>) {
        if let Some(entries) = value {
            let items = entries
                .iter()
                .map(|entry| {
                    json!({
                        "id": entry.id,
                        "date": entry.date,
                        "purpose": entry.purpose,
                        "nextHearingDate": entry.next_hearing_date,
                        "notes": entry.notes,
                    })
                })
                .collect();
            self.row.insert(column.to_string(), Value::Array(items));
        }
    }

    fn finish(self) -> RemoteRow {
        self.row
    }
}

// ── Reading ─────────────────────────────────────────────────────────

struct RowReader<'a>(&'a Value);

impl RowReader<'_> {
    fn opt_text(&self, column: &str) -> Option<String> {
        match self.0.get(column)? {
            Value::String(value) => Some(value.clone()),
            Value::Number(value) => Some(value.to_string()),
            Value::Bool(value) => Some(value.to_string()),
            _ => None,
        }
    }

    fn text(&self, column: &str) -> String {
        self.opt_text(column).unwrap_or_default()
    }

    fn flag(&self, column: &str) -> Option<bool> {
        match self.0.get(column)? {
            Value::Bool(value) => Some(*value),
            Value::String(value) => value.trim().parse().ok(),
            _ => None,
        }
    }

    fn list(&self, column: &str) -> Vec<String> {
        match self.0.get(column) {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|item| match item {
                    Value::String(value) => Some(value.clone()),
                    Value::Null => None,
                    other => Some(other.to_string()),
                })
                .collect(),
            _ => Vec::new(),
        }
    }

    fn hearings(&self, column: &str) -> Vec<HearingEntry> {
        let Some(Value::Array(items)) = self.0.get(column) else {
            return Vec::new();
        };
        items
            .iter()
            .filter(|item| item.is_object())
            .map(|item| {
                let entry = RowReader(item);
                HearingEntry {
                    id: entry.text("id"),
                    date: entry.text("date"),
                    purpose: entry.text("purpose"),
                    next_hearing_date: entry.text("nextHearingDate"),
                    notes: entry.text("notes"),
                }
            })
            .collect()
    }
}

// ── Per-entity mappings ─────────────────────────────────────────────

impl RemoteMapped for Client {
    fn to_remote_row(patch: &ClientPatch) -> RemoteRow {
        let mut row = RowWriter::default();
        row.text("name", &patch.name);
        row.text("email", &patch.email);
        row.text("phone", &patch.phone);
        row.label("type", &patch.category);
        row.label("status", &patch.status);
        row.text("last_contact", &patch.last_contact);
        row.finish()
    }

    fn from_remote_row(row: &Value) -> Self {
        let row = RowReader(row);
        Client {
            id: row.text("id"),
            name: row.text("name"),
            email: row.text("email"),
            phone: row.text("phone"),
            category: ClientCategory::from_label_lossy(&row.text("type")),
            status: ClientStatus::from_label_lossy(&row.text("status")),
            last_contact: row.text("last_contact"),
        }
    }
}

impl RemoteMapped for Case {
    fn to_remote_row(patch: &CasePatch) -> RemoteRow {
        let mut row = RowWriter::default();
        row.text("case_number", &patch.case_number);
        row.text("title", &patch.title);
        row.text("client_id", &patch.client_id);
        row.text("client_name", &patch.client_name);
        row.text("court", &patch.court);
        row.text("type", &patch.case_type);
        row.label("status", &patch.status);
        row.text("next_hearing", &patch.next_hearing);
        row.text("judge", &patch.judge);
        row.text("register_date", &patch.register_date);
        row.text("first_party", &patch.first_party);
        row.text("opposite_party", &patch.opposite_party);
        row.text("cnr_number", &patch.cnr_number);
        row.text("court_type", &patch.court_type);
        row.text("court_name", &patch.court_name);
        row.text("court_number", &patch.court_number);
        row.text("act_section", &patch.act_section);
        row.text("fir_number", &patch.fir_number);
        row.text("police_station", &patch.police_station);
        row.text("notes", &patch.notes);
        row.text("total_fees", &patch.total_fees);
        row.flag("is_disposed", &patch.is_disposed);
        row.text("workplace", &patch.workplace);
        row.hearings("hearing_history", &patch.hearing_history);
        row.text("google_calendar_event_id", &patch.google_calendar_event_id);
        row.finish()
    }

    fn from_remote_row(row: &Value) -> Self {
        let row = RowReader(row);
        Case {
            id: row.text("id"),
            case_number: row.text("case_number"),
            title: row.text("title"),
            client_id: row.text("client_id"),
            client_name: row.text("client_name"),
            court: row.text("court"),
            case_type: row.text("type"),
            status: CaseStatus::from_label_lossy(&row.text("status")),
            next_hearing: row.text("next_hearing"),
            judge: row.opt_text("judge"),
            register_date: row.opt_text("register_date"),
            first_party: row.opt_text("first_party"),
            opposite_party: row.opt_text("opposite_party"),
            cnr_number: row.opt_text("cnr_number"),
            court_type: row.opt_text("court_type"),
            court_name: row.opt_text("court_name"),
            court_number: row.opt_text("court_number"),
            act_section: row.opt_text("act_section"),
            fir_number: row.opt_text("fir_number"),
            police_station: row.opt_text("police_station"),
            notes: row.opt_text("notes"),
            total_fees: row.opt_text("total_fees"),
            is_disposed: row.flag("is_disposed"),
            workplace: row.opt_text("workplace"),
            hearing_history: row.hearings("hearing_history"),
            google_calendar_event_id: row.opt_text("google_calendar_event_id"),
        }
    }
}

impl RemoteMapped for Task {
    fn to_remote_row(patch: &TaskPatch) -> RemoteRow {
        let mut row = RowWriter::default();
        row.text("title", &patch.title);
        row.text("case_id", &patch.case_id);
        row.text("client_id", &patch.client_id);
        row.text("due_date", &patch.due_date);
        row.label("priority", &patch.priority);
        row.label("status", &patch.status);
        row.text("assignee", &patch.assignee);
        row.text("deadline", &patch.deadline);
        row.text("working_day", &patch.working_day);
        row.text("workplace", &patch.workplace);
        row.text("google_calendar_event_id", &patch.google_calendar_event_id);
        row.finish()
    }

    fn from_remote_row(row: &Value) -> Self {
        let row = RowReader(row);
        Task {
            id: row.text("id"),
            title: row.text("title"),
            case_id: row.opt_text("case_id"),
            client_id: row.opt_text("client_id"),
            due_date: row.text("due_date"),
            priority: TaskPriority::from_label_lossy(&row.text("priority")),
            status: TaskStatus::from_label_lossy(&row.text("status")),
            assignee: row.text("assignee"),
            workplace: row.opt_text("workplace"),
            deadline: row.opt_text("deadline"),
            working_day: row.opt_text("working_day"),
            google_calendar_event_id: row.opt_text("google_calendar_event_id"),
        }
    }
}

impl RemoteMapped for LegalDocument {
    fn to_remote_row(patch: &LegalDocumentPatch) -> RemoteRow {
        let mut row = RowWriter::default();
        row.text("name", &patch.name);
        row.text("type", &patch.file_type);
        row.text("size", &patch.size);
        row.text("upload_date", &patch.upload_date);
        row.text("case_id", &patch.case_id);
        row.text("client_id", &patch.client_id);
        row.list("tags", &patch.tags);
        row.text("content", &patch.content);
        row.text("font", &patch.font);
        row.finish()
    }

    fn from_remote_row(row: &Value) -> Self {
        let row = RowReader(row);
        LegalDocument {
            id: row.text("id"),
            name: row.text("name"),
            file_type: row.text("type"),
            size: row.text("size"),
            upload_date: row.text("upload_date"),
            case_id: row.opt_text("case_id"),
            client_id: row.opt_text("client_id"),
            tags: row.list("tags"),
            content: row.opt_text("content"),
            font: row.opt_text("font"),
        }
    }
}
