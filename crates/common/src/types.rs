// Core practice records shared across the LexFlow crates.

use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Placeholder stored in `nextHearing` when no hearing is scheduled.
pub const UNSCHEDULED: &str = "-";

/// True when `date` names an actual day rather than the "-" placeholder.
pub fn is_scheduled(date: &str) -> bool {
    let date = date.trim();
    !date.is_empty() && date != UNSCHEDULED
}

// ── Record kinds ────────────────────────────────────────────────────

/// The four synchronized collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Client,
    Case,
    Task,
    Document,
}

impl RecordKind {
    pub const ALL: [RecordKind; 4] =
        [RecordKind::Client, RecordKind::Case, RecordKind::Task, RecordKind::Document];

    /// Remote table name.
    pub fn table(self) -> &'static str {
        match self {
            Self::Client => "clients",
            Self::Case => "cases",
            Self::Task => "tasks",
            Self::Document => "documents",
        }
    }

    /// Key of the whole-collection entry in the local store.
    pub fn storage_key(self) -> &'static str {
        match self {
            Self::Client => "lexflow_clients",
            Self::Case => "lexflow_cases",
            Self::Task => "lexflow_tasks",
            Self::Document => "lexflow_documents",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Client => "client",
            Self::Case => "case",
            Self::Task => "task",
            Self::Document => "document",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordKind {
    type Err = ParseLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = squash(s);
        Self::ALL
            .into_iter()
            .find(|kind| wanted == kind.as_str() || wanted == kind.table())
            .or_else(|| (wanted == "docs" || wanted == "doc").then_some(Self::Document))
            .ok_or_else(|| ParseLabelError { what: "record kind", value: s.to_string() })
    }
}

/// A label that names none of the variants of a closed set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {what} `{value}`")]
pub struct ParseLabelError {
    pub what: &'static str,
    pub value: String,
}

/// Lower-case alphanumerics only, so `in-progress`, `In Progress` and
/// `IN_PROGRESS` compare equal.
fn squash(label: &str) -> String {
    label.chars().filter(|c| c.is_alphanumeric()).flat_map(char::to_lowercase).collect()
}

macro_rules! labelled_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident ($what:literal, default = $default:ident) {
            $($variant:ident => $label:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $label)]
                $variant,
            )+
        }

        impl Default for $name {
            fn default() -> Self {
                Self::$default
            }
        }

        impl $name {
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $label),+
                }
            }

            /// Decode a stored label; anything unrecognized becomes the default.
            pub fn from_label_lossy(label: &str) -> Self {
                label.parse::<Self>().unwrap_or_default()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = ParseLabelError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let wanted = squash(s);
                Self::ALL
                    .iter()
                    .copied()
                    .find(|variant| squash(variant.as_str()) == wanted)
                    .ok_or_else(|| ParseLabelError { what: $what, value: s.to_string() })
            }
        }
    };
}

labelled_enum! {
    pub enum ClientCategory ("client type", default = Individual) {
        Individual => "Individual",
        Corporate => "Corporate",
    }
}

labelled_enum! {
    pub enum ClientStatus ("client status", default = Active) {
        Active => "Active",
        Inactive => "Inactive",
    }
}

labelled_enum! {
    pub enum CaseStatus ("case status", default = Open) {
        Open => "Open",
        Closed => "Closed",
        Pending => "Pending",
        OnAppeal => "On Appeal",
    }
}

labelled_enum! {
    pub enum TaskPriority ("task priority", default = Medium) {
        High => "High",
        Medium => "Medium",
        Low => "Low",
    }
}

labelled_enum! {
    pub enum TaskStatus ("task status", default = ToDo) {
        ToDo => "To Do",
        InProgress => "In Progress",
        Done => "Done",
    }
}

// ── Record trait ────────────────────────────────────────────────────

/// Behaviour shared by every synchronized entity.
pub trait Record:
    Clone + fmt::Debug + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Partial update; every field optional.
    type Patch: Clone
        + fmt::Debug
        + Default
        + PartialEq
        + Serialize
        + DeserializeOwned
        + Send
        + Sync
        + 'static;

    const KIND: RecordKind;

    fn id(&self) -> &str;

    fn set_id(&mut self, id: String);

    /// Merge the fields present in `patch`. Absent fields keep their value.
    fn apply(&mut self, patch: &Self::Patch);

    /// A patch carrying every field except the id.
    fn to_patch(&self) -> Self::Patch;

    /// The fixed demonstration dataset used when nothing else is available.
    fn seed() -> Vec<Self>;
}

fn merge<T: Clone>(slot: &mut T, value: &Option<T>) {
    if let Some(value) = value {
        *slot = value.clone();
    }
}

fn merge_opt<T: Clone>(slot: &mut Option<T>, value: &Option<T>) {
    if let Some(value) = value {
        *slot = Some(value.clone());
    }
}

// ── Client ──────────────────────────────────────────────────────────

/// A person or organisation the practice represents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Client {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    #[serde(rename = "type")]
    pub category: ClientCategory,
    pub status: ClientStatus,
    pub last_contact: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClientPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub category: Option<ClientCategory>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ClientStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_contact: Option<String>,
}

impl Record for Client {
    type Patch = ClientPatch;
    const KIND: RecordKind = RecordKind::Client;

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn apply(&mut self, patch: &ClientPatch) {
        merge(&mut self.name, &patch.name);
        merge(&mut self.email, &patch.email);
        merge(&mut self.phone, &patch.phone);
        merge(&mut self.category, &patch.category);
        merge(&mut self.status, &patch.status);
        merge(&mut self.last_contact, &patch.last_contact);
    }

    fn to_patch(&self) -> ClientPatch {
        ClientPatch {
            name: Some(self.name.clone()),
            email: Some(self.email.clone()),
            phone: Some(self.phone.clone()),
            category: Some(self.category),
            status: Some(self.status),
            last_contact: Some(self.last_contact.clone()),
        }
    }

    fn seed() -> Vec<Self> {
        crate::seed::clients()
    }
}

// ── Case ────────────────────────────────────────────────────────────

/// One entry of a case's hearing history.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HearingEntry {
    pub id: String,
    pub date: String,
    pub purpose: String,
    pub next_hearing_date: String,
    pub notes: String,
}

/// A legal matter handled for a client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Case {
    pub id: String,
    pub case_number: String,
    pub title: String,
    pub client_id: String,
    /// Copy of the client's name taken when the case was written.
    pub client_name: String,
    pub court: String,
    #[serde(rename = "type")]
    pub case_type: String,
    pub status: CaseStatus,
    /// ISO date, or [`UNSCHEDULED`].
    pub next_hearing: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub judge: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub register_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_party: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opposite_party: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cnr_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub court_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub court_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub court_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub act_section: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fir_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub police_station: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_fees: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_disposed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workplace: Option<String>,
    pub hearing_history: Vec<HearingEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub google_calendar_event_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CasePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub case_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub court: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub case_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<CaseStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_hearing: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub judge: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub register_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_party: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opposite_party: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cnr_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub court_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub court_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub court_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub act_section: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fir_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub police_station: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_fees: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_disposed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workplace: Option<String>,
    /// Replaces the whole history array.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hearing_history: Option<Vec<HearingEntry>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub google_calendar_event_id: Option<String>,
}

impl Record for Case {
    type Patch = CasePatch;
    const KIND: RecordKind = RecordKind::Case;

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn apply(&mut self, patch: &CasePatch) {
        merge(&mut self.case_number, &patch.case_number);
        merge(&mut self.title, &patch.title);
        merge(&mut self.client_id, &patch.client_id);
        merge(&mut self.client_name, &patch.client_name);
        merge(&mut self.court, &patch.court);
        merge(&mut self.case_type, &patch.case_type);
        merge(&mut self.status, &patch.status);
        merge(&mut self.next_hearing, &patch.next_hearing);
        merge_opt(&mut self.judge, &patch.judge);
        merge_opt(&mut self.register_date, &patch.register_date);
        merge_opt(&mut self.first_party, &patch.first_party);
        merge_opt(&mut self.opposite_party, &patch.opposite_party);
        merge_opt(&mut self.cnr_number, &patch.cnr_number);
        merge_opt(&mut self.court_type, &patch.court_type);
        merge_opt(&mut self.court_name, &patch.court_name);
        merge_opt(&mut self.court_number, &patch.court_number);
        merge_opt(&mut self.act_section, &patch.act_section);
        merge_opt(&mut self.fir_number, &patch.fir_number);
        merge_opt(&mut self.police_station, &patch.police_station);
        merge_opt(&mut self.notes, &patch.notes);
        merge_opt(&mut self.total_fees, &patch.total_fees);
        merge_opt(&mut self.is_disposed, &patch.is_disposed);
        merge_opt(&mut self.workplace, &patch.workplace);
        merge(&mut self.hearing_history, &patch.hearing_history);
        merge_opt(&mut self.google_calendar_event_id, &patch.google_calendar_event_id);
    }

    fn to_patch(&self) -> CasePatch {
        CasePatch {
            case_number: Some(self.case_number.clone()),
            title: Some(self.title.clone()),
            client_id: Some(self.client_id.clone()),
            client_name: Some(self.client_name.clone()),
            court: Some(self.court.clone()),
            case_type: Some(self.case_type.clone()),
            status: Some(self.status),
            next_hearing: Some(self.next_hearing.clone()),
            judge: self.judge.clone(),
            register_date: self.register_date.clone(),
            first_party: self.first_party.clone(),
            opposite_party: self.opposite_party.clone(),
            cnr_number: self.cnr_number.clone(),
            court_type: self.court_type.clone(),
            court_name: self.court_name.clone(),
            court_number: self.court_number.clone(),
            act_section: self.act_section.clone(),
            fir_number: self.fir_number.clone(),
            police_station: self.police_station.clone(),
            notes: self.notes.clone(),
            total_fees: self.total_fees.clone(),
            is_disposed: self.is_disposed,
            workplace: self.workplace.clone(),
            hearing_history: Some(self.hearing_history.clone()),
            google_calendar_event_id: self.google_calendar_event_id.clone(),
        }
    }

    fn seed() -> Vec<Self> {
        crate::seed::cases()
    }
}

// ── Task ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub case_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    pub due_date: String,
    pub priority: TaskPriority,
    pub status: TaskStatus,
    pub assignee: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workplace: Option<String>,
    /// Takes precedence over `due_date` for calendar placement.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub working_day: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub google_calendar_event_id: Option<String>,
}

impl Task {
    /// The date the task is placed on: `deadline` when set, else `due_date`.
    pub fn effective_date(&self) -> &str {
        match self.deadline.as_deref() {
            Some(deadline) if !deadline.trim().is_empty() => deadline,
            _ => &self.due_date,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TaskPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub case_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<TaskPriority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workplace: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub working_day: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub google_calendar_event_id: Option<String>,
}

impl Record for Task {
    type Patch = TaskPatch;
    const KIND: RecordKind = RecordKind::Task;

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn apply(&mut self, patch: &TaskPatch) {
        merge(&mut self.title, &patch.title);
        merge_opt(&mut self.case_id, &patch.case_id);
        merge_opt(&mut self.client_id, &patch.client_id);
        merge(&mut self.due_date, &patch.due_date);
        merge(&mut self.priority, &patch.priority);
        merge(&mut self.status, &patch.status);
        merge(&mut self.assignee, &patch.assignee);
        merge_opt(&mut self.workplace, &patch.workplace);
        merge_opt(&mut self.deadline, &patch.deadline);
        merge_opt(&mut self.working_day, &patch.working_day);
        merge_opt(&mut self.google_calendar_event_id, &patch.google_calendar_event_id);
    }

    fn to_patch(&self) -> TaskPatch {
        TaskPatch {
            title: Some(self.title.clone()),
            case_id: self.case_id.clone(),
            client_id: self.client_id.clone(),
            due_date: Some(self.due_date.clone()),
            priority: Some(self.priority),
            status: Some(self.status),
            assignee: Some(self.assignee.clone()),
            workplace: self.workplace.clone(),
            deadline: self.deadline.clone(),
            working_day: self.working_day.clone(),
            google_calendar_event_id: self.google_calendar_event_id.clone(),
        }
    }

    fn seed() -> Vec<Self> {
        crate::seed::tasks()
    }
}

// ── Document ────────────────────────────────────────────────────────

/// Metadata (and optionally content) of a file kept for a case or client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LegalDocument {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub file_type: String,
    /// Human-readable size, e.g. "1.20 MB".
    pub size: String,
    pub upload_date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub case_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LegalDocumentPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub file_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upload_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub case_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font: Option<String>,
}

impl Record for LegalDocument {
    type Patch = LegalDocumentPatch;
    const KIND: RecordKind = RecordKind::Document;

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn apply(&mut self, patch: &LegalDocumentPatch) {
        merge(&mut self.name, &patch.name);
        merge(&mut self.file_type, &patch.file_type);
        merge(&mut self.size, &patch.size);
        merge(&mut self.upload_date, &patch.upload_date);
        merge_opt(&mut self.case_id, &patch.case_id);
        merge_opt(&mut self.client_id, &patch.client_id);
        merge(&mut self.tags, &patch.tags);
        merge_opt(&mut self.content, &patch.content);
        merge_opt(&mut self.font, &patch.font);
    }

    fn to_patch(&self) -> LegalDocumentPatch {
        LegalDocumentPatch {
            name: Some(self.name.clone()),
            file_type: Some(self.file_type.clone()),
            size: Some(self.size.clone()),
            upload_date: Some(self.upload_date.clone()),
            case_id: self.case_id.clone(),
            client_id: self.client_id.clone(),
            tags: Some(self.tags.clone()),
            content: self.content.clone(),
            font: self.font.clone(),
        }
    }

    fn seed() -> Vec<Self> {
        crate::seed::documents()
    }
}
