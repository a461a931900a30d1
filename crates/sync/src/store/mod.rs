// In-memory record store. Each collection is an immutable snapshot that is
// swapped wholesale on every mutation, so readers never see a torn update.

pub mod kv;

use std::sync::{Arc, PoisonError, RwLock};

use lexflow_common::calendar::{case_hearing_event, task_deadline_event, EventPayload};
use lexflow_common::mapper::RemoteMapped;
use lexflow_common::types::{
    Case, CasePatch, Client, LegalDocument, Record, Task, TaskPatch,
};

#[derive(Debug)]
pub struct Collection<R> {
    items: RwLock<Arc<Vec<R>>>,
}

impl<R> Default for Collection<R> {
    fn default() -> Self {
        Self { items: RwLock::new(Arc::new(Vec::new())) }
    }
}

impl<R: Record> Collection<R> {
    pub fn new(items: Vec<R>) -> Self {
        Self { items: RwLock::new(Arc::new(items)) }
    }

    /// The current snapshot. Later mutations never change it.
    pub fn snapshot(&self) -> Arc<Vec<R>> {
        Arc::clone(&self.items.read().unwrap_or_else(PoisonError::into_inner))
    }

    pub fn get(&self, id: &str) -> Option<R> {
        self.snapshot().iter().find(|item| item.id() == id).cloned()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.snapshot().iter().any(|item| item.id() == id)
    }

    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub(crate) fn replace_all(&self, items: Vec<R>) {
        *self.items.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(items);
    }

    pub(crate) fn push(&self, item: R) {
        let mut slot = self.items.write().unwrap_or_else(PoisonError::into_inner);
        let mut next = Vec::clone(&slot);
        next.push(item);
        *slot = Arc::new(next);
    }

    /// Replace one record with `edit` applied to a copy of it. Returns the
    /// new record, or `None` when the id is absent.
    pub(crate) fn update(&self, id: &str, edit: impl FnOnce(&mut R)) -> Option<R> {
        let mut slot = self.items.write().unwrap_or_else(PoisonError::into_inner);
        let index = slot.iter().position(|item| item.id() == id)?;
        let mut next = Vec::clone(&slot);
        edit(&mut next[index]);
        let updated = next[index].clone();
        *slot = Arc::new(next);
        Some(updated)
    }

    pub(crate) fn remove(&self, id: &str) -> Option<R> {
        let mut slot = self.items.write().unwrap_or_else(PoisonError::into_inner);
        let index = slot.iter().position(|item| item.id() == id)?;
        let mut next = Vec::clone(&slot);
        let removed = next.remove(index);
        *slot = Arc::new(next);
        Some(removed)
    }
}

/// The single shared copy of practice data for the process.
#[derive(Debug, Default)]
pub struct RecordStore {
    clients: Collection<Client>,
    cases: Collection<Case>,
    tasks: Collection<Task>,
    documents: Collection<LegalDocument>,
}

impl RecordStore {
    pub fn clients(&self) -> Arc<Vec<Client>> {
        self.clients.snapshot()
    }

    pub fn cases(&self) -> Arc<Vec<Case>> {
        self.cases.snapshot()
    }

    pub fn tasks(&self) -> Arc<Vec<Task>> {
        self.tasks.snapshot()
    }

    pub fn documents(&self) -> Arc<Vec<LegalDocument>> {
        self.documents.snapshot()
    }

    pub fn client(&self, id: &str) -> Option<Client> {
        self.clients.get(id)
    }

    pub fn case(&self, id: &str) -> Option<Case> {
        self.cases.get(id)
    }

    pub fn task(&self, id: &str) -> Option<Task> {
        self.tasks.get(id)
    }

    pub fn document(&self, id: &str) -> Option<LegalDocument> {
        self.documents.get(id)
    }

    pub fn collection<R: Stored>(&self) -> &Collection<R> {
        R::collection(self)
    }
}

// ── Per-kind hooks ─────────────────────────────────────────────────

/// A record kind the orchestrator can hold and mirror.
pub trait Stored: RemoteMapped {
    fn collection(store: &RecordStore) -> &Collection<Self>;

    /// The calendar event this record should be mirrored as, if any.
    fn calendar_event(&self) -> Option<EventPayload> {
        None
    }

    fn calendar_event_id(&self) -> Option<&str> {
        None
    }

    /// Patch that records a calendar event id on this kind.
    fn event_id_patch(_event_id: String) -> Option<Self::Patch> {
        None
    }

    /// Whether applying `patch` can move this record's calendar event.
    fn reschedules(_patch: &Self::Patch) -> bool {
        false
    }
}

fn present(id: &Option<String>) -> Option<&str> {
    id.as_deref().filter(|id| !id.is_empty())
}

impl Stored for Client {
    fn collection(store: &RecordStore) -> &Collection<Self> {
        &store.clients
    }
}

impl Stored for LegalDocument {
    fn collection(store: &RecordStore) -> &Collection<Self> {
        &store.documents
    }
}

impl Stored for Case {
    fn collection(store: &RecordStore) -> &Collection<Self> {
        &store.cases
    }

    fn calendar_event(&self) -> Option<EventPayload> {
        case_hearing_event(self)
    }

    fn calendar_event_id(&self) -> Option<&str> {
        present(&self.google_calendar_event_id)
    }

    fn event_id_patch(event_id: String) -> Option<CasePatch> {
        Some(CasePatch { google_calendar_event_id: Some(event_id), ..CasePatch::default() })
    }

    fn reschedules(patch: &CasePatch) -> bool {
        patch.next_hearing.is_some()
    }
}

impl Stored for Task {
    fn collection(store: &RecordStore) -> &Collection<Self> {
        &store.tasks
    }

    fn calendar_event(&self) -> Option<EventPayload> {
        task_deadline_event(self)
    }

    fn calendar_event_id(&self) -> Option<&str> {
        present(&self.google_calendar_event_id)
    }

    fn event_id_patch(event_id: String) -> Option<TaskPatch> {
        Some(TaskPatch { google_calendar_event_id: Some(event_id), ..TaskPatch::default() })
    }

    fn reschedules(patch: &TaskPatch) -> bool {
        patch.deadline.is_some() || patch.due_date.is_some() || patch.title.is_some()
    }
}
