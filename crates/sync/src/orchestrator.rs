// CRUD orchestrator: the only writer of the record store.
//
// Every operation writes the backend first and touches the store only after
// the backend accepted the write. Calendar mirroring for new records runs on
// detached tasks whose results come back over a channel.

use std::sync::{Arc, Mutex, PoisonError};

use chrono::Local;
use lexflow_common::hearing::HearingDraft;
use lexflow_common::types::{Case, Record, RecordKind, Task};
use thiserror::Error;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::backend::{Backend, BackendError};
use crate::calendar::CalendarMirror;
use crate::store::{RecordStore, Stored};

#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error("no {kind} with id `{id}`")]
    UnknownRecord { kind: RecordKind, id: String },
}

/// A calendar event id produced by a detached mirror task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorOutcome {
    pub kind: RecordKind,
    pub record_id: String,
    pub event_id: String,
}

/// A detached mirror task, keyed by the record it mirrors when it can
/// produce an event id.
struct InFlight {
    record: Option<(RecordKind, String)>,
    handle: JoinHandle<()>,
}

impl InFlight {
    fn is_for(&self, kind: RecordKind, id: &str) -> bool {
        self.record.as_ref().is_some_and(|(k, record_id)| *k == kind && record_id == id)
    }
}

pub struct Orchestrator<B: Backend> {
    backend: Arc<B>,
    store: Arc<RecordStore>,
    mirror: Option<CalendarMirror>,
    outcomes_tx: UnboundedSender<MirrorOutcome>,
    outcomes_rx: Mutex<UnboundedReceiver<MirrorOutcome>>,
    in_flight: Mutex<Vec<InFlight>>,
}

impl<B: Backend> Orchestrator<B> {
    pub fn new(backend: Arc<B>, store: Arc<RecordStore>, mirror: Option<CalendarMirror>) -> Self {
        let (outcomes_tx, outcomes_rx) = mpsc::unbounded_channel();
        Self {
            backend,
            store,
            mirror,
            outcomes_tx,
            outcomes_rx: Mutex::new(outcomes_rx),
            in_flight: Mutex::new(Vec::new()),
        }
    }

    pub fn store(&self) -> &Arc<RecordStore> {
        &self.store
    }

    pub fn backend(&self) -> &Arc<B> {
        &self.backend
    }

    pub fn mirror(&self) -> Option<&CalendarMirror> {
        self.mirror.as_ref()
    }

    // ── Writes ──────────────────────────────────────────────────────

    /// Persist a new record and append the backend's copy to the store.
    pub async fn add<R: Stored>(&self, record: R) -> Result<R, SyncError> {
        self.apply_mirror_outcomes().await;

        let stored = self.backend.insert(record).await?;
        R::collection(&self.store).push(stored.clone());
        info!(kind = %R::KIND, id = stored.id(), "record added");

        self.spawn_mirror(&stored);
        Ok(stored)
    }

    /// Write the fields present in `patch`, then merge them into the store.
    /// Date changes re-run the calendar mirror before the merge so a new
    /// event id lands in the same store update.
    pub async fn update<R: Stored>(&self, id: &str, patch: R::Patch) -> Result<R, SyncError> {
        let reschedules = R::reschedules(&patch);
        if reschedules {
            // A mirror task from the add may still hold this record's first event id.
            self.settle_record(R::KIND, id).await;
        }
        self.apply_mirror_outcomes().await;

        let collection = R::collection(&self.store);
        let current = collection
            .get(id)
            .ok_or_else(|| SyncError::UnknownRecord { kind: R::KIND, id: id.to_string() })?;

        self.backend.update::<R>(id, &patch).await?;

        let mut merged = current;
        merged.apply(&patch);

        let mut event_patch = None;
        if reschedules {
            if let Some(event_id) = self.mirror_now(&merged).await {
                if merged.calendar_event_id() != Some(event_id.as_str()) {
                    event_patch = R::event_id_patch(event_id);
                }
            }
        }
        if let Some(event_patch) = &event_patch {
            if let Err(error) = self.backend.update::<R>(id, event_patch).await {
                warn!(kind = %R::KIND, id, %error, "failed to persist calendar event id");
            }
            merged.apply(event_patch);
        }

        let updated = collection
            .update(id, |record| {
                record.apply(&patch);
                if let Some(event_patch) = &event_patch {
                    record.apply(event_patch);
                }
            })
            .unwrap_or(merged);
        info!(kind = %R::KIND, id, "record updated");
        Ok(updated)
    }

    /// Remove a record. Deleting an id that is already gone is not an error.
    pub async fn delete<R: Stored>(&self, id: &str) -> Result<(), SyncError> {
        self.apply_mirror_outcomes().await;

        self.backend.delete::<R>(id).await?;
        let Some(removed) = R::collection(&self.store).remove(id) else {
            debug!(kind = %R::KIND, id, "delete of absent record");
            return Ok(());
        };
        info!(kind = %R::KIND, id, "record deleted");

        if let (Some(mirror), Some(event_id)) = (&self.mirror, removed.calendar_event_id()) {
            let mirror = mirror.clone();
            let event_id = event_id.to_string();
            self.track(None, tokio::spawn(async move {
                mirror.delete_event(&event_id).await;
            }));
        }
        Ok(())
    }

    /// Append a hearing to a case's history. A next-hearing date also
    /// reschedules the case.
    pub async fn add_hearing(&self, case_id: &str, draft: HearingDraft) -> Result<Case, SyncError> {
        let case = self
            .store
            .case(case_id)
            .ok_or_else(|| SyncError::UnknownRecord { kind: RecordKind::Case, id: case_id.to_string() })?;
        let patch = case.hearing_patch(&draft, Uuid::new_v4().to_string(), Local::now().date_naive());
        self.update::<Case>(case_id, patch).await
    }

    // ── Calendar mirroring ──────────────────────────────────────────

    fn connected_mirror(&self) -> Option<&CalendarMirror> {
        self.mirror.as_ref().filter(|mirror| mirror.is_connected())
    }

    async fn mirror_now<R: Stored>(&self, record: &R) -> Option<String> {
        let mirror = self.connected_mirror()?;
        let event = record.calendar_event()?;
        mirror.sync_event(record.calendar_event_id(), &event).await
    }

    fn spawn_mirror<R: Stored>(&self, record: &R) {
        let Some(mirror) = self.connected_mirror() else {
            return;
        };
        let Some(event) = record.calendar_event() else {
            return;
        };

        let mirror = mirror.clone();
        let outcomes = self.outcomes_tx.clone();
        let kind = R::KIND;
        let record_id = record.id().to_string();
        let existing = record.calendar_event_id().map(str::to_string);
        let key = Some((kind, record_id.clone()));
        self.track(key, tokio::spawn(async move {
            let Some(event_id) = mirror.sync_event(existing.as_deref(), &event).await else {
                return;
            };
            if existing.as_deref() != Some(event_id.as_str()) {
                // The receiver lives as long as the orchestrator.
                let _ = outcomes.send(MirrorOutcome { kind, record_id, event_id });
            }
        }));
    }

    fn track(&self, record: Option<(RecordKind, String)>, handle: JoinHandle<()>) {
        let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        in_flight.retain(|task| !task.handle.is_finished());
        in_flight.push(InFlight { record, handle });
    }

    /// Wait for the mirror tasks still working on one record.
    async fn settle_record(&self, kind: RecordKind, id: &str) {
        let mine: Vec<InFlight> = {
            let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
            let (mine, rest) =
                std::mem::take(&mut *in_flight).into_iter().partition(|task| task.is_for(kind, id));
            *in_flight = rest;
            mine
        };
        await_all(mine).await;
    }

    /// Persist event ids delivered by finished mirror tasks. Outcomes for
    /// records that no longer exist are dropped.
    pub async fn apply_mirror_outcomes(&self) {
        let pending: Vec<MirrorOutcome> = {
            let mut rx = self.outcomes_rx.lock().unwrap_or_else(PoisonError::into_inner);
            std::iter::from_fn(|| rx.try_recv().ok()).collect()
        };

        for outcome in pending {
            match outcome.kind {
                RecordKind::Case => self.persist_event_id::<Case>(outcome).await,
                RecordKind::Task => self.persist_event_id::<Task>(outcome).await,
                RecordKind::Client | RecordKind::Document => {}
            }
        }
    }

    async fn persist_event_id<R: Stored>(&self, outcome: MirrorOutcome) {
        let MirrorOutcome { kind, record_id, event_id } = outcome;
        let collection = R::collection(&self.store);
        if !collection.contains(&record_id) {
            debug!(%kind, id = %record_id, "discarding calendar event id for removed record");
            return;
        }
        let Some(patch) = R::event_id_patch(event_id) else {
            return;
        };

        if let Err(error) = self.backend.update::<R>(&record_id, &patch).await {
            warn!(%kind, id = %record_id, %error, "failed to persist calendar event id");
        }
        collection.update(&record_id, |record| record.apply(&patch));
        debug!(%kind, id = %record_id, "calendar event id recorded");
    }

    /// Wait for every in-flight mirror task, then apply what they produced.
    pub async fn settle_mirrors(&self) {
        loop {
            let tasks =
                std::mem::take(&mut *self.in_flight.lock().unwrap_or_else(PoisonError::into_inner));
            if tasks.is_empty() {
                break;
            }
            await_all(tasks).await;
        }
        self.apply_mirror_outcomes().await;
    }
}

async fn await_all(tasks: Vec<InFlight>) {
    for task in tasks {
        if let Err(error) = task.handle.await {
            warn!(%error, "calendar mirror task did not complete");
        }
    }
}
