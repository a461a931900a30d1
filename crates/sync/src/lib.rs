// lexflow-sync: backend selection, record store, CRUD orchestration and calendar mirroring

pub mod backend;
pub mod calendar;
pub mod config;
pub mod context;
pub mod orchestrator;
pub mod security;
pub mod selector;
pub mod store;

pub use context::{LoadReport, PracticeContext};
pub use orchestrator::{MirrorOutcome, Orchestrator, SyncError};
