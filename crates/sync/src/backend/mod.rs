// Persistence backends. One implementation is selected at startup and
// used for every write until the process exits.

pub mod local;
pub mod remote;

use async_trait::async_trait;
use lexflow_common::mapper::RemoteMapped;
use serde::Serialize;
use thiserror::Error;

use crate::selector::BackendKind;

pub use local::LocalStoreBackend;
pub use remote::RemoteTableBackend;

#[derive(Debug, Clone, Error)]
pub enum BackendError {
    #[error("http {status}: {body}")]
    Http { status: u16, body: String },
    #[error("network error: {0}")]
    Transport(String),
    #[error("unexpected response: {0}")]
    Decode(String),
    #[error("local store error: {0}")]
    Storage(String),
}

/// Where a collection's startup contents came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadSource {
    Remote,
    LocalStore,
    Seed,
}

impl std::fmt::Display for LoadSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Remote => "remote",
            Self::LocalStore => "local store",
            Self::Seed => "seed data",
        })
    }
}

/// Row-oriented persistence for every record kind.
#[async_trait]
pub trait Backend: Send + Sync + 'static {
    fn kind(&self) -> BackendKind;

    /// Every stored record, oldest first.
    async fn load_all<R: RemoteMapped>(&self) -> Result<Vec<R>, BackendError>;

    /// Persist a new record. The returned record carries the id the backend
    /// assigned and is the ground truth from then on.
    async fn insert<R: RemoteMapped>(&self, record: R) -> Result<R, BackendError>;

    /// Write only the fields present in `patch`.
    async fn update<R: RemoteMapped>(&self, id: &str, patch: &R::Patch) -> Result<(), BackendError>;

    async fn delete<R: RemoteMapped>(&self, id: &str) -> Result<(), BackendError>;
}

/// The backend chosen for this process.
#[derive(Debug)]
pub enum SelectedBackend {
    Remote(RemoteTableBackend),
    Local(LocalStoreBackend),
}

#[async_trait]
impl Backend for SelectedBackend {
    fn kind(&self) -> BackendKind {
        match self {
            Self::Remote(backend) => backend.kind(),
            Self::Local(backend) => backend.kind(),
        }
    }

    async fn load_all<R: RemoteMapped>(&self) -> Result<Vec<R>, BackendError> {
        match self {
            Self::Remote(backend) => backend.load_all().await,
            Self::Local(backend) => backend.load_all().await,
        }
    }

    async fn insert<R: RemoteMapped>(&self, record: R) -> Result<R, BackendError> {
        match self {
            Self::Remote(backend) => backend.insert(record).await,
            Self::Local(backend) => backend.insert(record).await,
        }
    }

    async fn update<R: RemoteMapped>(&self, id: &str, patch: &R::Patch) -> Result<(), BackendError> {
        match self {
            Self::Remote(backend) => backend.update::<R>(id, patch).await,
            Self::Local(backend) => backend.update::<R>(id, patch).await,
        }
    }

    async fn delete<R: RemoteMapped>(&self, id: &str) -> Result<(), BackendError> {
        match self {
            Self::Remote(backend) => backend.delete::<R>(id).await,
            Self::Local(backend) => backend.delete::<R>(id).await,
        }
    }
}
