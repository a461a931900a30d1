// Process-lifetime practice context: selects the backend, performs the
// initial load and owns the orchestrator and calendar connection.

use std::sync::Arc;

use anyhow::{Context, Result};
use lexflow_common::types::{Case, Client, LegalDocument, Task};
use serde::Serialize;
use tracing::{info, warn};
use url::Url;

use crate::backend::{
    Backend, BackendError, LoadSource, LocalStoreBackend, RemoteTableBackend, SelectedBackend,
};
use crate::calendar::credentials::{authorization_url, parse_token_callback};
use crate::calendar::{CalendarApi, CalendarMirror, CredentialCache, GoogleCalendarClient};
use crate::config::GlobalConfig;
use crate::orchestrator::Orchestrator;
use crate::security::{KeyringSecretStore, SecretStore};
use crate::selector::{select_backend, BackendKind};
use crate::store::kv::KvStore;
use crate::store::{RecordStore, Stored};

/// Redirect target used when the config does not name one.
pub const DEFAULT_REDIRECT_URI: &str = "http://localhost:5173";

/// Where each collection came from at startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    pub backend: BackendKind,
    pub clients: LoadSource,
    pub cases: LoadSource,
    pub tasks: LoadSource,
    pub documents: LoadSource,
    /// Why the remote read was abandoned, when it was.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_error: Option<String>,
}

pub struct PracticeContext {
    config: GlobalConfig,
    orchestrator: Orchestrator<SelectedBackend>,
    credentials: Arc<CredentialCache>,
    report: LoadReport,
}

impl PracticeContext {
    /// Open with the OS keychain and, when a client id is configured, the
    /// Google Calendar API.
    pub async fn open(config: GlobalConfig) -> Result<Self> {
        let calendar_api: Option<Arc<dyn CalendarApi>> = if config.calendar.is_configured() {
            let client = GoogleCalendarClient::new(config.calendar.api_base())
                .context("failed to build calendar client")?;
            Some(Arc::new(client))
        } else {
            None
        };
        Self::open_with(config, Arc::new(KeyringSecretStore), calendar_api).await
    }

    pub async fn open_with(
        config: GlobalConfig,
        secrets: Arc<dyn SecretStore>,
        calendar_api: Option<Arc<dyn CalendarApi>>,
    ) -> Result<Self> {
        let kv = Arc::new(KvStore::open(config.local_db_path()).context("failed to open local store")?);
        let local = LocalStoreBackend::new(kv);
        let store = Arc::new(RecordStore::default());

        let (kind, target) = select_backend(&config.remote);
        let (backend, report) = match target {
            Some(target) => {
                let remote = RemoteTableBackend::new(target).context("failed to build remote client")?;
                let report = match load_remote(&remote, &store).await {
                    Ok(()) => uniform_report(kind, LoadSource::Remote),
                    Err(error) => {
                        warn!(%error, "remote initial load failed, reading local store instead");
                        LoadReport { remote_error: Some(error.to_string()), ..load_local(kind, &local, &store) }
                    }
                };
                (SelectedBackend::Remote(remote), report)
            }
            None => {
                let report = load_local(kind, &local, &store);
                (SelectedBackend::Local(local), report)
            }
        };
        info!(
            backend = ?report.backend,
            clients = ?report.clients,
            cases = ?report.cases,
            tasks = ?report.tasks,
            documents = ?report.documents,
            "practice data loaded"
        );

        let credentials = Arc::new(CredentialCache::load(secrets));
        let mirror = calendar_api.map(|api| CalendarMirror::new(api, Arc::clone(&credentials)));
        let orchestrator = Orchestrator::new(Arc::new(backend), store, mirror);

        Ok(Self { config, orchestrator, credentials, report })
    }

    pub fn config(&self) -> &GlobalConfig {
        &self.config
    }

    pub fn orchestrator(&self) -> &Orchestrator<SelectedBackend> {
        &self.orchestrator
    }

    pub fn store(&self) -> &Arc<RecordStore> {
        self.orchestrator.store()
    }

    pub fn backend_kind(&self) -> BackendKind {
        self.orchestrator.backend().kind()
    }

    pub fn load_report(&self) -> &LoadReport {
        &self.report
    }

    // ── Calendar connection ─────────────────────────────────────────

    pub fn calendar_configured(&self) -> bool {
        self.orchestrator.mirror().is_some()
    }

    pub fn calendar_connected(&self) -> bool {
        self.calendar_configured() && self.credentials.is_connected()
    }

    /// Consent URL the user opens to grant calendar access.
    pub fn calendar_authorization_url(&self, state: &str) -> Result<Url> {
        let client_id = self
            .config
            .calendar
            .client_id
            .as_deref()
            .filter(|id| !id.trim().is_empty())
            .context("calendar client id is not configured")?;
        let redirect_uri = self.config.calendar.redirect_uri.as_deref().unwrap_or(DEFAULT_REDIRECT_URI);
        authorization_url(client_id, redirect_uri, state).context("failed to build authorization url")
    }

    pub fn connect_calendar(&self, access_token: &str, expires_in_secs: i64) -> Result<()> {
        self.credentials.connect(access_token, expires_in_secs)
    }

    /// Connect from the URL the provider redirected to.
    pub fn connect_calendar_from_callback(&self, callback: &str) -> Result<()> {
        let grant = parse_token_callback(callback)?;
        self.connect_calendar(&grant.access_token, grant.expires_in_secs)
    }

    pub fn disconnect_calendar(&self) -> Result<()> {
        self.credentials.disconnect()
    }
}

fn uniform_report(backend: BackendKind, source: LoadSource) -> LoadReport {
    LoadReport {
        backend,
        clients: source,
        cases: source,
        tasks: source,
        documents: source,
        remote_error: None,
    }
}

async fn load_remote(remote: &RemoteTableBackend, store: &RecordStore) -> Result<(), BackendError> {
    let (clients, cases, tasks, documents) = tokio::try_join!(
        remote.load_all::<Client>(),
        remote.load_all::<Case>(),
        remote.load_all::<Task>(),
        remote.load_all::<LegalDocument>(),
    )?;
    store.collection::<Client>().replace_all(clients);
    store.collection::<Case>().replace_all(cases);
    store.collection::<Task>().replace_all(tasks);
    store.collection::<LegalDocument>().replace_all(documents);
    Ok(())
}

fn load_one<R: Stored>(local: &LocalStoreBackend, store: &RecordStore) -> LoadSource {
    let (items, source) = local.load_collection::<R>();
    store.collection::<R>().replace_all(items);
    source
}

fn load_local(backend: BackendKind, local: &LocalStoreBackend, store: &RecordStore) -> LoadReport {
    LoadReport {
        backend,
        clients: load_one::<Client>(local, store),
        cases: load_one::<Case>(local, store),
        tasks: load_one::<Task>(local, store),
        documents: load_one::<LegalDocument>(local, store),
        remote_error: None,
    }
}
