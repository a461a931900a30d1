// Calendar mirror: best-effort copies of hearing and deadline dates into the
// user's external calendar. Failures are logged here and never escape.

pub mod credentials;
pub mod google;

use std::sync::Arc;

use async_trait::async_trait;
use lexflow_common::calendar::EventPayload;
use thiserror::Error;
use tracing::{debug, warn};

pub use credentials::CredentialCache;
pub use google::GoogleCalendarClient;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CalendarError {
    #[error("calendar is not connected")]
    NotConnected,
    #[error("calendar session expired, reconnect to resume mirroring")]
    Unauthorized,
    #[error("calendar http {status}: {message}")]
    Http { status: u16, message: String },
    #[error("calendar network error: {0}")]
    Transport(String),
    #[error("unexpected calendar response: {0}")]
    Decode(String),
}

/// Event operations against the user's primary calendar.
#[async_trait]
pub trait CalendarApi: Send + Sync {
    async fn create_event(&self, token: &str, event: &EventPayload) -> Result<String, CalendarError>;

    async fn update_event(
        &self,
        token: &str,
        event_id: &str,
        event: &EventPayload,
    ) -> Result<String, CalendarError>;

    async fn delete_event(&self, token: &str, event_id: &str) -> Result<(), CalendarError>;
}

#[derive(Clone)]
pub struct CalendarMirror {
    api: Arc<dyn CalendarApi>,
    credentials: Arc<CredentialCache>,
}

impl std::fmt::Debug for CalendarMirror {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CalendarMirror").field("credentials", &self.credentials).finish()
    }
}

impl CalendarMirror {
    pub fn new(api: Arc<dyn CalendarApi>, credentials: Arc<CredentialCache>) -> Self {
        Self { api, credentials }
    }

    pub fn credentials(&self) -> &Arc<CredentialCache> {
        &self.credentials
    }

    pub fn is_connected(&self) -> bool {
        self.credentials.is_connected()
    }

    /// Create or update the event and return its id. `None` means nothing
    /// was mirrored; the reason has already been logged.
    pub async fn sync_event(&self, existing: Option<&str>, event: &EventPayload) -> Option<String> {
        match self.try_sync(existing, event).await {
            Ok(event_id) => Some(event_id),
            Err(error) => {
                self.note_failure("sync", &error);
                None
            }
        }
    }

    async fn try_sync(&self, existing: Option<&str>, event: &EventPayload) -> Result<String, CalendarError> {
        let token = self.credentials.access_token().ok_or(CalendarError::NotConnected)?;

        if let Some(event_id) = existing {
            match self.api.update_event(&token, event_id, event).await {
                Ok(updated) => return Ok(updated),
                Err(CalendarError::Unauthorized) => return Err(CalendarError::Unauthorized),
                Err(error) => warn!(event_id, %error, "calendar update failed, creating a new event"),
            }
        }
        self.api.create_event(&token, event).await
    }

    /// Remove an event. Returns whether the calendar confirmed it is gone.
    pub async fn delete_event(&self, event_id: &str) -> bool {
        let result = match self.credentials.access_token() {
            Some(token) => self.api.delete_event(&token, event_id).await,
            None => Err(CalendarError::NotConnected),
        };
        match result {
            Ok(()) => true,
            Err(error) => {
                self.note_failure("delete", &error);
                false
            }
        }
    }

    fn note_failure(&self, operation: &'static str, error: &CalendarError) {
        match error {
            CalendarError::NotConnected => debug!(operation, "calendar not connected, skipping mirror"),
            CalendarError::Unauthorized => {
                self.credentials.invalidate();
                warn!(operation, %error, "calendar credential rejected and cleared");
            }
            _ => warn!(operation, %error, "calendar mirror failed"),
        }
    }
}
