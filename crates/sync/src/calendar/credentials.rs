// Calendar access credential: cached in memory, persisted in the secret store.

use std::sync::{Arc, PoisonError, RwLock};

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};
use url::{form_urlencoded, Url};

use crate::security::{MemorySecretStore, SecretSlot, SecretStore};

pub const AUTHORIZE_ENDPOINT: &str = "https://accounts.google.com/o/oauth2/v2/auth";
pub const CALENDAR_EVENTS_SCOPE: &str = "https://www.googleapis.com/auth/calendar.events";

/// Lifetime assumed when the provider omits `expires_in`.
pub const DEFAULT_EXPIRES_IN_SECS: i64 = 3600;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct Credential {
    access_token: String,
    expires_at: DateTime<Utc>,
}

impl Credential {
    fn is_live(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

pub struct CredentialCache {
    current: RwLock<Option<Credential>>,
    secrets: Arc<dyn SecretStore>,
}

impl std::fmt::Debug for CredentialCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialCache").field("connected", &self.is_connected()).finish()
    }
}

impl CredentialCache {
    /// Restore a previously stored credential. Unreadable or expired
    /// entries are dropped.
    pub fn load(secrets: Arc<dyn SecretStore>) -> Self {
        let cache = Self { current: RwLock::new(None), secrets };
        let stored = match cache.secrets.get_secret(SecretSlot::CalendarCredential) {
            Ok(stored) => stored,
            Err(error) => {
                warn!(error = %format!("{error:#}"), "failed to read stored calendar credential");
                None
            }
        };

        match stored.map(|raw| serde_json::from_str::<Credential>(&raw)) {
            Some(Ok(credential)) if credential.is_live(Utc::now()) => {
                *cache.current.write().unwrap_or_else(PoisonError::into_inner) = Some(credential);
            }
            Some(Ok(_)) => cache.invalidate(),
            Some(Err(error)) => {
                warn!(%error, "stored calendar credential is unreadable");
                cache.invalidate();
            }
            None => {}
        }
        cache
    }

    pub fn in_memory() -> Self {
        Self::load(Arc::new(MemorySecretStore::default()))
    }

    /// Store a freshly granted token valid for `expires_in_secs`.
    pub fn connect(&self, access_token: &str, expires_in_secs: i64) -> Result<()> {
        self.connect_at(access_token, expires_in_secs, Utc::now())
    }

    fn connect_at(&self, access_token: &str, expires_in_secs: i64, now: DateTime<Utc>) -> Result<()> {
        let access_token = access_token.trim();
        anyhow::ensure!(!access_token.is_empty(), "access token must not be empty");

        let expires_at = Duration::try_seconds(expires_in_secs)
            .and_then(|lifetime| now.checked_add_signed(lifetime))
            .with_context(|| format!("token lifetime of {expires_in_secs}s is out of range"))?;
        let credential = Credential { access_token: access_token.to_string(), expires_at };
        let raw = serde_json::to_string(&credential).context("failed to encode calendar credential")?;
        self.secrets.set_secret(SecretSlot::CalendarCredential, &raw)?;
        info!(expires_at = %credential.expires_at, "calendar connected");
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Some(credential);
        Ok(())
    }

    /// The bearer token, while it is still valid.
    pub fn access_token(&self) -> Option<String> {
        self.access_token_at(Utc::now())
    }

    fn access_token_at(&self, now: DateTime<Utc>) -> Option<String> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .filter(|credential| credential.is_live(now))
            .map(|credential| credential.access_token.clone())
    }

    pub fn is_connected(&self) -> bool {
        self.access_token().is_some()
    }

    /// Forget the credential after the provider rejected it.
    pub fn invalidate(&self) {
        self.current.write().unwrap_or_else(PoisonError::into_inner).take();
        if let Err(error) = self.secrets.delete_secret(SecretSlot::CalendarCredential) {
            warn!(error = %format!("{error:#}"), "failed to clear stored calendar credential");
        }
    }

    pub fn disconnect(&self) -> Result<()> {
        self.current.write().unwrap_or_else(PoisonError::into_inner).take();
        self.secrets.delete_secret(SecretSlot::CalendarCredential)?;
        info!("calendar disconnected");
        Ok(())
    }
}

// ── Authorization flow ─────────────────────────────────────────────

/// Consent URL for the implicit grant. The provider redirects back to
/// `redirect_uri` with the token in the fragment.
pub fn authorization_url(client_id: &str, redirect_uri: &str, state: &str) -> Result<Url, url::ParseError> {
    Url::parse_with_params(
        AUTHORIZE_ENDPOINT,
        &[
            ("client_id", client_id),
            ("redirect_uri", redirect_uri),
            ("response_type", "token"),
            ("scope", CALENDAR_EVENTS_SCOPE),
            ("include_granted_scopes", "true"),
            ("state", state),
        ],
    )
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenGrant {
    pub access_token: String,
    pub expires_in_secs: i64,
    pub state: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CallbackError {
    #[error("authorization was refused: {0}")]
    Denied(String),
    #[error("redirect carried no access token")]
    MissingToken,
}

/// Read the token out of a redirect URL, or out of its bare fragment.
pub fn parse_token_callback(callback: &str) -> Result<TokenGrant, CallbackError> {
    let callback = callback.trim();
    let fragment = match Url::parse(callback) {
        Ok(url) => url.fragment().unwrap_or_default().to_string(),
        Err(_) => callback.trim_start_matches('#').to_string(),
    };

    let mut access_token = None;
    let mut expires_in_secs = DEFAULT_EXPIRES_IN_SECS;
    let mut state = None;
    for (key, value) in form_urlencoded::parse(fragment.as_bytes()) {
        match key.as_ref() {
            "error" => return Err(CallbackError::Denied(value.into_owned())),
            "access_token" if !value.is_empty() => access_token = Some(value.into_owned()),
            "expires_in" => expires_in_secs = value.parse().unwrap_or(DEFAULT_EXPIRES_IN_SECS),
            "state" => state = Some(value.into_owned()),
            _ => {}
        }
    }

    let access_token = access_token.ok_or(CallbackError::MissingToken)?;
    Ok(TokenGrant { access_token, expires_in_secs, state })
}
