use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::{Mutex, PoisonError};

use anyhow::{bail, Context, Result};

const KEYRING_SERVICE: &str = "com.lexflow.sync";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SecretSlot {
    /// Calendar access token with its absolute expiry.
    CalendarCredential,
}

impl SecretSlot {
    fn account(self) -> &'static str {
        match self {
            Self::CalendarCredential => "google_calendar_credential",
        }
    }
}

pub fn ensure_owner_only_file(path: &Path) -> Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;

        if !path.exists() {
            return Ok(());
        }

        let metadata = fs::metadata(path)
            .with_context(|| format!("failed to read metadata for `{}`", path.display()))?;
        let mode = metadata.permissions().mode() & 0o777;
        if mode != 0o600 {
            fs::set_permissions(path, fs::Permissions::from_mode(0o600))
                .with_context(|| format!("failed to set owner-only mode on `{}`", path.display()))?;
        }
    }

    #[cfg(not(unix))]
    {
        let _ = path;
    }

    Ok(())
}

pub fn ensure_owner_only_dir(path: &Path) -> Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;

        if !path.exists() {
            return Ok(());
        }

        let metadata = fs::metadata(path)
            .with_context(|| format!("failed to read metadata for `{}`", path.display()))?;
        let mode = metadata.permissions().mode() & 0o777;
        if mode != 0o700 {
            fs::set_permissions(path, fs::Permissions::from_mode(0o700))
                .with_context(|| format!("failed to set owner-only mode on `{}`", path.display()))?;
        }
    }

    #[cfg(not(unix))]
    {
        let _ = path;
    }

    Ok(())
}

// ── Secret storage ─────────────────────────────────────────────────

/// Durable home for small secrets, keyed by slot.
pub trait SecretStore: Send + Sync {
    fn set_secret(&self, slot: SecretSlot, value: &str) -> Result<()>;
    fn get_secret(&self, slot: SecretSlot) -> Result<Option<String>>;
    fn delete_secret(&self, slot: SecretSlot) -> Result<()>;
}

/// OS keychain.
pub struct KeyringSecretStore;

impl KeyringSecretStore {
    fn entry(slot: SecretSlot) -> Result<keyring::Entry> {
        keyring::Entry::new(KEYRING_SERVICE, slot.account())
            .context("failed to initialize keychain entry")
    }
}

impl SecretStore for KeyringSecretStore {
    fn set_secret(&self, slot: SecretSlot, value: &str) -> Result<()> {
        if value.trim().is_empty() {
            bail!("secret value must not be empty");
        }
        Self::entry(slot)?
            .set_password(value)
            .with_context(|| format!("failed to persist `{}` in keychain", slot.account()))
    }

    fn get_secret(&self, slot: SecretSlot) -> Result<Option<String>> {
        match Self::entry(slot)?.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(error) => Err(error)
                .with_context(|| format!("failed to read `{}` from keychain", slot.account())),
        }
    }

    fn delete_secret(&self, slot: SecretSlot) -> Result<()> {
        match Self::entry(slot)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(error) => Err(error)
                .with_context(|| format!("failed to clear `{}` from keychain", slot.account())),
        }
    }
}

/// Process-local store for tests and keychain-less environments.
#[derive(Default)]
pub struct MemorySecretStore {
    values: Mutex<HashMap<SecretSlot, String>>,
}

impl SecretStore for MemorySecretStore {
    fn set_secret(&self, slot: SecretSlot, value: &str) -> Result<()> {
        if value.trim().is_empty() {
            bail!("secret value must not be empty");
        }
        self.values.lock().unwrap_or_else(PoisonError::into_inner).insert(slot, value.to_string());
        Ok(())
    }

    fn get_secret(&self, slot: SecretSlot) -> Result<Option<String>> {
        Ok(self.values.lock().unwrap_or_else(PoisonError::into_inner).get(&slot).cloned())
    }

    fn delete_secret(&self, slot: SecretSlot) -> Result<()> {
        self.values.lock().unwrap_or_else(PoisonError::into_inner).remove(&slot);
        Ok(())
    }
}
