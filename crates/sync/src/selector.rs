// Backend selection: decided once from configuration, never re-evaluated.

use std::fmt;
use std::net::IpAddr;

use serde::Serialize;
use tracing::info;
use url::{Host, Url};

use crate::config::RemoteConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    Remote,
    Local,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Remote => "remote",
            Self::Local => "local",
        })
    }
}

/// Validated remote table service location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteTarget {
    pub url: Url,
    pub key: String,
}

/// Why a configured remote was not usable.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RemoteRejection {
    #[error("remote url is not set")]
    MissingUrl,
    #[error("remote key is not set")]
    MissingKey,
    #[error("invalid remote url `{url}`: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("remote url must use https (http is allowed only for localhost testing)")]
    InsecureScheme,
}

/// The remote target, or why there isn't one.
pub fn remote_target(config: &RemoteConfig) -> Result<RemoteTarget, RemoteRejection> {
    let raw_url = config
        .url
        .as_deref()
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .ok_or(RemoteRejection::MissingUrl)?;
    let key = config
        .key
        .as_deref()
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .ok_or(RemoteRejection::MissingKey)?;

    let url = validate_remote_url(raw_url)?;
    Ok(RemoteTarget { url, key: key.to_string() })
}

/// Pick the backend for the process lifetime. Anything short of a fully
/// valid remote configuration selects the local store.
pub fn select_backend(config: &RemoteConfig) -> (BackendKind, Option<RemoteTarget>) {
    match remote_target(config) {
        Ok(target) => {
            info!(url = %target.url, "remote table service selected");
            (BackendKind::Remote, Some(target))
        }
        Err(reason) => {
            info!(%reason, "remote table service unavailable, using local store");
            (BackendKind::Local, None)
        }
    }
}

fn validate_remote_url(value: &str) -> Result<Url, RemoteRejection> {
    let parsed = Url::parse(value).map_err(|error| RemoteRejection::InvalidUrl {
        url: value.to_string(),
        reason: error.to_string(),
    })?;
    match parsed.scheme() {
        "https" => Ok(parsed),
        "http" if is_loopback_host(parsed.host()) => Ok(parsed),
        "http" => Err(RemoteRejection::InsecureScheme),
        other => Err(RemoteRejection::InvalidUrl {
            url: value.to_string(),
            reason: format!("unsupported scheme `{other}`"),
        }),
    }
}

fn is_loopback_host(host: Option<Host<&str>>) -> bool {
    match host {
        Some(Host::Domain(name)) => {
            name.eq_ignore_ascii_case("localhost") || name.parse::<IpAddr>().is_ok_and(|a| a.is_loopback())
        }
        Some(Host::Ipv4(addr)) => addr.is_loopback(),
        Some(Host::Ipv6(addr)) => addr.is_loopback(),
        None => false,
    }
}
