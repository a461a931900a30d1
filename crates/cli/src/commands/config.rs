// `lexflow config`: show or edit `~/.lexflow/config.toml`.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, Subcommand};
use lexflow_sync::config::{global_config_path, ConfigError, GlobalConfig, CONFIG_KEYS};
use serde::Serialize;
use tracing::debug;

use super::emit;
use crate::output::OutputFormat;

const SECRET_KEYS: [&str; 1] = ["remote.key"];

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show every key, with environment overrides applied
    Show(ShowArgs),
    /// Set one key in the config file
    Set(SetArgs),
    /// Remove one key from the config file
    Unset(UnsetArgs),
}

#[derive(Debug, Args)]
pub struct ShowArgs {
    /// Force JSON output.
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Args)]
pub struct SetArgs {
    /// One of: data_dir, remote.url, remote.key, calendar.client_id,
    /// calendar.redirect_uri, calendar.api_base.
    key: String,
    value: String,
    /// Force JSON output.
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Args)]
pub struct UnsetArgs {
    key: String,
    /// Force JSON output.
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigEntry {
    pub key: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConfigResult {
    pub path: String,
    pub entries: Vec<ConfigEntry>,
}

pub fn run(cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show(args) => {
            emit(OutputFormat::detect(args.json), show(), format_human)
        }
        ConfigCommand::Set(args) => {
            emit(OutputFormat::detect(args.json), edit(&args.key, Some(&args.value)), format_human)
        }
        ConfigCommand::Unset(args) => {
            emit(OutputFormat::detect(args.json), edit(&args.key, None), format_human)
        }
    }
}

fn config_path() -> anyhow::Result<PathBuf> {
    global_config_path().context("could not determine home directory")
}

fn show() -> anyhow::Result<ConfigResult> {
    let path = config_path()?;
    let config = GlobalConfig::load_existing(&path)
        .with_context(|| format!("failed to read `{}`", path.display()))?
        .with_env_overrides(|name| std::env::var(name).ok());
    Ok(listing(&path, &config)?)
}

fn edit(key: &str, value: Option<&str>) -> anyhow::Result<ConfigResult> {
    let path = config_path()?;
    let mut config = GlobalConfig::load_existing(&path)
        .with_context(|| format!("failed to read `{}`", path.display()))?;
    config.set_key(key, value)?;
    config.save_to(&path).with_context(|| format!("failed to write `{}`", path.display()))?;
    debug!(key, path = %path.display(), "config updated");
    Ok(listing(&path, &config)?)
}

fn listing(path: &Path, config: &GlobalConfig) -> Result<ConfigResult, ConfigError> {
    let entries = CONFIG_KEYS
        .into_iter()
        .map(|key| {
            let value = config.get_key(key)?;
            let value = if SECRET_KEYS.contains(&key) { value.as_deref().map(mask) } else { value };
            Ok(ConfigEntry { key, value })
        })
        .collect::<Result<_, ConfigError>>()?;
    Ok(ConfigResult { path: path.display().to_string(), entries })
}

/// Keep the last four characters so a key can be recognised.
fn mask(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 8 {
        return "****".to_string();
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("****{tail}")
}

fn format_human(result: &ConfigResult) -> String {
    let mut lines = vec![result.path.clone()];
    for entry in &result.entries {
        match &entry.value {
            Some(value) => lines.push(format!("  {} = {value}", entry.key)),
            None => lines.push(format!("  {}  (unset)", entry.key)),
        }
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listing_covers_every_key_and_masks_the_remote_key() {
        let mut config = GlobalConfig::default();
        config.set_key("remote.url", Some("https://xyz.example.co")).expect("known key");
        config.set_key("remote.key", Some("eyJhbGciOiJIUzI1NiJ9.anon")).expect("known key");

        let result = listing(Path::new("/home/adv/.lexflow/config.toml"), &config).expect("listing");
        assert_eq!(result.entries.len(), CONFIG_KEYS.len());
        assert_eq!(
            result.entries[1],
            ConfigEntry { key: "remote.url", value: Some("https://xyz.example.co".into()) }
        );
        assert_eq!(result.entries[2], ConfigEntry { key: "remote.key", value: Some("****anon".into()) });
    }

    #[test]
    fn short_secrets_are_fully_masked() {
        assert_eq!(mask("abc"), "****");
        assert_eq!(mask("12345678"), "****");
        assert_eq!(mask("123456789"), "****6789");
    }

    #[test]
    fn human_output_marks_unset_keys() {
        let mut config = GlobalConfig::default();
        config.set_key("calendar.client_id", Some("abc.apps.googleusercontent.com")).expect("known key");
        let text = format_human(&listing(Path::new("config.toml"), &config).expect("listing"));
        assert!(text.starts_with("config.toml\n  data_dir  (unset)\n"));
        assert!(text.contains("  calendar.client_id = abc.apps.googleusercontent.com\n"));
    }

    #[test]
    fn json_omits_unset_values() {
        let result = listing(Path::new("config.toml"), &GlobalConfig::default()).expect("listing");
        let json = serde_json::to_value(&result).expect("result should serialize");
        assert_eq!(json["entries"][0], serde_json::json!({ "key": "data_dir" }));
    }
}
