//! TOML config file persistence.
//!
//! Loading an absent or empty file yields an empty config, not an
//! error. Saving rewrites only the `since` watermark, leaving every
//! other key untouched, and writes atomically so a crashed run never
//! leaves a truncated file behind.

use std::path::Path;

use chrono::{DateTime, Utc};
use tracing::{debug, info};
use warden_core::time_utils::format_rfc3339;
use warden_core::write_text_atomic;

use crate::settings::{BotConfig, ConfigError};

/// Loads the config file; `None` or an absent path yields defaults.
pub fn load(path: Option<&Path>) -> Result<BotConfig, ConfigError> {
    let Some(path) = path else {
        return Ok(BotConfig::default());
    };
    if !path.is_file() {
        debug!(path = %path.display(), "config file absent, starting from empty config");
        return Ok(BotConfig::default());
    }

    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;
    toml::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.display().to_string(),
        source,
    })
}

/// Rewrites the `since` key of an existing config file, preserving all
/// other keys. A missing file is a no-op: there is nothing to carry
/// the watermark forward in.
pub fn save_watermark(path: &Path, since: DateTime<Utc>) -> Result<(), ConfigError> {
    if !path.is_file() {
        debug!(path = %path.display(), "no config file, skipping watermark save");
        return Ok(());
    }

    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let mut document: toml::Table = toml::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.display().to_string(),
        source,
    })?;
    document.insert(
        "since".to_string(),
        toml::Value::String(format_rfc3339(since)),
    );

    let rendered = toml::to_string_pretty(&document).map_err(|source| ConfigError::Write {
        path: path.display().to_string(),
        source: source.into(),
    })?;
    write_text_atomic(path, &rendered).map_err(|source| ConfigError::Write {
        path: path.display().to_string(),
        source: source.into(),
    })?;
    info!("saved current watermark for the next run");
    Ok(())
}

/// Persists the watermark after a completed run. A dry run leaves the
/// stored `since` untouched, and no config path means nothing to
/// persist into.
pub fn persist_watermark(
    path: Option<&Path>,
    dry_run: bool,
    since: DateTime<Utc>,
) -> Result<(), ConfigError> {
    let Some(path) = path else {
        return Ok(());
    };
    if dry_run {
        debug!("dry run, watermark stays unchanged");
        return Ok(());
    }
    save_watermark(path, since)
}
