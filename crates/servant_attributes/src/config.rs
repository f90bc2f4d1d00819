//! # Stats Configuration
//!
//! The `stats.toml` document: one table per internal attribute, each
//! optionally naming the key it maps to on one or more backends.
//!
//! ```toml
//! [stats.max_health]
//! display_name = "Max Health"
//! mapping.attributeplus = "生命力"
//! ```
//!
//! If the file is missing on first start, [`DEFAULT_STATS_TOML`] is written
//! in its place. An existing file is never overwritten. The default is
//! staged next to the target and renamed in, so an interrupted write never
//! leaves a truncated `stats.toml` behind.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{AttributeError, AttributeResult};

/// Default stats document, materialized when no file exists yet.
pub const DEFAULT_STATS_TOML: &str = r#"# Servant stat table.
#
# One [stats.<key>] table per internal attribute. An entry is bridged onto an
# external attribute backend only if it carries mapping.<backend> = "<key>".

[stats.physical_damage]
display_name = "Physical Damage"
mapping.attributeplus = "物理伤害"

[stats.physical_defense]
display_name = "Physical Defense"
mapping.attributeplus = "物理防御"

[stats.max_health]
display_name = "Max Health"
mapping.attributeplus = "生命力"

[stats.crit_chance]
display_name = "Critical Chance"
mapping.attributeplus = "暴击几率"

[stats.crit_damage]
display_name = "Critical Damage"
mapping.attributeplus = "暴击伤害"

[stats.movement_speed]
display_name = "Movement Speed"
mapping.attributeplus = "移动速度"

[stats.loyalty]
display_name = "Loyalty"
"#;

/// One attribute entry in the stats document.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatEntry {
    /// Name shown to players.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Backend name -> backend-native key.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub mapping: BTreeMap<String, String>,
}

/// The parsed stats document.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsConfig {
    /// Internal attribute key -> entry.
    #[serde(default)]
    pub stats: BTreeMap<String, StatEntry>,
}

impl StatsConfig {
    /// Parses a stats document.
    ///
    /// # Errors
    ///
    /// Returns [`AttributeError::InvalidConfig`] if the text is not a valid
    /// stats document.
    pub fn from_toml_str(text: &str) -> AttributeResult<Self> {
        toml::from_str(text).map_err(|e| AttributeError::InvalidConfig(e.to_string()))
    }

    /// Reads and parses the stats document at `path`.
    ///
    /// # Errors
    ///
    /// Returns an io error if the file cannot be read, or
    /// [`AttributeError::InvalidConfig`] if it does not parse.
    pub fn load(path: &Path) -> AttributeResult<Self> {
        let text = fs::read_to_string(path).map_err(|source| AttributeError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Writes [`DEFAULT_STATS_TOML`] to `path` unless a file is already there.
    ///
    /// Returns `true` if the default was written. On failure nothing is left
    /// at `path`, so the next start tries again.
    ///
    /// # Errors
    ///
    /// Returns an io error if the parent directory or the file cannot be
    /// created.
    pub fn bootstrap(path: &Path) -> AttributeResult<bool> {
        let io_err = |source| AttributeError::Io {
            path: path.to_path_buf(),
            source,
        };

        if path.exists() {
            return Ok(false);
        }
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }

        let staging = Self::staging_path(path);
        let written =
            fs::write(&staging, DEFAULT_STATS_TOML).and_then(|()| fs::rename(&staging, path));
        if let Err(e) = written {
            fs::remove_file(&staging).ok();
            return Err(io_err(e));
        }
        tracing::info!("Wrote default stats config to {}", path.display());
        Ok(true)
    }

    /// Where [`bootstrap`](Self::bootstrap) stages the default before
    /// renaming it to `path`.
    #[must_use]
    pub fn staging_path(path: &Path) -> PathBuf {
        let mut name = path.file_name().unwrap_or_default().to_os_string();
        name.push(".partial");
        path.with_file_name(name)
    }

    /// Bootstraps `path` if needed, then loads it.
    ///
    /// # Errors
    ///
    /// See [`bootstrap`](Self::bootstrap) and [`load`](Self::load).
    pub fn load_or_bootstrap(path: &Path) -> AttributeResult<Self> {
        Self::bootstrap(path)?;
        Self::load(path)
    }
}
