//! # Provider Selection
//!
//! One explicit profile object decides which backend is live. Nothing else
//! in the codebase branches on provider: callers hold an
//! `Arc<dyn RecordStore>` and [`connect`] is the only place a concrete
//! adapter is constructed.
//!
//! ## Switching Providers
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │   profile.toml ──► StoreProfile ──► connect() ──► Arc<dyn RecordStore> │
//! │                                                                         │
//! │   To switch: edit the profile, drop every live feed and the old Arc,   │
//! │   call connect() again. Dropping a ChangeFeed aborts its listener      │
//! │   task, so the old backend holds no residual subscriptions.            │
//! │                                                                         │
//! │   Backends do NOT sync with each other. Moving data between them is    │
//! │   an explicit backup export/import (see crate::backup).                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The profile lives at the platform config dir
//! (e.g. `~/.config/vyapar/profile.toml` on Linux) as TOML.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::adapter::RecordStore;
use crate::document::{DocConfig, DocStore};
use crate::error::{StoreError, StoreResult};
use crate::local::{LocalConfig, LocalStore};
use crate::table::{TableConfig, TableStore};

// =============================================================================
// Provider
// =============================================================================

/// The three interchangeable backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Provider {
    /// On-device SQLite. The offline default.
    #[default]
    Local,
    /// Hosted Redis document store.
    Document,
    /// Hosted Postgres table store.
    Table,
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Provider::Local => "local",
            Provider::Document => "document",
            Provider::Table => "table",
        };
        f.write_str(name)
    }
}

impl FromStr for Provider {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "local" => Ok(Provider::Local),
            "document" => Ok(Provider::Document),
            "table" => Ok(Provider::Table),
            other => Err(StoreError::Config(format!("unknown provider: {other}"))),
        }
    }
}

// =============================================================================
// Profile
// =============================================================================

/// Per-backend connection settings. Only the active provider's section is
/// consulted; the others may stay blank.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct LocalSettings {
    /// Database file path. Empty means the platform data dir.
    pub database_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DocumentSettings {
    /// Redis connection URL.
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct TableSettings {
    /// Postgres connection URL.
    pub url: String,
    /// Pool size; 0 means the default.
    pub max_connections: u32,
}

/// The persisted provider profile.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct StoreProfile {
    /// Which backend is live.
    pub provider: Provider,

    /// Account id. Hosted backends partition every key by it; the local
    /// store keeps it so a later migration to a hosted backend stays
    /// attributable.
    pub account: String,

    pub local: LocalSettings,
    pub document: DocumentSettings,
    pub table: TableSettings,
}

impl StoreProfile {
    /// Loads the profile from the platform config dir. A missing file
    /// yields the default profile (local provider), not an error.
    pub fn load() -> StoreResult<Self> {
        Self::load_from(&profile_path()?)
    }

    /// Loads the profile from an explicit path.
    pub fn load_from(path: &Path) -> StoreResult<Self> {
        if !path.exists() {
            return Ok(StoreProfile::default());
        }
        let text = std::fs::read_to_string(path)
            .map_err(|e| StoreError::Config(format!("cannot read profile: {e}")))?;
        toml::from_str(&text).map_err(|e| StoreError::Config(format!("malformed profile: {e}")))
    }

    /// Saves the profile to the platform config dir.
    pub fn save(&self) -> StoreResult<()> {
        self.save_to(&profile_path()?)
    }

    /// Saves the profile to an explicit path, creating parent directories.
    pub fn save_to(&self, path: &Path) -> StoreResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| StoreError::Config(format!("cannot create config dir: {e}")))?;
        }
        let text = toml::to_string_pretty(self)
            .map_err(|e| StoreError::Config(format!("cannot encode profile: {e}")))?;
        std::fs::write(path, text)
            .map_err(|e| StoreError::Config(format!("cannot write profile: {e}")))?;
        Ok(())
    }
}

fn project_dirs() -> StoreResult<ProjectDirs> {
    ProjectDirs::from("com", "vyapar-lite", "vyapar")
        .ok_or_else(|| StoreError::Config("no home directory available".to_string()))
}

fn profile_path() -> StoreResult<PathBuf> {
    Ok(project_dirs()?.config_dir().join("profile.toml"))
}

fn default_database_path() -> StoreResult<PathBuf> {
    let dirs = project_dirs()?;
    std::fs::create_dir_all(dirs.data_dir())
        .map_err(|e| StoreError::Config(format!("cannot create data dir: {e}")))?;
    Ok(dirs.data_dir().join("vyapar.db"))
}

// =============================================================================
// Connect
// =============================================================================

/// Constructs the adapter the profile names. This is the only place in the
/// crate where a concrete backend type is chosen.
pub async fn connect(profile: &StoreProfile) -> StoreResult<Arc<dyn RecordStore>> {
    info!(provider = %profile.provider, "Connecting record store");
    match profile.provider {
        Provider::Local => {
            let path = match &profile.local.database_path {
                Some(path) => path.clone(),
                None => default_database_path()?,
            };
            let store = LocalStore::connect(LocalConfig::new(path), &profile.account).await?;
            Ok(Arc::new(store))
        }
        Provider::Document => {
            if profile.document.url.is_empty() {
                return Err(StoreError::Config(
                    "document provider selected but no url configured".to_string(),
                ));
            }
            let store =
                DocStore::connect(DocConfig::new(&profile.document.url), &profile.account).await?;
            Ok(Arc::new(store))
        }
        Provider::Table => {
            if profile.table.url.is_empty() {
                return Err(StoreError::Config(
                    "table provider selected but no url configured".to_string(),
                ));
            }
            let mut config = TableConfig::new(&profile.table.url);
            if profile.table.max_connections > 0 {
                config = config.max_connections(profile.table.max_connections);
            }
            let store = TableStore::connect(config, &profile.account).await?;
            Ok(Arc::new(store))
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
