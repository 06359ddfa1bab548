use logtailer_capture::{Interceptor, Serializer};
use logtailer_capture::serialize::DEFAULT_MAX_DEPTH;
use logtailer_store::{AnyStorage, MemoryStorage, SqliteStorage};
use logtailer_types::LogLevel;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::{Error, Result};

pub const CONFIG_FILE: &str = "config.toml";
pub const DATABASE_FILE: &str = "logtailer.db";

/// Resolve the data directory based on priority:
/// 1. Explicit path (with tilde expansion)
/// 2. LOGTAILER_PATH environment variable (with tilde expansion)
/// 3. XDG data directory
/// 4. ~/.logtailer
pub fn resolve_data_dir(explicit_path: Option<&str>) -> Result<PathBuf> {
    if let Some(path) = explicit_path {
        return Ok(expand_tilde(path));
    }

    if let Ok(env_path) = std::env::var("LOGTAILER_PATH") {
        return Ok(expand_tilde(&env_path));
    }

    if let Some(data_dir) = dirs::data_dir() {
        return Ok(data_dir.join("logtailer"));
    }

    if let Some(home) = std::env::var_os("HOME") {
        return Ok(PathBuf::from(home).join(".logtailer"));
    }

    Err(Error::Config(
        "Could not determine data directory: no HOME directory or XDG data directory found"
            .to_string(),
    ))
}

fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/")
        && let Some(home) = std::env::var_os("HOME")
    {
        return PathBuf::from(home).join(stripped);
    }
    PathBuf::from(path)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Sqlite,
    Memory,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,

    /// Database file; defaults to `logtailer.db` in the data directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptureConfig {
    #[serde(default = "all_levels")]
    pub levels: Vec<LogLevel>,

    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            levels: all_levels(),
            max_depth: default_max_depth(),
        }
    }
}

fn all_levels() -> Vec<LogLevel> {
    LogLevel::ALL.to_vec()
}

fn default_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub capture: CaptureConfig,
}

impl Config {
    pub fn path_in(data_dir: &Path) -> PathBuf {
        data_dir.join(CONFIG_FILE)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn storage_path(&self, data_dir: &Path) -> PathBuf {
        match &self.storage.path {
            Some(path) if path.is_absolute() => path.clone(),
            Some(path) => data_dir.join(path),
            None => data_dir.join(DATABASE_FILE),
        }
    }

    pub fn open_storage(&self, data_dir: &Path) -> Result<AnyStorage> {
        let storage = match self.storage.backend {
            StorageBackend::Memory => AnyStorage::from(MemoryStorage::new()),
            StorageBackend::Sqlite => {
                AnyStorage::from(SqliteStorage::open(&self.storage_path(data_dir))?)
            }
        };
        tracing::debug!(backend = storage.backend_name(), "storage opened");
        Ok(storage)
    }

    pub fn interceptor(&self) -> Interceptor {
        Interceptor::new()
            .with_levels(self.capture.levels.iter().copied())
            .with_serializer(Serializer::with_max_depth(self.capture.max_depth))
    }
}
