use anyhow::{Context, Result};
use logtailer_runtime::{Config, Extension};
use std::path::{Path, PathBuf};

use crate::types::OutputFormat;

pub struct ExecutionContext {
    data_dir: PathBuf,
    pub format: OutputFormat,
}

impl ExecutionContext {
    pub fn new(data_dir: PathBuf, format: OutputFormat) -> Self {
        Self { data_dir, format }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn config_path(&self) -> PathBuf {
        Config::path_in(&self.data_dir)
    }

    pub fn config(&self) -> Result<Config> {
        let path = self.config_path();
        Config::load_from(&path).with_context(|| format!("Failed to load {}", path.display()))
    }

    pub fn json(&self) -> bool {
        self.format == OutputFormat::Json
    }

    /// Start an extension instance over the configured storage.
    pub async fn start_extension(&self) -> Result<Extension> {
        let config = self.config()?;
        Extension::start(&config, &self.data_dir)
            .await
            .with_context(|| format!("Failed to open log store in {}", self.data_dir.display()))
    }
}
