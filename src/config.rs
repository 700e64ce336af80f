//! Configuration management for the pretty parser

use crate::error::{PrettyParserError, Result};
use crate::input::pdf::DEFAULT_PAGE_STRATEGY;
use crate::processing::batch::BatchRunnerBuilder;
use crate::processing::normalizer::NormalizerConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub batch: BatchConfig,
    pub normalizer: NormalizerConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Worker count; derived from the host when absent.
    pub jobs: Option<usize>,
    pub overwrite: bool,
    pub page_strategy: String,
    pub show_progress: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            jobs: None,
            overwrite: false,
            page_strategy: DEFAULT_PAGE_STRATEGY.to_string(),
            show_progress: false,
        }
    }
}

impl Config {
    /// Load from the default location, falling back to defaults when absent.
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(PrettyParserError::InvalidInput(format!(
                "Config file does not exist: {}",
                path.display()
            )));
        }
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = self.to_toml()?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| {
            PrettyParserError::Configuration(format!("Failed to serialize config: {}", e))
        })
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
            .join("pretty-parser")
            .join("config.toml")
    }

    /// Seed a runner builder with the file's options.
    pub fn apply_to(&self, builder: BatchRunnerBuilder) -> BatchRunnerBuilder {
        let builder = builder
            .normalizer_config(self.normalizer.clone())
            .overwrite(self.batch.overwrite)
            .page_strategy(self.batch.page_strategy.clone())
            .show_progress(self.batch.show_progress);

        match self.batch.jobs {
            Some(jobs) => builder.jobs(jobs),
            None => builder,
        }
    }
}
