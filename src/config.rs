//! Pipeline configuration
//!
//! YAML file plus environment overrides. The entity pattern table lives in
//! its own file so extraction rules can change without a rebuild.

use market_transformer::{PatternConfig, PatternError, PatternSet};
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load config file: {0}")]
    FileError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Pattern config error: {0}")]
    PatternError(#[from] PatternError),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

fn default_gamma_api_url() -> String {
    "https://gamma-api.polymarket.com".to_string()
}

fn default_database_path() -> String {
    "sqlite://market_ingest.db".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Pipeline configuration loaded from YAML
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    #[serde(default = "default_gamma_api_url")]
    pub gamma_api_url: String,

    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Extra entity extraction rules, appended after the built-in table
    #[serde(default)]
    pub patterns_file: Option<String>,

    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            gamma_api_url: default_gamma_api_url(),
            database_path: default_database_path(),
            patterns_file: None,
            log_level: default_log_level(),
        }
    }
}

impl PipelineConfig {
    /// Load configuration from YAML file, then apply env overrides
    pub fn load(config_path: impl AsRef<Path>) -> Result<Self> {
        let yaml_content = std::fs::read_to_string(config_path)?;
        let mut config: PipelineConfig = serde_yaml::from_str(&yaml_content)?;

        // Deployment-specific values win over the checked-in file
        if let Ok(url) = std::env::var("GAMMA_API_URL") {
            config.gamma_api_url = url;
        }
        if let Ok(path) = std::env::var("DATABASE_PATH") {
            config.database_path = path;
        }

        Ok(config)
    }

    /// Build the extraction pattern table this deployment runs with
    pub fn pattern_set(&self) -> Result<PatternSet> {
        match &self.patterns_file {
            Some(path) => {
                let pattern_config = PatternConfig::load(path)?;
                let set = PatternSet::with_config(&pattern_config)?;
                info!(
                    "Loaded pattern table from {} ({} rules total)",
                    path,
                    set.rules().len()
                );
                Ok(set)
            }
            None => Ok(PatternSet::builtin()),
        }
    }

    pub fn log(&self) {
        info!("Gamma API: {}", self.gamma_api_url);
        info!("Database: {}", self.database_path);
        info!(
            "Patterns: {}",
            self.patterns_file.as_deref().unwrap_or("(built-in)")
        );
    }
}

/// Resolve the pipeline config path from the environment
pub fn config_path_from_env() -> String {
    std::env::var("PIPELINE_CONFIG_PATH").unwrap_or_else(|_| "config/pipeline.yaml".to_string())
}
