use anyhow::{anyhow, Context, Result};
use log::{LevelFilter, warn};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::errors::AppError;
use crate::pipeline::PipelineConfig;
use crate::segmentation::SplitUnit;
use crate::segmentation::reassembler::DEFAULT_SEPARATOR_BLANK_LINES;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Config {
    /// Classifier selection and provider table
    #[serde(default)]
    pub classifier: ClassifierConfig,

    /// Sorting behaviour
    #[serde(default)]
    pub sorting: SortingConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Source of topic decisions
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ClassifierProvider {
    // @provider: Ollama
    #[default]
    Ollama,
    // @provider: No model; manual or fixed decisions
    #[serde(rename = "none")]
    Disabled,
}

impl ClassifierProvider {
    // @returns: Capitalized provider name
    pub fn display_name(&self) -> &str {
        match self {
            Self::Ollama => "Ollama",
            Self::Disabled => "None",
        }
    }

    // @returns: Lowercase provider identifier
    pub fn to_lowercase_string(&self) -> String {
        match self {
            Self::Ollama => "ollama".to_string(),
            Self::Disabled => "none".to_string(),
        }
    }
}

impl std::fmt::Display for ClassifierProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_lowercase_string())
    }
}

impl std::str::FromStr for ClassifierProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "ollama" => Ok(Self::Ollama),
            "none" => Ok(Self::Disabled),
            _ => Err(anyhow!("Invalid provider type: {}", s)),
        }
    }
}

/// Provider configuration wrapper
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ProviderConfig {
    // @field: Provider type identifier
    #[serde(rename = "type")]
    pub provider_type: String,

    // @field: Model name
    #[serde(default = "String::new")]
    pub model: String,

    // @field: Service URL
    #[serde(default = "String::new")]
    pub endpoint: String,

    // @field: Timeout seconds per classifier request
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    // @field: Retries after a transport failure
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,

    // @field: Initial backoff, doubled on each retry
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    // @field: Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

impl ProviderConfig {
    // @returns: Ollama provider config with defaults
    pub fn ollama() -> Self {
        Self {
            provider_type: "ollama".to_string(),
            model: default_ollama_model(),
            endpoint: default_ollama_endpoint(),
            timeout_secs: default_timeout_secs(),
            retry_count: default_retry_count(),
            retry_backoff_ms: default_retry_backoff_ms(),
            temperature: default_temperature(),
        }
    }
}

/// Classifier configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ClassifierConfig {
    /// Classifier provider to use
    #[serde(default)]
    pub provider: ClassifierProvider,

    /// Available classifier providers
    #[serde(default)]
    pub available_providers: Vec<ProviderConfig>,

    /// Model used by the last successful run
    #[serde(default)]
    pub last_model: Option<String>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            provider: ClassifierProvider::default(),
            available_providers: vec![ProviderConfig::ollama()],
            last_model: None,
        }
    }
}

impl ClassifierConfig {
    /// Get the active provider configuration from the available_providers array
    pub fn get_active_provider_config(&self) -> Option<&ProviderConfig> {
        let provider_str = self.provider.to_lowercase_string();
        self.available_providers.iter().find(|p| p.provider_type == provider_str)
    }

    fn get_active_provider_config_mut(&mut self) -> Option<&mut ProviderConfig> {
        let provider_str = self.provider.to_lowercase_string();
        self.available_providers.iter_mut().find(|p| p.provider_type == provider_str)
    }

    /// Get the model for the active provider
    pub fn get_model(&self) -> String {
        if let Some(provider_config) = self.get_active_provider_config() {
            if !provider_config.model.is_empty() {
                return provider_config.model.clone();
            }
        }
        if let Some(model) = self.last_model.as_ref().filter(|m| !m.is_empty()) {
            return model.clone();
        }
        default_ollama_model()
    }

    /// Get the endpoint for the active provider
    pub fn get_endpoint(&self) -> String {
        if let Some(provider_config) = self.get_active_provider_config() {
            if !provider_config.endpoint.is_empty() {
                return provider_config.endpoint.clone();
            }
        }
        default_ollama_endpoint()
    }

    /// Active provider entry, or the Ollama defaults when the table has none
    pub fn active_provider_or_default(&self) -> ProviderConfig {
        let mut provider = self.get_active_provider_config().cloned().unwrap_or_else(ProviderConfig::ollama);
        provider.model = self.get_model();
        provider.endpoint = self.get_endpoint();
        provider
    }
}

/// Sorting options
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct SortingConfig {
    /// Ask the classifier to treat sub-aspects of one story as the same topic
    #[serde(default = "default_true")]
    pub keep_same_topic: bool,

    /// Fold same-topic neighbours into one entry
    #[serde(default)]
    pub merge_on_same_topic: bool,

    /// Unit space for split points
    #[serde(default)]
    pub split_unit: SplitUnit,

    /// Blank lines between output entries
    #[serde(default = "default_separator_blank_lines")]
    pub separator_blank_lines: usize,

    /// Prepend the decision-source header
    #[serde(default)]
    pub include_header: bool,

    /// Suffix added to the input stem for the default output path
    #[serde(default = "default_output_suffix")]
    pub output_suffix: String,
}

impl Default for SortingConfig {
    fn default() -> Self {
        Self {
            keep_same_topic: true,
            merge_on_same_topic: false,
            split_unit: SplitUnit::default(),
            separator_blank_lines: default_separator_blank_lines(),
            include_header: false,
            output_suffix: default_output_suffix(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(self) -> LevelFilter {
        match self {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

/// Largest accepted blank-line run between entries
pub const MAX_SEPARATOR_BLANK_LINES: usize = 10;

fn default_timeout_secs() -> u64 {
    120
}

fn default_retry_count() -> u32 {
    2
}

fn default_retry_backoff_ms() -> u64 {
    1000 // 1 second base backoff time, doubled on each retry
}

fn default_temperature() -> f32 {
    0.1
}

fn default_true() -> bool {
    true
}

fn default_separator_blank_lines() -> usize {
    DEFAULT_SEPARATOR_BLANK_LINES
}

fn default_output_suffix() -> String {
    "_shouldbe".to_string()
}

fn default_ollama_endpoint() -> String {
    "http://localhost:11434".to_string()
}

fn default_ollama_model() -> String {
    "qwen3:0.6b".to_string()
}

impl Config {
    /// Load the configuration at `path`, writing a default one first if it does not exist
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            return Self::load(path);
        }

        warn!("Config file not found at '{}', creating default config.", path.display());
        let config = Config::default();
        config.save(path)?;
        Ok(config)
    }

    /// Load the configuration at `path`
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).with_context(|| format!("Failed to open config file: {}", path.display()))?;
        let reader = BufReader::new(file);
        serde_json::from_reader(reader).with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Write the configuration to `path` as pretty JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let config_json = serde_json::to_string_pretty(self).context("Failed to serialize config to JSON")?;
        std::fs::write(path, config_json)
            .with_context(|| format!("Failed to write config to file: {}", path.display()))
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        if self.classifier.provider != ClassifierProvider::Disabled {
            let provider = self.classifier.get_active_provider_config().ok_or_else(|| {
                AppError::Config(format!(
                    "No entry for provider '{}' in available_providers",
                    self.classifier.provider
                ))
            })?;
            if self.classifier.get_model().trim().is_empty() {
                return Err(AppError::Config(format!(
                    "A model is required for the {} provider",
                    self.classifier.provider.display_name()
                ))
                .into());
            }
            if provider.timeout_secs == 0 {
                return Err(AppError::Config("Provider timeout must be greater than zero".to_string()).into());
            }
        }

        if self.sorting.separator_blank_lines > MAX_SEPARATOR_BLANK_LINES {
            return Err(AppError::Config(format!(
                "separator_blank_lines must be at most {}, got {}",
                MAX_SEPARATOR_BLANK_LINES, self.sorting.separator_blank_lines
            ))
            .into());
        }

        Ok(())
    }

    /// Record `model` as the last used model and as the active provider's model
    pub fn remember_model(&mut self, model: &str) {
        self.classifier.last_model = Some(model.to_string());
        if let Some(provider_config) = self.classifier.get_active_provider_config_mut() {
            provider_config.model = model.to_string();
        }
    }

    /// Pipeline settings derived from the sorting section
    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig::default()
            .with_split_unit(self.sorting.split_unit)
            .with_merge_on_same_topic(self.sorting.merge_on_same_topic)
            .with_keep_same_topic(self.sorting.keep_same_topic)
            .with_separator_blank_lines(self.sorting.separator_blank_lines)
            .with_header(self.sorting.include_header)
    }
}
