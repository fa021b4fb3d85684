use anyhow::{anyhow, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::{Duration, Instant};

use crate::app_config::{ClassifierProvider, Config};
use crate::classification::{FixedDecider, ManualDecider, SegmentDecider, TopicClassifier};
use crate::file_utils::FileManager;
use crate::pipeline::{PipelineOutcome, SortingPipeline};
use crate::providers::Provider;
use crate::providers::ollama::{ModelInfo, Ollama};

// @module: Application controller for document sorting

/// One sorting job
#[derive(Debug, Clone)]
pub struct SortJob {
    /// Document to sort
    pub input_file: PathBuf,
    /// Explicit output path; defaults to the suffixed input name
    pub output_path: Option<PathBuf>,
    /// Replace an existing output file
    pub force_overwrite: bool,
    /// Draw a progress bar on stderr
    pub show_progress: bool,
}

impl SortJob {
    pub fn new(input_file: impl Into<PathBuf>) -> Self {
        Self {
            input_file: input_file.into(),
            output_path: None,
            force_overwrite: false,
            show_progress: false,
        }
    }
}

/// What a completed job produced
#[derive(Debug, Clone)]
pub struct SortReport {
    /// File the sorted document was written to
    pub output_path: PathBuf,
    /// Pipeline result
    pub outcome: PipelineOutcome,
    /// Wall time of the run
    pub elapsed: Duration,
}

/// Main application controller for document sorting
pub struct Controller {
    // @field: App configuration
    config: Config,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate().context("Configuration validation failed")?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Ollama client for the active provider entry
    fn ollama_client(&self) -> Result<Ollama> {
        let provider = self.config.classifier.active_provider_or_default();
        Ollama::new(&provider.endpoint, provider.timeout_secs, provider.temperature)
    }

    /// Build the decision source for a run.
    ///
    /// `manual` wins over the configured provider; with no provider configured
    /// every segment is kept as-is.
    pub fn build_decider(&self, manual: bool, cancel: Arc<AtomicBool>) -> Result<Box<dyn SegmentDecider>> {
        if manual {
            info!("Manual decisions: answer s (same), d (different) or q (quit) for each segment");
            let decider = ManualDecider::stdio(cancel).context("Failed to start reading answers from stdin")?;
            return Ok(Box::new(decider));
        }

        match self.config.classifier.provider {
            ClassifierProvider::Disabled => {
                info!("No classifier configured; segments are kept as they are");
                Ok(Box::new(FixedDecider))
            }
            ClassifierProvider::Ollama => {
                let provider = self.config.classifier.active_provider_or_default();
                let client = self.ollama_client()?;
                let classifier = TopicClassifier::new(Arc::new(client), provider.model)
                    .with_timeout(Duration::from_secs(provider.timeout_secs))
                    .with_retries(provider.retry_count, provider.retry_backoff_ms);
                Ok(Box::new(classifier))
            }
        }
    }

    /// Sort one document and write the result.
    ///
    /// Returns `None` when the output already exists and overwriting was not
    /// requested. Nothing is written unless the whole document was processed.
    pub async fn run(
        &self,
        job: &SortJob,
        decider: &dyn SegmentDecider,
        cancel: Option<&AtomicBool>,
    ) -> Result<Option<SortReport>> {
        let start_time = Instant::now();

        if !FileManager::file_exists(&job.input_file) {
            return Err(anyhow!("Input file does not exist: {:?}", job.input_file));
        }

        let output_path = job
            .output_path
            .clone()
            .unwrap_or_else(|| FileManager::generate_output_path(&job.input_file, &self.config.sorting.output_suffix));
        if output_path.exists() && !job.force_overwrite {
            warn!("Skipping file, output already exists: {:?} (use -f to force overwrite)", output_path);
            return Ok(None);
        }

        let document = FileManager::read_to_string(&job.input_file)?;

        info!("🚀 topicsort: {} ({})", decider.source_name(), job.input_file.display());

        let progress_bar = if job.show_progress {
            let bar = ProgressBar::new(0);
            let style = ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} segments ({percent}%) {msg}")
                .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
                .unwrap_or_else(|_| ProgressStyle::default_bar());
            bar.set_style(style.progress_chars("█▓▒░"));
            bar.set_message("Sorting");
            bar
        } else {
            ProgressBar::hidden()
        };

        let pipeline = SortingPipeline::new(self.config.pipeline_config());
        let pb = progress_bar.clone();
        let result = pipeline
            .run_with_progress(&document, decider, cancel, move |done, total| {
                pb.set_length(total as u64);
                pb.set_position(done as u64);
            })
            .await;
        progress_bar.finish_and_clear();

        let outcome = result.with_context(|| format!("Failed to sort {:?}", job.input_file))?;

        FileManager::write_atomic(&output_path, &outcome.document)?;

        let elapsed = start_time.elapsed();
        info!("Success: {:?} written in {}", output_path, Self::format_duration(elapsed));

        Ok(Some(SortReport {
            output_path,
            outcome,
            elapsed,
        }))
    }

    /// Models available on the configured Ollama server
    pub async fn list_models(&self) -> Result<Vec<ModelInfo>> {
        let client = self.ollama_client()?;
        client
            .list_models()
            .await
            .with_context(|| format!("Failed to list models from {}", client.base_url()))
    }

    /// Check that the configured Ollama server answers; returns its version
    pub async fn check_connection(&self) -> Result<String> {
        let client = self.ollama_client()?;
        client
            .test_connection()
            .await
            .with_context(|| format!("Cannot reach Ollama at {}", client.base_url()))?;
        client.version().await.context("Failed to read Ollama version")
    }

    pub fn format_duration(duration: Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }
}
