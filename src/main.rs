// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{anyhow, Context, Result};
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{error, info, warn, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use topicsort::app_config::{self, ClassifierProvider, Config};
use topicsort::app_controller::{Controller, SortJob};
use topicsort::segmentation::SplitUnit;

/// CLI Wrapper for ClassifierProvider to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliClassifierProvider {
    Ollama,
    None,
}

impl From<CliClassifierProvider> for ClassifierProvider {
    fn from(cli_provider: CliClassifierProvider) -> Self {
        match cli_provider {
            CliClassifierProvider::Ollama => ClassifierProvider::Ollama,
            CliClassifierProvider::None => ClassifierProvider::Disabled,
        }
    }
}

/// CLI Wrapper for SplitUnit to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliSplitUnit {
    Sentence,
    Line,
}

impl From<CliSplitUnit> for SplitUnit {
    fn from(cli_unit: CliSplitUnit) -> Self {
        match cli_unit {
            CliSplitUnit::Sentence => SplitUnit::Sentence,
            CliSplitUnit::Line => SplitUnit::Line,
        }
    }
}

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Sort a document by topic (default command)
    #[command(alias = "run")]
    Sort(SortArgs),

    /// List the models available on the Ollama server
    Models,

    /// Check the connection to the Ollama server
    Check,

    /// Generate shell completions for topicsort
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args, Debug, Default)]
struct SortArgs {
    /// Document to sort
    #[arg(value_name = "INPUT_FILE")]
    input_path: Option<PathBuf>,

    /// Output file (default: <stem>_shouldbe.<ext> next to the input)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Force overwrite of an existing output file
    #[arg(short, long)]
    force_overwrite: bool,

    /// Classifier provider to use
    #[arg(short, long, value_enum)]
    provider: Option<CliClassifierProvider>,

    /// Model name to use for classification
    #[arg(short, long)]
    model: Option<String>,

    /// Fold a segment into the previous entry when they share a topic
    #[arg(long, value_name = "BOOL", num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    merge_on_same_topic: Option<bool>,

    /// Treat sub-aspects of one story as the same topic
    #[arg(long, value_name = "BOOL", num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    keep_same_topic: Option<bool>,

    /// Unit space the split points address
    #[arg(long, value_enum)]
    split_unit: Option<CliSplitUnit>,

    /// Prepend a header naming the decision source and time
    #[arg(long)]
    header: bool,

    /// Blank lines between output segments
    #[arg(long, value_name = "COUNT")]
    separator_lines: Option<usize>,

    /// Decide each segment interactively instead of asking a model
    #[arg(long)]
    manual: bool,
}

/// topicsort - sort titled text segments by topic
///
/// Splits a document into "Title:..." segments, asks a local LLM (or you)
/// whether each segment holds several stories, and writes the re-segmented
/// document without losing any tag line.
#[derive(Parser, Debug)]
#[command(name = "topicsort")]
#[command(version)]
#[command(about = "Topic-aware document re-segmentation")]
#[command(args_conflicts_with_subcommands = true)]
#[command(long_about = "topicsort re-segments a document made of \"Title:...\" sections, splitting multi-story sections with the help of a local LLM while keeping every tag line (media references, URLs, timestamps, sources, comment tags, mentions).

EXAMPLES:
    topicsort news.txt                          # Sort using default config
    topicsort -f news.txt                       # Force overwrite existing output
    topicsort -m llama3.2:3b news.txt           # Use a specific model
    topicsort --manual news.txt                 # Decide every segment yourself
    topicsort --merge-on-same-topic news.txt    # Fold same-topic neighbours together
    topicsort models                            # List models on the Ollama server
    topicsort completions bash > topicsort.bash # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default one
    will be created automatically.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    sort: SortArgs,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json", global = true)]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum, global = true)]
    log_level: Option<CliLogLevel>,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(LevelFilter::Trace));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: Emoji for log level
    fn get_emoji_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "❌ ",
            Level::Warn => "🚧 ",
            Level::Info => " ",
            Level::Debug => "🔍 ",
            Level::Trace => "📋 ",
        }
    }

    // @returns: ANSI colour for log level
    fn get_color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1B[1;31m",
            Level::Warn => "\x1B[1;33m",
            Level::Info => "\x1B[1;32m",
            Level::Debug => "\x1B[1;36m",
            Level::Trace => "\x1B[1;35m",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let level = record.level();
            let _ = writeln!(
                std::io::stderr(),
                "{}{} {} {}\x1B[0m",
                Self::get_color_for_level(level),
                now,
                Self::get_emoji_for_level(level),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Info until the config has been read
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    if let Some(level) = &cli.log_level {
        let level: app_config::LogLevel = level.clone().into();
        log::set_max_level(level.to_level_filter());
    }

    match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "topicsort", &mut std::io::stdout());
            Ok(())
        }
        Some(Commands::Models) => run_models(&cli.config_path, cli.log_level).await,
        Some(Commands::Check) => run_check(&cli.config_path, cli.log_level).await,
        Some(Commands::Sort(args)) => run_sort(args, &cli.config_path, cli.log_level).await,
        None => run_sort(cli.sort, &cli.config_path, cli.log_level).await,
    }
}

/// Load the config and apply the log level from it unless the CLI set one
fn load_config(config_path: &str, cli_log_level: Option<CliLogLevel>) -> Result<Config> {
    let mut config = Config::load_or_create(config_path)?;

    match cli_log_level {
        Some(level) => config.log_level = level.into(),
        None => log::set_max_level(config.log_level.to_level_filter()),
    }

    Ok(config)
}

fn apply_overrides(config: &mut Config, args: &SortArgs) {
    if let Some(provider) = &args.provider {
        config.classifier.provider = provider.clone().into();
    }
    if let Some(model) = &args.model {
        let provider_str = config.classifier.provider.to_lowercase_string();
        if let Some(provider_config) = config
            .classifier
            .available_providers
            .iter_mut()
            .find(|p| p.provider_type == provider_str)
        {
            provider_config.model = model.clone();
        }
    }
    if let Some(merge) = args.merge_on_same_topic {
        config.sorting.merge_on_same_topic = merge;
    }
    if let Some(keep) = args.keep_same_topic {
        config.sorting.keep_same_topic = keep;
    }
    if let Some(unit) = &args.split_unit {
        config.sorting.split_unit = unit.clone().into();
    }
    if args.header {
        config.sorting.include_header = true;
    }
    if let Some(lines) = args.separator_lines {
        config.sorting.separator_blank_lines = lines;
    }
}

async fn run_sort(args: SortArgs, config_path: &str, cli_log_level: Option<CliLogLevel>) -> Result<()> {
    let input_path = args
        .input_path
        .clone()
        .ok_or_else(|| anyhow!("INPUT_FILE is required when no subcommand is specified"))?;

    let mut config = load_config(config_path, cli_log_level)?;
    apply_overrides(&mut config, &args);

    let controller = Controller::with_config(config)?;

    let cancel = Arc::new(AtomicBool::new(false));
    let decider = controller.build_decider(args.manual, cancel.clone())?;
    let job = SortJob {
        input_file: input_path,
        output_path: args.output.clone(),
        force_overwrite: args.force_overwrite,
        show_progress: !args.manual,
    };

    let report = tokio::select! {
        result = controller.run(&job, decider.as_ref(), Some(cancel.as_ref())) => result?,
        _ = tokio::signal::ctrl_c() => {
            cancel.store(true, Ordering::SeqCst);
            warn!("Interrupted; no output was written");
            return Err(anyhow!("Interrupted by user"));
        }
    };

    let Some(report) = report else {
        return Ok(());
    };

    let counters = report.outcome.counters;
    info!(
        "Segments: {} in, {} out, {} kept separate, {} merged, {} titles in output",
        counters.baseline_count,
        counters.final_count,
        counters.kept_separate_count,
        counters.merged_count,
        report.outcome.title_count
    );

    // Persist only the model, not the other one-off overrides
    if let Some(model) = &args.model {
        let remembered = Config::load(config_path).and_then(|mut stored| {
            stored.remember_model(model);
            stored.save(config_path)
        });
        if let Err(e) = remembered {
            error!("Failed to remember model '{}': {}", model, e);
        }
    }

    Ok(())
}

async fn run_models(config_path: &str, cli_log_level: Option<CliLogLevel>) -> Result<()> {
    let config = load_config(config_path, cli_log_level)?;
    let controller = Controller::with_config(config)?;

    let models = controller.list_models().await?;
    if models.is_empty() {
        warn!("No models installed on the Ollama server");
        return Ok(());
    }

    let mut stdout = std::io::stdout();
    for model in models {
        writeln!(stdout, "{}\t{:.1} GB", model.name, model.size as f64 / 1_000_000_000.0)
            .context("Failed to write model list")?;
    }
    Ok(())
}

async fn run_check(config_path: &str, cli_log_level: Option<CliLogLevel>) -> Result<()> {
    let config = load_config(config_path, cli_log_level)?;
    let controller = Controller::with_config(config)?;

    let version = controller.check_connection().await?;
    info!(
        "Ollama {} reachable at {}, model {}",
        version,
        controller.config().classifier.get_endpoint(),
        controller.config().classifier.get_model()
    );
    Ok(())
}
