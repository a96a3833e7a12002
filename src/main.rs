// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result, anyhow};
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, info, warn};
use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use srtwai::app_config::{Config, LogLevel, TranslationMode};
use srtwai::app_controller::Controller;

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => LogLevel::Error,
            CliLogLevel::Warn => LogLevel::Warn,
            CliLogLevel::Info => LogLevel::Info,
            CliLogLevel::Debug => LogLevel::Debug,
            CliLogLevel::Trace => LogLevel::Trace,
        }
    }
}

/// CLI Wrapper for TranslationMode to implement ValueEnum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliTranslationMode {
    Batch,
    Line,
}

impl From<CliTranslationMode> for TranslationMode {
    fn from(cli_mode: CliTranslationMode) -> Self {
        match cli_mode {
            CliTranslationMode::Batch => TranslationMode::Batch,
            CliTranslationMode::Line => TranslationMode::Line,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Translate subtitle files (default command)
    Translate(TranslateArgs),

    /// Generate shell completions for srtwai
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args, Debug, Clone)]
struct TranslateArgs {
    /// Input .srt file or directory to process
    #[arg(value_name = "INPUT_PATH")]
    input_path: Option<PathBuf>,

    /// Directory for translated files
    #[arg(short, long, default_value = "output")]
    output_dir: PathBuf,

    /// Force overwrite of existing output files
    #[arg(short, long)]
    force_overwrite: bool,

    /// Source language code (e.g., 'en', 'es', 'fr')
    #[arg(short, long)]
    source_language: Option<String>,

    /// Target language code (e.g., 'zh', 'es', 'fr')
    #[arg(short, long)]
    target_language: Option<String>,

    /// Model name to use for translation
    #[arg(short, long, env = "MODEL_NAME")]
    model: Option<String>,

    /// Base URL of the OpenAI-compatible API
    #[arg(long, env = "ENDPOINT")]
    endpoint: Option<String>,

    /// API key
    #[arg(long, env = "API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Maximum number of requests in flight
    #[arg(long, env = "MAX_WORKERS")]
    max_workers: Option<usize>,

    /// Sampling temperature
    #[arg(long, env = "TEMPERATURE")]
    temperature: Option<f32>,

    /// Lines per request in batch mode
    #[arg(long)]
    batch_size: Option<usize>,

    /// Send several lines per request or one line per request
    #[arg(long, value_enum)]
    mode: Option<CliTranslationMode>,

    /// Specialist domains of the content (e.g. --domains medicine finance)
    #[arg(long, num_args = 1..)]
    domains: Option<Vec<String>>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: PathBuf,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,

    /// Also append every log record to this file
    #[arg(long)]
    log_file: Option<PathBuf>,
}

/// SRTwAI - Subtitle translation with AI
///
/// Translates SRT subtitle files with an OpenAI-compatible chat model, sending
/// many context-aware requests in parallel.
#[derive(Parser, Debug)]
#[command(name = "srtwai")]
#[command(version)]
#[command(about = "AI-powered SRT subtitle translation tool")]
#[command(args_conflicts_with_subcommands = true)]
#[command(long_about = "SRTwAI translates SRT subtitle files using an OpenAI-compatible chat model.

EXAMPLES:
    srtwai movie.srt                            # Translate using default config
    srtwai -f movie.srt                         # Force overwrite existing files
    srtwai -t es -o subs/ movie.srt             # Translate into Spanish, write to subs/
    srtwai --mode line movie.srt                # One request per subtitle line
    srtwai --domains medicine biology talk.srt  # Hint specialist terminology
    srtwai --log-level debug /movies/           # Process entire directory with debug logging
    srtwai completions bash > srtwai.bash       # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default one
    will be created automatically. API_KEY, ENDPOINT, MODEL_NAME, MAX_WORKERS and
    TEMPERATURE environment variables override the file.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    translate: TranslateArgs,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
    file: Option<Mutex<File>>,
}

impl CustomLogger {
    // @initializes: Global logger, optionally mirrored to a file
    fn init(level: LevelFilter, log_file: Option<&Path>) -> Result<(), SetLoggerError> {
        let file = log_file.and_then(|path| {
            match OpenOptions::new().create(true).append(true).open(path) {
                Ok(file) => Some(Mutex::new(file)),
                Err(e) => {
                    eprintln!("Cannot open log file {}: {}", path.display(), e);
                    None
                }
            }
        });

        log::set_boxed_logger(Box::new(CustomLogger { level, file }))?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: Emoji and ANSI color for log level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("❌ ", "1;31"),
            Level::Warn => ("🚧 ", "1;33"),
            Level::Info => (" ", "1;32"),
            Level::Debug => ("🔍 ", "1;36"),
            Level::Trace => ("📋 ", "1;35"),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let now = chrono::Local::now();
        let (emoji, color) = Self::style_for_level(record.level());
        let _ = writeln!(
            std::io::stderr(),
            "\x1B[{}m{} {} {}\x1B[0m",
            color,
            now.format("%H:%M:%S.%3f"),
            emoji,
            record.args()
        );

        if let Some(file) = &self.file {
            let _ = writeln!(
                file.lock(),
                "{} [{}] {}",
                now.format("%Y-%m-%d %H:%M:%S%.3f"),
                record.level(),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
        if let Some(file) = &self.file {
            let _ = file.lock().flush();
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = CommandLineOptions::parse();

    match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "srtwai", &mut std::io::stdout());
            Ok(())
        }
        Some(Commands::Translate(args)) => run_translate(args).await,
        None => run_translate(cli.translate).await,
    }
}

/// Load the config file, or write a default one when it is missing
fn load_or_create_config(path: &Path) -> Result<Config> {
    if path.exists() {
        return Config::from_file(path);
    }

    warn!("Config file not found at '{}', creating default config.", path.display());
    let config = Config::default();
    config
        .save(path)
        .with_context(|| format!("Failed to write default config to file: {}", path.display()))?;
    Ok(config)
}

/// Apply command line and environment overrides on top of the file values
fn apply_overrides(config: &mut Config, options: &TranslateArgs) {
    if let Some(source_language) = &options.source_language {
        config.source_language = source_language.clone();
    }
    if let Some(target_language) = &options.target_language {
        config.target_language = target_language.clone();
    }
    if let Some(log_level) = options.log_level {
        config.log_level = log_level.into();
    }

    let translation = &mut config.translation;
    if let Some(model) = &options.model {
        translation.model = model.clone();
    }
    if let Some(endpoint) = &options.endpoint {
        translation.endpoint = endpoint.clone();
    }
    if let Some(api_key) = &options.api_key {
        translation.api_key = api_key.clone();
    }
    if let Some(max_workers) = options.max_workers {
        translation.max_workers = max_workers;
    }
    if let Some(temperature) = options.temperature {
        translation.temperature = temperature;
    }
    if let Some(batch_size) = options.batch_size {
        translation.batch_size = batch_size;
    }
    if let Some(mode) = options.mode {
        translation.mode = mode.into();
    }
    if let Some(domains) = &options.domains {
        translation.domains = domains.clone();
    }
}

async fn run_translate(options: TranslateArgs) -> Result<()> {
    // Logger starts at the CLI level (or info) and follows the config once loaded
    let initial_level = options
        .log_level
        .map(|level| LogLevel::from(level).to_level_filter())
        .unwrap_or(LevelFilter::Info);
    CustomLogger::init(initial_level, options.log_file.as_deref())?;

    let input_path = options
        .input_path
        .clone()
        .ok_or_else(|| anyhow!("INPUT_PATH is required"))?;
    if !input_path.exists() {
        return Err(anyhow!("Input path does not exist: {:?}", input_path));
    }

    let mut config = load_or_create_config(&options.config_path)?;
    apply_overrides(&mut config, &options);
    log::set_max_level(config.log_level.to_level_filter());

    info!(
        "Translating {} from {} to {} with {} ({} mode, {} workers)",
        input_path.display(),
        config.source_language,
        config.target_language,
        config.translation.model,
        config.translation.mode,
        config.translation.max_workers
    );

    // Validation happens here, before any request is sent
    let controller = Controller::with_config(config)?;
    controller
        .run(input_path, options.output_dir.clone(), options.force_overwrite)
        .await
}
