// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result, anyhow};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, warn};
use std::fs::File;
use std::io::BufReader;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::app_config::{Config, SynthesisEngine, TranscriptionEngine};
use app_controller::Controller;

mod app_config;
mod app_controller;
mod audio;
mod chapter_source;
mod errors;
mod export;
mod file_utils;
mod pipeline;
mod providers;

/// CLI Wrapper for SynthesisEngine to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliSynthesisEngine {
    Piper,
    OpenAI,
}

impl From<CliSynthesisEngine> for SynthesisEngine {
    fn from(cli_engine: CliSynthesisEngine) -> Self {
        match cli_engine {
            CliSynthesisEngine::Piper => SynthesisEngine::Piper,
            CliSynthesisEngine::OpenAI => SynthesisEngine::OpenAI,
        }
    }
}

/// CLI Wrapper for TranscriptionEngine to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliTranscriptionEngine {
    WhisperCli,
    OpenAI,
}

impl From<CliTranscriptionEngine> for TranscriptionEngine {
    fn from(cli_engine: CliTranscriptionEngine) -> Self {
        match cli_engine {
            CliTranscriptionEngine::WhisperCli => TranscriptionEngine::WhisperCli,
            CliTranscriptionEngine::OpenAI => TranscriptionEngine::OpenAI,
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
    /// Narrate chapter batches into chaptered audiobooks (default command)
    #[command(alias = "run")]
    Narrate(NarrateArgs),

    /// Generate shell completions for bookvox
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser, Debug)]
struct NarrateArgs {
    /// Input chapter batch file or directory to process
    #[arg(value_name = "INPUT_PATH")]
    input_path: PathBuf,

    /// Force overwrite of existing audiobook files
    #[arg(short, long)]
    force_overwrite: bool,

    /// Output directory for audiobooks (defaults to the input's directory)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Synthesis engine to use
    #[arg(short, long, value_enum)]
    engine: Option<CliSynthesisEngine>,

    /// Transcription engine to use for verification
    #[arg(short, long, value_enum)]
    transcriber: Option<CliTranscriptionEngine>,

    /// Model name or model file path for the synthesis engine
    #[arg(short, long)]
    model: Option<String>,

    /// Voice or speaker identifier for the synthesis engine
    #[arg(long)]
    voice: Option<String>,

    /// Narration language code (e.g., 'en', 'es', 'fr')
    #[arg(long)]
    language: Option<String>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,

    /// Only segment the input and report chunk counts, without synthesis
    #[arg(short, long)]
    plan: bool,
}

/// bookvox - chapterized audiobook synthesis with verification
///
/// Narrates extracted chapter batches into audiobook files using a neural
/// TTS engine, transcribing every synthesized chunk back to text to verify
/// quality before accepting it.
#[derive(Parser, Debug)]
#[command(name = "bookvox")]
#[command(version = "1.0.0")]
#[command(about = "Verified text-to-speech audiobook narration")]
#[command(long_about = "bookvox narrates chapter batch files into chaptered m4b audiobooks.
Every synthesized chunk is transcribed back to text and compared against the
source; chunks below the similarity threshold are retried before falling back
to the best available audio.

EXAMPLES:
    bookvox book.json                         # Narrate using default config
    bookvox -f book.json                      # Force overwrite existing audiobook
    bookvox -e piper -m voice.onnx book.json  # Use a specific engine and model
    bookvox --language es book.json           # Narrate Spanish text
    bookvox -p book.json                      # Segmentation plan only, no synthesis
    bookvox --log-level debug /batches/       # Process a directory with debug logging
    bookvox completions bash > bookvox.bash   # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a
    different config file with --config-path. If the config file doesn't
    exist, a default one will be created automatically.

SUPPORTED ENGINES:
    synthesis:     piper (local process), openai (hosted speech API)
    transcription: whisper-cli (local whisper.cpp), openai (hosted API)")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Input chapter batch file or directory to process
    #[arg(value_name = "INPUT_PATH")]
    input_path: Option<PathBuf>,

    /// Force overwrite of existing audiobook files
    #[arg(short, long)]
    force_overwrite: bool,

    /// Output directory for audiobooks (defaults to the input's directory)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Synthesis engine to use
    #[arg(short, long, value_enum)]
    engine: Option<CliSynthesisEngine>,

    /// Transcription engine to use for verification
    #[arg(short, long, value_enum)]
    transcriber: Option<CliTranscriptionEngine>,

    /// Model name or model file path for the synthesis engine
    #[arg(short, long)]
    model: Option<String>,

    /// Voice or speaker identifier for the synthesis engine
    #[arg(long)]
    voice: Option<String>,

    /// Narration language code (e.g., 'en', 'es', 'fr')
    #[arg(long)]
    language: Option<String>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,

    /// Only segment the input and report chunk counts, without synthesis
    #[arg(short, long)]
    plan: bool,
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
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color code for log level
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
            let now = chrono::Local::now().format("%H:%M:%S%.3f");
            let color = Self::get_color_for_level(record.level());

            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "{}{} {:5} {}\x1B[0m",
                color,
                now,
                record.level(),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

fn level_filter_for(config_level: &app_config::LogLevel) -> LevelFilter {
    match config_level {
        app_config::LogLevel::Error => LevelFilter::Error,
        app_config::LogLevel::Warn => LevelFilter::Warn,
        app_config::LogLevel::Info => LevelFilter::Info,
        app_config::LogLevel::Debug => LevelFilter::Debug,
        app_config::LogLevel::Trace => LevelFilter::Trace,
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize the logger once with info level by default
    // We'll update the level after loading the config if needed
    CustomLogger::init(LevelFilter::Info)?;

    // Parse command line arguments using clap
    let cli = CommandLineOptions::parse();

    // Handle subcommands
    match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "bookvox", &mut std::io::stdout());
            Ok(())
        }
        Some(Commands::Narrate(args)) => run_narrate(args).await,
        None => {
            // Default behavior - use top-level args for backwards compatibility
            let input_path = cli
                .input_path
                .ok_or_else(|| anyhow!("INPUT_PATH is required when no subcommand is specified"))?;

            let narrate_args = NarrateArgs {
                input_path,
                force_overwrite: cli.force_overwrite,
                output_dir: cli.output_dir,
                engine: cli.engine,
                transcriber: cli.transcriber,
                model: cli.model,
                voice: cli.voice,
                language: cli.language,
                config_path: cli.config_path,
                log_level: cli.log_level,
                plan: cli.plan,
            };
            run_narrate(narrate_args).await
        }
    }
}

async fn run_narrate(options: NarrateArgs) -> Result<()> {
    // If log level is set via command line, apply it immediately
    if let Some(cmd_log_level) = &options.log_level {
        let config_log_level: app_config::LogLevel = cmd_log_level.clone().into();
        log::set_max_level(level_filter_for(&config_log_level));
    }

    // Load or create configuration
    let config_path = &options.config_path;
    let config = if Path::new(config_path).exists() {
        // Load existing configuration
        let file = File::open(config_path)
            .context(format!("Failed to open config file: {}", config_path))?;

        let reader = BufReader::new(file);
        let mut config: Config = serde_json::from_reader(reader)
            .context(format!("Failed to parse config file: {}", config_path))?;

        // Override config with CLI options if provided
        if let Some(engine) = &options.engine {
            config.synthesis.engine = engine.clone().into();
        }

        if let Some(transcriber) = &options.transcriber {
            config.transcription.engine = transcriber.clone().into();
        }

        if let Some(model) = &options.model {
            // Find the active engine config and update the model
            let engine_str = config.synthesis.engine.to_lowercase_string();
            if let Some(engine_config) = config
                .synthesis
                .available_engines
                .iter_mut()
                .find(|e| e.engine_type == engine_str)
            {
                engine_config.model = model.clone();
            }
        }

        if let Some(voice) = &options.voice {
            let engine_str = config.synthesis.engine.to_lowercase_string();
            if let Some(engine_config) = config
                .synthesis
                .available_engines
                .iter_mut()
                .find(|e| e.engine_type == engine_str)
            {
                engine_config.voice = voice.clone();
            }
        }

        if let Some(language) = &options.language {
            config.language = language.clone();
        }

        // Update log level in config if specified via command line
        if let Some(log_level) = &options.log_level {
            config.log_level = log_level.clone().into();
        }

        config
    } else {
        // Create default configuration if not exists
        warn!(
            "Config file not found at '{}', creating default config.",
            config_path
        );

        let mut config = Config::default();

        // Apply command line log level to default config if specified
        if let Some(log_level) = &options.log_level {
            config.log_level = log_level.clone().into();
        }

        // Save default config
        let config_json = serde_json::to_string_pretty(&config)
            .context("Failed to serialize default config to JSON")?;

        std::fs::write(config_path, config_json)
            .context(format!("Failed to write default config to file: {}", config_path))?;

        config
    };

    // Validate the configuration after loading and overriding
    config.validate().context("Configuration validation failed")?;

    // If log level was not set via command line, update it from config now
    if options.log_level.is_none() {
        log::set_max_level(level_filter_for(&config.log_level));
    }

    // Create controller
    let controller = Controller::with_config(config)?;

    // Segmentation plan only: no synthesis, no export
    if options.plan {
        if !options.input_path.is_file() {
            return Err(anyhow!(
                "--plan requires a chapter batch file, got: {:?}",
                options.input_path
            ));
        }
        return controller.plan(&options.input_path);
    }

    // Run the controller with the input file(s) and output directory
    if options.input_path.is_file() {
        // Process a single batch file
        let output_dir = options.output_dir.unwrap_or_else(|| {
            options
                .input_path
                .parent()
                .unwrap_or(Path::new("."))
                .to_path_buf()
        });
        controller
            .run(options.input_path.clone(), output_dir, options.force_overwrite)
            .await?;
    } else if options.input_path.is_dir() {
        // Process a directory of batch files
        controller
            .run_folder(
                options.input_path.clone(),
                options.output_dir,
                options.force_overwrite,
            )
            .await?;
    } else {
        return Err(anyhow!("Input path does not exist: {:?}", options.input_path));
    }

    Ok(())
}
