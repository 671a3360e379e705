// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{error, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::Write;
use std::process::ExitCode;

use langpack::app_config::{self, Config};
use langpack::Controller;

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

fn level_filter(level: &app_config::LogLevel) -> LevelFilter {
    match level {
        app_config::LogLevel::Error => LevelFilter::Error,
        app_config::LogLevel::Warn => LevelFilter::Warn,
        app_config::LogLevel::Info => LevelFilter::Info,
        app_config::LogLevel::Debug => LevelFilter::Debug,
        app_config::LogLevel::Trace => LevelFilter::Trace,
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Update all language packs (default command)
    Update(UpdateArgs),

    /// Generate shell completions for langpack
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser, Debug, Clone)]
struct UpdateArgs {
    /// Refresh subtitles that haven't been refreshed in this many days before building.
    /// Subtitles are not refreshed when omitted.
    #[arg(short, long, value_name = "NUM_DAYS")]
    days: Option<u32>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

/// langpack - language pack builder
///
/// Downloads the latest translations, updates language pack metadata,
/// compiles the catalogs and zips one pack per locale.
#[derive(Parser, Debug)]
#[command(name = "langpack")]
#[command(version)]
#[command(args_conflicts_with_subcommands = true)]
#[command(about = "Updates all language packs")]
#[command(long_about = "langpack downloads the latest translations from the translation service, merges
them with subtitle counts into per-locale metadata, compiles the message catalogs
and zips one language pack per locale for the configured software version.

EXAMPLES:
    langpack                          # Update language packs using conf.json
    langpack --days 30                # Refresh subtitles older than 30 days first
    langpack -c prod.json -l debug    # Use another config with debug logging
    langpack completions bash > langpack.bash

CONFIGURATION:
    Configuration is stored in conf.json by default. If the file doesn't exist,
    a default one is created; fill in crowdin.project_id and crowdin.project_key.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    update: UpdateArgs,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        log::set_boxed_logger(Box::new(CustomLogger { level: LevelFilter::Trace }))?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color for log level
    fn color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "1;31",
            Level::Warn => "1;33",
            Level::Info => "1;32",
            Level::Debug => "1;36",
            Level::Trace => "1;35",
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
            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "\x1B[{}m{} {:<5} {}\x1B[0m",
                Self::color_for_level(record.level()),
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

#[tokio::main]
async fn main() -> ExitCode {
    // Info until the config says otherwise
    if CustomLogger::init(LevelFilter::Info).is_err() {
        eprintln!("Failed to initialize logger");
    }

    let cli = CommandLineOptions::parse();

    let result = match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "langpack", &mut std::io::stdout());
            Ok(())
        }
        Some(Commands::Update(args)) => run_update(args).await,
        None => run_update(cli.update).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run_update(options: UpdateArgs) -> Result<()> {
    // If log level is set via command line, apply it immediately
    if let Some(cmd_log_level) = &options.log_level {
        log::set_max_level(level_filter(&cmd_log_level.clone().into()));
    }

    let mut config = Config::load_or_create(&options.config_path)?;
    if let Some(log_level) = &options.log_level {
        config.log_level = log_level.clone().into();
    } else {
        log::set_max_level(level_filter(&config.log_level));
    }

    config.validate().context("Configuration validation failed")?;

    let controller = Controller::with_config(config)?;
    controller.run(options.days).await?;

    Ok(())
}
