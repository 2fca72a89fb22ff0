//! polyscribe CLI - audio file transcription with automatic language detection

use anyhow::Result;
use clap::{Parser, Subcommand};
use polyscribe_core::Config;

mod commands;

#[derive(Parser)]
#[command(name = "polyscribe")]
#[command(version)]
#[command(about = "Transcribe audio files, auto-detecting the spoken language", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Verbose output (show per-attempt scores and debug info)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Transcribe an audio file, trying each candidate locale in turn
    Transcribe {
        /// Path to audio file (WAV, 16kHz mono preferred)
        path: String,

        /// Comma-separated locale identifiers to try, overriding the
        /// configured preferred locales (e.g. "en-US,de-DE")
        #[arg(short, long)]
        locales: Option<String>,
    },

    /// List selectable locales and the current preferred set
    Locales,

    /// Download the Whisper model
    Setup {
        /// Whisper model size (tiny, base, small, medium)
        #[arg(long, default_value = "base")]
        whisper: String,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration
    Show,

    /// Add a locale to the preferred set
    AddLocale {
        /// Locale identifier (e.g. "fr-FR")
        locale: String,
    },

    /// Remove a locale from the preferred set
    RemoveLocale {
        /// Locale identifier
        locale: String,
    },

    /// Set the Whisper model size
    SetWhisper {
        /// Model size (tiny, base, small, medium)
        size: String,
    },

    /// Show config file path
    Path,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(log_level)
        .with_target(false)
        .init();

    // Load configuration
    let mut config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Transcribe { path, locales } => {
            commands::transcribe::run(&config, &path, locales.as_deref()).await
        }

        Commands::Locales => {
            commands::locales::list(&config)
        }

        Commands::Setup { whisper } => {
            commands::setup::run(&whisper).await
        }

        Commands::Config { action } => match action {
            ConfigAction::Show => {
                commands::config::show(&config)
            }
            ConfigAction::AddLocale { locale } => {
                commands::config::add_locale(&mut config, &locale)
            }
            ConfigAction::RemoveLocale { locale } => {
                commands::config::remove_locale(&mut config, &locale)
            }
            ConfigAction::SetWhisper { size } => {
                commands::config::set_whisper(&mut config, &size)
            }
            ConfigAction::Path => {
                commands::config::show_path()
            }
        },
    }
}
