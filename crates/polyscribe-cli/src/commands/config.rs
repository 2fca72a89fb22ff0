//! Config command - manage configuration

use anyhow::Result;
use console::{style, Term};
use polyscribe_core::config::WhisperModel;
use polyscribe_core::{locale, Config, WhisperRecognizer};

pub fn show(config: &Config) -> Result<()> {
    let term = Term::stdout();

    term.write_line(&format!("{}", style("polyscribe Configuration").bold()))?;
    term.write_line("")?;

    term.write_line(&format!(
        "Whisper model:    {}",
        style(format!("{:?}", config.whisper_model)).cyan()
    ))?;

    let model_path = config.whisper_model_path()?;
    let status = if model_path.exists() {
        style("downloaded").green()
    } else {
        style("not downloaded").red()
    };
    term.write_line(&format!("  Status:         {}", status))?;

    term.write_line("")?;
    if config.preferred_locales.is_empty() {
        term.write_line(&format!(
            "Preferred locales: {} (defaults apply)",
            style("none configured").dim()
        ))?;
    } else {
        term.write_line(&format!("{}", style("Preferred locales:").dim()))?;
        for identifier in &config.preferred_locales {
            term.write_line(&format!(
                "  - {} ({})",
                identifier,
                locale::display_name(identifier)
            ))?;
        }
    }

    Ok(())
}

pub fn add_locale(config: &mut Config, identifier: &str) -> Result<()> {
    let term = Term::stdout();

    if config.preferred_locales.iter().any(|id| id == identifier) {
        term.write_line(&format!(
            "{} '{}' already in preferred locales",
            style("ℹ").blue(),
            identifier
        ))?;
        return Ok(());
    }

    if !WhisperRecognizer::locale_catalog().contains(&identifier.to_string()) {
        term.write_line(&format!(
            "{} '{}' is not a recognizable locale; adding it anyway (it will be skipped during detection)",
            style("⚠").yellow(),
            identifier
        ))?;
    }

    config.preferred_locales.push(identifier.to_string());
    config.save(None)?;

    term.write_line(&format!(
        "{} Added {} ({}) to preferred locales",
        style("✓").green(),
        identifier,
        locale::display_name(identifier)
    ))?;

    Ok(())
}

pub fn remove_locale(config: &mut Config, identifier: &str) -> Result<()> {
    let term = Term::stdout();

    let before = config.preferred_locales.len();
    config.preferred_locales.retain(|id| id != identifier);

    if config.preferred_locales.len() == before {
        term.write_line(&format!(
            "{} '{}' is not in the preferred locales",
            style("ℹ").blue(),
            identifier
        ))?;
        return Ok(());
    }

    config.save(None)?;
    term.write_line(&format!(
        "{} Removed '{}' from preferred locales",
        style("✓").green(),
        identifier
    ))?;

    Ok(())
}

pub fn set_whisper(config: &mut Config, size: &str) -> Result<()> {
    let term = Term::stdout();

    let whisper_model = match size.to_lowercase().as_str() {
        "tiny" => WhisperModel::Tiny,
        "base" => WhisperModel::Base,
        "small" => WhisperModel::Small,
        "medium" => WhisperModel::Medium,
        _ => {
            term.write_line(&format!(
                "{} Unknown size '{}'. Available: tiny, base, small, medium",
                style("✗").red(),
                size
            ))?;
            return Ok(());
        }
    };

    config.whisper_model = whisper_model.clone();
    config.save(None)?;

    term.write_line(&format!(
        "{} Whisper model set to: {:?}",
        style("✓").green(),
        whisper_model
    ))?;

    // Check if model is downloaded
    let model_path = config.whisper_model_path()?;
    if !model_path.exists() {
        term.write_line(&format!(
            "{} Model not downloaded. Run: polyscribe setup --whisper {}",
            style("⚠").yellow(),
            size
        ))?;
    }

    Ok(())
}

pub fn show_path() -> Result<()> {
    let term = Term::stdout();
    let config_path = Config::default_config_path()?;

    term.write_line(&format!("Config file: {:?}", config_path))?;

    if config_path.exists() {
        term.write_line(&format!("{} File exists", style("✓").green()))?;
    } else {
        term.write_line(&format!(
            "{} File does not exist (using defaults)",
            style("ℹ").blue()
        ))?;
    }

    Ok(())
}
