//! Setup command - download the Whisper model

use anyhow::Result;
use console::{style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use polyscribe_core::config::WhisperModel;
use polyscribe_core::Config;
use std::process::Command;

pub async fn run(whisper: &str) -> Result<()> {
    let term = Term::stdout();

    term.write_line(&format!("{} polyscribe Setup", style("🚀").green()))?;
    term.write_line("")?;

    let models_dir = Config::models_dir()?;
    term.write_line(&format!("Models directory: {:?}", models_dir))?;
    term.write_line("")?;

    let whisper_model = match whisper.to_lowercase().as_str() {
        "tiny" => WhisperModel::Tiny,
        "base" => WhisperModel::Base,
        "small" => WhisperModel::Small,
        "medium" => WhisperModel::Medium,
        _ => {
            term.write_line(&format!(
                "{} Unknown whisper model '{}', using 'base'",
                style("⚠").yellow(),
                whisper
            ))?;
            WhisperModel::Base
        }
    };

    let whisper_path = models_dir.join(whisper_model.filename());
    if whisper_path.exists() {
        term.write_line(&format!(
            "{} Whisper {} already downloaded",
            style("✓").green(),
            whisper
        ))?;
    } else {
        term.write_line(&format!(
            "{} Downloading Whisper {}...",
            style("⬇").cyan(),
            whisper
        ))?;

        download_file(whisper_model.url(), &whisper_path)?;

        term.write_line(&format!(
            "{} Whisper {} downloaded",
            style("✓").green(),
            whisper
        ))?;
    }

    // Save config with the selected model
    let mut config = Config::load(None).unwrap_or_default();
    config.whisper_model = whisper_model;
    config.save(None)?;

    term.write_line("")?;
    term.write_line(&format!(
        "{} Setup complete! Run {} to transcribe a file.",
        style("✓").green(),
        style("polyscribe transcribe <file.wav>").cyan()
    ))?;

    Ok(())
}

fn download_file(url: &str, path: &std::path::Path) -> Result<()> {
    // Create progress bar
    let pb = ProgressBar::new(100);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})")?
            .progress_chars("#>-"),
    );

    // Use curl for download with progress
    let output = Command::new("curl")
        .args([
            "-L",
            "-o",
            path.to_str().unwrap_or_default(),
            "--progress-bar",
            url,
        ])
        .output()?;

    pb.finish();

    if !output.status.success() {
        anyhow::bail!(
            "Download failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
    }

    Ok(())
}
