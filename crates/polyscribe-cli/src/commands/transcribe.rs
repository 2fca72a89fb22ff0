//! Transcribe command - auto-detect the language of an audio file

use anyhow::{Context, Result};
use console::{style, Term};
use hound::WavReader;
use indicatif::{ProgressBar, ProgressStyle};
use polyscribe_core::audio::{resample_to_16khz, stereo_to_mono};
use polyscribe_core::{locale, AutoDetector, Config, DetectError, WhisperRecognizer};
use std::path::Path;
use std::sync::Arc;

pub async fn run(config: &Config, path: &str, locales: Option<&str>) -> Result<()> {
    let term = Term::stdout();
    let file_path = Path::new(path);

    if !file_path.exists() {
        anyhow::bail!("File not found: {}", path);
    }

    term.write_line(&format!(
        "{} Loading audio file: {}",
        style("📁").cyan(),
        path
    ))?;

    // Read WAV file
    let reader = WavReader::open(file_path)
        .with_context(|| format!("Failed to open WAV file: {}", path))?;

    let spec = reader.spec();
    let sample_rate = spec.sample_rate;

    term.write_line(&format!(
        "  Sample rate: {} Hz, Channels: {}, Bits: {}",
        sample_rate, spec.channels, spec.bits_per_sample
    ))?;

    // Read samples
    let samples: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .into_samples::<f32>()
            .filter_map(Result::ok)
            .collect(),
        hound::SampleFormat::Int => {
            let max_val = (1 << (spec.bits_per_sample - 1)) as f32;
            reader
                .into_samples::<i32>()
                .filter_map(Result::ok)
                .map(|s| s as f32 / max_val)
                .collect()
        }
    };

    // Convert to mono if stereo
    let samples = if spec.channels == 2 {
        stereo_to_mono(&samples)
    } else {
        samples
    };

    // Resample if needed
    let samples = resample_to_16khz(&samples, sample_rate)?;

    let duration_secs = samples.len() as f32 / 16000.0;
    term.write_line(&format!(
        "  Duration: {:.1}s ({} samples at 16kHz)",
        duration_secs,
        samples.len()
    ))?;

    // Resolve the candidate list: explicit flag beats the configured set;
    // an empty result falls back to the system locale.
    let recognizer = WhisperRecognizer::new(config)?;
    let preferred: Vec<String> = match locales {
        Some(csv) => csv
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        None => polyscribe_core::effective_preferred(config, &recognizer),
    };
    let candidates = locale::resolve_candidates(&preferred);

    let candidate_list: Vec<&str> = candidates.iter().map(|c| c.identifier.as_str()).collect();
    term.write_line(&format!(
        "{} Candidates: {}",
        style("🌐").cyan(),
        candidate_list.join(", ")
    ))?;

    // Live progress from the detector's session snapshots
    let detector = Arc::new(AutoDetector::new(recognizer));
    let mut session_rx = detector.subscribe();

    let pb = ProgressBar::new(100);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {percent}% {msg}")?
            .progress_chars("#>-"),
    );

    let watcher_pb = pb.clone();
    let watcher = tokio::spawn(async move {
        while session_rx.changed().await.is_ok() {
            let snapshot = session_rx.borrow_and_update().clone();
            watcher_pb.set_position((snapshot.progress * 100.0).round() as u64);
            watcher_pb.set_message(snapshot.status);
        }
    });

    let result = detector.run(&samples, &candidates).await;

    // Dropping the detector closes the watch channel and ends the watcher
    drop(detector);
    let _ = watcher.await;
    pb.finish_and_clear();

    match result {
        Ok(outcome) => {
            term.write_line("")?;
            term.write_line(&format!(
                "{} Detected language: {} ({})",
                style("✓").green(),
                style(&outcome.locale.display_name).cyan(),
                outcome.locale.identifier
            ))?;
            term.write_line(&format!(
                "  Confidence: {:.1}%",
                outcome.score * 100.0
            ))?;
            term.write_line("")?;
            term.write_line(&format!("{}", style("Transcript:").bold()))?;
            term.write_line(&outcome.text)?;
            Ok(())
        }
        Err(e @ DetectError::NoMatch) => {
            term.write_line("")?;
            term.write_line(&format!("{} {}", style("✗").red(), e))?;
            Err(e.into())
        }
        Err(e) => Err(e.into()),
    }
}
