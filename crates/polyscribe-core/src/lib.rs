//! polyscribe Core - transcribe recorded audio with automatic language detection
//!
//! This library provides the core functionality for:
//! - Managing candidate recognition locales (curated options, defaults,
//!   system-locale fallback)
//! - Speech-to-text via Whisper, one attempt per candidate locale
//! - Sequential auto-detection scored by mean segment confidence, with live
//!   progress snapshots for a UI layer

pub mod audio;
pub mod config;
pub mod detect;
pub mod locale;
pub mod recognize;

pub use config::{Config, WhisperModel};
pub use detect::{AutoDetector, DetectError, DetectionOutcome, RunPhase, SessionState};
pub use locale::CandidateLocale;
pub use recognize::{RecognitionOutcome, SpeechRecognizer, Transcription, WhisperRecognizer};

/// Transcribe prepared samples, auto-detecting the language.
///
/// This is the main entry point for the library. `audio` must be 16kHz mono
/// f32 PCM. Candidates come from the configured preferred locales, falling
/// back to the default preferred set and ultimately the system locale.
pub async fn detect_and_transcribe(
    audio: &[f32],
    config: &Config,
) -> anyhow::Result<DetectionOutcome> {
    let recognizer = WhisperRecognizer::new(config)?;
    let candidates = locale::resolve_candidates(&effective_preferred(config, &recognizer));
    let detector = AutoDetector::new(recognizer);
    Ok(detector.run(audio, &candidates).await?)
}

/// The preferred-locale list in effect: the user's configured list, or the
/// default preferred set derived from what the engine supports.
pub fn effective_preferred<R: SpeechRecognizer>(config: &Config, recognizer: &R) -> Vec<String> {
    if !config.preferred_locales.is_empty() {
        return config.preferred_locales.clone();
    }
    let supported = locale::supported_locales(recognizer);
    locale::default_preferred_set(&supported)
}
