//! Whisper-backed speech recognizer

use crate::config::Config;
use crate::recognize::{RecognitionOutcome, SpeechRecognizer, Transcription};
use anyhow::{Context, Result};
use whisper_rs::{FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters};

/// Locale identifiers the engine recognizes, paired with the whisper
/// language code used for the attempt.
const LOCALE_LANGUAGES: &[(&str, &str)] = &[
    ("ar-SA", "ar"),
    ("ca-ES", "ca"),
    ("cs-CZ", "cs"),
    ("da-DK", "da"),
    ("de-DE", "de"),
    ("el-GR", "el"),
    ("en-GB", "en"),
    ("en-US", "en"),
    ("es-ES", "es"),
    ("es-MX", "es"),
    ("fi-FI", "fi"),
    ("fr-FR", "fr"),
    ("he-IL", "he"),
    ("hi-IN", "hi"),
    ("hu-HU", "hu"),
    ("id-ID", "id"),
    ("it-IT", "it"),
    ("ja-JP", "ja"),
    ("ko-KR", "ko"),
    ("nb-NO", "no"),
    ("nl-NL", "nl"),
    ("pl-PL", "pl"),
    ("pt-BR", "pt"),
    ("pt-PT", "pt"),
    ("ro-RO", "ro"),
    ("ru-RU", "ru"),
    ("sv-SE", "sv"),
    ("th-TH", "th"),
    ("tr-TR", "tr"),
    ("uk-UA", "uk"),
    ("vi-VN", "vi"),
    ("zh-CN", "zh"),
    ("zh-TW", "zh"),
];

/// Map a locale identifier to a whisper language code.
///
/// Exact identifiers come from the capability table; unknown regional
/// variants fall back to a primary-subtag match (e.g. "en-AU" → "en").
fn language_for(locale: &str) -> Option<&'static str> {
    if let Some((_, lang)) = LOCALE_LANGUAGES.iter().find(|(id, _)| *id == locale) {
        return Some(lang);
    }
    let primary = locale.split('-').next()?.to_ascii_lowercase();
    LOCALE_LANGUAGES
        .iter()
        .find(|(_, lang)| *lang == primary)
        .map(|(_, lang)| *lang)
}

/// Whisper-based recognizer over a locally downloaded ggml model.
pub struct WhisperRecognizer {
    ctx: WhisperContext,
}

impl WhisperRecognizer {
    /// Load the configured whisper model.
    pub fn new(config: &Config) -> Result<Self> {
        let model_path = config.whisper_model_path()?;

        if !model_path.exists() {
            anyhow::bail!(
                "Whisper model not found at {:?}. Run 'polyscribe setup' to download it.",
                model_path
            );
        }

        tracing::info!("Loading Whisper model from {:?}", model_path);

        let ctx = WhisperContext::new_with_params(
            model_path
                .to_str()
                .context("Model path is not valid UTF-8")?,
            WhisperContextParameters::default(),
        )
        .context("Failed to load Whisper model")?;

        Ok(Self { ctx })
    }

    /// Locale identifiers the engine can attempt, without loading a model.
    pub fn locale_catalog() -> Vec<String> {
        LOCALE_LANGUAGES.iter().map(|(id, _)| id.to_string()).collect()
    }
}

impl SpeechRecognizer for WhisperRecognizer {
    fn supported_locales(&self) -> Vec<String> {
        Self::locale_catalog()
    }

    async fn recognize(&mut self, audio: &[f32], locale: &str) -> Result<RecognitionOutcome> {
        let Some(language) = language_for(locale) else {
            tracing::debug!("Locale {} not recognizable by whisper", locale);
            return Ok(RecognitionOutcome::Unavailable);
        };

        let mut params = FullParams::new(SamplingStrategy::Greedy { best_of: 1 });
        params.set_n_threads(std::thread::available_parallelism()?.get() as i32);
        params.set_language(Some(language));
        params.set_translate(false);
        params.set_no_context(true);
        params.set_single_segment(false);
        params.set_print_special(false);
        params.set_print_progress(false);
        params.set_print_realtime(false);
        params.set_print_timestamps(false);
        params.set_suppress_blank(true);
        params.set_suppress_nst(true);

        // One inference pass per attempt, CPU-bound.
        let mut state = self.ctx.create_state()?;
        state.full(params, audio)?;

        let num_segments = state.full_n_segments()?;
        let mut text = String::new();
        let mut segment_confidences = Vec::with_capacity(num_segments as usize);

        for i in 0..num_segments {
            let segment = match state.full_get_segment_text(i) {
                Ok(s) => s,
                Err(e) => {
                    tracing::warn!("Skipping unreadable segment {}: {}", i, e);
                    continue;
                }
            };
            text.push_str(&segment);
            text.push(' ');

            // Segment confidence is the mean token probability.
            let num_tokens = state.full_n_tokens(i)?;
            let mut sum = 0.0f32;
            let mut counted = 0u32;
            for j in 0..num_tokens {
                if let Ok(token) = state.full_get_token_data(i, j) {
                    sum += token.p;
                    counted += 1;
                }
            }
            segment_confidences.push(if counted > 0 { sum / counted as f32 } else { 0.0 });
        }

        tracing::debug!(
            "Whisper attempt for {} ({}): {} segments",
            locale,
            language,
            segment_confidences.len()
        );

        Ok(RecognitionOutcome::Final(Transcription {
            text: text.trim().to_string(),
            segment_confidences,
        }))
    }
}
