//! Speech recognition engines and the recognizer contract

mod whisper;

pub use whisper::WhisperRecognizer;

use anyhow::Result;

/// A finished transcription for a single locale attempt.
#[derive(Debug, Clone, Default)]
pub struct Transcription {
    /// Full recognized text (possibly empty).
    pub text: String,
    /// Per-segment confidence values in [0.0, 1.0].
    pub segment_confidences: Vec<f32>,
}

impl Transcription {
    /// Arithmetic mean of the segment confidences.
    ///
    /// A transcription with zero segments scores 0.0 rather than NaN, so it
    /// still participates in best-attempt comparison.
    pub fn confidence(&self) -> f32 {
        if self.segment_confidences.is_empty() {
            return 0.0;
        }
        self.segment_confidences.iter().sum::<f32>() / self.segment_confidences.len() as f32
    }
}

/// Outcome of one per-locale recognition attempt.
#[derive(Debug, Clone)]
pub enum RecognitionOutcome {
    /// The engine cannot recognize this locale; skip it, not a fault.
    Unavailable,
    /// Final transcription with per-segment confidences.
    Final(Transcription),
}

/// Contract for a speech-to-text engine recognizing one locale at a time.
///
/// Engine faults propagate as `Err`; a locale the engine simply does not
/// speak is `Ok(Unavailable)`. The orchestrator treats both as "nothing to
/// contribute" and moves on to the next candidate.
#[allow(async_fn_in_trait)]
pub trait SpeechRecognizer {
    /// Locale identifiers this engine can recognize, in no particular order.
    fn supported_locales(&self) -> Vec<String>;

    /// Run a single recognition pass over `audio` (16kHz mono f32 PCM),
    /// assuming speech in the given locale.
    async fn recognize(&mut self, audio: &[f32], locale: &str) -> Result<RecognitionOutcome>;
}
