//! Auto-detect transcription orchestrator
//!
//! Tries each candidate locale once, in order, scores every attempt by mean
//! segment confidence, and keeps the highest-scoring transcript. Exactly one
//! run may be in flight at a time; live state is published as read-only
//! snapshots over a watch channel.

use crate::locale::CandidateLocale;
use crate::recognize::{RecognitionOutcome, SpeechRecognizer};
use tokio::sync::{watch, Mutex};

/// Confidence sentinel below any valid score; the first usable attempt
/// always replaces it.
const SCORE_SENTINEL: f32 = -1.0;

/// Fraction of the progress bar reserved for finalization. Attempts never
/// push progress past this, regardless of candidate count.
const ATTEMPT_PROGRESS_CAP: f32 = 0.9;

/// Coarse lifecycle of a detection run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunPhase {
    #[default]
    Idle,
    Detecting,
    Done,
    Failed,
}

/// Live state of the current (or last) detection run.
///
/// Owned and written exclusively by [`AutoDetector`]; observers read
/// snapshots via [`AutoDetector::subscribe`]. Text, detected locale and best
/// score always change together.
#[derive(Debug, Clone)]
pub struct SessionState {
    pub phase: RunPhase,
    /// Best transcript so far; final transcript once the run succeeds.
    pub text: String,
    /// Highest confidence observed so far, `-1.0` before any usable attempt.
    pub best_score: f32,
    /// Locale of the current best transcript.
    pub detected_locale: Option<String>,
    /// Overall progress in [0.0, 1.0]. Forced to 1.0 at run completion,
    /// successful or not.
    pub progress: f32,
    /// Human-readable status line.
    pub status: String,
    /// Overall-failure message, set only when a completed run found nothing.
    pub error: Option<String>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            phase: RunPhase::Idle,
            text: String::new(),
            best_score: SCORE_SENTINEL,
            detected_locale: None,
            progress: 0.0,
            status: "idle".to_string(),
            error: None,
        }
    }
}

/// Final result of a successful detection run.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionOutcome {
    pub text: String,
    pub locale: CandidateLocale,
    pub score: f32,
}

#[derive(Debug, thiserror::Error)]
pub enum DetectError {
    /// A second run was requested while one is in flight. The request is a
    /// no-op; the in-flight run is unaffected.
    #[error("a detection run is already in progress")]
    RunInProgress,

    #[error("no recognizable language or content found")]
    NoMatch,
}

/// Sequential multi-locale detection over a single recognition engine.
pub struct AutoDetector<R: SpeechRecognizer> {
    // The engine is a scarce resource; the lock doubles as the
    // single-in-flight-run guard.
    recognizer: Mutex<R>,
    session: watch::Sender<SessionState>,
}

impl<R: SpeechRecognizer> AutoDetector<R> {
    pub fn new(recognizer: R) -> Self {
        let (session, _) = watch::channel(SessionState::default());
        Self {
            recognizer: Mutex::new(recognizer),
            session,
        }
    }

    /// Subscribe to live session snapshots.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.session.subscribe()
    }

    /// Current session snapshot.
    pub fn session(&self) -> SessionState {
        self.session.borrow().clone()
    }

    /// Attempt every candidate once, in the given order, and keep the
    /// highest-scoring transcript. Ties keep the earliest candidate, so
    /// caller order is significant.
    ///
    /// `audio` must be 16kHz mono f32 PCM, already validated as readable by
    /// the caller. Rejected outright with [`DetectError::RunInProgress`] if
    /// another run is active.
    pub async fn run(
        &self,
        audio: &[f32],
        candidates: &[CandidateLocale],
    ) -> Result<DetectionOutcome, DetectError> {
        let mut recognizer = self
            .recognizer
            .try_lock()
            .map_err(|_| DetectError::RunInProgress)?;

        let total = candidates.len();
        tracing::info!("Starting language detection over {} candidate(s)", total);

        self.session.send_replace(SessionState {
            phase: RunPhase::Detecting,
            status: "detecting language".to_string(),
            ..SessionState::default()
        });

        let mut best_score = SCORE_SENTINEL;
        let mut best_text = String::new();
        let mut best_locale: Option<CandidateLocale> = None;

        for (i, candidate) in candidates.iter().enumerate() {
            self.session.send_modify(|s| {
                s.status = format!(
                    "Trying {} ({} of {})",
                    candidate.display_name,
                    i + 1,
                    total
                );
            });

            // Attempts are strictly sequential: the next one starts only
            // once this outcome is known.
            match recognizer.recognize(audio, &candidate.identifier).await {
                Ok(RecognitionOutcome::Final(transcription)) => {
                    let score = transcription.confidence();
                    tracing::debug!(
                        "Attempt {}: {} scored {:.3}",
                        i + 1,
                        candidate.identifier,
                        score
                    );
                    // Strict greater-than: equal scores keep the earlier
                    // candidate's transcript.
                    if score > best_score {
                        best_score = score;
                        best_text = transcription.text;
                        best_locale = Some(candidate.clone());
                        let locale = candidate.identifier.clone();
                        self.session.send_modify(|s| {
                            s.text = best_text.clone();
                            s.best_score = best_score;
                            s.detected_locale = Some(locale);
                        });
                    }
                }
                Ok(RecognitionOutcome::Unavailable) => {
                    tracing::debug!(
                        "Attempt {}: {} unavailable, skipping",
                        i + 1,
                        candidate.identifier
                    );
                }
                Err(e) => {
                    // Per-candidate failures are not surfaced individually.
                    tracing::warn!(
                        "Attempt {}: {} failed: {}",
                        i + 1,
                        candidate.identifier,
                        e
                    );
                }
            }

            let progress = ((i + 1) as f32 / total as f32).min(ATTEMPT_PROGRESS_CAP);
            self.session.send_modify(|s| s.progress = progress);
        }

        match best_locale {
            Some(locale) if best_score >= 0.0 && !best_text.is_empty() => {
                tracing::info!(
                    "Detected {} with confidence {:.3}",
                    locale.identifier,
                    best_score
                );
                self.session.send_modify(|s| {
                    s.phase = RunPhase::Done;
                    s.status = "done".to_string();
                    s.progress = 1.0;
                });
                Ok(DetectionOutcome {
                    text: best_text,
                    locale,
                    score: best_score,
                })
            }
            _ => {
                let error = DetectError::NoMatch;
                tracing::info!("Detection run found no usable transcript");
                // Work is complete even though unsuccessful: progress still
                // reaches 1.0, and no partial transcript is published.
                self.session.send_modify(|s| {
                    s.phase = RunPhase::Failed;
                    s.status = "failed".to_string();
                    s.progress = 1.0;
                    s.text = String::new();
                    s.best_score = SCORE_SENTINEL;
                    s.detected_locale = None;
                    s.error = Some(error.to_string());
                });
                Err(error)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recognize::Transcription;
    use anyhow::Result;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex as StdMutex};
    use tokio::sync::Semaphore;

    fn candidate(id: &str) -> CandidateLocale {
        CandidateLocale {
            identifier: id.to_string(),
            display_name: id.to_string(),
        }
    }

    fn candidates(ids: &[&str]) -> Vec<CandidateLocale> {
        ids.iter().map(|id| candidate(id)).collect()
    }

    /// Per-locale scripted behavior for the fake engine.
    #[derive(Clone)]
    enum Scripted {
        Unavailable,
        Fail,
        Final { text: &'static str, confidences: Vec<f32> },
    }

    /// Deterministic recognizer driven by a locale → outcome script.
    ///
    /// Records the locale order of attempts and, when wired up with a
    /// session receiver, the progress value visible when each attempt
    /// begins.
    struct ScriptedRecognizer {
        script: HashMap<String, Scripted>,
        calls: Arc<StdMutex<Vec<String>>>,
        progress_at_call: Arc<StdMutex<Vec<f32>>>,
        session_rx: Arc<StdMutex<Option<watch::Receiver<SessionState>>>>,
    }

    impl ScriptedRecognizer {
        fn new(script: &[(&str, Scripted)]) -> Self {
            Self {
                script: script
                    .iter()
                    .map(|(id, s)| (id.to_string(), s.clone()))
                    .collect(),
                calls: Arc::new(StdMutex::new(Vec::new())),
                progress_at_call: Arc::new(StdMutex::new(Vec::new())),
                session_rx: Arc::new(StdMutex::new(None)),
            }
        }
    }

    impl SpeechRecognizer for ScriptedRecognizer {
        fn supported_locales(&self) -> Vec<String> {
            self.script.keys().cloned().collect()
        }

        async fn recognize(&mut self, _audio: &[f32], locale: &str) -> Result<RecognitionOutcome> {
            self.calls.lock().unwrap().push(locale.to_string());
            if let Some(rx) = self.session_rx.lock().unwrap().as_ref() {
                self.progress_at_call
                    .lock()
                    .unwrap()
                    .push(rx.borrow().progress);
            }
            match self.script.get(locale) {
                Some(Scripted::Unavailable) | None => Ok(RecognitionOutcome::Unavailable),
                Some(Scripted::Fail) => Err(anyhow::anyhow!("engine exploded")),
                Some(Scripted::Final { text, confidences }) => {
                    Ok(RecognitionOutcome::Final(Transcription {
                        text: text.to_string(),
                        segment_confidences: confidences.clone(),
                    }))
                }
            }
        }
    }

    #[tokio::test]
    async fn test_strict_max_selects_highest_score() {
        let recognizer = ScriptedRecognizer::new(&[
            ("aa-AA", Scripted::Final { text: "alpha", confidences: vec![0.3] }),
            ("bb-BB", Scripted::Final { text: "bravo", confidences: vec![0.9] }),
            ("cc-CC", Scripted::Final { text: "charlie", confidences: vec![0.6] }),
        ]);
        let detector = AutoDetector::new(recognizer);

        let outcome = detector
            .run(&[], &candidates(&["aa-AA", "bb-BB", "cc-CC"]))
            .await
            .unwrap();

        assert_eq!(outcome.locale.identifier, "bb-BB");
        assert_eq!(outcome.text, "bravo");
        assert!((outcome.score - 0.9).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_tie_keeps_first_candidate() {
        let recognizer = ScriptedRecognizer::new(&[
            ("aa-AA", Scripted::Final { text: "first", confidences: vec![0.8] }),
            ("bb-BB", Scripted::Final { text: "second", confidences: vec![0.8] }),
        ]);
        let detector = AutoDetector::new(recognizer);

        let outcome = detector
            .run(&[], &candidates(&["aa-AA", "bb-BB"]))
            .await
            .unwrap();

        assert_eq!(outcome.locale.identifier, "aa-AA");
        assert_eq!(outcome.text, "first");
    }

    #[tokio::test]
    async fn test_all_unusable_fails_with_empty_text() {
        let recognizer = ScriptedRecognizer::new(&[
            ("aa-AA", Scripted::Unavailable),
            ("bb-BB", Scripted::Fail),
        ]);
        let detector = AutoDetector::new(recognizer);

        let result = detector.run(&[], &candidates(&["aa-AA", "bb-BB"])).await;
        assert!(matches!(result, Err(DetectError::NoMatch)));

        let session = detector.session();
        assert_eq!(session.phase, RunPhase::Failed);
        assert_eq!(session.text, "");
        assert_eq!(session.progress, 1.0);
        assert_eq!(
            session.error.as_deref(),
            Some("no recognizable language or content found")
        );
    }

    #[tokio::test]
    async fn test_progress_is_one_after_any_run() {
        // Success case.
        let detector = AutoDetector::new(ScriptedRecognizer::new(&[(
            "aa-AA",
            Scripted::Final { text: "hello", confidences: vec![0.5] },
        )]));
        detector.run(&[], &candidates(&["aa-AA"])).await.unwrap();
        assert_eq!(detector.session().progress, 1.0);
        assert_eq!(detector.session().phase, RunPhase::Done);

        // Failure case.
        let detector = AutoDetector::new(ScriptedRecognizer::new(&[(
            "aa-AA",
            Scripted::Unavailable,
        )]));
        let _ = detector.run(&[], &candidates(&["aa-AA"])).await;
        assert_eq!(detector.session().progress, 1.0);
    }

    #[tokio::test]
    async fn test_zero_candidates_fails_immediately_at_full_progress() {
        let detector = AutoDetector::new(ScriptedRecognizer::new(&[]));
        let result = detector.run(&[], &[]).await;
        assert!(matches!(result, Err(DetectError::NoMatch)));
        assert_eq!(detector.session().progress, 1.0);
    }

    #[tokio::test]
    async fn test_mid_run_progress_capped_at_ninety_percent() {
        let recognizer = ScriptedRecognizer::new(&[
            ("aa-AA", Scripted::Unavailable),
            ("bb-BB", Scripted::Unavailable),
            ("cc-CC", Scripted::Final { text: "done", confidences: vec![0.4] }),
        ]);
        let progress_at_call = recognizer.progress_at_call.clone();
        let session_slot = recognizer.session_rx.clone();
        let detector = AutoDetector::new(recognizer);
        *session_slot.lock().unwrap() = Some(detector.subscribe());

        detector
            .run(&[], &candidates(&["aa-AA", "bb-BB", "cc-CC"]))
            .await
            .unwrap();

        // Attempt i observes the progress published after attempt i-1:
        // min(0.9, i/3).
        let observed = progress_at_call.lock().unwrap().clone();
        assert_eq!(observed.len(), 3);
        assert_eq!(observed[0], 0.0);
        assert!((observed[1] - 1.0 / 3.0).abs() < 1e-6);
        assert!((observed[2] - 2.0 / 3.0).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_progress_never_exceeds_cap_before_finalization() {
        // Twelve candidates: attempt 12 begins after progress was set to
        // min(0.9, 11/12), i.e. the 0.9 cap, not 0.917.
        let ids: Vec<String> = (1..=12).map(|i| format!("c{:02}", i)).collect();
        let id_refs: Vec<&str> = ids.iter().map(|s| s.as_str()).collect();
        let recognizer = ScriptedRecognizer::new(&[(
            "c12",
            Scripted::Final { text: "x", confidences: vec![0.4] },
        )]);
        let progress_at_call = recognizer.progress_at_call.clone();
        let session_slot = recognizer.session_rx.clone();
        let detector = AutoDetector::new(recognizer);
        *session_slot.lock().unwrap() = Some(detector.subscribe());

        detector.run(&[], &candidates(&id_refs)).await.unwrap();

        let observed = progress_at_call.lock().unwrap().clone();
        assert_eq!(observed.len(), 12);
        assert!((observed[11] - 0.9).abs() < 1e-6);
        for p in &observed {
            assert!(*p <= 0.9);
        }
        assert_eq!(detector.session().progress, 1.0);
    }

    #[tokio::test]
    async fn test_attempts_run_in_caller_order() {
        let recognizer = ScriptedRecognizer::new(&[
            ("cc-CC", Scripted::Unavailable),
            ("aa-AA", Scripted::Unavailable),
            ("bb-BB", Scripted::Final { text: "x", confidences: vec![0.1] }),
        ]);
        let calls = recognizer.calls.clone();
        let detector = AutoDetector::new(recognizer);

        detector
            .run(&[], &candidates(&["cc-CC", "aa-AA", "bb-BB"]))
            .await
            .unwrap();

        assert_eq!(
            calls.lock().unwrap().clone(),
            vec!["cc-CC".to_string(), "aa-AA".to_string(), "bb-BB".to_string()]
        );
    }

    #[tokio::test]
    async fn test_zero_segment_result_scores_zero_not_error() {
        // A zero-segment transcription is usable (score 0.0) but its empty
        // text cannot conclude a successful run on its own.
        let recognizer = ScriptedRecognizer::new(&[
            ("aa-AA", Scripted::Final { text: "", confidences: vec![] }),
            ("bb-BB", Scripted::Final { text: "speech", confidences: vec![0.2] }),
        ]);
        let detector = AutoDetector::new(recognizer);

        let outcome = detector
            .run(&[], &candidates(&["aa-AA", "bb-BB"]))
            .await
            .unwrap();
        assert_eq!(outcome.locale.identifier, "bb-BB");
    }

    #[tokio::test]
    async fn test_second_zero_segment_result_does_not_displace_first() {
        // 0.0 is not strictly greater than 0.0, so the first zero-segment
        // attempt stays the running best. Both are empty, so the run fails.
        let recognizer = ScriptedRecognizer::new(&[
            ("aa-AA", Scripted::Final { text: "", confidences: vec![] }),
            ("bb-BB", Scripted::Final { text: "", confidences: vec![] }),
        ]);
        let detector = AutoDetector::new(recognizer);

        let result = detector.run(&[], &candidates(&["aa-AA", "bb-BB"])).await;
        assert!(matches!(result, Err(DetectError::NoMatch)));
        assert_eq!(detector.session().text, "");
    }

    #[tokio::test]
    async fn test_single_candidate_accepts_sole_result() {
        let detector = AutoDetector::new(ScriptedRecognizer::new(&[(
            "aa-AA",
            Scripted::Final { text: "only one", confidences: vec![0.05] },
        )]));
        let outcome = detector.run(&[], &candidates(&["aa-AA"])).await.unwrap();
        assert_eq!(outcome.text, "only one");
        assert_eq!(outcome.locale.identifier, "aa-AA");
    }

    /// Recognizer that parks on a semaphore until the test releases it.
    struct HeldRecognizer {
        gate: Arc<Semaphore>,
    }

    impl SpeechRecognizer for HeldRecognizer {
        fn supported_locales(&self) -> Vec<String> {
            vec!["aa-AA".to_string()]
        }

        async fn recognize(&mut self, _audio: &[f32], _locale: &str) -> Result<RecognitionOutcome> {
            let permit = self.gate.acquire().await?;
            permit.forget();
            Ok(RecognitionOutcome::Final(Transcription {
                text: "held".to_string(),
                segment_confidences: vec![0.7],
            }))
        }
    }

    #[tokio::test]
    async fn test_concurrent_run_is_rejected_without_touching_session() {
        let gate = Arc::new(Semaphore::new(0));
        let detector = Arc::new(AutoDetector::new(HeldRecognizer { gate: gate.clone() }));

        let background = {
            let detector = detector.clone();
            tokio::spawn(async move { detector.run(&[], &candidates(&["aa-AA"])).await })
        };

        // Wait until the first run has claimed the engine and published its
        // attempt status.
        let mut rx = detector.subscribe();
        while detector.session().phase != RunPhase::Detecting {
            rx.changed().await.unwrap();
        }
        let before = detector.session();

        let rejected = detector.run(&[], &candidates(&["bb-BB"])).await;
        assert!(matches!(rejected, Err(DetectError::RunInProgress)));

        // The in-flight session is untouched by the rejected request.
        let after = detector.session();
        assert_eq!(after.phase, before.phase);
        assert_eq!(after.status, before.status);
        assert_eq!(after.progress, before.progress);

        gate.add_permits(1);
        let outcome = background.await.unwrap().unwrap();
        assert_eq!(outcome.text, "held");
        assert_eq!(detector.session().phase, RunPhase::Done);
    }
}
