//! Locale candidate management
//!
//! Holds the curated set of locales offered for selection, default
//! preferences for first launch, and the resolution rule that guarantees the
//! orchestrator never runs with an empty candidate list.

use crate::recognize::SpeechRecognizer;
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// A selectable recognition locale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateLocale {
    /// BCP-47-style identifier, e.g. "en-US".
    pub identifier: String,
    /// Human-readable name, falling back to the identifier itself.
    pub display_name: String,
}

/// Curated allow-list of commonly used locales shown in selection UIs.
const COMMON_LOCALES: &[&str] = &[
    "en-US", "en-GB", "es-ES", "es-MX", "fr-FR", "de-DE", "it-IT", "pt-BR",
    "nl-NL", "sv-SE", "pl-PL", "ru-RU", "tr-TR", "ar-SA", "hi-IN", "ja-JP",
    "ko-KR", "zh-CN", "zh-TW", "vi-VN",
];

/// Opinionated defaults applied before the user has picked anything.
const DEFAULT_PREFERRED: &[&str] = &["en-US", "es-ES", "zh-CN"];

static DISPLAY_NAMES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("ar-SA", "Arabic (Saudi Arabia)"),
        ("ca-ES", "Catalan (Spain)"),
        ("cs-CZ", "Czech (Czechia)"),
        ("da-DK", "Danish (Denmark)"),
        ("de-DE", "German (Germany)"),
        ("el-GR", "Greek (Greece)"),
        ("en-GB", "English (United Kingdom)"),
        ("en-US", "English (United States)"),
        ("es-ES", "Spanish (Spain)"),
        ("es-MX", "Spanish (Mexico)"),
        ("fi-FI", "Finnish (Finland)"),
        ("fr-FR", "French (France)"),
        ("he-IL", "Hebrew (Israel)"),
        ("hi-IN", "Hindi (India)"),
        ("hu-HU", "Hungarian (Hungary)"),
        ("id-ID", "Indonesian (Indonesia)"),
        ("it-IT", "Italian (Italy)"),
        ("ja-JP", "Japanese (Japan)"),
        ("ko-KR", "Korean (South Korea)"),
        ("nb-NO", "Norwegian Bokmål (Norway)"),
        ("nl-NL", "Dutch (Netherlands)"),
        ("pl-PL", "Polish (Poland)"),
        ("pt-BR", "Portuguese (Brazil)"),
        ("pt-PT", "Portuguese (Portugal)"),
        ("ro-RO", "Romanian (Romania)"),
        ("ru-RU", "Russian (Russia)"),
        ("sv-SE", "Swedish (Sweden)"),
        ("th-TH", "Thai (Thailand)"),
        ("tr-TR", "Turkish (Türkiye)"),
        ("uk-UA", "Ukrainian (Ukraine)"),
        ("vi-VN", "Vietnamese (Vietnam)"),
        ("zh-CN", "Chinese (China mainland)"),
        ("zh-TW", "Chinese (Taiwan)"),
    ])
});

/// Human-readable name for a locale identifier.
pub fn display_name(identifier: &str) -> String {
    DISPLAY_NAMES
        .get(identifier)
        .map(|name| name.to_string())
        .unwrap_or_else(|| identifier.to_string())
}

/// All locales the engine can recognize, sorted by identifier for
/// deterministic listings. An engine with no capability yields an empty
/// list, never an error.
pub fn supported_locales<R: SpeechRecognizer>(recognizer: &R) -> Vec<String> {
    let mut identifiers = recognizer.supported_locales();
    identifiers.sort();
    identifiers
}

/// The curated subset of `supported` offered as selectable options, sorted
/// by display name.
pub fn common_options(supported: &[String]) -> Vec<CandidateLocale> {
    let mut options: Vec<CandidateLocale> = COMMON_LOCALES
        .iter()
        .filter(|id| supported.iter().any(|s| s == *id))
        .map(|id| CandidateLocale {
            identifier: id.to_string(),
            display_name: display_name(id),
        })
        .collect();
    options.sort_by(|a, b| a.display_name.cmp(&b.display_name));
    options
}

/// Default preferred identifiers for a fresh install: the fixed defaults
/// intersected with `supported`, else a singleton of the first common
/// option, else empty (resolution falls back to the system locale).
pub fn default_preferred_set(supported: &[String]) -> Vec<String> {
    let defaults: Vec<String> = DEFAULT_PREFERRED
        .iter()
        .filter(|id| supported.iter().any(|s| s == *id))
        .map(|id| id.to_string())
        .collect();
    if !defaults.is_empty() {
        return defaults;
    }
    common_options(supported)
        .first()
        .map(|option| vec![option.identifier.clone()])
        .unwrap_or_default()
}

/// The ambient locale of the running process, normalized to "xx-YY" form.
/// Defaults to "en-US" when the platform reports nothing usable.
pub fn system_locale() -> String {
    sys_locale::get_locale()
        .map(|raw| normalize_identifier(&raw))
        .filter(|id| !id.is_empty())
        .unwrap_or_else(|| "en-US".to_string())
}

/// Normalize POSIX-ish locale strings: "en_US.UTF-8" → "en-US".
fn normalize_identifier(raw: &str) -> String {
    let stripped = raw.split(['.', '@']).next().unwrap_or(raw);
    let mut parts = stripped.split(['-', '_']);
    let language = match parts.next() {
        Some(lang) if !lang.is_empty() => lang.to_ascii_lowercase(),
        _ => return String::new(),
    };
    match parts.next() {
        Some(region) if !region.is_empty() => {
            format!("{}-{}", language, region.to_ascii_uppercase())
        }
        _ => language,
    }
}

/// Turn the user's ordered preference list into the effective candidate
/// list. Caller order is preserved (it drives status numbering and the
/// first-wins tie-break). An empty preference list resolves to a singleton
/// of the ambient system locale, so the orchestrator always has at least
/// one candidate.
pub fn resolve_candidates(preferred: &[String]) -> Vec<CandidateLocale> {
    if preferred.is_empty() {
        let ambient = system_locale();
        tracing::debug!("No preferred locales, falling back to system locale {}", ambient);
        return vec![CandidateLocale {
            display_name: display_name(&ambient),
            identifier: ambient,
        }];
    }
    preferred
        .iter()
        .map(|id| CandidateLocale {
            identifier: id.clone(),
            display_name: display_name(id),
        })
        .collect()
}
