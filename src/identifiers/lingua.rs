/*! lingua-backed identifier.

Statistical detector over the language models compiled into the binary.
Models are preloaded at construction so per-item calls never touch the
filesystem.
!*/
use lingua::{Language, LanguageDetector, LanguageDetectorBuilder};

use crate::error::Error;

use super::{LanguageIdentifier, LidPrediction};

/// Confidence entries kept per prediction.
const TOP_K: usize = 3;

pub struct LinguaIdentifier {
    detector: LanguageDetector,
}

impl LinguaIdentifier {
    pub fn new() -> Self {
        let mut languages: Vec<Language> = Language::all().into_iter().collect();
        languages.sort();

        let detector = LanguageDetectorBuilder::from_languages(&languages)
            .with_preloaded_language_models()
            .build();

        Self { detector }
    }
}

impl Default for LinguaIdentifier {
    fn default() -> Self {
        Self::new()
    }
}

impl LanguageIdentifier for LinguaIdentifier {
    fn name(&self) -> &str {
        "lingua"
    }

    fn predict(&self, text: &str) -> Result<Option<LidPrediction>, Error> {
        let entries: Vec<(String, f64)> = self
            .detector
            .compute_language_confidence_values(text)
            .into_iter()
            .filter(|(_, confidence)| *confidence > 0.0)
            .take(TOP_K)
            .map(|(language, confidence)| {
                (language.iso_code_639_1().to_string(), confidence)
            })
            .collect();

        Ok(LidPrediction::from_entries(entries))
    }

    fn model_version(&self) -> String {
        "lingua".to_string()
    }
}
