/*! Model-free n-gram identifiers.

`langid` is backed by whatlang (probabilistic trigram scoring over ~70
languages) and `langdetect` by whichlang (a fast single-label detector).
Both ship their models inside the crate, so these backends need no model
files and are fully deterministic.
!*/
use whatlang::Detector;
use whichlang::detect_language;

use crate::error::Error;
use crate::lang;

use super::{LanguageIdentifier, LidPrediction};

/// The `langid` backend.
pub struct WhatlangIdentifier {
    detector: Detector,
}

impl WhatlangIdentifier {
    pub fn new() -> Self {
        Self {
            detector: Detector::new(),
        }
    }
}

impl Default for WhatlangIdentifier {
    fn default() -> Self {
        Self::new()
    }
}

impl LanguageIdentifier for WhatlangIdentifier {
    fn name(&self) -> &str {
        "langid"
    }

    fn predict(&self, text: &str) -> Result<Option<LidPrediction>, Error> {
        Ok(self.detector.detect(text).map(|info| {
            LidPrediction::single(
                lang::normalize(info.lang().code()),
                info.confidence().clamp(0.0, 1.0),
            )
        }))
    }

    fn model_version(&self) -> String {
        "whatlang".to_string()
    }
}

/// The `langdetect` backend.
///
/// whichlang always commits to exactly one label and reports no score; the
/// label carries the full probability mass.
pub struct WhichlangIdentifier;

impl LanguageIdentifier for WhichlangIdentifier {
    fn name(&self) -> &str {
        "langdetect"
    }

    fn predict(&self, text: &str) -> Result<Option<LidPrediction>, Error> {
        if text.is_empty() {
            return Ok(None);
        }
        let detected = detect_language(text);
        Ok(Some(LidPrediction::single(
            lang::normalize(detected.three_letter_code()),
            1.0,
        )))
    }

    fn model_version(&self) -> String {
        "whichlang".to_string()
    }
}
