/*! Name-keyed classifier registry.

The bank resolves the configured classifier names at startup (unknown names
are fatal there, never at per-item time), owns the loaded model objects for
the lifetime of the worker, and runs the whole set over one item at a time.
!*/
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::error::Error;
use crate::lang::IMPRESSO_FT_LANGS;

use super::{
    FastTextIdentifier, LanguageIdentifier, LidPrediction, LinguaIdentifier, PipelineIdentifier,
    UnavailableReason, WhatlangIdentifier, WhichlangIdentifier,
};

/// labels requested from the fasttext models per item
const FASTTEXT_K: i32 = 3;

/// top-1 probability a pipeline child needs to short-circuit
const PIPELINE_CONFIDENCE: f64 = 0.5;

/// Model paths and the stage-1a pre-filter bound.
#[derive(Debug, Clone, Default)]
pub struct BankConfig {
    pub impresso_ft: Option<PathBuf>,
    pub wp_ft: Option<PathBuf>,
    /// minimum trimmed length below which no classifier is invoked
    pub minimal_text_length: usize,
}

/// Predictions of all configured classifiers for one item.
pub struct ItemPredictions {
    /// one entry per configured classifier; `None` marks an unavailable slot
    pub predictions: BTreeMap<String, Option<LidPrediction>>,
    pub too_short: bool,
    /// per-item runtime failures as (classifier, reason, detail)
    pub failures: Vec<(String, UnavailableReason, String)>,
}

pub struct ClassifierBank {
    identifiers: Vec<(String, Box<dyn LanguageIdentifier>)>,
    minimal_text_length: usize,
}

impl ClassifierBank {
    /// Resolve `lids` into loaded backends.
    ///
    /// # Errors
    /// [Error::UnknownClassifier] for an unconfigurable name,
    /// [Error::MissingModel] when a fasttext-backed name lacks its model path
    /// or the file cannot be loaded.
    pub fn new(lids: &[String], config: &BankConfig) -> Result<Self, Error> {
        let mut identifiers: Vec<(String, Box<dyn LanguageIdentifier>)> = Vec::new();

        for lid in lids {
            let identifier: Box<dyn LanguageIdentifier> = match lid.as_str() {
                "impresso_ft" => Box::new(Self::impresso_ft(config)?),
                "wp_ft" => Box::new(Self::wp_ft(config)?),
                "langid" => Box::new(WhatlangIdentifier::new()),
                "langdetect" => Box::new(WhichlangIdentifier),
                "lingua" => Box::new(LinguaIdentifier::new()),
                "impresso_langident_pipeline" => Box::new(PipelineIdentifier::new(
                    lid,
                    vec![
                        Box::new(Self::impresso_ft(config)?),
                        Box::new(Self::wp_ft(config)?),
                    ],
                    PIPELINE_CONFIDENCE,
                )),
                unknown => return Err(Error::UnknownClassifier(unknown.to_string())),
            };
            identifiers.push((lid.clone(), identifier));
        }

        Ok(Self {
            identifiers,
            minimal_text_length: config.minimal_text_length,
        })
    }

    fn impresso_ft(config: &BankConfig) -> Result<FastTextIdentifier, Error> {
        let path = config
            .impresso_ft
            .as_ref()
            .ok_or_else(|| Error::MissingModel(PathBuf::from("impresso_ft (--impresso-ft)")))?;
        let inventory = IMPRESSO_FT_LANGS.iter().map(|l| l.to_string()).collect();
        FastTextIdentifier::new("impresso_ft", path, FASTTEXT_K, Some(inventory))
    }

    fn wp_ft(config: &BankConfig) -> Result<FastTextIdentifier, Error> {
        let path = config
            .wp_ft
            .as_ref()
            .ok_or_else(|| Error::MissingModel(PathBuf::from("wp_ft (--wp-ft)")))?;
        FastTextIdentifier::new("wp_ft", path, FASTTEXT_K, None)
    }

    /// Bank over caller-provided backends. Lets tests and benches run the
    /// annotation machinery without model files.
    pub fn from_identifiers(
        identifiers: Vec<(String, Box<dyn LanguageIdentifier>)>,
        minimal_text_length: usize,
    ) -> Self {
        Self {
            identifiers,
            minimal_text_length,
        }
    }

    pub fn names(&self) -> Vec<String> {
        self.identifiers.iter().map(|(n, _)| n.clone()).collect()
    }

    pub fn model_versions(&self) -> BTreeMap<String, String> {
        self.identifiers
            .iter()
            .map(|(name, identifier)| (name.clone(), identifier.model_version()))
            .collect()
    }

    /// Run every configured classifier over `text`.
    ///
    /// Texts below the pre-filter bound get an unavailable slot for every
    /// classifier; runtime failures empty only the failing slot.
    pub fn predict_all(&self, text: &str) -> ItemPredictions {
        let mut predictions = BTreeMap::new();
        let mut failures = Vec::new();

        let too_short = text.trim().chars().count() < self.minimal_text_length;

        for (name, identifier) in &self.identifiers {
            if too_short {
                predictions.insert(name.clone(), None);
                continue;
            }
            let slot = match identifier.predict(text) {
                Ok(prediction) => prediction,
                Err(e) => {
                    failures.push((name.clone(), UnavailableReason::RuntimeError, e.to_string()));
                    None
                }
            };
            predictions.insert(name.clone(), slot);
        }

        ItemPredictions {
            predictions,
            too_short,
            failures,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(&'static str, f64);

    impl LanguageIdentifier for Fixed {
        fn name(&self) -> &str {
            "fixed"
        }
        fn predict(&self, _text: &str) -> Result<Option<LidPrediction>, Error> {
            Ok(Some(LidPrediction::single(self.0.to_string(), self.1)))
        }
        fn model_version(&self) -> String {
            "fixed".to_string()
        }
    }

    struct Failing;

    impl LanguageIdentifier for Failing {
        fn name(&self) -> &str {
            "failing"
        }
        fn predict(&self, _text: &str) -> Result<Option<LidPrediction>, Error> {
            Err(Error::Custom("backend exploded".to_string()))
        }
        fn model_version(&self) -> String {
            "failing".to_string()
        }
    }

    fn stub_bank() -> ClassifierBank {
        ClassifierBank::from_identifiers(
            vec![
                ("langid".to_string(), Box::new(Fixed("de", 0.9))),
                ("broken".to_string(), Box::new(Failing)),
            ],
            20,
        )
    }

    #[test]
    fn unknown_name_is_fatal() {
        let err = ClassifierBank::new(&["made_up".to_string()], &BankConfig::default());
        assert!(matches!(err, Err(Error::UnknownClassifier(name)) if name == "made_up"));
    }

    #[test]
    fn fasttext_without_path_is_missing_model() {
        let err = ClassifierBank::new(&["impresso_ft".to_string()], &BankConfig::default());
        assert!(matches!(err, Err(Error::MissingModel(_))));
    }

    #[test]
    fn short_text_empties_every_slot() {
        let bank = stub_bank();
        let out = bank.predict_all("Hier.");
        assert!(out.too_short);
        assert_eq!(out.predictions.len(), 2);
        assert!(out.predictions.values().all(|slot| slot.is_none()));
        assert!(out.failures.is_empty());
    }

    #[test]
    fn runtime_failure_empties_only_its_slot() {
        let bank = stub_bank();
        let out = bank.predict_all("Ein ausreichend langer Text für die Klassifikation.");
        assert!(!out.too_short);
        assert!(out.predictions["langid"].is_some());
        assert!(out.predictions["broken"].is_none());
        assert_eq!(out.failures.len(), 1);
        assert_eq!(out.failures[0].1, UnavailableReason::RuntimeError);
    }
}
