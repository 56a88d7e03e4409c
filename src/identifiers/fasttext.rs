/*! fastText-backed identifiers.

Backs both `impresso_ft` (the custom historical-print model, five languages)
and `wp_ft` (the Wikipedia model, ~176 languages). Model load failures are
fatal; per-item prediction failures are not.
!*/
use std::collections::HashSet;
use std::path::Path;

use fasttext::FastText as FastTextLib;

use crate::error::Error;
use crate::lang;

use super::{LanguageIdentifier, LidPrediction};

/// Strip the `__label__` prefix fasttext puts on its labels.
fn clean_label(label: &str) -> &str {
    label.strip_prefix("__label__").unwrap_or(label)
}

pub struct FastTextIdentifier {
    predictor: FastTextLib,
    name: String,
    version: String,
    k: i32,
    inventory: Option<HashSet<String>>,
}

impl FastTextIdentifier {
    /// Load a fasttext model from `path`.
    ///
    /// `k` is the number of labels requested per prediction; `inventory`
    /// declares a closed label set when the model has one.
    pub fn new(
        name: &str,
        path: &Path,
        k: i32,
        inventory: Option<HashSet<String>>,
    ) -> Result<Self, Error> {
        if !path.is_file() {
            return Err(Error::MissingModel(path.to_path_buf()));
        }
        let filename = path
            .to_str()
            .ok_or_else(|| Error::Custom(format!("invalid model path {path:?}")))?;

        let mut predictor = FastTextLib::new();
        predictor.load_model(filename).map_err(Error::FastText)?;

        let version = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("unknown")
            .to_string();

        Ok(Self {
            predictor,
            name: name.to_string(),
            version,
            k,
            inventory,
        })
    }
}

impl LanguageIdentifier for FastTextIdentifier {
    fn name(&self) -> &str {
        &self.name
    }

    fn predict(&self, text: &str) -> Result<Option<LidPrediction>, Error> {
        // fasttext predicts on single lines and chokes on NUL bytes
        let line = text.replace(['\n', char::from(0)], " ");

        let predictions = self
            .predictor
            .predict(&line, self.k, 0.0)
            .map_err(Error::FastText)?;

        let entries: Vec<(String, f64)> = predictions
            .into_iter()
            .map(|p| {
                (
                    lang::normalize(clean_label(&p.label)),
                    f64::from(p.prob).clamp(0.0, 1.0),
                )
            })
            .collect();

        Ok(LidPrediction::from_entries(entries))
    }

    fn supported_languages(&self) -> Option<&HashSet<String>> {
        self.inventory.as_ref()
    }

    fn model_version(&self) -> String {
        self.version.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::clean_label;

    #[test]
    fn label_cleaning() {
        assert_eq!(clean_label("__label__de"), "de");
        assert_eq!(clean_label("__label__lb"), "lb");
        // already-clean labels pass through
        assert_eq!(clean_label("fr"), "fr");
    }
}
