/*! Identifier trait.

All backends implement [LanguageIdentifier] to be usable from the
[super::ClassifierBank].
!*/
use std::collections::HashSet;

use crate::error::Error;

use super::LidPrediction;

pub trait LanguageIdentifier {
    /// Stable registry name of the backend.
    fn name(&self) -> &str;

    /// Identify the language(s) of `text`.
    ///
    /// `Ok(None)` means the backend refused to commit to a label; `Err` is a
    /// per-item runtime failure (the caller records it and moves on).
    fn predict(&self, text: &str) -> Result<Option<LidPrediction>, Error>;

    /// Closed label inventory, when the backend has one.
    fn supported_languages(&self) -> Option<&HashSet<String>> {
        None
    }

    /// Identifier of the model binary or backing crate, for reproducibility.
    fn model_version(&self) -> String;
}
