//! Uniform prediction shape shared by all backends.
use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// One `[language, probability]` pair, serialized as a two-element array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LanguageProbability(pub String, pub f64);

impl LanguageProbability {
    pub fn lang(&self) -> &str {
        &self.0
    }

    pub fn prob(&self) -> f64 {
        self.1
    }
}

/// A non-empty list of language probabilities, sorted by descending
/// probability. Ties keep backend order so output stays deterministic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LidPrediction(Vec<LanguageProbability>);

impl LidPrediction {
    /// Build a prediction from raw backend output. Returns [None] when the
    /// backend produced nothing.
    pub fn from_entries(entries: Vec<(String, f64)>) -> Option<Self> {
        if entries.is_empty() {
            return None;
        }
        let mut entries: Vec<LanguageProbability> = entries
            .into_iter()
            .map(|(lang, prob)| LanguageProbability(lang, prob))
            .collect();
        entries.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
        Some(LidPrediction(entries))
    }

    pub fn single(lang: String, prob: f64) -> Self {
        LidPrediction(vec![LanguageProbability(lang, prob)])
    }

    pub fn top(&self) -> &LanguageProbability {
        // non-empty by construction
        &self.0[0]
    }

    pub fn entries(&self) -> &[LanguageProbability] {
        &self.0
    }

    /// Round all probabilities to `ndigits` decimal places.
    pub fn rounded(mut self, ndigits: u32) -> Self {
        let factor = 10f64.powi(ndigits as i32);
        for entry in &mut self.0 {
            entry.1 = (entry.1 * factor).round() / factor;
        }
        self
    }
}

/// Why a prediction slot is empty. Logged and counted, never serialized
/// (empty slots appear as `null` in the record).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnavailableReason {
    TooShort,
    RuntimeError,
    NoPrediction,
}

impl UnavailableReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnavailableReason::TooShort => "too_short",
            UnavailableReason::RuntimeError => "runtime_error",
            UnavailableReason::NoPrediction => "no_prediction",
        }
    }
}
