//! Collection-level ensemble statistics (stage 1b output).
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// How often `orig_lg` matched the ensemble decision.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupportCounts {
    pub positive: u64,
    pub negative: u64,
}

impl SupportCounts {
    /// positives / (positives + negatives), undefined on an empty sample.
    pub fn trust(&self) -> Option<f64> {
        let total = self.positive + self.negative;
        if total == 0 {
            None
        } else {
            Some(self.positive as f64 / total as f64)
        }
    }
}

/// Agreement of one classifier with the ensemble decision.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AgreementCounts {
    /// items where the classifier's top-1 matched the decision
    pub agree: u64,
    /// decided items where the classifier predicted at all
    pub total: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate: Option<f64>,
}

impl AgreementCounts {
    pub fn finalize(&mut self) {
        if self.total > 0 {
            self.rate = Some(self.agree as f64 / self.total as f64);
        }
    }
}

/// Statistics of one newspaper collection, rebuilt from its annotated files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionStats {
    pub collection: String,
    /// records read
    pub items_seen: u64,
    /// records passing the admission filter
    pub items_admitted: u64,
    pub decided_items: u64,
    pub tied_items: u64,
    /// per-language counts of ensemble-decided items
    pub languages: BTreeMap<String, u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dominant_language: Option<String>,
    pub orig_lg_support: SupportCounts,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orig_lg_trust: Option<f64>,
    pub lid_agreement: BTreeMap<String, AgreementCounts>,
    pub malformed_records: u64,
    pub minimal_text_length: usize,
    pub boost_factor: f64,
    pub minimal_vote_score: f64,
    pub minimal_lid_probability: f64,
    #[serde(default)]
    pub model_versions: BTreeMap<String, String>,
    pub tool_version: String,
}

impl CollectionStats {
    /// Read stats from disk. Absence is fatal for the unit depending on it.
    pub fn load(path: &Path) -> Result<Self, Error> {
        if !path.is_file() {
            return Err(Error::MissingStats(path.to_path_buf()));
        }
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }

    /// Decided-item count for one language.
    pub fn decided(&self, lang: &str) -> u64 {
        self.languages.get(lang).copied().unwrap_or(0)
    }

    /// Share of decided items labelled `lang`, in [0,1].
    pub fn relative_support(&self, lang: &str) -> f64 {
        let total: u64 = self.languages.values().sum();
        if total == 0 {
            0.0
        } else {
            self.decided(lang) as f64 / total as f64
        }
    }

    /// argmax of per-language decided counts; ties break lexicographically.
    pub fn compute_dominant(&mut self) {
        // BTreeMap iterates in code order, so a strict > keeps the first of
        // any tied group
        let mut best: Option<(&String, u64)> = None;
        for (lang, count) in &self.languages {
            if best.map_or(true, |(_, c)| *count > c) {
                best = Some((lang, *count));
            }
        }
        self.dominant_language = best.map(|(lang, _)| lang.clone());
    }
}
