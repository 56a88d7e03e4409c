//! Annotated (stage 1) and decided (stage 2) records.
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::identifiers::LidPrediction;
use crate::voting::VoteDetails;

use super::item::{collection_of, year_of};

/// Per-item output of the annotation stage.
///
/// Every configured classifier has a key in `predictions`; an unavailable
/// slot is `null`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnotatedRecord {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tp: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ts: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cc: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orig_lg: Option<String>,
    /// chars of the trimmed text
    pub len: usize,
    /// Unicode letter-category chars
    pub letters: usize,
    pub alpha_ratio: f64,
    pub predictions: BTreeMap<String, Option<LidPrediction>>,
    #[serde(default)]
    pub model_versions: BTreeMap<String, String>,
    pub tool_version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub git_describe: Option<String>,
}

impl AnnotatedRecord {
    pub fn collection(&self) -> &str {
        collection_of(&self.id)
    }

    pub fn year(&self) -> Option<u16> {
        year_of(&self.id)
    }

    /// Prediction of one classifier, if available.
    pub fn prediction(&self, lid: &str) -> Option<&LidPrediction> {
        self.predictions.get(lid).and_then(|slot| slot.as_ref())
    }
}

/// Which stage-2 rule produced the final label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DecisionCode {
    #[serde(rename = "all")]
    All,
    #[serde(rename = "all-but-impresso_ft")]
    AllButImpressoFt,
    #[serde(rename = "dominant-by-len")]
    DominantByLen,
    #[serde(rename = "dominant-by-lowvote")]
    DominantByLowvote,
    #[serde(rename = "voting")]
    Voting,
    /// no rule could fire (empty text, no dominant language)
    #[serde(rename = "und")]
    Und,
}

impl DecisionCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DecisionCode::All => "all",
            DecisionCode::AllButImpressoFt => "all-but-impresso_ft",
            DecisionCode::DominantByLen => "dominant-by-len",
            DecisionCode::DominantByLowvote => "dominant-by-lowvote",
            DecisionCode::Voting => "voting",
            DecisionCode::Und => "und",
        }
    }
}

impl std::fmt::Display for DecisionCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-item output of the decision stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecidedRecord {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tp: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ts: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cc: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orig_lg: Option<String>,
    /// final language label
    pub lg: String,
    pub lg_decision: DecisionCode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vote_details: Option<VoteDetails>,
    pub min_text_length_used: usize,
    pub tool_version: String,
}
