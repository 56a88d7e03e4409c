/*! Per-file decision diagnostics.

Each stage-2 output file gets a JSON sidecar with item counts per
collection-year, final-language counts and decision-code counts, so corpus
releases can be audited without re-reading the bulk files.
!*/
use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::io::write_json_atomic;
use crate::types::DecisionCode;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Diagnostics {
    /// items per "<collection>-<year>"
    #[serde(rename = "N")]
    pub n: BTreeMap<String, u64>,
    /// items per final language
    pub lg: BTreeMap<String, u64>,
    pub decision_codes: BTreeMap<String, u64>,
    pub model_versions: BTreeMap<String, String>,
    pub tool_version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub git_describe: Option<String>,
}

impl Diagnostics {
    pub fn new(
        tool_version: String,
        model_versions: BTreeMap<String, String>,
        git_describe: Option<String>,
    ) -> Self {
        Self {
            n: BTreeMap::new(),
            lg: BTreeMap::new(),
            decision_codes: BTreeMap::new(),
            model_versions,
            tool_version,
            git_describe,
        }
    }

    pub fn observe(&mut self, collection: &str, year: Option<u16>, lang: &str, code: DecisionCode) {
        let key = match year {
            Some(year) => format!("{collection}-{year}"),
            None => collection.to_string(),
        };
        *self.n.entry(key).or_default() += 1;
        *self.lg.entry(lang.to_string()).or_default() += 1;
        *self
            .decision_codes
            .entry(code.as_str().to_string())
            .or_default() += 1;
    }

    pub fn write(&self, path: &Path) -> Result<(), Error> {
        write_json_atomic(path, self)
    }
}
