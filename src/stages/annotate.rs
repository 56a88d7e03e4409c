/*! Stage 1a: per-item multi-classifier annotation.

Reads one rebuilt `(collection, year)` file, runs the whole classifier bank
over every item and writes one annotated record per input line, in input
order. All items are annotated; the admission filter for statistics is
applied downstream.
!*/
use std::path::PathBuf;

use log::{error, info, warn};

use crate::error::Error;
use crate::features::features;
use crate::identifiers::ClassifierBank;
use crate::io::{AtomicWriter, LineReader};
use crate::scheduling::UnitClaim;
use crate::tool_version;
use crate::types::{AnnotatedRecord, ContentItem};

pub struct AnnotateStage {
    bank: ClassifierBank,
    infile: PathBuf,
    outfile: PathBuf,
    round_ndigits: u32,
    git_describe: Option<String>,
}

impl AnnotateStage {
    pub fn new(
        bank: ClassifierBank,
        infile: PathBuf,
        outfile: PathBuf,
        round_ndigits: u32,
        git_describe: Option<String>,
    ) -> Self {
        Self {
            bank,
            infile,
            outfile,
            round_ndigits,
            git_describe,
        }
    }

    fn annotate_item(&self, item: &ContentItem) -> (AnnotatedRecord, bool) {
        let text = item.text();
        let metrics = features(text);
        let outcome = self.bank.predict_all(text);

        for (lid, reason, detail) in &outcome.failures {
            warn!("{}: {} unavailable ({}): {}", item.id, lid, reason.as_str(), detail);
        }

        let too_short = outcome.too_short;
        let predictions = outcome
            .predictions
            .into_iter()
            .map(|(lid, slot)| (lid, slot.map(|p| p.rounded(self.round_ndigits))))
            .collect();

        let record = AnnotatedRecord {
            id: item.id.clone(),
            tp: item.tp.clone(),
            ts: item.ts.clone(),
            cc: item.cc.clone(),
            orig_lg: item.lg.clone(),
            len: metrics.length,
            letters: metrics.letters,
            alpha_ratio: metrics.alphabetical_ratio,
            predictions,
            model_versions: self.bank.model_versions(),
            tool_version: tool_version(),
            git_describe: self.git_describe.clone(),
        };
        (record, too_short)
    }

    pub fn run(&self) -> Result<(), Error> {
        let claim = match UnitClaim::claim(&self.outfile)? {
            Some(claim) => claim,
            None => return Ok(()),
        };

        let mut writer = AtomicWriter::create(&self.outfile)?;
        let mut items = 0u64;
        let mut too_short = 0u64;
        let mut malformed = 0u64;

        for line in LineReader::open(&self.infile)? {
            let (line_no, line) = line?;
            let item: ContentItem = match serde_json::from_str(&line) {
                Ok(item) => item,
                Err(e) => {
                    error!("skipping malformed item {:?}:{}: {}", self.infile, line_no, e);
                    malformed += 1;
                    continue;
                }
            };

            let (record, short) = self.annotate_item(&item);
            if short {
                too_short += 1;
            }
            writer.write_json(&record)?;
            items += 1;
        }

        writer.finish()?;
        claim.complete()?;

        info!(
            "{:?}: annotated {} items ({} below length bound, {} malformed lines)",
            self.infile, items, too_short, malformed
        );
        Ok(())
    }
}
