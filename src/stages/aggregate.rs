/*! Stage 1b: collection-level ensemble statistics.

Streams every annotated file of one collection, votes per admitted item and
tallies the outcomes into [CollectionStats]. Files are processed in
parallel; tallies are commutative counters, so the merge is deterministic.
!*/
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use itertools::Itertools;
use log::{error, info};
use rayon::prelude::*;

use crate::error::Error;
use crate::io::{write_json_atomic, LineReader};
use crate::tool_version;
use crate::types::{AgreementCounts, AnnotatedRecord, CollectionStats, SupportCounts};
use crate::voting::{unique_max, Ballot};

/// admission bound on the letter/char ratio
const MINIMAL_ALPHABETICAL_RATIO: f64 = 0.5;

/// voter name of the provider metadata in ballots
pub(crate) const ORIG_LG: &str = "orig_lg";

#[derive(Debug, Clone)]
pub struct AggregateConfig {
    pub collection: String,
    pub lids: Vec<String>,
    pub boosted_lids: Vec<String>,
    /// minimum letter count for admission
    pub minimal_text_length: usize,
    pub boost_factor: f64,
    pub minimal_vote_score: f64,
    pub minimal_lid_probability: f64,
}

impl AggregateConfig {
    fn boosted_set(&self) -> HashSet<String> {
        self.boosted_lids.iter().cloned().collect()
    }

    fn admits(&self, record: &AnnotatedRecord) -> bool {
        record.letters >= self.minimal_text_length
            && record.alpha_ratio >= MINIMAL_ALPHABETICAL_RATIO
    }
}

/// Mergeable per-file counters.
#[derive(Debug, Default)]
struct Tally {
    items_seen: u64,
    items_admitted: u64,
    decided: u64,
    tied: u64,
    malformed: u64,
    languages: BTreeMap<String, u64>,
    orig_lg_support: SupportCounts,
    agreement: BTreeMap<String, AgreementCounts>,
    model_versions: BTreeMap<String, String>,
}

impl Tally {
    fn merge(mut self, other: Tally) -> Tally {
        self.items_seen += other.items_seen;
        self.items_admitted += other.items_admitted;
        self.decided += other.decided;
        self.tied += other.tied;
        self.malformed += other.malformed;
        for (lang, count) in other.languages {
            *self.languages.entry(lang).or_default() += count;
        }
        self.orig_lg_support.positive += other.orig_lg_support.positive;
        self.orig_lg_support.negative += other.orig_lg_support.negative;
        for (lid, counts) in other.agreement {
            let entry = self.agreement.entry(lid).or_default();
            entry.agree += counts.agree;
            entry.total += counts.total;
        }
        self.model_versions.extend(other.model_versions);
        self
    }
}

pub struct AggregateStage {
    config: AggregateConfig,
    input_files: Vec<PathBuf>,
    outfile: Option<PathBuf>,
}

impl AggregateStage {
    pub fn new(
        config: AggregateConfig,
        input_files: Vec<PathBuf>,
        outfile: Option<PathBuf>,
    ) -> Self {
        Self {
            config,
            input_files,
            outfile,
        }
    }

    /// Vote over one admitted record; update the tally.
    fn observe(config: &AggregateConfig, record: &AnnotatedRecord, tally: &mut Tally) {
        let mut ballot = Ballot::new();

        for lid in &config.lids {
            if let Some(prediction) = record.prediction(lid) {
                if prediction.top().prob() >= config.minimal_lid_probability {
                    ballot.cast(lid, prediction.top().lang(), 1.0);
                }
            }
        }
        if let Some(orig_lg) = &record.orig_lg {
            ballot.cast(ORIG_LG, orig_lg, 1.0);
        }

        let details = ballot.tally(&config.boosted_set(), config.boost_factor);

        match unique_max(&details.totals, config.minimal_vote_score) {
            Some((decision, _)) => {
                tally.decided += 1;
                *tally.languages.entry(decision.clone()).or_default() += 1;

                if let Some(orig_lg) = &record.orig_lg {
                    if *orig_lg == decision {
                        tally.orig_lg_support.positive += 1;
                    } else {
                        tally.orig_lg_support.negative += 1;
                    }
                }

                for lid in &config.lids {
                    if let Some(prediction) = record.prediction(lid) {
                        let counts = tally.agreement.entry(lid.clone()).or_default();
                        counts.total += 1;
                        if prediction.top().lang() == decision {
                            counts.agree += 1;
                        }
                    }
                }
            }
            None => tally.tied += 1,
        }
    }

    fn tally_file(config: &AggregateConfig, path: &Path) -> Result<Tally, Error> {
        let mut tally = Tally::default();

        for line in LineReader::open(path)? {
            let (line_no, line) = line?;
            let record: AnnotatedRecord = match serde_json::from_str(&line) {
                Ok(record) => record,
                Err(e) => {
                    error!("skipping malformed record {path:?}:{line_no}: {e}");
                    tally.malformed += 1;
                    continue;
                }
            };

            tally.items_seen += 1;
            tally.model_versions.extend(record.model_versions.clone());
            if !config.admits(&record) {
                continue;
            }
            tally.items_admitted += 1;
            Self::observe(config, &record, &mut tally);
        }

        Ok(tally)
    }

    /// Build the statistics without writing them.
    pub fn collect(&self) -> Result<CollectionStats, Error> {
        let tallies: Vec<Result<Tally, Error>> = self
            .input_files
            .par_iter()
            .map(|path| Self::tally_file(&self.config, path))
            .collect();

        // first file error aborts: stats over a partial collection are worse
        // than no stats
        let tally = tallies
            .into_iter()
            .fold_ok(Tally::default(), Tally::merge)?;

        let mut lid_agreement = tally.agreement;
        for counts in lid_agreement.values_mut() {
            counts.finalize();
        }
        // classifiers that never predicted still get an entry
        for lid in &self.config.lids {
            lid_agreement.entry(lid.clone()).or_default();
        }

        let mut stats = CollectionStats {
            collection: self.config.collection.clone(),
            items_seen: tally.items_seen,
            items_admitted: tally.items_admitted,
            decided_items: tally.decided,
            tied_items: tally.tied,
            languages: tally.languages,
            dominant_language: None,
            orig_lg_trust: tally.orig_lg_support.trust(),
            orig_lg_support: tally.orig_lg_support,
            lid_agreement,
            malformed_records: tally.malformed,
            minimal_text_length: self.config.minimal_text_length,
            boost_factor: self.config.boost_factor,
            minimal_vote_score: self.config.minimal_vote_score,
            minimal_lid_probability: self.config.minimal_lid_probability,
            model_versions: tally.model_versions,
            tool_version: tool_version(),
        };
        stats.compute_dominant();
        Ok(stats)
    }

    pub fn run(&self) -> Result<(), Error> {
        let stats = self.collect()?;
        info!(
            "{}: {} items seen, {} admitted, {} decided, dominant {:?}",
            stats.collection, stats.items_seen, stats.items_admitted, stats.decided_items,
            stats.dominant_language
        );

        match &self.outfile {
            Some(path) => write_json_atomic(path, &stats)?,
            None => println!("{}", serde_json::to_string_pretty(&stats)?),
        }
        Ok(())
    }
}

/// Concatenate per-collection stats files into the corpus-wide
/// `stage1.stats.json` (collection → stats).
pub fn bundle_stats(inputs: &[PathBuf], outfile: &Path) -> Result<(), Error> {
    let mut bundle: BTreeMap<String, CollectionStats> = BTreeMap::new();

    for path in inputs {
        let stats = CollectionStats::load(path)?;
        bundle.insert(stats.collection.clone(), stats);
    }

    write_json_atomic(outfile, &bundle)?;
    info!("bundled {} collections into {:?}", bundle.len(), outfile);
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::identifiers::LidPrediction;

    fn config() -> AggregateConfig {
        AggregateConfig {
            collection: "EXP".to_string(),
            lids: vec![
                "impresso_ft".to_string(),
                "langid".to_string(),
                "langdetect".to_string(),
            ],
            boosted_lids: vec!["impresso_ft".to_string(), ORIG_LG.to_string()],
            minimal_text_length: 200,
            boost_factor: 1.5,
            minimal_vote_score: 1.5,
            minimal_lid_probability: 0.20,
        }
    }

    fn record(
        id: &str,
        orig_lg: Option<&str>,
        letters: usize,
        preds: &[(&str, &str, f64)],
    ) -> AnnotatedRecord {
        let mut predictions = BTreeMap::new();
        for (lid, lang, prob) in preds {
            predictions.insert(
                lid.to_string(),
                Some(LidPrediction::single(lang.to_string(), *prob)),
            );
        }
        AnnotatedRecord {
            id: id.to_string(),
            tp: None,
            ts: None,
            cc: None,
            orig_lg: orig_lg.map(String::from),
            len: letters + letters / 5,
            letters,
            alpha_ratio: 0.8,
            predictions,
            model_versions: BTreeMap::new(),
            tool_version: "test".to_string(),
            git_describe: None,
        }
    }

    fn observe_one(record: &AnnotatedRecord) -> Tally {
        let mut tally = Tally::default();
        AggregateStage::observe(&config(), record, &mut tally);
        tally
    }

    #[test]
    fn unanimous_item_is_decided() {
        let r = record(
            "EXP-1898-07-01-a-i0001",
            Some("de"),
            300,
            &[
                ("impresso_ft", "de", 0.95),
                ("langid", "de", 0.99),
                ("langdetect", "de", 0.99),
            ],
        );
        let tally = observe_one(&r);
        assert_eq!(tally.decided, 1);
        assert_eq!(tally.languages["de"], 1);
        assert_eq!(tally.orig_lg_support.positive, 1);
        assert_eq!(tally.agreement["langid"].agree, 1);
    }

    #[test]
    fn low_probability_predictions_do_not_vote() {
        // only langid clears the probability bar; a single vote stays below
        // the minimal vote score
        let r = record(
            "EXP-1898-07-01-a-i0002",
            None,
            300,
            &[("langid", "de", 0.99), ("langdetect", "fr", 0.1)],
        );
        let tally = observe_one(&r);
        assert_eq!(tally.decided, 0);
        assert_eq!(tally.tied, 1);
    }

    #[test]
    fn boost_lifts_supported_impresso_ft() {
        // impresso_ft and langid agree: 1.5 + 1 = 2.5 for de versus 1 for fr
        let r = record(
            "EXP-1898-07-01-a-i0003",
            None,
            300,
            &[
                ("impresso_ft", "de", 0.9),
                ("langid", "de", 0.9),
                ("langdetect", "fr", 0.9),
            ],
        );
        let tally = observe_one(&r);
        assert_eq!(tally.decided, 1);
        assert_eq!(tally.languages["de"], 1);
    }

    #[test]
    fn exact_tie_is_no_decision() {
        let r = record(
            "EXP-1898-07-01-a-i0004",
            Some("fr"),
            300,
            &[
                ("langid", "de", 0.9),
                ("langdetect", "de", 0.9),
                ("impresso_ft", "fr", 0.9),
            ],
        );
        // fr: orig_lg 1.5 (supported by impresso_ft) + impresso_ft 1.5 = 3.0
        // de: 1 + 1 = 2.0 -- not a tie, fr wins
        let tally = observe_one(&r);
        assert_eq!(tally.languages["fr"], 1);

        // without orig_lg: de 2.0 vs fr 1.0, de wins
        let r = record(
            "EXP-1898-07-01-a-i0005",
            None,
            300,
            &[
                ("langid", "de", 0.9),
                ("langdetect", "fr", 0.9),
            ],
        );
        let tally = observe_one(&r);
        assert_eq!(tally.tied, 1, "1.0 vs 1.0 is an undecidable tie");
    }

    #[test]
    fn admission_filter() {
        let cfg = config();
        let mut short = record("EXP-1898-07-01-a-i0006", None, 120, &[]);
        assert!(!cfg.admits(&short));
        short.letters = 200;
        assert!(cfg.admits(&short));
        short.alpha_ratio = 0.4;
        assert!(!cfg.admits(&short));
    }

    #[test]
    fn end_to_end_over_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("EXP-1898.annotated.jsonl");
        let records = [
            record(
                "EXP-1898-07-01-a-i0001",
                Some("fr"),
                300,
                &[
                    ("impresso_ft", "fr", 0.9),
                    ("langid", "fr", 0.9),
                    ("langdetect", "fr", 0.9),
                ],
            ),
            record(
                "EXP-1898-07-01-a-i0002",
                Some("de"),
                250,
                &[
                    ("impresso_ft", "fr", 0.9),
                    ("langid", "fr", 0.9),
                    ("langdetect", "fr", 0.9),
                ],
            ),
            // below admission
            record("EXP-1898-07-01-a-i0003", None, 10, &[]),
        ];
        let lines: Vec<String> = records
            .iter()
            .map(|r| serde_json::to_string(r).unwrap())
            .collect();
        std::fs::write(&path, lines.join("\n")).unwrap();

        let stage = AggregateStage::new(config(), vec![path], None);
        let stats = stage.collect().unwrap();

        assert_eq!(stats.items_seen, 3);
        assert_eq!(stats.items_admitted, 2);
        assert_eq!(stats.decided_items, 2);
        assert_eq!(stats.languages["fr"], 2);
        assert_eq!(stats.dominant_language.as_deref(), Some("fr"));
        assert_eq!(stats.orig_lg_support.positive, 1);
        assert_eq!(stats.orig_lg_support.negative, 1);
        assert_eq!(stats.orig_lg_trust, Some(0.5));
        let agreement = &stats.lid_agreement["langid"];
        assert_eq!(agreement.agree, 2);
        assert_eq!(agreement.total, 2);
        assert_eq!(agreement.rate, Some(1.0));
    }

    #[test]
    fn missing_input_file_is_fatal() {
        let stage = AggregateStage::new(
            config(),
            vec![PathBuf::from("/nonexistent/EXP-1898.jsonl")],
            None,
        );
        assert!(stage.collect().is_err());
    }
}
