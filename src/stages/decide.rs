/*! Stage 2: per-item decision engine.

Combines a record's classifier predictions, the gated provider metadata and
the collection statistics through an ordered rule cascade, falling back to
weighted voting. Every input id yields exactly one output record.
!*/
use std::collections::HashSet;
use std::path::PathBuf;

use log::info;

use crate::diagnostics::Diagnostics;
use crate::error::Error;
use crate::io::{AtomicWriter, LineReader};
use crate::lang::{IMPRESSO_FT_LANGS, UND};
use crate::scheduling::UnitClaim;
use crate::tool_version;
use crate::types::{AnnotatedRecord, CollectionStats, DecidedRecord, DecisionCode};
use crate::voting::{ranked_max, Ballot, VoteDetails};

use super::aggregate::ORIG_LG;

/// minimum collection-level trust before orig_lg joins the cascade
const MINIMAL_ORIG_LG_TRUST: f64 = 0.75;

/// the classifier whose narrow inventory gets special handling
const IMPRESSO_FT: &str = "impresso_ft";

#[derive(Debug, Clone)]
pub struct DecideConfig {
    pub lids: Vec<String>,
    pub boosted_lids: Vec<String>,
    pub weight_lb_impresso_ft: f64,
    pub minimal_lid_probability: f64,
    pub minimal_voting_score: f64,
    /// drives both the short-text rule and the rare-language length gate
    pub minimal_text_length: usize,
}

impl Default for DecideConfig {
    fn default() -> Self {
        Self {
            lids: vec![
                IMPRESSO_FT.to_string(),
                "wp_ft".to_string(),
                "langid".to_string(),
                "langdetect".to_string(),
                "lingua".to_string(),
            ],
            boosted_lids: vec![IMPRESSO_FT.to_string(), ORIG_LG.to_string()],
            weight_lb_impresso_ft: 6.0,
            minimal_lid_probability: 0.5,
            minimal_voting_score: 0.5,
            minimal_text_length: 50,
        }
    }
}

/// Outcome of the cascade for one item.
#[derive(Debug, Clone, PartialEq)]
pub struct Decision {
    pub lg: String,
    pub code: DecisionCode,
    pub vote_details: Option<VoteDetails>,
}

impl Decision {
    fn plain(lg: &str, code: DecisionCode) -> Self {
        Decision {
            lg: lg.to_string(),
            code,
            vote_details: None,
        }
    }
}

struct ActiveVoter<'a> {
    name: &'a str,
    lang: &'a str,
    prob: f64,
}

pub struct DecisionEngine<'a> {
    config: &'a DecideConfig,
    stats: &'a CollectionStats,
}

impl<'a> DecisionEngine<'a> {
    pub fn new(config: &'a DecideConfig, stats: &'a CollectionStats) -> Self {
        Self { config, stats }
    }

    /// Predictions confident enough to take part in the cascade, plus the
    /// trust-gated provider metadata as a voter of probability 1.
    fn active_set<'r>(&'r self, record: &'r AnnotatedRecord) -> Vec<ActiveVoter<'r>> {
        let mut active = Vec::new();

        for lid in &self.config.lids {
            if let Some(prediction) = record.prediction(lid) {
                let top = prediction.top();
                if top.prob() >= self.config.minimal_lid_probability {
                    active.push(ActiveVoter {
                        name: lid,
                        lang: top.lang(),
                        prob: top.prob(),
                    });
                }
            }
        }

        let trusted = self
            .stats
            .orig_lg_trust
            .map_or(false, |trust| trust >= MINIMAL_ORIG_LG_TRUST);
        if trusted {
            if let Some(orig_lg) = &record.orig_lg {
                active.push(ActiveVoter {
                    name: ORIG_LG,
                    lang: orig_lg,
                    prob: 1.0,
                });
            }
        }

        active
    }

    fn unanimous<'v>(voters: &'v [ActiveVoter]) -> Option<&'v str> {
        let first = voters.first()?;
        voters
            .iter()
            .all(|v| v.lang == first.lang)
            .then_some(first.lang)
    }

    fn dominant_or_und(&self, code: DecisionCode) -> Decision {
        match &self.stats.dominant_language {
            Some(dominant) => Decision::plain(dominant, code),
            None => Decision::plain(UND, DecisionCode::Und),
        }
    }

    pub fn decide(&self, record: &AnnotatedRecord) -> Decision {
        if record.len == 0 {
            return self.dominant_or_und(DecisionCode::DominantByLen);
        }

        let active = self.active_set(record);

        // 1: every active voter names the same language
        if active.len() >= 2 {
            if let Some(lang) = Self::unanimous(&active) {
                return Decision::plain(lang, DecisionCode::All);
            }
        }

        // 2: unanimity outside impresso_ft on a language that model cannot
        // see, backed by the collection and enough text
        let others: Vec<&ActiveVoter> = active.iter().filter(|v| v.name != IMPRESSO_FT).collect();
        if others.len() >= 2 {
            let first = others[0].lang;
            let unanimous = others.iter().all(|v| v.lang == first);
            if unanimous
                && !IMPRESSO_FT_LANGS.contains(first)
                && self.stats.decided(first) >= 1
                && record.letters >= self.config.minimal_text_length
            {
                return Decision::plain(first, DecisionCode::AllButImpressoFt);
            }
        }

        // 3: too little text to trust any vote
        if record.len < self.config.minimal_text_length {
            if self.stats.dominant_language.is_some() {
                return self.dominant_or_und(DecisionCode::DominantByLen);
            }
        }

        // 4: weighted voting
        let mut ballot = Ballot::new();
        for voter in &active {
            let weight = if voter.name == IMPRESSO_FT && voter.lang == "lb" {
                voter.prob * self.config.weight_lb_impresso_ft
            } else if voter.name == ORIG_LG {
                2.0 * self.stats.relative_support(voter.lang)
            } else {
                voter.prob
            };
            ballot.cast(voter.name, voter.lang, weight);
        }

        let boosted: HashSet<String> = self.config.boosted_lids.iter().cloned().collect();
        let details = ballot.tally(&boosted, self.stats.boost_factor);

        let winner = ranked_max(&details.totals, |lang| self.stats.decided(lang));
        match winner {
            Some((lang, score)) if score >= self.config.minimal_voting_score => Decision {
                lg: lang,
                code: DecisionCode::Voting,
                vote_details: Some(details),
            },
            _ => {
                let mut decision = self.dominant_or_und(DecisionCode::DominantByLowvote);
                if !ballot.is_empty() {
                    decision.vote_details = Some(details);
                }
                decision
            }
        }
    }
}

pub struct DecideStage {
    config: DecideConfig,
    infile: PathBuf,
    outfile: PathBuf,
    stats_path: PathBuf,
    diagnostics_path: Option<PathBuf>,
    git_describe: Option<String>,
}

impl DecideStage {
    pub fn new(
        config: DecideConfig,
        infile: PathBuf,
        outfile: PathBuf,
        stats_path: PathBuf,
        diagnostics_path: Option<PathBuf>,
        git_describe: Option<String>,
    ) -> Self {
        Self {
            config,
            infile,
            outfile,
            stats_path,
            diagnostics_path,
            git_describe,
        }
    }

    pub fn run(&self) -> Result<(), Error> {
        let stats = CollectionStats::load(&self.stats_path)?;
        let engine = DecisionEngine::new(&self.config, &stats);

        let claim = match UnitClaim::claim(&self.outfile)? {
            Some(claim) => claim,
            None => return Ok(()),
        };

        let mut writer = AtomicWriter::create(&self.outfile)?;
        let mut diagnostics = Diagnostics::new(
            tool_version(),
            stats.model_versions.clone(),
            self.git_describe.clone(),
        );
        let mut items = 0u64;

        for line in LineReader::open(&self.infile)? {
            let (line_no, line) = line?;
            // stage-1 files are machine-written: a bad line is a broken
            // build, not a noisy provider
            let record: AnnotatedRecord =
                serde_json::from_str(&line).map_err(|source| Error::MalformedInput {
                    path: self.infile.clone(),
                    line: line_no,
                    source,
                })?;

            let decision = engine.decide(&record);
            diagnostics.observe(
                record.collection(),
                record.year(),
                &decision.lg,
                decision.code,
            );

            let out = DecidedRecord {
                id: record.id,
                tp: record.tp,
                ts: record.ts,
                cc: record.cc,
                orig_lg: record.orig_lg,
                lg: decision.lg,
                lg_decision: decision.code,
                vote_details: decision.vote_details,
                min_text_length_used: self.config.minimal_text_length,
                tool_version: tool_version(),
            };
            writer.write_json(&out)?;
            items += 1;
        }

        writer.finish()?;
        if let Some(path) = &self.diagnostics_path {
            diagnostics.write(path)?;
        }
        claim.complete()?;

        info!("{:?}: decided {} items", self.infile, items);
        Ok(())
    }
}
