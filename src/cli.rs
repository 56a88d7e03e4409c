//! Command line arguments and parameters management/parsing.
use std::path::PathBuf;

use structopt::StructOpt;

use crate::stages::{AggregateConfig, DecideConfig};

#[derive(Debug, StructOpt)]
#[structopt(
    name = "impresso-lid",
    about = "Ensemble language identification for the impresso newspaper corpus"
)]
pub enum ImpressoLid {
    #[structopt(about = "Annotate items with all configured classifiers (stage 1a)")]
    Annotate(Annotate),
    #[structopt(about = "Build per-collection ensemble statistics (stage 1b)")]
    Aggregate(Aggregate),
    #[structopt(about = "Decide one language per item (stage 2)")]
    Decide(Decide),
    #[structopt(about = "Concatenate per-collection statistics files")]
    Bundle(Bundle),
}

#[derive(Debug, StructOpt)]
pub struct Annotate {
    #[structopt(long, help = "classifier names to run (default: all model-free ones)")]
    pub lids: Vec<String>,
    #[structopt(
        long = "impresso-ft",
        parse(from_os_str),
        help = "path to the impresso fasttext model"
    )]
    pub impresso_ft: Option<PathBuf>,
    #[structopt(
        long = "wp-ft",
        parse(from_os_str),
        help = "path to the Wikipedia fasttext model"
    )]
    pub wp_ft: Option<PathBuf>,
    #[structopt(
        long = "minimal-text-length",
        default_value = "20",
        help = "trimmed length below which no classifier is invoked"
    )]
    pub minimal_text_length: usize,
    #[structopt(long, parse(from_os_str), help = "rebuilt input file (.jsonl or .jsonl.gz)")]
    pub infile: PathBuf,
    #[structopt(long, parse(from_os_str), help = "annotated output file")]
    pub outfile: PathBuf,
    #[structopt(
        long = "round-ndigits",
        default_value = "3",
        help = "decimal places kept on probabilities"
    )]
    pub round_ndigits: u32,
    #[structopt(long = "git-describe", help = "build identifier recorded in outputs")]
    pub git_describe: Option<String>,
    #[structopt(long = "max-load", help = "wait until 1-minute load drops below this")]
    pub max_load: Option<f64>,
}

impl Annotate {
    /// Configured classifiers, defaulting to the model-free backends plus
    /// any fasttext model whose path was given.
    pub fn effective_lids(&self) -> Vec<String> {
        if !self.lids.is_empty() {
            return self.lids.clone();
        }
        let mut lids: Vec<String> = ["langid", "langdetect", "lingua"]
            .into_iter()
            .map(String::from)
            .collect();
        if self.impresso_ft.is_some() {
            lids.push("impresso_ft".to_string());
        }
        if self.wp_ft.is_some() {
            lids.push("wp_ft".to_string());
        }
        lids
    }
}

#[derive(Debug, StructOpt)]
pub struct Aggregate {
    #[structopt(long, help = "collection acronym")]
    pub collection: String,
    #[structopt(long, help = "classifier names whose votes count")]
    pub lids: Vec<String>,
    #[structopt(long = "boosted-lids", help = "voters eligible for the support boost")]
    pub boosted_lids: Vec<String>,
    #[structopt(
        long = "minimal-text-length",
        default_value = "200",
        help = "minimum letter count for admission to the statistics"
    )]
    pub minimal_text_length: usize,
    #[structopt(long = "boost-factor", default_value = "1.5")]
    pub boost_factor: f64,
    #[structopt(long = "minimal-vote-score", default_value = "1.5")]
    pub minimal_vote_score: f64,
    #[structopt(long = "minimal-lid-probability", default_value = "0.20")]
    pub minimal_lid_probability: f64,
    #[structopt(long, parse(from_os_str), help = "stats output file (stdout if absent)")]
    pub outfile: Option<PathBuf>,
    #[structopt(parse(from_os_str), help = "annotated files of the collection")]
    pub input_files: Vec<PathBuf>,
}

impl Aggregate {
    pub fn config(&self) -> AggregateConfig {
        AggregateConfig {
            collection: self.collection.clone(),
            lids: effective(&self.lids, DEFAULT_LIDS),
            boosted_lids: effective(&self.boosted_lids, DEFAULT_BOOSTED),
            minimal_text_length: self.minimal_text_length,
            boost_factor: self.boost_factor,
            minimal_vote_score: self.minimal_vote_score,
            minimal_lid_probability: self.minimal_lid_probability,
        }
    }
}

#[derive(Debug, StructOpt)]
pub struct Decide {
    #[structopt(long, help = "classifier names consulted by the cascade")]
    pub lids: Vec<String>,
    #[structopt(long = "boosted-lids", help = "voters eligible for the support boost")]
    pub boosted_lids: Vec<String>,
    #[structopt(long = "weight-lb-impresso-ft", default_value = "6.0")]
    pub weight_lb_impresso_ft: f64,
    #[structopt(long = "minimal-lid-probability", default_value = "0.5")]
    pub minimal_lid_probability: f64,
    #[structopt(long = "minimal-voting-score", default_value = "0.5")]
    pub minimal_voting_score: f64,
    #[structopt(long = "minimal-text-length", default_value = "50")]
    pub minimal_text_length: usize,
    #[structopt(
        long = "collection-stats-filename",
        parse(from_os_str),
        help = "stage-1b statistics of the item's collection"
    )]
    pub collection_stats_filename: PathBuf,
    #[structopt(long, parse(from_os_str), help = "annotated input file")]
    pub infile: PathBuf,
    #[structopt(long, parse(from_os_str), help = "decided output file")]
    pub outfile: PathBuf,
    #[structopt(
        long = "diagnostics-json",
        parse(from_os_str),
        help = "diagnostics sidecar path"
    )]
    pub diagnostics_json: Option<PathBuf>,
    #[structopt(long = "git-describe", help = "build identifier recorded in outputs")]
    pub git_describe: Option<String>,
    #[structopt(long = "max-load", help = "wait until 1-minute load drops below this")]
    pub max_load: Option<f64>,
}

impl Decide {
    pub fn config(&self) -> DecideConfig {
        DecideConfig {
            lids: effective(&self.lids, DEFAULT_LIDS),
            boosted_lids: effective(&self.boosted_lids, DEFAULT_BOOSTED),
            weight_lb_impresso_ft: self.weight_lb_impresso_ft,
            minimal_lid_probability: self.minimal_lid_probability,
            minimal_voting_score: self.minimal_voting_score,
            minimal_text_length: self.minimal_text_length,
        }
    }
}

#[derive(Debug, StructOpt)]
pub struct Bundle {
    #[structopt(long, parse(from_os_str), help = "bundled stats output")]
    pub outfile: PathBuf,
    #[structopt(parse(from_os_str), help = "per-collection stats files")]
    pub input_files: Vec<PathBuf>,
}

const DEFAULT_LIDS: &[&str] = &["impresso_ft", "wp_ft", "langid", "langdetect", "lingua"];
const DEFAULT_BOOSTED: &[&str] = &["impresso_ft", "orig_lg"];

fn effective(given: &[String], default: &[&str]) -> Vec<String> {
    if given.is_empty() {
        default.iter().map(|s| s.to_string()).collect()
    } else {
        given.to_vec()
    }
}

#[cfg(test)]
mod tests {
    use structopt::StructOpt;

    use super::*;

    #[test]
    fn annotate_defaults() {
        let a = ImpressoLid::from_iter([
            "impresso-lid",
            "annotate",
            "--infile",
            "in.jsonl.gz",
            "--outfile",
            "out.jsonl.gz",
        ]);
        let ImpressoLid::Annotate(a) = a else {
            panic!("expected annotate")
        };
        assert_eq!(a.minimal_text_length, 20);
        assert_eq!(a.round_ndigits, 3);
        assert_eq!(a.effective_lids(), vec!["langid", "langdetect", "lingua"]);
    }

    #[test]
    fn annotate_lids_grow_with_model_paths() {
        let a = ImpressoLid::from_iter([
            "impresso-lid",
            "annotate",
            "--impresso-ft",
            "impresso-lid.bin",
            "--wp-ft",
            "lid.176.bin",
            "--infile",
            "in.jsonl.gz",
            "--outfile",
            "out.jsonl.gz",
        ]);
        let ImpressoLid::Annotate(a) = a else {
            panic!("expected annotate")
        };
        assert_eq!(
            a.effective_lids(),
            vec!["langid", "langdetect", "lingua", "impresso_ft", "wp_ft"]
        );
    }

    #[test]
    fn decide_defaults_match_documented_parameters() {
        let d = ImpressoLid::from_iter([
            "impresso-lid",
            "decide",
            "--collection-stats-filename",
            "EXP.stats.json",
            "--infile",
            "in.jsonl.gz",
            "--outfile",
            "out.jsonl.gz",
        ]);
        let ImpressoLid::Decide(d) = d else {
            panic!("expected decide")
        };
        let config = d.config();
        assert_eq!(config.weight_lb_impresso_ft, 6.0);
        assert_eq!(config.minimal_lid_probability, 0.5);
        assert_eq!(config.minimal_voting_score, 0.5);
        assert_eq!(config.minimal_text_length, 50);
        assert_eq!(config.boosted_lids, vec!["impresso_ft", "orig_lg"]);
    }

    #[test]
    fn aggregate_parses_input_files() {
        let a = ImpressoLid::from_iter([
            "impresso-lid",
            "aggregate",
            "--collection",
            "EXP",
            "EXP-1898.jsonl.gz",
            "EXP-1899.jsonl.gz",
        ]);
        let ImpressoLid::Aggregate(a) = a else {
            panic!("expected aggregate")
        };
        assert_eq!(a.input_files.len(), 2);
        assert_eq!(a.config().minimal_text_length, 200);
        assert_eq!(a.config().minimal_lid_probability, 0.20);
    }
}
