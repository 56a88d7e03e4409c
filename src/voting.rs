/*! Weighted voting with support boosts.

Both the collection aggregation (unit votes) and the stage-2 fallback
(probability-weighted votes) run through [Ballot]. The boost is applied per
voter before summing, never on the language total, so tie semantics stay
stable. A boosted voter never counts as its own support.
!*/
use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone)]
struct Vote {
    voter: String,
    lang: String,
    weight: f64,
}

/// Effective per-voter weights and per-language totals, kept for the
/// `vote_details` diagnostics block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoteDetails {
    /// voter → (language, effective weight after boost)
    pub weights: BTreeMap<String, (String, f64)>,
    pub totals: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, Default)]
pub struct Ballot {
    votes: Vec<Vote>,
}

impl Ballot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cast(&mut self, voter: &str, lang: &str, weight: f64) {
        self.votes.push(Vote {
            voter: voter.to_string(),
            lang: lang.to_string(),
            weight,
        });
    }

    pub fn is_empty(&self) -> bool {
        self.votes.is_empty()
    }

    /// Tally the ballot.
    ///
    /// A voter in `boosted` whose language is shared by at least one *other*
    /// voter has its own weight multiplied by `boost_factor`.
    pub fn tally(&self, boosted: &HashSet<String>, boost_factor: f64) -> VoteDetails {
        let mut weights = BTreeMap::new();
        let mut totals: BTreeMap<String, f64> = BTreeMap::new();

        for vote in &self.votes {
            let supported = self
                .votes
                .iter()
                .any(|other| other.voter != vote.voter && other.lang == vote.lang);

            let weight = if boosted.contains(&vote.voter) && supported {
                vote.weight * boost_factor
            } else {
                vote.weight
            };

            weights.insert(vote.voter.clone(), (vote.lang.clone(), weight));
            *totals.entry(vote.lang.clone()).or_default() += weight;
        }

        VoteDetails { weights, totals }
    }
}

/// Winner for statistics purposes: the unique maximum at or above
/// `minimal_score`. Ties and low totals yield no decision.
pub fn unique_max(totals: &BTreeMap<String, f64>, minimal_score: f64) -> Option<(String, f64)> {
    let (best_lang, best_score) = totals
        .iter()
        .max_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(std::cmp::Ordering::Equal))?;

    if *best_score < minimal_score {
        return None;
    }
    let contested = totals
        .iter()
        .any(|(lang, score)| lang != best_lang && score == best_score);
    if contested {
        None
    } else {
        Some((best_lang.clone(), *best_score))
    }
}

/// Winner for the decision fallback: ties break on the higher `decided`
/// count, then lexicographically.
pub fn ranked_max(
    totals: &BTreeMap<String, f64>,
    decided: impl Fn(&str) -> u64,
) -> Option<(String, f64)> {
    // lexicographic iteration order means first-seen wins final ties
    let mut best: Option<(&String, f64, u64)> = None;
    for (lang, score) in totals {
        let support = decided(lang);
        let better = match best {
            None => true,
            Some((_, s, d)) => *score > s || (*score == s && support > d),
        };
        if better {
            best = Some((lang, *score, support));
        }
    }
    best.map(|(lang, score, _)| (lang.clone(), score))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn boosted() -> HashSet<String> {
        ["impresso_ft", "orig_lg"]
            .into_iter()
            .map(String::from)
            .collect()
    }

    #[test]
    fn boost_needs_support_from_another_voter() {
        let mut ballot = Ballot::new();
        ballot.cast("impresso_ft", "lb", 1.0);
        ballot.cast("langid", "de", 1.0);

        let details = ballot.tally(&boosted(), 1.5);
        // lone lb vote stays unboosted
        assert_eq!(details.totals["lb"], 1.0);
        assert_eq!(details.totals["de"], 1.0);
    }

    #[test]
    fn boost_applies_per_voter_not_per_total() {
        let mut ballot = Ballot::new();
        ballot.cast("impresso_ft", "de", 1.0);
        ballot.cast("orig_lg", "de", 1.0);
        ballot.cast("langid", "de", 1.0);

        let details = ballot.tally(&boosted(), 1.5);
        // two boosted voters at 1.5 each plus the plain vote
        assert_eq!(details.totals["de"], 4.0);
        assert_eq!(details.weights["impresso_ft"], ("de".to_string(), 1.5));
        assert_eq!(details.weights["langid"], ("de".to_string(), 1.0));
    }

    #[test]
    fn boosted_voters_support_each_other() {
        let mut ballot = Ballot::new();
        ballot.cast("impresso_ft", "fr", 1.0);
        ballot.cast("orig_lg", "fr", 1.0);

        let details = ballot.tally(&boosted(), 1.5);
        assert_eq!(details.totals["fr"], 3.0);
    }

    #[test]
    fn unique_max_rejects_ties_and_low_scores() {
        let mut totals = BTreeMap::new();
        totals.insert("de".to_string(), 2.0);
        totals.insert("fr".to_string(), 2.0);
        assert_eq!(unique_max(&totals, 1.5), None);

        let mut totals = BTreeMap::new();
        totals.insert("de".to_string(), 1.0);
        assert_eq!(unique_max(&totals, 1.5), None);

        totals.insert("de".to_string(), 3.0);
        totals.insert("fr".to_string(), 1.0);
        assert_eq!(unique_max(&totals, 1.5), Some(("de".to_string(), 3.0)));
    }

    #[test]
    fn ranked_max_breaks_ties_by_decided_then_code() {
        let mut totals = BTreeMap::new();
        totals.insert("fr".to_string(), 1.0);
        totals.insert("de".to_string(), 1.0);

        // fr has more decided items in the collection
        let winner = ranked_max(&totals, |lang| if lang == "fr" { 10 } else { 2 });
        assert_eq!(winner, Some(("fr".to_string(), 1.0)));

        // equal support: lexicographic order wins
        let winner = ranked_max(&totals, |_| 5);
        assert_eq!(winner, Some(("de".to_string(), 1.0)));
    }

    #[test]
    fn empty_ballot_tallies_empty() {
        let ballot = Ballot::new();
        let details = ballot.tally(&boosted(), 1.5);
        assert!(details.totals.is_empty());
        assert_eq!(ranked_max(&details.totals, |_| 0), None);
    }
}
