/*! Length and alphabeticity metrics of a content item.

OCR noise shows up as a low letter/punctuation ratio, so both the ensemble
statistics and the decision cascade gate on these counts.
!*/
use serde::{Deserialize, Serialize};
use unic_ucd::GeneralCategory;

/// Character-level metrics, computed over the trimmed text.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TextMetrics {
    /// chars of the trimmed text
    pub length: usize,
    /// Unicode letter-category chars
    pub letters: usize,
    pub non_letters: usize,
    pub alphabetical_ratio: f64,
}

impl TextMetrics {
    pub fn empty() -> Self {
        TextMetrics {
            length: 0,
            letters: 0,
            non_letters: 0,
            alphabetical_ratio: 0.0,
        }
    }
}

/// Compute [TextMetrics] for a text body.
pub fn features(text: &str) -> TextMetrics {
    let text = text.trim();
    let mut letters = 0usize;
    let mut non_letters = 0usize;

    for c in text.chars() {
        if GeneralCategory::of(c).is_letter() {
            letters += 1;
        } else {
            non_letters += 1;
        }
    }

    let length = letters + non_letters;
    TextMetrics {
        length,
        letters,
        non_letters,
        alphabetical_ratio: letters as f64 / length.max(1) as f64,
    }
}
