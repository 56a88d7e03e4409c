/*! Ensemble language identification for the impresso newspaper corpus.

Assigns exactly one language label to every content item of a large OCR-ed
historical newspaper corpus. No single classifier is reliable on this noisy,
often multilingual material, so the pipeline runs in three stages:

1. **annotate** every item with a bank of classifiers (stage 1a),
2. **aggregate** the annotations of one collection into ensemble statistics,
   including how far the provider's own language metadata can be trusted
   (stage 1b),
3. **decide** one label per item through a rule cascade with a weighted
   voting fallback consulting those statistics (stage 2).

Every decision carries a decision code, so corpus releases stay auditable.
!*/
pub mod cli;
pub mod diagnostics;
pub mod error;
pub mod features;
pub mod identifiers;
pub mod io;
pub mod lang;
pub mod scheduling;
pub mod stages;
pub mod types;
pub mod voting;

/// Version tag recorded in every output record.
pub fn tool_version() -> String {
    format!("impresso-lid/{}", env!("CARGO_PKG_VERSION"))
}
