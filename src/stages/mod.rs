/*! Stage runners.

Stage 1a annotates every item with all configured classifiers, stage 1b
aggregates annotated records into per-collection statistics, stage 2 turns
records plus statistics into one label per item. Stage ordering is strict:
a collection's statistics need all of its annotated files, a decision needs
the statistics.
!*/
mod aggregate;
mod annotate;
mod decide;

pub use aggregate::{bundle_stats, AggregateConfig, AggregateStage};
pub use annotate::AnnotateStage;
pub use decide::{DecideConfig, DecideStage, Decision, DecisionEngine};
