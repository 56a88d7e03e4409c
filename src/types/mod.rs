/*! Record types flowing through the pipeline.

`raw items → annotated records → collection stats → decided records`.
Records are immutable once read; every update happens at file granularity.
!*/
mod item;
mod record;
mod stats;

pub use item::{collection_of, year_of, ContentItem};
pub use record::{AnnotatedRecord, DecidedRecord, DecisionCode};
pub use stats::{AgreementCounts, CollectionStats, SupportCounts};
