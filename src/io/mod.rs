/*! Line-oriented JSONL input/output.

Compression is chosen by file extension: `.gz` streams through flate2,
anything else is read and written plain. Output files materialize through a
`<path>.working.<host>` sidecar renamed into place on success, so readers
never observe a half-written file.
!*/
mod reader;
mod writer;

pub use reader::LineReader;
pub use writer::{write_json_atomic, AtomicWriter};
