//! Atomic JSONL writer.
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use flate2::{write::GzEncoder, Compression};
use log::warn;
use serde::Serialize;

use crate::error::Error;
use crate::scheduling;

enum Sink {
    Plain(BufWriter<File>),
    Gz(GzEncoder<BufWriter<File>>),
}

impl Sink {
    fn write_all(&mut self, buf: &[u8]) -> std::io::Result<()> {
        match self {
            Sink::Plain(w) => w.write_all(buf),
            Sink::Gz(w) => w.write_all(buf),
        }
    }

    fn finish(self) -> std::io::Result<()> {
        match self {
            Sink::Plain(mut w) => w.flush(),
            Sink::Gz(w) => w.finish().and_then(|mut inner| inner.flush()),
        }
    }
}

/// Writes to `<target>.working.<host>`, renamed onto `target` by [finish].
///
/// An aborted writer leaves the working file behind for inspection; the next
/// run simply overwrites it.
pub struct AtomicWriter {
    target: PathBuf,
    working: PathBuf,
    sink: Option<Sink>,
}

impl AtomicWriter {
    pub fn create(target: &Path) -> Result<Self, Error> {
        let working = PathBuf::from(format!(
            "{}.working.{}",
            target.display(),
            scheduling::host()
        ));
        let file = BufWriter::new(File::create(&working)?);

        let sink = match target.extension().and_then(|e| e.to_str()) {
            Some("gz") => Sink::Gz(GzEncoder::new(file, Compression::default())),
            _ => Sink::Plain(file),
        };

        Ok(Self {
            target: target.to_path_buf(),
            working,
            sink: Some(sink),
        })
    }

    /// Append one record as a JSON line.
    pub fn write_json<T: Serialize>(&mut self, value: &T) -> Result<(), Error> {
        let mut line = serde_json::to_string(value)?;
        line.push('\n');
        self.sink
            .as_mut()
            .expect("writer already finished")
            .write_all(line.as_bytes())?;
        Ok(())
    }

    /// Flush, close and rename the working file onto the target.
    pub fn finish(mut self) -> Result<(), Error> {
        if let Some(sink) = self.sink.take() {
            sink.finish()?;
        }
        std::fs::rename(&self.working, &self.target)?;
        Ok(())
    }
}

impl Drop for AtomicWriter {
    fn drop(&mut self) {
        if self.sink.is_some() {
            warn!(
                "abandoning incomplete output, working file kept at {:?}",
                self.working
            );
        }
    }
}

/// Serialize `value` as pretty JSON through the same working-then-rename
/// discipline. Used for stats and diagnostics sidecars.
pub fn write_json_atomic<T: Serialize>(target: &Path, value: &T) -> Result<(), Error> {
    let working = PathBuf::from(format!(
        "{}.working.{}",
        target.display(),
        scheduling::host()
    ));
    let mut file = BufWriter::new(File::create(&working)?);
    serde_json::to_writer_pretty(&mut file, value)?;
    file.write_all(b"\n")?;
    file.flush()?;
    std::fs::rename(&working, target)?;
    Ok(())
}
