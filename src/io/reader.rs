//! Transparent JSONL line reader.
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use flate2::read::MultiGzDecoder;

use crate::error::Error;

pub struct LineReader {
    lines: std::io::Lines<Box<dyn BufRead>>,
    path: PathBuf,
    line_no: usize,
}

impl LineReader {
    /// Open a `.jsonl` or `.jsonl.gz` file.
    pub fn open(path: &Path) -> Result<Self, Error> {
        let file = File::open(path)?;

        let inner: Box<dyn BufRead> = match path.extension().and_then(|e| e.to_str()) {
            Some("gz") => Box::new(BufReader::new(MultiGzDecoder::new(file))),
            Some("bz2") => {
                return Err(Error::Custom(format!(
                    "{path:?}: bzip2 streams are decompressed by the driver; \
                     expected a .jsonl or .jsonl.gz file"
                )))
            }
            _ => Box::new(BufReader::new(file)),
        };

        Ok(Self {
            lines: inner.lines(),
            path: path.to_path_buf(),
            line_no: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Iterator for LineReader {
    /// 1-based line number and line content.
    type Item = Result<(usize, String), Error>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.line_no += 1;
            match self.lines.next()? {
                Ok(line) => {
                    if line.trim().is_empty() {
                        continue;
                    }
                    return Some(Ok((self.line_no, line)));
                }
                Err(e) => return Some(Err(e.into())),
            }
        }
    }
}
