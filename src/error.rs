/*! Crate-wide error type.

Fatal errors bubble up to `main` where [Error::exit_code] maps them onto the
process exit codes expected by the driver: 2 for input parse errors, 3 for a
missing model, 4 for missing collection statistics, 1 otherwise.
!*/
use std::path::PathBuf;

#[derive(Debug)]
pub enum Error {
    Io(std::io::Error),
    /// Parse failure with file and line context.
    MalformedInput {
        path: PathBuf,
        line: usize,
        source: serde_json::Error,
    },
    Json(serde_json::Error),
    FastText(String),
    MissingModel(PathBuf),
    MissingStats(PathBuf),
    UnknownClassifier(String),
    /// Another worker owns this unit (a `.running` or `.done` stamp exists).
    AlreadyClaimed(PathBuf),
    Custom(String),
}

impl Error {
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::MalformedInput { .. } | Error::Json(_) => 2,
            Error::MissingModel(_) => 3,
            Error::MissingStats(_) => 4,
            _ => 1,
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Io(e) => write!(f, "io error: {e}"),
            Error::MalformedInput { path, line, source } => {
                write!(f, "malformed record {path:?}:{line}: {source}")
            }
            Error::Json(e) => write!(f, "json error: {e}"),
            Error::FastText(e) => write!(f, "fasttext error: {e}"),
            Error::MissingModel(p) => write!(f, "missing model file {p:?}"),
            Error::MissingStats(p) => write!(f, "missing collection statistics {p:?}"),
            Error::UnknownClassifier(name) => write!(f, "unknown classifier name {name:?}"),
            Error::AlreadyClaimed(p) => write!(f, "unit already claimed: {p:?}"),
            Error::Custom(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Error {
        Error::Io(e)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Error {
        Error::Json(e)
    }
}

impl From<String> for Error {
    fn from(s: String) -> Error {
        Error::Custom(s)
    }
}

#[cfg(test)]
mod tests {
    use super::Error;
    use std::path::PathBuf;

    #[test]
    fn exit_codes() {
        assert_eq!(Error::MissingModel(PathBuf::from("lid.bin")).exit_code(), 3);
        assert_eq!(Error::MissingStats(PathBuf::from("x.json")).exit_code(), 4);
        assert_eq!(Error::Custom("boom".to_string()).exit_code(), 1);
        let parse_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert_eq!(Error::Json(parse_err).exit_code(), 2);
    }
}
