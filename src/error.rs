//! Error type shared by the file and configuration collaborators.
//!
//! Editing operations never fail: positions are clamped instead. Only
//! operations that touch the filesystem return [`Result`].

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}: {source}", path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// Lines are held as `String`, so other encodings are refused rather than rewritten
    #[error("{}: not valid UTF-8", path.display())]
    InvalidUtf8 { path: PathBuf },

    #[error("No file name")]
    NoFileName,

    #[error("unknown command: {0}")]
    UnknownCommand(String),
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_command_message() {
        let err = Error::UnknownCommand("frob".to_string());
        assert_eq!(err.to_string(), "unknown command: frob");
    }

    #[test]
    fn test_io_error_names_path() {
        let err = Error::io(
            "/tmp/x.c",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert_eq!(err.to_string(), "/tmp/x.c: denied");
    }

    #[test]
    fn test_invalid_utf8_names_path() {
        let err = Error::InvalidUtf8 {
            path: PathBuf::from("latin1.txt"),
        };
        assert_eq!(err.to_string(), "latin1.txt: not valid UTF-8");
    }
}
