use std::{io, path::PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("I/O error for {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Not a regular file: {0:?}")]
    NotAFile(PathBuf),

    /// The file exists but its content can't be read as the claimed media type.
    #[error("Could not decode {path:?}: {reason}")]
    Decode { path: PathBuf, reason: String },
}

impl ProbeError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        ProbeError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn decode(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        ProbeError::Decode {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub fn is_decode(&self) -> bool {
        matches!(self, ProbeError::Decode { .. })
    }
}
