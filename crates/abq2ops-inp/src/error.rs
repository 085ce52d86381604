//! Error types for abq2ops-inp

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, InpError>;

#[derive(Error, Debug)]
pub enum InpError {
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} is not decodable as UTF-8 or Latin-1 text", path.display())]
    Encoding { path: PathBuf },

    #[error("include cycle detected: {0}")]
    IncludeCycle(String),

    #[error("line {line}: missing INPUT parameter in *INCLUDE card")]
    MissingIncludeInput { line: usize },
}

impl InpError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            Self::FileNotFound(path)
        } else {
            Self::Io { path, source }
        }
    }
}
