//! Error types for abq2ops-io

use std::path::PathBuf;

use abq2ops_gen::GenError;
use abq2ops_inp::InpError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConvertError>;

#[derive(Error, Debug)]
pub enum ConvertError {
    #[error(transparent)]
    Parse(#[from] InpError),

    #[error(transparent)]
    Generate(#[from] GenError),

    #[error("Input file must have .inp extension: {}", .0.display())]
    NotInpFile(PathBuf),

    #[error("Output file already exists: {}. Use --overwrite to replace it.", .0.display())]
    OutputExists(PathBuf),

    #[error("Output {} would also be written from {}", output.display(), first.display())]
    OutputCollision { output: PathBuf, first: PathBuf },

    #[error("Not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrapped_errors_keep_their_message() {
        let err: ConvertError = GenError::EmptyModel.into();
        assert_eq!(format!("{err}"), format!("{}", GenError::EmptyModel));

        let err = ConvertError::OutputExists(PathBuf::from("plate.py"));
        assert!(format!("{err}").contains("--overwrite"));
    }
}
