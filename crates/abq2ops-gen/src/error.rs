//! Error types for abq2ops-gen

use thiserror::Error;

pub type Result<T> = std::result::Result<T, GenError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenError {
    #[error("no model supplied for script generation")]
    EmptyModel,
}
