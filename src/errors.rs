//! Domain errors surfaced to callers that need to react to them.
//! Everything else travels as `anyhow::Error`.

use std::io;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AccountError {
    #[error("name and secret are required")]
    MissingField,

    #[error("an account named '{0}' already exists")]
    DuplicateName(String),

    #[error("storage error: {0}")]
    Storage(#[from] sqlx::Error),
}

#[derive(Error, Debug, Clone, PartialEq)]
#[error("unknown role: {0}")]
pub struct RoleParseError(pub String);

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("storage error: {0}")]
    Storage(#[from] sqlx::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("write error: {0}")]
    Io(#[from] io::Error),
}
