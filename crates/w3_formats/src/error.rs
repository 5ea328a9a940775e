//! Error types that can be emitted from this library
//!

use miette::Diagnostic;
use thiserror::Error;

/// Error type for library
#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    /// Transparent wrapper for [`std::io::Error`]
    #[error(transparent)]
    IOError(#[from] std::io::Error),

    /// Transparent wrapper for [`w3_schema::Error`]
    #[error(transparent)]
    #[diagnostic(transparent)]
    SchemaError(#[from] w3_schema::Error),

    /// The archive holds no entry with this name
    #[error("entry `{0}` not found in the map")]
    EntryNotFound(String),

    /// No known format is stored under this entry name
    #[error("`{0}` is not a known map format")]
    UnknownFormat(String),
}

/// Generic result type with crate's Error as its error variant
pub type Result<T> = core::result::Result<T, Error>;
