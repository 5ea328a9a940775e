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

    /// Transparent wrapper for [`binrw::Error`]
    #[error(transparent)]
    BinRWError(#[from] binrw::Error),

    /// A constant or magic value did not hold the expected bytes
    #[error("`{field}` does not match: expected {expected:02X?}, found {actual:02X?}")]
    #[diagnostic(
        code(w3_schema::format_mismatch),
        help("the data is most likely not of this file type")
    )]
    FormatMismatch {
        field: String,
        expected: Vec<u8>,
        actual: Vec<u8>,
    },

    /// A discriminant selected no branch of a tagged union
    #[error("`{field}` has no variant for discriminant {discriminant}")]
    #[diagnostic(code(w3_schema::unknown_variant))]
    UnknownVariant { field: String, discriminant: String },

    /// A cross-field predicate did not hold
    #[error("`{field}` failed validation: {relation}")]
    #[diagnostic(code(w3_schema::validation))]
    ValidationError { field: String, relation: String },

    /// A document value cannot be written back faithfully
    #[error("`{field}` cannot be encoded faithfully: {reason}")]
    #[diagnostic(code(w3_schema::round_trip))]
    RoundTripViolation { field: String, reason: String },

    /// A computed length or nesting depth is negative or larger than the configured limit
    #[error("`{field}` requests {requested}, the limit is {limit}")]
    #[diagnostic(
        code(w3_schema::overflow),
        help("raise `CodecOptions::max_elements` or `CodecOptions::max_depth` if the input is trusted")
    )]
    Overflow {
        field: String,
        requested: i128,
        limit: u64,
    },

    /// Input ended in the middle of a field
    #[error("unexpected end of data in `{field}` at offset {offset:#x}")]
    UnexpectedEof { field: String, offset: u64 },

    /// A string field held bytes which are not UTF-8
    #[error("`{field}` is not valid utf-8")]
    InvalidUtf8 {
        field: String,
        #[source]
        source: std::string::FromUtf8Error,
    },

    /// Bytes remained after the root record was decoded
    #[error("{remaining} trailing bytes after offset {offset:#x}")]
    #[diagnostic(help("enable `CodecOptions::allow_trailing` to ignore them"))]
    TrailingData { offset: u64, remaining: u64 },

    /// A referenced field was not present
    #[error("`{field}` is missing")]
    MissingField { field: String },

    /// A document held a field the schema does not describe
    #[error("`{field}` is not described by the schema")]
    UnknownField { field: String },

    /// A value had the wrong shape for its field
    #[error("`{field}` expected {expected}, found {found}")]
    TypeMismatch {
        field: String,
        expected: &'static str,
        found: &'static str,
    },

    /// An external lookup table or key was not supplied
    #[error("lookup table `{table}` has no entry for `{key}`")]
    #[diagnostic(help("supply the table through `CodecOptions::lookups`"))]
    MissingLookup { table: String, key: String },

    /// The schema itself is inconsistent
    #[error("invalid schema: {0}")]
    InvalidSchema(String),
}

/// Generic result type with crate's Error as its error variant
pub type Result<T> = core::result::Result<T, Error>;
