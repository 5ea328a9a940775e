//! Error types that can be emitted from this library
//!

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

use crate::model::SymbolKind;

/// Error type for library
#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    /// The text is not a valid script
    ///
    /// Lines and columns start at 1; columns count characters.
    #[error("syntax error at {line}:{column}: {message}")]
    #[diagnostic(code(w3_jass::syntax))]
    SyntaxError {
        line: usize,
        column: usize,
        message: String,
        #[source_code]
        source_code: NamedSource<String>,
        #[label("here")]
        span: SourceSpan,
    },

    /// No symbol of the script has this identifier
    #[error("no symbol named `{0}`")]
    #[diagnostic(code(w3_jass::symbol_not_found))]
    SymbolNotFound(String),

    /// A symbol can only be replaced by one of the same kind
    #[error("`{id}` is a {expected} and cannot be replaced by a {found}")]
    #[diagnostic(code(w3_jass::symbol_kind_mismatch))]
    SymbolKindMismatch {
        id: String,
        expected: SymbolKind,
        found: SymbolKind,
    },
}

impl Error {
    pub(crate) fn syntax(
        text: &str,
        offset: usize,
        line: usize,
        column: usize,
        message: impl Into<String>,
    ) -> Self {
        let length = text[offset..].chars().next().map_or(0, char::len_utf8);
        Error::SyntaxError {
            line,
            column,
            message: message.into(),
            source_code: NamedSource::new("script", text.to_owned()),
            span: (offset, length).into(),
        }
    }
}

/// Generic result type with crate's Error as its error variant
pub type Result<T> = core::result::Result<T, Error>;
