//! The view of already decoded fields that references, lengths and checks resolve against
//!

use crate::error::{Error, Result};
use crate::options::CodecOptions;
use crate::types::Ref;
use crate::value::{Document, Value};

/// One level of struct nesting
///
/// `current` holds the fields of the enclosing struct decoded so far (or, while encoding, the
/// whole struct). `parent` is the scope of the struct that contains it.
#[derive(Debug, Clone, Copy)]
pub struct Scope<'a> {
    current: &'a Document,
    parent: Option<&'a Scope<'a>>,
    options: &'a CodecOptions,
}

impl<'a> Scope<'a> {
    pub fn root(current: &'a Document, options: &'a CodecOptions) -> Self {
        Self {
            current,
            parent: None,
            options,
        }
    }

    pub fn child(&'a self, current: &'a Document) -> Scope<'a> {
        Scope {
            current,
            parent: Some(self),
            options: self.options,
        }
    }

    pub fn current(&self) -> &'a Document {
        self.current
    }

    pub fn parent(&self) -> Option<&'a Scope<'a>> {
        self.parent
    }

    pub fn options(&self) -> &'a CodecOptions {
        self.options
    }

    /// Field of the current struct by name
    pub fn get(&self, name: &str) -> Option<&'a Value> {
        self.current.get(name)
    }

    pub fn resolve(&self, reference: &Ref) -> Result<&'a Value> {
        let missing = || Error::MissingField {
            field: reference.to_string(),
        };

        let mut scope = self;
        for _ in 0..reference.up {
            scope = scope.parent.ok_or_else(missing)?;
        }

        let mut segments = reference.path.iter();
        let first = segments.next().ok_or_else(missing)?;
        let mut value = scope.current.get(first).ok_or_else(missing)?;
        for segment in segments {
            value = value
                .as_struct()
                .and_then(|doc| doc.get(segment))
                .ok_or_else(missing)?;
        }
        Ok(value)
    }

    pub fn resolve_int(&self, reference: &Ref) -> Result<i64> {
        let value = self.resolve(reference)?;
        value.as_int().ok_or_else(|| Error::TypeMismatch {
            field: reference.to_string(),
            expected: "an integer",
            found: value.kind(),
        })
    }
}
