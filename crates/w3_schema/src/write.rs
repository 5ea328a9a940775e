//! Encoding documents back into bytes
//!

use binrw::{BinWrite, Endian};
use std::io::{Cursor, Write};
use tracing::{debug, instrument, trace};

use crate::bits;
use crate::error::{Error, Result};
use crate::options::CodecOptions;
use crate::path::FieldPath;
use crate::scope::Scope;
use crate::types::{FieldType, IntKind, Length, Schema};
use crate::value::{Document, Value};

struct Encoder<'a> {
    buffer: Cursor<Vec<u8>>,
    options: &'a CodecOptions,
    path: FieldPath,
    depth: u64,
}

impl<'a> Encoder<'a> {
    fn new(options: &'a CodecOptions) -> Self {
        Self {
            buffer: Cursor::new(Vec::new()),
            options,
            path: FieldPath::default(),
            depth: 0,
        }
    }

    fn field(&self) -> String {
        self.path.to_string()
    }

    fn mismatch(&self, expected: &'static str, found: &Value) -> Error {
        Error::TypeMismatch {
            field: self.field(),
            expected,
            found: found.kind(),
        }
    }

    fn count(&self, length: &Length, scope: &Scope<'_>) -> Result<Option<usize>> {
        let Some(requested) = length.resolve(scope)? else {
            return Ok(None);
        };
        let limit = self.options.max_elements;
        if requested < 0 || requested > i128::from(limit) {
            return Err(Error::Overflow {
                field: self.field(),
                requested,
                limit,
            });
        }
        Ok(Some(requested as usize))
    }

    fn nested(&mut self, f: impl FnOnce(&mut Self) -> Result<()>) -> Result<()> {
        if self.depth >= self.options.max_depth {
            return Err(Error::Overflow {
                field: self.field(),
                requested: i128::from(self.depth) + 1,
                limit: self.options.max_depth,
            });
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    fn check_count(&self, length: &Length, scope: &Scope<'_>, actual: usize, unit: &str) -> Result<()> {
        match self.count(length, scope)? {
            Some(expected) if expected != actual => Err(Error::ValidationError {
                field: self.field(),
                relation: format!("holds {actual} {unit}, its length field says {expected}"),
            }),
            _ => Ok(()),
        }
    }

    fn write_int(&mut self, kind: IntKind, endian: Endian, value: i64) -> Result<()> {
        if value < kind.min() || value > kind.max() {
            return Err(Error::RoundTripViolation {
                field: self.field(),
                reason: format!("{value} does not fit in {kind}"),
            });
        }
        let c = &mut self.buffer;
        match kind {
            IntKind::I8 => (value as i8).write_options(c, endian, ())?,
            IntKind::U8 => (value as u8).write_options(c, endian, ())?,
            IntKind::I16 => (value as i16).write_options(c, endian, ())?,
            IntKind::U16 => (value as u16).write_options(c, endian, ())?,
            IntKind::I32 => (value as i32).write_options(c, endian, ())?,
            IntKind::U32 => (value as u32).write_options(c, endian, ())?,
        }
        Ok(())
    }

    /// Write a bit pattern into an integer of `kind`, reinterpreting it for signed kinds
    fn write_bits(&mut self, kind: IntKind, endian: Endian, bits: u64) -> Result<()> {
        let width = kind.size() as u32 * 8;
        if !bits::fits(width, bits) {
            return Err(Error::RoundTripViolation {
                field: self.field(),
                reason: format!("{bits:#x} does not fit in {width} bits"),
            });
        }
        let c = &mut self.buffer;
        match kind {
            IntKind::I8 | IntKind::U8 => (bits as u8).write_options(c, endian, ())?,
            IntKind::I16 | IntKind::U16 => (bits as u16).write_options(c, endian, ())?,
            IntKind::I32 | IntKind::U32 => (bits as u32).write_options(c, endian, ())?,
        }
        Ok(())
    }

    fn write_raw(&mut self, bytes: &[u8]) -> Result<()> {
        self.buffer.write_all(bytes)?;
        Ok(())
    }

    fn write(&mut self, ty: &FieldType, value: &Value, scope: &Scope<'_>) -> Result<()> {
        match ty {
            FieldType::Int(kind, endian) => {
                let i = value.as_int().ok_or_else(|| self.mismatch("an integer", value))?;
                self.write_int(*kind, *endian, i)
            }
            FieldType::Float(endian) => {
                let f = value.as_float().ok_or_else(|| self.mismatch("a float", value))?;
                f.write_options(&mut self.buffer, *endian, ())?;
                Ok(())
            }
            FieldType::CString => {
                let s = value.as_str().ok_or_else(|| self.mismatch("a string", value))?;
                if s.contains('\0') {
                    return Err(Error::RoundTripViolation {
                        field: self.field(),
                        reason: "strings cannot contain a null character".into(),
                    });
                }
                self.write_raw(s.as_bytes())?;
                self.write_raw(&[0])
            }
            FieldType::Id => {
                let id = value.as_id().ok_or_else(|| self.mismatch("an identifier", value))?;
                self.write_raw(&id)
            }
            FieldType::ReversedId => {
                let mut id = value.as_id().ok_or_else(|| self.mismatch("an identifier", value))?;
                id.reverse();
                self.write_raw(&id)
            }
            FieldType::Bytes(length) => {
                let bytes = match value {
                    Value::Bytes(bytes) => bytes.as_slice(),
                    Value::Id(id) => id.as_slice(),
                    other => return Err(self.mismatch("bytes", other)),
                };
                self.check_count(length, scope, bytes.len(), "bytes")?;
                self.write_raw(bytes)
            }
            FieldType::Const { inner, value: expected } => {
                if value != expected {
                    return Err(Error::FormatMismatch {
                        field: self.field(),
                        expected: constant_bytes(inner, expected, self.options),
                        actual: constant_bytes(inner, value, self.options),
                    });
                }
                self.write(inner, expected, scope)
            }
            FieldType::Bool {
                repr,
                endian,
                false_value,
                true_value,
            } => match value {
                Value::Bool(true) => self.write_int(*repr, *endian, *true_value),
                Value::Bool(false) => self.write_int(*repr, *endian, *false_value),
                other => Err(self.mismatch("a boolean", other)),
            },
            FieldType::Enum(def) => {
                let raw = match value {
                    Value::Enum { name, raw } => name
                        .as_deref()
                        .and_then(|name| def.raw_of(name))
                        .unwrap_or(&**raw),
                    Value::Str(name) => def.raw_of(name).unwrap_or(value),
                    other => other,
                };
                self.write(&def.repr, raw, scope)
            }
            FieldType::Flags(def) => {
                let bits = match value {
                    Value::Flags { bits, .. } => *bits,
                    Value::Int(i) if *i >= 0 => *i as u64,
                    other => return Err(self.mismatch("flags", other)),
                };
                self.write_bits(def.repr, def.endian, bits)
            }
            FieldType::Struct(schema) => {
                let document = value.as_struct().ok_or_else(|| self.mismatch("a struct", value))?;
                self.nested(|this| this.encode_struct(schema, document, Some(scope)))
            }
            FieldType::Array { length, element } => {
                let items = value.as_array().ok_or_else(|| self.mismatch("an array", value))?;
                self.check_count(length, scope, items.len(), "elements")?;
                self.write_items(element, items, scope)
            }
            FieldType::Greedy(element) => {
                let items = value.as_array().ok_or_else(|| self.mismatch("an array", value))?;
                self.write_items(element, items, scope)
            }
            FieldType::Sequence(types) => {
                let items = value.as_array().ok_or_else(|| self.mismatch("an array", value))?;
                if items.len() != types.len() {
                    return Err(Error::ValidationError {
                        field: self.field(),
                        relation: format!("holds {} values, expected {}", items.len(), types.len()),
                    });
                }
                for (i, (ty, item)) in types.iter().zip(items).enumerate() {
                    self.path.push_index(i);
                    self.write(ty, item, scope)?;
                    self.path.pop();
                }
                Ok(())
            }
            FieldType::Switch(switch) => {
                let discriminant = scope.resolve(&switch.on)?;
                let ty = switch
                    .select(discriminant)
                    .ok_or_else(|| Error::UnknownVariant {
                        field: self.field(),
                        discriminant: discriminant.to_string(),
                    })?;
                self.write(ty, value, scope)
            }
            FieldType::Conditional {
                condition,
                then,
                otherwise,
            } => {
                if (condition.0)(scope)? {
                    self.write(then, value, scope)
                } else {
                    self.write(otherwise, value, scope)
                }
            }
            FieldType::Select(alternatives) => {
                let start = self.buffer.position();
                let depth = self.path.depth();
                let mut last = None;
                for (i, alternative) in alternatives.iter().enumerate() {
                    match self.write(alternative, value, scope) {
                        Ok(()) => return Ok(()),
                        Err(e) => {
                            debug!(field = %self.path, alternative = i, error = %e, "alternative rejected");
                            self.buffer.get_mut().truncate(start as usize);
                            self.buffer.set_position(start);
                            self.path.truncate(depth);
                            last = Some(e);
                        }
                    }
                }
                Err(last.unwrap_or_else(|| {
                    Error::InvalidSchema(format!("`{}` has no alternatives", self.path))
                }))
            }
            FieldType::Validated { inner, check } => {
                if !(check.predicate)(value, scope) {
                    return Err(Error::ValidationError {
                        field: self.field(),
                        relation: check.relation.to_owned(),
                    });
                }
                self.write(inner, value, scope)
            }
            FieldType::Padded { size, inner } => {
                let start = self.buffer.position();
                self.write(inner, value, scope)?;
                let used = self.buffer.position() - start;
                if used > *size {
                    return Err(Error::RoundTripViolation {
                        field: self.field(),
                        reason: format!("needs {used} bytes, the block holds {size}"),
                    });
                }
                self.write_raw(&vec![0; (*size - used) as usize])
            }
            FieldType::Bits(pack) => {
                pack.check()?;
                let document = value.as_struct().ok_or_else(|| self.mismatch("a struct", value))?;
                let mut values = Vec::with_capacity(pack.fields.len());
                for field in &pack.fields {
                    self.path.push_name(&field.name);
                    let part = document.get(&field.name).ok_or_else(|| Error::MissingField {
                        field: self.field(),
                    })?;
                    let raw = match part {
                        Value::Flags { bits, .. } => *bits,
                        other => {
                            let i = other.as_int().ok_or_else(|| self.mismatch("an integer", other))?;
                            u64::try_from(i).map_err(|_| Error::RoundTripViolation {
                                field: self.field(),
                                reason: format!("{i} is negative"),
                            })?
                        }
                    };
                    if !bits::fits(field.width, raw) {
                        return Err(Error::RoundTripViolation {
                            field: self.field(),
                            reason: format!("{raw} does not fit in {} bits", field.width),
                        });
                    }
                    values.push(raw);
                    self.path.pop();
                }
                self.write_raw(&bits::pack(pack, &values))
            }
            FieldType::Lazy(target) => self.nested(|this| this.write(target(), value, scope)),
        }
    }

    fn write_items(&mut self, element: &FieldType, items: &[Value], scope: &Scope<'_>) -> Result<()> {
        for (i, item) in items.iter().enumerate() {
            self.path.push_index(i);
            self.write(element, item, scope)?;
            self.path.pop();
        }
        Ok(())
    }

    /// A field absent from the document; only constants can be filled in
    fn write_missing(&mut self, ty: &FieldType, scope: &Scope<'_>) -> Result<()> {
        match ty {
            FieldType::Const { inner, value } => self.write(inner, value, scope),
            FieldType::Padded { size, inner } if matches!(**inner, FieldType::Const { .. }) => {
                let start = self.buffer.position();
                self.write_missing(inner, scope)?;
                let used = self.buffer.position() - start;
                self.write_raw(&vec![0; size.saturating_sub(used) as usize])
            }
            _ => Err(Error::MissingField {
                field: self.field(),
            }),
        }
    }

    fn encode_struct(
        &mut self,
        schema: &Schema,
        document: &Document,
        parent: Option<&Scope<'_>>,
    ) -> Result<()> {
        trace!(schema = schema.name(), offset = self.buffer.position(), "encoding struct");
        if let Some(name) = document
            .keys()
            .find(|name| !schema.fields().iter().any(|field| &field.name == *name))
        {
            self.path.push_name(name);
            return Err(Error::UnknownField {
                field: self.field(),
            });
        }

        let scope = match parent {
            Some(parent) => parent.child(document),
            None => Scope::root(document, self.options),
        };
        for field in schema.fields() {
            self.path.push_name(&field.name);
            match document.get(&field.name) {
                Some(value) => self.write(&field.ty, value, &scope)?,
                None => self.write_missing(&field.ty, &scope)?,
            }
            self.path.pop();
        }
        Ok(())
    }
}

/// Encoded form of a constant, used to report mismatches
pub(crate) fn constant_bytes(ty: &FieldType, value: &Value, options: &CodecOptions) -> Vec<u8> {
    if let Value::Bytes(bytes) = value {
        return bytes.clone();
    }
    let empty = Document::new();
    let scope = Scope::root(&empty, options);
    let mut encoder = Encoder::new(options);
    match encoder.write(ty, value, &scope) {
        Ok(()) => encoder.buffer.into_inner(),
        Err(_) => Vec::new(),
    }
}

/// Encode `document` with default options
pub fn encode(schema: &Schema, document: &Document) -> Result<Vec<u8>> {
    encode_with(schema, document, &CodecOptions::default())
}

/// Encode `document` into bytes
///
/// For any document produced by [`crate::decode`] with the same schema this yields the original
/// input byte for byte.
#[instrument(skip_all, fields(schema = schema.name()), err)]
pub fn encode_with(schema: &Schema, document: &Document, options: &CodecOptions) -> Result<Vec<u8>> {
    let mut encoder = Encoder::new(options);
    encoder.encode_struct(schema, document, None)?;
    Ok(encoder.buffer.into_inner())
}

impl Schema {
    /// See [`encode`]
    pub fn encode(&self, document: &Document) -> Result<Vec<u8>> {
        encode(self, document)
    }

    /// See [`encode_with`]
    pub fn encode_with(&self, document: &Document, options: &CodecOptions) -> Result<Vec<u8>> {
        encode_with(self, document, options)
    }
}

#[cfg(test)]
mod test {
    use binrw::Endian;
    use pretty_assertions::assert_eq;
    use tracing_test::traced_test;

    use super::encode;
    use crate::error::Error;
    use crate::types::{FieldType, IntKind, Length, Schema};
    use crate::value::{Document, Value};

    fn int() -> FieldType {
        FieldType::Int(IntKind::I32, Endian::Little)
    }

    #[traced_test]
    #[test]
    fn missing_constants_are_filled_in() {
        let schema = Schema::new("Header")
            .field("magic", FieldType::magic(b"W3do"))
            .field("version", int());
        let bytes = encode(&schema, &Document::new().with("version", 8)).unwrap();
        assert_eq!(bytes, b"W3do\x08\0\0\0".to_vec());
    }

    #[traced_test]
    #[test]
    fn out_of_range_integers_are_rejected() {
        let schema = Schema::new("Small").field("a", FieldType::Int(IntKind::U8, Endian::Little));
        let err = encode(&schema, &Document::new().with("a", 256)).unwrap_err();
        assert!(matches!(err, Error::RoundTripViolation { ref field, .. } if field == "a"));
    }

    #[traced_test]
    #[test]
    fn embedded_null_is_rejected() {
        let schema = Schema::new("Name").field("name", FieldType::CString);
        let err = encode(&schema, &Document::new().with("name", "a\0b")).unwrap_err();
        assert!(matches!(err, Error::RoundTripViolation { .. }));
    }

    #[traced_test]
    #[test]
    fn count_must_agree_with_the_array() {
        let schema = Schema::new("List")
            .field("count", int())
            .field("items", FieldType::array(Length::field("count"), int()));
        let document = Document::new()
            .with("count", 2)
            .with("items", vec![Value::Int(1)]);
        let err = encode(&schema, &document).unwrap_err();
        assert!(matches!(err, Error::ValidationError { ref field, .. } if field == "items"));
    }

    #[traced_test]
    #[test]
    fn unknown_fields_are_rejected() {
        let schema = Schema::new("One").field("a", int());
        let document = Document::new().with("a", 1).with("b", 2);
        assert!(matches!(
            encode(&schema, &document),
            Err(Error::UnknownField { ref field }) if field == "b"
        ));
    }

    #[traced_test]
    #[test]
    fn padding_is_zero_filled() {
        let schema = Schema::new("Block").field("name", FieldType::padded(8, FieldType::CString));
        let bytes = encode(&schema, &Document::new().with("name", "abc")).unwrap();
        assert_eq!(bytes, b"abc\0\0\0\0\0".to_vec());

        let err = encode(&schema, &Document::new().with("name", "too long!")).unwrap_err();
        assert!(matches!(err, Error::RoundTripViolation { .. }));
    }
}
