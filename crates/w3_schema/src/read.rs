//! Decoding bytes into documents
//!

use binrw::{BinRead, Endian, NullString};
use std::io::Cursor;
use tracing::{debug, instrument, trace, warn};

use crate::bits;
use crate::error::{Error, Result};
use crate::options::CodecOptions;
use crate::path::FieldPath;
use crate::scope::Scope;
use crate::types::{FieldType, IntKind, Length, Schema};
use crate::value::{Document, Value};
use crate::write::constant_bytes;

struct Decoder<'a> {
    input: &'a [u8],
    cursor: Cursor<&'a [u8]>,
    options: &'a CodecOptions,
    path: FieldPath,
    depth: u64,
}

impl<'a> Decoder<'a> {
    fn new(input: &'a [u8], options: &'a CodecOptions) -> Self {
        Self {
            input,
            cursor: Cursor::new(input),
            options,
            path: FieldPath::default(),
            depth: 0,
        }
    }

    fn position(&self) -> usize {
        self.cursor.position() as usize
    }

    fn remaining(&self) -> usize {
        self.input.len().saturating_sub(self.position())
    }

    fn field(&self) -> String {
        self.path.to_string()
    }

    fn ensure(&self, n: usize) -> Result<()> {
        if self.remaining() < n {
            return Err(Error::UnexpectedEof {
                field: self.field(),
                offset: self.cursor.position(),
            });
        }
        Ok(())
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        self.ensure(n)?;
        let start = self.position();
        self.cursor.set_position((start + n) as u64);
        Ok(&self.input[start..start + n])
    }

    /// Resolve a length and bound it by [`CodecOptions::max_elements`]
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

    /// Run `f` one record deeper, bounded by [`CodecOptions::max_depth`]
    fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
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

    fn read_int(&mut self, kind: IntKind, endian: Endian) -> Result<i64> {
        self.ensure(kind.size())?;
        let c = &mut self.cursor;
        Ok(match kind {
            IntKind::I8 => i8::read_options(c, endian, ())?.into(),
            IntKind::U8 => u8::read_options(c, endian, ())?.into(),
            IntKind::I16 => i16::read_options(c, endian, ())?.into(),
            IntKind::U16 => u16::read_options(c, endian, ())?.into(),
            IntKind::I32 => i32::read_options(c, endian, ())?.into(),
            IntKind::U32 => u32::read_options(c, endian, ())?.into(),
        })
    }

    fn read_string(&mut self) -> Result<String> {
        let rest = &self.input[self.position().min(self.input.len())..];
        if !rest.contains(&0) {
            return Err(Error::UnexpectedEof {
                field: self.field(),
                offset: self.input.len() as u64,
            });
        }
        let raw = NullString::read_options(&mut self.cursor, Endian::Little, ())?;
        String::from_utf8(raw.0).map_err(|source| Error::InvalidUtf8 {
            field: self.field(),
            source,
        })
    }

    fn read(&mut self, ty: &FieldType, scope: &Scope<'_>) -> Result<Value> {
        match ty {
            FieldType::Int(kind, endian) => Ok(Value::Int(self.read_int(*kind, *endian)?)),
            FieldType::Float(endian) => {
                self.ensure(4)?;
                Ok(Value::Float(f32::read_options(&mut self.cursor, *endian, ())?))
            }
            FieldType::CString => Ok(Value::Str(self.read_string()?)),
            FieldType::Id => {
                let bytes = self.take(4)?;
                Ok(Value::Id([bytes[0], bytes[1], bytes[2], bytes[3]]))
            }
            FieldType::ReversedId => {
                let bytes = self.take(4)?;
                Ok(Value::Id([bytes[3], bytes[2], bytes[1], bytes[0]]))
            }
            FieldType::Bytes(length) => {
                let n = match self.count(length, scope)? {
                    Some(n) => n,
                    None => self.remaining(),
                };
                Ok(Value::Bytes(self.take(n)?.to_vec()))
            }
            FieldType::Const { inner, value } => {
                let start = self.position();
                match self.read(inner, scope) {
                    Ok(found) if found == *value => Ok(found),
                    Ok(_) | Err(Error::UnexpectedEof { .. }) => {
                        let end = self.position().max(start);
                        let actual = if end > start {
                            self.input[start..end].to_vec()
                        } else {
                            self.input[start.min(self.input.len())..].to_vec()
                        };
                        Err(Error::FormatMismatch {
                            field: self.field(),
                            expected: constant_bytes(inner, value, self.options),
                            actual,
                        })
                    }
                    Err(e) => Err(e),
                }
            }
            FieldType::Bool {
                repr,
                endian,
                false_value,
                true_value,
            } => match self.read_int(*repr, *endian)? {
                raw if raw == *true_value => Ok(Value::Bool(true)),
                raw if raw == *false_value => Ok(Value::Bool(false)),
                raw => Err(Error::ValidationError {
                    field: self.field(),
                    relation: format!(
                        "a boolean must be {false_value:#x} or {true_value:#x}, found {raw:#x}"
                    ),
                }),
            },
            FieldType::Enum(def) => {
                let raw = self.read(&def.repr, scope)?;
                let name = def.name_of(&raw).map(str::to_owned);
                if name.is_none() {
                    debug!(field = %self.path, %raw, "unrecognized {} value", def.name);
                }
                Ok(Value::Enum {
                    name,
                    raw: Box::new(raw),
                })
            }
            FieldType::Flags(def) => {
                let raw = self.read_int(def.repr, def.endian)?;
                let bits = (raw as u64) & bits::mask(def.repr.size() as u32 * 8);
                Ok(def.value_of(bits))
            }
            FieldType::Struct(schema) => Ok(Value::Struct(
                self.nested(|this| this.decode_struct(schema, Some(scope)))?,
            )),
            FieldType::Array { length, element } => match self.count(length, scope)? {
                Some(n) => {
                    // A corrupt count cannot reserve more than the input could possibly hold.
                    let mut items = Vec::with_capacity(n.min(self.remaining()));
                    for i in 0..n {
                        self.path.push_index(i);
                        items.push(self.read(element, scope)?);
                        self.path.pop();
                    }
                    Ok(Value::Array(items))
                }
                None => self.read_greedy(element, scope),
            },
            FieldType::Greedy(element) => self.read_greedy(element, scope),
            FieldType::Sequence(types) => {
                let mut items = Vec::with_capacity(types.len());
                for (i, ty) in types.iter().enumerate() {
                    self.path.push_index(i);
                    items.push(self.read(ty, scope)?);
                    self.path.pop();
                }
                Ok(Value::Array(items))
            }
            FieldType::Switch(switch) => {
                let discriminant = scope.resolve(&switch.on)?;
                let ty = switch
                    .select(discriminant)
                    .ok_or_else(|| Error::UnknownVariant {
                        field: self.field(),
                        discriminant: discriminant.to_string(),
                    })?;
                self.read(ty, scope)
            }
            FieldType::Conditional {
                condition,
                then,
                otherwise,
            } => {
                if (condition.0)(scope)? {
                    self.read(then, scope)
                } else {
                    self.read(otherwise, scope)
                }
            }
            FieldType::Select(alternatives) => {
                let start = self.cursor.position();
                let depth = self.path.depth();
                let mut last = None;
                for (i, alternative) in alternatives.iter().enumerate() {
                    match self.read(alternative, scope) {
                        Ok(value) => return Ok(value),
                        Err(e) => {
                            debug!(field = %self.path, alternative = i, error = %e, "alternative rejected");
                            self.cursor.set_position(start);
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
                let value = self.read(inner, scope)?;
                if !(check.predicate)(&value, scope) {
                    return Err(Error::ValidationError {
                        field: self.field(),
                        relation: check.relation.to_owned(),
                    });
                }
                Ok(value)
            }
            FieldType::Padded { size, inner } => {
                let size = *size as usize;
                self.ensure(size)?;
                let start = self.position();
                let value = self.read(inner, scope)?;
                let used = self.position() - start;
                if used > size {
                    return Err(Error::ValidationError {
                        field: self.field(),
                        relation: format!("content of {used} bytes overruns a {size} byte block"),
                    });
                }
                self.cursor.set_position((start + size) as u64);
                Ok(value)
            }
            FieldType::Bits(pack) => {
                pack.check()?;
                let bytes = self.take(pack.bytes)?;
                let values = bits::unpack(pack, bytes);
                Ok(Value::Struct(
                    pack.fields
                        .iter()
                        .zip(values)
                        .map(|(field, raw)| {
                            let value = match &field.flags {
                                Some(flags) => flags.value_of(raw),
                                None => Value::Int(raw as i64),
                            };
                            (field.name.clone(), value)
                        })
                        .collect(),
                ))
            }
            FieldType::Lazy(target) => self.nested(|this| this.read(target(), scope)),
        }
    }

    fn read_greedy(&mut self, element: &FieldType, scope: &Scope<'_>) -> Result<Value> {
        let mut items = Vec::new();
        while self.remaining() > 0 {
            let before = self.position();
            self.path.push_index(items.len());
            items.push(self.read(element, scope)?);
            self.path.pop();
            if self.position() == before {
                break;
            }
        }
        Ok(Value::Array(items))
    }

    fn decode_struct(&mut self, schema: &Schema, parent: Option<&Scope<'_>>) -> Result<Document> {
        trace!(schema = schema.name(), offset = self.position(), "decoding struct");
        let mut document = Document::new();
        for field in schema.fields() {
            self.path.push_name(&field.name);
            let value = {
                let scope = match parent {
                    Some(parent) => parent.child(&document),
                    None => Scope::root(&document, self.options),
                };
                self.read(&field.ty, &scope)?
            };
            self.path.pop();
            document.insert(field.name.clone(), value);
        }
        Ok(document)
    }

    fn finish(&self) -> Result<()> {
        let remaining = self.remaining();
        if remaining == 0 {
            return Ok(());
        }
        if self.options.allow_trailing {
            warn!(remaining, "ignoring trailing bytes");
            return Ok(());
        }
        Err(Error::TrailingData {
            offset: self.cursor.position(),
            remaining: remaining as u64,
        })
    }
}

/// Decode `bytes` with default options
pub fn decode(schema: &Schema, bytes: &[u8]) -> Result<Document> {
    decode_with(schema, bytes, &CodecOptions::default())
}

/// Decode `bytes` into a document, requiring the whole input to be consumed
#[instrument(skip_all, fields(schema = schema.name(), len = bytes.len()), err)]
pub fn decode_with(schema: &Schema, bytes: &[u8], options: &CodecOptions) -> Result<Document> {
    let mut decoder = Decoder::new(bytes, options);
    let document = decoder.decode_struct(schema, None)?;
    decoder.finish()?;
    Ok(document)
}

/// Try each schema in order, returning the index of the first that decodes `bytes`
///
/// Used for formats that exist in several incompatible layouts sharing one file name.
#[instrument(skip_all, fields(candidates = schemas.len(), len = bytes.len()), err)]
pub fn decode_select(
    schemas: &[&Schema],
    bytes: &[u8],
    options: &CodecOptions,
) -> Result<(usize, Document)> {
    let mut last = None;
    for (i, schema) in schemas.iter().enumerate() {
        match decode_with(schema, bytes, options) {
            Ok(document) => return Ok((i, document)),
            Err(e) => {
                debug!(schema = schema.name(), error = %e, "layout rejected");
                last = Some(e);
            }
        }
    }
    Err(last.unwrap_or_else(|| Error::InvalidSchema("no layouts to select from".into())))
}

impl Schema {
    /// See [`decode`]
    pub fn decode(&self, bytes: &[u8]) -> Result<Document> {
        decode(self, bytes)
    }

    /// See [`decode_with`]
    pub fn decode_with(&self, bytes: &[u8], options: &CodecOptions) -> Result<Document> {
        decode_with(self, bytes, options)
    }
}
