//! Field descriptors, the vocabulary schemas are written in.

use binrw::Endian;
use std::fmt;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::scope::Scope;
use crate::value::Value;

/// Width and signedness of an integer field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntKind {
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
}

impl IntKind {
    /// Size in bytes
    pub const fn size(self) -> usize {
        match self {
            IntKind::I8 | IntKind::U8 => 1,
            IntKind::I16 | IntKind::U16 => 2,
            IntKind::I32 | IntKind::U32 => 4,
        }
    }

    pub const fn min(self) -> i64 {
        match self {
            IntKind::I8 => i8::MIN as i64,
            IntKind::I16 => i16::MIN as i64,
            IntKind::I32 => i32::MIN as i64,
            IntKind::U8 | IntKind::U16 | IntKind::U32 => 0,
        }
    }

    pub const fn max(self) -> i64 {
        match self {
            IntKind::I8 => i8::MAX as i64,
            IntKind::U8 => u8::MAX as i64,
            IntKind::I16 => i16::MAX as i64,
            IntKind::U16 => u16::MAX as i64,
            IntKind::I32 => i32::MAX as i64,
            IntKind::U32 => u32::MAX as i64,
        }
    }
}

impl fmt::Display for IntKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            IntKind::I8 => "i8",
            IntKind::U8 => "u8",
            IntKind::I16 => "i16",
            IntKind::U16 => "u16",
            IntKind::I32 => "i32",
            IntKind::U32 => "u32",
        })
    }
}

/// A reference to an already decoded field
///
/// Written as a dotted path. Each leading `_` segment climbs to the enclosing struct, the
/// remaining segments descend into nested structs: `_.new_object_id`, `header.width`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ref {
    pub(crate) up: usize,
    pub(crate) path: Vec<String>,
}

impl Ref {
    pub fn new(path: &str) -> Self {
        let mut up = 0;
        let mut segments = Vec::new();
        for segment in path.split('.') {
            if segment == "_" && segments.is_empty() {
                up += 1;
            } else {
                segments.push(segment.to_owned());
            }
        }
        Self { up, path: segments }
    }
}

impl From<&str> for Ref {
    fn from(value: &str) -> Self {
        Ref::new(value)
    }
}

impl fmt::Display for Ref {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for _ in 0..self.up {
            f.write_str("_.")?;
        }
        f.write_str(&self.path.join("."))
    }
}

/// A pure function over the already decoded scope
#[derive(Clone, Copy)]
pub struct Callback<T>(pub fn(&Scope<'_>) -> Result<T>);

impl<T> fmt::Debug for Callback<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Callback(..)")
    }
}

/// How many elements (or bytes) a sized field holds
#[derive(Debug, Clone)]
pub enum Length {
    Fixed(u64),
    /// The value of an earlier field
    Field(Ref),
    /// The product of two earlier fields, e.g. `width * height`
    Product(Ref, Ref),
    /// An earlier field multiplied by a constant
    Scaled(Ref, u64),
    /// A count found in an external lookup table, keyed by an earlier field
    Lookup { table: String, key: Ref },
    /// Everything left in the input
    Remaining,
    Computed(Callback<i128>),
}

impl Length {
    pub fn field(path: &str) -> Self {
        Length::Field(Ref::new(path))
    }

    pub fn product(a: &str, b: &str) -> Self {
        Length::Product(Ref::new(a), Ref::new(b))
    }

    pub fn scaled(path: &str, factor: u64) -> Self {
        Length::Scaled(Ref::new(path), factor)
    }

    pub fn lookup(table: impl Into<String>, key: &str) -> Self {
        Length::Lookup {
            table: table.into(),
            key: Ref::new(key),
        }
    }

    /// Resolve the length against the scope.
    ///
    /// Returns `None` for [`Length::Remaining`]; bounds are checked by the caller which knows
    /// the field being sized. Products are computed in `i128` so they cannot wrap.
    pub fn resolve(&self, scope: &Scope<'_>) -> Result<Option<i128>> {
        Ok(Some(match self {
            Length::Fixed(n) => i128::from(*n),
            Length::Field(r) => i128::from(scope.resolve_int(r)?),
            Length::Product(a, b) => {
                i128::from(scope.resolve_int(a)?) * i128::from(scope.resolve_int(b)?)
            }
            Length::Scaled(r, factor) => i128::from(scope.resolve_int(r)?) * i128::from(*factor),
            Length::Lookup { table, key } => {
                let key_value = scope.resolve(key)?;
                let key_text = match key_value.as_str() {
                    Some(s) => s.to_owned(),
                    None => key_value.to_string(),
                };
                let count = scope
                    .options()
                    .lookups
                    .get(table)
                    .and_then(|entries| entries.get(&key_text))
                    .ok_or_else(|| Error::MissingLookup {
                        table: table.clone(),
                        key: key_text.clone(),
                    })?;
                i128::from(*count)
            }
            Length::Remaining => return Ok(None),
            Length::Computed(callback) => (callback.0)(scope)?,
        }))
    }
}

/// A closed set of named values over an integer or string representation
#[derive(Debug, Clone)]
pub struct EnumDef {
    pub name: String,
    pub repr: FieldType,
    pub variants: Vec<(String, Value)>,
}

impl EnumDef {
    pub fn new(name: impl Into<String>, repr: FieldType) -> Self {
        Self {
            name: name.into(),
            repr,
            variants: Vec::new(),
        }
    }

    pub fn variant(mut self, name: impl Into<String>, raw: impl Into<Value>) -> Self {
        self.variants.push((name.into(), raw.into()));
        self
    }

    pub fn name_of(&self, raw: &Value) -> Option<&str> {
        self.variants
            .iter()
            .find(|(_, v)| v == raw)
            .map(|(name, _)| name.as_str())
    }

    pub fn raw_of(&self, name: &str) -> Option<&Value> {
        self.variants
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, raw)| raw)
    }
}

/// A set of named bit flags stored in an integer
#[derive(Debug, Clone)]
pub struct FlagsDef {
    pub name: String,
    pub repr: IntKind,
    pub endian: Endian,
    pub flags: Vec<(String, u64)>,
}

impl FlagsDef {
    pub fn new(name: impl Into<String>, repr: IntKind, endian: Endian) -> Self {
        Self {
            name: name.into(),
            repr,
            endian,
            flags: Vec::new(),
        }
    }

    pub fn flag(mut self, name: impl Into<String>, mask: u64) -> Self {
        self.flags.push((name.into(), mask));
        self
    }

    /// Names of every flag fully set in `bits`
    pub fn names_of(&self, bits: u64) -> Vec<String> {
        self.flags
            .iter()
            .filter(|(_, mask)| *mask != 0 && bits & mask == *mask)
            .map(|(name, _)| name.clone())
            .collect()
    }

    pub fn value_of(&self, bits: u64) -> Value {
        Value::Flags {
            bits,
            names: self.names_of(bits),
        }
    }
}

/// Bit ordering inside a packed unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BitOrder {
    /// The unit is read big-endian and the first sub-field holds the most significant bits
    #[default]
    MsbFirst,
    /// The unit is read little-endian and the first sub-field holds the least significant bits
    LsbFirst,
}

/// One sub-byte field of a [`BitPack`]
#[derive(Debug, Clone)]
pub struct BitField {
    pub name: String,
    pub width: u32,
    pub flags: Option<Arc<FlagsDef>>,
}

/// Sub-byte fields packed into a byte aligned unit
///
/// The widths must add up to exactly `bytes * 8`.
#[derive(Debug, Clone)]
pub struct BitPack {
    pub bytes: usize,
    pub order: BitOrder,
    pub fields: Vec<BitField>,
}

impl BitPack {
    pub fn new(bytes: usize, order: BitOrder) -> Self {
        Self {
            bytes,
            order,
            fields: Vec::new(),
        }
    }

    pub fn field(mut self, name: impl Into<String>, width: u32) -> Self {
        self.fields.push(BitField {
            name: name.into(),
            width,
            flags: None,
        });
        self
    }

    pub fn flags(mut self, name: impl Into<String>, width: u32, flags: FlagsDef) -> Self {
        self.fields.push(BitField {
            name: name.into(),
            width,
            flags: Some(Arc::new(flags)),
        });
        self
    }

    /// Ensure the fields exactly cover the unit
    pub fn check(&self) -> Result<()> {
        if self.bytes == 0 || self.bytes > 8 {
            return Err(Error::InvalidSchema(format!(
                "a packed unit must be 1 to 8 bytes, not {}",
                self.bytes
            )));
        }
        if let Some(field) = self.fields.iter().find(|f| f.width == 0) {
            return Err(Error::InvalidSchema(format!(
                "packed field `{}` has no width",
                field.name
            )));
        }
        let total: u32 = self.fields.iter().map(|f| f.width).sum();
        if total as usize != self.bytes * 8 {
            return Err(Error::InvalidSchema(format!(
                "packed fields cover {total} bits of a {} bit unit",
                self.bytes * 8
            )));
        }
        Ok(())
    }
}

/// Key of a [`Switch`] arm
#[derive(Debug, Clone, PartialEq)]
pub enum Key {
    /// Matches the raw integer value of the discriminant
    Int(i64),
    /// Matches the symbolic name of an enum discriminant
    Name(String),
    /// Matches an identifier or byte discriminant
    Bytes(Vec<u8>),
}

impl Key {
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            Key::Int(i) => value.as_int() == Some(*i),
            Key::Name(name) => value.enum_name() == Some(name) || value.as_str() == Some(name),
            Key::Bytes(bytes) => match value {
                Value::Id(id) => id.as_slice() == bytes.as_slice(),
                Value::Bytes(b) => b == bytes,
                _ => false,
            },
        }
    }
}

/// A tagged union: the value of `on` picks the type of the payload
#[derive(Debug, Clone)]
pub struct Switch {
    pub on: Ref,
    pub cases: Vec<(Key, FieldType)>,
    /// Used when no case matches; without it an unmatched discriminant is an error
    pub default: Option<FieldType>,
}

impl Switch {
    pub fn new(on: &str) -> Self {
        Self {
            on: Ref::new(on),
            cases: Vec::new(),
            default: None,
        }
    }

    pub fn case(mut self, key: Key, ty: impl Into<FieldType>) -> Self {
        self.cases.push((key, ty.into()));
        self
    }

    pub fn otherwise(mut self, ty: impl Into<FieldType>) -> Self {
        self.default = Some(ty.into());
        self
    }

    pub fn select(&self, discriminant: &Value) -> Option<&FieldType> {
        self.cases
            .iter()
            .find(|(key, _)| key.matches(discriminant))
            .map(|(_, ty)| ty)
            .or(self.default.as_ref())
    }
}

/// A cross-field predicate, evaluated after the field decodes and before it encodes
#[derive(Clone, Copy)]
pub struct Check {
    pub relation: &'static str,
    pub predicate: fn(&Value, &Scope<'_>) -> bool,
}

impl fmt::Debug for Check {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Check")
            .field("relation", &self.relation)
            .finish_non_exhaustive()
    }
}

/// The type of a single field
#[derive(Debug, Clone)]
pub enum FieldType {
    Int(IntKind, Endian),
    /// IEEE-754 single precision
    Float(Endian),
    /// Null terminated UTF-8
    CString,
    /// Four raw bytes read as an identifier
    Id,
    /// An identifier stored last character first
    ReversedId,
    Bytes(Length),
    /// A fixed value; mismatches are a [`Error::FormatMismatch`]
    Const {
        inner: Box<FieldType>,
        value: Value,
    },
    Bool {
        repr: IntKind,
        endian: Endian,
        false_value: i64,
        true_value: i64,
    },
    Enum(Arc<EnumDef>),
    Flags(Arc<FlagsDef>),
    Struct(Arc<Schema>),
    Array {
        length: Length,
        element: Box<FieldType>,
    },
    /// Repeats the element until the input is exhausted
    Greedy(Box<FieldType>),
    /// A fixed run of differently typed values
    Sequence(Vec<FieldType>),
    Switch(Arc<Switch>),
    Conditional {
        condition: Callback<bool>,
        then: Box<FieldType>,
        otherwise: Box<FieldType>,
    },
    /// Tries each alternative in order and keeps the first that succeeds
    Select(Vec<FieldType>),
    Validated {
        inner: Box<FieldType>,
        check: Check,
    },
    /// Occupies exactly `size` bytes, zero filled on encode
    Padded {
        size: u64,
        inner: Box<FieldType>,
    },
    Bits(Arc<BitPack>),
    /// Resolved on use, for recursive records
    Lazy(fn() -> &'static FieldType),
}

impl FieldType {
    pub fn magic(bytes: &[u8]) -> Self {
        FieldType::Const {
            inner: Box::new(FieldType::Bytes(Length::Fixed(bytes.len() as u64))),
            value: Value::Bytes(bytes.to_vec()),
        }
    }

    pub fn constant(inner: FieldType, value: impl Into<Value>) -> Self {
        FieldType::Const {
            inner: Box::new(inner),
            value: value.into(),
        }
    }

    pub fn array(length: Length, element: impl Into<FieldType>) -> Self {
        FieldType::Array {
            length,
            element: Box::new(element.into()),
        }
    }

    pub fn greedy(element: impl Into<FieldType>) -> Self {
        FieldType::Greedy(Box::new(element.into()))
    }

    pub fn padded(size: u64, inner: impl Into<FieldType>) -> Self {
        FieldType::Padded {
            size,
            inner: Box::new(inner.into()),
        }
    }

    pub fn validated(inner: impl Into<FieldType>, check: Check) -> Self {
        FieldType::Validated {
            inner: Box::new(inner.into()),
            check,
        }
    }

    pub fn conditional(
        condition: fn(&Scope<'_>) -> Result<bool>,
        then: impl Into<FieldType>,
        otherwise: impl Into<FieldType>,
    ) -> Self {
        FieldType::Conditional {
            condition: Callback(condition),
            then: Box::new(then.into()),
            otherwise: Box::new(otherwise.into()),
        }
    }

    /// Walk the type looking for inconsistent packed units and empty selections
    pub fn check(&self) -> Result<()> {
        match self {
            FieldType::Const { inner, .. }
            | FieldType::Array { element: inner, .. }
            | FieldType::Greedy(inner)
            | FieldType::Validated { inner, .. }
            | FieldType::Padded { inner, .. } => inner.check(),
            FieldType::Enum(def) => def.repr.check(),
            FieldType::Struct(schema) => schema.check(),
            FieldType::Sequence(types) => types.iter().try_for_each(FieldType::check),
            FieldType::Select(types) if types.is_empty() => Err(Error::InvalidSchema(
                "a selection needs at least one alternative".into(),
            )),
            FieldType::Select(types) => types.iter().try_for_each(FieldType::check),
            FieldType::Switch(switch) => {
                switch.cases.iter().try_for_each(|(_, ty)| ty.check())?;
                switch.default.as_ref().map_or(Ok(()), FieldType::check)
            }
            FieldType::Conditional {
                then, otherwise, ..
            } => {
                then.check()?;
                otherwise.check()
            }
            FieldType::Bits(pack) => pack.check(),
            // Recursion goes through `Lazy`; its target is checked where it is defined.
            FieldType::Lazy(_) => Ok(()),
            FieldType::Int(..)
            | FieldType::Float(_)
            | FieldType::CString
            | FieldType::Id
            | FieldType::ReversedId
            | FieldType::Bytes(_)
            | FieldType::Bool { .. }
            | FieldType::Flags(_) => Ok(()),
        }
    }
}

impl From<Schema> for FieldType {
    fn from(value: Schema) -> Self {
        FieldType::Struct(Arc::new(value))
    }
}

impl From<Arc<Schema>> for FieldType {
    fn from(value: Arc<Schema>) -> Self {
        FieldType::Struct(value)
    }
}

impl From<EnumDef> for FieldType {
    fn from(value: EnumDef) -> Self {
        FieldType::Enum(Arc::new(value))
    }
}

impl From<FlagsDef> for FieldType {
    fn from(value: FlagsDef) -> Self {
        FieldType::Flags(Arc::new(value))
    }
}

impl From<Switch> for FieldType {
    fn from(value: Switch) -> Self {
        FieldType::Switch(Arc::new(value))
    }
}

impl From<BitPack> for FieldType {
    fn from(value: BitPack) -> Self {
        FieldType::Bits(Arc::new(value))
    }
}

/// A named field of a [`Schema`]
#[derive(Debug, Clone)]
pub struct Field {
    pub name: String,
    pub ty: FieldType,
}

/// An ordered list of fields describing one record
///
/// ```
/// use w3_schema::{Document, FieldType, IntKind, Length, Schema};
/// use binrw::Endian;
///
/// let schema = Schema::new("Points")
///     .field("count", FieldType::Int(IntKind::I32, Endian::Little))
///     .field(
///         "points",
///         FieldType::array(Length::field("count"), FieldType::Int(IntKind::U8, Endian::Little)),
///     );
///
/// let document = schema.decode(&[2, 0, 0, 0, 7, 9]).unwrap();
/// assert_eq!(document.lookup("count").and_then(|v| v.as_int()), Some(2));
/// assert_eq!(schema.encode(&document).unwrap(), vec![2, 0, 0, 0, 7, 9]);
/// ```
#[derive(Debug, Clone)]
pub struct Schema {
    name: String,
    fields: Vec<Field>,
}

impl Schema {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    pub fn field(mut self, name: impl Into<String>, ty: impl Into<FieldType>) -> Self {
        self.fields.push(Field {
            name: name.into(),
            ty: ty.into(),
        });
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn check(&self) -> Result<()> {
        self.fields.iter().try_for_each(|field| {
            field.ty.check().map_err(|e| match e {
                Error::InvalidSchema(reason) => {
                    Error::InvalidSchema(format!("{}.{}: {reason}", self.name, field.name))
                }
                other => other,
            })
        })
    }
}

#[cfg(test)]
mod test {
    use super::{BitOrder, BitPack, FieldType, Key, Ref, Schema};
    use crate::error::Error;
    use crate::value::Value;

    #[test]
    fn ref_parses_parent_segments() {
        let r = Ref::new("_._.header.width");
        assert_eq!(r.up, 2);
        assert_eq!(r.path, vec!["header".to_string(), "width".to_string()]);
        assert_eq!(r.to_string(), "_._.header.width");
    }

    #[test]
    fn bit_pack_must_cover_its_unit() {
        let short = BitPack::new(2, BitOrder::MsbFirst)
            .field("a", 4)
            .field("b", 8);
        assert!(matches!(short.check(), Err(Error::InvalidSchema(_))));

        let exact = BitPack::new(2, BitOrder::MsbFirst)
            .field("a", 4)
            .field("b", 8)
            .field("c", 4);
        assert!(exact.check().is_ok());
    }

    #[test]
    fn schema_check_reports_the_field() {
        let schema = Schema::new("Tile").field(
            "packed",
            BitPack::new(1, BitOrder::MsbFirst).field("a", 3),
        );
        let Err(Error::InvalidSchema(reason)) = schema.check() else {
            panic!("expected an invalid schema");
        };
        assert!(reason.starts_with("Tile.packed"));
    }

    #[test]
    fn empty_select_is_invalid() {
        assert!(FieldType::Select(Vec::new()).check().is_err());
    }

    #[test]
    fn keys_match_names_and_raw_values() {
        let value = Value::Enum {
            name: Some("STRING".into()),
            raw: Box::new(Value::Int(3)),
        };
        assert!(Key::Name("STRING".into()).matches(&value));
        assert!(Key::Int(3).matches(&value));
        assert!(!Key::Int(2).matches(&value));
        assert!(Key::Bytes(b"uDNR".to_vec()).matches(&Value::Id(*b"uDNR")));
    }
}
