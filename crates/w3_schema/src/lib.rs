//! # Declarative binary schemas for Warcraft III map files
//!
//! This crate decodes the binary records found inside Warcraft III maps into generic, ordered
//! documents and encodes them back. Record layouts are described once, as a [`Schema`], and the
//! same description drives both directions.
//!
//! ## Schemas
//!
//! A schema is an ordered list of named fields. Each field has a [`FieldType`]:
//!
//! | Field type        | Encoding                                                            |
//! |-------------------|---------------------------------------------------------------------|
//! | `Int`             | 1, 2 or 4 byte integer, signed or unsigned                          |
//! | `Float`           | 4 byte IEEE-754 float                                               |
//! | `CString`         | UTF-8 bytes followed by a single `0x00`                             |
//! | `Id`              | 4 raw bytes such as `hfoo`                                          |
//! | `Bytes`           | A sized run of raw bytes                                            |
//! | `Const`           | A fixed value (magic numbers)                                       |
//! | `Bool`            | An integer with one false and one true value                        |
//! | `Enum` / `Flags`  | Named values or bit flags over an integer (or string) field         |
//! | `Struct`          | A nested schema                                                     |
//! | `Array`           | A counted list; counts come from earlier fields or lookup tables    |
//! | `Greedy`          | Elements repeated until the input ends                              |
//! | `Switch`          | A tagged union keyed by an earlier field                            |
//! | `Select`          | The first of several layouts that decodes                           |
//! | `Padded`          | A fixed size block, zero filled on encode                           |
//! | `Bits`            | Sub-byte fields packed into a byte aligned unit                     |
//!
//! Lengths and switches refer to earlier fields with dotted paths. Every leading `_` climbs to the
//! enclosing struct, so `_.new_object_id` reads a field of the parent record.
//!
//! ## Guarantees
//!
//! - All multi-byte values are little-endian unless the field says otherwise.
//! - Decoding fails instead of reading past the end of the input, and computed counts are bounded
//!   by [`CodecOptions::max_elements`].
//! - Encoding a freshly decoded document with the same schema reproduces the input exactly,
//!   except for the content of [`FieldType::Padded`] space, which is always written as zeros.
//!
//! ```
//! use w3_schema::{decode, encode, FieldType, IntKind, Length, Schema};
//! use binrw::Endian;
//!
//! let schema = Schema::new("Imports")
//!     .field("version", FieldType::Int(IntKind::I32, Endian::Little))
//!     .field("count", FieldType::Int(IntKind::I32, Endian::Little))
//!     .field("paths", FieldType::array(Length::field("count"), FieldType::CString));
//!
//! let bytes = b"\x01\0\0\0\x01\0\0\0war3mapImported\\a.mdx\0";
//! let document = decode(&schema, bytes).unwrap();
//! assert_eq!(encode(&schema, &document).unwrap(), bytes.to_vec());
//! ```
//!

mod bits;
pub mod error;
pub mod options;
pub mod path;
pub mod read;
pub mod scope;
#[cfg(feature = "serde")]
mod serde;
pub mod types;
pub mod value;
pub mod write;

pub use binrw::Endian;
pub use error::{Error, Result};
pub use options::{CodecOptions, Lookups, DEFAULT_MAX_DEPTH, DEFAULT_MAX_ELEMENTS};
pub use read::{decode, decode_select, decode_with};
pub use scope::Scope;
pub use types::{
    BitField, BitOrder, BitPack, Callback, Check, EnumDef, Field, FieldType, FlagsDef, IntKind,
    Key, Length, Ref, Schema, Switch,
};
pub use value::{Document, Value};
pub use write::{encode, encode_with};
