//! The map container (`.w3m`, `.w3x`)
//!
//! A map is an MPQ archive behind a 512 byte header. Signed maps end with a footer holding the
//! signature; it is part of the archive bytes as far as the header is concerned, so it is read
//! separately with [`footer_schema`].
//!
//! | Offset | Field            | Description                                  |
//! |--------|------------------|----------------------------------------------|
//! | 0x0000 | `file_id`        | `HM3W`                                       |
//! | 0x0004 | `placeholder`    | i32, unused                                  |
//! | 0x0008 | `name`           | null terminated map name                     |
//! | ...    | `flags`          | i32 map flags                                |
//! | ...    | `players_count`  | i32                                          |
//! | 0x0200 | `mpq`            | The archive, up to the end of the file       |

use std::sync::OnceLock;

use w3_schema::{Document, FieldType, Length, Schema};

use crate::common::{integer, magic, map_flags, string};
use crate::error::Result;

pub const HEADER_MAGIC: &[u8; 4] = b"HM3W";

pub const FOOTER_MAGIC: &[u8; 4] = b"NGIS";

/// Size of the header block, including its zero padding
pub const HEADER_SIZE: u64 = 512;

/// Size of the footer: magic plus authentication data
pub const FOOTER_SIZE: usize = 4 + 256;

fn header() -> FieldType {
    FieldType::padded(
        HEADER_SIZE,
        Schema::new("MapHeader")
            .field("file_id", magic(HEADER_MAGIC))
            .field("placeholder", integer())
            .field("name", string())
            .field("flags", map_flags())
            .field("players_count", integer()),
    )
}

pub fn schema() -> &'static Schema {
    static SCHEMA: OnceLock<Schema> = OnceLock::new();
    SCHEMA.get_or_init(|| {
        Schema::new("MapFile")
            .field("header", header())
            .field("mpq", FieldType::Bytes(Length::Remaining))
    })
}

pub fn footer_schema() -> &'static Schema {
    static SCHEMA: OnceLock<Schema> = OnceLock::new();
    SCHEMA.get_or_init(|| {
        Schema::new("MapFooter")
            .field("sign_id", magic(FOOTER_MAGIC))
            .field("authentication", FieldType::Bytes(Length::Fixed(256)))
    })
}

pub fn decode(bytes: &[u8]) -> Result<Document> {
    Ok(schema().decode(bytes)?)
}

pub fn encode(document: &Document) -> Result<Vec<u8>> {
    Ok(schema().encode(document)?)
}

/// Decode the signature footer at the end of a map, if it has one
pub fn decode_footer(bytes: &[u8]) -> Result<Option<Document>> {
    let Some(start) = bytes.len().checked_sub(FOOTER_SIZE) else {
        return Ok(None);
    };
    let tail = &bytes[start..];
    if !tail.starts_with(FOOTER_MAGIC) {
        return Ok(None);
    }
    Ok(Some(footer_schema().decode(tail)?))
}
