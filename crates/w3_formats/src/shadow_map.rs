//! Shadows (`war3map.shd`)
//!
//! One byte per shadow cell, `0x00` for no shadow and `0xFF` for shadow. The file should hold
//! `16 * width * height` cells of the tile map but carries no size of its own, so cells are read
//! until the end of the input. Any other byte value is rejected rather than normalized, which
//! keeps encoding exact.

use std::sync::OnceLock;

use w3_schema::{Document, Endian, FieldType, IntKind, Schema};

use crate::error::Result;

pub const ENTRY: &str = "war3map.shd";

pub fn schema() -> &'static Schema {
    static SCHEMA: OnceLock<Schema> = OnceLock::new();
    SCHEMA.get_or_init(|| {
        Schema::new("ShadowMapFile").field(
            "shadow_map",
            FieldType::greedy(FieldType::Bool {
                repr: IntKind::U8,
                endian: Endian::Little,
                false_value: 0x00,
                true_value: 0xFF,
            }),
        )
    })
}

pub fn decode(bytes: &[u8]) -> Result<Document> {
    Ok(schema().decode(bytes)?)
}

pub fn encode(document: &Document) -> Result<Vec<u8>> {
    Ok(schema().encode(document)?)
}
