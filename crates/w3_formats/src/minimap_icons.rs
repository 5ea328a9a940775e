//! Minimap icons (`war3map.mmp`)
//!

use std::sync::OnceLock;

use w3_schema::{Document, Schema};

use crate::common::{byte, counted, enumeration, integer};
use crate::error::Result;

pub const ENTRY: &str = "war3map.mmp";

pub fn schema() -> &'static Schema {
    static SCHEMA: OnceLock<Schema> = OnceLock::new();
    SCHEMA.get_or_init(|| {
        let icon = Schema::new("MinimapIcon")
            .field(
                "type",
                enumeration(
                    "MinimapIconType",
                    integer(),
                    &[("GOLDMINE", 0), ("SHOP", 1), ("PLAYER", 2)],
                ),
            )
            // 16 to 240
            .field("coord_x", integer())
            .field("coord_y", integer())
            .field(
                "color",
                Schema::new("IconColor")
                    .field("b", byte())
                    .field("g", byte())
                    .field("r", byte())
                    .field("a", byte()),
            );

        Schema::new("MinimapIconsFile")
            .field("version", integer())
            .field("icons_count", integer())
            .field("icons", counted("icons_count", icon))
    })
}

pub fn decode(bytes: &[u8]) -> Result<Document> {
    Ok(schema().decode(bytes)?)
}

pub fn encode(document: &Document) -> Result<Vec<u8>> {
    Ok(schema().encode(document)?)
}
