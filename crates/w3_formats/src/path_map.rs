//! Pathing (`war3map.wpm`)
//!

use std::sync::OnceLock;

use w3_schema::{Document, FieldType, IntKind, Length, Schema};

use crate::common::{flags, integer, magic};
use crate::error::Result;

pub const ENTRY: &str = "war3map.wpm";

pub const MAGIC: &[u8; 4] = b"MP3W";

pub fn schema() -> &'static Schema {
    static SCHEMA: OnceLock<Schema> = OnceLock::new();
    SCHEMA.get_or_init(|| {
        let header = Schema::new("PathMapHeader")
            .field("file_id", magic(MAGIC))
            .field("version", integer())
            .field("path_map_width", integer())
            .field("path_map_height", integer());

        let point = flags(
            "PathPoint",
            IntKind::U8,
            &[
                ("can_walk", 0x02),
                ("can_fly", 0x04),
                ("can_build", 0x08),
                ("is_blight", 0x20),
                // or water
                ("is_ground", 0x40),
                ("is_unknown", 0x80),
            ],
        );

        Schema::new("PathMapFile").field("header", header).field(
            "data",
            FieldType::array(
                Length::product("header.path_map_width", "header.path_map_height"),
                point,
            ),
        )
    })
}

pub fn decode(bytes: &[u8]) -> Result<Document> {
    Ok(schema().decode(bytes)?)
}

pub fn encode(document: &Document) -> Result<Vec<u8>> {
    Ok(schema().encode(document)?)
}
