//! Regions (`war3map.w3r`)
//!

use std::sync::OnceLock;

use w3_schema::{Document, FieldType, Schema};

use crate::common::{byte, counted, float, id, integer, string};
use crate::error::Result;

pub const ENTRY: &str = "war3map.w3r";

fn region() -> Schema {
    Schema::new("Region")
        .field("left", float())
        .field("right", float())
        .field("bottom", float())
        .field("top", float())
        .field("name", string())
        .field("index", integer())
        .field("weather_effect_id", id())
        // a sound variable from the sounds file
        .field("ambient_sound_variable", string())
        .field(
            "color",
            FieldType::padded(
                4,
                Schema::new("RegionColor")
                    .field("b", byte())
                    .field("g", byte())
                    .field("r", byte()),
            ),
        )
}

pub fn schema() -> &'static Schema {
    static SCHEMA: OnceLock<Schema> = OnceLock::new();
    SCHEMA.get_or_init(|| {
        Schema::new("RegionsFile")
            .field("version", integer())
            .field("regions_count", integer())
            .field("regions", counted("regions_count", region()))
    })
}

pub fn decode(bytes: &[u8]) -> Result<Document> {
    Ok(schema().decode(bytes)?)
}

pub fn encode(document: &Document) -> Result<Vec<u8>> {
    Ok(schema().encode(document)?)
}
