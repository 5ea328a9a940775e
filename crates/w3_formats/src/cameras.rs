//! Cameras (`war3map.w3c`)
//!

use std::sync::OnceLock;

use w3_schema::{Document, Schema};

use crate::common::{counted, float, integer, string};
use crate::error::Result;

pub const ENTRY: &str = "war3map.w3c";

pub fn schema() -> &'static Schema {
    static SCHEMA: OnceLock<Schema> = OnceLock::new();
    SCHEMA.get_or_init(|| {
        // Angles are in degrees.
        let camera = Schema::new("Camera")
            .field("target_x", float())
            .field("target_y", float())
            .field("offset_z", float())
            .field("rotation", float())
            .field("angle_of_attack", float())
            .field("distance", float())
            .field("roll", float())
            .field("field_of_view", float())
            .field("far_clipping", float())
            .field("unknown_field_1", float())
            .field("name", string());

        Schema::new("CamerasFile")
            .field("version", integer())
            .field("cameras_count", integer())
            .field("cameras", counted("cameras_count", camera))
    })
}

pub fn decode(bytes: &[u8]) -> Result<Document> {
    Ok(schema().decode(bytes)?)
}

pub fn encode(document: &Document) -> Result<Vec<u8>> {
    Ok(schema().encode(document)?)
}
