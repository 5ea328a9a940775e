//! Doodads (`war3map.doo`)
//!
//! Trees, destructibles and other doodads placed on the map, followed by the special doodads
//! that are edited with the terrain palette.
//!
//! | Field                    | Type                                  |
//! |--------------------------|---------------------------------------|
//! | `file_id`                | `W3do`                                |
//! | `version`                | i32, 8 for current maps               |
//! | `subversion`             | i32                                   |
//! | `doodads_count`          | i32                                   |
//! | `doodads`                | `Doodad[doodads_count]`               |
//! | `terrain_doodads_version`| i32                                   |
//! | `terrain_doodads_count`  | i32                                   |
//! | `terrain_doodads`        | `TerrainDoodad[terrain_doodads_count]`|

use std::sync::OnceLock;

use w3_schema::{Document, FieldType, Schema};

use crate::common::{byte, counted, enumeration, float, id, integer, item_set, magic};
use crate::error::Result;

pub const ENTRY: &str = "war3map.doo";

pub const MAGIC: &[u8; 4] = b"W3do";

/// Visibility and solidity of a placed doodad
pub fn visibility() -> FieldType {
    enumeration(
        "DoodadVisibility",
        byte(),
        &[
            ("INVISIBLE_NONSOLID", 0),
            ("VISIBLE_NONSOLID", 1),
            ("VISIBLE_SOLID", 2),
            ("OUT_OF_BOUNDS", 3),
        ],
    )
}

fn doodad() -> Schema {
    Schema::new("Doodad")
        .field("doodad_id", id())
        .field("variation", integer())
        .field("pos_x", float())
        .field("pos_y", float())
        .field("pos_z", float())
        // radians
        .field("rotation", float())
        .field("scale_x", float())
        .field("scale_y", float())
        .field("scale_z", float())
        .field("visibility", visibility())
        .field("life_percent", byte())
        .field("dropped_item_table_index", integer())
        .field("dropped_item_sets_count", integer())
        .field("dropped_item_sets", counted("dropped_item_sets_count", item_set()))
        .field("index", integer())
}

fn terrain_doodad() -> Schema {
    Schema::new("TerrainDoodad")
        .field("doodad_id", id())
        .field("pos_z", integer())
        .field("pos_x", integer())
        .field("pos_y", integer())
}

pub fn schema() -> &'static Schema {
    static SCHEMA: OnceLock<Schema> = OnceLock::new();
    SCHEMA.get_or_init(|| {
        Schema::new("DoodadsFile")
            .field("file_id", magic(MAGIC))
            .field("version", integer())
            .field("subversion", integer())
            .field("doodads_count", integer())
            .field("doodads", counted("doodads_count", doodad()))
            .field("terrain_doodads_version", integer())
            .field("terrain_doodads_count", integer())
            .field("terrain_doodads", counted("terrain_doodads_count", terrain_doodad()))
    })
}

pub fn decode(bytes: &[u8]) -> Result<Document> {
    Ok(schema().decode(bytes)?)
}

pub fn encode(document: &Document) -> Result<Vec<u8>> {
    Ok(schema().encode(document)?)
}
