//! Terrain (`war3map.w3e`)
//!
//! A grid of tile points, `tile_map_width * tile_map_height` of them, each holding heights and a
//! three byte packed unit. The packed unit is read most significant bits first:
//!
//! | Bits  | Field                 |
//! |-------|-----------------------|
//! | 23-20 | `flags`               |
//! | 19-16 | `ground_texture_type` |
//! | 15-8  | `texture_details`     |
//! | 7-4   | `cliff_texture_type`  |
//! | 3-0   | `layer_height`        |

use std::sync::OnceLock;

use w3_schema::{BitOrder, BitPack, Document, Endian, FieldType, FlagsDef, IntKind, Length, Schema};

use crate::common::{counted, float, id, integer, magic, short, tileset};
use crate::error::Result;

pub const ENTRY: &str = "war3map.w3e";

pub const MAGIC: &[u8; 4] = b"W3E!";

/// Layout of the packed part of a tile point
pub fn tile_bits() -> BitPack {
    BitPack::new(3, BitOrder::MsbFirst)
        .flags(
            "flags",
            4,
            FlagsDef::new("TileFlags", IntKind::U8, Endian::Little)
                .flag("ramps", 0x1)
                .flag("use_blight_default", 0x2)
                .flag("water_enabled", 0x4)
                .flag("boundary_flag_second", 0x8),
        )
        .field("ground_texture_type", 4)
        .field("texture_details", 8)
        .field("cliff_texture_type", 4)
        .field("layer_height", 4)
}

fn tile_point() -> Schema {
    Schema::new("TilePoint")
        .field("ground_height", short())
        // The 0x4000 bit doubles as the first boundary flag.
        .field("water_level", short())
        .field("packed", tile_bits())
}

pub fn schema() -> &'static Schema {
    static SCHEMA: OnceLock<Schema> = OnceLock::new();
    SCHEMA.get_or_init(|| {
        Schema::new("TileMapFile")
            .field("file_id", magic(MAGIC))
            .field("version", integer())
            .field("tileset_id", tileset())
            .field("custom_tilesets", integer())
            .field("ground_tileset_ids_count", integer())
            .field("ground_tileset_ids", counted("ground_tileset_ids_count", id()))
            .field("cliff_tileset_ids_count", integer())
            .field("cliff_tileset_ids", counted("cliff_tileset_ids_count", id()))
            .field("tile_map_width", integer())
            .field("tile_map_height", integer())
            .field("tile_map_center_offset_x", float())
            .field("tile_map_center_offset_y", float())
            .field(
                "tile_map",
                FieldType::array(
                    Length::product("tile_map_width", "tile_map_height"),
                    tile_point(),
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
