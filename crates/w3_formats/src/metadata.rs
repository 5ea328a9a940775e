//! Map information (`war3map.w3i`)
//!
//! Everything shown in the lobby before a game starts, plus the players, forces and the random
//! unit and item tables other formats refer to by index.

use std::sync::OnceLock;

use w3_schema::{Document, FieldType, IntKind, Length, Schema};

use crate::common::{
    color, counted, enumeration, fixed, flags, float, id, integer, map_flags, player_flags,
    string, tileset,
};
use crate::error::Result;

pub const ENTRY: &str = "war3map.w3i";

fn player() -> Schema {
    Schema::new("Player")
        .field("id", integer())
        .field(
            "type",
            enumeration(
                "PlayerType",
                integer(),
                &[("USER", 1), ("COMPUTER", 2), ("NEUTRAL", 3), ("RESCUABLE", 4)],
            ),
        )
        .field(
            "race",
            enumeration(
                "PlayerRace",
                integer(),
                &[("HUMAN", 1), ("ORC", 2), ("UNDEAD", 3), ("NIGHTELF", 4)],
            ),
        )
        .field("fixed_start_position", integer())
        .field("name", string())
        .field("start_position_x", float())
        .field("start_position_y", float())
        .field("ally_low_priority_flags", player_flags())
        .field("ally_high_priority_flags", player_flags())
}

fn force() -> Schema {
    Schema::new("Force")
        .field(
            "flags",
            flags(
                "ForceFlags",
                IntKind::I32,
                &[
                    ("allied", 0x01),
                    ("allied_victory", 0x02),
                    ("share_vision", 0x04),
                    ("share_unit_control", 0x10),
                    ("share_advanced_unit_control", 0x20),
                ],
            ),
        )
        .field("player_mask_flags", player_flags())
        .field("name", string())
}

fn random_unit_table() -> Schema {
    let position = enumeration(
        "RandomUnitPosition",
        integer(),
        &[("UNITS", 0), ("BUILDINGS", 1), ("ITEMS", 2)],
    );

    // One id per position; ids may be random ids as described for unit doodads.
    let unit = Schema::new("RandomUnitRow")
        .field("chance_percent", integer())
        .field(
            "unit_ids",
            FieldType::Bytes(Length::scaled("_.positions_count", 4)),
        );

    Schema::new("RandomUnitTable")
        .field("index", integer())
        .field("name", string())
        .field("positions_count", integer())
        .field("positions", counted("positions_count", position))
        .field("units_count", integer())
        .field("units", counted("units_count", unit))
}

fn random_item_table() -> Schema {
    let item = Schema::new("RandomItemChance")
        .field("chance_percent", integer())
        .field("item_id", id());

    let set = Schema::new("RandomItemSet")
        .field("items_count", integer())
        .field("items", counted("items_count", item));

    Schema::new("RandomItemTable")
        .field("index", integer())
        .field("name", string())
        .field("sets_count", integer())
        .field("sets", counted("sets_count", set))
}

pub fn schema() -> &'static Schema {
    static SCHEMA: OnceLock<Schema> = OnceLock::new();
    SCHEMA.get_or_init(|| {
        let upgrade_change = Schema::new("UpgradeAvailabilityChange")
            .field("flags", player_flags())
            .field("upgrade_id", id())
            .field("level_changed", integer())
            .field("availability", integer());

        let tech_change = Schema::new("TechAvailabilityChange")
            .field("flags", player_flags())
            .field("tech_id", id());

        Schema::new("MetadataFile")
            .field("version", integer())
            .field("number_of_saves", integer())
            .field("editor_version", integer())
            .field("name", string())
            .field("author", string())
            .field("description", string())
            .field("recommended_players", string())
            .field("camera_bounds", fixed(8, float()))
            .field("camera_bounds_padding", fixed(4, integer()))
            .field("playable_area_width", integer())
            .field("playable_area_height", integer())
            .field("flags", map_flags())
            .field("ground_type_tileset_id", tileset())
            .field("loading_screen_preset_index", integer())
            .field("loading_screen_custom_path", string())
            .field("loading_screen_text", string())
            .field("loading_screen_title", string())
            .field("loading_screen_subtitle", string())
            .field("game_data_set_index", integer())
            .field("prologue_screen_path", string())
            .field("prologue_screen_text", string())
            .field("prologue_screen_title", string())
            .field("prologue_screen_subtitle", string())
            .field("terrain_fog_style", integer())
            .field("terrain_fog_start_z", float())
            .field("terrain_fog_end_z", float())
            .field("terrain_fog_density", float())
            .field("terrain_fog_color", color())
            .field("global_weather_id", id())
            .field("custom_sound_environment", string())
            .field("custom_light_environment_tileset_id", tileset())
            .field("water_color", color())
            .field("players_count", integer())
            .field("players", counted("players_count", player()))
            .field("forces_count", integer())
            .field("forces", counted("forces_count", force()))
            .field("upgrade_availability_changes_count", integer())
            .field(
                "upgrade_availability_changes",
                counted("upgrade_availability_changes_count", upgrade_change),
            )
            .field("tech_availability_changes_count", integer())
            .field(
                "tech_availability_changes",
                counted("tech_availability_changes_count", tech_change),
            )
            .field("random_unit_tables_count", integer())
            .field(
                "random_unit_tables",
                counted("random_unit_tables_count", random_unit_table()),
            )
            .field("random_item_tables_count", integer())
            .field(
                "random_item_tables",
                counted("random_item_tables_count", random_item_table()),
            )
    })
}

pub fn decode(bytes: &[u8]) -> Result<Document> {
    Ok(schema().decode(bytes)?)
}

pub fn encode(document: &Document) -> Result<Vec<u8>> {
    Ok(schema().encode(document)?)
}
