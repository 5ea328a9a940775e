//! Units and items placed on the map (`war3mapUnits.doo`)
//!
//! Shares its magic and file extension with [`crate::doodads`] but not its layout. Units whose
//! id is one of the random placeholders (`uDNR`, `bDNR`, `iDNR`) carry a description of how the
//! game picks the actual unit; every other unit stores the pair `0, 1` in its place.

use std::sync::OnceLock;

use w3_schema::{Document, FieldType, Key, Ref, Schema, Scope, Switch};

use crate::common::{byte, counted, enumeration, fixed, float, id, integer, item_set, magic};
use crate::doodads::visibility;
use crate::error::Result;

pub const ENTRY: &str = "war3mapUnits.doo";

/// Placeholder ids for randomly chosen units, buildings and items
pub const RANDOM_IDS: [[u8; 4]; 3] = [*b"uDNR", *b"bDNR", *b"iDNR"];

fn is_random(scope: &Scope<'_>) -> w3_schema::Result<bool> {
    let unit_id = scope.resolve(&Ref::new("unit_id"))?;
    Ok(unit_id
        .as_id()
        .is_some_and(|unit_id| RANDOM_IDS.contains(&unit_id)))
}

fn random_unit() -> Schema {
    let item_class = enumeration(
        "RandomItemClass",
        byte(),
        &[
            ("ANY_CLASS", 0),
            ("PERMANENT", 1),
            ("CHARGED", 2),
            ("POWER_UP", 3),
            ("ARTIFACT", 4),
            ("PURCHASABLE", 5),
            ("CAMPAIGN", 6),
            ("MISCELLANEOUS", 7),
        ],
    );

    Schema::new("RandomUnit")
        .field(
            "type",
            enumeration(
                "RandomUnitType",
                integer(),
                &[("ANY", 0), ("FROM_MAP_TABLE", 1), ("FROM_CUSTOM_TABLE", 2)],
            ),
        )
        .field(
            "properties",
            Switch::new("type")
                .case(
                    Key::Name("ANY".into()),
                    // A level byte of 0xFF means any level.
                    Schema::new("AnyRandomUnit")
                        .field("level", fixed(3, byte()))
                        .field("item_class", item_class),
                )
                .case(
                    Key::Name("FROM_MAP_TABLE".into()),
                    Schema::new("MapTableRandomUnit")
                        .field("table_index", integer())
                        .field("position_index", integer()),
                )
                .case(
                    Key::Name("FROM_CUSTOM_TABLE".into()),
                    Schema::new("CustomTableRandomUnit")
                        .field("units_count", integer())
                        .field(
                            "units",
                            counted(
                                "units_count",
                                Schema::new("RandomUnitChance")
                                    .field("unit_id", id())
                                    .field("chance_percent", integer()),
                            ),
                        ),
                ),
        )
}

fn unit() -> Schema {
    Schema::new("UnitDoodad")
        .field("unit_id", id())
        .field("variation", integer())
        .field("pos_x", float())
        .field("pos_y", float())
        .field("pos_z", float())
        .field("rotation", float())
        .field("scale_x", float())
        .field("scale_y", float())
        .field("scale_z", float())
        .field("visibility", visibility())
        .field("owner_player_id", integer())
        .field("unknown_property_1", byte())
        .field("unknown_property_2", byte())
        .field("hitpoints", integer())
        .field("manapoints", integer())
        .field("dropped_item_table_index", integer())
        .field("dropped_item_sets_count", integer())
        .field("dropped_item_sets", counted("dropped_item_sets_count", item_set()))
        .field("gold", integer())
        // -1 for normal, -2 for camp
        .field("target_acquisition_range", float())
        .field("hero_level", integer())
        .field("hero_strength", integer())
        .field("hero_agility", integer())
        .field("hero_intelligence", integer())
        .field("inventory_items_count", integer())
        .field(
            "inventory_items",
            counted(
                "inventory_items_count",
                Schema::new("InventoryItem")
                    .field("slot_index", integer())
                    .field("item_id", id()),
            ),
        )
        .field("ability_modifications_count", integer())
        .field(
            "ability_modifications",
            counted(
                "ability_modifications_count",
                Schema::new("AbilityModification")
                    .field("ability_id", id())
                    .field("is_active", integer())
                    .field("level", integer()),
            ),
        )
        .field(
            "random_unit",
            FieldType::conditional(
                is_random,
                random_unit(),
                FieldType::Sequence(vec![
                    FieldType::constant(integer(), 0),
                    FieldType::constant(integer(), 1),
                ]),
            ),
        )
        .field("waygate_custom_team_color", integer())
        .field("waygate_destination_region_index", integer())
        .field("index", integer())
}

pub fn schema() -> &'static Schema {
    static SCHEMA: OnceLock<Schema> = OnceLock::new();
    SCHEMA.get_or_init(|| {
        Schema::new("UnitDoodadsFile")
            .field("file_id", magic(crate::doodads::MAGIC))
            .field("version", integer())
            .field("subversion", integer())
            .field("units_count", integer())
            .field("units", counted("units_count", unit()))
    })
}

pub fn decode(bytes: &[u8]) -> Result<Document> {
    Ok(schema().decode(bytes)?)
}

pub fn encode(document: &Document) -> Result<Vec<u8>> {
    Ok(schema().encode(document)?)
}
