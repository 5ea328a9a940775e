//! Sound definitions (`war3map.w3s`)
//!
//! Unset values use the game defaults: strings are empty, integers are -1 and floats hold the
//! bit pattern `0x4F800000`.

use std::sync::OnceLock;

use w3_schema::{Document, EnumDef, FieldType, IntKind, Schema};

use crate::common::{counted, enumeration, flags, float, integer, string};
use crate::error::Result;

pub const ENTRY: &str = "war3map.w3s";

fn eax_effect() -> FieldType {
    [
        ("UNSET", ""),
        ("DEFAULT", "DefaultEAXON"),
        ("COMBAT", "CombatSoundsEAX"),
        ("DRUM", "KotoDrumsEAX"),
        ("SPELL", "SpellsEAX"),
        ("MISSILE", "MissilesEAX"),
        ("SPEECH", "HeroAcksEAX"),
        ("DOODAD", "DoodadsEAX"),
    ]
    .into_iter()
    .fold(EnumDef::new("EaxEffect", string()), |def, (name, raw)| {
        def.variant(name, raw)
    })
    .into()
}

fn channel() -> FieldType {
    enumeration(
        "SoundChannel",
        integer(),
        &[
            ("UNSET", -1),
            ("GENERAL", 0),
            ("UNIT_SELECTION", 1),
            ("UNIT_ACKNOWLEDGEMENT", 2),
            ("UNIT_MOVEMENT", 3),
            ("UNIT_READY", 4),
            ("COMBAT", 5),
            ("ERROR", 6),
            ("MUSIC", 7),
            ("USER_INTERFACE", 8),
            ("LOOPING_MOVEMENT", 9),
            ("LOOPING_AMBIENT", 10),
            ("ANIMATIONS", 11),
            ("CONSTRUCTIONS", 12),
            ("BIRTH", 13),
            ("FIRE", 14),
        ],
    )
}

fn sound() -> Schema {
    Schema::new("Sound")
        .field("variable", string())
        .field("file_path", string())
        .field("eax_effect", eax_effect())
        .field(
            "flags",
            flags(
                "SoundFlags",
                IntKind::I32,
                &[
                    ("is_looping", 0x01),
                    ("is_3d", 0x02),
                    ("stops_out_of_range", 0x04),
                    ("is_music", 0x08),
                ],
            ),
        )
        .field("fade_in_rate", integer())
        .field("fade_out_rate", integer())
        .field("volume", integer())
        .field("pitch", float())
        .field("unknown_field_1", float())
        .field("unknown_field_2", integer())
        .field("channel", channel())
        .field("distance_min", float())
        .field("distance_max", float())
        .field("distance_cutoff", float())
        .field("unknown_field_3", float())
        .field("unknown_field_4", float())
        .field("unknown_field_5", integer())
        .field("unknown_field_6", float())
        .field("unknown_field_7", float())
        .field("unknown_field_8", float())
}

pub fn schema() -> &'static Schema {
    static SCHEMA: OnceLock<Schema> = OnceLock::new();
    SCHEMA.get_or_init(|| {
        Schema::new("SoundsFile")
            .field("version", integer())
            .field("sounds_count", integer())
            .field("sounds", counted("sounds_count", sound()))
    })
}

pub fn decode(bytes: &[u8]) -> Result<Document> {
    Ok(schema().decode(bytes)?)
}

pub fn encode(document: &Document) -> Result<Vec<u8>> {
    Ok(schema().encode(document)?)
}
