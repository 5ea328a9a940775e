//! Field types shared by several formats
//!

use std::sync::{Arc, OnceLock};

use w3_schema::{Endian, EnumDef, FieldType, FlagsDef, IntKind, Length, Schema};

/// Number of player slots covered by a player flag set
pub const PLAYER_SLOTS: u32 = 24;

pub fn integer() -> FieldType {
    FieldType::Int(IntKind::I32, Endian::Little)
}

pub fn short() -> FieldType {
    FieldType::Int(IntKind::I16, Endian::Little)
}

pub fn byte() -> FieldType {
    FieldType::Int(IntKind::U8, Endian::Little)
}

pub fn float() -> FieldType {
    FieldType::Float(Endian::Little)
}

pub fn string() -> FieldType {
    FieldType::CString
}

/// A four character identifier such as `hfoo`
pub fn id() -> FieldType {
    FieldType::Id
}

pub fn magic(bytes: &[u8; 4]) -> FieldType {
    FieldType::magic(bytes)
}

/// An array counted by an earlier field of the same struct
pub fn counted(count_field: &str, element: impl Into<FieldType>) -> FieldType {
    FieldType::array(Length::field(count_field), element)
}

pub fn fixed(count: u64, element: impl Into<FieldType>) -> FieldType {
    FieldType::array(Length::Fixed(count), element)
}

/// An enum over `repr` from a table of names and raw values
pub fn enumeration(name: &str, repr: FieldType, variants: &[(&str, i64)]) -> FieldType {
    variants
        .iter()
        .fold(EnumDef::new(name, repr), |def, (variant, raw)| {
            def.variant(*variant, *raw)
        })
        .into()
}

pub fn flags(name: &str, repr: IntKind, masks: &[(&str, u64)]) -> FieldType {
    masks
        .iter()
        .fold(FlagsDef::new(name, repr, Endian::Little), |def, (flag, mask)| {
            def.flag(*flag, *mask)
        })
        .into()
}

pub fn color() -> FieldType {
    Schema::new("Color")
        .field("r", byte())
        .field("g", byte())
        .field("b", byte())
        .field("a", byte())
        .into()
}

pub fn map_flags() -> FieldType {
    flags(
        "MapFlags",
        IntKind::I32,
        &[
            ("preview_screen_hide_minimap", 0x0001),
            ("modify_ally_priorities", 0x0002),
            ("is_melee_map", 0x0004),
            ("is_large_map", 0x0008),
            ("masked_area_partially_visible", 0x0010),
            ("fixed_player_settings_custom_forces", 0x0020),
            ("use_custom_forces", 0x0040),
            ("use_custom_techtree", 0x0080),
            ("use_custom_abilities", 0x0100),
            ("use_custom_upgrades", 0x0200),
            ("map_properties_menu_first_open", 0x0400),
            ("cliff_shores_show_water_waves", 0x0800),
            ("rolling_shores_show_water_waves", 0x1000),
            ("use_terrain_fog", 0x2000),
            ("unknown_flag_1", 0x4000),
            ("use_item_classification_system", 0x8000),
        ],
    )
}

/// Tilesets, stored as the letter the game uses for them
pub fn tileset() -> FieldType {
    enumeration(
        "Tileset",
        byte(),
        &[
            ("ASHENVALE", b'A'.into()),
            ("BARRENS", b'B'.into()),
            ("FELWOOD", b'C'.into()),
            ("DUNGEON", b'D'.into()),
            ("LORDAERONFALL", b'F'.into()),
            ("UNDERGROUND", b'G'.into()),
            ("LORDAERONSUMMER", b'L'.into()),
            ("NORTHREND", b'N'.into()),
            ("VILLAGEFALL", b'Q'.into()),
            ("VILLAGE", b'V'.into()),
            ("LORDAERONWINTER", b'W'.into()),
            ("DALARAN", b'X'.into()),
            ("CITYSCAPE", b'Y'.into()),
            ("SUNKENRUINS", b'Z'.into()),
            ("ICECROWN", b'I'.into()),
            ("DALARANRUINS", b'J'.into()),
            ("OUTLAND", b'O'.into()),
            ("BLACKCITADEL", b'K'.into()),
        ],
    )
}

/// One flag per player slot, `player_0` through `player_23`
pub fn player_flags() -> FieldType {
    static PLAYER_FLAGS: OnceLock<Arc<FlagsDef>> = OnceLock::new();
    FieldType::Flags(
        PLAYER_FLAGS
            .get_or_init(|| {
                Arc::new((0..PLAYER_SLOTS).fold(
                    FlagsDef::new("PlayerFlags", IntKind::I32, Endian::Little),
                    |def, slot| def.flag(format!("player_{slot}"), 1 << slot),
                ))
            })
            .clone(),
    )
}

/// Item sets dropped by a unit or destructible when it dies
pub fn item_set() -> Schema {
    Schema::new("ItemSet").field("items_count", integer()).field(
        "items",
        counted(
            "items_count",
            Schema::new("ItemChance")
                .field("item_id", id())
                .field("chance_percent", integer()),
        ),
    )
}
