//! Observer shared memory (`War3StatsObserverSharedMemory`)
//!
//! The game publishes live match statistics through a memory mapped file rather than a map entry.
//! Identifiers are stored last character first and names sit in fixed-width, zero padded blocks.
//! Every list is preceded by its count but still occupies a fixed block, so a player always takes
//! 2510604 bytes.

use std::sync::OnceLock;

use w3_schema::{Document, EnumDef, Endian, FieldType, IntKind, Schema};

use crate::common::{byte, counted, enumeration, float, string};
use crate::error::Result;

/// Size of one player record, whatever it holds
pub const PLAYER_SIZE: u64 = 2_510_604;

pub const HERO_SIZE: u64 = 2060;

fn unsigned() -> FieldType {
    FieldType::Int(IntKind::U32, Endian::Little)
}

fn id() -> FieldType {
    FieldType::ReversedId
}

/// A string in a zero padded block of `size` bytes
fn name(size: u64) -> FieldType {
    FieldType::padded(size, string())
}

fn research() -> Schema {
    Schema::new("ObserverPlayerResearch")
        .field("id", id())
        .field("name", name(100))
        .field("progress_percent", unsigned())
        .field(
            "type",
            enumeration("ResearchType", byte(), &[("UPGRADE", 0), ("UNIT", 1)]),
        )
}

fn unit() -> Schema {
    Schema::new("ObserverPlayerUnit")
        .field("id", id())
        .field("name", name(100))
        .field("owning_player_id", unsigned())
        .field("alive_count", unsigned())
        .field("total_count", unsigned())
}

fn upgrade() -> Schema {
    let class = [
        ("NONE", "_"),
        ("ARMOR", "armor"),
        ("ARTILLERY", "artillery"),
        ("MELEE", "melee"),
        ("RANGED", "ranged"),
        ("CASTER", "caster"),
    ]
    .into_iter()
    .fold(EnumDef::new("UpgradeClass", name(100)), |def, (variant, raw)| {
        def.variant(variant, raw)
    });

    Schema::new("ObserverPlayerUpgrade")
        .field("id", id())
        .field("class", class)
        .field("level", unsigned())
        .field("level_max", unsigned())
        .field("unknown_int_1", unsigned())
}

fn building() -> Schema {
    Schema::new("ObserverPlayerBuilding")
        .field("id", id())
        .field("name", name(100))
        .field("progress_percent", unsigned())
        .field("upgrade_progress_percent", unsigned())
}

fn hero() -> FieldType {
    let item = Schema::new("ObserverPlayerHeroItem")
        .field("id", id())
        .field("name", name(100))
        .field("slot", unsigned())
        .field("charges", unsigned());

    // Cooldowns are in seconds.
    let ability = Schema::new("ObserverPlayerHeroAbility")
        .field("id", id())
        .field("name", name(38))
        .field("unknown_flag_1", byte())
        .field("unknown_flag_2", byte())
        .field("cooldown", float())
        .field("level", unsigned());

    FieldType::padded(
        HERO_SIZE,
        Schema::new("ObserverPlayerHero")
            .field("id", id())
            .field("class", name(100))
            .field("level", unsigned())
            .field("experience", unsigned())
            .field("experience_max", unsigned())
            .field("hitpoints", unsigned())
            .field("hitpoints_max", unsigned())
            .field("mana", unsigned())
            .field("mana_max", unsigned())
            .field("abilities_count", unsigned())
            .field(
                "abilities",
                FieldType::padded(1248, counted("abilities_count", ability)),
            )
            .field("items_count", unsigned())
            .field("items", counted("items_count", item)),
    )
}

fn player() -> FieldType {
    let player = Schema::new("ObserverPlayer")
        .field("name", name(36))
        .field(
            "race_preference",
            enumeration(
                "RacePreference",
                byte(),
                &[
                    ("HUMAN", 0x01),
                    ("ORC", 0x02),
                    ("NIGHTELF", 0x04),
                    ("UNDEAD", 0x08),
                    ("DEMON", 0x10),
                    ("RANDOM", 0x20),
                    ("SELECTABLE", 0x40),
                ],
            ),
        )
        .field(
            "race",
            enumeration(
                "Race",
                byte(),
                &[
                    ("UNKNOWN", 0),
                    ("HUMAN", 1),
                    ("ORC", 2),
                    ("UNDEAD", 3),
                    ("NIGHTELF", 4),
                    ("DEMON", 5),
                    ("LAST", 6),
                    ("OTHER", 7),
                    ("CREEP", 8),
                    ("COMMONER", 9),
                    ("CRITTER", 10),
                    ("NAGA", 11),
                ],
            ),
        )
        .field("id", byte())
        .field("team_index", byte())
        .field("team_color", byte())
        .field(
            "type",
            enumeration(
                "SlotType",
                byte(),
                &[
                    ("EMPTY", 0),
                    ("PLAYER", 1),
                    ("COMPUTER", 2),
                    ("NEUTRAL", 3),
                    ("OBSERVER", 4),
                    ("NONE", 5),
                    ("OTHER", 6),
                ],
            ),
        )
        .field("handicap", unsigned())
        .field(
            "game_result",
            enumeration(
                "GameResult",
                byte(),
                &[("VICTORY", 0), ("DEFEAT", 1), ("TIE", 2), ("IN_PROGRESS", 3)],
            ),
        )
        .field(
            "slot_state",
            enumeration(
                "SlotState",
                byte(),
                &[("EMPTY", 0), ("PLAYING", 1), ("LEFT", 2)],
            ),
        )
        .field(
            "ai_difficulty",
            enumeration(
                "AiDifficulty",
                byte(),
                &[("EASY", 0), ("NORMAL", 1), ("INSANE", 2)],
            ),
        )
        .field("apm", unsigned())
        .field("apm_realtime", unsigned())
        .field("gold", unsigned())
        .field("gold_mined", unsigned())
        .field("gold_taxed", unsigned())
        .field("gold_tax", unsigned())
        .field("lumber", unsigned())
        .field("lumber_harvested", unsigned())
        .field("lumber_taxed", unsigned())
        .field("lumber_tax", unsigned())
        .field("food_max", unsigned())
        .field("food", unsigned())
        .field("heroes_count", unsigned())
        .field(
            "heroes",
            FieldType::padded(2_057_940, counted("heroes_count", hero())),
        )
        .field("buildings_on_map_count", unsigned())
        .field(
            "buildings_on_map",
            FieldType::padded(111_888, counted("buildings_on_map_count", building())),
        )
        .field("upgrades_completed_count", unsigned())
        .field(
            "upgrades_completed",
            FieldType::padded(115_884, counted("upgrades_completed_count", upgrade())),
        )
        // Includes heroes and corpses.
        .field("units_on_map_count", unsigned())
        .field(
            "units_on_map",
            FieldType::padded(115_884, counted("units_on_map_count", unit())),
        )
        // Includes units in training.
        .field("researches_in_progress_count", unsigned())
        .field(
            "researches_in_progress",
            FieldType::padded(
                108_891,
                counted("researches_in_progress_count", research()),
            ),
        );

    FieldType::padded(PLAYER_SIZE, player)
}

pub fn schema() -> &'static Schema {
    static SCHEMA: OnceLock<Schema> = OnceLock::new();
    SCHEMA.get_or_init(|| {
        // Game time is in milliseconds.
        let game = Schema::new("ObserverGame")
            .field(
                "is_in_game",
                FieldType::Bool {
                    repr: IntKind::U8,
                    endian: Endian::Little,
                    false_value: 0,
                    true_value: 1,
                },
            )
            .field("game_time", unsigned())
            .field("players_count", byte())
            .field("game_name", name(256))
            .field("map_name", name(256));

        Schema::new("ObserverFile")
            .field("version", unsigned())
            .field("refresh_rate", unsigned())
            .field("game", game)
            .field("players", counted("game.players_count", player()))
    })
}

pub fn decode(bytes: &[u8]) -> Result<Document> {
    Ok(schema().decode(bytes)?)
}

pub fn encode(document: &Document) -> Result<Vec<u8>> {
    Ok(schema().encode(document)?)
}
