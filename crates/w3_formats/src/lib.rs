//! # Warcraft III map formats
//!
//! Schemas for the binary files stored inside a Warcraft III map, expressed as data against
//! [`w3_schema`]. Every module exposes the `schema()` of its format, built once, along with
//! `decode` and `encode` helpers.
//!
//! | Entry                     | Module                | Magic  |
//! |---------------------------|-----------------------|--------|
//! | `war3map.doo`             | [`doodads`]           | `W3do` |
//! | `war3mapUnits.doo`        | [`unit_doodads`]      | `W3do` |
//! | `war3map.w3e`             | [`tile_map`]          | `W3E!` |
//! | `war3map.wpm`             | [`path_map`]          | `MP3W` |
//! | `war3map.shd`             | [`shadow_map`]        |        |
//! | `war3map.w3u/w3t/w3b/w3h` | [`objects`]           |        |
//! | `war3map.w3d/w3a/w3q`     | [`objects`]           |        |
//! | `war3map.wtg`             | [`triggers`]          | `WTG!` |
//! | `war3map.wct`             | [`custom_triggers`]   |        |
//! | `war3map.w3s`             | [`sounds`]            |        |
//! | `war3map.w3r`             | [`regions`]           |        |
//! | `war3map.w3c`             | [`cameras`]           |        |
//! | `war3map.w3i`             | [`metadata`]          |        |
//! | `war3map.mmp`             | [`minimap_icons`]     |        |
//! | `war3map.imp`             | [`imports`]           |        |
//! | the map file itself       | [`map`]               | `HM3W` |
//! | observer shared memory    | [`observer`]          |        |
//!
//! Integers are 4 byte little-endian signed values, floats are 4 byte little-endian IEEE-754 and
//! strings are null terminated UTF-8 unless a schema says otherwise. Enum values outside their
//! known set decode to an unrecognized sentinel that keeps the raw value and encodes back
//! unchanged. The shadow map is the one closed format: its cells must be `0x00` or `0xFF`.
//!
//! ```
//! use w3_formats::doodads;
//!
//! let mut bytes = b"W3do".to_vec();
//! for value in [8i32, 0, 0, 0, 0] {
//!     bytes.extend(value.to_le_bytes());
//! }
//!
//! let document = doodads::decode(&bytes).unwrap();
//! assert_eq!(doodads::encode(&document).unwrap(), bytes);
//! ```
//!

use std::fmt;
use std::str::FromStr;

use w3_schema::{CodecOptions, Document, Schema};

pub mod archive;
pub mod cameras;
pub mod common;
pub mod custom_triggers;
pub mod doodads;
pub mod error;
pub mod imports;
pub mod map;
pub mod metadata;
pub mod minimap_icons;
pub mod objects;
pub mod observer;
pub mod path_map;
pub mod regions;
pub mod shadow_map;
pub mod sounds;
pub mod tile_map;
pub mod triggers;
pub mod unit_doodads;

pub use archive::{read_document, DirectoryArchive, MapArchive, MemoryArchive};
pub use error::{Error, Result};

/// Every file format this crate knows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    Doodads,
    UnitDoodads,
    TileMap,
    PathMap,
    ShadowMap,
    UnitObjects,
    ItemObjects,
    DestructableObjects,
    BuffObjects,
    DoodadObjects,
    AbilityObjects,
    UpgradeObjects,
    Triggers,
    CustomTriggers,
    Sounds,
    Regions,
    Cameras,
    Metadata,
    MinimapIcons,
    Imports,
    Map,
    MapFooter,
    Observer,
}

impl Format {
    pub const ALL: [Format; 23] = [
        Format::Doodads,
        Format::UnitDoodads,
        Format::TileMap,
        Format::PathMap,
        Format::ShadowMap,
        Format::UnitObjects,
        Format::ItemObjects,
        Format::DestructableObjects,
        Format::BuffObjects,
        Format::DoodadObjects,
        Format::AbilityObjects,
        Format::UpgradeObjects,
        Format::Triggers,
        Format::CustomTriggers,
        Format::Sounds,
        Format::Regions,
        Format::Cameras,
        Format::Metadata,
        Format::MinimapIcons,
        Format::Imports,
        Format::Map,
        Format::MapFooter,
        Format::Observer,
    ];

    /// Short name used on the command line
    pub const fn name(self) -> &'static str {
        match self {
            Format::Doodads => "doodads",
            Format::UnitDoodads => "unit-doodads",
            Format::TileMap => "tile-map",
            Format::PathMap => "path-map",
            Format::ShadowMap => "shadow-map",
            Format::UnitObjects => "unit-objects",
            Format::ItemObjects => "item-objects",
            Format::DestructableObjects => "destructable-objects",
            Format::BuffObjects => "buff-objects",
            Format::DoodadObjects => "doodad-objects",
            Format::AbilityObjects => "ability-objects",
            Format::UpgradeObjects => "upgrade-objects",
            Format::Triggers => "triggers",
            Format::CustomTriggers => "custom-triggers",
            Format::Sounds => "sounds",
            Format::Regions => "regions",
            Format::Cameras => "cameras",
            Format::Metadata => "metadata",
            Format::MinimapIcons => "minimap-icons",
            Format::Imports => "imports",
            Format::Map => "map",
            Format::MapFooter => "map-footer",
            Format::Observer => "observer",
        }
    }

    /// Name of the archive entry the format is stored under
    ///
    /// The map container, its footer and the observer file are not entries of a map.
    pub const fn entry(self) -> Option<&'static str> {
        Some(match self {
            Format::Doodads => doodads::ENTRY,
            Format::UnitDoodads => unit_doodads::ENTRY,
            Format::TileMap => tile_map::ENTRY,
            Format::PathMap => path_map::ENTRY,
            Format::ShadowMap => shadow_map::ENTRY,
            Format::UnitObjects => objects::UNITS_ENTRY,
            Format::ItemObjects => objects::ITEMS_ENTRY,
            Format::DestructableObjects => objects::DESTRUCTABLES_ENTRY,
            Format::BuffObjects => objects::BUFFS_ENTRY,
            Format::DoodadObjects => objects::DOODADS_ENTRY,
            Format::AbilityObjects => objects::ABILITIES_ENTRY,
            Format::UpgradeObjects => objects::UPGRADES_ENTRY,
            Format::Triggers => triggers::ENTRY,
            Format::CustomTriggers => custom_triggers::ENTRY,
            Format::Sounds => sounds::ENTRY,
            Format::Regions => regions::ENTRY,
            Format::Cameras => cameras::ENTRY,
            Format::Metadata => metadata::ENTRY,
            Format::MinimapIcons => minimap_icons::ENTRY,
            Format::Imports => imports::ENTRY,
            Format::Map | Format::MapFooter | Format::Observer => return None,
        })
    }

    /// Find the format stored under an entry name, ignoring case
    pub fn from_entry(name: &str) -> Option<Format> {
        Format::ALL.iter().copied().find(|format| {
            format
                .entry()
                .is_some_and(|entry| entry.eq_ignore_ascii_case(name))
        })
    }

    pub fn schema(self) -> &'static Schema {
        match self {
            Format::Doodads => doodads::schema(),
            Format::UnitDoodads => unit_doodads::schema(),
            Format::TileMap => tile_map::schema(),
            Format::PathMap => path_map::schema(),
            Format::ShadowMap => shadow_map::schema(),
            Format::UnitObjects
            | Format::ItemObjects
            | Format::DestructableObjects
            | Format::BuffObjects => objects::schema(),
            Format::DoodadObjects | Format::AbilityObjects | Format::UpgradeObjects => {
                objects::variations_schema()
            }
            Format::Triggers => triggers::schema(),
            Format::CustomTriggers => custom_triggers::schema(),
            Format::Sounds => sounds::schema(),
            Format::Regions => regions::schema(),
            Format::Cameras => cameras::schema(),
            Format::Metadata => metadata::schema(),
            Format::MinimapIcons => minimap_icons::schema(),
            Format::Imports => imports::schema(),
            Format::Map => map::schema(),
            Format::MapFooter => map::footer_schema(),
            Format::Observer => observer::schema(),
        }
    }

    pub fn decode_with(self, bytes: &[u8], options: &CodecOptions) -> Result<Document> {
        Ok(self.schema().decode_with(bytes, options)?)
    }

    pub fn encode_with(self, document: &Document, options: &CodecOptions) -> Result<Vec<u8>> {
        Ok(self.schema().encode_with(document, options)?)
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Format {
    type Err = Error;

    /// Accepts a format name or an entry name
    fn from_str(s: &str) -> Result<Self> {
        Format::ALL
            .iter()
            .copied()
            .find(|format| format.name() == s)
            .or_else(|| Format::from_entry(s))
            .ok_or_else(|| Error::UnknownFormat(s.to_owned()))
    }
}

#[cfg(test)]
mod test {
    use super::Format;

    #[test]
    fn every_schema_is_consistent() {
        for format in Format::ALL {
            assert!(format.schema().check().is_ok(), "{format}");
        }
    }

    #[test]
    fn lookup_by_name_and_entry() {
        assert_eq!("tile-map".parse::<Format>().ok(), Some(Format::TileMap));
        assert_eq!("war3map.W3A".parse::<Format>().ok(), Some(Format::AbilityObjects));
        assert_eq!(Format::from_entry("war3mapUnits.doo"), Some(Format::UnitDoodads));
        assert!("war3map.j".parse::<Format>().is_err());
        assert_eq!(Format::Map.entry(), None);
        assert_eq!("observer".parse::<Format>().ok(), Some(Format::Observer));
        assert_eq!(Format::Observer.entry(), None);
    }
}
