//! Object editor data
//!
//! Two layouts share the same shape. The plain one is used for units, items, destructibles and
//! buffs; abilities, doodads and upgrades add a `variation` and an `ability_data_column` to every
//! modification. [`decode_any`] tries both.

use std::sync::OnceLock;

use w3_schema::{
    decode_select, Check, CodecOptions, Document, FieldType, Key, Ref, Schema, Scope, Switch,
    Value,
};

use crate::common::{counted, enumeration, float, id, integer, string};
use crate::error::Result;

pub const UNITS_ENTRY: &str = "war3map.w3u";
pub const ITEMS_ENTRY: &str = "war3map.w3t";
pub const DESTRUCTABLES_ENTRY: &str = "war3map.w3b";
pub const BUFFS_ENTRY: &str = "war3map.w3h";
pub const DOODADS_ENTRY: &str = "war3map.w3d";
pub const ABILITIES_ENTRY: &str = "war3map.w3a";
pub const UPGRADES_ENTRY: &str = "war3map.w3q";

/// Which of the two object layouts a file uses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectsLayout {
    Plain,
    WithVariations,
}

fn is_enclosing_object(value: &Value, scope: &Scope<'_>) -> bool {
    ["_.new_object_id", "_.original_object_id"]
        .iter()
        .any(|path| scope.resolve(&Ref::new(path)).is_ok_and(|id| id == value))
}

/// Zero, or the id of the object the modification belongs to
fn parent_object_id() -> FieldType {
    FieldType::Select(vec![
        FieldType::constant(integer(), 0),
        FieldType::validated(
            id(),
            Check {
                relation: "must equal the enclosing object's new or original id",
                predicate: is_enclosing_object,
            },
        ),
    ])
}

fn variable_type() -> FieldType {
    enumeration(
        "VariableType",
        integer(),
        &[("INT", 0), ("REAL", 1), ("UNREAL", 2), ("STRING", 3)],
    )
}

fn value() -> FieldType {
    Switch::new("variable_type")
        .case(Key::Name("INT".into()), integer())
        .case(Key::Name("REAL".into()), float())
        .case(Key::Name("UNREAL".into()), float())
        .case(Key::Name("STRING".into()), string())
        .into()
}

fn modification(with_variations: bool) -> Schema {
    let schema = Schema::new(if with_variations {
        "ObjectModificationWithVariation"
    } else {
        "ObjectModification"
    })
    .field("modification_id", id())
    .field("variable_type", variable_type());

    let schema = if with_variations {
        schema.field("variation", integer()).field(
            "ability_data_column",
            enumeration(
                "AbilityDataColumn",
                integer(),
                &[("A", 0), ("B", 1), ("C", 2), ("D", 3), ("F", 4), ("G", 5), ("H", 6)],
            ),
        )
    } else {
        schema
    };

    schema
        .field("value", value())
        .field("parent_object_id", parent_object_id())
}

fn table(with_variations: bool) -> Schema {
    let definition = Schema::new("ObjectDefinition")
        .field("original_object_id", id())
        .field("new_object_id", id())
        .field("modifications_count", integer())
        .field(
            "modifications",
            counted("modifications_count", modification(with_variations)),
        );

    Schema::new("ObjectTable")
        .field("objects_count", integer())
        .field("objects", counted("objects_count", definition))
}

fn file(name: &str, with_variations: bool) -> Schema {
    Schema::new(name)
        .field("version", integer())
        .field("original_objects_table", table(with_variations))
        .field("custom_objects_table", table(with_variations))
}

/// Layout of units, items, destructibles and buffs
pub fn schema() -> &'static Schema {
    static SCHEMA: OnceLock<Schema> = OnceLock::new();
    SCHEMA.get_or_init(|| file("ObjectsFile", false))
}

/// Layout of abilities, doodads and upgrades
pub fn variations_schema() -> &'static Schema {
    static SCHEMA: OnceLock<Schema> = OnceLock::new();
    SCHEMA.get_or_init(|| file("ObjectsWithVariationsFile", true))
}

pub fn decode(bytes: &[u8]) -> Result<Document> {
    Ok(schema().decode(bytes)?)
}

pub fn encode(document: &Document) -> Result<Vec<u8>> {
    Ok(schema().encode(document)?)
}

pub fn decode_variations(bytes: &[u8]) -> Result<Document> {
    Ok(variations_schema().decode(bytes)?)
}

pub fn encode_variations(document: &Document) -> Result<Vec<u8>> {
    Ok(variations_schema().encode(document)?)
}

/// Decode an objects file of either layout
///
/// The variations layout is tried first. A file that only decodes as the plain layout is parsed
/// twice, so this costs up to two full passes over the input.
pub fn decode_any(bytes: &[u8]) -> Result<(ObjectsLayout, Document)> {
    let (index, document) = decode_select(
        &[variations_schema(), schema()],
        bytes,
        &CodecOptions::default(),
    )?;
    let layout = match index {
        0 => ObjectsLayout::WithVariations,
        _ => ObjectsLayout::Plain,
    };
    Ok((layout, document))
}

/// Encode a document with the layout it was decoded with
pub fn encode_any(layout: ObjectsLayout, document: &Document) -> Result<Vec<u8>> {
    match layout {
        ObjectsLayout::Plain => encode(document),
        ObjectsLayout::WithVariations => encode_variations(document),
    }
}
