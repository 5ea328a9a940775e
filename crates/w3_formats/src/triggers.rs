//! GUI triggers (`war3map.wtg`)
//!
//! Trigger blocks nest recursively: a block holds child blocks, and its parameters can call
//! functions that are blocks themselves. The number of parameters a block has is not stored in
//! the file. It depends on the function the block calls and comes from the game's trigger data,
//! which callers supply as the [`PARAMETER_COUNTS`] lookup table of [`CodecOptions`].
//!
//! ```
//! use w3_formats::triggers;
//! use w3_schema::CodecOptions;
//!
//! let options = CodecOptions::default()
//!     .with_lookup(triggers::PARAMETER_COUNTS, "TriggerRegisterTimerEventSingle", 1)
//!     .with_lookup(triggers::PARAMETER_COUNTS, "DoNothing", 0);
//! # let _ = options;
//! ```

use std::sync::OnceLock;

use w3_schema::{CodecOptions, Document, FieldType, Length, Schema};

use crate::common::{counted, enumeration, integer, magic, string};
use crate::error::Result;

pub const ENTRY: &str = "war3map.wtg";

pub const MAGIC: &[u8; 4] = b"WTG!";

/// Lookup table mapping a function name to its parameter count
pub const PARAMETER_COUNTS: &str = "trigger_parameters";

fn block_type() -> FieldType {
    enumeration(
        "TriggerBlockType",
        integer(),
        &[("EVENT", 0), ("CONDITION", 1), ("ACTION", 2), ("FUNCTION_CALL", 3)],
    )
}

fn parameters() -> FieldType {
    FieldType::array(
        Length::lookup(PARAMETER_COUNTS, "function_name"),
        FieldType::Lazy(parameter),
    )
}

fn child_blocks() -> FieldType {
    counted("child_blocks_count", FieldType::Lazy(child_block))
}

fn parameter() -> &'static FieldType {
    static PARAMETER: OnceLock<FieldType> = OnceLock::new();
    PARAMETER.get_or_init(|| {
        Schema::new("TriggerBlockParameter")
            .field(
                "type",
                enumeration(
                    "ParameterType",
                    integer(),
                    &[("PRESET", 0), ("VARIABLE", 1), ("FUNCTION", 2), ("CONSTANT", 3)],
                ),
            )
            .field("value", string())
            .field("functions_count", integer())
            .field("functions", counted("functions_count", FieldType::Lazy(block)))
            .field("array_indices_count", integer())
            .field(
                "array_indices",
                counted("array_indices_count", FieldType::Lazy(parameter)),
            )
            .into()
    })
}

fn block() -> &'static FieldType {
    static BLOCK: OnceLock<FieldType> = OnceLock::new();
    BLOCK.get_or_init(|| {
        Schema::new("TriggerBlock")
            .field("type", block_type())
            .field("function_name", string())
            .field("is_function_enabled", integer())
            .field("parameters", parameters())
            .field("child_blocks_count", integer())
            .field("child_blocks", child_blocks())
            .into()
    })
}

fn if_then_else_block() -> &'static FieldType {
    static BLOCK: OnceLock<FieldType> = OnceLock::new();
    BLOCK.get_or_init(|| {
        Schema::new("TriggerIfThenElseBlock")
            .field("type", block_type())
            .field(
                "branch_type",
                enumeration("BranchType", integer(), &[("IF", 0), ("THEN", 1), ("ELSE", 2)]),
            )
            .field("function_name", string())
            .field("is_function_enabled", integer())
            .field("parameters", parameters())
            .field("child_blocks_count", integer())
            .field("child_blocks", child_blocks())
            .into()
    })
}

/// Children are branches of an if/then/else when they decode as such, plain blocks otherwise
fn child_block() -> &'static FieldType {
    static CHILD: OnceLock<FieldType> = OnceLock::new();
    CHILD.get_or_init(|| {
        FieldType::Select(vec![
            FieldType::Lazy(if_then_else_block),
            FieldType::Lazy(block),
        ])
    })
}

pub fn schema() -> &'static Schema {
    static SCHEMA: OnceLock<Schema> = OnceLock::new();
    SCHEMA.get_or_init(|| {
        let category = Schema::new("TriggerCategory")
            .field("index", integer())
            .field("name", string())
            .field("is_comment", integer());

        let variable = Schema::new("TriggerVariable")
            .field("name", string())
            .field("type", string())
            .field("unknown_field_1", integer())
            .field("is_array", integer())
            .field("array_size", integer())
            .field("is_initialized", integer())
            .field("initial_value", string());

        let trigger = Schema::new("Trigger")
            .field("name", string())
            .field("description", string())
            .field("is_comment", integer())
            .field("is_enabled", integer())
            .field("is_custom_text_trigger", integer())
            .field("is_turned_off", integer())
            .field("is_init", integer())
            .field("category_index", integer())
            .field("blocks_count", integer())
            .field("blocks", counted("blocks_count", FieldType::Lazy(block)));

        Schema::new("TriggersFile")
            .field("file_id", magic(MAGIC))
            .field("version", integer())
            .field("trigger_categories_count", integer())
            .field("trigger_categories", counted("trigger_categories_count", category))
            .field("unknown_field_1", integer())
            .field("trigger_variables_count", integer())
            .field("trigger_variables", counted("trigger_variables_count", variable))
            .field("triggers_count", integer())
            .field("triggers", counted("triggers_count", trigger))
    })
}

/// Decode with the parameter count table in `options`
pub fn decode(bytes: &[u8], options: &CodecOptions) -> Result<Document> {
    Ok(schema().decode_with(bytes, options)?)
}

pub fn encode(document: &Document, options: &CodecOptions) -> Result<Vec<u8>> {
    Ok(schema().encode_with(document, options)?)
}
