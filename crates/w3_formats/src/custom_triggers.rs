//! Custom script triggers (`war3map.wct`)
//!

use std::sync::OnceLock;

use w3_schema::{Document, Schema};

use crate::common::{counted, integer, string};
use crate::error::Result;

pub const ENTRY: &str = "war3map.wct";

fn custom_trigger() -> Schema {
    Schema::new("CustomTrigger")
        // includes the terminating null
        .field("code_size", integer())
        .field("code", string())
}

pub fn schema() -> &'static Schema {
    static SCHEMA: OnceLock<Schema> = OnceLock::new();
    SCHEMA.get_or_init(|| {
        Schema::new("CustomTriggersFile")
            .field("version", integer())
            .field("script_header_comment", string())
            .field("script_header_trigger", custom_trigger())
            .field("triggers_count", integer())
            .field("triggers", counted("triggers_count", custom_trigger()))
    })
}

pub fn decode(bytes: &[u8]) -> Result<Document> {
    Ok(schema().decode(bytes)?)
}

pub fn encode(document: &Document) -> Result<Vec<u8>> {
    Ok(schema().encode(document)?)
}
