//! Imported files (`war3map.imp`)
//!

use std::sync::OnceLock;

use w3_schema::{Document, Schema};

use crate::common::{byte, counted, integer, string};
use crate::error::Result;

pub const ENTRY: &str = "war3map.imp";

pub fn schema() -> &'static Schema {
    static SCHEMA: OnceLock<Schema> = OnceLock::new();
    SCHEMA.get_or_init(|| {
        let import = Schema::new("Import")
            // 5 or 8 for a standard path, 10 or 13 for a custom one
            .field("is_custom_path", byte())
            .field("path", string());

        Schema::new("ImportsFile")
            .field("version", integer())
            .field("imports_count", integer())
            .field("imports", counted("imports_count", import))
    })
}

pub fn decode(bytes: &[u8]) -> Result<Document> {
    Ok(schema().decode(bytes)?)
}

pub fn encode(document: &Document) -> Result<Vec<u8>> {
    Ok(schema().encode(document)?)
}
