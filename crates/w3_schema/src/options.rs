//! Options controlling how documents are decoded and encoded
//!

use bon::Builder;
use std::collections::HashMap;

/// Default ceiling for any computed element count
pub const DEFAULT_MAX_ELEMENTS: u64 = 16_777_216;

/// Default ceiling for how deeply records may nest
pub const DEFAULT_MAX_DEPTH: u64 = 256;

/// External tables consulted by [`crate::Length::Lookup`], as table name to key to count
pub type Lookups = HashMap<String, HashMap<String, u64>>;

/// Options for a single decode or encode call
///
/// ```
/// use w3_schema::CodecOptions;
///
/// let options = CodecOptions::builder()
///     .max_elements(1024)
///     .allow_trailing(true)
///     .build()
///     .with_lookup("parameters", "TriggerRegisterTimerEvent", 3);
///
/// assert_eq!(options.max_elements, 1024);
/// ```
#[derive(Debug, Clone, Builder)]
pub struct CodecOptions {
    /// Upper bound for array and byte counts; larger counts are an [`crate::Error::Overflow`]
    #[builder(default = DEFAULT_MAX_ELEMENTS)]
    pub max_elements: u64,

    /// Upper bound for nested records; deeper input is an [`crate::Error::Overflow`]
    #[builder(default = DEFAULT_MAX_DEPTH)]
    pub max_depth: u64,

    /// Ignore bytes left over after the root record instead of failing
    #[builder(default)]
    pub allow_trailing: bool,

    #[builder(default)]
    pub lookups: Lookups,
}

impl Default for CodecOptions {
    fn default() -> Self {
        CodecOptions::builder().build()
    }
}

impl CodecOptions {
    /// Add a single lookup entry
    pub fn with_lookup(
        mut self,
        table: impl Into<String>,
        key: impl Into<String>,
        count: u64,
    ) -> Self {
        self.lookups
            .entry(table.into())
            .or_default()
            .insert(key.into(), count);
        self
    }
}
