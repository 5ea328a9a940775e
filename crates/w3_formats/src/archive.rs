//! Access to the entries of a map
//!
//! Opening the MPQ container itself is left to other crates; anything that can hand out an
//! entry's bytes by name can be used through [`MapArchive`].

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, instrument};
use w3_schema::{CodecOptions, Document};
use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::Format;

/// A container of named map entries
pub trait MapArchive {
    fn has_entry(&self, name: &str) -> bool;

    fn read_entry(&self, name: &str) -> Result<Vec<u8>>;
}

/// A map extracted to a directory, one file per entry
#[derive(Debug, Clone)]
pub struct DirectoryArchive {
    root: PathBuf,
}

impl DirectoryArchive {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Names of every file below the root, relative to it and using `\` as the game does
    pub fn entries(&self) -> Result<Vec<String>> {
        let mut entries = Vec::new();
        for entry in WalkDir::new(&self.root).sort_by_file_name() {
            let entry = entry.map_err(|e| Error::IOError(e.into()))?;
            if !entry.file_type().is_file() {
                continue;
            }
            if let Ok(relative) = entry.path().strip_prefix(&self.root) {
                let name = relative
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy())
                    .collect::<Vec<_>>()
                    .join("\\");
                entries.push(name);
            }
        }
        Ok(entries)
    }

    fn path_of(&self, name: &str) -> PathBuf {
        name.split(['\\', '/'])
            .fold(self.root.clone(), |path, part| path.join(part))
    }
}

impl MapArchive for DirectoryArchive {
    fn has_entry(&self, name: &str) -> bool {
        self.path_of(name).is_file()
    }

    fn read_entry(&self, name: &str) -> Result<Vec<u8>> {
        let path = self.path_of(name);
        if !path.is_file() {
            return Err(Error::EntryNotFound(name.to_owned()));
        }
        Ok(fs::read(path)?)
    }
}

/// Entries held in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryArchive {
    entries: BTreeMap<String, Vec<u8>>,
}

impl MemoryArchive {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace an entry, returning the previous content
    pub fn insert(&mut self, name: impl Into<String>, bytes: Vec<u8>) -> Option<Vec<u8>> {
        self.entries.insert(name.into(), bytes)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

impl MapArchive for MemoryArchive {
    fn has_entry(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    fn read_entry(&self, name: &str) -> Result<Vec<u8>> {
        self.entries
            .get(name)
            .cloned()
            .ok_or_else(|| Error::EntryNotFound(name.to_owned()))
    }
}

/// Read the entry `format` is stored under and decode it
#[instrument(skip(archive, options), err)]
pub fn read_document<A: MapArchive + ?Sized>(
    archive: &A,
    format: Format,
    options: &CodecOptions,
) -> Result<Document> {
    let name = format
        .entry()
        .ok_or_else(|| Error::UnknownFormat(format.to_string()))?;
    let bytes = archive.read_entry(name)?;
    debug!(entry = name, len = bytes.len(), "read entry");
    format.decode_with(&bytes, options)
}

/// Every format with an entry present in `archive`
pub fn present_formats<A: MapArchive + ?Sized>(archive: &A) -> Vec<Format> {
    Format::ALL
        .iter()
        .copied()
        .filter(|format| format.entry().is_some_and(|name| archive.has_entry(name)))
        .collect()
}
