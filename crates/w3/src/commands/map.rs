use clap::Args;
use miette::{miette, Result};
use owo_colors::OwoColorize;
use std::path::PathBuf;
use tracing::{info, warn};
use w3_formats::{archive::present_formats, read_document, DirectoryArchive, Format};
use w3_schema::Value;

use super::decode::CodecArgs;

#[derive(Args)]
pub struct MapArgs {
    /// A directory holding an extracted map
    #[arg(short, long, value_name = "DIR")]
    directory: PathBuf,

    #[command(flatten)]
    codec: CodecArgs,
}

/// A one line description of a decoded document: its top level arrays and their sizes
fn summary(document: &w3_schema::Document) -> String {
    let arrays = document
        .iter()
        .filter_map(|(name, value)| match value {
            Value::Array(items) => Some(format!("{name}: {}", items.len())),
            _ => None,
        })
        .collect::<Vec<_>>();
    if arrays.is_empty() {
        format!("{} fields", document.len())
    } else {
        arrays.join(", ")
    }
}

impl MapArgs {
    pub fn handle(&self) -> Result<()> {
        let archive = DirectoryArchive::new(&self.directory);
        let options = self.codec.options()?;

        for name in archive.entries()? {
            if Format::from_entry(&name).is_none() {
                info!("skipping {name}");
            }
        }

        let formats = present_formats(&archive);
        if formats.is_empty() {
            return Err(miette!(
                "no known map files in {}",
                self.directory.display()
            ));
        }

        let mut failures = 0;
        for format in formats {
            let entry = format.entry().unwrap_or_default();
            match read_document(&archive, format, &options) {
                Ok(document) => {
                    println!("{} {entry} ({format}): {}", "ok".green(), summary(&document))
                }
                Err(e) => {
                    warn!("{entry}: {e}");
                    println!("{} {entry} ({format}): {e}", "failed".red());
                    failures += 1;
                }
            }
        }

        if failures > 0 {
            return Err(miette!("{failures} files failed to decode"));
        }
        Ok(())
    }
}
