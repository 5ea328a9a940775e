use clap::Args;
use miette::{miette, Context, IntoDiagnostic, Result};
use std::path::PathBuf;
use tracing::info;
use w3_formats::Format;
use w3_schema::{CodecOptions, Lookups, DEFAULT_MAX_DEPTH, DEFAULT_MAX_ELEMENTS};

/// Settings shared by every command that decodes
#[derive(Args)]
pub struct CodecArgs {
    /// Upper bound for any array or byte count read from a file
    #[arg(long, value_name = "COUNT", default_value_t = DEFAULT_MAX_ELEMENTS)]
    max_elements: u64,

    /// Upper bound for how deeply records may nest
    #[arg(long, value_name = "DEPTH", default_value_t = DEFAULT_MAX_DEPTH)]
    max_depth: u64,

    /// Ignore bytes left over after the last field
    #[arg(long, default_value_t = false)]
    allow_trailing: bool,

    /// A JSON file of lookup tables, such as trigger parameter counts
    #[arg(long, value_name = "FILE")]
    lookup: Option<PathBuf>,
}

impl CodecArgs {
    pub fn options(&self) -> Result<CodecOptions> {
        let lookups = match &self.lookup {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .into_diagnostic()
                    .context(format!("path: {}", path.display()))?;
                let lookups: Lookups = serde_json::from_str(&text)
                    .into_diagnostic()
                    .context(format!("parsing lookups from {}", path.display()))?;
                info!("loaded {} lookup tables", lookups.len());
                lookups
            }
            None => Lookups::new(),
        };

        Ok(CodecOptions::builder()
            .max_elements(self.max_elements)
            .max_depth(self.max_depth)
            .allow_trailing(self.allow_trailing)
            .lookups(lookups)
            .build())
    }
}

#[derive(Args)]
pub struct DecodeArgs {
    /// Format name or entry name; guessed from the file name when omitted
    #[arg(long, value_name = "FORMAT", value_parser = super::parse_format)]
    format: Option<Format>,

    /// An input map file
    #[arg(short, long, value_name = "FILE")]
    file: PathBuf,

    /// Print on a single line
    #[arg(long, default_value_t = false)]
    compact: bool,

    #[command(flatten)]
    codec: CodecArgs,
}

/// The format given on the command line, or the one stored under the file's name
pub(crate) fn resolve_format(format: Option<Format>, file: &std::path::Path) -> Result<Format> {
    if let Some(format) = format {
        return Ok(format);
    }
    let name = file
        .file_name()
        .map(|name| name.to_string_lossy())
        .unwrap_or_default();
    Format::from_entry(&name)
        .ok_or_else(|| miette!("cannot tell the format of `{name}`, pass --format to choose one"))
}

impl DecodeArgs {
    pub fn handle(&self) -> Result<()> {
        let format = resolve_format(self.format, &self.file)?;
        let bytes = std::fs::read(&self.file)
            .into_diagnostic()
            .context(format!("path: {}", &self.file.display()))?;

        let document = format.decode_with(&bytes, &self.codec.options()?)?;
        info!("decoded {} as {format}", self.file.display());

        let json = if self.compact {
            serde_json::to_string(&document)
        } else {
            serde_json::to_string_pretty(&document)
        }
        .into_diagnostic()?;
        println!("{json}");

        Ok(())
    }
}
