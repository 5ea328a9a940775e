use clap::Args;
use miette::{miette, Context, IntoDiagnostic, Result};
use owo_colors::OwoColorize;
use std::path::PathBuf;
use tracing::info;
use w3_formats::Format;

use super::decode::{resolve_format, CodecArgs};

#[derive(Args)]
pub struct RoundtripArgs {
    /// Format name or entry name; guessed from the file name when omitted
    #[arg(long, value_name = "FORMAT", value_parser = super::parse_format)]
    format: Option<Format>,

    /// An input map file
    #[arg(short, long, value_name = "FILE")]
    file: PathBuf,

    #[command(flatten)]
    codec: CodecArgs,
}

/// Offset of the first byte that differs, or the length of the shorter input
fn first_difference(left: &[u8], right: &[u8]) -> Option<usize> {
    left.iter()
        .zip(right)
        .position(|(l, r)| l != r)
        .or_else(|| (left.len() != right.len()).then(|| left.len().min(right.len())))
}

impl RoundtripArgs {
    pub fn handle(&self) -> Result<()> {
        let format = resolve_format(self.format, &self.file)?;
        let options = self.codec.options()?;
        let bytes = std::fs::read(&self.file)
            .into_diagnostic()
            .context(format!("path: {}", &self.file.display()))?;

        let document = format.decode_with(&bytes, &options)?;
        let encoded = format.encode_with(&document, &options)?;
        info!("{} bytes in, {} bytes out", bytes.len(), encoded.len());

        match first_difference(&bytes, &encoded) {
            None => {
                println!("{} {}", "identical".green(), self.file.display());
                Ok(())
            }
            Some(offset) => {
                println!("{} {}", "different".red(), self.file.display());
                Err(miette!(
                    "re-encoded {format} differs from the input at byte {offset:#x}"
                ))
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::first_difference;

    #[test]
    fn differences() {
        assert_eq!(first_difference(b"abc", b"abc"), None);
        assert_eq!(first_difference(b"abc", b"abd"), Some(2));
        assert_eq!(first_difference(b"abc", b"ab"), Some(2));
        assert_eq!(first_difference(b"", b"a"), Some(0));
    }
}
