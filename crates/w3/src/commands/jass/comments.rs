use clap::Args;
use miette::Result;
use owo_colors::OwoColorize;
use std::path::PathBuf;

use super::read_source;

#[derive(Args)]
pub struct CommentsArgs {
    /// An input script
    #[arg(short, long, value_name = "FILE")]
    file: PathBuf,
}

impl CommentsArgs {
    pub fn handle(&self) -> Result<()> {
        let text = read_source(&self.file)?;
        for (line, comment) in w3_jass::comments(&text) {
            println!("{:>6} {}", line.dimmed(), comment);
        }
        Ok(())
    }
}
