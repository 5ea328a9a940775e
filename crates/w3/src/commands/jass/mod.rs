use miette::{Context, IntoDiagnostic, NamedSource, Result};
use std::path::Path;
use w3_jass::Script;

pub mod comments;
pub mod fmt;
pub mod rename;
pub mod symbols;

#[derive(clap::Subcommand)]
pub enum JassCommands {
    /// Regenerate scripts with the canonical layout
    Fmt(fmt::FmtArgs),
    /// Rename a symbol and every reference to it
    Rename(rename::RenameArgs),
    /// List the symbols a script declares
    Symbols(symbols::SymbolsArgs),
    /// List the comments of a script by line
    Comments(comments::CommentsArgs),
}

impl JassCommands {
    pub fn handle(&self) -> Result<()> {
        match self {
            JassCommands::Fmt(fmt) => fmt.handle(),
            JassCommands::Rename(rename) => rename.handle(),
            JassCommands::Symbols(symbols) => symbols.handle(),
            JassCommands::Comments(comments) => comments.handle(),
        }
    }
}

pub(crate) fn read_source(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .into_diagnostic()
        .context(format!("path: {}", path.display()))
}

/// Read and parse a script, naming the file in syntax errors
pub(crate) fn read_script(path: &Path) -> Result<(String, Script)> {
    let text = read_source(path)?;
    let script = text.parse::<Script>().map_err(|e| match e {
        w3_jass::Error::SyntaxError {
            line,
            column,
            message,
            span,
            ..
        } => w3_jass::Error::SyntaxError {
            line,
            column,
            message,
            source_code: NamedSource::new(path.display().to_string(), text.clone()),
            span,
        },
        other => other,
    })?;
    Ok((text, script))
}

/// Write to `output` when given, to standard output otherwise
pub(crate) fn emit(output: Option<&Path>, text: &str) -> Result<()> {
    match output {
        Some(path) => std::fs::write(path, text)
            .into_diagnostic()
            .context(format!("writing {}", path.display())),
        None => {
            print!("{text}");
            Ok(())
        }
    }
}
