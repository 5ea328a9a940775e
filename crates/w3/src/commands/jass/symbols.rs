use clap::Args;
use itertools::Itertools;
use miette::Result;
use owo_colors::OwoColorize;
use std::path::PathBuf;
use w3_jass::{Function, Position, SymbolKind, SymbolRef};

use super::read_script;

#[derive(Args)]
pub struct SymbolsArgs {
    /// An input script
    #[arg(short, long, value_name = "FILE")]
    file: PathBuf,

    /// Only list symbols of this kind
    #[arg(long, value_name = "KIND", value_parser = parse_kind)]
    kind: Option<SymbolKind>,
}

fn parse_kind(value: &str) -> Result<SymbolKind, String> {
    [
        SymbolKind::Type,
        SymbolKind::Native,
        SymbolKind::Global,
        SymbolKind::Function,
    ]
    .into_iter()
    .find(|kind| kind.to_string() == value)
    .ok_or_else(|| format!("`{value}` is not one of type, native, global, function"))
}

fn signature(function: &Function) -> String {
    let takes = if function.takes.is_empty() {
        "nothing".to_string()
    } else {
        function
            .takes
            .iter()
            .map(|p| format!("{} {}", p.ty, p.id))
            .join(", ")
    };
    let returns = function.returns.as_deref().unwrap_or("nothing");
    format!("takes {takes} returns {returns}")
}

fn describe(symbol: SymbolRef<'_>) -> String {
    match symbol {
        SymbolRef::Type(t) => format!("extends {}", t.extends),
        SymbolRef::Native(n) => signature(n),
        SymbolRef::Global(g) => {
            let array = if g.is_array { " array" } else { "" };
            match &g.initializer {
                Some(initializer) => format!("{}{array} = {initializer}", g.ty),
                None => format!("{}{array}", g.ty),
            }
        }
        SymbolRef::Function(f) => format!(
            "{}, {} locals, {} statements",
            signature(f),
            f.locals.len(),
            f.statements.len()
        ),
    }
}

impl SymbolsArgs {
    pub fn handle(&self) -> Result<()> {
        let (_, script) = read_script(&self.file)?;

        let symbols = script
            .symbols()
            .filter(|symbol| self.kind.map_or(true, |kind| symbol.kind() == kind));
        for (kind, group) in &symbols.chunk_by(|symbol| symbol.kind()) {
            println!("{}", format!("{kind}s").bold());
            for symbol in group {
                let line = symbol
                    .position()
                    .map(|Position { line, .. }| format!("{line:>6}"))
                    .unwrap_or_default();
                println!(
                    "{} {} {}",
                    line.dimmed(),
                    symbol.id().cyan(),
                    describe(symbol)
                );
            }
        }

        Ok(())
    }
}
