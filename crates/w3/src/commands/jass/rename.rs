use clap::Args;
use miette::{miette, Result};
use std::path::PathBuf;
use tracing::info;

use super::{emit, read_script};

#[derive(Args)]
pub struct RenameArgs {
    /// An input script
    #[arg(short, long, value_name = "FILE")]
    file: PathBuf,

    /// The identifier to rename
    #[arg(long, value_name = "ID")]
    from: String,

    /// The new identifier
    #[arg(long, value_name = "ID")]
    to: String,

    /// Rename a local variable or parameter of this function instead of a symbol
    #[arg(long, value_name = "FUNCTION")]
    function: Option<String>,

    /// Where to write the result; standard output when omitted
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,
}

impl RenameArgs {
    pub fn handle(&self) -> Result<()> {
        let (_, mut script) = read_script(&self.file)?;

        match &self.function {
            Some(id) => {
                let function = script
                    .functions
                    .iter_mut()
                    .find(|f| &f.id == id)
                    .ok_or_else(|| miette!("no function named `{id}`"))?;
                function.rename_local(&self.from, &self.to);
                info!("renamed {} to {} in {id}", self.from, self.to);
            }
            None => {
                script.rename(&self.from, &self.to)?;
                info!("renamed {} to {}", self.from, self.to);
            }
        }

        emit(self.output.as_deref(), &script.to_string())
    }
}
