use clap::Args;
use miette::{miette, Context, IntoDiagnostic, Result};
use owo_colors::OwoColorize;
use similar::{ChangeTag, TextDiff};
use std::path::{Path, PathBuf};
use tracing::info;
use walkdir::WalkDir;

use super::{emit, read_script};

#[derive(Args)]
pub struct FmtArgs {
    /// A script, or a directory searched for `.j` files
    #[arg(short, long, value_name = "PATH")]
    file: PathBuf,

    /// Print a diff for scripts that would change instead of writing them
    #[arg(long, default_value_t = false)]
    check: bool,

    /// Overwrite scripts in place instead of printing them
    #[arg(long, default_value_t = false, conflicts_with = "check")]
    write: bool,
}

fn print_diff(path: &Path, old: &str, new: &str) {
    println!("{}", format!("--- {}", path.display()).red());
    println!("{}", format!("+++ {}", path.display()).green());

    let diff = TextDiff::from_lines(old, new);
    for group in diff.grouped_ops(3) {
        for op in group {
            for change in diff.iter_inline_changes(&op) {
                let sign = match change.tag() {
                    ChangeTag::Delete => "-",
                    ChangeTag::Insert => "+",
                    ChangeTag::Equal => " ",
                };
                let mut line = String::new();
                for (emphasized, value) in change.iter_strings_lossy() {
                    match (change.tag(), emphasized) {
                        (ChangeTag::Insert, true) => {
                            line.push_str(&format!("{}", value.green().underline()))
                        }
                        (ChangeTag::Insert, false) => line.push_str(&format!("{}", value.green())),
                        (ChangeTag::Delete, true) => {
                            line.push_str(&format!("{}", value.red().underline()))
                        }
                        (ChangeTag::Delete, false) => line.push_str(&format!("{}", value.red())),
                        (ChangeTag::Equal, _) => line.push_str(&format!("{}", value.dimmed())),
                    }
                }
                print!("{sign}{line}");
                if change.missing_newline() {
                    println!();
                }
            }
        }
    }
}

impl FmtArgs {
    fn scripts(&self) -> Result<Vec<PathBuf>> {
        if !self.file.is_dir() {
            return Ok(vec![self.file.clone()]);
        }

        let mut scripts = Vec::new();
        for entry in WalkDir::new(&self.file).sort_by_file_name() {
            let entry = entry
                .into_diagnostic()
                .context(format!("walking {}", self.file.display()))?;
            let is_script = entry
                .path()
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("j"));
            if entry.file_type().is_file() && is_script {
                scripts.push(entry.into_path());
            }
        }
        Ok(scripts)
    }

    pub fn handle(&self) -> Result<()> {
        let scripts = self.scripts()?;
        if scripts.is_empty() {
            return Err(miette!("no scripts found in {}", self.file.display()));
        }

        let mut changed = 0;
        for path in &scripts {
            let (text, script) = read_script(path)?;
            let formatted = script.to_string();

            if self.check {
                if formatted != text {
                    print_diff(path, &text, &formatted);
                    changed += 1;
                }
            } else if self.write {
                if formatted != text {
                    info!("writing {}", path.display());
                    emit(Some(path.as_path()), &formatted)?;
                }
            } else {
                emit(None, &formatted)?;
            }
        }

        if changed > 0 {
            return Err(miette!(
                "{changed} of {} scripts are not formatted",
                scripts.len()
            ));
        }
        Ok(())
    }
}
