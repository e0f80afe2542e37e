use std::path::PathBuf;

use anyhow::{Context, Result};
use stowage_archive::{Archiver, find_archive};

/// Look for `<name>.zst`, `<name>.gz`, `<name>.zip`, then `<name>` and print
/// the first one decompressed.
#[derive(Debug, clap::Args)]
pub struct Find {
    pub directory: PathBuf,

    pub name: String,

    /// Print the matching path instead of its content.
    #[arg(long)]
    pub path_only: bool,
}

impl Find {
    pub fn run(self, archiver: &Archiver) -> Result<()> {
        if self.path_only {
            let found = find_archive(&self.directory, &self.name).with_context(|| {
                format!("No archive for '{}' in {}", self.name, self.directory.display())
            })?;
            println!("{}", found.display());
            return Ok(());
        }

        let content = archiver
            .find_and_decompress_archive(&self.directory, &self.name)
            .with_context(|| format!("Failed to read '{}'", self.name))?;
        print!("{content}");
        Ok(())
    }
}
