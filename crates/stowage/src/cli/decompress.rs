use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use stowage_archive::Archiver;

#[derive(Debug, clap::Args)]
#[clap(visible_alias = "d")]
pub struct Decompress {
    /// `.zst`, `.gz` or `.zip` file. Other files are copied unchanged.
    pub src: PathBuf,

    /// Directory to write into.
    #[arg(short, long, default_value = ".")]
    pub output: PathBuf,

    /// Write the content to stdout instead of a file.
    #[arg(long, conflicts_with = "output")]
    pub stdout: bool,
}

impl Decompress {
    pub fn run(self, archiver: &Archiver) -> Result<()> {
        let context = || format!("Failed to decompress {}", self.src.display());

        if self.stdout {
            let bytes = archiver.decompress_to_bytes(&self.src).with_context(context)?;
            let mut out = std::io::stdout().lock();
            out.write_all(&bytes)?;
            out.flush()?;
            return Ok(());
        }

        let written = archiver
            .decompress_to_file(&self.src, &self.output)
            .with_context(context)?;
        println!("{}", written.display());
        Ok(())
    }
}
