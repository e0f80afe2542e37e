use std::path::PathBuf;

use anyhow::{Context, Result};
use stowage_archive::{Archiver, Backend};

#[derive(Debug, clap::Args)]
#[clap(visible_alias = "c")]
pub struct Compress {
    /// File to compress.
    pub src: PathBuf,

    /// Output base path, the backend extension is appended. Defaults to the source path.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// zstd, pigz, gzip or zip. Picks the best installed tool when omitted.
    #[arg(short, long, conflicts_with = "password")]
    pub backend: Option<Backend>,

    /// Write an AES-256 encrypted zip.
    #[arg(long)]
    pub password: Option<String>,
}

impl Compress {
    pub fn run(self, archiver: &Archiver) -> Result<()> {
        let dst = self.output.unwrap_or_else(|| self.src.clone());
        let written = match &self.password {
            Some(password) => archiver.compress_file_encrypted(&self.src, &dst, password),
            None => archiver.compress_file(&self.src, &dst, self.backend),
        }
        .with_context(|| format!("Failed to compress {}", self.src.display()))?;

        println!("{}", written.display());
        Ok(())
    }
}
