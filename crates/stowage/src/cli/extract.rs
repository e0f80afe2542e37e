use std::path::PathBuf;

use anyhow::{Context, Result};
use stowage_archive::Archiver;

/// Decrypt one entry of a password-protected zip.
#[derive(Debug, clap::Args)]
pub struct ExtractEncrypted {
    pub zip: PathBuf,

    #[arg(short, long)]
    pub password: String,

    #[arg(short, long, default_value = ".")]
    pub output: PathBuf,

    /// Pick the first entry ending with this suffix instead of the first `.sql` dump.
    #[arg(long)]
    pub suffix: Option<String>,
}

impl ExtractEncrypted {
    pub fn run(self, archiver: &Archiver) -> Result<()> {
        let written = match &self.suffix {
            Some(suffix) => {
                let suffix = suffix.to_ascii_lowercase();
                archiver.extract_password_protected_zip_matching(
                    &self.zip,
                    &self.password,
                    &self.output,
                    |name| name.to_ascii_lowercase().ends_with(&suffix),
                )
            }
            None => archiver.extract_password_protected_zip(&self.zip, &self.password, &self.output),
        }
        .with_context(|| format!("Failed to extract {}", self.zip.display()))?;

        println!("{}", written.display());
        Ok(())
    }
}
