use std::path::PathBuf;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use stowage_archive::{Archiver, Settings};

mod backend;
mod compress;
mod decompress;
mod extract;
mod find;
mod inspect;

#[derive(Debug, Parser)]
#[command(name = "stowage", version, about = "Compress, decompress and inspect single-file archives")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, clap::Args)]
pub struct GlobalArgs {
    /// Compression level, 1-22. Gzip backends clamp it to 9.
    #[arg(long, global = true)]
    pub level: Option<i32>,

    /// Compressor threads, 0 for all cores.
    #[arg(long, global = true)]
    pub threads: Option<u32>,

    /// Refuse sources larger than this many bytes.
    #[arg(long, global = true)]
    pub max_size: Option<u64>,

    /// Settings file; defaults to `$STOWAGE_ROOT/config.toml`.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
}

impl GlobalArgs {
    /// Flags win over values from the settings file.
    pub fn apply(&self, settings: &mut Settings) -> stowage_archive::Result<()> {
        if let Some(level) = self.level {
            settings.set_level(level)?;
        }
        if let Some(threads) = self.threads {
            settings.set_threads(threads);
        }
        if let Some(max_size) = self.max_size {
            settings.set_max_size(Some(max_size));
        }
        Ok(())
    }

    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    Compress(compress::Compress),
    Decompress(decompress::Decompress),
    Find(find::Find),
    Inspect(inspect::Inspect),
    ExtractEncrypted(extract::ExtractEncrypted),
    Backend(backend::ShowBackend),
}

impl Commands {
    pub fn run(self, archiver: &Archiver) -> Result<()> {
        match self {
            Self::Compress(cmd) => cmd.run(archiver),
            Self::Decompress(cmd) => cmd.run(archiver),
            Self::Find(cmd) => cmd.run(archiver),
            Self::Inspect(cmd) => cmd.run(),
            Self::ExtractEncrypted(cmd) => cmd.run(archiver),
            Self::Backend(cmd) => cmd.run(archiver),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use stowage_archive::Backend;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "stowage", "compress", "dump.sql", "--backend", "ZSTD", "--level", "3", "-vv",
        ])
        .unwrap();
        assert_eq!(cli.global.level, Some(3));
        assert_eq!(cli.global.log_filter(), "debug");
        match cli.command {
            Commands::Compress(cmd) => assert_eq!(cmd.backend, Some(Backend::Zstd)),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn unknown_backend_is_rejected() {
        assert!(Cli::try_parse_from(["stowage", "compress", "a", "--backend", "lz4"]).is_err());
    }

    #[test]
    fn password_and_backend_conflict() {
        let parsed = Cli::try_parse_from([
            "stowage", "compress", "a", "--backend", "gzip", "--password", "pw",
        ]);
        assert!(parsed.is_err());
    }

    #[test]
    fn flags_override_settings() {
        let cli = Cli::try_parse_from([
            "stowage", "--threads", "4", "--max-size", "1024", "backend",
        ])
        .unwrap();
        let mut settings = Settings::from_toml_str("level = 7\nthreads = 1").unwrap();
        cli.global.apply(&mut settings).unwrap();
        assert_eq!(settings.level(), 7);
        assert_eq!(settings.threads(), 4);
        assert_eq!(settings.max_size(), Some(1024));
    }

    #[test]
    fn out_of_range_level_flag_fails() {
        let cli = Cli::try_parse_from(["stowage", "--level", "30", "backend"]).unwrap();
        assert!(cli.global.apply(&mut Settings::default()).is_err());
    }
}
