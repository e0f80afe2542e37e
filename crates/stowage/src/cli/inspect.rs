use std::fmt;
use std::path::PathBuf;

use anyhow::{Result, bail};
use stowage_archive::{ArchiveInfo, inspect};

#[derive(Debug, clap::Args)]
#[clap(visible_alias = "info")]
pub struct Inspect {
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Fail when any path is not a valid archive.
    #[arg(long)]
    pub check: bool,
}

impl Inspect {
    pub fn run(self) -> Result<()> {
        let mut invalid = 0;
        for path in &self.paths {
            let report = Report {
                path,
                info: inspect(path),
            };
            if !report.info.valid {
                invalid += 1;
            }
            print!("{report}");
        }

        if self.check && invalid > 0 {
            bail!("{invalid} of {} paths are not valid archives", self.paths.len());
        }
        Ok(())
    }
}

struct Report<'a> {
    path: &'a PathBuf,
    info: ArchiveInfo,
}

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{}: format={:?} valid={} encrypted={}",
            self.path.display(),
            self.info.format,
            self.info.valid,
            self.info.encrypted
        )?;
        for entry in &self.info.entries {
            writeln!(f, "  {entry}")?;
        }
        Ok(())
    }
}
