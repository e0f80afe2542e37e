use anyhow::Result;
use stowage_archive::{Archiver, Backend};

/// Show which backends are usable and which one compression would pick.
#[derive(Debug, clap::Args)]
#[clap(visible_alias = "backends")]
pub struct ShowBackend {}

impl ShowBackend {
    pub fn run(self, archiver: &Archiver) -> Result<()> {
        let best = archiver.pick_best_backend();
        for backend in Backend::ALL {
            println!("{}", status_line(backend, archiver, best));
        }
        Ok(())
    }
}

fn status_line(backend: Backend, archiver: &Archiver, best: Backend) -> String {
    let status = match backend.tool() {
        Some(tool) if archiver.tools().available(tool) => "available",
        Some(_) => "missing",
        None => "built-in",
    };
    let marker = if backend == best { " *" } else { "" };
    format!("{:<5} {status}{marker}", backend.name())
}
