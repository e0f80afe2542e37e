use stowage_platform::{SystemRunner, ToolProbe, ToolRunner};

use crate::backend::{self, Backend};
use crate::settings::Settings;

/// Entry point for every compress, decompress and extract operation.
///
/// Owns the tunables, the tool availability cache and the process runner, so
/// callers never touch process-wide state.
pub struct Archiver {
    pub(crate) settings: Settings,
    pub(crate) probe: ToolProbe,
    pub(crate) runner: Box<dyn ToolRunner>,
}

impl Default for Archiver {
    fn default() -> Self { Self::new() }
}

impl std::fmt::Debug for Archiver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Archiver")
            .field("settings", &self.settings)
            .field("probe", &self.probe)
            .finish_non_exhaustive()
    }
}

impl Archiver {
    pub fn new() -> Self { Self::with_settings(Settings::default()) }

    pub fn with_settings(settings: Settings) -> Self {
        Self {
            settings,
            probe: ToolProbe::new(),
            runner: Box::new(SystemRunner),
        }
    }

    /// Replace the process runner, e.g. with a scripted one in tests.
    pub fn runner(mut self, runner: impl ToolRunner + 'static) -> Self {
        self.runner = Box::new(runner);
        self
    }

    /// Replace the tool availability cache.
    pub fn probe(mut self, probe: ToolProbe) -> Self {
        self.probe = probe;
        self
    }

    pub fn settings(&self) -> &Settings { &self.settings }

    pub fn settings_mut(&mut self) -> &mut Settings { &mut self.settings }

    pub fn tools(&self) -> &ToolProbe { &self.probe }

    pub fn pick_best_backend(&self) -> Backend { backend::pick_best_backend(&self.probe) }
}
