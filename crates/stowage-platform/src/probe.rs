//! Memoized lookup of executables on the search path.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

/// Answers "is this executable on `PATH`?" and remembers the answer.
///
/// The first query for a name resolves it with [`which`]; later queries are
/// served from the cache until [`ToolProbe::clear_cache`] is called.
#[derive(Debug, Default)]
pub struct ToolProbe {
    cache: Mutex<HashMap<String, bool>>,
}

impl ToolProbe {
    pub fn new() -> Self { Self::default() }

    /// Build a probe whose answers are fixed up front.
    pub fn with_fixed<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, bool)>,
        S: Into<String>,
    {
        let cache = entries
            .into_iter()
            .map(|(name, present)| (name.into(), present))
            .collect();
        Self {
            cache: Mutex::new(cache),
        }
    }

    pub fn available(&self, name: &str) -> bool {
        let mut cache = self.lock();
        if let Some(&present) = cache.get(name) {
            return present;
        }
        let present = which::which(name).is_ok();
        tracing::debug!(tool = name, present, "probed tool availability");
        cache.insert(name.to_string(), present);
        present
    }

    /// Pin the answer for `name`, bypassing the search path.
    pub fn inject(&self, name: impl Into<String>, present: bool) {
        self.lock().insert(name.into(), present);
    }

    /// Forget every cached answer so the next query re-probes.
    pub fn clear_cache(&self) { self.lock().clear(); }

    pub fn is_cached(&self, name: &str) -> bool { self.lock().contains_key(name) }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, bool>> {
        self.cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_tool_is_unavailable() {
        let probe = ToolProbe::new();
        assert!(!probe.available("stowage_nonexistent_binary_12345"));
        assert!(probe.is_cached("stowage_nonexistent_binary_12345"));
    }

    #[test]
    fn injected_answer_wins() {
        let probe = ToolProbe::new();
        probe.inject("stowage_nonexistent_binary_12345", true);
        assert!(probe.available("stowage_nonexistent_binary_12345"));
    }

    #[test]
    fn clear_cache_forces_reprobe() {
        let probe = ToolProbe::with_fixed([("stowage_nonexistent_binary_12345", true)]);
        assert!(probe.available("stowage_nonexistent_binary_12345"));
        probe.clear_cache();
        assert!(!probe.is_cached("stowage_nonexistent_binary_12345"));
        assert!(!probe.available("stowage_nonexistent_binary_12345"));
    }

    #[cfg(unix)]
    #[test]
    fn finds_shell_builtin_binary() {
        let probe = ToolProbe::new();
        assert!(probe.available("sh"));
    }
}
