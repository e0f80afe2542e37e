use anyhow::{Context, Result};
use home::home_dir;
use std::{
    env,
    path::{Path, PathBuf},
};
use stowage_archive::Settings;

pub const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Clone)]
pub struct StowageEnv {
    root: PathBuf,
}

impl StowageEnv {
    /// `STOWAGE_ROOT`, falling back to `~/.stowage`.
    pub fn new() -> Result<Self> {
        let root = match env::var_os("STOWAGE_ROOT") {
            Some(root) => PathBuf::from(root),
            None => home_dir()
                .context("Failed to get home directory")?
                .join(".stowage"),
        };
        Ok(Self::with_root(root))
    }

    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn config_path(&self) -> PathBuf {
        self.root.join(CONFIG_FILE)
    }

    /// Settings from the root's config file, or defaults when it does not exist.
    pub fn load_settings(&self) -> Result<Settings> {
        let path = self.config_path();
        if !path.is_file() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Settings::default());
        }
        load_settings_file(&path)
    }
}

pub fn load_settings_file(path: &Path) -> Result<Settings> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let settings = Settings::from_toml_str(&text)
        .with_context(|| format!("Invalid config {}", path.display()))?;
    tracing::debug!(path = %path.display(), ?settings, "loaded config");
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_config_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let env = StowageEnv::with_root(dir.path());
        assert_eq!(env.config_path(), dir.path().join("config.toml"));
        assert_eq!(env.load_settings().unwrap(), Settings::default());
    }

    #[test]
    fn config_file_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "level = 5\nthreads = 2\n").unwrap();
        let settings = StowageEnv::with_root(dir.path()).load_settings().unwrap();
        assert_eq!(settings.level(), 5);
        assert_eq!(settings.threads(), 2);
    }

    #[test]
    fn bad_config_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        std::fs::write(&path, "level = 40\n").unwrap();
        let err = load_settings_file(&path).unwrap_err();
        assert!(err.to_string().contains("broken.toml"), "{err:#}");
    }
}
