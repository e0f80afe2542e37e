use serde::Deserialize;

use crate::{Error, Result};

pub const MIN_LEVEL: i32 = 1;
pub const MAX_LEVEL: i32 = 22;
pub const DEFAULT_LEVEL: i32 = 19;

/// Tunables read by every operation at the moment it runs.
///
/// ```toml
/// level = 9
/// threads = 4
/// max_size = 1073741824
/// dir_mode = 0o755
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    level: i32,
    /// `0` lets the tool use every core.
    threads: u32,
    /// `None` means unlimited.
    max_size: Option<u64>,
    dir_mode: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            level: DEFAULT_LEVEL,
            threads: 0,
            max_size: None,
            dir_mode: stowage_fs::DEFAULT_DIR_MODE,
        }
    }
}

impl Settings {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let settings: Self = toml::from_str(s)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn level(&self) -> i32 { self.level }

    pub fn threads(&self) -> u32 { self.threads }

    pub fn max_size(&self) -> Option<u64> { self.max_size }

    pub fn dir_mode(&self) -> u32 { self.dir_mode }

    pub fn set_level(&mut self, level: i32) -> Result<()> {
        check_level(level)?;
        self.level = level;
        Ok(())
    }

    pub fn set_threads(&mut self, threads: u32) { self.threads = threads; }

    pub fn set_max_size(&mut self, max_size: Option<u64>) { self.max_size = max_size; }

    pub fn set_dir_mode(&mut self, mode: u32) -> Result<()> {
        check_dir_mode(mode)?;
        self.dir_mode = mode;
        Ok(())
    }

    /// Level for gzip-family tools and deflate, which top out at 9.
    pub(crate) fn deflate_level(&self) -> i32 { self.level.clamp(1, 9) }

    fn validate(&self) -> Result<()> {
        check_level(self.level)?;
        check_dir_mode(self.dir_mode)
    }
}

fn check_level(level: i32) -> Result<()> {
    if !(MIN_LEVEL..=MAX_LEVEL).contains(&level) {
        return Err(Error::InvalidSetting {
            name: "level",
            value: level.to_string(),
        });
    }
    Ok(())
}

fn check_dir_mode(mode: u32) -> Result<()> {
    if mode > 0o7777 {
        return Err(Error::InvalidSetting {
            name: "dir_mode",
            value: format!("{mode:o}"),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let s = Settings::default();
        assert_eq!(s.level(), 19);
        assert_eq!(s.threads(), 0);
        assert_eq!(s.max_size(), None);
        assert_eq!(s.dir_mode(), 0o777);
    }

    #[test]
    fn level_bounds() {
        let mut s = Settings::default();
        assert!(s.set_level(1).is_ok());
        assert!(s.set_level(22).is_ok());
        assert!(matches!(
            s.set_level(0),
            Err(Error::InvalidSetting { name: "level", .. })
        ));
        assert!(s.set_level(23).is_err());
        assert_eq!(s.level(), 22);
    }

    #[test]
    fn deflate_level_is_clamped() {
        let mut s = Settings::default();
        assert_eq!(s.deflate_level(), 9);
        s.set_level(3).unwrap();
        assert_eq!(s.deflate_level(), 3);
    }

    #[test]
    fn dir_mode_bounds() {
        let mut s = Settings::default();
        assert!(s.set_dir_mode(0o755).is_ok());
        assert!(s.set_dir_mode(0o17777).is_err());
        assert_eq!(s.dir_mode(), 0o755);
    }

    #[test]
    fn from_toml_partial() {
        let s = Settings::from_toml_str("level = 5\nmax_size = 1024\n").unwrap();
        assert_eq!(s.level(), 5);
        assert_eq!(s.max_size(), Some(1024));
        assert_eq!(s.threads(), 0);
    }

    #[test]
    fn from_toml_rejects_bad_values() {
        assert!(matches!(
            Settings::from_toml_str("level = 40"),
            Err(Error::InvalidSetting { .. })
        ));
        assert!(matches!(
            Settings::from_toml_str("compression = 3"),
            Err(Error::Config(_))
        ));
    }
}
