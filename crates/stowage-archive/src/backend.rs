use std::fmt;
use std::str::FromStr;

use stowage_platform::ToolProbe;

/// A compression strategy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Backend {
    /// `zstd` executable.
    Zstd,
    /// `pigz`, multi-threaded gzip.
    Pigz,
    /// `gzip`.
    Gzip,
    /// Built-in ZIP container, no executable needed.
    Zip,
}

impl Backend {
    /// Every backend, highest priority first.
    pub const ALL: [Backend; 4] = [Self::Zstd, Self::Pigz, Self::Gzip, Self::Zip];

    /// Canonical file extension, without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Zstd => "zst",
            Self::Pigz | Self::Gzip => "gz",
            Self::Zip => "zip",
        }
    }

    /// Executable backing this backend; `None` for the built-in zip writer.
    pub fn tool(self) -> Option<&'static str> {
        match self {
            Self::Zstd => Some("zstd"),
            Self::Pigz => Some("pigz"),
            Self::Gzip => Some("gzip"),
            Self::Zip => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Zstd => "zstd",
            Self::Pigz => "pigz",
            Self::Gzip => "gzip",
            Self::Zip => "zip",
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.name()) }
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown backend '{0}', expected one of zstd, pigz, gzip, zip")]
pub struct ParseBackendError(String);

impl FromStr for Backend {
    type Err = ParseBackendError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|b| b.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseBackendError(s.to_string()))
    }
}

/// Pick the most preferred backend whose tool is present.
///
/// Falls back to [`Backend::Zip`], which needs nothing external, so this
/// never fails.
pub fn pick_best_backend(probe: &ToolProbe) -> Backend {
    let picked = Backend::ALL
        .into_iter()
        .find(|b| b.tool().is_none_or(|tool| probe.available(tool)))
        .unwrap_or(Backend::Zip);
    tracing::debug!(backend = %picked, "selected compression backend");
    picked
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn probe(zstd: bool, pigz: bool, gzip: bool) -> ToolProbe {
        ToolProbe::with_fixed([("zstd", zstd), ("pigz", pigz), ("gzip", gzip)])
    }

    #[test]
    fn zip_when_nothing_available() {
        assert_eq!(pick_best_backend(&probe(false, false, false)), Backend::Zip);
    }

    #[test]
    fn zstd_beats_everything() {
        assert_eq!(pick_best_backend(&probe(true, true, true)), Backend::Zstd);
        assert_eq!(pick_best_backend(&probe(true, false, false)), Backend::Zstd);
    }

    #[test]
    fn pigz_before_gzip() {
        assert_eq!(pick_best_backend(&probe(false, true, true)), Backend::Pigz);
        assert_eq!(pick_best_backend(&probe(false, false, true)), Backend::Gzip);
    }

    proptest! {
        #[test]
        fn priority_order_holds(zstd: bool, pigz: bool, gzip: bool) {
            let expected = if zstd {
                Backend::Zstd
            } else if pigz {
                Backend::Pigz
            } else if gzip {
                Backend::Gzip
            } else {
                Backend::Zip
            };
            prop_assert_eq!(pick_best_backend(&probe(zstd, pigz, gzip)), expected);
        }
    }

    #[test]
    fn extensions() {
        assert_eq!(Backend::Zstd.extension(), "zst");
        assert_eq!(Backend::Pigz.extension(), "gz");
        assert_eq!(Backend::Gzip.extension(), "gz");
        assert_eq!(Backend::Zip.extension(), "zip");
    }

    #[test]
    fn parse_round_trips_display() {
        for backend in Backend::ALL {
            assert_eq!(backend.to_string().parse::<Backend>(), Ok(backend));
        }
        assert_eq!("ZSTD".parse::<Backend>(), Ok(Backend::Zstd));
        assert!("brotli".parse::<Backend>().is_err());
    }
}
