use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// What a source file holds, as far as decompression is concerned.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Format {
    Zstd,
    Gzip,
    Zip,
    /// Anything else; read or copied verbatim.
    Plain,
}

impl Format {
    /// Classify by the final extension, case-insensitively.
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("zst") => Self::Zstd,
            Some("gz") => Self::Gzip,
            Some("zip") => Self::Zip,
            _ => Self::Plain,
        }
    }

    /// Classify by extension, falling back to the leading magic bytes when the
    /// extension says nothing.
    pub fn resolve(path: &Path) -> Self {
        match Self::from_path(path) {
            Self::Plain => sniff(path).ok().flatten().unwrap_or(Self::Plain),
            known => known,
        }
    }

    pub fn extension(self) -> Option<&'static str> {
        match self {
            Self::Zstd => Some("zst"),
            Self::Gzip => Some("gz"),
            Self::Zip => Some("zip"),
            Self::Plain => None,
        }
    }
}

pub const ZSTD_MAGIC: [u8; 4] = [0x28, 0xB5, 0x2F, 0xFD];
pub const GZIP_MAGIC: [u8; 3] = [0x1F, 0x8B, 0x08];

pub fn detect_format(data: &[u8]) -> Option<Format> {
    match data {
        [0x50, 0x4B, 0x03, 0x04, ..] | [0x50, 0x4B, 0x05, 0x06, ..] => Some(Format::Zip),
        [0x1F, 0x8B, 0x08, ..] => Some(Format::Gzip),
        [0x28, 0xB5, 0x2F, 0xFD, ..] => Some(Format::Zstd),
        _ => None,
    }
}

/// Read the first bytes of `path` and classify them.
pub fn sniff(path: &Path) -> io::Result<Option<Format>> {
    let mut header = [0u8; 8];
    let mut file = File::open(path)?;
    let mut filled = 0;
    while filled < header.len() {
        match file.read(&mut header[filled..])? {
            0 => break,
            n => filled += n,
        }
    }
    Ok(detect_format(&header[..filled]))
}

/// `name` with a trailing `.ext` removed, if present (case-insensitive).
pub(crate) fn strip_extension<'a>(name: &'a str, ext: &str) -> &'a str {
    let suffix_len = ext.len() + 1;
    if name.len() > suffix_len && name.is_char_boundary(name.len() - suffix_len) {
        let (stem, tail) = name.split_at(name.len() - suffix_len);
        if tail.starts_with('.') && tail[1..].eq_ignore_ascii_case(ext) {
            return stem;
        }
    }
    name
}
