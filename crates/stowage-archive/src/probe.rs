//! Archive introspection: validity, encryption and a combined summary.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::decompress::{EntryMeta, list_entries, open_zip};
use crate::format::{self, Format};

/// What a probe learned about a path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArchiveInfo {
    pub format: Format,
    pub valid: bool,
    pub encrypted: bool,
    /// Entry names for zip containers, empty otherwise.
    pub entries: Vec<String>,
}

/// Cheap structural check of an archive; never decompresses the whole
/// stream.
///
/// A zip is valid when it opens as a container. Encrypted containers are
/// accepted without reading any entry, unencrypted ones must also list every
/// entry header. Gzip needs its magic and a decodable first block, zstd its
/// frame magic. Plain and missing files are not valid archives.
pub fn validate_archive(path: impl AsRef<Path>) -> bool {
    let path = path.as_ref();
    if !path.is_file() {
        return false;
    }
    let valid = match Format::resolve(path) {
        Format::Zip => zip_entries(path).is_some(),
        Format::Gzip => gzip_header_ok(path),
        Format::Zstd => matches!(format::sniff(path), Ok(Some(Format::Zstd))),
        Format::Plain => false,
    };
    tracing::debug!(path = %path.display(), valid, "validated archive");
    valid
}

/// Whether any entry of a zip container is encrypted.
///
/// False for non-zip files, unreadable containers and zips without encrypted
/// entries.
pub fn is_password_protected(path: impl AsRef<Path>) -> bool {
    let path = path.as_ref();
    if Format::resolve(path) != Format::Zip {
        return false;
    }
    zip_entries(path).is_some_and(|entries| entries.iter().any(|e| e.encrypted))
}

/// Run every probe on `path` at once.
pub fn inspect(path: impl AsRef<Path>) -> ArchiveInfo {
    let path = path.as_ref();
    let format = Format::resolve(path);
    let entries = match format {
        Format::Zip => zip_entries(path).unwrap_or_default(),
        _ => Vec::new(),
    };
    ArchiveInfo {
        format,
        valid: validate_archive(path),
        encrypted: entries.iter().any(|e| e.encrypted),
        entries: entries.into_iter().map(|e| e.name).collect(),
    }
}

/// Entry headers of a zip, or `None` if it does not open as one.
fn zip_entries(path: &Path) -> Option<Vec<EntryMeta>> {
    let mut archive = open_zip(path).ok()?;
    list_entries(path, &mut archive).ok()
}

fn gzip_header_ok(path: &Path) -> bool {
    if !matches!(format::sniff(path), Ok(Some(Format::Gzip))) {
        return false;
    }
    let Ok(file) = File::open(path) else {
        return false;
    };
    let mut block = Vec::with_capacity(512);
    flate2::read::GzDecoder::new(file)
        .take(512)
        .read_to_end(&mut block)
        .is_ok()
}
