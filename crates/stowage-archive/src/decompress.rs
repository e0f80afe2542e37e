use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use stowage_fs::{StagedOutput, create_dir_all_with_mode, ensure_parent, same_file};
use stowage_platform::Invocation;
use zip::ZipArchive;
use zip::result::ZipError;

use crate::archiver::Archiver;
use crate::format::{Format, strip_extension};
use crate::{Error, Result};

/// Candidate suffixes tried by [`find_archive`], compressed forms first.
const SEARCH_ORDER: [Format; 4] = [Format::Zstd, Format::Gzip, Format::Zip, Format::Plain];

impl Archiver {
    /// Decompress `src` into `dst_dir` and return the path of the result.
    ///
    /// `.zst` and `.gz` are written under the source name minus the
    /// extension. `.zip` is fully extracted and the returned path is the
    /// entry named like the archive without `.zip`, else the entry with that
    /// stem, else the first file entry. Anything else is copied as is.
    /// `dst_dir` is created with the configured mode when missing.
    ///
    /// Outputs are staged and only moved into place once complete. An output
    /// that would replace `src` itself fails with [`Error::OverwritesSource`]
    /// before anything is written.
    pub fn decompress_to_file(
        &self,
        src: impl AsRef<Path>,
        dst_dir: impl AsRef<Path>,
    ) -> Result<PathBuf> {
        let src = src.as_ref();
        let dst_dir = dst_dir.as_ref();
        ensure_source(src)?;

        let format = Format::from_path(src);
        tracing::debug!(src = %src.display(), ?format, "decompressing to file");
        create_dir_all_with_mode(dst_dir, self.settings.dir_mode())?;

        let name = file_name(src);
        match format {
            Format::Zip => self.extract_zip(src, dst_dir),
            Format::Zstd | Format::Gzip => {
                let ext = format.extension().unwrap_or_default();
                let target = dst_dir.join(strip_extension(&name, ext));
                let staged = stage_beside(src, target)?;
                self.decode_stream(format, src, staged.path())?;
                Ok(staged.commit()?)
            }
            Format::Plain => {
                let target = dst_dir.join(&name);
                if same_file(src, &target) {
                    return Ok(target);
                }
                let staged = StagedOutput::new(target)?;
                std::fs::copy(src, staged.path())?;
                Ok(staged.commit()?)
            }
        }
    }

    /// Decompress `src` into memory and decode it as UTF-8.
    pub fn decompress_to_string(&self, src: impl AsRef<Path>) -> Result<String> {
        let src = src.as_ref();
        let bytes = self.decompress_to_bytes(src)?;
        String::from_utf8(bytes).map_err(|_| Error::InvalidUtf8 {
            path: src.to_path_buf(),
        })
    }

    pub fn decompress_to_bytes(&self, src: impl AsRef<Path>) -> Result<Vec<u8>> {
        let src = src.as_ref();
        ensure_source(src)?;

        match Format::from_path(src) {
            Format::Plain => Ok(stowage_fs::read(src)?),
            Format::Zip => read_zip_member(src),
            format => {
                let tmp = tempfile::Builder::new().prefix("stowage-").tempfile()?;
                self.decode_stream(format, src, tmp.path())?;
                Ok(stowage_fs::read(tmp.path())?)
            }
        }
    }

    /// Return the content of the first of `<filename>.zst`, `.gz`, `.zip`
    /// and bare `<filename>` that exists in `directory`.
    pub fn find_and_decompress_archive(
        &self,
        directory: impl AsRef<Path>,
        filename: &str,
    ) -> Result<String> {
        let directory = directory.as_ref();
        let found = find_archive(directory, filename).ok_or_else(|| Error::NotFound {
            path: directory.join(filename),
        })?;
        tracing::debug!(found = %found.display(), "archive candidate selected");
        self.decompress_to_string(found)
    }

    fn decode_stream(&self, format: Format, src: &Path, target: &Path) -> Result<()> {
        let tool = match format {
            Format::Zstd => ["zstd"].into_iter().find(|t| self.probe.available(t)),
            Format::Gzip => ["pigz", "gzip"].into_iter().find(|t| self.probe.available(t)),
            Format::Zip | Format::Plain => None,
        };

        let failed = |message: String| Error::DecompressionFailed {
            path: src.to_path_buf(),
            message,
        };

        if let Some(tool) = tool {
            let invocation = Invocation::new(tool)
                .args(["-d", "-q", "-c"])
                .stdin(src)
                .stdout(target);
            let output = self.runner.run(&invocation).map_err(|e| failed(e.to_string()))?;
            if !output.success() {
                return Err(failed(output.diagnostic()));
            }
            return Ok(());
        }

        tracing::debug!(src = %src.display(), ?format, "no external tool, decoding in process");
        let input = File::open(src)?;
        let mut output = File::create(target)?;
        let copied = match format {
            Format::Zstd => zstd::stream::read::Decoder::new(input)
                .and_then(|mut decoder| io::copy(&mut decoder, &mut output)),
            Format::Gzip => io::copy(&mut flate2::read::MultiGzDecoder::new(input), &mut output),
            Format::Zip | Format::Plain => io::copy(&mut io::BufReader::new(input), &mut output),
        };
        copied.map(drop).map_err(|e| failed(e.to_string()))
    }

    fn extract_zip(&self, src: &Path, dst_dir: &Path) -> Result<PathBuf> {
        let mut archive = open_zip(src)?;
        let entries = list_entries(src, &mut archive)?;
        if let Some(entry) = entries.iter().find(|e| e.encrypted) {
            return Err(Error::PasswordRequired {
                path: src.to_path_buf(),
                entry: entry.name.clone(),
            });
        }
        let main = main_member(&entries, strip_extension(&file_name(src), "zip")).ok_or_else(
            || Error::InvalidArchive {
                path: src.to_path_buf(),
                message: "archive has no file entries".to_string(),
            },
        )?;

        let mode = self.settings.dir_mode();
        // Nothing reaches its final path until every entry has been read.
        let mut staged_entries = Vec::with_capacity(entries.len());
        let mut main_path = None;
        for (index, meta) in entries.iter().enumerate() {
            let mut entry = archive
                .by_index(index)
                .map_err(|e| zip_read_error(src, e))?;
            let relative = entry
                .enclosed_name()
                .map(|p| p.to_path_buf())
                .ok_or_else(|| Error::InvalidArchive {
                    path: src.to_path_buf(),
                    message: format!("entry '{}' escapes the destination", meta.name),
                })?;
            let target = dst_dir.join(relative);

            if meta.is_dir {
                create_dir_all_with_mode(&target, mode)?;
                continue;
            }

            ensure_parent(&target, mode)?;
            let mut staged = stage_beside(src, target)?;
            io::copy(&mut entry, staged.file()).map_err(|e| Error::DecompressionFailed {
                path: src.to_path_buf(),
                message: format!("{}: {e}", meta.name),
            })?;
            if index == main {
                main_path = Some(staged.target().to_path_buf());
            }
            staged_entries.push(staged);
        }

        let count = staged_entries.len();
        for staged in staged_entries {
            staged.commit()?;
        }
        tracing::info!(src = %src.display(), dst = %dst_dir.display(), files = count, "extracted zip");
        main_path.ok_or_else(|| Error::InvalidArchive {
            path: src.to_path_buf(),
            message: "main entry was not extracted".to_string(),
        })
    }
}

/// Path of the first existing candidate for `filename` in `directory`,
/// trying `.zst`, `.gz`, `.zip` and then the bare name.
pub fn find_archive(directory: impl AsRef<Path>, filename: &str) -> Option<PathBuf> {
    let directory = directory.as_ref();
    SEARCH_ORDER
        .into_iter()
        .map(|format| match format.extension() {
            Some(ext) => directory.join(format!("{filename}.{ext}")),
            None => directory.join(filename),
        })
        .find(|candidate| candidate.is_file())
}

/// Header-level facts about one zip entry, read without a password.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct EntryMeta {
    pub name: String,
    pub is_dir: bool,
    pub encrypted: bool,
}

pub(crate) fn open_zip(path: &Path) -> Result<ZipArchive<File>> {
    let file = File::open(path).map_err(|_| Error::NotFound {
        path: path.to_path_buf(),
    })?;
    ZipArchive::new(file).map_err(|e| Error::InvalidArchive {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

pub(crate) fn list_entries(path: &Path, archive: &mut ZipArchive<File>) -> Result<Vec<EntryMeta>> {
    (0..archive.len())
        .map(|index| {
            let entry = archive.by_index_raw(index).map_err(|e| Error::InvalidArchive {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
            Ok(EntryMeta {
                name: entry.name().to_string(),
                is_dir: entry.is_dir(),
                encrypted: entry.encrypted(),
            })
        })
        .collect()
}

/// Index of the member a single-file extraction reports.
///
/// The entry whose file name equals `base` wins, then the entry whose file
/// stem equals `base`, then the first file entry in container order.
pub(crate) fn main_member(entries: &[EntryMeta], base: &str) -> Option<usize> {
    let files = || entries.iter().enumerate().filter(|(_, e)| !e.is_dir);
    let leaf = |name: &str| -> String {
        Path::new(name)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    };
    let stem = |name: &str| -> String {
        Path::new(name)
            .file_stem()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    };

    files()
        .find(|(_, e)| leaf(&e.name) == base)
        .or_else(|| files().find(|(_, e)| stem(&e.name) == base))
        .or_else(|| files().next())
        .map(|(index, _)| index)
}

pub(crate) fn zip_read_error(path: &Path, err: ZipError) -> Error {
    match err {
        ZipError::UnsupportedArchive(message) => Error::UnsupportedFormat {
            path: path.to_path_buf(),
            message: message.to_string(),
        },
        ZipError::Io(e) => Error::DecompressionFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        },
        other => Error::InvalidArchive {
            path: path.to_path_buf(),
            message: other.to_string(),
        },
    }
}

fn read_zip_member(src: &Path) -> Result<Vec<u8>> {
    let mut archive = open_zip(src)?;
    let entries = list_entries(src, &mut archive)?;
    let main = main_member(&entries, strip_extension(&file_name(src), "zip")).ok_or_else(|| {
        Error::InvalidArchive {
            path: src.to_path_buf(),
            message: "archive has no file entries".to_string(),
        }
    })?;
    if entries[main].encrypted {
        return Err(Error::PasswordRequired {
            path: src.to_path_buf(),
            entry: entries[main].name.clone(),
        });
    }

    let mut entry = archive.by_index(main).map_err(|e| zip_read_error(src, e))?;
    let mut content = Vec::new();
    entry
        .read_to_end(&mut content)
        .map_err(|e| Error::DecompressionFailed {
            path: src.to_path_buf(),
            message: e.to_string(),
        })?;
    Ok(content)
}

fn ensure_source(src: &Path) -> Result<()> {
    if src.is_file() {
        Ok(())
    } else {
        Err(Error::NotFound {
            path: src.to_path_buf(),
        })
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Stage an output for `target`, refusing when it would replace `src`.
fn stage_beside(src: &Path, target: PathBuf) -> Result<StagedOutput> {
    if same_file(src, &target) {
        return Err(Error::OverwritesSource { path: target });
    }
    Ok(StagedOutput::new(target)?)
}
