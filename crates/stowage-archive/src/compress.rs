use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use stowage_fs::StagedOutput;
use stowage_platform::Invocation;
use zip::write::{FileOptions, SimpleFileOptions};
use zip::{AesMode, CompressionMethod, ZipWriter};

use crate::archiver::Archiver;
use crate::backend::Backend;
use crate::format::strip_extension;
use crate::settings::Settings;
use crate::{Error, Result};

impl Archiver {
    /// Compress `src` into `dst` plus the backend's extension.
    ///
    /// `dst` is a base path: `.zst`, `.gz` or `.zip` is appended unless it is
    /// already there. With no explicit backend the best available one is used.
    ///
    /// Output is staged beside the final path and renamed over it on success,
    /// so a file already there survives a failed run. A final path that is
    /// `src` itself is refused with [`Error::OverwritesSource`].
    pub fn compress_file(
        &self,
        src: impl AsRef<Path>,
        dst: impl AsRef<Path>,
        backend: Option<Backend>,
    ) -> Result<PathBuf> {
        let src = src.as_ref();
        let entry = file_name(src);
        self.compress_path(src, &entry, dst.as_ref(), backend, None)
    }

    /// Compress in-memory `content` the same way as [`Archiver::compress_file`].
    ///
    /// The bytes go through a temp file that is removed whether or not
    /// compression succeeds.
    pub fn compress_content(
        &self,
        content: &[u8],
        dst: impl AsRef<Path>,
        backend: Option<Backend>,
    ) -> Result<PathBuf> {
        let dst = dst.as_ref();
        if let Some(limit) = self.settings.max_size() {
            let size = content.len() as u64;
            if size > limit {
                return Err(Error::SizeLimitExceeded {
                    path: dst.to_path_buf(),
                    size,
                    limit,
                });
            }
        }

        let mut tmp = tempfile::Builder::new().prefix("stowage-").tempfile()?;
        tmp.write_all(content)?;
        tmp.flush()?;

        let entry = strip_extension(&file_name(dst), Backend::Zip.extension()).to_string();
        self.compress_path(tmp.path(), &entry, dst, backend, None)
    }

    /// Write `src` into a `.zip` whose single entry is AES-256 encrypted.
    pub fn compress_file_encrypted(
        &self,
        src: impl AsRef<Path>,
        dst: impl AsRef<Path>,
        password: &str,
    ) -> Result<PathBuf> {
        let src = src.as_ref();
        let entry = file_name(src);
        self.compress_path(src, &entry, dst.as_ref(), Some(Backend::Zip), Some(password))
    }

    fn compress_path(
        &self,
        src: &Path,
        entry: &str,
        dst: &Path,
        backend: Option<Backend>,
        password: Option<&str>,
    ) -> Result<PathBuf> {
        let size = self.check_source(src)?;
        let backend = backend.unwrap_or_else(|| self.pick_best_backend());
        let target = with_extension(dst, backend.extension());
        if stowage_fs::same_file(src, &target) {
            return Err(Error::OverwritesSource { path: target });
        }
        stowage_fs::ensure_parent(&target, self.settings.dir_mode())?;

        let mut staged = StagedOutput::new(&target)?;
        match backend.tool() {
            Some(tool) => self.run_compressor(backend, tool, src, staged.path())?,
            None => {
                let options = zip_options(&self.settings, size);
                let written = match password {
                    Some(password) => write_zip(
                        src,
                        staged.file(),
                        entry,
                        options.with_aes_encryption(AesMode::Aes256, password),
                    ),
                    None => write_zip(src, staged.file(), entry, options),
                };
                written.map_err(|e| Error::CompressionFailed {
                    backend,
                    message: e.to_string(),
                })?;
            }
        }
        let target = staged.commit()?;

        tracing::info!(
            src = %src.display(),
            dst = %target.display(),
            %backend,
            "compressed"
        );
        Ok(target)
    }

    /// Existence and size guard, run before any backend is touched.
    fn check_source(&self, src: &Path) -> Result<u64> {
        let metadata = match std::fs::metadata(src) {
            Ok(m) if m.is_file() => m,
            _ => {
                return Err(Error::NotFound {
                    path: src.to_path_buf(),
                });
            }
        };
        let size = metadata.len();
        match self.settings.max_size() {
            Some(limit) if size > limit => {
                tracing::warn!(path = %src.display(), size, limit, "source over size limit");
                Err(Error::SizeLimitExceeded {
                    path: src.to_path_buf(),
                    size,
                    limit,
                })
            }
            _ => Ok(size),
        }
    }

    fn run_compressor(&self, backend: Backend, tool: &str, src: &Path, target: &Path) -> Result<()> {
        let invocation = Invocation::new(tool)
            .args(compress_args(backend, &self.settings))
            .stdin(src)
            .stdout(target);

        let output = self
            .runner
            .run(&invocation)
            .map_err(|e| Error::CompressionFailed {
                backend,
                message: e.to_string(),
            })?;

        if !output.success() {
            return Err(Error::CompressionFailed {
                backend,
                message: output.diagnostic(),
            });
        }
        Ok(())
    }
}

/// Command-line flags for a tool backend, built from the current settings.
pub(crate) fn compress_args(backend: Backend, settings: &Settings) -> Vec<String> {
    let mut args = Vec::new();
    match backend {
        Backend::Zstd => {
            if settings.level() > 19 {
                args.push("--ultra".to_string());
            }
            args.push(format!("-{}", settings.level()));
            args.push(format!("-T{}", settings.threads()));
        }
        Backend::Pigz => {
            args.push(format!("-{}", settings.deflate_level()));
            if settings.threads() > 0 {
                args.push("-p".to_string());
                args.push(settings.threads().to_string());
            }
        }
        Backend::Gzip => args.push(format!("-{}", settings.deflate_level())),
        Backend::Zip => return args,
    }
    args.push("-q".to_string());
    args.push("-c".to_string());
    args
}

/// Append `.ext` to `path` unless the path already ends with it.
pub(crate) fn with_extension(path: &Path, ext: &str) -> PathBuf {
    let has_ext = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(ext));
    if has_ext {
        return path.to_path_buf();
    }
    let mut name = path.as_os_str().to_os_string();
    name.push(".");
    name.push(ext);
    PathBuf::from(name)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "content".to_string())
}

fn zip_options(settings: &Settings, size: u64) -> SimpleFileOptions {
    SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .compression_level(Some(i64::from(settings.deflate_level())))
        .large_file(size >= u64::from(u32::MAX))
}

fn write_zip(
    src: &Path,
    out: &mut File,
    entry: &str,
    options: FileOptions<'_, ()>,
) -> zip::result::ZipResult<()> {
    let mut input = File::open(src)?;
    let mut writer = ZipWriter::new(out);
    writer.start_file(entry, options)?;
    io::copy(&mut input, &mut writer)?;
    writer.finish()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_appended_once() {
        assert_eq!(
            with_extension(Path::new("out/dump.sql"), "zst"),
            PathBuf::from("out/dump.sql.zst")
        );
        assert_eq!(
            with_extension(Path::new("out/dump.sql.zst"), "zst"),
            PathBuf::from("out/dump.sql.zst")
        );
        assert_eq!(
            with_extension(Path::new("out/dump.sql.gz"), "zip"),
            PathBuf::from("out/dump.sql.gz.zip")
        );
    }

    #[test]
    fn zstd_args_follow_settings() {
        let mut settings = Settings::default();
        assert_eq!(compress_args(Backend::Zstd, &settings), ["-19", "-T0", "-q", "-c"]);

        settings.set_level(22).unwrap();
        settings.set_threads(4);
        assert_eq!(
            compress_args(Backend::Zstd, &settings),
            ["--ultra", "-22", "-T4", "-q", "-c"]
        );
    }

    #[test]
    fn gzip_family_args_clamp_level() {
        let mut settings = Settings::default();
        assert_eq!(compress_args(Backend::Gzip, &settings), ["-9", "-q", "-c"]);
        assert_eq!(compress_args(Backend::Pigz, &settings), ["-9", "-q", "-c"]);

        settings.set_threads(2);
        settings.set_level(4).unwrap();
        assert_eq!(
            compress_args(Backend::Pigz, &settings),
            ["-4", "-p", "2", "-q", "-c"]
        );
    }

    #[test]
    fn zip_has_no_args() {
        assert!(compress_args(Backend::Zip, &Settings::default()).is_empty());
    }
}
