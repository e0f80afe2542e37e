use std::io::Read;
use std::path::{Path, PathBuf};

use zip::result::ZipError;

use crate::archiver::Archiver;
use crate::decompress::{list_entries, open_zip};
use crate::{Error, Result};

/// Default member picked from a password-protected container: a `.sql` dump.
pub fn is_sql_dump(name: &str) -> bool {
    Path::new(name)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("sql"))
}

impl Archiver {
    /// Decrypt the first `.sql` entry of `zip_path` into `dst_dir`.
    pub fn extract_password_protected_zip(
        &self,
        zip_path: impl AsRef<Path>,
        password: &str,
        dst_dir: impl AsRef<Path>,
    ) -> Result<PathBuf> {
        self.extract_password_protected_zip_matching(zip_path, password, dst_dir, is_sql_dump)
    }

    /// Decrypt the first entry, in container order, whose name satisfies
    /// `predicate` and write it to `dst_dir` under its base name.
    ///
    /// A wrong password or a corrupt encrypted stream is
    /// [`Error::DecryptionFailed`]; an I/O failure while reading the entry
    /// header is [`Error::Io`]; no candidate at all is
    /// [`Error::NoMatchingEntry`]. Nothing is written unless decryption
    /// succeeds completely.
    pub fn extract_password_protected_zip_matching<F>(
        &self,
        zip_path: impl AsRef<Path>,
        password: &str,
        dst_dir: impl AsRef<Path>,
        predicate: F,
    ) -> Result<PathBuf>
    where
        F: Fn(&str) -> bool,
    {
        let zip_path = zip_path.as_ref();
        let dst_dir = dst_dir.as_ref();

        let (name, content) = {
            let mut archive = open_zip(zip_path)?;
            let entries = list_entries(zip_path, &mut archive)?;
            let (index, meta) = entries
                .iter()
                .enumerate()
                .find(|(_, e)| !e.is_dir && predicate(e.name.as_str()))
                .ok_or_else(|| Error::NoMatchingEntry {
                    path: zip_path.to_path_buf(),
                })?;

            let mut entry = archive
                .by_index_decrypt(index, password.as_bytes())
                .map_err(|e| open_entry_error(zip_path, &meta.name, e))?;

            let mut content = Vec::new();
            entry
                .read_to_end(&mut content)
                .map_err(|_| Error::DecryptionFailed {
                    path: zip_path.to_path_buf(),
                    entry: meta.name.clone(),
                })?;
            (meta.name.clone(), content)
        };

        let leaf = Path::new(&name)
            .file_name()
            .ok_or_else(|| Error::NoMatchingEntry {
                path: zip_path.to_path_buf(),
            })?;
        stowage_fs::create_dir_all_with_mode(dst_dir, self.settings.dir_mode())?;
        let target = dst_dir.join(leaf);
        stowage_fs::atomic_write(&target, &content)?;

        tracing::info!(
            src = %zip_path.display(),
            entry = %name,
            dst = %target.display(),
            "extracted encrypted entry"
        );
        Ok(target)
    }
}

/// Classify a failure to open an encrypted entry. Only a rejected password
/// counts as a decryption failure at this stage.
fn open_entry_error(path: &Path, entry: &str, err: ZipError) -> Error {
    match err {
        ZipError::InvalidPassword => Error::DecryptionFailed {
            path: path.to_path_buf(),
            entry: entry.to_string(),
        },
        ZipError::Io(e) => Error::Io(e),
        ZipError::UnsupportedArchive(message) => Error::UnsupportedFormat {
            path: path.to_path_buf(),
            message: message.to_string(),
        },
        other => Error::InvalidArchive {
            path: path.to_path_buf(),
            message: other.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn sql_dump_predicate() {
        assert!(is_sql_dump("backup.sql"));
        assert!(is_sql_dump("nested/dir/BACKUP.SQL"));
        assert!(!is_sql_dump("backup.sql.gz"));
        assert!(!is_sql_dump("sql"));
        assert!(!is_sql_dump("readme.txt"));
    }

    #[test]
    fn header_io_error_is_not_a_decryption_failure() {
        let path = Path::new("backup.zip");
        let err = io::Error::new(io::ErrorKind::UnexpectedEof, "truncated header");
        assert!(matches!(
            open_entry_error(path, "backup.sql", ZipError::Io(err)),
            Error::Io(_)
        ));
        assert!(matches!(
            open_entry_error(path, "backup.sql", ZipError::InvalidPassword),
            Error::DecryptionFailed { ref entry, .. } if entry == "backup.sql"
        ));
        assert!(matches!(
            open_entry_error(path, "backup.sql", ZipError::FileNotFound),
            Error::InvalidArchive { .. }
        ));
    }
}
