use std::fs::DirBuilder;
use std::path::Path;

use crate::{Error, Result};

/// Default mode for directories created on behalf of an extraction.
pub const DEFAULT_DIR_MODE: u32 = 0o777;

/// Create `path` and any missing parents.
///
/// On Unix every newly created component receives `mode` (still subject to
/// the process umask). Existing directories are left untouched. On other
/// platforms `mode` is ignored.
pub fn create_dir_all_with_mode(path: &Path, mode: u32) -> Result<()> {
    if path.is_dir() {
        return Ok(());
    }

    let mut builder = DirBuilder::new();
    builder.recursive(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(mode);
    }
    #[cfg(not(unix))]
    let _ = mode;

    builder.create(path).map_err(|e| Error::CreateDir {
        path: path.to_path_buf(),
        source: e,
    })?;
    tracing::debug!(path = %path.display(), mode = %format!("{mode:o}"), "created directory");
    Ok(())
}

/// Create the parent directory of `path` if it is missing.
pub fn ensure_parent(path: &Path, mode: u32) -> Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => create_dir_all_with_mode(parent, mode),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn creates_nested_directories() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("a/b/c");
        create_dir_all_with_mode(&target, DEFAULT_DIR_MODE).unwrap();
        assert!(target.is_dir());
    }

    #[test]
    fn existing_directory_is_ok() {
        let dir = tempdir().unwrap();
        create_dir_all_with_mode(dir.path(), 0o700).unwrap();
        assert!(dir.path().is_dir());
    }

    #[cfg(unix)]
    #[test]
    fn applies_mode_bits() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let target = dir.path().join("private");
        create_dir_all_with_mode(&target, 0o700).unwrap();
        let mode = std::fs::metadata(&target).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o700);
    }

    #[test]
    fn ensure_parent_of_relative_file_name() {
        ensure_parent(Path::new("file.txt"), DEFAULT_DIR_MODE).unwrap();
    }

    #[test]
    fn create_fails_when_file_in_the_way() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"x").unwrap();
        let result = create_dir_all_with_mode(&blocker.join("child"), DEFAULT_DIR_MODE);
        assert!(matches!(result, Err(Error::CreateDir { .. })));
    }
}
