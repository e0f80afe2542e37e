use std::fs::File;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::{Error, Result};

/// An output file written beside its final location and moved into place on
/// [`StagedOutput::commit`].
///
/// Until the commit the target is never opened, so a file already sitting at
/// the target survives a failed write. Dropping an uncommitted stage removes
/// the temp file.
#[derive(Debug)]
pub struct StagedOutput {
    target: PathBuf,
    tmp: NamedTempFile,
}

impl StagedOutput {
    /// Create the temp file in the target's directory, which must exist.
    pub fn new(target: impl Into<PathBuf>) -> Result<Self> {
        let target = target.into();
        let parent = match target.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            Some(_) => Path::new("."),
            None => return Err(Error::NoParent(target)),
        };

        let tmp = tempfile::Builder::new()
            .prefix(".stowage-")
            .suffix(".part")
            .tempfile_in(parent)
            .map_err(|e| Error::Write {
                path: parent.to_path_buf(),
                source: e,
            })?;
        Ok(Self { target, tmp })
    }

    /// Where the content goes until the commit.
    pub fn path(&self) -> &Path { self.tmp.path() }

    pub fn target(&self) -> &Path { &self.target }

    pub fn file(&mut self) -> &mut File { self.tmp.as_file_mut() }

    /// Move the staged content over the target and return the target path.
    pub fn commit(self) -> Result<PathBuf> {
        self.tmp.persist(&self.target).map_err(|e| Error::Write {
            path: self.target.clone(),
            source: e.error,
        })?;
        tracing::debug!(path = %self.target.display(), "committed staged output");
        Ok(self.target)
    }
}

/// Whether `a` and `b` name the same existing file, after resolving links.
pub fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
