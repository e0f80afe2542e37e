use std::io::Write;
use std::path::{Path, PathBuf};

use stowage_fs::{StagedOutput, atomic_write, ensure_parent, read, same_file};
use tempfile::tempdir;

fn write_staged(path: &Path, content: &[u8], complete: bool) -> Option<PathBuf> {
    ensure_parent(path, stowage_fs::DEFAULT_DIR_MODE).unwrap();
    let mut staged = StagedOutput::new(path).unwrap();
    staged.file().write_all(content).unwrap();
    complete.then(|| staged.commit().unwrap())
}

#[test]
fn abandoned_output_leaves_nothing_behind() {
    let dir = tempdir().unwrap();
    let target = dir.path().join("nested/deeper/out.zst");

    assert_eq!(write_staged(&target, b"partial", false), None);
    assert!(!target.exists());
    let parent = target.parent().unwrap();
    assert!(parent.is_dir());
    assert_eq!(std::fs::read_dir(parent).unwrap().count(), 0);
}

#[test]
fn committed_output_replaces_previous_file() {
    let dir = tempdir().unwrap();
    let target = dir.path().join("out/dump.sql.gz");
    write_staged(&target, b"first", true).unwrap();

    let kept = write_staged(&target, b"second", true).unwrap();
    assert_eq!(kept, target);
    assert_eq!(read(&kept).unwrap(), b"second");
}

#[test]
fn staging_beside_the_source_never_touches_it() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("dump.sql.gz");
    std::fs::write(&source, b"original bytes").unwrap();

    assert!(same_file(&source, &dir.path().join("dump.sql.gz")));
    let staged = StagedOutput::new(&source).unwrap();
    assert!(!same_file(&source, staged.path()));
    drop(staged);
    assert_eq!(read(&source).unwrap(), b"original bytes");
}

#[test]
fn atomic_write_into_created_directory() {
    let dir = tempdir().unwrap();
    let target = dir.path().join("restore/backup.sql");
    ensure_parent(&target, 0o755).unwrap();
    atomic_write(&target, b"CREATE TABLE t (id INT);").unwrap();
    assert_eq!(read(&target).unwrap(), b"CREATE TABLE t (id INT);");
}
