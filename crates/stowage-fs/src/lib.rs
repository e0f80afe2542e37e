//! Filesystem helpers shared by the stowage crates.
//!
//! - `dir.rs` - directory creation with explicit mode bits
//! - `staged.rs` - outputs staged beside their target and committed by rename
//! - `rw.rs` - atomic write and contextual read

mod dir;
mod error;
mod rw;
mod staged;

pub use dir::{DEFAULT_DIR_MODE, create_dir_all_with_mode, ensure_parent};
pub use error::{Error, Result};
pub use rw::{atomic_write, read};
pub use staged::{StagedOutput, same_file};
