//! Single-file compression facade with backend selection and archive probing.
//!
//! # Architecture
//!
//! - `backend.rs` - Backend identifiers and priority selection
//! - `settings.rs` - Level, threads, size limit and directory mode
//! - `archiver.rs` - Context object owning settings, tool cache and runner
//! - `compress.rs` - Compression dispatch
//! - `decompress.rs` - Decompression dispatch and archive search
//! - `probe.rs` - Validity and encryption probes
//! - `encrypted.rs` - Password-protected single-member extraction
//! - `format.rs` - Extension and magic-byte classification

pub use archiver::Archiver;
pub use backend::{Backend, ParseBackendError, pick_best_backend};
pub use decompress::find_archive;
pub use encrypted::is_sql_dump;
pub use error::{Error, Result};
pub use format::{Format, detect_format, sniff};
pub use probe::{ArchiveInfo, inspect, is_password_protected, validate_archive};
pub use settings::Settings;
pub use stowage_platform::{Invocation, ToolOutput, ToolProbe, ToolRunner};

mod archiver;
pub mod backend;
mod compress;
mod decompress;
mod encrypted;
mod error;
pub mod format;
mod probe;
pub mod settings;
