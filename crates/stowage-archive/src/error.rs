use std::io;
use std::path::PathBuf;

use crate::backend::Backend;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("source not found: {path}")]
    NotFound { path: PathBuf },

    #[error("{path} is {size} bytes, over the configured limit of {limit} bytes")]
    SizeLimitExceeded { path: PathBuf, size: u64, limit: u64 },

    #[error("{backend} compression failed: {message}")]
    CompressionFailed { backend: Backend, message: String },

    #[error("refusing to overwrite the source file {path}")]
    OverwritesSource { path: PathBuf },

    #[error("failed to decompress {path}: {message}")]
    DecompressionFailed { path: PathBuf, message: String },

    #[error("unsupported format in {path}: {message}")]
    UnsupportedFormat { path: PathBuf, message: String },

    #[error("invalid archive {path}: {message}")]
    InvalidArchive { path: PathBuf, message: String },

    #[error("no matching entry in {path}")]
    NoMatchingEntry { path: PathBuf },

    #[error("failed to decrypt '{entry}' in {path}")]
    DecryptionFailed { path: PathBuf, entry: String },

    #[error("'{entry}' in {path} is encrypted and needs a password")]
    PasswordRequired { path: PathBuf, entry: String },

    #[error("decompressed content of {path} is not valid UTF-8")]
    InvalidUtf8 { path: PathBuf },

    #[error("invalid setting {name}: {value}")]
    InvalidSetting { name: &'static str, value: String },

    #[error("invalid settings file: {0}")]
    Config(#[from] toml::de::Error),

    #[error(transparent)]
    Fs(#[from] stowage_fs::Error),

    #[error(transparent)]
    Platform(#[from] stowage_platform::Error),

    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
