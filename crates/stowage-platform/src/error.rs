use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("command not found: {cmd}")]
    CommandNotFound { cmd: String },

    #[error("command failed: {cmd}, source: {source}")]
    CommandFailed { cmd: String, source: std::io::Error },

    #[error("failed to redirect {stream} for {cmd}: {source}")]
    Redirect {
        cmd: String,
        stream: &'static str,
        source: std::io::Error,
    },
}
