use std::path::PathBuf;

/// Core error type for the bot client.
///
/// Adapter crates should map their specific errors into this type so the bootstrap
/// can turn any failure into a process exit code consistently.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid path: {path}: {reason}")]
    InvalidPath { path: PathBuf, reason: String },

    #[error("startup failed: {0}")]
    Startup(String),

    #[error("external error: {0}")]
    External(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Malformed command line input. Reported before any configuration work happens.
#[derive(Debug, thiserror::Error)]
pub enum ArgsError {
    #[error("malformed argument `{token}`: {message}")]
    Malformed { token: String, message: String },
}

/// Failure to read the persisted configuration file.
///
/// `NotFound` is tolerated silently by callers; everything else is logged and the
/// bootstrap continues with an empty file configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigLoadError {
    #[error("config file not found: {0}")]
    NotFound(PathBuf),

    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse {path}: {reason}")]
    Parse { path: PathBuf, reason: String },
}

/// The merged configuration is not usable. Always terminal for the process.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("no token provided")]
    MissingToken,

    #[error("no bot file provided")]
    MissingPayloadFile,

    #[error("bot file not found: {0}")]
    PayloadFileNotFound(PathBuf),

    #[error("unable to load bot file {path}: {reason}")]
    UnreadablePayloadFile { path: PathBuf, reason: String },

    #[error("no network mode configured (set `mode` in the config file)")]
    MissingMode,
}
