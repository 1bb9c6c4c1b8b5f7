use std::{
    fmt, fs,
    path::{Path, PathBuf},
};

use tracing::warn;

use crate::{
    config::FileConfig, domain::NetworkMode, errors::ValidationError, merge::MergedConfig,
};

/// What the filesystem says about a candidate bot file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PayloadStatus {
    Usable,
    Missing,
    NotAFile,
    Unreadable,
}

impl PayloadStatus {
    pub fn describe(self) -> &'static str {
        match self {
            Self::Usable => "ok",
            Self::Missing => "does not exist",
            Self::NotAFile => "it is not a file (maybe it is a directory?)",
            Self::Unreadable => "no permission to read it",
        }
    }
}

pub fn inspect_payload(path: &Path) -> PayloadStatus {
    if !path.exists() {
        return PayloadStatus::Missing;
    }
    if !path.is_file() {
        return PayloadStatus::NotAFile;
    }
    match fs::File::open(path) {
        Ok(_) => PayloadStatus::Usable,
        Err(_) => PayloadStatus::Unreadable,
    }
}

/// Fully validated startup parameters. Only [`validate`] constructs one.
#[derive(Clone)]
pub struct EffectiveConfig {
    token: String,
    payload_file: PathBuf,
    mode: NetworkMode,
    data_folder: PathBuf,
    settings: FileConfig,
}

impl EffectiveConfig {
    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn payload_file(&self) -> &Path {
        &self.payload_file
    }

    pub fn mode(&self) -> NetworkMode {
        self.mode
    }

    pub fn data_folder(&self) -> &Path {
        &self.data_folder
    }

    /// The loaded config file, for transport specific keys.
    pub fn settings(&self) -> &FileConfig {
        &self.settings
    }
}

impl fmt::Debug for EffectiveConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EffectiveConfig")
            .field("token", &"<redacted>")
            .field("payload_file", &self.payload_file)
            .field("mode", &self.mode)
            .field("data_folder", &self.data_folder)
            .finish_non_exhaustive()
    }
}

/// Check the merged parameters: token, then bot file, then network mode.
pub fn validate(
    merged: MergedConfig,
    settings: FileConfig,
    data_folder: PathBuf,
) -> Result<EffectiveConfig, ValidationError> {
    let token = merged
        .token
        .filter(|t| !t.is_empty())
        .ok_or(ValidationError::MissingToken)?;

    if !merged.allow_help_ad {
        warn!("Detected allow-help-ad is false! :(");
    }

    let payload_file = merged
        .payload_file
        .ok_or(ValidationError::MissingPayloadFile)?;
    match inspect_payload(&payload_file) {
        PayloadStatus::Usable => {}
        PayloadStatus::Missing => {
            return Err(ValidationError::PayloadFileNotFound(payload_file));
        }
        status => {
            return Err(ValidationError::UnreadablePayloadFile {
                reason: status.describe().to_string(),
                path: payload_file,
            });
        }
    }

    let mode = NetworkMode::from_config_value(merged.mode.as_deref())
        .ok_or(ValidationError::MissingMode)?;

    Ok(EffectiveConfig {
        token,
        payload_file,
        mode,
        data_folder,
        settings,
    })
}
