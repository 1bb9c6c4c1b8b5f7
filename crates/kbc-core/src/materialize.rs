//! First-run materialization of the config file and the data folder.

use std::{
    fs,
    io::{self, Write},
    path::Path,
};

use tracing::{info, warn};

use crate::{config::StartupPaths, errors::Error, Result};

/// Default configuration shipped with the binary.
pub const DEFAULT_CONFIG_TEMPLATE: &[u8] = include_bytes!("../resources/kbc.yml");

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Materialized {
    Created,
    AlreadyPresent,
    Failed,
}

/// Make sure the config file and data folder exist. Never fatal.
pub fn materialize(paths: &StartupPaths) -> Materialized {
    let outcome = match ensure_config_file(&paths.config_file, DEFAULT_CONFIG_TEMPLATE) {
        Ok(true) => {
            info!(path = %paths.config_file.display(), "Saved default config file");
            Materialized::Created
        }
        Ok(false) => Materialized::AlreadyPresent,
        Err(e) => {
            warn!(
                path = %paths.config_file.display(),
                error = %e,
                "Cannot save default config file"
            );
            Materialized::Failed
        }
    };

    if let Err(e) = ensure_data_folder(&paths.data_folder) {
        warn!(
            path = %paths.data_folder.display(),
            error = %e,
            "Cannot create bot data folder"
        );
    }

    outcome
}

/// Copy `template` to `path` unless something already lives there.
///
/// Returns whether the file was created. An existing file is never touched.
pub fn ensure_config_file(path: &Path, template: &[u8]) -> Result<bool> {
    let mut file = match fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
    {
        Ok(f) => f,
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => return Ok(false),
        Err(e) => return Err(Error::Io(e)),
    };

    if let Err(e) = file.write_all(template).and_then(|_| file.sync_all()) {
        drop(file);
        // A truncated config would be picked up as-is on the next start.
        let _ = fs::remove_file(path);
        return Err(Error::Io(e));
    }
    Ok(true)
}

pub fn ensure_data_folder(path: &Path) -> Result<()> {
    if path.is_dir() {
        return Ok(());
    }
    if path.exists() {
        return Err(Error::InvalidPath {
            path: path.to_path_buf(),
            reason: "exists but is not a directory".to_string(),
        });
    }
    fs::create_dir_all(path)?;
    Ok(())
}
