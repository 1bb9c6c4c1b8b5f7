use std::{
    fs, io,
    path::{Path, PathBuf},
};

use serde_yaml::{Mapping, Value};
use tracing::error;

use crate::errors::ConfigLoadError;

pub const CONFIG_FILE_NAME: &str = "kbc.yml";
pub const DATA_FOLDER_NAME: &str = "bot";

/// Well-known locations used during startup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StartupPaths {
    pub config_file: PathBuf,
    pub data_folder: PathBuf,
}

impl StartupPaths {
    /// `kbc.yml` and `bot/` under `base`.
    pub fn in_dir(base: impl AsRef<Path>) -> Self {
        let base = base.as_ref();
        Self {
            config_file: base.join(CONFIG_FILE_NAME),
            data_folder: base.join(DATA_FOLDER_NAME),
        }
    }
}

impl Default for StartupPaths {
    /// Relative to the process working directory.
    fn default() -> Self {
        Self {
            config_file: PathBuf::from(CONFIG_FILE_NAME),
            data_folder: PathBuf::from(DATA_FOLDER_NAME),
        }
    }
}

/// Key/value view of the persisted configuration file.
///
/// Only the top level mapping is addressable; keys are plain strings such as `bot-file`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FileConfig {
    values: Mapping,
}

impl FileConfig {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn load(path: &Path) -> Result<Self, ConfigLoadError> {
        let text = fs::read_to_string(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => ConfigLoadError::NotFound(path.to_path_buf()),
            _ => ConfigLoadError::Io {
                path: path.to_path_buf(),
                source: e,
            },
        })?;
        Self::parse(&text).map_err(|reason| ConfigLoadError::Parse {
            path: path.to_path_buf(),
            reason,
        })
    }

    /// Load `path`, falling back to an empty configuration.
    ///
    /// A missing file is expected on some setups and stays silent; other failures are logged.
    pub fn load_or_empty(path: &Path) -> Self {
        match Self::load(path) {
            Ok(cfg) => cfg,
            Err(ConfigLoadError::NotFound(_)) => Self::empty(),
            Err(e) => {
                error!(error = %e, "Cannot load config file, continuing without it");
                Self::empty()
            }
        }
    }

    pub fn parse(text: &str) -> std::result::Result<Self, String> {
        let value: Value = serde_yaml::from_str(text).map_err(|e| e.to_string())?;
        match value {
            Value::Null => Ok(Self::empty()),
            Value::Mapping(values) => Ok(Self { values }),
            other => Err(format!(
                "top-level value must be a mapping, found {}",
                kind_name(&other)
            )),
        }
    }

    /// String value of `key`. Numbers and booleans are stringified; null and nested
    /// values count as absent.
    pub fn get_string(&self, key: &str) -> Option<String> {
        match self.values.get(key)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    pub fn get_bool(&self, key: &str, default: bool) -> bool {
        match self.values.get(key) {
            Some(Value::Bool(b)) => *b,
            Some(Value::String(s)) => match s.trim().to_lowercase().as_str() {
                "true" => true,
                "false" => false,
                _ => default,
            },
            _ => default,
        }
    }

    pub fn get_u64(&self, key: &str, default: u64) -> u64 {
        match self.values.get(key) {
            Some(Value::Number(n)) => n.as_u64().unwrap_or(default),
            Some(Value::String(s)) => s.trim().parse::<u64>().unwrap_or(default),
            _ => default,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

fn kind_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Sequence(_) => "sequence",
        Value::Mapping(_) => "mapping",
        Value::Tagged(_) => "tagged value",
    }
}
