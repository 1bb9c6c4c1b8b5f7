use kbc_core::{config::FileConfig, domain::NetworkMode, errors::Error, Result};

pub const KEY_COMPRESS: &str = "compress";
pub const KEY_WEBHOOK_PORT: &str = "webhook-port";
pub const KEY_WEBHOOK_ROUTE: &str = "webhook-route";

const DEFAULT_WEBHOOK_PORT: u64 = 8080;
const DEFAULT_WEBHOOK_ROUTE: &str = "kbc-webhook";

/// Transport specific settings read from the config file at start.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TransportSettings {
    Persistent { compress: bool },
    Webhook { port: u16, route: String },
}

impl TransportSettings {
    pub fn from_config(mode: NetworkMode, cfg: &FileConfig) -> Result<Self> {
        match mode {
            NetworkMode::Default => Ok(Self::Persistent {
                compress: cfg.get_bool(KEY_COMPRESS, true),
            }),
            NetworkMode::Webhook => {
                let raw_port = cfg.get_u64(KEY_WEBHOOK_PORT, DEFAULT_WEBHOOK_PORT);
                let port = u16::try_from(raw_port)
                    .ok()
                    .filter(|p| *p != 0)
                    .ok_or_else(|| {
                        Error::Config(format!(
                            "{KEY_WEBHOOK_PORT} must be between 1 and 65535, got {raw_port}"
                        ))
                    })?;

                let route = cfg
                    .get_string(KEY_WEBHOOK_ROUTE)
                    .unwrap_or_else(|| DEFAULT_WEBHOOK_ROUTE.to_string());
                let route = route.trim().trim_matches('/').to_string();
                if route.is_empty() {
                    return Err(Error::Config(format!("{KEY_WEBHOOK_ROUTE} must not be empty")));
                }

                Ok(Self::Webhook { port, route })
            }
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Self::Persistent { compress } => format!("persistent connection (compress={compress})"),
            Self::Webhook { port, route } => format!("webhook on port {port}, route /{route}"),
        }
    }
}
