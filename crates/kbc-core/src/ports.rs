use std::{path::Path, sync::Arc};

use async_trait::async_trait;

use crate::{domain::NetworkMode, terminal::TerminalOptions, validate::EffectiveConfig, Result};

/// Lifecycle of a bot client, implemented by adapter crates.
///
/// `start` is called once, then `run` once on success. `shutdown` may be called from any
/// task, concurrently with `run`, and more than once; it must make `run` return.
#[async_trait]
pub trait BotClient: Send + Sync {
    fn mode(&self) -> NetworkMode;

    /// Load the bot file and authenticate. An error aborts startup.
    async fn start(&self, payload_file: &Path, token: &str) -> Result<()>;

    /// Block until the process should exit.
    async fn run(&self) -> Result<()>;

    async fn shutdown(&self);
}

/// Everything a client variant is constructed from.
#[derive(Clone, Debug)]
pub struct ClientContext {
    pub config: EffectiveConfig,
    pub terminal: TerminalOptions,
}

/// Builds the client variant for a validated mode.
pub trait ClientFactory: Send + Sync {
    fn create(&self, mode: NetworkMode, ctx: ClientContext) -> Arc<dyn BotClient>;
}
