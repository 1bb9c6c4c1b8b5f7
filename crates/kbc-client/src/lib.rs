//! Client adapter.
//!
//! This crate implements the `kbc-core` BotClient port with two transport variants:
//! a persistent connection (the default) and a webhook receiver. Protocol I/O is not part
//! of this crate; a client here owns the loaded bot file, the transport settings and the
//! console run loop.

use std::{
    path::Path,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use async_trait::async_trait;
use tokio::{io::BufReader, sync::Mutex};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

pub mod console;
pub mod transport;

use kbc_core::{
    domain::NetworkMode,
    errors::Error,
    ports::{BotClient, ClientContext, ClientFactory},
    Result,
};

use crate::transport::TransportSettings;

/// State established by a successful `start`.
struct Session {
    payload: Vec<u8>,
    token: String,
    transport: TransportSettings,
}

/// Behavior shared by both transport variants.
struct ClientRuntime {
    mode: NetworkMode,
    ctx: ClientContext,
    cancel: CancellationToken,
    stopped: AtomicBool,
    session: Mutex<Option<Session>>,
}

impl ClientRuntime {
    fn new(mode: NetworkMode, ctx: ClientContext) -> Self {
        Self {
            mode,
            ctx,
            cancel: CancellationToken::new(),
            stopped: AtomicBool::new(false),
            session: Mutex::new(None),
        }
    }

    async fn start(&self, payload_file: &Path, token: &str) -> Result<()> {
        if self.cancel.is_cancelled() {
            return Err(Error::Startup("client was shut down before start".to_string()));
        }
        if token.trim().is_empty() {
            return Err(Error::Startup("token is empty".to_string()));
        }

        let transport = TransportSettings::from_config(self.mode, self.ctx.config.settings())?;

        let payload = tokio::fs::read(payload_file).await.map_err(|e| {
            Error::Startup(format!(
                "cannot read bot file {}: {e}",
                payload_file.display()
            ))
        })?;
        if payload.is_empty() {
            return Err(Error::Startup(format!(
                "bot file {} is empty",
                payload_file.display()
            )));
        }

        info!(
            path = %payload_file.display(),
            bytes = payload.len(),
            "Loaded bot file"
        );
        debug!(data_folder = %self.ctx.config.data_folder().display(), "Bot data folder");
        info!(transport = %transport.describe(), "Transport configured");

        let mut session = self.session.lock().await;
        if session.is_some() {
            return Err(Error::Startup("client already started".to_string()));
        }
        *session = Some(Session {
            payload,
            token: token.to_string(),
            transport,
        });
        Ok(())
    }

    async fn run(&self) -> Result<()> {
        if self.cancel.is_cancelled() {
            return Ok(());
        }
        if self.session.lock().await.is_none() {
            return Err(Error::External("run called before a successful start".to_string()));
        }
        console::run_console(
            BufReader::new(tokio::io::stdin()),
            tokio::io::stdout(),
            self.ctx.terminal,
            self.cancel.clone(),
        )
        .await
    }

    async fn shutdown(&self) {
        if self.stopped.swap(true, Ordering::SeqCst) {
            return;
        }
        info!(mode = %self.mode, "Stopping client");
        self.cancel.cancel();
        if let Some(session) = self.session.lock().await.take() {
            debug!(
                payload_bytes = session.payload.len(),
                token_len = session.token.len(),
                transport = %session.transport.describe(),
                "Released client session"
            );
        }
    }

    #[cfg(test)]
    async fn transport(&self) -> Option<TransportSettings> {
        self.session
            .lock()
            .await
            .as_ref()
            .map(|s| s.transport.clone())
    }
}

/// Default transport: one long-lived connection to the platform.
pub struct PersistentClient {
    rt: ClientRuntime,
}

impl PersistentClient {
    pub fn new(ctx: ClientContext) -> Self {
        Self {
            rt: ClientRuntime::new(NetworkMode::Default, ctx),
        }
    }
}

#[async_trait]
impl BotClient for PersistentClient {
    fn mode(&self) -> NetworkMode {
        NetworkMode::Default
    }

    async fn start(&self, payload_file: &Path, token: &str) -> Result<()> {
        self.rt.start(payload_file, token).await
    }

    async fn run(&self) -> Result<()> {
        self.rt.run().await
    }

    async fn shutdown(&self) {
        self.rt.shutdown().await
    }
}

/// Webhook transport: the platform pushes events to a local endpoint.
pub struct WebhookClient {
    rt: ClientRuntime,
}

impl WebhookClient {
    pub fn new(ctx: ClientContext) -> Self {
        Self {
            rt: ClientRuntime::new(NetworkMode::Webhook, ctx),
        }
    }
}

#[async_trait]
impl BotClient for WebhookClient {
    fn mode(&self) -> NetworkMode {
        NetworkMode::Webhook
    }

    async fn start(&self, payload_file: &Path, token: &str) -> Result<()> {
        self.rt.start(payload_file, token).await
    }

    async fn run(&self) -> Result<()> {
        self.rt.run().await
    }

    async fn shutdown(&self) {
        self.rt.shutdown().await
    }
}

/// Picks the client variant for a mode. No fallback: every mode has exactly one variant.
#[derive(Clone, Copy, Debug, Default)]
pub struct KbcClientFactory;

impl ClientFactory for KbcClientFactory {
    fn create(&self, mode: NetworkMode, ctx: ClientContext) -> Arc<dyn BotClient> {
        match mode {
            NetworkMode::Default => Arc::new(PersistentClient::new(ctx)),
            NetworkMode::Webhook => Arc::new(WebhookClient::new(ctx)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kbc_core::{
        args::RawOptions, config::FileConfig, merge::merge, terminal::TerminalOptions,
        validate::validate,
    };
    use std::{fs, path::PathBuf};

    fn ctx(dir: &Path, extra: &str, payload: &[u8]) -> (ClientContext, PathBuf) {
        let bot = dir.join("bot.zip");
        fs::write(&bot, payload).unwrap();
        let file = FileConfig::parse(&format!(
            "token: t0k3n\nbot-file: {}\nmode: websocket\n{extra}",
            bot.display()
        ))
        .unwrap();
        let merged = merge(&RawOptions::default(), &file);
        let config = validate(merged, file, dir.join("bot")).unwrap();
        (
            ClientContext {
                config,
                terminal: TerminalOptions::default(),
            },
            bot,
        )
    }

    #[test]
    fn factory_maps_modes_to_variants() {
        let dir = tempfile::tempdir().unwrap();
        let (c, _) = ctx(dir.path(), "", b"bot");
        assert_eq!(
            KbcClientFactory.create(NetworkMode::Default, c.clone()).mode(),
            NetworkMode::Default
        );
        assert_eq!(
            KbcClientFactory.create(NetworkMode::Webhook, c).mode(),
            NetworkMode::Webhook
        );
    }

    #[tokio::test]
    async fn start_loads_session() {
        let dir = tempfile::tempdir().unwrap();
        let (c, bot) = ctx(dir.path(), "webhook-port: 9000\n", b"bot");
        let client = WebhookClient::new(c);

        client.start(&bot, "t0k3n").await.unwrap();
        assert_eq!(
            client.rt.transport().await,
            Some(TransportSettings::Webhook {
                port: 9000,
                route: "kbc-webhook".to_string()
            })
        );
        assert!(client.start(&bot, "t0k3n").await.is_err());
    }

    #[tokio::test]
    async fn start_rejects_empty_payload_and_bad_settings() {
        let dir = tempfile::tempdir().unwrap();
        let (c, bot) = ctx(dir.path(), "webhook-port: 0\n", b"");
        let client = PersistentClient::new(c.clone());
        assert!(matches!(
            client.start(&bot, "t0k3n").await,
            Err(Error::Startup(_))
        ));

        fs::write(&bot, b"bot").unwrap();
        let client = WebhookClient::new(c);
        assert!(matches!(
            client.start(&bot, "t0k3n").await,
            Err(Error::Config(_))
        ));
    }

    #[tokio::test]
    async fn shutdown_is_idempotent_and_releases_session() {
        let dir = tempfile::tempdir().unwrap();
        let (c, bot) = ctx(dir.path(), "", b"bot");
        let client = Arc::new(PersistentClient::new(c));
        client.start(&bot, "t0k3n").await.unwrap();

        let a = {
            let c = client.clone();
            tokio::spawn(async move { c.shutdown().await })
        };
        client.shutdown().await;
        a.await.unwrap();
        client.shutdown().await;

        assert!(client.rt.transport().await.is_none());
        assert!(client.rt.cancel.is_cancelled());
        // Run after shutdown returns immediately instead of blocking on stdin.
        client.run().await.unwrap();
    }

    #[tokio::test]
    async fn start_after_shutdown_fails() {
        let dir = tempfile::tempdir().unwrap();
        let (c, bot) = ctx(dir.path(), "", b"bot");
        let client = PersistentClient::new(c);
        client.shutdown().await;
        assert!(client.start(&bot, "t0k3n").await.is_err());
    }

    #[tokio::test]
    async fn run_before_start_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let (c, _) = ctx(dir.path(), "", b"bot");
        let client = WebhookClient::new(c);
        assert!(matches!(client.run().await, Err(Error::External(_))));
    }
}
