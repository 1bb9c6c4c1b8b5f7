//! Client lifecycle: construct, start, run, shut down.
//!
//! ```text
//! Constructed -> Started -> Running -> ShuttingDown -> Stopped
//!                   \
//!                    -> FailedToStart
//! ```

use std::{
    future::Future,
    sync::{Arc, Mutex, PoisonError},
};

use chrono::Local;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::{
    domain::ExitStatus,
    ports::{BotClient, ClientContext, ClientFactory},
    terminal::TerminalOptions,
    validate::EffectiveConfig,
    Error,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LifecycleState {
    Constructed,
    Started,
    Running,
    ShuttingDown,
    Stopped,
    FailedToStart,
}

/// How a launched lifecycle ended.
#[derive(Debug)]
pub enum Outcome {
    /// Run loop returned and the client was shut down.
    Stopped,
    /// `start` failed; the client was shut down without entering the run loop.
    FailedToStart(Error),
    /// The run loop itself failed after a successful start.
    Aborted(Error),
}

impl Outcome {
    pub fn exit_status(&self) -> ExitStatus {
        match self {
            Self::Stopped => ExitStatus::Success,
            Self::FailedToStart(_) | Self::Aborted(_) => ExitStatus::Failure,
        }
    }
}

#[derive(Clone)]
struct StateCell(Arc<Mutex<LifecycleState>>);

impl Default for StateCell {
    fn default() -> Self {
        Self(Arc::new(Mutex::new(LifecycleState::Constructed)))
    }
}

impl StateCell {
    fn get(&self) -> LifecycleState {
        *self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set(&self, next: LifecycleState) {
        let mut guard = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        debug!(from = ?*guard, to = ?next, "Lifecycle transition");
        *guard = next;
    }

    /// Move to `next` only from `from`.
    fn transition(&self, from: LifecycleState, next: LifecycleState) -> bool {
        let mut guard = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        if *guard != from {
            return false;
        }
        debug!(from = ?from, to = ?next, "Lifecycle transition");
        *guard = next;
        true
    }
}

/// Shuts a client down at most once, no matter how many tasks ask for it.
///
/// Concurrent callers wait for the first shutdown to finish instead of returning early.
#[derive(Clone)]
pub struct ShutdownHandle {
    client: Arc<dyn BotClient>,
    done: Arc<tokio::sync::Mutex<bool>>,
    state: StateCell,
}

impl ShutdownHandle {
    fn new(client: Arc<dyn BotClient>, state: StateCell) -> Self {
        Self {
            client,
            done: Arc::new(tokio::sync::Mutex::new(false)),
            state,
        }
    }

    pub async fn shutdown(&self) {
        let mut done = self.done.lock().await;
        if *done {
            return;
        }
        self.state
            .transition(LifecycleState::Running, LifecycleState::ShuttingDown);
        self.client.shutdown().await;
        *done = true;
    }
}

/// Aborts the signal listener once the lifecycle no longer needs it.
struct HookGuard(JoinHandle<()>);

impl Drop for HookGuard {
    fn drop(&mut self) {
        self.0.abort();
    }
}

fn register_shutdown_hook<S>(handle: ShutdownHandle, signal: S) -> HookGuard
where
    S: Future<Output = ()> + Send + 'static,
{
    HookGuard(tokio::spawn(async move {
        signal.await;
        info!("Termination requested, shutting down");
        handle.shutdown().await;
    }))
}

pub struct Orchestrator<F> {
    factory: F,
    state: StateCell,
}

impl<F: ClientFactory> Orchestrator<F> {
    pub fn new(factory: F) -> Self {
        Self {
            factory,
            state: StateCell::default(),
        }
    }

    pub fn state(&self) -> LifecycleState {
        self.state.get()
    }

    /// Drive one client from construction to exit.
    ///
    /// `signal` resolves when the host asks the process to terminate; it is listened to
    /// from a separate task for as long as the client exists.
    pub async fn launch<S>(
        &self,
        config: EffectiveConfig,
        terminal: TerminalOptions,
        signal: S,
    ) -> Outcome
    where
        S: Future<Output = ()> + Send + 'static,
    {
        log_host_info();

        let mode = config.mode();
        let payload_file = config.payload_file().to_path_buf();
        let token = config.token().to_string();
        let client = self
            .factory
            .create(mode, ClientContext { config, terminal });

        let handle = ShutdownHandle::new(client.clone(), self.state.clone());
        let _hook = register_shutdown_hook(handle.clone(), signal);
        self.state.set(LifecycleState::Started);

        if let Err(e) = client.start(&payload_file, &token).await {
            error!(error = %e, "Failed to start client");
            handle.shutdown().await;
            self.state.set(LifecycleState::FailedToStart);
            return Outcome::FailedToStart(e);
        }

        let started_at = Local::now();
        self.state
            .transition(LifecycleState::Started, LifecycleState::Running);
        info!(mode = %client.mode(), "Client started");

        let result = client.run().await;

        handle.shutdown().await;
        self.state.set(LifecycleState::Stopped);
        let uptime = Local::now().signed_duration_since(started_at);
        info!(uptime_secs = uptime.num_seconds(), "Client stopped");

        match result {
            Ok(()) => Outcome::Stopped,
            Err(e) => {
                error!(error = %e, "Client run loop failed");
                Outcome::Aborted(e)
            }
        }
    }
}

/// Resolves on SIGINT/SIGTERM (Ctrl-C elsewhere).
///
/// If the listener cannot be installed the future never resolves; the process can then
/// only stop through the client itself.
pub async fn termination_signal() {
    if let Err(e) = wait_for_signal().await {
        error!(error = %e, "Cannot listen for termination signals");
        std::future::pending::<()>().await;
    }
}

async fn wait_for_signal() -> std::io::Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigterm = signal(SignalKind::terminate())?;
        let mut sigint = signal(SignalKind::interrupt())?;

        tokio::select! {
            _ = sigterm.recv() => debug!("Received SIGTERM"),
            _ = sigint.recv() => debug!("Received SIGINT"),
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await?;
        debug!("Received Ctrl+C");
    }

    Ok(())
}

fn log_host_info() {
    debug!(
        version = env!("CARGO_PKG_VERSION"),
        os = std::env::consts::OS,
        family = std::env::consts::FAMILY,
        arch = std::env::consts::ARCH,
        "System information"
    );
}
