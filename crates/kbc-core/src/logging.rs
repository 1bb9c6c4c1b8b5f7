use std::sync::Once;

use crate::terminal::TerminalOptions;

static INIT: Once = Once::new();

/// Initialize tracing for the client.
///
/// Only the first call installs a subscriber; later calls are no-ops, which keeps the
/// bootstrap callable more than once in a single process (tests).
pub fn init(service_name: &str, terminal: TerminalOptions) {
    INIT.call_once(|| {
        use tracing_subscriber::{fmt, EnvFilter};

        // Default: info for our crates, warn for everything else.
        // Can be overridden with `RUST_LOG`.
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "warn,kbc=info,kbc_core=info,kbc_client=info,{service_name}=info"
            ))
        });

        // A subscriber installed by the embedding process takes precedence.
        let _ = fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_ansi(terminal.color)
            .try_init();
    });
}
