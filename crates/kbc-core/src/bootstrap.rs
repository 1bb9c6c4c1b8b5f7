//! End-to-end startup: arguments, config file, merge, validation, lifecycle.

use std::{
    ffi::OsString,
    future::Future,
    io::{self, Write},
};

use tracing::{debug, error, info};

use crate::{
    args,
    config::{FileConfig, StartupPaths},
    domain::ExitStatus,
    lifecycle::Orchestrator,
    logging,
    materialize::{materialize, Materialized},
    merge::merge,
    ports::ClientFactory,
    terminal::TerminalOptions,
    validate::validate,
};

pub const SERVICE_NAME: &str = "kbc";

/// Run the client described by `argv` and return the process exit status.
///
/// Every failure is resolved here; nothing escapes as an error.
pub async fn run<I, T, F, S>(argv: I, paths: &StartupPaths, factory: F, signal: S) -> ExitStatus
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
    F: ClientFactory,
    S: Future<Output = ()> + Send + 'static,
{
    let argv: Vec<OsString> = argv.into_iter().map(Into::into).collect();
    let hint = args::terminal_hint(&argv);

    let opts = match args::resolve(argv) {
        Ok(opts) => opts,
        Err(e) => {
            logging::init(SERVICE_NAME, hint);
            error!(error = %e, "Unable to parse arguments. Are they correct? (see --help)");
            return ExitStatus::Failure;
        }
    };

    if opts.help {
        return print_usage(io::stdout().lock(), hint);
    }

    let terminal = opts.terminal();
    logging::init(SERVICE_NAME, terminal);

    if materialize(paths) == Materialized::Created {
        info!(
            path = %paths.config_file.display(),
            "Fill in token, bot-file and mode in the new config file"
        );
    }
    let file = FileConfig::load_or_empty(&paths.config_file);
    if file.is_empty() {
        debug!("No settings in the config file; only command line values apply");
    }
    let merged = merge(&opts, &file);

    let config = match validate(merged, file, paths.data_folder.clone()) {
        Ok(cfg) => cfg,
        Err(e) => {
            error!(error = %e, "Program cannot continue");
            return ExitStatus::Failure;
        }
    };

    Orchestrator::new(factory)
        .launch(config, terminal, signal)
        .await
        .exit_status()
}

/// `--help` always succeeds, even if the usage text cannot be written.
fn print_usage(mut out: impl Write, terminal: TerminalOptions) -> ExitStatus {
    if let Err(e) = out
        .write_all(args::usage().as_bytes())
        .and_then(|()| out.flush())
    {
        logging::init(SERVICE_NAME, terminal);
        error!(error = %e, "Unable to print help.");
    }
    ExitStatus::Success
}
