//! Command line argument resolution.
//!
//! The flag vocabulary is fixed: `--bot-file [PATH]`, `--token [VALUE]`, `--no-jline`,
//! `--no-color` and `--help`. Anything else is a hard parse failure.

use std::{ffi::OsString, path::PathBuf};

use clap::{
    error::{ContextKind, ContextValue},
    CommandFactory, Parser,
};

use crate::{errors::ArgsError, terminal::TerminalOptions};

#[derive(Parser, Debug)]
#[command(
    name = "kbc",
    about = "Bot client: loads a bot file and connects it to the platform",
    disable_help_flag = true,
    disable_version_flag = true,
    args_override_self = true
)]
struct Cli {
    /// The bot archive file path.
    #[arg(long = "bot-file", value_name = "PATH", num_args = 0..=1)]
    bot_file: Option<Option<PathBuf>>,

    /// The token that will be used. (Unsafe, write it to kbc.yml instead.)
    #[arg(long, value_name = "TOKEN", num_args = 0..=1)]
    token: Option<Option<String>>,

    /// Disable the interactive command reader and use a plain line reader.
    #[arg(long = "no-jline")]
    no_jline: bool,

    /// Disable ANSI color codes.
    #[arg(long = "no-color")]
    no_color: bool,

    /// Print help and exit.
    #[arg(long)]
    help: bool,
}

/// Parsed command line. Produced once, consumed once by the bootstrap.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RawOptions {
    pub bot_file: Option<PathBuf>,
    pub token: Option<String>,
    pub no_jline: bool,
    pub no_color: bool,
    pub help: bool,
}

impl RawOptions {
    pub fn terminal(&self) -> TerminalOptions {
        TerminalOptions {
            interactive_reader: !self.no_jline,
            color: !self.no_color,
        }
    }
}

/// Parse the full process argument vector (program name first).
///
/// An empty vector, or one holding only the program name, yields empty options so the
/// bootstrap can fall through to file based configuration.
pub fn resolve<I, T>(argv: I) -> Result<RawOptions, ArgsError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let mut argv: Vec<OsString> = argv.into_iter().map(Into::into).collect();
    if argv.is_empty() {
        argv.push(OsString::from("kbc"));
    }

    // `--help` wins over everything else, including otherwise malformed input.
    if argv.iter().skip(1).any(|a| a.as_os_str() == "--help") {
        return Ok(RawOptions {
            help: true,
            ..RawOptions::default()
        });
    }

    let cli = Cli::try_parse_from(argv).map_err(|e| ArgsError::Malformed {
        token: offending_token(&e),
        message: e.kind().as_str().unwrap_or("invalid arguments").to_string(),
    })?;

    Ok(RawOptions {
        bot_file: cli.bot_file.flatten(),
        token: cli.token.flatten(),
        no_jline: cli.no_jline,
        no_color: cli.no_color,
        help: cli.help,
    })
}

/// Terminal options from bare flag tokens, for reporting a command line that failed to parse.
pub fn terminal_hint(argv: &[OsString]) -> TerminalOptions {
    let has = |flag: &str| argv.iter().skip(1).any(|a| a.as_os_str() == flag);
    TerminalOptions {
        interactive_reader: !has("--no-jline"),
        color: !has("--no-color"),
    }
}

/// Usage text printed for `--help`.
pub fn usage() -> String {
    Cli::command().render_help().to_string()
}

fn offending_token(err: &clap::Error) -> String {
    for kind in [ContextKind::InvalidArg, ContextKind::InvalidValue] {
        match err.get(kind) {
            Some(ContextValue::String(s)) => return s.clone(),
            Some(ContextValue::Strings(v)) if !v.is_empty() => return v.join(" "),
            _ => {}
        }
    }
    "<unknown>".to_string()
}
