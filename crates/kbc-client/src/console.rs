//! Console command reader. This is the client's run loop.

use colored::Colorize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use kbc_core::{terminal::TerminalOptions, Result};

const PROMPT: &str = "> ";

pub const COMMANDS: &[(&str, &str)] = &[
    ("stop", "Stop the client and exit."),
    ("help", "List console commands."),
];

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Stop,
    Help,
    Unknown(String),
    Empty,
}

pub fn parse_command(line: &str) -> Command {
    let Some(name) = line.split_whitespace().next() else {
        return Command::Empty;
    };
    match name.trim_start_matches('/').to_lowercase().as_str() {
        "stop" => Command::Stop,
        "help" | "?" => Command::Help,
        _ => Command::Unknown(name.to_string()),
    }
}

/// Read commands until `stop` is entered or `cancel` fires.
///
/// End of input does not end the loop: the client keeps running until it is shut down.
/// A `stop` command cancels `cancel` itself.
pub async fn run_console<R, W>(
    reader: R,
    mut out: W,
    terminal: TerminalOptions,
    cancel: CancellationToken,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();
    let mut input_open = true;

    loop {
        if input_open && terminal.interactive_reader {
            out.write_all(prompt(terminal).as_bytes()).await?;
            out.flush().await?;
        }

        tokio::select! {
            _ = cancel.cancelled() => break,
            line = lines.next_line(), if input_open => match line {
                Ok(Some(line)) => match parse_command(&line) {
                    Command::Stop => {
                        info!("Stop requested from console");
                        cancel.cancel();
                        break;
                    }
                    Command::Help => {
                        out.write_all(help_text().as_bytes()).await?;
                        out.flush().await?;
                    }
                    Command::Unknown(name) => {
                        warn!(command = %name, "Unknown command. Type \"help\" for help.");
                    }
                    Command::Empty => {}
                },
                Ok(None) => {
                    debug!("Console input closed; waiting for shutdown");
                    input_open = false;
                }
                Err(e) => {
                    warn!(error = %e, "Console input failed; waiting for shutdown");
                    input_open = false;
                }
            },
        }
    }

    Ok(())
}

fn prompt(terminal: TerminalOptions) -> String {
    if terminal.color {
        PROMPT.green().bold().to_string()
    } else {
        PROMPT.to_string()
    }
}

fn help_text() -> String {
    let mut text = String::from("Available commands:\n");
    for (name, about) in COMMANDS {
        text.push_str(&format!("  {name:<6} {about}\n"));
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::io::BufReader;

    fn plain() -> TerminalOptions {
        TerminalOptions {
            interactive_reader: false,
            color: false,
        }
    }

    #[test]
    fn parses_commands() {
        assert_eq!(parse_command("stop"), Command::Stop);
        assert_eq!(parse_command("  STOP now"), Command::Stop);
        assert_eq!(parse_command("/help"), Command::Help);
        assert_eq!(parse_command("   "), Command::Empty);
        assert_eq!(parse_command("reload x"), Command::Unknown("reload".to_string()));
    }

    #[tokio::test]
    async fn stop_command_ends_loop_and_cancels() {
        let input = BufReader::new(&b"help\nbogus\nstop\nhelp\n"[..]);
        let mut out = Vec::new();
        let cancel = CancellationToken::new();

        run_console(input, &mut out, plain(), cancel.clone())
            .await
            .unwrap();

        assert!(cancel.is_cancelled());
        let out = String::from_utf8(out).unwrap();
        assert_eq!(out.matches("Available commands:").count(), 1);
        assert!(!out.contains(PROMPT));
    }

    #[tokio::test]
    async fn interactive_reader_prompts() {
        let input = BufReader::new(&b"stop\n"[..]);
        let mut out = Vec::new();
        let terminal = TerminalOptions {
            interactive_reader: true,
            color: false,
        };

        run_console(input, &mut out, terminal, CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(String::from_utf8(out).unwrap(), PROMPT);
    }

    #[tokio::test]
    async fn eof_waits_for_shutdown() {
        let cancel = CancellationToken::new();
        let task = tokio::spawn(run_console(
            BufReader::new(&b""[..]),
            tokio::io::sink(),
            plain(),
            cancel.clone(),
        ));

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!task.is_finished());

        cancel.cancel();
        tokio::time::timeout(Duration::from_secs(5), task)
            .await
            .unwrap()
            .unwrap()
            .unwrap();
    }
}
