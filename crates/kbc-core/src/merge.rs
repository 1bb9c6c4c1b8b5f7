//! Command line vs. config file precedence.
//!
//! Each field is resolved on its own: a non-empty command line value wins, otherwise a
//! usable file value is taken, otherwise the field stays absent.

use std::path::PathBuf;

use tracing::{debug, warn};

use crate::{
    args::RawOptions,
    config::FileConfig,
    validate::{inspect_payload, PayloadStatus},
};

pub const KEY_TOKEN: &str = "token";
pub const KEY_BOT_FILE: &str = "bot-file";
pub const KEY_MODE: &str = "mode";
pub const KEY_ALLOW_HELP_AD: &str = "allow-help-ad";

/// Startup parameters after precedence has been applied, before validation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MergedConfig {
    pub token: Option<String>,
    pub payload_file: Option<PathBuf>,
    /// Raw `mode` value; only the file can supply it.
    pub mode: Option<String>,
    pub allow_help_ad: bool,
}

pub fn merge(opts: &RawOptions, file: &FileConfig) -> MergedConfig {
    MergedConfig {
        token: merge_token(opts.token.as_deref(), file.get_string(KEY_TOKEN)),
        payload_file: merge_payload_file(opts.bot_file.clone(), file.get_string(KEY_BOT_FILE)),
        mode: file.get_string(KEY_MODE),
        allow_help_ad: file.get_bool(KEY_ALLOW_HELP_AD, true),
    }
}

fn merge_token(cli: Option<&str>, file: Option<String>) -> Option<String> {
    let cli = cli.filter(|t| !t.is_empty());
    let file = file.filter(|t| !t.is_empty());

    match (cli, file) {
        (Some(cli), Some(_)) => {
            debug!("Token given on the command line, ignoring the one in the config file");
            Some(cli.to_string())
        }
        (Some(cli), None) => Some(cli.to_string()),
        (None, Some(file)) => {
            debug!("Using token from the config file");
            Some(file)
        }
        (None, None) => {
            warn!("No usable token in the config file");
            None
        }
    }
}

fn merge_payload_file(cli: Option<PathBuf>, file: Option<String>) -> Option<PathBuf> {
    let cli = cli.filter(|p| !p.as_os_str().is_empty());
    let file = file.filter(|p| !p.trim().is_empty()).map(PathBuf::from);

    let usable_file = match file {
        Some(path) => match inspect_payload(&path) {
            PayloadStatus::Usable => {
                debug!(path = %path.display(), "Got valid bot-file in the config file");
                Some(path)
            }
            status => {
                warn!(
                    path = %path.display(),
                    problem = status.describe(),
                    "Invalid bot-file value in the config file"
                );
                None
            }
        },
        None => None,
    };

    match (cli, usable_file) {
        (Some(cli), Some(_)) => {
            debug!("Bot file given on the command line, ignoring the one in the config file");
            Some(cli)
        }
        (Some(cli), None) => Some(cli),
        (None, file) => file,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn file_cfg(text: &str) -> FileConfig {
        FileConfig::parse(text).unwrap()
    }

    fn opts(token: Option<&str>, bot_file: Option<&str>) -> RawOptions {
        RawOptions {
            token: token.map(str::to_string),
            bot_file: bot_file.map(PathBuf::from),
            ..RawOptions::default()
        }
    }

    #[test]
    fn token_precedence_table() {
        let cases: &[(Option<&str>, &str, Option<&str>)] = &[
            (Some("cli"), "token: file\n", Some("cli")),
            (Some("cli"), "", Some("cli")),
            (Some(""), "token: file\n", Some("file")),
            (None, "token: file\n", Some("file")),
            (None, "token: \"\"\n", None),
            (Some(""), "", None),
            (None, "", None),
        ];
        for (cli, file, expected) in cases {
            let merged = merge(&opts(*cli, None), &file_cfg(file));
            assert_eq!(
                merged.token.as_deref(),
                *expected,
                "cli={cli:?} file={file:?}"
            );
        }
    }

    #[test]
    fn cli_payload_wins_even_when_unusable() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.zip");
        fs::write(&good, b"bot").unwrap();

        let cfg = file_cfg(&format!("bot-file: {}\n", good.display()));
        let merged = merge(&opts(None, Some("/definitely/not/here.zip")), &cfg);
        assert_eq!(
            merged.payload_file,
            Some(PathBuf::from("/definitely/not/here.zip"))
        );
    }

    #[test]
    fn usable_file_payload_fills_absent_cli() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.zip");
        fs::write(&good, b"bot").unwrap();

        let cfg = file_cfg(&format!("bot-file: {}\n", good.display()));
        assert_eq!(merge(&opts(None, None), &cfg).payload_file, Some(good.clone()));
        assert_eq!(merge(&opts(None, Some("")), &cfg).payload_file, Some(good));
    }

    #[test]
    fn missing_file_payload_is_never_selected() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("gone.zip");
        let cfg = file_cfg(&format!("bot-file: {}\n", missing.display()));
        assert_eq!(merge(&opts(None, None), &cfg).payload_file, None);
    }

    #[test]
    fn directory_file_payload_is_never_selected() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = file_cfg(&format!("bot-file: {}\n", dir.path().display()));
        assert_eq!(merge(&opts(None, None), &cfg).payload_file, None);
    }

    #[test]
    fn fields_are_independent() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.zip");
        fs::write(&good, b"bot").unwrap();
        let cfg = file_cfg(&format!(
            "token: file-token\nbot-file: {}\nmode: webhook\n",
            good.display()
        ));

        let merged = merge(&opts(Some("cli-token"), None), &cfg);
        assert_eq!(merged.token.as_deref(), Some("cli-token"));
        assert_eq!(merged.payload_file, Some(good));
        assert_eq!(merged.mode.as_deref(), Some("webhook"));
    }

    #[test]
    fn allow_help_ad_defaults_to_true() {
        assert!(merge(&RawOptions::default(), &FileConfig::empty()).allow_help_ad);
        assert!(!merge(&RawOptions::default(), &file_cfg("allow-help-ad: false\n")).allow_help_ad);
    }
}
