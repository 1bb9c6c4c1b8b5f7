//! Bootstrap and configuration resolution for the bot client.
//!
//! This crate is intentionally transport-agnostic. The concrete clients (webhook,
//! persistent connection) live behind the `ports::BotClient` trait in adapter crates.

pub mod args;
pub mod bootstrap;
pub mod config;
pub mod domain;
pub mod errors;
pub mod lifecycle;
pub mod logging;
pub mod materialize;
pub mod merge;
pub mod ports;
pub mod terminal;
pub mod validate;

pub use errors::{Error, Result};
