//! The `wakecal` command-line interface.
//!
//! Loads `config.toml`, wires host implementations (system clock, terminal
//! renderer, external player or bell, reqwest) into the device loop and runs
//! the selected subcommand.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod secret;

pub use cli::Cli;
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
