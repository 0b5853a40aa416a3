//! Library side of the `formula` command: configuration and subcommands.

pub mod commands;
pub mod config;

pub use commands::{compile_ast, evaluate, print, read_input, wire, CliError};
pub use config::{Config, ConfigError, OutputFormat, DEFAULT_LOG_FILTER};
