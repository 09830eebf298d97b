//! # Pinesync App
//!
//! Composition root for the connector: builds the [`AppContext`] from
//! configuration, wires readers and handlers onto the shared API client,
//! and dispatches the `pinesync` CLI commands.

pub mod cache_writer;
pub mod cli;
pub mod commands;
pub mod context;
pub mod logging;

pub use cache_writer::JsonLinesCacheWriter;
pub use cli::{Cli, Command};
pub use commands::{execute, CommandReport};
pub use context::AppContext;
