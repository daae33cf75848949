//! CLI module
//!
//! Command-line interface for splitting invoice files.
//!
//! # Commands
//!
//! - `split` - Split a CSV file (or stdin) into per-buyer artifacts
//! - `serve` - Start HTTP server mode

mod commands;
mod runner;
mod server;

pub use commands::{Cli, Commands};
pub use runner::Runner;
pub use server::{router, serve};
