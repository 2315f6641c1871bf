//! # IO Module
//!
//! The interface layer between the terminal and the domain services.
//!
//! - [`cli`]: clap argument definitions, command dispatch and `watch`
//! - [`render`]: text output for each response
//!
//! Every command can print JSON instead (`--json`), serialized straight from
//! the shared response types.

pub mod cli;
pub mod render;

pub use cli::{execute, run, Cli, Command};
