//! hourlog CLI library.
//!
//! This crate provides the `hl` command-line interface over `hl-core` and
//! `hl-db`.

mod cli;
pub mod commands;
mod config;

pub use cli::{Cli, Commands};
pub use config::Config;
