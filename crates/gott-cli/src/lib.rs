//! Command-line interface for the gott time tracker.

mod cli;
pub mod commands;
mod config;
pub mod editor;

pub use cli::{Cli, Commands};
pub use config::Config;
pub use editor::ExternalEditor;
