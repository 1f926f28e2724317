//! CLI module containing argument parsing and related functionality

pub mod args;
pub mod duration_parser;

pub use args::{Args, Command};
