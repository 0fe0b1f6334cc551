//! cshell command-line front end.
//!
//! Configuration loading, startup assembly and the interactive and scripted
//! loops around [`cshell_core::Repl`].

pub mod colors;
pub mod config;
pub mod error;
pub mod logging;
pub mod repl;
pub mod startup;

pub use error::CliError;
