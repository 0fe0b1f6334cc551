use std::path::PathBuf;

use cshell_core::SessionError;
use rustyline::error::ReadlineError;
use thiserror::Error;

use crate::config::ConfigError;

/// Errors that end the front end.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("line editor failed: {0}")]
    Readline(#[from] ReadlineError),

    #[error("cannot read script '{}': {source}", path.display())]
    Script {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("session rollback failed: {0}")]
    Session(#[from] SessionError),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}
