//! Configuration file parsing for `cshell.toml`.
//!
//! Searches the current directory then its ancestors, falling back to
//! `~/.config/cshell/cshell.toml` if no project-level file is found.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const CONFIG_FILE: &str = "cshell.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid toml in '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct CshellConfig {
    /// Compiler driver name, subject to the trusted-name check.
    #[serde(default)]
    pub compiler: Option<String>,
    /// Extra arguments placed before the source path on every compile.
    #[serde(default)]
    pub cflags: Vec<String>,
    /// Headers included in every session from the start.
    #[serde(default)]
    pub includes: Vec<String>,
    /// Libraries linked in every session from the start.
    #[serde(default)]
    pub libraries: Vec<String>,
    /// Line-editor history location.
    #[serde(default)]
    pub history_file: Option<String>,
}

impl CshellConfig {
    /// Find and load the nearest config file. `Ok(None)` when there is none.
    pub fn load_with_path() -> Result<Option<(PathBuf, Self)>, ConfigError> {
        let Some(path) = Self::find() else {
            return Ok(None);
        };
        let cfg = Self::load_from(&path)?;
        Ok(Some((path, cfg)))
    }

    /// Load config from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    fn find() -> Option<PathBuf> {
        if let Ok(cwd) = std::env::current_dir() {
            if let Some(found) = find_upwards(&cwd) {
                return Some(found);
            }
        }
        let global = dirs::home_dir()?
            .join(".config")
            .join("cshell")
            .join(CONFIG_FILE);
        global.exists().then_some(global)
    }

    /// Parse a TOML string directly.
    pub fn parse(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }

    /// Contents written by `cshell --init`.
    pub fn default_template() -> &'static str {
        r#"# cshell configuration

# Compiler driver: gcc, g++, cc, c++, clang or clang++.
# The COMPILER environment variable and --compiler take precedence.
compiler = "gcc"

# Extra compiler arguments, placed before the source file.
cflags = ["-Wall"]

# Headers and libraries available from the first line.
includes = ["stdio.h"]
libraries = []

# history_file = "~/.cshell_history"
"#
    }
}

/// Walk from `start` up to the filesystem root looking for `cshell.toml`.
fn find_upwards(start: &Path) -> Option<PathBuf> {
    let mut dir = start.to_path_buf();
    loop {
        let candidate = dir.join(CONFIG_FILE);
        if candidate.is_file() {
            return Some(candidate);
        }
        if !dir.pop() {
            return None;
        }
    }
}
