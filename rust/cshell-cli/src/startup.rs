//! Turns config, environment and command-line settings into a ready REPL.

use cshell_core::compiler::{self, UntrustedCompiler};
use cshell_core::{NativeToolchain, Repl, Session};

use crate::config::CshellConfig;

/// Settings given on the command line. They win over the config file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub compiler: Option<String>,
    pub includes: Vec<String>,
    pub libraries: Vec<String>,
    pub cflags: Vec<String>,
    pub program_args: Vec<String>,
}

#[derive(Debug)]
pub struct Assembled {
    pub repl: Repl<NativeToolchain>,
    /// Set when a requested compiler was replaced by the default.
    pub warning: Option<UntrustedCompiler>,
}

/// Build the REPL. `env_compiler` is the value of `COMPILER`, if any.
///
/// Compiler precedence is command line, then environment, then config.
/// Config includes, libraries and flags come before command-line ones.
pub fn assemble(
    config: &CshellConfig,
    overrides: Overrides,
    env_compiler: Option<&str>,
) -> Assembled {
    let resolved = compiler::resolve([
        overrides.compiler.as_deref(),
        env_compiler,
        config.compiler.as_deref(),
    ]);

    let mut session = Session::new();
    for name in config.includes.iter().chain(&overrides.includes) {
        session.add_include(name.as_str());
    }
    for name in config.libraries.iter().chain(&overrides.libraries) {
        session.add_library(name.as_str());
    }

    let cflags = config
        .cflags
        .iter()
        .chain(&overrides.cflags)
        .cloned()
        .collect();

    let toolchain = NativeToolchain::new(resolved.compiler)
        .with_cflags(cflags)
        .with_program_args(overrides.program_args);

    Assembled {
        repl: Repl::with_session(session, toolchain),
        warning: resolved.warning,
    }
}
