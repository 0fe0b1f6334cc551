//! Compiler selection.
//!
//! The compiler name can come from the command line, the `COMPILER`
//! environment variable or a config file. Only a short list of well-known
//! driver names is accepted; anything else falls back to [`DEFAULT_COMPILER`]
//! and produces a warning for the caller to show.

use std::fmt;

/// Environment variable that selects the compiler.
pub const COMPILER_ENV: &str = "COMPILER";

/// Compiler used when nothing (trusted) is requested.
pub const DEFAULT_COMPILER: &str = "gcc";

/// Driver names accepted without a warning.
pub const TRUSTED_COMPILERS: &[&str] = &["gcc", "g++", "cc", "c++", "clang", "clang++"];

/// Source language implied by the compiler driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    C,
    Cxx,
}

impl Language {
    /// File extension for synthesized source files.
    pub fn extension(self) -> &'static str {
        match self {
            Language::C => "c",
            Language::Cxx => "cpp",
        }
    }

    fn for_compiler(name: &str) -> Self {
        if name.ends_with("++") {
            Language::Cxx
        } else {
            Language::C
        }
    }
}

/// A resolved compiler driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Compiler {
    program: String,
    language: Language,
}

impl Compiler {
    /// Use `program` as-is, without the trusted-name check.
    pub fn new(program: impl Into<String>) -> Self {
        let program = program.into();
        let language = Language::for_compiler(&program);
        Self { program, language }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn language(&self) -> Language {
        self.language
    }
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new(DEFAULT_COMPILER)
    }
}

impl fmt::Display for Compiler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)
    }
}

/// Why a requested compiler was replaced by the default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UntrustedCompiler {
    pub requested: String,
}

impl fmt::Display for UntrustedCompiler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "provided compiler which would be unsafe: {} (using {} instead)",
            self.requested, DEFAULT_COMPILER
        )
    }
}

/// Result of resolving a requested compiler name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub compiler: Compiler,
    pub warning: Option<UntrustedCompiler>,
}

/// Resolve the first non-empty candidate against the trusted list.
///
/// Candidates are tried in priority order; the first one that is present and
/// non-blank decides the outcome. An untrusted name does not fall through to
/// later candidates.
pub fn resolve<'a>(candidates: impl IntoIterator<Item = Option<&'a str>>) -> Resolved {
    let requested = candidates
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|name| !name.is_empty());

    match requested {
        None => Resolved {
            compiler: Compiler::default(),
            warning: None,
        },
        Some(name) if TRUSTED_COMPILERS.contains(&name) => {
            tracing::info!(compiler = name, "using requested compiler");
            Resolved {
                compiler: Compiler::new(name),
                warning: None,
            }
        }
        Some(name) => {
            tracing::info!(requested = name, "untrusted compiler name, falling back to default");
            Resolved {
                compiler: Compiler::default(),
                warning: Some(UntrustedCompiler {
                    requested: name.to_string(),
                }),
            }
        }
    }
}
