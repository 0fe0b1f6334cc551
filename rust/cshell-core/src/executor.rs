//! Build-and-run executor.
//!
//! Writes synthesized source into a private temporary directory, compiles it
//! with an external compiler and runs the resulting binary. Both child
//! processes are spawned from an argv vector, never through a shell, and
//! block until they exit. The program shares the shell's stdin so it can
//! read from the terminal; its stdout and stderr are captured. The temporary directory is removed when the call
//! returns, whatever the outcome.

use std::ffi::OsString;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Output, Stdio};

use thiserror::Error;

use crate::compiler::Compiler;

/// Stem shared by the temporary source file and binary.
const ARTIFACT_STEM: &str = "cshell";

/// Which child process a result or error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Compile,
    Run,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Compile => f.write_str("compile"),
            Phase::Run => f.write_str("run"),
        }
    }
}

/// How a child process terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitState {
    /// Exited with the given status code.
    Code(i32),
    /// Killed by the given signal.
    Signal(i32),
    /// Neither a code nor a signal was reported.
    Unknown,
}

impl ExitState {
    pub fn success(self) -> bool {
        self == ExitState::Code(0)
    }
}

impl From<ExitStatus> for ExitState {
    fn from(status: ExitStatus) -> Self {
        if let Some(code) = status.code() {
            return ExitState::Code(code);
        }
        #[cfg(unix)]
        {
            use std::os::unix::process::ExitStatusExt;
            if let Some(signal) = status.signal() {
                return ExitState::Signal(signal);
            }
        }
        ExitState::Unknown
    }
}

impl fmt::Display for ExitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitState::Code(code) => write!(f, "exit status {code}"),
            ExitState::Signal(signal) => write!(f, "killed by signal {signal}"),
            ExitState::Unknown => f.write_str("unknown termination"),
        }
    }
}

/// Everything a failed child process left behind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub phase: Phase,
    pub status: ExitState,
    pub stdout: String,
    pub stderr: String,
}

impl Diagnostic {
    fn from_output(phase: Phase, output: &Output) -> Self {
        Self {
            phase,
            status: output.status.into(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }
    }

    /// Captured output, stderr first, trimmed of trailing whitespace.
    pub fn text(&self) -> String {
        let mut parts = Vec::new();
        for stream in [&self.stderr, &self.stdout] {
            let trimmed = stream.trim_end();
            if !trimmed.is_empty() {
                parts.push(trimmed);
            }
        }
        parts.join("\n")
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = self.text();
        if text.is_empty() {
            write!(f, "{} step failed ({})", self.phase, self.status)
        } else {
            write!(f, "{}\n{} step failed ({})", text, self.phase, self.status)
        }
    }
}

/// Output of a program that ran to a zero exit status.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Outcome of one build-and-run attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildResult {
    CompileFailed(Diagnostic),
    RunFailed(Diagnostic),
    Success(RunOutput),
}

/// Failures that prevent a build result from being produced at all.
#[derive(Debug, Error)]
pub enum ExecError {
    #[error("cannot create temporary build location: {0}")]
    Resource(#[source] io::Error),

    #[error("cannot write source to {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("could not start {phase} step `{program}`: {source}")]
    Spawn {
        phase: Phase,
        program: String,
        #[source]
        source: io::Error,
    },
}

/// Compiles and runs a synthesized program.
pub trait Executor {
    fn build_and_run(
        &mut self,
        source: &str,
        libraries: &[String],
    ) -> Result<BuildResult, ExecError>;
}

/// Executor backed by an external compiler driver.
#[derive(Debug, Clone)]
pub struct NativeToolchain {
    compiler: Compiler,
    cflags: Vec<String>,
    program_args: Vec<String>,
    temp_root: Option<PathBuf>,
}

impl NativeToolchain {
    pub fn new(compiler: Compiler) -> Self {
        Self {
            compiler,
            cflags: Vec::new(),
            program_args: Vec::new(),
            temp_root: None,
        }
    }

    /// Extra arguments placed before the source path.
    pub fn with_cflags(mut self, cflags: Vec<String>) -> Self {
        self.cflags = cflags;
        self
    }

    /// Arguments passed to every run of the built program.
    pub fn with_program_args(mut self, args: Vec<String>) -> Self {
        self.program_args = args;
        self
    }

    /// Create temporary directories under `root` instead of the system
    /// temp directory.
    pub fn with_temp_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.temp_root = Some(root.into());
        self
    }

    pub fn compiler(&self) -> &Compiler {
        &self.compiler
    }

    /// Argument vector for the compiler, excluding the program name.
    pub fn compile_args(&self, source: &Path, output: &Path, libraries: &[String]) -> Vec<OsString> {
        let mut args: Vec<OsString> = self.cflags.iter().map(OsString::from).collect();
        args.push(source.as_os_str().to_owned());
        args.push("-o".into());
        args.push(output.as_os_str().to_owned());
        args.extend(libraries.iter().map(|lib| OsString::from(format!("-l{lib}"))));
        args
    }

    fn scratch_dir(&self) -> Result<tempfile::TempDir, ExecError> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("cshell");
        let dir = match &self.temp_root {
            Some(root) => builder.tempdir_in(root),
            None => builder.tempdir(),
        };
        dir.map_err(ExecError::Resource)
    }
}

impl Executor for NativeToolchain {
    fn build_and_run(
        &mut self,
        source: &str,
        libraries: &[String],
    ) -> Result<BuildResult, ExecError> {
        // Dropping `scratch` removes both the source file and the binary.
        let scratch = self.scratch_dir()?;
        let source_path = scratch
            .path()
            .join(format!("{ARTIFACT_STEM}.{}", self.compiler.language().extension()));
        let binary_path = scratch
            .path()
            .join(format!("{ARTIFACT_STEM}{}", std::env::consts::EXE_SUFFIX));

        std::fs::write(&source_path, source).map_err(|source| ExecError::Io {
            path: source_path.clone(),
            source,
        })?;

        let args = self.compile_args(&source_path, &binary_path, libraries);
        tracing::debug!(compiler = %self.compiler, ?args, "compiling");
        let compiled = Command::new(self.compiler.program())
            .args(&args)
            .output()
            .map_err(|source| ExecError::Spawn {
                phase: Phase::Compile,
                program: self.compiler.program().to_string(),
                source,
            })?;

        if !compiled.status.success() {
            let diagnostic = Diagnostic::from_output(Phase::Compile, &compiled);
            tracing::debug!(status = %diagnostic.status, "compilation failed");
            return Ok(BuildResult::CompileFailed(diagnostic));
        }

        tracing::debug!(binary = %binary_path.display(), "running");
        let ran = Command::new(&binary_path)
            .args(&self.program_args)
            .stdin(Stdio::inherit())
            .output()
            .map_err(|source| ExecError::Spawn {
                phase: Phase::Run,
                program: binary_path.display().to_string(),
                source,
            })?;

        if !ran.status.success() {
            let diagnostic = Diagnostic::from_output(Phase::Run, &ran);
            tracing::debug!(status = %diagnostic.status, "program failed");
            return Ok(BuildResult::RunFailed(diagnostic));
        }

        Ok(BuildResult::Success(RunOutput {
            stdout: String::from_utf8_lossy(&ran.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&ran.stderr).into_owned(),
        }))
    }
}
