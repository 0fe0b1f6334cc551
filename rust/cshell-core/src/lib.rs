//! cshell core
//!
//! Session state, source synthesis and the build-and-run executor behind the
//! interactive C/C++ statement shell. Front ends feed lines to
//! [`dispatch::Repl::process_line`] and render the returned outcome.

pub mod compiler;
pub mod dispatch;
pub mod executor;
pub mod session;
pub mod synth;

pub use compiler::{Compiler, Language};
pub use dispatch::{LineOutcome, Rejection, Repl, ReplCommand};
pub use executor::{BuildResult, Diagnostic, ExecError, Executor, NativeToolchain, RunOutput};
pub use session::{Session, SessionError};
pub use synth::synthesize;
