//! Line classification and the compile-verify-commit step.
//!
//! Every input line is one of:
//! - empty, and ignored;
//! - a directive starting with `+` (`+include <name>`, `+library <name>`);
//! - a meta-command: `:` followed by a letter, e.g. `:quit`;
//! - a statement, which is tried against the whole accumulated program and
//!   kept only if that program compiles and runs cleanly.

use thiserror::Error;

use crate::executor::{BuildResult, Diagnostic, ExecError, Executor, RunOutput};
use crate::session::{Session, SessionError};
use crate::synth::synthesize;

/// First character of a directive line.
pub const DIRECTIVE_SIGIL: char = '+';

/// First character of a meta-command line.
pub const COMMAND_SIGIL: char = ':';

/// A parsed session directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    Include(String),
    Library(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DirectiveError {
    #[error("unknown command: {0}")]
    Unknown(String),
}

/// A REPL meta-command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplCommand {
    Help,
    Quit,
    /// Forget all includes, libraries and statements.
    Reset,
    /// Print the program built from the current session.
    Source,
    /// List includes, libraries and statements.
    Env,
    /// Drop the most recently committed statement.
    Undo,
    History,
    /// Clear the terminal.
    Clear,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedCommand {
    Command(ReplCommand),
    Unknown(String),
}

/// Classification of one input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input<'a> {
    /// Blank line, or a directive with fewer than two tokens.
    Ignored,
    Directive(Result<Directive, DirectiveError>),
    Command(ParsedCommand),
    Statement(&'a str),
}

/// Classify a raw input line.
pub fn classify(line: &str) -> Input<'_> {
    if line.trim().is_empty() {
        return Input::Ignored;
    }

    if line.starts_with(DIRECTIVE_SIGIL) {
        return match parse_directive(line) {
            Some(parsed) => Input::Directive(parsed),
            None => Input::Ignored,
        };
    }

    let trimmed = line.trim();
    if is_command(trimmed) {
        return Input::Command(parse_command(trimmed));
    }

    Input::Statement(line)
}

/// `:` then an ASCII letter. Lines like `::puts("x");` are C++ statements.
fn is_command(trimmed: &str) -> bool {
    let mut chars = trimmed.chars();
    chars.next() == Some(COMMAND_SIGIL) && chars.next().is_some_and(|c| c.is_ascii_alphabetic())
}

/// Parse a `+name arg` line. Returns `None` when fewer than two
/// whitespace-separated tokens are present. Tokens past the second are
/// ignored.
fn parse_directive(line: &str) -> Option<Result<Directive, DirectiveError>> {
    let mut tokens = line.split_whitespace();
    let name = tokens.next()?;
    let arg = tokens.next()?;

    Some(match name {
        "+include" => Ok(Directive::Include(arg.to_string())),
        "+library" => Ok(Directive::Library(arg.to_string())),
        other => Err(DirectiveError::Unknown(other.to_string())),
    })
}

fn parse_command(trimmed: &str) -> ParsedCommand {
    let cmd = trimmed.split_whitespace().next().unwrap_or("");
    match cmd {
        ":help" | ":h" => ParsedCommand::Command(ReplCommand::Help),
        ":quit" | ":q" | ":exit" => ParsedCommand::Command(ReplCommand::Quit),
        ":reset" | ":r" => ParsedCommand::Command(ReplCommand::Reset),
        ":source" | ":s" => ParsedCommand::Command(ReplCommand::Source),
        ":env" => ParsedCommand::Command(ReplCommand::Env),
        ":undo" | ":u" => ParsedCommand::Command(ReplCommand::Undo),
        ":history" => ParsedCommand::Command(ReplCommand::History),
        ":clear" | ":c" => ParsedCommand::Command(ReplCommand::Clear),
        other => ParsedCommand::Unknown(other.to_string()),
    }
}

/// Why a tentative statement was rolled back.
#[derive(Debug)]
pub enum Rejection {
    /// The compiler or the program exited unsuccessfully.
    Failed(Diagnostic),
    /// No build result could be produced.
    Exec(ExecError),
}

/// What processing one line did.
#[derive(Debug)]
pub enum LineOutcome {
    Ignored,
    Included(String),
    Linked(String),
    DirectiveFailed(DirectiveError),
    /// Meta-command left for the front end to carry out.
    Command(ReplCommand),
    UnknownCommand(String),
    Reset,
    Undone(String),
    NothingToUndo,
    Source(String),
    Committed {
        statement: String,
        source: String,
        output: RunOutput,
    },
    Rejected {
        statement: String,
        source: String,
        reason: Rejection,
    },
}

/// Owns the session and drives the executor for each line.
#[derive(Debug)]
pub struct Repl<E> {
    session: Session,
    executor: E,
}

impl<E: Executor> Repl<E> {
    pub fn new(executor: E) -> Self {
        Self::with_session(Session::new(), executor)
    }

    /// Start from a pre-populated session, e.g. includes from a config file.
    pub fn with_session(session: Session, executor: E) -> Self {
        Self { session, executor }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// The program the current session stands for.
    pub fn source(&self) -> String {
        synthesize(self.session.includes(), self.session.statements())
    }

    /// The program that processing `line` would try to build, or `None`
    /// when the line is not a statement.
    pub fn pending_source(&self, line: &str) -> Option<String> {
        let Input::Statement(stmt) = classify(line) else {
            return None;
        };
        let mut statements = self.session.statements().to_vec();
        statements.push(stmt.to_string());
        Some(synthesize(self.session.includes(), &statements))
    }

    /// Classify and act on one input line.
    ///
    /// On every path other than [`LineOutcome::Committed`], `statements` is
    /// left exactly as it was before the call.
    pub fn process_line(&mut self, line: &str) -> Result<LineOutcome, SessionError> {
        let outcome = match classify(line) {
            Input::Ignored => LineOutcome::Ignored,
            Input::Directive(Ok(Directive::Include(name))) => {
                self.session.add_include(name.clone());
                LineOutcome::Included(name)
            }
            Input::Directive(Ok(Directive::Library(name))) => {
                self.session.add_library(name.clone());
                LineOutcome::Linked(name)
            }
            Input::Directive(Err(err)) => LineOutcome::DirectiveFailed(err),
            Input::Command(ParsedCommand::Unknown(name)) => LineOutcome::UnknownCommand(name),
            Input::Command(ParsedCommand::Command(cmd)) => self.run_command(cmd),
            Input::Statement(stmt) => return self.try_statement(stmt),
        };
        Ok(outcome)
    }

    fn run_command(&mut self, cmd: ReplCommand) -> LineOutcome {
        match cmd {
            ReplCommand::Reset => {
                self.session.reset();
                LineOutcome::Reset
            }
            ReplCommand::Undo => match self.session.remove_last_statement() {
                Ok(stmt) => LineOutcome::Undone(stmt),
                Err(SessionError::Empty) => LineOutcome::NothingToUndo,
            },
            ReplCommand::Source => LineOutcome::Source(self.source()),
            ReplCommand::Help
            | ReplCommand::Quit
            | ReplCommand::Env
            | ReplCommand::History
            | ReplCommand::Clear => LineOutcome::Command(cmd),
        }
    }

    /// Append `stmt`, build and run the whole program, and roll back on any
    /// failure.
    fn try_statement(&mut self, stmt: &str) -> Result<LineOutcome, SessionError> {
        self.session.append_statement(stmt);
        let source = self.source();

        let reason = match self.executor.build_and_run(&source, self.session.libraries()) {
            Ok(BuildResult::Success(output)) => {
                tracing::debug!(count = self.session.statements().len(), "statement committed");
                return Ok(LineOutcome::Committed {
                    statement: stmt.to_string(),
                    source,
                    output,
                });
            }
            Ok(BuildResult::CompileFailed(diag)) | Ok(BuildResult::RunFailed(diag)) => {
                Rejection::Failed(diag)
            }
            Err(err) => Rejection::Exec(err),
        };

        let statement = self.session.remove_last_statement()?;
        tracing::debug!(%statement, "statement rolled back");
        Ok(LineOutcome::Rejected {
            statement,
            source,
            reason,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::{ExitState, Phase};

    /// Fails according to marker words in the program text.
    #[derive(Default)]
    struct ScriptedExecutor {
        calls: Vec<(String, Vec<String>)>,
    }

    impl Executor for ScriptedExecutor {
        fn build_and_run(
            &mut self,
            source: &str,
            libraries: &[String],
        ) -> Result<BuildResult, ExecError> {
            self.calls.push((source.to_string(), libraries.to_vec()));
            let diag = |phase| Diagnostic {
                phase,
                status: ExitState::Code(1),
                stdout: String::new(),
                stderr: "nope".to_string(),
            };
            if source.contains("compile_error") {
                Ok(BuildResult::CompileFailed(diag(Phase::Compile)))
            } else if source.contains("abort()") {
                Ok(BuildResult::RunFailed(diag(Phase::Run)))
            } else if source.contains("spawn_error") {
                Err(ExecError::Spawn {
                    phase: Phase::Compile,
                    program: "gcc".to_string(),
                    source: std::io::Error::from(std::io::ErrorKind::NotFound),
                })
            } else {
                Ok(BuildResult::Success(RunOutput {
                    stdout: "ok\n".to_string(),
                    stderr: String::new(),
                }))
            }
        }
    }

    fn repl() -> Repl<ScriptedExecutor> {
        Repl::new(ScriptedExecutor::default())
    }

    #[test]
    fn classify_blank_lines() {
        assert_eq!(classify(""), Input::Ignored);
        assert_eq!(classify("   \t"), Input::Ignored);
    }

    #[test]
    fn classify_directives() {
        assert_eq!(
            classify("+include stdio.h"),
            Input::Directive(Ok(Directive::Include("stdio.h".to_string())))
        );
        assert_eq!(
            classify("+library   m extra"),
            Input::Directive(Ok(Directive::Library("m".to_string())))
        );
        assert_eq!(
            classify("+link m"),
            Input::Directive(Err(DirectiveError::Unknown("+link".to_string())))
        );
        assert_eq!(classify("+include"), Input::Ignored);
        assert_eq!(classify("+"), Input::Ignored);
    }

    #[test]
    fn classify_commands() {
        assert_eq!(classify(":q"), Input::Command(ParsedCommand::Command(ReplCommand::Quit)));
        assert_eq!(
            classify("  :source "),
            Input::Command(ParsedCommand::Command(ReplCommand::Source))
        );
        assert_eq!(
            classify(":nope"),
            Input::Command(ParsedCommand::Unknown(":nope".to_string()))
        );
    }

    #[test]
    fn global_scope_lines_are_statements() {
        assert_eq!(
            classify("::printf(\"hi\\n\");"),
            Input::Statement("::printf(\"hi\\n\");")
        );
        assert_eq!(
            classify("  ::std::puts(\"x\");"),
            Input::Statement("  ::std::puts(\"x\");")
        );
        assert_eq!(classify(":"), Input::Statement(":"));

        let mut repl = repl();
        let outcome = repl.process_line("::std::puts(\"x\");").unwrap();
        assert!(matches!(outcome, LineOutcome::Committed { .. }));
        assert_eq!(repl.session().statements(), ["::std::puts(\"x\");"]);
        assert_eq!(repl.executor().calls.len(), 1);
    }

    #[test]
    fn pending_source_matches_what_gets_built() {
        let mut repl = repl();
        repl.process_line("+include stdio.h").unwrap();
        repl.process_line("int a = 1;").unwrap();

        let preview = repl.pending_source("a++;").unwrap();
        repl.process_line("a++;").unwrap();
        assert_eq!(repl.executor().calls[1].0, preview);

        assert!(repl.pending_source("+include math.h").is_none());
        assert!(repl.pending_source(":source").is_none());
        assert!(repl.pending_source("").is_none());
    }

    #[test]
    fn classify_statements_verbatim() {
        assert_eq!(classify("int x = 1;"), Input::Statement("int x = 1;"));
        assert_eq!(classify("  x++; "), Input::Statement("  x++; "));
        assert_eq!(classify(" +include x"), Input::Statement(" +include x"));
    }

    #[test]
    fn include_directive_does_not_touch_statements() {
        let mut repl = repl();
        let outcome = repl.process_line("+include stdio.h").unwrap();
        assert!(matches!(outcome, LineOutcome::Included(ref n) if n == "stdio.h"));
        assert_eq!(repl.session().includes(), ["stdio.h"]);
        assert!(repl.session().statements().is_empty());
        assert!(repl.executor().calls.is_empty());
    }

    #[test]
    fn library_directive_is_passed_to_executor() {
        let mut repl = repl();
        repl.process_line("+library m").unwrap();
        repl.process_line("double d = 2.0;").unwrap();
        assert_eq!(repl.executor().calls[0].1, ["m"]);
    }

    #[test]
    fn unknown_directive_is_reported_without_mutation() {
        let mut repl = repl();
        let before = repl.session().clone();
        let outcome = repl.process_line("+define X 1").unwrap();
        assert!(matches!(
            outcome,
            LineOutcome::DirectiveFailed(DirectiveError::Unknown(ref n)) if n == "+define"
        ));
        assert_eq!(repl.session(), &before);
    }

    #[test]
    fn successful_statement_is_committed() {
        let mut repl = repl();
        let outcome = repl.process_line("int x = 1;").unwrap();
        match outcome {
            LineOutcome::Committed { statement, output, .. } => {
                assert_eq!(statement, "int x = 1;");
                assert_eq!(output.stdout, "ok\n");
            }
            other => panic!("expected commit, got {other:?}"),
        }
        assert_eq!(repl.session().statements(), ["int x = 1;"]);
    }

    #[test]
    fn compile_failure_rolls_back() {
        let mut repl = repl();
        repl.process_line("int x = 1;").unwrap();
        let before = repl.session().statements().to_vec();

        let outcome = repl.process_line("compile_error here").unwrap();
        match outcome {
            LineOutcome::Rejected {
                statement,
                reason: Rejection::Failed(diag),
                ..
            } => {
                assert_eq!(statement, "compile_error here");
                assert_eq!(diag.phase, Phase::Compile);
            }
            other => panic!("expected rejection, got {other:?}"),
        }
        assert_eq!(repl.session().statements(), before.as_slice());
    }

    #[test]
    fn run_failure_rolls_back() {
        let mut repl = repl();
        let outcome = repl.process_line("abort();").unwrap();
        assert!(matches!(
            outcome,
            LineOutcome::Rejected { reason: Rejection::Failed(Diagnostic { phase: Phase::Run, .. }), .. }
        ));
        assert!(repl.session().statements().is_empty());
    }

    #[test]
    fn exec_error_rolls_back() {
        let mut repl = repl();
        let outcome = repl.process_line("spawn_error;").unwrap();
        assert!(matches!(
            outcome,
            LineOutcome::Rejected { reason: Rejection::Exec(ExecError::Spawn { .. }), .. }
        ));
        assert!(repl.session().statements().is_empty());
    }

    #[test]
    fn later_builds_contain_earlier_statements_in_order() {
        let mut repl = repl();
        repl.process_line("int a = 1;").unwrap();
        repl.process_line("int b = a + 1;").unwrap();

        assert_eq!(repl.session().statements(), ["int a = 1;", "int b = a + 1;"]);
        let (second_source, _) = &repl.executor().calls[1];
        let a = second_source.find("int a = 1;\n").unwrap();
        let b = second_source.find("int b = a + 1;\n").unwrap();
        assert!(a < b);
    }

    #[test]
    fn tentative_statement_is_part_of_tried_source() {
        let mut repl = repl();
        let outcome = repl.process_line("compile_error;").unwrap();
        let LineOutcome::Rejected { source, .. } = outcome else {
            panic!("expected rejection");
        };
        assert!(source.contains("compile_error;\n"));
        assert!(!repl.source().contains("compile_error;"));
    }

    #[test]
    fn ignored_lines_do_not_build() {
        let mut repl = repl();
        assert!(matches!(repl.process_line("").unwrap(), LineOutcome::Ignored));
        assert!(matches!(repl.process_line("+include").unwrap(), LineOutcome::Ignored));
        assert!(repl.executor().calls.is_empty());
    }

    #[test]
    fn undo_and_reset_commands() {
        let mut repl = repl();
        assert!(matches!(repl.process_line(":undo").unwrap(), LineOutcome::NothingToUndo));

        repl.process_line("+include stdio.h").unwrap();
        repl.process_line("int x = 1;").unwrap();
        repl.process_line("int y = 2;").unwrap();
        let outcome = repl.process_line(":undo").unwrap();
        assert!(matches!(outcome, LineOutcome::Undone(ref s) if s == "int y = 2;"));
        assert_eq!(repl.session().statements(), ["int x = 1;"]);

        assert!(matches!(repl.process_line(":reset").unwrap(), LineOutcome::Reset));
        assert!(repl.session().is_empty());
    }

    #[test]
    fn source_command_reflects_committed_state() {
        let mut repl = repl();
        repl.process_line("int x = 1;").unwrap();
        let LineOutcome::Source(text) = repl.process_line(":source").unwrap() else {
            panic!("expected source");
        };
        assert_eq!(text, repl.source());
        assert!(text.contains("int x = 1;"));
    }

    #[test]
    fn front_end_commands_are_passed_through() {
        let mut repl = repl();
        assert!(matches!(
            repl.process_line(":quit").unwrap(),
            LineOutcome::Command(ReplCommand::Quit)
        ));
        assert!(matches!(
            repl.process_line(":wat").unwrap(),
            LineOutcome::UnknownCommand(ref n) if n == ":wat"
        ));
    }
}
