//! Interactive and scripted front ends for the statement shell.

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use cshell_core::executor::Phase;
use cshell_core::{Executor, LineOutcome, Rejection, Repl, ReplCommand, Session};
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::{DefaultHistory, History, SearchDirection};
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};

use crate::colors::{bold, cyan, gray, prompt, red, yellow};
use crate::error::CliError;

/// Meta-commands for tab completion.
const COMMANDS: &[&str] = &[
    ":help", ":quit", ":reset", ":source", ":env", ":undo", ":history", ":clear",
];

const DIRECTIVES: &[&str] = &["+include", "+library"];

/// Common headers offered after `+include`.
const HEADERS: &[&str] = &[
    "assert.h", "ctype.h", "errno.h", "float.h", "inttypes.h", "limits.h", "math.h",
    "stdbool.h", "stddef.h", "stdint.h", "stdio.h", "stdlib.h", "string.h", "time.h",
    "unistd.h", "algorithm", "iostream", "map", "memory", "string", "vector",
];

/// Common libraries offered after `+library`.
const LIBRARIES: &[&str] = &["dl", "m", "pthread", "rt"];

/// Environment variable used to override the history location.
pub const HISTORY_PATH_ENV: &str = "CSHELL_HISTORY_PATH";

/// Front-end switches.
#[derive(Debug, Clone, Default)]
pub struct Options {
    /// Print the synthesized program before reporting each build.
    pub show_source: bool,
    /// History file from the config; the environment variable wins.
    pub history_file: Option<String>,
}

/// What the caller should do after a line has been reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
    ShowHistory,
    ClearScreen,
}

struct CshellHelper;

impl Completer for CshellHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let head = &line[..pos];
        let start = head
            .rfind(char::is_whitespace)
            .map(|i| i + 1)
            .unwrap_or(0);
        let word = &head[start..];

        let pool: &[&str] = if start == 0 && word.starts_with(':') {
            COMMANDS
        } else if start == 0 && word.starts_with('+') {
            DIRECTIVES
        } else if head.starts_with("+include ") {
            HEADERS
        } else if head.starts_with("+library ") {
            LIBRARIES
        } else {
            &[]
        };

        let candidates = pool
            .iter()
            .filter(|c| c.starts_with(word))
            .map(|c| Pair {
                display: c.to_string(),
                replacement: c.to_string(),
            })
            .collect();
        Ok((start, candidates))
    }
}

impl Hinter for CshellHelper {
    type Hint = String;
}

impl Highlighter for CshellHelper {}

impl Validator for CshellHelper {}

impl Helper for CshellHelper {}

/// Run the line-editing loop until end of input or `:quit`.
pub fn run_interactive<E: Executor>(repl: &mut Repl<E>, opts: &Options) -> Result<(), CliError> {
    let config = rustyline::Config::builder().auto_add_history(true).build();
    let mut rl: Editor<CshellHelper, DefaultHistory> = Editor::with_config(config)?;
    rl.set_helper(Some(CshellHelper));

    let history_path = get_history_path(opts.history_file.as_deref());
    if let Some(ref path) = history_path {
        if path.exists() {
            if let Err(err) = rl.load_history(path) {
                eprintln!(
                    "{} failed to load history from {}: {}",
                    yellow("Warning:"),
                    path.display(),
                    err
                );
            }
        }
    }

    let result = interactive_loop(&mut rl, repl, opts);
    save_history(&mut rl, history_path.as_deref());
    result
}

fn interactive_loop<E: Executor>(
    rl: &mut Editor<CshellHelper, DefaultHistory>,
    repl: &mut Repl<E>,
    opts: &Options,
) -> Result<(), CliError> {
    loop {
        match rl.readline(&prompt()) {
            Ok(line) => {
                let flow = handle_line(
                    repl,
                    &line,
                    opts,
                    &mut io::stdout().lock(),
                    &mut io::stderr().lock(),
                )?;
                match flow {
                    Flow::Continue => {}
                    Flow::Quit => return Ok(()),
                    Flow::ShowHistory => print_history(rl.history()),
                    Flow::ClearScreen => {
                        print!("\x1b[2J\x1b[H");
                        io::stdout().flush()?;
                    }
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("{}", gray("(Ctrl-D or :quit to exit)"));
            }
            Err(ReadlineError::Eof) => {
                println!();
                return Ok(());
            }
            Err(err) => return Err(err.into()),
        }
    }
}

fn print_history(history: &DefaultHistory) {
    for i in 0..history.len() {
        if let Ok(Some(result)) = history.get(i, SearchDirection::Forward) {
            println!("{:4} {}", gray(&format!("{}", i + 1)), result.entry);
        }
    }
}

fn save_history(rl: &mut Editor<CshellHelper, DefaultHistory>, path: Option<&Path>) {
    let Some(path) = path else {
        return;
    };
    if let Some(parent) = path.parent() {
        if let Err(err) = fs::create_dir_all(parent) {
            eprintln!(
                "{} failed to create history directory {}: {}",
                yellow("Warning:"),
                parent.display(),
                err
            );
            return;
        }
    }
    if let Err(err) = rl.save_history(path) {
        eprintln!(
            "{} failed to save history to {}: {}",
            yellow("Warning:"),
            path.display(),
            err
        );
    }
}

/// Feed every line of `reader` through the REPL, reporting to `out`/`err`.
///
/// Stops at end of input or `:quit`. Line-editor commands are no-ops here.
pub fn run_script<E: Executor, R: BufRead>(
    repl: &mut Repl<E>,
    reader: R,
    opts: &Options,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<(), CliError> {
    for line in reader.lines() {
        let line = line?;
        if handle_line(repl, &line, opts, out, err)? == Flow::Quit {
            break;
        }
    }
    Ok(())
}

/// Run a script file against stdout/stderr.
pub fn run_script_file<E: Executor>(
    repl: &mut Repl<E>,
    path: &Path,
    opts: &Options,
) -> Result<(), CliError> {
    let file = fs::File::open(path).map_err(|source| CliError::Script {
        path: path.to_path_buf(),
        source,
    })?;
    run_script(
        repl,
        io::BufReader::new(file),
        opts,
        &mut io::stdout().lock(),
        &mut io::stderr().lock(),
    )
}

/// Process one line and report it. With `show_source`, the program is
/// printed before it is built.
fn handle_line<E: Executor>(
    repl: &mut Repl<E>,
    line: &str,
    opts: &Options,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<Flow, CliError> {
    if opts.show_source {
        if let Some(source) = repl.pending_source(line) {
            write_source(out, &source)?;
            out.flush()?;
        }
    }
    let outcome = repl.process_line(line)?;
    Ok(report(&outcome, repl.session(), out, err)?)
}

/// Print what processing a line did.
pub fn report(
    outcome: &LineOutcome,
    session: &Session,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> io::Result<Flow> {
    match outcome {
        LineOutcome::Ignored => {}
        LineOutcome::Included(name) => writeln!(out, "{}", gray(&format!("New include: {name}")))?,
        LineOutcome::Linked(name) => {
            writeln!(out, "{}", gray(&format!("New link library: {name}")))?
        }
        LineOutcome::DirectiveFailed(e) => writeln!(err, "{} {}", red("Error:"), e)?,
        LineOutcome::UnknownCommand(name) => writeln!(
            err,
            "{} unknown command {}. Type :help for usage.",
            red("Error:"),
            name
        )?,
        LineOutcome::Reset => writeln!(out, "{}", gray("Session state reset."))?,
        LineOutcome::Undone(stmt) => writeln!(out, "{} {}", gray("Removed:"), stmt)?,
        LineOutcome::NothingToUndo => writeln!(out, "{}", gray("Nothing to undo."))?,
        LineOutcome::Source(text) => write!(out, "{text}")?,
        LineOutcome::Committed { output, .. } => {
            out.write_all(output.stdout.as_bytes())?;
            err.write_all(output.stderr.as_bytes())?;
        }
        LineOutcome::Rejected { reason, .. } => write_rejection(err, reason)?,
        LineOutcome::Command(cmd) => return run_front_end_command(*cmd, session, out),
    }
    Ok(Flow::Continue)
}

fn write_source(out: &mut dyn Write, source: &str) -> io::Result<()> {
    for line in source.lines() {
        writeln!(out, "{}", gray(&format!("| {line}")))?;
    }
    Ok(())
}

fn write_rejection(err: &mut dyn Write, reason: &Rejection) -> io::Result<()> {
    match reason {
        Rejection::Failed(diag) => {
            let label = match diag.phase {
                Phase::Compile => "Compile error:",
                Phase::Run => "Run error:",
            };
            writeln!(err, "{} {}", red(label), gray(&format!("({})", diag.status)))?;
            let text = diag.text();
            if !text.is_empty() {
                writeln!(err, "{text}")?;
            }
        }
        Rejection::Exec(e) => writeln!(err, "{} {}", red("Error:"), e)?,
    }
    writeln!(err, "{}", gray("Statement discarded."))
}

fn run_front_end_command(
    cmd: ReplCommand,
    session: &Session,
    out: &mut dyn Write,
) -> io::Result<Flow> {
    match cmd {
        ReplCommand::Quit => return Ok(Flow::Quit),
        ReplCommand::History => return Ok(Flow::ShowHistory),
        ReplCommand::Clear => return Ok(Flow::ClearScreen),
        ReplCommand::Help => write_help(out)?,
        ReplCommand::Env => write_env(out, session)?,
        // Handled inside the dispatcher.
        ReplCommand::Reset | ReplCommand::Source | ReplCommand::Undo => {}
    }
    Ok(Flow::Continue)
}

fn write_env(out: &mut dyn Write, session: &Session) -> io::Result<()> {
    if session.is_empty() {
        return writeln!(out, "{}", gray("Session is empty."));
    }
    let sections: [(&str, &[String]); 3] = [
        ("Includes:", session.includes()),
        ("Libraries:", session.libraries()),
        ("Statements:", session.statements()),
    ];
    for (title, items) in sections {
        if items.is_empty() {
            continue;
        }
        writeln!(out, "{}", bold(title))?;
        for item in items {
            writeln!(out, "  {}", cyan(item))?;
        }
    }
    Ok(())
}

fn write_help(out: &mut dyn Write) -> io::Result<()> {
    writeln!(out, "{}", bold("Directives:"))?;
    let rows = [
        ("+include <header>", "Add #include <header> to the program"),
        ("+library <name>", "Link with -l<name>"),
    ];
    for (usage, text) in rows {
        writeln!(out, "  {}  {}", cyan(usage), gray(text))?;
    }
    writeln!(out, "{}", bold("Commands:"))?;
    let rows = [
        (":help, :h", "Show this help"),
        (":quit, :q", "Exit the shell"),
        (":reset, :r", "Forget all includes, libraries and statements"),
        (":source, :s", "Print the current program"),
        (":env", "List includes, libraries and statements"),
        (":undo, :u", "Remove the last accepted statement"),
        (":history", "Show input history"),
        (":clear, :c", "Clear the terminal screen"),
    ];
    for (usage, text) in rows {
        writeln!(out, "  {}  {}", cyan(usage), gray(text))?;
    }
    writeln!(out)?;
    writeln!(
        out,
        "{}",
        gray("Any other line is added to the program body, which is then compiled and run.")
    )?;
    writeln!(
        out,
        "{}",
        gray("Lines that fail to compile or run are discarded.")
    )
}

/// Resolve the path to the history file.
///
/// Rules:
/// - an override set to an absolute path is used as-is;
/// - `~/...` and relative overrides resolve under HOME;
/// - otherwise `${HOME}/.cshell_history`.
fn resolve_history_path(home: Option<&Path>, override_path: Option<&str>) -> Option<PathBuf> {
    let home_path = || home.map(Path::to_path_buf);

    if let Some(raw) = override_path.map(str::trim).filter(|v| !v.is_empty()) {
        if raw == "~" {
            return home_path();
        }
        if let Some(rest) = raw.strip_prefix("~/") {
            return Some(home_path()?.join(rest));
        }
        let configured = PathBuf::from(raw);
        if configured.is_relative() {
            return Some(home_path()?.join(configured));
        }
        return Some(configured);
    }

    Some(home_path()?.join(".cshell_history"))
}

fn get_history_path(configured: Option<&str>) -> Option<PathBuf> {
    let home = dirs::home_dir();
    let from_env = std::env::var(HISTORY_PATH_ENV).ok();
    resolve_history_path(home.as_deref(), from_env.as_deref().or(configured))
}
