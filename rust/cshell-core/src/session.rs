//! Accumulated REPL session state.
//!
//! A session holds three ordered lists: system headers to include, libraries
//! to link, and the statement lines that make up the body of the synthesized
//! program. Only `statements` is ever rolled back.

use thiserror::Error;

/// Errors produced by session mutation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// Rollback was requested but no statement has been appended.
    #[error("no statement to remove: session is empty")]
    Empty,
}

/// In-memory state for one interactive session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    includes: Vec<String>,
    libraries: Vec<String>,
    statements: Vec<String>,
}

impl Session {
    /// Create an empty session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Header names in insertion order, without `<>` delimiters.
    pub fn includes(&self) -> &[String] {
        &self.includes
    }

    /// Library names in insertion order, without the `-l` prefix.
    pub fn libraries(&self) -> &[String] {
        &self.libraries
    }

    /// Statement lines in insertion order.
    pub fn statements(&self) -> &[String] {
        &self.statements
    }

    /// Append a statement line. Any string is accepted.
    pub fn append_statement(&mut self, line: impl Into<String>) {
        self.statements.push(line.into());
    }

    /// Remove and return the most recently appended statement.
    pub fn remove_last_statement(&mut self) -> Result<String, SessionError> {
        self.statements.pop().ok_or(SessionError::Empty)
    }

    /// Append a header name. Duplicates are kept.
    pub fn add_include(&mut self, name: impl Into<String>) {
        self.includes.push(name.into());
    }

    /// Append a link library name. Duplicates are kept.
    pub fn add_library(&mut self, name: impl Into<String>) {
        self.libraries.push(name.into());
    }

    /// Drop all includes, libraries and statements.
    pub fn reset(&mut self) {
        self.includes.clear();
        self.libraries.clear();
        self.statements.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.includes.is_empty() && self.libraries.is_empty() && self.statements.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_session_is_empty() {
        let session = Session::new();
        assert!(session.is_empty());
        assert!(session.statements().is_empty());
    }

    #[test]
    fn append_then_remove_restores_previous_state() {
        let mut session = Session::new();
        session.add_include("stdio.h");
        session.append_statement("int x = 1;");
        let before = session.clone();

        session.append_statement("x++;");
        let removed = session.remove_last_statement().unwrap();

        assert_eq!(removed, "x++;");
        assert_eq!(session, before);
    }

    #[test]
    fn remove_from_empty_fails() {
        let mut session = Session::new();
        assert_eq!(session.remove_last_statement(), Err(SessionError::Empty));
    }

    #[test]
    fn includes_and_libraries_keep_duplicates_in_order() {
        let mut session = Session::new();
        session.add_include("stdio.h");
        session.add_include("math.h");
        session.add_include("stdio.h");
        session.add_library("m");
        session.add_library("m");

        assert_eq!(session.includes(), ["stdio.h", "math.h", "stdio.h"]);
        assert_eq!(session.libraries(), ["m", "m"]);
    }

    #[test]
    fn removing_statement_leaves_includes_alone() {
        let mut session = Session::new();
        session.append_statement("int y;");
        session.add_include("string.h");
        session.remove_last_statement().unwrap();

        assert_eq!(session.includes(), ["string.h"]);
        assert!(session.statements().is_empty());
    }

    #[test]
    fn reset_clears_everything() {
        let mut session = Session::new();
        session.add_include("stdio.h");
        session.add_library("m");
        session.append_statement("int x;");
        session.reset();
        assert!(session.is_empty());
    }
}
