//! Translation-unit synthesis.
//!
//! Every accepted statement lives inside a single function body so that
//! plain executable statements, not just declarations, can be typed one at a
//! time. The program entry point only calls that function.

/// Opens the statement function. The trailing blank line separates the
/// header from the first statement.
const HEADER: &str = "void cshell_stmt(int argc, char* argv[])\n{\n\n";

/// Closes the statement function and defines `main`.
const FOOTER: &str = "}\n\
int\n\
main(int argc, char* argv[])\n\
{\n\
\tcshell_stmt(argc, argv);\n\
\treturn 0;\n\
}\n";

/// Build the full program text from session includes and statements.
///
/// Pure and total: the same inputs always give the same text, and statement
/// lines are copied verbatim without any checking.
pub fn synthesize<S: AsRef<str>>(includes: &[S], statements: &[S]) -> String {
    let body_len: usize = includes
        .iter()
        .chain(statements)
        .map(|s| s.as_ref().len() + 12)
        .sum();
    let mut out = String::with_capacity(HEADER.len() + FOOTER.len() + body_len);

    for name in includes {
        out.push_str("#include <");
        out.push_str(name.as_ref());
        out.push_str(">\n");
    }

    out.push_str(HEADER);

    for stmt in statements {
        out.push_str(stmt.as_ref());
        out.push('\n');
    }

    out.push_str(FOOTER);
    out
}
