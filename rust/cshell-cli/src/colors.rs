//! ANSI color helpers for terminal output.

/// Wrap `s` in the given SGR code and a reset.
fn paint(code: &str, s: &str) -> String {
    format!("\x1b[{}m{}\x1b[0m", code, s)
}

/// Format text in red.
pub fn red(s: &str) -> String {
    paint("31", s)
}

/// Format text in yellow.
pub fn yellow(s: &str) -> String {
    paint("33", s)
}

/// Format text in cyan.
pub fn cyan(s: &str) -> String {
    paint("36", s)
}

/// Format text in bold.
pub fn bold(s: &str) -> String {
    paint("1", s)
}

/// Format text in gray.
pub fn gray(s: &str) -> String {
    paint("90", s)
}

/// Format a status label (right-aligned, green, bold).
pub fn status_label(label: &str) -> String {
    paint("1;32", &format!("{:>12}", label))
}

/// Prompt shown before each input line.
pub fn prompt() -> String {
    format!("{} ", paint("1;32", ">>"))
}
