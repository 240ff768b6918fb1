//! Fixed pieces of the emitted Go program.

/// Package clause and the single import, emitted once at the top.
pub const PRELUDE: &str = concat!(
    "package main\n",
    "\n",
    "import (\n",
    "\t\"fmt\"\n",
    ")\n",
    "\n",
);

/// Go rejects unused imports. Emitted after the prelude when nothing in the
/// program referenced `fmt`.
pub const FMT_SINK: &str = "var _ = fmt.Println\n\n";

pub const ENTRY_POINT: &str = "func main() {";

pub const INDENT: &str = "\t";

pub const PRINT: &str = "fmt.Println";

/// Formatted concatenation of two operands of any type.
pub const CONCAT: &str = "fmt.Sprintf(\"%v%v\"";

/// Quotes raw string literal text as a Go interpreted string literal.
///
/// Backslash escapes are kept as written, except `\'` which Go does not
/// accept inside double quotes. Bare double quotes and line breaks are
/// escaped.
pub fn string_literal(raw: &str) -> String {
    let mut buf = String::with_capacity(raw.len() + 2);
    buf.push('"');
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some('\'') => buf.push('\''),
                Some('\n') => buf.push_str("\\n"),
                Some('\r') => buf.push_str("\\r"),
                Some(escaped) => {
                    buf.push('\\');
                    buf.push(escaped);
                }
                None => buf.push_str("\\\\"),
            },
            '"' => buf.push_str("\\\""),
            '\n' => buf.push_str("\\n"),
            '\r' => buf.push_str("\\r"),
            c => buf.push(c),
        }
    }
    buf.push('"');
    buf
}
