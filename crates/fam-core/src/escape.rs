//! Text escaping for calendar property values.
//!
//! Four characters are reserved in `TEXT` values: backslash, newline, comma and
//! semicolon. Backslash is escaped first so the escapes introduced for the
//! other three are never themselves re-escaped.

/// Escape a value for use after the `:` of a calendar property line.
///
/// ```
/// assert_eq!(fam_core::escape_text("a,b;c\\d\ne"), "a\\,b\\;c\\\\d\\ne");
/// ```
pub fn escape_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 8);
    for ch in s.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            ',' => out.push_str("\\,"),
            ';' => out.push_str("\\;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Reverse [`escape_text`] in a single left-to-right pass.
///
/// Each backslash consumes exactly the character after it, so `\\,` decodes to
/// a backslash followed by a comma rather than an escaped comma. `\N` is
/// accepted as a newline; unknown escapes and a trailing lone backslash are
/// kept verbatim.
pub fn unescape_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') | Some('N') => out.push('\n'),
            Some(',') => out.push(','),
            Some(';') => out.push(';'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}
