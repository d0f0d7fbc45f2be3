//! Glob-to-regex translation: `*` to `.*`, `?` to `.`, `[...]` passed
//! through verbatim, everything else regex-escaped.

/// Translates a shell-glob pattern into an anchored regular expression
/// source string, suitable for [`regex::Regex::new`].
pub fn glob_to_regex(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len() * 2 + 2);
    out.push('^');
    let mut chars = pattern.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '*' => out.push_str(".*"),
            '?' => out.push('.'),
            '[' => {
                out.push('[');
                for c in chars.by_ref() {
                    out.push(c);
                    if c == ']' {
                        break;
                    }
                }
            }
            _ => out.push_str(&regex::escape(&c.to_string())),
        }
    }
    out.push('$');
    out
}
