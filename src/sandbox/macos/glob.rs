//! Glob pattern to regex conversion for Seatbelt profiles.

/// Convert a glob pattern to a Seatbelt-compatible regex.
///
/// Conversion rules:
/// - `**` matches any characters including `/`
/// - `*` matches any characters except `/`
/// - `?` matches any single character except `/`
/// - Regex metacharacters are escaped, so `[` and `{` are literal
/// - The match is anchored at the start and must end at `/` or end of string,
///   so a pattern also covers everything beneath what it names
pub fn glob_to_seatbelt_regex(pattern: &str) -> String {
    let mut result = String::with_capacity(pattern.len() * 2 + 8);
    result.push('^');

    let mut chars = pattern.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '*' => {
                if chars.peek() == Some(&'*') {
                    chars.next();
                    result.push_str(".*");
                } else {
                    result.push_str("[^/]*");
                }
            }
            '?' => result.push_str("[^/]"),
            '.' | '^' | '$' | '+' | '|' | '\\' | '(' | ')' | '[' | ']' | '{' | '}' | '"' => {
                result.push('\\');
                result.push(c);
            }
            _ => result.push(c),
        }
    }

    result.push_str("(/|$)");
    result
}
