//! Principal name patterns, as understood by kadmin list_principals

use regex::Regex;

/// Appends the realm to the principal name if it has none.
pub fn qualify_name(name: &str, realm: &str) -> String {
    if has_realm(name) {
        return name.to_string();
    }
    return format!("{}@{}", name, realm);
}

/// Converts a glob pattern into an anchored regex. Patterns without realm
/// only match principals of the given realm.
pub fn glob_to_regex(glob: &str, realm: &str) -> Result<Regex, String> {
    let glob = qualify_name(glob, realm);
    let chars: Vec<char> = glob.chars().collect();
    let mut regex = String::from("^");

    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            '*' => regex.push_str(".*"),
            '?' => regex.push('.'),
            '\\' if i + 1 < chars.len() => {
                i += 1;
                push_literal(&mut regex, chars[i]);
            }
            '[' => match class_end(&chars, i) {
                Some(end) => {
                    push_class(&mut regex, &chars[i + 1..end]);
                    i = end;
                }
                None => push_literal(&mut regex, '['),
            },
            c => push_literal(&mut regex, c),
        }
        i += 1;
    }
    regex.push('$');

    return Regex::new(&regex)
        .map_err(|err| format!("Invalid pattern '{}': {}", glob, err));
}

fn has_realm(name: &str) -> bool {
    let mut escaped = false;
    for c in name.chars() {
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == '@' {
            return true;
        }
    }
    return false;
}

/// Position of the ']' that closes the class opened at `start`. A ']' just
/// after the '[' (or after "[!") belongs to the class.
fn class_end(chars: &[char], start: usize) -> Option<usize> {
    let mut i = start + 1;
    if i < chars.len() && chars[i] == '!' {
        i += 1;
    }
    if i < chars.len() && chars[i] == ']' {
        i += 1;
    }
    while i < chars.len() {
        if chars[i] == ']' {
            return Some(i);
        }
        i += 1;
    }
    return None;
}

fn push_class(regex: &mut String, class: &[char]) {
    regex.push('[');
    let mut class = class;
    if class.first() == Some(&'!') {
        regex.push('^');
        class = &class[1..];
    }
    for (i, &c) in class.iter().enumerate() {
        match c {
            '-' if i != 0 && i != class.len() - 1 => regex.push('-'),
            '\\' | '[' | ']' | '^' | '-' | '&' | '~' => {
                regex.push('\\');
                regex.push(c);
            }
            _ => regex.push(c),
        }
    }
    regex.push(']');
}

fn push_literal(regex: &mut String, c: char) {
    regex.push_str(&regex::escape(&c.to_string()));
}
