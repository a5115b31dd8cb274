use crate::core::time::parse_datetime;
use regex::Regex;

pub fn is_date(v: String) -> Result<(), String> {
    parse_datetime(&v)?;
    return Ok(());
}

pub fn is_regex(v: String) -> Result<(), String> {
    Regex::new(&v)
        .map_err(|err| format!("Invalid regex '{}': {}", v, err))?;
    return Ok(());
}

pub fn is_realm(v: String) -> Result<(), String> {
    if v.is_empty() || v.contains(|c: char| ['@', '/', '\\'].contains(&c)) {
        return Err(format!(
            "Invalid realm '{}', it must be something like EXAMPLE.ORG",
            v
        ));
    }

    return Ok(());
}
