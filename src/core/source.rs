//! Resolution of the principals to audit

use super::Directory;
use crate::Result;

/// Pattern that matches every principal of the realm.
pub const DEFAULT_PATTERN: &str = "*";

/// Takes each non-empty line as a principal name, keeping the order. Names
/// are not validated here, a bad name fails when it is looked up.
pub fn from_list<I, S>(lines: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    return lines
        .into_iter()
        .map(|line| line.as_ref().trim().to_string())
        .filter(|name| !name.is_empty())
        .collect();
}

/// Retrieves the principals matching the pattern, in the order given by the
/// directory.
pub fn from_wildcard(
    directory: &dyn Directory,
    pattern: &str,
) -> Result<Vec<String>> {
    return directory.list(pattern);
}
