use crate::core::PrincipalRecord;
use crate::Result;

/// Trait implemented by the principal databases that can be audited.
/// Access is always read-only.
pub trait Directory {
    fn id(&self) -> &str;

    /// Retrieves the names of the principals matching a glob pattern, in the
    /// order they are stored in the database.
    fn list(&self, pattern: &str) -> Result<Vec<String>>;

    /// Retrieves the attributes of a principal. Fails with
    /// [Error::NotFound](crate::error::Error::NotFound) if the principal does
    /// not exist.
    fn get(&self, name: &str) -> Result<PrincipalRecord>;
}
