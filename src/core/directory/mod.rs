//! Access to the principal database of the KDC
//!

mod directory_trait;
pub use directory_trait::Directory;

mod dump;
pub use dump::DumpDirectory;

mod glob;

use crate::error::Error;
use crate::Result;

/// Opens the principal database of the realm stored in the given location.
/// Only read-only sessions are supported.
pub fn open_directory(
    location: &str,
    realm: &str,
    read_only: bool,
) -> Result<Box<dyn Directory>> {
    if !read_only {
        return Err(Error::Connection(format!(
            "Unable to open '{}' for writing, only read-only access is supported",
            location
        )));
    }

    return Ok(Box::new(DumpDirectory::open(location, realm)?));
}
