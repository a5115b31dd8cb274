//! Report the principals of a Kerberos realm whose keys have not been
//! changed since a given date.

pub mod args;
pub mod commands;
pub mod core;
pub mod error;
pub mod utils;

pub use error::{Error, Result};
