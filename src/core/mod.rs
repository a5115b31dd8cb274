//! Selection of the principals whose keys are stale

mod directory;
pub use directory::{open_directory, Directory, DumpDirectory};

mod filter;
pub use filter::{
    evaluate, rejection, run, FilterConfig, Rejection, StalePrincipals,
};

mod principal;
pub use principal::{epoch_to_datetime, PrincipalRecord, DISALLOW_ALL_TIX};

mod source;
pub use source::{from_list, from_wildcard, DEFAULT_PATTERN};

pub mod time;
