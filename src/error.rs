use std::fmt;
use std::io;
use std::result;

pub type Result<T> = result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
    /// Invalid or missing options, such as an unparsable date or regex.
    Config(String),

    /// The principal database could not be opened.
    Connection(String),

    /// The requested principal does not exist in the database.
    NotFound(String),

    /// Other failures of the principal database, such as malformed records.
    Directory(String),

    /// Errors due to local IO, such as reading the principals file or
    /// writing the report.
    IOError(String, io::Error),
}

impl Error {
    pub fn is_not_found_error(&self) -> bool {
        if let Error::NotFound(_) = self {
            return true;
        }
        return false;
    }

    pub fn is_config_error(&self) -> bool {
        if let Error::Config(_) = self {
            return true;
        }
        return false;
    }

    /// Exit status of the process when it fails with this error: 2 for
    /// configuration errors, 1 otherwise.
    pub fn exit_code(&self) -> i32 {
        if self.is_config_error() {
            return 2;
        }
        return 1;
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Config(s) => write!(f, "{}", s),
            Error::Connection(s) => write!(f, "{}", s),
            Error::NotFound(name) => {
                write!(f, "Principal '{}' does not exist", name)
            }
            Error::Directory(s) => write!(f, "{}", s),
            Error::IOError(desc, io_error) => {
                write!(f, "{}: {}", desc, io_error)
            }
        }
    }
}

impl From<(&str, io::Error)> for Error {
    fn from(error: (&str, io::Error)) -> Self {
        return Self::IOError(error.0.into(), error.1);
    }
}

impl From<(String, io::Error)> for Error {
    fn from(error: (String, io::Error)) -> Self {
        return Self::IOError(error.0, error.1);
    }
}
