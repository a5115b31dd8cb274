use crate::error::Error;
use crate::Result;
use std::env;
use std::fs::File;
use std::io::{self, BufRead, BufReader};

pub const DATABASE_ENVVAR: &str = "KSTALE_DATABASE";

/// Name used to read from the standard input instead of a file.
pub const STDIN_FILENAME: &str = "-";

pub fn get_database_file(args_file: Option<String>) -> Result<String> {
    if let Some(file) = args_file {
        return Ok(file);
    }

    return get_env_database_file().ok_or(Error::Config(format!(
        "Specify the database dump or set {}",
        DATABASE_ENVVAR
    )));
}

pub fn get_env_database_file() -> Option<String> {
    return env::var(DATABASE_ENVVAR).ok();
}

pub fn read_file_lines(filename: &str) -> Result<Vec<String>> {
    if filename == STDIN_FILENAME {
        let stdin = io::stdin();
        return read_lines(stdin.lock(), "stdin");
    }

    let fd = File::open(filename).map_err(|error| {
        (format!("Unable to read the file '{}'", filename), error)
    })?;
    return read_lines(BufReader::new(fd), filename);
}

fn read_lines<R: BufRead>(reader: R, source: &str) -> Result<Vec<String>> {
    let mut lines = Vec::new();
    for line in reader.lines() {
        let line = line.map_err(|error| {
            (format!("Unable to read the file '{}'", source), error)
        })?;
        lines.push(line);
    }

    return Ok(lines);
}
