mod validators;

use crate::core::time::parse_datetime;
use crate::core::{FilterConfig, DEFAULT_PATTERN};
use crate::error::Error;
use crate::Result;
use chrono::{DateTime, Utc};
use clap::{App, Arg, ArgMatches};
use regex::Regex;

pub fn args() -> App<'static, 'static> {
    App::new(env!("CARGO_PKG_NAME"))
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .version(env!("CARGO_PKG_VERSION"))
        .arg(
            Arg::with_name("realm")
                .long("realm")
                .short("r")
                .takes_value(true)
                .value_name("realm")
                .help("Realm to audit")
                .required(true)
                .validator(validators::is_realm),
        )
        .arg(
            Arg::with_name("changed-before")
                .long("changed-before")
                .short("b")
                .takes_value(true)
                .value_name("date")
                .help("Report principals whose keys were changed before this date")
                .required(true)
                .validator(validators::is_date),
        )
        .arg(
            Arg::with_name("database")
                .long("database")
                .short("d")
                .takes_value(true)
                .value_name("file")
                .help("KDC database dump, made with kdb5_util dump (or set KSTALE_DATABASE)"),
        )
        .arg(
            Arg::with_name("exclude-disabled")
                .long("exclude-disabled")
                .short("D")
                .help("Exclude principals that cannot get tickets"),
        )
        .arg(
            Arg::with_name("exclude")
                .long("exclude")
                .short("x")
                .takes_value(true)
                .value_name("regex")
                .help("Exclude principals whose name matches the regex")
                .validator(validators::is_regex),
        )
        .arg(
            Arg::with_name("expired-before")
                .long("expired-before")
                .short("e")
                .takes_value(true)
                .value_name("date")
                .help("Exclude principals whose password expired before this date")
                .validator(validators::is_date),
        )
        .arg(
            Arg::with_name("file")
                .long("file")
                .short("f")
                .takes_value(true)
                .value_name("file")
                .help("File with the principals to check, one per line (- for stdin)"),
        )
        .arg(
            Arg::with_name("pattern")
                .long("pattern")
                .short("p")
                .takes_value(true)
                .value_name("glob")
                .help("Pattern of the principals to check [default: *]")
                .conflicts_with("file"),
        )
        .arg(
            Arg::with_name("verbosity")
                .short("v")
                .multiple(true)
                .help("Increase message verbosity"),
        )
}

#[derive(Debug)]
pub struct Arguments {
    pub realm: String,
    pub changed_before: DateTime<Utc>,
    pub database: Option<String>,
    pub exclude_disabled: bool,
    pub exclude_pattern: Option<Regex>,
    pub expired_before: Option<DateTime<Utc>>,
    pub principals_file: Option<String>,
    pub pattern: String,
    pub verbosity: usize,
}

impl Arguments {
    pub fn filter_config(&self) -> FilterConfig {
        return FilterConfig::new(self.changed_before)
            .exclude_disabled(self.exclude_disabled)
            .exclude_pattern(self.exclude_pattern.clone())
            .expired_before(self.expired_before);
    }
}

pub struct ArgumentsParser<'a> {
    matches: &'a ArgMatches<'a>,
}

impl<'a> ArgumentsParser<'a> {
    pub fn parse(matches: &'a ArgMatches) -> Result<Arguments> {
        let parser = Self { matches: matches };
        return parser._parse();
    }

    fn _parse(&self) -> Result<Arguments> {
        return Ok(Arguments {
            realm: self.parse_required("realm")?.to_string(),
            changed_before: parse_date(self.parse_required("changed-before")?)?,
            database: self.matches.value_of("database").map(|s| s.into()),
            exclude_disabled: self.matches.is_present("exclude-disabled"),
            exclude_pattern: self.parse_exclude_pattern()?,
            expired_before: self
                .matches
                .value_of("expired-before")
                .map(parse_date)
                .transpose()?,
            principals_file: self.matches.value_of("file").map(|s| s.into()),
            pattern: self
                .matches
                .value_of("pattern")
                .unwrap_or(DEFAULT_PATTERN)
                .into(),
            verbosity: self.matches.occurrences_of("verbosity") as usize,
        });
    }

    fn parse_required(&self, name: &str) -> Result<&str> {
        return self
            .matches
            .value_of(name)
            .ok_or(Error::Config(format!("Missing argument '{}'", name)));
    }

    fn parse_exclude_pattern(&self) -> Result<Option<Regex>> {
        let pattern = match self.matches.value_of("exclude") {
            Some(pattern) => pattern,
            None => return Ok(None),
        };

        let regex = Regex::new(pattern).map_err(|err| {
            Error::Config(format!("Invalid regex '{}': {}", pattern, err))
        })?;
        return Ok(Some(regex));
    }
}

fn parse_date(value: &str) -> Result<DateTime<Utc>> {
    return parse_datetime(value).map_err(Error::Config);
}
