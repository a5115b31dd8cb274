//! Decides which principals have stale keys

use super::{Directory, PrincipalRecord};
use crate::Result;
use chrono::{DateTime, Utc};
use log::debug;
use regex::Regex;
use std::fmt;

/// Criteria to report a principal, built once from the arguments.
#[derive(Debug, Clone)]
pub struct FilterConfig {
    pub changed_after: DateTime<Utc>,
    pub exclude_disabled: bool,
    pub exclude_pattern: Option<Regex>,
    pub expired_before: Option<DateTime<Utc>>,
}

impl FilterConfig {
    pub fn new(changed_after: DateTime<Utc>) -> Self {
        return Self {
            changed_after,
            exclude_disabled: false,
            exclude_pattern: None,
            expired_before: None,
        };
    }

    pub fn exclude_disabled(mut self, exclude_disabled: bool) -> Self {
        self.exclude_disabled = exclude_disabled;
        self
    }

    pub fn exclude_pattern(mut self, exclude_pattern: Option<Regex>) -> Self {
        self.exclude_pattern = exclude_pattern;
        self
    }

    pub fn expired_before(
        mut self,
        expired_before: Option<DateTime<Utc>>,
    ) -> Self {
        self.expired_before = expired_before;
        self
    }

    fn excludes_name(&self, name: &str) -> bool {
        if let Some(pattern) = &self.exclude_pattern {
            return pattern.is_match(name);
        }
        return false;
    }
}

/// Reason to leave a principal out of the report.
#[derive(Debug, PartialEq, Clone, Copy)]
pub enum Rejection {
    ExcludedName,
    Disabled,
    Expired,
    RecentlyChanged,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ExcludedName => write!(f, "name excluded"),
            Self::Disabled => write!(f, "disabled"),
            Self::Expired => write!(f, "password expired"),
            Self::RecentlyChanged => write!(f, "password changed recently"),
        }
    }
}

/// Returns the first criteria that excludes the principal, if any.
///
/// A principal changed exactly at `changed_after` is excluded, whereas one
/// that expires exactly at `expired_before` is not considered expired.
pub fn rejection(
    config: &FilterConfig,
    record: &PrincipalRecord,
) -> Option<Rejection> {
    if config.exclude_disabled && record.disallow_all_tix {
        return Some(Rejection::Disabled);
    }

    if let (Some(expired_before), Some(expiration)) =
        (config.expired_before, record.password_expiration)
    {
        if expiration < expired_before {
            return Some(Rejection::Expired);
        }
    }

    if let Some(last_change) = record.last_password_change {
        if last_change >= config.changed_after {
            return Some(Rejection::RecentlyChanged);
        }
    }

    return None;
}

/// Whether the principal must be reported.
pub fn evaluate(config: &FilterConfig, record: &PrincipalRecord) -> bool {
    return rejection(config, record).is_none();
}

/// Looks up and evaluates the principals one by one, yielding the names of
/// those that must be reported, in the same order. The first lookup error is
/// yielded and then the iteration ends.
pub fn run<'a, I>(
    config: &'a FilterConfig,
    names: I,
    directory: &'a dyn Directory,
) -> StalePrincipals<'a, I::IntoIter>
where
    I: IntoIterator<Item = String>,
{
    return StalePrincipals {
        config,
        names: names.into_iter(),
        directory,
        failed: false,
    };
}

pub struct StalePrincipals<'a, I> {
    config: &'a FilterConfig,
    names: I,
    directory: &'a dyn Directory,
    failed: bool,
}

impl<'a, I> Iterator for StalePrincipals<'a, I>
where
    I: Iterator<Item = String>,
{
    type Item = Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        while let Some(name) = self.names.next() {
            if self.config.excludes_name(&name) {
                debug!("Skip {}: {}", name, Rejection::ExcludedName);
                continue;
            }

            let record = match self.directory.get(&name) {
                Ok(record) => record,
                Err(err) => {
                    self.failed = true;
                    return Some(Err(err));
                }
            };

            match rejection(self.config, &record) {
                Some(reason) => debug!("Skip {}: {}", name, reason),
                None => return Some(Ok(name)),
            }
        }

        return None;
    }
}
