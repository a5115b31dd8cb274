use crate::core::{from_list, from_wildcard, run, Directory, FilterConfig};
use crate::utils;
use crate::Result;
use log::info;
use std::io::Write;

/// Writes, one per line, the principals whose keys were not changed since
/// the cutoff. Principals are taken from `principals_file`, if given, or
/// else from the directory by using `pattern`. Returns the number of
/// principals reported.
pub fn stale(
    directory: &dyn Directory,
    config: &FilterConfig,
    principals_file: Option<&str>,
    pattern: &str,
    out: &mut dyn Write,
) -> Result<usize> {
    let names = match principals_file {
        Some(filename) => {
            info!("Read principals from {}", filename);
            from_list(utils::read_file_lines(filename)?)
        }
        None => {
            info!("List principals '{}' in {}", pattern, directory.id());
            from_wildcard(directory, pattern)?
        }
    };

    let examined = names.len();
    let mut reported = 0;
    for name in run(config, names, directory) {
        let name = name?;
        writeln!(out, "{}", name)
            .map_err(|err| ("Unable to write the report", err))?;
        reported += 1;
    }

    info!("{} of {} principals reported", reported, examined);
    return Ok(reported);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::DumpDirectory;
    use crate::core::DEFAULT_PATTERN;
    use chrono::{TimeZone, Utc};
    use regex::Regex;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const DUMP: &str = "kdb5_util load_dump version 7
princ\t38\t30\t1\t0\t0\tkrbtgt/EXAMPLE.ORG@EXAMPLE.ORG\t0\t86400\t0\t0\t0\t0\t0\t0\t1\t4\t80a5ee5f\t-1;
princ\t38\t17\t1\t0\t0\talice@EXAMPLE.ORG\t0\t86400\t0\t0\t0\t0\t0\t0\t1\t4\t00f1f15c\t-1;
princ\t38\t15\t1\t0\t0\tbob@EXAMPLE.ORG\t64\t86400\t0\t0\t0\t0\t0\t0\t1\t4\t00f1f15c\t-1;
princ\t38\t17\t1\t0\t0\tcarol@EXAMPLE.ORG\t0\t86400\t0\t0\t0\t0\t0\t0\t1\t4\t80a5ee5f\t-1;
princ\t38\t31\t1\t0\t0\thost/db.example.org@EXAMPLE.ORG\t0\t86400\t0\t0\t0\t0\t0\t0\t1\t4\t00f1f15c\t-1;
";

    fn directory() -> DumpDirectory {
        return DumpDirectory::from_dump(
            "test.dump",
            DUMP.as_bytes(),
            "EXAMPLE.ORG",
        )
        .unwrap();
    }

    fn config() -> FilterConfig {
        return FilterConfig::new(
            Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap(),
        );
    }

    fn report(
        config: &FilterConfig,
        principals_file: Option<&str>,
    ) -> (Result<usize>, String) {
        let mut out = Vec::new();
        let result = stale(
            &directory(),
            config,
            principals_file,
            DEFAULT_PATTERN,
            &mut out,
        );
        return (result, String::from_utf8(out).unwrap());
    }

    #[test]
    fn test_report_whole_realm() {
        let (result, out) = report(&config(), None);
        assert_eq!(3, result.unwrap());
        assert_eq!(
            "alice@EXAMPLE.ORG\nbob@EXAMPLE.ORG\nhost/db.example.org@EXAMPLE.ORG\n",
            out
        );
    }

    #[test]
    fn test_report_with_exclusions() {
        let config = config()
            .exclude_disabled(true)
            .exclude_pattern(Some(Regex::new("^host/").unwrap()));
        let (result, out) = report(&config, None);
        assert_eq!(1, result.unwrap());
        assert_eq!("alice@EXAMPLE.ORG\n", out);
    }

    #[test]
    fn test_report_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "host/db.example.org\n\ncarol\nalice@EXAMPLE.ORG\n")
            .unwrap();

        let (result, out) =
            report(&config(), Some(file.path().to_str().unwrap()));
        assert_eq!(2, result.unwrap());
        assert_eq!("host/db.example.org\nalice@EXAMPLE.ORG\n", out);
    }

    #[test]
    fn test_unknown_principal_in_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "alice\nmallory\nbob\n").unwrap();

        let (result, out) =
            report(&config(), Some(file.path().to_str().unwrap()));
        assert!(result.unwrap_err().is_not_found_error());
        assert_eq!("alice\n", out);
    }

    #[test]
    fn test_missing_principals_file() {
        let (result, out) = report(&config(), Some("/nonexistent/list"));
        assert!(result.is_err());
        assert_eq!("", out);
    }
}
