//! Parsing of the cutoff dates given by the operator

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};

const NAIVE_DATETIME_FORMATS: &[&str] =
    &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];
const NAIVE_DATE_FORMAT: &str = "%Y-%m-%d";

/// Parses a date given in one of the formats:
/// - RFC 3339, like 2020-01-01T00:00:00Z
/// - YYYY-MM-DD HH:MM:SS or YYYY-MM-DDTHH:MM:SS, in local time
/// - YYYY-MM-DD, as midnight in local time
/// - @<seconds since epoch>
pub fn parse_datetime(value: &str) -> Result<DateTime<Utc>, String> {
    let value = value.trim();

    if let Some(secs) = value.strip_prefix('@') {
        let secs = secs
            .parse::<i64>()
            .map_err(|_| invalid_date_msg(value))?;
        return Utc
            .timestamp_opt(secs, 0)
            .single()
            .ok_or(invalid_date_msg(value));
    }

    if let Ok(datetime) = DateTime::parse_from_rfc3339(value) {
        return Ok(datetime.with_timezone(&Utc));
    }

    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return local_to_utc(naive, value);
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(value, NAIVE_DATE_FORMAT) {
        let naive = date
            .and_hms_opt(0, 0, 0)
            .ok_or(invalid_date_msg(value))?;
        return local_to_utc(naive, value);
    }

    return Err(invalid_date_msg(value));
}

fn local_to_utc(
    naive: NaiveDateTime,
    value: &str,
) -> Result<DateTime<Utc>, String> {
    return Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|datetime| datetime.with_timezone(&Utc))
        .ok_or(format!("Date '{}' does not exist in local time", value));
}

fn invalid_date_msg(value: &str) -> String {
    return format!(
        "Invalid date '{}', use YYYY-MM-DD, YYYY-MM-DD HH:MM:SS, RFC 3339 or @<epoch>",
        value
    );
}
