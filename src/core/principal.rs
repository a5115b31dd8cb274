//! Snapshot of the principal attributes relevant to the audit

use chrono::{DateTime, TimeZone, Utc};

/// Principal attribute that denies the issuance of any ticket
/// (KRB5_KDB_DISALLOW_ALL_TIX).
pub const DISALLOW_ALL_TIX: u32 = 0x00000040;

/// Attributes of one principal, as retrieved from the directory.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct PrincipalRecord {
    pub disallow_all_tix: bool,
    pub password_expiration: Option<DateTime<Utc>>,
    pub last_password_change: Option<DateTime<Utc>>,
}

impl PrincipalRecord {
    pub fn new(
        disallow_all_tix: bool,
        password_expiration: Option<DateTime<Utc>>,
        last_password_change: Option<DateTime<Utc>>,
    ) -> Self {
        return Self {
            disallow_all_tix,
            password_expiration,
            last_password_change,
        };
    }

    /// Builds the record from the raw values stored by the KDC, where
    /// timestamps are seconds since epoch and 0 means "not set".
    pub fn from_raw(
        attributes: u32,
        pw_expiration: u32,
        last_pwd_change: u32,
    ) -> Self {
        return Self::new(
            attributes & DISALLOW_ALL_TIX != 0,
            epoch_to_datetime(pw_expiration),
            epoch_to_datetime(last_pwd_change),
        );
    }
}

/// Kerberos timestamps are unsigned 32 bits, where 0 is used as "never".
pub fn epoch_to_datetime(secs: u32) -> Option<DateTime<Utc>> {
    if secs == 0 {
        return None;
    }
    return Utc.timestamp_opt(secs as i64, 0).single();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_timestamps_are_absent() {
        let record = PrincipalRecord::from_raw(0, 0, 0);
        assert_eq!(None, record.password_expiration);
        assert_eq!(None, record.last_password_change);
        assert!(!record.disallow_all_tix);
    }

    #[test]
    fn test_disallow_all_tix_attribute() {
        let record = PrincipalRecord::from_raw(0x40 | 0x80, 0, 0);
        assert!(record.disallow_all_tix);

        let record = PrincipalRecord::from_raw(0x80, 0, 0);
        assert!(!record.disallow_all_tix);
    }

    #[test]
    fn test_timestamps_beyond_2038() {
        let secs = 3_000_000_000u32;
        let record = PrincipalRecord::from_raw(0, secs, secs);
        assert_eq!(
            Utc.timestamp_opt(3_000_000_000, 0).single(),
            record.last_password_change
        );
    }
}
