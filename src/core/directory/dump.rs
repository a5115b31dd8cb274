//! Principal database backed by a `kdb5_util dump` file, which is the usual
//! way to get a read-only snapshot of the KDC database.

use super::glob::{glob_to_regex, qualify_name};
use super::Directory;
use crate::core::PrincipalRecord;
use crate::error::Error;
use crate::Result;
use log::info;
use std::collections::HashMap;
use std::fs;
use std::str::{self, Split};

/// Type of the tl-data that stores the last password change
/// (KRB5_TL_LAST_PWD_CHANGE).
const TL_LAST_PWD_CHANGE: i32 = 0x0001;

const PRINC_RECORD: &[u8] = b"princ\t";

pub struct DumpDirectory {
    file_path: String,
    realm: String,
    principals: Vec<(String, PrincipalRecord)>,
    index: HashMap<String, usize>,
}

impl DumpDirectory {
    /// Loads the dump file. Fails if the file cannot be read or the realm
    /// is not stored in it.
    pub fn open(file_path: &str, realm: &str) -> Result<Self> {
        let content = fs::read(file_path).map_err(|err| {
            Error::Connection(format!(
                "Unable to read the database dump '{}': {}",
                file_path, err
            ))
        })?;

        let directory = Self::from_dump(file_path, &content, realm)?;
        info!("Load {} principals from {}", directory.len(), file_path);
        return Ok(directory);
    }

    pub fn from_dump(
        file_path: &str,
        content: &[u8],
        realm: &str,
    ) -> Result<Self> {
        let principals = parse_dump(file_path, content)?;

        let mut index = HashMap::with_capacity(principals.len());
        for (i, (name, _)) in principals.iter().enumerate() {
            index.insert(name.clone(), i);
        }

        let krbtgt = format!("krbtgt/{}@{}", realm, realm);
        if !index.contains_key(&krbtgt) {
            return Err(Error::Connection(format!(
                "Realm '{}' not found in '{}'",
                realm, file_path
            )));
        }

        return Ok(Self {
            file_path: file_path.to_string(),
            realm: realm.to_string(),
            principals,
            index,
        });
    }

    pub fn len(&self) -> usize {
        return self.principals.len();
    }

    pub fn is_empty(&self) -> bool {
        return self.principals.is_empty();
    }
}

impl Directory for DumpDirectory {
    fn id(&self) -> &str {
        return &self.file_path;
    }

    fn list(&self, pattern: &str) -> Result<Vec<String>> {
        let regex =
            glob_to_regex(pattern, &self.realm).map_err(Error::Directory)?;

        return Ok(self
            .principals
            .iter()
            .filter(|(name, _)| regex.is_match(name))
            .map(|(name, _)| name.clone())
            .collect());
    }

    fn get(&self, name: &str) -> Result<PrincipalRecord> {
        let name = qualify_name(name, &self.realm);
        let i = self.index.get(&name).ok_or(Error::NotFound(name.clone()))?;
        return Ok(self.principals[*i].1.clone());
    }
}

/// Parses the principal records of the dump, ignoring any other kind of
/// record (header, policies, ...). Principal records must be valid UTF-8.
fn parse_dump(
    file_path: &str,
    content: &[u8],
) -> Result<Vec<(String, PrincipalRecord)>> {
    let mut principals = Vec::new();

    for (i, raw_line) in content.split(|b| *b == b'\n').enumerate() {
        let raw_line = raw_line.strip_suffix(b"\r").unwrap_or(raw_line);
        if !raw_line.starts_with(PRINC_RECORD) {
            continue;
        }

        let line = str::from_utf8(raw_line).map_err(|_| {
            Error::Directory(format!(
                "Principal with invalid UTF-8 name in '{}' line {}",
                file_path,
                i + 1
            ))
        })?;

        let principal = parse_princ_line(line).map_err(|err| {
            Error::Directory(format!(
                "Malformed principal in '{}' line {}: {}",
                file_path,
                i + 1,
                err
            ))
        })?;
        principals.push(principal);
    }

    return Ok(principals);
}

/// Parses a principal record, with the layout:
///
/// princ len name_len n_tl_data n_key_data e_length name attributes
/// max_life max_renewable_life expiration pw_expiration last_success
/// last_failed fail_auth_count [tl_type tl_length tl_contents]* [keys]* e_data;
fn parse_princ_line(
    line: &str,
) -> std::result::Result<(String, PrincipalRecord), String> {
    let mut fields = line.split('\t');
    next_field(&mut fields, "record type")?;
    next_field(&mut fields, "base length")?;

    let name_len = parse_usize(next_field(&mut fields, "name length")?)?;
    let n_tl_data = parse_usize(next_field(&mut fields, "tl-data count")?)?;
    next_field(&mut fields, "key-data count")?;
    next_field(&mut fields, "extra data length")?;

    let name = next_field(&mut fields, "name")?;
    if name.len() != name_len {
        return Err(format!(
            "name '{}' has length {} instead of {}",
            name,
            name.len(),
            name_len
        ));
    }

    let attributes = parse_u32(next_field(&mut fields, "attributes")?)?;
    next_field(&mut fields, "max life")?;
    next_field(&mut fields, "max renewable life")?;
    next_field(&mut fields, "expiration")?;
    let pw_expiration =
        parse_u32(next_field(&mut fields, "password expiration")?)?;
    next_field(&mut fields, "last success")?;
    next_field(&mut fields, "last failed")?;
    next_field(&mut fields, "failed auth count")?;

    let mut last_pwd_change = 0;
    for _ in 0..n_tl_data {
        let tl_type = parse_u32(next_field(&mut fields, "tl-data type")?)?;
        let tl_length =
            parse_usize(next_field(&mut fields, "tl-data length")?)?;
        let tl_contents = next_field(&mut fields, "tl-data contents")?;

        if tl_type as i32 == TL_LAST_PWD_CHANGE && tl_length > 0 {
            last_pwd_change = decode_le_u32(tl_contents)?;
        }
    }

    return Ok((
        name.to_string(),
        PrincipalRecord::from_raw(attributes, pw_expiration, last_pwd_change),
    ));
}

fn next_field<'a>(
    fields: &mut Split<'a, char>,
    field_name: &str,
) -> std::result::Result<&'a str, String> {
    return fields.next().ok_or(format!("missing {}", field_name));
}

fn parse_usize(v: &str) -> std::result::Result<usize, String> {
    return v
        .parse::<usize>()
        .map_err(|_| format!("invalid number '{}'", v));
}

/// Values are dumped as signed 32 bits integers, so timestamps after 2038
/// appear as negative numbers.
fn parse_u32(v: &str) -> std::result::Result<u32, String> {
    let n = v
        .parse::<i64>()
        .map_err(|_| format!("invalid number '{}'", v))?;

    if n < i32::MIN as i64 || n > u32::MAX as i64 {
        return Err(format!("number '{}' out of range", v));
    }
    return Ok(n as u32);
}

fn decode_le_u32(hexa: &str) -> std::result::Result<u32, String> {
    if hexa.len() < 8 || !hexa.is_ascii() {
        return Err(format!("invalid timestamp data '{}'", hexa));
    }

    let mut bytes = [0u8; 4];
    for (i, byte) in bytes.iter_mut().enumerate() {
        *byte = u8::from_str_radix(&hexa[i * 2..i * 2 + 2], 16)
            .map_err(|_| format!("invalid hexadecimal '{}'", hexa))?;
    }

    return Ok(u32::from_le_bytes(bytes));
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use std::io::Write;
    use tempfile::NamedTempFile;

    const REALM: &str = "EXAMPLE.ORG";

    fn princ_line(
        name: &str,
        attributes: u32,
        pw_expiration: u32,
        last_pwd_change: Option<u32>,
    ) -> String {
        let mut tl_data = String::new();
        let mut n_tl_data = 0;
        if let Some(last_pwd_change) = last_pwd_change {
            let hexa: String = last_pwd_change
                .to_le_bytes()
                .iter()
                .map(|b| format!("{:02x}", b))
                .collect();
            tl_data.push_str(&format!("1\t4\t{}\t", hexa));
            n_tl_data += 1;
        }
        tl_data.push_str("2\t25\t5d0e1f10616b61646d696e2f61646d696e4045584d504c4500\t");
        n_tl_data += 1;

        return format!(
            "princ\t38\t{}\t{}\t1\t0\t{}\t{}\t86400\t604800\t0\t{}\t0\t0\t0\t{}1\t1\t17\t16\t00112233445566778899aabbccddeeff\t-1;",
            name.len(),
            n_tl_data,
            name,
            attributes as i32,
            pw_expiration as i32,
            tl_data
        );
    }

    fn sample_dump() -> String {
        return vec![
            "kdb5_util load_dump version 7".to_string(),
            princ_line("K/M@EXAMPLE.ORG", 0x40, 0, None),
            princ_line("krbtgt/EXAMPLE.ORG@EXAMPLE.ORG", 0, 0, Some(1262304000)),
            princ_line("alice@EXAMPLE.ORG", 0, 1672531200, Some(1559347200)),
            princ_line("bob@EXAMPLE.ORG", 0x40, 0, Some(1609459200)),
            princ_line("host/web.example.org@EXAMPLE.ORG", 0, 0, Some(1559347200)),
            princ_line("carol@OTHER.ORG", 0, 0, Some(1559347200)),
            "policy\tdefault\t0\t0\t1\t1\t0\t0\t0\t0\t0\t0\t0\t-1;".to_string(),
        ]
        .join("\n");
    }

    fn sample_directory() -> DumpDirectory {
        return DumpDirectory::from_dump("test.dump", sample_dump().as_bytes(), REALM)
            .unwrap();
    }

    #[test]
    fn test_parse_principal_record() {
        let directory = sample_directory();
        let alice = directory.get("alice@EXAMPLE.ORG").unwrap();

        assert!(!alice.disallow_all_tix);
        assert_eq!(
            Some(Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap()),
            alice.password_expiration
        );
        assert_eq!(
            Some(Utc.with_ymd_and_hms(2019, 6, 1, 0, 0, 0).unwrap()),
            alice.last_password_change
        );
    }

    #[test]
    fn test_parse_disabled_without_last_change() {
        let directory = sample_directory();
        let master = directory.get("K/M").unwrap();

        assert!(master.disallow_all_tix);
        assert_eq!(None, master.password_expiration);
        assert_eq!(None, master.last_password_change);
    }

    #[test]
    fn test_ignore_other_records() {
        let directory = sample_directory();
        assert_eq!(6, directory.len());
        assert!(!directory.is_empty());
    }

    #[test]
    fn test_principal_with_invalid_utf8() {
        let mut dump = sample_dump().into_bytes();
        dump.extend_from_slice(
            b"\nprinc\t38\t5\t0\t0\t0\tb\xffb@X\t0\t0\t0\t0\t0\t0\t0\t0\t-1;",
        );

        let err = DumpDirectory::from_dump("test.dump", &dump, REALM)
            .err()
            .unwrap();
        match err {
            Error::Directory(msg) => assert!(msg.contains("line 9")),
            _ => panic!("Unexpected error {:?}", err),
        }
    }

    #[test]
    fn test_invalid_utf8_outside_principals() {
        let mut dump = sample_dump().into_bytes();
        dump.extend_from_slice(b"\r\npolicy\tp\xff\t0\t-1;\r\n");

        let directory =
            DumpDirectory::from_dump("test.dump", &dump, REALM).unwrap();
        assert_eq!(6, directory.len());
        assert!(directory.get("alice").is_ok());
    }

    #[test]
    fn test_get_qualifies_names_with_realm() {
        let directory = sample_directory();
        assert_eq!(
            directory.get("bob").unwrap(),
            directory.get("bob@EXAMPLE.ORG").unwrap()
        );
    }

    #[test]
    fn test_get_unknown_principal() {
        let err = sample_directory().get("mallory").unwrap_err();
        assert!(err.is_not_found_error());
    }

    #[test]
    fn test_list_keeps_dump_order() {
        let names = sample_directory().list("*").unwrap();
        assert_eq!(
            vec![
                "K/M@EXAMPLE.ORG",
                "krbtgt/EXAMPLE.ORG@EXAMPLE.ORG",
                "alice@EXAMPLE.ORG",
                "bob@EXAMPLE.ORG",
                "host/web.example.org@EXAMPLE.ORG",
            ],
            names
        );
    }

    #[test]
    fn test_list_with_pattern() {
        let directory = sample_directory();
        assert_eq!(
            vec!["host/web.example.org@EXAMPLE.ORG"],
            directory.list("host/*").unwrap()
        );
        assert_eq!(
            vec!["carol@OTHER.ORG"],
            directory.list("*@OTHER.ORG").unwrap()
        );
        assert!(directory.list("nobody*").unwrap().is_empty());
    }

    #[test]
    fn test_missing_realm() {
        let err =
            DumpDirectory::from_dump("test.dump", sample_dump().as_bytes(), "NOWHERE.ORG")
                .err()
                .unwrap();
        match err {
            Error::Connection(_) => {}
            _ => panic!("Unexpected error {:?}", err),
        }
    }

    #[test]
    fn test_malformed_principal() {
        let dump = format!(
            "{}\nprinc\t38\t5\t0\t0\t0\tbob@X\tnot-a-number",
            sample_dump()
        );
        let err = DumpDirectory::from_dump("test.dump", dump.as_bytes(), REALM)
            .err()
            .unwrap();
        match err {
            Error::Directory(msg) => assert!(msg.contains("line 9")),
            _ => panic!("Unexpected error {:?}", err),
        }
    }

    #[test]
    fn test_timestamps_after_2038() {
        let dump = format!(
            "{}\n{}",
            sample_dump(),
            princ_line("dave@EXAMPLE.ORG", 0, 3000000000, Some(3000000000))
        );
        let directory = DumpDirectory::from_dump("test.dump", dump.as_bytes(), REALM)
            .unwrap();
        let dave = directory.get("dave").unwrap();
        assert_eq!(
            Utc.timestamp_opt(3000000000, 0).single(),
            dave.password_expiration
        );
        assert_eq!(
            Utc.timestamp_opt(3000000000, 0).single(),
            dave.last_password_change
        );
    }

    #[test]
    fn test_open_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(sample_dump().as_bytes()).unwrap();
        let path = file.path().to_str().unwrap().to_string();

        let directory = DumpDirectory::open(&path, REALM).unwrap();
        assert_eq!(path, directory.id());
        assert!(directory.get("alice").is_ok());
    }

    #[test]
    fn test_open_unreadable_file() {
        let err = DumpDirectory::open("/nonexistent/kstale.dump", REALM)
            .err()
            .unwrap();
        match err {
            Error::Connection(_) => {}
            _ => panic!("Unexpected error {:?}", err),
        }
    }
}
