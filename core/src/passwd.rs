//! Parsing of AIX password files.
//!
//! Both the `/etc/security/passwd` stanza format
//!
//! ```text
//! root:
//!         password = 7Qd7Jv/hrHcd.
//!         lastupdate = 1700000000
//! ```
//!
//! and plain `user:hash` lines are understood, and can be mixed in the same file.

use std::{fs, path::Path};

use crate::{error::AixcrackResult, hash::HashType};

/// The stanza attribute holding the hash.
const PASSWORD_ATTRIBUTE: &str = "password";

/// A user and its hash, as found in a password file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PasswdEntry {
    pub username: String,
    pub hash: String,
    /// `None` if the hash is not one of the supported types.
    pub hash_type: Option<HashType>,
}

impl PasswdEntry {
    fn new(username: &str, hash: &str) -> Option<Self> {
        let username = username.trim();
        let hash = hash.trim();

        // no password or a locked account
        if username.is_empty() || hash.is_empty() || hash == "*" {
            return None;
        }

        Some(Self {
            username: username.to_owned(),
            hash: hash.to_owned(),
            hash_type: HashType::identify(hash),
        })
    }
}

/// Returns the name of the stanza starting on this line, if any.
fn stanza_header(line: &str) -> Option<&str> {
    if line.starts_with(char::is_whitespace) {
        return None;
    }

    line.trim_end()
        .strip_suffix(':')
        .filter(|name| !name.is_empty() && !name.contains(':'))
}

/// Parses the contents of a password file.
pub fn parse_passwd(contents: &str) -> Vec<PasswdEntry> {
    let mut entries = Vec::new();
    let mut stanza = None;

    for line in contents.lines() {
        let trimmed = line.trim();

        // stanza comments start with an asterisk
        if trimmed.is_empty() || trimmed.starts_with('*') || trimmed.starts_with('#') {
            continue;
        }

        if let Some(name) = stanza_header(line) {
            stanza = Some(name);
            continue;
        }

        if line.starts_with(char::is_whitespace) {
            let Some(username) = stanza else {
                continue;
            };

            if let Some((attribute, value)) = trimmed.split_once('=') {
                if attribute.trim() == PASSWORD_ATTRIBUTE {
                    entries.extend(PasswdEntry::new(username, value));
                }
            }
            continue;
        }

        stanza = None;
        let mut fields = trimmed.split(':');
        if let (Some(username), Some(hash)) = (fields.next(), fields.next()) {
            entries.extend(PasswdEntry::new(username, hash));
        }
    }

    entries
}

/// Reads and parses a password file.
pub fn read_passwd(path: &Path) -> AixcrackResult<Vec<PasswdEntry>> {
    let contents = fs::read(path)?;
    Ok(parse_passwd(&String::from_utf8_lossy(&contents)))
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::tempdir;

    use super::{parse_passwd, read_passwd, PasswdEntry};
    use crate::hash::HashType;

    fn entry(username: &str, hash: &str, hash_type: Option<HashType>) -> PasswdEntry {
        PasswdEntry {
            username: username.to_owned(),
            hash: hash.to_owned(),
            hash_type,
        }
    }

    #[test]
    fn test_stanza_file() {
        let contents = "\
* a comment
root:
        password = 7Qd7Jv/hrHcd.
        lastupdate = 1700000000
        flags =

daemon:
        password = *

db2inst1:
        lastupdate = 1700000000
        password = {ssha256}06$aXayEJGxA02Bl4d2$TWfWx34oD.UjrS/Qtco5ZPAbFmY/mvAm4Q4Uq3Sw1ak

guest:
        password =
";

        assert_eq!(
            vec![
                entry("root", "7Qd7Jv/hrHcd.", Some(HashType::Descrypt)),
                entry(
                    "db2inst1",
                    "{ssha256}06$aXayEJGxA02Bl4d2$TWfWx34oD.UjrS/Qtco5ZPAbFmY/mvAm4Q4Uq3Sw1ak",
                    Some(HashType::Ssha256)
                ),
            ],
            parse_passwd(contents)
        );
    }

    #[test]
    fn test_colon_lines() {
        let contents = "root:7Qd7Jv/hrHcd.:0:0::/:/bin/ksh\nbin:*:2:2::/bin:\nadm:!:4:4::/var/adm:\n";

        assert_eq!(
            vec![
                entry("root", "7Qd7Jv/hrHcd.", Some(HashType::Descrypt)),
                entry("adm", "!", None),
            ],
            parse_passwd(contents)
        );
    }

    #[test]
    fn test_mixed() {
        let contents = "\
root:
        password = 7Qd7Jv/hrHcd.
operator:abJnggxhB/yWI
        password = ignored
";

        assert_eq!(
            vec![
                entry("root", "7Qd7Jv/hrHcd.", Some(HashType::Descrypt)),
                entry("operator", "abJnggxhB/yWI", Some(HashType::Descrypt)),
            ],
            parse_passwd(contents)
        );
    }

    #[test]
    fn test_read_passwd() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("passwd");
        fs::write(&path, "root:\n\tpassword = 7Qd7Jv/hrHcd.\n").unwrap();

        assert_eq!(
            vec![entry("root", "7Qd7Jv/hrHcd.", Some(HashType::Descrypt))],
            read_passwd(&path).unwrap()
        );
    }
}
