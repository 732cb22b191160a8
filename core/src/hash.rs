use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::DES_MAX_PASSWORD_LENGTH;

/// The characters allowed in a DES-crypt hash.
const DES_ALPHABET: &[u8] = b"./0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// The length of a DES-crypt hash: 2 salt characters followed by 11 hash characters.
const DES_HASH_LENGTH: usize = 13;

/// All the hash types found in AIX password files.
#[derive(Copy, Clone, Debug, Deserialize, Serialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HashType {
    Descrypt,
    Smd5,
    Ssha1,
    Ssha256,
    Ssha512,
}

impl HashType {
    /// Identifies the type of a hash as stored in an AIX password file.
    pub fn identify(hash: &str) -> Option<Self> {
        let hash = hash.trim();

        // the salted hashes are prefixed with their algorithm, e.g. {ssha256}06$...
        if let Some(rest) = hash.strip_prefix('{') {
            let (tag, _) = rest.split_once('}')?;
            return match tag.to_ascii_lowercase().as_str() {
                "smd5" => Some(Self::Smd5),
                "ssha1" => Some(Self::Ssha1),
                "ssha256" => Some(Self::Ssha256),
                "ssha512" => Some(Self::Ssha512),
                _ => None,
            };
        }

        if hash.len() == DES_HASH_LENGTH && hash.bytes().all(|c| DES_ALPHABET.contains(&c)) {
            return Some(Self::Descrypt);
        }

        None
    }

    /// Returns the format name understood by John the Ripper.
    pub fn john_format(&self) -> &'static str {
        match self {
            Self::Descrypt => "descrypt",
            Self::Smd5 => "aix-smd5",
            Self::Ssha1 => "aix-ssha1",
            Self::Ssha256 => "aix-ssha256",
            Self::Ssha512 => "aix-ssha512",
        }
    }

    /// Returns the hash mode understood by hashcat.
    pub fn hashcat_mode(&self) -> u32 {
        match self {
            Self::Descrypt => 1500,
            Self::Smd5 => 6300,
            Self::Ssha1 => 6700,
            Self::Ssha256 => 6400,
            Self::Ssha512 => 6500,
        }
    }

    /// Returns the length after which the algorithm ignores the password, if any.
    pub fn max_password_length(&self) -> Option<u8> {
        match self {
            // DES only uses the 8 first characters of the password
            Self::Descrypt => Some(DES_MAX_PASSWORD_LENGTH),
            _ => None,
        }
    }
}

impl Display for HashType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.john_format())
    }
}
