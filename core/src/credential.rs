use std::{fmt::Display, num::ParseIntError, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{engine::EngineKind, hash::HashType};

/// The key of a credential in the store.
#[derive(Copy, Clone, Debug, Deserialize, Serialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CredentialId(pub u64);

impl Display for CredentialId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for CredentialId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(CredentialId)
    }
}

/// A password hash stored in the credential store.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct CredentialHash {
    pub id: CredentialId,
    pub hash_type: HashType,
    pub hash: String,
    pub username: Option<String>,
    /// The plaintext, once known.
    pub password: Option<String>,
}

impl CredentialHash {
    /// Returns true if the plaintext of this hash is already known.
    pub fn is_cracked(&self) -> bool {
        self.password.is_some()
    }

    /// Serializes the hash into the line format expected by the engine.
    ///
    /// John reads a passwd-like line where the id is stored in the last field,
    /// so it survives in the `--show` output.
    /// Hashcat is run with `--username`, so the id takes the place of the username.
    pub fn formatted_hash(&self, engine: EngineKind) -> String {
        match engine {
            EngineKind::John => format!(
                "{}:{}:::::{}",
                self.username.as_deref().unwrap_or_default(),
                self.hash,
                self.id
            ),
            EngineKind::Hashcat => format!("{}:{}", self.id, self.hash),
        }
    }
}

/// How a password was recovered.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum CrackMethod {
    AlreadyCracked,
    Single,
    Normal,
    Incremental,
    Wordlist,
}

impl Display for CrackMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::AlreadyCracked => "Already Cracked/POT",
            Self::Single => "Single",
            Self::Normal => "Normal",
            Self::Incremental => "Incremental",
            Self::Wordlist => "Wordlist",
        };

        f.write_str(s)
    }
}

/// A password recovered during a run.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CrackedResult {
    pub id: CredentialId,
    pub hash_type: HashType,
    pub username: Option<String>,
    pub password: String,
    pub method: CrackMethod,
}
