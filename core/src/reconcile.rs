//! Parsing of the cracked hashes printed by the engines and merging into the run results.

use itertools::Itertools;
use tracing::{debug, trace};

use crate::{
    credential::{CrackMethod, CrackedResult, CredentialId},
    engine::EngineKind,
    error::AixcrackResult,
    hash::HashType,
    store::CredentialStore,
};

/// The separator of the fields of a cracked line.
const FIELD_DELIMITER: char = ':';

/// The fields John prints between the password and the id.
const JOHN_PLACEHOLDER_FIELDS: usize = 4;

/// A John line holds a username, a password, the placeholders and the id.
pub const JOHN_MIN_FIELDS: usize = JOHN_PLACEHOLDER_FIELDS + 3;

/// A hashcat line holds an id, a hash and a password.
pub const HASHCAT_MIN_FIELDS: usize = 3;

/// A cracked hash as printed by an engine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CrackedLine {
    pub id: CredentialId,
    pub username: Option<String>,
    pub password: String,
}

/// Returns true if the field is hashcat complaining about a line of the hash file.
pub fn is_hashcat_error(field: &str) -> bool {
    field.contains("Hashfile '") && field.contains("' on line ")
}

/// Parses a line printed by John, e.g. `root:abc123:::::42`.
fn parse_john_line(line: &str) -> Option<CrackedLine> {
    let mut fields = line.split(FIELD_DELIMITER).collect_vec();
    if fields.len() < JOHN_MIN_FIELDS {
        return None;
    }

    let username = fields.remove(0);
    let id = fields.pop()?;
    fields.truncate(fields.len() - JOHN_PLACEHOLDER_FIELDS);

    Some(CrackedLine {
        id: id.parse().ok()?,
        username: Some(username)
            .filter(|username| !username.is_empty())
            .map(str::to_owned),
        // the password may contain the delimiter
        password: fields.join(":"),
    })
}

/// Parses a line printed by hashcat, e.g. `42:7Qd7Jv/hrHcd.:abc123`.
fn parse_hashcat_line(line: &str) -> Option<CrackedLine> {
    if line.split(FIELD_DELIMITER).count() < HASHCAT_MIN_FIELDS {
        return None;
    }

    let mut fields = line.split(FIELD_DELIMITER);
    let id = fields.next()?;
    if is_hashcat_error(id) {
        return None;
    }

    // the hash
    fields.next()?;

    Some(CrackedLine {
        id: id.parse().ok()?,
        username: None,
        password: fields.join(":"),
    })
}

/// Parses a line of the engine output.
/// Returns `None` if the line doesn't describe a cracked hash.
pub fn parse_line(engine: EngineKind, line: &str) -> Option<CrackedLine> {
    match engine {
        EngineKind::John => parse_john_line(line),
        EngineKind::Hashcat => parse_hashcat_line(line),
    }
}

/// Merges the cracked lines of an engine into the results of a run.
pub struct ResultReconciler<'a, S: CredentialStore + ?Sized> {
    store: &'a mut S,
    workspace: &'a str,
    engine: EngineKind,
}

impl<'a, S: CredentialStore + ?Sized> ResultReconciler<'a, S> {
    /// Creates a reconciler committing to the given store.
    pub fn new(store: &'a mut S, workspace: &'a str, engine: EngineKind) -> Self {
        Self {
            store,
            workspace,
            engine,
        }
    }

    /// Parses the lines and appends the newly cracked credentials to `results`.
    ///
    /// A credential that already has a result is left untouched, whatever the phase
    /// that cracked it. Every merged credential is committed to the store.
    /// Returns the number of merged results.
    pub fn merge<I>(
        &mut self,
        lines: I,
        results: &mut Vec<CrackedResult>,
        hash_type: HashType,
        method: CrackMethod,
    ) -> AixcrackResult<usize>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut merged = 0;

        for line in lines {
            let line = line.as_ref().trim();
            if line.is_empty() {
                continue;
            }

            let Some(cracked) = parse_line(self.engine, line) else {
                trace!("skipping engine line: {line}");
                continue;
            };

            if results.iter().any(|result| result.id == cracked.id) {
                continue;
            }

            let Some(credential) = self.store.query_by_id(self.workspace, cracked.id)? else {
                debug!(id = %cracked.id, "skipping a cracked hash unknown to the store");
                continue;
            };

            let username = cracked.username.or(credential.username);
            self.store
                .insert_cracked(username.as_deref(), &cracked.password, cracked.id)?;

            results.push(CrackedResult {
                id: cracked.id,
                hash_type,
                username,
                password: cracked.password,
                method,
            });
            merged += 1;
        }

        Ok(merged)
    }
}
