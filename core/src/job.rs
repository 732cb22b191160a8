use std::collections::BTreeSet;

use crate::{
    credential::{CrackedResult, CredentialId},
    engine::EngineKind,
    error::AixcrackResult,
    hash::HashType,
    store::CredentialStore,
};

/// The uncracked hashes of one type, handed to an engine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Job {
    pub hash_type: HashType,
    /// The hash lines in the format of the engine.
    pub hash_lines: Vec<String>,
    /// Every credential of the job.
    pub credential_ids: BTreeSet<CredentialId>,
    /// The credentials not cracked yet.
    pub remaining_ids: BTreeSet<CredentialId>,
}

impl Job {
    /// Removes the credentials present in the results from the remaining ones.
    pub fn shrink(&mut self, results: &[CrackedResult]) {
        for result in results {
            self.remaining_ids.remove(&result.id);
        }
    }

    /// Returns true if every credential of the job is cracked.
    pub fn is_done(&self) -> bool {
        self.remaining_ids.is_empty()
    }
}

/// Builds the job of the uncracked hashes of the given type.
/// Returns `None` if there is nothing to crack.
pub fn hash_job<S: CredentialStore + ?Sized>(
    store: &S,
    workspace: &str,
    hash_type: HashType,
    engine: EngineKind,
) -> AixcrackResult<Option<Job>> {
    let credentials = store
        .query(workspace, hash_type)?
        .into_iter()
        .filter(|credential| !credential.is_cracked())
        .collect::<Vec<_>>();

    if credentials.is_empty() {
        return Ok(None);
    }

    let hash_lines = credentials
        .iter()
        .map(|credential| credential.formatted_hash(engine))
        .collect();
    let credential_ids = credentials
        .iter()
        .map(|credential| credential.id)
        .collect::<BTreeSet<_>>();

    Ok(Some(Job {
        hash_type,
        hash_lines,
        remaining_ids: credential_ids.clone(),
        credential_ids,
    }))
}
