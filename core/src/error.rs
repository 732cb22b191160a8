use std::io;

use thiserror::Error;

use crate::{
    credential::CredentialId,
    engine::{AttackMode, EngineKind},
};

pub type AixcrackResult<T> = std::result::Result<T, AixcrackError>;

#[derive(Error, Debug)]
pub enum AixcrackError {
    #[error("A credential store connection is required to generate the wordlist")]
    NoDatabaseConnection,

    #[error("Unable to find the {0} binary. Is it installed and available in the PATH?")]
    EngineNotFound(EngineKind),

    #[error("Failed to start {program}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("{engine} does not support the {mode} attack mode")]
    UnsupportedMode { engine: EngineKind, mode: AttackMode },

    #[error("No credential with the id {0} exists in the store")]
    UnknownCredential(CredentialId),

    #[error(
        "Unable to access the file at the given path. Make sure the right permissions are available"
    )]
    Io(#[from] io::Error),

    #[error("Failed to serialize the credential store")]
    Serialize,

    #[error("Failed to load the credential store. Is the file corrupted?")]
    Check,
}
