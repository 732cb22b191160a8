pub mod credential;
pub mod engine;
pub mod error;
pub mod event;
pub mod hash;
pub mod job;
pub mod orchestrator;
pub mod passwd;
pub mod reconcile;
pub mod store;
pub mod wordlist;

pub use {
    credential::{CrackMethod, CrackedResult, CredentialHash, CredentialId},
    engine::{
        AttackMode, CrackEngine, EngineKind, EngineSettings, ExternalEngine, Invocation,
        DEFAULT_POT,
    },
    error::{AixcrackError, AixcrackResult},
    event::Event,
    hash::HashType,
    orchestrator::{CrackConfig, CrackConfigBuilder, Orchestrator, Phase, RunSummary},
    store::{CredentialStore, FileStore, MemoryStore},
    wordlist::WordlistOptions,
};

/// The maximum length of a password that DES-crypt takes into account.
/// Longer candidates hash like their first 8 characters.
pub const DES_MAX_PASSWORD_LENGTH: u8 = 8;

/// The name of the KoreLogic rule set in the John configuration.
pub const KORELOGIC_RULES: &str = "KoreLogicRules";

/// The workspace used when none is given.
pub const DEFAULT_WORKSPACE: &str = "default";
