use std::time::Duration;

use crate::{credential::CrackedResult, hash::HashType, orchestrator::Phase};

/// An event to track the progress of a cracking run.
#[derive(Debug)]
pub enum Event<'a> {
    /// The command about to be run, when showing commands is enabled.
    Command(String),
    /// A line printed by the engine during a phase.
    EngineOutput(&'a str),
    /// A phase of a job is over.
    PhaseFinished {
        hash_type: HashType,
        phase: Phase,
        elapsed: Duration,
        /// The results of the job so far.
        results: &'a [CrackedResult],
        /// The number of hashes of the job still to crack.
        remaining: usize,
    },
    /// Every phase of a job is over.
    JobFinished {
        hash_type: HashType,
        results: &'a [CrackedResult],
    },
}
