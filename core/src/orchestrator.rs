//! Sequencing of the cracking phases of every job of a run.

use std::{
    env,
    fmt::Display,
    path::{Path, PathBuf},
    time::Instant,
};

use itertools::Itertools;
use tracing::{debug, info, warn};

use crate::{
    credential::{CrackMethod, CrackedResult},
    engine::{AttackMode, CrackEngine, EngineKind, Invocation},
    error::AixcrackResult,
    event::Event,
    hash::HashType,
    job::{hash_job, Job},
    reconcile::ResultReconciler,
    store::CredentialStore,
    wordlist::{
        provision_wordlist, write_temp_file, ArtifactKind, ArtifactRegistry, TempArtifact,
        WordlistOptions,
    },
    DEFAULT_WORKSPACE, DES_MAX_PASSWORD_LENGTH, KORELOGIC_RULES,
};

/// A builder for the configuration of a run.
#[derive(Clone, Debug)]
pub struct CrackConfigBuilder {
    workspace: String,
    hash_types: Vec<HashType>,
    incremental: bool,
    wordlist: bool,
    korelogic: bool,
    show_command: bool,
    delete_temp_files: bool,
    temp_dir: PathBuf,
    wordlist_options: WordlistOptions,
}

impl Default for CrackConfigBuilder {
    fn default() -> Self {
        Self {
            workspace: DEFAULT_WORKSPACE.to_owned(),
            hash_types: vec![HashType::Descrypt],
            incremental: true,
            wordlist: true,
            korelogic: false,
            show_command: false,
            delete_temp_files: true,
            temp_dir: env::temp_dir(),
            wordlist_options: WordlistOptions::default(),
        }
    }
}

impl CrackConfigBuilder {
    /// Creates a new CrackConfigBuilder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the workspace whose credentials are cracked.
    pub fn workspace(mut self, workspace: &str) -> Self {
        self.workspace = workspace.to_owned();

        self
    }

    /// Sets the hash types to crack, one job per type.
    pub fn hash_types(mut self, hash_types: &[HashType]) -> Self {
        self.hash_types = hash_types.to_owned();

        self
    }

    /// Enables the incremental phase.
    pub fn incremental(mut self, incremental: bool) -> Self {
        self.incremental = incremental;

        self
    }

    /// Enables the wordlist phase.
    pub fn wordlist(mut self, wordlist: bool) -> Self {
        self.wordlist = wordlist;

        self
    }

    /// Applies the KoreLogic rules during the wordlist phase.
    /// Only John knows about these rules, this is ignored with hashcat.
    pub fn korelogic(mut self, korelogic: bool) -> Self {
        self.korelogic = korelogic;

        self
    }

    /// Reports the engine command of every phase.
    pub fn show_command(mut self, show_command: bool) -> Self {
        self.show_command = show_command;

        self
    }

    /// Deletes the wordlist and the hash files once the run is over.
    pub fn delete_temp_files(mut self, delete_temp_files: bool) -> Self {
        self.delete_temp_files = delete_temp_files;

        self
    }

    /// Sets the directory the temporary files are written to.
    pub fn temp_dir(mut self, temp_dir: &Path) -> Self {
        self.temp_dir = temp_dir.to_owned();

        self
    }

    /// Sets the sources of the wordlist.
    pub fn wordlist_options(mut self, wordlist_options: WordlistOptions) -> Self {
        self.wordlist_options = wordlist_options;

        self
    }

    /// Builds a CrackConfig with the specified parameters.
    pub fn build(self) -> CrackConfig {
        CrackConfig {
            workspace: self.workspace,
            hash_types: self.hash_types.into_iter().unique().collect(),
            incremental: self.incremental,
            wordlist: self.wordlist,
            korelogic: self.korelogic,
            show_command: self.show_command,
            delete_temp_files: self.delete_temp_files,
            temp_dir: self.temp_dir,
            wordlist_options: self.wordlist_options,
        }
    }
}

/// The configuration of a run.
#[derive(Clone, Debug)]
pub struct CrackConfig {
    pub workspace: String,
    pub hash_types: Vec<HashType>,
    pub incremental: bool,
    pub wordlist: bool,
    pub korelogic: bool,
    pub show_command: bool,
    pub delete_temp_files: bool,
    pub temp_dir: PathBuf,
    pub wordlist_options: WordlistOptions,
}

impl Default for CrackConfig {
    fn default() -> Self {
        CrackConfigBuilder::default().build()
    }
}

/// A step of a job.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Looks up the potfile, no attack is run.
    CheckingAlreadyCracked,
    Single,
    Normal,
    Incremental,
    Wordlist,
}

impl Phase {
    /// Returns the method recorded for the hashes cracked during this phase.
    pub fn method(&self) -> CrackMethod {
        match self {
            Self::CheckingAlreadyCracked => CrackMethod::AlreadyCracked,
            Self::Single => CrackMethod::Single,
            Self::Normal => CrackMethod::Normal,
            Self::Incremental => CrackMethod::Incremental,
            Self::Wordlist => CrackMethod::Wordlist,
        }
    }

    /// Returns the attack run during this phase, if any.
    pub fn attack_mode(&self) -> Option<AttackMode> {
        match self {
            Self::CheckingAlreadyCracked => None,
            Self::Single => Some(AttackMode::Single),
            Self::Normal => Some(AttackMode::Normal),
            Self::Incremental => Some(AttackMode::Incremental),
            Self::Wordlist => Some(AttackMode::Wordlist),
        }
    }
}

impl Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.attack_mode() {
            Some(mode) => write!(f, "{mode} mode"),
            None => f.write_str("potfile check"),
        }
    }
}

/// Returns the phases of a job, in order.
pub fn phase_plan(engine: EngineKind, config: &CrackConfig) -> Vec<Phase> {
    let mut phases = vec![Phase::CheckingAlreadyCracked];

    phases.extend(
        [Phase::Single, Phase::Normal]
            .into_iter()
            .filter(|phase| phase.attack_mode().is_some_and(|mode| engine.supports(mode))),
    );

    if config.incremental {
        phases.push(Phase::Incremental);
    }

    if config.wordlist {
        phases.push(Phase::Wordlist);
    }

    phases
}

/// The outcome of a run.
#[derive(Debug, Default)]
pub struct RunSummary {
    /// The cracked credentials of every job.
    pub results: Vec<CrackedResult>,
    /// The number of jobs that were run.
    pub jobs: usize,
    /// The temporary files left on the disk.
    pub kept_artifacts: Vec<TempArtifact>,
}

/// Drives an engine through the phases of every job and merges what it cracks.
pub struct Orchestrator<'a, S: CredentialStore + ?Sized, E: CrackEngine + ?Sized> {
    store: &'a mut S,
    engine: &'a E,
    config: &'a CrackConfig,
}

impl<'a, S: CredentialStore + ?Sized, E: CrackEngine + ?Sized> Orchestrator<'a, S, E> {
    /// Creates an orchestrator committing the cracked credentials to the store.
    pub fn new(store: &'a mut S, engine: &'a E, config: &'a CrackConfig) -> Self {
        Self {
            store,
            engine,
            config,
        }
    }

    /// Runs every job, calling `on_event` as the run progresses.
    ///
    /// The temporary files are deleted once the jobs are over, even if one of them failed.
    pub fn run<F>(mut self, mut on_event: F) -> AixcrackResult<RunSummary>
    where
        F: FnMut(Event<'_>),
    {
        let kind = self.engine.kind();

        let mut jobs = Vec::new();
        for &hash_type in &self.config.hash_types {
            match hash_job(&*self.store, &self.config.workspace, hash_type, kind)? {
                Some(job) => jobs.push(job),
                None => info!("No {hash_type} found to crack"),
            }
        }

        if jobs.is_empty() {
            info!(
                "No uncracked password hashes found for: {}",
                self.config.hash_types.iter().join(", ")
            );
            return Ok(RunSummary::default());
        }

        let wordlist = provision_wordlist(
            &*self.store,
            &self.config.workspace,
            &self.config.wordlist_options,
            DES_MAX_PASSWORD_LENGTH,
            &self.config.temp_dir,
        )?;

        let mut registry = ArtifactRegistry::new();
        registry.register(wordlist.clone());

        let mut results = Vec::new();
        let job_count = jobs.len();
        let outcome = jobs.into_iter().try_for_each(|job| {
            self.run_job(job, &wordlist.path, &mut registry, &mut results, &mut on_event)
        });

        let kept_artifacts = self.teardown(registry);
        outcome?;

        Ok(RunSummary {
            results,
            jobs: job_count,
            kept_artifacts,
        })
    }

    fn run_job<F>(
        &mut self,
        mut job: Job,
        wordlist: &Path,
        registry: &mut ArtifactRegistry,
        results: &mut Vec<CrackedResult>,
        on_event: &mut F,
    ) -> AixcrackResult<()>
    where
        F: FnMut(Event<'_>),
    {
        let hash_type = job.hash_type;
        let kind = self.engine.kind();

        let hash_file = write_temp_file(
            &self.config.temp_dir,
            &format!("hashes_tmp_{hash_type}_"),
            ArtifactKind::HashFile,
            &job.hash_lines,
        )?;
        registry.register(hash_file.clone());

        let mut reconciler =
            ResultReconciler::new(&mut *self.store, &self.config.workspace, kind);

        for phase in phase_plan(kind, self.config) {
            let start = Instant::now();

            match phase.attack_mode() {
                None => info!("Checking {hash_type} hashes already cracked..."),

                Some(mode) => {
                    info!("Cracking {hash_type} hashes in {mode} mode...");

                    let mut invocation = Invocation::new(mode, &hash_file.path, hash_type);
                    if matches!(mode, AttackMode::Single | AttackMode::Wordlist) {
                        invocation = invocation.wordlist(wordlist);
                    }
                    if mode == AttackMode::Wordlist
                        && self.config.korelogic
                        && kind == EngineKind::John
                    {
                        info!("Applying KoreLogic ruleset...");
                        invocation = invocation.rules(KORELOGIC_RULES);
                    }

                    if self.config.show_command {
                        on_event(Event::Command(self.engine.command_line(&invocation)?));
                    }

                    for line in self.engine.invoke(&invocation)? {
                        debug!("    {line}");
                        on_event(Event::EngineOutput(&line));
                    }
                }
            }

            let merged = reconciler.merge(
                self.engine.already_cracked(&hash_file.path, hash_type)?,
                results,
                hash_type,
                phase.method(),
            )?;
            job.shrink(results);

            let remaining = job.remaining_ids.len();
            debug!(%phase, merged, remaining, "phase finished");
            on_event(Event::PhaseFinished {
                hash_type,
                phase,
                elapsed: start.elapsed(),
                results: results.as_slice(),
                remaining,
            });

            if job.is_done() {
                break;
            }
        }

        on_event(Event::JobFinished {
            hash_type,
            results: results.as_slice(),
        });

        Ok(())
    }

    /// Deletes the temporary files if needed, returning the ones left on the disk.
    fn teardown(&self, registry: ArtifactRegistry) -> Vec<TempArtifact> {
        if !self.config.delete_temp_files {
            for artifact in registry.artifacts() {
                debug!(path = %artifact.path.display(), "keeping a temporary file");
            }
            return registry.artifacts().to_vec();
        }

        registry
            .cleanup()
            .into_iter()
            .map(|(artifact, e)| {
                warn!(
                    path = %artifact.path.display(),
                    error = %e,
                    "unable to delete a temporary file"
                );
                artifact
            })
            .collect()
    }
}
