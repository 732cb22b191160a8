//! The external engines used to crack the hashes.

mod hashcat;
mod john;

use std::{
    env,
    fmt::Display,
    io::{BufRead, BufReader},
    path::{Path, PathBuf},
    process::{Child, ChildStdout, Command, Stdio},
    thread::{self, JoinHandle},
};

use itertools::Itertools;
use tracing::{debug, warn};

use crate::{
    error::{AixcrackError, AixcrackResult},
    hash::HashType,
};

/// The default potfile, shared by both engines.
pub const DEFAULT_POT: &str = "aixcrack.pot";

/// The brute force bound of the hash types whose algorithm takes the whole password.
pub const DEFAULT_INCREMENTAL_LENGTH: u8 = 8;

/// Directories searched for the engine binaries when they are not in the PATH.
const INSTALL_DIRS: &[&str] = &[
    "/opt/homebrew/bin",
    "/usr/local/bin",
    "/opt/local/bin",
    "/usr/bin",
    "/usr/sbin",
    "/snap/bin",
];

/// The engines able to crack the hashes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum EngineKind {
    /// John the Ripper, a rule and dictionary based cracker.
    John,
    /// Hashcat, a GPU-accelerated cracker.
    Hashcat,
}

impl EngineKind {
    /// The names the binary of this engine is usually installed under.
    fn binary_names(&self) -> &'static [&'static str] {
        match self {
            Self::John => &["john", "john-the-ripper"],
            Self::Hashcat => &["hashcat", "hashcat.bin"],
        }
    }

    /// Returns true if the engine supports the given attack mode.
    pub fn supports(&self, mode: AttackMode) -> bool {
        match self {
            Self::John => true,
            Self::Hashcat => matches!(mode, AttackMode::Incremental | AttackMode::Wordlist),
        }
    }
}

impl Display for EngineKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::John => f.write_str("john"),
            Self::Hashcat => f.write_str("hashcat"),
        }
    }
}

/// The strategies used to crack the hashes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum AttackMode {
    /// Guesses derived from the usernames, using John's single rules.
    Single,
    /// John's default batch mode.
    Normal,
    /// Brute force up to a maximum length.
    Incremental,
    /// Dictionary attack, optionally with mangling rules.
    Wordlist,
}

impl Display for AttackMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Single => "single",
            Self::Normal => "normal",
            Self::Incremental => "incremental",
            Self::Wordlist => "wordlist",
        };

        f.write_str(s)
    }
}

/// Describes one run of an engine against a hash file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Invocation {
    pub mode: AttackMode,
    pub hash_path: PathBuf,
    pub hash_type: HashType,
    pub wordlist: Option<PathBuf>,
    pub rules: Option<String>,
    /// The longest candidate tried in incremental mode.
    pub max_length: u8,
}

impl Invocation {
    /// Creates an invocation of the given mode without any wordlist or rules.
    pub fn new(mode: AttackMode, hash_path: &Path, hash_type: HashType) -> Self {
        Self {
            mode,
            hash_path: hash_path.to_owned(),
            hash_type,
            wordlist: None,
            rules: None,
            max_length: hash_type
                .max_password_length()
                .unwrap_or(DEFAULT_INCREMENTAL_LENGTH),
        }
    }

    /// Sets the wordlist used by the single and wordlist modes.
    pub fn wordlist(mut self, wordlist: &Path) -> Self {
        self.wordlist = Some(wordlist.to_owned());

        self
    }

    /// Sets the mangling rules applied to the wordlist.
    pub fn rules(mut self, rules: &str) -> Self {
        self.rules = Some(rules.to_owned());

        self
    }
}

/// The options shared by every invocation of an engine.
#[derive(Clone, Debug)]
pub struct EngineSettings {
    pub kind: EngineKind,
    /// The path of the engine binary. Searched for if not set.
    pub binary: Option<PathBuf>,
    /// The John configuration file, holding the rule sets.
    pub config: Option<PathBuf>,
    pub pot: PathBuf,
    pub session: String,
    /// The number of processes John should fork.
    pub fork: Option<u32>,
    /// The maximum run time of a single invocation, in seconds.
    pub max_runtime: Option<u64>,
    /// Enables hashcat's optimized kernels.
    pub optimize: bool,
}

impl EngineSettings {
    /// Creates the default settings of an engine.
    pub fn new(kind: EngineKind) -> Self {
        Self {
            kind,
            binary: None,
            config: None,
            pot: PathBuf::from(DEFAULT_POT),
            session: format!("aixcrack_{}", std::process::id()),
            fork: None,
            max_runtime: None,
            optimize: false,
        }
    }
}

/// The lines printed by an engine.
pub type OutputLines = Box<dyn Iterator<Item = String>>;

/// A trait that every engine must implement to be driven by the orchestrator.
pub trait CrackEngine {
    /// Returns the kind of this engine, which determines the hash line format.
    fn kind(&self) -> EngineKind;

    /// Returns the command that would be run for this invocation.
    fn command_line(&self, invocation: &Invocation) -> AixcrackResult<String>;

    /// Runs the attack. The lines are read lazily, the process is reaped once
    /// they are exhausted.
    fn invoke(&self, invocation: &Invocation) -> AixcrackResult<OutputLines>;

    /// Returns the lines of the hashes of the file already present in the potfile.
    fn already_cracked(
        &self,
        hash_path: &Path,
        hash_type: HashType,
    ) -> AixcrackResult<OutputLines>;
}

/// An engine run as a subprocess.
#[derive(Debug)]
pub struct ExternalEngine {
    settings: EngineSettings,
    binary: PathBuf,
}

impl ExternalEngine {
    /// Creates the engine, locating its binary if needed.
    pub fn new(settings: EngineSettings) -> AixcrackResult<Self> {
        let binary = match &settings.binary {
            Some(binary) if binary.is_file() => binary.clone(),
            Some(_) => return Err(AixcrackError::EngineNotFound(settings.kind)),
            None => find_binary(settings.kind)
                .ok_or(AixcrackError::EngineNotFound(settings.kind))?,
        };

        debug!(binary = %binary.display(), "using {}", settings.kind);

        Ok(Self { settings, binary })
    }

    /// Returns the path of the engine binary.
    pub fn binary(&self) -> &Path {
        &self.binary
    }

    fn crack_args(&self, invocation: &Invocation) -> AixcrackResult<Vec<String>> {
        match self.settings.kind {
            EngineKind::John => Ok(john::crack_args(&self.settings, invocation)),
            EngineKind::Hashcat => hashcat::crack_args(&self.settings, invocation),
        }
    }

    fn show_args(&self, hash_path: &Path, hash_type: HashType) -> Vec<String> {
        match self.settings.kind {
            EngineKind::John => john::show_args(&self.settings, hash_path, hash_type),
            EngineKind::Hashcat => hashcat::show_args(&self.settings, hash_path, hash_type),
        }
    }
}

impl CrackEngine for ExternalEngine {
    fn kind(&self) -> EngineKind {
        self.settings.kind
    }

    fn command_line(&self, invocation: &Invocation) -> AixcrackResult<String> {
        let args = self.crack_args(invocation)?;
        Ok(format!("{} {}", self.binary.display(), args.iter().join(" ")))
    }

    fn invoke(&self, invocation: &Invocation) -> AixcrackResult<OutputLines> {
        let args = self.crack_args(invocation)?;
        Ok(Box::new(ProcessLines::spawn(&self.binary, &args)?))
    }

    fn already_cracked(
        &self,
        hash_path: &Path,
        hash_type: HashType,
    ) -> AixcrackResult<OutputLines> {
        let args = self.show_args(hash_path, hash_type);
        Ok(Box::new(ProcessLines::spawn(&self.binary, &args)?))
    }
}

/// Looks for the binary of an engine in the PATH, then in the usual install directories.
fn find_binary(kind: EngineKind) -> Option<PathBuf> {
    let mut dirs = env::var_os("PATH")
        .map(|path| env::split_paths(&path).collect_vec())
        .unwrap_or_default();
    dirs.extend(INSTALL_DIRS.iter().map(PathBuf::from));

    dirs.iter()
        .cartesian_product(kind.binary_names())
        .map(|(dir, name)| dir.join(name))
        .find(|candidate| candidate.is_file())
}

/// The output of an engine process, read line by line.
///
/// Stdout is streamed as it is produced. Stderr is drained on a separate
/// thread so the child can't block on a full pipe, and its lines are yielded
/// once stdout is closed.
struct ProcessLines {
    program: String,
    child: Child,
    stdout: Option<BufReader<ChildStdout>>,
    stderr: Option<JoinHandle<Vec<String>>>,
    trailing: std::vec::IntoIter<String>,
}

impl ProcessLines {
    fn spawn(binary: &Path, args: &[String]) -> AixcrackResult<Self> {
        let program = binary.display().to_string();

        let mut child = Command::new(binary)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| AixcrackError::Spawn {
                program: program.clone(),
                source,
            })?;

        let stdout = child.stdout.take().map(BufReader::new);
        let stderr = child.stderr.take().map(|stderr| {
            thread::spawn(move || {
                BufReader::new(stderr)
                    .lines()
                    .map_while(Result::ok)
                    .collect()
            })
        });

        Ok(Self {
            program,
            child,
            stdout,
            stderr,
            trailing: Vec::new().into_iter(),
        })
    }

    /// Collects the stderr lines and reaps the process.
    fn finish(&mut self) {
        if let Some(handle) = self.stderr.take() {
            self.trailing = handle.join().unwrap_or_default().into_iter();
        }

        // a failing engine is not fatal, the potfile is what decides what was cracked
        match self.child.wait() {
            Ok(status) if status.success() => debug!(program = %self.program, "engine exited"),
            Ok(status) => warn!(
                program = %self.program,
                %status,
                "the engine exited with an error, results of this phase may be incomplete"
            ),
            Err(e) => warn!(program = %self.program, error = %e, "unable to wait for the engine"),
        }
    }
}

impl Iterator for ProcessLines {
    type Item = String;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(stdout) = &mut self.stdout {
            let mut buf = Vec::new();
            let read = stdout.read_until(b'\n', &mut buf);

            match read {
                Ok(n) if n > 0 => {
                    let line = String::from_utf8_lossy(&buf);
                    return Some(line.trim_end_matches(&['\r', '\n'][..]).to_owned());
                }
                _ => {
                    self.stdout = None;
                    self.finish();
                }
            }
        }

        self.trailing.next()
    }
}

impl Drop for ProcessLines {
    fn drop(&mut self) {
        // the output was not fully read, don't leave the engine running
        if self.stdout.take().is_some() {
            let _ = self.child.kill();
            let _ = self.child.wait();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};

    use super::{
        AttackMode, EngineKind, EngineSettings, ExternalEngine, Invocation,
        DEFAULT_INCREMENTAL_LENGTH,
    };
    use crate::{error::AixcrackError, hash::HashType};

    #[test]
    fn test_supported_modes() {
        assert!(EngineKind::John.supports(AttackMode::Single));
        assert!(EngineKind::John.supports(AttackMode::Normal));
        assert!(!EngineKind::Hashcat.supports(AttackMode::Single));
        assert!(!EngineKind::Hashcat.supports(AttackMode::Normal));
        assert!(EngineKind::Hashcat.supports(AttackMode::Incremental));
        assert!(EngineKind::Hashcat.supports(AttackMode::Wordlist));
    }

    #[test]
    fn test_invocation_defaults_to_hash_max_length() {
        let invocation = Invocation::new(
            AttackMode::Incremental,
            Path::new("hashes.txt"),
            HashType::Descrypt,
        );
        assert_eq!(8, invocation.max_length);

        let invocation = Invocation::new(
            AttackMode::Incremental,
            Path::new("hashes.txt"),
            HashType::Ssha256,
        );
        assert_eq!(DEFAULT_INCREMENTAL_LENGTH, invocation.max_length);
    }

    #[test]
    fn test_missing_binary() {
        let mut settings = EngineSettings::new(EngineKind::John);
        settings.binary = Some(PathBuf::from("/nonexistent/john"));

        assert!(matches!(
            ExternalEngine::new(settings),
            Err(AixcrackError::EngineNotFound(EngineKind::John))
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_process_lines_streams_stdout_then_stderr() {
        use super::ProcessLines;

        let args = [
            "-c".to_owned(),
            "echo first; echo oops >&2; printf 'second\\r\\n'; exit 3".to_owned(),
        ];
        let lines: Vec<String> = ProcessLines::spawn(Path::new("/bin/sh"), &args)
            .unwrap()
            .collect();

        assert_eq!(vec!["first", "second", "oops"], lines);
    }

    #[cfg(unix)]
    #[test]
    fn test_external_engine_command_line() {
        let mut settings = EngineSettings::new(EngineKind::Hashcat);
        settings.binary = Some(PathBuf::from("/bin/sh"));
        settings.session = "test".to_owned();
        let engine = ExternalEngine::new(settings).unwrap();

        let invocation = Invocation::new(
            AttackMode::Wordlist,
            Path::new("/tmp/hashes"),
            HashType::Descrypt,
        )
        .wordlist(Path::new("/tmp/words"));

        let command = super::CrackEngine::command_line(&engine, &invocation).unwrap();
        assert!(command.starts_with("/bin/sh --session=test"));
        assert!(command.ends_with("--attack-mode=0 /tmp/hashes /tmp/words"));
    }
}
