//! Generation of the wordlist and bookkeeping of the temporary files of a run.

use std::{
    fs,
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
};

use itertools::Itertools;
use tempfile::Builder;
use tracing::info;

use crate::{
    error::{AixcrackError, AixcrackResult},
    store::CredentialStore,
};

/// The substitutions applied to the words when mutation is enabled.
const MUTATIONS: &[(char, char)] = &[
    ('a', '@'),
    ('o', '0'),
    ('e', '3'),
    ('s', '$'),
    ('t', '7'),
    ('l', '1'),
    ('s', '5'),
];

/// The sources the wordlist is built from.
#[derive(Clone, Debug)]
pub struct WordlistOptions {
    /// A wordlist file to include.
    pub custom_wordlist: Option<PathBuf>,
    /// Include the usernames and the known passwords of the workspace.
    pub use_creds: bool,
    /// Add the leetspeak variations of every word.
    pub mutate: bool,
}

impl Default for WordlistOptions {
    fn default() -> Self {
        Self {
            custom_wordlist: None,
            use_creds: true,
            mutate: false,
        }
    }
}

/// What a temporary file holds.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ArtifactKind {
    Wordlist,
    HashFile,
}

/// A temporary file created during a run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TempArtifact {
    pub path: PathBuf,
    pub kind: ArtifactKind,
}

/// The temporary files of a run, deleted together once the run is over.
#[derive(Debug, Default)]
pub struct ArtifactRegistry {
    artifacts: Vec<TempArtifact>,
}

impl ArtifactRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an artifact for deletion.
    pub fn register(&mut self, artifact: TempArtifact) {
        self.artifacts.push(artifact);
    }

    /// Returns the registered artifacts.
    pub fn artifacts(&self) -> &[TempArtifact] {
        &self.artifacts
    }

    /// Deletes every artifact, returning the ones that couldn't be deleted.
    pub fn cleanup(self) -> Vec<(TempArtifact, io::Error)> {
        self.artifacts
            .into_iter()
            .filter_map(|artifact| {
                fs::remove_file(&artifact.path)
                    .err()
                    .map(|e| (artifact, e))
            })
            .collect()
    }
}

/// Writes the lines to a new file of the directory that is kept on the disk.
/// The file is closed when this returns, so other processes can read it.
pub fn write_temp_file<I, L>(
    dir: &Path,
    prefix: &str,
    kind: ArtifactKind,
    lines: I,
) -> AixcrackResult<TempArtifact>
where
    I: IntoIterator<Item = L>,
    L: AsRef<str>,
{
    let mut file = Builder::new()
        .prefix(prefix)
        .suffix(".txt")
        .tempfile_in(dir)?;

    {
        let mut writer = BufWriter::new(file.as_file_mut());
        for line in lines {
            writeln!(writer, "{}", line.as_ref())?;
        }
        writer.flush()?;
    }

    let (file, path) = file.keep().map_err(|e| e.error)?;
    drop(file);

    Ok(TempArtifact { path, kind })
}

/// Returns the word and all its variations obtained by applying the substitutions.
pub fn mutate(word: &str) -> Vec<String> {
    MUTATIONS
        .iter()
        .filter(|(from, _)| word.contains(*from))
        .powerset()
        .map(|substitutions| {
            substitutions
                .iter()
                .fold(word.to_owned(), |word, (from, to)| {
                    word.replace(*from, to.encode_utf8(&mut [0; 4]))
                })
        })
        .unique()
        .collect()
}

/// Gathers the candidate passwords, without duplicates and no longer than `max_length` characters.
pub fn build_words<S: CredentialStore + ?Sized>(
    store: &S,
    workspace: &str,
    options: &WordlistOptions,
    max_length: u8,
) -> AixcrackResult<Vec<String>> {
    let mut words = Vec::new();

    if let Some(path) = &options.custom_wordlist {
        let contents = fs::read(path)?;
        words.extend(
            String::from_utf8_lossy(&contents)
                .lines()
                .map(str::to_owned),
        );
    }

    if options.use_creds {
        for credential in store.credentials(workspace)? {
            words.extend(credential.username);
            words.extend(credential.password);
        }
    }

    let words = words
        .iter()
        .map(|word| word.trim())
        .filter(|word| !word.is_empty());

    let words = if options.mutate {
        words.flat_map(mutate).collect_vec()
    } else {
        words.map(str::to_owned).collect_vec()
    };

    Ok(words
        .into_iter()
        .unique()
        .filter(|word| word.chars().count() <= max_length as usize)
        .collect())
}

/// Generates the wordlist of a run in the given directory.
///
/// The store is required to gather the words, this fails with
/// `AixcrackError::NoDatabaseConnection` if it can't be reached.
pub fn provision_wordlist<S: CredentialStore + ?Sized>(
    store: &S,
    workspace: &str,
    options: &WordlistOptions,
    max_length: u8,
    dir: &Path,
) -> AixcrackResult<TempArtifact> {
    if !store.is_active() {
        return Err(AixcrackError::NoDatabaseConnection);
    }

    let words = build_words(store, workspace, options, max_length)?;
    let artifact = write_temp_file(dir, "aixcrack_wordlist_", ArtifactKind::Wordlist, &words)?;

    info!(
        "Wordlist file written out to {} ({} words)",
        artifact.path.display(),
        words.len()
    );

    Ok(artifact)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::tempdir;

    use super::{
        build_words, mutate, provision_wordlist, write_temp_file, ArtifactKind,
        ArtifactRegistry, WordlistOptions,
    };
    use crate::{
        error::AixcrackError,
        hash::HashType,
        store::{CredentialStore, MemoryStore},
        DES_MAX_PASSWORD_LENGTH,
    };

    fn store() -> MemoryStore {
        let mut store = MemoryStore::new();
        let id = store.add("default", Some("root"), HashType::Descrypt, "7Qd7Jv/hrHcd.");
        store.add("default", Some("operator"), HashType::Descrypt, "abJnggxhB/yWI");
        store.add("default", Some("verylongusername"), HashType::Descrypt, "xxJnggxhB/yWI");
        store.add("other", Some("guest"), HashType::Descrypt, "yyJnggxhB/yWI");
        store.insert_cracked(None, "toor", id).unwrap();
        store
    }

    #[test]
    fn test_mutate() {
        let mut words = mutate("pass");
        words.sort();

        assert_eq!(
            vec!["p@$$", "p@55", "p@ss", "pa$$", "pa55", "pass"],
            words
        );
    }

    #[test]
    fn test_mutate_without_substitutions() {
        assert_eq!(vec!["xyz"], mutate("xyz"));
    }

    #[test]
    fn test_build_words_from_creds() {
        let words = build_words(
            &store(),
            "default",
            &WordlistOptions::default(),
            DES_MAX_PASSWORD_LENGTH,
        )
        .unwrap();

        // too long and other-workspace words are excluded
        assert_eq!(vec!["root", "toor", "operator"], words);
    }

    #[test]
    fn test_build_words_custom_and_dedup() {
        let dir = tempdir().unwrap();
        let custom = dir.path().join("custom.txt");
        fs::write(&custom, "letmein\n\n  root \nletmein\r\nabcdefghi\n").unwrap();

        let options = WordlistOptions {
            custom_wordlist: Some(custom),
            use_creds: true,
            mutate: false,
        };
        let words = build_words(&store(), "default", &options, DES_MAX_PASSWORD_LENGTH).unwrap();

        assert_eq!(vec!["letmein", "root", "toor", "operator"], words);
    }

    #[test]
    fn test_build_words_mutated() {
        let options = WordlistOptions {
            custom_wordlist: None,
            use_creds: true,
            mutate: true,
        };
        let words = build_words(&store(), "default", &options, DES_MAX_PASSWORD_LENGTH).unwrap();

        assert!(words.contains(&"r00t".to_owned()));
        assert!(words.contains(&"700r".to_owned()));
        assert!(words.contains(&"0p3r@70r".to_owned()));
    }

    #[test]
    fn test_provision_requires_store() {
        let dir = tempdir().unwrap();
        let mut store = store();
        store.set_active(false);

        let result = provision_wordlist(
            &store,
            "default",
            &WordlistOptions::default(),
            DES_MAX_PASSWORD_LENGTH,
            dir.path(),
        );

        assert!(matches!(result, Err(AixcrackError::NoDatabaseConnection)));
        assert_eq!(0, fs::read_dir(dir.path()).unwrap().count());
    }

    #[test]
    fn test_provision_writes_file() {
        let dir = tempdir().unwrap();

        let artifact = provision_wordlist(
            &store(),
            "default",
            &WordlistOptions::default(),
            DES_MAX_PASSWORD_LENGTH,
            dir.path(),
        )
        .unwrap();

        assert_eq!(ArtifactKind::Wordlist, artifact.kind);
        assert!(artifact.path.starts_with(dir.path()));
        assert_eq!(
            "root\ntoor\noperator\n",
            fs::read_to_string(&artifact.path).unwrap()
        );
    }

    #[test]
    fn test_cleanup_is_best_effort() {
        let dir = tempdir().unwrap();
        let kept = write_temp_file(dir.path(), "a", ArtifactKind::HashFile, ["x"]).unwrap();
        let removed = write_temp_file(dir.path(), "b", ArtifactKind::HashFile, ["y"]).unwrap();
        fs::remove_file(&removed.path).unwrap();

        let mut registry = ArtifactRegistry::new();
        registry.register(kept.clone());
        registry.register(removed.clone());

        let failures = registry.cleanup();

        assert!(!kept.path.exists());
        assert_eq!(1, failures.len());
        assert_eq!(removed, failures[0].0);
    }
}
