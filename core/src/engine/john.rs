//! Command lines of John the Ripper.

use std::path::Path;

use super::{AttackMode, EngineSettings, Invocation};
use crate::hash::HashType;

/// The John rule set used in single mode.
const SINGLE_RULES: &str = "single";

/// Returns the arguments shared by the attack and the potfile lookup.
fn common_args(settings: &EngineSettings, hash_type: HashType) -> Vec<String> {
    let mut args = Vec::new();

    if let Some(config) = &settings.config {
        args.push(format!("--config={}", config.display()));
    }

    args.push(format!("--pot={}", settings.pot.display()));
    args.push(format!("--format={}", hash_type.john_format()));

    args
}

/// Returns the arguments to run an attack.
pub fn crack_args(settings: &EngineSettings, invocation: &Invocation) -> Vec<String> {
    let mut args = vec![format!("--session={}", settings.session), "--nolog".to_owned()];
    args.extend(common_args(settings, invocation.hash_type));

    if let Some(fork) = settings.fork.filter(|fork| *fork > 1) {
        args.push(format!("--fork={fork}"));
    }

    match invocation.mode {
        AttackMode::Single => {
            if let Some(wordlist) = &invocation.wordlist {
                args.push(format!("--wordlist={}", wordlist.display()));
            }
            args.push(format!("--rules={SINGLE_RULES}"));
        }

        AttackMode::Normal => (),

        AttackMode::Incremental => {
            args.push("--incremental".to_owned());
            args.push(format!("--max-length={}", invocation.max_length));
        }

        AttackMode::Wordlist => {
            if let Some(wordlist) = &invocation.wordlist {
                args.push(format!("--wordlist={}", wordlist.display()));
            }
            if let Some(rules) = &invocation.rules {
                args.push(format!("--rules={rules}"));
            }
        }
    }

    if let Some(max_runtime) = settings.max_runtime {
        args.push(format!("--max-run-time={max_runtime}"));
    }

    args.push(invocation.hash_path.display().to_string());

    args
}

/// Returns the arguments to print the cracked hashes of a hash file.
pub fn show_args(
    settings: &EngineSettings,
    hash_path: &Path,
    hash_type: HashType,
) -> Vec<String> {
    let mut args = vec!["--show".to_owned()];
    args.extend(common_args(settings, hash_type));
    args.push(hash_path.display().to_string());

    args
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};

    use super::{crack_args, show_args};
    use crate::{
        engine::{AttackMode, EngineKind, EngineSettings, Invocation, DEFAULT_INCREMENTAL_LENGTH},
        hash::HashType,
        KORELOGIC_RULES,
    };

    fn settings() -> EngineSettings {
        let mut settings = EngineSettings::new(EngineKind::John);
        settings.session = "s".to_owned();
        settings.pot = PathBuf::from("/tmp/john.pot");
        settings
    }

    fn invocation(mode: AttackMode) -> Invocation {
        Invocation::new(mode, Path::new("/tmp/hashes"), HashType::Descrypt)
    }

    #[test]
    fn test_single() {
        let args = crack_args(
            &settings(),
            &invocation(AttackMode::Single).wordlist(Path::new("/tmp/words")),
        );

        assert_eq!(
            vec![
                "--session=s",
                "--nolog",
                "--pot=/tmp/john.pot",
                "--format=descrypt",
                "--wordlist=/tmp/words",
                "--rules=single",
                "/tmp/hashes",
            ],
            args
        );
    }

    #[test]
    fn test_normal_with_fork_and_config() {
        let mut settings = settings();
        settings.fork = Some(4);
        settings.config = Some(PathBuf::from("/etc/john.conf"));
        settings.max_runtime = Some(60);

        let args = crack_args(&settings, &invocation(AttackMode::Normal));

        assert_eq!(
            vec![
                "--session=s",
                "--nolog",
                "--config=/etc/john.conf",
                "--pot=/tmp/john.pot",
                "--format=descrypt",
                "--fork=4",
                "--max-run-time=60",
                "/tmp/hashes",
            ],
            args
        );
    }

    #[test]
    fn test_fork_of_one_is_omitted() {
        let mut settings = settings();
        settings.fork = Some(1);

        let args = crack_args(&settings, &invocation(AttackMode::Normal));
        assert!(!args.iter().any(|arg| arg.starts_with("--fork")));
    }

    #[test]
    fn test_incremental() {
        let args = crack_args(&settings(), &invocation(AttackMode::Incremental));

        assert!(args.contains(&"--incremental".to_owned()));
        assert!(args.contains(&"--max-length=8".to_owned()));
    }

    #[test]
    fn test_incremental_without_hash_bound() {
        let invocation = Invocation::new(
            AttackMode::Incremental,
            Path::new("/tmp/hashes"),
            HashType::Ssha512,
        );
        let args = crack_args(&settings(), &invocation);

        assert!(args.contains(&"--format=aix-ssha512".to_owned()));
        assert!(args.contains(&format!("--max-length={DEFAULT_INCREMENTAL_LENGTH}")));
    }

    #[test]
    fn test_wordlist_with_rules() {
        let args = crack_args(
            &settings(),
            &invocation(AttackMode::Wordlist)
                .wordlist(Path::new("/tmp/words"))
                .rules(KORELOGIC_RULES),
        );

        assert!(args.contains(&"--wordlist=/tmp/words".to_owned()));
        assert!(args.contains(&"--rules=KoreLogicRules".to_owned()));
        assert_eq!(Some(&"/tmp/hashes".to_owned()), args.last());
    }

    #[test]
    fn test_show() {
        let args = show_args(&settings(), Path::new("/tmp/hashes"), HashType::Descrypt);

        assert_eq!(
            vec![
                "--show",
                "--pot=/tmp/john.pot",
                "--format=descrypt",
                "/tmp/hashes"
            ],
            args
        );
    }
}
