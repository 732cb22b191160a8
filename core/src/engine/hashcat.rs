//! Command lines of hashcat.

use std::path::Path;

use super::{AttackMode, EngineKind, EngineSettings, Invocation};
use crate::{
    error::{AixcrackError, AixcrackResult},
    hash::HashType,
};

/// Brute force attack mode.
const ATTACK_BRUTE_FORCE: u8 = 3;

/// Straight dictionary attack mode.
const ATTACK_DICTIONARY: u8 = 0;

/// Mask placeholder matching every printable ASCII character.
const ALL_PRINTABLE: &str = "?a";

/// Returns the arguments to run an attack.
pub fn crack_args(
    settings: &EngineSettings,
    invocation: &Invocation,
) -> AixcrackResult<Vec<String>> {
    let mut args = vec![
        format!("--session={}", settings.session),
        "--logfile-disable".to_owned(),
        "--quiet".to_owned(),
        // the first field of every hash line is the credential id
        "--username".to_owned(),
        format!("--potfile-path={}", settings.pot.display()),
        format!("--hash-type={}", invocation.hash_type.hashcat_mode()),
    ];

    if settings.optimize {
        args.push("--optimized-kernel-enable".to_owned());
    }

    if let Some(max_runtime) = settings.max_runtime {
        args.push(format!("--runtime={max_runtime}"));
    }

    match invocation.mode {
        AttackMode::Incremental => {
            let max_length = invocation.max_length;

            args.push(format!("--attack-mode={ATTACK_BRUTE_FORCE}"));
            args.push("--increment".to_owned());
            args.push("--increment-min=1".to_owned());
            args.push(format!("--increment-max={max_length}"));
            args.push(invocation.hash_path.display().to_string());
            args.push(ALL_PRINTABLE.repeat(max_length as usize));
        }

        AttackMode::Wordlist => {
            args.push(format!("--attack-mode={ATTACK_DICTIONARY}"));
            args.push(invocation.hash_path.display().to_string());
            if let Some(wordlist) = &invocation.wordlist {
                args.push(wordlist.display().to_string());
            }
        }

        mode @ (AttackMode::Single | AttackMode::Normal) => {
            return Err(AixcrackError::UnsupportedMode {
                engine: EngineKind::Hashcat,
                mode,
            })
        }
    }

    Ok(args)
}

/// Returns the arguments to print the cracked hashes of a hash file.
pub fn show_args(
    settings: &EngineSettings,
    hash_path: &Path,
    hash_type: HashType,
) -> Vec<String> {
    vec![
        "--show".to_owned(),
        "--username".to_owned(),
        format!("--potfile-path={}", settings.pot.display()),
        format!("--hash-type={}", hash_type.hashcat_mode()),
        hash_path.display().to_string(),
    ]
}
