mod crack;
mod creds;
mod import;
mod table;

use std::path::PathBuf;

use anyhow::Result;
use clap::{value_parser, ArgAction, Args, Parser, Subcommand, ValueEnum};
use tracing::Level;

use aixcrack_core::{EngineKind, HashType, DEFAULT_POT, DEFAULT_WORKSPACE};

use crack::crack;
use creds::creds;
use import::import;

/// The default path of the credential store.
const DEFAULT_DB: &str = "aixcrack.db";

/// The engines available to crack the hashes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum EngineArg {
    John,
    Hashcat,
}

impl From<EngineArg> for EngineKind {
    fn from(arg: EngineArg) -> Self {
        match arg {
            EngineArg::John => EngineKind::John,
            EngineArg::Hashcat => EngineKind::Hashcat,
        }
    }
}

/// All the hash types supported.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
enum HashTypeArg {
    Descrypt,
    Smd5,
    Ssha1,
    Ssha256,
    Ssha512,
}

impl From<HashTypeArg> for HashType {
    fn from(arg: HashTypeArg) -> Self {
        match arg {
            HashTypeArg::Descrypt => HashType::Descrypt,
            HashTypeArg::Smd5 => HashType::Smd5,
            HashTypeArg::Ssha1 => HashType::Ssha1,
            HashTypeArg::Ssha256 => HashType::Ssha256,
            HashTypeArg::Ssha512 => HashType::Ssha512,
        }
    }
}

/// Password cracker for the hashes acquired from AIX systems, using John the Ripper or hashcat.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// The file storing the credentials.
    #[arg(long, global = true, default_value = DEFAULT_DB)]
    db: PathBuf,

    /// The workspace of the credentials.
    #[arg(short, long, global = true, default_value = DEFAULT_WORKSPACE)]
    workspace: String,

    /// Show more details. Can be repeated.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    commands: Commands,
}

#[derive(Subcommand)]
enum Commands {
    Crack(Crack),
    Import(Import),
    Creds(Creds),
}

/// Crack the uncracked hashes of the workspace.
#[derive(Args)]
pub struct Crack {
    /// The engine used to crack the hashes.
    #[arg(short, long, value_enum, default_value_t = EngineArg::John)]
    action: EngineArg,

    /// The types of the hashes to crack.
    #[arg(long = "hash-type", value_enum, default_values_t = [HashTypeArg::Descrypt])]
    hash_types: Vec<HashTypeArg>,

    /// The path of the engine binary. Searched for in the PATH if not given.
    #[arg(long)]
    binary: Option<PathBuf>,

    /// The John configuration file holding the rule sets.
    #[arg(long)]
    config: Option<PathBuf>,

    /// The potfile of the engine.
    #[arg(long, default_value = DEFAULT_POT)]
    pot: PathBuf,

    /// The number of processes John should fork.
    #[arg(long, value_parser = value_parser!(u32).range(1..))]
    fork: Option<u32>,

    /// The maximum run time of every phase, in seconds.
    #[arg(long)]
    max_runtime: Option<u64>,

    /// Use the optimized kernels of hashcat. Passwords longer than the kernel limit are missed.
    #[arg(long)]
    optimize: bool,

    /// Run in incremental mode.
    #[arg(long, action = ArgAction::Set, default_value_t = true)]
    incremental: bool,

    /// Run in wordlist mode.
    #[arg(long, action = ArgAction::Set, default_value_t = true)]
    wordlist: bool,

    /// Apply the KoreLogic rules in wordlist mode. John only.
    #[arg(long)]
    korelogic: bool,

    /// Print the command of every phase.
    #[arg(long)]
    show_command: bool,

    /// Keep the wordlist and the hash files once the run is over.
    #[arg(long)]
    keep_temp_files: bool,

    /// The directory the temporary files are written to.
    #[arg(long)]
    temp_dir: Option<PathBuf>,

    /// A wordlist file to include in the generated wordlist.
    #[arg(long)]
    custom_wordlist: Option<PathBuf>,

    /// Include the usernames and the known passwords of the workspace in the wordlist.
    #[arg(long, action = ArgAction::Set, default_value_t = true)]
    use_creds: bool,

    /// Add the leetspeak variations of every word to the wordlist.
    #[arg(long)]
    mutate: bool,
}

/// Import the hashes of an AIX password file.
/// Both /etc/security/passwd stanzas and user:hash lines are understood.
#[derive(Args)]
pub struct Import {
    /// The password file.
    file: PathBuf,
}

/// List the credentials of the workspace.
#[derive(Args)]
pub struct Creds {
    /// Only list the cracked credentials.
    #[arg(long)]
    cracked: bool,
}

/// Sets up the logs on stderr, keeping stdout for the results.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.commands {
        Commands::Crack(args) => crack(&cli.db, &cli.workspace, args)?,
        Commands::Import(args) => import(&cli.db, &cli.workspace, args)?,
        Commands::Creds(args) => creds(&cli.db, &cli.workspace, args)?,
    }

    Ok(())
}
