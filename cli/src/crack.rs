use std::path::Path;

use anyhow::{Context, Result};
use crossterm::style::Stylize;
use human_repr::HumanDuration;
use tracing::enabled;

use aixcrack_core::{
    CrackConfig, CrackConfigBuilder, EngineSettings, Event, ExternalEngine, FileStore, HashType,
    Orchestrator, WordlistOptions,
};

use crate::{table::ResultTable, Crack};

/// Maps the arguments onto the settings of the engine.
fn engine_settings(args: &Crack) -> EngineSettings {
    let kind = args.action.into();

    EngineSettings {
        binary: args.binary.clone(),
        config: args.config.clone(),
        pot: args.pot.clone(),
        fork: args.fork,
        max_runtime: args.max_runtime,
        optimize: args.optimize,
        ..EngineSettings::new(kind)
    }
}

/// Maps the arguments onto the configuration of the run.
fn crack_config(workspace: &str, args: &Crack) -> CrackConfig {
    let hash_types = args
        .hash_types
        .iter()
        .map(|&hash_type| HashType::from(hash_type))
        .collect::<Vec<_>>();

    let mut builder = CrackConfigBuilder::new()
        .workspace(workspace)
        .hash_types(&hash_types)
        .incremental(args.incremental)
        .wordlist(args.wordlist)
        .korelogic(args.korelogic)
        .show_command(args.show_command)
        .delete_temp_files(!args.keep_temp_files)
        .wordlist_options(WordlistOptions {
            custom_wordlist: args.custom_wordlist.clone(),
            use_creds: args.use_creds,
            mutate: args.mutate,
        });

    if let Some(temp_dir) = &args.temp_dir {
        builder = builder.temp_dir(temp_dir);
    }

    builder.build()
}

pub fn crack(db: &Path, workspace: &str, args: Crack) -> Result<()> {
    let mut store = FileStore::open(db)
        .with_context(|| format!("Unable to open the credential store {}", db.display()))?;

    let engine = ExternalEngine::new(engine_settings(&args))
        .context("Unable to set up the cracking engine")?;
    let config = crack_config(workspace, &args);

    let verbose = enabled!(tracing::Level::DEBUG);
    let mut table = ResultTable::new();

    let summary = Orchestrator::new(&mut store, &engine, &config)
        .run(|event| match event {
            Event::Command(command) => println!("   Cracking Command: {command}"),

            // already logged
            Event::EngineOutput(_) => (),

            Event::PhaseFinished {
                hash_type,
                phase,
                elapsed,
                results,
                remaining,
            } => {
                table.extend(results);
                println!(
                    "{}",
                    format!(
                        "{hash_type} {phase} finished in {}, {remaining} hash(es) left",
                        elapsed.as_secs_f64().human_duration()
                    )
                    .dark_grey()
                );
                if verbose && !table.is_empty() {
                    println!("{table}");
                }
            }

            Event::JobFinished { results, .. } => {
                table.extend(results);
                println!("{table}");
            }
        })
        .context("The cracking run failed")?;

    if summary.jobs == 0 {
        println!("{}", "Nothing to crack".green());
    } else if summary.results.is_empty() {
        println!("{}", "No password cracked".yellow());
    } else {
        println!(
            "{}",
            format!("{} password(s) cracked", summary.results.len()).green()
        );
    }

    for artifact in &summary.kept_artifacts {
        println!("Temporary file left at {}", artifact.path.display());
    }

    Ok(())
}
