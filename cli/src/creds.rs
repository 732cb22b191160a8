use std::path::Path;

use anyhow::{Context, Result};
use crossterm::style::Stylize;

use aixcrack_core::{CredentialStore, FileStore};

use crate::{table::credentials_table, Creds};

pub fn creds(db: &Path, workspace: &str, args: Creds) -> Result<()> {
    let store = FileStore::open(db)
        .with_context(|| format!("Unable to open the credential store {}", db.display()))?;

    let credentials = store
        .credentials(workspace)?
        .into_iter()
        .filter(|credential| !args.cracked || credential.is_cracked())
        .collect::<Vec<_>>();

    if credentials.is_empty() {
        println!("{}", "No credentials found".yellow());
        return Ok(());
    }

    println!("{}", credentials_table(&credentials));

    Ok(())
}
