use std::path::Path;

use anyhow::{Context, Result};
use comfy_table::{presets::UTF8_BORDERS_ONLY, Cell, Color, Table};
use crossterm::style::Stylize;
use tracing::debug;

use aixcrack_core::{passwd::read_passwd, FileStore};

use crate::Import;

pub fn import(db: &Path, workspace: &str, args: Import) -> Result<()> {
    let entries = read_passwd(&args.file)
        .with_context(|| format!("Unable to read the password file {}", args.file.display()))?;

    let mut store = FileStore::open(db)
        .with_context(|| format!("Unable to open the credential store {}", db.display()))?;

    let mut display_table = Table::new();
    display_table.load_preset(UTF8_BORDERS_ONLY);
    display_table.set_header(vec!["DB ID", "Username", "Hash Type", "Hash"]);

    let mut imported = 0;
    for entry in entries {
        let Some(hash_type) = entry.hash_type else {
            debug!(username = %entry.username, "skipping an unsupported hash");
            display_table.add_row(vec![
                Cell::new("-").fg(Color::Grey),
                Cell::new(&entry.username),
                Cell::new("Unsupported").fg(Color::Grey),
                Cell::new(&entry.hash).fg(Color::Grey),
            ]);
            continue;
        };

        let id = store.add(workspace, Some(entry.username.as_str()), hash_type, &entry.hash);
        imported += 1;

        display_table.add_row(vec![
            Cell::new(id),
            Cell::new(&entry.username),
            Cell::new(hash_type).fg(Color::Green),
            Cell::new(&entry.hash),
        ]);
    }

    store.save().context("Unable to save the credential store")?;

    println!("{display_table}");
    println!(
        "{}",
        format!("{imported} hash(es) imported into the {workspace} workspace").green()
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::tempdir;

    use aixcrack_core::{CredentialStore, FileStore, HashType};

    use super::import;
    use crate::Import;

    #[test]
    fn test_import_into_store() {
        let dir = tempdir().unwrap();
        let db = dir.path().join("aixcrack.db");
        let file = dir.path().join("passwd");
        fs::write(
            &file,
            "root:\n\tpassword = 7Qd7Jv/hrHcd.\n\ndaemon:\n\tpassword = *\n\nadm:!:4:4::/var/adm:\n",
        )
        .unwrap();

        import(&db, "lab", Import { file: file.clone() }).unwrap();
        // importing twice doesn't duplicate the hashes
        import(&db, "lab", Import { file }).unwrap();

        let store = FileStore::open(&db).unwrap();
        let credentials = store.query("lab", HashType::Descrypt).unwrap();

        assert_eq!(1, credentials.len());
        assert_eq!(Some("root"), credentials[0].username.as_deref());
        assert_eq!("7Qd7Jv/hrHcd.", credentials[0].hash);
        assert!(store.credentials("default").unwrap().is_empty());
    }
}
