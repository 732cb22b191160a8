use std::fmt::Display;

use comfy_table::{presets::UTF8_BORDERS_ONLY, Cell, Color, Table};

use aixcrack_core::{CrackedResult, CredentialHash};

/// The cracked hashes of a run. A result is only listed once however many times it is added.
#[derive(Default)]
pub struct ResultTable {
    rows: Vec<CrackedResult>,
}

impl ResultTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the results not listed yet.
    pub fn extend(&mut self, results: &[CrackedResult]) {
        for result in results {
            if !self.rows.contains(result) {
                self.rows.push(result.clone());
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl Display for ResultTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut display_table = Table::new();
        display_table.load_preset(UTF8_BORDERS_ONLY);
        display_table.set_header(vec![
            "DB ID",
            "Hash Type",
            "Username",
            "Cracked Password",
            "Method",
        ]);

        for result in &self.rows {
            display_table.add_row(vec![
                Cell::new(result.id),
                Cell::new(result.hash_type),
                Cell::new(result.username.as_deref().unwrap_or_default()),
                Cell::new(&result.password).fg(Color::Green),
                Cell::new(result.method),
            ]);
        }

        write!(f, "{display_table}")
    }
}

/// Renders the credentials of a workspace.
pub fn credentials_table(credentials: &[CredentialHash]) -> Table {
    let mut display_table = Table::new();
    display_table.load_preset(UTF8_BORDERS_ONLY);
    display_table.set_header(vec!["DB ID", "Hash Type", "Username", "Hash", "Password"]);

    for credential in credentials {
        let password = credential
            .password
            .as_ref()
            .map(|password| Cell::new(password).fg(Color::Green))
            .unwrap_or_else(|| Cell::new("Not cracked").fg(Color::Grey));

        display_table.add_row(vec![
            Cell::new(credential.id),
            Cell::new(credential.hash_type),
            Cell::new(credential.username.as_deref().unwrap_or_default()),
            Cell::new(&credential.hash),
            password,
        ]);
    }

    display_table
}

#[cfg(test)]
mod tests {
    use aixcrack_core::{CrackMethod, CrackedResult, CredentialId, HashType};

    use super::ResultTable;

    fn result(id: u64, password: &str) -> CrackedResult {
        CrackedResult {
            id: CredentialId(id),
            hash_type: HashType::Descrypt,
            username: Some("root".to_owned()),
            password: password.to_owned(),
            method: CrackMethod::Single,
        }
    }

    #[test]
    fn test_rows_are_listed_once() {
        let mut table = ResultTable::new();

        table.extend(&[result(1, "abc123")]);
        table.extend(&[result(1, "abc123"), result(2, "toor")]);

        let rendered = table.to_string();
        assert!(rendered.contains("Cracked Password"));
        assert_eq!(1, rendered.matches("abc123").count());
        assert_eq!(1, rendered.matches("toor").count());
        assert_eq!(2, rendered.matches("Single").count());
    }
}
