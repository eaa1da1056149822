//! Output rendering for command results
//!
//! Results print either as human-readable text or, with `--json`, as one
//! pretty-printed JSON document on stdout.

use anyhow::{Context, Result};
use cata_store::{AppliedMigration, MigrationName, ModDto};
use serde::Serialize;

/// Renderer that switches between text and JSON output
pub struct Renderer {
    json: bool,
}

/// One line of the `migrations` listing
#[derive(Debug, Serialize)]
pub struct MigrationStatus {
    pub filename: String,
    pub applied_at: Option<jiff::Timestamp>,
}

impl MigrationStatus {
    /// Pairs every discovered migration with its log entry, if any.
    pub fn collect(discovered: &[MigrationName], applied: &[AppliedMigration]) -> Vec<Self> {
        discovered
            .iter()
            .map(|name| Self {
                filename: name.filename().to_string(),
                applied_at: applied
                    .iter()
                    .find(|a| a.filename == name.filename())
                    .map(|a| a.applied_at),
            })
            .collect()
    }
}

impl Renderer {
    pub fn new(json: bool) -> Self {
        Self { json }
    }

    /// Prints `value` as JSON, or `text` otherwise.
    fn emit<T: Serialize + ?Sized>(&self, value: &T, text: &str) -> Result<()> {
        if self.json {
            let rendered =
                serde_json::to_string_pretty(value).context("Failed to serialize output")?;
            println!("{rendered}");
        } else {
            print!("{text}");
        }
        Ok(())
    }

    pub fn applied_migrations(&self, applied: &[String]) -> Result<()> {
        self.emit(applied, &applied_text(applied))
    }

    pub fn migrations(&self, statuses: &[MigrationStatus]) -> Result<()> {
        self.emit(statuses, &migrations_text(statuses))
    }

    pub fn mod_registered(&self, dto: &ModDto) -> Result<()> {
        let text = format!("Registered {}", mod_text(dto));
        self.emit(dto, &text)
    }

    pub fn mods(&self, mods: &[ModDto]) -> Result<()> {
        let text = if mods.is_empty() {
            "No mods registered.\n".to_string()
        } else {
            mods.iter().map(mod_text).collect()
        };
        self.emit(mods, &text)
    }

    /// Confirms a command with no other output.
    pub fn done(&self, message: &str) -> Result<()> {
        self.emit(&serde_json::json!({ "status": "ok", "message": message }), &format!("{message}\n"))
    }
}

fn applied_text(applied: &[String]) -> String {
    if applied.is_empty() {
        return "Database is up to date.\n".to_string();
    }

    let mut out = format!("Applied {} migration(s):\n", applied.len());
    for filename in applied {
        out.push_str(&format!("  {filename}\n"));
    }
    out
}

fn migrations_text(statuses: &[MigrationStatus]) -> String {
    if statuses.is_empty() {
        return "No migrations found.\n".to_string();
    }

    statuses
        .iter()
        .map(|status| match status.applied_at {
            Some(at) => format!("[x] {} (applied {at})\n", status.filename),
            None => format!("[ ] {}\n", status.filename),
        })
        .collect()
}

fn mod_text(dto: &ModDto) -> String {
    let id = dto.id.map_or_else(|| "?".to_string(), |id| id.to_string());
    let mut out = format!("#{id} {} ({})\n", dto.name, dto.modinfo);
    for modfile in &dto.modfiles {
        out.push_str(&format!("    {} [{}]\n", modfile.path, modfile.hash));
    }
    out
}

#[cfg(test)]
mod tests {
    use cata_store::ModfileDto;

    use super::*;

    #[test]
    fn test_mod_text_lists_files() {
        let mut dto = ModDto::new("Arcana", "modinfo.json")
            .with_modfiles(vec![ModfileDto::new("items.json", "1a")]);
        dto.id = Some(4);

        assert_eq!(mod_text(&dto), "#4 Arcana (modinfo.json)\n    items.json [1a]\n");
    }

    #[test]
    fn test_applied_text() {
        assert_eq!(applied_text(&[]), "Database is up to date.\n");
        assert_eq!(
            applied_text(&["20240730_create_mod.sql".to_string()]),
            "Applied 1 migration(s):\n  20240730_create_mod.sql\n"
        );
    }

    #[test]
    fn test_migrations_text_marks_applied() {
        let statuses = vec![
            MigrationStatus {
                filename: "20240730_create_mod.sql".to_string(),
                applied_at: Some("2024-07-30T00:00:00Z".parse().expect("Valid timestamp")),
            },
            MigrationStatus {
                filename: "20240731_create_modfile.sql".to_string(),
                applied_at: None,
            },
        ];

        assert_eq!(
            migrations_text(&statuses),
            "[x] 20240730_create_mod.sql (applied 2024-07-30T00:00:00Z)\n[ ] 20240731_create_modfile.sql\n"
        );
        assert_eq!(migrations_text(&[]), "No migrations found.\n");
    }

    #[test]
    fn test_migration_status_pairs_log_entries() {
        let discovered = vec![
            MigrationName::parse("20240730_create_mod.sql").expect("Should parse"),
            MigrationName::parse("20240731_create_modfile.sql").expect("Should parse"),
        ];
        let applied_at: jiff::Timestamp = "2024-07-30T00:00:00Z".parse().expect("Valid timestamp");
        let applied = vec![AppliedMigration {
            filename: "20240730_create_mod.sql".to_string(),
            applied_at,
        }];

        let statuses = MigrationStatus::collect(&discovered, &applied);
        assert_eq!(statuses[0].applied_at, Some(applied_at));
        assert_eq!(statuses[1].applied_at, None);
    }
}
