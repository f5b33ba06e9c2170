//! Table rendering for CLI output

use super::{ColorTheme, StatusIcon};
use crate::domain::doctor::CheckResult;
use crate::domain::migration::MigrationSummary;
use chrono::{DateTime, Utc};
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Cell, CellAlignment, ContentArrangement, Table};

/// Table renderer for formatted output
pub struct TableRenderer {
    theme: ColorTheme,
}

impl Default for TableRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl TableRenderer {
    /// Create a new table renderer with default theme
    pub fn new() -> Self {
        Self {
            theme: ColorTheme::default(),
        }
    }

    /// Render in-flight migrations as a formatted table
    pub fn render_migrations_list(
        &self,
        namespace: &str,
        migrations: &[MigrationSummary],
        now: DateTime<Utc>,
    ) -> String {
        if migrations.is_empty() {
            return format!("No migrations in progress in namespace {}", namespace);
        }

        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec![
                Cell::new("MIGRATION").set_alignment(CellAlignment::Left),
                Cell::new("APP").set_alignment(CellAlignment::Left),
                Cell::new("SOURCE").set_alignment(CellAlignment::Left),
                Cell::new("TARGET").set_alignment(CellAlignment::Left),
                Cell::new("AGE").set_alignment(CellAlignment::Right),
            ]);

        for migration in migrations {
            table.add_row(vec![
                Cell::new(&migration.name).fg(self.theme.info),
                Cell::new(&migration.app_name),
                Cell::new(migration.source_instance.as_deref().unwrap_or("-")),
                Cell::new(migration.target_instance.as_deref().unwrap_or("-")),
                Cell::new(format_age(migration.created, now))
                    .fg(self.theme.muted)
                    .set_alignment(CellAlignment::Right),
            ]);
        }

        let mut output = String::new();
        output.push_str(&format!(
            "╭─ Migrations in {} {} ─╮\n",
            namespace,
            format!("[{}]", migrations.len()).bright_black()
        ));
        output.push_str(&table.to_string());
        output
    }

    /// Render doctor check results
    pub fn render_doctor_report(&self, results: &[CheckResult]) -> String {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec![
                Cell::new("").set_alignment(CellAlignment::Center),
                Cell::new("CHECK").set_alignment(CellAlignment::Left),
                Cell::new("RESULT").set_alignment(CellAlignment::Left),
            ]);

        for result in results {
            let color = self.theme.get_check_color(result.status);
            table.add_row(vec![
                Cell::new(StatusIcon::for_check(result.status))
                    .fg(color)
                    .set_alignment(CellAlignment::Center),
                Cell::new(&result.name),
                Cell::new(&result.message).fg(color),
            ]);
        }

        let mut output = table.to_string();
        output.push('\n');
        output.push_str(&format!(
            "Legend: {} Ok  {} Warning  {} Failed",
            StatusIcon::SUCCESS.green(),
            StatusIcon::WARNING.yellow(),
            StatusIcon::ERROR.red()
        ));
        output
    }
}

/// Short age in the style of kubectl, e.g. `5m`, `3h`, `12d`.
pub fn format_age(created: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    let Some(created) = created else {
        return "-".to_string();
    };
    let seconds = (now - created).num_seconds().max(0);
    match seconds {
        s if s < 60 => format!("{}s", s),
        s if s < 3600 => format!("{}m", s / 60),
        s if s < 86400 => format!("{}h", s / 3600),
        s => format!("{}d", s / 86400),
    }
}
