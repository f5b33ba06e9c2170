//! Color theme for CLI output

use crate::domain::doctor::CheckStatus;
use comfy_table::Color as TableColor;

/// Color theme for terminal output
#[derive(Debug, Clone)]
pub struct ColorTheme {
    pub success: TableColor,
    pub warning: TableColor,
    pub error: TableColor,
    pub info: TableColor,
    pub muted: TableColor,
}

impl Default for ColorTheme {
    fn default() -> Self {
        Self {
            success: TableColor::Green,
            warning: TableColor::Yellow,
            error: TableColor::Red,
            info: TableColor::Cyan,
            muted: TableColor::DarkGrey,
        }
    }
}

impl ColorTheme {
    /// Get color for a doctor check status
    pub fn get_check_color(&self, status: CheckStatus) -> TableColor {
        match status {
            CheckStatus::Ok => self.success,
            CheckStatus::Warning => self.warning,
            CheckStatus::Failed => self.error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_theme() {
        let theme = ColorTheme::default();
        assert_eq!(theme.success, TableColor::Green);
        assert_eq!(theme.warning, TableColor::Yellow);
        assert_eq!(theme.error, TableColor::Red);
    }

    #[test]
    fn test_get_check_color() {
        let theme = ColorTheme::default();
        assert_eq!(theme.get_check_color(CheckStatus::Ok), TableColor::Green);
        assert_eq!(theme.get_check_color(CheckStatus::Warning), TableColor::Yellow);
        assert_eq!(theme.get_check_color(CheckStatus::Failed), TableColor::Red);
    }
}
