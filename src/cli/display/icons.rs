//! Status icons for CLI output

use crate::domain::doctor::CheckStatus;

/// Status icons for different states
pub struct StatusIcon;

impl StatusIcon {
    /// Success icon (check passed)
    pub const SUCCESS: &'static str = "✓";

    /// Warning icon (check passed with remarks)
    pub const WARNING: &'static str = "⚠";

    /// Error icon (check failed)
    pub const ERROR: &'static str = "✗";

    /// Get icon for a doctor check status
    pub fn for_check(status: CheckStatus) -> &'static str {
        match status {
            CheckStatus::Ok => Self::SUCCESS,
            CheckStatus::Warning => Self::WARNING,
            CheckStatus::Failed => Self::ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_check() {
        assert_eq!(StatusIcon::for_check(CheckStatus::Ok), StatusIcon::SUCCESS);
        assert_eq!(StatusIcon::for_check(CheckStatus::Warning), StatusIcon::WARNING);
        assert_eq!(StatusIcon::for_check(CheckStatus::Failed), StatusIcon::ERROR);
    }
}
