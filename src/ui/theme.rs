//! Visual theme and styling.

use console::Style;

use crate::orchestrator::Availability;

/// Colors used across the CLI.
#[derive(Debug, Clone)]
pub struct JanitorTheme {
    /// Success messages and available managers (green).
    pub success: Style,
    /// Warnings and path-missing managers (orange).
    pub warning: Style,
    /// Errors (red bold).
    pub error: Style,
    /// Informational text (cyan).
    pub info: Style,
    /// Secondary text.
    pub dim: Style,
    /// Important text (bold).
    pub highlight: Style,
    /// Headers (cyan bold).
    pub header: Style,
    /// Box-drawing borders (dim).
    pub border: Style,
    /// Contextual hints (cyan dim).
    pub hint: Style,
    /// Key labels in key-value displays (bold).
    pub key: Style,
    /// Paths and commands (dim italic).
    pub path: Style,
}

impl Default for JanitorTheme {
    fn default() -> Self {
        Self::new()
    }
}

impl JanitorTheme {
    /// Create the colored theme.
    pub fn new() -> Self {
        Self {
            success: Style::new().green(),
            warning: Style::new().color256(208),
            error: Style::new().red().bold(),
            info: Style::new().cyan(),
            dim: Style::new().dim(),
            highlight: Style::new().bold(),
            header: Style::new().bold().cyan(),
            border: Style::new().dim(),
            hint: Style::new().cyan().dim(),
            key: Style::new().bold(),
            path: Style::new().dim().italic(),
        }
    }

    /// Create a theme without colors (for non-TTY or --no-color).
    pub fn plain() -> Self {
        Self {
            success: Style::new(),
            warning: Style::new(),
            error: Style::new(),
            info: Style::new(),
            dim: Style::new(),
            highlight: Style::new(),
            header: Style::new(),
            border: Style::new(),
            hint: Style::new(),
            key: Style::new(),
            path: Style::new(),
        }
    }

    pub fn format_success(&self, msg: &str) -> String {
        format!("{}", self.success.apply_to(format!("✓ {}", msg)))
    }

    pub fn format_warning(&self, msg: &str) -> String {
        format!("{}", self.warning.apply_to(format!("⚠ {}", msg)))
    }

    pub fn format_error(&self, msg: &str) -> String {
        format!("{}", self.error.apply_to(format!("✗ {}", msg)))
    }

    /// Format a header banner.
    pub fn format_header(&self, title: &str) -> String {
        format!(
            "{} {}",
            self.header.apply_to("🧹"),
            self.highlight.apply_to(title)
        )
    }

    /// Icon and label for a manager's availability.
    pub fn format_availability(&self, availability: Availability) -> String {
        let (style, icon) = match availability {
            Availability::Available => (&self.success, "●"),
            Availability::PathMissing => (&self.warning, "◐"),
            Availability::NotInstalled => (&self.dim, "○"),
        };
        format!("{}", style.apply_to(format!("{} {}", icon, availability)))
    }
}

/// Check if colors should be enabled.
pub fn should_use_colors() -> bool {
    // https://no-color.org/
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }

    console::Term::stdout().is_term()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn theme_formats_messages() {
        let theme = JanitorTheme::plain();
        assert_eq!(theme.format_success("done"), "✓ done");
        assert_eq!(theme.format_warning("careful"), "⚠ careful");
        assert_eq!(theme.format_error("broken"), "✗ broken");
    }

    #[test]
    fn theme_formats_header() {
        let msg = JanitorTheme::plain().format_header("Package managers");
        assert!(msg.contains("Package managers"));
    }

    #[test]
    fn availability_labels() {
        let theme = JanitorTheme::plain();
        assert_eq!(theme.format_availability(Availability::Available), "● available");
        assert_eq!(theme.format_availability(Availability::PathMissing), "◐ path_missing");
        assert_eq!(theme.format_availability(Availability::NotInstalled), "○ not_installed");
    }

    #[test]
    fn colored_theme_formats_without_panic() {
        let theme = JanitorTheme::new();
        let _ = theme.format_success("test");
        let _ = theme.path.apply_to("/opt/homebrew/bin/brew");
    }
}
