//! Interactive terminal UI.

use console::Term;
use std::io::Write;

use crate::error::Result;

use super::{
    prompt_user, should_use_colors, JanitorTheme, NonInteractiveUI, OutputMode, ProgressSpinner,
    Prompt, PromptResult, SpinnerHandle, UserInterface,
};

/// Interactive terminal UI implementation.
pub struct TerminalUI {
    term: Term,
    theme: JanitorTheme,
    mode: OutputMode,
}

impl TerminalUI {
    /// Create a terminal UI; colors follow the terminal and `NO_COLOR`.
    pub fn new(mode: OutputMode) -> Self {
        let theme = if should_use_colors() {
            JanitorTheme::new()
        } else {
            JanitorTheme::plain()
        };
        Self::with_theme(mode, theme)
    }

    pub fn with_theme(mode: OutputMode, theme: JanitorTheme) -> Self {
        Self {
            term: Term::stdout(),
            theme,
            mode,
        }
    }

    pub fn theme(&self) -> &JanitorTheme {
        &self.theme
    }
}

impl UserInterface for TerminalUI {
    fn output_mode(&self) -> OutputMode {
        self.mode
    }

    fn message(&mut self, msg: &str) {
        if self.mode.shows_status() {
            writeln!(self.term, "{}", msg).ok();
        }
    }

    fn success(&mut self, msg: &str) {
        if self.mode.shows_status() {
            writeln!(self.term, "{}", self.theme.format_success(msg)).ok();
        }
    }

    fn warning(&mut self, msg: &str) {
        if self.mode.shows_status() {
            writeln!(self.term, "{}", self.theme.format_warning(msg)).ok();
        }
    }

    fn error(&mut self, msg: &str) {
        Term::stderr()
            .write_line(&self.theme.format_error(msg))
            .ok();
    }

    fn prompt(&mut self, prompt: &Prompt) -> Result<PromptResult> {
        prompt_user(prompt, &self.term)
    }

    fn start_spinner(&mut self, message: &str) -> Box<dyn SpinnerHandle> {
        if self.mode.shows_spinners() && self.term.is_term() {
            Box::new(ProgressSpinner::new(message, self.theme.clone()))
        } else {
            Box::new(ProgressSpinner::hidden())
        }
    }

    fn show_header(&mut self, title: &str) {
        if self.mode.shows_spinners() {
            writeln!(self.term, "\n{}\n", self.theme.format_header(title)).ok();
        }
    }

    fn show_hint(&mut self, hint: &str) {
        if self.mode.shows_status() {
            writeln!(self.term, "  {}", self.theme.hint.apply_to(hint)).ok();
        }
    }

    fn is_interactive(&self) -> bool {
        self.term.is_term()
    }
}

/// Pick the UI for this run.
pub fn create_ui(interactive: bool, mode: OutputMode) -> Box<dyn UserInterface> {
    if interactive {
        Box::new(TerminalUI::new(mode))
    } else {
        Box::new(NonInteractiveUI::new(mode))
    }
}

/// Same as [`create_ui`], but with colors forced off.
pub fn create_plain_ui(interactive: bool, mode: OutputMode) -> Box<dyn UserInterface> {
    if interactive {
        Box::new(TerminalUI::with_theme(mode, JanitorTheme::plain()))
    } else {
        Box::new(NonInteractiveUI::new(mode))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_ui_non_interactive() {
        let ui = create_ui(false, OutputMode::Normal);
        assert!(!ui.is_interactive());
        assert_eq!(ui.output_mode(), OutputMode::Normal);
    }

    #[test]
    fn terminal_ui_keeps_mode() {
        let ui = TerminalUI::with_theme(OutputMode::Quiet, JanitorTheme::plain());
        assert_eq!(ui.output_mode(), OutputMode::Quiet);
    }

    #[test]
    fn silent_terminal_ui_writes_nothing() {
        let mut ui = TerminalUI::with_theme(OutputMode::Silent, JanitorTheme::plain());
        ui.message("hidden");
        ui.success("hidden");
        ui.show_header("hidden");
    }
}
