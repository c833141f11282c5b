//! Terminal user interface.
//!
//! This module provides:
//! - [`UserInterface`] trait for UI abstraction
//! - [`TerminalUI`] for interactive terminal usage
//! - [`NonInteractiveUI`] for CI/headless environments
//! - [`MockUI`] for tests
//! - Prompts, spinners and tables
//!
//! # Example
//!
//! ```
//! use dev_janitor::ui::{create_ui, OutputMode};
//!
//! let mut ui = create_ui(false, OutputMode::Quiet);
//! ui.show_header("Package managers");
//! ui.success("Discovery complete");
//! ```

pub mod mock;
pub mod non_interactive;
pub mod output;
pub mod prompts;
pub mod spinner;
pub mod table;
pub mod terminal;
pub mod theme;

pub use mock::{MockSpinner, MockUI, SpinnerEvent};
pub use non_interactive::NonInteractiveUI;
pub use output::OutputMode;
pub use prompts::prompt_user;
pub use spinner::ProgressSpinner;
pub use table::Table;
pub use terminal::{create_plain_ui, create_ui, TerminalUI};
pub use theme::{should_use_colors, JanitorTheme};

use crate::error::Result;

/// User-facing output and input.
///
/// Commands only talk to this trait so they can run against [`MockUI`].
pub trait UserInterface {
    /// Current verbosity.
    fn output_mode(&self) -> OutputMode;

    /// Plain message.
    fn message(&mut self, msg: &str);

    fn success(&mut self, msg: &str);

    fn warning(&mut self, msg: &str);

    /// Error message; shown in every mode.
    fn error(&mut self, msg: &str);

    /// Ask the user something.
    fn prompt(&mut self, prompt: &Prompt) -> Result<PromptResult>;

    /// Start a spinner for a long operation.
    fn start_spinner(&mut self, message: &str) -> Box<dyn SpinnerHandle>;

    fn show_header(&mut self, title: &str);

    /// Secondary hint line (e.g. a suggested next command).
    fn show_hint(&mut self, hint: &str);

    /// Whether a human can answer prompts.
    fn is_interactive(&self) -> bool;
}

/// Handle for controlling a spinner.
pub trait SpinnerHandle {
    fn set_message(&mut self, msg: &str);

    fn finish_success(&mut self, msg: &str);

    fn finish_error(&mut self, msg: &str);
}

/// A question for the user.
#[derive(Debug, Clone)]
pub struct Prompt {
    /// Stable key, used for environment overrides and mock responses.
    pub key: String,
    pub question: String,
    pub prompt_type: PromptType,
    /// Answer used when the user just presses enter, or nobody is there.
    pub default: Option<String>,
}

impl Prompt {
    /// Yes/no question.
    pub fn confirm(key: &str, question: &str, default: bool) -> Self {
        Self {
            key: key.to_string(),
            question: question.to_string(),
            prompt_type: PromptType::Confirm,
            default: Some(default.to_string()),
        }
    }

    /// Pick one of `options`.
    pub fn select(key: &str, question: &str, options: Vec<PromptOption>) -> Self {
        Self {
            key: key.to_string(),
            question: question.to_string(),
            prompt_type: PromptType::Select { options },
            default: None,
        }
    }
}

#[derive(Debug, Clone)]
pub enum PromptType {
    Confirm,
    Select { options: Vec<PromptOption> },
}

/// An option in a select prompt.
#[derive(Debug, Clone)]
pub struct PromptOption {
    pub label: String,
    pub value: String,
}

/// Answer to a prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptResult {
    Bool(bool),
    String(String),
}

impl PromptResult {
    pub fn as_string(&self) -> String {
        match self {
            Self::Bool(b) => b.to_string(),
            Self::String(s) => s.clone(),
        }
    }

    /// Interpret as yes/no; strings like `y` or `true` count as yes.
    pub fn as_bool(&self) -> bool {
        match self {
            Self::Bool(b) => *b,
            Self::String(s) => parse_yes(s),
        }
    }
}

/// `true`, `y` and `yes`, in any case.
pub fn parse_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "true" | "y" | "yes")
}
