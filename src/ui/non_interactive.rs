//! Non-interactive UI for CI/headless environments.

use std::collections::HashMap;

use crate::error::{JanitorError, Result};

use super::{OutputMode, Prompt, PromptResult, PromptType, SpinnerHandle, UserInterface};

/// Prefix of environment variables that answer prompts, e.g.
/// `DEV_JANITOR_PROMPT_CONFIRM_UNINSTALL=yes`.
pub const PROMPT_ENV_PREFIX: &str = "DEV_JANITOR_PROMPT_";

/// UI implementation for non-interactive mode.
///
/// Prompts are answered from `DEV_JANITOR_PROMPT_<KEY>` variables or the
/// prompt's default. Spinners print their message once in non-CI runs.
pub struct NonInteractiveUI {
    mode: OutputMode,
    env_overrides: HashMap<String, String>,
    is_ci: bool,
}

impl NonInteractiveUI {
    pub fn new(mode: OutputMode) -> Self {
        let env_overrides = std::env::vars_os()
            .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
            .filter(|(k, _)| k.starts_with(PROMPT_ENV_PREFIX))
            .collect();
        Self {
            mode,
            env_overrides,
            is_ci: crate::shell::is_ci(),
        }
    }

    /// Create with explicit overrides (for testing).
    pub fn with_overrides(mode: OutputMode, overrides: HashMap<String, String>) -> Self {
        Self {
            mode,
            env_overrides: overrides,
            is_ci: false,
        }
    }

    fn answer(&self, key: &str) -> Option<&String> {
        let env_key = format!("{}{}", PROMPT_ENV_PREFIX, key.to_uppercase().replace('-', "_"));
        self.env_overrides.get(&env_key)
    }
}

impl UserInterface for NonInteractiveUI {
    fn output_mode(&self) -> OutputMode {
        self.mode
    }

    fn message(&mut self, msg: &str) {
        if self.mode.shows_status() {
            println!("{}", msg);
        }
    }

    fn success(&mut self, msg: &str) {
        if self.mode.shows_status() {
            println!("✓ {}", msg);
        }
    }

    fn warning(&mut self, msg: &str) {
        if self.mode.shows_status() {
            eprintln!("⚠ {}", msg);
        }
    }

    fn error(&mut self, msg: &str) {
        eprintln!("✗ {}", msg);
    }

    fn prompt(&mut self, prompt: &Prompt) -> Result<PromptResult> {
        let answer = self.answer(&prompt.key).or(prompt.default.as_ref());

        match (answer, &prompt.prompt_type) {
            (Some(value), PromptType::Confirm) => {
                Ok(PromptResult::Bool(super::parse_yes(value)))
            }
            (Some(value), PromptType::Select { options }) => {
                if options.iter().any(|o| o.value == *value) {
                    Ok(PromptResult::String(value.clone()))
                } else {
                    Err(JanitorError::Other(anyhow::anyhow!(
                        "'{}' is not a valid answer for '{}'",
                        value,
                        prompt.key
                    )))
                }
            }
            (None, _) => Err(JanitorError::Other(anyhow::anyhow!(
                "Cannot prompt for '{}' in non-interactive mode (no default value)",
                prompt.key
            ))),
        }
    }

    fn start_spinner(&mut self, message: &str) -> Box<dyn SpinnerHandle> {
        if self.mode.shows_spinners() && !self.is_ci {
            println!("  {}", message);
        }
        Box::new(NoopSpinner {
            show: self.mode.shows_spinners(),
        })
    }

    fn show_header(&mut self, title: &str) {
        if self.mode.shows_spinners() {
            println!("\n{}\n", title);
        }
    }

    fn show_hint(&mut self, hint: &str) {
        if self.mode.shows_status() {
            println!("  {}", hint);
        }
    }

    fn is_interactive(&self) -> bool {
        false
    }
}

/// Spinner that only prints its final line.
struct NoopSpinner {
    show: bool,
}

impl SpinnerHandle for NoopSpinner {
    fn set_message(&mut self, _msg: &str) {}

    fn finish_success(&mut self, msg: &str) {
        if self.show {
            println!("✓ {}", msg);
        }
    }

    fn finish_error(&mut self, msg: &str) {
        eprintln!("✗ {}", msg);
    }
}
