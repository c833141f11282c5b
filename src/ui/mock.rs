//! Mock UI implementation for testing.
//!
//! `MockUI` implements [`UserInterface`] and records every interaction for
//! later assertion. Prompt answers are scripted per key.
//!
//! # Example
//!
//! ```
//! use dev_janitor::ui::{MockUI, Prompt, UserInterface};
//!
//! let mut ui = MockUI::new();
//! ui.set_prompt_response("confirm-uninstall", "yes");
//!
//! ui.message("Scanning");
//! let answer = ui.prompt(&Prompt::confirm("confirm-uninstall", "Remove?", false)).unwrap();
//!
//! assert!(answer.as_bool());
//! assert!(ui.has_message("Scanning"));
//! ```

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::error::{JanitorError, Result};

use super::{OutputMode, Prompt, PromptResult, PromptType, SpinnerHandle, UserInterface};

/// Mock UI implementation for testing.
#[derive(Debug, Default)]
pub struct MockUI {
    mode: OutputMode,
    interactive: bool,
    messages: Vec<String>,
    successes: Vec<String>,
    warnings: Vec<String>,
    errors: Vec<String>,
    headers: Vec<String>,
    hints: Vec<String>,
    spinners: Rc<RefCell<Vec<SpinnerEvent>>>,
    prompt_responses: HashMap<String, String>,
    prompts_shown: Vec<String>,
}

/// Something a [`MockSpinner`] was told.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpinnerEvent {
    Started(String),
    Message(String),
    Success(String),
    Error(String),
}

impl MockUI {
    /// Create a new MockUI with Normal output mode.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mode(mode: OutputMode) -> Self {
        Self {
            mode,
            ..Default::default()
        }
    }

    /// Answer prompts with this key using `response`.
    pub fn set_prompt_response(&mut self, key: &str, response: &str) {
        self.prompt_responses
            .insert(key.to_string(), response.to_string());
    }

    pub fn set_interactive(&mut self, interactive: bool) {
        self.interactive = interactive;
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    pub fn successes(&self) -> &[String] {
        &self.successes
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn hints(&self) -> &[String] {
        &self.hints
    }

    /// Everything spinners were told, in order.
    pub fn spinner_events(&self) -> Vec<SpinnerEvent> {
        self.spinners.borrow().clone()
    }

    /// Keys of prompts that were shown.
    pub fn prompts_shown(&self) -> &[String] {
        &self.prompts_shown
    }

    pub fn has_message(&self, msg: &str) -> bool {
        self.messages.iter().any(|m| m.contains(msg))
    }

    pub fn has_success(&self, msg: &str) -> bool {
        self.successes.iter().any(|m| m.contains(msg))
    }

    pub fn has_warning(&self, msg: &str) -> bool {
        self.warnings.iter().any(|m| m.contains(msg))
    }

    pub fn has_error(&self, msg: &str) -> bool {
        self.errors.iter().any(|m| m.contains(msg))
    }

    pub fn has_hint(&self, msg: &str) -> bool {
        self.hints.iter().any(|m| m.contains(msg))
    }
}

impl UserInterface for MockUI {
    fn output_mode(&self) -> OutputMode {
        self.mode
    }

    fn message(&mut self, msg: &str) {
        self.messages.push(msg.to_string());
    }

    fn success(&mut self, msg: &str) {
        self.successes.push(msg.to_string());
    }

    fn warning(&mut self, msg: &str) {
        self.warnings.push(msg.to_string());
    }

    fn error(&mut self, msg: &str) {
        self.errors.push(msg.to_string());
    }

    fn prompt(&mut self, prompt: &Prompt) -> Result<PromptResult> {
        self.prompts_shown.push(prompt.key.clone());

        let response = self
            .prompt_responses
            .get(&prompt.key)
            .or(prompt.default.as_ref())
            .cloned()
            .ok_or_else(|| {
                JanitorError::Other(anyhow::anyhow!("no mock response for '{}'", prompt.key))
            })?;

        Ok(match prompt.prompt_type {
            PromptType::Confirm => PromptResult::Bool(super::parse_yes(&response)),
            PromptType::Select { .. } => PromptResult::String(response),
        })
    }

    fn start_spinner(&mut self, message: &str) -> Box<dyn SpinnerHandle> {
        self.spinners
            .borrow_mut()
            .push(SpinnerEvent::Started(message.to_string()));
        Box::new(MockSpinner {
            events: Rc::clone(&self.spinners),
        })
    }

    fn show_header(&mut self, title: &str) {
        self.headers.push(title.to_string());
    }

    fn show_hint(&mut self, hint: &str) {
        self.hints.push(hint.to_string());
    }

    fn is_interactive(&self) -> bool {
        self.interactive
    }
}

/// Spinner that records into its [`MockUI`].
#[derive(Debug)]
pub struct MockSpinner {
    events: Rc<RefCell<Vec<SpinnerEvent>>>,
}

impl SpinnerHandle for MockSpinner {
    fn set_message(&mut self, msg: &str) {
        self.events
            .borrow_mut()
            .push(SpinnerEvent::Message(msg.to_string()));
    }

    fn finish_success(&mut self, msg: &str) {
        self.events
            .borrow_mut()
            .push(SpinnerEvent::Success(msg.to_string()));
    }

    fn finish_error(&mut self, msg: &str) {
        self.events
            .borrow_mut()
            .push(SpinnerEvent::Error(msg.to_string()));
    }
}
