//! Naming step between committing a selection and persisting it.
//!
//! Two front-ends produce the same [`SelectionRecord`]: [`NamingDialog`], a
//! structured form driven by messages, and [`run_prompt`], a sequence of plain
//! prompts for hosts without a dialog.

use thiserror::Error;

use crate::model::{PendingSelection, SelectionRecord};

pub const NAME_PROMPT: &str = "Name for this selection:";
pub const DESCRIPTION_PROMPT: &str = "Description (optional):";

/// User input that cannot be submitted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please enter a name for the selection")]
    EmptyName,
}

/// Trim a candidate name, rejecting empty or whitespace-only input.
pub fn validate_name(name: &str) -> Result<String, ValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyName);
    }
    Ok(trimmed.to_string())
}

/// Structured naming form over a committed snapshot.
#[derive(Debug, Clone)]
pub struct NamingDialog {
    pending: PendingSelection,
    name: String,
    description: String,
    error: Option<ValidationError>,
}

impl NamingDialog {
    pub fn new(pending: PendingSelection) -> Self {
        Self {
            pending,
            name: String::new(),
            description: String::new(),
            error: None,
        }
    }

    pub fn pending(&self) -> &PendingSelection {
        &self.pending
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Validation message from the last rejected submit.
    pub fn error(&self) -> Option<&ValidationError> {
        self.error.as_ref()
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
        self.error = None;
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    /// Validate the form. On failure the dialog stays open with `error` set.
    pub fn submit(&mut self) -> Result<SelectionRecord, ValidationError> {
        match validate_name(&self.name) {
            Ok(name) => {
                self.error = None;
                Ok(self
                    .pending
                    .clone()
                    .into_record(name, self.description.trim().to_string()))
            }
            Err(e) => {
                log::warn!("Rejected selection name: {}", e);
                self.error = Some(e.clone());
                Err(e)
            }
        }
    }
}

/// Blocking prompt/alert/confirm primitives for hosts without structured dialogs.
pub trait Prompt {
    /// Ask for a line of text. `None` means the user cancelled.
    fn prompt(&mut self, message: &str, default: &str) -> Option<String>;

    fn alert(&mut self, message: &str);

    /// Ask a yes/no question.
    fn confirm(&mut self, message: &str) -> bool;
}

/// Result of running a naming front-end to completion.
#[derive(Debug, Clone, PartialEq)]
pub enum NamingOutcome {
    Submitted(SelectionRecord),
    Cancelled,
}

/// Ask for a name (repeating until valid) and then a description.
///
/// Cancelling either prompt discards the snapshot.
pub fn run_prompt<P: Prompt + ?Sized>(prompt: &mut P, pending: PendingSelection) -> NamingOutcome {
    let mut last = String::new();
    let name = loop {
        let Some(answer) = prompt.prompt(NAME_PROMPT, &last) else {
            return NamingOutcome::Cancelled;
        };
        match validate_name(&answer) {
            Ok(name) => break name,
            Err(e) => {
                log::warn!("Rejected selection name: {}", e);
                prompt.alert(&e.to_string());
                last = answer;
            }
        }
    };

    let Some(description) = prompt.prompt(DESCRIPTION_PROMPT, "") else {
        return NamingOutcome::Cancelled;
    };

    NamingOutcome::Submitted(pending.into_record(name, description.trim().to_string()))
}
