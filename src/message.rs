//! Application message and command types.
//!
//! Every input event, menu action and network completion reaches the
//! controller as a [`Message`]. Work the controller cannot do synchronously
//! leaves it as a [`Command`] for the host to run.

use web_time::Instant;

use crate::keybindings::KeyCode;
use crate::model::{CreatedSelection, PendingSelection, SelectionId, SelectionRecord, StoredSelection};
use crate::naming::NamingOutcome;
use crate::persistence::{DeleteConfirmation, PersistenceError};
use crate::viewport::ScreenPos;

/// Mouse button of a pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Middle,
    Secondary,
}

/// Messages that can be sent to update application state.
#[derive(Debug)]
pub enum Message {
    // Canvas input
    /// Mouse button pressed over the canvas
    PointerDown {
        pos: ScreenPos,
        button: PointerButton,
        ctrl: bool,
    },
    /// Pointer moved anywhere in the window
    PointerMoved { pos: ScreenPos, ctrl: bool },
    /// Mouse button released anywhere in the window
    PointerUp { pos: ScreenPos },
    /// First finger touched the canvas
    TouchStart { pos: ScreenPos, at: Instant },
    /// Finger moved
    TouchMoved { pos: ScreenPos },
    /// Finger lifted
    TouchEnd { at: Instant },
    /// Wheel scrolled; positive is away from the user
    Wheel { delta_y: f32 },
    KeyPressed(KeyCode),
    /// Host window resized
    Resized { width: f32, height: f32 },

    // Toolbar
    ZoomIn,
    ZoomOut,
    ToggleGrid,
    /// Paint colour entered as hex text
    SetColor(String),

    // Atlas menu
    ToggleDropdown,
    CloseDropdown,
    StartSelection,
    /// Commit ("validate") the current selection
    Commit,
    CancelSelection,
    /// Show a stored selection as a preview
    ViewSelection(SelectionId),
    ClosePreview,
    /// Ask to delete a stored selection
    DeleteSelection(SelectionId),
    /// Ask to delete every stored selection
    ClearSelections,
    /// Answer to the pending delete/clear confirmation
    Confirmed(bool),

    // Naming dialog
    NameChanged(String),
    DescriptionChanged(String),
    SubmitName,
    CancelNaming,
    /// The prompt front-end finished
    PromptFinished(NamingOutcome),

    // Network completions
    Created(Result<CreatedSelection, PersistenceError>),
    Listed {
        seq: u64,
        selections: Result<Vec<StoredSelection>, PersistenceError>,
    },
    Fetched(Result<StoredSelection, PersistenceError>),
    Deleted(Result<DeleteConfirmation, PersistenceError>),
    Cleared(Result<(), PersistenceError>),
}

/// Work the host must perform and answer with a [`Message`].
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// `POST /selections`, answered with [`Message::Created`]
    Create(SelectionRecord),
    /// `GET /selections`, answered with [`Message::Listed`] carrying `seq`
    List { seq: u64 },
    /// `GET /selections?id=`, answered with [`Message::Fetched`]
    Get(SelectionId),
    /// `DELETE /selections?id=`, answered with [`Message::Deleted`]
    Delete(SelectionId),
    /// `DELETE /selections?action=clear`, answered with [`Message::Cleared`]
    Clear,
    /// Ask the user a yes/no question, answered with [`Message::Confirmed`]
    Confirm(String),
    /// Run the prompt naming front-end, answered with [`Message::PromptFinished`]
    PromptName(PendingSelection),
}

impl Command {
    /// Whether this command talks to the backend.
    pub fn is_request(&self) -> bool {
        !matches!(self, Command::Confirm(_) | Command::PromptName(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_interactions_are_not_requests() {
        assert!(Command::List { seq: 1 }.is_request());
        assert!(Command::Clear.is_request());
        assert!(Command::Delete(SelectionId::new("a")).is_request());
        assert!(!Command::Confirm("Delete?".into()).is_request());
    }
}
