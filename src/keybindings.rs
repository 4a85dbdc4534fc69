//! Customizable keybindings for canvas navigation and selection.
//!
//! Keys are identified by their physical code (`"PageUp"`, `"KeyP"`, ...), the
//! same names browsers report in `KeyboardEvent.code`.

use serde::{Deserialize, Serialize};

/// Physical keys the canvas reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyCode {
    PageUp,
    PageDown,
    NumpadAdd,
    NumpadSubtract,
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Escape,
    Enter,
    KeyG,
    KeyP,
    KeyS,
}

impl KeyCode {
    /// Parse a physical key code name. Unknown keys yield `None`.
    pub fn from_code(code: &str) -> Option<Self> {
        let key = match code {
            "PageUp" => KeyCode::PageUp,
            "PageDown" => KeyCode::PageDown,
            "NumpadAdd" => KeyCode::NumpadAdd,
            "NumpadSubtract" => KeyCode::NumpadSubtract,
            "ArrowUp" => KeyCode::ArrowUp,
            "ArrowDown" => KeyCode::ArrowDown,
            "ArrowLeft" => KeyCode::ArrowLeft,
            "ArrowRight" => KeyCode::ArrowRight,
            "Escape" => KeyCode::Escape,
            "Enter" | "NumpadEnter" => KeyCode::Enter,
            "KeyG" => KeyCode::KeyG,
            "KeyP" => KeyCode::KeyP,
            "KeyS" => KeyCode::KeyS,
            _ => return None,
        };
        Some(key)
    }
}

/// What a bound key does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    ZoomIn,
    ZoomOut,
    PanUp,
    PanDown,
    PanLeft,
    PanRight,
    /// Cancel the selection or naming step in progress
    Cancel,
    /// Commit the current selection
    Commit,
    /// Enter selection mode
    StartSelection,
    /// Log the world position under the pointer
    PrintPosition,
    ToggleGrid,
}

/// Keybinding configuration for the canvas.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyBindings {
    pub zoom_in: Vec<KeyCode>,
    pub zoom_out: Vec<KeyCode>,
    pub pan_up: KeyCode,
    pub pan_down: KeyCode,
    pub pan_left: KeyCode,
    pub pan_right: KeyCode,
    pub cancel: KeyCode,
    pub commit: KeyCode,
    pub start_selection: KeyCode,
    pub print_position: KeyCode,
    pub toggle_grid: KeyCode,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            zoom_in: vec![KeyCode::PageUp, KeyCode::NumpadAdd],
            zoom_out: vec![KeyCode::PageDown, KeyCode::NumpadSubtract],
            pan_up: KeyCode::ArrowUp,
            pan_down: KeyCode::ArrowDown,
            pan_left: KeyCode::ArrowLeft,
            pan_right: KeyCode::ArrowRight,
            cancel: KeyCode::Escape,
            commit: KeyCode::Enter,
            start_selection: KeyCode::KeyS,
            print_position: KeyCode::KeyP,
            toggle_grid: KeyCode::KeyG,
        }
    }
}

impl KeyBindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the action bound to a key press, if any.
    pub fn action_for_key(&self, key: KeyCode) -> Option<KeyAction> {
        if self.zoom_in.contains(&key) {
            Some(KeyAction::ZoomIn)
        } else if self.zoom_out.contains(&key) {
            Some(KeyAction::ZoomOut)
        } else if key == self.pan_up {
            Some(KeyAction::PanUp)
        } else if key == self.pan_down {
            Some(KeyAction::PanDown)
        } else if key == self.pan_left {
            Some(KeyAction::PanLeft)
        } else if key == self.pan_right {
            Some(KeyAction::PanRight)
        } else if key == self.cancel {
            Some(KeyAction::Cancel)
        } else if key == self.commit {
            Some(KeyAction::Commit)
        } else if key == self.start_selection {
            Some(KeyAction::StartSelection)
        } else if key == self.print_position {
            Some(KeyAction::PrintPosition)
        } else if key == self.toggle_grid {
            Some(KeyAction::ToggleGrid)
        } else {
            None
        }
    }

    /// First key bound to two different actions, if any.
    pub fn duplicate_key(&self) -> Option<KeyCode> {
        let singles = [
            (self.pan_up, KeyAction::PanUp),
            (self.pan_down, KeyAction::PanDown),
            (self.pan_left, KeyAction::PanLeft),
            (self.pan_right, KeyAction::PanRight),
            (self.cancel, KeyAction::Cancel),
            (self.commit, KeyAction::Commit),
            (self.start_selection, KeyAction::StartSelection),
            (self.print_position, KeyAction::PrintPosition),
            (self.toggle_grid, KeyAction::ToggleGrid),
        ];
        let bound: Vec<(KeyCode, KeyAction)> = self
            .zoom_in
            .iter()
            .map(|&key| (key, KeyAction::ZoomIn))
            .chain(self.zoom_out.iter().map(|&key| (key, KeyAction::ZoomOut)))
            .chain(singles)
            .collect();

        bound.iter().enumerate().find_map(|(i, &(key, action))| {
            bound[..i]
                .iter()
                .any(|&(earlier, other)| earlier == key && other != action)
                .then_some(key)
        })
    }
}
