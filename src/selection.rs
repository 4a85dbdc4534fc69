//! Selection state machine.
//!
//! ```text
//! Idle ──start──▶ Selecting ──press──▶ Dragging ──release──▶ Selecting
//!                     │                    │
//!                     └──────commit────────┴──▶ Naming ──submit──▶ Saving
//! ```
//!
//! Cancel returns `Selecting`, `Dragging` and `Naming` to `Idle`. `Saving` ends
//! in `Idle` on success, or back in `Selecting` with the selection intact when
//! the save fails.

use chrono::{DateTime, Utc};

use crate::coords::resolve_pixel;
use crate::model::{PendingSelection, SelectionSet, WorldPixel};
use crate::overlay::{MarkerSink, OverlayProjector};
use crate::viewport::{ScreenPos, Viewport};

/// Interaction mode of the selection session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionMode {
    /// No selection in progress; canvas clicks paint.
    #[default]
    Idle,
    /// Crosshair shown, waiting for a press.
    Selecting,
    /// Pointer held down, every pixel passed over is added.
    Dragging,
    /// Snapshot taken, waiting for the user to name it.
    Naming,
    /// Create request in flight.
    Saving,
}

/// Cursor the host should show over the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CursorStyle {
    #[default]
    Default,
    Crosshair,
    Grab,
}

/// Pixels chosen in the current session and the mode that governs them.
#[derive(Debug, Default)]
pub struct SelectionSession {
    mode: SelectionMode,
    pixels: SelectionSet,
    commit_visible: bool,
}

impl SelectionSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> SelectionMode {
        self.mode
    }

    pub fn pixels(&self) -> &SelectionSet {
        &self.pixels
    }

    /// Whether the commit ("validate") action should be offered.
    pub fn commit_visible(&self) -> bool {
        self.commit_visible
    }

    /// True in every mode except `Idle`. Painting is suppressed while active.
    pub fn is_active(&self) -> bool {
        self.mode != SelectionMode::Idle
    }

    /// True while pointer input edits the selection.
    pub fn is_editing(&self) -> bool {
        matches!(self.mode, SelectionMode::Selecting | SelectionMode::Dragging)
    }

    pub fn cursor(&self) -> CursorStyle {
        if self.is_editing() {
            CursorStyle::Crosshair
        } else {
            CursorStyle::Default
        }
    }

    /// `Idle → Selecting`. Returns `false` if a session is already running.
    pub fn start(&mut self) -> bool {
        if self.mode != SelectionMode::Idle {
            log::debug!("Selection already active ({:?})", self.mode);
            return false;
        }
        self.mode = SelectionMode::Selecting;
        log::debug!("Selection mode on: press and drag to select pixels");
        true
    }

    /// Pointer or touch down. Enters `Dragging` and selects the pixel under `pos`.
    ///
    /// Returns `true` if the event belonged to the selection.
    pub fn press<V, S>(
        &mut self,
        pos: ScreenPos,
        viewport: &V,
        overlay: &mut OverlayProjector<S>,
    ) -> bool
    where
        V: Viewport + ?Sized,
        S: MarkerSink,
    {
        if !self.is_editing() {
            return false;
        }
        self.mode = SelectionMode::Dragging;
        self.add_at(pos, viewport, overlay);
        true
    }

    /// Pointer or touch move while held. Selects the pixel under `pos`.
    pub fn drag<V, S>(
        &mut self,
        pos: ScreenPos,
        viewport: &V,
        overlay: &mut OverlayProjector<S>,
    ) -> bool
    where
        V: Viewport + ?Sized,
        S: MarkerSink,
    {
        if self.mode != SelectionMode::Dragging {
            return false;
        }
        self.add_at(pos, viewport, overlay);
        true
    }

    /// Pointer or touch up. `Dragging → Selecting`; offers commit if anything is selected.
    pub fn release(&mut self) -> bool {
        if self.mode != SelectionMode::Dragging {
            return false;
        }
        self.mode = SelectionMode::Selecting;
        self.commit_visible = !self.pixels.is_empty();
        true
    }

    /// Cancel the session: clear the selection, destroy markers, hide commit.
    ///
    /// Refused while a save is in flight. Returns `true` if anything was cancelled.
    pub fn cancel<S: MarkerSink>(&mut self, overlay: &mut OverlayProjector<S>) -> bool {
        match self.mode {
            SelectionMode::Idle => false,
            SelectionMode::Saving => {
                log::debug!("Cannot cancel while the selection is being saved");
                false
            }
            _ => {
                let count = self.pixels.len();
                self.reset(overlay);
                log::debug!("Selection cancelled ({} pixels discarded)", count);
                true
            }
        }
    }

    /// Snapshot the selection for naming. `Selecting|Dragging → Naming`.
    ///
    /// Colours are sampled now and never again. Returns `None` (and changes
    /// nothing) when the selection is empty or the session is not editing.
    pub fn begin_commit<V: Viewport + ?Sized>(
        &mut self,
        viewport: &V,
        timestamp: DateTime<Utc>,
    ) -> Option<PendingSelection> {
        if !self.is_editing() {
            return None;
        }
        let Some(pending) =
            PendingSelection::capture(&self.pixels, timestamp, |p| viewport.color_at(p))
        else {
            log::debug!("Nothing selected, commit ignored");
            return None;
        };
        self.mode = SelectionMode::Naming;
        self.commit_visible = false;
        Some(pending)
    }

    /// The named record was handed to the backend. `Naming → Saving`.
    pub fn begin_save(&mut self) -> bool {
        if self.mode != SelectionMode::Naming {
            return false;
        }
        self.mode = SelectionMode::Saving;
        true
    }

    /// The backend rejected the save. `Saving → Selecting` with the selection kept.
    pub fn save_failed(&mut self) {
        if self.mode == SelectionMode::Saving {
            self.mode = SelectionMode::Selecting;
            self.commit_visible = !self.pixels.is_empty();
        }
    }

    /// The commit path finished (saved, or naming cancelled). Back to `Idle`.
    pub fn finish<S: MarkerSink>(&mut self, overlay: &mut OverlayProjector<S>) {
        self.reset(overlay);
    }

    fn reset<S: MarkerSink>(&mut self, overlay: &mut OverlayProjector<S>) {
        self.pixels.clear();
        overlay.remove_all();
        self.commit_visible = false;
        self.mode = SelectionMode::Idle;
    }

    fn add_at<V, S>(&mut self, pos: ScreenPos, viewport: &V, overlay: &mut OverlayProjector<S>)
    where
        V: Viewport + ?Sized,
        S: MarkerSink,
    {
        let Some(pixel) = resolve_pixel(viewport, pos) else {
            return;
        };
        self.add_pixel(pixel, viewport, overlay);
    }

    fn add_pixel<V, S>(
        &mut self,
        pixel: WorldPixel,
        viewport: &V,
        overlay: &mut OverlayProjector<S>,
    ) where
        V: Viewport + ?Sized,
        S: MarkerSink,
    {
        if self.pixels.insert(pixel) {
            overlay.place(pixel, viewport);
            log::trace!("Pixel selected: ({}, {})", pixel.x, pixel.y);
        }
    }
}
