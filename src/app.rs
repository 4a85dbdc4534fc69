//! The atlas controller.
//!
//! [`AtlasApp`] is the single session-scoped object that owns the selection
//! session, its overlays, the dropdown and the naming step. It is driven only
//! through [`AtlasApp::update`] and never talks to the network itself: requests
//! come back out as [`Command`]s and their results return as [`Message`]s.

use chrono::Utc;
use image::Rgb;
use web_time::Instant;

use crate::color::{parse_hex_color, to_hex};
use crate::config::{AppConfig, NamingFrontend, ViewConfig};
use crate::coords::resolve_pixel;
use crate::dropdown::AtlasDropdown;
use crate::keybindings::{KeyAction, KeyBindings, KeyCode};
use crate::message::{Command, Message, PointerButton};
use crate::model::{SelectionId, StoredSelection};
use crate::naming::{NamingDialog, NamingOutcome};
use crate::overlay::{MarkerSink, OverlayProjector};
use crate::selection::{CursorStyle, SelectionMode, SelectionSession};
use crate::viewport::{Place, ScreenPos, Viewport};

/// Destructive action waiting for the user's confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingConfirm {
    Delete(SelectionId),
    Clear,
}

impl PendingConfirm {
    pub fn question(&self) -> String {
        match self {
            PendingConfirm::Delete(id) => format!("Delete selection {}?", id),
            PendingConfirm::Clear => "Delete all selections?".to_string(),
        }
    }
}

#[derive(Debug, Default)]
struct PointerState {
    last_pos: Option<ScreenPos>,
    held: Option<PointerButton>,
    panning: bool,
}

#[derive(Debug, Default)]
struct TouchState {
    started: Option<Instant>,
    last_pos: Option<ScreenPos>,
}

/// Session-scoped atlas controller.
pub struct AtlasApp<V, S: MarkerSink> {
    viewport: V,
    view: ViewConfig,
    keybindings: KeyBindings,
    naming_frontend: NamingFrontend,

    session: SelectionSession,
    overlay: OverlayProjector<S>,

    preview: OverlayProjector<S>,
    previewed: Option<StoredSelection>,

    dropdown: AtlasDropdown,
    naming: Option<NamingDialog>,
    confirm: Option<PendingConfirm>,

    color: Rgb<u8>,
    pointer: PointerState,
    touch: TouchState,
    status_message: Option<String>,
}

impl<V, S> AtlasApp<V, S>
where
    V: Viewport + Place,
    S: MarkerSink,
{
    /// Create a controller over a viewport, with one sink for the live
    /// selection and one for previews of stored selections.
    pub fn new(viewport: V, selection_sink: S, preview_sink: S, config: &AppConfig) -> Self {
        let min_size = config.view.min_marker_size;
        Self {
            viewport,
            view: config.view.clone(),
            keybindings: config.keybindings.clone(),
            naming_frontend: config.preferences.naming,
            session: SelectionSession::new(),
            overlay: OverlayProjector::new(selection_sink).with_min_size(min_size),
            preview: OverlayProjector::new(preview_sink).with_min_size(min_size),
            previewed: None,
            dropdown: AtlasDropdown::new(),
            naming: None,
            confirm: None,
            color: Rgb([0, 0, 0]),
            pointer: PointerState::default(),
            touch: TouchState::default(),
            status_message: None,
        }
    }

    // === Accessors ===

    pub fn viewport(&self) -> &V {
        &self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut V {
        &mut self.viewport
    }

    pub fn session(&self) -> &SelectionSession {
        &self.session
    }

    pub fn mode(&self) -> SelectionMode {
        self.session.mode()
    }

    pub fn overlay(&self) -> &OverlayProjector<S> {
        &self.overlay
    }

    pub fn preview_overlay(&self) -> &OverlayProjector<S> {
        &self.preview
    }

    /// Stored selection currently shown as a preview.
    pub fn previewed(&self) -> Option<&StoredSelection> {
        self.previewed.as_ref()
    }

    pub fn dropdown(&self) -> &AtlasDropdown {
        &self.dropdown
    }

    pub fn naming(&self) -> Option<&NamingDialog> {
        self.naming.as_ref()
    }

    pub fn pending_confirm(&self) -> Option<&PendingConfirm> {
        self.confirm.as_ref()
    }

    pub fn color(&self) -> Rgb<u8> {
        self.color
    }

    pub fn color_hex(&self) -> String {
        to_hex(self.color)
    }

    /// Last user-facing message (errors, save confirmations).
    pub fn status_message(&self) -> Option<&str> {
        self.status_message.as_deref()
    }

    pub fn cursor(&self) -> CursorStyle {
        if self.pointer.panning {
            CursorStyle::Grab
        } else {
            self.session.cursor()
        }
    }

    pub fn commit_visible(&self) -> bool {
        self.session.commit_visible()
    }

    // === Update ===

    /// Apply one message. Returns the commands the host must run.
    pub fn update(&mut self, message: Message) -> Vec<Command> {
        let mut commands = Vec::new();

        match message {
            // Canvas input
            Message::PointerDown { pos, button, ctrl } => {
                self.handle_pointer_down(pos, button, ctrl);
            }
            Message::PointerMoved { pos, ctrl } => {
                self.handle_pointer_move(pos, ctrl);
            }
            Message::PointerUp { pos } => {
                self.handle_pointer_up(pos);
            }
            Message::TouchStart { pos, at } => {
                self.handle_touch_start(pos, at);
            }
            Message::TouchMoved { pos } => {
                self.handle_touch_move(pos);
            }
            Message::TouchEnd { at } => {
                self.handle_touch_end(at);
            }
            Message::Wheel { delta_y } => {
                let step = self.view.wheel_zoom_step;
                if delta_y > 0.0 {
                    self.zoom_out(step);
                } else {
                    self.zoom_in(step);
                }
            }
            Message::KeyPressed(key) => {
                self.handle_key(key, &mut commands);
            }
            Message::Resized { width, height } => {
                self.viewport.resize(width, height);
                self.viewport.draw();
                self.reproject();
            }

            // Toolbar
            Message::ZoomIn => self.zoom_in(self.view.zoom_step),
            Message::ZoomOut => self.zoom_out(self.view.zoom_step),
            Message::ToggleGrid => self.toggle_grid(),
            Message::SetColor(text) => {
                self.color = parse_hex_color(&text);
                log::debug!("Paint colour set to {}", self.color_hex());
            }

            // Atlas menu
            Message::ToggleDropdown => {
                if let Some(seq) = self.dropdown.toggle() {
                    commands.push(Command::List { seq });
                }
            }
            Message::CloseDropdown => self.dropdown.close(),
            Message::StartSelection => {
                self.dropdown.close();
                if self.blocked_by_confirm() {
                    return commands;
                }
                self.session.start();
            }
            Message::Commit => self.commit(&mut commands),
            Message::CancelSelection => {
                if !self.blocked_by_confirm() {
                    self.cancel_selection();
                }
            }
            Message::ViewSelection(id) => {
                self.dropdown.close();
                commands.push(Command::Get(id));
            }
            Message::ClosePreview => self.close_preview(),
            Message::DeleteSelection(id) => {
                self.request_confirm(PendingConfirm::Delete(id), &mut commands);
            }
            Message::ClearSelections => {
                self.request_confirm(PendingConfirm::Clear, &mut commands);
            }
            Message::Confirmed(accepted) => {
                self.resolve_confirm(accepted, &mut commands);
            }

            // Naming dialog
            Message::NameChanged(name) => {
                if let Some(dialog) = self.naming.as_mut() {
                    dialog.set_name(name);
                }
            }
            Message::DescriptionChanged(description) => {
                if let Some(dialog) = self.naming.as_mut() {
                    dialog.set_description(description);
                }
            }
            Message::SubmitName => self.submit_name(&mut commands),
            Message::CancelNaming => self.cancel_naming(),
            Message::PromptFinished(outcome) => match outcome {
                NamingOutcome::Submitted(record) => {
                    if self.session.begin_save() {
                        commands.push(Command::Create(record));
                    }
                }
                NamingOutcome::Cancelled => self.cancel_naming(),
            },

            // Network completions
            Message::Created(result) => match result {
                Ok(created) => {
                    log::info!("Selection saved as {}", created.id);
                    self.session.finish(&mut self.overlay);
                    self.status_message = Some(format!("Selection saved ({})", created.id));
                    commands.push(self.refresh());
                }
                Err(e) => {
                    log::error!("Failed to save selection: {}", e);
                    self.session.save_failed();
                    self.status_message = Some(e.user_message());
                }
            },
            Message::Listed { seq, selections } => match selections {
                Ok(selections) => {
                    if self.dropdown.apply(seq, selections) {
                        self.drop_stale_preview();
                    }
                }
                Err(e) => {
                    log::error!("Failed to list selections: {}", e);
                    // Shown as empty; the preview may still exist on the server
                    self.dropdown.apply(seq, Vec::new());
                }
            },
            Message::Fetched(result) => match result {
                Ok(stored) => self.show_preview(stored),
                Err(e) => {
                    log::error!("Failed to fetch selection: {}", e);
                    self.status_message = Some(e.user_message());
                }
            },
            Message::Deleted(result) => match result {
                Ok(confirmation) => {
                    log::info!("Deleted selection {}", confirmation.id);
                    self.status_message = Some(format!("Selection {} deleted", confirmation.id));
                    commands.push(self.refresh());
                }
                Err(e) => {
                    log::error!("Failed to delete selection: {}", e);
                    self.status_message = Some(e.user_message());
                }
            },
            Message::Cleared(result) => match result {
                Ok(()) => {
                    self.status_message = Some("All selections deleted".to_string());
                    commands.push(self.refresh());
                }
                Err(e) => {
                    log::error!("Failed to clear selections: {}", e);
                    self.status_message = Some(e.user_message());
                }
            },
        }

        commands
    }

    // === Selection ===

    /// Cancel the selection or naming step in progress, if any.
    pub fn cancel_selection(&mut self) -> bool {
        if self.naming.take().is_some() {
            log::debug!("Naming dialog closed");
        }
        self.session.cancel(&mut self.overlay)
    }

    fn commit(&mut self, commands: &mut Vec<Command>) {
        if self.blocked_by_confirm() {
            return;
        }
        let Some(pending) = self.session.begin_commit(&self.viewport, Utc::now()) else {
            return;
        };
        log::info!("Selection committed: {} pixels", pending.len());
        match self.naming_frontend {
            NamingFrontend::Dialog => self.naming = Some(NamingDialog::new(pending)),
            NamingFrontend::Prompt => commands.push(Command::PromptName(pending)),
        }
    }

    fn submit_name(&mut self, commands: &mut Vec<Command>) {
        let Some(dialog) = self.naming.as_mut() else {
            return;
        };
        match dialog.submit() {
            Ok(record) => {
                self.naming = None;
                self.status_message = None;
                if self.session.begin_save() {
                    commands.push(Command::Create(record));
                }
            }
            Err(e) => self.status_message = Some(e.to_string()),
        }
    }

    fn cancel_naming(&mut self) {
        self.naming = None;
        if self.session.mode() == SelectionMode::Naming {
            self.session.cancel(&mut self.overlay);
            log::debug!("Naming cancelled, selection discarded");
        }
    }

    fn blocked_by_confirm(&self) -> bool {
        if self.confirm.is_some() {
            log::debug!("Waiting for confirmation, selection action ignored");
        }
        self.confirm.is_some()
    }

    // === Delete / clear ===

    fn request_confirm(&mut self, action: PendingConfirm, commands: &mut Vec<Command>) {
        if self.confirm.is_some() {
            log::warn!("A confirmation is already pending");
            return;
        }
        self.dropdown.close();
        commands.push(Command::Confirm(action.question()));
        self.confirm = Some(action);
    }

    fn resolve_confirm(&mut self, accepted: bool, commands: &mut Vec<Command>) {
        let Some(action) = self.confirm.take() else {
            return;
        };
        if !accepted {
            log::debug!("{:?} declined", action);
            return;
        }
        commands.push(match action {
            PendingConfirm::Delete(id) => Command::Delete(id),
            PendingConfirm::Clear => Command::Clear,
        });
    }

    // === Dropdown / preview ===

    fn refresh(&mut self) -> Command {
        Command::List {
            seq: self.dropdown.next_request(),
        }
    }

    fn show_preview(&mut self, stored: StoredSelection) {
        self.preview.remove_all();
        for pixel in stored.pixels() {
            self.preview.place(pixel.pixel(), &self.viewport);
        }
        log::info!(
            "Previewing \"{}\" ({} pixels)",
            stored.name,
            stored.pixels().len()
        );
        self.previewed = Some(stored);
    }

    fn close_preview(&mut self) {
        self.preview.remove_all();
        self.previewed = None;
    }

    fn drop_stale_preview(&mut self) {
        let gone = self
            .previewed
            .as_ref()
            .is_some_and(|shown| self.dropdown.find(&shown.id).is_none());
        if gone {
            log::debug!("Previewed selection no longer exists");
            self.close_preview();
        }
    }

    // === Pointer / touch ===

    fn handle_pointer_down(&mut self, pos: ScreenPos, button: PointerButton, ctrl: bool) {
        self.pointer.last_pos = Some(pos);

        if self.session.is_editing() {
            if !self.blocked_by_confirm() {
                self.session.press(pos, &self.viewport, &mut self.overlay);
            }
            return;
        }

        match button {
            PointerButton::Primary => self.pointer.held = Some(button),
            PointerButton::Middle => self.pick_at(pos),
            PointerButton::Secondary => {
                self.pointer.held = Some(button);
                if ctrl {
                    self.pick_at(pos);
                } else {
                    self.paint_at(pos);
                }
            }
        }
    }

    fn handle_pointer_move(&mut self, pos: ScreenPos, ctrl: bool) {
        let last = self.pointer.last_pos.replace(pos);

        if self.session.mode() == SelectionMode::Dragging {
            if !self.blocked_by_confirm() {
                self.session.drag(pos, &self.viewport, &mut self.overlay);
            }
            return;
        }

        match self.pointer.held {
            Some(PointerButton::Secondary) if ctrl => self.pick_at(pos),
            Some(PointerButton::Secondary) => self.paint_at(pos),
            Some(_) => {
                if let Some(last) = last {
                    self.pointer.panning = true;
                    self.pan(pos.x - last.x, pos.y - last.y);
                }
            }
            None => {}
        }
    }

    fn handle_pointer_up(&mut self, pos: ScreenPos) {
        self.pointer.last_pos = Some(pos);
        self.pointer.held = None;
        self.pointer.panning = false;
        self.release_drag();
    }

    /// End a selection drag, unless a confirmation is holding the session still.
    fn release_drag(&mut self) {
        if self.session.mode() == SelectionMode::Dragging && !self.blocked_by_confirm() {
            self.session.release();
        }
    }

    fn handle_touch_start(&mut self, pos: ScreenPos, at: Instant) {
        self.touch.started = Some(at);
        self.touch.last_pos = Some(pos);

        if self.session.is_editing() && !self.blocked_by_confirm() {
            self.session.press(pos, &self.viewport, &mut self.overlay);
        }
    }

    fn handle_touch_move(&mut self, pos: ScreenPos) {
        let last = self.touch.last_pos.replace(pos);

        if self.session.is_editing() {
            if !self.blocked_by_confirm() {
                self.session.press(pos, &self.viewport, &mut self.overlay);
            }
        } else if let Some(last) = last {
            self.pan(pos.x - last.x, pos.y - last.y);
        }
    }

    fn handle_touch_end(&mut self, at: Instant) {
        let tapped = self
            .touch
            .started
            .take()
            .is_some_and(|start| at.duration_since(start) < self.view.tap_max_duration());

        // Selection already took the pixel on touch-down; a short tap paints
        if let Some(pos) = self.touch.last_pos.filter(|_| tapped && !self.session.is_editing()) {
            self.paint_at(pos);
        }
        self.release_drag();
    }

    // === Painting ===

    fn paint_at(&mut self, pos: ScreenPos) {
        if self.session.is_active() {
            return;
        }
        let Some(pixel) = resolve_pixel(&self.viewport, pos) else {
            return;
        };
        let [r, g, b, _] = self.viewport.color_at(pixel).0;
        if [r, g, b] != self.color.0 {
            self.viewport.set_pixel(pixel.x, pixel.y, self.color);
        }
    }

    fn pick_at(&mut self, pos: ScreenPos) {
        if self.session.is_active() {
            return;
        }
        let Some(pixel) = resolve_pixel(&self.viewport, pos) else {
            return;
        };
        let [r, g, b, _] = self.viewport.color_at(pixel).0;
        self.color = Rgb([r, g, b]);
        log::debug!("Picked colour {} at ({}, {})", self.color_hex(), pixel.x, pixel.y);
    }

    // === Navigation ===

    fn pan(&mut self, dx: f32, dy: f32) {
        self.viewport.pan_by(dx, dy);
        self.viewport.draw();
        self.reproject();
    }

    fn zoom_in(&mut self, step: f32) {
        let zoom = self.viewport.zoom();
        self.viewport.set_zoom(zoom * step);
        self.viewport.draw();
        self.reproject();
    }

    fn zoom_out(&mut self, step: f32) {
        let zoom = self.viewport.zoom();
        if zoom < self.view.min_zoom_for_zoom_out {
            log::debug!("Zoom {:.2} is already at the minimum", zoom);
            return;
        }
        self.viewport.set_zoom(zoom / step);
        self.viewport.draw();
        self.reproject();
    }

    fn toggle_grid(&mut self) {
        let enabled = !self.viewport.grid_enabled();
        self.viewport.set_grid(enabled);
        self.viewport.draw();
    }

    fn reproject(&mut self) {
        self.overlay.reproject_all(&self.viewport);
        self.preview.reproject_all(&self.viewport);
    }

    fn handle_key(&mut self, key: KeyCode, commands: &mut Vec<Command>) {
        let Some(action) = self.keybindings.action_for_key(key) else {
            return;
        };
        let step = self.view.pan_step;
        match action {
            KeyAction::ZoomIn => self.zoom_in(self.view.zoom_step),
            KeyAction::ZoomOut => self.zoom_out(self.view.zoom_step),
            KeyAction::PanUp => self.pan(0.0, step),
            KeyAction::PanDown => self.pan(0.0, -step),
            KeyAction::PanLeft => self.pan(step, 0.0),
            KeyAction::PanRight => self.pan(-step, 0.0),
            KeyAction::Cancel => {
                if self.confirm.is_some() {
                    self.resolve_confirm(false, commands);
                } else if self.naming.is_some() {
                    self.cancel_naming();
                } else {
                    self.cancel_selection();
                }
            }
            KeyAction::Commit => {
                if self.naming.is_some() {
                    self.submit_name(commands);
                } else {
                    self.commit(commands);
                }
            }
            KeyAction::StartSelection => {
                if !self.blocked_by_confirm() {
                    self.session.start();
                }
            }
            KeyAction::PrintPosition => {
                let pixel = self
                    .pointer
                    .last_pos
                    .and_then(|pos| resolve_pixel(&self.viewport, pos));
                match pixel {
                    Some(p) => log::info!("Current mouse position: {} {}", p.x, p.y),
                    None => log::info!("Current mouse position: outside the canvas"),
                }
            }
            KeyAction::ToggleGrid => self.toggle_grid(),
        }
    }
}
