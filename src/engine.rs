use tracing::debug;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use crate::cascade::{ContainedCounts, cascade_delete, contained};
use crate::clipboard::{Clipboard, duplicate_selection};
use crate::config::EditorConfig;
use crate::consts::PANEL_SPLIT_GAP;
use crate::doc::{
    BackgroundElement, Character, ElementId, Entity, Panel, PanelId, Scene, Selection, SpeechBubble, swap_panels,
};
use crate::geom::{Placement, Point, angle_deg};
use crate::gesture::{GestureOutcome, apply_gesture};
use crate::hit::{Hit, HitPart, Target, cursor_for, pick, pick_in};
use crate::input::{Button, EditMode, ElementRef, InputState, Key, Modifiers, UiState};
use crate::render;
use crate::split::{SplitDirection, split_panel};
use crate::surface::SurfaceError;

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

/// Actions returned from input handlers for the host to process.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    PanelUpdated(Panel),
    CharacterUpdated(Character),
    BubbleUpdated(SpeechBubble),
    BackgroundUpdated(BackgroundElement),
    PanelCreated(Panel),
    CharacterCreated(Character),
    BubbleCreated(SpeechBubble),
    BackgroundCreated(BackgroundElement),
    ElementDeleted(Target),
    /// The whole panel collection changed identity (reading-order swap).
    PanelsReplaced(Vec<Panel>),
    /// The delete handle or key was used on a panel; the host confirms, then
    /// calls [`EngineCore::delete_panel`].
    PanelDeleteRequested { id: PanelId, contained: ContainedCounts },
    /// The split handle was clicked; the host picks a direction and calls
    /// [`EngineCore::split_panel`].
    SplitRequested { id: PanelId },
    SelectionChanged(Selection),
    SetCursor(String),
    RenderNeeded,
}

/// Scene, selection, and gesture state plus every input handler. Holds no
/// browser objects, so it runs natively under `cargo test`.
#[derive(Debug, Default)]
pub struct EngineCore {
    pub scene: Scene,
    pub ui: UiState,
    pub input: InputState,
    pub config: EditorConfig,
    pub clipboard: Clipboard,
}

impl EngineCore {
    #[must_use]
    pub fn new(config: EditorConfig) -> Self {
        Self { config, ..Self::default() }
    }

    // --- Data inputs ---

    /// Replace the whole scene, dropping a selection that no longer resolves.
    pub fn load_scene(&mut self, scene: Scene) {
        self.scene = scene;
        self.input = InputState::Idle;
        self.ui.guides.clear();
        if !self.scene.contains(self.ui.selection) {
            self.ui.selection = Selection::None;
        }
        self.ui.swap_first = self.ui.swap_first.filter(|id| self.scene.panel(*id).is_some());
        self.ui.swap_second = self.ui.swap_second.filter(|id| self.scene.panel(*id).is_some());
    }

    pub fn set_config(&mut self, config: EditorConfig) -> Vec<Action> {
        self.config = config;
        vec![Action::RenderNeeded]
    }

    pub fn set_edit_mode(&mut self, mode: EditMode) -> Vec<Action> {
        if self.ui.edit_mode == mode {
            return Vec::new();
        }
        self.ui.edit_mode = mode;
        self.ui.guides.clear();
        vec![Action::RenderNeeded]
    }

    /// Select `selection` directly (e.g. from a layer list in the host).
    pub fn select(&mut self, selection: Selection) -> Vec<Action> {
        let selection = if self.scene.contains(selection) { selection } else { Selection::None };
        self.set_selection(selection)
    }

    // --- Input events ---

    pub fn on_pointer_down(&mut self, pt: Point, button: Button, modifiers: Modifiers) -> Vec<Action> {
        if button != Button::Primary || !self.input.is_idle() {
            return Vec::new();
        }

        let Some(hit) = self.hit_at(pt) else {
            return self.set_selection(Selection::None);
        };

        if modifiers.shift && self.ui.edit_mode == EditMode::Panel {
            if let (Target::Panel(id), HitPart::Body) = (hit.target, hit.part) {
                return self.toggle_swap_slot(id);
            }
        }

        match (hit.target, hit.part) {
            (Target::Panel(id), HitPart::DeleteHandle) => {
                vec![Action::PanelDeleteRequested { id, contained: contained(&self.scene, id) }]
            }
            (Target::Panel(id), HitPart::SplitHandle) => vec![Action::SplitRequested { id }],
            (Target::Character(id), HitPart::DeleteHandle) => self.delete_element(Target::Character(id)),
            (Target::Bubble(id), HitPart::DeleteHandle) => self.delete_element(Target::Bubble(id)),
            (target, part) => {
                let mut actions = self.set_selection(target.selection());
                self.begin_gesture(target, part, pt);
                if !self.input.is_idle() {
                    debug!(state = self.input.name(), ?target, "gesture start");
                }
                actions.push(Action::RenderNeeded);
                dedup_render(actions)
            }
        }
    }

    pub fn on_pointer_move(&mut self, pt: Point, _modifiers: Modifiers) -> Vec<Action> {
        if self.input.is_idle() {
            let hit = self.hit_at(pt);
            return vec![Action::SetCursor(cursor_for(hit.as_ref(), self.ui.edit_mode).to_owned())];
        }

        match apply_gesture(&self.input, pt, &self.scene, &self.config) {
            GestureOutcome::None => Vec::new(),
            GestureOutcome::Character(character) => {
                self.scene.update_character(character.clone());
                vec![Action::CharacterUpdated(character), Action::RenderNeeded]
            }
            GestureOutcome::Bubble(bubble) => {
                self.scene.update_bubble(bubble.clone());
                vec![Action::BubbleUpdated(bubble), Action::RenderNeeded]
            }
            GestureOutcome::Panel { panel, guides } => {
                self.scene.update_panel(panel.clone());
                self.ui.guides = guides;
                vec![Action::PanelUpdated(panel), Action::RenderNeeded]
            }
        }
    }

    pub fn on_pointer_up(&mut self, _pt: Point, _button: Button, _modifiers: Modifiers) -> Vec<Action> {
        if self.input.is_idle() {
            return Vec::new();
        }
        debug!(state = self.input.name(), "gesture end");
        self.input = InputState::Idle;
        self.ui.guides.clear();
        vec![Action::RenderNeeded]
    }

    /// Keyboard shortcuts. Escape clears the selection; it does not roll back
    /// a gesture in progress.
    pub fn on_key_down(&mut self, key: &Key, modifiers: Modifiers) -> Vec<Action> {
        match key.0.as_str() {
            "Escape" => {
                self.ui.swap_first = None;
                self.ui.swap_second = None;
                let mut actions = self.set_selection(Selection::None);
                actions.push(Action::RenderNeeded);
                dedup_render(actions)
            }
            "Delete" | "Backspace" => self.delete_selection(),
            "c" | "C" if modifiers.command() => {
                self.copy();
                Vec::new()
            }
            "v" | "V" if modifiers.command() => self.paste(),
            "d" | "D" if modifiers.command() => self.duplicate(),
            _ => Vec::new(),
        }
    }

    // --- Commands ---

    /// Remove a panel and everything it contains. The host calls this after
    /// confirming a [`Action::PanelDeleteRequested`].
    pub fn delete_panel(&mut self, id: PanelId) -> Vec<Action> {
        let before = self.scene.clone();
        if cascade_delete(&mut self.scene, id).is_none() {
            return Vec::new();
        }
        self.after_structural_change(&before)
    }

    /// Split a panel; a panel too small to split is left alone.
    pub fn split_panel(&mut self, id: PanelId, direction: SplitDirection) -> Vec<Action> {
        let before = self.scene.clone();
        if split_panel(&mut self.scene, id, direction, PANEL_SPLIT_GAP).is_none() {
            return Vec::new();
        }
        self.after_structural_change(&before)
    }

    /// Exchange the reading order of two panels.
    pub fn swap_panels(&mut self, a: PanelId, b: PanelId) -> Vec<Action> {
        let before = self.scene.clone();
        if !swap_panels(&mut self.scene, a, b) {
            return Vec::new();
        }
        // Selection follows the geometry, not the number.
        if let Selection::Panel(id) = self.ui.selection {
            if id == a {
                self.ui.selection = Selection::Panel(b);
            } else if id == b {
                self.ui.selection = Selection::Panel(a);
            }
        }
        let mut actions = vec![Action::PanelsReplaced(self.scene.panels.clone())];
        actions.extend(element_changes(&before, &self.scene));
        actions.push(Action::SelectionChanged(self.ui.selection));
        actions.push(Action::RenderNeeded);
        actions
    }

    /// Swap the two panels held in the swap slots, then empty the slots.
    pub fn swap_selected(&mut self) -> Vec<Action> {
        let (Some(a), Some(b)) = (self.ui.swap_first, self.ui.swap_second) else {
            return Vec::new();
        };
        self.ui.swap_first = None;
        self.ui.swap_second = None;
        self.swap_panels(a, b)
    }

    /// Copy the selection into the clipboard. Returns whether anything was copied.
    pub fn copy(&mut self) -> bool {
        self.clipboard.copy_selection(&self.scene, self.ui.selection)
    }

    pub fn paste(&mut self) -> Vec<Action> {
        let before = self.scene.clone();
        let Some(selection) = self.clipboard.paste(&mut self.scene, self.config.canvas) else {
            return Vec::new();
        };
        self.ui.selection = selection;
        self.after_structural_change(&before)
    }

    pub fn duplicate(&mut self) -> Vec<Action> {
        let before = self.scene.clone();
        let Some(selection) = duplicate_selection(&mut self.scene, self.ui.selection, self.config.canvas) else {
            return Vec::new();
        };
        self.ui.selection = selection;
        self.after_structural_change(&before)
    }

    // --- Queries ---

    /// The currently selected entity.
    #[must_use]
    pub fn selection(&self) -> Selection {
        self.ui.selection
    }

    #[must_use]
    pub fn edit_mode(&self) -> EditMode {
        self.ui.edit_mode
    }

    #[must_use]
    pub fn panel(&self, id: PanelId) -> Option<&Panel> {
        self.scene.panel(id)
    }

    #[must_use]
    pub fn character(&self, id: ElementId) -> Option<&Character> {
        self.scene.character(id)
    }

    #[must_use]
    pub fn bubble(&self, id: ElementId) -> Option<&SpeechBubble> {
        self.scene.bubble(id)
    }

    // --- Internals ---

    /// Pick with edit-mode adjustments: in panel-edit mode a background is
    /// transparent to clicks so the panel beneath it can be grabbed.
    fn hit_at(&self, pt: Point) -> Option<Hit> {
        let hit = pick_in(&self.scene, pt, self.ui.selection, self.ui.edit_mode)?;
        if self.ui.edit_mode == EditMode::Panel && matches!(hit.target, Target::Background(_)) {
            return pick(pt, &self.scene.panels, &[], &[], &[], Selection::None, self.ui.edit_mode);
        }
        Some(hit)
    }

    fn begin_gesture(&mut self, target: Target, part: HitPart, pt: Point) {
        self.input = match (target, part) {
            (Target::Character(id), HitPart::RotateHandle) => {
                let Some(character) = self.scene.character(id) else {
                    return;
                };
                let center = character.absolute_rect(&self.scene.frame_for(character.panel_id)).center();
                InputState::Rotating {
                    id,
                    center,
                    start_angle: angle_deg(center, pt),
                    orig_rotation: character.rotation,
                }
            }
            (Target::Character(id), HitPart::ResizeHandle(anchor)) => {
                let Some(character) = self.scene.character(id) else {
                    return;
                };
                InputState::ResizingElement {
                    target: ElementRef::Character(id),
                    anchor,
                    start_pointer: pt,
                    orig_rect: character.absolute_rect(&self.scene.frame_for(character.panel_id)),
                    rotation: character.rotation,
                }
            }
            (Target::Bubble(id), HitPart::ResizeHandle(anchor)) => {
                let Some(bubble) = self.scene.bubble(id) else {
                    return;
                };
                InputState::ResizingElement {
                    target: ElementRef::Bubble(id),
                    anchor,
                    start_pointer: pt,
                    orig_rect: bubble.absolute_rect(&self.scene.frame_for(bubble.panel_id)),
                    rotation: 0.0,
                }
            }
            (Target::Character(id), HitPart::Body) => {
                let Some(character) = self.scene.character(id) else {
                    return;
                };
                InputState::DraggingElement {
                    target: ElementRef::Character(id),
                    start_pointer: pt,
                    orig_anchor: character.absolute_anchor(&self.scene.frame_for(character.panel_id)),
                }
            }
            (Target::Bubble(id), HitPart::Body) => {
                let Some(bubble) = self.scene.bubble(id) else {
                    return;
                };
                InputState::DraggingElement {
                    target: ElementRef::Bubble(id),
                    start_pointer: pt,
                    orig_anchor: bubble.absolute_anchor(&self.scene.frame_for(bubble.panel_id)),
                }
            }
            (Target::Panel(id), HitPart::MoveHandle) => self.panel_move(id, pt),
            (Target::Panel(id), HitPart::Body) if self.ui.edit_mode == EditMode::Panel => self.panel_move(id, pt),
            (Target::Panel(id), HitPart::ResizeHandle(anchor)) => {
                let Some(panel) = self.scene.panel(id) else {
                    return;
                };
                InputState::ResizingPanel { id, anchor, start_pointer: pt, orig_rect: panel.rect() }
            }
            _ => InputState::Idle,
        };
    }

    fn panel_move(&self, id: PanelId, pt: Point) -> InputState {
        match self.scene.panel(id) {
            Some(panel) => InputState::MovingPanel { id, start_pointer: pt, orig_rect: panel.rect() },
            None => InputState::Idle,
        }
    }

    fn set_selection(&mut self, selection: Selection) -> Vec<Action> {
        if self.ui.selection == selection {
            return Vec::new();
        }
        self.ui.selection = selection;
        vec![Action::SelectionChanged(selection), Action::RenderNeeded]
    }

    fn toggle_swap_slot(&mut self, id: PanelId) -> Vec<Action> {
        if self.ui.swap_first == Some(id) {
            self.ui.swap_first = self.ui.swap_second.take();
        } else if self.ui.swap_second == Some(id) {
            self.ui.swap_second = None;
        } else if self.ui.swap_first.is_none() {
            self.ui.swap_first = Some(id);
        } else {
            self.ui.swap_second = Some(id);
        }
        vec![Action::RenderNeeded]
    }

    fn delete_selection(&mut self) -> Vec<Action> {
        match self.ui.selection {
            Selection::None => Vec::new(),
            Selection::Panel(id) => vec![Action::PanelDeleteRequested { id, contained: contained(&self.scene, id) }],
            Selection::Character(id) => self.delete_element(Target::Character(id)),
            Selection::Bubble(id) => self.delete_element(Target::Bubble(id)),
            Selection::Background(id) => self.delete_element(Target::Background(id)),
        }
    }

    fn delete_element(&mut self, target: Target) -> Vec<Action> {
        let before = self.scene.clone();
        match target {
            Target::Character(id) => self.scene.remove_character(id),
            Target::Bubble(id) => self.scene.remove_bubble(id),
            Target::Background(id) => self.scene.remove_background(id),
            Target::Panel(_) => return Vec::new(),
        }
        self.after_structural_change(&before)
    }

    /// Drop dangling selection and swap slots, then report every entity that
    /// differs from `before`.
    fn after_structural_change(&mut self, before: &Scene) -> Vec<Action> {
        let mut actions = panel_changes(before, &self.scene);
        actions.extend(element_changes(before, &self.scene));

        if !self.scene.contains(self.ui.selection) {
            self.ui.selection = Selection::None;
        }
        self.ui.swap_first = self.ui.swap_first.filter(|id| self.scene.panel(*id).is_some());
        self.ui.swap_second = self.ui.swap_second.filter(|id| self.scene.panel(*id).is_some());

        actions.push(Action::SelectionChanged(self.ui.selection));
        actions.push(Action::RenderNeeded);
        actions
    }
}

// =============================================================
// Change reporting
// =============================================================

fn diff<T, C, U, D>(before: &[T], after: &[T], created: C, updated: U, deleted: D) -> Vec<Action>
where
    T: Entity + PartialEq,
    C: Fn(T) -> Action,
    U: Fn(T) -> Action,
    D: Fn(T::Id) -> Action,
{
    let mut out = Vec::new();
    for item in after {
        match before.iter().find(|b| b.id() == item.id()) {
            None => out.push(created(item.clone())),
            Some(old) if old != item => out.push(updated(item.clone())),
            Some(_) => {}
        }
    }
    for old in before {
        if !after.iter().any(|a| a.id() == old.id()) {
            out.push(deleted(old.id()));
        }
    }
    out
}

fn panel_changes(before: &Scene, after: &Scene) -> Vec<Action> {
    diff(&before.panels, &after.panels, Action::PanelCreated, Action::PanelUpdated, |id| {
        Action::ElementDeleted(Target::Panel(id))
    })
}

fn element_changes(before: &Scene, after: &Scene) -> Vec<Action> {
    let mut out = diff(&before.characters, &after.characters, Action::CharacterCreated, Action::CharacterUpdated, |id| {
        Action::ElementDeleted(Target::Character(id))
    });
    out.extend(diff(&before.bubbles, &after.bubbles, Action::BubbleCreated, Action::BubbleUpdated, |id| {
        Action::ElementDeleted(Target::Bubble(id))
    }));
    out.extend(diff(
        &before.backgrounds,
        &after.backgrounds,
        Action::BackgroundCreated,
        Action::BackgroundUpdated,
        |id| Action::ElementDeleted(Target::Background(id)),
    ));
    out
}

/// Keep only the first `RenderNeeded`.
fn dedup_render(actions: Vec<Action>) -> Vec<Action> {
    let mut seen = false;
    actions
        .into_iter()
        .filter(|a| {
            if *a == Action::RenderNeeded {
                if seen {
                    return false;
                }
                seen = true;
            }
            true
        })
        .collect()
}

/// The full canvas engine. Wraps `EngineCore` and owns the browser canvas element.
pub struct Engine {
    canvas: HtmlCanvasElement,
    pub core: EngineCore,
}

impl Engine {
    /// Create a new engine bound to the given canvas element.
    #[must_use]
    pub fn new(canvas: HtmlCanvasElement, config: EditorConfig) -> Self {
        Self { canvas, core: EngineCore::new(config) }
    }

    // --- Delegated inputs ---

    pub fn load_scene(&mut self, scene: Scene) {
        self.core.load_scene(scene);
    }

    pub fn set_edit_mode(&mut self, mode: EditMode) -> Vec<Action> {
        self.core.set_edit_mode(mode)
    }

    pub fn on_pointer_down(&mut self, pt: Point, button: Button, modifiers: Modifiers) -> Vec<Action> {
        self.core.on_pointer_down(pt, button, modifiers)
    }

    pub fn on_pointer_move(&mut self, pt: Point, modifiers: Modifiers) -> Vec<Action> {
        self.core.on_pointer_move(pt, modifiers)
    }

    pub fn on_pointer_up(&mut self, pt: Point, button: Button, modifiers: Modifiers) -> Vec<Action> {
        self.core.on_pointer_up(pt, button, modifiers)
    }

    pub fn on_key_down(&mut self, key: &Key, modifiers: Modifiers) -> Vec<Action> {
        self.core.on_key_down(key, modifiers)
    }

    pub fn delete_panel(&mut self, id: PanelId) -> Vec<Action> {
        self.core.delete_panel(id)
    }

    pub fn split_panel(&mut self, id: PanelId, direction: SplitDirection) -> Vec<Action> {
        self.core.split_panel(id, direction)
    }

    // --- Render ---

    /// Draw the current state to the canvas.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the 2D context is unavailable or a drawing call fails.
    pub fn render(&self) -> Result<(), SurfaceError> {
        let ctx = self
            .canvas
            .get_context("2d")?
            .ok_or_else(|| SurfaceError("2d context unavailable".to_owned()))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| SurfaceError("context is not a CanvasRenderingContext2d".to_owned()))?;
        render::composite(&ctx, &self.core.scene, &self.core.ui, &self.core.config)
    }

    // --- Delegated queries ---

    #[must_use]
    pub fn selection(&self) -> Selection {
        self.core.selection()
    }
}
