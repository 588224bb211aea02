//! Input model: edit mode, modifier keys, mouse buttons, and the gesture state machine.
//!
//! `UiState` is the persistent interaction state the renderer reads (selection,
//! edit mode, swap slots, live snap guides). `InputState` is the active
//! gesture tracked between pointer-down and pointer-up; each variant carries
//! the snapshot taken at pointer-down so every move is computed from the
//! gesture's start rather than from the previous frame.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use crate::doc::{ElementId, PanelId, Selection};
use crate::geom::{Point, Rect};
use crate::hit::ResizeAnchor;
use crate::snap::GuideLine;

/// Which layer the select tool manipulates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditMode {
    /// Characters and bubbles are draggable; panels can only be selected.
    #[default]
    Element,
    /// Panels show their handles and can be moved, resized, split, deleted.
    Panel,
}

/// Keyboard/mouse modifier keys held during an event.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, Default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    /// Ctrl on most platforms, Command on macOS.
    #[must_use]
    pub fn command(self) -> bool {
        self.ctrl || self.meta
    }
}

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    /// Left mouse button (or single-finger tap).
    Primary,
    Middle,
    Secondary,
}

/// A keyboard key as reported by the browser (e.g. `"Delete"`, `"Escape"`, `"c"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key(pub String);

/// A draggable page element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementRef {
    Character(ElementId),
    Bubble(ElementId),
}

impl ElementRef {
    #[must_use]
    pub fn selection(self) -> Selection {
        match self {
            Self::Character(id) => Selection::Character(id),
            Self::Bubble(id) => Selection::Bubble(id),
        }
    }
}

/// Persistent UI state visible to the renderer.
#[derive(Debug, Clone, Default)]
pub struct UiState {
    pub selection: Selection,
    pub edit_mode: EditMode,
    /// First panel picked for a swap gesture.
    pub swap_first: Option<PanelId>,
    /// Second panel picked for a swap gesture.
    pub swap_second: Option<PanelId>,
    /// Snap guides for the panel currently being moved.
    pub guides: Vec<GuideLine>,
}

/// Internal state for the input state machine.
#[derive(Debug, Clone, Default)]
pub enum InputState {
    /// No gesture in progress; waiting for the next pointer-down.
    #[default]
    Idle,
    /// A character or bubble is being translated.
    DraggingElement {
        target: ElementRef,
        start_pointer: Point,
        /// Absolute anchor (center or top-left) at pointer-down.
        orig_anchor: Point,
    },
    /// A character or bubble is being resized from one of its eight handles.
    ResizingElement {
        target: ElementRef,
        anchor: ResizeAnchor,
        start_pointer: Point,
        /// Absolute, unrotated bounds at pointer-down.
        orig_rect: Rect,
        /// Element rotation at pointer-down; deltas are resolved in its local frame.
        rotation: f64,
    },
    /// A character is being rotated around its center.
    Rotating {
        id: ElementId,
        center: Point,
        /// Pointer angle around `center` at pointer-down.
        start_angle: f64,
        orig_rotation: f64,
    },
    /// A panel is being dragged.
    MovingPanel { id: PanelId, start_pointer: Point, orig_rect: Rect },
    /// A panel is being resized from one of its eight handles.
    ResizingPanel { id: PanelId, anchor: ResizeAnchor, start_pointer: Point, orig_rect: Rect },
}

impl InputState {
    #[must_use]
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    /// Short state name for logs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::DraggingElement { .. } => "dragging_element",
            Self::ResizingElement { .. } => "resizing_element",
            Self::Rotating { .. } => "rotating",
            Self::MovingPanel { .. } => "moving_panel",
            Self::ResizingPanel { .. } => "resizing_panel",
        }
    }
}
