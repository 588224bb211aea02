//! Hit-testing: which handle, element, or panel lies under a pointer.
//!
//! Picking runs in a fixed order and the first match short-circuits:
//!
//! 1. handles of the current selection,
//! 2. speech bubbles, topmost (last) first,
//! 3. characters, topmost first, rotation-aware,
//! 4. backgrounds, topmost first,
//! 5. panels in ascending id order.

#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use crate::consts::{
    CORNER_HANDLE_INSET_PX, ELEMENT_DELETE_OFFSET_PX, HANDLE_HALF_PX, HANDLE_SLOP_PX, ROTATE_HANDLE_OFFSET_PX,
};
use crate::doc::{
    BackgroundElement, Character, ElementId, Panel, PanelId, Scene, Selection, SpeechBubble, backgrounds_in_paint_order,
    find_panel, resolve_frame,
};
use crate::geom::{Placement, Point, Rect, contains_rotated, rotate_point};
use crate::input::EditMode;

/// Which part of an entity was hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitPart {
    Body,
    ResizeHandle(ResizeAnchor),
    RotateHandle,
    MoveHandle,
    DeleteHandle,
    SplitHandle,
}

/// Anchor position for resize handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeAnchor {
    N,
    Ne,
    E,
    Se,
    S,
    Sw,
    W,
    Nw,
}

impl ResizeAnchor {
    /// All anchors in handle-layout order, clockwise from north.
    pub const ALL: [Self; 8] = [Self::N, Self::Ne, Self::E, Self::Se, Self::S, Self::Sw, Self::W, Self::Nw];

    /// Whether dragging this handle moves the left edge.
    #[must_use]
    pub fn moves_left(self) -> bool {
        matches!(self, Self::W | Self::Nw | Self::Sw)
    }

    #[must_use]
    pub fn moves_right(self) -> bool {
        matches!(self, Self::E | Self::Ne | Self::Se)
    }

    #[must_use]
    pub fn moves_top(self) -> bool {
        matches!(self, Self::N | Self::Ne | Self::Nw)
    }

    #[must_use]
    pub fn moves_bottom(self) -> bool {
        matches!(self, Self::S | Self::Se | Self::Sw)
    }

    /// CSS resize cursor for this handle.
    #[must_use]
    pub fn cursor(self) -> &'static str {
        match self {
            Self::N => "n-resize",
            Self::Ne => "ne-resize",
            Self::E => "e-resize",
            Self::Se => "se-resize",
            Self::S => "s-resize",
            Self::Sw => "sw-resize",
            Self::W => "w-resize",
            Self::Nw => "nw-resize",
        }
    }
}

/// The entity a hit landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Panel(PanelId),
    Character(ElementId),
    Bubble(ElementId),
    Background(ElementId),
}

impl Target {
    #[must_use]
    pub fn selection(self) -> Selection {
        match self {
            Self::Panel(id) => Selection::Panel(id),
            Self::Character(id) => Selection::Character(id),
            Self::Bubble(id) => Selection::Bubble(id),
            Self::Background(id) => Selection::Background(id),
        }
    }
}

/// Result of a hit test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hit {
    pub target: Target,
    pub part: HitPart,
}

/// A visible interaction handle and its center in canvas pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Handle {
    pub part: HitPart,
    pub center: Point,
}

// =============================================================
// Handle layout
// =============================================================

/// Resize handle centers for a rectangle rotated around its center, in
/// [`ResizeAnchor::ALL`] order.
#[must_use]
pub fn resize_handle_positions(rect: &Rect, rotation: f64) -> [Point; 8] {
    let c = rect.center();
    let local = [
        Point::new(c.x, rect.y),
        Point::new(rect.right(), rect.y),
        Point::new(rect.right(), c.y),
        Point::new(rect.right(), rect.bottom()),
        Point::new(c.x, rect.bottom()),
        Point::new(rect.x, rect.bottom()),
        Point::new(rect.x, c.y),
        Point::new(rect.x, rect.y),
    ];
    local.map(|p| rotate_point(p, c, rotation))
}

/// Rotate handle center: a fixed distance above top-center, rotated with the box.
#[must_use]
pub fn rotate_handle_position(rect: &Rect, rotation: f64) -> Point {
    let c = rect.center();
    rotate_point(Point::new(c.x, rect.y - ROTATE_HANDLE_OFFSET_PX), c, rotation)
}

fn element_delete_position(rect: &Rect, rotation: f64) -> Point {
    let p = Point::new(rect.right() + ELEMENT_DELETE_OFFSET_PX, rect.y - ELEMENT_DELETE_OFFSET_PX);
    rotate_point(p, rect.center(), rotation)
}

fn resize_handles(rect: &Rect, rotation: f64) -> impl Iterator<Item = Handle> {
    ResizeAnchor::ALL
        .into_iter()
        .zip(resize_handle_positions(rect, rotation))
        .map(|(anchor, center)| Handle { part: HitPart::ResizeHandle(anchor), center })
}

/// Handles shown for a character at `rect` (absolute, unrotated).
#[must_use]
pub fn character_handles(rect: &Rect, rotation: f64) -> Vec<Handle> {
    let mut out = vec![Handle { part: HitPart::RotateHandle, center: rotate_handle_position(rect, rotation) }];
    out.extend(resize_handles(rect, rotation));
    out.push(Handle { part: HitPart::DeleteHandle, center: element_delete_position(rect, rotation) });
    out
}

#[must_use]
pub fn bubble_handles(rect: &Rect) -> Vec<Handle> {
    let mut out: Vec<Handle> = resize_handles(rect, 0.0).collect();
    out.push(Handle { part: HitPart::DeleteHandle, center: element_delete_position(rect, 0.0) });
    out
}

#[must_use]
pub fn panel_handles(rect: &Rect) -> Vec<Handle> {
    let mut out: Vec<Handle> = resize_handles(rect, 0.0).collect();
    out.push(Handle { part: HitPart::MoveHandle, center: rect.center() });
    out.push(Handle {
        part: HitPart::DeleteHandle,
        center: Point::new(rect.right() - CORNER_HANDLE_INSET_PX, rect.y + CORNER_HANDLE_INSET_PX),
    });
    out.push(Handle {
        part: HitPart::SplitHandle,
        center: Point::new(rect.x + CORNER_HANDLE_INSET_PX, rect.y + CORNER_HANDLE_INSET_PX),
    });
    out
}

/// Handles visible for the current selection. Panels only expose handles in
/// panel-edit mode; backgrounds never do.
#[must_use]
pub fn selection_handles(
    selection: Selection,
    panels: &[Panel],
    characters: &[Character],
    bubbles: &[SpeechBubble],
    mode: EditMode,
) -> Vec<Handle> {
    match selection {
        Selection::None | Selection::Background(_) => Vec::new(),
        Selection::Panel(id) => match (mode, find_panel(panels, id)) {
            (EditMode::Panel, Some(panel)) => panel_handles(&panel.rect()),
            _ => Vec::new(),
        },
        Selection::Character(id) => characters.iter().find(|c| c.id == id).map_or_else(Vec::new, |c| {
            let rect = c.absolute_rect(&resolve_frame(panels, c.panel_id));
            character_handles(&rect, c.rotation)
        }),
        Selection::Bubble(id) => bubbles.iter().find(|b| b.id == id).map_or_else(Vec::new, |b| {
            bubble_handles(&b.absolute_rect(&resolve_frame(panels, b.panel_id)))
        }),
    }
}

/// Whether `p` falls within a handle's hit box (visual size plus slop).
#[must_use]
pub fn handle_contains(handle: &Handle, p: Point) -> bool {
    let r = HANDLE_HALF_PX + HANDLE_SLOP_PX;
    (p.x - handle.center.x).abs() <= r && (p.y - handle.center.y).abs() <= r
}

// =============================================================
// Picking
// =============================================================

/// Return the topmost interactive target under `point`.
#[must_use]
pub fn pick(
    point: Point,
    panels: &[Panel],
    characters: &[Character],
    bubbles: &[SpeechBubble],
    backgrounds: &[BackgroundElement],
    selection: Selection,
    mode: EditMode,
) -> Option<Hit> {
    if let Some(target) = selection_target(selection) {
        let handles = selection_handles(selection, panels, characters, bubbles, mode);
        if let Some(handle) = handles.iter().find(|h| handle_contains(h, point)) {
            return Some(Hit { target, part: handle.part });
        }
    }

    for bubble in bubbles.iter().rev() {
        let rect = bubble.absolute_rect(&resolve_frame(panels, bubble.panel_id));
        if rect.contains(point) {
            return Some(Hit { target: Target::Bubble(bubble.id), part: HitPart::Body });
        }
    }

    for character in characters.iter().rev() {
        let rect = character.absolute_rect(&resolve_frame(panels, character.panel_id));
        if contains_rotated(&rect, character.rotation, point) {
            return Some(Hit { target: Target::Character(character.id), part: HitPart::Body });
        }
    }

    for (panel, bg) in backgrounds_in_paint_order(panels, backgrounds).into_iter().rev() {
        let rect = bg.absolute_rect(&panel.rect());
        if contains_rotated(&rect, bg.rotation, point) {
            return Some(Hit { target: Target::Background(bg.id), part: HitPart::Body });
        }
    }

    let mut sorted: Vec<&Panel> = panels.iter().collect();
    sorted.sort_by_key(|p| p.id);
    sorted
        .into_iter()
        .find(|p| p.rect().contains(point))
        .map(|p| Hit { target: Target::Panel(p.id), part: HitPart::Body })
}

/// [`pick`] over a whole scene.
#[must_use]
pub fn pick_in(scene: &Scene, point: Point, selection: Selection, mode: EditMode) -> Option<Hit> {
    pick(point, &scene.panels, &scene.characters, &scene.bubbles, &scene.backgrounds, selection, mode)
}

fn selection_target(selection: Selection) -> Option<Target> {
    match selection {
        Selection::None => None,
        Selection::Panel(id) => Some(Target::Panel(id)),
        Selection::Character(id) => Some(Target::Character(id)),
        Selection::Bubble(id) => Some(Target::Bubble(id)),
        Selection::Background(id) => Some(Target::Background(id)),
    }
}

/// CSS cursor to show while hovering `hit`.
#[must_use]
pub fn cursor_for(hit: Option<&Hit>, mode: EditMode) -> &'static str {
    let Some(hit) = hit else {
        return "default";
    };
    match (hit.part, hit.target) {
        (HitPart::ResizeHandle(anchor), _) => anchor.cursor(),
        (HitPart::RotateHandle, _) => "grab",
        (HitPart::MoveHandle, _) => "move",
        (HitPart::DeleteHandle | HitPart::SplitHandle, _) => "pointer",
        (HitPart::Body, Target::Character(_) | Target::Bubble(_)) => "move",
        (HitPart::Body, Target::Panel(_)) if mode == EditMode::Panel => "move",
        (HitPart::Body, _) => "default",
    }
}
