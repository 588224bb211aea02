//! Gesture math: turns the active [`InputState`] plus the current pointer into
//! an updated entity.
//!
//! Every computation starts from the snapshot captured at pointer-down and the
//! total pointer delta since then, never from the previous frame, so a long
//! drag cannot accumulate drift. Size floors are applied by clamping before the
//! anchored edge is recomputed; a gesture is never rejected.

#[cfg(test)]
#[path = "gesture_test.rs"]
mod gesture_test;

use crate::config::EditorConfig;
use crate::consts::{
    CHARACTER_BASE_WIDTH, MIN_BUBBLE_HEIGHT, MIN_BUBBLE_WIDTH, MIN_CHARACTER_HEIGHT, MIN_CHARACTER_WIDTH,
    MIN_PANEL_SIZE, PANEL_RESIZE_DAMPING,
};
use crate::doc::{Character, Panel, Scene, SpeechBubble};
use crate::geom::{Placement, Point, Rect, Size, angle_deg, normalize_degrees, rotate_point};
use crate::hit::ResizeAnchor;
use crate::input::{ElementRef, InputState};
use crate::snap::{GuideLine, snap};

/// The entity produced by one pointer-move of the active gesture.
#[derive(Debug, Clone, PartialEq)]
pub enum GestureOutcome {
    /// No gesture, or its target no longer exists.
    None,
    Character(Character),
    Bubble(SpeechBubble),
    Panel { panel: Panel, guides: Vec<GuideLine> },
}

/// Resize `orig` by dragging `anchor` by `(dx, dy)`, keeping the opposite
/// edge(s) fixed and flooring the size at `min`.
#[must_use]
pub fn resize_rect(orig: &Rect, anchor: ResizeAnchor, dx: f64, dy: f64, min: Size) -> Rect {
    let mut out = *orig;

    if anchor.moves_right() {
        out.width = (orig.width + dx).max(min.width);
    } else if anchor.moves_left() {
        out.width = (orig.width - dx).max(min.width);
        out.x = orig.right() - out.width;
    }

    if anchor.moves_bottom() {
        out.height = (orig.height + dy).max(min.height);
    } else if anchor.moves_top() {
        out.height = (orig.height - dy).max(min.height);
        out.y = orig.bottom() - out.height;
    }

    out
}

/// [`resize_rect`] for a box rotated by `rotation` degrees around its center.
///
/// The pointer delta is taken into the box's local frame, the local box is
/// resized, and the center shift is rotated back so the anchored edge stays
/// put on screen. Returns the new unrotated bounds.
#[must_use]
pub fn resize_rotated(orig: &Rect, rotation: f64, anchor: ResizeAnchor, delta: Point, min: Size) -> Rect {
    if normalize_degrees(rotation) == 0.0 {
        return resize_rect(orig, anchor, delta.x, delta.y, min);
    }
    let origin = Point::default();
    let local_delta = rotate_point(delta, origin, -rotation);
    let local = resize_rect(orig, anchor, local_delta.x, local_delta.y, min);

    let shift = local.center().delta_from(orig.center());
    let world_shift = rotate_point(shift, origin, rotation);
    let center = orig.center().offset(world_shift.x, world_shift.y);
    Rect::from_center(center, local.size())
}

/// Keep `p` inside `frame` (used for panel-relative anchors, whose fractions live in `[0, 1]`).
fn clamp_into(p: Point, frame: &Rect) -> Point {
    Point::new(p.x.clamp(frame.x, frame.right()), p.y.clamp(frame.y, frame.bottom()))
}

/// Compute the entity the active gesture produces for `pointer`.
#[must_use]
pub fn apply_gesture(state: &InputState, pointer: Point, scene: &Scene, config: &EditorConfig) -> GestureOutcome {
    match *state {
        InputState::Idle => GestureOutcome::None,
        InputState::DraggingElement { target, start_pointer, orig_anchor } => {
            let delta = pointer.delta_from(start_pointer);
            drag_element(scene, target, orig_anchor.offset(delta.x, delta.y))
        }
        InputState::ResizingElement { target, anchor, start_pointer, orig_rect, rotation } => {
            let delta = pointer.delta_from(start_pointer);
            resize_element(scene, target, anchor, &orig_rect, rotation, delta)
        }
        InputState::Rotating { id, center, start_angle, orig_rotation } => {
            let Some(character) = scene.character(id) else {
                return GestureOutcome::None;
            };
            let current = angle_deg(center, pointer);
            let mut out = character.clone();
            out.set_rotation(orig_rotation + (current - start_angle));
            GestureOutcome::Character(out)
        }
        InputState::MovingPanel { id, start_pointer, orig_rect } => {
            let Some(panel) = scene.panel(id) else {
                return GestureOutcome::None;
            };
            let delta = pointer.delta_from(start_pointer);
            let mut proposed = panel.clone();
            let moved = orig_rect.translated(delta.x, delta.y);
            proposed.x = moved.x;
            proposed.y = moved.y;
            let result = snap(&proposed, &scene.panels, &config.snap, config.canvas);
            GestureOutcome::Panel { panel: result.panel, guides: result.guides }
        }
        InputState::ResizingPanel { id, anchor, start_pointer, orig_rect } => {
            let Some(panel) = scene.panel(id) else {
                return GestureOutcome::None;
            };
            let delta = pointer.delta_from(start_pointer);
            let rect = resize_rect(
                &orig_rect,
                anchor,
                delta.x * PANEL_RESIZE_DAMPING,
                delta.y * PANEL_RESIZE_DAMPING,
                Size::new(MIN_PANEL_SIZE, MIN_PANEL_SIZE),
            );
            let mut out = panel.clone();
            out.set_rect(rect);
            GestureOutcome::Panel { panel: out, guides: Vec::new() }
        }
    }
}

fn drag_element(scene: &Scene, target: ElementRef, anchor: Point) -> GestureOutcome {
    match target {
        ElementRef::Character(id) => {
            let Some(character) = scene.character(id) else {
                return GestureOutcome::None;
            };
            let frame = scene.frame_for(character.panel_id);
            let anchor = if character.is_global_position { anchor } else { clamp_into(anchor, &frame) };
            let mut out = character.clone();
            out.set_absolute_anchor(anchor, &frame);
            GestureOutcome::Character(out)
        }
        ElementRef::Bubble(id) => {
            let Some(bubble) = scene.bubble(id) else {
                return GestureOutcome::None;
            };
            let frame = scene.frame_for(bubble.panel_id);
            let anchor = if bubble.is_global_position { anchor } else { clamp_into(anchor, &frame) };
            let mut out = bubble.clone();
            out.set_absolute_anchor(anchor, &frame);
            GestureOutcome::Bubble(out)
        }
    }
}

fn resize_element(
    scene: &Scene,
    target: ElementRef,
    anchor: ResizeAnchor,
    orig_rect: &Rect,
    rotation: f64,
    delta: Point,
) -> GestureOutcome {
    match target {
        ElementRef::Character(id) => {
            let Some(character) = scene.character(id) else {
                return GestureOutcome::None;
            };
            let min = Size::new(MIN_CHARACTER_WIDTH, MIN_CHARACTER_HEIGHT);
            let rect = resize_rotated(orig_rect, rotation, anchor, delta, min);
            let frame = scene.frame_for(character.panel_id);
            let mut out = character.clone();
            out.width = Some(rect.width);
            out.height = Some(rect.height);
            out.set_scale(rect.width / CHARACTER_BASE_WIDTH);
            out.set_absolute_anchor(rect.center(), &frame);
            GestureOutcome::Character(out)
        }
        ElementRef::Bubble(id) => {
            let Some(bubble) = scene.bubble(id) else {
                return GestureOutcome::None;
            };
            let min = Size::new(MIN_BUBBLE_WIDTH, MIN_BUBBLE_HEIGHT);
            let rect = resize_rect(orig_rect, anchor, delta.x, delta.y, min);
            let frame = scene.frame_for(bubble.panel_id);
            let mut out = bubble.clone();
            out.set_absolute_rect(rect, &frame);
            GestureOutcome::Bubble(out)
        }
    }
}
