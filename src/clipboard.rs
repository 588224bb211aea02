//! Copy, paste, and duplicate.
//!
//! The clipboard is a single slot overwritten on every copy. Duplicating a
//! panel carries along everything anchored inside it; duplicating a single
//! element nudges the clone by a fixed offset that flips direction when it
//! would leave the page.

#[cfg(test)]
#[path = "clipboard_test.rs"]
mod clipboard_test;

use tracing::info;
use uuid::Uuid;

use crate::cascade::contained_ids;
use crate::consts::{ELEMENT_DUPLICATE_OFFSET, PANEL_DUPLICATE_GAP};
use crate::doc::{BackgroundElement, Character, ElementId, Panel, PanelId, Scene, Selection, SpeechBubble};
use crate::geom::{Placement, Point, Rect, Size};

/// A copied entity.
#[derive(Debug, Clone, PartialEq)]
pub enum ClipboardEntry {
    Panel(Panel),
    Character(Character),
    Bubble(SpeechBubble),
    Background(BackgroundElement),
}

/// Single-slot clipboard.
#[derive(Debug, Clone, Default)]
pub struct Clipboard {
    entry: Option<ClipboardEntry>,
}

impl Clipboard {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite the slot.
    pub fn copy(&mut self, entry: ClipboardEntry) {
        self.entry = Some(entry);
    }

    /// Copy whatever `selection` points at. Returns `false` when nothing was
    /// selected or the selection is stale; the slot is then left as it was.
    pub fn copy_selection(&mut self, scene: &Scene, selection: Selection) -> bool {
        let entry = match selection {
            Selection::None => None,
            Selection::Panel(id) => scene.panel(id).cloned().map(ClipboardEntry::Panel),
            Selection::Character(id) => scene.character(id).cloned().map(ClipboardEntry::Character),
            Selection::Bubble(id) => scene.bubble(id).cloned().map(ClipboardEntry::Bubble),
            Selection::Background(id) => scene.background(id).cloned().map(ClipboardEntry::Background),
        };
        match entry {
            Some(entry) => {
                self.copy(entry);
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn entry(&self) -> Option<&ClipboardEntry> {
        self.entry.as_ref()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entry.is_none()
    }

    /// Insert a fresh clone of the slot into `scene` and return its selection.
    /// An empty clipboard is a silent no-op.
    pub fn paste(&self, scene: &mut Scene, canvas: Size) -> Option<Selection> {
        match self.entry.as_ref()? {
            ClipboardEntry::Panel(panel) => {
                let mut out = panel.clone();
                out.id = scene.next_panel_id();
                out.set_rect(duplicate_panel_rect(&panel.rect(), canvas));
                let id = out.id;
                scene.add_panel(out);
                Some(Selection::Panel(id))
            }
            ClipboardEntry::Character(character) => {
                let out = offset_character(scene, character, canvas);
                let id = out.id;
                scene.add_character(out);
                Some(Selection::Character(id))
            }
            ClipboardEntry::Bubble(bubble) => {
                let out = offset_bubble(scene, bubble, canvas);
                let id = out.id;
                scene.add_bubble(out);
                Some(Selection::Bubble(id))
            }
            ClipboardEntry::Background(background) => {
                let mut out = background.clone();
                out.id = Uuid::new_v4();
                out.z_index = top_z_index(scene, out.panel_id);
                let id = out.id;
                scene.add_background(out);
                Some(Selection::Background(id))
            }
        }
    }
}

// =============================================================
// Placement
// =============================================================

/// Where a duplicate of the panel at `rect` goes: to the right, else below,
/// else to the left (taken even if it does not fit).
#[must_use]
pub fn duplicate_panel_rect(rect: &Rect, canvas: Size) -> Rect {
    let right = rect.translated(rect.width + PANEL_DUPLICATE_GAP, 0.0);
    if right.right() <= canvas.width {
        return right;
    }
    let below = rect.translated(0.0, rect.height + PANEL_DUPLICATE_GAP);
    if below.bottom() <= canvas.height {
        return below;
    }
    rect.translated(-(rect.width + PANEL_DUPLICATE_GAP), 0.0)
}

/// Offset for a duplicated element occupying `rect`: down-right, mirrored per
/// axis when that would cross the page edge.
#[must_use]
pub fn element_offset(rect: &Rect, canvas: Size) -> Point {
    let d = ELEMENT_DUPLICATE_OFFSET;
    let dx = if rect.right() + d > canvas.width { -d } else { d };
    let dy = if rect.bottom() + d > canvas.height { -d } else { d };
    Point::new(dx, dy)
}

fn offset_character(scene: &Scene, character: &Character, canvas: Size) -> Character {
    let frame = scene.frame_for(character.panel_id);
    let rect = character.absolute_rect(&frame);
    let offset = element_offset(&rect, canvas);
    let mut out = character.clone();
    out.id = Uuid::new_v4();
    out.set_absolute_anchor(rect.center().offset(offset.x, offset.y), &frame);
    out
}

fn offset_bubble(scene: &Scene, bubble: &SpeechBubble, canvas: Size) -> SpeechBubble {
    let frame = scene.frame_for(bubble.panel_id);
    let rect = bubble.absolute_rect(&frame);
    let offset = element_offset(&rect, canvas);
    let mut out = bubble.clone();
    out.id = Uuid::new_v4();
    out.set_absolute_anchor(rect.top_left().offset(offset.x, offset.y), &frame);
    out
}

fn top_z_index(scene: &Scene, panel_id: PanelId) -> i32 {
    scene.backgrounds_for(panel_id).last().map_or(0, |b| b.z_index.saturating_add(1))
}

// =============================================================
// Duplicate
// =============================================================

/// Duplicate panel `id` with everything inside it. Returns the new panel id,
/// or `None` for an unknown panel.
pub fn duplicate_panel(scene: &mut Scene, id: PanelId, canvas: Size) -> Option<PanelId> {
    let original = scene.panel(id)?.clone();
    let bounds = original.rect();
    let placed = duplicate_panel_rect(&bounds, canvas);
    let (dx, dy) = (placed.x - bounds.x, placed.y - bounds.y);
    let new_id = scene.next_panel_id();
    let ids = contained_ids(scene, id, &bounds);

    let mut characters = Vec::with_capacity(ids.characters.len());
    for cid in &ids.characters {
        if let Some(c) = scene.character(*cid) {
            let anchor = c.absolute_anchor(&scene.frame_for(c.panel_id));
            let mut out = c.clone();
            out.id = Uuid::new_v4();
            out.panel_id = new_id;
            out.set_absolute_anchor(anchor.offset(dx, dy), &placed);
            characters.push(out);
        }
    }

    let mut bubbles = Vec::with_capacity(ids.bubbles.len());
    for bid in &ids.bubbles {
        if let Some(b) = scene.bubble(*bid) {
            let rect = b.absolute_rect(&scene.frame_for(b.panel_id));
            let mut out = b.clone();
            out.id = Uuid::new_v4();
            out.panel_id = new_id;
            out.set_absolute_rect(rect.translated(dx, dy), &placed);
            bubbles.push(out);
        }
    }

    // Backgrounds are panel-relative; re-homing alone moves them.
    let backgrounds: Vec<BackgroundElement> = ids
        .backgrounds
        .iter()
        .filter_map(|gid| scene.background(*gid))
        .map(|g| BackgroundElement { id: Uuid::new_v4(), panel_id: new_id, ..g.clone() })
        .collect();

    let mut panel = original;
    panel.id = new_id;
    panel.set_rect(placed);
    scene.add_panel(panel);
    scene.characters = [scene.characters.as_slice(), characters.as_slice()].concat();
    scene.bubbles = [scene.bubbles.as_slice(), bubbles.as_slice()].concat();
    scene.backgrounds = [scene.backgrounds.as_slice(), backgrounds.as_slice()].concat();

    info!(
        panel_id = id,
        new_panel_id = new_id,
        characters = characters.len(),
        bubbles = bubbles.len(),
        backgrounds = backgrounds.len(),
        "duplicated panel"
    );
    Some(new_id)
}

/// Duplicate one character in place, nudged by the element offset.
pub fn duplicate_character(scene: &mut Scene, id: ElementId, canvas: Size) -> Option<ElementId> {
    let out = offset_character(scene, scene.character(id)?, canvas);
    let new_id = out.id;
    scene.add_character(out);
    Some(new_id)
}

/// Duplicate one speech bubble in place, nudged by the element offset.
pub fn duplicate_bubble(scene: &mut Scene, id: ElementId, canvas: Size) -> Option<ElementId> {
    let out = offset_bubble(scene, scene.bubble(id)?, canvas);
    let new_id = out.id;
    scene.add_bubble(out);
    Some(new_id)
}

/// Duplicate whatever `selection` points at. Backgrounds duplicate onto the
/// top of their panel's stack.
pub fn duplicate_selection(scene: &mut Scene, selection: Selection, canvas: Size) -> Option<Selection> {
    match selection {
        Selection::None => None,
        Selection::Panel(id) => duplicate_panel(scene, id, canvas).map(Selection::Panel),
        Selection::Character(id) => duplicate_character(scene, id, canvas).map(Selection::Character),
        Selection::Bubble(id) => duplicate_bubble(scene, id, canvas).map(Selection::Bubble),
        Selection::Background(id) => {
            let mut out = scene.background(id)?.clone();
            out.id = Uuid::new_v4();
            out.z_index = top_z_index(scene, out.panel_id);
            let new_id = out.id;
            scene.add_background(out);
            Some(Selection::Background(new_id))
        }
    }
}
