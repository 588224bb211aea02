//! Cascade delete: removing a panel together with everything inside it.
//!
//! Containment is spatial. A character or bubble belongs to the panel when its
//! anchor point (center for characters, top-left for bubbles), resolved to
//! canvas pixels, falls inside the panel rectangle. Backgrounds are always
//! panel-relative, so they go with the panel their `panel_id` names.
//!
//! Elements that name the deleted panel but are anchored outside it survive.
//! They move to the remaining panel under their anchor, or the first remaining
//! panel, keeping their on-screen position. On an emptied page they switch to
//! global coordinates instead.

#[cfg(test)]
#[path = "cascade_test.rs"]
mod cascade_test;

use tracing::info;

use crate::doc::{ElementId, Panel, PanelId, Scene};
use crate::geom::{Placement, Point, Rect};

/// What a cascade delete of one panel would remove besides the panel itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ContainedCounts {
    pub characters: usize,
    pub bubbles: usize,
    pub backgrounds: usize,
}

impl ContainedCounts {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.characters == 0 && self.bubbles == 0 && self.backgrounds == 0
    }
}

/// Ids of the elements a delete of panel `id` would take with it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContainedIds {
    pub characters: Vec<ElementId>,
    pub bubbles: Vec<ElementId>,
    pub backgrounds: Vec<ElementId>,
}

/// Collect the elements anchored inside `bounds` (characters and bubbles) or
/// owned by `panel_id` (backgrounds).
#[must_use]
pub fn contained_ids(scene: &Scene, panel_id: PanelId, bounds: &Rect) -> ContainedIds {
    let characters = scene
        .characters
        .iter()
        .filter(|c| bounds.contains(c.absolute_anchor(&scene.frame_for(c.panel_id))))
        .map(|c| c.id)
        .collect();
    let bubbles = scene
        .bubbles
        .iter()
        .filter(|b| bounds.contains(b.absolute_anchor(&scene.frame_for(b.panel_id))))
        .map(|b| b.id)
        .collect();
    let backgrounds = scene.backgrounds.iter().filter(|g| g.panel_id == panel_id).map(|g| g.id).collect();
    ContainedIds { characters, bubbles, backgrounds }
}

/// Counts for the confirmation prompt shown before a cascade delete.
/// Unknown panels contain nothing.
#[must_use]
pub fn contained(scene: &Scene, id: PanelId) -> ContainedCounts {
    let Some(panel) = scene.panel(id) else {
        return ContainedCounts::default();
    };
    let ids = contained_ids(scene, id, &panel.rect());
    ContainedCounts {
        characters: ids.characters.len(),
        bubbles: ids.bubbles.len(),
        backgrounds: ids.backgrounds.len(),
    }
}

/// Remove panel `id` and every element it contains. Unconditional once called;
/// confirmation is the caller's job. Returns what was removed, or `None` when
/// the panel does not exist.
pub fn cascade_delete(scene: &mut Scene, id: PanelId) -> Option<ContainedIds> {
    let bounds = scene.panel(id)?.rect();
    let ids = contained_ids(scene, id, &bounds);

    // Anchors are resolved before any collection changes.
    scene.characters = scene.characters.iter().filter(|c| !ids.characters.contains(&c.id)).cloned().collect();
    scene.bubbles = scene.bubbles.iter().filter(|b| !ids.bubbles.contains(&b.id)).cloned().collect();
    scene.backgrounds = scene.backgrounds.iter().filter(|g| !ids.backgrounds.contains(&g.id)).cloned().collect();
    let rehomed = rehome_survivors(scene, id, &bounds);
    scene.remove_panel(id);

    info!(
        panel_id = id,
        characters = ids.characters.len(),
        bubbles = ids.bubbles.len(),
        backgrounds = ids.backgrounds.len(),
        rehomed,
        "cascade delete"
    );
    Some(ids)
}

/// The panel a survivor of deleting `deleted` moves to: the one holding its
/// anchor, else the first remaining panel.
fn new_home(panels: &[Panel], deleted: PanelId, anchor: Point) -> Option<(PanelId, Rect)> {
    let mut remaining = panels.iter().filter(|p| p.id != deleted);
    let holder = panels.iter().filter(|p| p.id != deleted).find(|p| p.rect().contains(anchor));
    holder.or_else(|| remaining.next()).map(|p| (p.id, p.rect()))
}

/// Point every element still naming panel `id` at a live panel. `bounds` is
/// the deleted panel's rectangle, which the survivors are resolved against.
fn rehome_survivors(scene: &mut Scene, id: PanelId, bounds: &Rect) -> usize {
    let panels = scene.panels.clone();
    let mut rehomed = 0;

    for c in scene.characters.iter_mut().filter(|c| c.panel_id == id) {
        let anchor = c.absolute_anchor(bounds);
        if let Some((owner, frame)) = new_home(&panels, id, anchor) {
            c.panel_id = owner;
            c.set_absolute_anchor(anchor, &frame);
        } else {
            c.is_global_position = true;
            c.set_absolute_anchor(anchor, bounds);
        }
        rehomed += 1;
    }

    for b in scene.bubbles.iter_mut().filter(|b| b.panel_id == id) {
        let rect = b.absolute_rect(bounds);
        if let Some((owner, frame)) = new_home(&panels, id, rect.top_left()) {
            b.panel_id = owner;
            b.set_absolute_rect(rect, &frame);
        } else {
            b.is_global_position = true;
            b.set_absolute_rect(rect, bounds);
        }
        rehomed += 1;
    }

    rehomed
}
