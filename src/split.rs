//! Panel split: cut one panel into two halves separated by a gap.

#[cfg(test)]
#[path = "split_test.rs"]
mod split_test;

use tracing::info;

use crate::consts::MIN_PANEL_SIZE;
use crate::doc::{Panel, PanelId, Scene};
use crate::geom::{Placement, Point, Rect};

/// Orientation of the cut.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SplitDirection {
    /// Horizontal cut: top and bottom halves.
    Horizontal,
    /// Vertical cut: left and right halves.
    Vertical,
    /// Cut across the longer side.
    #[default]
    Auto,
}

impl SplitDirection {
    fn resolve(self, rect: &Rect) -> Self {
        match self {
            Self::Auto if rect.width >= rect.height => Self::Vertical,
            Self::Auto => Self::Horizontal,
            other => other,
        }
    }
}

/// The two rectangles `rect` splits into, or `None` when either half would
/// fall below the panel minimum.
#[must_use]
pub fn split_rects(rect: &Rect, direction: SplitDirection, gap: f64) -> Option<(Rect, Rect)> {
    let gap = gap.max(0.0);
    match direction.resolve(rect) {
        SplitDirection::Vertical => {
            let half = (rect.width - gap) / 2.0;
            if half < MIN_PANEL_SIZE {
                return None;
            }
            Some((
                Rect::new(rect.x, rect.y, half, rect.height),
                Rect::new(rect.x + half + gap, rect.y, half, rect.height),
            ))
        }
        SplitDirection::Horizontal | SplitDirection::Auto => {
            let half = (rect.height - gap) / 2.0;
            if half < MIN_PANEL_SIZE {
                return None;
            }
            Some((
                Rect::new(rect.x, rect.y, rect.width, half),
                Rect::new(rect.x, rect.y + half + gap, rect.width, half),
            ))
        }
    }
}

/// Split panel `id` in place. The first half keeps `id`; the second half is
/// appended with the next free id, which is returned. Characters and bubbles
/// anchored inside the original move to whichever half is nearer their
/// anchor, keeping their on-screen position. Backgrounds stay with the first
/// half.
///
/// Returns `None` (and leaves the scene untouched) when the panel is unknown
/// or too small to split.
pub fn split_panel(scene: &mut Scene, id: PanelId, direction: SplitDirection, gap: f64) -> Option<PanelId> {
    let original = scene.panel(id)?.clone();
    let bounds = original.rect();
    let (first_rect, second_rect) = split_rects(&bounds, direction, gap)?;
    let second_id = scene.next_panel_id();

    let midline = Point::new(
        (first_rect.right() + second_rect.x) / 2.0,
        (first_rect.bottom() + second_rect.y) / 2.0,
    );
    let vertical_cut = second_rect.x > first_rect.x;
    let owner_for = |anchor: Point| {
        let in_second = if vertical_cut { anchor.x >= midline.x } else { anchor.y >= midline.y };
        if in_second { (second_id, second_rect) } else { (id, first_rect) }
    };

    let mut characters = scene.characters.clone();
    for c in &mut characters {
        let frame = scene.frame_for(c.panel_id);
        let anchor = c.absolute_anchor(&frame);
        let target = if bounds.contains(anchor) {
            Some(owner_for(anchor))
        } else if c.panel_id == id {
            Some((id, first_rect))
        } else {
            None
        };
        if let Some((owner, new_frame)) = target {
            c.panel_id = owner;
            c.set_absolute_anchor(anchor, &new_frame);
        }
    }

    let mut bubbles = scene.bubbles.clone();
    for b in &mut bubbles {
        let rect = b.absolute_rect(&scene.frame_for(b.panel_id));
        let anchor = rect.top_left();
        let target = if bounds.contains(anchor) {
            Some(owner_for(anchor))
        } else if b.panel_id == id {
            Some((id, first_rect))
        } else {
            None
        };
        if let Some((owner, new_frame)) = target {
            b.panel_id = owner;
            b.set_absolute_rect(rect, &new_frame);
        }
    }

    let mut first = original.clone();
    first.set_rect(first_rect);
    let mut second = Panel::new(second_id, second_rect);
    second.importance = original.importance;

    scene.update_panel(first);
    scene.add_panel(second);
    scene.characters = characters;
    scene.bubbles = bubbles;

    info!(panel_id = id, new_panel_id = second_id, ?direction, "split panel");
    Some(second_id)
}
