//! Edge snapping for panels being moved.
//!
//! The proposed rectangle's left/right edges are compared against each
//! sibling's left/right edges, and its top/bottom edges against their
//! top/bottom edges. Each axis is resolved independently: the first sibling
//! in array order with an edge inside the threshold wins that axis. An axis
//! with no qualifying neighbor is clamped to the canvas instead.

#[cfg(test)]
#[path = "snap_test.rs"]
mod snap_test;

use crate::config::SnapSettings;
use crate::doc::{Panel, PanelId};
use crate::geom::{Point, Rect, Size};

/// Orientation of a guide line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuideAxis {
    /// A vertical line, emitted for an x snap.
    Vertical,
    /// A horizontal line, emitted for a y snap.
    Horizontal,
}

/// A guide segment drawn while a snap is active.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GuideLine {
    pub axis: GuideAxis,
    pub start: Point,
    pub end: Point,
}

/// Outcome of snapping a proposed panel position.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapResult {
    pub panel: Panel,
    pub guides: Vec<GuideLine>,
}

/// Which sibling edge an axis settled on.
#[derive(Debug, Clone, Copy)]
struct AxisSnap {
    /// Corrected origin coordinate for the moving panel.
    origin: f64,
    /// Coordinate of the edge both panels now share.
    edge: f64,
    sibling: PanelId,
    /// Whether the origin actually moved (an exact alignment emits no guide).
    corrected: bool,
}

/// Snap `panel` (already at its proposed position) against `siblings`.
///
/// `siblings` may contain `panel` itself; it is skipped by id.
#[must_use]
pub fn snap(panel: &Panel, siblings: &[Panel], settings: &SnapSettings, canvas: Size) -> SnapResult {
    let proposed = panel.rect();
    let others: Vec<&Panel> = siblings.iter().filter(|s| s.id != panel.id).collect();

    let (x_snap, y_snap) = if settings.enabled {
        let threshold = settings.sensitivity.threshold_px();
        (
            find_axis_snap(proposed.x, proposed.width, &others, threshold, |r| (r.x, r.right())),
            find_axis_snap(proposed.y, proposed.height, &others, threshold, |r| (r.y, r.bottom())),
        )
    } else {
        (None, None)
    };

    let x = x_snap.map_or_else(|| clamp_axis(proposed.x, proposed.width, canvas.width), |s| s.origin);
    let y = y_snap.map_or_else(|| clamp_axis(proposed.y, proposed.height, canvas.height), |s| s.origin);
    let result = Rect::new(x, y, proposed.width, proposed.height);

    let mut guides = Vec::new();
    if let Some(s) = x_snap.filter(|s| s.corrected) {
        if let Some(sib) = others.iter().find(|p| p.id == s.sibling) {
            let top = result.y.min(sib.y);
            let bottom = result.bottom().max(sib.rect().bottom());
            guides.push(GuideLine {
                axis: GuideAxis::Vertical,
                start: Point::new(s.edge, top),
                end: Point::new(s.edge, bottom),
            });
        }
    }
    if let Some(s) = y_snap.filter(|s| s.corrected) {
        if let Some(sib) = others.iter().find(|p| p.id == s.sibling) {
            let left = result.x.min(sib.x);
            let right = result.right().max(sib.rect().right());
            guides.push(GuideLine {
                axis: GuideAxis::Horizontal,
                start: Point::new(left, s.edge),
                end: Point::new(right, s.edge),
            });
        }
    }

    let mut out = panel.clone();
    out.x = result.x;
    out.y = result.y;
    SnapResult { panel: out, guides }
}

/// Find the first sibling edge within `threshold` of the moving span
/// `[origin, origin + extent]` on one axis. `edges` projects a sibling's
/// rectangle onto that axis as `(near, far)`.
fn find_axis_snap<F>(origin: f64, extent: f64, others: &[&Panel], threshold: f64, edges: F) -> Option<AxisSnap>
where
    F: Fn(&Rect) -> (f64, f64),
{
    let near = origin;
    let far = origin + extent;
    for sibling in others {
        let (s_near, s_far) = edges(&sibling.rect());
        // (moving edge, sibling edge, origin that aligns them)
        let candidates = [
            (near, s_near, s_near),
            (near, s_far, s_far),
            (far, s_far, s_far - extent),
            (far, s_near, s_near - extent),
        ];
        for (moving, target, aligned_origin) in candidates {
            let distance = (target - moving).abs();
            if distance <= threshold {
                return Some(AxisSnap {
                    origin: aligned_origin,
                    edge: target,
                    sibling: sibling.id,
                    corrected: distance > 0.0,
                });
            }
        }
    }
    None
}

fn clamp_axis(origin: f64, extent: f64, limit: f64) -> f64 {
    origin.clamp(0.0, (limit - extent).max(0.0))
}
