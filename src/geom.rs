//! Geometry and coordinate conversion.
//!
//! Every read or write of an element's position goes through this module.
//! Characters and speech bubbles store either absolute canvas pixels or
//! fractions of their owning panel's rectangle (the "frame"), selected by
//! `is_global_position`; backgrounds are always frame-relative. The
//! [`Placement`] trait hides that split so call sites only ever see absolute
//! rectangles and anchors.

#[cfg(test)]
#[path = "geom_test.rs"]
mod geom_test;

use serde::{Deserialize, Serialize};

use crate::doc::{BackgroundElement, Character, SpeechBubble};

/// A point in canvas space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Component-wise difference `self - other`.
    #[must_use]
    pub fn delta_from(self, other: Point) -> Point {
        Point::new(self.x - other.x, self.y - other.y)
    }

    #[must_use]
    pub fn offset(self, dx: f64, dy: f64) -> Point {
        Point::new(self.x + dx, self.y + dy)
    }
}

/// A width/height pair.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// An axis-aligned rectangle given by its top-left corner and size.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    #[must_use]
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Build a rectangle of `size` centered on `center`.
    #[must_use]
    pub fn from_center(center: Point, size: Size) -> Self {
        Self {
            x: center.x - size.width / 2.0,
            y: center.y - size.height / 2.0,
            width: size.width,
            height: size.height,
        }
    }

    #[must_use]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    #[must_use]
    pub fn top_left(&self) -> Point {
        Point::new(self.x, self.y)
    }

    #[must_use]
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Inclusive containment test.
    #[must_use]
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.right() && p.y >= self.y && p.y <= self.bottom()
    }

    #[must_use]
    pub fn translated(&self, dx: f64, dy: f64) -> Rect {
        Rect::new(self.x + dx, self.y + dy, self.width, self.height)
    }

    /// Grow (or shrink, for negative `by`) on every side.
    #[must_use]
    pub fn inflated(&self, by: f64) -> Rect {
        Rect::new(self.x - by, self.y - by, self.width + by * 2.0, self.height + by * 2.0)
    }
}

/// Which point of an element its stored position describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    /// Position is the element's center (characters).
    Center,
    /// Position is the element's top-left corner (bubbles, backgrounds).
    TopLeft,
}

// =============================================================
// Point conversions
// =============================================================

/// Map a frame-relative fractional point into canvas pixels.
#[must_use]
pub fn to_absolute_point(p: Point, frame: &Rect) -> Point {
    Point::new(frame.x + p.x * frame.width, frame.y + p.y * frame.height)
}

/// Map a canvas point into fractions of `frame`. A degenerate frame axis maps to 0.
#[must_use]
pub fn to_relative_point(p: Point, frame: &Rect) -> Point {
    Point::new(fraction(p.x - frame.x, frame.width), fraction(p.y - frame.y, frame.height))
}

#[must_use]
pub fn to_absolute_size(s: Size, frame: &Rect) -> Size {
    Size::new(s.width * frame.width, s.height * frame.height)
}

#[must_use]
pub fn to_relative_size(s: Size, frame: &Rect) -> Size {
    Size::new(fraction(s.width, frame.width), fraction(s.height, frame.height))
}

fn fraction(value: f64, extent: f64) -> f64 {
    if extent.abs() < f64::EPSILON {
        0.0
    } else {
        value / extent
    }
}

// =============================================================
// Rotation
// =============================================================

/// Normalize an angle in degrees into `[0, 360)`.
#[must_use]
pub fn normalize_degrees(deg: f64) -> f64 {
    let r = deg.rem_euclid(360.0);
    // rem_euclid can round a tiny negative input up to exactly 360.
    if r >= 360.0 { 0.0 } else { r }
}

/// Rotate `p` around `center` by `degrees` (clockwise on a y-down canvas).
#[must_use]
pub fn rotate_point(p: Point, center: Point, degrees: f64) -> Point {
    let (sin, cos) = degrees.to_radians().sin_cos();
    let dx = p.x - center.x;
    let dy = p.y - center.y;
    Point::new(center.x + dx * cos - dy * sin, center.y + dx * sin + dy * cos)
}

/// Axis-aligned box enclosing the rectangle `(x, y, w, h)` rotated around its center.
#[must_use]
pub fn rotated_bounds(x: f64, y: f64, w: f64, h: f64, degrees: f64) -> Rect {
    let rect = Rect::new(x, y, w, h);
    if normalize_degrees(degrees) == 0.0 {
        return rect;
    }
    let center = rect.center();
    let corners = [
        Point::new(x, y),
        Point::new(x + w, y),
        Point::new(x + w, y + h),
        Point::new(x, y + h),
    ]
    .map(|c| rotate_point(c, center, degrees));

    let min_x = corners.iter().map(|c| c.x).fold(f64::INFINITY, f64::min);
    let max_x = corners.iter().map(|c| c.x).fold(f64::NEG_INFINITY, f64::max);
    let min_y = corners.iter().map(|c| c.y).fold(f64::INFINITY, f64::min);
    let max_y = corners.iter().map(|c| c.y).fold(f64::NEG_INFINITY, f64::max);
    Rect::new(min_x, min_y, max_x - min_x, max_y - min_y)
}

/// Angle in degrees from `center` to `p`, normalized into `[0, 360)`.
#[must_use]
pub fn angle_deg(center: Point, p: Point) -> f64 {
    normalize_degrees((p.y - center.y).atan2(p.x - center.x).to_degrees())
}

/// Whether `p` lies inside `rect` rotated by `degrees` around its center.
///
/// The rotated box is rejected cheaply via its axis-aligned bounds first, then
/// the point is inverse-rotated into the rectangle's local frame.
#[must_use]
pub fn contains_rotated(rect: &Rect, degrees: f64, p: Point) -> bool {
    if normalize_degrees(degrees) == 0.0 {
        return rect.contains(p);
    }
    if !rotated_bounds(rect.x, rect.y, rect.width, rect.height, degrees).contains(p) {
        return false;
    }
    rect.contains(rotate_point(p, rect.center(), -degrees))
}

// =============================================================
// Element placement
// =============================================================

/// Resolution of an element's stored coordinates against its owning panel.
pub trait Placement {
    /// Which point the stored position refers to.
    fn anchor_kind(&self) -> Anchor;

    /// The element's bounds in canvas pixels, resolved against `frame`.
    fn absolute_rect(&self, frame: &Rect) -> Rect;

    /// Move the element so its anchor lands on the canvas point `anchor`.
    fn set_absolute_anchor(&mut self, anchor: Point, frame: &Rect);

    /// The element's anchor point in canvas pixels.
    fn absolute_anchor(&self, frame: &Rect) -> Point {
        let rect = self.absolute_rect(frame);
        match self.anchor_kind() {
            Anchor::Center => rect.center(),
            Anchor::TopLeft => rect.top_left(),
        }
    }
}

/// Resolve an element into absolute canvas pixels. Pure; never fails.
#[must_use]
pub fn to_absolute<T: Placement>(element: &T, frame: &Rect) -> Rect {
    element.absolute_rect(frame)
}

impl Placement for Character {
    fn anchor_kind(&self) -> Anchor {
        Anchor::Center
    }

    fn absolute_rect(&self, frame: &Rect) -> Rect {
        let stored = Point::new(self.x, self.y);
        let center = if self.is_global_position {
            stored
        } else {
            to_absolute_point(stored, frame)
        };
        Rect::from_center(center, self.size())
    }

    fn set_absolute_anchor(&mut self, anchor: Point, frame: &Rect) {
        let stored = if self.is_global_position {
            anchor
        } else {
            to_relative_point(anchor, frame)
        };
        self.x = stored.x;
        self.y = stored.y;
    }
}

impl Placement for SpeechBubble {
    fn anchor_kind(&self) -> Anchor {
        Anchor::TopLeft
    }

    fn absolute_rect(&self, frame: &Rect) -> Rect {
        if self.is_global_position {
            return Rect::new(self.x, self.y, self.width, self.height);
        }
        let origin = to_absolute_point(Point::new(self.x, self.y), frame);
        let size = to_absolute_size(Size::new(self.width, self.height), frame);
        Rect::new(origin.x, origin.y, size.width, size.height)
    }

    fn set_absolute_anchor(&mut self, anchor: Point, frame: &Rect) {
        let stored = if self.is_global_position {
            anchor
        } else {
            to_relative_point(anchor, frame)
        };
        self.x = stored.x;
        self.y = stored.y;
    }
}

impl SpeechBubble {
    /// Overwrite position and size from an absolute rectangle.
    pub fn set_absolute_rect(&mut self, rect: Rect, frame: &Rect) {
        self.set_absolute_anchor(rect.top_left(), frame);
        let size = if self.is_global_position {
            rect.size()
        } else {
            to_relative_size(rect.size(), frame)
        };
        self.width = size.width;
        self.height = size.height;
    }
}

impl Placement for BackgroundElement {
    fn anchor_kind(&self) -> Anchor {
        Anchor::TopLeft
    }

    fn absolute_rect(&self, frame: &Rect) -> Rect {
        let origin = to_absolute_point(Point::new(self.x, self.y), frame);
        let size = to_absolute_size(Size::new(self.width, self.height), frame);
        Rect::new(origin.x, origin.y, size.width, size.height)
    }

    fn set_absolute_anchor(&mut self, anchor: Point, frame: &Rect) {
        let stored = to_relative_point(anchor, frame);
        self.x = stored.x;
        self.y = stored.y;
    }
}
