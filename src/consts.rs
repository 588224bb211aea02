//! Shared numeric constants for the panel layout engine.

// ── Size floors ─────────────────────────────────────────────────

/// Minimum panel width and height in canvas pixels.
pub const MIN_PANEL_SIZE: f64 = 50.0;

/// Minimum resolved character width in canvas pixels.
pub const MIN_CHARACTER_WIDTH: f64 = 30.0;

/// Minimum resolved character height in canvas pixels.
pub const MIN_CHARACTER_HEIGHT: f64 = 40.0;

/// Minimum resolved speech bubble width in canvas pixels.
pub const MIN_BUBBLE_WIDTH: f64 = 60.0;

/// Minimum resolved speech bubble height in canvas pixels.
pub const MIN_BUBBLE_HEIGHT: f64 = 40.0;

// ── Characters ──────────────────────────────────────────────────

/// Character width at scale 1.0 when no explicit width is stored.
pub const CHARACTER_BASE_WIDTH: f64 = 60.0;

/// Character height at scale 1.0 when no explicit height is stored.
pub const CHARACTER_BASE_HEIGHT: f64 = 80.0;

/// Lower bound for character scale.
pub const MIN_CHARACTER_SCALE: f64 = 0.5;

/// Upper bound for character scale.
pub const MAX_CHARACTER_SCALE: f64 = 5.0;

// ── Handles ─────────────────────────────────────────────────────

/// Visual half-size of a square handle, in pixels.
pub const HANDLE_HALF_PX: f64 = 4.0;

/// Extra slop added around a handle's visual box when hit-testing.
pub const HANDLE_SLOP_PX: f64 = 6.0;

/// Distance above the top-center of the bounding box to the rotate handle.
pub const ROTATE_HANDLE_OFFSET_PX: f64 = 24.0;

/// Inset from the panel corner for the delete and split handles.
pub const CORNER_HANDLE_INSET_PX: f64 = 12.0;

/// Offset outside the element's top-right corner for the delete handle.
pub const ELEMENT_DELETE_OFFSET_PX: f64 = 12.0;

// ── Gestures ────────────────────────────────────────────────────

/// Multiplier applied to the pointer delta while resizing a panel.
pub const PANEL_RESIZE_DAMPING: f64 = 0.5;

// ── Duplication ─────────────────────────────────────────────────

/// Gap between a panel and its duplicate.
pub const PANEL_DUPLICATE_GAP: f64 = 10.0;

/// Offset applied on both axes to a duplicated character or bubble.
pub const ELEMENT_DUPLICATE_OFFSET: f64 = 20.0;

/// Gap left between the two halves of a split panel.
pub const PANEL_SPLIT_GAP: f64 = 10.0;
