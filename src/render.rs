//! Rendering: composites the page onto a [`Surface`].
//!
//! Paint order is fixed and independent of transient array order:
//!
//! 1. clear, then the flat page fill,
//! 2. the grid (per [`GridMode`] and edit mode),
//! 3. panels in ascending id,
//! 4. backgrounds, per panel in ascending `z_index`, clipped to their panel,
//! 5. speech bubbles in array order,
//! 6. characters in array order, each inside its own rotation transform,
//! 7. snap guides,
//! 8. handles of the selection, last so nothing covers them.
//!
//! The compositor only reads state. Every fallible surface call propagates
//! through `Result<(), SurfaceError>`.

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use std::f64::consts::{PI, TAU};

use crate::config::{EditorConfig, GridMode};
use crate::doc::{
    BackgroundElement, BackgroundFill, BubbleKind, Character, Importance, Panel, Scene, Selection, SpeechBubble,
    ViewType, backgrounds_in_paint_order,
};
use crate::geom::{Placement, Point, Rect, Size};
use crate::hit::{Handle, HitPart, ResizeAnchor, selection_handles};
use crate::input::{EditMode, UiState};
use crate::snap::GuideLine;
use crate::surface::{Surface, SurfaceError};

const PAGE_FILL: &str = "#f4f1ea";
const GRID_STROKE: &str = "#ddd8cc";
const PANEL_FILL: &str = "#ffffff";
const PANEL_STROKE: &str = "#1f1a17";
const SELECTED_STROKE: &str = "#1e90ff";
const SWAP_FIRST_STROKE: &str = "#ff9800";
const SWAP_SECOND_STROKE: &str = "#4caf50";
const GUIDE_STROKE: &str = "#ff00ff";
const HANDLE_FILL: &str = "#ffffff";
const DELETE_FILL: &str = "#e53935";
const SPLIT_FILL: &str = "#43a047";
const INK: &str = "#1f1a17";
const SKIN: &str = "#fbe3cf";

const PANEL_STROKE_WIDTH: f64 = 2.0;
const SELECTED_STROKE_WIDTH: f64 = 3.0;
const SWAP_STROKE_WIDTH: f64 = 7.0;
const BUBBLE_FONT_PX: f64 = 14.0;
const BUBBLE_PADDING: f64 = 8.0;
const HANDLE_DRAW_HALF: f64 = crate::consts::HANDLE_HALF_PX;
const DASH: [f64; 2] = [4.0, 4.0];

/// Draws a character's body in its local frame (origin at the character's
/// center, already rotated). Appearance detail is the host's concern.
pub trait CharacterArt {
    /// # Errors
    ///
    /// Propagates any failed surface call.
    fn draw(&self, surface: &dyn Surface, character: &Character, size: Size) -> Result<(), SurfaceError>;
}

/// Placeholder figure: head, torso, and legs according to [`ViewType`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Silhouette;

impl CharacterArt for Silhouette {
    fn draw(&self, surface: &dyn Surface, character: &Character, size: Size) -> Result<(), SurfaceError> {
        let hw = size.width / 2.0;
        let hh = size.height / 2.0;
        surface.set_fill_style(SKIN);
        surface.set_stroke_style(INK);
        surface.set_line_width(1.5);

        match character.view_type {
            ViewType::Face => {
                let r = hw.min(hh) * 0.9;
                surface.begin_path();
                surface.arc(0.0, 0.0, r, 0.0, TAU)?;
                surface.fill();
                surface.stroke();
            }
            ViewType::HalfBody => {
                let r = (size.width * 0.3).min(size.height * 0.25);
                let head_y = -hh + r;
                surface.begin_path();
                surface.arc(0.0, head_y, r, 0.0, TAU)?;
                surface.fill();
                surface.stroke();
                let torso_top = head_y + r;
                surface.fill_rect(-hw * 0.8, torso_top, hw * 1.6, hh - torso_top);
                surface.stroke_rect(-hw * 0.8, torso_top, hw * 1.6, hh - torso_top);
            }
            ViewType::FullBody => {
                let r = (size.width * 0.25).min(size.height * 0.12);
                let head_y = -hh + r;
                surface.begin_path();
                surface.arc(0.0, head_y, r, 0.0, TAU)?;
                surface.fill();
                surface.stroke();
                let torso_top = head_y + r;
                let hip = torso_top + size.height * 0.4;
                surface.fill_rect(-hw * 0.6, torso_top, hw * 1.2, hip - torso_top);
                surface.stroke_rect(-hw * 0.6, torso_top, hw * 1.2, hip - torso_top);
                surface.begin_path();
                surface.move_to(-hw * 0.3, hip);
                surface.line_to(-hw * 0.4, hh);
                surface.move_to(hw * 0.3, hip);
                surface.line_to(hw * 0.4, hh);
                surface.stroke();
            }
        }
        Ok(())
    }
}

/// Draw the full page with the default character art.
///
/// # Errors
///
/// Returns `Err` if any surface call fails.
pub fn composite(surface: &dyn Surface, scene: &Scene, ui: &UiState, config: &EditorConfig) -> Result<(), SurfaceError> {
    composite_with_art(surface, scene, ui, config, &Silhouette)
}

/// Draw the full page, delegating character bodies to `art`.
///
/// # Errors
///
/// Returns `Err` if any surface call fails.
pub fn composite_with_art(
    surface: &dyn Surface,
    scene: &Scene,
    ui: &UiState,
    config: &EditorConfig,
    art: &dyn CharacterArt,
) -> Result<(), SurfaceError> {
    let page = Rect::new(0.0, 0.0, config.canvas.width, config.canvas.height);

    // Layer 1: clear and page fill.
    surface.clear_rect(page.x, page.y, page.width, page.height);
    surface.set_fill_style(PAGE_FILL);
    surface.fill_rect(page.x, page.y, page.width, page.height);

    // Layer 2: grid.
    if grid_visible(config.grid, ui.edit_mode) {
        draw_grid(surface, &page, config.grid_size);
    }

    // Layer 3: panels.
    for panel in scene.panels_by_id() {
        draw_panel(surface, panel, ui)?;
    }

    // Layer 4: backgrounds.
    for (panel, bg) in backgrounds_in_paint_order(&scene.panels, &scene.backgrounds) {
        draw_background(surface, panel, bg, ui.selection == Selection::Background(bg.id))?;
    }

    // Layer 5: bubbles.
    for bubble in &scene.bubbles {
        let rect = bubble.absolute_rect(&scene.frame_for(bubble.panel_id));
        draw_bubble(surface, bubble, &rect, ui.selection == Selection::Bubble(bubble.id))?;
    }

    // Layer 6: characters.
    for character in &scene.characters {
        let rect = character.absolute_rect(&scene.frame_for(character.panel_id));
        draw_character(surface, character, &rect, ui.selection == Selection::Character(character.id), art)?;
    }

    // Layer 7: snap guides.
    draw_guides(surface, &ui.guides)?;

    // Layer 8: handles.
    let handles = selection_handles(ui.selection, &scene.panels, &scene.characters, &scene.bubbles, ui.edit_mode);
    draw_handles(surface, &handles)?;

    Ok(())
}

/// Whether the grid is painted for this mode combination.
#[must_use]
pub fn grid_visible(grid: GridMode, mode: EditMode) -> bool {
    match grid {
        GridMode::Always => true,
        GridMode::Never => false,
        GridMode::PanelEditOnly => mode == EditMode::Panel,
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
fn draw_grid(surface: &dyn Surface, page: &Rect, size: f64) {
    if size <= 0.0 {
        return;
    }
    surface.save();
    surface.set_stroke_style(GRID_STROKE);
    surface.set_line_width(0.5);
    surface.begin_path();
    let cols = (page.width / size).floor() as usize;
    for i in 1..=cols {
        let x = page.x + i as f64 * size;
        surface.move_to(x, page.y);
        surface.line_to(x, page.bottom());
    }
    let rows = (page.height / size).floor() as usize;
    for i in 1..=rows {
        let y = page.y + i as f64 * size;
        surface.move_to(page.x, y);
        surface.line_to(page.right(), y);
    }
    surface.stroke();
    surface.restore();
}

// =============================================================
// Panels and backgrounds
// =============================================================

fn draw_panel(surface: &dyn Surface, panel: &Panel, ui: &UiState) -> Result<(), SurfaceError> {
    let r = panel.rect();
    surface.save();

    surface.set_fill_style(PANEL_FILL);
    surface.fill_rect(r.x, r.y, r.width, r.height);

    // Swap highlights sit beneath the selection stroke.
    for (slot, color) in [(ui.swap_first, SWAP_FIRST_STROKE), (ui.swap_second, SWAP_SECOND_STROKE)] {
        if slot == Some(panel.id) {
            surface.set_stroke_style(color);
            surface.set_line_width(SWAP_STROKE_WIDTH);
            surface.stroke_rect(r.x, r.y, r.width, r.height);
        }
    }

    if ui.selection == Selection::Panel(panel.id) {
        surface.set_stroke_style(SELECTED_STROKE);
        surface.set_line_width(SELECTED_STROKE_WIDTH);
    } else {
        surface.set_stroke_style(PANEL_STROKE);
        surface.set_line_width(PANEL_STROKE_WIDTH);
    }
    surface.stroke_rect(r.x, r.y, r.width, r.height);

    if ui.edit_mode == EditMode::Panel {
        let marker = match panel.importance {
            Some(Importance::Important) => " !",
            Some(Importance::Climax) => " !!",
            Some(Importance::Normal) | None => "",
        };
        surface.set_fill_style(INK);
        surface.set_font("bold 14px sans-serif");
        surface.set_text_align("left");
        surface.set_text_baseline("top");
        surface.fill_text(&format!("{}{marker}", panel.id), r.x + 6.0, r.y + 6.0)?;
    }

    surface.restore();
    Ok(())
}

fn draw_background(
    surface: &dyn Surface,
    panel: &Panel,
    bg: &BackgroundElement,
    selected: bool,
) -> Result<(), SurfaceError> {
    let frame = panel.rect();
    let rect = bg.absolute_rect(&frame);
    if rect.width <= 0.0 || rect.height <= 0.0 {
        return Ok(());
    }

    surface.save();
    surface.begin_path();
    surface.rect(frame.x, frame.y, frame.width, frame.height);
    surface.clip();
    surface.set_global_alpha(bg.opacity.clamp(0.0, 1.0));
    translate_and_rotate(surface, &rect, bg.rotation)?;

    let hw = rect.width / 2.0;
    let hh = rect.height / 2.0;
    match &bg.fill {
        BackgroundFill::Solid { color } => {
            surface.set_fill_style(color);
            surface.fill_rect(-hw, -hh, rect.width, rect.height);
        }
        BackgroundFill::SpeedLines { color, density } => {
            surface.set_stroke_style(color);
            surface.set_line_width(1.0);
            surface.begin_path();
            let count = (*density).max(1);
            let outer = hw.hypot(hh);
            for i in 0..count {
                let angle = TAU * f64::from(i) / f64::from(count);
                let (sin, cos) = angle.sin_cos();
                surface.move_to(cos * outer, sin * outer);
                surface.line_to(cos * outer * 0.45, sin * outer * 0.45);
            }
            surface.stroke();
        }
        BackgroundFill::Halftone { color, spacing } => {
            surface.set_fill_style(color);
            let step = spacing.max(2.0);
            let dot = step * 0.2;
            let mut y = -hh + step / 2.0;
            while y < hh {
                let mut x = -hw + step / 2.0;
                while x < hw {
                    surface.begin_path();
                    surface.arc(x, y, dot, 0.0, TAU)?;
                    surface.fill();
                    x += step;
                }
                y += step;
            }
        }
    }

    if selected {
        surface.set_global_alpha(1.0);
        draw_selection_outline(surface, -hw, -hh, rect.width, rect.height)?;
    }

    surface.restore();
    Ok(())
}

// =============================================================
// Bubbles
// =============================================================

fn draw_bubble(surface: &dyn Surface, bubble: &SpeechBubble, rect: &Rect, selected: bool) -> Result<(), SurfaceError> {
    if rect.width <= 0.0 || rect.height <= 0.0 {
        return Ok(());
    }
    let c = rect.center();
    let rx = rect.width / 2.0;
    let ry = rect.height / 2.0;

    surface.save();
    surface.set_fill_style(PANEL_FILL);
    surface.set_stroke_style(INK);
    surface.set_line_width(1.5);

    match bubble.kind {
        BubbleKind::Normal => {
            surface.begin_path();
            surface.ellipse(c.x, c.y, rx, ry)?;
            surface.fill();
            surface.stroke();
        }
        BubbleKind::Whisper => {
            surface.set_line_dash(&DASH)?;
            surface.begin_path();
            surface.ellipse(c.x, c.y, rx, ry)?;
            surface.fill();
            surface.stroke();
            surface.set_line_dash(&[])?;
        }
        BubbleKind::Shout => {
            let spikes = 14;
            surface.begin_path();
            for i in 0..spikes * 2 {
                let angle = PI * f64::from(i) / f64::from(spikes);
                let scale = if i % 2 == 0 { 1.0 } else { 0.78 };
                let x = c.x + rx * scale * angle.cos();
                let y = c.y + ry * scale * angle.sin();
                if i == 0 {
                    surface.move_to(x, y);
                } else {
                    surface.line_to(x, y);
                }
            }
            surface.close_path();
            surface.fill();
            surface.stroke();
        }
        BubbleKind::Thought => {
            surface.begin_path();
            surface.ellipse(c.x, c.y, rx, ry)?;
            surface.fill();
            surface.stroke();
            for (dx, dy, r) in [(0.55, 1.15, 0.12), (0.7, 1.4, 0.07)] {
                surface.begin_path();
                surface.arc(c.x - rx * dx, c.y + ry * dy, ry * r, 0.0, TAU)?;
                surface.fill();
                surface.stroke();
            }
        }
        BubbleKind::Narration => {
            surface.fill_rect(rect.x, rect.y, rect.width, rect.height);
            surface.stroke_rect(rect.x, rect.y, rect.width, rect.height);
        }
    }

    draw_bubble_text(surface, &bubble.text, rect)?;

    if selected {
        draw_selection_outline(surface, rect.x, rect.y, rect.width, rect.height)?;
    }
    surface.restore();
    Ok(())
}

/// Explicit line breaks only; each line is trimmed to fit with an ellipsis.
#[allow(clippy::cast_precision_loss)]
fn draw_bubble_text(surface: &dyn Surface, text: &str, rect: &Rect) -> Result<(), SurfaceError> {
    if text.trim().is_empty() {
        return Ok(());
    }
    surface.set_fill_style(INK);
    surface.set_font(&format!("{BUBBLE_FONT_PX}px sans-serif"));
    surface.set_text_align("center");
    surface.set_text_baseline("middle");

    let max_w = (rect.width - BUBBLE_PADDING * 2.0).max(1.0);
    let line_height = BUBBLE_FONT_PX * 1.25;
    let lines: Vec<&str> = text.lines().collect();
    let total = line_height * lines.len().saturating_sub(1) as f64;
    let c = rect.center();
    for (idx, line) in lines.iter().enumerate() {
        let fitted = fit_text_with_ellipsis(surface, line, max_w)?;
        surface.fill_text(&fitted, c.x, c.y - total / 2.0 + idx as f64 * line_height)?;
    }
    Ok(())
}

fn fit_text_with_ellipsis(surface: &dyn Surface, text: &str, max_w: f64) -> Result<String, SurfaceError> {
    let trimmed = text.trim();
    if surface.measure_text(trimmed)? <= max_w {
        return Ok(trimmed.to_owned());
    }
    let ellipsis = "...";
    let mut chars: Vec<char> = trimmed.chars().collect();
    while chars.pop().is_some() {
        let candidate = format!("{}{ellipsis}", chars.iter().collect::<String>().trim_end());
        if surface.measure_text(&candidate)? <= max_w {
            return Ok(candidate);
        }
    }
    Ok(ellipsis.to_owned())
}

// =============================================================
// Characters
// =============================================================

fn draw_character(
    surface: &dyn Surface,
    character: &Character,
    rect: &Rect,
    selected: bool,
    art: &dyn CharacterArt,
) -> Result<(), SurfaceError> {
    surface.save();
    translate_and_rotate(surface, rect, character.rotation)?;

    art.draw(surface, character, rect.size())?;

    // The name label rotates with the body.
    if !character.name.is_empty() {
        surface.set_fill_style(INK);
        surface.set_font("12px sans-serif");
        surface.set_text_align("center");
        surface.set_text_baseline("top");
        surface.fill_text(&character.name, 0.0, rect.height / 2.0 + 4.0)?;
    }

    if selected {
        draw_selection_outline(surface, -rect.width / 2.0, -rect.height / 2.0, rect.width, rect.height)?;
    }

    surface.restore();
    Ok(())
}

// =============================================================
// Overlays
// =============================================================

fn draw_guides(surface: &dyn Surface, guides: &[GuideLine]) -> Result<(), SurfaceError> {
    if guides.is_empty() {
        return Ok(());
    }
    surface.save();
    surface.set_stroke_style(GUIDE_STROKE);
    surface.set_line_width(1.0);
    surface.set_line_dash(&DASH)?;
    for guide in guides {
        surface.begin_path();
        surface.move_to(guide.start.x, guide.start.y);
        surface.line_to(guide.end.x, guide.end.y);
        surface.stroke();
    }
    surface.set_line_dash(&[])?;
    surface.restore();
    Ok(())
}

fn draw_handles(surface: &dyn Surface, handles: &[Handle]) -> Result<(), SurfaceError> {
    if handles.is_empty() {
        return Ok(());
    }
    surface.save();
    surface.set_line_width(1.0);
    surface.set_stroke_style(SELECTED_STROKE);

    // Stem from the north resize handle up to the rotate handle.
    let north = handles
        .iter()
        .find(|h| h.part == HitPart::ResizeHandle(ResizeAnchor::N));
    let rotate = handles.iter().find(|h| h.part == HitPart::RotateHandle);
    if let (Some(n), Some(r)) = (north, rotate) {
        surface.begin_path();
        surface.move_to(n.center.x, n.center.y);
        surface.line_to(r.center.x, r.center.y);
        surface.stroke();
    }

    for handle in handles {
        draw_handle(surface, handle)?;
    }
    surface.restore();
    Ok(())
}

fn draw_handle(surface: &dyn Surface, handle: &Handle) -> Result<(), SurfaceError> {
    let Point { x, y } = handle.center;
    let s = HANDLE_DRAW_HALF;
    match handle.part {
        HitPart::ResizeHandle(_) => {
            surface.set_fill_style(HANDLE_FILL);
            surface.fill_rect(x - s, y - s, s * 2.0, s * 2.0);
            surface.stroke_rect(x - s, y - s, s * 2.0, s * 2.0);
        }
        HitPart::RotateHandle => {
            surface.set_fill_style(HANDLE_FILL);
            surface.begin_path();
            surface.arc(x, y, s + 1.0, 0.0, TAU)?;
            surface.fill();
            surface.stroke();
        }
        HitPart::MoveHandle => {
            surface.set_fill_style(SELECTED_STROKE);
            surface.begin_path();
            surface.arc(x, y, s * 2.0, 0.0, TAU)?;
            surface.fill();
            surface.begin_path();
            surface.move_to(x - s, y);
            surface.line_to(x + s, y);
            surface.move_to(x, y - s);
            surface.line_to(x, y + s);
            surface.set_stroke_style(HANDLE_FILL);
            surface.stroke();
            surface.set_stroke_style(SELECTED_STROKE);
        }
        HitPart::DeleteHandle => {
            surface.set_fill_style(DELETE_FILL);
            surface.begin_path();
            surface.arc(x, y, s * 2.0, 0.0, TAU)?;
            surface.fill();
            surface.set_stroke_style(HANDLE_FILL);
            surface.begin_path();
            surface.move_to(x - s, y - s);
            surface.line_to(x + s, y + s);
            surface.move_to(x + s, y - s);
            surface.line_to(x - s, y + s);
            surface.stroke();
            surface.set_stroke_style(SELECTED_STROKE);
        }
        HitPart::SplitHandle => {
            surface.set_fill_style(SPLIT_FILL);
            surface.fill_rect(x - s * 2.0, y - s * 2.0, s * 4.0, s * 4.0);
            surface.set_stroke_style(HANDLE_FILL);
            surface.begin_path();
            surface.move_to(x, y - s * 1.5);
            surface.line_to(x, y + s * 1.5);
            surface.stroke();
            surface.set_stroke_style(SELECTED_STROKE);
        }
        HitPart::Body => {}
    }
    Ok(())
}

fn draw_selection_outline(surface: &dyn Surface, x: f64, y: f64, w: f64, h: f64) -> Result<(), SurfaceError> {
    surface.set_stroke_style(SELECTED_STROKE);
    surface.set_line_width(1.0);
    surface.set_line_dash(&DASH)?;
    surface.stroke_rect(x, y, w, h);
    surface.set_line_dash(&[])?;
    Ok(())
}

// =============================================================
// Helpers
// =============================================================

/// Translate to the center of `rect` and rotate by `degrees`.
fn translate_and_rotate(surface: &dyn Surface, rect: &Rect, degrees: f64) -> Result<(), SurfaceError> {
    let c = rect.center();
    surface.translate(c.x, c.y)?;
    surface.rotate(degrees.to_radians())?;
    Ok(())
}
