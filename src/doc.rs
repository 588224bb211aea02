//! Document model: panels, page elements, selection, and the scene store.
//!
//! A page is a set of panels (rectangular comic frames) plus three kinds of
//! elements that live inside them: characters, speech bubbles, and background
//! fills. Elements reference their panel through `panel_id`; that reference
//! is a lookup key, never ownership, and may go stale. [`resolve_frame`] is
//! the one place that turns a `panel_id` into a rectangle, falling back to
//! the first panel when the reference dangles.
//!
//! Collections are treated as snapshots: the CRUD helpers take a slice and
//! return a fresh `Vec`, and [`Scene`] replaces its vectors wholesale so a
//! reactive host can detect changes by identity.

#[cfg(test)]
#[path = "doc_test.rs"]
mod doc_test;

use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::consts::{
    CHARACTER_BASE_HEIGHT, CHARACTER_BASE_WIDTH, MAX_CHARACTER_SCALE, MIN_CHARACTER_HEIGHT, MIN_CHARACTER_SCALE,
    MIN_CHARACTER_WIDTH, MIN_PANEL_SIZE,
};
use crate::geom::{Rect, Size, normalize_degrees};

/// User-facing panel number. Also the reading order.
pub type PanelId = u32;

/// Identifier for characters, bubbles, and backgrounds.
pub type ElementId = Uuid;

/// Error returned by scene snapshot (de)serialization.
#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    #[error("invalid scene json: {0}")]
    Json(#[from] serde_json::Error),
}

// =============================================================
// Panels
// =============================================================

/// Narrative weight tag shown on a panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Importance {
    Normal,
    Important,
    Climax,
}

/// A rectangular comic frame in absolute canvas pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Panel {
    /// Stable id; never re-derived from array position.
    pub id: PanelId,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub importance: Option<Importance>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl Panel {
    /// Build a panel, flooring its size at the panel minimum.
    #[must_use]
    pub fn new(id: PanelId, rect: Rect) -> Self {
        Self {
            id,
            x: rect.x,
            y: rect.y,
            width: rect.width.max(MIN_PANEL_SIZE),
            height: rect.height.max(MIN_PANEL_SIZE),
            importance: None,
            note: None,
        }
    }

    #[must_use]
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    /// Overwrite geometry, flooring the size at the panel minimum.
    pub fn set_rect(&mut self, rect: Rect) {
        self.x = rect.x;
        self.y = rect.y;
        self.width = rect.width.max(MIN_PANEL_SIZE);
        self.height = rect.height.max(MIN_PANEL_SIZE);
    }
}

// =============================================================
// Characters
// =============================================================

/// Story role of a character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CharacterKind {
    #[default]
    Hero,
    Heroine,
    Rival,
    Friend,
    Extra,
}

/// How much of the character is framed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewType {
    Face,
    #[default]
    HalfBody,
    FullBody,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Facing {
    #[default]
    Front,
    Left,
    Right,
    Back,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Expression {
    #[default]
    Neutral,
    Happy,
    Sad,
    Angry,
    Surprised,
    Embarrassed,
}

/// A character placed on the page. The stored position is the center.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Character {
    pub id: ElementId,
    pub panel_id: PanelId,
    pub name: String,
    #[serde(default)]
    pub kind: CharacterKind,
    #[serde(default)]
    pub view_type: ViewType,
    #[serde(default)]
    pub facing: Facing,
    #[serde(default)]
    pub expression: Expression,
    /// Center x: canvas pixels when global, panel fraction otherwise.
    pub x: f64,
    /// Center y: canvas pixels when global, panel fraction otherwise.
    pub y: f64,
    pub is_global_position: bool,
    pub scale: f64,
    /// Explicit pixel width overriding `scale`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    /// Explicit pixel height overriding `scale`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    /// Degrees in `[0, 360)`.
    #[serde(default)]
    pub rotation: f64,
}

impl Character {
    /// A character centered in its panel at scale 1.
    #[must_use]
    pub fn new(panel_id: PanelId, name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            panel_id,
            name: name.into(),
            kind: CharacterKind::default(),
            view_type: ViewType::default(),
            facing: Facing::default(),
            expression: Expression::default(),
            x: 0.5,
            y: 0.5,
            is_global_position: false,
            scale: 1.0,
            width: None,
            height: None,
            rotation: 0.0,
        }
    }

    /// Resolved pixel size, never below the character minimum.
    #[must_use]
    pub fn size(&self) -> Size {
        let w = self.width.unwrap_or(CHARACTER_BASE_WIDTH * self.scale);
        let h = self.height.unwrap_or(CHARACTER_BASE_HEIGHT * self.scale);
        Size::new(w.max(MIN_CHARACTER_WIDTH), h.max(MIN_CHARACTER_HEIGHT))
    }

    pub fn set_scale(&mut self, scale: f64) {
        self.scale = scale.clamp(MIN_CHARACTER_SCALE, MAX_CHARACTER_SCALE);
    }

    pub fn set_rotation(&mut self, degrees: f64) {
        self.rotation = normalize_degrees(degrees);
    }

    /// Copy rotated by `delta` degrees from the current angle.
    #[must_use]
    pub fn rotated_by(&self, delta: f64) -> Self {
        let mut out = self.clone();
        out.set_rotation(self.rotation + delta);
        out
    }
}

// =============================================================
// Speech bubbles
// =============================================================

/// Visual shape category of a speech bubble.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BubbleKind {
    #[default]
    Normal,
    Shout,
    Whisper,
    Thought,
    Narration,
}

/// A speech bubble. The stored position is the top-left corner; size shares
/// the position's coordinate space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeechBubble {
    pub id: ElementId,
    pub panel_id: PanelId,
    #[serde(default)]
    pub kind: BubbleKind,
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub is_global_position: bool,
}

impl SpeechBubble {
    /// A panel-relative bubble in the upper-left area of its panel.
    #[must_use]
    pub fn new(panel_id: PanelId, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            panel_id,
            kind: BubbleKind::default(),
            text: text.into(),
            x: 0.1,
            y: 0.1,
            width: 0.4,
            height: 0.25,
            is_global_position: false,
        }
    }
}

// =============================================================
// Backgrounds
// =============================================================

/// Fill style of a background element, with its type-specific fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BackgroundFill {
    Solid { color: String },
    SpeedLines { color: String, density: u32 },
    Halftone { color: String, spacing: f64 },
}

/// A background fill. Geometry is always panel-relative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackgroundElement {
    pub id: ElementId,
    pub panel_id: PanelId,
    pub fill: BackgroundFill,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Paint order among backgrounds sharing a panel.
    #[serde(default)]
    pub z_index: i32,
    pub opacity: f64,
    #[serde(default)]
    pub rotation: f64,
}

impl BackgroundElement {
    /// A fill covering the whole panel.
    #[must_use]
    pub fn new(panel_id: PanelId, fill: BackgroundFill) -> Self {
        Self {
            id: Uuid::new_v4(),
            panel_id,
            fill,
            x: 0.0,
            y: 0.0,
            width: 1.0,
            height: 1.0,
            z_index: 0,
            opacity: 1.0,
            rotation: 0.0,
        }
    }
}

// =============================================================
// Selection
// =============================================================

/// The single selected entity, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    None,
    Panel(PanelId),
    Character(ElementId),
    Bubble(ElementId),
    Background(ElementId),
}

impl Selection {
    #[must_use]
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    #[must_use]
    pub fn panel(&self) -> Option<PanelId> {
        match self {
            Self::Panel(id) => Some(*id),
            _ => None,
        }
    }
}

// =============================================================
// Snapshot CRUD
// =============================================================

/// Anything stored in a scene collection under a unique id.
pub trait Entity: Clone {
    type Id: Copy + PartialEq;

    fn id(&self) -> Self::Id;
}

impl Entity for Panel {
    type Id = PanelId;

    fn id(&self) -> PanelId {
        self.id
    }
}

impl Entity for Character {
    type Id = ElementId;

    fn id(&self) -> ElementId {
        self.id
    }
}

impl Entity for SpeechBubble {
    type Id = ElementId;

    fn id(&self) -> ElementId {
        self.id
    }
}

impl Entity for BackgroundElement {
    type Id = ElementId;

    fn id(&self) -> ElementId {
        self.id
    }
}

/// Return a new collection with `item` appended.
#[must_use]
pub fn add<T: Entity>(items: &[T], item: T) -> Vec<T> {
    let mut out = items.to_vec();
    out.push(item);
    out
}

/// Return a new collection with the entry sharing `item`'s id replaced.
/// Unknown ids leave the collection unchanged.
#[must_use]
pub fn update<T: Entity>(items: &[T], item: T) -> Vec<T> {
    let target = item.id();
    let mut item = Some(item);
    items
        .iter()
        .map(|existing| {
            if existing.id() == target {
                item.take().unwrap_or_else(|| existing.clone())
            } else {
                existing.clone()
            }
        })
        .collect()
}

/// Return a new collection without the entry `id`.
#[must_use]
pub fn remove<T: Entity>(items: &[T], id: T::Id) -> Vec<T> {
    items.iter().filter(|e| e.id() != id).cloned().collect()
}

/// Index-based panel lookup. Never assumes the panel exists.
#[must_use]
pub fn find_panel(panels: &[Panel], id: PanelId) -> Option<&Panel> {
    panels.iter().find(|p| p.id == id)
}

/// The rectangle an element with `panel_id` is positioned against.
///
/// Falls back to the first panel (logging the dangling reference), then to an
/// empty rectangle when the page has no panels at all.
#[must_use]
pub fn resolve_frame(panels: &[Panel], panel_id: PanelId) -> Rect {
    if let Some(panel) = find_panel(panels, panel_id) {
        return panel.rect();
    }
    match panels.first() {
        Some(first) => {
            warn!(panel_id, fallback = first.id, "element references missing panel; using first panel");
            first.rect()
        }
        None => {
            warn!(panel_id, "element references missing panel and the page has no panels");
            Rect::default()
        }
    }
}

/// Backgrounds paired with the panel they paint into, bottom first: panels in
/// ascending id, then `z_index` ascending within each panel. A background
/// whose panel is missing is painted into the first panel.
#[must_use]
pub fn backgrounds_in_paint_order<'a>(
    panels: &'a [Panel],
    backgrounds: &'a [BackgroundElement],
) -> Vec<(&'a Panel, &'a BackgroundElement)> {
    let Some(first) = panels.first() else {
        return Vec::new();
    };
    let owner_id = |bg: &BackgroundElement| {
        if find_panel(panels, bg.panel_id).is_some() {
            bg.panel_id
        } else {
            warn!(panel_id = bg.panel_id, background = %bg.id, fallback = first.id, "background references missing panel");
            first.id
        }
    };
    let owners: Vec<PanelId> = backgrounds.iter().map(owner_id).collect();

    let mut sorted: Vec<&Panel> = panels.iter().collect();
    sorted.sort_by_key(|p| p.id);

    let mut out = Vec::with_capacity(backgrounds.len());
    for panel in sorted {
        let mut layer: Vec<&BackgroundElement> = backgrounds
            .iter()
            .zip(&owners)
            .filter(|(_, owner)| **owner == panel.id)
            .map(|(bg, _)| bg)
            .collect();
        layer.sort_by_key(|bg| bg.z_index);
        out.extend(layer.into_iter().map(|bg| (panel, bg)));
    }
    out
}

/// Next unused panel id (`max + 1`, or 1 on an empty page).
#[must_use]
pub fn next_panel_id(panels: &[Panel]) -> PanelId {
    panels.iter().map(|p| p.id).max().map_or(1, |m| m + 1)
}

// =============================================================
// Scene
// =============================================================

/// The entity store: every collection on the page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    pub panels: Vec<Panel>,
    #[serde(default)]
    pub characters: Vec<Character>,
    #[serde(default)]
    pub bubbles: Vec<SpeechBubble>,
    #[serde(default)]
    pub backgrounds: Vec<BackgroundElement>,
}

impl Scene {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a page from template rectangles; ids are assigned 1..=n in order.
    #[must_use]
    pub fn from_template(rects: &[Rect]) -> Self {
        let panels = (1..).zip(rects).map(|(id, rect)| Panel::new(id, *rect)).collect();
        Self { panels, ..Self::default() }
    }

    /// Parse a scene snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::Json`] when the input is not a valid scene.
    pub fn from_json(json: &str) -> Result<Self, SceneError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize the scene snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::Json`] if serialization fails.
    pub fn to_json(&self) -> Result<String, SceneError> {
        Ok(serde_json::to_string(self)?)
    }

    // --- Lookups ---

    #[must_use]
    pub fn panel(&self, id: PanelId) -> Option<&Panel> {
        find_panel(&self.panels, id)
    }

    #[must_use]
    pub fn character(&self, id: ElementId) -> Option<&Character> {
        self.characters.iter().find(|c| c.id == id)
    }

    #[must_use]
    pub fn bubble(&self, id: ElementId) -> Option<&SpeechBubble> {
        self.bubbles.iter().find(|b| b.id == id)
    }

    #[must_use]
    pub fn background(&self, id: ElementId) -> Option<&BackgroundElement> {
        self.backgrounds.iter().find(|b| b.id == id)
    }

    /// Whether the selection still refers to a live entity.
    #[must_use]
    pub fn contains(&self, selection: Selection) -> bool {
        match selection {
            Selection::None => false,
            Selection::Panel(id) => self.panel(id).is_some(),
            Selection::Character(id) => self.character(id).is_some(),
            Selection::Bubble(id) => self.bubble(id).is_some(),
            Selection::Background(id) => self.background(id).is_some(),
        }
    }

    /// See [`resolve_frame`].
    #[must_use]
    pub fn frame_for(&self, panel_id: PanelId) -> Rect {
        resolve_frame(&self.panels, panel_id)
    }

    #[must_use]
    pub fn next_panel_id(&self) -> PanelId {
        next_panel_id(&self.panels)
    }

    /// Panels in ascending id order, independent of array order.
    #[must_use]
    pub fn panels_by_id(&self) -> Vec<&Panel> {
        let mut panels: Vec<&Panel> = self.panels.iter().collect();
        panels.sort_by_key(|p| p.id);
        panels
    }

    /// Backgrounds owned by `panel_id`, in ascending `z_index`.
    #[must_use]
    pub fn backgrounds_for(&self, panel_id: PanelId) -> Vec<&BackgroundElement> {
        let mut out: Vec<&BackgroundElement> = self.backgrounds.iter().filter(|b| b.panel_id == panel_id).collect();
        out.sort_by_key(|b| b.z_index);
        out
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.panels.is_empty() && self.characters.is_empty() && self.bubbles.is_empty() && self.backgrounds.is_empty()
    }

    // --- Snapshot mutations ---

    pub fn add_panel(&mut self, panel: Panel) {
        self.panels = add(&self.panels, panel);
    }

    pub fn update_panel(&mut self, panel: Panel) {
        self.panels = update(&self.panels, panel);
    }

    pub fn remove_panel(&mut self, id: PanelId) {
        self.panels = remove(&self.panels, id);
    }

    pub fn add_character(&mut self, character: Character) {
        self.characters = add(&self.characters, character);
    }

    pub fn update_character(&mut self, character: Character) {
        self.characters = update(&self.characters, character);
    }

    pub fn remove_character(&mut self, id: ElementId) {
        self.characters = remove(&self.characters, id);
    }

    pub fn add_bubble(&mut self, bubble: SpeechBubble) {
        self.bubbles = add(&self.bubbles, bubble);
    }

    pub fn update_bubble(&mut self, bubble: SpeechBubble) {
        self.bubbles = update(&self.bubbles, bubble);
    }

    pub fn remove_bubble(&mut self, id: ElementId) {
        self.bubbles = remove(&self.bubbles, id);
    }

    pub fn add_background(&mut self, background: BackgroundElement) {
        self.backgrounds = add(&self.backgrounds, background);
    }

    pub fn update_background(&mut self, background: BackgroundElement) {
        self.backgrounds = update(&self.backgrounds, background);
    }

    pub fn remove_background(&mut self, id: ElementId) {
        self.backgrounds = remove(&self.backgrounds, id);
    }
}

/// Exchange the ids of panels `a` and `b`, changing reading order while
/// geometry stays put. Every element referencing either panel follows its
/// geometry. Returns `false` (and changes nothing) unless both panels exist
/// and differ.
pub fn swap_panels(scene: &mut Scene, a: PanelId, b: PanelId) -> bool {
    if a == b || scene.panel(a).is_none() || scene.panel(b).is_none() {
        return false;
    }
    let swap = |id: PanelId| {
        if id == a {
            b
        } else if id == b {
            a
        } else {
            id
        }
    };

    let mut panels = scene.panels.clone();
    for p in &mut panels {
        p.id = swap(p.id);
    }
    let mut characters = scene.characters.clone();
    for c in &mut characters {
        c.panel_id = swap(c.panel_id);
    }
    let mut bubbles = scene.bubbles.clone();
    for b in &mut bubbles {
        b.panel_id = swap(b.panel_id);
    }
    let mut backgrounds = scene.backgrounds.clone();
    for g in &mut backgrounds {
        g.panel_id = swap(g.panel_id);
    }

    scene.panels = panels;
    scene.characters = characters;
    scene.bubbles = bubbles;
    scene.backgrounds = backgrounds;
    true
}
