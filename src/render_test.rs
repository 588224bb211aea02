#![allow(clippy::float_cmp)]

use std::cell::RefCell;

use super::*;

/// Surface that records each call as a short string.
#[derive(Default)]
struct Recorder {
    calls: RefCell<Vec<String>>,
    fail_text: bool,
    fail_measure: bool,
}

impl Recorder {
    fn log(&self, call: String) {
        self.calls.borrow_mut().push(call);
    }

    fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    fn position(&self, needle: &str) -> Option<usize> {
        self.calls.borrow().iter().position(|c| c.contains(needle))
    }

    fn count(&self, needle: &str) -> usize {
        self.calls.borrow().iter().filter(|c| c.contains(needle)).count()
    }
}

impl Surface for Recorder {
    fn save(&self) {
        self.log("save".into());
    }
    fn restore(&self) {
        self.log("restore".into());
    }
    fn translate(&self, x: f64, y: f64) -> Result<(), SurfaceError> {
        self.log(format!("translate({x},{y})"));
        Ok(())
    }
    fn rotate(&self, radians: f64) -> Result<(), SurfaceError> {
        self.log(format!("rotate({radians})"));
        Ok(())
    }
    fn clear_rect(&self, x: f64, y: f64, w: f64, h: f64) {
        self.log(format!("clear_rect({x},{y},{w},{h})"));
    }
    fn fill_rect(&self, x: f64, y: f64, w: f64, h: f64) {
        self.log(format!("fill_rect({x},{y},{w},{h})"));
    }
    fn stroke_rect(&self, x: f64, y: f64, w: f64, h: f64) {
        self.log(format!("stroke_rect({x},{y},{w},{h})"));
    }
    fn set_fill_style(&self, color: &str) {
        self.log(format!("fill_style({color})"));
    }
    fn set_stroke_style(&self, color: &str) {
        self.log(format!("stroke_style({color})"));
    }
    fn set_line_width(&self, width: f64) {
        self.log(format!("line_width({width})"));
    }
    fn set_global_alpha(&self, alpha: f64) {
        self.log(format!("alpha({alpha})"));
    }
    fn set_line_dash(&self, segments: &[f64]) -> Result<(), SurfaceError> {
        self.log(format!("line_dash({segments:?})"));
        Ok(())
    }
    fn begin_path(&self) {
        self.log("begin_path".into());
    }
    fn close_path(&self) {
        self.log("close_path".into());
    }
    fn move_to(&self, x: f64, y: f64) {
        self.log(format!("move_to({x},{y})"));
    }
    fn line_to(&self, x: f64, y: f64) {
        self.log(format!("line_to({x},{y})"));
    }
    fn rect(&self, x: f64, y: f64, w: f64, h: f64) {
        self.log(format!("rect({x},{y},{w},{h})"));
    }
    fn arc(&self, x: f64, y: f64, radius: f64, _start: f64, _end: f64) -> Result<(), SurfaceError> {
        self.log(format!("arc({x},{y},{radius})"));
        Ok(())
    }
    fn ellipse(&self, x: f64, y: f64, rx: f64, ry: f64) -> Result<(), SurfaceError> {
        self.log(format!("ellipse({x},{y},{rx},{ry})"));
        Ok(())
    }
    fn fill(&self) {
        self.log("fill".into());
    }
    fn stroke(&self) {
        self.log("stroke".into());
    }
    fn clip(&self) {
        self.log("clip".into());
    }
    fn set_font(&self, font: &str) {
        self.log(format!("font({font})"));
    }
    fn set_text_align(&self, align: &str) {
        self.log(format!("text_align({align})"));
    }
    fn set_text_baseline(&self, baseline: &str) {
        self.log(format!("text_baseline({baseline})"));
    }
    fn fill_text(&self, text: &str, x: f64, y: f64) -> Result<(), SurfaceError> {
        if self.fail_text {
            return Err(SurfaceError("no text".into()));
        }
        self.log(format!("fill_text({text},{x},{y})"));
        Ok(())
    }
    #[allow(clippy::cast_precision_loss)]
    fn measure_text(&self, text: &str) -> Result<f64, SurfaceError> {
        if self.fail_measure {
            return Err(SurfaceError("no metrics".into()));
        }
        Ok(text.chars().count() as f64 * 7.0)
    }
}

fn scene() -> Scene {
    Scene::from_template(&[Rect::new(0.0, 0.0, 200.0, 200.0), Rect::new(210.0, 0.0, 200.0, 200.0)])
}

fn draw(scene: &Scene, ui: &UiState) -> Recorder {
    let surface = Recorder::default();
    composite(&surface, scene, ui, &EditorConfig::default()).unwrap();
    surface
}

// =============================================================
// Paint order
// =============================================================

#[test]
fn frame_starts_with_clear_and_page_fill() {
    let calls = draw(&scene(), &UiState::default()).calls();
    assert_eq!(calls[0], "clear_rect(0,0,800,1200)");
    assert_eq!(calls[1], format!("fill_style({PAGE_FILL})"));
    assert_eq!(calls[2], "fill_rect(0,0,800,1200)");
}

#[test]
fn panels_paint_in_id_order_regardless_of_array_order() {
    let mut s = scene();
    s.panels.reverse();
    let surface = draw(&s, &UiState::default());
    let first = surface.position("fill_rect(0,0,200,200)").unwrap();
    let second = surface.position("fill_rect(210,0,200,200)").unwrap();
    assert!(first < second);
}

#[test]
fn layers_follow_fixed_order() {
    let mut s = scene();
    let mut c = Character::new(1, "Aki");
    c.is_global_position = true;
    c.x = 100.0;
    c.y = 100.0;
    s.add_character(c.clone());
    let mut b = SpeechBubble::new(1, "Hey");
    b.kind = BubbleKind::Narration;
    s.add_bubble(b);
    s.add_background(BackgroundElement::new(1, BackgroundFill::Solid { color: "#abcdef".into() }));

    let ui = UiState {
        selection: Selection::Character(c.id),
        guides: vec![GuideLine {
            axis: crate::snap::GuideAxis::Vertical,
            start: Point::new(5.0, 0.0),
            end: Point::new(5.0, 100.0),
        }],
        ..UiState::default()
    };
    let surface = draw(&s, &ui);

    let panel = surface.position("fill_rect(0,0,200,200)").unwrap();
    let background = surface.position("fill_style(#abcdef)").unwrap();
    let bubble = surface.position("fill_text(Hey").unwrap();
    let character = surface.position("fill_text(Aki").unwrap();
    let guide = surface.position(&format!("stroke_style({GUIDE_STROKE})")).unwrap();
    // Resize handles are the last filled squares.
    let last_handle = surface.calls().iter().rposition(|c| c.starts_with("fill_rect(")).unwrap();
    assert!(panel < background);
    assert!(background < bubble);
    assert!(bubble < character);
    assert!(character < guide);
    assert!(guide < last_handle);
}

#[test]
fn backgrounds_are_clipped_to_panel_and_z_ordered() {
    let mut s = scene();
    let mut high = BackgroundElement::new(1, BackgroundFill::Solid { color: "#000002".into() });
    high.z_index = 2;
    let low = BackgroundElement::new(1, BackgroundFill::Solid { color: "#000001".into() });
    s.add_background(high);
    s.add_background(low);
    let surface = draw(&s, &UiState::default());
    assert!(surface.position("fill_style(#000001)").unwrap() < surface.position("fill_style(#000002)").unwrap());
    assert_eq!(surface.count("clip"), 2);
    assert!(surface.calls().iter().any(|c| c == "rect(0,0,200,200)"));
}

#[test]
fn rotated_character_is_drawn_inside_transform() {
    let mut s = scene();
    let mut c = Character::new(1, "Aki");
    c.set_rotation(90.0);
    s.add_character(c);
    let surface = draw(&s, &UiState::default());
    let translate = surface.position("translate(100,100)").unwrap();
    let rotate = surface.position("rotate(").unwrap();
    let label = surface.position("fill_text(Aki").unwrap();
    assert!(translate < rotate && rotate < label);
    let restore_after = surface.calls()[label..].iter().any(|c| c == "restore");
    assert!(restore_after);
}

// =============================================================
// Highlights and grid
// =============================================================

#[test]
fn selected_panel_gets_highlight_stroke() {
    let ui = UiState { selection: Selection::Panel(2), ..UiState::default() };
    let surface = draw(&scene(), &ui);
    assert_eq!(surface.count(&format!("stroke_style({SELECTED_STROKE})")), 1);
}

#[test]
fn swap_highlight_sits_beneath_selection() {
    let ui = UiState { selection: Selection::Panel(1), swap_first: Some(1), swap_second: Some(2), ..UiState::default() };
    let surface = draw(&scene(), &ui);
    let swap = surface.position(&format!("stroke_style({SWAP_FIRST_STROKE})")).unwrap();
    let selected = surface.position(&format!("stroke_style({SELECTED_STROKE})")).unwrap();
    assert!(swap < selected);
    assert_eq!(surface.count(&format!("stroke_style({SWAP_SECOND_STROKE})")), 1);
}

#[test]
fn grid_follows_mode() {
    assert!(!grid_visible(GridMode::PanelEditOnly, EditMode::Element));
    assert!(grid_visible(GridMode::PanelEditOnly, EditMode::Panel));
    assert!(grid_visible(GridMode::Always, EditMode::Element));
    assert!(!grid_visible(GridMode::Never, EditMode::Panel));

    let element = draw(&scene(), &UiState::default());
    assert_eq!(element.count(&format!("stroke_style({GRID_STROKE})")), 0);
    let panel = draw(&scene(), &UiState { edit_mode: EditMode::Panel, ..UiState::default() });
    assert_eq!(panel.count(&format!("stroke_style({GRID_STROKE})")), 1);
}

#[test]
fn panel_numbers_only_in_panel_mode() {
    let mut s = scene();
    s.panels[0].importance = Some(Importance::Climax);
    let element = draw(&s, &UiState::default());
    assert!(element.position("fill_text(1").is_none());
    let panel = draw(&s, &UiState { edit_mode: EditMode::Panel, ..UiState::default() });
    assert!(panel.position("fill_text(1 !!,").is_some());
    assert!(panel.position("fill_text(2,").is_some());
}

// =============================================================
// Bubbles
// =============================================================

#[test]
fn bubble_text_splits_on_newlines() {
    let mut s = scene();
    s.add_bubble(SpeechBubble::new(1, "one\ntwo"));
    let surface = draw(&s, &UiState::default());
    assert!(surface.position("fill_text(one").unwrap() < surface.position("fill_text(two").unwrap());
}

#[test]
fn long_bubble_line_is_ellipsized() {
    let mut s = scene();
    s.add_bubble(SpeechBubble::new(1, "a very long line that cannot fit inside"));
    let surface = draw(&s, &UiState::default());
    assert!(surface.position("...").is_some());
}

#[test]
fn whisper_bubble_is_dashed() {
    let mut s = scene();
    let mut b = SpeechBubble::new(1, "psst");
    b.kind = BubbleKind::Whisper;
    s.add_bubble(b);
    let surface = draw(&s, &UiState::default());
    assert!(surface.position("line_dash([4.0, 4.0])").is_some());
    assert!(surface.position("ellipse(").is_some());
}

// =============================================================
// Errors and art
// =============================================================

#[test]
fn surface_error_propagates() {
    let mut s = scene();
    s.add_bubble(SpeechBubble::new(1, "hi"));
    let surface = Recorder { fail_text: true, ..Recorder::default() };
    let result = composite(&surface, &s, &UiState::default(), &EditorConfig::default());
    assert_eq!(result, Err(SurfaceError("no text".into())));
}

#[test]
fn measure_error_propagates() {
    let mut s = scene();
    s.add_bubble(SpeechBubble::new(1, "hi"));
    let surface = Recorder { fail_measure: true, ..Recorder::default() };
    let result = composite(&surface, &s, &UiState::default(), &EditorConfig::default());
    assert_eq!(result, Err(SurfaceError("no metrics".into())));
    assert_eq!(surface.count("fill_text("), 0);
}

struct Dot;

impl CharacterArt for Dot {
    fn draw(&self, surface: &dyn Surface, _character: &Character, size: Size) -> Result<(), SurfaceError> {
        surface.arc(0.0, 0.0, size.width, 0.0, TAU)
    }
}

#[test]
fn custom_art_replaces_silhouette() {
    let mut s = scene();
    s.add_character(Character::new(1, "Aki"));
    let surface = Recorder::default();
    composite_with_art(&surface, &s, &UiState::default(), &EditorConfig::default(), &Dot).unwrap();
    assert_eq!(surface.count("arc(0,0,60)"), 1);
}
