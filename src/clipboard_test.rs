#![allow(clippy::float_cmp)]

use super::*;
use crate::doc::BackgroundFill;

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

fn canvas() -> Size {
    Size::new(800.0, 1200.0)
}

// =============================================================
// Placement
// =============================================================

#[test]
fn duplicate_goes_right_when_it_fits() {
    let r = duplicate_panel_rect(&Rect::new(0.0, 0.0, 100.0, 100.0), canvas());
    assert_eq!(r, Rect::new(110.0, 0.0, 100.0, 100.0));
}

#[test]
fn duplicate_goes_below_when_right_is_full() {
    let r = duplicate_panel_rect(&Rect::new(0.0, 0.0, 100.0, 100.0), Size::new(150.0, 500.0));
    assert_eq!(r, Rect::new(0.0, 110.0, 100.0, 100.0));
}

#[test]
fn duplicate_falls_back_to_left() {
    let r = duplicate_panel_rect(&Rect::new(300.0, 300.0, 100.0, 100.0), Size::new(450.0, 450.0));
    assert_eq!(r, Rect::new(190.0, 300.0, 100.0, 100.0));
}

#[test]
fn element_offset_flips_at_page_edge() {
    assert_eq!(element_offset(&Rect::new(10.0, 10.0, 50.0, 50.0), canvas()), Point::new(20.0, 20.0));
    assert_eq!(element_offset(&Rect::new(760.0, 10.0, 30.0, 50.0), canvas()), Point::new(-20.0, 20.0));
    assert_eq!(element_offset(&Rect::new(10.0, 1170.0, 30.0, 20.0), canvas()), Point::new(20.0, -20.0));
}

// =============================================================
// Copy and paste
// =============================================================

#[test]
fn paste_on_empty_clipboard_is_noop() {
    let mut scene = Scene::from_template(&[Rect::new(0.0, 0.0, 100.0, 100.0)]);
    let before = scene.clone();
    let clipboard = Clipboard::new();
    assert!(clipboard.is_empty());
    assert!(clipboard.paste(&mut scene, canvas()).is_none());
    assert_eq!(scene, before);
}

#[test]
fn copy_stale_selection_keeps_slot() {
    let scene = Scene::from_template(&[Rect::new(0.0, 0.0, 100.0, 100.0)]);
    let mut clipboard = Clipboard::new();
    assert!(clipboard.copy_selection(&scene, Selection::Panel(1)));
    assert!(!clipboard.copy_selection(&scene, Selection::Panel(7)));
    assert!(!clipboard.copy_selection(&scene, Selection::None));
    assert!(matches!(clipboard.entry(), Some(ClipboardEntry::Panel(p)) if p.id == 1));
}

#[test]
fn pasted_character_gets_new_id_and_offset() {
    let mut scene = Scene::from_template(&[Rect::new(0.0, 0.0, 400.0, 400.0)]);
    let c = Character::new(1, "Aki");
    scene.add_character(c.clone());
    let mut clipboard = Clipboard::new();
    clipboard.copy_selection(&scene, Selection::Character(c.id));

    let Some(Selection::Character(new_id)) = clipboard.paste(&mut scene, canvas()) else {
        panic!("expected character selection");
    };
    assert_ne!(new_id, c.id);
    let pasted = scene.character(new_id).unwrap();
    let center = pasted.absolute_anchor(&scene.frame_for(1));
    assert!(approx(center.x, 220.0));
    assert!(approx(center.y, 220.0));
    assert_eq!(scene.characters.len(), 2);
}

#[test]
fn pasting_twice_gives_two_distinct_clones() {
    let mut scene = Scene::from_template(&[Rect::new(0.0, 0.0, 400.0, 400.0)]);
    let b = SpeechBubble::new(1, "hi");
    scene.add_bubble(b.clone());
    let mut clipboard = Clipboard::new();
    clipboard.copy(ClipboardEntry::Bubble(b));
    let first = clipboard.paste(&mut scene, canvas());
    let second = clipboard.paste(&mut scene, canvas());
    assert_ne!(first, second);
    assert_eq!(scene.bubbles.len(), 3);
}

#[test]
fn pasted_panel_takes_next_id_and_duplicate_placement() {
    let mut scene = Scene::from_template(&[Rect::new(0.0, 0.0, 100.0, 100.0)]);
    scene.panels[0].note = Some("opener".into());
    let mut clipboard = Clipboard::new();
    clipboard.copy_selection(&scene, Selection::Panel(1));
    assert_eq!(clipboard.paste(&mut scene, canvas()), Some(Selection::Panel(2)));
    let pasted = scene.panel(2).unwrap();
    assert_eq!(pasted.rect(), Rect::new(110.0, 0.0, 100.0, 100.0));
    assert_eq!(pasted.note.as_deref(), Some("opener"));
}

#[test]
fn pasted_background_lands_on_top() {
    let mut scene = Scene::from_template(&[Rect::new(0.0, 0.0, 100.0, 100.0)]);
    let mut g = BackgroundElement::new(1, BackgroundFill::Solid { color: "#fff".into() });
    g.z_index = 4;
    scene.add_background(g.clone());
    let mut clipboard = Clipboard::new();
    clipboard.copy(ClipboardEntry::Background(g));
    let Some(Selection::Background(id)) = clipboard.paste(&mut scene, canvas()) else {
        panic!("expected background selection");
    };
    assert_eq!(scene.background(id).map(|b| b.z_index), Some(5));
}

// =============================================================
// Duplicate
// =============================================================

#[test]
fn duplicate_panel_clones_contents() {
    let mut scene = Scene::from_template(&[Rect::new(0.0, 0.0, 100.0, 100.0)]);
    let c = Character::new(1, "Aki");
    let mut global = SpeechBubble::new(1, "hi");
    global.is_global_position = true;
    global.x = 10.0;
    global.y = 10.0;
    global.width = 60.0;
    global.height = 40.0;
    let g = BackgroundElement::new(1, BackgroundFill::Solid { color: "#fff".into() });
    scene.add_character(c.clone());
    scene.add_bubble(global.clone());
    scene.add_background(g.clone());

    let new_id = duplicate_panel(&mut scene, 1, Size::new(150.0, 500.0)).unwrap();

    assert_eq!(new_id, 2);
    assert_eq!(scene.panel(2).map(Panel::rect), Some(Rect::new(0.0, 110.0, 100.0, 100.0)));

    let clone = scene.characters.iter().find(|x| x.panel_id == 2).unwrap();
    assert_ne!(clone.id, c.id);
    assert!(approx(clone.x, 0.5));
    assert!(approx(clone.y, 0.5));

    let bubble = scene.bubbles.iter().find(|x| x.panel_id == 2).unwrap();
    assert!(bubble.is_global_position);
    assert_eq!((bubble.x, bubble.y), (10.0, 120.0));

    let bg = scene.backgrounds.iter().find(|x| x.panel_id == 2).unwrap();
    assert_ne!(bg.id, g.id);
    assert_eq!(bg.fill, g.fill);

    // Originals untouched.
    assert_eq!(scene.character(c.id), Some(&c));
    assert_eq!(scene.bubble(global.id), Some(&global));
}

#[test]
fn duplicate_unknown_panel_is_none() {
    let mut scene = Scene::from_template(&[Rect::new(0.0, 0.0, 100.0, 100.0)]);
    assert!(duplicate_panel(&mut scene, 5, canvas()).is_none());
    assert_eq!(scene.panels.len(), 1);
}

#[test]
fn duplicate_global_character_offsets_in_pixels() {
    let mut scene = Scene::from_template(&[Rect::new(0.0, 0.0, 800.0, 1200.0)]);
    let mut c = Character::new(1, "Aki");
    c.is_global_position = true;
    c.x = 780.0;
    c.y = 100.0;
    scene.add_character(c.clone());

    let id = duplicate_character(&mut scene, c.id, canvas()).unwrap();
    let out = scene.character(id).unwrap();
    assert_eq!((out.x, out.y), (760.0, 120.0));
}

#[test]
fn duplicate_selection_dispatches_by_kind() {
    let mut scene = Scene::from_template(&[Rect::new(0.0, 0.0, 100.0, 100.0)]);
    let b = SpeechBubble::new(1, "hi");
    scene.add_bubble(b.clone());
    assert!(duplicate_selection(&mut scene, Selection::None, canvas()).is_none());
    assert!(matches!(
        duplicate_selection(&mut scene, Selection::Bubble(b.id), canvas()),
        Some(Selection::Bubble(id)) if id != b.id
    ));
    assert_eq!(duplicate_selection(&mut scene, Selection::Panel(1), canvas()), Some(Selection::Panel(2)));
}
