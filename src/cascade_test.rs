use super::*;
use crate::doc::{BackgroundElement, BackgroundFill, Character, SpeechBubble};
use crate::geom::Point;

fn global_character(panel_id: PanelId, at: Point) -> Character {
    let mut c = Character::new(panel_id, "Aki");
    c.is_global_position = true;
    c.x = at.x;
    c.y = at.y;
    c
}

fn global_bubble(panel_id: PanelId, at: Point) -> SpeechBubble {
    let mut b = SpeechBubble::new(panel_id, "hi");
    b.is_global_position = true;
    b.x = at.x;
    b.y = at.y;
    b.width = 80.0;
    b.height = 50.0;
    b
}

fn page() -> Scene {
    Scene::from_template(&[Rect::new(0.0, 0.0, 200.0, 200.0), Rect::new(250.0, 250.0, 200.0, 200.0)])
}

// =============================================================
// contained
// =============================================================

#[test]
fn contained_counts_anchor_points() {
    let mut scene = page();
    scene.add_character(global_character(1, Point::new(50.0, 50.0)));
    scene.add_bubble(global_bubble(1, Point::new(150.0, 150.0)));
    scene.add_character(global_character(1, Point::new(300.0, 300.0)));
    scene.add_background(BackgroundElement::new(1, BackgroundFill::Solid { color: "#eee".into() }));

    let counts = contained(&scene, 1);
    assert_eq!(counts, ContainedCounts { characters: 1, bubbles: 1, backgrounds: 1 });
    assert!(!counts.is_empty());
}

#[test]
fn contained_uses_anchor_not_overlap() {
    let mut scene = page();
    // Top-left just outside panel 1, body overlapping it.
    scene.add_bubble(global_bubble(1, Point::new(201.0, 10.0)));
    assert!(contained(&scene, 1).is_empty());
}

#[test]
fn contained_unknown_panel_is_empty() {
    assert_eq!(contained(&page(), 99), ContainedCounts::default());
}

#[test]
fn relative_elements_count_toward_their_panel() {
    let mut scene = page();
    scene.add_character(Character::new(2, "Rel"));
    assert_eq!(contained(&scene, 2).characters, 1);
    assert_eq!(contained(&scene, 1).characters, 0);
}

// =============================================================
// cascade_delete
// =============================================================

#[test]
fn cascade_delete_removes_panel_and_contents() {
    let mut scene = page();
    let inside_c = global_character(1, Point::new(50.0, 50.0));
    let inside_b = global_bubble(1, Point::new(150.0, 150.0));
    let outside = global_character(1, Point::new(300.0, 300.0));
    scene.add_character(inside_c.clone());
    scene.add_bubble(inside_b.clone());
    scene.add_character(outside.clone());

    let removed = cascade_delete(&mut scene, 1).unwrap();

    assert_eq!(removed.characters, vec![inside_c.id]);
    assert_eq!(removed.bubbles, vec![inside_b.id]);
    assert!(scene.panel(1).is_none());
    assert!(scene.character(inside_c.id).is_none());
    assert!(scene.bubble(inside_b.id).is_none());
    assert!(scene.character(outside.id).is_some());
}

#[test]
fn cascade_delete_takes_owned_backgrounds_only() {
    let mut scene = page();
    let mine = BackgroundElement::new(1, BackgroundFill::Solid { color: "#111".into() });
    let theirs = BackgroundElement::new(2, BackgroundFill::Solid { color: "#222".into() });
    scene.add_background(mine.clone());
    scene.add_background(theirs.clone());

    cascade_delete(&mut scene, 1);

    assert!(scene.background(mine.id).is_none());
    assert!(scene.background(theirs.id).is_some());
}

#[test]
fn cascade_delete_unknown_panel_is_noop() {
    let mut scene = page();
    scene.add_character(global_character(1, Point::new(50.0, 50.0)));
    let before = scene.clone();
    assert!(cascade_delete(&mut scene, 42).is_none());
    assert_eq!(scene, before);
}

// =============================================================
// Survivors
// =============================================================

fn assert_point_near(a: Point, b: Point) {
    assert!((a.x - b.x).abs() < 1e-9 && (a.y - b.y).abs() < 1e-9, "{a:?} vs {b:?}");
}

fn assert_rect_near(a: Rect, b: Rect) {
    let close = |x: f64, y: f64| (x - y).abs() < 1e-9;
    assert!(
        close(a.x, b.x) && close(a.y, b.y) && close(a.width, b.width) && close(a.height, b.height),
        "{a:?} vs {b:?}"
    );
}

#[test]
fn survivor_moves_to_panel_under_its_anchor() {
    let mut scene = page();
    let dragged_away = global_character(1, Point::new(300.0, 300.0));
    scene.add_character(dragged_away.clone());

    cascade_delete(&mut scene, 1).unwrap();

    let out = scene.character(dragged_away.id).unwrap();
    assert_eq!(out.panel_id, 2);
    assert_point_near(out.absolute_anchor(&scene.frame_for(out.panel_id)), Point::new(300.0, 300.0));
}

#[test]
fn survivor_outside_every_panel_falls_back_to_first() {
    let mut scene = page();
    let stray = global_character(1, Point::new(220.0, 10.0));
    let mut overhang = SpeechBubble::new(1, "hey");
    overhang.x = 1.1;
    scene.add_character(stray.clone());
    scene.add_bubble(overhang.clone());
    let bubble_rect = overhang.absolute_rect(&scene.frame_for(1));
    assert_rect_near(bubble_rect, Rect::new(220.0, 20.0, 80.0, 50.0));

    cascade_delete(&mut scene, 1).unwrap();

    for c in &scene.characters {
        assert!(scene.panel(c.panel_id).is_some(), "character still names panel {}", c.panel_id);
    }
    for b in &scene.bubbles {
        assert!(scene.panel(b.panel_id).is_some(), "bubble still names panel {}", b.panel_id);
    }

    let c = scene.character(stray.id).unwrap();
    assert_eq!(c.panel_id, 2);
    assert_point_near(c.absolute_anchor(&scene.frame_for(2)), Point::new(220.0, 10.0));

    let b = scene.bubble(overhang.id).unwrap();
    assert_eq!(b.panel_id, 2);
    assert!(!b.is_global_position);
    assert_rect_near(b.absolute_rect(&scene.frame_for(2)), bubble_rect);
}

#[test]
fn survivor_of_last_panel_turns_global() {
    let mut scene = Scene::from_template(&[Rect::new(0.0, 0.0, 200.0, 200.0)]);
    let mut overhang = SpeechBubble::new(1, "hey");
    overhang.x = 1.1;
    scene.add_bubble(overhang.clone());

    cascade_delete(&mut scene, 1).unwrap();

    assert!(scene.panels.is_empty());
    let b = scene.bubble(overhang.id).unwrap();
    assert!(b.is_global_position);
    assert_rect_near(b.absolute_rect(&Rect::default()), Rect::new(220.0, 20.0, 80.0, 50.0));
}

#[test]
fn survivors_of_other_panels_are_untouched() {
    let mut scene = page();
    let neighbor = Character::new(2, "Rel");
    scene.add_character(neighbor.clone());
    cascade_delete(&mut scene, 1).unwrap();
    assert_eq!(scene.character(neighbor.id), Some(&neighbor));
}
