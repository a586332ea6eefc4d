use plot_rs::core::{Changeable, Color, Point, Range, Rectangle, Viewport};
use plot_rs::render::Rgba;
use std::cell::Cell;
use std::rc::Rc;

fn counter() -> (Rc<Cell<usize>>, impl FnMut() + 'static) {
    let hits = Rc::new(Cell::new(0));
    let slot_hits = Rc::clone(&hits);
    (hits, move || slot_hits.set(slot_hits.get() + 1))
}

#[test]
fn range_writes_notify_only_on_change() {
    let mut range = Range::new(0.0, 1.0);
    let (hits, slot) = counter();
    range.connect_changed(slot);

    range.set_min(0.0);
    range.update(0.0, 1.0);
    assert_eq!(hits.get(), 0);

    range.update(-1.0, 2.0);
    assert_eq!(hits.get(), 1);
    range.shift(1.0);
    assert_eq!(range.bounds(), (0.0, 3.0));
    range.expand(2.0);
    assert_eq!(range.bounds(), (-1.0, 4.0));
    assert_eq!(hits.get(), 3);
}

#[test]
fn frozen_range_delivers_one_notification_on_thaw() {
    let mut range = Range::new(0.0, 1.0);
    let (hits, slot) = counter();
    range.connect_changed(slot);

    range.freeze();
    range.set_min(-5.0);
    range.set_max(5.0);
    range.shift(1.0);
    assert_eq!(hits.get(), 0);
    range.thaw();
    assert_eq!(hits.get(), 1);
    assert_eq!(range.bounds(), (-4.0, 6.0));

    range.freeze();
    range.thaw();
    assert_eq!(hits.get(), 1);
}

#[test]
fn ignored_changes_are_discarded() {
    let mut point = Point::new(0.0, 0.0);
    let (hits, slot) = counter();
    point.connect_changed(slot);

    point.begin_ignore();
    point.move_to(3.0, 4.0);
    point.end_ignore();
    assert_eq!(hits.get(), 0);
    assert_eq!(point.x(), 3.0);

    point.set_y(1.0);
    assert_eq!(hits.get(), 1);
}

#[test]
fn disconnected_slots_stop_receiving() {
    let mut range = Range::default();
    let (hits, slot) = counter();
    let id = range.connect_changed(slot);

    range.set_max(1.0);
    assert!(range.disconnect_changed(id));
    range.set_max(2.0);
    assert_eq!(hits.get(), 1);
    assert!(!range.disconnect_changed(id));
}

#[test]
fn inverted_range_contains_its_interior() {
    let range = Range::new(10.0, 0.0);
    assert!(range.is_inverted());
    assert!(range.contains(5.0));
    assert!(!range.contains(-1.0));
    assert_eq!(range.span(), -10.0);
}

#[test]
fn rectangle_separates_move_and_resize() {
    let mut rect = Rectangle::new(0.0, 0.0, 100.0, 50.0);
    let (moves, on_move) = counter();
    let (resizes, on_resize) = counter();
    rect.connect_moved(on_move);
    rect.connect_resized(on_resize);

    rect.move_to(10.0, 10.0);
    assert_eq!((moves.get(), resizes.get()), (1, 0));
    rect.set_width(120.0);
    assert_eq!((moves.get(), resizes.get()), (1, 1));
    rect.update(10.0, 10.0, 120.0, 50.0);
    assert_eq!((moves.get(), resizes.get()), (1, 1));

    assert!(rect.contains(15.0, 59.0));
    assert!(!rect.contains(5.0, 20.0));
    assert_eq!(rect.viewport(), Viewport::new(120, 50));
}

#[test]
fn negative_rectangle_size_maps_to_an_empty_viewport() {
    let rect = Rectangle::new(0.0, 0.0, -4.0, 10.0);
    assert!(!rect.viewport().is_valid());
}

#[test]
fn color_channels_notify_and_copy() {
    let mut color = Color::new(Rgba::rgb(0.0, 0.0, 0.0));
    let (hits, slot) = counter();
    color.connect_changed(slot);

    color.set_red(1.0);
    color.set_alpha(0.5);
    assert_eq!(hits.get(), 2);

    let other = Color::new(Rgba::rgba(1.0, 0.0, 0.0, 0.5));
    color.update(&other);
    assert_eq!(hits.get(), 2);
    assert_eq!(color, other);
}
