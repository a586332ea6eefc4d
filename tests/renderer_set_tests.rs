use plot_rs::core::{ColorMap, DataPoint};
use plot_rs::graph::InvalidationLevel;
use plot_rs::render::{RecordingSurfaceProvider, Rgba};
use plot_rs::renderers::{Area, Colored, Labeled, Line, shared};
use plot_rs::Graph;

fn line(label: &str) -> Line {
    Line::new()
        .with_label(label)
        .with_data([DataPoint::new(0.0, 0.0), DataPoint::new(1.0, 1.0)])
}

#[test]
fn adding_twice_returns_the_same_id() {
    let mut graph = Graph::new(RecordingSurfaceProvider::new());
    let renderer = shared(line("a"));

    let first = graph.add(renderer.clone()).expect("add");
    let second = graph.add(renderer.clone()).expect("add again");
    assert_eq!(first, second);
    assert_eq!(graph.renderer_count(), 1);
    assert_eq!(graph.renderer_id(&renderer), Some(first));
}

#[test]
fn removal_is_idempotent_and_stops_notifications() {
    let mut graph = Graph::new(RecordingSurfaceProvider::new());
    let renderer = shared(line("a"));
    let id = graph.add(renderer.clone()).expect("add");

    assert!(graph.remove_renderer(&renderer));
    assert!(!graph.remove_renderer(&renderer));
    assert!(!graph.remove(id));
    assert!(!graph.contains(id));

    renderer.borrow_mut().append(DataPoint::new(5.0, 5.0));
    assert_eq!(graph.pending_events(), 0);
    assert_eq!(graph.process_events(), InvalidationLevel::None);
}

#[test]
fn paint_order_follows_insertion() {
    let mut graph = Graph::new(RecordingSurfaceProvider::new());
    let ids: Vec<_> = ["a", "b", "c"]
        .into_iter()
        .map(|label| graph.add(shared(line(label))).expect("add"))
        .collect();
    assert_eq!(graph.renderer_ids(), ids);

    graph.remove(ids[1]);
    assert_eq!(graph.renderer_ids(), vec![ids[0], ids[2]]);

    graph.clear_renderers();
    assert_eq!(graph.renderer_count(), 0);
}

#[test]
fn palette_skips_explicit_colors_and_follows_removals() {
    let mut graph = Graph::new(RecordingSurfaceProvider::new());
    let palette = ColorMap::default();
    let red = Rgba::rgb(1.0, 0.0, 0.0);

    let first = shared(line("first"));
    let pinned = shared(line("pinned").with_color(red));
    let third = shared(line("third"));
    let first_id = graph.add(first.clone()).expect("first");
    graph.add(pinned.clone()).expect("pinned");
    graph.add(third.clone()).expect("third");

    assert_eq!(first.borrow().color(), palette.get(0));
    assert_eq!(pinned.borrow().color(), red);
    assert_eq!(third.borrow().color(), palette.get(1));

    graph.remove(first_id);
    assert_eq!(third.borrow().color(), palette.get(0));
    assert_eq!(pinned.borrow().color(), red);

    pinned.borrow_mut().clear_explicit_color();
    graph.set_color_map(ColorMap::default());
    assert_eq!(pinned.borrow().color(), palette.get(0));
    assert_eq!(third.borrow().color(), palette.get(1));
}

#[test]
fn disabled_recolor_keeps_renderer_colors() {
    let mut graph = Graph::new(RecordingSurfaceProvider::new());
    graph.set_auto_recolor(false);

    let renderer = shared(line("plain"));
    let before = renderer.borrow().color();
    graph.add(renderer.clone()).expect("add");
    assert_eq!(renderer.borrow().color(), before);

    graph.set_auto_recolor(true);
    assert_eq!(renderer.borrow().color(), ColorMap::default().get(0));
}

#[test]
fn legend_chips_line_up_and_answer_hit_tests() {
    let mut graph = Graph::new(RecordingSurfaceProvider::new());
    let first = graph.add(shared(line("alpha"))).expect("first");
    let unlabeled = shared(Line::new().with_data([DataPoint::new(0.0, 0.0)]));
    graph.add(unlabeled).expect("unlabeled");

    let markup = shared(Area::new().with_data([DataPoint::new(0.0, 0.0), DataPoint::new(1.0, 2.0)]));
    markup.borrow_mut().line_mut().set_label_markup("<b>beta</b>");
    let markup_id = graph.add(markup).expect("markup");

    let chips = graph.label_chips();
    assert_eq!(chips.len(), 2);
    assert_eq!(chips[0].renderer, first);
    assert!(chips[0].has_ruler);
    assert_eq!(chips[1].renderer, markup_id);
    assert!(chips[1].markup);
    assert_eq!(chips[1].x, chips[0].x + chips[0].width);
    assert_eq!(chips[1].y, chips[0].y);

    let inside_second = DataPoint::new(chips[1].x + 1.0, chips[1].y + 1.0);
    assert_eq!(graph.label_hit_test(inside_second), Some(markup_id));
    assert_eq!(graph.label_hit_test(DataPoint::new(-10.0, -10.0)), None);

    graph.update_appearance(|look| look.show_labels = false);
    assert!(graph.label_chips().is_empty());
    assert_eq!(graph.label_hit_test(inside_second), None);
}

#[test]
fn busy_renderer_is_rejected_on_add() {
    let mut graph = Graph::new(RecordingSurfaceProvider::new());
    let renderer = shared(line("busy"));
    let _guard = renderer.borrow_mut();
    assert!(graph.add(renderer.clone()).is_err());
    assert_eq!(graph.renderer_count(), 0);
}
