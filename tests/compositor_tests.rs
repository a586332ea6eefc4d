use plot_rs::core::{DataPoint, Rectangle};
use plot_rs::graph::InvalidationLevel;
use plot_rs::render::{
    Primitive, RecordingSurface, RecordingSurfaceProvider, RecordingTarget, TargetOp,
};
use plot_rs::renderers::{Line, shared};
use plot_rs::Graph;
use std::cell::Cell;
use std::rc::Rc;

fn sized_graph(provider: RecordingSurfaceProvider) -> Graph {
    let mut graph = Graph::with_axes(provider, (0.0, 10.0), (0.0, 10.0));
    graph.dimensions_mut().update(5.0, 7.0, 120.0, 80.0);
    graph
}

#[test]
fn first_draw_composes_everything_and_presents_both_surfaces() {
    let provider = RecordingSurfaceProvider::new();
    let counter = provider.counter();
    let mut graph = sized_graph(provider);
    let mut target = RecordingTarget::new();

    graph.draw(&mut target).expect("draw");

    let stats = graph.compositor_stats();
    assert_eq!(stats.full_recompositions, 1);
    assert_eq!(stats.overlay_recompositions, 1);
    assert_eq!(stats.presents, 1);
    assert_eq!(counter.created(), 3);
    assert_eq!(counter.live(), 3);

    assert_eq!(target.ops.len(), 2);
    for op in &target.ops {
        let TargetOp::Composite { x, y, .. } = op else {
            panic!("expected composites only");
        };
        assert_eq!((*x, *y), (5.0, 7.0));
    }
}

#[test]
fn ruler_motion_recomposes_only_the_overlay() {
    let mut graph = sized_graph(RecordingSurfaceProvider::new());
    let mut target = RecordingTarget::new();
    graph.draw(&mut target).expect("draw");

    let redraws = Rc::new(Cell::new(0));
    let counter = Rc::clone(&redraws);
    graph.connect_redraw_requested(move || counter.set(counter.get() + 1));

    for x in [10.0, 20.0, 30.0] {
        graph.set_ruler(Some(DataPoint::new(x, 40.0)));
        graph.draw(&mut target).expect("draw");
    }

    let stats = graph.compositor_stats();
    assert_eq!(stats.full_recompositions, 1);
    assert_eq!(stats.overlay_recompositions, 4);
    assert_eq!(redraws.get(), 3);

    let overlay = graph
        .overlay_surface()
        .and_then(|surface| surface.as_any().downcast_ref::<RecordingSurface>())
        .expect("overlay surface");
    assert!(
        overlay
            .frame()
            .primitives
            .iter()
            .any(|primitive| matches!(primitive, Primitive::Line(_)))
    );
}

#[test]
fn data_changes_recompose_the_data_layers() {
    let mut graph = sized_graph(RecordingSurfaceProvider::new());
    let line = shared(Line::new().with_data([DataPoint::new(0.0, 0.0), DataPoint::new(1.0, 1.0)]));
    graph.add(line.clone()).expect("add");
    let mut target = RecordingTarget::new();
    graph.draw(&mut target).expect("draw");

    line.borrow_mut().append(DataPoint::new(2.0, 4.0));
    assert_eq!(graph.process_events(), InvalidationLevel::Full);
    graph.draw(&mut target).expect("draw");

    assert_eq!(graph.compositor_stats().full_recompositions, 2);
    assert_eq!(graph.compositor_stats().surfaces_created, 3);
}

#[test]
fn moving_the_plot_only_presents_again() {
    let mut graph = sized_graph(RecordingSurfaceProvider::new());
    let mut target = RecordingTarget::new();
    graph.draw(&mut target).expect("draw");
    target.clear();

    graph.dimensions_mut().move_to(50.0, 60.0);
    graph.draw(&mut target).expect("draw");

    let stats = graph.compositor_stats();
    assert_eq!(stats.full_recompositions, 1);
    assert_eq!(stats.overlay_recompositions, 1);
    assert_eq!(stats.presents, 2);
    assert!(matches!(
        target.ops.first(),
        Some(TargetOp::Composite { x, y, .. }) if *x == 50.0 && *y == 60.0
    ));
}

#[test]
fn resize_releases_and_recreates_surfaces() {
    let provider = RecordingSurfaceProvider::new();
    let counter = provider.counter();
    let mut graph = sized_graph(provider);
    let mut target = RecordingTarget::new();
    graph.draw(&mut target).expect("draw");

    graph.dimensions_mut().resize(200.0, 100.0);
    assert_eq!(graph.live_surface_count(), 0);
    assert_eq!(counter.live(), 0);

    graph.draw(&mut target).expect("draw");
    assert_eq!(counter.created(), 6);
    assert_eq!(counter.live(), 3);
    assert_eq!(graph.compositor_stats().surfaces_released, 3);
    assert_eq!(graph.compositor_stats().full_recompositions, 2);
}

#[test]
fn dispose_is_idempotent_and_drop_releases_surfaces() {
    let provider = RecordingSurfaceProvider::new();
    let counter = provider.counter();
    let mut graph = sized_graph(provider);
    let mut target = RecordingTarget::new();
    graph.draw(&mut target).expect("draw");

    graph.dispose();
    graph.dispose();
    assert_eq!(counter.live(), 0);
    assert_eq!(graph.compositor_stats().surfaces_released, 3);

    graph.draw(&mut target).expect("draw after dispose");
    assert_eq!(counter.live(), 3);

    drop(graph);
    assert_eq!(counter.live(), 0);
    assert_eq!(counter.created(), 6);
}

#[test]
fn missing_surfaces_or_empty_plot_make_draw_a_no_op() {
    let mut graph = sized_graph(RecordingSurfaceProvider::failing());
    let mut target = RecordingTarget::new();
    graph.draw(&mut target).expect("failing provider is not an error");
    assert!(target.ops.is_empty());
    assert_eq!(graph.live_surface_count(), 0);

    let mut empty = Graph::new(RecordingSurfaceProvider::new());
    empty.draw(&mut target).expect("empty plot");
    assert!(target.ops.is_empty());
    assert_eq!(empty.compositor_stats().presents, 0);
}

#[test]
fn draw_to_renders_once_without_the_ruler() {
    let provider = RecordingSurfaceProvider::new();
    let counter = provider.counter();
    let mut graph = sized_graph(provider);
    graph
        .add(shared(
            Line::new()
                .with_label("series")
                .with_data([DataPoint::new(0.0, 0.0), DataPoint::new(10.0, 10.0)]),
        ))
        .expect("add");
    graph.set_ruler(Some(DataPoint::new(60.0, 40.0)));

    let mut target = RecordingTarget::new();
    graph
        .draw_to(&mut target, &Rectangle::new(100.0, 200.0, 300.0, 150.0))
        .expect("draw to");

    assert_eq!(counter.created(), 0);
    assert_eq!(target.ops.len(), 1);
    let TargetOp::Frame(frame) = &target.ops[0] else {
        panic!("expected a direct frame");
    };
    assert_eq!(frame.viewport.width, 300);
    assert!(
        !frame
            .primitives
            .iter()
            .any(|primitive| matches!(primitive, Primitive::Circle(_)))
    );
    let Some(Primitive::Rect(background)) = frame.primitives.first() else {
        panic!("background first");
    };
    assert_eq!((background.x, background.y), (100.0, 200.0));
}
