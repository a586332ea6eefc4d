use approx::assert_relative_eq;
use plot_rs::core::DataPoint;
use plot_rs::graph::RulerReadout;
use plot_rs::render::RecordingSurfaceProvider;
use plot_rs::renderers::{Line, Renderer, shared};
use plot_rs::Graph;

fn points(data: &[(f64, f64)]) -> Vec<DataPoint> {
    data.iter().copied().map(DataPoint::from).collect()
}

/// 100x100 plot showing `[0, 10]` on both axes.
fn square_graph() -> Graph {
    let mut graph = Graph::with_axes(RecordingSurfaceProvider::new(), (0.0, 10.0), (0.0, 10.0));
    graph.dimensions_mut().update(0.0, 0.0, 100.0, 100.0);
    graph
}

#[test]
fn ruler_without_renderers_is_freestyle() {
    let mut graph = square_graph();
    graph.set_ruler(Some(DataPoint::new(50.0, 25.0)));

    let readout = graph.ruler_readout();
    assert!(readout.is_freestyle());
    let axis = readout.axis_position().expect("axis position");
    assert_relative_eq!(axis.x, 5.0);
    assert_relative_eq!(axis.y, 7.5);
}

#[test]
fn snapped_ruler_reports_the_closest_sample() {
    let mut graph = square_graph();
    let line = shared(Line::new().with_data(points(&[(0.0, 0.0), (4.0, 4.0), (10.0, 10.0)])));
    let id = graph.add(line).expect("add");
    graph.update_axis((0.0, 10.0), (0.0, 10.0)).expect("axes");
    graph.set_ruler(Some(DataPoint::new(45.0, 10.0)));

    let RulerReadout::Probed { hits, .. } = graph.ruler_readout() else {
        panic!("expected a probed readout");
    };
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].renderer, id);
    assert_eq!(hits[0].value, DataPoint::new(4.0, 4.0));
    assert_relative_eq!(hits[0].pixel.x, 40.0);
    assert_relative_eq!(hits[0].pixel.y, 60.0);
    assert!(!hits[0].interpolated);
}

#[test]
fn free_ruler_interpolates_between_samples() {
    let mut graph = square_graph();
    graph.update_appearance(|look| look.snap_ruler_to_data = false);
    graph
        .add(shared(Line::new().with_data(points(&[(0.0, 0.0), (10.0, 5.0)]))))
        .expect("add");
    graph.update_axis((0.0, 10.0), (0.0, 10.0)).expect("axes");
    graph.set_ruler(Some(DataPoint::new(40.0, 0.0)));

    let readout = graph.ruler_readout();
    let hit = readout.hits().first().copied().expect("one hit");
    assert!(hit.interpolated);
    assert_relative_eq!(hit.value.x, 4.0);
    assert_relative_eq!(hit.value.y, 2.0);
}

#[test]
fn extrapolated_positions_fall_back_to_freestyle() {
    let mut graph = square_graph();
    graph
        .add(shared(Line::new().with_data(points(&[(2.0, 2.0), (6.0, 3.0)]))))
        .expect("add");
    graph.update_axis((0.0, 10.0), (0.0, 10.0)).expect("axes");

    graph.set_ruler(Some(DataPoint::new(90.0, 50.0)));
    assert!(graph.ruler_readout().is_freestyle());

    graph.set_ruler(Some(DataPoint::new(50.0, 50.0)));
    assert_eq!(graph.ruler_readout().hits().len(), 1);
}

#[test]
fn hiding_the_ruler_clears_its_position() {
    let mut graph = square_graph();
    graph.set_ruler(Some(DataPoint::new(10.0, 10.0)));
    graph.update_appearance(|look| look.show_ruler = false);

    assert_eq!(graph.ruler(), None);
    assert!(graph.ruler_readout().is_hidden());

    graph.set_ruler(Some(DataPoint::new(f64::NAN, 1.0)));
    assert_eq!(graph.ruler(), None);
}

#[test]
fn first_capable_renderer_receives_the_ruler() {
    let mut graph = square_graph();
    let unsorted = shared(Line::new().with_data(points(&[(5.0, 0.0), (1.0, 1.0)])));
    let sorted = shared(Line::new().with_data(points(&[(0.0, 0.0), (1.0, 1.0)])));

    graph.add(unsorted.clone()).expect("unsorted");
    assert_eq!(graph.ruler_target(), None);
    let id = graph.add(sorted.clone()).expect("sorted");
    assert_eq!(graph.ruler_target(), Some(id));
    assert!(sorted.borrow().has_ruler());
    assert!(!unsorted.borrow().has_ruler());
}

#[test]
fn only_one_renderer_holds_the_ruler() {
    let mut graph = square_graph();
    let first = shared(Line::new().with_data(points(&[(0.0, 0.0), (1.0, 1.0)])));
    let second = shared(Line::new().with_data(points(&[(0.0, 1.0), (1.0, 0.0)])));
    graph.add(first.clone()).expect("first");
    let second_id = graph.add(second.clone()).expect("second");

    second.borrow_mut().set_has_ruler(true);
    graph.process_events();

    assert_eq!(graph.ruler_target(), Some(second_id));
    assert!(!first.borrow().has_ruler());
}

#[test]
fn removing_the_holder_passes_the_ruler_on() {
    let mut graph = square_graph();
    let ids: Vec<_> = (0..3)
        .map(|offset| {
            let offset = f64::from(offset);
            graph
                .add(shared(
                    Line::new().with_data(points(&[(0.0, offset), (1.0, offset)])),
                ))
                .expect("add")
        })
        .collect();
    assert_eq!(graph.ruler_target(), Some(ids[0]));

    assert!(graph.toggle_ruler(ids[1]));
    assert!(graph.remove(ids[1]));
    assert_eq!(graph.ruler_target(), Some(ids[0]));

    assert!(graph.remove(ids[0]));
    assert_eq!(graph.ruler_target(), Some(ids[2]));

    assert!(!graph.remove(ids[0]));
}

#[test]
fn switching_and_toggling_the_ruler() {
    let mut graph = square_graph();
    let ids: Vec<_> = (0..3)
        .map(|_| {
            graph
                .add(shared(Line::new().with_data(points(&[(0.0, 0.0), (1.0, 1.0)]))))
                .expect("add")
        })
        .collect();

    assert_eq!(graph.switch_ruler(true), Some(ids[1]));
    assert_eq!(graph.switch_ruler(true), Some(ids[2]));
    assert_eq!(graph.switch_ruler(true), Some(ids[0]));
    assert_eq!(graph.switch_ruler(false), Some(ids[2]));

    assert!(!graph.toggle_ruler(ids[2]));
    assert_eq!(graph.ruler_target(), None);
    assert!(graph.toggle_ruler(ids[0]));
    assert_eq!(graph.ruler_target(), Some(ids[0]));
}
