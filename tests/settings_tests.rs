use plot_rs::core::DataPoint;
use plot_rs::render::{RecordingSurfaceProvider, Rgba};
use plot_rs::renderers::{Line, shared};
use plot_rs::{AxisMode, Graph, GraphSettings, PlotError};

#[test]
fn captured_settings_survive_json_and_reapply() {
    let mut source = Graph::new(RecordingSurfaceProvider::new());
    source.update_appearance(|look| {
        look.show_grid = true;
        look.show_box = true;
        look.background_color = Rgba::rgb(0.0, 0.0, 0.0);
    });
    source.update_axis((-2.0, 8.0), (1.0, 3.0)).expect("axes");
    source.set_auto_margin(0.1, 0.2).expect("margins");
    source.y_ticks_mut().set_visible(false);

    let json = GraphSettings::capture(&source)
        .to_json_pretty()
        .expect("serialize");
    assert!(json.contains("\"x_axis_mode\": \"fixed\""));
    assert!(json.contains("\"background_color\": \"#000000ff\""));

    let mut target = Graph::new(RecordingSurfaceProvider::new());
    GraphSettings::from_json_str(&json)
        .expect("parse")
        .apply(&mut target)
        .expect("apply");

    assert!(target.appearance().show_grid);
    assert!(target.appearance().show_box);
    assert_eq!(target.appearance().background_color, Rgba::rgb(0.0, 0.0, 0.0));
    assert_eq!(target.x_axis().bounds(), (-2.0, 8.0));
    assert_eq!(target.y_axis().bounds(), (1.0, 3.0));
    assert_eq!(target.x_axis_mode(), AxisMode::Fixed);
    assert_eq!(target.auto_margin(), (0.1, 0.2));
    assert!(!target.y_ticks().visible());
}

#[test]
fn auto_axes_are_refitted_after_apply() {
    let mut graph = Graph::new(RecordingSurfaceProvider::new());
    graph
        .add(shared(
            Line::new().with_data([DataPoint::new(0.0, 0.0), DataPoint::new(4.0, 1.0)]),
        ))
        .expect("add");

    let settings = GraphSettings {
        x_axis: [100.0, 200.0],
        y_auto_margin: 0.0,
        ..GraphSettings::default()
    };
    settings.apply(&mut graph).expect("apply");

    assert_eq!(graph.x_axis_mode(), AxisMode::Auto);
    assert_eq!(graph.x_axis().bounds(), (0.0, 4.0));
    assert_eq!(graph.y_axis().bounds(), (0.0, 1.0));
}

#[test]
fn empty_json_is_the_default_settings() {
    let settings = GraphSettings::from_json_str("{}").expect("parse");
    assert_eq!(settings, GraphSettings::default());
}

#[test]
fn invalid_values_are_reported_as_errors() {
    let mut graph = Graph::new(RecordingSurfaceProvider::new());

    let nan_axis = GraphSettings {
        x_axis: [f64::NAN, 1.0],
        ..GraphSettings::default()
    };
    assert!(matches!(nan_axis.apply(&mut graph), Err(PlotError::Settings(_))));

    let bad_aspect = GraphSettings {
        axis_aspect: 0.0,
        ..GraphSettings::default()
    };
    assert!(matches!(bad_aspect.apply(&mut graph), Err(PlotError::Settings(_))));

    assert!(matches!(
        GraphSettings::from_json_str(r#"{ "show_grid": "yes" }"#),
        Err(PlotError::Settings(_))
    ));
}

#[test]
fn keep_aspect_from_settings_is_enforced() {
    let mut graph = Graph::new(RecordingSurfaceProvider::new());
    graph.dimensions_mut().update(0.0, 0.0, 200.0, 100.0);

    let settings = GraphSettings {
        keep_aspect: true,
        x_axis_mode: "fixed".to_owned(),
        y_axis_mode: "fixed".to_owned(),
        x_axis: [0.0, 10.0],
        y_axis: [0.0, 1.0],
        ..GraphSettings::default()
    };
    settings.apply(&mut graph).expect("apply");

    assert!(graph.keep_aspect());
    assert_eq!(graph.x_axis().bounds(), (0.0, 10.0));
    let (min, max) = graph.y_axis().bounds();
    assert!((max - min - 5.0).abs() < 1e-9);
}
