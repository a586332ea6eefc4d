use approx::assert_relative_eq;
use plot_rs::core::{Changeable, TickOptions, Ticks, format_tick, generate_ticks};
use proptest::prelude::*;
use std::cell::Cell;
use std::rc::Rc;

#[test]
fn ten_units_over_hundred_pixels_step_by_five() {
    let layout = generate_ticks((0.0, 10.0), 100, TickOptions::default());
    assert_eq!(layout.size, 5.0);
    assert_eq!(layout.decimals, 0);
    assert_eq!(layout.values.as_slice(), &[0.0, 5.0, 10.0]);
}

#[test]
fn inverted_bounds_match_ordered_bounds() {
    let ordered = generate_ticks((-3.0, 7.0), 400, TickOptions::default());
    let inverted = generate_ticks((7.0, -3.0), 400, TickOptions::default());
    assert_eq!(ordered, inverted);
}

#[test]
fn flat_bounds_are_widened_to_a_unit_span() {
    let layout = generate_ticks((3.0, 3.0), 200, TickOptions::default());
    assert!(!layout.values.is_empty());
    assert!(layout.values[0] <= 2.5);
    assert!(*layout.values.last().expect("last tick") >= 3.5);
}

#[test]
fn zero_pixels_or_non_finite_bounds_give_no_ticks() {
    assert!(generate_ticks((0.0, 1.0), 0, TickOptions::default()).values.is_empty());
    assert!(generate_ticks((f64::NAN, 1.0), 100, TickOptions::default()).values.is_empty());
}

#[test]
fn fixed_tick_size_overrides_the_heuristic() {
    let options = TickOptions {
        tick_size: Some(2.0),
        ..TickOptions::default()
    };
    let layout = generate_ticks((0.0, 10.0), 100, options);
    assert_eq!(layout.size, 2.0);
    assert_eq!(layout.values.len(), 6);
}

#[test]
fn format_never_prints_negative_zero() {
    assert_eq!(format_tick(-0.0001, 2), "0.00");
    assert_eq!(format_tick(-0.0, 0), "0");
    assert_eq!(format_tick(-1.5, 1), "-1.5");
    assert_eq!(format_tick(12.5, 1), "12.5");
}

#[test]
fn ticks_cache_layout_and_notify_on_option_changes() {
    let mut ticks = Ticks::new();
    let hits = Rc::new(Cell::new(0));
    let counter = Rc::clone(&hits);
    ticks.connect_changed(move || counter.set(counter.get() + 1));

    let first = ticks.update((0.0, 10.0), 100).clone();
    assert_eq!(first.size, 5.0);
    assert_eq!(hits.get(), 0);

    ticks.set_tick_size(Some(2.0)).expect("tick size");
    assert_eq!(hits.get(), 1);
    assert_eq!(ticks.update((0.0, 10.0), 100).size, 2.0);
    assert_eq!(ticks.format_label(4.0), "4");

    assert!(ticks.set_tick_size(Some(-1.0)).is_err());
    assert!(ticks.set_length(f64::NAN).is_err());
}

proptest! {
    #[test]
    fn ticks_are_deterministic_and_cover_bounds(
        min in -1.0e6f64..1.0e6,
        span in 1.0e-3f64..1.0e6,
        pixels in 1u32..4_000,
    ) {
        let bounds = (min, min + span);
        let layout = generate_ticks(bounds, pixels, TickOptions::default());
        let again = generate_ticks(bounds, pixels, TickOptions::default());
        prop_assert_eq!(&layout, &again);

        prop_assert!(layout.size > 0.0);
        prop_assert!(layout.values.len() >= 2);
        let slack = layout.size * 1e-6;
        prop_assert!(layout.values[0] <= bounds.0 + slack);
        prop_assert!(*layout.values.last().unwrap() >= bounds.1 - slack);
    }

    #[test]
    fn tick_spacing_is_uniform(
        min in -1.0e4f64..1.0e4,
        span in 1.0e-2f64..1.0e4,
        pixels in 10u32..2_000,
    ) {
        let layout = generate_ticks((min, min + span), pixels, TickOptions::default());
        for pair in layout.values.windows(2) {
            assert_relative_eq!(pair[1] - pair[0], layout.size, max_relative = 1e-6);
        }
    }
}
