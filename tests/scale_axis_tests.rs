//! Position scale rounding stability and axis renderer geometry.

use chart_core::axis::{AxisEdge, AxisRange, AxisRenderer};
use chart_core::format::{AxisFormat, TimeUnit};
use chart_core::path::PathCommand;
use chart_core::scales::PositionScale;

#[test]
fn position_round_trip_stays_within_rounding_tolerance() {
    for inverted in [false, true] {
        let scale = PositionScale::new(500.0, inverted);
        for i in 0..=20 {
            let position = i as f32 / 20.0;
            let px = scale.position_to_coordinate(position);
            let back = scale.coordinate_to_position(px);
            // One decimal of pixel rounding over 500 px: at most 0.0001.
            assert!(
                (back - position).abs() < 1e-3,
                "{position} -> {px} -> {back} (inverted: {inverted})"
            );
        }
    }
}

#[test]
fn repeated_conversion_is_stable() {
    let scale = PositionScale::new(333.0, false);
    let px = scale.position_to_coordinate(0.37);
    let again = scale.position_to_coordinate(scale.coordinate_to_position(px));
    assert_eq!(px, again);
}

#[test]
fn zero_length_scale_degrades_quietly() {
    let scale = PositionScale::new(0.0, false);
    assert_eq!(scale.position_to_coordinate(0.5), 0.0);
    assert_eq!(scale.coordinate_to_position(10.0), 0.0);
}

#[test]
fn bottom_axis_maps_min_left_and_max_right() {
    let axis = AxisRenderer::new(AxisEdge::Bottom);
    let range = AxisRange::new(0.0, 100.0);
    assert_eq!(axis.position_of(&range, 0.0, 500.0), 0.0);
    assert_eq!(axis.position_of(&range, 100.0, 500.0), 500.0);
    assert!((axis.value_at(&range, 250.0, 500.0) - 50.0).abs() < 1e-3);
}

#[test]
fn left_axis_grows_upward() {
    let axis = AxisRenderer::new(AxisEdge::Left);
    let range = AxisRange::new(0.0, 100.0);
    // Screen y runs downward, so the maximum sits at pixel 0.
    assert_eq!(axis.position_of(&range, 100.0, 400.0), 0.0);
    assert_eq!(axis.position_of(&range, 0.0, 400.0), 400.0);
    assert!((axis.value_at(&range, 0.0, 400.0) - 100.0).abs() < 1e-3);
}

#[test]
fn layout_pairs_every_tick_with_a_grid_line() {
    let axis = AxisRenderer::new(AxisEdge::Bottom);
    let range = AxisRange::new(0.0, 100.0);
    let layout = axis.layout(&range, 500.0, 200.0);

    assert!(!layout.ticks.is_empty());
    assert_eq!(layout.ticks.len(), layout.grid.len());
    for tick in &layout.ticks {
        assert!(range.contains(tick.value));
        assert!(tick.pixel >= 0.0 && tick.pixel <= 500.0);
        assert!(!tick.label.is_empty());
    }
    // Horizontal axis: grid lines drop through the plot's cross dimension.
    let first = &layout.grid[0];
    assert!(matches!(first.commands()[1], PathCommand::LineTo(p) if p.y == 200.0));
}

#[test]
fn shorter_axes_carry_fewer_ticks() {
    let axis = AxisRenderer::new(AxisEdge::Bottom);
    let range = AxisRange::new(0.0, 1000.0);
    let long = axis.layout(&range, 900.0, 100.0).ticks.len();
    let short = axis.layout(&range, 150.0, 100.0).ticks.len();
    assert!(long > short, "{long} vs {short}");
}

#[test]
fn time_formatted_axis_labels_ticks_with_dates() {
    let axis =
        AxisRenderer::new(AxisEdge::Bottom).with_format(AxisFormat::Time(TimeUnit::Seconds));
    // 2024-01-01 .. 2024-06-01 as unix seconds: month-scale span.
    let range = AxisRange::new(1_704_067_200.0, 1_717_200_000.0);
    let layout = axis.layout(&range, 800.0, 100.0);
    assert!(!layout.ticks.is_empty());
    // Month/year labels, not bare numbers.
    for tick in &layout.ticks {
        assert!(
            tick.label.chars().any(|c| c.is_ascii_alphabetic()),
            "{}",
            tick.label
        );
    }
}

#[test]
fn break_path_starts_at_the_near_value() {
    let axis = AxisRenderer::new(AxisEdge::Bottom);
    let range = AxisRange::new(0.0, 100.0);
    let path = axis.break_path(&range, 40.0, 60.0, 500.0, 16.0, 6.0);

    let commands = path.commands();
    assert!(commands.len() > 2, "waved segment should subdivide");
    assert!(matches!(commands[0], PathCommand::MoveTo(p) if p.x == 200.0 && p.y == 0.0));
}
