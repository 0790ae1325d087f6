use approx::assert_relative_eq;
use chart_layout::core::{Axis, IntervalScale, Length, Rect};
use chart_layout::layout::{
    ThemeRiverBaseline, ThemeRiverLayer, compute_baseline, layout_theme_river,
};
use chart_layout::ChartError;

fn time_axis() -> Axis {
    Axis::new(IntervalScale::new(0.0, 1.0), 0.0, 100.0)
}

fn no_gap() -> [Length; 2] {
    [Length::Absolute(0.0), Length::Absolute(0.0)]
}

#[test]
fn symmetric_baseline_centers_stack() {
    let base = compute_baseline(&[vec![1.0, 1.0], vec![1.0, 3.0]], ThemeRiverBaseline::Symmetric);
    assert_eq!(base.y0, vec![1.0, 0.0]);
    assert_eq!(base.max, 4.0);
}

#[test]
fn wiggle_baseline_weights_by_reverse_rank() {
    let base = compute_baseline(&[vec![1.0, 1.0], vec![1.0, 3.0]], ThemeRiverBaseline::Wiggle);
    assert_relative_eq!(base.y0[0], 2.0 / 3.0, epsilon = 1e-12);
    assert_relative_eq!(base.y0[1], 0.0, epsilon = 1e-12);
    assert_relative_eq!(base.max, 4.0, epsilon = 1e-12);
}

#[test]
fn missing_values_count_as_zero() {
    let base = compute_baseline(&[vec![2.0, f64::NAN], vec![2.0]], ThemeRiverBaseline::Symmetric);
    assert_eq!(base.y0, vec![0.0, 2.0]);
    assert_eq!(base.max, 4.0);
}

#[test]
fn layers_stack_inside_rect() {
    let layers = [
        ThemeRiverLayer::new("a", vec![1.0, 1.0]),
        ThemeRiverLayer::new("b", vec![1.0, 3.0]),
    ];
    let points = layout_theme_river(
        &layers,
        &[0.0, 1.0],
        &time_axis(),
        Rect::new(0.0, 0.0, 100.0, 100.0),
        &no_gap(),
        ThemeRiverBaseline::Symmetric,
    )
    .expect("theme river");

    assert_eq!(points.len(), 2);
    let (a, b) = (&points[0], &points[1]);
    assert_eq!(a[0].x, 0.0);
    assert_eq!(a[1].x, 100.0);
    assert_eq!(b[1].layer_index, 1);

    // Total 2 at t0 is centered: the band spans 25..75.
    assert_eq!(a[0].y0, 25.0);
    assert_eq!(a[0].y, 25.0);
    assert_eq!(b[0].y0, 50.0);
    assert_eq!(b[0].y0 + b[0].y, 75.0);
    // The tallest timestamp fills the rect.
    assert_eq!(a[1].y0, 0.0);
    assert_eq!(b[1].y0 + b[1].y, 100.0);
}

#[test]
fn boundary_gap_shrinks_the_band() {
    let layers = [ThemeRiverLayer::new("only", vec![2.0, 4.0])];
    let points = layout_theme_river(
        &layers,
        &[0.0, 1.0],
        &time_axis(),
        Rect::new(0.0, 20.0, 100.0, 100.0),
        &[Length::Absolute(10.0), Length::percent(10.0)],
        ThemeRiverBaseline::Symmetric,
    )
    .expect("theme river");

    let tallest = points[0][1];
    assert_eq!(tallest.y0, 30.0);
    assert_eq!(tallest.y, 80.0);
    assert_eq!(points[0][0].y0, 50.0);
}

#[test]
fn empty_and_mismatched_inputs() {
    let empty = layout_theme_river(
        &[],
        &[0.0],
        &time_axis(),
        Rect::new(0.0, 0.0, 10.0, 10.0),
        &no_gap(),
        ThemeRiverBaseline::Symmetric,
    )
    .expect("empty river");
    assert!(empty.is_empty());

    let result = layout_theme_river(
        &[ThemeRiverLayer::new("short", vec![1.0])],
        &[0.0, 1.0],
        &time_axis(),
        Rect::new(0.0, 0.0, 10.0, 10.0),
        &no_gap(),
        ThemeRiverBaseline::Symmetric,
    );
    assert!(matches!(result, Err(ChartError::InvalidData(_))));
}
