use std::f64::consts::PI;

use approx::assert_relative_eq;
use chart_layout::core::Rect;
use chart_layout::layout::{PieOptions, RoseType, layout_pie, layout_pie_radians};
use chart_layout::ChartError;

fn view() -> Rect {
    Rect::new(0.0, 0.0, 200.0, 200.0)
}

fn sweep_degrees(start: f64, end: f64) -> f64 {
    (end - start).abs()
}

#[test]
fn slices_close_the_full_turn() {
    let slices = layout_pie(&[1.0, 2.0, 3.0, 4.0], view(), &PieOptions::default()).expect("pie");

    assert_eq!(slices.len(), 4);
    let first = slices[0].sector;
    assert_eq!((first.cx, first.cy, first.r0, first.r), (100.0, 100.0, 0.0, 75.0));
    // Clockwise slices store [end, start] so the first one ends at 90 degrees.
    assert_eq!(first.end_angle, 90.0);

    let last = slices[3].sector;
    assert_relative_eq!(last.start_angle, -270.0, epsilon = 0.011);
    let total: f64 = slices
        .iter()
        .map(|slice| sweep_degrees(slice.sector.start_angle, slice.sector.end_angle))
        .sum();
    assert_relative_eq!(total, 360.0, epsilon = 0.011);

    let percents: Vec<f64> = slices.iter().map(|slice| slice.percent).collect();
    assert_eq!(percents, vec![10.0, 20.0, 30.0, 40.0]);
}

#[test]
fn neighbouring_slices_share_edges() {
    let slices = layout_pie(&[5.0, 1.0, 7.0], view(), &PieOptions::default()).expect("pie");
    for pair in slices.windows(2) {
        assert_eq!(pair[0].sector.start_angle, pair[1].sector.end_angle);
    }

    let counter = layout_pie(
        &[5.0, 1.0, 7.0],
        view(),
        &PieOptions::default().with_clockwise(false),
    )
    .expect("pie");
    for pair in counter.windows(2) {
        assert_eq!(pair[0].sector.end_angle, pair[1].sector.start_angle);
    }
    assert!(counter.iter().all(|slice| slice.sector.end_angle > slice.sector.start_angle));
}

#[test]
fn nan_values_are_skipped() {
    let slices = layout_pie(&[1.0, f64::NAN, 1.0], view(), &PieOptions::default()).expect("pie");
    let indices: Vec<usize> = slices.iter().map(|slice| slice.index).collect();
    assert_eq!(indices, vec![0, 2]);
}

#[test]
fn zero_sum_splits_evenly_when_shown() {
    let slices = layout_pie(&[0.0, 0.0], view(), &PieOptions::default()).expect("pie");
    assert_eq!(slices.len(), 2);
    for slice in &slices {
        assert_relative_eq!(
            sweep_degrees(slice.sector.start_angle, slice.sector.end_angle),
            180.0,
            epsilon = 0.011
        );
        assert_eq!(slice.percent, 0.0);
    }

    let with_gap = layout_pie(&[0.0, f64::NAN, 0.0], view(), &PieOptions::default()).expect("pie");
    assert_eq!(with_gap.len(), 2);
    let swept: f64 = with_gap
        .iter()
        .map(|slice| sweep_degrees(slice.sector.start_angle, slice.sector.end_angle))
        .sum();
    assert_relative_eq!(swept, 360.0, epsilon = 0.05);

    let hidden = layout_pie(
        &[0.0, 0.0],
        view(),
        &PieOptions::default().with_still_show_zero_sum(false),
    )
    .expect("pie");
    assert!(hidden.is_empty());
}

#[test]
fn rose_types_scale_radius() {
    let radius = layout_pie(
        &[1.0, 2.0],
        view(),
        &PieOptions::default().with_rose_type(RoseType::Radius),
    )
    .expect("rose");
    assert_relative_eq!(radius[0].sector.r, 45.0, epsilon = 1e-9);
    assert_relative_eq!(radius[1].sector.r, 75.0, epsilon = 1e-9);

    let area = layout_pie(
        &[1.0, 2.0],
        view(),
        &PieOptions::default().with_rose_type(RoseType::Area),
    )
    .expect("rose");
    for slice in &area {
        assert_relative_eq!(
            sweep_degrees(slice.sector.start_angle, slice.sector.end_angle),
            180.0,
            epsilon = 0.011
        );
    }
    assert_relative_eq!(area[0].sector.r, 0.5_f64.sqrt() * 75.0, epsilon = 1e-9);
}

#[test]
fn invalid_pie_options_are_rejected() {
    let result = layout_pie(&[1.0], view(), &PieOptions::default().with_min_angle(400.0));
    assert!(matches!(result, Err(ChartError::InvalidConfig(_))));

    let result = layout_pie(&[1.0], view(), &PieOptions::default().with_pad_angle(-1.0));
    assert!(matches!(result, Err(ChartError::InvalidConfig(_))));

    let result = layout_pie(&[1.0], Rect::new(0.0, 0.0, -5.0, 10.0), &PieOptions::default());
    assert!(result.is_err());
}

#[test]
fn radian_layout_sweeps_clockwise() {
    let slices = layout_pie_radians(&[1.0, 1.0, 2.0], view(), &PieOptions::default())
        .expect("pie radians");
    let slices: Vec<_> = slices.into_iter().map(|slot| slot.expect("slice")).collect();

    // 90 degrees counter-clockwise is 3π/2 in screen radians.
    assert_relative_eq!(slices[0].sector.start_angle, PI * 1.5, epsilon = 1e-9);
    assert_relative_eq!(slices[0].sector.end_angle, PI * 2.0, epsilon = 1e-9);
    assert_relative_eq!(slices[2].sector.end_angle, PI * 3.5, epsilon = 1e-9);

    let percents: Vec<f64> = slices.iter().map(|slice| slice.percent).collect();
    assert_eq!(percents, vec![25.0, 25.0, 50.0]);
}

#[test]
fn radian_layout_redistributes_after_min_angle() {
    let slices = layout_pie_radians(
        &[1.0, f64::NAN, 100.0],
        view(),
        &PieOptions::default().with_min_angle(36.0),
    )
    .expect("pie radians");

    assert!(slices[1].is_none());
    let small = slices[0].expect("small slice").sector;
    let large = slices[2].expect("large slice").sector;
    assert_relative_eq!(small.end_angle - small.start_angle, PI / 5.0, epsilon = 1e-9);
    assert_relative_eq!(large.end_angle - large.start_angle, PI * 1.8, epsilon = 1e-9);
    assert_relative_eq!(large.start_angle, small.end_angle, epsilon = 1e-9);
}
