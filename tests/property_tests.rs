use chart_layout::core::interval_scale::interval_scale_nice_ticks;
use chart_layout::core::number::{get_percent_seats, linear_map, quantile};
use chart_layout::core::{Axis, IntervalScale, OrdinalScale, Rect};
use chart_layout::layout::{
    BarOptions, BarOrientation, BarSeries, PieOptions, StackInput, layout_bar_grid, layout_pie,
    stack_values,
};
use chart_layout::visual::{VisualPiece, find_piece_index};
use proptest::prelude::*;

proptest! {
    #[test]
    fn clamped_linear_map_stays_inside_range(
        value in -1.0e6f64..1.0e6,
        d0 in -1.0e3f64..1.0e3,
        d_span in 0.001f64..1.0e3,
        r0 in -1.0e3f64..1.0e3,
        r1 in -1.0e3f64..1.0e3
    ) {
        let mapped = linear_map(value, [d0, d0 + d_span], [r0, r1], true);
        prop_assert!(mapped >= r0.min(r1));
        prop_assert!(mapped <= r0.max(r1));
    }

    #[test]
    fn linear_axis_round_trips(
        min in -1.0e4f64..1.0e4,
        span in 0.01f64..1.0e4,
        start in -500.0f64..500.0,
        length in 1.0f64..2_000.0,
        ratio in 0.0f64..1.0,
        inverse in any::<bool>()
    ) {
        let axis = Axis::new(IntervalScale::new(min, min + span), start, start + length)
            .with_inverse(inverse);
        let coord = start + ratio * length;
        let data = axis.coord_to_data(coord, false);
        prop_assert!((axis.data_to_coord(data, false) - coord).abs() < 1e-6);
    }

    #[test]
    fn percent_seats_sum_to_hundred(
        values in prop::collection::vec(0.0f64..1_000.0, 1..12),
        precision in 0i32..4
    ) {
        prop_assume!(values.iter().sum::<f64>() > 0.0);
        let seats = get_percent_seats(&values, precision);
        let total: f64 = seats.iter().sum();
        prop_assert_eq!(seats.len(), values.len());
        prop_assert!((total - 100.0).abs() <= 10f64.powi(-precision));
    }

    #[test]
    fn quantile_hits_both_ends(mut values in prop::collection::vec(-1.0e6f64..1.0e6, 1..40)) {
        values.sort_by(f64::total_cmp);
        prop_assert_eq!(quantile(&values, 0.0), values[0]);
        prop_assert_eq!(quantile(&values, 1.0), values[values.len() - 1]);
    }

    #[test]
    fn nice_tick_extent_lies_inside_extent(
        min in -1.0e6f64..1.0e6,
        span in 0.001f64..1.0e6,
        split in 1usize..12
    ) {
        let extent = [min, min + span];
        let ticks = interval_scale_nice_ticks(extent, split, None, None);
        prop_assert!(ticks.interval > 0.0);
        prop_assert!(ticks.nice_tick_extent[0] >= extent[0]);
        prop_assert!(ticks.nice_tick_extent[1] <= extent[1]);
        prop_assert!(ticks.nice_tick_extent[0] <= ticks.nice_tick_extent[1]);
    }

    #[test]
    fn pie_closes_full_turn(values in prop::collection::vec(0.0f64..1_000.0, 1..16)) {
        let slices = layout_pie(&values, Rect::new(0.0, 0.0, 300.0, 300.0), &PieOptions::default())
            .expect("pie");
        prop_assert_eq!(slices.len(), values.len());
        let swept: f64 = slices
            .iter()
            .map(|slice| (slice.sector.end_angle - slice.sector.start_angle).abs())
            .sum();
        // Every end angle is rounded to 0.01 degrees.
        prop_assert!((swept - 360.0).abs() <= 0.005 * values.len() as f64 + 1e-9);
    }

    #[test]
    fn stacked_bar_tops_match_signed_sums(
        columns in prop::collection::vec(prop::collection::vec(-50.0f64..50.0, 4), 1..6)
    ) {
        let base_axis = Axis::new(OrdinalScale::new(["a", "b", "c", "d"]), 0.0, 400.0);
        let value_axis = Axis::new(IntervalScale::new(-300.0, 300.0), 600.0, 0.0);
        let stacked = BarOptions::default().with_stack("all");
        let series: Vec<BarSeries> = columns
            .iter()
            .enumerate()
            .map(|(idx, values)| {
                BarSeries::new(idx, vec![0.0, 1.0, 2.0, 3.0], values.clone())
                    .with_options(stacked.clone())
            })
            .collect();
        let layouts = layout_bar_grid(&series, &base_axis, &value_axis, BarOrientation::Vertical)
            .expect("bar layout");

        for item in 0..4 {
            let mut positive = 0.0;
            let mut negative = 0.0;
            for (series_idx, values) in columns.iter().enumerate() {
                let value = values[item];
                let sum = if value >= 0.0 {
                    positive += value;
                    positive
                } else {
                    negative += value;
                    negative
                };
                let rect = layouts[series_idx].rects[item].expect("bar");
                let top = rect.y + rect.height;
                prop_assert!((top - value_axis.data_to_coord(sum, false)).abs() < 1e-6);
            }
        }

        let inputs: Vec<StackInput> = columns.iter().cloned().map(StackInput::by_index).collect();
        let stacked_values = stack_values(&inputs).expect("stack");
        let last = stacked_values.last().expect("one series");
        for (item, top) in last.stack_result.iter().enumerate() {
            let expected: f64 = columns
                .iter()
                .map(|values| values[item])
                .filter(|value| (*value >= 0.0) == (columns[columns.len() - 1][item] >= 0.0))
                .sum();
            prop_assert!((top - expected).abs() < 1e-9);
        }
    }

    #[test]
    fn split_line_pieces_match_exactly_one(value in -1.0e12f64..1.0e12) {
        let pieces = vec![
            VisualPiece::interval(f64::NEG_INFINITY, 0.0, [false, true]),
            VisualPiece::interval(0.0, f64::INFINITY, [false, false]),
        ];
        let index = find_piece_index(value, &pieces, false);
        prop_assert_eq!(index, Some(if value <= 0.0 { 0 } else { 1 }));
    }
}
