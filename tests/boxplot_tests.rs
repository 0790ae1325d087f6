use approx::assert_relative_eq;
use chart_layout::core::{Axis, IntervalScale, NiceExtentOptions, OrdinalScale};
use chart_layout::layout::boxplot::BOX_END_POINTS;
use chart_layout::layout::{
    BoxplotOptions, BoxplotOrientation, BoxplotSeries, layout_boxplot, prepare_boxplot_data,
};
use chart_layout::ChartError;

fn category_axis() -> Axis {
    Axis::new(OrdinalScale::new(["a", "b", "c"]), 0.0, 300.0)
}

fn value_axis() -> Axis {
    let mut scale = IntervalScale::new(0.0, 100.0);
    scale.nice_extent(NiceExtentOptions::default().with_split_number(5));
    Axis::new(scale, 300.0, 0.0)
}

#[test]
fn five_number_summary_interpolates_quartiles() {
    let data = prepare_boxplot_data(&[vec![443.0, 12.0, 232.0]], &BoxplotOptions::default())
        .expect("boxplot data");

    assert_eq!(data.box_data, vec![[12.0, 122.0, 232.0, 337.5, 443.0]]);
    assert!(data.outliers.is_empty());
    assert_eq!(data.axis_data, vec!["0".to_owned()]);
}

#[test]
fn values_beyond_fences_become_outliers() {
    let raw = vec![vec![10.0, 20.0], vec![1.0, 2.0, 3.0, 4.0, 100.0, f64::NAN]];
    let data = prepare_boxplot_data(&raw, &BoxplotOptions::default()).expect("boxplot data");

    // Q1 2, Q3 4: the upper fence is 7.
    assert_eq!(data.box_data[1], [1.0, 2.0, 3.0, 4.0, 7.0]);
    assert_eq!(data.outliers, vec![[1.0, 100.0]]);

    let vertical = prepare_boxplot_data(
        &raw,
        &BoxplotOptions::default().with_layout(BoxplotOrientation::Vertical),
    )
    .expect("boxplot data");
    assert_eq!(vertical.outliers, vec![[100.0, 1.0]]);

    let extremes = prepare_boxplot_data(&raw, &BoxplotOptions::default().with_bound_iqr(None))
        .expect("boxplot data");
    assert_eq!(extremes.box_data[1][4], 100.0);
    assert!(extremes.outliers.is_empty());
}

#[test]
fn empty_group_gives_nan_box() {
    let data = prepare_boxplot_data(&[vec![], vec![f64::NAN]], &BoxplotOptions::default())
        .expect("boxplot data");
    assert_eq!(data.box_data.len(), 2);
    assert!(data.box_data.iter().flatten().all(|value| value.is_nan()));
}

#[test]
fn negative_bound_is_rejected() {
    let result = prepare_boxplot_data(&[vec![1.0]], &BoxplotOptions::default().with_bound_iqr(Some(-1.0)));
    assert!(matches!(result, Err(ChartError::InvalidConfig(_))));
}

#[test]
fn single_series_box_geometry() {
    let series = BoxplotSeries::new(vec![0.0], vec![[10.0, 20.0, 30.0, 40.0, 50.0]]);
    let layouts = layout_boxplot(
        &[series],
        &category_axis(),
        &value_axis(),
        BoxplotOrientation::Horizontal,
    )
    .expect("boxplot layout");

    let layout = &layouts[0][0];
    // Available width 78 is capped by the default 50 px maximum.
    assert_eq!(layout.box_width, 50.0);
    assert_eq!(layout.ends.len(), BOX_END_POINTS);
    assert_relative_eq!(layout.initial_base_value, 210.0, epsilon = 1e-9);

    assert_relative_eq!(layout.ends[0][0], 25.0, epsilon = 1e-9);
    assert_relative_eq!(layout.ends[0][1], 240.0, epsilon = 1e-9);
    assert_relative_eq!(layout.ends[2][0], 75.0, epsilon = 1e-9);
    assert_relative_eq!(layout.ends[2][1], 180.0, epsilon = 1e-9);
    // Whiskers run through the box center.
    assert_relative_eq!(layout.ends[4][0], 50.0, epsilon = 1e-9);
    assert_relative_eq!(layout.ends[4][1], 270.0, epsilon = 1e-9);
    assert_relative_eq!(layout.ends[6][1], 150.0, epsilon = 1e-9);
    // Median line.
    assert_relative_eq!(layout.ends[12][1], 210.0, epsilon = 1e-9);
    assert_relative_eq!(layout.ends[13][0] - layout.ends[12][0], 50.0, epsilon = 1e-9);
}

#[test]
fn multiple_series_sit_side_by_side() {
    let stats = vec![[10.0, 20.0, 30.0, 40.0, 50.0]];
    let series = [
        BoxplotSeries::new(vec![0.0], stats.clone()),
        BoxplotSeries::new(vec![0.0], stats).with_box_width(1.0, "100%"),
    ];
    let layouts = layout_boxplot(
        &series,
        &category_axis(),
        &value_axis(),
        BoxplotOrientation::Horizontal,
    )
    .expect("boxplot layout");

    let left = layouts[0][0].ends[4][0];
    let right = layouts[1][0].ends[4][0];
    assert_relative_eq!(50.0 - left, right - 50.0, epsilon = 1e-9);
    assert_relative_eq!(right - left, 44.85, epsilon = 1e-9);
    assert_relative_eq!(layouts[1][0].box_width, 33.15, epsilon = 1e-9);
}

#[test]
fn vertical_boxes_swap_dimensions() {
    let base_axis = Axis::new(OrdinalScale::new(["a"]), 0.0, 100.0);
    let mut scale = IntervalScale::new(0.0, 100.0);
    scale.nice_extent(NiceExtentOptions::default().with_split_number(5));
    let value_axis = Axis::new(scale, 0.0, 400.0);

    let data = prepare_boxplot_data(&[vec![443.0, 12.0, 232.0]], &BoxplotOptions::default())
        .expect("boxplot data");
    let series = BoxplotSeries::from_data(&data);
    assert_eq!(series.base_values, vec![0.0]);

    let layouts = layout_boxplot(&[series], &base_axis, &value_axis, BoxplotOrientation::Vertical)
        .expect("boxplot layout");
    let layout = &layouts[0][0];
    // Category center lands on y, the median on x.
    assert_relative_eq!(layout.ends[5][1], 50.0, epsilon = 1e-9);
    assert_relative_eq!(layout.initial_base_value, value_axis.data_to_coord(232.0, false), epsilon = 1e-9);
}

#[test]
fn mismatched_boxplot_series_is_rejected() {
    let series = BoxplotSeries::new(vec![0.0, 1.0], vec![[1.0, 2.0, 3.0, 4.0, 5.0]]);
    let result = layout_boxplot(
        &[series],
        &category_axis(),
        &value_axis(),
        BoxplotOrientation::Horizontal,
    );
    assert!(matches!(result, Err(ChartError::InvalidData(_))));
}
