use approx::assert_relative_eq;
use chart_layout::core::IntervalItem;
use chart_layout::core::number::{
    add_commas, add_safe, asc, get_percent_seats, get_percent_with_precision, get_pixel_precision,
    get_precision, get_precision_safe, linear_map, nice, parse_percent, quantile,
    quantity_exponent, reform_intervals, rem_radian, round, round_to_string,
};

#[test]
fn linear_map_handles_reversed_and_collapsed_extents() {
    assert_eq!(linear_map(5.0, [0.0, 10.0], [100.0, 200.0], false), 150.0);
    assert_eq!(linear_map(5.0, [10.0, 0.0], [0.0, 100.0], false), 50.0);
    assert_eq!(linear_map(3.0, [2.0, 2.0], [0.0, 100.0], false), 50.0);
    assert_eq!(linear_map(3.0, [2.0, 2.0], [7.0, 7.0], false), 7.0);
}

#[test]
fn linear_map_clamps_to_range_endpoints() {
    assert_eq!(linear_map(-5.0, [0.0, 10.0], [0.0, 1.0], true), 0.0);
    assert_eq!(linear_map(15.0, [0.0, 10.0], [0.0, 1.0], true), 1.0);
    assert_eq!(linear_map(15.0, [10.0, 0.0], [0.0, 1.0], true), 0.0);
    assert_eq!(linear_map(-1.0, [10.0, 0.0], [0.0, 1.0], true), 1.0);
    assert_eq!(linear_map(15.0, [0.0, 10.0], [0.0, 1.0], false), 1.5);
}

#[test]
fn parse_percent_supports_keywords_and_numbers() {
    assert_eq!(parse_percent("50%", 400.0), 200.0);
    assert_eq!(parse_percent("center", 400.0), 200.0);
    assert_eq!(parse_percent("right", 400.0), 400.0);
    assert_eq!(parse_percent("top", 400.0), 0.0);
    assert_eq!(parse_percent("12.5", 400.0), 12.5);
    assert!(parse_percent("abc", 400.0).is_nan());
}

#[test]
fn round_removes_binary_float_noise() {
    assert_eq!(round(0.1 + 0.2, 10), 0.3);
    assert_eq!(round(1.2345, 2), 1.23);
    assert_eq!(round(-2.5, 0), -3.0);
    assert_eq!(round_to_string(1.5, 2), "1.50");
    assert!(round(f64::NAN, 2).is_nan());
}

#[test]
fn precision_helpers_count_decimals() {
    assert_eq!(get_precision(1.0), 0);
    assert_eq!(get_precision(0.25), 2);
    assert_eq!(get_precision(123.456), 3);
    assert_eq!(get_precision_safe(3.4e-10), 11);
    assert_eq!(get_precision_safe(1.5e3), 0);
    assert_eq!(get_precision_safe(0.125), 3);
}

#[test]
fn pixel_precision_tracks_data_density() {
    assert_eq!(get_pixel_precision([0.0, 1.0], [0.0, 100.0]), 2);
    assert_eq!(get_pixel_precision([0.0, 1000.0], [0.0, 100.0]), 0);
}

#[test]
fn percent_seats_use_largest_remainder() {
    assert_eq!(get_percent_seats(&[1.0, 1.0, 1.0], 0), vec![34.0, 33.0, 33.0]);
    assert_eq!(get_percent_seats(&[1.0, 2.0, 1.0], 0), vec![25.0, 50.0, 25.0]);
    assert!(get_percent_seats(&[0.0, 0.0], 2).is_empty());

    let seats = get_percent_seats(&[1.0, 1.0, 1.0], 2);
    assert_relative_eq!(seats.iter().sum::<f64>(), 100.0, epsilon = 1e-9);
    assert_relative_eq!(seats[0], 33.34, epsilon = 1e-9);
}

#[test]
fn percent_with_precision_is_zero_for_empty_slots() {
    let values = [3.0, 0.0, 1.0];
    assert_eq!(get_percent_with_precision(&values, 0, 0), 75.0);
    assert_eq!(get_percent_with_precision(&values, 1, 0), 0.0);
    assert_eq!(get_percent_with_precision(&values, 9, 0), 0.0);
}

#[test]
fn add_safe_keeps_decimal_precision() {
    assert_eq!(add_safe(0.1, 0.2), 0.3);
    assert_eq!(add_safe(1.25, 2.5), 3.75);
}

#[test]
fn rem_radian_wraps_into_full_turn() {
    let turn = std::f64::consts::PI * 2.0;
    assert_relative_eq!(rem_radian(-std::f64::consts::FRAC_PI_2), turn * 0.75, epsilon = 1e-12);
    assert_relative_eq!(rem_radian(turn + 1.0), 1.0, epsilon = 1e-12);
}

#[test]
fn nice_snaps_to_friendly_steps() {
    assert_eq!(quantity_exponent(1234.0), 3);
    assert_eq!(quantity_exponent(1000.0), 3);
    assert_eq!(quantity_exponent(0.05), -2);
    assert_eq!(nice(0.23, true), 0.2);
    assert_eq!(nice(0.23, false), 0.3);
    assert_eq!(nice(37.0, true), 30.0);
    assert_eq!(nice(45.0, true), 50.0);
    assert_eq!(nice(80.0, true), 100.0);
    assert_eq!(nice(20.0, false), 30.0);
}

#[test]
fn quantile_interpolates_between_neighbors() {
    let mut values = vec![443.0, 12.0, 232.0];
    asc(&mut values);
    assert_eq!(values, vec![12.0, 232.0, 443.0]);
    assert_eq!(quantile(&values, 0.0), 12.0);
    assert_eq!(quantile(&values, 0.25), 122.0);
    assert_eq!(quantile(&values, 0.5), 232.0);
    assert_eq!(quantile(&values, 0.75), 337.5);
    assert_eq!(quantile(&values, 1.0), 443.0);
    assert!(quantile(&[], 0.5).is_nan());
}

#[test]
fn reform_intervals_sorts_and_flips_shared_closures() {
    let reformed = reform_intervals(vec![
        IntervalItem::new([10.0, 20.0], [true, true]),
        IntervalItem::new([0.0, 10.0], [true, true]),
        IntervalItem::new([f64::NEG_INFINITY, 0.0], [false, true]),
    ]);

    assert_eq!(reformed.len(), 3);
    assert_eq!(reformed[0].interval, [f64::NEG_INFINITY, 0.0]);
    assert_eq!(reformed[1].interval, [0.0, 10.0]);
    assert_eq!(reformed[1].close, [false, true]);
    assert_eq!(reformed[2].interval, [10.0, 20.0]);
    assert_eq!(reformed[2].close, [false, true]);
}

#[test]
fn add_commas_groups_integer_digits() {
    assert_eq!(add_commas("1234567.891"), "1,234,567.891");
    assert_eq!(add_commas("-1234"), "-1,234");
    assert_eq!(add_commas("12"), "12");
    assert_eq!(add_commas("abc"), "abc");
}
