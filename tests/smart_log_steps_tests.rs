use approx::assert_relative_eq;
use chart_layout::core::{SmartLogStepsOptions, smart_log_steps};

fn is_power_of_ten(value: f64) -> bool {
    let exponent = value.log10().round();
    (10_f64.powf(exponent) - value).abs() <= value * 1e-12
}

#[test]
fn wide_positive_span_uses_power_of_ten_steps() {
    let steps = smart_log_steps(&SmartLogStepsOptions::new(1.0, 1000.0).with_split_number(5));

    assert!(steps.log_positive);
    assert!(steps.ticks.iter().all(|tick| is_power_of_ten(*tick)));
    assert!(steps.ticks.windows(2).all(|pair| pair[0] < pair[1]));
    assert!(steps.ticks.first().is_some_and(|first| *first <= 1.0));
    assert!(steps.ticks.last().is_some_and(|last| *last >= 1000.0));
    assert_eq!(steps.ticks, vec![0.1, 1.0, 10.0, 100.0, 1000.0, 10_000.0]);
    assert_relative_eq!(steps.value_to_log(steps.ticks[0]), 0.0, epsilon = 1e-12);
}

#[test]
fn narrow_span_uses_one_two_four_ladder() {
    let steps = smart_log_steps(&SmartLogStepsOptions::new(1.0, 50.0));
    assert_eq!(steps.ticks, vec![1.0, 2.0, 4.0, 10.0, 20.0, 40.0, 100.0]);
    assert_relative_eq!(steps.data_min, 0.0, epsilon = 1e-12);
    assert_relative_eq!(steps.data_max, 100_f64.ln(), epsilon = 1e-12);
}

#[test]
fn negative_data_mirrors_ticks() {
    let steps = smart_log_steps(&SmartLogStepsOptions::new(-1000.0, -1.0));

    assert!(!steps.log_positive);
    assert!(steps.ticks.iter().all(|tick| *tick < 0.0));
    assert!(steps.ticks.windows(2).all(|pair| pair[0] < pair[1]));
    assert!(steps.ticks.first().is_some_and(|first| *first <= -1000.0));
    assert!(steps.ticks.last().is_some_and(|last| *last >= -1.0));
}

#[test]
fn log_mapping_round_trips() {
    let steps = smart_log_steps(&SmartLogStepsOptions::new(3.0, 70_000.0));
    for value in [3.0, 42.0, 999.0, 70_000.0] {
        let log = steps.value_to_log(value);
        assert_relative_eq!(steps.log_to_value(log), value, max_relative = 1e-12);
    }
    assert!(steps.value_to_log(f64::NAN).is_nan());
}

#[test]
fn equal_bounds_still_produce_a_span() {
    let steps = smart_log_steps(&SmartLogStepsOptions::new(5.0, 5.0));
    assert!(!steps.ticks.is_empty());
    assert!(steps.data_max > steps.data_min);
}

#[test]
fn non_finite_bounds_fall_back() {
    let steps = smart_log_steps(&SmartLogStepsOptions::new(f64::NAN, f64::INFINITY));
    assert!(!steps.ticks.is_empty());
    assert!(steps.ticks.iter().all(|tick| tick.is_finite()));
}

#[test]
fn label_base_formats_exponents() {
    let steps = smart_log_steps(
        &SmartLogStepsOptions::new(1.0, 1024.0)
            .with_split_number(5)
            .with_log_label_base(2.0),
    );
    assert!(steps.ticks.iter().all(|tick| (tick.log2() - tick.log2().round()).abs() < 1e-9));
    assert_eq!(steps.format_label(8.0), "2^3");

    let plain = smart_log_steps(&SmartLogStepsOptions::new(1.0, 1000.0));
    assert_eq!(plain.format_label(10_000.0), "10,000");
}
