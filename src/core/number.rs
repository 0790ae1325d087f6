//! Numeric helpers shared by scales, layouts and visual mapping.
//!
//! Everything here degrades to NaN or a neutral value instead of failing:
//! layout passes run on whatever data the model hands over.

use std::cmp::Ordering;
use std::f64::consts::{LN_10, PI};

use ordered_float::OrderedFloat;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};

use crate::core::types::{Extent, IntervalItem};

/// Upper bound accepted by [`round`].
pub const ROUND_SUPPORTED_PRECISION_MAX: i32 = 20;

/// Precision used by [`round_default`].
pub const DEFAULT_ROUND_PRECISION: i32 = 10;

pub const RADIAN_EPSILON: f64 = 1e-4;

/// Maps `val` from `domain` into `range`.
///
/// Both extents may be reversed. A collapsed domain yields `range[0]` when the
/// range is collapsed too, otherwise the range midpoint. With `clamp`,
/// out-of-domain values saturate to the nearest range endpoint.
#[must_use]
pub fn linear_map(val: f64, domain: Extent, range: Extent, clamp: bool) -> f64 {
    let [d0, d1] = domain;
    let [r0, r1] = range;
    let sub_domain = d1 - d0;
    let sub_range = r1 - r0;

    if sub_domain == 0.0 {
        return if sub_range == 0.0 { r0 } else { (r0 + r1) / 2.0 };
    }

    // Endpoint shortcuts keep 146.39 - 62.83 style float error off the edges.
    if clamp {
        if sub_domain > 0.0 {
            if val <= d0 {
                return r0;
            } else if val >= d1 {
                return r1;
            }
        } else if val >= d0 {
            return r0;
        } else if val <= d1 {
            return r1;
        }
    } else {
        if val == d0 {
            return r0;
        }
        if val == d1 {
            return r1;
        }
    }

    (val - d0) / sub_domain * sub_range + r0
}

/// Converts `"NN%"`, a keyword or a plain number string into an absolute
/// value relative to `all`. Returns NaN for anything else.
#[must_use]
pub fn parse_percent(text: &str, all: f64) -> f64 {
    let text = match text.trim() {
        "center" | "middle" => "50%",
        "left" | "top" => "0%",
        "right" | "bottom" => "100%",
        other => other,
    };

    match text.strip_suffix('%') {
        Some(number) => parse_float(number) / 100.0 * all,
        None => parse_float(text),
    }
}

fn parse_float(text: &str) -> f64 {
    text.trim().parse::<f64>().unwrap_or(f64::NAN)
}

/// Decimal rounding that avoids binary float artifacts (`0.1 + 0.2`).
///
/// `precision` is clamped to `[0, 20]`; ties round away from zero.
#[must_use]
pub fn round(x: f64, precision: i32) -> f64 {
    if !x.is_finite() {
        return x;
    }
    let precision = precision.clamp(0, ROUND_SUPPORTED_PRECISION_MAX);

    match Decimal::from_f64(x) {
        Some(decimal) => {
            let rounded = decimal
                .round_dp_with_strategy(precision as u32, RoundingStrategy::MidpointAwayFromZero);
            rounded
                .to_string()
                .parse::<f64>()
                .ok()
                .or_else(|| rounded.to_f64())
                .unwrap_or(x)
        }
        // Out of decimal range: the fraction is already below f64 resolution.
        None => format!("{x:.prec$}", prec = precision as usize)
            .parse::<f64>()
            .unwrap_or(x),
    }
}

#[must_use]
pub fn round_default(x: f64) -> f64 {
    round(x, DEFAULT_ROUND_PRECISION)
}

/// Like [`round`] but keeps trailing zeros (`1.5` at precision 2 is `"1.50"`).
#[must_use]
pub fn round_to_string(x: f64, precision: i32) -> String {
    let precision = precision.clamp(0, ROUND_SUPPORTED_PRECISION_MAX);
    format!("{:.prec$}", round(x, precision), prec = precision as usize)
}

/// Sorts ascending in place, NaN last.
pub fn asc(values: &mut [f64]) {
    values.sort_by_key(|value| OrderedFloat(*value));
}

/// Count of significant decimal places of `val`.
#[must_use]
pub fn get_precision(val: f64) -> i32 {
    if val.is_nan() {
        return 0;
    }

    if val > 1e-14 {
        let mut e = 1.0_f64;
        for i in 0..15 {
            if (val * e).round() / e == val {
                return i;
            }
            e *= 10.0;
        }
    }

    get_precision_safe(val)
}

/// String based precision that understands exponent notation.
#[must_use]
pub fn get_precision_safe(val: f64) -> i32 {
    if !val.is_finite() {
        return 0;
    }
    // Shortest round-trip form, always `d[.ddd]e[-]x`.
    let text = format!("{val:e}");
    let (significand, exponent) = text.split_once('e').unwrap_or((text.as_str(), "0"));
    let exponent = exponent.parse::<i32>().unwrap_or(0);
    let decimals = significand
        .split_once('.')
        .map_or(0, |(_, fraction)| fraction.len() as i32);
    (decimals - exponent).max(0)
}

/// Decimal places needed so one pixel step stays distinguishable.
#[must_use]
pub fn get_pixel_precision(data_extent: Extent, pixel_extent: Extent) -> i32 {
    let data_quantity = ((data_extent[1] - data_extent[0]).ln() / LN_10).floor();
    let size_quantity = ((pixel_extent[1] - pixel_extent[0]).abs().ln() / LN_10).round();
    let precision = size_quantity - data_quantity;
    if precision.is_nan() {
        20
    } else {
        precision.clamp(0.0, 20.0) as i32
    }
}

/// Percent of `values[idx]` such that all percents sum to exactly 100.
#[must_use]
pub fn get_percent_with_precision(values: &[f64], idx: usize, precision: i32) -> f64 {
    match values.get(idx) {
        Some(value) if *value != 0.0 && !value.is_nan() => get_percent_seats(values, precision)
            .get(idx)
            .copied()
            .unwrap_or(0.0),
        _ => 0.0,
    }
}

/// Largest-remainder apportionment of 100% across `values`.
///
/// NaN counts as zero; an all-zero input returns an empty list. Ties go to
/// the first largest remainder.
#[must_use]
pub fn get_percent_seats(values: &[f64], precision: i32) -> Vec<f64> {
    let clean = |value: f64| if value.is_nan() { 0.0 } else { value };
    let sum: f64 = values.iter().copied().map(clean).sum();
    if sum == 0.0 {
        return Vec::new();
    }

    let digits = 10_f64.powi(precision);
    let votes_per_quota: Vec<f64> = values
        .iter()
        .map(|value| clean(*value) / sum * digits * 100.0)
        .collect();
    let target_seats = digits * 100.0;

    let mut seats: Vec<f64> = votes_per_quota.iter().map(|votes| votes.floor()).collect();
    let mut current_sum: f64 = seats.iter().sum();
    let mut remainder: Vec<f64> = votes_per_quota
        .iter()
        .zip(&seats)
        .map(|(votes, seat)| votes - seat)
        .collect();

    while current_sum < target_seats {
        let mut max = f64::NEG_INFINITY;
        let mut max_id = None;
        for (idx, value) in remainder.iter().enumerate() {
            if *value > max {
                max = *value;
                max_id = Some(idx);
            }
        }
        let Some(max_id) = max_id else {
            break;
        };
        seats[max_id] += 1.0;
        remainder[max_id] = 0.0;
        current_sum += 1.0;
    }

    seats.into_iter().map(|seat| seat / digits).collect()
}

/// Sum rounded to the larger precision of the operands (`0.1 + 0.2 == 0.3`).
#[must_use]
pub fn add_safe(val0: f64, val1: f64) -> f64 {
    let max_precision = get_precision(val0).max(get_precision(val1));
    let sum = val0 + val1;
    if max_precision > ROUND_SUPPORTED_PRECISION_MAX {
        sum
    } else {
        round(sum, max_precision)
    }
}

/// Normalizes a radian into `[0, 2π)`.
#[must_use]
pub fn rem_radian(radian: f64) -> f64 {
    let pi2 = PI * 2.0;
    (radian % pi2 + pi2) % pi2
}

#[must_use]
pub fn is_radian_around_zero(val: f64) -> bool {
    val > -RADIAN_EPSILON && val < RADIAN_EPSILON
}

/// `10^quantity_exponent(val)`.
#[must_use]
pub fn quantity(val: f64) -> f64 {
    10_f64.powi(quantity_exponent(val))
}

/// Base-10 exponent of the leading digit (`1234` -> 3).
#[must_use]
pub fn quantity_exponent(val: f64) -> i32 {
    if val == 0.0 {
        return 0;
    }

    let mut exp = (val.ln() / LN_10).floor() as i32;
    // ln() loses precision near powers of ten.
    if val / 10_f64.powi(exp) >= 10.0 {
        exp += 1;
    }
    exp
}

/// Snaps `val` to a human-friendly `{1, 2, 3, 5, 10} * 10^k`.
///
/// `round` picks the nearest candidate, otherwise the ceiling candidate.
#[must_use]
pub fn nice(val: f64, round_mode: bool) -> f64 {
    let exponent = quantity_exponent(val);
    let exp10 = 10_f64.powi(exponent);
    let f = val / exp10;
    let nf = if round_mode {
        if f < 1.5 {
            1.0
        } else if f < 2.5 {
            2.0
        } else if f < 4.0 {
            3.0
        } else if f < 7.0 {
            5.0
        } else {
            10.0
        }
    } else if f < 1.0 {
        1.0
    } else if f < 2.0 {
        2.0
    } else if f < 3.0 {
        3.0
    } else if f < 5.0 {
        5.0
    } else {
        10.0
    };
    let val = nf * exp10;

    if exponent >= -20 {
        round(val, if exponent < 0 { -exponent } else { 0 })
    } else {
        val
    }
}

/// Linear-interpolation quantile over an ascending slice.
///
/// Callers must sort first; an empty slice yields NaN.
#[must_use]
pub fn quantile(asc_values: &[f64], p: f64) -> f64 {
    if asc_values.is_empty() {
        return f64::NAN;
    }
    let big_h = (asc_values.len() as f64 - 1.0) * p + 1.0;
    let h = big_h.floor();
    let Some(v) = (h as usize)
        .checked_sub(1)
        .and_then(|idx| asc_values.get(idx))
        .copied()
    else {
        return f64::NAN;
    };
    let e = big_h - h;
    if e == 0.0 {
        return v;
    }
    match asc_values.get(h as usize) {
        Some(next) => v + e * (next - v),
        None => f64::NAN,
    }
}

/// Sorts intervals ascending and clips overlaps.
///
/// Shared boundaries end up with complementary closures so no value is
/// covered twice; zero-width intervals that are not fully closed are dropped.
#[must_use]
pub fn reform_intervals(mut list: Vec<IntervalItem>) -> Vec<IntervalItem> {
    list.sort_by(|a, b| {
        if little_than(a, b, 0) {
            Ordering::Less
        } else if little_than(b, a, 0) {
            Ordering::Greater
        } else {
            Ordering::Equal
        }
    });

    let mut curr = f64::NEG_INFINITY;
    let mut curr_close = true;
    let mut reformed = Vec::with_capacity(list.len());
    for mut item in list {
        for lg in 0..2 {
            if item.interval[lg] <= curr {
                item.interval[lg] = curr;
                item.close[lg] = if lg == 0 { !curr_close } else { true };
            }
            curr = item.interval[lg];
            curr_close = item.close[lg];
        }

        if item.interval[0] == item.interval[1] && !(item.close[0] && item.close[1]) {
            continue;
        }
        reformed.push(item);
    }

    reformed
}

fn little_than(a: &IntervalItem, b: &IntervalItem, lg: usize) -> bool {
    let closure = |item: &IntervalItem| i8::from(item.close[lg]);
    a.interval[lg] < b.interval[lg]
        || (a.interval[lg] == b.interval[lg]
            && ((closure(a) - closure(b) == if lg == 0 { 1 } else { -1 })
                || (lg == 0 && little_than(a, b, 1))))
}

/// Greatest common divisor (Euclid on floats, as used for tick intervals).
#[must_use]
pub fn gcd(a: f64, b: f64) -> f64 {
    let (mut a, mut b) = (a, b);
    while b != 0.0 {
        let rem = a % b;
        a = b;
        b = rem;
    }
    a
}

#[must_use]
pub fn lcm(a: f64, b: f64) -> f64 {
    a * b / gcd(a, b)
}

/// Inserts thousands separators into the integer part of a decimal string.
#[must_use]
pub fn add_commas(text: &str) -> String {
    let (integer, fraction) = match text.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (text, None),
    };
    let (sign, digits) = match integer.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", integer),
    };
    if !digits.bytes().all(|byte| byte.is_ascii_digit()) {
        return text.to_owned();
    }

    let mut grouped = String::with_capacity(text.len() + digits.len() / 3);
    grouped.push_str(sign);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if let Some(fraction) = fraction {
        grouped.push('.');
        grouped.push_str(fraction);
    }
    grouped
}
