//! Human-friendly tick placement for logarithmic axes.
//!
//! Wide spans step through integer powers of the label base. Spans of at
//! most two decades (base 10 only) use a finer `{1, 2, 4} * 10^h` ladder
//! encoded as the counter `d = 3h + k` with ticks `10^h * 2^k`.

use std::f64::consts::{LN_2, LN_10};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::number::{add_commas, get_precision, round};

pub const EPSILON: f64 = 1e-9;
pub const DEFAULT_SPLIT_NUMBER: usize = 5;
pub const MIN_BASE_10_SPLIT_NUMBER: usize = 2;

const LN2D10: f64 = LN_2 / LN_10;
const ACCURATE_DIGITS: i32 = 14;

/// Input of [`smart_log_steps`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SmartLogStepsOptions {
    pub data_min: f64,
    pub data_max: f64,
    /// `None` detects the sign from the data.
    #[serde(default)]
    pub log_positive: Option<bool>,
    #[serde(default = "default_split_number")]
    pub split_number: usize,
    /// Base for exponent-style labels. `None` means plain base 10.
    #[serde(default)]
    pub log_label_base: Option<f64>,
}

fn default_split_number() -> usize {
    DEFAULT_SPLIT_NUMBER
}

impl SmartLogStepsOptions {
    #[must_use]
    pub fn new(data_min: f64, data_max: f64) -> Self {
        Self {
            data_min,
            data_max,
            log_positive: None,
            split_number: DEFAULT_SPLIT_NUMBER,
            log_label_base: None,
        }
    }

    #[must_use]
    pub fn with_split_number(mut self, split_number: usize) -> Self {
        self.split_number = split_number;
        self
    }

    #[must_use]
    pub fn with_log_positive(mut self, log_positive: bool) -> Self {
        self.log_positive = Some(log_positive);
        self
    }

    #[must_use]
    pub fn with_log_label_base(mut self, base: f64) -> Self {
        self.log_label_base = Some(base);
        self
    }
}

/// Tick list plus the mapping between values and log-space coordinates.
///
/// `data_min`/`data_max` are log-space coordinates of the first and last
/// tick; the first tick always maps to `0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogSteps {
    pub ticks: Vec<f64>,
    pub data_min: f64,
    pub data_max: f64,
    pub log_positive: bool,
    pub offset: f64,
    pub label_base: Option<f64>,
}

impl LogSteps {
    #[must_use]
    fn sign(&self) -> f64 {
        if self.log_positive { 1.0 } else { -1.0 }
    }

    /// `sign * (ln max(|v|, EPSILON) + offset)`; non-finite input gives NaN.
    #[must_use]
    pub fn value_to_log(&self, value: f64) -> f64 {
        if !value.is_finite() {
            return f64::NAN;
        }
        self.sign() * (value.abs().max(EPSILON).ln() + self.offset)
    }

    #[must_use]
    pub fn log_to_value(&self, log_value: f64) -> f64 {
        if !log_value.is_finite() {
            return f64::NAN;
        }
        let sign = self.sign();
        sign * (sign * log_value - self.offset).exp()
    }

    #[must_use]
    pub fn log_extent(&self) -> [f64; 2] {
        [self.data_min, self.data_max]
    }

    /// Exponent form (`10^3`) with a label base, plain numbers otherwise.
    #[must_use]
    pub fn format_label(&self, value: f64) -> String {
        if !value.is_finite() {
            return String::new();
        }
        match self.label_base {
            Some(base) => {
                let exponent = round(value.abs().max(EPSILON).ln() / base.ln(), 2);
                let sign = if value < 0.0 { "-" } else { "" };
                format!("{sign}{}^{}", format_base(base), exponent)
            }
            None => {
                let precision = get_precision(value.abs()).min(20);
                add_commas(&round(value, precision).to_string())
            }
        }
    }
}

fn format_base(base: f64) -> String {
    if (base - std::f64::consts::E).abs() < EPSILON {
        "e".to_owned()
    } else {
        round(base, 6).to_string()
    }
}

fn fix_accurate(value: f64) -> f64 {
    round(value, ACCURATE_DIGITS)
}

fn around_zero(value: f64) -> bool {
    value.abs() < EPSILON
}

fn to_h(decimal: i64) -> i64 {
    fix_accurate(decimal as f64 / 3.0).floor() as i64
}

fn to_k(decimal: i64) -> i64 {
    decimal - to_h(decimal) * 3
}

fn ladder_log10(decimal: i64) -> f64 {
    to_h(decimal) as f64 + to_k(decimal) as f64 * LN2D10
}

/// Computes log-axis ticks for `[data_min, data_max]`.
///
/// In base mode a data bound that lands exactly on a power of the base gets
/// one extra step outside it: the window start steps down when it coincides
/// with the data minimum, and the tick walk runs one step past the data
/// maximum. `1..1000` with five splits therefore yields
/// `[0.1, 1, 10, 100, 1000, 10000]`.
#[must_use]
pub fn smart_log_steps(options: &SmartLogStepsOptions) -> LogSteps {
    let label_base = options
        .log_label_base
        .filter(|base| base.is_finite() && *base > 0.0 && *base != 1.0);
    let ln_base = label_base.map_or(LN_10, f64::ln);
    let split_number = options.split_number.max(MIN_BASE_10_SPLIT_NUMBER);

    let (mut data_min, mut data_max) = (options.data_min, options.data_max);
    match (data_min.is_finite(), data_max.is_finite()) {
        (false, false) => {
            data_min = 1.0;
            data_max = 1.0;
        }
        (false, true) => data_min = data_max,
        (true, false) => data_max = data_min,
        (true, true) => {
            if data_min > data_max {
                std::mem::swap(&mut data_min, &mut data_max);
            }
        }
    }

    let log_positive = options
        .log_positive
        .unwrap_or(data_max > 0.0 || data_min == 0.0);
    let (abs_min, abs_max) = if log_positive {
        (data_min, data_max)
    } else {
        (-data_max, -data_min)
    };
    let abs_min = abs_min.max(EPSILON);
    let abs_max = abs_max.max(EPSILON);

    let max_data_log = fix_accurate(abs_max.ln() / ln_base);
    let min_data_log = fix_accurate(abs_min.ln() / ln_base);
    let max_expon = max_data_log.ceil() as i64;
    let min_expon = min_data_log.floor() as i64;
    let span_expon = max_expon - min_expon;
    let span_data_log = max_data_log - min_data_log;

    let detail = label_base.is_none() && span_expon <= 2 && split_number > 2;
    let (ticks, offset) = if detail {
        detail_steps(min_expon, max_expon, min_data_log, max_data_log)
    } else {
        base_steps(
            label_base.unwrap_or(10.0),
            ln_base,
            split_number as i64,
            span_expon,
            span_data_log,
            min_data_log,
            max_data_log,
        )
    };

    let sign = if log_positive { 1.0 } else { -1.0 };
    let mut ticks: Vec<f64> = ticks.into_iter().map(|tick| sign * tick).collect();
    if !log_positive {
        ticks.reverse();
    }

    let mut steps = LogSteps {
        ticks,
        data_min: 0.0,
        data_max: 0.0,
        log_positive,
        offset,
        label_base,
    };
    let first = steps.ticks.first().copied().unwrap_or(f64::NAN);
    let last = steps.ticks.last().copied().unwrap_or(f64::NAN);
    steps.data_min = steps.value_to_log(first);
    steps.data_max = steps.value_to_log(last);
    if steps.data_min == steps.data_max {
        steps.data_min -= 1.0;
        steps.data_max += 1.0;
    }

    debug!(
        detail,
        log_positive,
        tick_count = steps.ticks.len(),
        "smart log steps"
    );
    steps
}

fn base_steps(
    base: f64,
    ln_base: f64,
    split_number: i64,
    span_expon: i64,
    span_data_log: f64,
    min_data_log: f64,
    max_data_log: f64,
) -> (Vec<f64>, f64) {
    let split_number = split_number.min(span_expon).max(1);
    let step_expon = ((span_expon as f64 / split_number as f64).floor() as i64).max(1);
    let split_number_adjust = (span_expon as f64 / step_expon as f64).ceil();
    let span_expon_adjust = step_expon as f64 * split_number_adjust;
    let half_diff = (span_expon_adjust - span_data_log) / 2.0;
    let mut min_expon_adjust = fix_accurate(min_data_log - half_diff).floor() as i64;
    if around_zero(min_expon_adjust as f64 - min_data_log) {
        min_expon_adjust -= 1;
    }

    let offset = -(min_expon_adjust as f64) * ln_base;
    let mut ticks = Vec::new();
    let mut n = min_expon_adjust;
    while (n - step_expon) as f64 <= max_data_log {
        ticks.push(base.powi(n as i32));
        n += step_expon;
    }
    (ticks, offset)
}

fn detail_steps(
    min_expon: i64,
    max_expon: i64,
    min_data_log: f64,
    max_data_log: f64,
) -> (Vec<f64>, f64) {
    let mut min_decimal = min_expon * 3;
    let end = min_decimal + 2;
    while min_decimal < end && ladder_log10(min_decimal + 1) < min_data_log {
        min_decimal += 1;
    }

    let mut max_decimal = max_expon * 3;
    let end = max_decimal - 2;
    while max_decimal > end && ladder_log10(max_decimal - 1) > max_data_log {
        max_decimal -= 1;
    }

    let offset = -(to_h(min_decimal) as f64 * LN_10 + to_k(min_decimal) as f64 * LN_2);
    let ticks = (min_decimal..=max_decimal)
        .map(|decimal| 10_f64.powi(to_h(decimal) as i32) * 2_f64.powi(to_k(decimal) as i32))
        .collect();
    (ticks, offset)
}
