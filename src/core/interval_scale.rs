use serde::{Deserialize, Serialize};
use tracing::{trace, warn};

use crate::core::number::{add_commas, get_precision_safe, nice, round, round_default};
use crate::core::scale::{
    NiceExtentOptions, assign_extent, contain_in, fix_nice_extent, normalize_in, scale_in,
};
use crate::core::types::Extent;

/// Hard cap on generated ticks; beyond it the interval is treated as runaway.
pub const TICK_SAFE_LIMIT: usize = 10_000;

pub const DEFAULT_SPLIT_NUMBER: usize = 5;

const DEFAULT_INTERVAL_PRECISION: i32 = 2;

/// Decimal places used when formatting an interval scale label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum LabelPrecision {
    /// Precision of the value itself.
    #[default]
    Value,
    /// Precision derived from the tick interval.
    Auto,
    Fixed(i32),
}

/// Nice tick interval and the tick extent it produces.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NiceTicks {
    pub interval: f64,
    pub interval_precision: i32,
    pub nice_tick_extent: Extent,
}

/// Picks a nice interval for `extent` and the tick extent inside it.
#[must_use]
pub fn interval_scale_nice_ticks(
    extent: Extent,
    split_number: usize,
    min_interval: Option<f64>,
    max_interval: Option<f64>,
) -> NiceTicks {
    let span = extent[1] - extent[0];
    let mut interval = nice(span / split_number.max(1) as f64, true);
    if let Some(min) = min_interval {
        if interval < min {
            interval = min;
        }
    }
    if let Some(max) = max_interval {
        if interval > max {
            interval = max;
        }
    }
    let interval_precision = interval_precision(interval);
    let mut nice_tick_extent = [
        round((extent[0] / interval).ceil() * interval, interval_precision),
        round((extent[1] / interval).floor() * interval, interval_precision),
    ];
    fix_nice_extent(&mut nice_tick_extent, extent);

    NiceTicks {
        interval,
        interval_precision,
        nice_tick_extent,
    }
}

#[must_use]
pub fn interval_precision(interval: f64) -> i32 {
    get_precision_safe(interval) + 2
}

/// Linear continuous scale with nice tick generation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IntervalScale {
    extent: Extent,
    interval: f64,
    nice_extent: Extent,
    interval_precision: i32,
}

impl Default for IntervalScale {
    fn default() -> Self {
        Self {
            extent: [f64::INFINITY, f64::NEG_INFINITY],
            interval: 0.0,
            nice_extent: [f64::INFINITY, f64::NEG_INFINITY],
            interval_precision: DEFAULT_INTERVAL_PRECISION,
        }
    }
}

impl IntervalScale {
    #[must_use]
    pub fn new(start: f64, end: f64) -> Self {
        let mut scale = Self::default();
        scale.set_extent(start, end);
        scale
    }

    #[must_use]
    pub fn extent(&self) -> Extent {
        self.extent
    }

    pub fn set_extent(&mut self, start: f64, end: f64) {
        assign_extent(&mut self.extent, start, end);
    }

    #[must_use]
    pub fn contain(&self, value: f64) -> bool {
        contain_in(value, self.extent)
    }

    #[must_use]
    pub fn normalize(&self, value: f64) -> f64 {
        normalize_in(value, self.extent)
    }

    #[must_use]
    pub fn scale(&self, t: f64) -> f64 {
        scale_in(t, self.extent)
    }

    #[must_use]
    pub fn interval(&self) -> f64 {
        self.interval
    }

    #[must_use]
    pub fn interval_precision(&self) -> i32 {
        self.interval_precision
    }

    #[must_use]
    pub fn nice_tick_extent(&self) -> Extent {
        self.nice_extent
    }

    /// Uses a caller-provided interval; ticks start at the raw extent.
    pub fn set_interval(&mut self, interval: f64) {
        self.interval = interval;
        self.nice_extent = self.extent;
        self.interval_precision = interval_precision(interval);
    }

    pub(crate) fn set_nice_state(&mut self, interval: f64, nice_extent: Extent, precision: i32) {
        self.interval = interval;
        self.nice_extent = nice_extent;
        self.interval_precision = precision;
    }

    /// Tick values from the nice extent, bracketed by the raw extent bounds.
    ///
    /// With `expand_to_nice_extent` the outer ticks are the next interval
    /// multiples instead of the raw bounds. Returns an empty list when the
    /// interval is unset or the walk would exceed [`TICK_SAFE_LIMIT`].
    #[must_use]
    pub fn ticks(&self, expand_to_nice_extent: bool) -> Vec<f64> {
        let interval = self.interval;
        let extent = self.extent;
        let nice_extent = self.nice_extent;
        let precision = self.interval_precision;
        let mut ticks = Vec::new();
        if interval == 0.0 || interval.is_nan() {
            return ticks;
        }

        if extent[0] < nice_extent[0] {
            if expand_to_nice_extent {
                ticks.push(round(nice_extent[0] - interval, precision));
            } else {
                ticks.push(extent[0]);
            }
        }

        let mut tick = nice_extent[0];
        while tick <= nice_extent[1] {
            ticks.push(tick);
            tick = round(tick + interval, precision);
            if Some(&tick) == ticks.last() {
                break;
            }
            if ticks.len() > TICK_SAFE_LIMIT {
                warn!(interval, count = ticks.len(), "tick generation exceeded safe limit");
                return Vec::new();
            }
        }

        let last_nice_tick = ticks.last().copied().unwrap_or(nice_extent[1]);
        if extent[1] > last_nice_tick {
            if expand_to_nice_extent {
                ticks.push(round(last_nice_tick + interval, precision));
            } else {
                ticks.push(extent[1]);
            }
        }

        trace!(count = ticks.len(), interval, "interval ticks");
        ticks
    }

    /// Minor ticks strictly inside the extent, one group per major gap.
    #[must_use]
    pub fn minor_ticks(&self, split_number: usize) -> Vec<Vec<f64>> {
        let ticks = self.ticks(true);
        let extent = self.extent;
        let split = split_number.max(1);

        ticks
            .windows(2)
            .map(|pair| {
                let minor_interval = (pair[1] - pair[0]) / split as f64;
                (1..split)
                    .map(|count| round_default(pair[0] + count as f64 * minor_interval))
                    .filter(|minor| *minor > extent[0] && *minor < extent[1])
                    .collect()
            })
            .collect()
    }

    /// Rounded label with thousands separators.
    #[must_use]
    pub fn label(&self, value: f64, precision: LabelPrecision) -> String {
        if value.is_nan() {
            return String::new();
        }
        let precision = match precision {
            LabelPrecision::Value => get_precision_safe(value),
            LabelPrecision::Auto => self.interval_precision,
            LabelPrecision::Fixed(precision) => precision,
        };
        add_commas(&round(value, precision).to_string())
    }

    /// Computes interval and nice tick extent for roughly `split_number` ticks.
    ///
    /// A reversed extent is flipped in place; a non-finite span is left alone.
    pub fn nice_ticks(
        &mut self,
        split_number: usize,
        min_interval: Option<f64>,
        max_interval: Option<f64>,
    ) {
        let span = self.extent[1] - self.extent[0];
        if !span.is_finite() {
            return;
        }
        if span < 0.0 {
            self.extent.reverse();
        }

        let result = interval_scale_nice_ticks(self.extent, split_number, min_interval, max_interval);
        self.interval = result.interval;
        self.interval_precision = result.interval_precision;
        self.nice_extent = result.nice_tick_extent;
    }

    /// Expands degenerate extents and rounds the extent out to the interval.
    pub fn nice_extent(&mut self, options: NiceExtentOptions) {
        let extent = &mut self.extent;
        if extent[0] == extent[1] {
            if extent[0] != 0.0 {
                let expand_size = extent[0];
                if options.fix_max {
                    extent[0] -= expand_size / 2.0;
                } else {
                    extent[1] += expand_size / 2.0;
                    extent[0] -= expand_size / 2.0;
                }
            } else {
                extent[1] = 1.0;
            }
        }
        if !(extent[1] - extent[0]).is_finite() {
            *extent = [0.0, 1.0];
        }

        self.nice_ticks(
            options.split_number.unwrap_or(DEFAULT_SPLIT_NUMBER),
            options.min_interval,
            options.max_interval,
        );

        let interval = self.interval;
        if !options.fix_min {
            self.extent[0] = round_default((self.extent[0] / interval).floor() * interval);
        }
        if !options.fix_max {
            self.extent[1] = round_default((self.extent[1] / interval).ceil() * interval);
        }
    }
}
