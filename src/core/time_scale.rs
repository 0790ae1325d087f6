use chrono::{DateTime, Duration, FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::interval_scale::{IntervalScale, interval_precision};
use crate::core::number::{nice, round_default};
use crate::core::scale::{NiceExtentOptions, fix_nice_extent};
use crate::core::types::Extent;

pub const ONE_SECOND: f64 = 1000.0;
pub const ONE_MINUTE: f64 = ONE_SECOND * 60.0;
pub const ONE_HOUR: f64 = ONE_MINUTE * 60.0;
pub const ONE_DAY: f64 = ONE_HOUR * 24.0;

pub const DEFAULT_APPROX_TICK_NUMBER: usize = 10;

/// Label pattern of a step level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeLabelPattern {
    /// `hh:mm:ss`
    Seconds,
    /// `hh:mm` over `MM-dd`
    Minutes,
    /// `MM-dd` over `yyyy`
    Date,
}

impl TimeLabelPattern {
    fn chrono_format(self) -> &'static str {
        match self {
            Self::Seconds => "%H:%M:%S",
            Self::Minutes => "%H:%M\n%m-%d",
            Self::Date => "%m-%d\n%Y",
        }
    }
}

/// One entry of the step table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TimeStepLevel {
    pub name: &'static str,
    pub pattern: TimeLabelPattern,
    /// Step length in milliseconds.
    pub interval: f64,
}

const fn level(name: &'static str, pattern: TimeLabelPattern, interval: f64) -> TimeStepLevel {
    TimeStepLevel {
        name,
        pattern,
        interval,
    }
}

/// Candidate tick steps from one second to one year, ascending.
pub const TIME_STEP_LEVELS: [TimeStepLevel; 20] = [
    level("1s", TimeLabelPattern::Seconds, ONE_SECOND),
    level("5s", TimeLabelPattern::Seconds, ONE_SECOND * 5.0),
    level("10s", TimeLabelPattern::Seconds, ONE_SECOND * 10.0),
    level("15s", TimeLabelPattern::Seconds, ONE_SECOND * 15.0),
    level("30s", TimeLabelPattern::Seconds, ONE_SECOND * 30.0),
    level("1m", TimeLabelPattern::Minutes, ONE_MINUTE),
    level("5m", TimeLabelPattern::Minutes, ONE_MINUTE * 5.0),
    level("10m", TimeLabelPattern::Minutes, ONE_MINUTE * 10.0),
    level("15m", TimeLabelPattern::Minutes, ONE_MINUTE * 15.0),
    level("30m", TimeLabelPattern::Minutes, ONE_MINUTE * 30.0),
    level("1h", TimeLabelPattern::Minutes, ONE_HOUR),
    level("2h", TimeLabelPattern::Minutes, ONE_HOUR * 2.0),
    level("6h", TimeLabelPattern::Minutes, ONE_HOUR * 6.0),
    level("12h", TimeLabelPattern::Minutes, ONE_HOUR * 12.0),
    level("1d", TimeLabelPattern::Date, ONE_DAY),
    level("week", TimeLabelPattern::Date, ONE_DAY * 7.0),
    level("month", TimeLabelPattern::Date, ONE_DAY * 31.0),
    level("quarter", TimeLabelPattern::Date, ONE_DAY * 380.0 / 4.0),
    level("half-year", TimeLabelPattern::Date, ONE_DAY * 380.0 / 2.0),
    level("year", TimeLabelPattern::Date, ONE_DAY * 380.0),
];

const YEAR_LEVEL: usize = TIME_STEP_LEVELS.len() - 1;

/// Epoch-millisecond scale whose ticks snap to calendar-friendly steps.
///
/// Tick alignment happens in local time given by `utc_offset_minutes`
/// unless `use_utc` is set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeScale {
    inner: IntervalScale,
    level: usize,
    #[serde(default)]
    use_utc: bool,
    #[serde(default)]
    utc_offset_minutes: i32,
}

impl Default for TimeScale {
    fn default() -> Self {
        Self {
            inner: IntervalScale::default(),
            level: 0,
            use_utc: true,
            utc_offset_minutes: 0,
        }
    }
}

impl TimeScale {
    #[must_use]
    pub fn new(start: f64, end: f64) -> Self {
        Self {
            inner: IntervalScale::new(start, end),
            ..Self::default()
        }
    }

    /// Aligns ticks to local time at a fixed UTC offset.
    #[must_use]
    pub fn with_utc_offset_minutes(mut self, minutes: i32) -> Self {
        self.use_utc = false;
        self.utc_offset_minutes = minutes;
        self
    }

    #[must_use]
    pub fn with_use_utc(mut self, use_utc: bool) -> Self {
        self.use_utc = use_utc;
        self
    }

    #[must_use]
    pub fn extent(&self) -> Extent {
        self.inner.extent()
    }

    pub fn set_extent(&mut self, start: f64, end: f64) {
        self.inner.set_extent(start, end);
    }

    #[must_use]
    pub fn contain(&self, value: f64) -> bool {
        self.inner.contain(value)
    }

    #[must_use]
    pub fn normalize(&self, value: f64) -> f64 {
        self.inner.normalize(value)
    }

    #[must_use]
    pub fn scale(&self, t: f64) -> f64 {
        self.inner.scale(t)
    }

    #[must_use]
    pub fn interval(&self) -> f64 {
        self.inner.interval()
    }

    #[must_use]
    pub fn step_level(&self) -> TimeStepLevel {
        TIME_STEP_LEVELS
            .get(self.level)
            .copied()
            .unwrap_or(TIME_STEP_LEVELS[0])
    }

    #[must_use]
    pub fn nice_tick_extent(&self) -> Extent {
        self.inner.nice_tick_extent()
    }

    #[must_use]
    pub fn ticks(&self) -> Vec<f64> {
        self.inner.ticks(false)
    }

    #[must_use]
    pub fn minor_ticks(&self, split_number: usize) -> Vec<Vec<f64>> {
        self.inner.minor_ticks(split_number)
    }

    fn offset(&self) -> FixedOffset {
        let seconds = if self.use_utc {
            0
        } else {
            self.utc_offset_minutes * 60
        };
        FixedOffset::east_opt(seconds).unwrap_or_else(|| Utc.fix())
    }

    /// Milliseconds to subtract from local time to get UTC.
    fn timezone_shift(&self) -> f64 {
        -f64::from(self.offset().local_minus_utc()) * ONE_SECOND
    }

    /// Formats `value` (epoch millis) with the current step level's pattern.
    #[must_use]
    pub fn label(&self, value: f64) -> String {
        if !value.is_finite() {
            return String::new();
        }
        let Some(time) = DateTime::<Utc>::from_timestamp_millis(value.round() as i64) else {
            return String::new();
        };
        time.with_timezone(&self.offset())
            .format(self.step_level().pattern.chrono_format())
            .to_string()
    }

    /// Picks the step level for about `approx_tick_number` ticks.
    pub fn nice_ticks(
        &mut self,
        approx_tick_number: usize,
        min_interval: Option<f64>,
        max_interval: Option<f64>,
    ) {
        let approx = approx_tick_number.max(1) as f64;
        let extent = self.inner.extent();
        let span = extent[1] - extent[0];
        let mut approx_interval = span / approx;
        if let Some(min) = min_interval {
            if approx_interval < min {
                approx_interval = min;
            }
        }
        if let Some(max) = max_interval {
            if approx_interval > max {
                approx_interval = max;
            }
        }

        let level_idx = TIME_STEP_LEVELS
            .partition_point(|level| level.interval < approx_interval)
            .min(YEAR_LEVEL);
        let mut interval = TIME_STEP_LEVELS[level_idx].interval;
        if level_idx == YEAR_LEVEL {
            let year_span = span / interval;
            interval *= nice(year_span / approx, true);
        }

        let shift = self.timezone_shift();
        let mut nice_extent = [
            (((extent[0] - shift) / interval).ceil() * interval + shift).round(),
            (((extent[1] - shift) / interval).floor() * interval + shift).round(),
        ];
        fix_nice_extent(&mut nice_extent, extent);

        debug!(
            level = TIME_STEP_LEVELS[level_idx].name,
            interval, "time scale step level"
        );
        self.level = level_idx;
        self.inner
            .set_nice_state(interval, nice_extent, interval_precision(interval));
    }

    /// Expands degenerate or empty extents to a day window, then nices.
    pub fn nice_extent(&mut self, options: NiceExtentOptions) {
        self.nice_extent_at(options, Utc::now());
    }

    /// [`TimeScale::nice_extent`] with an explicit clock for empty extents.
    pub fn nice_extent_at(&mut self, options: NiceExtentOptions, now: DateTime<Utc>) {
        let mut extent = self.inner.extent();
        if extent[0] == extent[1] {
            extent[0] -= ONE_DAY;
            extent[1] += ONE_DAY;
        }
        if extent[1] == f64::NEG_INFINITY && extent[0] == f64::INFINITY {
            let local = now.with_timezone(&self.offset()).date_naive();
            let midnight = local
                .and_hms_opt(0, 0, 0)
                .map(|naive| naive - Duration::seconds(i64::from(self.offset().local_minus_utc())))
                .map_or(0.0, |naive| naive.and_utc().timestamp_millis() as f64);
            extent[1] = midnight;
            extent[0] = midnight - ONE_DAY;
        }
        self.inner.set_extent(extent[0], extent[1]);

        self.nice_ticks(
            options.split_number.unwrap_or(DEFAULT_APPROX_TICK_NUMBER),
            options.min_interval,
            options.max_interval,
        );

        let interval = self.inner.interval();
        let mut extent = self.inner.extent();
        if !options.fix_min {
            extent[0] = round_default((extent[0] / interval).floor() * interval);
        }
        if !options.fix_max {
            extent[1] = round_default((extent[1] / interval).ceil() * interval);
        }
        self.inner.set_extent(extent[0], extent[1]);
    }
}
