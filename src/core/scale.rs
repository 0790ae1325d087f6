use serde::{Deserialize, Serialize};

use crate::core::interval_scale::{IntervalScale, LabelPrecision};
use crate::core::log_scale::LogScale;
use crate::core::ordinal_scale::OrdinalScale;
use crate::core::time_scale::TimeScale;
use crate::core::types::Extent;
use crate::error::{ChartError, ChartResult};

/// Scale family tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScaleKind {
    Interval,
    Log,
    Time,
    Ordinal,
}

/// Controls how a scale rounds its extent outward to tick multiples.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct NiceExtentOptions {
    /// Approximate tick count. `None` uses the scale's own default.
    #[serde(default)]
    pub split_number: Option<usize>,
    #[serde(default)]
    pub fix_min: bool,
    #[serde(default)]
    pub fix_max: bool,
    #[serde(default)]
    pub min_interval: Option<f64>,
    #[serde(default)]
    pub max_interval: Option<f64>,
}

impl NiceExtentOptions {
    #[must_use]
    pub fn with_split_number(mut self, split_number: usize) -> Self {
        self.split_number = Some(split_number);
        self
    }

    #[must_use]
    pub fn with_fixed_bounds(mut self, fix_min: bool, fix_max: bool) -> Self {
        self.fix_min = fix_min;
        self.fix_max = fix_max;
        self
    }

    #[must_use]
    pub fn with_interval_bounds(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.min_interval = min;
        self.max_interval = max;
        self
    }

    pub fn validate(self) -> ChartResult<Self> {
        if self.split_number == Some(0) {
            return Err(ChartError::InvalidConfig(
                "split number must be > 0".to_owned(),
            ));
        }
        for bound in [self.min_interval, self.max_interval].into_iter().flatten() {
            if !bound.is_finite() || bound <= 0.0 {
                return Err(ChartError::InvalidConfig(
                    "interval bounds must be finite and > 0".to_owned(),
                ));
            }
        }
        if let (Some(min), Some(max)) = (self.min_interval, self.max_interval) {
            if min > max {
                return Err(ChartError::InvalidConfig(
                    "min interval must not exceed max interval".to_owned(),
                ));
            }
        }
        Ok(self)
    }
}

/// Value-domain abstraction shared by every axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Scale {
    Interval(IntervalScale),
    Log(LogScale),
    Time(TimeScale),
    Ordinal(OrdinalScale),
}

impl Scale {
    #[must_use]
    pub fn kind(&self) -> ScaleKind {
        match self {
            Self::Interval(_) => ScaleKind::Interval,
            Self::Log(_) => ScaleKind::Log,
            Self::Time(_) => ScaleKind::Time,
            Self::Ordinal(_) => ScaleKind::Ordinal,
        }
    }

    #[must_use]
    pub fn extent(&self) -> Extent {
        match self {
            Self::Interval(scale) => scale.extent(),
            Self::Log(scale) => scale.extent(),
            Self::Time(scale) => scale.extent(),
            Self::Ordinal(scale) => scale.extent(),
        }
    }

    /// Sets the raw extent; NaN bounds are ignored individually.
    pub fn set_extent(&mut self, start: f64, end: f64) {
        match self {
            Self::Interval(scale) => scale.set_extent(start, end),
            Self::Log(scale) => scale.set_extent(start, end),
            Self::Time(scale) => scale.set_extent(start, end),
            Self::Ordinal(scale) => scale.set_extent(start, end),
        }
    }

    pub fn union_extent(&mut self, other: Extent) {
        let mut extent = self.extent();
        if other[0] < extent[0] {
            extent[0] = other[0];
        }
        if other[1] > extent[1] {
            extent[1] = other[1];
        }
        self.set_extent(extent[0], extent[1]);
    }

    #[must_use]
    pub fn contain(&self, value: f64) -> bool {
        match self {
            Self::Interval(scale) => scale.contain(value),
            Self::Log(scale) => scale.contain(value),
            Self::Time(scale) => scale.contain(value),
            Self::Ordinal(scale) => scale.contain(value),
        }
    }

    /// Maps a data value into `[0, 1]` over the extent.
    #[must_use]
    pub fn normalize(&self, value: f64) -> f64 {
        match self {
            Self::Interval(scale) => scale.normalize(value),
            Self::Log(scale) => scale.normalize(value),
            Self::Time(scale) => scale.normalize(value),
            Self::Ordinal(scale) => scale.normalize(value),
        }
    }

    /// Inverse of [`Scale::normalize`].
    #[must_use]
    pub fn scale(&self, t: f64) -> f64 {
        match self {
            Self::Interval(scale) => scale.scale(t),
            Self::Log(scale) => scale.scale(t),
            Self::Time(scale) => scale.scale(t),
            Self::Ordinal(scale) => scale.scale(t),
        }
    }

    #[must_use]
    pub fn ticks(&self) -> Vec<f64> {
        match self {
            Self::Interval(scale) => scale.ticks(false),
            Self::Log(scale) => scale.ticks(),
            Self::Time(scale) => scale.ticks(),
            Self::Ordinal(scale) => scale.ticks(),
        }
    }

    /// Minor ticks grouped per major gap. Ordinal and log scales have none.
    #[must_use]
    pub fn minor_ticks(&self, split_number: usize) -> Vec<Vec<f64>> {
        match self {
            Self::Interval(scale) => scale.minor_ticks(split_number),
            Self::Time(scale) => scale.minor_ticks(split_number),
            Self::Log(_) | Self::Ordinal(_) => Vec::new(),
        }
    }

    #[must_use]
    pub fn label(&self, value: f64) -> String {
        match self {
            Self::Interval(scale) => scale.label(value, LabelPrecision::Value),
            Self::Log(scale) => scale.label(value),
            Self::Time(scale) => scale.label(value),
            Self::Ordinal(scale) => scale.label(value),
        }
    }

    pub fn nice_extent(&mut self, options: NiceExtentOptions) {
        match self {
            Self::Interval(scale) => scale.nice_extent(options),
            Self::Log(scale) => scale.nice_extent(),
            Self::Time(scale) => scale.nice_extent(options),
            Self::Ordinal(_) => {}
        }
    }

    /// Tick spacing in data units (`1` for ordinal scales).
    #[must_use]
    pub fn interval(&self) -> f64 {
        match self {
            Self::Interval(scale) => scale.interval(),
            Self::Time(scale) => scale.interval(),
            Self::Log(_) | Self::Ordinal(_) => 1.0,
        }
    }
}

impl From<IntervalScale> for Scale {
    fn from(scale: IntervalScale) -> Self {
        Self::Interval(scale)
    }
}

impl From<LogScale> for Scale {
    fn from(scale: LogScale) -> Self {
        Self::Log(scale)
    }
}

impl From<TimeScale> for Scale {
    fn from(scale: TimeScale) -> Self {
        Self::Time(scale)
    }
}

impl From<OrdinalScale> for Scale {
    fn from(scale: OrdinalScale) -> Self {
        Self::Ordinal(scale)
    }
}

#[must_use]
pub(crate) fn normalize_in(value: f64, extent: Extent) -> f64 {
    if extent[1] == extent[0] {
        return 0.5;
    }
    (value - extent[0]) / (extent[1] - extent[0])
}

#[must_use]
pub(crate) fn scale_in(t: f64, extent: Extent) -> f64 {
    t * (extent[1] - extent[0]) + extent[0]
}

#[must_use]
pub(crate) fn contain_in(value: f64, extent: Extent) -> bool {
    value >= extent[0] && value <= extent[1]
}

/// Replaces non-finite bounds, clamps into `extent` and keeps `[0] <= [1]`.
pub(crate) fn fix_nice_extent(nice: &mut Extent, extent: Extent) {
    for idx in 0..2 {
        if !nice[idx].is_finite() {
            nice[idx] = extent[idx];
        }
    }
    for value in nice.iter_mut() {
        *value = value.min(extent[1]).max(extent[0]);
    }
    if nice[0] > nice[1] {
        nice[0] = nice[1];
    }
}

pub(crate) fn assign_extent(extent: &mut Extent, start: f64, end: f64) {
    if !start.is_nan() {
        extent[0] = start;
    }
    if !end.is_nan() {
        extent[1] = end;
    }
}
