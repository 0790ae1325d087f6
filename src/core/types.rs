use serde::{Deserialize, Serialize};

use crate::core::number::parse_percent;
use crate::error::{ChartError, ChartResult};

/// `[start, end]` range in data or pixel space. `start` may exceed `end`.
pub type Extent = [f64; 2];

/// Axis-aligned layout rectangle in pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    #[must_use]
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    #[must_use]
    pub fn center(self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn validate(self) -> ChartResult<Self> {
        if !self.x.is_finite()
            || !self.y.is_finite()
            || !self.width.is_finite()
            || !self.height.is_finite()
            || self.width < 0.0
            || self.height < 0.0
        {
            return Err(ChartError::InvalidData(
                "layout rect must be finite with non-negative size".to_owned(),
            ));
        }
        Ok(self)
    }
}

/// Absolute pixel value or a percent/keyword text such as `"20%"` or `"center"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Length {
    Absolute(f64),
    Text(String),
}

impl Length {
    #[must_use]
    pub fn percent(value: f64) -> Self {
        Self::Text(format!("{value}%"))
    }

    /// Resolves against `all`; unparseable text yields NaN.
    #[must_use]
    pub fn resolve(&self, all: f64) -> f64 {
        match self {
            Self::Absolute(value) => *value,
            Self::Text(text) => parse_percent(text, all),
        }
    }
}

impl From<f64> for Length {
    fn from(value: f64) -> Self {
        Self::Absolute(value)
    }
}

impl From<&str> for Length {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

/// Numeric interval with per-end closure (`true` = closed).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IntervalItem {
    pub interval: [f64; 2],
    pub close: [bool; 2],
}

impl IntervalItem {
    #[must_use]
    pub fn new(interval: [f64; 2], close: [bool; 2]) -> Self {
        Self { interval, close }
    }

    #[must_use]
    pub fn closed(lower: f64, upper: f64) -> Self {
        Self::new([lower, upper], [true, true])
    }
}
