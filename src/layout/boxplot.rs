//! Box-and-whisker statistics and geometry.

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::debug;

use crate::core::axis::Axis;
use crate::core::number::quantile;
use crate::core::scale::ScaleKind;
use crate::core::types::Length;
use crate::error::{ChartError, ChartResult};

pub const DEFAULT_BOUND_IQR: f64 = 1.5;

/// Body (4) + whiskers (4) + end lines for low, high and median (6).
pub const BOX_END_POINTS: usize = 14;

pub type BoxEnds = SmallVec<[[f64; 2]; BOX_END_POINTS]>;

/// Which screen axis carries the categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BoxplotOrientation {
    /// Categories along x, values along y.
    #[default]
    Horizontal,
    /// Categories along y, values along x.
    Vertical,
}

impl BoxplotOrientation {
    fn category_dim(self) -> usize {
        match self {
            Self::Horizontal => 0,
            Self::Vertical => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoxplotOptions {
    /// Whisker reach in IQRs. `None` (or `0`) whiskers to the extremes.
    #[serde(default = "default_bound_iqr")]
    pub bound_iqr: Option<f64>,
    #[serde(default)]
    pub layout: BoxplotOrientation,
}

fn default_bound_iqr() -> Option<f64> {
    Some(DEFAULT_BOUND_IQR)
}

impl Default for BoxplotOptions {
    fn default() -> Self {
        Self {
            bound_iqr: default_bound_iqr(),
            layout: BoxplotOrientation::Horizontal,
        }
    }
}

impl BoxplotOptions {
    #[must_use]
    pub fn with_bound_iqr(mut self, bound_iqr: Option<f64>) -> Self {
        self.bound_iqr = bound_iqr;
        self
    }

    #[must_use]
    pub fn with_layout(mut self, layout: BoxplotOrientation) -> Self {
        self.layout = layout;
        self
    }

    pub fn validate(self) -> ChartResult<Self> {
        if self
            .bound_iqr
            .is_some_and(|bound| !bound.is_finite() || bound < 0.0)
        {
            return Err(ChartError::InvalidConfig(
                "bound IQR must be finite and >= 0".to_owned(),
            ));
        }
        Ok(self)
    }
}

/// `box_data[i]` is `[low, Q1, median, Q3, high]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxplotData {
    pub box_data: Vec<[f64; 5]>,
    pub outliers: Vec<[f64; 2]>,
    pub axis_data: Vec<String>,
}

/// Five-number summaries and outliers per raw group.
///
/// Outliers are `[group, value]`, or `[value, group]` for vertical layouts.
/// An empty group yields an all-NaN box.
pub fn prepare_boxplot_data(raw: &[Vec<f64>], options: &BoxplotOptions) -> ChartResult<BoxplotData> {
    let options = options.validate()?;
    let use_extreme = options.bound_iqr.is_none_or(|bound| bound == 0.0);
    let bound_iqr = options.bound_iqr.unwrap_or(DEFAULT_BOUND_IQR);

    let mut box_data = Vec::with_capacity(raw.len());
    let mut outliers = Vec::new();
    let mut axis_data = Vec::with_capacity(raw.len());

    for (group, values) in raw.iter().enumerate() {
        axis_data.push(group.to_string());
        let mut asc_list: Vec<f64> = values.iter().copied().filter(|value| !value.is_nan()).collect();
        asc_list.sort_by_key(|value| OrderedFloat(*value));

        let (Some(&min), Some(&max)) = (asc_list.first(), asc_list.last()) else {
            box_data.push([f64::NAN; 5]);
            continue;
        };
        let q1 = quantile(&asc_list, 0.25);
        let q2 = quantile(&asc_list, 0.5);
        let q3 = quantile(&asc_list, 0.75);
        let bound = bound_iqr * (q3 - q1);

        let low = if use_extreme { min } else { min.max(q1 - bound) };
        let high = if use_extreme { max } else { max.min(q3 + bound) };
        box_data.push([low, q1, q2, q3, high]);

        for &value in &asc_list {
            if value < low || value > high {
                let outlier = [group as f64, value];
                outliers.push(match options.layout {
                    BoxplotOrientation::Horizontal => outlier,
                    BoxplotOrientation::Vertical => [value, group as f64],
                });
            }
        }
    }

    debug!(groups = raw.len(), outliers = outliers.len(), "boxplot data");
    Ok(BoxplotData {
        box_data,
        outliers,
        axis_data,
    })
}

/// One boxplot series: category positions plus five-number summaries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxplotSeries {
    pub base_values: Vec<f64>,
    pub boxes: Vec<[f64; 5]>,
    /// `[min, max]` box width, resolved against the band width.
    #[serde(default = "default_box_width")]
    pub box_width: [Length; 2],
}

fn default_box_width() -> [Length; 2] {
    [Length::Absolute(7.0), Length::Absolute(50.0)]
}

impl BoxplotSeries {
    #[must_use]
    pub fn new(base_values: Vec<f64>, boxes: Vec<[f64; 5]>) -> Self {
        Self {
            base_values,
            boxes,
            box_width: default_box_width(),
        }
    }

    /// Series over category ranks `0..n` built from prepared data.
    #[must_use]
    pub fn from_data(data: &BoxplotData) -> Self {
        let base_values = (0..data.box_data.len()).map(|idx| idx as f64).collect();
        Self::new(base_values, data.box_data.clone())
    }

    #[must_use]
    pub fn with_box_width(mut self, min: impl Into<Length>, max: impl Into<Length>) -> Self {
        self.box_width = [min.into(), max.into()];
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxplotLayout {
    /// Median position on the value axis.
    pub initial_base_value: f64,
    /// Body corners (Q1 pair, Q3 pair), whisker end points (low, Q1, high,
    /// Q3), then end lines for low, high and median.
    pub ends: BoxEnds,
    pub box_width: f64,
}

fn resolve_or_zero(length: &Length, all: f64) -> f64 {
    let value = length.resolve(all);
    if value.is_nan() { 0.0 } else { value }
}

/// Lays out boxplot series sharing `base_axis`.
pub fn layout_boxplot(
    series: &[BoxplotSeries],
    base_axis: &Axis,
    value_axis: &Axis,
    orientation: BoxplotOrientation,
) -> ChartResult<Vec<Vec<BoxplotLayout>>> {
    for item in series {
        if item.base_values.len() != item.boxes.len() {
            return Err(ChartError::InvalidData(format!(
                "boxplot series has {} positions for {} boxes",
                item.base_values.len(),
                item.boxes.len()
            )));
        }
    }
    if series.is_empty() {
        return Ok(Vec::new());
    }

    let band_width = if base_axis.scale().kind() == ScaleKind::Ordinal {
        base_axis.band_width()
    } else {
        let max_count = series.iter().map(|item| item.boxes.len()).max().unwrap_or(0);
        base_axis.span() / max_count.max(1) as f64
    };

    let series_count = series.len() as f64;
    let available_width = band_width * 0.8 - 2.0;
    let box_gap = available_width / series_count * 0.3;
    let box_width = (available_width - box_gap * (series_count - 1.0)) / series_count;
    let mut base = box_width / 2.0 - available_width / 2.0;

    let c_dim = orientation.category_dim();
    let v_dim = 1 - c_dim;
    let mut layouts = Vec::with_capacity(series.len());

    for item in series {
        let offset = base;
        base += box_gap + box_width;
        let bounds = [
            resolve_or_zero(&item.box_width[0], band_width),
            resolve_or_zero(&item.box_width[1], band_width),
        ];
        let width = box_width.max(bounds[0]).min(bounds[1]);
        let half_width = width / 2.0;

        let point = |base_value: f64, value: f64| -> [f64; 2] {
            if base_value.is_nan() || value.is_nan() {
                return [f64::NAN, f64::NAN];
            }
            let mut point = [0.0; 2];
            point[c_dim] = base_axis.data_to_coord(base_value, false) + offset;
            point[v_dim] = value_axis.data_to_coord(value, false);
            point
        };
        let shifted = |point: [f64; 2], delta: f64| {
            let mut point = point;
            point[c_dim] += delta;
            point
        };

        let mut series_layout = Vec::with_capacity(item.boxes.len());
        for (&base_value, stats) in item.base_values.iter().zip(&item.boxes) {
            let [end1, end2, median, end4, end5] = stats.map(|value| point(base_value, value));

            let mut ends = BoxEnds::new();
            ends.extend([shifted(end2, -half_width), shifted(end2, half_width)]);
            ends.extend([shifted(end4, half_width), shifted(end4, -half_width)]);
            ends.extend([end1, end2, end5, end4]);
            for center in [end1, end5, median] {
                ends.extend([shifted(center, -half_width), shifted(center, half_width)]);
            }

            series_layout.push(BoxplotLayout {
                initial_base_value: median[v_dim],
                ends,
                box_width: width,
            });
        }
        layouts.push(series_layout);
    }

    debug!(series = layouts.len(), band_width, box_width, "boxplot layout");
    Ok(layouts)
}
