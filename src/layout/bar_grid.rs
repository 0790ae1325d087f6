//! Bar width/offset allocation and stacked rectangles on cartesian axes.
//!
//! Series sharing a base axis are grouped by stack id. Each stack gets one
//! column inside the band; series in the same stack pile up on separate
//! positive and negative accumulators per base value.

use indexmap::IndexMap;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::core::axis::Axis;
use crate::core::scale::ScaleKind;
use crate::core::types::{Length, Rect};
use crate::error::{ChartError, ChartResult};
use crate::layout::BarRect;

pub const STACK_PREFIX: &str = "__stack_";

/// Large-mode bars never get thinner than this.
pub const LARGE_BAR_MIN_WIDTH: f64 = 0.5;

const BAND_FILL_RATIO: f64 = 0.8;
const BAND_MARGIN: f64 = 2.0;
const AXIS_KEY: &str = "axis0";

/// Per-series bar settings. Lengths resolve against the band width, gaps
/// against `1`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct BarOptions {
    #[serde(default)]
    pub stack: Option<String>,
    #[serde(default)]
    pub bar_width: Option<Length>,
    #[serde(default)]
    pub bar_max_width: Option<Length>,
    #[serde(default)]
    pub bar_min_width: Option<Length>,
    #[serde(default)]
    pub bar_gap: Option<Length>,
    #[serde(default)]
    pub bar_category_gap: Option<Length>,
    #[serde(default)]
    pub bar_min_height: f64,
    #[serde(default)]
    pub bar_min_angle: f64,
}

impl BarOptions {
    #[must_use]
    pub fn with_stack(mut self, stack: impl Into<String>) -> Self {
        self.stack = Some(stack.into());
        self
    }

    #[must_use]
    pub fn with_bar_width(mut self, width: impl Into<Length>) -> Self {
        self.bar_width = Some(width.into());
        self
    }

    #[must_use]
    pub fn with_bar_max_width(mut self, width: impl Into<Length>) -> Self {
        self.bar_max_width = Some(width.into());
        self
    }

    #[must_use]
    pub fn with_bar_min_width(mut self, width: impl Into<Length>) -> Self {
        self.bar_min_width = Some(width.into());
        self
    }

    #[must_use]
    pub fn with_bar_gap(mut self, gap: impl Into<Length>) -> Self {
        self.bar_gap = Some(gap.into());
        self
    }

    #[must_use]
    pub fn with_bar_category_gap(mut self, gap: impl Into<Length>) -> Self {
        self.bar_category_gap = Some(gap.into());
        self
    }

    #[must_use]
    pub fn with_bar_min_height(mut self, min_height: f64) -> Self {
        self.bar_min_height = min_height;
        self
    }

    #[must_use]
    pub fn with_bar_min_angle(mut self, min_angle: f64) -> Self {
        self.bar_min_angle = min_angle;
        self
    }

    pub fn validate(self) -> ChartResult<Self> {
        if !self.bar_min_height.is_finite() || self.bar_min_height < 0.0 {
            return Err(ChartError::InvalidConfig(
                "bar min height must be finite and >= 0".to_owned(),
            ));
        }
        if !self.bar_min_angle.is_finite() || self.bar_min_angle < 0.0 {
            return Err(ChartError::InvalidConfig(
                "bar min angle must be finite and >= 0".to_owned(),
            ));
        }
        Ok(self)
    }
}

/// Column placement input for one series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarSeriesLayoutInput {
    pub series_index: usize,
    pub axis_key: String,
    pub band_width: f64,
    pub options: BarOptions,
}

impl BarSeriesLayoutInput {
    #[must_use]
    pub fn stack_id(&self) -> String {
        stack_id(self.series_index, &self.options)
    }
}

#[must_use]
pub fn stack_id(series_index: usize, options: &BarOptions) -> String {
    options
        .stack
        .clone()
        .unwrap_or_else(|| format!("{STACK_PREFIX}{series_index}"))
}

/// Width and offset of one stack's column relative to the band center.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColumnLayout {
    pub band_width: f64,
    pub offset: f64,
    pub offset_center: f64,
    pub width: f64,
}

/// Axis key -> stack id -> column.
pub type BarWidthAndOffset = IndexMap<String, IndexMap<String, ColumnLayout>>;

/// Defaults that differ between cartesian and polar bars.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ColumnDefaults {
    pub gap: Length,
    /// `None` derives the gap from the column count.
    pub category_gap: Option<Length>,
    pub min_width: Option<Length>,
}

impl ColumnDefaults {
    pub(crate) fn cartesian() -> Self {
        Self {
            gap: Length::percent(20.0),
            category_gap: None,
            min_width: Some(Length::Absolute(1.0)),
        }
    }

    pub(crate) fn polar() -> Self {
        Self {
            gap: Length::percent(30.0),
            category_gap: Some(Length::percent(20.0)),
            min_width: None,
        }
    }
}

#[derive(Debug, Default)]
struct StackColumn {
    /// `0` means auto width.
    width: f64,
    max_width: f64,
    min_width: f64,
}

#[derive(Debug)]
struct AxisColumns {
    band_width: f64,
    remained_width: f64,
    auto_width_count: usize,
    gap: Length,
    category_gap: Option<Length>,
    stacks: IndexMap<String, StackColumn>,
}

fn positive(length: Option<&Length>, all: f64) -> Option<f64> {
    length
        .map(|length| length.resolve(all))
        .filter(|value| *value > 0.0)
}

fn auto_width(remained_width: f64, category_gap: f64, count: usize, gap: f64) -> f64 {
    let count = count as f64;
    ((remained_width - category_gap) / (count + (count - 1.0) * gap)).max(0.0)
}

/// Cartesian column allocation for every axis named in `inputs`.
#[must_use]
pub fn calc_bar_width_and_offset(inputs: &[BarSeriesLayoutInput]) -> BarWidthAndOffset {
    calc_columns(inputs, &ColumnDefaults::cartesian())
}

pub(crate) fn calc_columns(
    inputs: &[BarSeriesLayoutInput],
    defaults: &ColumnDefaults,
) -> BarWidthAndOffset {
    let mut columns_map: IndexMap<String, AxisColumns> = IndexMap::new();

    for input in inputs {
        let band_width = input.band_width;
        let columns = columns_map
            .entry(input.axis_key.clone())
            .or_insert_with(|| AxisColumns {
                band_width,
                remained_width: band_width * BAND_FILL_RATIO - BAND_MARGIN,
                auto_width_count: 0,
                gap: defaults.gap.clone(),
                category_gap: defaults.category_gap.clone(),
                stacks: IndexMap::new(),
            });

        let stack_id = input.stack_id();
        if !columns.stacks.contains_key(&stack_id) {
            columns.auto_width_count += 1;
        }
        let column = columns.stacks.entry(stack_id).or_default();

        let options = &input.options;
        if let Some(bar_width) = positive(options.bar_width.as_ref(), band_width) {
            column.width = column.width.max(bar_width);
        }
        if let Some(max_width) = positive(options.bar_max_width.as_ref(), band_width) {
            column.max_width = max_width;
        }
        let min_width = options.bar_min_width.as_ref().or(defaults.min_width.as_ref());
        if let Some(min_width) = positive(min_width, band_width) {
            column.min_width = min_width;
        }
        if let Some(gap) = &options.bar_gap {
            columns.gap = gap.clone();
        }
        if let Some(category_gap) = &options.bar_category_gap {
            columns.category_gap = Some(category_gap.clone());
        }
    }

    let mut result = BarWidthAndOffset::new();
    for (axis_key, mut columns) in columns_map {
        for column in columns.stacks.values() {
            if column.width > 0.0 {
                columns.remained_width -= column.width.min(columns.remained_width);
            }
        }
        let stacks = place_columns(&mut columns);
        debug!(
            axis = axis_key.as_str(),
            band_width = columns.band_width,
            stacks = stacks.len(),
            "bar columns"
        );
        result.insert(axis_key, stacks);
    }
    result
}

fn place_columns(columns: &mut AxisColumns) -> IndexMap<String, ColumnLayout> {
    let band_width = columns.band_width;
    let category_gap = match &columns.category_gap {
        Some(gap) => gap.resolve(band_width),
        None => {
            let column_count = columns.stacks.len() as f64;
            Length::percent((35.0 - column_count * 4.0).max(15.0)).resolve(band_width)
        }
    };
    let gap = columns.gap.resolve(1.0);

    let mut remained_width = columns.remained_width;
    let mut auto_count = columns.auto_width_count;
    let first_auto_width = auto_width(remained_width, category_gap, auto_count, gap);

    for column in columns.stacks.values_mut() {
        let max_width = column.max_width;
        let min_width = column.min_width;
        if column.width == 0.0 {
            let mut final_width = first_auto_width;
            if max_width > 0.0 && max_width < final_width {
                final_width = max_width.min(remained_width);
            }
            if min_width > 0.0 && min_width > final_width {
                final_width = min_width;
            }
            if final_width != first_auto_width {
                column.width = final_width;
                remained_width -= final_width + gap * final_width;
                auto_count = auto_count.saturating_sub(1);
            }
        } else {
            let mut final_width = column.width;
            if max_width > 0.0 {
                final_width = final_width.min(max_width);
            }
            if min_width > 0.0 {
                final_width = final_width.max(min_width);
            }
            column.width = final_width;
            remained_width -= final_width + gap * final_width;
            auto_count = auto_count.saturating_sub(1);
        }
    }

    // Second and last pass: stacks pinned above are not revisited.
    let second_auto_width = auto_width(remained_width, category_gap, auto_count, gap);

    let mut width_sum = 0.0;
    let mut last_width = None;
    for column in columns.stacks.values_mut() {
        if column.width == 0.0 {
            column.width = second_auto_width;
        }
        last_width = Some(column.width);
        width_sum += column.width * (1.0 + gap);
    }
    if let Some(last_width) = last_width {
        width_sum -= last_width * gap;
    }

    let mut offset = -width_sum / 2.0;
    let mut placed = IndexMap::with_capacity(columns.stacks.len());
    for (stack_id, column) in &columns.stacks {
        placed.insert(
            stack_id.clone(),
            ColumnLayout {
                band_width,
                offset,
                offset_center: offset + column.width / 2.0,
                width: column.width,
            },
        );
        offset += column.width * (1.0 + gap);
    }
    placed
}

/// Columns for `count` unstacked series on a category axis. Empty for other
/// axis types.
#[must_use]
pub fn layout_on_axis(axis: &Axis, count: usize, options: &BarOptions) -> Vec<ColumnLayout> {
    if axis.scale().kind() != ScaleKind::Ordinal {
        return Vec::new();
    }
    let band_width = axis.band_width();
    let inputs: Vec<BarSeriesLayoutInput> = (0..count)
        .map(|series_index| BarSeriesLayoutInput {
            series_index,
            axis_key: AXIS_KEY.to_owned(),
            band_width,
            options: BarOptions {
                stack: None,
                ..options.clone()
            },
        })
        .collect();

    let columns = calc_bar_width_and_offset(&inputs);
    let Some(stacks) = columns.get(AXIS_KEY) else {
        return Vec::new();
    };
    inputs
        .iter()
        .filter_map(|input| stacks.get(&input.stack_id()).copied())
        .collect()
}

/// Which screen direction the value axis runs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum BarOrientation {
    /// Columns: base axis horizontal, value axis vertical.
    #[default]
    Vertical,
    /// Bars: base axis vertical, value axis horizontal.
    Horizontal,
}

impl BarOrientation {
    #[must_use]
    pub fn value_axis_horizontal(self) -> bool {
        self == Self::Horizontal
    }
}

/// One bar series: parallel base and value columns plus its options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarSeries {
    pub series_index: usize,
    #[serde(default)]
    pub options: BarOptions,
    pub base_values: Vec<f64>,
    pub values: Vec<f64>,
}

impl BarSeries {
    #[must_use]
    pub fn new(series_index: usize, base_values: Vec<f64>, values: Vec<f64>) -> Self {
        Self {
            series_index,
            options: BarOptions::default(),
            base_values,
            values,
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: BarOptions) -> Self {
        self.options = options;
        self
    }

    #[must_use]
    pub fn stacked(&self) -> bool {
        self.options.stack.is_some()
    }

    pub(crate) fn validate(&self) -> ChartResult<()> {
        if self.base_values.len() != self.values.len() {
            return Err(ChartError::InvalidData(format!(
                "series {}: {} base values for {} values",
                self.series_index,
                self.base_values.len(),
                self.values.len()
            )));
        }
        self.options.clone().validate()?;
        Ok(())
    }
}

/// Geometry of one series. `rects[i]` is `None` for a NaN value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarSeriesLayout {
    pub series_index: usize,
    pub stack_id: String,
    pub band_width: f64,
    pub offset: f64,
    pub width: f64,
    pub rects: Vec<Option<BarRect>>,
}

/// Running stack tops for one base value.
#[derive(Debug, Clone, Copy)]
pub(crate) struct StackCoords {
    pub positive: f64,
    pub negative: f64,
}

impl StackCoords {
    pub(crate) fn new(start: f64) -> Self {
        Self {
            positive: start,
            negative: start,
        }
    }

    pub(crate) fn get_mut(&mut self, value: f64) -> &mut f64 {
        if value >= 0.0 {
            &mut self.positive
        } else {
            &mut self.negative
        }
    }
}

pub(crate) type StackKey = (String, OrderedFloat<f64>);

/// Band width of a cartesian base axis as seen by bar series.
///
/// Category axes use their band; value and time axes use the smallest
/// positive gap between base values; log axes split the span per item.
#[must_use]
pub fn base_axis_band_width(axis: &Axis, series: &[BarSeries]) -> f64 {
    let span = axis.span();
    match axis.scale().kind() {
        ScaleKind::Ordinal => axis.band_width(),
        ScaleKind::Interval | ScaleKind::Time => {
            let mut values: Vec<OrderedFloat<f64>> = series
                .iter()
                .flat_map(|series| series.base_values.iter().copied())
                .map(OrderedFloat)
                .collect();
            values.sort_unstable();
            let min_gap = values
                .windows(2)
                .map(|pair| pair[1].0 - pair[0].0)
                .filter(|delta| *delta > 0.0)
                .reduce(f64::min);
            let scale_extent = axis.scale().extent();
            let scale_span = (scale_extent[1] - scale_extent[0]).abs();
            match min_gap {
                Some(min_gap) if scale_span > 0.0 => span / scale_span * min_gap,
                _ => span,
            }
        }
        ScaleKind::Log => {
            let count = series.first().map_or(0, |series| series.values.len());
            span / count.max(1) as f64
        }
    }
}

/// Pixel coordinate of the value axis origin (`1` on log axes, else `0`).
#[must_use]
pub fn value_axis_start(value_axis: &Axis) -> f64 {
    let origin = if value_axis.scale().kind() == ScaleKind::Log {
        1.0
    } else {
        0.0
    };
    value_axis.data_to_coord(origin, false)
}

/// Lays out grouped and stacked bars on one cartesian coordinate system.
pub fn layout_bar_grid(
    series: &[BarSeries],
    base_axis: &Axis,
    value_axis: &Axis,
    orientation: BarOrientation,
) -> ChartResult<Vec<BarSeriesLayout>> {
    base_axis.validate()?;
    value_axis.validate()?;
    for item in series {
        item.validate()?;
    }
    let band_width = base_axis_band_width(base_axis, series);
    if !band_width.is_finite() || band_width < 0.0 {
        return Err(ChartError::InvalidData(format!(
            "band width must be finite and >= 0, got {band_width}"
        )));
    }

    let inputs: Vec<BarSeriesLayoutInput> = series
        .iter()
        .map(|item| BarSeriesLayoutInput {
            series_index: item.series_index,
            axis_key: AXIS_KEY.to_owned(),
            band_width,
            options: item.options.clone(),
        })
        .collect();
    let columns = calc_bar_width_and_offset(&inputs);
    let empty = IndexMap::new();
    let stacks = columns.get(AXIS_KEY).unwrap_or(&empty);

    let start = value_axis_start(value_axis);
    let value_horizontal = orientation.value_axis_horizontal();
    let mut last_stack_coords: IndexMap<StackKey, StackCoords> = IndexMap::new();
    let mut layouts = Vec::with_capacity(series.len());

    for item in series {
        let stack_id = stack_id(item.series_index, &item.options);
        let Some(column) = stacks.get(&stack_id).copied() else {
            continue;
        };
        let stacked = item.stacked();
        let min_height = item.options.bar_min_height;

        let mut rects = Vec::with_capacity(item.values.len());
        for (&base_value, &value) in item.base_values.iter().zip(&item.values) {
            let base_offset = base_axis.data_to_coord(base_value, false) + column.offset;
            let raw = value_axis.data_to_coord(value, false) - start;
            if raw.is_nan() || base_offset.is_nan() {
                rects.push(None);
                continue;
            }

            let mut size = raw;
            if size.abs() < min_height {
                let negative = if value_horizontal { size < 0.0 } else { size <= 0.0 };
                size = if negative { -min_height } else { min_height };
            }

            let base_coord = if stacked {
                let coords = last_stack_coords
                    .entry((stack_id.clone(), OrderedFloat(base_value)))
                    .or_insert_with(|| StackCoords::new(start));
                let slot = coords.get_mut(value);
                let base_coord = *slot;
                *slot += raw;
                base_coord
            } else {
                start
            };

            let rect = if value_horizontal {
                BarRect {
                    x: base_coord,
                    y: base_offset,
                    width: size,
                    height: column.width,
                }
            } else {
                BarRect {
                    x: base_offset,
                    y: base_coord,
                    width: column.width,
                    height: size,
                }
            };
            trace!(series = item.series_index, base_value, value, "bar rect");
            rects.push(Some(rect));
        }

        layouts.push(BarSeriesLayout {
            series_index: item.series_index,
            stack_id,
            band_width: column.band_width,
            offset: column.offset,
            width: column.width,
            rects,
        });
    }

    debug!(
        series = layouts.len(),
        band_width,
        stacked_keys = last_stack_coords.len(),
        "bar grid layout"
    );
    Ok(layouts)
}

/// Flat point buffers for large unstacked bar series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LargeBarBuffers {
    /// `[x0, y0, x1, y1, ...]` bar end points.
    pub points: Vec<f64>,
    /// Matching end points of the full-length background bars.
    pub background_points: Vec<f64>,
    pub data_indices: Vec<usize>,
    pub bar_width: f64,
    pub value_axis_start: f64,
    pub background_start: f64,
    pub value_axis_horizontal: bool,
}

/// Large-mode layout: no stacking, one point pair per item.
pub fn layout_large_bars(
    series: &BarSeries,
    base_axis: &Axis,
    value_axis: &Axis,
    orientation: BarOrientation,
    grid: Rect,
) -> ChartResult<LargeBarBuffers> {
    series.validate()?;
    let grid = grid.validate()?;
    let band_width = base_axis_band_width(base_axis, std::slice::from_ref(series));
    let input = BarSeriesLayoutInput {
        series_index: series.series_index,
        axis_key: AXIS_KEY.to_owned(),
        band_width,
        options: series.options.clone(),
    };
    let columns = calc_bar_width_and_offset(std::slice::from_ref(&input));
    let bar_width = columns
        .get(AXIS_KEY)
        .and_then(|stacks| stacks.get(&input.stack_id()))
        .map(|column| column.width)
        .filter(|width| *width > LARGE_BAR_MIN_WIDTH)
        .unwrap_or(LARGE_BAR_MIN_WIDTH);

    let value_horizontal = orientation.value_axis_horizontal();
    let count = series.values.len();
    let mut points = Vec::with_capacity(count * 2);
    let mut background_points = Vec::with_capacity(count * 2);
    let mut data_indices = Vec::with_capacity(count);

    for (idx, (&base_value, &value)) in series.base_values.iter().zip(&series.values).enumerate() {
        let (x, y) = if value_horizontal {
            (
                value_axis.data_to_coord(value, false),
                base_axis.data_to_coord(base_value, false),
            )
        } else {
            (
                base_axis.data_to_coord(base_value, false),
                value_axis.data_to_coord(value, false),
            )
        };
        if value_horizontal {
            background_points.extend([grid.x + grid.width, y]);
        } else {
            background_points.extend([x, grid.y + grid.height]);
        }
        points.extend([x, y]);
        data_indices.push(idx);
    }

    debug!(count, bar_width, "large bar layout");
    Ok(LargeBarBuffers {
        points,
        background_points,
        data_indices,
        bar_width,
        value_axis_start: value_axis_start(value_axis),
        background_start: if value_horizontal { grid.x } else { grid.y },
        value_axis_horizontal: value_horizontal,
    })
}
