use indexmap::IndexMap;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::axis::Axis;
use crate::core::scale::ScaleKind;
use crate::error::{ChartError, ChartResult};
use crate::layout::SectorLayout;
use crate::layout::bar_grid::{
    BarSeries, BarSeriesLayoutInput, ColumnDefaults, StackCoords, StackKey, calc_columns, stack_id,
};

const FULL_TURN: f64 = 360.0;
const AXIS_KEY: &str = "polar0";

/// Axis the bars are grouped along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PolarBaseAxis {
    /// Tangential bars: columns are rings, values sweep angles.
    Radius,
    /// Radial bars: columns are wedges, values extend radii.
    Angle,
}

/// Polar coordinate system. The angle axis works in degrees,
/// counter-clockwise positive; the radius axis in pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolarCoord {
    pub cx: f64,
    pub cy: f64,
    pub angle_axis: Axis,
    pub radius_axis: Axis,
    pub base: PolarBaseAxis,
}

impl PolarCoord {
    #[must_use]
    pub fn base_axis(&self) -> &Axis {
        match self.base {
            PolarBaseAxis::Radius => &self.radius_axis,
            PolarBaseAxis::Angle => &self.angle_axis,
        }
    }

    #[must_use]
    pub fn value_axis(&self) -> &Axis {
        match self.base {
            PolarBaseAxis::Radius => &self.angle_axis,
            PolarBaseAxis::Angle => &self.radius_axis,
        }
    }

    fn band_width(&self, count: usize) -> f64 {
        let axis = self.base_axis();
        if axis.scale().kind() == ScaleKind::Ordinal {
            axis.band_width()
        } else {
            axis.span() / count.max(1) as f64
        }
    }
}

/// Shifts a tangential sector by a full turn when its end leaves the angle
/// extent, keeping the sweep direction.
fn wrap_into_extent(start: f64, end: f64, extent: [f64; 2]) -> (f64, f64) {
    let min = extent[0].min(extent[1]);
    let max = extent[0].max(extent[1]);
    if end < min && end + FULL_TURN <= max {
        (start + FULL_TURN, end + FULL_TURN)
    } else if end > max && end - FULL_TURN >= min {
        (start - FULL_TURN, end - FULL_TURN)
    } else {
        (start, end)
    }
}

/// Lays out bar series on a polar coordinate system.
///
/// Values are clamped to the value axis extent. Output angles are radians in
/// screen orientation (`-deg * PI / 180`). `None` marks NaN values.
pub fn layout_bar_polar(
    series: &[BarSeries],
    polar: &PolarCoord,
) -> ChartResult<Vec<Vec<Option<SectorLayout>>>> {
    for item in series {
        item.validate()?;
    }
    let band_width = polar.band_width(series.first().map_or(0, |item| item.values.len()));
    if !band_width.is_finite() || band_width < 0.0 {
        return Err(ChartError::InvalidData(format!(
            "polar band width must be finite and >= 0, got {band_width}"
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
    let columns = calc_columns(&inputs, &ColumnDefaults::polar());
    let empty = IndexMap::new();
    let stacks = columns.get(AXIS_KEY).unwrap_or(&empty);

    let base_axis = polar.base_axis();
    let value_axis = polar.value_axis();
    let value_start = value_axis.data_to_coord(0.0, false);
    // Only tangential bars are clamped to the angle extent.
    let clamp_value = matches!(polar.base, PolarBaseAxis::Radius);
    let mut last_stack_coords: IndexMap<StackKey, StackCoords> = IndexMap::new();
    let mut layouts = Vec::with_capacity(series.len());

    for item in series {
        let stack_id = stack_id(item.series_index, &item.options);
        let Some(column) = stacks.get(&stack_id).copied() else {
            layouts.push(Vec::new());
            continue;
        };
        let stacked = item.stacked();
        let min_height = item.options.bar_min_height;
        let min_angle = item.options.bar_min_angle;

        let mut sectors = Vec::with_capacity(item.values.len());
        for (&base_value, &value) in item.base_values.iter().zip(&item.values) {
            let base_coord_on_axis = base_axis.data_to_coord(base_value, false);
            let span = value_axis.data_to_coord(value, clamp_value) - value_start;
            if span.is_nan() || base_coord_on_axis.is_nan() {
                sectors.push(None);
                continue;
            }

            let key = (stack_id.clone(), OrderedFloat(base_value));
            let base_coord = if stacked {
                let coords = last_stack_coords
                    .entry(key.clone())
                    .or_insert_with(|| StackCoords::new(value_start));
                *coords.get_mut(value)
            } else {
                value_start
            };

            let (r0, r, start_angle, end_angle, stack_top) = match polar.base {
                PolarBaseAxis::Angle => {
                    let mut radius_span = span;
                    if radius_span.abs() < min_height {
                        radius_span = if radius_span < 0.0 { -min_height } else { min_height };
                    }
                    let start_angle = base_coord_on_axis - column.offset;
                    let r = base_coord + radius_span;
                    (base_coord, r, start_angle, start_angle - column.width, base_coord + span)
                }
                PolarBaseAxis::Radius => {
                    let mut angle_span = span;
                    if angle_span.abs() < min_angle {
                        angle_span = if angle_span < 0.0 { -min_angle } else { min_angle };
                    }
                    let r0 = base_coord_on_axis + column.offset;
                    let (start, end) = if stacked && value < 0.0 {
                        wrap_into_extent(base_coord, base_coord + angle_span, value_axis.extent())
                    } else {
                        (base_coord, base_coord + angle_span)
                    };
                    let stack_top = end - angle_span + span;
                    (r0, r0 + column.width, start, end, stack_top)
                }
            };

            if stacked {
                if let Some(coords) = last_stack_coords.get_mut(&key) {
                    *coords.get_mut(value) = stack_top;
                }
            }

            sectors.push(Some(SectorLayout {
                cx: polar.cx,
                cy: polar.cy,
                r0,
                r,
                start_angle: -start_angle.to_radians(),
                end_angle: -end_angle.to_radians(),
                clockwise: true,
            }));
        }
        layouts.push(sectors);
    }

    debug!(series = layouts.len(), band_width, "polar bar layout");
    Ok(layouts)
}
