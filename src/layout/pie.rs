//! Pie slice angles and rose radii.
//!
//! [`layout_pie`] works in degrees with a per-slice minimum sliver carved
//! out of the full turn up front. [`layout_pie_radians`] works in screen
//! radians and redistributes the angle left over after `min_angle` and
//! `pad_angle` floors.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::core::number::{get_percent_with_precision, linear_map, round};
use crate::core::types::{Length, Rect};
use crate::error::{ChartError, ChartResult};
use crate::layout::SectorLayout;

const PI2: f64 = PI * 2.0;
const ZERO_SLICE_ANGLE: f64 = 0.01;
const DEFAULT_MIN_ANGLE: f64 = 0.01;
const REST_ANGLE_EPSILON: f64 = 1e-3;

/// Nightingale rose variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoseType {
    /// Angle by value, radius by value.
    Radius,
    /// Equal angles, area by value.
    Area,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PieOptions {
    #[serde(default = "default_center")]
    pub center: [Length; 2],
    #[serde(default = "default_radius")]
    pub radius: [Length; 2],
    /// Degrees, counter-clockwise from 3 o'clock.
    #[serde(default = "default_start_angle")]
    pub start_angle: f64,
    /// Degrees. `None` closes the full turn.
    #[serde(default)]
    pub end_angle: Option<f64>,
    #[serde(default)]
    pub pad_angle: f64,
    #[serde(default)]
    pub min_angle: f64,
    #[serde(default = "default_true")]
    pub clockwise: bool,
    #[serde(default)]
    pub rose_type: Option<RoseType>,
    #[serde(default = "default_true")]
    pub still_show_zero_sum: bool,
    #[serde(default = "default_percent_precision")]
    pub percent_precision: i32,
}

fn default_center() -> [Length; 2] {
    [Length::percent(50.0), Length::percent(50.0)]
}

fn default_radius() -> [Length; 2] {
    [Length::Absolute(0.0), Length::percent(75.0)]
}

fn default_start_angle() -> f64 {
    90.0
}

fn default_true() -> bool {
    true
}

fn default_percent_precision() -> i32 {
    2
}

impl Default for PieOptions {
    fn default() -> Self {
        Self {
            center: default_center(),
            radius: default_radius(),
            start_angle: default_start_angle(),
            end_angle: None,
            pad_angle: 0.0,
            min_angle: 0.0,
            clockwise: true,
            rose_type: None,
            still_show_zero_sum: true,
            percent_precision: default_percent_precision(),
        }
    }
}

impl PieOptions {
    #[must_use]
    pub fn with_radius(mut self, inner: impl Into<Length>, outer: impl Into<Length>) -> Self {
        self.radius = [inner.into(), outer.into()];
        self
    }

    #[must_use]
    pub fn with_center(mut self, x: impl Into<Length>, y: impl Into<Length>) -> Self {
        self.center = [x.into(), y.into()];
        self
    }

    #[must_use]
    pub fn with_start_angle(mut self, degrees: f64) -> Self {
        self.start_angle = degrees;
        self
    }

    #[must_use]
    pub fn with_end_angle(mut self, degrees: f64) -> Self {
        self.end_angle = Some(degrees);
        self
    }

    #[must_use]
    pub fn with_min_angle(mut self, degrees: f64) -> Self {
        self.min_angle = degrees;
        self
    }

    #[must_use]
    pub fn with_pad_angle(mut self, degrees: f64) -> Self {
        self.pad_angle = degrees;
        self
    }

    #[must_use]
    pub fn with_clockwise(mut self, clockwise: bool) -> Self {
        self.clockwise = clockwise;
        self
    }

    #[must_use]
    pub fn with_rose_type(mut self, rose_type: RoseType) -> Self {
        self.rose_type = Some(rose_type);
        self
    }

    #[must_use]
    pub fn with_still_show_zero_sum(mut self, still_show_zero_sum: bool) -> Self {
        self.still_show_zero_sum = still_show_zero_sum;
        self
    }

    pub fn validate(self) -> ChartResult<Self> {
        for (name, angle) in [
            ("start angle", Some(self.start_angle)),
            ("end angle", self.end_angle),
            ("pad angle", Some(self.pad_angle)),
            ("min angle", Some(self.min_angle)),
        ] {
            if angle.is_some_and(|angle| !angle.is_finite()) {
                return Err(ChartError::InvalidConfig(format!("{name} must be finite")));
            }
        }
        if self.min_angle < 0.0 || self.min_angle >= 360.0 {
            return Err(ChartError::InvalidConfig(
                "min angle must be in [0, 360)".to_owned(),
            ));
        }
        if self.pad_angle < 0.0 {
            return Err(ChartError::InvalidConfig(
                "pad angle must be >= 0".to_owned(),
            ));
        }
        if !(0..=20).contains(&self.percent_precision) {
            return Err(ChartError::InvalidConfig(
                "percent precision must be in [0, 20]".to_owned(),
            ));
        }
        Ok(self)
    }

    /// Center and radii resolved against `view`.
    fn circle(&self, view: Rect) -> ChartResult<(f64, f64, f64, f64)> {
        let view = view.validate()?;
        let cx = view.x + self.center[0].resolve(view.width);
        let cy = view.y + self.center[1].resolve(view.height);
        let half_size = view.width.min(view.height) / 2.0;
        let r0 = self.radius[0].resolve(half_size);
        let r = self.radius[1].resolve(half_size);
        for (name, value) in [("center x", cx), ("center y", cy), ("inner radius", r0), ("radius", r)] {
            if !value.is_finite() {
                return Err(ChartError::InvalidConfig(format!("pie {name} is not a finite length")));
            }
        }
        Ok((cx, cy, r0.min(r), r0.max(r)))
    }
}

/// One laid-out slice. Angle units depend on the layout function.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PieSlice {
    pub index: usize,
    pub value: f64,
    /// Share of the total in percent.
    pub percent: f64,
    pub sector: SectorLayout,
}

impl PieSlice {
    /// Bisector of the slice, in the same unit as its angles.
    #[must_use]
    pub fn mid_angle(&self) -> f64 {
        (self.sector.start_angle + self.sector.end_angle) / 2.0
    }
}

/// Classic pie layout in degrees, counter-clockwise positive.
///
/// Every non-zero slice gets `min_angle` (default `0.01`) on top of its
/// share and zero slices get `0.01`, so tiny slices stay visible. NaN values
/// are skipped. End angles are rounded to two decimals. A zero total yields
/// nothing unless `still_show_zero_sum`, which splits the turn evenly.
pub fn layout_pie(values: &[f64], view: Rect, options: &PieOptions) -> ChartResult<Vec<PieSlice>> {
    let options = options.clone().validate()?;
    let (cx, cy, r0, r1) = options.circle(view)?;

    let valid: Vec<(usize, f64)> = values
        .iter()
        .copied()
        .enumerate()
        .filter(|(_, value)| !value.is_nan())
        .collect();
    let nonzero = valid.iter().filter(|(_, value)| *value != 0.0).count();
    let zero = valid.len() - nonzero;
    let total: f64 = valid.iter().map(|(_, value)| value).sum();
    let max = valid
        .iter()
        .map(|(_, value)| *value)
        .fold(f64::NEG_INFINITY, f64::max);

    let zero_sum = total == 0.0;
    if valid.is_empty() || (zero_sum && !options.still_show_zero_sum) {
        warn!(count = valid.len(), "pie has nothing to lay out");
        return Ok(Vec::new());
    }

    let min_angle = if options.min_angle > 0.0 {
        options.min_angle
    } else {
        DEFAULT_MIN_ANGLE
    };
    let total_angle = 360.0 - min_angle * nonzero as f64 - ZERO_SLICE_ANGLE * zero as f64;
    let drawn_count = valid.len() as f64;
    let rose_area_sweep = 360.0 / values.len() as f64;
    let clockwise = options.clockwise;

    let mut start_angle = round(options.start_angle, 2);
    let mut slices = Vec::with_capacity(valid.len());
    for (index, value) in valid {
        let share = if zero_sum { 1.0 / drawn_count } else { value / total };
        let sweep = if options.rose_type == Some(RoseType::Area) {
            rose_area_sweep
        } else {
            let reserved = if share != 0.0 { min_angle } else { ZERO_SLICE_ANGLE };
            share * total_angle + reserved
        };
        let end_angle = round(
            if clockwise {
                start_angle - sweep
            } else {
                start_angle + sweep
            },
            2,
        );

        let r = match options.rose_type {
            Some(RoseType::Radius) => value / max * (r1 - r0) * 0.8 + (r1 - r0) * 0.2 + r0,
            Some(RoseType::Area) => (value / max).sqrt() * (r1 - r0) + r0,
            None => r1,
        };

        let (from, to) = if clockwise {
            (end_angle, start_angle)
        } else {
            (start_angle, end_angle)
        };
        slices.push(PieSlice {
            index,
            value,
            percent: if zero_sum { 0.0 } else { round(share * 100.0, 2) },
            sector: SectorLayout {
                cx,
                cy,
                r0,
                r,
                start_angle: from,
                end_angle: to,
                clockwise,
            },
        });
        start_angle = end_angle;
    }

    debug!(slices = slices.len(), total, total_angle, "pie layout");
    Ok(slices)
}

fn mod_turn(angle: f64) -> f64 {
    ((angle % PI2) + PI2) % PI2
}

/// Normalizes `[start, end]` so `start` is in `[0, 2π)` and the sweep runs
/// in the requested direction by at most one turn.
fn normalize_arc_angles(angles: &mut [f64; 2], anticlockwise: bool) {
    let start = mod_turn(angles[0]);
    let mut end = angles[1] + (start - angles[0]);
    if !anticlockwise && end - start >= PI2 {
        end = start + PI2;
    } else if anticlockwise && start - end >= PI2 {
        end = start - PI2;
    } else if !anticlockwise && start > end {
        end = start + (PI2 - mod_turn(start - end));
    } else if anticlockwise && start < end {
        end = start - (PI2 - mod_turn(end - start));
    }
    *angles = [start, end];
}

/// Pie layout in screen radians (clockwise positive).
///
/// Slices narrower than `min_angle + pad_angle` are widened to it and the
/// remaining angle is shared by the other slices in proportion to their
/// values. When nothing is left every slice gets an equal share.
pub fn layout_pie_radians(
    values: &[f64],
    view: Rect,
    options: &PieOptions,
) -> ChartResult<Vec<Option<PieSlice>>> {
    let options = options.clone().validate()?;
    let (cx, cy, r0, r) = options.circle(view)?;
    let clockwise = options.clockwise;

    let start = -options.start_angle.to_radians();
    let end = options
        .end_angle
        .map_or(start - PI2, |end_angle| -end_angle.to_radians());
    let pad_angle = options.pad_angle.to_radians();
    let min_and_pad_angle = options.min_angle.to_radians() + pad_angle;

    let valid_count = values.iter().filter(|value| !value.is_nan()).count();
    let sum: f64 = values.iter().filter(|value| !value.is_nan()).sum();
    let max = values
        .iter()
        .copied()
        .filter(|value| !value.is_nan())
        .fold(0.0, f64::max);
    let extent = [0.0, max];

    let mut unit_radian = PI2 / if sum != 0.0 { sum } else { valid_count as f64 };
    let dir = if clockwise { 1.0 } else { -1.0 };
    let half_pad_angle = dir * pad_angle / 2.0;

    let mut angles = [start, end];
    normalize_arc_angles(&mut angles, !clockwise);
    let [start_angle, end_angle] = angles;
    let angle_range = (end_angle - start_angle).abs();

    let mut rest_angle = angle_range;
    let mut value_sum_larger_than_min_angle = 0.0;
    let mut current_angle = start_angle;

    let radius_of = |value: f64| {
        if options.rose_type.is_some() {
            linear_map(value, extent, [r0, r], false)
        } else {
            r
        }
    };
    let sector = |from: f64, to: f64, radius: f64| SectorLayout {
        cx,
        cy,
        r0,
        r: radius,
        start_angle: from,
        end_angle: to,
        clockwise,
    };

    // (slice, sweep angle)
    let mut slices: Vec<Option<(PieSlice, f64)>> = Vec::with_capacity(values.len());
    for (index, &value) in values.iter().enumerate() {
        if value.is_nan() {
            slices.push(None);
            continue;
        }

        let mut angle = if options.rose_type == Some(RoseType::Area) {
            angle_range / valid_count as f64
        } else if sum == 0.0 && options.still_show_zero_sum {
            unit_radian
        } else {
            value * unit_radian
        };

        if angle < min_and_pad_angle {
            angle = min_and_pad_angle;
            rest_angle -= min_and_pad_angle;
        } else {
            value_sum_larger_than_min_angle += value;
        }

        let slice_end = current_angle + dir * angle;
        let (from, to) = if pad_angle > angle {
            let mid = current_angle + dir * angle / 2.0;
            (mid, mid)
        } else {
            (current_angle + half_pad_angle, slice_end - half_pad_angle)
        };

        slices.push(Some((
            PieSlice {
                index,
                value,
                percent: get_percent_with_precision(values, index, options.percent_precision),
                sector: sector(from, to, radius_of(value)),
            },
            angle,
        )));
        current_angle = slice_end;
    }

    if rest_angle < PI2 && valid_count > 0 {
        if rest_angle <= REST_ANGLE_EPSILON {
            let angle = angle_range / valid_count as f64;
            for (idx, (slice, sweep)) in slices.iter_mut().enumerate().filter_map(|(idx, slot)| {
                slot.as_mut().map(|slot| (idx, slot))
            }) {
                let idx = idx as f64;
                *sweep = angle;
                let (from, to) = if angle < pad_angle {
                    let mid = start_angle + dir * (idx + 0.5) * angle;
                    (mid, mid)
                } else {
                    (
                        start_angle + dir * idx * angle + half_pad_angle,
                        start_angle + dir * (idx + 1.0) * angle - half_pad_angle,
                    )
                };
                slice.sector.start_angle = from;
                slice.sector.end_angle = to;
            }
        } else {
            unit_radian = rest_angle / value_sum_larger_than_min_angle;
            current_angle = start_angle;
            for (slice, sweep) in slices.iter_mut().flatten() {
                let angle = if *sweep == min_and_pad_angle {
                    min_and_pad_angle
                } else {
                    slice.value * unit_radian
                };
                let (from, to) = if angle < pad_angle {
                    let mid = current_angle + dir * angle / 2.0;
                    (mid, mid)
                } else {
                    (
                        current_angle + half_pad_angle,
                        current_angle + dir * angle - half_pad_angle,
                    )
                };
                *sweep = angle;
                slice.sector.start_angle = from;
                slice.sector.end_angle = to;
                current_angle += dir * angle;
            }
        }
    }

    debug!(
        slices = valid_count,
        angle_range,
        rest_angle,
        "pie radian layout"
    );
    Ok(slices
        .into_iter()
        .map(|slot| slot.map(|(slice, _)| slice))
        .collect())
}
