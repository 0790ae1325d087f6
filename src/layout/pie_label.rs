//! Outside-label placement for pie slices.
//!
//! Labels are split into a left and a right column by their anchor x,
//! pushed apart vertically until they no longer overlap, then slid along
//! the circle so leader lines keep a similar length.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::{ChartError, ChartResult};
use crate::layout::pie::PieSlice;

/// Extra leader-line length used when re-deriving label x.
pub const LABEL_LINE_EXTRA: f64 = 20.0;
/// Minimum horizontal step between consecutive labels on one side.
pub const LABEL_MIN_SPACING: f64 = 10.0;

/// Measured label box of one slice.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PieLabelInput {
    pub index: usize,
    /// Slice bisector in degrees, counter-clockwise from 3 o'clock.
    pub mid_angle: f64,
    pub width: f64,
    pub height: f64,
}

impl PieLabelInput {
    #[must_use]
    pub fn from_slice(slice: &PieSlice, width: f64, height: f64) -> Self {
        Self {
            index: slice.index,
            mid_angle: slice.mid_angle(),
            width,
            height,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PieLabelOptions {
    pub cx: f64,
    pub cy: f64,
    pub r: f64,
    /// First leader-line segment length, out of the slice edge.
    #[serde(default = "default_line_length")]
    pub line_length: f64,
    pub view_height: f64,
}

fn default_line_length() -> f64 {
    15.0
}

impl PieLabelOptions {
    #[must_use]
    pub fn new(cx: f64, cy: f64, r: f64, view_height: f64) -> Self {
        Self {
            cx,
            cy,
            r,
            line_length: default_line_length(),
            view_height,
        }
    }

    #[must_use]
    pub fn with_line_length(mut self, line_length: f64) -> Self {
        self.line_length = line_length;
        self
    }

    pub fn validate(self) -> ChartResult<Self> {
        for (name, value) in [
            ("cx", self.cx),
            ("cy", self.cy),
            ("r", self.r),
            ("line length", self.line_length),
            ("view height", self.view_height),
        ] {
            if !value.is_finite() {
                return Err(ChartError::InvalidConfig(format!(
                    "pie label {name} must be finite"
                )));
            }
        }
        if self.r < 0.0 || self.line_length < 0.0 {
            return Err(ChartError::InvalidConfig(
                "pie label radius and line length must be >= 0".to_owned(),
            ));
        }
        Ok(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LabelSide {
    Left,
    Right,
}

/// Final label anchor plus its three-point leader line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PieLabelLayout {
    pub index: usize,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub side: LabelSide,
    pub line_points: [[f64; 2]; 3],
}

/// Places every label; output follows input order.
pub fn layout_pie_labels(
    labels: &[PieLabelInput],
    options: &PieLabelOptions,
) -> ChartResult<Vec<PieLabelLayout>> {
    let options = options.validate()?;
    let (cx, cy, r) = (options.cx, options.cy, options.r);
    let outer = r + options.line_length;

    let mut left = Vec::new();
    let mut right = Vec::new();
    for label in labels {
        let radian = label.mid_angle.to_radians();
        let (sin, cos) = radian.sin_cos();
        let x = cx + outer * cos;
        let y = cy - outer * sin;
        let side = if x < cx { LabelSide::Left } else { LabelSide::Right };
        let layout = PieLabelLayout {
            index: label.index,
            x,
            y,
            width: label.width,
            height: label.height,
            side,
            line_points: [[cx + r * cos, cy - r * sin], [x, y], [x, y]],
        };
        match side {
            LabelSide::Left => left.push(layout),
            LabelSide::Right => right.push(layout),
        }
    }

    adjust_side(&mut left, -1.0, &options);
    adjust_side(&mut right, 1.0, &options);

    let mut placed: Vec<PieLabelLayout> = left.into_iter().chain(right).collect();
    // Elbow keeps its x so the outer segment stays horizontal.
    for label in &mut placed {
        label.line_points[1][1] = label.y;
        label.line_points[2] = [label.x, label.y];
    }
    // Restore caller order.
    let mut ordered = Vec::with_capacity(placed.len());
    for label in labels {
        if let Some(pos) = placed.iter().position(|item| item.index == label.index) {
            ordered.push(placed.swap_remove(pos));
        }
    }
    Ok(ordered)
}

fn adjust_side(list: &mut [PieLabelLayout], dir: f64, options: &PieLabelOptions) {
    list.sort_by(|a, b| a.y.total_cmp(&b.y));

    let len = list.len();
    let mut last_y = 0.0;
    for idx in 0..len {
        let delta = list[idx].y - last_y;
        if delta < 0.0 {
            change_down(list, idx, len, -delta);
        }
        last_y = list[idx].y + list[idx].height;
    }
    if len > 0 && options.view_height - last_y < 0.0 {
        change_up(list, len - 1, last_y - options.view_height);
    }

    let (up, down): (Vec<usize>, Vec<usize>) = (0..len).partition(|&idx| list[idx].y < options.cy);
    change_x(list, &up, false, dir, options);
    change_x(list, &down, true, dir, options);
    trace!(count = len, dir, "pie label side");
}

/// Moves `list[start..end]` down by `delta`; once a gap opens below, the
/// moved block is balanced back up by half the delta.
fn change_down(list: &mut [PieLabelLayout], start: usize, end: usize, delta: f64) {
    for j in start..end {
        list[j].y += delta;
        if j > start && j + 1 < end && list[j + 1].y > list[j].y + list[j].height {
            change_up(list, j, delta / 2.0);
            return;
        }
    }
    change_up(list, end - 1, delta / 2.0);
}

/// Moves `list[..=end]` up by `delta`, stopping at the first gap.
fn change_up(list: &mut [PieLabelLayout], end: usize, delta: f64) {
    for j in (0..=end).rev() {
        list[j].y -= delta;
        if j > 0 && list[j].y > list[j - 1].y + list[j - 1].height {
            break;
        }
    }
}

fn change_x(
    list: &mut [PieLabelLayout],
    members: &[usize],
    is_down: bool,
    dir: f64,
    options: &PieLabelOptions,
) {
    let (cx, cy, r, line_length) = (options.cx, options.cy, options.r, options.line_length);
    let reach = r + line_length + LABEL_LINE_EXTRA;
    let mut last_delta_x = if is_down { f64::MAX } else { 0.0 };

    for &idx in members {
        let label = &mut list[idx];
        let delta_y = (label.y - cy).abs();
        let mut delta_x = if delta_y < r + line_length {
            (reach * reach - delta_y * delta_y).sqrt()
        } else {
            (label.x - cx).abs()
        };
        if is_down && delta_x >= last_delta_x {
            delta_x = last_delta_x - LABEL_MIN_SPACING;
        }
        if !is_down && delta_x <= last_delta_x {
            delta_x = last_delta_x + LABEL_MIN_SPACING;
        }
        label.x = cx + delta_x * dir;
        last_delta_x = delta_x;
    }
}
