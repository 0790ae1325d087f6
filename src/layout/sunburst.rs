//! Sunburst ring layout: each level is a ring, each node a sector whose
//! sweep is its share of the parent's sweep.

use std::f64::consts::PI;

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::types::{Length, Rect};
use crate::error::{ChartError, ChartResult};
use crate::layout::SectorLayout;

const PI2: f64 = PI * 2.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SunburstNode {
    pub name: String,
    /// `None` sums the children.
    #[serde(default)]
    pub value: Option<f64>,
    #[serde(default)]
    pub children: Vec<SunburstNode>,
}

impl SunburstNode {
    #[must_use]
    pub fn leaf(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            value: Some(value),
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn branch(name: impl Into<String>, children: Vec<SunburstNode>) -> Self {
        Self {
            name: name.into(),
            value: None,
            children,
        }
    }

    /// Own value, or the sum of the children's values. NaN children count
    /// as zero.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.value.unwrap_or_else(|| {
            self.children
                .iter()
                .map(SunburstNode::total)
                .filter(|value| !value.is_nan())
                .sum()
        })
    }

    fn height(&self) -> usize {
        self.children
            .iter()
            .map(|child| child.height() + 1)
            .max()
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SunburstSort {
    #[default]
    Desc,
    Asc,
    None,
}

/// Ring radii override for one depth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SunburstLevel {
    #[serde(default)]
    pub r0: Option<Length>,
    #[serde(default)]
    pub r: Option<Length>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SunburstOptions {
    #[serde(default = "default_center")]
    pub center: [Length; 2],
    #[serde(default = "default_radius")]
    pub radius: [Length; 2],
    /// Degrees, counter-clockwise from 3 o'clock.
    #[serde(default = "default_start_angle")]
    pub start_angle: f64,
    /// Degrees.
    #[serde(default)]
    pub min_angle: f64,
    #[serde(default = "default_true")]
    pub clockwise: bool,
    #[serde(default = "default_true")]
    pub still_show_zero_sum: bool,
    #[serde(default)]
    pub sort: SunburstSort,
    /// `levels[d]` applies to the ring at depth `d` (0 is innermost).
    #[serde(default)]
    pub levels: Vec<SunburstLevel>,
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

impl Default for SunburstOptions {
    fn default() -> Self {
        Self {
            center: default_center(),
            radius: default_radius(),
            start_angle: default_start_angle(),
            min_angle: 0.0,
            clockwise: true,
            still_show_zero_sum: true,
            sort: SunburstSort::Desc,
            levels: Vec::new(),
        }
    }
}

impl SunburstOptions {
    #[must_use]
    pub fn with_radius(mut self, inner: impl Into<Length>, outer: impl Into<Length>) -> Self {
        self.radius = [inner.into(), outer.into()];
        self
    }

    #[must_use]
    pub fn with_min_angle(mut self, degrees: f64) -> Self {
        self.min_angle = degrees;
        self
    }

    #[must_use]
    pub fn with_sort(mut self, sort: SunburstSort) -> Self {
        self.sort = sort;
        self
    }

    #[must_use]
    pub fn with_clockwise(mut self, clockwise: bool) -> Self {
        self.clockwise = clockwise;
        self
    }

    #[must_use]
    pub fn with_levels(mut self, levels: Vec<SunburstLevel>) -> Self {
        self.levels = levels;
        self
    }

    pub fn validate(self) -> ChartResult<Self> {
        if !self.start_angle.is_finite() {
            return Err(ChartError::InvalidConfig(
                "sunburst start angle must be finite".to_owned(),
            ));
        }
        if !self.min_angle.is_finite() || !(0.0..360.0).contains(&self.min_angle) {
            return Err(ChartError::InvalidConfig(
                "sunburst min angle must be in [0, 360)".to_owned(),
            ));
        }
        Ok(self)
    }
}

/// Laid-out node. `path` holds child indices from the roots down, in the
/// input order (before sorting).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SunburstSector {
    pub path: Vec<usize>,
    pub name: String,
    pub value: f64,
    pub depth: usize,
    /// Sweep in radians.
    pub angle: f64,
    pub sector: SectorLayout,
}

struct Context<'a> {
    options: &'a SunburstOptions,
    cx: f64,
    cy: f64,
    r0: f64,
    r_per_level: f64,
    half_size: f64,
    min_angle: f64,
    dir: f64,
}

impl Context<'_> {
    fn radii(&self, depth: usize) -> (f64, f64) {
        let mut r_start = self.r0 + self.r_per_level * depth as f64;
        let mut r_end = self.r0 + self.r_per_level * (depth + 1) as f64;
        if let Some(level) = self.options.levels.get(depth) {
            if let Some(r0) = &level.r0 {
                r_start = r0.resolve(self.half_size);
            }
            if let Some(r) = &level.r {
                r_end = r.resolve(self.half_size);
            }
        }
        (r_start, r_end)
    }
}

/// Lays out `roots` as the innermost ring.
pub fn layout_sunburst(
    roots: &[SunburstNode],
    view: Rect,
    options: &SunburstOptions,
) -> ChartResult<Vec<SunburstSector>> {
    let options = options.clone().validate()?;
    let view = view.validate()?;

    let half_size = view.width.min(view.height) / 2.0;
    let cx = view.x + options.center[0].resolve(view.width);
    let cy = view.y + options.center[1].resolve(view.height);
    let r0 = options.radius[0].resolve(half_size);
    let r = options.radius[1].resolve(half_size);
    if ![cx, cy, r0, r].iter().all(|value| value.is_finite()) {
        return Err(ChartError::InvalidConfig(
            "sunburst center and radius must resolve to finite lengths".to_owned(),
        ));
    }

    let levels = roots.iter().map(|root| root.height() + 1).max().unwrap_or(0);
    let context = Context {
        cx,
        cy,
        r0,
        r_per_level: (r - r0) / levels.max(1) as f64,
        half_size,
        min_angle: options.min_angle.to_radians(),
        dir: if options.clockwise { 1.0 } else { -1.0 },
        options: &options,
    };

    let mut sectors = Vec::new();
    let start_angle = -options.start_angle.to_radians();
    layout_siblings(roots, &[], 0, start_angle, PI2, &context, &mut sectors);

    debug!(sectors = sectors.len(), levels, "sunburst layout");
    Ok(sectors)
}

fn sorted_order(nodes: &[SunburstNode], sort: SunburstSort) -> Vec<(usize, f64)> {
    let mut order: Vec<(usize, f64)> = nodes
        .iter()
        .enumerate()
        .map(|(idx, node)| (idx, node.total()))
        .collect();
    match sort {
        SunburstSort::Desc => order.sort_by_key(|(_, value)| std::cmp::Reverse(OrderedFloat(*value))),
        SunburstSort::Asc => order.sort_by_key(|(_, value)| OrderedFloat(*value)),
        SunburstSort::None => {}
    }
    order
}

/// Shares `span` among `nodes`, starting at `start_angle`.
///
/// Sectors below `min_angle` are widened to it; the angle left over is then
/// handed to the others at `rest / (sum of their values)` per unit. That
/// second pass does not re-check the floor.
fn layout_siblings(
    nodes: &[SunburstNode],
    parent_path: &[usize],
    depth: usize,
    start_angle: f64,
    span: f64,
    context: &Context<'_>,
    out: &mut Vec<SunburstSector>,
) {
    let order = sorted_order(nodes, context.options.sort);
    let valid_count = order.iter().filter(|(_, value)| !value.is_nan()).count();
    let sum: f64 = order
        .iter()
        .map(|(_, value)| *value)
        .filter(|value| !value.is_nan())
        .sum();
    if valid_count == 0 {
        return;
    }
    let zero_sum = sum == 0.0;
    let unit = span / if zero_sum { valid_count as f64 } else { sum };

    let mut angles: Vec<(usize, f64, f64, bool)> = Vec::with_capacity(order.len());
    let mut rest_angle = span;
    let mut value_sum_larger_than_min_angle = 0.0;
    for &(idx, value) in &order {
        if value.is_nan() {
            continue;
        }
        let mut angle = if zero_sum {
            if context.options.still_show_zero_sum { unit } else { 0.0 }
        } else {
            value * unit
        };
        let floored = angle < context.min_angle;
        if floored {
            angle = context.min_angle;
            rest_angle -= context.min_angle;
        } else {
            value_sum_larger_than_min_angle += value;
        }
        angles.push((idx, value, angle, floored));
    }

    if rest_angle < span && value_sum_larger_than_min_angle > 0.0 {
        let rest_unit = rest_angle.max(0.0) / value_sum_larger_than_min_angle;
        for (_, value, angle, floored) in &mut angles {
            if !*floored {
                *angle = *value * rest_unit;
            }
        }
    }

    let mut current = start_angle;
    for (idx, value, angle, _) in angles {
        let node = &nodes[idx];
        let end = current + context.dir * angle;
        let (r0, r) = context.radii(depth);
        let mut path = parent_path.to_vec();
        path.push(idx);

        out.push(SunburstSector {
            path: path.clone(),
            name: node.name.clone(),
            value,
            depth,
            angle,
            sector: SectorLayout {
                cx: context.cx,
                cy: context.cy,
                r0,
                r,
                start_angle: current,
                end_angle: end,
                clockwise: context.options.clockwise,
            },
        });

        if !node.children.is_empty() {
            layout_siblings(&node.children, &path, depth + 1, current, angle, context, out);
        }
        current = end;
    }
}
