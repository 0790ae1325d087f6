//! Streamgraph layout: layers stacked around a moving baseline.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::axis::Axis;
use crate::core::types::{Length, Rect};
use crate::error::{ChartError, ChartResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ThemeRiverBaseline {
    /// Centers the whole stack on the midline.
    #[default]
    Symmetric,
    /// Minimized-wiggle baseline weighting each layer by its reverse rank.
    Wiggle,
}

/// One stream. `values[j]` belongs to the shared timestamp `j`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThemeRiverLayer {
    pub name: String,
    pub values: Vec<f64>,
}

impl ThemeRiverLayer {
    #[must_use]
    pub fn new(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }
}

/// `y0` is the absolute top edge of the layer band, `y` its thickness.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThemeRiverPoint {
    pub layer_index: usize,
    pub x: f64,
    pub y0: f64,
    pub y: f64,
}

/// Baseline offsets per timestamp and the tallest resulting stack.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Baseline {
    pub y0: Vec<f64>,
    pub max: f64,
}

fn clean(value: f64) -> f64 {
    if value.is_nan() { 0.0 } else { value }
}

/// Value of `layer` at timestamp `j`; missing or NaN counts as zero.
fn at(layer: &[f64], j: usize) -> f64 {
    layer.get(j).copied().map_or(0.0, clean)
}

/// Computes the baseline for `layers[i][j]` (layer `i`, timestamp `j`).
#[must_use]
pub fn compute_baseline(layers: &[Vec<f64>], mode: ThemeRiverBaseline) -> Baseline {
    let point_count = layers.iter().map(Vec::len).max().unwrap_or(0);
    let sums: Vec<f64> = (0..point_count)
        .map(|j| layers.iter().map(|layer| at(layer, j)).sum())
        .collect();

    let y0: Vec<f64> = match mode {
        ThemeRiverBaseline::Symmetric => {
            let max = sums.iter().copied().fold(0.0, f64::max);
            sums.iter().map(|sum| (max - sum) / 2.0).collect()
        }
        ThemeRiverBaseline::Wiggle => {
            let n = layers.len() as f64;
            let g0: Vec<f64> = (0..point_count)
                .map(|j| {
                    let weighted: f64 = layers
                        .iter()
                        .enumerate()
                        .map(|(i, layer)| (n - i as f64) * at(layer, j))
                        .sum();
                    -weighted / (n + 1.0)
                })
                .collect();
            let min = g0.iter().copied().fold(f64::INFINITY, f64::min);
            g0.iter().map(|g| g - min).collect()
        }
    };

    let max = sums
        .iter()
        .zip(&y0)
        .map(|(sum, base)| sum + base)
        .fold(0.0, f64::max);
    Baseline { y0, max }
}

/// Lays out `layers` over `times` inside `rect`.
///
/// `boundary_gap` keeps space above and below the streams (resolved
/// against the rect height). Point `x` comes from `time_axis`.
pub fn layout_theme_river(
    layers: &[ThemeRiverLayer],
    times: &[f64],
    time_axis: &Axis,
    rect: Rect,
    boundary_gap: &[Length; 2],
    baseline: ThemeRiverBaseline,
) -> ChartResult<Vec<Vec<ThemeRiverPoint>>> {
    let rect = rect.validate()?;
    for layer in layers {
        if layer.values.len() != times.len() {
            return Err(ChartError::InvalidData(format!(
                "layer `{}` has {} values for {} timestamps",
                layer.name,
                layer.values.len(),
                times.len()
            )));
        }
    }
    if layers.is_empty() || times.is_empty() {
        return Ok(Vec::new());
    }

    let gap_top = boundary_gap[0].resolve(rect.height);
    let gap_bottom = boundary_gap[1].resolve(rect.height);
    if !gap_top.is_finite() || !gap_bottom.is_finite() {
        return Err(ChartError::InvalidConfig(
            "theme river boundary gap must resolve to finite lengths".to_owned(),
        ));
    }
    let height = rect.height - gap_top - gap_bottom;

    let values: Vec<Vec<f64>> = layers.iter().map(|layer| layer.values.clone()).collect();
    let base = compute_baseline(&values, baseline);
    let ky = if base.max > 0.0 { height / base.max } else { 0.0 };
    let xs: Vec<f64> = times
        .iter()
        .map(|time| time_axis.data_to_coord(*time, false))
        .collect();

    let top = rect.y + gap_top;
    let mut points: Vec<Vec<ThemeRiverPoint>> = vec![Vec::with_capacity(times.len()); layers.len()];
    for j in 0..times.len() {
        let mut y0 = base.y0[j] * ky;
        for (i, layer) in values.iter().enumerate() {
            if i > 0 {
                y0 += at(&values[i - 1], j) * ky;
            }
            points[i].push(ThemeRiverPoint {
                layer_index: i,
                x: xs[j],
                y0: top + y0,
                y: at(layer, j) * ky,
            });
        }
    }

    debug!(
        layers = layers.len(),
        points = times.len(),
        max = base.max,
        "theme river layout"
    );
    Ok(points)
}
