use serde::{Deserialize, Serialize};

use crate::core::number::{linear_map, round_default};
use crate::core::scale::{Scale, ScaleKind};
use crate::core::types::Extent;
use crate::error::{ChartError, ChartResult};

const NORMALIZED_EXTENT: Extent = [0.0, 1.0];
const DEFAULT_MINOR_SPLIT_NUMBER: usize = 5;

/// Tick position in pixel space. Synthetic band-edge ticks carry no value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TickCoord {
    pub coord: f64,
    pub tick_value: Option<f64>,
}

/// Tick label with its data value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisLabel {
    pub tick_value: f64,
    pub coord: f64,
    pub text: String,
}

/// A scale bound to a pixel extent.
///
/// `inverse` flips the pixel extent when it is set. `on_band` places
/// category ticks at band centers instead of band boundaries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Axis {
    scale: Scale,
    extent: Extent,
    #[serde(default)]
    inverse: bool,
    #[serde(default)]
    on_band: bool,
}

impl Axis {
    #[must_use]
    pub fn new(scale: impl Into<Scale>, start: f64, end: f64) -> Self {
        let scale = scale.into();
        let on_band = scale.kind() == ScaleKind::Ordinal;
        Self {
            scale,
            extent: [start, end],
            inverse: false,
            on_band,
        }
    }

    #[must_use]
    pub fn with_inverse(mut self, inverse: bool) -> Self {
        if inverse != self.inverse {
            self.extent.reverse();
        }
        self.inverse = inverse;
        self
    }

    #[must_use]
    pub fn with_on_band(mut self, on_band: bool) -> Self {
        self.on_band = on_band;
        self
    }

    #[must_use]
    pub fn scale(&self) -> &Scale {
        &self.scale
    }

    pub fn scale_mut(&mut self) -> &mut Scale {
        &mut self.scale
    }

    /// Pixel extent after applying `inverse`.
    #[must_use]
    pub fn extent(&self) -> Extent {
        self.extent
    }

    /// Rejects non-finite pixel extents.
    pub fn validate(&self) -> ChartResult<()> {
        let [start, end] = self.extent;
        if !start.is_finite() || !end.is_finite() {
            return Err(ChartError::InvalidExtent { start, end });
        }
        Ok(())
    }

    pub fn set_extent(&mut self, start: f64, end: f64) {
        self.extent = if self.inverse {
            [end, start]
        } else {
            [start, end]
        };
    }

    #[must_use]
    pub fn inverse(&self) -> bool {
        self.inverse
    }

    #[must_use]
    pub fn on_band(&self) -> bool {
        self.on_band
    }

    /// Whether a pixel coordinate lies within the axis.
    #[must_use]
    pub fn contain(&self, coord: f64) -> bool {
        let min = self.extent[0].min(self.extent[1]);
        let max = self.extent[0].max(self.extent[1]);
        coord >= min && coord <= max
    }

    #[must_use]
    pub fn contain_data(&self, value: f64) -> bool {
        self.scale.contain(value)
    }

    fn band_fixed_extent(&self) -> Extent {
        let mut extent = self.extent;
        if self.on_band {
            if let Scale::Ordinal(ordinal) = &self.scale {
                fix_extent_with_bands(&mut extent, ordinal.count());
            }
        }
        extent
    }

    #[must_use]
    pub fn data_to_coord(&self, value: f64, clamp: bool) -> f64 {
        let normalized = self.scale.normalize(value);
        linear_map(normalized, NORMALIZED_EXTENT, self.band_fixed_extent(), clamp)
    }

    #[must_use]
    pub fn coord_to_data(&self, coord: f64, clamp: bool) -> f64 {
        let t = linear_map(coord, self.band_fixed_extent(), NORMALIZED_EXTENT, clamp);
        self.scale.scale(t)
    }

    /// Pixel size of one category band (or one data unit on numeric axes).
    #[must_use]
    pub fn band_width(&self) -> f64 {
        let data_extent = self.scale.extent();
        let mut len = data_extent[1] - data_extent[0] + if self.on_band { 1.0 } else { 0.0 };
        if len == 0.0 {
            len = 1.0;
        }
        (self.extent[1] - self.extent[0]).abs() / len
    }

    /// Pixel length of the axis.
    #[must_use]
    pub fn span(&self) -> f64 {
        (self.extent[1] - self.extent[0]).abs()
    }

    fn tick_data_value(&self, tick: f64) -> f64 {
        match &self.scale {
            Scale::Ordinal(ordinal) => ordinal.raw_ordinal_number(tick),
            _ => tick,
        }
    }

    /// Tick coordinates, shifted to band boundaries for `on_band` axes.
    ///
    /// Unless `align_with_label` is set, band axes get one extra boundary
    /// tick; ticks outside the pixel extent are dropped, or pinned to it when
    /// `clamp` is set.
    #[must_use]
    pub fn ticks_coords(&self, align_with_label: bool, clamp: bool) -> Vec<TickCoord> {
        let mut coords: Vec<TickCoord> = self
            .scale
            .ticks()
            .into_iter()
            .map(|tick| TickCoord {
                coord: self.data_to_coord(self.tick_data_value(tick), false),
                tick_value: Some(tick),
            })
            .collect();

        self.fix_on_band_ticks_coords(&mut coords, align_with_label, clamp);
        coords
    }

    fn fix_on_band_ticks_coords(&self, coords: &mut Vec<TickCoord>, align_with_label: bool, clamp: bool) {
        let ticks_len = coords.len();
        if !self.on_band || align_with_label || ticks_len == 0 {
            return;
        }

        let axis_extent = self.extent;
        if ticks_len == 1 {
            coords[0].coord = axis_extent[0];
            coords.push(TickCoord {
                coord: axis_extent[1],
                tick_value: None,
            });
        } else {
            let first_value = coords[0].tick_value.unwrap_or(0.0);
            let last_value = coords[ticks_len - 1].tick_value.unwrap_or(0.0);
            let cross_len = last_value - first_value;
            let shift = (coords[ticks_len - 1].coord - coords[0].coord) / cross_len;
            for tick in coords.iter_mut() {
                tick.coord -= shift / 2.0;
            }

            let data_extent = self.scale.extent();
            let diff_size = 1.0 + data_extent[1] - last_value;
            let last_coord = coords[ticks_len - 1].coord + shift * diff_size;
            coords.push(TickCoord {
                coord: last_coord,
                tick_value: None,
            });
        }

        let inverse = axis_extent[0] > axis_extent[1];
        let little_than = |a: f64, b: f64| {
            let (a, b) = (round_default(a), round_default(b));
            if inverse { a > b } else { a < b }
        };

        if little_than(coords[0].coord, axis_extent[0]) {
            if clamp {
                coords[0].coord = axis_extent[0];
            } else {
                coords.remove(0);
            }
        }
        if clamp && coords.first().is_some_and(|first| little_than(axis_extent[0], first.coord)) {
            coords.insert(
                0,
                TickCoord {
                    coord: axis_extent[0],
                    tick_value: None,
                },
            );
        }

        let Some(last) = coords.last().copied() else {
            return;
        };
        if little_than(axis_extent[1], last.coord) {
            if clamp {
                if let Some(last) = coords.last_mut() {
                    last.coord = axis_extent[1];
                }
            } else {
                coords.pop();
            }
        }
        if clamp && little_than(last.coord, axis_extent[1]) {
            coords.push(TickCoord {
                coord: axis_extent[1],
                tick_value: None,
            });
        }
    }

    /// Minor tick coordinates; empty for category axes.
    #[must_use]
    pub fn minor_ticks_coords(&self, split_number: usize) -> Vec<Vec<TickCoord>> {
        if self.scale.kind() == ScaleKind::Ordinal {
            return Vec::new();
        }
        let split_number = if split_number > 0 && split_number < 100 {
            split_number
        } else {
            DEFAULT_MINOR_SPLIT_NUMBER
        };

        self.scale
            .minor_ticks(split_number)
            .into_iter()
            .map(|group| {
                group
                    .into_iter()
                    .map(|tick| TickCoord {
                        coord: self.data_to_coord(tick, false),
                        tick_value: Some(tick),
                    })
                    .collect()
            })
            .collect()
    }

    /// Labels for every tick, at the tick's (unshifted) coordinate.
    #[must_use]
    pub fn labels(&self) -> Vec<AxisLabel> {
        self.scale
            .ticks()
            .into_iter()
            .map(|tick| AxisLabel {
                tick_value: tick,
                coord: self.data_to_coord(self.tick_data_value(tick), false),
                text: self.scale.label(tick),
            })
            .collect()
    }
}

/// Shrinks `extent` by half a band at each end so ticks sit at band centers.
pub fn fix_extent_with_bands(extent: &mut Extent, tick_count: usize) {
    let size = extent[1] - extent[0];
    let margin = size / tick_count.max(1) as f64 / 2.0;
    extent[0] += margin;
    extent[1] -= margin;
}
