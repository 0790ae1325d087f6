//! chart-layout: numeric core of a charting engine.
//!
//! Scales and axes map data into pixel space, layout passes turn series
//! values into bar, sector, box and stream geometry, and visual mapping
//! turns values into colors, sizes and symbols. Everything here is pure:
//! inputs are plain values and config structs, outputs are serializable
//! geometry.

pub mod core;
pub mod error;
pub mod layout;
pub mod telemetry;
pub mod visual;

pub use crate::core::{Axis, Scale, ScaleKind};
pub use crate::layout::{BarRect, SectorLayout};
pub use crate::visual::{Color, VisualMapping, VisualMappingOptions};
pub use error::{ChartError, ChartResult};
