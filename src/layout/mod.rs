//! Layout passes turning series values into pixel geometry.

pub mod bar_grid;
pub mod bar_polar;
pub mod boxplot;
pub mod pie;
pub mod pie_label;
pub mod stack;
pub mod sunburst;
pub mod theme_river;

use serde::{Deserialize, Serialize};

pub use bar_grid::{
    BarOptions, BarOrientation, BarSeries, BarSeriesLayout, BarSeriesLayoutInput,
    BarWidthAndOffset, ColumnLayout, LargeBarBuffers, calc_bar_width_and_offset,
    layout_bar_grid, layout_large_bars, layout_on_axis,
};
pub use bar_polar::{PolarBaseAxis, PolarCoord, layout_bar_polar};
pub use boxplot::{
    BoxplotData, BoxplotLayout, BoxplotOptions, BoxplotOrientation, BoxplotSeries,
    layout_boxplot, prepare_boxplot_data,
};
pub use pie::{PieOptions, PieSlice, RoseType, layout_pie, layout_pie_radians};
pub use pie_label::{LabelSide, PieLabelInput, PieLabelLayout, PieLabelOptions, layout_pie_labels};
pub use stack::{StackInput, StackedSeries, stack_percent, stack_values};
pub use sunburst::{
    SunburstLevel, SunburstNode, SunburstOptions, SunburstSector, SunburstSort, layout_sunburst,
};
pub use theme_river::{
    ThemeRiverBaseline, ThemeRiverLayer, ThemeRiverPoint, compute_baseline, layout_theme_river,
};

/// Axis-aligned bar rectangle. `width`/`height` are signed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BarRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Annular sector. Angles are radians, positive clockwise in screen space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SectorLayout {
    pub cx: f64,
    pub cy: f64,
    pub r0: f64,
    pub r: f64,
    pub start_angle: f64,
    pub end_angle: f64,
    pub clockwise: bool,
}
