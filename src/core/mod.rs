pub mod axis;
pub mod interval_scale;
pub mod log_scale;
pub mod number;
pub mod ordinal_scale;
pub mod scale;
pub mod smart_log_steps;
pub mod time_scale;
pub mod types;

pub use axis::{Axis, AxisLabel, TickCoord};
pub use interval_scale::{IntervalScale, LabelPrecision};
pub use log_scale::LogScale;
pub use ordinal_scale::OrdinalScale;
pub use scale::{NiceExtentOptions, Scale, ScaleKind};
pub use smart_log_steps::{LogSteps, SmartLogStepsOptions, smart_log_steps};
pub use time_scale::TimeScale;
pub use types::{Extent, IntervalItem, Length, Rect};
