use serde::{Deserialize, Serialize};

use crate::core::scale::{assign_extent, contain_in, normalize_in, scale_in};
use crate::core::smart_log_steps::{LogSteps, SmartLogStepsOptions, smart_log_steps};
use crate::core::types::Extent;

/// Logarithmic scale backed by [`smart_log_steps`].
///
/// `normalize` and `contain` work on log-space coordinates, so both positive
/// and all-negative domains are supported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogScale {
    extent: Extent,
    options: SmartLogStepsOptions,
    steps: LogSteps,
}

impl LogScale {
    #[must_use]
    pub fn new(start: f64, end: f64) -> Self {
        Self::with_options(SmartLogStepsOptions::new(start, end))
    }

    #[must_use]
    pub fn with_options(options: SmartLogStepsOptions) -> Self {
        let steps = smart_log_steps(&options);
        Self {
            extent: [options.data_min, options.data_max],
            options,
            steps,
        }
    }

    #[must_use]
    pub fn extent(&self) -> Extent {
        self.extent
    }

    pub fn set_extent(&mut self, start: f64, end: f64) {
        assign_extent(&mut self.extent, start, end);
        self.options.data_min = self.extent[0];
        self.options.data_max = self.extent[1];
        self.steps = smart_log_steps(&self.options);
    }

    #[must_use]
    pub fn steps(&self) -> &LogSteps {
        &self.steps
    }

    #[must_use]
    pub fn contain(&self, value: f64) -> bool {
        contain_in(self.steps.value_to_log(value), self.steps.log_extent())
    }

    #[must_use]
    pub fn normalize(&self, value: f64) -> f64 {
        normalize_in(self.steps.value_to_log(value), self.steps.log_extent())
    }

    #[must_use]
    pub fn scale(&self, t: f64) -> f64 {
        self.steps
            .log_to_value(scale_in(t, self.steps.log_extent()))
    }

    #[must_use]
    pub fn ticks(&self) -> Vec<f64> {
        self.steps.ticks.clone()
    }

    #[must_use]
    pub fn label(&self, value: f64) -> String {
        self.steps.format_label(value)
    }

    /// Snaps the raw extent to the first and last tick without re-stepping.
    pub fn nice_extent(&mut self) {
        if let (Some(first), Some(last)) = (self.steps.ticks.first(), self.steps.ticks.last()) {
            self.extent = [*first, *last];
        }
    }
}
