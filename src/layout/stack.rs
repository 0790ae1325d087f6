//! Value stacking for series sharing a stack group.
//!
//! Stacking is keyed by base value, not by array index, so series with
//! different orderings or gaps still stack onto the matching item.

use indexmap::IndexMap;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::number::get_percent_seats;
use crate::error::{ChartError, ChartResult};

/// Parallel base/value columns of one stacked series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StackInput {
    pub base_values: Vec<f64>,
    pub values: Vec<f64>,
}

impl StackInput {
    #[must_use]
    pub fn new(base_values: Vec<f64>, values: Vec<f64>) -> Self {
        Self {
            base_values,
            values,
        }
    }

    /// Series indexed by position: base values are `0..n`.
    #[must_use]
    pub fn by_index(values: Vec<f64>) -> Self {
        let base_values = (0..values.len()).map(|idx| idx as f64).collect();
        Self::new(base_values, values)
    }

    fn validate(&self) -> ChartResult<()> {
        if self.base_values.len() != self.values.len() {
            return Err(ChartError::InvalidData(format!(
                "stack input has {} base values for {} values",
                self.base_values.len(),
                self.values.len()
            )));
        }
        Ok(())
    }
}

/// `stack_result[i]` is the top of the stack after item `i`;
/// `stacked_over[i]` is the baseline it sits on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StackedSeries {
    pub stack_result: Vec<f64>,
    pub stacked_over: Vec<f64>,
}

#[derive(Debug, Default, Clone, Copy)]
struct SignedSums {
    positive: f64,
    negative: f64,
}

/// Stacks each series onto the earlier ones. Positive and negative values
/// accumulate separately; NaN items stay NaN and do not move the baseline.
pub fn stack_values(series: &[StackInput]) -> ChartResult<Vec<StackedSeries>> {
    for item in series {
        item.validate()?;
    }

    let mut sums: IndexMap<OrderedFloat<f64>, SignedSums> = IndexMap::new();
    let stacked: Vec<StackedSeries> = series
        .iter()
        .map(|item| {
            let mut stack_result = Vec::with_capacity(item.values.len());
            let mut stacked_over = Vec::with_capacity(item.values.len());
            for (&base_value, &value) in item.base_values.iter().zip(&item.values) {
                if value.is_nan() {
                    stack_result.push(f64::NAN);
                    stacked_over.push(f64::NAN);
                    continue;
                }
                let entry = sums.entry(OrderedFloat(base_value)).or_default();
                let slot = if value >= 0.0 {
                    &mut entry.positive
                } else {
                    &mut entry.negative
                };
                stacked_over.push(*slot);
                *slot += value;
                stack_result.push(*slot);
            }
            StackedSeries {
                stack_result,
                stacked_over,
            }
        })
        .collect();

    debug!(series = stacked.len(), keys = sums.len(), "stacked values");
    Ok(stacked)
}

/// Percent stacks: every base value's items are apportioned to 100 with
/// [`get_percent_seats`] over absolute values, keeping each value's sign,
/// then stacked.
pub fn stack_percent(series: &[StackInput], precision: i32) -> ChartResult<Vec<StackedSeries>> {
    for item in series {
        item.validate()?;
    }

    // base value -> (series index, item index)
    let mut members: IndexMap<OrderedFloat<f64>, Vec<(usize, usize)>> = IndexMap::new();
    for (series_idx, item) in series.iter().enumerate() {
        for (item_idx, &base_value) in item.base_values.iter().enumerate() {
            members
                .entry(OrderedFloat(base_value))
                .or_default()
                .push((series_idx, item_idx));
        }
    }

    let mut percents: Vec<StackInput> = series.to_vec();
    for positions in members.values() {
        let magnitudes: Vec<f64> = positions
            .iter()
            .map(|&(series_idx, item_idx)| series[series_idx].values[item_idx].abs())
            .collect();
        let seats = get_percent_seats(&magnitudes, precision);
        for (slot, &(series_idx, item_idx)) in positions.iter().enumerate() {
            let value = series[series_idx].values[item_idx];
            if value.is_nan() {
                continue;
            }
            let seat = seats.get(slot).copied().unwrap_or(0.0);
            percents[series_idx].values[item_idx] = if value < 0.0 { -seat } else { seat };
        }
    }

    stack_values(&percents)
}
