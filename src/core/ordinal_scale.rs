use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::core::scale::{assign_extent, contain_in, normalize_in, scale_in};
use crate::core::types::Extent;

/// Category scale over integer ranks `[0, N - 1]`.
///
/// Categories keep first-seen order and are deduplicated, so a category's
/// rank (its raw ordinal number) is stable. Optional sort info reorders the
/// display position (tick number) of each rank without changing ranks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrdinalScale {
    categories: IndexSet<String>,
    extent: Extent,
    #[serde(default)]
    ordinal_numbers_by_tick: Option<Vec<usize>>,
    #[serde(default)]
    ticks_by_ordinal_number: Option<Vec<usize>>,
}

impl Default for OrdinalScale {
    fn default() -> Self {
        Self::new(Vec::<String>::new())
    }
}

impl OrdinalScale {
    #[must_use]
    pub fn new<I, S>(categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let categories: IndexSet<String> = categories.into_iter().map(Into::into).collect();
        let extent = [0.0, categories.len() as f64 - 1.0];
        Self {
            categories,
            extent,
            ordinal_numbers_by_tick: None,
            ticks_by_ordinal_number: None,
        }
    }

    #[must_use]
    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.categories.iter().map(String::as_str)
    }

    #[must_use]
    pub fn category(&self, ordinal: usize) -> Option<&str> {
        self.categories.get_index(ordinal).map(String::as_str)
    }

    /// Rank of `name`, if known.
    #[must_use]
    pub fn ordinal(&self, name: &str) -> Option<usize> {
        self.categories.get_index_of(name)
    }

    /// Rank of `name`, appending it as a new category when unknown.
    pub fn collect_ordinal(&mut self, name: &str) -> usize {
        let (ordinal, inserted) = self.categories.insert_full(name.to_owned());
        if inserted {
            self.extent[1] = self.categories.len() as f64 - 1.0;
        }
        ordinal
    }

    /// Rank of `name` as a scale value; unknown names give NaN.
    #[must_use]
    pub fn parse_category(&self, name: &str) -> f64 {
        match self.ordinal(name) {
            Some(ordinal) => ordinal as f64,
            None => {
                warn!(category = name, "unknown ordinal category");
                f64::NAN
            }
        }
    }

    #[must_use]
    pub fn extent(&self) -> Extent {
        self.extent
    }

    pub fn set_extent(&mut self, start: f64, end: f64) {
        assign_extent(&mut self.extent, start, end);
    }

    /// Number of ranks covered by the extent.
    #[must_use]
    pub fn count(&self) -> usize {
        let count = self.extent[1] - self.extent[0] + 1.0;
        if count.is_finite() && count > 0.0 {
            count as usize
        } else {
            0
        }
    }

    #[must_use]
    pub fn contain(&self, rank: f64) -> bool {
        let rank = rank.round();
        contain_in(rank, self.extent) && rank >= 0.0 && (rank as usize) < self.categories.len()
    }

    #[must_use]
    pub fn normalize(&self, rank: f64) -> f64 {
        normalize_in(self.tick_number(rank.round()), self.extent)
    }

    /// Raw ordinal number at normalized position `t`.
    #[must_use]
    pub fn scale(&self, t: f64) -> f64 {
        self.raw_ordinal_number(scale_in(t, self.extent).round())
    }

    #[must_use]
    pub fn ticks(&self) -> Vec<f64> {
        let mut ticks = Vec::with_capacity(self.count());
        let mut rank = self.extent[0];
        while rank <= self.extent[1] {
            ticks.push(rank);
            rank += 1.0;
        }
        ticks
    }

    /// Category name displayed at tick number `tick`.
    #[must_use]
    pub fn label(&self, tick: f64) -> String {
        let ordinal = self.raw_ordinal_number(tick.round());
        if ordinal >= 0.0 {
            self.category(ordinal as usize)
                .map(str::to_owned)
                .unwrap_or_default()
        } else {
            String::new()
        }
    }

    /// Installs a display order. `ordinal_numbers[tick]` is the rank shown at
    /// tick `tick`; ranks not listed follow in ascending order. `None` clears.
    pub fn set_sort_info(&mut self, ordinal_numbers: Option<&[usize]>) {
        let Some(ordinal_numbers) = ordinal_numbers else {
            self.ordinal_numbers_by_tick = None;
            self.ticks_by_ordinal_number = None;
            return;
        };

        let all_len = self.categories.len();
        let mut by_tick = Vec::with_capacity(all_len);
        let mut by_ordinal: Vec<Option<usize>> = vec![None; all_len];
        for ordinal in ordinal_numbers.iter().copied().take(all_len) {
            if ordinal < all_len && by_ordinal[ordinal].is_none() {
                by_ordinal[ordinal] = Some(by_tick.len());
                by_tick.push(ordinal);
            }
        }
        let mut unused = 0;
        while by_tick.len() < all_len {
            while unused < all_len && by_ordinal[unused].is_some() {
                unused += 1;
            }
            if unused >= all_len {
                break;
            }
            by_ordinal[unused] = Some(by_tick.len());
            by_tick.push(unused);
        }

        self.ticks_by_ordinal_number = Some(
            by_ordinal
                .into_iter()
                .enumerate()
                .map(|(ordinal, tick)| tick.unwrap_or(ordinal))
                .collect(),
        );
        self.ordinal_numbers_by_tick = Some(by_tick);
    }

    fn tick_number(&self, ordinal: f64) -> f64 {
        match &self.ticks_by_ordinal_number {
            Some(ticks) if ordinal >= 0.0 && (ordinal as usize) < ticks.len() => {
                ticks[ordinal as usize] as f64
            }
            _ => ordinal,
        }
    }

    /// Rank displayed at `tick`; identity without sort info.
    #[must_use]
    pub fn raw_ordinal_number(&self, tick: f64) -> f64 {
        match &self.ordinal_numbers_by_tick {
            Some(ordinals) if tick >= 0.0 && (tick as usize) < ordinals.len() => {
                ordinals[tick as usize] as f64
            }
            _ => tick,
        }
    }
}
