// Flowsched: Time-Triggered Flow Scheduling for TSN Networks
// Copyright (C) 2022  The Flowsched Authors
//
// This program is free software; you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation; either version 2 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along
// with this program; if not, write to the Free Software Foundation, Inc.,
// 51 Franklin Street, Fifth Floor, Boston, MA 02110-1301 USA.

//! Rating pairs for the lazy-greedy CELF scheduler.
//!
//! A CELF rating is a pair `(primary, tie_breaker)` compared
//! lexicographically; larger pairs are scheduled first. The three-method
//! lifecycle is `prepare` (refresh before re-rating), `rate`, and `pick`
//! (notify the rater that a configuration was committed, so stateful raters
//! can update their bookkeeping).

mod low_id;
pub use low_id::LowIdRating;

mod low_period_short_paths;
pub use low_period_short_paths::LowPeriodShortPaths;

mod low_period_long_paths;
pub use low_period_long_paths::LowPeriodLongPaths;

mod low_period_configs_first;
pub use low_period_configs_first::LowPeriodConfigsFirst;

mod low_period_low_utilization;
pub use low_period_low_utilization::LowPeriodLowUtilization;

mod end_to_end_delay;
pub use end_to_end_delay::EndToEndDelayCelfRating;

use crate::graph::{ConfigId, MultiLayeredGraph};
use crate::utilization::NetworkUtilization;

/// Offset that dominates the rating sum, so that the period outweighs every
/// secondary term.
pub(crate) const LARGE_CONSTANT: f32 = 10_000_000.0;

/// Scoring strategy for the CELF scheduler; larger pairs are better.
pub trait CelfRater {
    /// Refresh internal state before re-rating a configuration.
    fn prepare(&mut self, _util: &NetworkUtilization) {}

    /// Rate the given configuration against the current utilization.
    fn rate(&mut self, util: &NetworkUtilization, config: ConfigId) -> (f32, f32);

    /// Notify the rater that the given configuration was committed.
    fn pick(&mut self, _config: ConfigId) {}

    /// Human readable name of the rating.
    fn name(&self) -> &'static str;
}

/// Selects one of the available CELF ratings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CelfRaterKind {
    /// Prefer low flow ids.
    LowId,
    /// Prefer short periods, large frames and short paths.
    LowPeriodShortPaths,
    /// Prefer short periods and a large deadline slack.
    EndToEndDelay,
    /// Prefer short periods on lightly loaded paths.
    LowPeriodLowUtilization,
    /// Prefer short periods and large frames.
    LowPeriodConfigsFirst,
    /// Prefer short periods and long paths (the greedy ordering from the
    /// TSN scheduling literature; meant to run with one candidate path).
    LowPeriodLongPaths,
}

impl CelfRaterKind {
    /// Map a numeric CLI selector to a rating kind. Unknown selectors fall
    /// back to [`CelfRaterKind::LowId`].
    pub fn from_index(index: usize) -> Self {
        match index {
            0 => Self::LowId,
            1 => Self::LowPeriodShortPaths,
            2 => Self::EndToEndDelay,
            3 => Self::LowPeriodLowUtilization,
            4 => Self::LowPeriodConfigsFirst,
            5 => Self::LowPeriodLongPaths,
            _ => {
                log::warn!("unknown CELF rating selector {}, falling back to LowId", index);
                Self::LowId
            }
        }
    }

    /// The numeric CLI selector of this rating kind.
    pub fn index(self) -> usize {
        match self {
            Self::LowId => 0,
            Self::LowPeriodShortPaths => 1,
            Self::EndToEndDelay => 2,
            Self::LowPeriodLowUtilization => 3,
            Self::LowPeriodConfigsFirst => 4,
            Self::LowPeriodLongPaths => 5,
        }
    }
}

/// Instantiate the CELF rating selected by `kind`.
///
/// The utilization is only used to capture the initial link load of the
/// stateful ratings; every later evaluation receives the current utilization
/// through [`CelfRater::rate`].
pub fn celf_rater<'a>(
    kind: CelfRaterKind,
    graph: &'a MultiLayeredGraph,
    util: &NetworkUtilization,
) -> Box<dyn CelfRater + 'a> {
    match kind {
        CelfRaterKind::LowId => Box::new(LowIdRating::new(graph)),
        CelfRaterKind::LowPeriodShortPaths => Box::new(LowPeriodShortPaths::new(graph)),
        CelfRaterKind::EndToEndDelay => Box::new(EndToEndDelayCelfRating::new(graph)),
        CelfRaterKind::LowPeriodLowUtilization => {
            Box::new(LowPeriodLowUtilization::new(graph, util))
        }
        CelfRaterKind::LowPeriodConfigsFirst => Box::new(LowPeriodConfigsFirst::new(graph)),
        CelfRaterKind::LowPeriodLongPaths => Box::new(LowPeriodLongPaths::new(graph)),
    }
}
