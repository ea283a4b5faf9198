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

//! Scalar configuration ratings for the hierarchical heuristic scheduler.
//! The scheduler tries configurations in ascending rating order, so smaller
//! means better.

mod path_length;
pub use path_length::PathLengthRating;

mod balanced_utilization;
pub use balanced_utilization::BalancedNetworkUtilizationRating;

mod end_to_end_delay;
pub use end_to_end_delay::EndToEndDelayRating;

mod bottleneck;
pub use bottleneck::BottleneckRating;

use crate::graph::{ConfigId, MultiLayeredGraph};
use crate::utilization::NetworkUtilization;

/// Scoring strategy for candidate configurations; smaller is better.
pub trait ConfigRater {
    /// Refresh internal state before rating a batch of configurations.
    fn prepare(&mut self) {}

    /// Rate the given configuration.
    fn rate(&mut self, config: ConfigId) -> f32;

    /// Human readable name of the rating.
    fn name(&self) -> &'static str;
}

/// Selects one of the available configuration ratings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConfigRaterKind {
    /// Prefer configurations that keep the per-link load balanced.
    BalancedNetworkUtilization,
    /// Prefer shorter paths.
    PathLength,
    /// Prefer configurations with a small simulated queueing delay.
    EndToEndDelay,
    /// Prefer configurations whose tightest interior link has spare capacity.
    Bottleneck,
}

impl ConfigRaterKind {
    /// Map a numeric CLI selector to a rating kind. Unknown selectors fall
    /// back to [`ConfigRaterKind::PathLength`].
    pub fn from_index(index: usize) -> Self {
        match index {
            0 => Self::BalancedNetworkUtilization,
            1 => Self::PathLength,
            2 => Self::EndToEndDelay,
            3 => Self::Bottleneck,
            _ => Self::PathLength,
        }
    }

    /// The numeric CLI selector of this rating kind.
    pub fn index(self) -> usize {
        match self {
            Self::BalancedNetworkUtilization => 0,
            Self::PathLength => 1,
            Self::EndToEndDelay => 2,
            Self::Bottleneck => 3,
        }
    }
}

/// Instantiate the configuration rating selected by `kind`.
pub fn config_rater<'a>(
    kind: ConfigRaterKind,
    graph: &'a MultiLayeredGraph,
    util: &'a NetworkUtilization,
) -> Box<dyn ConfigRater + 'a> {
    match kind {
        ConfigRaterKind::BalancedNetworkUtilization => {
            Box::new(BalancedNetworkUtilizationRating::new(graph, util))
        }
        ConfigRaterKind::PathLength => Box::new(PathLengthRating::new(graph)),
        ConfigRaterKind::EndToEndDelay => Box::new(EndToEndDelayRating::new(graph, util)),
        ConfigRaterKind::Bottleneck => Box::new(BottleneckRating::new(graph, util)),
    }
}
