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

//! # Flow Sorting
//!
//! Pluggable orderings that decide in which sequence the heuristic
//! schedulers attempt to place flows. Every ordering is a strict total
//! order; `Ordering::Less` means "scheduled earlier". All orderings break
//! remaining ties on the smaller flow id, which keeps the schedulers
//! deterministic.

mod highest_traffic;
pub use highest_traffic::HighestTrafficFirst;

mod lowest_traffic;
pub use lowest_traffic::LowestTrafficFirst;

mod lowest_id;
pub use lowest_id::LowestIdFirst;

mod source_node;
pub use source_node::SourceNodeSorting;

mod low_period;
pub use low_period::LowPeriodFirst;

use crate::graph::{FlowId, MultiLayeredGraph};
use std::cmp::Ordering;

/// Ordering strategy for the flows handed to a scheduler.
pub trait FlowSorter {
    /// Compare two flows; `Less` means `lhs` is scheduled before `rhs`.
    fn compare(&self, lhs: FlowId, rhs: FlowId) -> Ordering;

    /// Human readable name of the ordering.
    fn name(&self) -> &'static str;

    /// Sort a flow list into scheduling order (first element first).
    fn sort(&self, flows: &mut [FlowId]) {
        flows.sort_by(|lhs, rhs| self.compare(*lhs, *rhs));
    }
}

/// Selects one of the available flow orderings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlowSorterKind {
    /// Flows with more traffic per microsecond first.
    HighestTrafficFirst,
    /// Flows with less traffic per microsecond first.
    LowestTrafficFirst,
    /// Plain ascending flow id.
    LowestIdFirst,
    /// Few flows per source node first, see [`SourceNodeSorting`].
    SourceNodeSorting,
    /// Short periods first, see [`LowPeriodFirst`].
    LowPeriodFirst,
}

impl FlowSorterKind {
    /// Map a numeric CLI selector to a sorter kind. Unknown selectors fall
    /// back to [`FlowSorterKind::LowestIdFirst`].
    pub fn from_index(index: usize) -> Self {
        match index {
            0 => Self::HighestTrafficFirst,
            1 => Self::LowestTrafficFirst,
            2 => Self::LowestIdFirst,
            3 => Self::SourceNodeSorting,
            4 => Self::LowPeriodFirst,
            _ => Self::LowestIdFirst,
        }
    }

    /// The numeric CLI selector of this sorter kind.
    pub fn index(self) -> usize {
        match self {
            Self::HighestTrafficFirst => 0,
            Self::LowestTrafficFirst => 1,
            Self::LowestIdFirst => 2,
            Self::SourceNodeSorting => 3,
            Self::LowPeriodFirst => 4,
        }
    }
}

/// Instantiate the flow sorter selected by `kind` for the given graph.
pub fn flow_sorter(kind: FlowSorterKind, graph: &MultiLayeredGraph) -> Box<dyn FlowSorter + '_> {
    match kind {
        FlowSorterKind::HighestTrafficFirst => Box::new(HighestTrafficFirst::new(graph)),
        FlowSorterKind::LowestTrafficFirst => Box::new(LowestTrafficFirst::new(graph)),
        FlowSorterKind::LowestIdFirst => Box::new(LowestIdFirst),
        FlowSorterKind::SourceNodeSorting => Box::new(SourceNodeSorting::new(graph)),
        FlowSorterKind::LowPeriodFirst => Box::new(LowPeriodFirst::new(graph)),
    }
}

/// Traffic of a flow in bytes per microsecond, the shared sort key of the
/// traffic based orderings.
pub(crate) fn flow_traffic(graph: &MultiLayeredGraph, flow: FlowId) -> f64 {
    let flow = graph.flow(flow);
    flow.frame_size as f64 / flow.period as f64
}
