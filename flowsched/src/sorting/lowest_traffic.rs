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

use super::{flow_traffic, FlowSorter};
use crate::graph::{FlowId, MultiLayeredGraph};
use std::cmp::Ordering;

/// Schedule the least bandwidth hungry flows first.
pub struct LowestTrafficFirst<'a> {
    graph: &'a MultiLayeredGraph,
}

impl<'a> LowestTrafficFirst<'a> {
    /// Create the ordering for the given graph.
    pub fn new(graph: &'a MultiLayeredGraph) -> Self {
        Self { graph }
    }
}

impl FlowSorter for LowestTrafficFirst<'_> {
    fn compare(&self, lhs: FlowId, rhs: FlowId) -> Ordering {
        let lhs_traffic = flow_traffic(self.graph, lhs);
        let rhs_traffic = flow_traffic(self.graph, rhs);
        lhs_traffic
            .total_cmp(&rhs_traffic)
            .then_with(|| lhs.cmp(&rhs))
    }

    fn name(&self) -> &'static str {
        "Low-Traffic-Flows-First"
    }
}
