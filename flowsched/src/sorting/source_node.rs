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

/// Schedule flows from lightly loaded source nodes first.
///
/// Sort key: number of flows sharing the source node, then the smaller
/// destination id, then the higher bandwidth, then the smaller flow id.
/// The per-source flow counts are captured when the sorter is created.
pub struct SourceNodeSorting<'a> {
    graph: &'a MultiLayeredGraph,
    flows_per_source: Vec<usize>,
}

impl<'a> SourceNodeSorting<'a> {
    /// Create the ordering, counting the flows per source node once.
    pub fn new(graph: &'a MultiLayeredGraph) -> Self {
        let mut flows_per_source = vec![0; graph.num_nodes()];
        for flow in graph.flows().values() {
            flows_per_source[flow.source.0] += 1;
        }
        Self { graph, flows_per_source }
    }
}

impl FlowSorter for SourceNodeSorting<'_> {
    fn compare(&self, lhs: FlowId, rhs: FlowId) -> Ordering {
        let lhs_flow = self.graph.flow(lhs);
        let rhs_flow = self.graph.flow(rhs);

        let by_source = self.flows_per_source[lhs_flow.source.0]
            .cmp(&self.flows_per_source[rhs_flow.source.0]);
        let by_destination = lhs_flow.destination.cmp(&rhs_flow.destination);
        let by_traffic = flow_traffic(self.graph, rhs).total_cmp(&flow_traffic(self.graph, lhs));

        by_source
            .then(by_destination)
            .then(by_traffic)
            .then_with(|| lhs.cmp(&rhs))
    }

    fn name(&self) -> &'static str {
        "Source-Node-Sorting"
    }
}
