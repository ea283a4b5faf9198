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

//! Ordering behavior of the flow sorters.

use super::helpers::line_topology;
use crate::graph::{Flow, FlowId, MultiLayeredGraph, NetworkNodeId};
use crate::sorting::{flow_sorter, FlowSorterKind};

fn add_flow(
    graph: &mut MultiLayeredGraph,
    id: usize,
    frame_size: usize,
    period: usize,
    source: usize,
    destination: usize,
) {
    graph.add_flow(Flow {
        id: FlowId(id),
        frame_size,
        period,
        source: NetworkNodeId(source),
        destination: NetworkNodeId(destination),
        configs: Vec::new(),
    });
}

/// Flows with distinct traffic profiles on the line topology.
fn sample_graph() -> MultiLayeredGraph {
    let mut graph = line_topology();
    // id, frame, period: traffic 0: 5.0, 1: 0.625, 2: 2.5, 3: 0.625
    add_flow(&mut graph, 0, 1000, 200, 0, 3);
    add_flow(&mut graph, 1, 125, 200, 0, 3);
    add_flow(&mut graph, 2, 250, 100, 1, 3);
    add_flow(&mut graph, 3, 625, 1000, 2, 3);
    graph
}

fn sorted_by(kind: FlowSorterKind, graph: &MultiLayeredGraph) -> Vec<usize> {
    let mut flows: Vec<FlowId> = (0..graph.num_flows()).map(FlowId).collect();
    flow_sorter(kind, graph).sort(&mut flows);
    flows.into_iter().map(|flow| flow.0).collect()
}

#[test]
fn highest_traffic_first() {
    let graph = sample_graph();
    assert_eq!(sorted_by(FlowSorterKind::HighestTrafficFirst, &graph), vec![0, 2, 1, 3]);
}

#[test]
fn lowest_traffic_first() {
    let graph = sample_graph();
    assert_eq!(sorted_by(FlowSorterKind::LowestTrafficFirst, &graph), vec![1, 3, 2, 0]);
}

#[test]
fn lowest_id_first() {
    let graph = sample_graph();
    assert_eq!(sorted_by(FlowSorterKind::LowestIdFirst, &graph), vec![0, 1, 2, 3]);
}

#[test]
fn low_period_first() {
    let graph = sample_graph();
    // period 100 first; among period 200 the larger frame wins
    assert_eq!(sorted_by(FlowSorterKind::LowPeriodFirst, &graph), vec![2, 0, 1, 3]);
}

#[test]
fn source_node_sorting_prefers_rare_sources() {
    let graph = sample_graph();
    // sources: node0 twice, node1 once, node2 once
    let order = sorted_by(FlowSorterKind::SourceNodeSorting, &graph);
    assert_eq!(order, vec![2, 3, 0, 1]);
}

#[test]
fn selector_round_trip() {
    for kind in [
        FlowSorterKind::HighestTrafficFirst,
        FlowSorterKind::LowestTrafficFirst,
        FlowSorterKind::LowestIdFirst,
        FlowSorterKind::SourceNodeSorting,
        FlowSorterKind::LowPeriodFirst,
    ] {
        assert_eq!(FlowSorterKind::from_index(kind.index()), kind);
    }
    assert_eq!(FlowSorterKind::from_index(77), FlowSorterKind::LowestIdFirst);
}
