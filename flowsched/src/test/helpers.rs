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

//! Shared topology builders and assertions for the test modules.

use crate::graph::{EgressQueueId, Flow, FlowId, MultiLayeredGraph, NetworkNodeId};
use crate::io::parse_network_from_str;
use crate::routing::{DijkstraOverlap, Navigator};
use crate::utilization::NetworkUtilization;

/// `0 - 1 - 2 - 3`; queues: 0>1=0, 1>0=1, 1>2=2, 2>1=3, 2>3=4, 3>2=5.
pub fn line_topology() -> MultiLayeredGraph {
    parse_network_from_str("0 1\n1 2\n2 3\n")
}

/// `0 - 1 - 2`; queues: 0>1=0, 1>0=1, 1>2=2, 2>1=3.
pub fn chain_topology() -> MultiLayeredGraph {
    parse_network_from_str("0 1\n1 2\n")
}

/// Two devices `0 - 1`; queues: 0>1=0, 1>0=1.
pub fn two_node_topology() -> MultiLayeredGraph {
    parse_network_from_str("0 1\n")
}

/// End devices 0..3 around the center node 4; queues: i>4=i for the end
/// devices, 4>i=4+i for the center.
pub fn star_topology() -> MultiLayeredGraph {
    parse_network_from_str("0 4\n1 4\n2 4\n3 4\n")
}

/// Insert `count` equal flows from `source` to `destination`, each with one
/// shortest-path configuration. Flow ids continue after the current count.
pub fn insert_traffic(
    graph: &mut MultiLayeredGraph,
    count: usize,
    source: usize,
    destination: usize,
    period: usize,
    frame_size: usize,
) -> Vec<FlowId> {
    let navigator = DijkstraOverlap::new();
    let source = NetworkNodeId(source);
    let destination = NetworkNodeId(destination);

    let first_id = graph.num_flows();
    let mut inserted = Vec::with_capacity(count);
    for id in first_id..first_id + count {
        let flow_id = FlowId(id);
        let route = navigator
            .find_routes(source, destination, graph, 1)
            .into_iter()
            .next()
            .expect("the test topologies are connected");

        graph.add_flow(Flow {
            id: flow_id,
            frame_size,
            period,
            source,
            destination,
            configs: Vec::new(),
        });
        graph.insert_configuration(flow_id, route);
        inserted.push(flow_id);
    }
    inserted
}

/// Insert one flow with an explicitly chosen path.
pub fn insert_flow_with_path(
    graph: &mut MultiLayeredGraph,
    id: usize,
    source: usize,
    destination: usize,
    period: usize,
    frame_size: usize,
    path: Vec<EgressQueueId>,
) -> FlowId {
    let flow_id = FlowId(id);
    graph.add_flow(Flow {
        id: flow_id,
        frame_size,
        period,
        source: NetworkNodeId(source),
        destination: NetworkNodeId(destination),
        configs: Vec::new(),
    });
    graph.insert_configuration(flow_id, path);
    flow_id
}

/// Assert that no two reserved slots of any queue overlap.
pub fn check_reservation_overlaps(util: &NetworkUtilization) {
    for (queue, slots) in util.reserved_slots().iter().enumerate() {
        for (i, first) in slots.iter().enumerate() {
            for second in slots.iter().skip(i + 1) {
                assert_ne!(first.start, second.start, "overlap on queue {}", queue);
                assert_ne!(first.next_start, second.next_start, "overlap on queue {}", queue);
                if first.start < second.start {
                    assert!(first.next_start <= second.start, "overlap on queue {}", queue);
                } else {
                    assert!(second.next_start <= first.start, "overlap on queue {}", queue);
                }
            }
        }
    }
}
