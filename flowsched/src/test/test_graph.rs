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

//! Construction and relation maintenance of the multi-layered graph.

use super::helpers::{insert_traffic, line_topology};
use crate::graph::{EgressQueueId, Flow, FlowId, MultiLayeredGraph, NetworkNodeId};
use crate::io::parse_network_from_str;
use std::collections::HashSet;

#[test]
fn line_csr_layout() {
    let graph = line_topology();

    assert_eq!(graph.num_nodes(), 4);
    assert_eq!(graph.num_queues(), 6);
    assert_eq!(graph.num_flows(), 0);
    assert_eq!(graph.num_configs(), 0);

    let first = graph.egress_queues_of(NetworkNodeId(0));
    assert_eq!(first.len(), 1);
    assert_eq!(first[0].destination, NetworkNodeId(1));
    assert!(first[0].end_device);

    let middle = graph.egress_queues_of(NetworkNodeId(1));
    assert_eq!(middle.len(), 2);
    assert_eq!(middle[0].destination, NetworkNodeId(0));
    assert_eq!(middle[1].destination, NetworkNodeId(2));
    assert!(!middle[0].end_device);

    // queue ids equal their position in the dense array
    for (index, queue) in graph.egress_queues().iter().enumerate() {
        assert_eq!(queue.id, EgressQueueId(index));
    }
}

#[test]
fn parser_skips_comments_and_duplicates() {
    let graph = parse_network_from_str("# comment\n% comment\n0 1\n1 0\n0 1\n1 2\n");
    assert_eq!(graph.num_nodes(), 3);
    assert_eq!(graph.num_queues(), 4);
}

#[test]
fn parser_accepts_any_separator() {
    let with_spaces = parse_network_from_str("0 1\n1 2\n");
    let with_commas = parse_network_from_str("0,1\n1,2\n");
    let with_colons = parse_network_from_str("0:1\n1:2\n");

    for graph in [&with_spaces, &with_commas, &with_colons] {
        assert_eq!(graph.num_nodes(), 3);
        assert_eq!(graph.num_queues(), 4);
    }
}

#[test]
fn edge_set_round_trip() {
    let edges = [(0usize, 1usize), (1, 2), (2, 3), (1, 3)];
    let text: String = edges.iter().map(|(a, b)| format!("{} {}\n", a, b)).collect();
    let graph = parse_network_from_str(&text);

    // re-derive the undirected edge set from the egress queues
    let mut derived: HashSet<(usize, usize)> = HashSet::new();
    for node in 0..graph.num_nodes() {
        for queue in graph.egress_queues_of(NetworkNodeId(node)) {
            let (a, b) = (node, queue.destination.0);
            derived.insert((a.min(b), a.max(b)));
        }
    }
    let expected: HashSet<(usize, usize)> = edges.iter().copied().collect();
    assert_eq!(derived, expected);
}

#[test]
fn configuration_relations_are_bidirectional() {
    let mut graph = line_topology();
    let flow_id = insert_traffic(&mut graph, 1, 0, 3, 100, 125)[0];

    let flow = graph.flow(flow_id);
    assert_eq!(flow.configs.len(), 1);
    let config_id = flow.configs[0];

    let config = graph.configuration(config_id);
    assert_eq!(config.flow, flow_id);
    assert_eq!(config.path.len(), 3);
    for queue_id in &config.path {
        assert!(graph.egress_queue(*queue_id).used_by.contains(&config_id));
    }
}

#[test]
fn remove_flow_tears_down_all_relations() {
    let mut graph = line_topology();
    let flows = insert_traffic(&mut graph, 2, 0, 3, 100, 125);
    assert_eq!(graph.num_flows(), 2);
    assert_eq!(graph.num_configs(), 2);

    graph.remove_flow(flows[0]);
    assert_eq!(graph.num_flows(), 1);
    assert_eq!(graph.num_configs(), 1);
    let remaining = graph.flow(flows[1]).configs[0];
    for queue in graph.egress_queues() {
        for user in &queue.used_by {
            assert_eq!(*user, remaining);
        }
    }

    graph.remove_flow(flows[1]);
    assert_eq!(graph.num_flows(), 0);
    assert_eq!(graph.num_configs(), 0);
    assert!(graph.egress_queues().iter().all(|queue| queue.used_by.is_empty()));
}

#[test]
fn remove_unknown_flow_is_a_no_op() {
    let mut graph = line_topology();
    insert_traffic(&mut graph, 1, 0, 3, 100, 125);
    graph.remove_flow(FlowId(999));
    assert_eq!(graph.num_flows(), 1);
    assert_eq!(graph.num_configs(), 1);
}

#[test]
fn configuration_ids_stay_unique_after_removal() {
    let mut graph = line_topology();
    let flows = insert_traffic(&mut graph, 2, 0, 3, 100, 125);
    let second_config = graph.flow(flows[1]).configs[0];

    graph.remove_flows(&flows);
    assert_eq!(graph.num_configs(), 0);

    let new_flow = insert_traffic(&mut graph, 1, 0, 3, 100, 125)[0];
    let new_config = graph.flow(new_flow).configs[0];
    assert!(new_config > second_config);
}

#[test]
fn insert_network_device_by_hand() {
    let mut graph = MultiLayeredGraph::new();
    graph.insert_network_device(&[NetworkNodeId(1)]);
    graph.insert_network_device(&[NetworkNodeId(0), NetworkNodeId(2)]);
    graph.insert_network_device(&[NetworkNodeId(1)]);

    assert_eq!(graph.num_nodes(), 3);
    assert_eq!(graph.num_queues(), 4);
    assert!(graph.egress_queue(EgressQueueId(0)).end_device);
    assert!(!graph.egress_queue(EgressQueueId(1)).end_device);
}

#[test]
fn add_flow_stores_the_record() {
    let mut graph = line_topology();
    graph.add_flow(Flow {
        id: FlowId(7),
        frame_size: 250,
        period: 100,
        source: NetworkNodeId(0),
        destination: NetworkNodeId(3),
        configs: Vec::new(),
    });
    assert_eq!(graph.num_flows(), 1);
    assert_eq!(graph.flow(FlowId(7)).frame_size, 250);
}
