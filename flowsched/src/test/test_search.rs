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

//! The transmission-opportunity search over one or more hops.

use super::helpers::{insert_traffic, line_topology, two_node_topology};
use crate::graph::{ConfigId, EgressQueueId, FlowId};
use crate::utilization::{NetworkUtilization, SlotRequest};

const BLOCKER: FlowId = FlowId(99);
const BLOCKER_CONFIG: ConfigId = ConfigId(99);

fn block(util: &mut NetworkUtilization, queue: usize, start: usize, next_start: usize) {
    assert!(util.reserve_slot(
        &SlotRequest { queue: EgressQueueId(queue), start, next_start, arrival: start },
        BLOCKER,
        BLOCKER_CONFIG,
    ));
}

#[test]
fn empty_queue_sends_at_release_time() {
    let mut graph = two_node_topology();
    let flow_id = insert_traffic(&mut graph, 1, 0, 1, 100, 250)[0];
    let util = NetworkUtilization::new(graph.num_queues(), 100, 100);

    let flow = graph.flow(flow_id);
    let config = graph.configuration(flow.configs[0]);
    let requests = util.search_transmission_opportunities(config, flow, 10, 100);

    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].queue, EgressQueueId(0));
    assert_eq!(requests[0].start, 10);
    assert_eq!(requests[0].next_start, 12);
    assert_eq!(requests[0].arrival, 10);
}

#[test]
fn occupied_prefix_defers_the_transmission() {
    let mut graph = two_node_topology();
    let flow_id = insert_traffic(&mut graph, 1, 0, 1, 100, 250)[0];
    let mut util = NetworkUtilization::new(graph.num_queues(), 100, 100);
    block(&mut util, 0, 0, 50);

    let flow = graph.flow(flow_id);
    let config = graph.configuration(flow.configs[0]);
    let requests = util.search_transmission_opportunities(config, flow, 10, 100);

    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].start, 50);
    assert_eq!(requests[0].next_start, 52);
    assert_eq!(requests[0].arrival, 10);
}

#[test]
fn slot_starting_after_effective_deadline_is_rejected() {
    let mut graph = two_node_topology();
    let flow_id = insert_traffic(&mut graph, 1, 0, 1, 100, 250)[0];
    let mut util = NetworkUtilization::new(graph.num_queues(), 100, 100);
    block(&mut util, 0, 0, 50);

    let flow = graph.flow(flow_id);
    let config = graph.configuration(flow.configs[0]);
    // effective deadline 51 - 2 - 1 = 48, the free slot starts at 50
    assert!(util
        .search_transmission_opportunities(config, flow, 10, 51)
        .is_empty());
}

#[test]
fn too_small_gaps_are_skipped() {
    let mut graph = two_node_topology();
    let flow_id = insert_traffic(&mut graph, 1, 0, 1, 100, 250)[0];
    let mut util = NetworkUtilization::new(graph.num_queues(), 100, 100);
    // free: [0,0], [2,2], [4,99]; the frame needs two ticks
    block(&mut util, 0, 1, 2);
    block(&mut util, 0, 3, 4);

    let flow = graph.flow(flow_id);
    let config = graph.configuration(flow.configs[0]);
    let requests = util.search_transmission_opportunities(config, flow, 0, 100);

    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].start, 4);
}

#[test]
fn deadline_cuts_a_long_slot() {
    let mut graph = two_node_topology();
    let flow_id = insert_traffic(&mut graph, 1, 0, 1, 100, 250)[0];
    let util = NetworkUtilization::new(graph.num_queues(), 100, 100);

    let flow = graph.flow(flow_id);
    let config = graph.configuration(flow.configs[0]);

    // release 96: sending [96, 98) arrives at 98, too late for deadline 98
    assert!(util
        .search_transmission_opportunities(config, flow, 96, 98)
        .is_empty());
    // deadline 99 leaves exactly enough room
    let requests = util.search_transmission_opportunities(config, flow, 96, 99);
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].start, 96);
}

#[test]
fn multi_hop_walk_advances_the_arrival_time() {
    let mut graph = line_topology();
    let flow_id = insert_traffic(&mut graph, 1, 0, 3, 200, 250)[0];
    let util = NetworkUtilization::new(graph.num_queues(), 200, 200);

    let flow = graph.flow(flow_id);
    let config = graph.configuration(flow.configs[0]);
    let requests = util.search_transmission_opportunities(config, flow, 0, 200);

    // transmission 2 ticks, plus 1 propagation and 4 processing per hop
    assert_eq!(requests.len(), 3);
    assert_eq!((requests[0].start, requests[0].next_start, requests[0].arrival), (0, 2, 0));
    assert_eq!((requests[1].start, requests[1].next_start, requests[1].arrival), (7, 9, 7));
    assert_eq!((requests[2].start, requests[2].next_start, requests[2].arrival), (14, 16, 14));
}

#[test]
fn failure_on_a_later_hop_returns_nothing() {
    let mut graph = line_topology();
    let flow_id = insert_traffic(&mut graph, 1, 0, 3, 200, 250)[0];
    let mut util = NetworkUtilization::new(graph.num_queues(), 200, 200);
    // last hop 2>3 is queue 4, block it completely
    block(&mut util, 4, 0, 200);

    let flow = graph.flow(flow_id);
    let config = graph.configuration(flow.configs[0]);
    assert!(util
        .search_transmission_opportunities(config, flow, 0, 200)
        .is_empty());
}

#[test]
fn search_does_not_mutate_the_utilization() {
    let mut graph = two_node_topology();
    let flow_id = insert_traffic(&mut graph, 1, 0, 1, 100, 250)[0];
    let util = NetworkUtilization::new(graph.num_queues(), 100, 100);
    let snapshot = util.free_slots().to_vec();

    let flow = graph.flow(flow_id);
    let config = graph.configuration(flow.configs[0]);
    let _ = util.search_transmission_opportunities(config, flow, 0, 100);

    assert_eq!(util.free_slots(), &snapshot[..]);
    assert!(util.reserved_slots()[0].is_empty());
}
