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

//! ASAP, Balanced and Hermes placement behavior.

use super::helpers::{chain_topology, insert_traffic, line_topology, two_node_topology};
use crate::graph::{ConfigId, EgressQueueId, FlowId};
use crate::placement::{place_asap, place_balanced, place_hermes};
use crate::utilization::{NetworkUtilization, SlotRequest};

fn block(util: &mut NetworkUtilization, queue: usize, start: usize, next_start: usize) {
    assert!(util.reserve_slot(
        &SlotRequest { queue: EgressQueueId(queue), start, next_start, arrival: start },
        FlowId(99),
        ConfigId(99),
    ));
}

#[test]
fn asap_is_deterministic() {
    let mut graph = line_topology();
    let flow_id = insert_traffic(&mut graph, 1, 0, 3, 100, 250)[0];
    let flow = graph.flow(flow_id);
    let config = graph.configuration(flow.configs[0]);

    let mut first = NetworkUtilization::new(graph.num_queues(), 200, 100);
    let mut second = NetworkUtilization::new(graph.num_queues(), 200, 100);
    assert!(place_asap(config, flow, &mut first));
    assert!(place_asap(config, flow, &mut second));

    assert_eq!(first.free_slots(), second.free_slots());
    assert_eq!(first.reserved_slots(), second.reserved_slots());
}

#[test]
fn asap_reserves_every_frame_of_the_hyper_cycle() {
    let mut graph = two_node_topology();
    let flow_id = insert_traffic(&mut graph, 1, 0, 1, 100, 250)[0];
    let flow = graph.flow(flow_id);
    let config = graph.configuration(flow.configs[0]);

    let mut util = NetworkUtilization::new(graph.num_queues(), 400, 100);
    assert!(place_asap(config, flow, &mut util));

    let starts: Vec<usize> = util.reserved_slots()[0].iter().map(|slot| slot.start).collect();
    assert_eq!(starts, vec![0, 100, 200, 300]);
}

#[test]
fn asap_failure_leaves_the_utilization_untouched() {
    let mut graph = line_topology();
    let flow_id = insert_traffic(&mut graph, 1, 0, 3, 200, 250)[0];
    let flow = graph.flow(flow_id);
    let config = graph.configuration(flow.configs[0]);

    let mut util = NetworkUtilization::new(graph.num_queues(), 200, 200);
    block(&mut util, 4, 0, 200);
    let snapshot_free = util.free_slots().to_vec();

    assert!(!place_asap(config, flow, &mut util));
    assert_eq!(util.free_slots(), &snapshot_free[..]);
    assert!(util.reserved_slots()[0].is_empty());
    assert!(util.reserved_slots()[2].is_empty());
}

#[test]
fn rejection_is_monotone_in_the_release_time() {
    let mut graph = two_node_topology();
    let flow_id = insert_traffic(&mut graph, 1, 0, 1, 100, 6250)[0];
    let flow = graph.flow(flow_id);
    let config = graph.configuration(flow.configs[0]);
    let util = NetworkUtilization::new(graph.num_queues(), 100, 100);

    // 50 ticks of transmission: release 50 cannot meet the deadline of 100
    assert!(util.search_transmission_opportunities(config, flow, 50, 100).is_empty());
    for later_release in [60, 75, 99] {
        assert!(util
            .search_transmission_opportunities(config, flow, later_release, 100)
            .is_empty());
    }
}

#[test]
fn balanced_equals_asap_with_a_single_offset() {
    let mut graph = two_node_topology();
    let flow_id = insert_traffic(&mut graph, 1, 0, 1, 100, 250)[0];
    let flow = graph.flow(flow_id);
    let config = graph.configuration(flow.configs[0]);

    // sub cycle == period, only offset 0 exists
    let mut asap = NetworkUtilization::new(graph.num_queues(), 200, 100);
    let mut balanced = NetworkUtilization::new(graph.num_queues(), 200, 100);
    assert!(place_asap(config, flow, &mut asap));
    assert!(place_balanced(config, flow, &mut balanced));
    assert_eq!(asap.free_slots(), balanced.free_slots());
}

/// Two-hop chain, 50 long-period flows packed greedily use up the first half
/// of every period window; a short-period flow no longer fits. Balanced
/// placement spreads the same load over both halves and admits everything.
#[test]
fn balanced_beats_asap_packing() {
    let mut graph = chain_topology();
    let long = insert_traffic(&mut graph, 50, 0, 2, 200, 250);
    let short = insert_traffic(&mut graph, 10, 0, 2, 100, 250);

    // greedy ASAP for the long flows clogs [0, 100) of every period
    let mut util = NetworkUtilization::new(graph.num_queues(), 800, 100);
    for flow_id in &long {
        let flow = graph.flow(*flow_id);
        let config = graph.configuration(flow.configs[0]);
        assert!(place_asap(config, flow, &mut util));
    }
    let first_short = graph.flow(short[0]);
    let config = graph.configuration(first_short.configs[0]);
    assert!(!place_balanced(config, first_short, &mut util));

    // balanced for everything succeeds
    let mut util = NetworkUtilization::new(graph.num_queues(), 800, 100);
    for flow_id in long.iter().chain(short.iter()) {
        let flow = graph.flow(*flow_id);
        let config = graph.configuration(flow.configs[0]);
        assert!(place_balanced(config, flow, &mut util), "flow {:?} rejected", flow_id);
    }

    // 50 flows x 4 frames + 10 flows x 8 frames on both hops
    assert_eq!(util.reserved_slots_of(EgressQueueId(0)).len(), 280);
    assert_eq!(util.reserved_slots_of(EgressQueueId(2)).len(), 280);
}

#[test]
fn hermes_places_as_late_as_the_offset_allows() {
    let mut graph = two_node_topology();
    let flow_id = insert_traffic(&mut graph, 1, 0, 1, 100, 250)[0];
    let flow = graph.flow(flow_id);
    let config = graph.configuration(flow.configs[0]);

    let mut util = NetworkUtilization::new(graph.num_queues(), 100, 100);
    assert!(place_hermes(config, flow, &mut util, EgressQueueId(0), 97));

    let slot = util.reserved_slots_of(EgressQueueId(0))[0];
    assert_eq!((slot.start, slot.next_start), (97, 99));
}

#[test]
fn hermes_takes_the_latest_fitting_slot() {
    let mut graph = two_node_topology();
    let flow_id = insert_traffic(&mut graph, 1, 0, 1, 100, 250)[0];
    let flow = graph.flow(flow_id);
    let config = graph.configuration(flow.configs[0]);

    let mut util = NetworkUtilization::new(graph.num_queues(), 100, 100);
    // free: [0,39] and [60,99]; only the early slot starts before the offset
    block(&mut util, 0, 40, 60);
    assert!(place_hermes(config, flow, &mut util, EgressQueueId(0), 50));

    let slot = util
        .reserved_slots_of(EgressQueueId(0))
        .iter()
        .find(|slot| slot.flow == flow_id)
        .copied()
        .unwrap();
    // end of the early slot, clamped by its length
    assert_eq!((slot.start, slot.next_start), (38, 40));
}

#[test]
fn hermes_fails_without_a_fitting_slot() {
    let mut graph = two_node_topology();
    let flow_id = insert_traffic(&mut graph, 1, 0, 1, 100, 250)[0];
    let flow = graph.flow(flow_id);
    let config = graph.configuration(flow.configs[0]);

    let mut util = NetworkUtilization::new(graph.num_queues(), 100, 100);
    block(&mut util, 0, 0, 99);
    // the only free slot [99,99] is too small and starts past the offset
    assert!(!place_hermes(config, flow, &mut util, EgressQueueId(0), 50));
}
