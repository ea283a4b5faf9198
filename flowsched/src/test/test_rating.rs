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

//! Spot checks of the configuration and CELF ratings.

use super::helpers::{insert_traffic, line_topology};
use crate::graph::{ConfigId, EgressQueueId, FlowId};
use crate::rating::{celf_rater, config_rater, CelfRaterKind, ConfigRaterKind};
use crate::utilization::{NetworkUtilization, SlotRequest};

#[test]
fn path_length_counts_hops() {
    let mut graph = line_topology();
    let flow_id = insert_traffic(&mut graph, 1, 0, 3, 200, 250)[0];
    let config_id = graph.flow(flow_id).configs[0];
    let util = NetworkUtilization::new(graph.num_queues(), 200, 200);

    let mut rater = config_rater(ConfigRaterKind::PathLength, &graph, &util);
    rater.prepare();
    assert_eq!(rater.rate(config_id), 3.0);
}

#[test]
fn balanced_utilization_penalizes_above_average_links() {
    let mut graph = line_topology();
    let flow_id = insert_traffic(&mut graph, 1, 0, 3, 200, 250)[0];
    let config_id = graph.flow(flow_id).configs[0];
    let util = NetworkUtilization::new(graph.num_queues(), 200, 200);

    let mut rater = config_rater(ConfigRaterKind::BalancedNetworkUtilization, &graph, &util);
    rater.prepare();
    // added traffic 2 ticks; new average 2/6; 3 links each 2 - 1/3 over
    let expected = 3.0 * (2.0 - 2.0 / 6.0);
    assert!((rater.rate(config_id) - expected).abs() < 1e-3);
}

#[test]
fn end_to_end_delay_measures_the_walk() {
    let mut graph = line_topology();
    let flow_id = insert_traffic(&mut graph, 1, 0, 3, 200, 250)[0];
    let config_id = graph.flow(flow_id).configs[0];
    let util = NetworkUtilization::new(graph.num_queues(), 200, 200);

    let mut rater = config_rater(ConfigRaterKind::EndToEndDelay, &graph, &util);
    rater.prepare();
    // sends at 0, 7, 14; arrival behind the last hop at 14 + 2 + 5 = 21
    assert_eq!(rater.rate(config_id), 21.0);
}

#[test]
fn end_to_end_delay_is_infinite_when_infeasible() {
    let mut graph = line_topology();
    let flow_id = insert_traffic(&mut graph, 1, 0, 3, 200, 250)[0];
    let config_id = graph.flow(flow_id).configs[0];
    let mut util = NetworkUtilization::new(graph.num_queues(), 200, 200);
    assert!(util.reserve_slot(
        &SlotRequest { queue: EgressQueueId(4), start: 0, next_start: 200, arrival: 0 },
        FlowId(99),
        ConfigId(99),
    ));

    let mut rater = config_rater(ConfigRaterKind::EndToEndDelay, &graph, &util);
    rater.prepare();
    assert!(rater.rate(config_id).is_infinite());
}

#[test]
fn bottleneck_reports_interior_capacity_before_the_deadline() {
    let mut graph = line_topology();
    let flow_id = insert_traffic(&mut graph, 1, 0, 3, 200, 250)[0];
    let config_id = graph.flow(flow_id).configs[0];
    let mut util = NetworkUtilization::new(graph.num_queues(), 400, 200);
    // interior link 1>2 is queue 2; 30 of the first 200 ticks reserved
    assert!(util.reserve_slot(
        &SlotRequest { queue: EgressQueueId(2), start: 0, next_start: 30, arrival: 0 },
        FlowId(99),
        ConfigId(99),
    ));

    let mut rater = config_rater(ConfigRaterKind::Bottleneck, &graph, &util);
    rater.prepare();
    // deadline 200: 170 free ticks remain before it on the interior link
    assert_eq!(rater.rate(config_id), 170.0);
}

#[test]
fn celf_low_id_ranks_by_flow_id() {
    let mut graph = line_topology();
    let flows = insert_traffic(&mut graph, 3, 0, 3, 200, 250);
    let util = NetworkUtilization::new(graph.num_queues(), 200, 200);

    let mut rater = celf_rater(CelfRaterKind::LowId, &graph, &util);
    let first = rater.rate(&util, graph.flow(flows[1]).configs[0]);
    let second = rater.rate(&util, graph.flow(flows[2]).configs[0]);
    assert!(first.0 > second.0);
}

#[test]
fn celf_low_period_low_utilization_tracks_picks() {
    let mut graph = line_topology();
    let flows = insert_traffic(&mut graph, 2, 0, 3, 200, 250);
    let util = NetworkUtilization::new(graph.num_queues(), 200, 200);
    let first_config = graph.flow(flows[0]).configs[0];
    let second_config = graph.flow(flows[1]).configs[0];

    let mut rater = celf_rater(CelfRaterKind::LowPeriodLowUtilization, &graph, &util);
    let before = rater.rate(&util, second_config);
    rater.pick(first_config);
    let after = rater.rate(&util, second_config);

    // the picked configuration loads the shared path, the rating drops
    assert!(after.0 < before.0);
}

#[test]
fn celf_end_to_end_delay_flags_infeasible_configs() {
    let mut graph = line_topology();
    let flow_id = insert_traffic(&mut graph, 1, 0, 3, 200, 250)[0];
    let config_id = graph.flow(flow_id).configs[0];
    let mut util = NetworkUtilization::new(graph.num_queues(), 200, 200);
    assert!(util.reserve_slot(
        &SlotRequest { queue: EgressQueueId(0), start: 0, next_start: 200, arrival: 0 },
        FlowId(99),
        ConfigId(99),
    ));

    let mut rater = celf_rater(CelfRaterKind::EndToEndDelay, &graph, &util);
    assert_eq!(rater.rate(&util, config_id), (-1.0, -1.0));
}
