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

//! Derived statistics over a graph and its utilization list: per-link load,
//! ingress traffic, frame counts, queue depths and scheduling-table sizes.

use crate::graph::{EgressQueueId, FlowId, MultiLayeredGraph};
use crate::timing;
use crate::utilization::NetworkUtilization;
use std::collections::HashMap;

/// Reserved macro ticks per egress queue.
pub fn link_utilization(
    graph: &MultiLayeredGraph,
    util: &NetworkUtilization,
) -> HashMap<EgressQueueId, usize> {
    graph
        .egress_queues()
        .iter()
        .map(|queue| {
            let reserved = util
                .reserved_slots_of(queue.id)
                .iter()
                .map(|slot| slot.next_start - slot.start)
                .sum();
            (queue.id, reserved)
        })
        .collect()
}

/// Average of the per-link loads in macro ticks.
pub fn average_link_utilization(link_utilization: &HashMap<EgressQueueId, usize>) -> f32 {
    if link_utilization.is_empty() {
        return 0.0;
    }
    let total: usize = link_utilization.values().sum();
    total as f32 / link_utilization.len() as f32
}

/// Ingress traffic of the given flows in Mbit/s.
pub fn ingress_traffic(
    graph: &MultiLayeredGraph,
    flows: impl IntoIterator<Item = FlowId>,
) -> f64 {
    let bits_per_ms: f64 = flows
        .into_iter()
        .map(|flow_id| {
            let flow = graph.flow(flow_id);
            // frame [bit] * periods per millisecond
            flow.frame_size as f64 * 8.0 * (1000.0 / flow.period as f64)
        })
        .sum();
    // bit/ms == kbit/s
    bits_per_ms / 1000.0
}

/// Number of frames the given flows transmit per hyper cycle.
pub fn number_of_frames(
    graph: &MultiLayeredGraph,
    flows: impl IntoIterator<Item = FlowId>,
) -> usize {
    let hyper_cycle = timing::hyper_cycle(graph);
    flows
        .into_iter()
        .map(|flow_id| hyper_cycle / graph.flow(flow_id).period)
        .sum()
}

/// The maximum number of frames that are queued simultaneously at any single
/// switch egress port. End-device ports are skipped.
///
/// Sorts the reserved slot lists as a side effect.
pub fn max_queue_size(util: &mut NetworkUtilization, graph: &MultiLayeredGraph) -> usize {
    let mut global_max = 0;
    util.sort_reserved();

    for queue in graph.egress_queues() {
        if queue.end_device {
            continue;
        }

        let mut arrivals: Vec<(FlowId, usize)> = util.arrivals_of(queue.id).to_vec();
        if arrivals.len() < global_max {
            continue;
        }
        arrivals.sort_by_key(|(_, tick)| *tick);

        let mut max_queued = 0;
        let mut sent = 0;
        let mut received = 0;
        let mut arrival_iter = arrivals.iter().peekable();

        for slot in util.reserved_slots_of(queue.id) {
            while arrival_iter.peek().map_or(false, |entry| entry.1 <= slot.start) {
                received += 1;
                arrival_iter.next();
            }
            max_queued = max_queued.max(received - sent);
            sent += 1;
        }

        global_max = global_max.max(max_queued);
    }

    global_max
}

/// The number of frame-forwarding entries a scheduling table would need, one
/// value per egress queue.
pub fn scheduling_table_sizes(util: &NetworkUtilization) -> Vec<usize> {
    util.reserved_slots()
        .iter()
        .map(|queue| queue.len())
        .collect()
}

/// Average of a list of table sizes. An empty list yields 0.
pub fn average(values: &[usize]) -> f32 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<usize>() as f32 / values.len() as f32
}
