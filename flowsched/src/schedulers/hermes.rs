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

use super::{Scheduler, SolutionSet};
use crate::graph::{ConfigId, EgressQueueId, FlowId, MultiLayeredGraph};
use crate::placement::place_hermes;
use crate::timing::{self, transmission_delay, PROCESSING_DELAY, PROPAGATION_DELAY};
use crate::utilization::NetworkUtilization;
use std::collections::{HashMap, HashSet};

/// Phase labels above this value indicate a circular wait between paths.
const PHASE_LIMIT: usize = 1000;

/// Phase-ordered latest-possible scheduling (Hermes).
///
/// Every egress queue receives a positive phase label such that along every
/// flow's path the upstream queue carries a strictly higher label than the
/// downstream one. Queues are then scheduled phase by phase (downstream
/// first): each frame is placed as late as its deadline and the already
/// placed next-hop transmission allow. Assumes one configuration per flow.
pub struct HermesScheduler;

impl HermesScheduler {
    /// Create the scheduler.
    pub fn new() -> Self {
        Self
    }

    /// Assign a phase to every egress queue in reverse topological order of
    /// the configured paths.
    ///
    /// In each round, a queue receives the current phase only if it is the
    /// rearmost unassigned queue of *every* path crossing it (or is paired
    /// with an adjacent queue that already carries the current phase).
    /// Unused queues get phase 1 immediately. Returns `None` if the labeling
    /// does not make progress within [`PHASE_LIMIT`] rounds.
    fn assign_phases(&self, graph: &MultiLayeredGraph) -> Option<Vec<usize>> {
        let mut phases = vec![0usize; graph.num_queues()];
        for queue in graph.egress_queues() {
            if queue.used_by.is_empty() {
                phases[queue.id.0] = 1;
            }
        }

        let config_ids = graph.sorted_config_ids();
        let mut phi = 1;
        while phases.iter().any(|phase| *phase == 0) {
            for flow_id in graph.sorted_flow_ids() {
                let flow = graph.flow(flow_id);
                let Some(&config_id) = flow.configs.first() else {
                    continue;
                };
                let path = &graph.configuration(config_id).path;
                let Some(candidate) = next_unassigned_segment(&phases, path, phi) else {
                    continue;
                };

                // delay the candidate if any other path crossing it would
                // assign the current phase somewhere else
                let delay = config_ids.iter().any(|&other_id| {
                    let other_path = &graph.configuration(other_id).path;
                    if !other_path.contains(&candidate) {
                        return false;
                    }
                    match next_unassigned_segment(&phases, other_path, phi) {
                        Some(other_candidate) => other_candidate != candidate,
                        None => false,
                    }
                });
                if !delay {
                    phases[candidate.0] = phi;
                }
            }

            if phi > PHASE_LIMIT {
                // circular wait between the paths, give up
                return None;
            }
            phi += 1;
        }

        Some(phases)
    }

    /// Per configuration: transmission delay over period, scaled by the path
    /// length. Determines the order in which configurations of one queue are
    /// placed.
    fn frame_utilization(&self, graph: &MultiLayeredGraph) -> HashMap<ConfigId, f32> {
        let mut utilization = HashMap::new();
        for flow in graph.flows().values() {
            let Some(&config_id) = flow.configs.first() else {
                continue;
            };
            let path_len = graph.configuration(config_id).path.len() as f32;
            let value =
                transmission_delay(flow.frame_size) as f32 / flow.period as f32 * path_len;
            utilization.insert(config_id, value);
        }
        utilization
    }

    fn schedule(
        &self,
        graph: &MultiLayeredGraph,
        phases: &[usize],
        frame_utilization: &HashMap<ConfigId, f32>,
        util: &mut NetworkUtilization,
    ) -> SolutionSet {
        let hyper_cycle = timing::hyper_cycle(graph);
        let max_phase = phases.iter().copied().max().unwrap_or(0);

        for phase in 1..=max_phase {
            for queue_index in
                (0..phases.len()).filter(|index| phases[*index] == phase)
            {
                let queue_id = EgressQueueId(queue_index);
                let mut configs = graph.egress_queue(queue_id).used_by.clone();
                configs.sort_by(|lhs, rhs| {
                    let lhs_util = frame_utilization.get(lhs).copied().unwrap_or(0.0);
                    let rhs_util = frame_utilization.get(rhs).copied().unwrap_or(0.0);
                    rhs_util.total_cmp(&lhs_util).then_with(|| lhs.cmp(rhs))
                });

                for config_id in configs {
                    let config = graph.configuration(config_id);
                    let flow = graph.flow(config.flow);
                    let delay = transmission_delay(flow.frame_size);

                    for frame in 0..hyper_cycle / flow.period {
                        let deadline = flow.period * (frame + 1);
                        let next_hop_bound =
                            self.next_hop_offset(graph, util, config_id, queue_id, deadline);

                        let Some(latest_offset) = deadline
                            .min(next_hop_bound)
                            .checked_sub(PROPAGATION_DELAY + delay)
                        else {
                            return SolutionSet::new();
                        };
                        if !place_hermes(config, flow, util, queue_id, latest_offset) {
                            return SolutionSet::new();
                        }
                    }
                }
            }
        }

        graph
            .sorted_config_ids()
            .iter()
            .map(|&config_id| (graph.configuration(config_id).flow, config_id))
            .collect()
    }

    /// The latest time the current frame may start so that the already
    /// placed transmission on the next hop can still be reached, or the
    /// deadline if the current queue is the last hop (or no next-hop slot of
    /// this period exists yet).
    fn next_hop_offset(
        &self,
        graph: &MultiLayeredGraph,
        util: &NetworkUtilization,
        config_id: ConfigId,
        queue_id: EgressQueueId,
        deadline: usize,
    ) -> usize {
        let config = graph.configuration(config_id);
        let flow = graph.flow(config.flow);

        let Some(position) = config.path.iter().position(|hop| *hop == queue_id) else {
            return deadline;
        };
        let Some(&next_hop) = config.path.get(position + 1) else {
            return deadline;
        };

        util.reserved_slots_of_flow(next_hop, flow.id)
            .find(|slot| slot.start < deadline && slot.start >= deadline - flow.period)
            .and_then(|slot| slot.start.checked_sub(PROCESSING_DELAY))
            .unwrap_or(deadline)
    }
}

impl Default for HermesScheduler {
    fn default() -> Self {
        Self::new()
    }
}

/// The rearmost queue of `path` that has no phase yet; if the queue right
/// behind it was already labeled with the current phase, that neighbor is
/// reported instead so that adjacent queues never share a phase by accident.
fn next_unassigned_segment(
    phases: &[usize],
    path: &[EgressQueueId],
    phi: usize,
) -> Option<EgressQueueId> {
    let index = path.iter().rposition(|queue| phases[queue.0] == 0)?;
    if index + 1 < path.len() {
        let downstream = path[index + 1];
        if phases[downstream.0] == phi {
            return Some(downstream);
        }
    }
    Some(path[index])
}

impl Scheduler for HermesScheduler {
    fn solve(
        &mut self,
        graph: &MultiLayeredGraph,
        _active: &HashSet<FlowId>,
        _required: &HashSet<FlowId>,
        util: &mut NetworkUtilization,
    ) -> SolutionSet {
        let Some(phases) = self.assign_phases(graph) else {
            return SolutionSet::new();
        };
        let frame_utilization = self.frame_utilization(graph);
        self.schedule(graph, &phases, &frame_utilization, util)
    }

    fn name(&self) -> String {
        "Hermes".to_string()
    }
}
