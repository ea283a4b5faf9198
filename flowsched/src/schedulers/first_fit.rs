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

use super::{sorted_flows, Scheduler, SolutionSet};
use crate::graph::{FlowId, MultiLayeredGraph};
use crate::placement::place_asap;
use crate::utilization::NetworkUtilization;
use std::collections::HashSet;

/// Baseline scheduler: flows in ascending id order, first configuration
/// only, as-soon-as-possible placement.
///
/// Callers that want to re-plan from scratch when the active set no longer
/// fits must clear the utilization themselves and call `solve` again with
/// the active set passed explicitly.
pub struct FirstFitScheduler;

impl FirstFitScheduler {
    /// Create the scheduler.
    pub fn new() -> Self {
        Self
    }

    fn add_flows(
        &self,
        graph: &MultiLayeredGraph,
        flow_set: &HashSet<FlowId>,
        util: &mut NetworkUtilization,
        result: &mut SolutionSet,
    ) {
        for flow_id in sorted_flows(flow_set) {
            let flow = graph.flow(flow_id);
            let Some(&config_id) = flow.configs.first() else {
                continue;
            };
            if place_asap(graph.configuration(config_id), flow, util) {
                result.push((flow_id, config_id));
            }
        }
    }
}

impl Default for FirstFitScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler for FirstFitScheduler {
    fn solve(
        &mut self,
        graph: &MultiLayeredGraph,
        active: &HashSet<FlowId>,
        required: &HashSet<FlowId>,
        util: &mut NetworkUtilization,
    ) -> SolutionSet {
        let mut result = SolutionSet::new();

        self.add_flows(graph, active, util, &mut result);
        if result.len() < active.len() {
            return SolutionSet::new();
        }

        self.add_flows(graph, required, util, &mut result);
        result
    }

    fn name(&self) -> String {
        "FirstFit".to_string()
    }
}
