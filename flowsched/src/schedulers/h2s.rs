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
use crate::graph::{ConfigId, FlowId, MultiLayeredGraph};
use crate::placement::{place_config, PlacementKind};
use crate::rating::{config_rater, ConfigRaterKind};
use crate::sorting::{flow_sorter, FlowSorterKind};
use crate::utilization::NetworkUtilization;
use std::collections::HashSet;

/// Hierarchical heuristic scheduling (H2S).
///
/// Flows are ordered by the configured [`FlowSorterKind`]; for each flow the
/// candidate configurations are rated with the configured
/// [`ConfigRaterKind`] (ties broken towards the lower configuration id) and
/// tried in ascending rating order until one placement succeeds.
pub struct H2sScheduler {
    sorter: FlowSorterKind,
    rating: ConfigRaterKind,
    placement: PlacementKind,
}

impl H2sScheduler {
    /// Create the scheduler with the given strategy selection.
    pub fn new(sorter: FlowSorterKind, rating: ConfigRaterKind, placement: PlacementKind) -> Self {
        Self { sorter, rating, placement }
    }

    fn schedule_set(
        &self,
        graph: &MultiLayeredGraph,
        flow_set: &HashSet<FlowId>,
        util: &mut NetworkUtilization,
    ) -> SolutionSet {
        let mut flow_list = sorted_flows(flow_set);
        flow_sorter(self.sorter, graph).sort(&mut flow_list);

        let mut result = SolutionSet::new();
        for flow_id in flow_list {
            let flow = graph.flow(flow_id);

            // rate all candidates against the current utilization
            let mut ratings: Vec<(ConfigId, f32)> = {
                let mut rater = config_rater(self.rating, graph, util);
                rater.prepare();
                flow.configs
                    .iter()
                    .map(|&config_id| (config_id, rater.rate(config_id)))
                    .collect()
            };
            ratings.sort_by(|lhs, rhs| {
                if (lhs.1 - rhs.1).abs() <= f32::EPSILON {
                    lhs.0.cmp(&rhs.0)
                } else {
                    lhs.1.total_cmp(&rhs.1)
                }
            });

            for (config_id, _) in ratings {
                if place_config(graph.configuration(config_id), flow, util, self.placement) {
                    result.push((flow_id, config_id));
                    break;
                }
            }
        }
        result
    }
}

impl Scheduler for H2sScheduler {
    fn solve(
        &mut self,
        graph: &MultiLayeredGraph,
        active: &HashSet<FlowId>,
        required: &HashSet<FlowId>,
        util: &mut NetworkUtilization,
    ) -> SolutionSet {
        let mut result = SolutionSet::new();

        if !active.is_empty() {
            result = self.schedule_set(graph, active, util);
            if result.len() < active.len() {
                return SolutionSet::new();
            }
        }

        let required_solution = self.schedule_set(graph, required, util);
        result.extend(required_solution);
        result
    }

    fn name(&self) -> String {
        format!("H2S-{}-{}", self.sorter.index(), self.rating.index())
    }
}
