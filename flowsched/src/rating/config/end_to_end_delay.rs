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

use super::ConfigRater;
use crate::graph::{ConfigId, MultiLayeredGraph};
use crate::rating::simulate_asap_walk;
use crate::utilization::NetworkUtilization;

/// Rate a configuration by its average simulated queueing delay.
///
/// Walks all frames of one hyper cycle over the current free slots as if
/// they were placed as early as possible; the rating is the average time
/// between release and arrival behind the last hop. Infeasible
/// configurations rate as infinity.
pub struct EndToEndDelayRating<'a> {
    graph: &'a MultiLayeredGraph,
    util: &'a NetworkUtilization,
}

impl<'a> EndToEndDelayRating<'a> {
    /// Create the rating over the given utilization.
    pub fn new(graph: &'a MultiLayeredGraph, util: &'a NetworkUtilization) -> Self {
        Self { graph, util }
    }
}

impl ConfigRater for EndToEndDelayRating<'_> {
    fn rate(&mut self, config_id: ConfigId) -> f32 {
        let Some(walk) = simulate_asap_walk(self.graph, self.util, config_id) else {
            return f32::INFINITY;
        };

        let config = self.graph.configuration(config_id);
        let period = self.graph.flow(config.flow).period;

        let total_delay: usize = walk
            .final_arrivals
            .iter()
            .enumerate()
            .map(|(frame, arrival)| arrival - frame * period)
            .sum();
        let frames = walk.final_arrivals.len().max(1);

        total_delay as f32 / frames as f32
    }

    fn name(&self) -> &'static str {
        "End-to-End-Delay"
    }
}
