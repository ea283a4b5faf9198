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

use super::{CelfRater, LARGE_CONSTANT};
use crate::graph::{ConfigId, MultiLayeredGraph};
use crate::rating::simulate_asap_walk;
use crate::utilization::NetworkUtilization;

/// Schedule short periods first; among them, configurations with a large
/// slack between worst-case delay and deadline.
///
/// The worst-case delay is taken from a hypothetical as-soon-as-possible
/// walk over the current free slots, measured from the first-hop
/// transmission start. Infeasible configurations rate as `(-1, -1)`.
pub struct EndToEndDelayCelfRating<'a> {
    graph: &'a MultiLayeredGraph,
}

impl<'a> EndToEndDelayCelfRating<'a> {
    /// Create the rating for the given graph.
    pub fn new(graph: &'a MultiLayeredGraph) -> Self {
        Self { graph }
    }
}

impl CelfRater for EndToEndDelayCelfRating<'_> {
    fn rate(&mut self, util: &NetworkUtilization, config_id: ConfigId) -> (f32, f32) {
        let Some(walk) = simulate_asap_walk(self.graph, util, config_id) else {
            return (-1.0, -1.0);
        };

        let config = self.graph.configuration(config_id);
        let flow = self.graph.flow(config.flow);
        let period = flow.period as i64;

        let mut max_delay = -period;
        for (frame, arrival) in walk.final_arrivals.iter().enumerate() {
            let first_send = walk.first_hop_sends.get(frame).copied().unwrap_or(0);
            let start = frame as i64 * period + first_send as i64;
            max_delay = max_delay.max(*arrival as i64 - start);
        }

        let slack = (period - max_delay) as f32 / 1000.0;
        let rating = LARGE_CONSTANT / flow.period as f32 + flow.frame_size as f32 + slack;
        (rating, config_id.0 as f32)
    }

    fn name(&self) -> &'static str {
        "Celf-End-to-End-Delay"
    }
}
