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
use crate::graph::{ConfigId, EgressQueueId, MultiLayeredGraph};
use crate::utilization::NetworkUtilization;

/// Rate a configuration by the remaining pre-deadline capacity of its
/// tightest interior link.
///
/// The first and last hop connect end systems and are ignored; paths without
/// interior links rate as 0. The flow's period acts as the deadline.
pub struct BottleneckRating<'a> {
    graph: &'a MultiLayeredGraph,
    util: &'a NetworkUtilization,
}

impl<'a> BottleneckRating<'a> {
    /// Create the rating over the given utilization.
    pub fn new(graph: &'a MultiLayeredGraph, util: &'a NetworkUtilization) -> Self {
        Self { graph, util }
    }

    fn remaining_capacity_until(&self, link: EgressQueueId, deadline: usize) -> usize {
        self.util.free_slots()[link.0]
            .iter()
            .map(|slot| {
                if slot.last_free_tick < deadline {
                    slot.last_free_tick + 1 - slot.start
                } else if slot.start >= deadline {
                    0
                } else {
                    deadline - slot.start
                }
            })
            .sum()
    }
}

impl ConfigRater for BottleneckRating<'_> {
    fn rate(&mut self, config_id: ConfigId) -> f32 {
        let config = self.graph.configuration(config_id);
        let deadline = self.graph.flow(config.flow).period;

        if config.path.len() < 3 {
            return 0.0;
        }
        let interior = &config.path[1..config.path.len() - 1];
        interior
            .iter()
            .map(|link| self.remaining_capacity_until(*link, deadline))
            .min()
            .unwrap_or(0) as f32
    }

    fn name(&self) -> &'static str {
        "Bottleneck"
    }
}
