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
use crate::utilization::NetworkUtilization;

/// Schedule short periods first; among them, long paths.
pub struct LowPeriodLongPaths<'a> {
    graph: &'a MultiLayeredGraph,
}

impl<'a> LowPeriodLongPaths<'a> {
    /// Create the rating for the given graph.
    pub fn new(graph: &'a MultiLayeredGraph) -> Self {
        Self { graph }
    }
}

impl CelfRater for LowPeriodLongPaths<'_> {
    fn rate(&mut self, _util: &NetworkUtilization, config_id: ConfigId) -> (f32, f32) {
        let config = self.graph.configuration(config_id);
        let flow = self.graph.flow(config.flow);
        let rating = LARGE_CONSTANT / flow.period as f32 + config.path.len() as f32;
        (rating, 1.0 / config_id.0 as f32)
    }

    fn name(&self) -> &'static str {
        "Greedy"
    }
}
