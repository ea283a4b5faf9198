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

use super::CelfRater;
use crate::graph::{ConfigId, EgressQueueId, MultiLayeredGraph};
use crate::metrics;
use crate::timing::{self, transmission_delay};
use crate::utilization::NetworkUtilization;
use std::collections::HashMap;

/// Schedule short periods first; among them, paths over lightly loaded links.
///
/// This rating keeps its own link-load accumulator: every committed
/// configuration adds its traffic to the links of its path via
/// [`CelfRater::pick`], so later ratings see the load of earlier picks.
pub struct LowPeriodLowUtilization<'a> {
    graph: &'a MultiLayeredGraph,
    link_utilization: HashMap<EgressQueueId, usize>,
    hyper_cycle: usize,
}

/// Smaller offset than the other ratings use; the utilization term is tiny.
const LARGE_CONSTANT: f32 = 10_000.0;

impl<'a> LowPeriodLowUtilization<'a> {
    /// Create the rating, capturing the current per-link load.
    pub fn new(graph: &'a MultiLayeredGraph, util: &NetworkUtilization) -> Self {
        Self {
            graph,
            link_utilization: metrics::link_utilization(graph, util),
            hyper_cycle: timing::hyper_cycle(graph),
        }
    }
}

impl CelfRater for LowPeriodLowUtilization<'_> {
    fn rate(&mut self, _util: &NetworkUtilization, config_id: ConfigId) -> (f32, f32) {
        let config = self.graph.configuration(config_id);
        let flow = self.graph.flow(config.flow);

        let path_load: usize = config
            .path
            .iter()
            .map(|link| self.link_utilization.get(link).copied().unwrap_or(0))
            .sum();
        let rating = LARGE_CONSTANT / flow.period as f32 + 1.0 / (1.0 + path_load as f32);
        (rating, 1.0 / config_id.0 as f32)
    }

    fn pick(&mut self, config_id: ConfigId) {
        let config = self.graph.configuration(config_id);
        let flow = self.graph.flow(config.flow);
        let traffic =
            (self.hyper_cycle / flow.period) * transmission_delay(flow.frame_size);
        for link in &config.path {
            *self.link_utilization.entry(*link).or_insert(0) += traffic;
        }
    }

    fn name(&self) -> &'static str {
        "Low-Period-Low-Utilization-First"
    }
}
