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
use crate::metrics;
use crate::timing::{self, transmission_delay};
use crate::utilization::NetworkUtilization;
use std::collections::HashMap;

/// Rate a configuration by how far it would push its links above the
/// network-wide average load.
///
/// For every link of the path, the penalty is the amount by which the link's
/// load after a hypothetical addition of the flow would exceed the new
/// average load; links below the average contribute nothing.
pub struct BalancedNetworkUtilizationRating<'a> {
    graph: &'a MultiLayeredGraph,
    link_utilization: HashMap<EgressQueueId, usize>,
    average_utilization: f32,
    hyper_cycle: usize,
}

impl<'a> BalancedNetworkUtilizationRating<'a> {
    /// Create the rating, capturing the current per-link load.
    pub fn new(graph: &'a MultiLayeredGraph, util: &NetworkUtilization) -> Self {
        Self {
            graph,
            link_utilization: metrics::link_utilization(graph, util),
            average_utilization: 0.0,
            hyper_cycle: 0,
        }
    }
}

impl ConfigRater for BalancedNetworkUtilizationRating<'_> {
    fn prepare(&mut self) {
        self.average_utilization = metrics::average_link_utilization(&self.link_utilization);
        self.hyper_cycle = timing::hyper_cycle(self.graph);
    }

    fn rate(&mut self, config: ConfigId) -> f32 {
        let config = self.graph.configuration(config);
        let flow = self.graph.flow(config.flow);

        let added_traffic =
            transmission_delay(flow.frame_size) * (self.hyper_cycle / flow.period);
        let num_links = self.link_utilization.len() as f32;
        let updated_average =
            (self.average_utilization * num_links + added_traffic as f32) / num_links;

        config
            .path
            .iter()
            .map(|link| {
                let updated = (self.link_utilization.get(link).copied().unwrap_or(0)
                    + added_traffic) as f32;
                if updated < updated_average {
                    0.0
                } else {
                    updated - updated_average
                }
            })
            .sum()
    }

    fn name(&self) -> &'static str {
        "Balanced-Network-Utilization"
    }
}
