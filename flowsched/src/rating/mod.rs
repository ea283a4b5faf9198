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

//! # Configuration Rating
//!
//! Scoring strategies for candidate configurations. Two families exist:
//!
//! - [`config`]: scalar ratings for the hierarchical heuristic scheduler;
//!   smaller is better.
//! - [`celf`]: rating pairs for the lazy-greedy CELF scheduler; larger is
//!   better, the second component only breaks ties.

pub mod celf;
pub mod config;

pub use celf::{celf_rater, CelfRater, CelfRaterKind};
pub use config::{config_rater, ConfigRater, ConfigRaterKind};

use crate::graph::{ConfigId, MultiLayeredGraph};
use crate::timing::{transmission_delay, PROCESSING_DELAY, PROPAGATION_DELAY};
use crate::utilization::NetworkUtilization;

/// Result of a hypothetical as-soon-as-possible walk of one configuration.
pub(crate) struct AsapWalk {
    /// First-hop transmission start per frame.
    pub first_hop_sends: Vec<usize>,
    /// Arrival tick behind the last hop per frame.
    pub final_arrivals: Vec<usize>,
}

/// Simulate placing every frame of a configuration as early as possible
/// without reserving anything.
///
/// Returns `None` if any frame cannot make its deadline on the current free
/// slots. Used by the end-to-end delay raters to estimate queueing delays.
pub(crate) fn simulate_asap_walk(
    graph: &MultiLayeredGraph,
    util: &NetworkUtilization,
    config_id: ConfigId,
) -> Option<AsapWalk> {
    let config = graph.configuration(config_id);
    let flow = graph.flow(config.flow);
    let hyper_cycle = crate::timing::hyper_cycle(graph);
    let frames = hyper_cycle / flow.period;
    let delay = transmission_delay(flow.frame_size);

    let mut arrivals: Vec<usize> = (0..frames).map(|i| i * flow.period).collect();
    let mut first_hop_sends = Vec::with_capacity(frames);

    for &queue in &config.path {
        let last_hop = config.path.last() == Some(&queue);
        for frame in 0..frames {
            let arrival = arrivals[frame];
            let deadline = (frame + 1) * flow.period;
            let switching = if last_hop { 0 } else { PROCESSING_DELAY };

            let slot = util.free_slots()[queue.0].iter().find(|slot| {
                let send = slot.start.max(arrival);
                // the slot has not ended before the frame arrives
                slot.last_free_tick >= arrival
                    // transmission and handover complete before the deadline
                    && send + delay + PROPAGATION_DELAY + switching <= deadline
                    // the slot is long enough for the frame
                    && slot.last_free_tick + 1 >= send + delay
            })?;

            let send = slot.start.max(arrival);
            if first_hop_sends.len() < frame + 1 {
                first_hop_sends.push(send);
            }
            arrivals[frame] = send + delay + PROPAGATION_DELAY + PROCESSING_DELAY;
        }
    }

    Some(AsapWalk { first_hop_sends, final_arrivals: arrivals })
}
