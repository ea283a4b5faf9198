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
use crate::rating::{celf_rater, CelfRater, CelfRaterKind};
use crate::utilization::NetworkUtilization;
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};

/// Lazy-greedy flow queuing (CELF).
///
/// All configurations of all flows in the set compete in one max-heap keyed
/// by a [`CelfRaterKind`] rating pair. Ratings are only re-evaluated when a
/// configuration reaches the top of the heap; if the refreshed rating still
/// beats the next-best entry it is committed immediately, otherwise it is
/// pushed back and marked stale. A stale configuration that surfaces again
/// is placed without another re-evaluation.
pub struct CelfScheduler {
    rating: CelfRaterKind,
    placement: PlacementKind,
}

/// Heap entry carrying the rating it was enqueued with. Ties break towards
/// the lower configuration id.
struct CelfEntry {
    rating: (f32, f32),
    config: ConfigId,
}

impl PartialEq for CelfEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for CelfEntry {}

impl PartialOrd for CelfEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CelfEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rating
            .0
            .total_cmp(&other.rating.0)
            .then_with(|| self.rating.1.total_cmp(&other.rating.1))
            .then_with(|| other.config.cmp(&self.config))
    }
}

impl CelfScheduler {
    /// Create the scheduler with the given strategy selection.
    pub fn new(rating: CelfRaterKind, placement: PlacementKind) -> Self {
        Self { rating, placement }
    }

    fn schedule_set(
        &self,
        graph: &MultiLayeredGraph,
        flow_set: &HashSet<FlowId>,
        util: &mut NetworkUtilization,
    ) -> SolutionSet {
        let mut rater = celf_rater(self.rating, graph, util);

        // initial rating of every stored configuration
        let mut initial_ratings = std::collections::HashMap::new();
        for config_id in graph.sorted_config_ids() {
            initial_ratings.insert(config_id, rater.rate(util, config_id));
        }

        let mut heap = BinaryHeap::new();
        for flow_id in sorted_flows(flow_set) {
            for &config_id in &graph.flow(flow_id).configs {
                heap.push(CelfEntry { rating: initial_ratings[&config_id], config: config_id });
            }
        }

        let mut covered: HashSet<FlowId> = HashSet::new();
        let mut stale: HashSet<ConfigId> = HashSet::new();
        let mut solution = SolutionSet::new();

        while let Some(entry) = heap.pop() {
            let config = graph.configuration(entry.config);
            if covered.contains(&config.flow) {
                continue;
            }

            if stale.contains(&entry.config) {
                // the rating was refreshed last time; place without re-rating
                if self.commit(graph, entry.config, util, rater.as_mut(), &mut stale) {
                    covered.insert(config.flow);
                    solution.push((config.flow, entry.config));
                }
                continue;
            }

            // re-evaluate against the current utilization
            rater.prepare(util);
            let new_rating = rater.rate(util, entry.config);

            let beats_next_best = match heap.peek() {
                Some(next) => {
                    new_rating.0.total_cmp(&next.rating.0).then_with(|| {
                        new_rating.1.total_cmp(&next.rating.1)
                    }) != Ordering::Less
                }
                None => true,
            };

            if beats_next_best {
                if self.commit(graph, entry.config, util, rater.as_mut(), &mut stale) {
                    covered.insert(config.flow);
                    solution.push((config.flow, entry.config));
                }
            } else {
                heap.push(CelfEntry { rating: new_rating, config: entry.config });
                stale.insert(entry.config);
            }
        }

        solution
    }

    /// Try to place the configuration; on success clear all staleness marks
    /// and notify the rater.
    fn commit(
        &self,
        graph: &MultiLayeredGraph,
        config_id: ConfigId,
        util: &mut NetworkUtilization,
        rater: &mut dyn CelfRater,
        stale: &mut HashSet<ConfigId>,
    ) -> bool {
        let config = graph.configuration(config_id);
        let flow = graph.flow(config.flow);
        let success = place_config(config, flow, util, self.placement);
        if success {
            rater.pick(config_id);
            stale.clear();
        }
        success
    }
}

impl Scheduler for CelfScheduler {
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
        format!("CelfFlowQueuing-{}", self.rating.index())
    }
}
