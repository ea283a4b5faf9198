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

use super::{dijkstra_shortest_path, Navigator, WeightMap};
use crate::graph::{EgressQueueId, MultiLayeredGraph, NetworkNodeId};

/// Weight that effectively removes an edge from the shortest-path search.
const LARGE_NUMBER: i64 = 1_000_000;

/// Yen's k-shortest-paths on hop counts.
///
/// Spur paths are generated by logically removing the edges of already
/// found routes (and the nodes of the root path) through large edge
/// weights; spur paths that still use a removed edge are discarded.
pub struct KShortest;

impl KShortest {
    /// Create the navigator.
    pub fn new() -> Self {
        Self
    }

    /// Make every outgoing edge of `node` unattractive for the next search.
    fn remove_node(
        &self,
        node: NetworkNodeId,
        graph: &MultiLayeredGraph,
        weights: &mut WeightMap,
    ) {
        for link in graph.egress_queues_of(node) {
            weights.insert(link.id, LARGE_NUMBER);
        }
    }
}

impl Default for KShortest {
    fn default() -> Self {
        Self::new()
    }
}

impl Navigator for KShortest {
    fn name(&self) -> &'static str {
        "kShortest"
    }

    fn find_routes(
        &self,
        source: NetworkNodeId,
        destination: NetworkNodeId,
        graph: &MultiLayeredGraph,
        count: usize,
    ) -> Vec<Vec<EgressQueueId>> {
        let mut weights = WeightMap::new();
        let Some(shortest) = dijkstra_shortest_path(source, destination, graph, &weights) else {
            return Vec::new();
        };

        let mut accepted: Vec<Vec<EgressQueueId>> = vec![shortest];
        let mut candidates: Vec<Vec<EgressQueueId>> = Vec::new();

        for _ in 1..count {
            let previous_route = accepted
                .last()
                .expect("the accepted list always holds the initial route")
                .clone();
            let mut spur_node = source;

            for index in 0..previous_route.len() {
                // nodes from the source up to the spur node
                let root_path = &previous_route[..index];

                // remove the edges of every accepted route sharing this root
                for route in &accepted {
                    let shared = route.len().min(root_path.len());
                    if route[..shared] == root_path[..shared] {
                        if let Some(&edge) = route.get(shared) {
                            weights.insert(edge, LARGE_NUMBER);
                        }
                    }
                }

                // remove the root path nodes, keeping the spur node itself
                let mut previous_node = source;
                for &hop in root_path {
                    self.remove_node(previous_node, graph, &mut weights);
                    previous_node = graph.egress_queue(hop).destination;
                }

                if let Some(spur_path) =
                    dijkstra_shortest_path(spur_node, destination, graph, &weights)
                {
                    // paths over removed edges are no detour, drop them
                    let valid = !spur_path.iter().any(|hop| weights.contains_key(hop));
                    let mut total_path = root_path.to_vec();
                    total_path.extend(spur_path);
                    if valid && !candidates.contains(&total_path) {
                        candidates.push(total_path);
                    }
                }

                weights.clear();
                spur_node = graph.egress_queue(previous_route[index]).destination;
            }

            if candidates.is_empty() {
                // no spur paths left, the network offers no more distinct routes
                break;
            }

            candidates.sort_by_key(|path| path.len());
            accepted.push(candidates.remove(0));
        }

        accepted
    }
}
