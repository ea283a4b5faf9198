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

/// How often a duplicate route is tolerated before the search gives up.
const DUPLICATE_PATH_LIMIT: usize = 10;

/// Repeated Dijkstra with edge-weight penalties.
///
/// After every found route, the weight of all its edges is increased, which
/// encourages the next round to pick different links. Duplicate routes are
/// discarded; after [`DUPLICATE_PATH_LIMIT`] duplicates in a row the
/// enumeration stops.
pub struct DijkstraOverlap;

impl DijkstraOverlap {
    /// Create the navigator.
    pub fn new() -> Self {
        Self
    }
}

impl Default for DijkstraOverlap {
    fn default() -> Self {
        Self::new()
    }
}

impl Navigator for DijkstraOverlap {
    fn name(&self) -> &'static str {
        "DijkstraOverlap"
    }

    fn find_routes(
        &self,
        source: NetworkNodeId,
        destination: NetworkNodeId,
        graph: &MultiLayeredGraph,
        count: usize,
    ) -> Vec<Vec<EgressQueueId>> {
        let mut edge_weights = WeightMap::new();
        let mut candidates: Vec<Vec<EgressQueueId>> = Vec::new();
        let mut duplicates = 0;

        while candidates.len() < count && duplicates < DUPLICATE_PATH_LIMIT {
            let Some(path) = dijkstra_shortest_path(source, destination, graph, &edge_weights)
            else {
                break;
            };

            for hop in &path {
                *edge_weights.entry(*hop).or_insert(1) += 2;
            }

            if candidates.contains(&path) {
                duplicates += 1;
            } else {
                candidates.push(path);
            }
        }
        candidates
    }
}
