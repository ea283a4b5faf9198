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

//! # Candidate-Path Routing
//!
//! The scenario driver treats routing as an oracle: given a source, a
//! destination and a desired count, a [`Navigator`] returns up to that many
//! distinct hop sequences. Identical source and destination yield one empty
//! path; an empty result means the destination is unreachable.

mod dijkstra_overlap;
pub use dijkstra_overlap::DijkstraOverlap;

mod k_shortest;
pub use k_shortest::KShortest;

use crate::graph::{EgressQueueId, MultiLayeredGraph, NetworkNodeId};
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

/// Additional edge weights used to steer the shortest-path search away from
/// already used or logically removed edges.
pub type WeightMap = HashMap<EgressQueueId, i64>;

/// A route enumerator producing candidate paths for new flows.
pub trait Navigator {
    /// Human readable name of the algorithm.
    fn name(&self) -> &'static str;

    /// Compute up to `count` distinct routes from `source` to `destination`.
    /// Fewer routes are returned if the network does not offer that many.
    fn find_routes(
        &self,
        source: NetworkNodeId,
        destination: NetworkNodeId,
        graph: &MultiLayeredGraph,
        count: usize,
    ) -> Vec<Vec<EgressQueueId>>;
}

/// Single-pair Dijkstra over the CSR topology.
///
/// Every edge weighs 1 unless overridden in `weights`. Returns the hop
/// sequence from `source` to `destination`, the empty path if the two
/// coincide, or `None` if the destination is unreachable.
pub(crate) fn dijkstra_shortest_path(
    source: NetworkNodeId,
    destination: NetworkNodeId,
    graph: &MultiLayeredGraph,
    weights: &WeightMap,
) -> Option<Vec<EgressQueueId>> {
    let num_nodes = graph.num_nodes();
    let mut incoming_link: Vec<Option<EgressQueueId>> = vec![None; num_nodes];
    let mut predecessor: Vec<NetworkNodeId> = vec![NetworkNodeId(0); num_nodes];
    let mut distance: Vec<i64> = vec![i64::MAX - 1_000_000; num_nodes];
    let mut settled = vec![false; num_nodes];

    let mut frontier: BinaryHeap<Reverse<(i64, usize)>> = BinaryHeap::new();
    distance[source.0] = 0;
    frontier.push(Reverse((0, source.0)));

    while let Some(Reverse((current_distance, current))) = frontier.pop() {
        if distance[destination.0] < current_distance {
            continue;
        }
        if settled[current] {
            // duplicates are pushed on relaxation, skip expanded nodes
            continue;
        }

        for link in graph.egress_queues_of(NetworkNodeId(current)) {
            let edge_weight = weights.get(&link.id).copied().unwrap_or(1);
            let next_distance = distance[current] + edge_weight;
            if next_distance < distance[link.destination.0] {
                distance[link.destination.0] = next_distance;
                incoming_link[link.destination.0] = Some(link.id);
                predecessor[link.destination.0] = NetworkNodeId(current);
                frontier.push(Reverse((next_distance, link.destination.0)));
            }
        }
        settled[current] = true;
    }

    // walk the predecessor chain back to the source
    let mut path = Vec::new();
    let mut current = destination;
    while current != source {
        let link = incoming_link[current.0]?;
        path.push(link);
        current = predecessor[current.0];
    }
    path.reverse();
    Some(path)
}
