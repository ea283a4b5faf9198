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

use crate::error::Error;
use crate::graph::{Flow, FlowId, MultiLayeredGraph, NetworkNodeId};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// One step of a scenario: flows leaving and entering the network at `time`.
#[derive(Clone, Debug)]
pub struct TimeStep {
    /// Time of the step (scenario time units).
    pub time: usize,
    /// Flows entering the network. Their configuration lists are empty; the
    /// driver fills them through the routing oracle.
    pub add_flows: Vec<Flow>,
    /// Flows leaving the network.
    pub remove_flows: Vec<FlowId>,
}

/// Parse a network graph from an edge-list file.
///
/// See [`parse_network_from_str`] for the accepted format.
pub fn parse_network_graph(path: impl AsRef<Path>) -> Result<MultiLayeredGraph, Error> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .map_err(|_| Error::MissingResource(path.display().to_string()))?;
    Ok(parse_network_from_str(&content))
}

/// Parse a network graph from edge-list text.
///
/// One undirected edge per line, two non-negative integers separated by any
/// non-digit characters. Lines starting with `#` or `%` are comments.
/// Duplicate edges are dropped, nodes are numbered densely from 0, and every
/// edge produces one egress queue per direction. The adjacency of each node
/// is sorted before it enters the CSR, so queue ids are stable.
pub fn parse_network_from_str(content: &str) -> MultiLayeredGraph {
    let mut adjacency: Vec<Vec<NetworkNodeId>> = Vec::new();

    for line in content.lines() {
        if line.starts_with('#') || line.starts_with('%') {
            continue;
        }
        let mut rest = line;
        let Some(first) = extract_next_integer(&mut rest) else {
            continue;
        };
        let Some(second) = extract_next_integer(&mut rest) else {
            continue;
        };
        let (node1, node2) = (NetworkNodeId(first), NetworkNodeId(second));

        let needed = node1.0.max(node2.0) + 1;
        if adjacency.len() < needed {
            adjacency.resize(needed, Vec::new());
        }
        if !adjacency[node1.0].contains(&node2) {
            adjacency[node1.0].push(node2);
        }
        if !adjacency[node2.0].contains(&node1) {
            adjacency[node2.0].push(node1);
        }
    }

    let mut graph = MultiLayeredGraph::new();
    for neighbors in &mut adjacency {
        neighbors.sort();
        graph.insert_network_device(neighbors);
    }
    graph
}

/// Take the next run of digits from `line`, skipping any non-digit prefix.
fn extract_next_integer(line: &mut &str) -> Option<usize> {
    let start = line.find(|c: char| c.is_ascii_digit())?;
    let digits: String = line[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    *line = &line[start + digits.len()..];
    digits.parse().ok()
}

#[derive(Deserialize)]
struct ScenarioFile {
    time_steps: Vec<RawTimeStep>,
}

#[derive(Deserialize)]
struct RawTimeStep {
    time: usize,
    #[serde(rename = "removeFlows")]
    remove_flows: Vec<usize>,
    #[serde(rename = "addFlows")]
    add_flows: Vec<RawFlow>,
}

#[derive(Deserialize)]
struct RawFlow {
    #[serde(rename = "flowID")]
    flow_id: usize,
    #[serde(rename = "package size")]
    frame_size: usize,
    period: usize,
    source: usize,
    destination: usize,
}

/// Parse a scenario from a JSON file.
pub fn parse_scenario(path: impl AsRef<Path>) -> Result<Vec<TimeStep>, Error> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .map_err(|_| Error::MissingResource(path.display().to_string()))?;
    parse_scenario_from_str(&content)
}

/// Parse a scenario from JSON text.
///
/// The document holds a single field `time_steps`, an ordered list of
/// objects with `time`, `removeFlows` and `addFlows` entries.
pub fn parse_scenario_from_str(content: &str) -> Result<Vec<TimeStep>, Error> {
    let file: ScenarioFile = serde_json::from_str(content)?;
    Ok(file
        .time_steps
        .into_iter()
        .map(|step| TimeStep {
            time: step.time,
            add_flows: step
                .add_flows
                .into_iter()
                .map(|flow| Flow {
                    id: FlowId(flow.flow_id),
                    frame_size: flow.frame_size,
                    period: flow.period,
                    source: NetworkNodeId(flow.source),
                    destination: NetworkNodeId(flow.destination),
                    configs: Vec::new(),
                })
                .collect(),
            remove_flows: step.remove_flows.into_iter().map(FlowId).collect(),
        })
        .collect())
}
