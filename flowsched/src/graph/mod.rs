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

//! # Multi-Layered Graph
//!
//! Arena holding the three layers of the scheduling problem:
//!
//! - *Network layer*: devices numbered densely from zero, each with an ordered
//!   list of outgoing [`EgressQueue`]s, stored in CSR form (a cumulative
//!   offset array plus one dense queue array).
//! - *Flow layer*: [`Flow`]s keyed by [`FlowId`].
//! - *Configuration layer*: [`Configuration`]s keyed by [`ConfigId`].
//!
//! Flows own their configurations; egress queues only hold back-references.
//! [`MultiLayeredGraph::remove_flow`] tears down a flow, its configurations
//! and all back-references in one step, so the relations stay consistent.
//!
//! Looking up an unknown id is a precondition violation and panics.

mod types;

pub use types::{Configuration, EgressQueue, Flow};
pub use types::{ConfigId, EgressQueueId, FlowId, NetworkNodeId};

use itertools::Itertools;
use std::collections::HashMap;

/// Arena for the network topology, the flows and their configurations.
#[derive(Clone, Debug)]
pub struct MultiLayeredGraph {
    /// Flow layer.
    flows: HashMap<FlowId, Flow>,
    /// Configuration layer.
    configs: HashMap<ConfigId, Configuration>,
    /// CSR offsets into `forward_queues`, one entry per device plus a sentinel.
    forward_offsets: Vec<usize>,
    /// Dense array of all egress queues, grouped by originating device.
    forward_queues: Vec<EgressQueue>,
    /// Next configuration id to hand out. Monotonic, never reused.
    config_counter: usize,
}

impl Default for MultiLayeredGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl MultiLayeredGraph {
    /// Create an empty graph without any devices or flows.
    pub fn new() -> Self {
        Self {
            flows: HashMap::new(),
            configs: HashMap::new(),
            forward_offsets: vec![0],
            forward_queues: Vec::new(),
            config_counter: 0,
        }
    }

    /// Number of flows currently stored.
    pub fn num_flows(&self) -> usize {
        self.flows.len()
    }

    /// Number of configurations currently stored.
    pub fn num_configs(&self) -> usize {
        self.configs.len()
    }

    /// Number of network devices.
    pub fn num_nodes(&self) -> usize {
        self.forward_offsets.len() - 1
    }

    /// Number of egress queues over all devices.
    pub fn num_queues(&self) -> usize {
        self.forward_queues.len()
    }

    /// Append a device and one egress queue per neighbor to the network layer.
    ///
    /// The device gets the next free node id; its queues are marked as
    /// end-device queues iff the device has exactly one neighbor. The CSR
    /// insert assumes gap-less node enumeration in insertion order.
    pub fn insert_network_device(&mut self, neighbors: &[NetworkNodeId]) {
        let next_offset = *self.forward_offsets.last().expect("offset array is never empty");
        self.forward_offsets.push(next_offset + neighbors.len());

        let end_device = neighbors.len() == 1;
        for &neighbor in neighbors {
            let id = EgressQueueId(self.forward_queues.len());
            self.forward_queues.push(EgressQueue {
                id,
                destination: neighbor,
                used_by: Vec::new(),
                end_device,
            });
        }
    }

    /// The egress queues originating at the given device, as a CSR slice.
    pub fn egress_queues_of(&self, device: NetworkNodeId) -> &[EgressQueue] {
        let start = self.forward_offsets[device.0];
        let end = self.forward_offsets[device.0 + 1];
        &self.forward_queues[start..end]
    }

    /// The egress queue with the given id.
    pub fn egress_queue(&self, queue: EgressQueueId) -> &EgressQueue {
        &self.forward_queues[queue.0]
    }

    /// All egress queues of the network, ordered by id.
    pub fn egress_queues(&self) -> &[EgressQueue] {
        &self.forward_queues
    }

    /// The flow with the given id. Panics on an unknown id.
    pub fn flow(&self, id: FlowId) -> &Flow {
        self.flows
            .get(&id)
            .unwrap_or_else(|| panic!("unknown flow id: {:?}", id))
    }

    /// All flows, keyed by id.
    pub fn flows(&self) -> &HashMap<FlowId, Flow> {
        &self.flows
    }

    /// All flow ids in ascending order.
    ///
    /// Hash map iteration order is unspecified; every algorithm whose result
    /// depends on flow order must go through this accessor.
    pub fn sorted_flow_ids(&self) -> Vec<FlowId> {
        self.flows.keys().copied().sorted().collect()
    }

    /// The configuration with the given id. Panics on an unknown id.
    pub fn configuration(&self, id: ConfigId) -> &Configuration {
        self.configs
            .get(&id)
            .unwrap_or_else(|| panic!("unknown configuration id: {:?}", id))
    }

    /// All configurations, keyed by id.
    pub fn configurations(&self) -> &HashMap<ConfigId, Configuration> {
        &self.configs
    }

    /// All configuration ids in ascending order.
    pub fn sorted_config_ids(&self) -> Vec<ConfigId> {
        self.configs.keys().copied().sorted().collect()
    }

    /// Add a flow to the flow layer. This creates no configurations.
    pub fn add_flow(&mut self, flow: Flow) {
        self.flows.insert(flow.id, flow);
    }

    /// Remove a flow, all its configurations and all back-references.
    ///
    /// Removing an unknown flow is a no-op.
    pub fn remove_flow(&mut self, id: FlowId) {
        let Some(flow) = self.flows.remove(&id) else {
            return;
        };
        for config_id in flow.configs {
            if let Some(config) = self.configs.remove(&config_id) {
                for queue_id in config.path {
                    self.forward_queues[queue_id.0].used_by.retain(|c| *c != config_id);
                }
            }
        }
    }

    /// Remove several flows at once, see [`MultiLayeredGraph::remove_flow`].
    pub fn remove_flows(&mut self, flows: &[FlowId]) {
        for &flow_id in flows {
            self.remove_flow(flow_id);
        }
    }

    /// Create a configuration holding the given path and wire up all relations.
    ///
    /// The new configuration gets the next global id, is appended to the
    /// owning flow's candidate list, and is registered in the `used_by` list
    /// of every queue on the path. The path is stored exactly once (in the
    /// configuration arena); the back-references only carry the new id.
    ///
    /// Panics if the flow is unknown.
    pub fn insert_configuration(&mut self, flow: FlowId, path: Vec<EgressQueueId>) -> ConfigId {
        let id = ConfigId(self.config_counter);
        self.config_counter += 1;

        for queue_id in &path {
            self.forward_queues[queue_id.0].used_by.push(id);
        }
        self.configs.insert(id, Configuration { id, flow, path });
        self.flows
            .get_mut(&flow)
            .unwrap_or_else(|| panic!("unknown flow id: {:?}", flow))
            .configs
            .push(id);

        id
    }
}
