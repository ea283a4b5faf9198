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

//! Strongly typed identifiers and the record types of the three graph layers.
//!
//! The four id types are deliberately not interchangeable. Mixing an egress
//! queue id with a plain index is the most common class of bugs in this kind
//! of arena code, so every layer gets its own newtype and all lookups go
//! through the typed accessors of [`MultiLayeredGraph`](super::MultiLayeredGraph).

use std::fmt;

/// Identifier of a network device (node) in the topology layer.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct NetworkNodeId(pub usize);

/// Identifier of a directed egress queue (the transmit side of a link).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct EgressQueueId(pub usize);

/// Identifier of a flow (a periodic source to destination stream).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct FlowId(pub usize);

/// Identifier of a configuration (one candidate path of a flow).
///
/// Configuration ids are globally unique and monotonically increasing; they
/// are never reused, not even after the owning flow was removed.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct ConfigId(pub usize);

impl fmt::Display for NetworkNodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for EgressQueueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for FlowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for ConfigId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A periodic data stream between two network devices.
#[derive(Clone, Debug)]
pub struct Flow {
    /// Id of the flow.
    pub id: FlowId,
    /// Size of a single frame in bytes.
    pub frame_size: usize,
    /// Period (and implicit deadline) in microseconds.
    pub period: usize,
    /// Device the flow originates from.
    pub source: NetworkNodeId,
    /// Device the flow is destined to.
    pub destination: NetworkNodeId,
    /// Candidate configurations of this flow, in insertion order.
    pub configs: Vec<ConfigId>,
}

/// One candidate path of a flow through the network.
#[derive(Clone, Debug)]
pub struct Configuration {
    /// Id of the configuration.
    pub id: ConfigId,
    /// The flow this configuration belongs to.
    pub flow: FlowId,
    /// Sequence of egress queues from source to destination.
    pub path: Vec<EgressQueueId>,
}

/// The transmit buffer on the outgoing side of a directed link.
#[derive(Clone, Debug)]
pub struct EgressQueue {
    /// Id of the queue (equal to its index in the dense queue array).
    pub id: EgressQueueId,
    /// The device this queue transmits towards.
    pub destination: NetworkNodeId,
    /// Configurations whose path crosses this queue (back-reference only).
    pub used_by: Vec<ConfigId>,
    /// True iff the originating device has exactly one neighbor.
    pub end_device: bool,
}
