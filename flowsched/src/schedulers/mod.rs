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

//! # Schedulers
//!
//! A scheduler consumes a set of *required* flows together with an existing
//! utilization list and admits a maximal subset of them, returning the
//! chosen `(flow, configuration)` pairs.
//!
//! All schedulers share the same two-phase contract. When the *active* set
//! is non-empty (offensive planning), the scheduler must first re-admit all
//! active flows into the utilization; if even one of them does not fit, the
//! scheduler returns the empty set, which tells the driver to keep the
//! defensive solution. The required set is then scheduled best effort.
//! With an empty active set (defensive planning), only the required set is
//! scheduled.
//!
//! Available schedulers:
//!
//! - **[`H2sScheduler`]**: hierarchical heuristic. Orders the flows with a
//!   [`FlowSorter`](crate::sorting::FlowSorter), rates every candidate
//!   configuration with a [`ConfigRater`](crate::rating::ConfigRater), and
//!   takes the first configuration that places successfully.
//! - **[`CelfScheduler`]**: lazy-greedy over all configurations of all
//!   flows, driven by a max-heap of
//!   [`CelfRater`](crate::rating::CelfRater) rating pairs.
//! - **[`EdfScheduler`]**: full event-driven simulation of frame forwarding
//!   with earliest-deadline-first arbitration on every egress port.
//! - **[`FirstFitScheduler`]**: flows in ascending id order, first
//!   configuration only, as-soon-as-possible placement.
//! - **[`HermesScheduler`]**: phase-ordered latest-possible placement after
//!   a reverse-topological phase labeling of all egress queues.

mod h2s;
pub use h2s::H2sScheduler;

mod celf;
pub use celf::CelfScheduler;

mod edf;
pub use edf::EdfScheduler;

mod first_fit;
pub use first_fit::FirstFitScheduler;

mod hermes;
pub use hermes::HermesScheduler;

use crate::graph::{ConfigId, FlowId, MultiLayeredGraph};
use crate::utilization::NetworkUtilization;
use itertools::Itertools;
use std::collections::HashSet;

/// The admitted flows of one planning run with their chosen configuration.
pub type SolutionSet = Vec<(FlowId, ConfigId)>;

/// Common interface of all scheduling algorithms.
pub trait Scheduler {
    /// Admit a maximal subset of `required` into `util`.
    ///
    /// A non-empty `active` set must be fully re-admitted first; failing
    /// that, the result is empty and `util` must be considered spoiled (the
    /// driver discards it).
    fn solve(
        &mut self,
        graph: &MultiLayeredGraph,
        active: &HashSet<FlowId>,
        required: &HashSet<FlowId>,
        util: &mut NetworkUtilization,
    ) -> SolutionSet;

    /// Name of the scheduler, including its parameterization.
    fn name(&self) -> String;
}

/// A flow set in ascending id order; the entry point of every scheduling
/// phase, so that results never depend on hash iteration order.
pub(crate) fn sorted_flows(set: &HashSet<FlowId>) -> Vec<FlowId> {
    set.iter().copied().sorted().collect()
}
