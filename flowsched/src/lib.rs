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

#![deny(missing_docs)]

//! # Flowsched: Offline Scheduling of Time-Triggered Flows
//!
//! This library computes time-triggered transmission schedules for
//! deterministic Ethernet networks (Time-Sensitive Networking). Given a
//! topology and a scenario of time steps that add and remove periodic
//! flows, it maintains a per-egress-queue timetable of reserved
//! transmission windows such that every admitted flow meets its deadline.
//!
//! ## Structure
//!
//! - **[`graph`]**: the [`MultiLayeredGraph`](graph::MultiLayeredGraph)
//!   arena holding topology (as CSR), flows and candidate configurations,
//!   all addressed through strongly typed ids.
//!
//! - **[`utilization`]**: the
//!   [`NetworkUtilization`](utilization::NetworkUtilization) list keeping
//!   complementary free and reserved slots per egress queue, with the
//!   transmission-opportunity search at its center.
//!
//! - **[`placement`]**: window-selection strategies (ASAP, Balanced,
//!   Hermes) that reserve slots for one flow along one candidate path.
//!
//! - **[`sorting`]** and **[`rating`]**: pluggable flow orderings and
//!   configuration scorings feeding the heuristic schedulers.
//!
//! - **[`schedulers`]**: the scheduling algorithms (H2S, CELF, EDF,
//!   FirstFit, Hermes) behind the common
//!   [`Scheduler`](schedulers::Scheduler) trait.
//!
//! - **[`routing`]**: the candidate-path oracle
//!   ([`DijkstraOverlap`](routing::DijkstraOverlap),
//!   [`KShortest`](routing::KShortest)).
//!
//! - **[`scenario`]**: the driver that replays a scenario, orchestrating
//!   defensive and offensive planning per time step.
//!
//! - **[`verifier`]**: an independent re-simulation proving the finished
//!   schedule obeys every structural and temporal invariant.
//!
//! - **[`io`]** and **[`metrics`]**: input parsing, result records and
//!   derived statistics.
//!
//! ## Usage
//!
//! ```no_run
//! use flowsched::io;
//! use flowsched::placement::PlacementKind;
//! use flowsched::rating::ConfigRaterKind;
//! use flowsched::routing::DijkstraOverlap;
//! use flowsched::scenario::{self, RunSettings};
//! use flowsched::schedulers::H2sScheduler;
//! use flowsched::sorting::FlowSorterKind;
//!
//! fn main() -> Result<(), flowsched::Error> {
//!     let mut graph = io::parse_network_graph("network.txt")?;
//!     let scenario_steps = io::parse_scenario("scenario.json")?;
//!
//!     let mut solver = H2sScheduler::new(
//!         FlowSorterKind::LowPeriodFirst,
//!         ConfigRaterKind::PathLength,
//!         PlacementKind::Balanced,
//!     );
//!     let navigator = DijkstraOverlap::new();
//!     let settings = RunSettings::default();
//!     let mut run_log = io::RunLog::new(
//!         "network.txt",
//!         "scenario.json",
//!         PlacementKind::Balanced,
//!         settings.candidate_paths,
//!     );
//!
//!     scenario::run_scenario(
//!         &settings,
//!         scenario_steps,
//!         &mut graph,
//!         &mut solver,
//!         &navigator,
//!         &mut run_log,
//!     )?;
//!     run_log.print_pretty();
//!     Ok(())
//! }
//! ```

mod test;

mod error;
pub mod graph;
pub mod io;
pub mod metrics;
pub mod placement;
pub mod rating;
pub mod routing;
pub mod scenario;
pub mod schedulers;
pub mod sorting;
pub mod timing;
pub mod utilization;
pub mod verifier;

pub use error::Error;
