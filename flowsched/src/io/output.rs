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

use crate::placement::PlacementKind;

/// The measured results of one planning phase of one time step.
#[derive(Clone, Debug)]
pub struct MetaDataLog {
    /// Number of flows admitted by this planning phase (aggregated records
    /// count all active flows).
    pub flows_scheduled: usize,
    /// Number of flows known to the graph at measurement time.
    pub flows_total: usize,
    /// Time spent on flow and configuration bookkeeping, in seconds.
    pub config_time: f64,
    /// Time spent inside the scheduler, in seconds.
    pub solving_time: f64,
    /// Scenario time of the step.
    pub time_step: usize,
    /// "defensive", "offensive", "skipped" or "aggregated".
    pub planning_mode: &'static str,
    /// Ingress traffic of the admitted flows in Mbit/s.
    pub traffic: f64,
    /// Number of frames the admitted flows transmit per hyper cycle.
    pub number_of_frames: usize,
    /// Maximum number of frames queued simultaneously at one switch port.
    pub max_queue_size: usize,
    /// Average scheduling-table length over all egress queues.
    pub avg_scheduling_table_size: f32,
    /// Largest scheduling-table length over all egress queues.
    pub max_scheduling_table_size: usize,
}

impl MetaDataLog {
    /// Tab-separated record for machine parsing. The time step is not part
    /// of the string, and the string does not end with a newline.
    pub fn to_raw_string(&self) -> String {
        format!(
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            self.planning_mode,
            self.flows_scheduled,
            self.flows_total,
            self.traffic,
            self.number_of_frames,
            self.solving_time,
            self.config_time,
            self.max_queue_size,
            self.avg_scheduling_table_size,
            self.max_scheduling_table_size,
        )
    }

    /// Labeled block for human consumption. The time step is not part of the
    /// string, and the string does not end with a newline.
    pub fn to_pretty_string(&self) -> String {
        format!(
            "Mode: {}\n\
             Flows scheduled: {}\n\
             Flows total: {}\n\
             Ingress traffic [M bit/s]: {}\n\
             Number of scheduled frames: {}\n\
             Solving time [s]: {}\n\
             Configuration time [s]: {}\n\
             Maximum queue size required: {}\n\
             Average scheduling table length: {}\n\
             Maximum scheduling table length: {}",
            self.planning_mode,
            self.flows_scheduled,
            self.flows_total,
            self.traffic,
            self.number_of_frames,
            self.solving_time,
            self.config_time,
            self.max_queue_size,
            self.avg_scheduling_table_size,
            self.max_scheduling_table_size,
        )
    }
}

/// In-memory collection of all result records of one run, flushed to stdout
/// at shutdown.
#[derive(Clone, Debug, Default)]
pub struct RunLog {
    logs: Vec<MetaDataLog>,
    /// Name of the scheduling strategy.
    pub strategy: String,
    /// Path of the network file.
    pub network: String,
    /// Path of the scenario file.
    pub scenario: String,
    /// Name of the routing algorithm.
    pub routing: String,
    /// Number of candidate routes per flow.
    pub candidate_routes: usize,
    /// Numeric selector of the placement strategy.
    pub placement: usize,
}

impl RunLog {
    /// Create an empty log for the given run parameters.
    pub fn new(
        network: impl Into<String>,
        scenario: impl Into<String>,
        placement: PlacementKind,
        candidate_routes: usize,
    ) -> Self {
        Self {
            logs: Vec::new(),
            strategy: String::new(),
            network: network.into(),
            scenario: scenario.into(),
            routing: String::new(),
            candidate_routes,
            placement: placement.index(),
        }
    }

    /// Append one record.
    pub fn add(&mut self, log: MetaDataLog) {
        self.logs.push(log);
    }

    /// The collected records in insertion order.
    pub fn records(&self) -> &[MetaDataLog] {
        &self.logs
    }

    /// Print every record as a labeled block.
    pub fn print_pretty(&self) {
        for entry in &self.logs {
            println!(
                "Time step: {}\n\
                 Network: {}\n\
                 Scenario: {}\n\
                 Routing: {}\n\
                 Candidate Routes: {}\n\
                 Strategy: {}\n\
                 Config Placement: {}\n\
                 {}\n\
                 ============================",
                entry.time_step,
                self.network,
                self.scenario,
                self.routing,
                self.candidate_routes,
                self.strategy,
                self.placement,
                entry.to_pretty_string(),
            );
        }
    }

    /// Print every record as one tab-separated line.
    pub fn print_raw(&self) {
        for entry in &self.logs {
            println!(
                "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
                entry.time_step,
                self.network,
                self.scenario,
                self.routing,
                self.candidate_routes,
                self.strategy,
                self.placement,
                entry.to_raw_string(),
            );
        }
    }
}
