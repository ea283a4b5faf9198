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

//! # Scenario Driver
//!
//! Replays a scenario time step by time step against one scheduler:
//!
//! 1. Apply the removals to the utilization, the graph and the active set.
//! 2. Ask the routing oracle for candidate paths of every added flow and
//!    insert one configuration per path.
//! 3. *Defensive planning*: schedule the new flows around the active ones,
//!    mutating the live utilization directly.
//! 4. *Offensive planning* (optional, only when defensive planning left
//!    flows behind): re-plan everything on a fresh utilization, allowed to
//!    move the active flows.
//! 5. Adopt whichever solution carries more traffic (ties keep defensive),
//!    prune rejected flows from the graph, and verify the schedule if
//!    requested.
//!
//! Every step emits three result records: defensive, offensive (or
//! "skipped") and aggregated.

use crate::error::Error;
use crate::graph::{FlowId, MultiLayeredGraph};
use crate::io::{MetaDataLog, RunLog, TimeStep};
use crate::metrics;
use crate::routing::Navigator;
use crate::schedulers::Scheduler;
use crate::timing;
use crate::utilization::NetworkUtilization;
use crate::verifier;
use log::{debug, info};
use std::collections::HashSet;
use std::time::Instant;

/// Behavior switches of a scenario run.
#[derive(Clone, Debug)]
pub struct RunSettings {
    /// How many candidate paths the routing oracle is asked for per flow.
    pub candidate_paths: usize,
    /// Whether offensive planning may disturb already admitted flows.
    pub offensive_planning: bool,
    /// Whether every time step's final schedule is re-verified.
    pub verify_schedule: bool,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self { candidate_paths: 5, offensive_planning: false, verify_schedule: false }
    }
}

/// Run a whole scenario against the given scheduler and routing oracle.
///
/// The result records are appended to `run_log`; the strategy and routing
/// names are filled in. Fails on a verifier violation.
pub fn run_scenario(
    settings: &RunSettings,
    scenario: Vec<TimeStep>,
    graph: &mut MultiLayeredGraph,
    solver: &mut dyn Scheduler,
    navigator: &dyn Navigator,
    run_log: &mut RunLog,
) -> Result<(), Error> {
    run_log.strategy = solver.name();
    run_log.routing = navigator.name().to_string();

    let hyper_cycle = timing::lcm_all(scenario_periods(&scenario));
    let sub_cycle = timing::gcd_all(scenario_periods(&scenario));
    info!("hyper cycle: {} us, sub cycle: {} us", hyper_cycle, sub_cycle);

    let mut utilization = NetworkUtilization::new(graph.num_queues(), hyper_cycle, sub_cycle);
    let mut active_flows: HashSet<FlowId> = HashSet::new();

    for time_step in scenario {
        let time = time_step.time;
        let config_timer = Instant::now();
        let required = apply_flow_changes(
            graph,
            time_step,
            navigator,
            settings.candidate_paths,
            &mut utilization,
            &mut active_flows,
        );
        let config_time = config_timer.elapsed().as_secs_f64();
        debug!("time step {}: {} required flows", time, required.len());

        // defensive planning
        let defensive_timer = Instant::now();
        let defensive_solution =
            solver.solve(graph, &HashSet::new(), &required, &mut utilization);
        let defensive_solve_time = defensive_timer.elapsed().as_secs_f64();

        let table_sizes = metrics::scheduling_table_sizes(&utilization);
        let mut defensive_log = MetaDataLog {
            flows_scheduled: defensive_solution.len() + active_flows.len(),
            flows_total: graph.num_flows(),
            config_time,
            solving_time: defensive_solve_time,
            time_step: time,
            planning_mode: "defensive",
            traffic: metrics::ingress_traffic(graph, active_flows.iter().copied())
                + metrics::ingress_traffic(graph, defensive_solution.iter().map(|(f, _)| *f)),
            number_of_frames: metrics::number_of_frames(
                graph,
                defensive_solution.iter().map(|(f, _)| *f),
            ) + metrics::number_of_frames(graph, active_flows.iter().copied()),
            max_queue_size: metrics::max_queue_size(&mut utilization, graph),
            avg_scheduling_table_size: metrics::average(&table_sizes),
            max_scheduling_table_size: table_sizes.iter().copied().max().unwrap_or(0),
        };

        // offensive planning
        let offensive_timer = Instant::now();
        let mut offensive_utilization =
            NetworkUtilization::new(graph.num_queues(), hyper_cycle, sub_cycle);
        let offensive_required = defensive_solution.len() < required.len();
        let offensive_solution = if offensive_required && settings.offensive_planning {
            solver.solve(graph, &active_flows, &required, &mut offensive_utilization)
        } else {
            Vec::new()
        };
        let offensive_solve_time = offensive_timer.elapsed().as_secs_f64();

        let table_sizes = metrics::scheduling_table_sizes(&offensive_utilization);
        let mut offensive_log = MetaDataLog {
            flows_scheduled: offensive_solution.len(),
            flows_total: graph.num_flows(),
            config_time,
            solving_time: offensive_solve_time,
            time_step: time,
            planning_mode: if offensive_required && settings.offensive_planning {
                "offensive"
            } else {
                "skipped"
            },
            traffic: metrics::ingress_traffic(graph, offensive_solution.iter().map(|(f, _)| *f)),
            number_of_frames: metrics::number_of_frames(
                graph,
                offensive_solution.iter().map(|(f, _)| *f),
            ),
            max_queue_size: metrics::max_queue_size(&mut offensive_utilization, graph),
            avg_scheduling_table_size: metrics::average(&table_sizes),
            max_scheduling_table_size: table_sizes.iter().copied().max().unwrap_or(0),
        };

        // adopt one of the two solutions
        let post_timer = Instant::now();
        let use_defensive = defensive_solution.len() == required.len()
            || defensive_log.traffic >= offensive_log.traffic;
        if use_defensive {
            for (flow_id, _) in &defensive_solution {
                active_flows.insert(*flow_id);
            }
        } else {
            info!("time step {}: adopting the offensive solution", time);
            utilization = offensive_utilization;
            for (flow_id, _) in &offensive_solution {
                active_flows.insert(*flow_id);
            }
        }

        let table_sizes = metrics::scheduling_table_sizes(&utilization);
        let mut aggregated_log = MetaDataLog {
            flows_scheduled: active_flows.len(),
            flows_total: graph.num_flows(),
            config_time,
            solving_time: defensive_solve_time + offensive_solve_time,
            time_step: time,
            planning_mode: "aggregated",
            traffic: if use_defensive { defensive_log.traffic } else { offensive_log.traffic },
            number_of_frames: if use_defensive {
                defensive_log.number_of_frames
            } else {
                offensive_log.number_of_frames
            },
            max_queue_size: if use_defensive {
                defensive_log.max_queue_size
            } else {
                offensive_log.max_queue_size
            },
            avg_scheduling_table_size: metrics::average(&table_sizes),
            max_scheduling_table_size: table_sizes.iter().copied().max().unwrap_or(0),
        };

        if active_flows.len() < graph.num_flows() {
            remove_rejected_flows(graph, &active_flows);
        }
        let post_time = post_timer.elapsed().as_secs_f64();
        defensive_log.config_time += post_time;
        offensive_log.config_time += post_time;
        aggregated_log.config_time += post_time;

        run_log.add(defensive_log);
        run_log.add(offensive_log);
        run_log.add(aggregated_log);

        if settings.verify_schedule {
            verifier::verify_schedule(&utilization, graph, hyper_cycle)?;
        }
    }

    utilization.clear();
    Ok(())
}

/// All periods occurring anywhere in the scenario.
fn scenario_periods(scenario: &[TimeStep]) -> impl Iterator<Item = usize> + '_ {
    scenario
        .iter()
        .flat_map(|step| step.add_flows.iter().map(|flow| flow.period))
}

/// Apply one time step's removals and additions. Returns the set of flows
/// that need to be scheduled.
fn apply_flow_changes(
    graph: &mut MultiLayeredGraph,
    time_step: TimeStep,
    navigator: &dyn Navigator,
    candidate_paths: usize,
    utilization: &mut NetworkUtilization,
    active_flows: &mut HashSet<FlowId>,
) -> HashSet<FlowId> {
    utilization.remove_configs(&time_step.remove_flows);
    for flow_id in &time_step.remove_flows {
        graph.remove_flow(*flow_id);
        active_flows.remove(flow_id);
    }

    let mut required = HashSet::new();
    for flow in time_step.add_flows {
        let routes =
            navigator.find_routes(flow.source, flow.destination, graph, candidate_paths);
        let flow_id = flow.id;
        graph.add_flow(flow);
        required.insert(flow_id);

        for path in routes {
            graph.insert_configuration(flow_id, path);
        }
    }
    required
}

/// Drop every flow the adopted solution did not admit.
fn remove_rejected_flows(graph: &mut MultiLayeredGraph, active_flows: &HashSet<FlowId>) {
    let rejected: Vec<FlowId> = graph
        .sorted_flow_ids()
        .into_iter()
        .filter(|flow_id| !active_flows.contains(flow_id))
        .collect();
    graph.remove_flows(&rejected);
}
