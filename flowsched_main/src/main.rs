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

use clap::Parser;
use flowsched::io::{self, RunLog};
use flowsched::placement::PlacementKind;
use flowsched::rating::{CelfRaterKind, ConfigRaterKind};
use flowsched::routing::{DijkstraOverlap, KShortest, Navigator};
use flowsched::scenario::{run_scenario, RunSettings};
use flowsched::schedulers::{
    CelfScheduler, EdfScheduler, FirstFitScheduler, H2sScheduler, HermesScheduler, Scheduler,
};
use flowsched::sorting::FlowSorterKind;
use log::info;
use std::error::Error;
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(name = "flowsched", about = "Time-triggered flow scheduling for TSN networks")]
struct Args {
    /// File path to the network graph as edge list.
    #[arg(short = 'n', long)]
    network: String,

    /// File path to the scenario as json.
    #[arg(short = 's', long)]
    scenario: String,

    /// Print the results non pretty for machine parsing.
    #[arg(short = 'r', long = "print-raw")]
    print_raw: bool,

    /// The algorithm/strategy to be used (H2S, CELF, EDF, FF, HERMES).
    #[arg(short = 'a', long, default_value = "H2S")]
    algorithm: String,

    /// The routing algorithm to be used (DIJKSTRA_OVERLAP, K_SHORTEST).
    #[arg(long, default_value = "DIJKSTRA_OVERLAP")]
    routing: String,

    /// Select the configuration rating heuristic.
    #[arg(short = 'c', long = "configuration-rating", default_value_t = 1)]
    configuration_rating: usize,

    /// Select the flow sorting heuristic.
    #[arg(short = 'f', long = "flow-sorting", default_value_t = 4)]
    flow_sorting: usize,

    /// Execute offensive planning when defensive planning cannot schedule
    /// all flows.
    #[arg(short = 'o', long = "offensive-planning")]
    offensive_planning: bool,

    /// Configuration placement for H2S and CELF (ASAP: 0, BALANCED: 1,
    /// HERMES: 2).
    #[arg(short = 'p', long = "configuration-placement", default_value_t = 1)]
    configuration_placement: usize,

    /// Number of candidate paths to be considered for routing. Some
    /// algorithms overwrite this value.
    #[arg(long = "candidate-paths", default_value_t = 5)]
    candidate_paths: usize,

    /// Double check the schedule after every time step (development flag).
    #[arg(long = "verify-schedule")]
    verify_schedule: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
    pretty_env_logger::init();
    let mut args = Args::parse();

    let algorithm = args.algorithm.to_uppercase();
    let greedy_celf = algorithm == "CELF"
        && CelfRaterKind::from_index(args.configuration_rating)
            == CelfRaterKind::LowPeriodLongPaths;
    if algorithm == "HERMES" || greedy_celf {
        args.candidate_paths = 1;
    }

    if !args.print_raw {
        println!("Start Flowsched");
        println!("Network path: {}\nScenario path: {}", args.network, args.scenario);
    }

    let placement = PlacementKind::from_index(args.configuration_placement)
        .unwrap_or(PlacementKind::Balanced);
    let mut run_log = RunLog::new(
        args.network.clone(),
        args.scenario.clone(),
        placement,
        args.candidate_paths,
    );

    let parse_timer = Instant::now();
    let mut graph = io::parse_network_graph(&args.network)?;
    let scenario = io::parse_scenario(&args.scenario)?;
    if !args.print_raw {
        println!("Network read after {}s", parse_timer.elapsed().as_secs_f64());
    }
    info!(
        "network: {} nodes, {} egress queues",
        graph.num_nodes(),
        graph.num_queues()
    );

    let mut solver: Box<dyn Scheduler> = match algorithm.as_str() {
        "CELF" => Box::new(CelfScheduler::new(
            CelfRaterKind::from_index(args.configuration_rating),
            placement,
        )),
        "EDF" => Box::new(EdfScheduler::new()),
        "FF" | "FIRSTFIT" => Box::new(FirstFitScheduler::new()),
        "HERMES" => Box::new(HermesScheduler::new()),
        _ => Box::new(H2sScheduler::new(
            FlowSorterKind::from_index(args.flow_sorting),
            ConfigRaterKind::from_index(args.configuration_rating),
            placement,
        )),
    };

    let navigator: Box<dyn Navigator> = match args.routing.to_uppercase().as_str() {
        "K_SHORTEST" => Box::new(KShortest::new()),
        _ => Box::new(DijkstraOverlap::new()),
    };

    let settings = RunSettings {
        candidate_paths: args.candidate_paths,
        offensive_planning: args.offensive_planning,
        verify_schedule: args.verify_schedule,
    };

    let scenario_timer = Instant::now();
    run_scenario(
        &settings,
        scenario,
        &mut graph,
        solver.as_mut(),
        navigator.as_ref(),
        &mut run_log,
    )?;
    let scenario_time = scenario_timer.elapsed().as_secs_f64();

    if args.print_raw {
        run_log.print_raw();
    } else {
        run_log.print_pretty();
        println!("total scenario runtime: {}s", scenario_time);
    }
    Ok(())
}
