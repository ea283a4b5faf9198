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

//! End-to-end runs of the scenario driver.

use super::helpers::{line_topology, two_node_topology};
use crate::graph::FlowId;
use crate::io::{parse_scenario_from_str, RunLog};
use crate::placement::PlacementKind;
use crate::rating::ConfigRaterKind;
use crate::routing::DijkstraOverlap;
use crate::scenario::{run_scenario, RunSettings};
use crate::schedulers::H2sScheduler;
use crate::sorting::FlowSorterKind;

fn solver() -> H2sScheduler {
    H2sScheduler::new(
        FlowSorterKind::LowPeriodFirst,
        ConfigRaterKind::PathLength,
        PlacementKind::Balanced,
    )
}

fn settings() -> RunSettings {
    RunSettings { candidate_paths: 2, offensive_planning: false, verify_schedule: true }
}

#[test]
fn admission_and_removal_across_time_steps() {
    let scenario = parse_scenario_from_str(
        r#"{
            "time_steps": [
                {
                    "time": 0,
                    "removeFlows": [],
                    "addFlows": [
                        {"flowID": 0, "package size": 250, "period": 200, "source": 0, "destination": 3},
                        {"flowID": 1, "package size": 250, "period": 200, "source": 0, "destination": 3}
                    ]
                },
                {
                    "time": 1,
                    "removeFlows": [0],
                    "addFlows": [
                        {"flowID": 2, "package size": 250, "period": 100, "source": 1, "destination": 3}
                    ]
                }
            ]
        }"#,
    )
    .unwrap();

    let mut graph = line_topology();
    let mut solver = solver();
    let navigator = DijkstraOverlap::new();
    let mut run_log = RunLog::new("line", "inline", PlacementKind::Balanced, 2);

    run_scenario(&settings(), scenario, &mut graph, &mut solver, &navigator, &mut run_log)
        .unwrap();

    // flow 0 was removed at step 1, flows 1 and 2 stay admitted
    assert_eq!(graph.num_flows(), 2);
    assert!(graph.flows().contains_key(&FlowId(1)));
    assert!(graph.flows().contains_key(&FlowId(2)));

    assert_eq!(run_log.records().len(), 6);
    assert_eq!(run_log.records()[0].planning_mode, "defensive");
    assert_eq!(run_log.records()[0].flows_scheduled, 2);
    assert_eq!(run_log.records()[1].planning_mode, "skipped");
    assert_eq!(run_log.records()[2].planning_mode, "aggregated");
    assert_eq!(run_log.records()[3].time_step, 1);
    assert_eq!(run_log.records()[5].flows_scheduled, 2);
    assert_eq!(run_log.strategy, "H2S-4-1");
    assert_eq!(run_log.routing, "DijkstraOverlap");
}

#[test]
fn rejected_flows_are_pruned_from_the_graph() {
    // three heavy flows over one link; only the first fits its deadline
    let scenario = parse_scenario_from_str(
        r#"{
            "time_steps": [
                {
                    "time": 0,
                    "removeFlows": [],
                    "addFlows": [
                        {"flowID": 0, "package size": 6250, "period": 100, "source": 0, "destination": 1},
                        {"flowID": 1, "package size": 6250, "period": 100, "source": 0, "destination": 1},
                        {"flowID": 2, "package size": 6250, "period": 100, "source": 0, "destination": 1}
                    ]
                }
            ]
        }"#,
    )
    .unwrap();

    let mut graph = two_node_topology();
    let mut solver = solver();
    let navigator = DijkstraOverlap::new();
    let mut run_log = RunLog::new("pair", "inline", PlacementKind::Balanced, 2);

    run_scenario(&settings(), scenario, &mut graph, &mut solver, &navigator, &mut run_log)
        .unwrap();

    assert_eq!(graph.num_flows(), 1);
    assert!(graph.flows().contains_key(&FlowId(0)));
    assert_eq!(run_log.records()[0].flows_scheduled, 1);
    assert_eq!(run_log.records()[2].flows_scheduled, 1);
}

#[test]
fn removing_an_unknown_flow_is_harmless() {
    let scenario = parse_scenario_from_str(
        r#"{
            "time_steps": [
                {
                    "time": 0,
                    "removeFlows": [42],
                    "addFlows": [
                        {"flowID": 0, "package size": 250, "period": 100, "source": 0, "destination": 1}
                    ]
                }
            ]
        }"#,
    )
    .unwrap();

    let mut graph = two_node_topology();
    let mut solver = solver();
    let navigator = DijkstraOverlap::new();
    let mut run_log = RunLog::new("pair", "inline", PlacementKind::Balanced, 2);

    run_scenario(&settings(), scenario, &mut graph, &mut solver, &navigator, &mut run_log)
        .unwrap();
    assert_eq!(graph.num_flows(), 1);
}
