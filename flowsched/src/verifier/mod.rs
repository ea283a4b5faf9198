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

//! # Schedule Verifier
//!
//! Independent re-simulation of a finished schedule. The verifier only reads
//! the utilization list and the graph; it proves that
//!
//! - the free slots are well formed (positive length, sorted, non-adjacent,
//!   inside the hyper cycle),
//! - the reserved slots are well formed, and
//! - free and reserved slots tile the hyper cycle exactly,
//!
//! and then replays all reserved slots in global time order to show that
//! every flow forms complete, causally consistent strands: correct frame
//! lengths, strands start at the flow's source, store-and-forward handover
//! with propagation and processing gaps, no node revisited, deadlines met,
//! and no frames beyond the flow's demand.

use crate::graph::{EgressQueueId, FlowId, MultiLayeredGraph, NetworkNodeId};
use crate::timing::{transmission_delay, PROCESSING_DELAY, PROPAGATION_DELAY};
use crate::utilization::{NetworkUtilization, ReservedSlot};
use std::collections::HashMap;
use thiserror::Error;

/// A violated schedule rule, carrying the offending queue, slot and reason.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A free slot covers less than one tick.
    #[error("free slot {index} on queue {queue} has no extent: starts at {start}, last tick {last}")]
    FreeSlotTooShort {
        /// Offending queue.
        queue: EgressQueueId,
        /// Index of the slot within the queue's free list.
        index: usize,
        /// First tick of the slot.
        start: usize,
        /// Last tick of the slot.
        last: usize,
    },
    /// Free slots are unsorted or overlap.
    #[error("free slot {index} on queue {queue} starts at {start}, before the previous slot ended")]
    FreeSlotsOutOfOrder {
        /// Offending queue.
        queue: EgressQueueId,
        /// Index of the slot within the queue's free list.
        index: usize,
        /// First tick of the slot.
        start: usize,
    },
    /// Two free slots touch and should have been merged.
    #[error("free slot {index} on queue {queue} touches its predecessor and must be merged")]
    FreeSlotsNotMerged {
        /// Offending queue.
        queue: EgressQueueId,
        /// Index of the second of the two adjacent slots.
        index: usize,
    },
    /// A free slot reaches past the hyper cycle.
    #[error("free slot {index} on queue {queue} ends at {last}, beyond the hyper cycle {hyper_cycle}")]
    FreeSlotBeyondHyperCycle {
        /// Offending queue.
        queue: EgressQueueId,
        /// Index of the slot within the queue's free list.
        index: usize,
        /// Last tick of the slot.
        last: usize,
        /// Length of the hyper cycle.
        hyper_cycle: usize,
    },
    /// A reserved slot covers less than one tick.
    #[error("reserved slot {index} on queue {queue} has no extent: starts at {start}")]
    ReservedSlotTooShort {
        /// Offending queue.
        queue: EgressQueueId,
        /// Index of the slot within the queue's reserved list.
        index: usize,
        /// First tick of the slot.
        start: usize,
    },
    /// Reserved slots are unsorted or overlap.
    #[error("reserved slot {index} on queue {queue} starts at {start}, before the previous slot ended")]
    ReservedSlotsOutOfOrder {
        /// Offending queue.
        queue: EgressQueueId,
        /// Index of the slot within the queue's reserved list.
        index: usize,
        /// First tick of the slot.
        start: usize,
    },
    /// A reserved slot reaches past the hyper cycle.
    #[error("reserved slot {index} on queue {queue} ends at {end}, beyond the hyper cycle {hyper_cycle}")]
    ReservedSlotBeyondHyperCycle {
        /// Offending queue.
        queue: EgressQueueId,
        /// Index of the slot within the queue's reserved list.
        index: usize,
        /// First tick after the slot.
        end: usize,
        /// Length of the hyper cycle.
        hyper_cycle: usize,
    },
    /// Free and reserved slots leave a gap or overlap.
    #[error("free and reserved slots of queue {queue} are not complementary at tick {tick}")]
    SlotsNotComplementary {
        /// Offending queue.
        queue: EgressQueueId,
        /// First tick not covered by either list.
        tick: usize,
    },
    /// The queue has no reverse queue, the topology is not full duplex.
    #[error("queue {queue} has no reverse direction, the topology is not full duplex")]
    NotFullDuplex {
        /// Offending queue.
        queue: EgressQueueId,
    },
    /// A flow period is zero.
    #[error("flow {flow} has a period of zero")]
    InvalidPeriod {
        /// Offending flow.
        flow: FlowId,
    },
    /// The hyper cycle is not a multiple of a flow period.
    #[error("the period of flow {flow} does not divide the hyper cycle")]
    PeriodNotDividingHyperCycle {
        /// Offending flow.
        flow: FlowId,
    },
    /// A frame shows up although its flow already completed all strands.
    #[error("queue {queue} carries a frame of flow {flow} although the flow already completed")]
    StrayFrame {
        /// Offending queue.
        queue: EgressQueueId,
        /// Offending flow.
        flow: FlowId,
    },
    /// A reservation is shorter or longer than the frame requires.
    #[error("a frame of flow {flow} on queue {queue} spans {actual} ticks instead of {expected}")]
    FrameLengthMismatch {
        /// Offending queue.
        queue: EgressQueueId,
        /// Offending flow.
        flow: FlowId,
        /// Required transmission time.
        expected: usize,
        /// Reserved transmission time.
        actual: usize,
    },
    /// A frame lies outside the window of its strand.
    #[error("a frame of flow {flow} on queue {queue} (ticks {start}..{end}) leaves its strand window")]
    FrameOutsideStrand {
        /// Offending queue.
        queue: EgressQueueId,
        /// Offending flow.
        flow: FlowId,
        /// First tick of the frame.
        start: usize,
        /// First tick after the frame.
        end: usize,
    },
    /// A strand starts at a node other than the flow's source.
    #[error("a strand of flow {flow} starts on queue {queue} instead of node {expected}")]
    WrongSourceNode {
        /// Offending queue.
        queue: EgressQueueId,
        /// Offending flow.
        flow: FlowId,
        /// The flow's source node.
        expected: NetworkNodeId,
    },
    /// A frame is forwarded by a node that does not hold it.
    #[error("flow {flow} is forwarded on queue {queue} although node {holder} buffers the frame")]
    WrongHandover {
        /// Offending queue.
        queue: EgressQueueId,
        /// Offending flow.
        flow: FlowId,
        /// The node that actually holds the frame.
        holder: NetworkNodeId,
    },
    /// A frame is forwarded before it was fully received.
    #[error("flow {flow} is sent on queue {queue} at tick {start}, before it is available at {available}")]
    ForwardedTooEarly {
        /// Offending queue.
        queue: EgressQueueId,
        /// Offending flow.
        flow: FlowId,
        /// First tick of the offending transmission.
        start: usize,
        /// Earliest tick the frame may be forwarded.
        available: usize,
    },
    /// A strand visits a node twice.
    #[error("a strand of flow {flow} crosses itself at node {node} (queue {queue})")]
    PathCrossed {
        /// Offending queue.
        queue: EgressQueueId,
        /// Offending flow.
        flow: FlowId,
        /// The node visited twice.
        node: NetworkNodeId,
    },
    /// The last frame of a strand arrives after the strand window ends.
    #[error("flow {flow} arrives at tick {arrival} on queue {queue}, after its deadline {deadline}")]
    DeadlineMissed {
        /// Offending queue.
        queue: EgressQueueId,
        /// Offending flow.
        flow: FlowId,
        /// Arrival tick at the destination.
        arrival: usize,
        /// Last tick of the strand window.
        deadline: usize,
    },
    /// A flow with reservations did not complete all its strands.
    #[error("flow {flow} has reserved slots but does not complete all its strands")]
    FlowIncomplete {
        /// Offending flow.
        flow: FlowId,
    },
}

/// Verify the finished schedule against every structural and temporal rule.
///
/// Read-only: order-sensitive checks run on a sorted clone of the reserved
/// lists.
pub fn verify_schedule(
    util: &NetworkUtilization,
    graph: &MultiLayeredGraph,
    hyper_cycle: usize,
) -> Result<(), ValidationError> {
    let mut reserved: Vec<Vec<ReservedSlot>> = util.reserved_slots().to_vec();
    for queue in &mut reserved {
        queue.sort_by_key(|slot| (slot.start, slot.next_start));
    }

    check_free_slots(util, hyper_cycle)?;
    check_reserved_slots(&reserved, hyper_cycle)?;
    check_complementarity(util, &reserved, hyper_cycle)?;
    check_flow_integrity(graph, &reserved, hyper_cycle)
}

/// The node a queue originates from.
///
/// Queues only know their destination; the source is found by scanning the
/// queues of all neighbors of the destination for the original id. Fails if
/// the topology is not full duplex.
fn source_node_of_queue(
    graph: &MultiLayeredGraph,
    queue: EgressQueueId,
) -> Result<NetworkNodeId, ValidationError> {
    let destination = graph.egress_queue(queue).destination;
    for reverse in graph.egress_queues_of(destination) {
        let suspect = reverse.destination;
        for suspect_queue in graph.egress_queues_of(suspect) {
            if suspect_queue.id == queue {
                return Ok(suspect);
            }
        }
    }
    Err(ValidationError::NotFullDuplex { queue })
}

fn check_free_slots(
    util: &NetworkUtilization,
    hyper_cycle: usize,
) -> Result<(), ValidationError> {
    for (queue_index, slots) in util.free_slots().iter().enumerate() {
        let queue = EgressQueueId(queue_index);
        let mut next_allowed_tick = 0;
        for (index, slot) in slots.iter().enumerate() {
            if slot.start > slot.last_free_tick {
                return Err(ValidationError::FreeSlotTooShort {
                    queue,
                    index,
                    start: slot.start,
                    last: slot.last_free_tick,
                });
            }
            if slot.start < next_allowed_tick {
                return Err(ValidationError::FreeSlotsOutOfOrder {
                    queue,
                    index,
                    start: slot.start,
                });
            }
            if slot.start == next_allowed_tick && next_allowed_tick != 0 {
                return Err(ValidationError::FreeSlotsNotMerged { queue, index });
            }
            if slot.last_free_tick >= hyper_cycle {
                return Err(ValidationError::FreeSlotBeyondHyperCycle {
                    queue,
                    index,
                    last: slot.last_free_tick,
                    hyper_cycle,
                });
            }
            next_allowed_tick = slot.last_free_tick + 1;
        }
    }
    Ok(())
}

fn check_reserved_slots(
    reserved: &[Vec<ReservedSlot>],
    hyper_cycle: usize,
) -> Result<(), ValidationError> {
    for (queue_index, slots) in reserved.iter().enumerate() {
        let queue = EgressQueueId(queue_index);
        let mut next_allowed_tick = 0;
        for (index, slot) in slots.iter().enumerate() {
            if slot.start >= slot.next_start {
                return Err(ValidationError::ReservedSlotTooShort {
                    queue,
                    index,
                    start: slot.start,
                });
            }
            if slot.start < next_allowed_tick {
                return Err(ValidationError::ReservedSlotsOutOfOrder {
                    queue,
                    index,
                    start: slot.start,
                });
            }
            if slot.next_start > hyper_cycle {
                return Err(ValidationError::ReservedSlotBeyondHyperCycle {
                    queue,
                    index,
                    end: slot.next_start,
                    hyper_cycle,
                });
            }
            next_allowed_tick = slot.next_start;
        }
    }
    Ok(())
}

fn check_complementarity(
    util: &NetworkUtilization,
    reserved: &[Vec<ReservedSlot>],
    hyper_cycle: usize,
) -> Result<(), ValidationError> {
    for (queue_index, free) in util.free_slots().iter().enumerate() {
        let queue = EgressQueueId(queue_index);
        let reserved = &reserved[queue_index];

        let mut tick = 0;
        let mut free_cursor = 0;
        let mut reserved_cursor = 0;
        while tick != hyper_cycle {
            if free_cursor < free.len() && free[free_cursor].start == tick {
                tick = free[free_cursor].last_free_tick + 1;
                free_cursor += 1;
            } else if reserved_cursor < reserved.len() && reserved[reserved_cursor].start == tick {
                tick = reserved[reserved_cursor].next_start;
                reserved_cursor += 1;
            } else {
                return Err(ValidationError::SlotsNotComplementary { queue, tick });
            }
        }
    }
    Ok(())
}

#[derive(PartialEq)]
enum FlowTrackerState {
    StrandOpen,
    StrandClosed,
    FlowClosed,
}

struct StrandTracker {
    first_strand_tick: usize,
    last_strand_tick: usize,
    /// 0 if no frame of the strand was processed yet.
    previous_frame_last_tick: usize,
    path_taken: Vec<NetworkNodeId>,
}

struct FlowTracker {
    state: FlowTrackerState,
    strands: Vec<StrandTracker>,
    current_strand: usize,
}

impl FlowTracker {
    fn new(hyper_cycle: usize, flow: &crate::graph::Flow) -> Result<Self, ValidationError> {
        if flow.period < 1 {
            return Err(ValidationError::InvalidPeriod { flow: flow.id });
        }
        if hyper_cycle % flow.period != 0 {
            return Err(ValidationError::PeriodNotDividingHyperCycle { flow: flow.id });
        }
        let strands = (0..hyper_cycle / flow.period)
            .map(|strand| StrandTracker {
                first_strand_tick: strand * flow.period,
                last_strand_tick: (strand + 1) * flow.period - 1,
                previous_frame_last_tick: 0,
                path_taken: Vec::new(),
            })
            .collect();
        Ok(Self { state: FlowTrackerState::StrandClosed, strands, current_strand: 0 })
    }
}

/// Replay all reserved slots in ascending start order over all queues and
/// track every flow's strands through the topology.
fn check_flow_integrity(
    graph: &MultiLayeredGraph,
    reserved: &[Vec<ReservedSlot>],
    hyper_cycle: usize,
) -> Result<(), ValidationError> {
    let mut trackers: HashMap<FlowId, FlowTracker> = HashMap::new();
    let mut cursors = vec![0usize; reserved.len()];

    loop {
        // the port with the earliest unprocessed slot goes next
        let mut earliest = hyper_cycle;
        let mut port = None;
        for (queue_index, slots) in reserved.iter().enumerate() {
            if let Some(slot) = slots.get(cursors[queue_index]) {
                if slot.start < earliest {
                    earliest = slot.start;
                    port = Some(queue_index);
                }
            }
        }
        let Some(queue_index) = port else {
            break;
        };

        let queue = EgressQueueId(queue_index);
        let slot = reserved[queue_index][cursors[queue_index]];
        cursors[queue_index] += 1;

        let flow = graph.flow(slot.flow);
        let port_source = source_node_of_queue(graph, queue)?;
        let port_destination = graph.egress_queue(queue).destination;

        let tracker = match trackers.entry(slot.flow) {
            std::collections::hash_map::Entry::Occupied(entry) => entry.into_mut(),
            std::collections::hash_map::Entry::Vacant(entry) => {
                entry.insert(FlowTracker::new(hyper_cycle, flow)?)
            }
        };

        if tracker.state == FlowTrackerState::FlowClosed {
            return Err(ValidationError::StrayFrame { queue, flow: slot.flow });
        }
        let strand = &mut tracker.strands[tracker.current_strand];

        let actual = slot.next_start - slot.start;
        let expected = transmission_delay(flow.frame_size);
        if actual != expected {
            return Err(ValidationError::FrameLengthMismatch {
                queue,
                flow: slot.flow,
                expected,
                actual,
            });
        }

        if strand.first_strand_tick > slot.start || strand.last_strand_tick + 1 < slot.next_start
        {
            return Err(ValidationError::FrameOutsideStrand {
                queue,
                flow: slot.flow,
                start: slot.start,
                end: slot.next_start,
            });
        }

        if tracker.state == FlowTrackerState::StrandClosed {
            if flow.source != port_source {
                return Err(ValidationError::WrongSourceNode {
                    queue,
                    flow: slot.flow,
                    expected: flow.source,
                });
            }
            strand.path_taken.push(flow.source);
            tracker.state = FlowTrackerState::StrandOpen;
        } else {
            let holder = *strand
                .path_taken
                .last()
                .expect("an open strand has visited at least its source");
            if holder != port_source {
                return Err(ValidationError::WrongHandover {
                    queue,
                    flow: slot.flow,
                    holder,
                });
            }
            let available =
                strand.previous_frame_last_tick + PROPAGATION_DELAY + PROCESSING_DELAY + 1;
            if available > slot.start {
                return Err(ValidationError::ForwardedTooEarly {
                    queue,
                    flow: slot.flow,
                    start: slot.start,
                    available,
                });
            }
        }

        if strand.path_taken.contains(&port_destination) {
            return Err(ValidationError::PathCrossed {
                queue,
                flow: slot.flow,
                node: port_destination,
            });
        }

        strand.path_taken.push(port_destination);
        strand.previous_frame_last_tick = slot.next_start - 1;

        if port_destination == flow.destination {
            let arrival = slot.next_start + PROPAGATION_DELAY - 1;
            if strand.last_strand_tick < arrival {
                return Err(ValidationError::DeadlineMissed {
                    queue,
                    flow: slot.flow,
                    arrival,
                    deadline: strand.last_strand_tick,
                });
            }
            if tracker.current_strand + 1 >= tracker.strands.len() {
                tracker.state = FlowTrackerState::FlowClosed;
            } else {
                tracker.current_strand += 1;
                tracker.state = FlowTrackerState::StrandClosed;
            }
        }
    }

    let mut tracked_flows: Vec<FlowId> = trackers.keys().copied().collect();
    tracked_flows.sort();
    for flow in tracked_flows {
        if trackers[&flow].state != FlowTrackerState::FlowClosed {
            return Err(ValidationError::FlowIncomplete { flow });
        }
    }
    Ok(())
}
