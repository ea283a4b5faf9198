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

//! # Network Utilization List
//!
//! Per egress queue, [`NetworkUtilization`] keeps two complementary lists
//! over the scheduling horizon `[0, H)` (`H` = hyper cycle):
//!
//! - `free`: ordered, non-overlapping, non-adjacent slots `(start,
//!   last_free_tick)`, both ends inclusive. Adjacent free slots are always
//!   merged.
//! - `reserved`: slots `(start, next_start)` with the owning flow and
//!   configuration. The reserved list is kept unsorted; call
//!   [`NetworkUtilization::sort_reserved`] before order-sensitive reads.
//!
//! Together the two lists tile `[0, H)` exactly after every mutating call.
//! In addition, `arrivals` records for every reserved frame when it arrived
//! at the queue, which feeds the queue-depth metric and downstream placement.

use crate::graph::{ConfigId, Configuration, EgressQueueId, Flow, FlowId};
use crate::timing::{transmission_delay, PROCESSING_DELAY, PROPAGATION_DELAY};

/// A maximal run of unreserved ticks on one egress queue.
///
/// Both `start` and `last_free_tick` are part of the slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FreeSlot {
    /// First free tick.
    pub start: usize,
    /// Last free tick (inclusive).
    pub last_free_tick: usize,
}

/// A reserved transmission window on one egress queue.
///
/// The ticks `start..next_start` are reserved, `next_start` itself is not.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReservedSlot {
    /// First reserved tick.
    pub start: usize,
    /// First tick after the reservation.
    pub next_start: usize,
    /// Flow the frame belongs to.
    pub flow: FlowId,
    /// Configuration the frame belongs to.
    pub config: ConfigId,
}

/// A reservation request produced by the transmission-opportunity search.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SlotRequest {
    /// Queue to reserve on.
    pub queue: EgressQueueId,
    /// First tick of the transmission.
    pub start: usize,
    /// First tick after the transmission.
    pub next_start: usize,
    /// Tick at which the frame arrived at this queue.
    pub arrival: usize,
}

/// Reserved and free transmission slots for every egress queue of a network.
///
/// The driver copies a `NetworkUtilization` wholesale to prepare the
/// offensive planning variant; the copy is a deep value copy and shares no
/// interior state with the original.
#[derive(Clone, Debug)]
pub struct NetworkUtilization {
    free: Vec<Vec<FreeSlot>>,
    reserved: Vec<Vec<ReservedSlot>>,
    arrivals: Vec<Vec<(FlowId, usize)>>,
    hyper_cycle: usize,
    sub_cycle: usize,
}

impl NetworkUtilization {
    /// Create a utilization list with every queue completely free.
    pub fn new(num_queues: usize, hyper_cycle: usize, sub_cycle: usize) -> Self {
        let mut util = Self {
            free: Vec::new(),
            reserved: Vec::new(),
            arrivals: Vec::new(),
            hyper_cycle,
            sub_cycle,
        };
        util.reset(num_queues);
        util
    }

    /// Drop all reservations and arrivals; every queue becomes one free slot
    /// `[0, H-1]` again.
    pub fn clear(&mut self) {
        self.reset(self.free.len());
    }

    fn reset(&mut self, num_queues: usize) {
        self.free.clear();
        self.free.resize(
            num_queues,
            vec![FreeSlot { start: 0, last_free_tick: self.hyper_cycle - 1 }],
        );
        self.reserved.clear();
        self.reserved.resize(num_queues, Vec::new());
        self.arrivals.clear();
        self.arrivals.resize(num_queues, Vec::new());
    }

    /// The scheduling horizon in ticks.
    pub fn hyper_cycle(&self) -> usize {
        self.hyper_cycle
    }

    /// The sub cycle (GCD of all periods), the granularity of balanced
    /// placement offsets.
    pub fn sub_cycle(&self) -> usize {
        self.sub_cycle
    }

    /// How many frames a flow with the given period sends per hyper cycle.
    pub fn frames_per_hyper_cycle(&self, period: usize) -> usize {
        self.hyper_cycle / period
    }

    /// The free slots of every queue.
    pub fn free_slots(&self) -> &[Vec<FreeSlot>] {
        &self.free
    }

    /// The reserved slots of every queue.
    pub fn reserved_slots(&self) -> &[Vec<ReservedSlot>] {
        &self.reserved
    }

    /// The reserved slots of one queue.
    pub fn reserved_slots_of(&self, queue: EgressQueueId) -> &[ReservedSlot] {
        &self.reserved[queue.0]
    }

    /// The reserved slots of one queue that belong to the given flow.
    pub fn reserved_slots_of_flow(
        &self,
        queue: EgressQueueId,
        flow: FlowId,
    ) -> impl Iterator<Item = &ReservedSlot> {
        self.reserved[queue.0].iter().filter(move |slot| slot.flow == flow)
    }

    /// The recorded frame arrivals of one queue (unordered).
    pub fn arrivals_of(&self, queue: EgressQueueId) -> &[(FlowId, usize)] {
        &self.arrivals[queue.0]
    }

    /// Record that a frame of `flow` arrives at `queue` at `arrival_tick`.
    pub fn add_arrival(&mut self, queue: EgressQueueId, flow: FlowId, arrival_tick: usize) {
        self.arrivals[queue.0].push((flow, arrival_tick));
    }

    /// Sort every queue's reserved list by `(start, next_start)`.
    pub fn sort_reserved(&mut self) {
        for queue in &mut self.reserved {
            queue.sort_by_key(|slot| (slot.start, slot.next_start));
        }
    }

    /// Search one transmission window per hop of `config.path` such that a
    /// frame released at `first_release_time` reaches the destination before
    /// `deadline`.
    ///
    /// Walks the path once. On each hop it takes the first free slot that
    /// - has room for the frame after its arrival at the queue,
    /// - starts early enough that the frame can still make the deadline, and
    /// - leaves enough time between (possibly deferred) start of transmission
    ///   and both slot end and deadline.
    ///
    /// The arrival at the next hop advances by transmission, propagation and
    /// store-and-forward processing delay. Returns one request per hop, or an
    /// empty vector if any hop has no suitable slot. Never mutates anything.
    pub fn search_transmission_opportunities(
        &self,
        config: &Configuration,
        flow: &Flow,
        first_release_time: usize,
        deadline: usize,
    ) -> Vec<SlotRequest> {
        let delay = transmission_delay(flow.frame_size);
        let Some(effective_deadline) = deadline.checked_sub(delay + PROPAGATION_DELAY) else {
            return Vec::new();
        };

        let mut requests = Vec::with_capacity(config.path.len());
        let mut arrival = first_release_time;

        for &queue in &config.path {
            let found = self.free[queue.0]
                .iter()
                // slot already over before the frame could be transmitted
                .skip_while(|slot| slot.last_free_tick + 1 < arrival + delay)
                // any later slot starts too late to make the deadline
                .take_while(|slot| slot.start <= effective_deadline)
                .find(|slot| {
                    slot.start.max(arrival) + delay
                        <= (slot.last_free_tick + 1).min(effective_deadline + delay)
                });
            let Some(slot) = found else {
                return Vec::new();
            };

            let send_start = slot.start.max(arrival);
            requests.push(SlotRequest {
                queue,
                start: send_start,
                next_start: send_start + delay,
                arrival,
            });
            // store-and-forward switching; replace the transmission delay by a
            // constant for cut-through
            arrival = send_start + delay + PROPAGATION_DELAY + PROCESSING_DELAY;
        }

        requests
    }

    /// Reserve the requested window for `(flow, config)`.
    ///
    /// Requires a free slot that encloses the whole request; the enclosing
    /// slot is removed, shrunk, or split so that free and reserved slots stay
    /// complementary. Returns `false` (without mutating anything) if no
    /// enclosing free slot exists; the caller must not treat the request as
    /// reserved in that case.
    pub fn reserve_slot(&mut self, request: &SlotRequest, flow: FlowId, config: ConfigId) -> bool {
        let queue = request.queue.0;
        let Some(pos) = self.free[queue].iter().position(|slot| {
            slot.start <= request.start && slot.last_free_tick >= request.next_start - 1
        }) else {
            return false;
        };

        // arrivals are recorded before the free list is touched
        self.arrivals[queue].push((flow, request.arrival));
        self.reserved[queue].push(ReservedSlot {
            start: request.start,
            next_start: request.next_start,
            flow,
            config,
        });

        let slot = self.free[queue][pos];
        if slot.start == request.start && slot.last_free_tick == request.next_start - 1 {
            // slot completely used
            self.free[queue].remove(pos);
        } else if slot.start == request.start {
            // shrink from the left
            self.free[queue][pos].start = request.next_start;
        } else if slot.last_free_tick + 1 == request.next_start {
            // shrink from the right
            self.free[queue][pos].last_free_tick = request.start - 1;
        } else {
            // reservation in the interior, split the slot
            self.free[queue][pos].start = request.next_start;
            self.free[queue].insert(
                pos,
                FreeSlot { start: slot.start, last_free_tick: request.start - 1 },
            );
        }
        true
    }

    /// Release all reservations and arrivals of the given flows on every
    /// queue, merging the freed ranges back into the free lists.
    pub fn remove_configs(&mut self, flows: &[FlowId]) {
        for queue in 0..self.reserved.len() {
            let mut removed = Vec::new();
            self.reserved[queue].retain(|slot| {
                if flows.contains(&slot.flow) {
                    removed.push(*slot);
                    false
                } else {
                    true
                }
            });

            // slots must be freed in ascending start order, each insert
            // assumes the free list is currently valid
            removed.sort_by_key(|slot| slot.start);
            for slot in &removed {
                self.free_slot(queue, slot);
            }

            self.arrivals[queue].retain(|(flow, _)| !flows.contains(flow));
        }
    }

    /// Insert the range of a single reservation back into the free list,
    /// merging with an adjacent left and/or right neighbor.
    fn free_slot(&mut self, queue: usize, slot: &ReservedSlot) {
        let begin = slot.start;
        let end = slot.next_start;
        let list = &mut self.free[queue];

        // index of the first free slot entirely after the freed range
        let pos = list
            .iter()
            .position(|free| free.start >= end)
            .unwrap_or(list.len());
        let left_adjacent = pos > 0 && list[pos - 1].last_free_tick + 1 == begin;
        let right_adjacent = pos < list.len() && list[pos].start == end;

        match (left_adjacent, right_adjacent) {
            (true, true) => {
                list[pos - 1].last_free_tick = list[pos].last_free_tick;
                list.remove(pos);
            }
            (true, false) => list[pos - 1].last_free_tick = end - 1,
            (false, true) => list[pos].start = begin,
            (false, false) => {
                list.insert(pos, FreeSlot { start: begin, last_free_tick: end - 1 })
            }
        }
    }

    /// Test-only raw access to one queue's free list.
    #[cfg(test)]
    pub(crate) fn free_slots_mut(&mut self, queue: EgressQueueId) -> &mut Vec<FreeSlot> {
        &mut self.free[queue.0]
    }

    /// Test-only raw access to one queue's reserved list.
    #[cfg(test)]
    pub(crate) fn reserved_slots_mut(&mut self, queue: EgressQueueId) -> &mut Vec<ReservedSlot> {
        &mut self.reserved[queue.0]
    }
}
