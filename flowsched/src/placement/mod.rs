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

//! # Configuration Placement
//!
//! A placement takes one flow together with one of its configurations and
//! tries to reserve transmission windows on every hop of the path such that
//! every frame of the flow within one hyper cycle meets its deadline.
//!
//! All placements are all-or-nothing: on failure the utilization list is
//! left untouched.

use crate::graph::{Configuration, EgressQueueId, Flow};
use crate::timing::transmission_delay;
use crate::utilization::{NetworkUtilization, SlotRequest};

/// Selects which placement strategy the schedulers use.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlacementKind {
    /// Transmit every frame as early as possible.
    Asap,
    /// Try every sub-cycle offset and keep the one with the best worst-case
    /// end-to-end time.
    Balanced,
    /// Latest-possible single-link placement, driven by the Hermes scheduler.
    Hermes,
}

impl PlacementKind {
    /// Map a numeric CLI selector to a placement kind.
    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::Asap),
            1 => Some(Self::Balanced),
            2 => Some(Self::Hermes),
            _ => None,
        }
    }

    /// The numeric CLI selector of this placement kind.
    pub fn index(self) -> usize {
        match self {
            Self::Asap => 0,
            Self::Balanced => 1,
            Self::Hermes => 2,
        }
    }
}

/// Place a configuration with the selected strategy.
///
/// The Hermes placement needs per-link offset information and must be called
/// through [`place_hermes`] directly; selecting it here always fails.
pub fn place_config(
    config: &Configuration,
    flow: &Flow,
    util: &mut NetworkUtilization,
    kind: PlacementKind,
) -> bool {
    match kind {
        PlacementKind::Asap => place_asap(config, flow, util),
        PlacementKind::Balanced => place_balanced(config, flow, util),
        PlacementKind::Hermes => false,
    }
}

/// Reserve every frame of the flow as early as possible.
///
/// Frame `i` is released at `i * period` and must arrive before
/// `(i + 1) * period`. Returns `false` without reserving anything if any
/// frame has no feasible window sequence.
pub fn place_asap(config: &Configuration, flow: &Flow, util: &mut NetworkUtilization) -> bool {
    let frames = util.frames_per_hyper_cycle(flow.period);
    let mut frame_requests: Vec<Vec<SlotRequest>> = Vec::with_capacity(frames);

    for frame_index in 0..frames {
        let requests = util.search_transmission_opportunities(
            config,
            flow,
            frame_index * flow.period,
            (frame_index + 1) * flow.period,
        );
        if requests.is_empty() {
            return false;
        }
        frame_requests.push(requests);
    }

    for requests in &frame_requests {
        for request in requests {
            util.reserve_slot(request, flow.id, config.id);
        }
    }
    true
}

/// Try every sub-cycle release offset and commit the best one.
///
/// For each offset `k` in `0..period / sub_cycle`, the frames are searched
/// with release times `k * sub_cycle + i * period` (deadlines unchanged).
/// Among all fully feasible offsets, the one whose slowest frame has the
/// smallest span between first-hop arrival and end of the last-hop
/// transmission wins.
pub fn place_balanced(config: &Configuration, flow: &Flow, util: &mut NetworkUtilization) -> bool {
    let offsets = flow.period / util.sub_cycle();
    let frames = util.frames_per_hyper_cycle(flow.period);

    let mut options: Vec<Vec<Vec<SlotRequest>>> = Vec::new();
    for offset in 0..offsets {
        let mut frame_requests = Vec::with_capacity(frames);
        let feasible = (0..frames).all(|frame_index| {
            let release = offset * util.sub_cycle() + frame_index * flow.period;
            let deadline = (frame_index + 1) * flow.period;
            let requests = util.search_transmission_opportunities(config, flow, release, deadline);
            if requests.is_empty() {
                return false;
            }
            frame_requests.push(requests);
            true
        });
        if feasible {
            options.push(frame_requests);
        }
    }

    let slowest_frame_span = |frame_requests: &Vec<Vec<SlotRequest>>| {
        frame_requests
            .iter()
            .map(|requests| match (requests.first(), requests.last()) {
                (Some(first), Some(last)) => last.next_start - first.arrival,
                _ => 0,
            })
            .max()
            .unwrap_or(0)
    };

    let Some(best) = options.iter().min_by_key(|option| slowest_frame_span(option)) else {
        return false;
    };

    for requests in best {
        for request in requests {
            util.reserve_slot(request, flow.id, config.id);
        }
    }
    true
}

/// Reserve one frame on a single link as late as possible.
///
/// Among the free slots on `queue` that start no later than `latest_offset`
/// and are long enough for the frame, the one with the largest start is
/// taken; within it the transmission begins at
/// `min(slot_end - T + 1, latest_offset)`.
pub fn place_hermes(
    config: &Configuration,
    flow: &Flow,
    util: &mut NetworkUtilization,
    queue: EgressQueueId,
    latest_offset: usize,
) -> bool {
    let delay = transmission_delay(flow.frame_size);
    let Some(slot) = util.free_slots()[queue.0]
        .iter()
        .filter(|slot| {
            slot.start <= latest_offset && slot.last_free_tick - slot.start >= delay
        })
        .max_by_key(|slot| slot.start)
        .copied()
    else {
        return false;
    };

    let start = (slot.last_free_tick - delay + 1).min(latest_offset);
    let request = SlotRequest {
        queue,
        start,
        next_start: start + delay,
        // the true arrival is unknown at this point
        arrival: start,
    };
    util.reserve_slot(&request, flow.id, config.id)
}
