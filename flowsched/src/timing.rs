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

//! Time-domain constants and cycle arithmetic.
//!
//! All times in this crate are integer macro ticks of one microsecond.

use crate::graph::MultiLayeredGraph;

/// Signal propagation delay per link, in microseconds.
pub const PROPAGATION_DELAY: usize = 1;
/// Store-and-forward processing delay per switch, in microseconds.
pub const PROCESSING_DELAY: usize = 4;
/// Link speed in Mbit/s.
pub const NETWORK_SPEED: usize = 1000;

/// Transmission delay of a frame in microseconds.
pub fn transmission_delay(frame_size_bytes: usize) -> usize {
    frame_size_bytes * 8 / NETWORK_SPEED
}

/// The hyper cycle of all flows currently in the graph: the least common
/// multiple of their periods. An empty flow set yields 1.
pub fn hyper_cycle(graph: &MultiLayeredGraph) -> usize {
    lcm_all(graph.flows().values().map(|flow| flow.period))
}

/// Least common multiple over a set of periods. Empty input yields 1.
pub fn lcm_all(periods: impl IntoIterator<Item = usize>) -> usize {
    periods.into_iter().fold(1, lcm)
}

/// Greatest common divisor over a set of periods. Empty input yields 1.
pub fn gcd_all(periods: impl IntoIterator<Item = usize>) -> usize {
    let mut periods = periods.into_iter();
    let Some(first) = periods.next() else {
        return 1;
    };
    periods.fold(first, gcd)
}

fn gcd(a: usize, b: usize) -> usize {
    if b == 0 {
        a
    } else {
        gcd(b, a % b)
    }
}

fn lcm(a: usize, b: usize) -> usize {
    a / gcd(a, b) * b
}
