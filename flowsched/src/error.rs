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

//! Module containing all error types.
//!
//! Infeasible placements and schedules are *not* errors; they travel as
//! `false` / empty result sets and the schedulers recover from them. Errors
//! are reserved for missing or malformed input files and for verifier
//! violations, all of which abort the run.

use crate::verifier::ValidationError;
use thiserror::Error;

/// Main error type.
#[derive(Debug, Error)]
pub enum Error {
    /// An input file does not exist or cannot be read.
    #[error("file not found: {0}")]
    MissingResource(String),
    /// The scenario file is not valid JSON or misses required fields.
    #[error("cannot parse the scenario: {0}")]
    ScenarioParse(#[from] serde_json::Error),
    /// The finished schedule violates a structural or temporal rule.
    #[error("schedule verification failed: {0}")]
    Verification(#[from] ValidationError),
}
