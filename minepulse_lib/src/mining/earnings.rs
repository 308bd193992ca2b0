// Copyright (C) 2024-2026 MinePulse Developers (see AUTHORS)
//
// This file is part of MinePulse
//
// MinePulse is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free
// Software Foundation, either version 3 of the License, or (at your option)
// any later version.
//
// MinePulse is distributed in the hope that it will be useful, but WITHOUT ANY
// WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// MinePulse. If not, see <https://www.gnu.org/licenses/>.

/// Reward per second at the reference hash rate and efficiency
pub const REFERENCE_RATE_PER_SECOND: f64 = 0.0001;
/// Hash rate (TH/s) at which the reference rate applies
pub const REFERENCE_HASH_RATE: f64 = 12.0;
/// Efficiency (percent) at which the reference rate applies
pub const REFERENCE_EFFICIENCY: f64 = 70.0;
/// Longest a session may run, 24 hours
pub const SESSION_CEILING_SECS: u64 = 86_400;

/// Accumulated reward after `elapsed_secs` at the given hash rate and efficiency.
///
/// Negative rates are treated as zero so the result never decreases with time.
pub fn project_earnings(elapsed_secs: u64, hash_rate: f64, efficiency: f64) -> f64 {
    elapsed_secs as f64
        * REFERENCE_RATE_PER_SECOND
        * (hash_rate.max(0.0) / REFERENCE_HASH_RATE)
        * (efficiency.max(0.0) / REFERENCE_EFFICIENCY)
}

/// Final reward of a session, elapsed time clamped to the ceiling
pub fn settle_earnings(
    elapsed_secs: u64,
    ceiling_secs: u64,
    hash_rate: f64,
    efficiency: f64,
) -> f64 {
    project_earnings(elapsed_secs.min(ceiling_secs), hash_rate, efficiency)
}
