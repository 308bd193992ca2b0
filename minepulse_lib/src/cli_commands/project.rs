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

use super::rates::compute_rates;
use crate::config::Config;
use crate::mining::earnings::{project_earnings, settle_earnings};
use crate::utils::time_provider::format_duration;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::error::Error;

#[derive(Serialize, Debug)]
pub struct Projection {
    pub elapsed_secs: u64,
    pub duration: String,
    pub hash_rate: f64,
    pub efficiency: f64,
    /// Live display value
    pub earnings: f64,
    /// What a session settled at this point would record
    pub settled_earnings: f64,
}

/// Project earnings at each hour mark up to `hours`, with the configured profile
pub fn build_projections(config: &Config, hours: u32, now: DateTime<Utc>) -> Vec<Projection> {
    let rates = compute_rates(config, now);
    let hash_rate = rates.hash_rate.current;
    let efficiency = rates.efficiency.value;

    (1..=hours as u64)
        .map(|hour| {
            let elapsed_secs = hour * 3600;
            Projection {
                elapsed_secs,
                duration: format_duration(elapsed_secs),
                hash_rate,
                efficiency,
                earnings: project_earnings(elapsed_secs, hash_rate, efficiency),
                settled_earnings: settle_earnings(
                    elapsed_secs,
                    config.mining.session_ceiling_secs,
                    hash_rate,
                    efficiency,
                ),
            }
        })
        .collect()
}

pub fn execute(config: &Config, hours: u32, now: DateTime<Utc>) -> Result<(), Box<dyn Error>> {
    let projections = build_projections(config, hours, now);
    println!("{}", serde_json::to_string_pretty(&projections)?);
    Ok(())
}
