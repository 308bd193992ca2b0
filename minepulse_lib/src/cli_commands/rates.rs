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

use crate::config::Config;
use crate::mining::bonus::{BonusModel, MiningRates};
use chrono::{DateTime, Utc};
use std::error::Error;

/// Rates for the configured profile
pub fn compute_rates(config: &Config, now: DateTime<Utc>) -> MiningRates {
    let mut model = BonusModel::new(&config.mining, config.profile.clone());
    model.recompute(now)
}

pub fn execute(config: &Config, now: DateTime<Utc>) -> Result<(), Box<dyn Error>> {
    let rates = compute_rates(config, now);
    println!("{}", serde_json::to_string_pretty(&rates)?);
    Ok(())
}
