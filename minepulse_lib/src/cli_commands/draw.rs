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

use crate::mining::booster::{LuckyBooster, draw_booster};
use chrono::{DateTime, Utc};
use rand::Rng;
use std::error::Error;

pub fn build_draws<R: Rng + ?Sized>(
    rng: &mut R,
    count: u32,
    now: DateTime<Utc>,
) -> Vec<LuckyBooster> {
    (0..count).map(|_| draw_booster(&mut *rng, now)).collect()
}

pub fn execute(count: u32, now: DateTime<Utc>) -> Result<(), Box<dyn Error>> {
    let boosters = build_draws(&mut rand::thread_rng(), count, now);
    println!("{}", serde_json::to_string_pretty(&boosters)?);
    Ok(())
}
