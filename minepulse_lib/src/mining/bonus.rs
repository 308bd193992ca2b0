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

use super::booster::{BoosterSlot, LuckyBooster};
use super::efficiency::{EfficiencyBreakdown, EfficiencyTracker, Grade};
use super::hashrate::HashRateBreakdown;
use super::profile::AccountProfile;
use crate::config::MiningConfig;
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::Serialize;
use tracing::debug;

/// Result of one recomputation of the bonus model
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MiningRates {
    pub hash_rate: HashRateBreakdown,
    pub efficiency: EfficiencyBreakdown,
    /// Grade derived from this efficiency, used by the next recomputation
    pub grade: Grade,
}

/// All inputs of the bonus calculator plus the grade carried between updates
#[derive(Debug, Clone)]
pub struct BonusModel {
    base_hash_rate: f64,
    max_hash_rate: f64,
    profile: AccountProfile,
    boosters: BoosterSlot,
    tracker: EfficiencyTracker,
    interruptions: u32,
}

impl BonusModel {
    pub fn new(config: &MiningConfig, profile: AccountProfile) -> Self {
        Self {
            base_hash_rate: config.base_hash_rate,
            max_hash_rate: config.max_hash_rate,
            profile,
            boosters: BoosterSlot::new(),
            tracker: EfficiencyTracker::default(),
            interruptions: 0,
        }
    }

    pub fn profile(&self) -> &AccountProfile {
        &self.profile
    }

    pub fn set_profile(&mut self, profile: AccountProfile) {
        self.profile = profile;
    }

    pub fn boosters(&self) -> &BoosterSlot {
        &self.boosters
    }

    pub fn active_booster(&self) -> Option<&LuckyBooster> {
        self.boosters.active()
    }

    /// Draw a booster candidate, leaving the active one untouched
    pub fn draw_booster<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        now: DateTime<Utc>,
    ) -> LuckyBooster {
        self.boosters.draw(rng, now).clone()
    }

    pub fn apply_booster(&mut self) -> bool {
        self.boosters.apply()
    }

    pub fn set_active_booster(&mut self, booster: LuckyBooster) {
        self.boosters.set_active(booster);
    }

    pub fn discard_booster(&mut self) -> Option<LuckyBooster> {
        self.boosters.discard()
    }

    pub fn interruptions(&self) -> u32 {
        self.interruptions
    }

    /// Count an explicit stop of a running session
    pub fn record_interruption(&mut self) {
        self.interruptions = self.interruptions.saturating_add(1);
    }

    /// Recompute hash rate and efficiency from the current inputs
    pub fn recompute(&mut self, now: DateTime<Utc>) -> MiningRates {
        let hash_rate = HashRateBreakdown::compute(
            self.base_hash_rate,
            self.max_hash_rate,
            &self.profile,
            self.boosters.active(),
        );
        let efficiency = self.tracker.update(&self.profile, self.interruptions, now);
        let grade = self.tracker.grade();
        debug!(
            "Recomputed rates: hash_rate={:.2} efficiency={:.1} grade={}",
            hash_rate.current, efficiency.value, grade
        );
        MiningRates {
            hash_rate,
            efficiency,
            grade,
        }
    }
}
