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

use super::booster::LuckyBooster;
use super::profile::AccountProfile;
use serde::Serialize;

/// Base hash rate in TH/s every account starts with
pub const BASE_HASH_RATE: f64 = 12.0;
/// Hard cap on the current hash rate in TH/s
pub const MAX_HASH_RATE: f64 = 24.0;

const DAILY_CHECK_IN_BONUS: f64 = 1.0;
const LOGIN_STREAK_BONUS_PER_DAY: f64 = 0.2;
const LOGIN_STREAK_BONUS_CAP: f64 = 1.0;
const REFERRAL_PERCENT_PER_REFERRAL: f64 = 2.0;
const REFERRAL_PERCENT_CAP: f64 = 100.0;

/// Hash rate with every contribution spelled out
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HashRateBreakdown {
    pub base: f64,
    pub maximum: f64,
    pub daily_check_in_bonus: f64,
    pub login_streak_bonus: f64,
    pub referral_bonus: f64,
    pub booster_bonus: f64,
    /// Sum of the above, capped at maximum
    pub current: f64,
}

impl HashRateBreakdown {
    /// Compute the breakdown for a profile and the active booster, if any
    pub fn compute(
        base: f64,
        maximum: f64,
        profile: &AccountProfile,
        booster: Option<&LuckyBooster>,
    ) -> Self {
        let daily_check_in_bonus = if profile.daily_check_in {
            DAILY_CHECK_IN_BONUS
        } else {
            0.0
        };
        let login_streak_bonus = (profile.login_streak_days as f64 * LOGIN_STREAK_BONUS_PER_DAY)
            .min(LOGIN_STREAK_BONUS_CAP);
        let referral_bonus = base * referral_percent(profile.referral_count) / 100.0;
        let booster_bonus = booster
            .map(|b| base * b.hash_rate_boost as f64 / 100.0)
            .unwrap_or(0.0);

        let current = (base
            + daily_check_in_bonus
            + login_streak_bonus
            + referral_bonus
            + booster_bonus)
            .min(maximum);

        Self {
            base,
            maximum,
            daily_check_in_bonus,
            login_streak_bonus,
            referral_bonus,
            booster_bonus,
            current,
        }
    }
}

/// Referral power in percent of base, two points per referral up to 100
pub fn referral_percent(referral_count: u32) -> f64 {
    (referral_count as f64 * REFERRAL_PERCENT_PER_REFERRAL).min(REFERRAL_PERCENT_CAP)
}
