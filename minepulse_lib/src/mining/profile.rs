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

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Social platforms an account can link for the efficiency bonus
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SocialPlatform {
    Twitter,
    Telegram,
    Discord,
    Youtube,
}

/// Account attributes feeding the bonus calculator
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountProfile {
    /// Consecutive days with a login
    pub login_streak_days: u32,
    /// Number of direct referrals
    pub referral_count: u32,
    /// Members across the whole referral team
    pub team_size: u32,
    pub connected_socials: BTreeSet<SocialPlatform>,
    pub daily_check_in: bool,
    pub daily_activity: bool,
    /// Last time the equipment was maintained, None if never
    pub last_maintenance_at: Option<DateTime<Utc>>,
}

impl AccountProfile {
    pub fn with_login_streak(mut self, days: u32) -> Self {
        self.login_streak_days = days;
        self
    }

    pub fn with_referral_count(mut self, count: u32) -> Self {
        self.referral_count = count;
        self
    }

    pub fn with_team_size(mut self, size: u32) -> Self {
        self.team_size = size;
        self
    }

    pub fn with_social(mut self, platform: SocialPlatform) -> Self {
        self.connected_socials.insert(platform);
        self
    }

    pub fn with_daily_check_in(mut self, done: bool) -> Self {
        self.daily_check_in = done;
        self
    }

    pub fn with_daily_activity(mut self, done: bool) -> Self {
        self.daily_activity = done;
        self
    }

    pub fn with_last_maintenance(mut self, at: DateTime<Utc>) -> Self {
        self.last_maintenance_at = Some(at);
        self
    }

    /// Time since the last maintenance, None if never maintained
    pub fn since_maintenance(&self, now: DateTime<Utc>) -> Option<TimeDelta> {
        self.last_maintenance_at
            .map(|at| (now - at).max(TimeDelta::zero()))
    }
}
