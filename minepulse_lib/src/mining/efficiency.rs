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

use super::profile::AccountProfile;
use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;
use std::fmt;

pub const BASE_EFFICIENCY: f64 = 50.0;
pub const MIN_EFFICIENCY: f64 = 30.0;
pub const MAX_EFFICIENCY: f64 = 100.0;

const DAILY_ACTIVITY_BONUS: f64 = 5.0;
const MAINTENANCE_BONUS: f64 = 3.0;
/// Maintenance counts as recent up to this many hours
const MAINTENANCE_WINDOW_HOURS: i64 = 4;
const INTERRUPTION_PENALTY: f64 = 2.0;
const SOCIAL_BONUS_PER_PLATFORM: f64 = 1.5;

/// Account tier derived from efficiency
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Grade {
    Bronze,
    Silver,
    Gold,
    Platinum,
    Diamond,
}

/// Minimum efficiency per grade, highest first
const GRADE_THRESHOLDS: [(Grade, f64); 4] = [
    (Grade::Diamond, 95.0),
    (Grade::Platinum, 85.0),
    (Grade::Gold, 75.0),
    (Grade::Silver, 60.0),
];

impl Grade {
    /// The highest grade whose threshold the efficiency reaches
    pub fn from_efficiency(efficiency: f64) -> Self {
        GRADE_THRESHOLDS
            .iter()
            .find(|(_, threshold)| efficiency >= *threshold)
            .map(|(grade, _)| *grade)
            .unwrap_or(Grade::Bronze)
    }

    /// Efficiency points granted by the grade
    pub fn bonus(&self) -> f64 {
        match self {
            Grade::Bronze => 0.0,
            Grade::Silver => 2.0,
            Grade::Gold => 4.0,
            Grade::Platinum => 6.0,
            Grade::Diamond => 8.0,
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Grade::Bronze => "Bronze",
            Grade::Silver => "Silver",
            Grade::Gold => "Gold",
            Grade::Platinum => "Platinum",
            Grade::Diamond => "Diamond",
        };
        write!(f, "{name}")
    }
}

/// Step function of the team member count, in efficiency points
pub fn team_bonus(team_size: u32) -> f64 {
    match team_size {
        101.. => 10.0,
        51..=100 => 5.0,
        11..=50 => 2.0,
        1..=10 => 0.5,
        0 => 0.0,
    }
}

pub fn social_bonus(connected_platforms: usize) -> f64 {
    connected_platforms as f64 * SOCIAL_BONUS_PER_PLATFORM
}

/// Efficiency with every contribution spelled out
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EfficiencyBreakdown {
    pub base: f64,
    pub daily_activity_bonus: f64,
    pub maintenance_bonus: f64,
    pub interruption_penalty: f64,
    pub grade: Grade,
    pub grade_bonus: f64,
    pub team_bonus: f64,
    pub social_bonus: f64,
    /// Clamped to [MIN_EFFICIENCY, MAX_EFFICIENCY]
    pub value: f64,
}

impl EfficiencyBreakdown {
    /// Compute efficiency using the bonus of `grade`, the grade held before this computation
    pub fn compute(
        profile: &AccountProfile,
        interruptions: u32,
        grade: Grade,
        now: DateTime<Utc>,
    ) -> Self {
        let daily_activity_bonus = if profile.daily_activity {
            DAILY_ACTIVITY_BONUS
        } else {
            0.0
        };
        let window = TimeDelta::hours(MAINTENANCE_WINDOW_HOURS);
        let maintenance_bonus = match profile.since_maintenance(now) {
            Some(since) if since <= window => MAINTENANCE_BONUS,
            _ => 0.0,
        };
        let interruption_penalty = interruptions as f64 * INTERRUPTION_PENALTY;
        let grade_bonus = grade.bonus();
        let team_bonus = team_bonus(profile.team_size);
        let social_bonus = social_bonus(profile.connected_socials.len());

        let raw = BASE_EFFICIENCY + daily_activity_bonus + maintenance_bonus
            - interruption_penalty
            + grade_bonus
            + team_bonus
            + social_bonus;

        Self {
            base: BASE_EFFICIENCY,
            daily_activity_bonus,
            maintenance_bonus,
            interruption_penalty,
            grade,
            grade_bonus,
            team_bonus,
            social_bonus,
            value: raw.clamp(MIN_EFFICIENCY, MAX_EFFICIENCY),
        }
    }
}

/// Carries the grade from one recomputation to the next.
///
/// Grade depends on efficiency and efficiency depends on the grade bonus, so each
/// update reads the previous grade, computes the new efficiency, then derives the
/// grade used by the following update. The grade therefore lags one update behind.
#[derive(Debug, Clone)]
pub struct EfficiencyTracker {
    grade: Grade,
}

impl Default for EfficiencyTracker {
    fn default() -> Self {
        Self {
            grade: Grade::Bronze,
        }
    }
}

impl EfficiencyTracker {
    pub fn new(initial_grade: Grade) -> Self {
        Self {
            grade: initial_grade,
        }
    }

    /// Grade that the next update will use
    pub fn grade(&self) -> Grade {
        self.grade
    }

    pub fn update(
        &mut self,
        profile: &AccountProfile,
        interruptions: u32,
        now: DateTime<Utc>,
    ) -> EfficiencyBreakdown {
        let breakdown = EfficiencyBreakdown::compute(profile, interruptions, self.grade, now);
        self.grade = Grade::from_efficiency(breakdown.value);
        breakdown
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mining::profile::SocialPlatform;

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_767_225_600, 0).unwrap()
    }

    #[test]
    fn test_grade_thresholds() {
        assert_eq!(Grade::from_efficiency(30.0), Grade::Bronze);
        assert_eq!(Grade::from_efficiency(59.9), Grade::Bronze);
        assert_eq!(Grade::from_efficiency(60.0), Grade::Silver);
        assert_eq!(Grade::from_efficiency(74.9), Grade::Silver);
        assert_eq!(Grade::from_efficiency(75.0), Grade::Gold);
        assert_eq!(Grade::from_efficiency(85.0), Grade::Platinum);
        assert_eq!(Grade::from_efficiency(95.0), Grade::Diamond);
        assert_eq!(Grade::from_efficiency(100.0), Grade::Diamond);
    }

    #[test]
    fn test_grade_lookup_is_total_and_monotonic() {
        let mut previous = Grade::Bronze;
        for tenth in 300..=1000 {
            let grade = Grade::from_efficiency(tenth as f64 / 10.0);
            assert!(grade >= previous);
            previous = grade;
        }
        assert_eq!(previous, Grade::Diamond);
    }

    #[test]
    fn test_team_bonus_steps() {
        assert_eq!(team_bonus(0), 0.0);
        assert_eq!(team_bonus(1), 0.5);
        assert_eq!(team_bonus(10), 0.5);
        assert_eq!(team_bonus(11), 2.0);
        assert_eq!(team_bonus(51), 5.0);
        assert_eq!(team_bonus(100), 5.0);
        assert_eq!(team_bonus(101), 10.0);
    }

    #[test]
    fn test_social_bonus() {
        assert_eq!(social_bonus(0), 0.0);
        assert_eq!(social_bonus(3), 4.5);
    }

    #[test]
    fn test_base_profile_efficiency() {
        let breakdown =
            EfficiencyBreakdown::compute(&AccountProfile::default(), 0, Grade::Bronze, now());
        assert_eq!(breakdown.value, 50.0);
    }

    #[test]
    fn test_maintenance_window() {
        let recent = AccountProfile::default().with_last_maintenance(now() - TimeDelta::hours(4));
        let stale = AccountProfile::default().with_last_maintenance(now() - TimeDelta::hours(5));

        let recent = EfficiencyBreakdown::compute(&recent, 0, Grade::Bronze, now());
        let stale = EfficiencyBreakdown::compute(&stale, 0, Grade::Bronze, now());

        assert_eq!(recent.maintenance_bonus, 3.0);
        assert_eq!(stale.maintenance_bonus, 0.0);
    }

    #[test]
    fn test_maintenance_window_is_not_rounded_to_hours() {
        let just_over = AccountProfile::default()
            .with_last_maintenance(now() - TimeDelta::hours(4) - TimeDelta::minutes(1));
        let nearly_five = AccountProfile::default()
            .with_last_maintenance(now() - TimeDelta::hours(4) - TimeDelta::minutes(59));

        let just_over = EfficiencyBreakdown::compute(&just_over, 0, Grade::Bronze, now());
        let nearly_five = EfficiencyBreakdown::compute(&nearly_five, 0, Grade::Bronze, now());

        assert_eq!(just_over.maintenance_bonus, 0.0);
        assert_eq!(nearly_five.maintenance_bonus, 0.0);
        assert_eq!(nearly_five.value, 50.0);
    }

    #[test]
    fn test_efficiency_clamped_low() {
        let breakdown =
            EfficiencyBreakdown::compute(&AccountProfile::default(), 1000, Grade::Bronze, now());
        assert_eq!(breakdown.value, MIN_EFFICIENCY);
    }

    #[test]
    fn test_fully_boosted_profile() {
        let profile = AccountProfile::default()
            .with_daily_activity(true)
            .with_last_maintenance(now())
            .with_team_size(500)
            .with_social(SocialPlatform::Twitter)
            .with_social(SocialPlatform::Telegram)
            .with_social(SocialPlatform::Discord)
            .with_social(SocialPlatform::Youtube);
        let breakdown = EfficiencyBreakdown::compute(&profile, 0, Grade::Diamond, now());
        // 50 + 5 + 3 + 8 + 10 + 6
        assert_eq!(breakdown.value, 82.0);
    }

    #[test]
    fn test_efficiency_always_in_range() {
        for interruptions in [0, 1, 5, 20, 10_000] {
            for team in [0, 5, 60, 200] {
                for grade in [Grade::Bronze, Grade::Gold, Grade::Diamond] {
                    let profile = AccountProfile::default()
                        .with_team_size(team)
                        .with_daily_activity(team > 50);
                    let value =
                        EfficiencyBreakdown::compute(&profile, interruptions, grade, now()).value;
                    assert!((MIN_EFFICIENCY..=MAX_EFFICIENCY).contains(&value));
                }
            }
        }
    }

    #[test]
    fn test_tracker_grade_lags_one_update() {
        // 50 + 5 + 10 = 65 with a Bronze bonus
        let profile = AccountProfile::default()
            .with_daily_activity(true)
            .with_team_size(200);
        let mut tracker = EfficiencyTracker::default();

        let first = tracker.update(&profile, 0, now());
        assert_eq!(first.grade, Grade::Bronze);
        assert_eq!(first.value, 65.0);
        assert_eq!(tracker.grade(), Grade::Silver);

        // Silver adds 2 on the next pass
        let second = tracker.update(&profile, 0, now());
        assert_eq!(second.grade, Grade::Silver);
        assert_eq!(second.value, 67.0);
        assert_eq!(tracker.grade(), Grade::Silver);
    }

    #[test]
    fn test_tracker_grade_drops_after_interruptions() {
        let profile = AccountProfile::default()
            .with_daily_activity(true)
            .with_team_size(200);
        let mut tracker = EfficiencyTracker::new(Grade::Silver);

        let breakdown = tracker.update(&profile, 3, now());
        // 50 + 5 - 6 + 2 + 10
        assert_eq!(breakdown.value, 61.0);
        assert_eq!(tracker.grade(), Grade::Silver);

        let breakdown = tracker.update(&profile, 4, now());
        assert_eq!(breakdown.value, 59.0);
        assert_eq!(tracker.grade(), Grade::Bronze);
    }
}
