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
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;
use tracing::info;

/// How long a drawn booster stays valid
pub const BOOSTER_LIFETIME_HOURS: i64 = 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rarity {
    Common,
    Rare,
    Epic,
    Legendary,
}

/// Cumulative draw weights in percent, checked in order
const RARITY_TABLE: [(Rarity, f64); 4] = [
    (Rarity::Common, 60.0),
    (Rarity::Rare, 90.0),
    (Rarity::Epic, 98.0),
    (Rarity::Legendary, 100.0),
];

impl Rarity {
    /// Map a roll in [0, 1) onto the 60/30/8/2 weighted tiers
    pub fn from_roll(roll: f64) -> Self {
        let percent = roll.clamp(0.0, 1.0) * 100.0;
        RARITY_TABLE
            .iter()
            .find(|(_, upper)| percent < *upper)
            .map(|(rarity, _)| *rarity)
            .unwrap_or(Rarity::Legendary)
    }

    /// Inclusive range of integer boost percentages for this tier
    pub fn boost_range(&self) -> RangeInclusive<u32> {
        match self {
            Rarity::Common => 3..=5,
            Rarity::Rare => 6..=9,
            Rarity::Epic => 10..=12,
            Rarity::Legendary => 13..=15,
        }
    }

    fn display_name(&self) -> &'static str {
        match self {
            Rarity::Common => "Spark Booster",
            Rarity::Rare => "Surge Booster",
            Rarity::Epic => "Overclock Booster",
            Rarity::Legendary => "Quantum Core Booster",
        }
    }
}

impl fmt::Display for Rarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Rarity::Common => "common",
            Rarity::Rare => "rare",
            Rarity::Epic => "epic",
            Rarity::Legendary => "legendary",
        };
        write!(f, "{name}")
    }
}

/// A time-limited percentage bonus on hash rate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LuckyBooster {
    pub id: String,
    pub name: String,
    pub hash_rate_boost: u32,
    pub rarity: Rarity,
    pub expires_at: DateTime<Utc>,
}

/// Build a booster from two rolls in [0, 1): one picks the tier, the other the boost inside it
pub fn booster_from_rolls(
    id: String,
    rarity_roll: f64,
    boost_roll: f64,
    now: DateTime<Utc>,
) -> LuckyBooster {
    let rarity = Rarity::from_roll(rarity_roll);
    let range = rarity.boost_range();
    let span = range.end() - range.start() + 1;
    let offset = ((boost_roll.clamp(0.0, 1.0) * span as f64) as u32).min(span - 1);

    LuckyBooster {
        id,
        name: rarity.display_name().to_string(),
        hash_rate_boost: range.start() + offset,
        rarity,
        expires_at: now + TimeDelta::hours(BOOSTER_LIFETIME_HOURS),
    }
}

/// Draw a candidate booster. Stateless, nothing is applied.
pub fn draw_booster<R: Rng + ?Sized>(rng: &mut R, now: DateTime<Utc>) -> LuckyBooster {
    let id = format!("booster-{:016x}", rng.r#gen::<u64>());
    let rarity_roll: f64 = rng.r#gen();
    let boost_roll: f64 = rng.r#gen();
    booster_from_rolls(id, rarity_roll, boost_roll, now)
}

/// Holds the drawn candidate and the single active booster
#[derive(Debug, Clone, Default)]
pub struct BoosterSlot {
    candidate: Option<LuckyBooster>,
    active: Option<LuckyBooster>,
}

impl BoosterSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Draw a new candidate, replacing any undecided one
    pub fn draw<R: Rng + ?Sized>(&mut self, rng: &mut R, now: DateTime<Utc>) -> &LuckyBooster {
        let booster = draw_booster(rng, now);
        info!(
            "Drew {} booster {} (+{}%)",
            booster.rarity, booster.id, booster.hash_rate_boost
        );
        self.candidate.insert(booster)
    }

    pub fn candidate(&self) -> Option<&LuckyBooster> {
        self.candidate.as_ref()
    }

    pub fn active(&self) -> Option<&LuckyBooster> {
        self.active.as_ref()
    }

    /// Activate the pending candidate, superseding the active booster.
    ///
    /// Returns false when there is no candidate.
    pub fn apply(&mut self) -> bool {
        match self.candidate.take() {
            Some(booster) => {
                self.set_active(booster);
                true
            }
            None => false,
        }
    }

    /// Make the given booster the only active one. Boosters never stack.
    pub fn set_active(&mut self, booster: LuckyBooster) {
        if let Some(previous) = &self.active {
            info!("Booster {} superseded by {}", previous.id, booster.id);
        }
        self.active = Some(booster);
    }

    /// Drop the pending candidate without touching the active booster
    pub fn discard(&mut self) -> Option<LuckyBooster> {
        self.candidate.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_767_225_600, 0).unwrap()
    }

    fn booster(id: &str, boost: u32) -> LuckyBooster {
        LuckyBooster {
            id: id.to_string(),
            name: "test".to_string(),
            hash_rate_boost: boost,
            rarity: Rarity::Common,
            expires_at: now(),
        }
    }

    #[test]
    fn test_rarity_bands() {
        assert_eq!(Rarity::from_roll(0.0), Rarity::Common);
        assert_eq!(Rarity::from_roll(0.5999), Rarity::Common);
        assert_eq!(Rarity::from_roll(0.60), Rarity::Rare);
        assert_eq!(Rarity::from_roll(0.8999), Rarity::Rare);
        assert_eq!(Rarity::from_roll(0.90), Rarity::Epic);
        assert_eq!(Rarity::from_roll(0.9799), Rarity::Epic);
        assert_eq!(Rarity::from_roll(0.98), Rarity::Legendary);
        assert_eq!(Rarity::from_roll(0.99999), Rarity::Legendary);
    }

    #[test]
    fn test_legendary_roll_boost_range() {
        for boost_roll in [0.0, 0.33, 0.5, 0.67, 0.99999] {
            let booster = booster_from_rolls("b".to_string(), 0.99, boost_roll, now());
            assert_eq!(booster.rarity, Rarity::Legendary);
            assert!((13..=15).contains(&booster.hash_rate_boost));
        }
        let lowest = booster_from_rolls("b".to_string(), 0.99, 0.0, now());
        let highest = booster_from_rolls("b".to_string(), 0.99, 0.99999, now());
        assert_eq!(lowest.hash_rate_boost, 13);
        assert_eq!(highest.hash_rate_boost, 15);
    }

    #[test]
    fn test_booster_expires_after_lifetime() {
        let booster = booster_from_rolls("b".to_string(), 0.1, 0.1, now());
        assert_eq!(booster.expires_at - now(), TimeDelta::hours(24));
    }

    #[test]
    fn test_seeded_draws_stay_in_tier_ranges() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut seen_common = false;
        for _ in 0..1000 {
            let booster = draw_booster(&mut rng, now());
            assert!(booster.rarity.boost_range().contains(&booster.hash_rate_boost));
            seen_common |= booster.rarity == Rarity::Common;
        }
        assert!(seen_common);
    }

    #[test]
    fn test_apply_replaces_never_stacks() {
        let mut slot = BoosterSlot::new();
        slot.set_active(booster("b1", 5));
        slot.candidate = Some(booster("b2", 12));

        assert!(slot.apply());
        assert_eq!(slot.active().unwrap().id, "b2");
        assert_eq!(slot.active().unwrap().hash_rate_boost, 12);
        assert!(slot.candidate().is_none());
    }

    #[test]
    fn test_apply_without_candidate() {
        let mut slot = BoosterSlot::new();
        slot.set_active(booster("b1", 5));
        assert!(!slot.apply());
        assert_eq!(slot.active().unwrap().id, "b1");
    }

    #[test]
    fn test_discard_keeps_active() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut slot = BoosterSlot::new();
        slot.set_active(booster("b1", 4));

        let drawn_id = slot.draw(&mut rng, now()).id.clone();
        let discarded = slot.discard().unwrap();

        assert_eq!(discarded.id, drawn_id);
        assert!(slot.candidate().is_none());
        assert_eq!(slot.active().unwrap().id, "b1");
    }
}
