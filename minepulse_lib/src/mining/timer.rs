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

use super::bonus::{BonusModel, MiningRates};
use super::booster::LuckyBooster;
use super::earnings::{project_earnings, settle_earnings};
use super::efficiency::Grade;
use super::profile::AccountProfile;
use crate::config::MiningConfig;
use crate::store::{SessionStore, StoreError};
use crate::utils::time_provider::{TimeProvider, elapsed_secs};
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::Serialize;
use sessionrpc::{MiningSession, SessionStatus};
use thiserror::Error;
use tracing::{debug, error, info, warn};

#[derive(Error, Debug)]
pub enum TimerError {
    #[error("No authenticated user")]
    NotAuthenticated,
    #[error("Session {0} is already active")]
    AlreadyActive(String),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("Session timer has shut down")]
    ActorStopped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerPhase {
    Idle,
    Active,
    Completed,
}

/// What a tick did
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// No session is running
    Idle,
    Running { elapsed_secs: u64, earnings: f64 },
    /// The ceiling was reached and the session settled.
    /// `persisted` is false when the end call failed; the session is over either way.
    Completed {
        session_id: String,
        earnings: f64,
        persisted: bool,
    },
}

/// Display state of the timer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimerSnapshot {
    pub phase: TimerPhase,
    pub session_id: Option<String>,
    pub elapsed_secs: u64,
    pub earnings: f64,
    pub hash_rate: f64,
    pub efficiency: f64,
    pub grade: Grade,
    pub interruptions: u32,
    pub active_booster: Option<LuckyBooster>,
}

/// Mining session state machine: idle -> active -> completed, completed -> active.
///
/// Elapsed time is always derived from the wall clock against the session's stored
/// start time, never accumulated from ticks.
pub struct SessionTimer<S, T> {
    store: S,
    time_provider: T,
    ceiling_secs: u64,
    user_id: Option<String>,
    bonus: BonusModel,
    rates: MiningRates,
    phase: TimerPhase,
    /// The running session, or the last completed one
    session: Option<MiningSession>,
    elapsed_secs: u64,
    earnings: f64,
}

impl<S: SessionStore, T: TimeProvider> SessionTimer<S, T> {
    pub fn new(store: S, time_provider: T, config: &MiningConfig, profile: AccountProfile) -> Self {
        let mut bonus = BonusModel::new(config, profile);
        let rates = bonus.recompute(time_provider.now());
        Self {
            store,
            time_provider,
            ceiling_secs: config.session_ceiling_secs,
            user_id: None,
            bonus,
            rates,
            phase: TimerPhase::Idle,
            session: None,
            elapsed_secs: 0,
            earnings: 0.0,
        }
    }

    /// Set or clear the authenticated user
    pub fn set_user(&mut self, user_id: Option<String>) {
        self.user_id = user_id;
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    pub fn phase(&self) -> TimerPhase {
        self.phase
    }

    pub fn session(&self) -> Option<&MiningSession> {
        self.session.as_ref()
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed_secs
    }

    pub fn earnings(&self) -> f64 {
        self.earnings
    }

    pub fn rates(&self) -> &MiningRates {
        &self.rates
    }

    pub fn bonus(&self) -> &BonusModel {
        &self.bonus
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot {
            phase: self.phase,
            session_id: self.session.as_ref().map(|s| s.id.clone()),
            elapsed_secs: self.elapsed_secs,
            earnings: self.earnings,
            hash_rate: self.rates.hash_rate.current,
            efficiency: self.rates.efficiency.value,
            grade: self.rates.grade,
            interruptions: self.bonus.interruptions(),
            active_booster: self.bonus.active_booster().cloned(),
        }
    }

    fn refresh(&mut self, now: DateTime<Utc>) {
        self.rates = self.bonus.recompute(now);
    }

    pub fn set_profile(&mut self, profile: AccountProfile) {
        self.bonus.set_profile(profile);
        self.refresh(self.time_provider.now());
    }

    /// Draw a booster candidate; nothing changes until it is applied
    pub fn draw_booster<R: Rng + ?Sized>(&mut self, rng: &mut R) -> LuckyBooster {
        self.bonus.draw_booster(rng, self.time_provider.now())
    }

    pub fn apply_booster(&mut self) -> bool {
        let applied = self.bonus.apply_booster();
        if applied {
            self.refresh(self.time_provider.now());
        }
        applied
    }

    pub fn discard_booster(&mut self) -> Option<LuckyBooster> {
        self.bonus.discard_booster()
    }

    /// Start a fresh session. Allowed from idle or completed.
    ///
    /// Nothing changes when the store refuses to create the session.
    pub async fn start(&mut self) -> Result<TimerSnapshot, TimerError> {
        let user_id = self.user_id.clone().ok_or(TimerError::NotAuthenticated)?;
        if self.phase == TimerPhase::Active {
            let id = self
                .session
                .as_ref()
                .map(|s| s.id.clone())
                .unwrap_or_default();
            return Err(TimerError::AlreadyActive(id));
        }

        self.refresh(self.time_provider.now());
        let session = self
            .store
            .start_session(
                &user_id,
                self.rates.hash_rate.current,
                self.rates.efficiency.value,
            )
            .await
            .inspect_err(|e| error!("Failed to start mining session for {}: {}", user_id, e))?;

        info!(
            "Mining session {} started at {:.2} TH/s, {:.1}% efficiency",
            session.id, session.hash_rate, session.efficiency
        );
        self.session = Some(session);
        self.phase = TimerPhase::Active;
        self.elapsed_secs = 0;
        self.earnings = 0.0;
        Ok(self.snapshot())
    }

    /// Advance the running session to the current wall-clock time.
    ///
    /// Reaching the ceiling settles the session with clamped elapsed time and issues
    /// the end call once. The timer moves to completed even if that call fails.
    pub async fn tick(&mut self) -> TickOutcome {
        if self.phase != TimerPhase::Active {
            return TickOutcome::Idle;
        }
        let Some(start_time) = self.session.as_ref().map(|s| s.start_time) else {
            return TickOutcome::Idle;
        };

        let now = self.time_provider.now();
        self.elapsed_secs = elapsed_secs(start_time, now);
        self.refresh(now);
        let hash_rate = self.rates.hash_rate.current;
        let efficiency = self.rates.efficiency.value;
        self.earnings = project_earnings(self.elapsed_secs, hash_rate, efficiency);

        if self.elapsed_secs < self.ceiling_secs {
            return TickOutcome::Running {
                elapsed_secs: self.elapsed_secs,
                earnings: self.earnings,
            };
        }
        self.complete_at_ceiling(now, hash_rate, efficiency).await
    }

    /// Settle a session that has run to the ceiling. Never counts as an interruption.
    async fn complete_at_ceiling(
        &mut self,
        now: DateTime<Utc>,
        hash_rate: f64,
        efficiency: f64,
    ) -> TickOutcome {
        let earnings = settle_earnings(self.ceiling_secs, self.ceiling_secs, hash_rate, efficiency);
        let session_id = self
            .session
            .as_ref()
            .map(|s| s.id.clone())
            .unwrap_or_default();
        info!(
            "Mining session {} reached the {}s ceiling, settling {:.6}",
            session_id, self.ceiling_secs, earnings
        );
        let persisted = match self.store.end_session(&session_id, earnings).await {
            Ok(()) => true,
            Err(e) => {
                // No reconciliation: the client treats the session as over regardless
                warn!("Failed to record end of session {}: {}", session_id, e);
                false
            }
        };
        self.elapsed_secs = self.ceiling_secs;
        self.finish(now, earnings);
        TickOutcome::Completed {
            session_id,
            earnings,
            persisted,
        }
    }

    /// Stop the running session on user request.
    ///
    /// A no-op without an active session. If the store fails the session stays active.
    /// A stop past the ceiling settles as a ceiling completion instead.
    pub async fn stop(&mut self) -> Result<Option<MiningSession>, TimerError> {
        if self.phase != TimerPhase::Active {
            debug!("Stop requested without an active session");
            return Ok(None);
        }
        let Some((session_id, start_time)) =
            self.session.as_ref().map(|s| (s.id.clone(), s.start_time))
        else {
            return Ok(None);
        };

        let now = self.time_provider.now();
        let elapsed = elapsed_secs(start_time, now);
        self.refresh(now);
        let hash_rate = self.rates.hash_rate.current;
        let efficiency = self.rates.efficiency.value;

        // The ceiling passed before a tick could settle it
        if elapsed >= self.ceiling_secs {
            debug!("Stop of session {} arrived after the ceiling", session_id);
            self.complete_at_ceiling(now, hash_rate, efficiency).await;
            return Ok(self.session.clone());
        }

        let earnings = settle_earnings(elapsed, self.ceiling_secs, hash_rate, efficiency);

        self.store
            .end_session(&session_id, earnings)
            .await
            .inspect_err(|e| error!("Failed to stop mining session {}: {}", session_id, e))?;

        info!(
            "Mining session {} stopped after {}s with {:.6} earned",
            session_id, elapsed, earnings
        );
        self.elapsed_secs = elapsed;
        self.finish(now, earnings);
        self.bonus.record_interruption();
        self.refresh(now);
        Ok(self.session.clone())
    }

    /// Resume a session the backend still considers active, e.g. after a restart.
    ///
    /// Returns true when a session was resumed.
    pub async fn restore(&mut self) -> Result<bool, TimerError> {
        let user_id = self.user_id.clone().ok_or(TimerError::NotAuthenticated)?;
        if self.phase == TimerPhase::Active {
            return Ok(true);
        }

        let Some(session) = self.store.get_active_session(&user_id).await? else {
            debug!("No active session to restore for {}", user_id);
            return Ok(false);
        };
        if !session.is_active() {
            warn!(
                "Backend returned session {} with status {:?} as active, ignoring",
                session.id, session.status
            );
            return Ok(false);
        }

        let now = self.time_provider.now();
        self.elapsed_secs = elapsed_secs(session.start_time, now);
        self.refresh(now);
        self.earnings = project_earnings(
            self.elapsed_secs,
            self.rates.hash_rate.current,
            self.rates.efficiency.value,
        );
        info!(
            "Restored mining session {} at {}s elapsed",
            session.id, self.elapsed_secs
        );
        self.session = Some(session);
        self.phase = TimerPhase::Active;
        Ok(true)
    }

    /// Most recent sessions of the authenticated user
    pub async fn history(&self, limit: u32) -> Result<Vec<MiningSession>, TimerError> {
        let user_id = self.user_id.as_deref().ok_or(TimerError::NotAuthenticated)?;
        Ok(self.store.get_history(user_id, limit).await?)
    }

    fn finish(&mut self, now: DateTime<Utc>, earnings: f64) {
        if let Some(session) = self.session.as_mut() {
            session.status = SessionStatus::Completed;
            session.end_time = Some(now);
            session.earnings = earnings;
        }
        self.earnings = earnings;
        self.phase = TimerPhase::Completed;
    }
}
