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
use super::timer::{SessionTimer, TickOutcome, TimerError, TimerPhase, TimerSnapshot};
use crate::store::SessionStore;
use crate::utils::time_provider::TimeProvider;
use sessionrpc::MiningSession;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

const COMMAND_CHANNEL_CAPACITY: usize = 32;

/// Requests serialized through the timer actor
pub enum TimerCommand {
    Start(oneshot::Sender<Result<TimerSnapshot, TimerError>>),
    Stop(oneshot::Sender<Result<Option<MiningSession>, TimerError>>),
    Restore(oneshot::Sender<Result<bool, TimerError>>),
    History(u32, oneshot::Sender<Result<Vec<MiningSession>, TimerError>>),
    SetUser(Option<String>, oneshot::Sender<()>),
    SetProfile(AccountProfile, oneshot::Sender<TimerSnapshot>),
    DrawBooster(oneshot::Sender<LuckyBooster>),
    ApplyBooster(oneshot::Sender<bool>),
    DiscardBooster(oneshot::Sender<Option<LuckyBooster>>),
    Snapshot(oneshot::Sender<TimerSnapshot>),
    Shutdown(oneshot::Sender<()>),
}

/// Cloneable handle to the session timer actor.
///
/// Passed explicitly to whatever needs the timer; there is no global instance.
#[derive(Clone)]
pub struct SessionTimerHandle {
    command_tx: mpsc::Sender<TimerCommand>,
    snapshot_rx: watch::Receiver<TimerSnapshot>,
}

impl SessionTimerHandle {
    async fn request<R>(
        &self,
        command: impl FnOnce(oneshot::Sender<R>) -> TimerCommand,
    ) -> Result<R, TimerError> {
        let (tx, rx) = oneshot::channel();
        self.command_tx
            .send(command(tx))
            .await
            .map_err(|_| TimerError::ActorStopped)?;
        rx.await.map_err(|_| TimerError::ActorStopped)
    }

    pub async fn start(&self) -> Result<TimerSnapshot, TimerError> {
        self.request(TimerCommand::Start).await?
    }

    pub async fn stop(&self) -> Result<Option<MiningSession>, TimerError> {
        self.request(TimerCommand::Stop).await?
    }

    pub async fn restore(&self) -> Result<bool, TimerError> {
        self.request(TimerCommand::Restore).await?
    }

    pub async fn history(&self, limit: u32) -> Result<Vec<MiningSession>, TimerError> {
        self.request(|tx| TimerCommand::History(limit, tx)).await?
    }

    pub async fn set_user(&self, user_id: Option<String>) -> Result<(), TimerError> {
        self.request(|tx| TimerCommand::SetUser(user_id, tx)).await
    }

    pub async fn set_profile(&self, profile: AccountProfile) -> Result<TimerSnapshot, TimerError> {
        self.request(|tx| TimerCommand::SetProfile(profile, tx)).await
    }

    pub async fn draw_booster(&self) -> Result<LuckyBooster, TimerError> {
        self.request(TimerCommand::DrawBooster).await
    }

    pub async fn apply_booster(&self) -> Result<bool, TimerError> {
        self.request(TimerCommand::ApplyBooster).await
    }

    pub async fn discard_booster(&self) -> Result<Option<LuckyBooster>, TimerError> {
        self.request(TimerCommand::DiscardBooster).await
    }

    pub async fn snapshot(&self) -> Result<TimerSnapshot, TimerError> {
        self.request(TimerCommand::Snapshot).await
    }

    pub async fn shutdown(&self) -> Result<(), TimerError> {
        self.request(TimerCommand::Shutdown).await
    }

    /// Receiver of the snapshot published after every tick and command
    pub fn subscribe(&self) -> watch::Receiver<TimerSnapshot> {
        self.snapshot_rx.clone()
    }
}

/// Spawn the actor owning `timer` and return its handle
pub fn start_session_timer<S, T>(
    timer: SessionTimer<S, T>,
    tick_interval: Duration,
) -> SessionTimerHandle
where
    S: SessionStore + 'static,
    T: TimeProvider + Send + Sync + 'static,
{
    let (command_tx, command_rx) = mpsc::channel(COMMAND_CHANNEL_CAPACITY);
    let (snapshot_tx, snapshot_rx) = watch::channel(timer.snapshot());

    let actor = TimerActor {
        timer,
        command_rx,
        snapshot_tx,
        tick_interval,
    };
    tokio::spawn(async move {
        actor.run().await;
    });

    SessionTimerHandle {
        command_tx,
        snapshot_rx,
    }
}

struct TimerActor<S, T> {
    timer: SessionTimer<S, T>,
    command_rx: mpsc::Receiver<TimerCommand>,
    snapshot_tx: watch::Sender<TimerSnapshot>,
    tick_interval: Duration,
}

impl<S, T> TimerActor<S, T>
where
    S: SessionStore,
    T: TimeProvider + Send + Sync,
{
    async fn run(mut self) {
        let mut ticker = tokio::time::interval(self.tick_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                command = self.command_rx.recv() => {
                    match command {
                        Some(TimerCommand::Shutdown(reply)) => {
                            info!("Session timer shutting down");
                            let _ = reply.send(());
                            return;
                        }
                        Some(command) => self.handle_command(command).await,
                        None => {
                            debug!("All timer handles dropped, stopping actor");
                            return;
                        }
                    }
                    self.publish();
                }
                _ = ticker.tick(), if self.timer.phase() == TimerPhase::Active => {
                    if let TickOutcome::Completed {
                        session_id, earnings, ..
                    } = self.timer.tick().await
                    {
                        info!("Session {} completed with {:.6} earned", session_id, earnings);
                    }
                    self.publish();
                }
            }
        }
    }

    async fn handle_command(&mut self, command: TimerCommand) {
        match command {
            TimerCommand::Start(reply) => {
                let _ = reply.send(self.timer.start().await);
            }
            TimerCommand::Stop(reply) => {
                let _ = reply.send(self.timer.stop().await);
            }
            TimerCommand::Restore(reply) => {
                let _ = reply.send(self.timer.restore().await);
            }
            TimerCommand::History(limit, reply) => {
                let _ = reply.send(self.timer.history(limit).await);
            }
            TimerCommand::SetUser(user_id, reply) => {
                self.timer.set_user(user_id);
                let _ = reply.send(());
            }
            TimerCommand::SetProfile(profile, reply) => {
                self.timer.set_profile(profile);
                let _ = reply.send(self.timer.snapshot());
            }
            TimerCommand::DrawBooster(reply) => {
                let booster = self.timer.draw_booster(&mut rand::thread_rng());
                let _ = reply.send(booster);
            }
            TimerCommand::ApplyBooster(reply) => {
                let _ = reply.send(self.timer.apply_booster());
            }
            TimerCommand::DiscardBooster(reply) => {
                let _ = reply.send(self.timer.discard_booster());
            }
            TimerCommand::Snapshot(reply) => {
                let _ = reply.send(self.timer.snapshot());
            }
            TimerCommand::Shutdown(reply) => {
                let _ = reply.send(());
            }
        }
    }

    fn publish(&self) {
        self.snapshot_tx.send_replace(self.timer.snapshot());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MiningConfig;
    use crate::mining::earnings::{SESSION_CEILING_SECS, settle_earnings};
    use crate::store::MockSessionStore;
    use crate::utils::time_provider::TestTimeProvider;
    use chrono::{DateTime, Utc};
    use sessionrpc::SessionStatus;

    fn start_time() -> DateTime<Utc> {
        DateTime::from_timestamp(1_767_225_600, 0).unwrap()
    }

    fn active_session() -> MiningSession {
        MiningSession {
            id: "s1".to_string(),
            user_id: "user-1".to_string(),
            start_time: start_time(),
            end_time: None,
            status: SessionStatus::Active,
            hash_rate: 12.0,
            efficiency: 50.0,
            earnings: 0.0,
        }
    }

    fn spawn_with(store: MockSessionStore, clock: &TestTimeProvider) -> SessionTimerHandle {
        let mut timer = SessionTimer::new(
            store,
            clock.clone(),
            &MiningConfig::default(),
            AccountProfile::default(),
        );
        timer.set_user(Some("user-1".to_string()));
        start_session_timer(timer, Duration::from_secs(1))
    }

    #[tokio::test(start_paused = true)]
    async fn test_actor_auto_completes_at_ceiling() {
        let clock = TestTimeProvider::new(start_time());
        let mut store = MockSessionStore::new();
        store
            .expect_start_session()
            .times(1)
            .returning(|_, _, _| Ok(active_session()));
        store
            .expect_end_session()
            .times(1)
            .returning(|_, _| Ok(()));

        let handle = spawn_with(store, &clock);
        let mut updates = handle.subscribe();
        handle.start().await.unwrap();

        clock.advance_secs(SESSION_CEILING_SECS as i64);
        loop {
            updates.changed().await.unwrap();
            if updates.borrow().phase == TimerPhase::Completed {
                break;
            }
        }

        let snapshot = handle.snapshot().await.unwrap();
        let expected = settle_earnings(SESSION_CEILING_SECS, SESSION_CEILING_SECS, 12.0, 50.0);
        assert_eq!(snapshot.elapsed_secs, SESSION_CEILING_SECS);
        assert!((snapshot.earnings - expected).abs() < 1e-9);
        assert_eq!(snapshot.interruptions, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticks_publish_wall_clock_elapsed() {
        let clock = TestTimeProvider::new(start_time());
        let mut store = MockSessionStore::new();
        store
            .expect_start_session()
            .times(1)
            .returning(|_, _, _| Ok(active_session()));

        let handle = spawn_with(store, &clock);
        let mut updates = handle.subscribe();
        handle.start().await.unwrap();

        clock.advance_secs(90);
        loop {
            updates.changed().await.unwrap();
            if updates.borrow().elapsed_secs == 90 {
                break;
            }
        }
        assert_eq!(updates.borrow().phase, TimerPhase::Active);
        assert!(updates.borrow().earnings > 0.0);
    }

    #[tokio::test]
    async fn test_stop_through_handle() {
        let clock = TestTimeProvider::new(start_time());
        let mut store = MockSessionStore::new();
        store
            .expect_start_session()
            .times(1)
            .returning(|_, _, _| Ok(active_session()));
        store
            .expect_end_session()
            .times(1)
            .returning(|_, _| Ok(()));

        let handle = spawn_with(store, &clock);
        assert!(handle.stop().await.unwrap().is_none());

        handle.start().await.unwrap();
        clock.advance_secs(60);
        let ended = handle.stop().await.unwrap().unwrap();

        assert_eq!(ended.status, SessionStatus::Completed);
        let snapshot = handle.snapshot().await.unwrap();
        assert_eq!(snapshot.phase, TimerPhase::Completed);
        assert_eq!(snapshot.interruptions, 1);
    }

    #[tokio::test]
    async fn test_stop_queued_past_ceiling_settles_once() {
        let clock = TestTimeProvider::new(start_time());
        let mut store = MockSessionStore::new();
        store
            .expect_start_session()
            .times(1)
            .returning(|_, _, _| Ok(active_session()));
        store
            .expect_end_session()
            .times(1)
            .returning(|_, _| Ok(()));

        let handle = spawn_with(store, &clock);
        handle.start().await.unwrap();
        // Whether the tick or the stop gets there first, the result is a ceiling completion
        clock.advance_secs(SESSION_CEILING_SECS as i64 + 30);
        handle.stop().await.unwrap();

        let snapshot = handle.snapshot().await.unwrap();
        assert_eq!(snapshot.phase, TimerPhase::Completed);
        assert_eq!(snapshot.elapsed_secs, SESSION_CEILING_SECS);
        assert_eq!(snapshot.interruptions, 0);
    }

    #[tokio::test]
    async fn test_booster_commands() {
        let clock = TestTimeProvider::new(start_time());
        let handle = spawn_with(MockSessionStore::new(), &clock);

        let candidate = handle.draw_booster().await.unwrap();
        assert!((3..=15).contains(&candidate.hash_rate_boost));
        assert!(handle.apply_booster().await.unwrap());

        let snapshot = handle.snapshot().await.unwrap();
        assert_eq!(snapshot.active_booster, Some(candidate));
        assert!(snapshot.hash_rate > 12.0);

        // Nothing left to apply or discard
        assert!(!handle.apply_booster().await.unwrap());
        assert!(handle.discard_booster().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_set_user_and_profile() {
        let clock = TestTimeProvider::new(start_time());
        let handle = spawn_with(MockSessionStore::new(), &clock);

        handle.set_user(None).await.unwrap();
        assert!(matches!(
            handle.start().await,
            Err(TimerError::NotAuthenticated)
        ));

        let snapshot = handle
            .set_profile(AccountProfile::default().with_daily_activity(true))
            .await
            .unwrap();
        assert_eq!(snapshot.efficiency, 55.0);
    }

    #[tokio::test]
    async fn test_shutdown_stops_actor() {
        let clock = TestTimeProvider::new(start_time());
        let handle = spawn_with(MockSessionStore::new(), &clock);

        handle.shutdown().await.unwrap();

        assert!(matches!(
            handle.snapshot().await,
            Err(TimerError::ActorStopped)
        ));
    }
}
