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

use crate::signal::{ExitReason, setup_signal_handler};
use minepulse_lib::cli_commands::client::open_session_client;
use minepulse_lib::config::Config;
use minepulse_lib::mining::actor::start_session_timer;
use minepulse_lib::mining::timer::{SessionTimer, TimerPhase, TimerSnapshot};
use minepulse_lib::utils::time_provider::{SystemTimeProvider, format_duration};
use std::error::Error;
use std::io::Write;
use std::time::Duration;
use tokio::sync::watch;
use tracing::info;

/// Sessions are keyed by wallet address
pub fn wallet_user_id(config: &Config) -> Result<String, Box<dyn Error>> {
    let wallet = config
        .wallet
        .as_ref()
        .ok_or("A [wallet] credential is required for this command")?;
    Ok(wallet.address.to_lowercase())
}

fn format_progress(snapshot: &TimerSnapshot) -> String {
    format!(
        "{} | {:.2} TH/s | {:.1}% ({}) | {:.6} earned",
        format_duration(snapshot.elapsed_secs),
        snapshot.hash_rate,
        snapshot.efficiency,
        snapshot.grade,
        snapshot.earnings
    )
}

pub async fn execute(config: Config, stop_on_exit: bool) -> Result<(), Box<dyn Error>> {
    let user_id = wallet_user_id(&config)?;
    let client = open_session_client(&config)?;

    let mut timer = SessionTimer::new(
        client,
        SystemTimeProvider,
        &config.mining,
        config.profile.clone(),
    );
    timer.set_user(Some(user_id));
    let handle = start_session_timer(
        timer,
        Duration::from_millis(config.mining.tick_interval_ms),
    );

    if handle.restore().await? {
        info!("Resuming active session");
    } else {
        let snapshot = handle.start().await?;
        info!(
            "Started session {}",
            snapshot.session_id.as_deref().unwrap_or_default()
        );
    }

    let (exit_tx, mut exit_rx) = watch::channel(ExitReason::None);
    let signal_handle = setup_signal_handler(exit_tx.clone(), stop_on_exit);
    let mut updates = handle.subscribe();

    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = updates.borrow_and_update().clone();
                print!("\r{}", format_progress(&snapshot));
                std::io::stdout().flush()?;
                if snapshot.phase == TimerPhase::Completed {
                    println!();
                    info!("Session complete, {:.6} earned", snapshot.earnings);
                    exit_tx.send_replace(ExitReason::Completed);
                    break;
                }
            }
            _ = exit_rx.changed() => {
                println!();
                let reason = *exit_rx.borrow_and_update();
                match reason {
                    ExitReason::StopSession => {
                        if let Some(session) = handle.stop().await? {
                            info!(
                                "Stopped session {} with {:.6} earned",
                                session.id, session.earnings
                            );
                        }
                    }
                    ExitReason::Detach => {
                        info!("Leaving session running, resume with the mine command");
                    }
                    ExitReason::None | ExitReason::Completed => {}
                }
                break;
            }
        }
    }

    handle.shutdown().await?;
    let _ = signal_handle.await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use minepulse_lib::mining::efficiency::Grade;

    #[test]
    fn test_wallet_user_id_is_lowercase_address() {
        let config = Config::load("../config.toml").unwrap();
        assert_eq!(
            wallet_user_id(&config).unwrap(),
            "0x8ba1f109551bd432803012645ac136ddd64dba72"
        );
    }

    #[test]
    fn test_format_progress() {
        let snapshot = TimerSnapshot {
            phase: TimerPhase::Active,
            session_id: Some("s1".to_string()),
            elapsed_secs: 3725,
            earnings: 0.372_5,
            hash_rate: 12.0,
            efficiency: 70.0,
            grade: Grade::Silver,
            interruptions: 0,
            active_booster: None,
        };

        assert_eq!(
            format_progress(&snapshot),
            "01:02:05 | 12.00 TH/s | 70.0% (Silver) | 0.372500 earned"
        );
    }
}
