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

#[cfg(unix)]
use tokio::signal::unix::{self, SignalKind};

use tokio::{sync::watch, task::JoinHandle};
use tracing::{error, info};

/// How `mine` leaves the session it is following
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExitReason {
    /// Still following the session
    None,
    /// Leave the session running on the backend, resume it with `mine` later
    Detach,
    /// End the session now, which counts as an interruption
    StopSession,
    /// The session reached its ceiling
    Completed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Received {
    Interrupt,
    Terminate,
    Hangup,
}

impl Received {
    /// A hangup means the terminal went away, so the session is only ever detached
    fn exit_reason(self, stop_on_exit: bool) -> ExitReason {
        match self {
            Received::Interrupt | Received::Terminate if stop_on_exit => ExitReason::StopSession,
            _ => ExitReason::Detach,
        }
    }
}

fn leave(exit_sender: &watch::Sender<ExitReason>, received: Received, stop_on_exit: bool) {
    let reason = received.exit_reason(stop_on_exit);
    info!("Received {received:?}, leaving session with {reason:?}");
    exit_sender.send_replace(reason);
}

#[cfg(unix)]
pub fn setup_signal_handler(
    exit_sender: watch::Sender<ExitReason>,
    stop_on_exit: bool,
) -> JoinHandle<()> {
    let mut exit_receiver = exit_sender.subscribe();
    tokio::spawn(async move {
        let (mut hangup, mut terminate) = match (
            unix::signal(SignalKind::hangup()),
            unix::signal(SignalKind::terminate()),
        ) {
            (Ok(hangup), Ok(terminate)) => (hangup, terminate),
            (Err(e), _) | (_, Err(e)) => {
                error!("Failed to install signal handlers: {e}");
                return;
            }
        };

        let received = tokio::select! {
            _ = exit_receiver.changed() => None,
            _ = tokio::signal::ctrl_c() => Some(Received::Interrupt),
            _ = hangup.recv() => Some(Received::Hangup),
            _ = terminate.recv() => Some(Received::Terminate),
        };

        if let Some(received) = received {
            leave(&exit_sender, received, stop_on_exit);
        }
    })
}

#[cfg(not(unix))]
pub fn setup_signal_handler(
    exit_sender: watch::Sender<ExitReason>,
    stop_on_exit: bool,
) -> JoinHandle<()> {
    let mut exit_receiver = exit_sender.subscribe();
    tokio::spawn(async move {
        tokio::select! {
            _ = exit_receiver.changed() => {},
            _ = tokio::signal::ctrl_c() => leave(&exit_sender, Received::Interrupt, stop_on_exit),
        };
    })
}
