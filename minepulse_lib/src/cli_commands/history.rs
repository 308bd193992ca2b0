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

use crate::store::SessionStore;
use crate::utils::time_provider::{elapsed_secs, format_duration, format_timestamp};
use serde::Serialize;
use sessionrpc::{MiningSession, SessionStatus};
use std::error::Error;

#[derive(Serialize, Debug)]
pub struct SessionInfo {
    pub id: String,
    pub status: SessionStatus,
    pub started: String,
    pub ended: Option<String>,
    /// Empty while the session is still running
    pub duration: Option<String>,
    pub hash_rate: f64,
    pub efficiency: f64,
    pub earnings: f64,
}

impl From<MiningSession> for SessionInfo {
    fn from(session: MiningSession) -> Self {
        let duration = session
            .end_time
            .map(|end| format_duration(elapsed_secs(session.start_time, end)));
        Self {
            id: session.id,
            status: session.status,
            started: format_timestamp(session.start_time.timestamp()),
            ended: session.end_time.map(|end| format_timestamp(end.timestamp())),
            duration,
            hash_rate: session.hash_rate,
            efficiency: session.efficiency,
            earnings: session.earnings,
        }
    }
}

pub async fn build_history(
    store: &dyn SessionStore,
    user_id: &str,
    limit: u32,
) -> Result<Vec<SessionInfo>, Box<dyn Error>> {
    let sessions = store.get_history(user_id, limit).await?;
    Ok(sessions.into_iter().map(SessionInfo::from).collect())
}

pub async fn execute(
    store: &dyn SessionStore,
    user_id: &str,
    limit: u32,
) -> Result<(), Box<dyn Error>> {
    let history = build_history(store, user_id, limit).await?;
    let total: f64 = history.iter().map(|s| s.earnings).sum();

    println!("{}", serde_json::to_string_pretty(&history)?);
    println!("Sessions: {}, total earned: {:.6}", history.len(), total);
    Ok(())
}
