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

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use sessionrpc::{MiningSession, SessionRpcClient, SessionRpcError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Session backend call failed: {0}")]
    Rpc(#[from] SessionRpcError),
    #[error("Session backend refused to end session {0}")]
    EndRejected(String),
}

/// Persistence collaborator for mining sessions.
/// Implemented by the edge function client and mocked in tests.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn start_session(
        &self,
        user_id: &str,
        hash_rate: f64,
        efficiency: f64,
    ) -> Result<MiningSession, StoreError>;

    async fn end_session(&self, session_id: &str, earnings: f64) -> Result<(), StoreError>;

    async fn get_active_session(&self, user_id: &str)
    -> Result<Option<MiningSession>, StoreError>;

    async fn get_history(&self, user_id: &str, limit: u32)
    -> Result<Vec<MiningSession>, StoreError>;
}

#[async_trait]
impl SessionStore for SessionRpcClient {
    async fn start_session(
        &self,
        user_id: &str,
        hash_rate: f64,
        efficiency: f64,
    ) -> Result<MiningSession, StoreError> {
        Ok(SessionRpcClient::start_session(self, user_id, hash_rate, efficiency).await?)
    }

    async fn end_session(&self, session_id: &str, earnings: f64) -> Result<(), StoreError> {
        if SessionRpcClient::end_session(self, session_id, earnings).await? {
            Ok(())
        } else {
            Err(StoreError::EndRejected(session_id.to_string()))
        }
    }

    async fn get_active_session(
        &self,
        user_id: &str,
    ) -> Result<Option<MiningSession>, StoreError> {
        Ok(SessionRpcClient::get_active_session(self, user_id).await?)
    }

    async fn get_history(
        &self,
        user_id: &str,
        limit: u32,
    ) -> Result<Vec<MiningSession>, StoreError> {
        Ok(SessionRpcClient::get_history(self, user_id, limit).await?)
    }
}
