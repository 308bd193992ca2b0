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

pub mod draw;
pub mod history;
pub mod project;
pub mod rates;

pub mod client {
    use crate::config::Config;
    use sessionrpc::{SessionRpcClient, SessionRpcError};

    /// Build the session backend client from the configured wallet credential
    pub fn open_session_client(config: &Config) -> Result<SessionRpcClient, SessionRpcError> {
        let wallet = config.wallet.as_ref().ok_or_else(|| {
            SessionRpcError::Other("No [wallet] credential in config".to_string())
        })?;
        tracing::debug!("Connecting to session backend at {}", config.sessionrpc.url);

        SessionRpcClient::new(&config.sessionrpc, wallet).inspect_err(|e| {
            tracing::error!("Failed to create session client: {}", e);
        })
    }
}
