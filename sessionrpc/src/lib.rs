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

use base64::{Engine, engine::general_purpose::STANDARD};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt;
use tracing::{debug, error};

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

/// Name of the edge function serving all mining session actions
pub const SESSION_FUNCTION: &str = "mining-session";

pub const WALLET_ADDRESS_HEADER: &str = "x-wallet-address";
pub const WALLET_SIGNATURE_HEADER: &str = "x-wallet-signature";
pub const WALLET_MESSAGE_HEADER: &str = "x-wallet-message";

/// Lifecycle of a session row as stored by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Active,
    Completed,
    /// Present in the schema, never produced by the client
    Cancelled,
}

/// A mining session row. The backend is authoritative, the client only holds a copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MiningSession {
    pub id: String,
    pub user_id: String,
    pub start_time: DateTime<Utc>,
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,
    pub status: SessionStatus,
    pub hash_rate: f64,
    pub efficiency: f64,
    #[serde(default)]
    pub earnings: f64,
}

impl MiningSession {
    pub fn is_active(&self) -> bool {
        self.status == SessionStatus::Active
    }
}

/// Bearer-style credential assembled from a wallet signature over a challenge message
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WalletCredential {
    pub address: String,
    pub signature: String,
    pub message: String,
}

#[derive(Deserialize, Clone)]
pub struct SessionRpcConfig {
    /// Base url of the edge functions, e.g. https://project.supabase.co/functions/v1
    pub url: String,
    /// Public anon key of the hosted project
    pub anon_key: String,
}

/// Custom Debug to redact the anon key
impl std::fmt::Debug for SessionRpcConfig {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("SessionRpcConfig")
            .field("url", &self.url)
            .field("anon_key", &"[redacted]")
            .finish()
    }
}

/// Tagged envelope returned by every edge function
#[derive(Deserialize, Debug)]
struct EdgeResponse<T> {
    success: bool,
    data: Option<T>,
    error: Option<String>,
}

/// Error type for the SessionRpcClient
#[derive(Debug)]
pub enum SessionRpcError {
    HttpError { status_code: u16, message: String },
    ParseError { message: String },
    RemoteError { message: String },
    Other(String),
}

impl Error for SessionRpcError {}

impl fmt::Display for SessionRpcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionRpcError::HttpError {
                status_code,
                message,
            } => {
                write!(f, "HTTP error {status_code}: {message}")
            }
            SessionRpcError::ParseError { message } => {
                write!(f, "Parse error: {message}")
            }
            SessionRpcError::RemoteError { message } => {
                write!(f, "Remote error: {message}")
            }
            SessionRpcError::Other(msg) => write!(f, "{msg}"),
        }
    }
}

fn header_value(value: &str) -> Result<reqwest::header::HeaderValue, SessionRpcError> {
    value
        .parse()
        .map_err(|e| SessionRpcError::Other(format!("Invalid header: {e}")))
}

#[derive(Debug, Clone)]
pub struct SessionRpcClient {
    client: reqwest::Client,
    url: String,
}

impl SessionRpcClient {
    /// Build a client that sends the anon key and the wallet credential with every call
    pub fn new(
        config: &SessionRpcConfig,
        credential: &WalletCredential,
    ) -> Result<Self, SessionRpcError> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert("apikey", header_value(&config.anon_key)?);
        headers.insert(
            reqwest::header::AUTHORIZATION,
            header_value(&format!("Bearer {}", config.anon_key))?,
        );
        headers.insert(WALLET_ADDRESS_HEADER, header_value(&credential.address)?);
        headers.insert(
            WALLET_SIGNATURE_HEADER,
            header_value(&credential.signature)?,
        );
        // The challenge message spans several lines, which headers can't carry
        headers.insert(
            WALLET_MESSAGE_HEADER,
            header_value(&STANDARD.encode(&credential.message))?,
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| SessionRpcError::Other(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            url: format!("{}/{}", config.url.trim_end_matches('/'), SESSION_FUNCTION),
        })
    }

    /// Post an action to the session function and unwrap the tagged envelope.
    ///
    /// Returns Ok(None) when the call succeeded without data.
    pub async fn request<T: serde::de::DeserializeOwned>(
        &self,
        body: serde_json::Value,
    ) -> Result<Option<T>, SessionRpcError> {
        debug!("Posting to {}: {}", self.url, body);
        let response = match self.client.post(&self.url).json(&body).send().await {
            Ok(resp) => resp,
            Err(e) => {
                let status_code = e.status().map(|s| s.as_u16());
                error!(
                    "HTTP request failed to session backend: status={:?}, error={}",
                    status_code, e
                );
                return Err(SessionRpcError::Other(format!("HTTP request failed: {e}")));
            }
        };

        let status = response.status();
        if !status.is_success() {
            let status_code = status.as_u16();
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            error!(
                "Error reaching session backend with status={:?}. Message={:?}",
                status_code, error_body
            );
            return Err(SessionRpcError::HttpError {
                status_code,
                message: error_body,
            });
        }

        let envelope: EdgeResponse<T> =
            response
                .json()
                .await
                .map_err(|e| SessionRpcError::ParseError {
                    message: format!("Failed to parse response: {e}"),
                })?;

        if !envelope.success {
            return Err(SessionRpcError::RemoteError {
                message: envelope
                    .error
                    .unwrap_or_else(|| "Unknown backend error".to_string()),
            });
        }
        Ok(envelope.data)
    }

    /// Create a new active session row for the user
    pub async fn start_session(
        &self,
        user_id: &str,
        hash_rate: f64,
        efficiency: f64,
    ) -> Result<MiningSession, SessionRpcError> {
        let body = serde_json::json!({
            "action": "start",
            "userId": user_id,
            "hashRate": hash_rate,
            "efficiency": efficiency,
        });
        self.request::<MiningSession>(body)
            .await?
            .ok_or_else(|| SessionRpcError::ParseError {
                message: "start response carried no session".to_string(),
            })
    }

    /// Close a session with its final earnings. The backend answers with a boolean.
    pub async fn end_session(
        &self,
        session_id: &str,
        earnings: f64,
    ) -> Result<bool, SessionRpcError> {
        let body = serde_json::json!({
            "action": "end",
            "sessionId": session_id,
            "earnings": earnings,
        });
        Ok(self.request::<bool>(body).await?.unwrap_or(false))
    }

    /// Fetch the user's active session row, if any
    pub async fn get_active_session(
        &self,
        user_id: &str,
    ) -> Result<Option<MiningSession>, SessionRpcError> {
        let body = serde_json::json!({
            "action": "active",
            "userId": user_id,
        });
        self.request::<MiningSession>(body).await
    }

    /// Fetch the most recent sessions, newest first
    pub async fn get_history(
        &self,
        user_id: &str,
        limit: u32,
    ) -> Result<Vec<MiningSession>, SessionRpcError> {
        let body = serde_json::json!({
            "action": "history",
            "userId": user_id,
            "limit": limit,
        });
        Ok(self
            .request::<Vec<MiningSession>>(body)
            .await?
            .unwrap_or_default())
    }
}
