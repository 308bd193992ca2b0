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

use crate::{SessionRpcConfig, WalletCredential};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub async fn setup_mock_session_rpc() -> (MockServer, SessionRpcConfig) {
    let mock_server = MockServer::start().await;

    let config = SessionRpcConfig {
        url: mock_server.uri(),
        anon_key: "test-anon-key".to_string(),
    };

    (mock_server, config)
}

pub fn test_credential() -> WalletCredential {
    WalletCredential {
        address: "0x8ba1f109551bd432803012645ac136ddd64dba72".to_string(),
        signature: "0xdeadbeef".to_string(),
        message: "MinePulse authentication\nAddress: 0x8ba1f109551bd432803012645ac136ddd64dba72\nTimestamp: 1767225600".to_string(),
    }
}

/// A session row as the backend returns it
pub fn sample_session_json(status: &str) -> serde_json::Value {
    serde_json::json!({
        "id": "session-1",
        "user_id": "user-1",
        "start_time": "2026-01-01T00:00:00Z",
        "end_time": null,
        "status": status,
        "hash_rate": 13.5,
        "efficiency": 72.0,
        "earnings": 0.0
    })
}

/// Mount a mock answering the given action body with the given envelope
pub async fn mock_action(
    mock_server: &MockServer,
    request: serde_json::Value,
    response: serde_json::Value,
) {
    Mock::given(method("POST"))
        .and(path("/mining-session"))
        .and(header("apikey", "test-anon-key"))
        .and(body_json(request))
        .respond_with(ResponseTemplate::new(200).set_body_json(response))
        .mount(mock_server)
        .await;
}
