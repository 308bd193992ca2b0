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

use chrono::{DateTime, Utc};
use minepulse_lib::config::MiningConfig;
use minepulse_lib::mining::actor::start_session_timer;
use minepulse_lib::mining::earnings::{SESSION_CEILING_SECS, project_earnings};
use minepulse_lib::mining::profile::AccountProfile;
use minepulse_lib::mining::timer::{SessionTimer, TickOutcome, TimerPhase};
use minepulse_lib::utils::time_provider::TestTimeProvider;
use serde_json::json;
use sessionrpc::test_utils::{
    mock_action, sample_session_json, setup_mock_session_rpc, test_credential,
};
use sessionrpc::{SessionRpcClient, SessionStatus};
use std::time::Duration;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Start time of the sample session row
fn session_start() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2026-01-01T00:00:00Z")
        .unwrap()
        .with_timezone(&Utc)
}

/// Answer end calls for the sample session, whatever the earnings
async fn mock_end(mock_server: &MockServer, accepted: bool) {
    Mock::given(method("POST"))
        .and(path("/mining-session"))
        .and(body_partial_json(
            json!({"action": "end", "sessionId": "session-1"}),
        ))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"success": true, "data": accepted})),
        )
        .mount(mock_server)
        .await;
}

/// Earnings carried by each end call the backend received
async fn end_calls(mock_server: &MockServer) -> Vec<f64> {
    mock_server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter_map(|request| serde_json::from_slice::<serde_json::Value>(&request.body).ok())
        .filter(|body| body["action"] == "end")
        .filter_map(|body| body["earnings"].as_f64())
        .collect()
}

fn timer_for(
    client: SessionRpcClient,
    clock: &TestTimeProvider,
) -> SessionTimer<SessionRpcClient, TestTimeProvider> {
    let mut timer = SessionTimer::new(
        client,
        clock.clone(),
        &MiningConfig::default(),
        AccountProfile::default(),
    );
    timer.set_user(Some("user-1".to_string()));
    timer
}

#[tokio::test]
async fn test_start_and_stop_against_backend() {
    let (mock_server, config) = setup_mock_session_rpc().await;
    mock_action(
        &mock_server,
        json!({"action": "start", "userId": "user-1", "hashRate": 12.0, "efficiency": 50.0}),
        json!({"success": true, "data": sample_session_json("active")}),
    )
    .await;
    mock_end(&mock_server, true).await;

    let client = SessionRpcClient::new(&config, &test_credential()).unwrap();
    let clock = TestTimeProvider::new(session_start());
    let mut timer = timer_for(client, &clock);

    timer.start().await.unwrap();
    clock.advance_secs(1800);
    assert!(matches!(
        timer.tick().await,
        TickOutcome::Running {
            elapsed_secs: 1800,
            ..
        }
    ));

    let ended = timer.stop().await.unwrap().unwrap();

    let expected = project_earnings(1800, 12.0, 50.0);
    assert_eq!(ended.status, SessionStatus::Completed);
    assert_eq!(ended.earnings, expected);
    assert_eq!(timer.bonus().interruptions(), 1);

    let recorded = end_calls(&mock_server).await;
    assert_eq!(recorded.len(), 1);
    assert!((recorded[0] - expected).abs() < 1e-12);
}

#[tokio::test]
async fn test_rejected_stop_keeps_mining() {
    let (mock_server, config) = setup_mock_session_rpc().await;
    mock_action(
        &mock_server,
        json!({"action": "start", "userId": "user-1", "hashRate": 12.0, "efficiency": 50.0}),
        json!({"success": true, "data": sample_session_json("active")}),
    )
    .await;
    mock_end(&mock_server, false).await;

    let client = SessionRpcClient::new(&config, &test_credential()).unwrap();
    let clock = TestTimeProvider::new(session_start());
    let mut timer = timer_for(client, &clock);

    timer.start().await.unwrap();
    clock.advance_secs(60);

    assert!(timer.stop().await.is_err());
    assert_eq!(timer.phase(), TimerPhase::Active);
    assert_eq!(timer.bonus().interruptions(), 0);
}

#[tokio::test]
async fn test_ceiling_completes_when_backend_is_down() {
    let (mock_server, config) = setup_mock_session_rpc().await;
    mock_action(
        &mock_server,
        json!({"action": "active", "userId": "user-1"}),
        json!({"success": true, "data": sample_session_json("active")}),
    )
    .await;
    // Everything else fails
    Mock::given(method("POST"))
        .and(path("/mining-session"))
        .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
        .mount(&mock_server)
        .await;

    let client = SessionRpcClient::new(&config, &test_credential()).unwrap();
    let clock = TestTimeProvider::new(session_start());
    clock.advance_secs(SESSION_CEILING_SECS as i64 + 3600);
    let mut timer = timer_for(client, &clock);

    assert!(timer.restore().await.unwrap());
    let outcome = timer.tick().await;

    assert!(matches!(
        outcome,
        TickOutcome::Completed {
            persisted: false,
            ..
        }
    ));
    assert_eq!(timer.phase(), TimerPhase::Completed);
    assert_eq!(timer.elapsed_secs(), SESSION_CEILING_SECS);
    assert_eq!(timer.tick().await, TickOutcome::Idle);

    let recorded = end_calls(&mock_server).await;
    assert_eq!(recorded.len(), 1);
    let settled = project_earnings(SESSION_CEILING_SECS, 12.0, 50.0);
    assert!((recorded[0] - settled).abs() < 1e-12);
}

#[tokio::test]
async fn test_actor_restores_and_reports_history() {
    let (mock_server, config) = setup_mock_session_rpc().await;
    mock_action(
        &mock_server,
        json!({"action": "active", "userId": "user-1"}),
        json!({"success": true, "data": sample_session_json("active")}),
    )
    .await;
    mock_action(
        &mock_server,
        json!({"action": "history", "userId": "user-1", "limit": 5}),
        json!({"success": true, "data": [sample_session_json("completed")]}),
    )
    .await;

    let client = SessionRpcClient::new(&config, &test_credential()).unwrap();
    let clock = TestTimeProvider::new(session_start());
    clock.advance_secs(7200);
    let handle = start_session_timer(timer_for(client, &clock), Duration::from_secs(1));

    assert!(handle.restore().await.unwrap());
    let snapshot = handle.snapshot().await.unwrap();
    assert_eq!(snapshot.phase, TimerPhase::Active);
    assert_eq!(snapshot.elapsed_secs, 7200);
    assert_eq!(snapshot.session_id.as_deref(), Some("session-1"));

    let history = handle.history(5).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].status, SessionStatus::Completed);

    handle.shutdown().await.unwrap();
}
