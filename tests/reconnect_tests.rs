// Tests for fixed-interval reconnection after unexpected closures

mod common;

use common::{test_config, Harness, MockNet};
use lens_live::session::{ReconnectPolicy, ReconnectStep, SessionState};
use lens_live::transport::SocketEvent;
use std::time::Duration;

const INTERVAL: Duration = Duration::from_secs(3);

#[test]
fn test_policy_fixed_interval() {
    let mut policy = ReconnectPolicy::new(2, INTERVAL);

    assert_eq!(policy.tick(INTERVAL), ReconnectStep::Idle);
    assert!(policy.begin());
    assert!(!policy.begin(), "Already reconnecting");

    assert_eq!(policy.tick(Duration::from_secs(2)), ReconnectStep::Waiting);
    assert_eq!(policy.tick(Duration::from_secs(1)), ReconnectStep::Attempt(1));
    assert_eq!(policy.tick(Duration::from_secs(2)), ReconnectStep::Waiting);
    assert_eq!(policy.tick(Duration::from_secs(1)), ReconnectStep::Attempt(2));
    assert_eq!(policy.tick(INTERVAL), ReconnectStep::Exhausted);
    assert!(!policy.is_reconnecting());
    assert_eq!(policy.tick(INTERVAL), ReconnectStep::Idle);
}

#[test]
fn test_policy_reset_clears_attempts() {
    let mut policy = ReconnectPolicy::new(5, INTERVAL);
    policy.begin();
    policy.tick(INTERVAL);
    assert_eq!(policy.attempts(), 1);

    policy.reset();

    assert_eq!(policy.attempts(), 0);
    assert!(!policy.is_reconnecting());
}

#[test]
fn test_unexpected_close_schedules_reconnect() {
    let mut h = Harness::new(test_config(), MockNet::new());
    h.activate();

    h.net.push(SocketEvent::Closed);
    h.tick(Duration::from_millis(20));

    assert_eq!(h.session.state(), SessionState::Disconnected);
    assert!(h.session.is_reconnecting());
    assert_eq!(h.status.last().as_deref(), Some("Reconnecting..."));
    assert_eq!(h.net.opened(), 1);

    // Nothing before the interval elapses
    h.tick(Duration::from_secs(2));
    assert_eq!(h.net.opened(), 1);

    h.tick(Duration::from_secs(1));
    assert_eq!(h.net.opened(), 2);
    assert_eq!(h.session.reconnect_attempts(), 1);
    assert_eq!(h.status.lines().last().map(String::as_str), Some("Connecting..."));
    assert!(h
        .status
        .lines()
        .contains(&"Reconnecting (1/3)...".to_string()));
}

#[test]
fn test_successful_reconnect_resets_counter() {
    let mut h = Harness::new(test_config(), MockNet::new());
    h.activate();

    h.net.push(SocketEvent::Closed);
    h.tick(Duration::from_millis(20));
    h.tick(INTERVAL);
    assert_eq!(h.session.reconnect_attempts(), 1);

    h.net.push(SocketEvent::Open);
    h.tick(Duration::from_millis(20));

    assert!(!h.session.is_reconnecting());
    assert_eq!(h.session.reconnect_attempts(), 0);
    assert_eq!(h.session.state(), SessionState::SetupSent);

    // Setup is re-sent on every new socket
    let setups = h
        .net
        .sent_json()
        .iter()
        .filter(|v| v.get("setup").is_some())
        .count();
    assert_eq!(setups, 2);
}

#[test]
fn test_attempts_capped_when_every_socket_closes() {
    let net = MockNet::new().with_script(vec![SocketEvent::Closed]);
    let mut h = Harness::new(test_config(), net);

    h.session.connect().unwrap();
    h.tick(Duration::from_millis(20));
    assert!(h.session.is_reconnecting());

    for _ in 0..10 {
        h.tick(INTERVAL);
    }

    // Initial socket plus exactly max_reconnect_attempts retries
    assert_eq!(h.net.opened(), 4);
    assert_eq!(h.session.state(), SessionState::Failed);
    assert!(!h.session.is_reconnecting());
    assert!(!h.session.has_socket());

    let status = h.status.last().unwrap_or_default();
    assert!(status.to_lowercase().contains("failed"), "got {:?}", status);
}

#[test]
fn test_attempts_capped_when_sockets_stall() {
    let mut h = Harness::new(test_config(), MockNet::new());
    h.activate();

    h.net.push(SocketEvent::Closed);
    h.tick(Duration::from_millis(20));

    // Sockets open but never report Open or Closed
    for _ in 0..10 {
        h.tick(INTERVAL);
    }

    assert_eq!(h.net.opened(), 4);
    assert_eq!(h.session.state(), SessionState::Failed);
    assert_eq!(h.status.last().as_deref(), Some("Reconnection failed"));
    assert!(!h.session.has_socket(), "Stalled socket is dropped");
}

#[test]
fn test_factory_failure_enters_reconnection() {
    let net = MockNet::new();
    net.set_fail_open(true);
    let mut h = Harness::new(test_config(), net);

    assert!(h.session.connect().is_ok());
    assert!(h.session.is_reconnecting());
    assert!(h.status.lines().contains(&"Connection failed".to_string()));

    for _ in 0..10 {
        h.tick(INTERVAL);
    }

    assert_eq!(h.net.opened(), 4);
    assert_eq!(h.session.state(), SessionState::Failed);
}

#[test]
fn test_connect_after_failure_starts_fresh() {
    let net = MockNet::new().with_script(vec![SocketEvent::Closed]);
    let mut h = Harness::new(test_config(), net.clone());

    h.session.connect().unwrap();
    for _ in 0..10 {
        h.tick(INTERVAL);
    }
    assert_eq!(h.session.state(), SessionState::Failed);

    net.set_script(Vec::new());
    h.session.connect().unwrap();

    assert_eq!(h.session.state(), SessionState::Connecting);
    assert_eq!(h.session.reconnect_attempts(), 0);
    assert_eq!(h.net.opened(), 5);
}

#[test]
fn test_user_disconnect_cancels_reconnection() {
    let mut h = Harness::new(test_config(), MockNet::new());
    h.activate();

    h.net.push(SocketEvent::Closed);
    h.tick(Duration::from_millis(20));
    assert!(h.session.is_reconnecting());

    h.session.disconnect();
    for _ in 0..5 {
        h.tick(INTERVAL);
    }

    assert!(!h.session.is_reconnecting());
    assert_eq!(h.net.opened(), 1);
}

#[test]
fn test_explicit_connect_replaces_pending_reconnect() {
    let mut h = Harness::new(test_config(), MockNet::new());
    h.activate();

    h.net.push(SocketEvent::Closed);
    h.tick(Duration::from_millis(20));
    h.tick(Duration::from_millis(2900));
    assert!(h.session.is_reconnecting());

    h.session.connect().unwrap();
    assert_eq!(h.net.opened(), 2);
    assert!(!h.session.is_reconnecting());

    // The countdown that was about to fire must not replace this socket
    h.tick(Duration::from_millis(200));
    h.tick(INTERVAL);
    assert_eq!(h.net.opened(), 2);
    assert_eq!(h.session.reconnect_attempts(), 0);
    assert_eq!(h.session.state(), SessionState::Connecting);

    h.net.push(SocketEvent::Open);
    h.tick(Duration::from_millis(20));
    assert_eq!(h.session.state(), SessionState::SetupSent);
}

#[test]
fn test_explicit_connect_that_closes_starts_fresh_cycle() {
    let mut h = Harness::new(test_config(), MockNet::new());
    h.activate();

    h.net.push(SocketEvent::Closed);
    h.tick(Duration::from_millis(20));
    h.tick(INTERVAL);
    h.net.push(SocketEvent::Closed);
    h.tick(Duration::from_millis(20));
    assert_eq!(h.session.reconnect_attempts(), 1);

    h.session.connect().unwrap();
    h.net.push(SocketEvent::Closed);
    h.tick(Duration::from_millis(20));

    assert!(h.session.is_reconnecting());
    assert_eq!(h.session.reconnect_attempts(), 0);
    assert_eq!(h.status.last().as_deref(), Some("Reconnecting..."));
}

#[test]
fn test_setup_send_failure_reported_and_retried() {
    let net = MockNet::new();
    net.set_fail_send(true);
    let mut h = Harness::new(test_config(), net);

    h.session.connect().unwrap();
    h.net.push(SocketEvent::Open);
    h.tick(Duration::from_millis(20));

    assert_eq!(h.status.last().as_deref(), Some("Setup failed"));
    assert_eq!(h.session.state(), SessionState::Disconnected);
    assert!(!h.session.has_socket());
    assert!(h.session.is_reconnecting());
    assert_eq!(h.net.closes(), 1);

    h.net.set_fail_send(false);
    h.tick(INTERVAL);
    assert_eq!(h.net.opened(), 2);
}
