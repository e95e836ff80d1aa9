//! Health reconciliation against a mock HAProxy admin socket.

use std::time::Duration;

use haproxy_autoscale::reconcile::{fetch_unhealthy, reconcile_health, StateSource};
use haproxy_autoscale::AutoscaleError;

mod common;

use common::{start_mock_admin_socket, FakeAutoscaling};

const TIMEOUT: Duration = Duration::from_secs(3);

#[tokio::test]
async fn test_marks_down_servers_unhealthy() {
    let dir = tempfile::tempdir().unwrap();
    let socket = dir.path().join("haproxy.sock");
    let received = start_mock_admin_socket(
        &socket,
        "# header\nsv1 BE1 1 id-0001 0 1\nsv1 BE1 2 id-0002 0 0\n",
    );

    let api = FakeAutoscaling::default();
    let source = StateSource {
        socket_path: &socket,
        timeout: TIMEOUT,
        backend: "servers",
    };

    let unhealthy = reconcile_health(&api, &source, "eu-west-1", true).await.unwrap();

    assert_eq!(unhealthy, vec!["id-0002"]);
    assert_eq!(*received.lock().unwrap(), vec!["show servers state servers\r\n"]);

    let calls = api.health_calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].instance_id, "id-0002");
    assert_eq!(calls[0].region, "eu-west-1");
    assert!(calls[0].respect_grace_period);
}

#[tokio::test]
async fn test_empty_dump_makes_no_calls() {
    let dir = tempfile::tempdir().unwrap();
    let socket = dir.path().join("haproxy.sock");
    start_mock_admin_socket(&socket, "");

    let api = FakeAutoscaling::default();
    let source = StateSource {
        socket_path: &socket,
        timeout: TIMEOUT,
        backend: "servers",
    };

    let unhealthy = reconcile_health(&api, &source, "eu-west-1", false).await.unwrap();
    assert!(unhealthy.is_empty());
    assert!(api.marked().is_empty());
}

#[tokio::test]
async fn test_nothing_listening_is_connection_failed() {
    let dir = tempfile::tempdir().unwrap();
    let socket = dir.path().join("absent.sock");

    let api = FakeAutoscaling::default();
    let source = StateSource {
        socket_path: &socket,
        timeout: TIMEOUT,
        backend: "servers",
    };

    let err = reconcile_health(&api, &source, "eu-west-1", true).await.unwrap_err();
    assert!(matches!(err, AutoscaleError::ConnectionFailed { .. }));
    assert!(api.marked().is_empty());
}

#[tokio::test]
async fn test_malformed_dump_aborts_before_remediation() {
    let dir = tempfile::tempdir().unwrap();
    let socket = dir.path().join("haproxy.sock");
    start_mock_admin_socket(&socket, "sv1 BE1 1 id-0001 0 0\nsv1 BE1 2 id-0002\n");

    let api = FakeAutoscaling::default();
    let source = StateSource {
        socket_path: &socket,
        timeout: TIMEOUT,
        backend: "servers",
    };

    let err = reconcile_health(&api, &source, "eu-west-1", true).await.unwrap_err();
    match err {
        AutoscaleError::MalformedServerStateLine { line } => assert_eq!(line, "sv1 BE1 2 id-0002"),
        other => panic!("unexpected error: {other}"),
    }
    assert!(api.marked().is_empty());
}

#[tokio::test]
async fn test_leading_number_line_aborts_before_remediation() {
    let dir = tempfile::tempdir().unwrap();
    let socket = dir.path().join("haproxy.sock");
    start_mock_admin_socket(&socket, "1\n# be_id be_name srv_id srv_name\n3 servers 1 i-a 10.0.0.1 0\n");

    let api = FakeAutoscaling::default();
    let source = StateSource {
        socket_path: &socket,
        timeout: TIMEOUT,
        backend: "servers",
    };

    let err = reconcile_health(&api, &source, "eu-west-1", true).await.unwrap_err();
    assert!(matches!(err, AutoscaleError::MalformedServerStateLine { line } if line == "1"));
    assert!(api.marked().is_empty());
}

#[tokio::test]
async fn test_remediation_stops_at_first_failure() {
    let dir = tempfile::tempdir().unwrap();
    let socket = dir.path().join("haproxy.sock");
    start_mock_admin_socket(
        &socket,
        "# be_id be_name srv_id srv_name srv_addr srv_op_state\n\
         3 servers 1 i-a 10.0.0.1 0\n\
         3 servers 2 i-b 10.0.0.2 0\n\
         3 servers 3 i-c 10.0.0.3 0\n",
    );

    let api = FakeAutoscaling {
        fail_health_for: Some("i-b".to_string()),
        ..Default::default()
    };
    let source = StateSource {
        socket_path: &socket,
        timeout: TIMEOUT,
        backend: "servers",
    };

    let err = reconcile_health(&api, &source, "eu-west-1", true).await.unwrap_err();
    assert!(matches!(err, AutoscaleError::CloudApi(_)));
    assert_eq!(api.marked(), vec!["i-a"]);
}

#[tokio::test]
async fn test_duplicate_identifiers_are_reported_each_time() {
    let dir = tempfile::tempdir().unwrap();
    let socket = dir.path().join("haproxy.sock");
    start_mock_admin_socket(&socket, "a b 1 i-a x 0\na c 1 i-a x 0\n");

    let source = StateSource {
        socket_path: &socket,
        timeout: TIMEOUT,
        backend: "servers",
    };

    assert_eq!(fetch_unhealthy(&source).await.unwrap(), vec!["i-a", "i-a"]);
}
