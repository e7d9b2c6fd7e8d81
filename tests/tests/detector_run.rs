//! End-to-end consumption runs against the in-memory broker mocks.
//!
//! These exercise the full supervisor → watcher → partition-worker path:
//! MockConnection hands out MockFeeds implementing the same traits as the
//! real broker client, so everything except the network transport runs.

use std::time::Duration;

use detector_core::Error;
use integration_tests::{fixtures, mocks::MockConnection};
use worker::{Supervisor, SupervisorConfig};

fn supervisor(partitions: i32, expected_messages: u64) -> Supervisor {
    Supervisor::new(SupervisorConfig {
        topic: "students".to_string(),
        partitions,
        expected_messages,
        deprivation_threshold: 6.0,
    })
}

const RUN_TIMEOUT: Duration = Duration::from_secs(5);

/// 10 messages spread unevenly over 4 partitions, one partition silent:
/// the run must still complete once the budget is spent.
#[tokio::test]
async fn test_budget_exhaustion_stops_all_workers() {
    let connection = MockConnection::new();

    let senders: Vec<_> = (0..4).map(|p| connection.feed_sender(p)).collect();
    for _ in 0..5 {
        senders[0].send(fixtures::student_payload(5.5)).unwrap();
    }
    for _ in 0..3 {
        senders[1].send(fixtures::student_payload(7.0)).unwrap();
    }
    for _ in 0..2 {
        senders[2].send(fixtures::student_payload(6.0)).unwrap();
    }
    // partition 3 delivers nothing

    let report = tokio::time::timeout(RUN_TIMEOUT, supervisor(4, 10).run(&connection))
        .await
        .expect("run must finish once the budget is exhausted")
        .expect("run must succeed");

    assert_eq!(report.partitions, 4);
    assert_eq!(report.expected_messages, 10);
    assert_eq!(connection.opened_partitions(), vec![0, 1, 2, 3]);
}

/// An expected count of zero is already complete; workers must exit
/// without consuming anything.
#[tokio::test]
async fn test_zero_expected_completes_immediately() {
    let connection = MockConnection::new();
    let sender = connection.feed_sender(0);
    sender.send(fixtures::student_payload(5.0)).unwrap();

    let report = tokio::time::timeout(RUN_TIMEOUT, supervisor(2, 0).run(&connection))
        .await
        .expect("zero-budget run must finish")
        .expect("run must succeed");

    assert_eq!(report.expected_messages, 0);
}

/// A malformed payload is logged and skipped but still spends budget, so
/// the run terminates.
#[tokio::test]
async fn test_malformed_payload_still_counts() {
    let connection = MockConnection::new();
    let sender = connection.feed_sender(0);

    sender.send(fixtures::student_payload(5.5)).unwrap();
    sender.send(fixtures::malformed_payload()).unwrap();
    sender.send(fixtures::student_payload(8.0)).unwrap();

    tokio::time::timeout(RUN_TIMEOUT, supervisor(1, 3).run(&connection))
        .await
        .expect("run must finish even with undecodable messages")
        .expect("decode failures are not fatal");
}

/// One partition failing to open aborts the whole run before any worker
/// starts; no partial worker set may keep running.
#[tokio::test]
async fn test_feed_open_failure_aborts_run() {
    let connection = MockConnection::new().fail_partition(2);

    let senders: Vec<_> = (0..4).map(|p| connection.feed_sender(p)).collect();
    senders[0].send(fixtures::student_payload(5.5)).unwrap();

    let err = tokio::time::timeout(RUN_TIMEOUT, supervisor(4, 1).run(&connection))
        .await
        .expect("abort must be immediate")
        .expect_err("open failure must be fatal");

    match err {
        Error::FeedOpen { partition, .. } => assert_eq!(partition, 2),
        other => panic!("expected FeedOpen error, got {other}"),
    }

    // Opening stops at the failing partition; later feeds are never tried.
    assert_eq!(connection.opened_partitions(), vec![0, 1, 2]);
}

/// Messages left behind after the stop signal stay unconsumed: the run
/// ends even though the feeds still hold traffic.
#[tokio::test]
async fn test_run_stops_with_messages_remaining() {
    let connection = MockConnection::new();
    let sender = connection.feed_sender(0);
    let _quiet = connection.feed_sender(1);

    for _ in 0..50 {
        sender.send(fixtures::student_payload(4.0)).unwrap();
    }

    let report = tokio::time::timeout(RUN_TIMEOUT, supervisor(2, 5).run(&connection))
        .await
        .expect("run must stop at the budget, not at end of traffic")
        .expect("run must succeed");

    assert_eq!(report.expected_messages, 5);
}
