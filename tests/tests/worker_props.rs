//! Concurrency properties of the partition worker and countdown.

use std::sync::Arc;
use std::time::Duration;

use integration_tests::{fixtures, mocks::MockConnection};
use kafka::FeedOpener;
use tokio_util::sync::CancellationToken;
use worker::{Countdown, PartitionWorker};

const RUN_TIMEOUT: Duration = Duration::from_secs(5);

/// Workers may each classify at most one in-flight message past the
/// point of exhaustion: the budget never overshoots by more than the
/// partition count. The feeds are saturated well beyond the budget so a
/// worker whose `next()` resolves without yielding cannot keep draining
/// while the watcher task waits to be scheduled.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_overshoot_bounded_by_partition_count() {
    const PARTITIONS: i32 = 4;
    const EXPECTED: u64 = 8;

    let connection = MockConnection::new();
    for partition in 0..PARTITIONS {
        let sender = connection.feed_sender(partition);
        for _ in 0..500 {
            sender.send(fixtures::student_payload(5.0)).unwrap();
        }
    }

    let countdown = Arc::new(Countdown::new(EXPECTED));
    let stop = CancellationToken::new();

    let watcher = {
        let countdown = countdown.clone();
        let stop = stop.clone();
        tokio::spawn(async move {
            countdown.completed().await;
            stop.cancel();
        })
    };

    let mut handles = Vec::new();
    for partition in 0..PARTITIONS {
        let feed = connection.open_feed("students", partition).await.unwrap();
        let worker = PartitionWorker::new(feed, countdown.clone(), stop.clone(), 6.0);
        handles.push(tokio::spawn(worker.run()));
    }

    for handle in handles {
        tokio::time::timeout(RUN_TIMEOUT, handle)
            .await
            .expect("worker must stop after the signal")
            .unwrap()
            .unwrap();
    }
    watcher.await.unwrap();

    let consumed = EXPECTED as i64 - countdown.remaining();
    assert!(consumed >= EXPECTED as i64, "budget must be spent");
    assert!(
        consumed <= EXPECTED as i64 + PARTITIONS as i64,
        "overshoot of {} exceeds the partition bound",
        consumed - EXPECTED as i64
    );
    assert!(countdown.is_complete());
}

/// The budget is spent per received message, not per successful decode:
/// a stream of undecodable payloads still drives the countdown to zero.
#[tokio::test]
async fn test_decode_failures_spend_budget() {
    let connection = MockConnection::new();
    let sender = connection.feed_sender(0);
    for _ in 0..3 {
        sender.send(fixtures::malformed_payload()).unwrap();
    }

    let countdown = Arc::new(Countdown::new(3));
    let stop = CancellationToken::new();

    let feed = connection.open_feed("students", 0).await.unwrap();
    let worker = PartitionWorker::new(feed, countdown.clone(), stop.clone(), 6.0);
    let handle = tokio::spawn(worker.run());

    tokio::time::timeout(RUN_TIMEOUT, countdown.completed())
        .await
        .expect("countdown must complete on undecodable messages");

    stop.cancel();
    handle.await.unwrap().unwrap();
    assert!(countdown.remaining() <= 0);
}

/// Firing the stop signal twice is a no-op, and an already-fired signal
/// stops a worker before it consumes anything.
#[tokio::test]
async fn test_stop_signal_is_idempotent_and_sticky() {
    let connection = MockConnection::new();
    let sender = connection.feed_sender(0);
    sender.send(fixtures::student_payload(5.0)).unwrap();

    let countdown = Arc::new(Countdown::new(10));
    let stop = CancellationToken::new();
    stop.cancel();
    stop.cancel();
    assert!(stop.is_cancelled());

    let feed = connection.open_feed("students", 0).await.unwrap();
    let worker = PartitionWorker::new(feed, countdown.clone(), stop.clone(), 6.0);

    tokio::time::timeout(RUN_TIMEOUT, tokio::spawn(worker.run()))
        .await
        .expect("worker must exit on a pre-fired signal")
        .unwrap()
        .unwrap();

    assert!(stop.is_cancelled());
}
