//! Integration tests for the stats engine lifecycle
//!
//! Covers start/shutdown transitions, background ingestion from both
//! built-in event sources, and the periodic prune loop under paused time.

use mckeys::config::StatsConfig;
use mckeys::stats::PruneReport;
use mckeys::types::DiscardThreshold;
use mckeys::capture::Consumed;
use mckeys::{
    EngineState, Event, EventQueue, EventSource, ShutdownError, SortMode, SortOrder, Stats, Task,
};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::sleep;

fn config(threshold: f64) -> StatsConfig {
    StatsConfig::default()
        .with_discard_threshold(DiscardThreshold::new(threshold).unwrap())
        .with_prune_interval(Duration::from_secs(5))
}

async fn wait_for_keys(stats: &Stats, keys: usize) {
    for _ in 0..2000 {
        if stats.stat_count() == keys {
            return;
        }
        sleep(Duration::from_millis(1)).await;
    }
    panic!("engine never reached {keys} keys, has {}", stats.stat_count());
}

/// Test the full New -> Running -> Stopping -> Terminated lifecycle
#[tokio::test]
async fn test_lifecycle_transitions() {
    let queue = EventQueue::new(16);
    let stats = Stats::new(config(0.0), queue.clone());
    assert_eq!(stats.state(), EngineState::New);

    assert!(stats.start());
    assert_eq!(stats.state(), EngineState::Running);

    assert!(stats.shutdown().await.unwrap());
    assert_eq!(stats.state(), EngineState::Stopping);

    // Rejected once stopped, and stop stays idempotent
    assert!(!stats.start());
    assert!(!stats.shutdown().await.unwrap());
    drop(stats);
}

/// Test events pushed through the lock-free queue are ingested
#[tokio::test]
async fn test_queue_source_ingestion() {
    let queue = EventQueue::new(1024);
    let stats = Stats::new(config(0.0), queue.clone());
    stats.start();

    for i in 0..10 {
        for _ in 0..=i {
            queue.push(Event::new(format!("key:{i}"), i));
        }
    }
    wait_for_keys(&stats, 10).await;
    while !queue.is_empty() {
        sleep(Duration::from_millis(1)).await;
    }
    sleep(Duration::from_millis(10)).await;

    let leaders = stats.get_leaders(SortMode::Calls, SortOrder::Desc);
    assert_eq!(leaders[0].key, "key:9");
    assert_eq!(leaders[0].count, 10);
    assert_eq!(leaders[9].key, "key:0");
    assert_eq!(leaders[9].count, 1);

    assert!(stats.shutdown().await.unwrap());
}

/// Test a closed channel source lets the engine idle until shutdown
#[tokio::test]
async fn test_channel_source_closed() {
    let (tx, rx) = mpsc::channel(8);
    let stats = Stats::new(config(0.0), rx);
    stats.start();

    tx.send(Event::new("a", 1)).await.unwrap();
    tx.send(Event::new("b", 2)).await.unwrap();
    drop(tx);

    wait_for_keys(&stats, 2).await;
    assert_eq!(stats.state(), EngineState::Running);
    assert!(stats.shutdown().await.unwrap());
}

/// Test shutdown completes promptly while the ingest loop is backed off
#[tokio::test]
async fn test_shutdown_is_prompt_when_idle() {
    let queue = EventQueue::new(4);
    let stats = Stats::new(config(1.0), queue);
    stats.start();
    sleep(Duration::from_millis(50)).await;

    let started = std::time::Instant::now();
    assert!(stats.shutdown().await.unwrap());
    assert!(started.elapsed() < Duration::from_secs(1));
}

/// Test direct increments and background ingestion share one table
#[tokio::test]
async fn test_direct_increment_while_running() {
    let queue = EventQueue::new(16);
    let stats = Stats::new(config(0.0), queue.clone());
    stats.start();

    stats.increment("shared", 1);
    queue.push(Event::new("shared", 7));
    for _ in 0..1000 {
        if stats.stat("shared").is_some_and(|s| s.count() == 2) {
            break;
        }
        sleep(Duration::from_millis(1)).await;
    }

    let stat = stats.stat("shared").unwrap();
    assert_eq!(stat.count(), 2);
    assert_eq!(stat.size(), 7);
    assert_eq!(stats.stat_count(), 1);

    stats.shutdown().await.unwrap();
}

/// Test the prune loop only evicts keys whose rate fell below the threshold
#[tokio::test(start_paused = true)]
async fn test_periodic_pruning() {
    let queue = EventQueue::new(16);
    let stats = Stats::new(config(2.0), queue);
    for _ in 0..20 {
        stats.increment("warm", 1);
    }
    stats.increment("cold", 1);
    stats.start();

    // Before the first sweep nothing is evicted
    sleep(Duration::from_secs(4)).await;
    assert_eq!(stats.stat_count(), 2);

    // 5s sweep: cold = 0.2 req/s, warm = 4 req/s
    sleep(Duration::from_secs(2)).await;
    assert!(stats.stat("cold").is_none());
    assert!(stats.stat("warm").is_some());

    // 15s sweep: warm = 20/15 req/s
    sleep(Duration::from_secs(10)).await;
    assert_eq!(stats.stat_count(), 0);

    stats.shutdown().await.unwrap();
}

/// Test a manual sweep reports entry counts around eviction
#[tokio::test(start_paused = true)]
async fn test_prune_now_report() {
    let stats = Stats::new(config(1.0), EventQueue::new(1));
    stats.increment("a", 1);
    for _ in 0..10 {
        stats.increment("b", 1);
    }
    tokio::time::advance(Duration::from_secs(2)).await;

    let report = stats.prune_now();
    assert_eq!(report, PruneReport { before: 2, after: 1 });
    assert_eq!(report.evicted(), 1);
    assert!(stats.stat("b").is_some());
}

/// Source whose every poll blocks its worker thread
struct StuckSource(Duration);

impl EventSource for StuckSource {
    fn try_consume(&mut self) -> Consumed {
        std::thread::sleep(self.0);
        Consumed::Empty
    }
}

/// Test a loop that misses the shutdown deadline is aborted and reported
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_shutdown_reports_stuck_ingest() {
    let stats = Stats::new(
        config(0.0).with_shutdown_timeout(Duration::from_millis(50)),
        StuckSource(Duration::from_millis(300)),
    );
    assert!(stats.start());
    sleep(Duration::from_millis(20)).await;

    let err = stats.shutdown().await.unwrap_err();
    assert!(matches!(
        err,
        ShutdownError::TaskTimeout {
            task: Task::Ingest,
            timeout,
        } if timeout == Duration::from_millis(50)
    ));
    assert_eq!(err.task(), Task::Ingest);
    assert_eq!(stats.state(), EngineState::Stopping);

    // Already stopping, a retry is a no-op
    assert!(!stats.shutdown().await.unwrap());
}
