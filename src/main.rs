use anyhow::Result;
use clap::Parser;
use std::io::Write;
use std::time::Duration;
use tokio::io::BufReader;
use tracing::{error, info, warn};

use mckeys::args::Args;
use mckeys::config::{Config, DisplayConfig};
use mckeys::formatting::format_bytes;
use mckeys::logging::init_logging;
use mckeys::runtime::{RuntimeConfig, shutdown_signal};
use mckeys::{EventQueue, SortMode, SortOrder, Stats, feed_lines, load_config_with_fallback};

/// Upper bound on waiting for the engine to drain the queue after EOF
const DRAIN_TIMEOUT: Duration = Duration::from_secs(2);

fn main() -> Result<()> {
    let args = Args::parse();
    let _log_guard = init_logging(args.log_file.as_deref());

    let (mut config, source) = load_config_with_fallback(&args.config)?;
    args.apply_to(&mut config);
    config.validate()?;

    info!("Loaded configuration from {}", source.description());
    info!(
        interface = %config.capture.interface,
        port = %config.capture.port,
        threshold = %config.stats.discard_threshold,
        "Watching key traffic"
    );

    let rt = RuntimeConfig::from_args(args.threads).build_runtime()?;
    let result = rt.block_on(run(config));
    // A stdin read may still be parked on a blocking thread
    rt.shutdown_timeout(Duration::from_millis(100));
    result
}

async fn run(config: Config) -> Result<()> {
    let queue = EventQueue::new(config.stats.queue_capacity.get());
    let stats = Stats::new(config.stats.clone(), queue.clone());
    stats.start();

    let feeder = {
        let queue = queue.clone();
        tokio::spawn(async move { feed_lines(BufReader::new(tokio::io::stdin()), &queue).await })
    };
    tokio::pin!(feeder);

    let signal = shutdown_signal();
    tokio::pin!(signal);

    let mut ticker = tokio::time::interval(config.display.refresh);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = ticker.tick() => print_leaderboard(&stats, &config.display),
            _ = &mut signal => {
                info!("Shutdown signal received");
                break;
            }
            result = &mut feeder => {
                match result {
                    Ok(Ok(summary)) => info!(
                        queued = summary.queued,
                        dropped = summary.dropped,
                        malformed = summary.malformed,
                        "Event input closed"
                    ),
                    Ok(Err(e)) => warn!("Reading events failed: {}", e),
                    Err(e) => warn!("Event feeder task failed: {}", e),
                }
                wait_for_drain(&queue).await;
                print_leaderboard(&stats, &config.display);
                break;
            }
        }
    }

    log_summary(&stats, &queue);

    match stats.shutdown().await {
        Ok(_) => Ok(()),
        Err(e) => {
            error!("Stats engine did not shut down cleanly: {}", e);
            Err(e.into())
        }
    }
}

fn print_leaderboard(stats: &Stats, display: &DisplayConfig) {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let result = stats
        .write_leaders(
            &mut out,
            display.sort_mode,
            display.sort_order,
            display.limit.get(),
        )
        .and_then(|()| writeln!(out))
        .and_then(|()| out.flush());
    if let Err(e) = result {
        warn!("Failed to print leaderboard: {}", e);
    }
}

async fn wait_for_drain(queue: &EventQueue) {
    let drained = tokio::time::timeout(DRAIN_TIMEOUT, async {
        while !queue.is_empty() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await;
    if drained.is_err() {
        warn!(pending = queue.len(), "Event queue not drained before exit");
    }
}

fn log_summary(stats: &Stats, queue: &EventQueue) {
    info!(
        keys = stats.stat_count(),
        dropped = queue.dropped(),
        collisions = stats.collisions(),
        "Final stats"
    );
    if let Some(top) = stats
        .get_leaders(SortMode::Bandwidth, SortOrder::Desc)
        .first()
    {
        info!(
            key = %top.key,
            calls = top.count,
            "Top key by bandwidth: {}/s",
            format_bytes(top.bandwidth as u64)
        );
    }
}
