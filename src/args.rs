//! Command-line argument parsing for the mckeys binary

use crate::config::Config;
use crate::stats::{SortMode, SortOrder};
use crate::types::{DiscardThreshold, InterfaceName, Port, RowLimit, ThreadCount};
use clap::Parser;
use std::path::PathBuf;

/// Parse a refresh period in whole seconds
fn parse_refresh(s: &str) -> Result<u64, String> {
    match s.parse::<u64>() {
        Ok(0) => Err("refresh must be at least 1 second".to_string()),
        Ok(secs) => Ok(secs),
        Err(e) => Err(format!("Invalid refresh interval: {}", e)),
    }
}

/// Watch key-value store traffic and rank the hottest keys
///
/// Events are read from stdin as `<key> <size>` lines. CLI values override
/// the configuration file, which overrides built-in defaults.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "mckeys.toml", env = "MCKEYS_CONFIG")]
    pub config: String,

    /// Evict keys whose lifetime request rate (req/s) falls below this; 0 disables
    #[arg(short = 'd', long)]
    pub discard_threshold: Option<DiscardThreshold>,

    /// Network interface handed to the capture layer
    #[arg(short, long)]
    pub interface: Option<InterfaceName>,

    /// Key-value store port handed to the capture layer
    #[arg(short, long)]
    pub port: Option<Port>,

    /// Metric to rank keys by
    #[arg(short = 'm', long, value_enum)]
    pub sort_mode: Option<SortMode>,

    /// Ranking direction
    #[arg(short = 'o', long, value_enum)]
    pub sort_order: Option<SortOrder>,

    /// Rows printed per refresh
    #[arg(short = 'n', long)]
    pub limit: Option<RowLimit>,

    /// Seconds between leaderboard prints
    #[arg(short, long, value_parser = parse_refresh)]
    pub refresh: Option<u64>,

    /// Number of worker threads (default: 2, use 0 for CPU cores)
    #[arg(short, long)]
    pub threads: Option<ThreadCount>,

    /// Also write logs to this file
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

impl Args {
    /// Overlay the flags that were given onto `config`
    pub fn apply_to(&self, config: &mut Config) {
        if let Some(threshold) = self.discard_threshold {
            config.stats.discard_threshold = threshold;
        }
        if let Some(interface) = &self.interface {
            config.capture.interface = interface.clone();
        }
        if let Some(port) = self.port {
            config.capture.port = port;
        }
        if let Some(mode) = self.sort_mode {
            config.display.sort_mode = mode;
        }
        if let Some(order) = self.sort_order {
            config.display.sort_order = order;
        }
        if let Some(limit) = self.limit {
            config.display.limit = limit;
        }
        if let Some(secs) = self.refresh {
            config.display.refresh = std::time::Duration::from_secs(secs);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["mckeys"]).unwrap();
        assert_eq!(args.config, "mckeys.toml");
        assert!(args.discard_threshold.is_none());
        assert!(args.sort_mode.is_none());
        assert!(args.threads.is_none());
    }

    #[test]
    fn test_overrides_config() {
        let args = Args::try_parse_from([
            "mckeys", "-d", "1.5", "-i", "lo", "-p", "6379", "-m", "reqrate", "-o", "asc",
            "-n", "5", "-r", "2",
        ])
        .unwrap();
        let mut config = Config::default();
        args.apply_to(&mut config);

        assert_eq!(config.stats.discard_threshold.get(), 1.5);
        assert_eq!(config.capture.interface.as_str(), "lo");
        assert_eq!(config.capture.port.get(), 6379);
        assert_eq!(config.display.sort_mode, SortMode::ReqRate);
        assert_eq!(config.display.sort_order, SortOrder::Asc);
        assert_eq!(config.display.limit.get(), 5);
        assert_eq!(config.display.refresh, Duration::from_secs(2));
    }

    #[test]
    fn test_bandwidth_mode_name() {
        let args = Args::try_parse_from(["mckeys", "--sort-mode", "bw"]).unwrap();
        assert_eq!(args.sort_mode, Some(SortMode::Bandwidth));
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(Args::try_parse_from(["mckeys", "-d", "-3"]).is_err());
        assert!(Args::try_parse_from(["mckeys", "-n", "0"]).is_err());
        assert!(Args::try_parse_from(["mckeys", "-r", "0"]).is_err());
        assert!(Args::try_parse_from(["mckeys", "-m", "latency"]).is_err());
    }

    #[test]
    fn test_unset_flags_keep_config() {
        let args = Args::try_parse_from(["mckeys"]).unwrap();
        let mut config = Config::default();
        args.apply_to(&mut config);
        assert_eq!(config, Config::default());
    }
}
