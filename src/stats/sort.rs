//! Leaderboard ordering: metric selection and comparators

use super::stat::StatSnapshot;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Comparator over snapshots, ordering the larger metric first
pub type Comparator = fn(&StatSnapshot, &StatSnapshot) -> Ordering;

/// Metric a leaderboard is ranked by
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum SortMode {
    /// Number of events seen for the key
    #[default]
    Calls,
    /// Most recently observed payload size
    Size,
    /// Lifetime-average requests per second
    #[value(name = "reqrate")]
    ReqRate,
    /// Size times request rate
    #[value(name = "bw")]
    #[serde(rename = "bw")]
    Bandwidth,
}

impl SortMode {
    pub const ALL: [Self; 4] = [Self::Calls, Self::Size, Self::ReqRate, Self::Bandwidth];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Calls => "calls",
            Self::Size => "size",
            Self::ReqRate => "reqrate",
            Self::Bandwidth => "bw",
        }
    }

    /// Comparator ranking this metric in descending order
    #[must_use]
    pub const fn comparator(&self) -> Comparator {
        match self {
            Self::Calls => by_count,
            Self::Size => by_size,
            Self::ReqRate => by_request_rate,
            Self::Bandwidth => by_bandwidth,
        }
    }
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown sort mode '{}'", s))
    }
}

/// Direction of a leaderboard
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            other => Err(format!("unknown sort order '{}'", other)),
        }
    }
}

pub fn by_count(a: &StatSnapshot, b: &StatSnapshot) -> Ordering {
    b.count.cmp(&a.count)
}

pub fn by_size(a: &StatSnapshot, b: &StatSnapshot) -> Ordering {
    b.size.cmp(&a.size)
}

pub fn by_request_rate(a: &StatSnapshot, b: &StatSnapshot) -> Ordering {
    b.request_rate.total_cmp(&a.request_rate)
}

pub fn by_bandwidth(a: &StatSnapshot, b: &StatSnapshot) -> Ordering {
    b.bandwidth.total_cmp(&a.bandwidth)
}

/// Rank snapshots by `mode`, descending, then flip for ascending
///
/// The sort is stable, so ascending is the exact reverse of descending,
/// ties included.
pub fn rank(snapshots: &mut [StatSnapshot], mode: SortMode, order: SortOrder) {
    snapshots.sort_by(mode.comparator());
    if order == SortOrder::Asc {
        snapshots.reverse();
    }
}
