//! Text rendering for leaderboards and log lines

use crate::constants::table::{HEADERS, KEY_WIDTH, NUM_WIDTH, SEPARATOR};
use crate::stats::StatSnapshot;
use std::io::{self, Write};

/// Format bytes in human-readable format (KB, MB, GB)
#[inline]
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// Write a fixed-width, comma-separated leaderboard
///
/// Columns are right-aligned: the key in 110 characters, every numeric
/// column in 10, rate and bandwidth with two decimals, elapsed in whole
/// seconds. The header is only written when there is at least one row.
pub fn write_stats_table<W: Write>(
    out: &mut W,
    leaders: &[StatSnapshot],
    limit: usize,
) -> io::Result<()> {
    if leaders.is_empty() {
        return Ok(());
    }

    let [key, count, elapsed, rate, size, bw] = HEADERS;
    writeln!(
        out,
        "{key:>kw$}{sep}{count:>nw$}{sep}{elapsed:>nw$}{sep}{rate:>nw$}{sep}{size:>nw$}{sep}{bw:>nw$}",
        kw = KEY_WIDTH,
        nw = NUM_WIDTH,
        sep = SEPARATOR,
    )?;

    for stat in leaders.iter().take(limit) {
        writeln!(out, "{}", format_stat_row(stat))?;
    }
    Ok(())
}

/// Render one leaderboard row
#[must_use]
pub fn format_stat_row(stat: &StatSnapshot) -> String {
    format!(
        "{:>kw$}{sep}{:>nw$}{sep}{:>nw$}{sep}{:>nw$.2}{sep}{:>nw$}{sep}{:>nw$.2}",
        stat.key,
        stat.count,
        stat.elapsed.as_secs(),
        stat.request_rate,
        stat.size,
        stat.bandwidth,
        kw = KEY_WIDTH,
        nw = NUM_WIDTH,
        sep = SEPARATOR,
    )
}
