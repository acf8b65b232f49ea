//! Retention of auto-saved versions.

use crate::{
    error::{NowOutOfRangeSnafu, PruneError, TimestampOutOfRangeSnafu},
    version::Version,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use snafu::OptionExt;
use std::collections::HashSet;

const MS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// How many auto-saves survive a prune.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetentionPolicy {
    /// Newest auto-saves kept unconditionally.
    pub recent: usize,
    /// Days back from now in which one auto-save per UTC day is kept.
    pub daily_window_days: u32,
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self {
            recent: 10,
            daily_window_days: 10,
        }
    }
}

/// Result of [`prune`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pruned {
    /// The new index, newest first.
    pub index: Vec<Version>,
    /// Auto-saves dropped from the index whose snapshots should be deleted.
    pub removed: Vec<Version>,
}

fn utc_day(timestamp: i64) -> Option<NaiveDate> {
    DateTime::<Utc>::from_timestamp_millis(timestamp).map(|time| time.date_naive())
}

/// Apply the retention policy to the auto-saves of `file_name`.
///
/// Manual versions and versions of other files pass through untouched. Of the
/// auto-saves, the newest `recent` are kept; of the rest, the newest one of
/// each UTC day inside the daily window is kept. The returned index is sorted
/// by timestamp, newest first.
pub fn prune(
    index: &[Version],
    file_name: &str,
    now_ms: i64,
    policy: &RetentionPolicy,
) -> Result<Pruned, PruneError> {
    utc_day(now_ms).context(NowOutOfRangeSnafu { now: now_ms })?;

    let mut kept: Vec<Version> = Vec::with_capacity(index.len());
    let mut auto: Vec<&Version> = Vec::new();
    for version in index {
        if version.file_name == file_name && version.is_auto() {
            auto.push(version);
        } else {
            kept.push(version.clone());
        }
    }
    auto.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

    let days = auto
        .iter()
        .map(|version| {
            utc_day(version.timestamp).context(TimestampOutOfRangeSnafu {
                id: version.id,
                timestamp: version.timestamp,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let window = i64::from(policy.daily_window_days).saturating_mul(MS_PER_DAY);
    let cutoff = now_ms.saturating_sub(window);
    let mut seen_days = HashSet::new();
    let mut removed = Vec::new();
    for (rank, (version, day)) in auto.into_iter().zip(days).enumerate() {
        let in_window = version.timestamp >= cutoff;
        let keep = rank < policy.recent || (in_window && seen_days.insert(day));
        if keep {
            kept.push(version.clone());
        } else {
            removed.push(version.clone());
        }
    }

    kept.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    Ok(Pruned {
        index: kept,
        removed,
    })
}
