//! History filtering and latest-snapshot statistics.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::History;
use crate::telemetry::{Alert, BatteryRecord, BatteryStatus, SystemSnapshot, TotalStats};

/// Number of alerts echoed by [`statistics`].
pub const LATEST_ALERT_COUNT: usize = 5;

/// One battery's reading tagged with the timestamp of its snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct BatteryHistoryEntry {
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub battery: BatteryRecord,
}

/// Result of a history query: whole snapshots, or one battery's trail.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum HistoryView {
    Snapshots(Vec<SystemSnapshot>),
    Battery(Vec<BatteryHistoryEntry>),
}

impl HistoryView {
    pub fn len(&self) -> usize {
        match self {
            Self::Snapshots(s) => s.len(),
            Self::Battery(b) => b.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Returns the last `limit` snapshots, or with `battery_id` the matching
/// record from each of them. Both are oldest first.
///
/// `limit` is not clamped here; callers bound it.
pub fn query_history(history: &History, battery_id: Option<u32>, limit: usize) -> HistoryView {
    let recent = history.recent(limit);
    match battery_id {
        None => HistoryView::Snapshots(recent.cloned().collect()),
        Some(id) => HistoryView::Battery(
            recent
                .filter_map(|snap| {
                    snap.battery(id).map(|b| BatteryHistoryEntry {
                        timestamp: snap.timestamp,
                        battery: b.clone(),
                    })
                })
                .collect(),
        ),
    }
}

/// Battery counts by status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusSummary {
    pub total_batteries: usize,
    pub normal_count: usize,
    pub inspection_count: usize,
    pub failed_count: usize,
}

impl StatusSummary {
    pub fn from_batteries(batteries: &[BatteryRecord]) -> Self {
        let count = |status: BatteryStatus| batteries.iter().filter(|b| b.status == status).count();
        Self {
            total_batteries: batteries.len(),
            normal_count: count(BatteryStatus::Normal),
            inspection_count: count(BatteryStatus::UnderInspection),
            failed_count: count(BatteryStatus::Failed),
        }
    }
}

/// Summary of the most recent snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct Statistics {
    pub summary: StatusSummary,
    pub total_stats: TotalStats,
    pub latest_alerts: Vec<Alert>,
}

/// Summarizes the latest snapshot, or `None` when the history is empty.
pub fn statistics(history: &History) -> Option<Statistics> {
    let latest = history.latest()?;
    Some(Statistics {
        summary: StatusSummary::from_batteries(&latest.batteries),
        total_stats: latest.total_stats.clone(),
        latest_alerts: latest
            .alerts
            .iter()
            .take(LATEST_ALERT_COUNT)
            .cloned()
            .collect(),
    })
}
