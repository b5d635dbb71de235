//! Combining collector output into one time-sorted report

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, instrument};

use crate::traits::Collector;
use crate::types::{ManagerKind, PackageRecord};

/// Which managers to include in a report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ManagerSelection {
    /// Every manager
    #[default]
    All,
    /// A single manager
    Only(ManagerKind),
}

impl ManagerSelection {
    /// Whether `kind` is part of the selection
    #[must_use]
    pub fn includes(self, kind: ManagerKind) -> bool {
        match self {
            ManagerSelection::All => true,
            ManagerSelection::Only(only) => only == kind,
        }
    }
}

/// Records from all selected collectors
#[derive(Debug, Clone, Default)]
pub struct Report {
    /// Records, most recent first once sorted
    pub records: Vec<PackageRecord>,
    /// Per-manager count of packages dropped for lack of a timestamp
    pub skipped: BTreeMap<ManagerKind, usize>,
}

impl Report {
    /// Sort newest first and keep at most `limit` records (`None` or 0 keeps all)
    #[must_use]
    pub fn finish(mut self, limit: Option<usize>) -> Self {
        sort_records(&mut self.records);
        apply_limit(&mut self.records, limit);
        self
    }

    /// Total number of skipped packages
    #[must_use]
    pub fn total_skipped(&self) -> usize {
        self.skipped.values().sum()
    }
}

/// Run every selected collector in order and concatenate their records
#[instrument(skip(collectors), fields(collectors = collectors.len()))]
pub async fn collect_report(
    collectors: &[Arc<dyn Collector>],
    selection: ManagerSelection,
) -> Report {
    let mut report = Report::default();

    for collector in collectors {
        let manager = collector.manager();
        if !selection.includes(manager) {
            continue;
        }

        let collection = collector.collect().await;
        report.records.extend(collection.records);
        *report.skipped.entry(manager).or_default() += collection.skipped;
    }

    debug!(
        records = report.records.len(),
        skipped = report.total_skipped(),
        "aggregated records"
    );

    report
}

/// Stable sort by timestamp, newest first; equal timestamps keep their order
pub fn sort_records(records: &mut [PackageRecord]) {
    records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
}

/// Truncate to the first `limit` records; `None` or 0 means unlimited
pub fn apply_limit(records: &mut Vec<PackageRecord>, limit: Option<usize>) {
    if let Some(limit) = limit.filter(|l| *l > 0) {
        records.truncate(limit);
    }
}
