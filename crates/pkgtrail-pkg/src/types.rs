//! Type definitions for installed-package records

use serde::{Deserialize, Serialize};

/// Package manager an installed package came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ManagerKind {
    /// APT / dpkg (Debian/Ubuntu)
    Apt,
    /// Snap
    Snap,
    /// pip (Python)
    Pip,
    /// `cargo install`
    Cargo,
}

impl ManagerKind {
    /// All managers, in collection order
    pub const ALL: [ManagerKind; 4] = [
        ManagerKind::Apt,
        ManagerKind::Snap,
        ManagerKind::Pip,
        ManagerKind::Cargo,
    ];

    /// Short tag used in reports
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ManagerKind::Apt => "apt",
            ManagerKind::Snap => "snap",
            ManagerKind::Pip => "pip",
            ManagerKind::Cargo => "cargo",
        }
    }
}

impl std::fmt::Display for ManagerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A top-level installed package with its estimated install/upgrade time
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageRecord {
    /// Install or last-upgrade time, seconds since the Unix epoch
    pub timestamp: i64,
    /// Package name
    pub name: String,
    /// Installed version (may be empty when the manager does not report one)
    pub version: String,
    /// Manager the package belongs to
    pub manager: ManagerKind,
}

impl PackageRecord {
    /// Create a new record
    pub fn new(
        timestamp: i64,
        name: impl Into<String>,
        version: impl Into<String>,
        manager: ManagerKind,
    ) -> Self {
        Self {
            timestamp,
            name: name.into(),
            version: version.into(),
            manager,
        }
    }
}

/// Output of a single collector run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Collection {
    /// Records with a determined timestamp
    pub records: Vec<PackageRecord>,
    /// Packages found but dropped because no timestamp could be determined
    pub skipped: usize,
}

impl Collection {
    /// An empty collection
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Add a record if it has a name and a timestamp, otherwise count it as skipped
    pub fn push(&mut self, timestamp: Option<i64>, record: impl FnOnce(i64) -> PackageRecord) {
        match timestamp {
            Some(ts) => {
                let record = record(ts);
                if record.name.is_empty() {
                    self.skipped += 1;
                } else {
                    self.records.push(record);
                }
            }
            None => self.skipped += 1,
        }
    }

    /// Number of records kept
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no records were kept
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
