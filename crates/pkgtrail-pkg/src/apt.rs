//! APT collector (Debian/Ubuntu)
//!
//! "Top-level" means marked manual by `apt-mark`. dpkg does not record an
//! install date, so the modification time of the package's file list under
//! `/var/lib/dpkg/info` stands in for it; dpkg rewrites that file on every
//! install and upgrade.

use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use pkgtrail_exec::CommandExecutor;
use tracing::{debug, instrument, trace};

use crate::error::CollectError;
use crate::mtime::{mtime, newest_mtime};
use crate::traits::Collector;
use crate::types::{Collection, ManagerKind, PackageRecord};

/// Where dpkg keeps per-package metadata
pub const DEFAULT_DPKG_INFO_DIR: &str = "/var/lib/dpkg/info";

const SHOW_MANUAL_CMD: &str = "apt-mark showmanual";
const DPKG_QUERY_CMD: &str = r"dpkg-query -W -f='${Package}\t${Version}\n'";

/// APT collector implementation
pub struct AptCollector {
    executor: Arc<dyn CommandExecutor>,
    /// Directory holding `<pkg>.list` record files
    info_dir: PathBuf,
}

impl AptCollector {
    /// Create a new APT collector reading record files from `info_dir`
    pub fn new(executor: Arc<dyn CommandExecutor>, info_dir: impl Into<PathBuf>) -> Self {
        Self {
            executor,
            info_dir: info_dir.into(),
        }
    }

    /// Parse `apt-mark showmanual` output into a set of names
    fn parse_manual(output: &str) -> BTreeSet<String> {
        output
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(ToString::to_string)
            .collect()
    }

    /// Parse tab-separated `dpkg-query` output into name -> version
    fn parse_versions(output: &str) -> HashMap<String, String> {
        output
            .lines()
            .filter(|l| !l.trim().is_empty())
            .filter_map(|line| {
                let (name, version) = line.split_once('\t')?;
                Some((name.trim().to_string(), version.trim().to_string()))
            })
            .collect()
    }

    /// Modification time of the package's record file
    ///
    /// Falls back to multi-arch record files (`<pkg>:<arch>.list`) when the
    /// plain one is absent.
    fn record_mtime(info_dir: &Path, package: &str) -> Option<i64> {
        if let Some(ts) = mtime(&info_dir.join(format!("{package}.list"))) {
            return Some(ts);
        }

        let prefix = format!("{package}:");
        let entries = std::fs::read_dir(info_dir).ok()?;
        let candidates: Vec<PathBuf> = entries
            .filter_map(Result::ok)
            .filter(|entry| {
                let name = entry.file_name();
                let name = name.to_string_lossy();
                name.starts_with(&prefix) && name.ends_with(".list")
            })
            .map(|entry| entry.path())
            .collect();

        trace!(package, candidates = candidates.len(), "probing multi-arch record files");
        newest_mtime(&candidates)
    }
}

#[async_trait]
impl Collector for AptCollector {
    fn manager(&self) -> ManagerKind {
        ManagerKind::Apt
    }

    #[instrument(skip(self), fields(info_dir = %self.info_dir.display()))]
    async fn try_collect(&self) -> Result<Collection, CollectError> {
        let manual = self.executor.run(SHOW_MANUAL_CMD).await?.check()?;
        let manual = Self::parse_manual(&manual.stdout);

        let installed = self.executor.run(DPKG_QUERY_CMD).await?.check()?;
        let versions = Self::parse_versions(&installed.stdout);

        debug!(
            manual = manual.len(),
            installed = versions.len(),
            "read apt package lists"
        );

        let mut collection = Collection::empty();
        for name in manual.iter().filter(|n| versions.contains_key(*n)) {
            let version = &versions[name];
            collection.push(Self::record_mtime(&self.info_dir, name), |ts| {
                PackageRecord::new(ts, name.as_str(), version.as_str(), ManagerKind::Apt)
            });
        }

        Ok(collection)
    }
}
