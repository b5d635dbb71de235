//! `cargo install` collector (Rust)
//!
//! `cargo install --list` names each crate with its version and the binaries
//! it put in `$CARGO_HOME/bin`. Cargo rewrites those binaries on every
//! (re)install, so their newest modification time approximates the crate's
//! install time.

use std::ffi::OsString;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use lazy_static::lazy_static;
use pkgtrail_exec::CommandExecutor;
use regex::Regex;
use tracing::{debug, instrument};

use crate::error::CollectError;
use crate::mtime::newest_mtime;
use crate::traits::Collector;
use crate::types::{Collection, ManagerKind, PackageRecord};

const LIST_CMD: &str = "cargo install --list";

lazy_static! {
    // "ripgrep v14.1.0:" or "foo v0.1.0 (https://github.com/x/foo#1a2b3c4d):"
    static ref CRATE_LINE: Regex =
        Regex::new(r"^([\w-]+) v(\S+?)(?: \(.*\))?:$").expect("valid regex");
}

/// Resolve cargo's bin directory from `CARGO_HOME` and the home directory
#[must_use]
pub fn default_bin_dir() -> Option<PathBuf> {
    bin_dir_from(std::env::var_os("CARGO_HOME"), dirs::home_dir())
}

fn bin_dir_from(cargo_home: Option<OsString>, home: Option<PathBuf>) -> Option<PathBuf> {
    match cargo_home.filter(|h| !h.is_empty()) {
        Some(cargo_home) => Some(PathBuf::from(cargo_home).join("bin")),
        None => home.map(|h| h.join(".cargo").join("bin")),
    }
}

/// A crate entry from `cargo install --list`
#[derive(Debug, Clone, PartialEq, Eq)]
struct InstalledCrate {
    name: String,
    version: String,
    binaries: Vec<String>,
}

/// `cargo install` collector implementation
pub struct CargoCollector {
    executor: Arc<dyn CommandExecutor>,
    /// Directory the installed binaries live in
    bin_dir: PathBuf,
}

impl CargoCollector {
    /// Create a new cargo collector probing binaries in `bin_dir`
    pub fn new(executor: Arc<dyn CommandExecutor>, bin_dir: impl Into<PathBuf>) -> Self {
        Self {
            executor,
            bin_dir: bin_dir.into(),
        }
    }

    /// Parse `cargo install --list` output
    fn parse_list(output: &str) -> Vec<InstalledCrate> {
        let mut crates: Vec<InstalledCrate> = Vec::new();

        for line in output.lines() {
            if line.trim().is_empty() {
                continue;
            }

            if let Some(caps) = CRATE_LINE.captures(line.trim()) {
                crates.push(InstalledCrate {
                    name: caps[1].to_string(),
                    version: caps[2].to_string(),
                    binaries: Vec::new(),
                });
                continue;
            }

            if line.starts_with(' ')
                && let Some(current) = crates.last_mut()
                && let Some(binary) = line.split_whitespace().next()
            {
                current.binaries.push(binary.trim_matches('"').to_string());
            }
        }

        crates
    }

    /// Newest mtime among the crate's binaries, using the crate name when none are listed
    fn newest_binary_mtime(&self, krate: &InstalledCrate) -> Option<i64> {
        if krate.binaries.is_empty() {
            newest_mtime([self.bin_dir.join(&krate.name)])
        } else {
            newest_mtime(krate.binaries.iter().map(|b| self.bin_dir.join(b)))
        }
    }
}

#[async_trait]
impl Collector for CargoCollector {
    fn manager(&self) -> ManagerKind {
        ManagerKind::Cargo
    }

    #[instrument(skip(self), fields(bin_dir = %self.bin_dir.display()))]
    async fn try_collect(&self) -> Result<Collection, CollectError> {
        let result = self.executor.run(LIST_CMD).await?.check()?;
        let crates = Self::parse_list(&result.stdout);
        debug!(crates = crates.len(), "read cargo install list");

        let mut collection = Collection::empty();
        for krate in crates {
            let timestamp = self.newest_binary_mtime(&krate);
            collection.push(timestamp, |ts| {
                PackageRecord::new(ts, krate.name, krate.version, ManagerKind::Cargo)
            });
        }

        Ok(collection)
    }
}
