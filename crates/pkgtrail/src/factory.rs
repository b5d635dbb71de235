//! Collector construction from configuration

use std::sync::Arc;

use pkgtrail_exec::CommandExecutor;
use pkgtrail_pkg::cargo::default_bin_dir;
use pkgtrail_pkg::{AptCollector, CargoCollector, Collector, PipCollector, SnapCollector};
use tracing::warn;

use crate::config::SourcesConfig;

/// Build every collector, in report order: apt, snap, pip, cargo
///
/// The cargo collector is left out when no bin directory is configured and
/// neither `CARGO_HOME` nor a home directory can be found.
pub fn build_collectors(
    sources: &SourcesConfig,
    executor: Arc<dyn CommandExecutor>,
) -> Vec<Arc<dyn Collector>> {
    let mut collectors: Vec<Arc<dyn Collector>> = vec![
        Arc::new(AptCollector::new(
            executor.clone(),
            sources.dpkg_info_dir.clone(),
        )),
        Arc::new(SnapCollector::new(executor.clone())),
        Arc::new(PipCollector::new(executor.clone(), sources.python.clone())),
    ];

    match sources.cargo_bin_dir.clone().or_else(default_bin_dir) {
        Some(bin_dir) => collectors.push(Arc::new(CargoCollector::new(executor, bin_dir))),
        None => warn!("cannot locate cargo bin directory, skipping cargo"),
    }

    collectors
}
