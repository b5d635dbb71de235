//! Snap collector
//!
//! Snap reports an install date per current revision, so no filesystem
//! probing is needed; the column is parsed with the free-form timestamp parser.

use std::sync::Arc;

use async_trait::async_trait;
use pkgtrail_exec::CommandExecutor;
use tracing::{debug, instrument};

use crate::columns::ColumnLayout;
use crate::error::CollectError;
use crate::timestamp::parse_timestamp;
use crate::traits::Collector;
use crate::types::{Collection, ManagerKind, PackageRecord};

const LIST_CMD: &str = "snap list --date";

const NAME_COLUMN: &str = "Name";
const VERSION_COLUMN: &str = "Version";
const INSTALLED_COLUMN: &str = "Installed";

/// Snap collector implementation
pub struct SnapCollector {
    executor: Arc<dyn CommandExecutor>,
}

impl SnapCollector {
    /// Create a new snap collector
    pub fn new(executor: Arc<dyn CommandExecutor>) -> Self {
        Self { executor }
    }

    /// Parse `snap list --date` output
    fn parse_list(output: &str) -> Result<Collection, CollectError> {
        let mut lines = output.lines();
        let Some(header) = lines.next() else {
            return Ok(Collection::empty());
        };

        let layout = ColumnLayout::from_header(header);
        for column in [NAME_COLUMN, VERSION_COLUMN, INSTALLED_COLUMN] {
            if !layout.has(column) {
                return Err(CollectError::MissingHeader(column.to_string()));
            }
        }

        let mut collection = Collection::empty();
        for line in lines.filter(|l| !l.trim().is_empty()) {
            let name = layout.field(line, NAME_COLUMN).unwrap_or_default();
            if name.is_empty() {
                continue;
            }
            let version = layout.field(line, VERSION_COLUMN).unwrap_or_default();
            let installed = layout.field(line, INSTALLED_COLUMN).unwrap_or_default();

            let timestamp = parse_timestamp(&installed);
            if timestamp.is_none() {
                debug!(snap = %name, installed = %installed, "unparseable install date");
            }
            collection.push(timestamp, |ts| {
                PackageRecord::new(ts, name, version, ManagerKind::Snap)
            });
        }

        Ok(collection)
    }
}

#[async_trait]
impl Collector for SnapCollector {
    fn manager(&self) -> ManagerKind {
        ManagerKind::Snap
    }

    #[instrument(skip(self))]
    async fn try_collect(&self) -> Result<Collection, CollectError> {
        let result = self.executor.run(LIST_CMD).await?.check()?;
        Self::parse_list(&result.stdout)
    }
}
