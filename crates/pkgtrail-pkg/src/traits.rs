//! Collector trait

use async_trait::async_trait;
use tracing::{debug, info};

use crate::error::CollectError;
use crate::types::{Collection, ManagerKind};

/// Collects top-level installed packages for one package manager
///
/// Implementations only provide [`try_collect`](Collector::try_collect).
/// Callers use [`collect`](Collector::collect), which never fails: any error
/// becomes an empty collection.
#[async_trait]
pub trait Collector: Send + Sync {
    /// Manager this collector reports on
    fn manager(&self) -> ManagerKind;

    /// Query the manager, propagating the first failure
    async fn try_collect(&self) -> Result<Collection, CollectError>;

    /// Query the manager, returning an empty collection on any failure
    async fn collect(&self) -> Collection {
        let manager = self.manager();
        match self.try_collect().await {
            Ok(collection) => {
                info!(
                    %manager,
                    count = collection.len(),
                    skipped = collection.skipped,
                    "collected packages"
                );
                collection
            }
            Err(e) if e.is_missing_tool() => {
                debug!(%manager, error = %e, "package manager not available");
                Collection::empty()
            }
            Err(e) => {
                debug!(%manager, error = %e, "collection failed");
                Collection::empty()
            }
        }
    }
}
