//! File modification times used as install-time proxies

use std::path::Path;

use chrono::{DateTime, Utc};
use tracing::trace;

/// Modification time of `path` in epoch seconds, following symlinks
///
/// Returns `None` if the file does not exist or its metadata cannot be read.
pub fn mtime(path: &Path) -> Option<i64> {
    match std::fs::metadata(path).and_then(|m| m.modified()) {
        Ok(modified) => Some(DateTime::<Utc>::from(modified).timestamp()),
        Err(e) => {
            trace!(path = %path.display(), error = %e, "no modification time");
            None
        }
    }
}

/// Newest modification time among `paths`, ignoring ones that cannot be read
pub fn newest_mtime<I, P>(paths: I) -> Option<i64>
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    paths.into_iter().filter_map(|p| mtime(p.as_ref())).max()
}
