//! pip collector (Python)
//!
//! Top-level distributions come from `pip list --not-required`. pip keeps no
//! install date, so the newest modification time among a distribution's
//! installed files (from `pip show -f`) approximates its last install or
//! upgrade.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use lazy_static::lazy_static;
use pkgtrail_exec::CommandExecutor;
use regex::Regex;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::error::CollectError;
use crate::mtime::{mtime, newest_mtime};
use crate::traits::Collector;
use crate::types::{Collection, ManagerKind, PackageRecord};

/// Interpreter used when none is configured
pub const DEFAULT_PYTHON: &str = "python3";

lazy_static! {
    static ref NAME_SEPARATORS: Regex = Regex::new(r"[-_.]+").expect("valid regex");
}

/// Canonical form of a distribution name (PEP 503)
fn normalize_name(name: &str) -> String {
    NAME_SEPARATORS.replace_all(name, "-").to_lowercase()
}

/// Whether `name` is safe to hand to the shell unquoted
fn is_plain_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
}

#[derive(Debug, Deserialize)]
struct ListEntry {
    name: String,
    #[serde(default)]
    version: String,
}

/// One distribution block from `pip show -f`
#[derive(Debug, Default, PartialEq, Eq)]
struct Manifest {
    name: String,
    location: Option<PathBuf>,
    files: Vec<String>,
}

impl Manifest {
    /// Newest mtime among the listed files, else the location directory's own
    fn newest_mtime(&self) -> Option<i64> {
        let location = self.location.as_ref()?;
        newest_mtime(self.files.iter().map(|f| location.join(f))).or_else(|| mtime(location))
    }
}

/// pip collector implementation
pub struct PipCollector {
    executor: Arc<dyn CommandExecutor>,
    /// Interpreter whose pip is queried
    python: String,
}

impl PipCollector {
    /// Create a new pip collector using `python -m pip`
    pub fn new(executor: Arc<dyn CommandExecutor>, python: impl Into<String>) -> Self {
        Self {
            executor,
            python: python.into(),
        }
    }

    fn pip_cmd(&self, args: &str) -> String {
        format!("{} -m pip {args}", self.python)
    }

    /// Parse `pip list --format=json`
    fn parse_list(output: &str) -> Result<Vec<ListEntry>, CollectError> {
        serde_json::from_str(output).map_err(|e| CollectError::ParseError(e.to_string()))
    }

    /// Parse `pip show -f` output, keyed by normalized name
    fn parse_show(output: &str) -> HashMap<String, Manifest> {
        let mut manifests = HashMap::new();
        let mut current = Manifest::default();
        let mut in_files = false;

        let mut finish = |manifest: Manifest| {
            if !manifest.name.is_empty() {
                manifests.insert(normalize_name(&manifest.name), manifest);
            }
        };

        for line in output.lines() {
            if line.trim() == "---" {
                finish(std::mem::take(&mut current));
                in_files = false;
                continue;
            }

            if in_files && line.starts_with(char::is_whitespace) {
                let file = line.trim();
                if !file.is_empty() {
                    current.files.push(file.to_string());
                }
                continue;
            }
            in_files = false;

            let Some((key, value)) = line.split_once(':') else {
                continue;
            };
            let value = value.trim();
            match key {
                "Name" => current.name = value.to_string(),
                "Location" if !value.is_empty() => current.location = Some(PathBuf::from(value)),
                "Files" => in_files = true,
                _ => {}
            }
        }
        finish(current);

        manifests
    }
}

#[async_trait]
impl Collector for PipCollector {
    fn manager(&self) -> ManagerKind {
        ManagerKind::Pip
    }

    #[instrument(skip(self), fields(python = %self.python))]
    async fn try_collect(&self) -> Result<Collection, CollectError> {
        let list_cmd = self.pip_cmd("list --not-required --format=json");
        let result = self.executor.run(&list_cmd).await?.check()?;
        let entries = Self::parse_list(&result.stdout)?;

        let mut collection = Collection::empty();
        let (entries, unsafe_names): (Vec<_>, Vec<_>) =
            entries.into_iter().partition(|e| is_plain_name(&e.name));
        for entry in &unsafe_names {
            debug!(name = %entry.name, "skipping distribution with unexpected name");
        }
        collection.skipped += unsafe_names.len();

        if entries.is_empty() {
            return Ok(collection);
        }

        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        let show_cmd = self.pip_cmd(&format!("show -f {}", names.join(" ")));
        let shown = self.executor.run(&show_cmd).await?;
        // pip show exits non-zero when any name is unknown but still prints the rest
        let shown = if shown.stdout.trim().is_empty() {
            shown.check()?
        } else {
            shown
        };
        let manifests = Self::parse_show(&shown.stdout);

        debug!(
            distributions = entries.len(),
            manifests = manifests.len(),
            "read pip metadata"
        );

        for entry in entries {
            let timestamp = manifests
                .get(&normalize_name(&entry.name))
                .and_then(Manifest::newest_mtime);
            collection.push(timestamp, |ts| {
                PackageRecord::new(ts, entry.name, entry.version, ManagerKind::Pip)
            });
        }

        Ok(collection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockExecutor;
    use filetime::{FileTime, set_file_mtime};
    use std::path::Path;

    fn touch(path: &Path, ts: i64) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, "").unwrap();
        set_file_mtime(path, FileTime::from_unix_time(ts, 0)).unwrap();
    }

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("Flask_SQLAlchemy"), "flask-sqlalchemy");
        assert_eq!(normalize_name("zope.interface"), "zope-interface");
        assert_eq!(normalize_name("a-_.b"), "a-b");
    }

    #[test]
    fn test_is_plain_name() {
        assert!(is_plain_name("ruamel.yaml"));
        assert!(!is_plain_name("evil; rm -rf /"));
        assert!(!is_plain_name(""));
    }

    #[test]
    fn test_parse_show() {
        let output = "\
Name: requests
Version: 2.31.0
Location: /usr/lib/python3/dist-packages
Requires: certifi, idna
Files:
  requests-2.31.0.dist-info/METADATA
  requests/__init__.py
---
Name: Flask_Login
Version: 0.6.3
Location: /home/me/.local/lib/python3.12/site-packages
Files:
  Cannot locate RECORD or installed-files.txt
";
        let manifests = PipCollector::parse_show(output);

        assert_eq!(manifests.len(), 2);
        assert_eq!(
            manifests["requests"],
            Manifest {
                name: "requests".to_string(),
                location: Some(PathBuf::from("/usr/lib/python3/dist-packages")),
                files: vec![
                    "requests-2.31.0.dist-info/METADATA".to_string(),
                    "requests/__init__.py".to_string(),
                ],
            }
        );
        assert!(manifests.contains_key("flask-login"));
    }

    #[tokio::test]
    async fn test_collect_uses_newest_file() {
        let site = tempfile::tempdir().unwrap();
        touch(&site.path().join("httpie/__init__.py"), 1_000);
        touch(&site.path().join("httpie-3.2.2.dist-info/RECORD"), 3_000);
        touch(&site.path().join("rich/__init__.py"), 2_000);

        let list = r#"[{"name": "httpie", "version": "3.2.2"}, {"name": "Rich", "version": "13.7.1"}]"#;
        let show = format!(
            "Name: httpie\nVersion: 3.2.2\nLocation: {loc}\nFiles:\n  httpie/__init__.py\n  httpie-3.2.2.dist-info/RECORD\n---\nName: rich\nVersion: 13.7.1\nLocation: {loc}\nFiles:\n  rich/__init__.py\n  rich/missing.py\n",
            loc = site.path().display()
        );
        let executor = MockExecutor::new()
            .with("python3 -m pip list --not-required --format=json", 0, list)
            .with("python3 -m pip show -f httpie Rich", 0, &show);
        let collector = PipCollector::new(Arc::new(executor), DEFAULT_PYTHON);

        let collection = collector.collect().await;

        assert_eq!(
            collection.records,
            vec![
                PackageRecord::new(3_000, "httpie", "3.2.2", ManagerKind::Pip),
                PackageRecord::new(2_000, "Rich", "13.7.1", ManagerKind::Pip),
            ]
        );
    }

    #[tokio::test]
    async fn test_falls_back_to_location_mtime() {
        let site = tempfile::tempdir().unwrap();
        set_file_mtime(site.path(), FileTime::from_unix_time(4_242, 0)).unwrap();

        let show = format!(
            "Name: legacy\nVersion: 0.1\nLocation: {}\nFiles:\n  Cannot locate RECORD or installed-files.txt\n",
            site.path().display()
        );
        let executor = MockExecutor::new()
            .with(
                "python3 -m pip list --not-required --format=json",
                0,
                r#"[{"name": "legacy", "version": "0.1"}]"#,
            )
            .with("python3 -m pip show -f legacy", 0, &show);
        let collector = PipCollector::new(Arc::new(executor), DEFAULT_PYTHON);

        let collection = collector.collect().await;

        assert_eq!(collection.records[0].timestamp, 4_242);
    }

    #[tokio::test]
    async fn test_empty_pip_show_failure_yields_empty() {
        let executor = MockExecutor::new()
            .with(
                "python3 -m pip list --not-required --format=json",
                0,
                r#"[{"name": "ghost", "version": "1.0"}]"#,
            )
            .with("python3 -m pip show -f ghost", 1, "");
        let collector = PipCollector::new(Arc::new(executor), DEFAULT_PYTHON);

        // pip show printing nothing and failing aborts the whole collector
        assert!(collector.try_collect().await.is_err());
        assert!(collector.collect().await.is_empty());
    }

    #[tokio::test]
    async fn test_partial_pip_show_output_is_used() {
        let site = tempfile::tempdir().unwrap();
        touch(&site.path().join("httpie/__init__.py"), 5_000);

        let show = format!(
            "Name: httpie\nVersion: 3.2.2\nLocation: {}\nFiles:\n  httpie/__init__.py\n",
            site.path().display()
        );
        let executor = MockExecutor::new()
            .with(
                "python3 -m pip list --not-required --format=json",
                0,
                r#"[{"name": "httpie", "version": "3.2.2"}, {"name": "ghost", "version": "1.0"}]"#,
            )
            .with("python3 -m pip show -f httpie ghost", 1, &show);
        let collector = PipCollector::new(Arc::new(executor), DEFAULT_PYTHON);

        let collection = collector.try_collect().await.unwrap();

        assert_eq!(
            collection.records,
            vec![PackageRecord::new(5_000, "httpie", "3.2.2", ManagerKind::Pip)]
        );
        assert_eq!(collection.skipped, 1);
    }

    #[tokio::test]
    async fn test_invalid_json_yields_empty() {
        let executor = MockExecutor::new().with(
            "python3 -m pip list --not-required --format=json",
            0,
            "Package Version\n------- -------\n",
        );
        let collector = PipCollector::new(Arc::new(executor), DEFAULT_PYTHON);

        assert!(matches!(
            collector.try_collect().await,
            Err(CollectError::ParseError(_))
        ));
        assert!(collector.collect().await.is_empty());
    }

    #[tokio::test]
    async fn test_custom_interpreter() {
        let executor = MockExecutor::new().with(
            "/opt/venv/bin/python -m pip list --not-required --format=json",
            0,
            "[]",
        );
        let collector = PipCollector::new(Arc::new(executor), "/opt/venv/bin/python");

        let collection = collector.try_collect().await.unwrap();
        assert!(collection.is_empty());
    }
}
