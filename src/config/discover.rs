//! Issue discovery
//!
//! Locates `testset.config.json` files under `.testset/issues/` and turns
//! them into executable specs.

use std::path::{Path, PathBuf};
use tracing::{debug, error};

use super::issue::IssueConfig;
use super::ConfigError;
use crate::models::IssueSpec;

/// Glob pattern for issue configs, relative to the project root
const ISSUE_GLOB: &str = ".testset/issues/*/testset.config.json";

/// Result of scanning a project root for issues
///
/// Issues whose config is unreadable or invalid are skipped entirely: they
/// appear in `errors`, never in `specs`, and never count toward the report.
#[derive(Debug, Default)]
pub struct Discovery {
    pub specs: Vec<IssueSpec>,
    pub errors: Vec<ConfigError>,
}

impl Discovery {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Discover all declared issues under `root`
///
/// Specs are returned in sorted path order so batch submission order is
/// deterministic across runs.
pub fn discover_issues(root: &Path) -> Discovery {
    let pattern = root.join(ISSUE_GLOB).to_string_lossy().into_owned();

    let paths = match glob::glob(&pattern) {
        Ok(paths) => paths,
        Err(source) => {
            let err = ConfigError::Pattern { pattern, source };
            error!("{err}");
            return Discovery {
                specs: Vec::new(),
                errors: vec![err],
            };
        }
    };

    let mut config_paths: Vec<PathBuf> = paths.filter_map(Result::ok).collect();
    config_paths.sort();

    debug!("found {} issue config(s) under {}", config_paths.len(), root.display());

    let mut discovery = Discovery::default();

    for path in config_paths {
        match load_spec(&path) {
            Ok(spec) => discovery.specs.push(spec),
            Err(err) => {
                let shown = path.strip_prefix(root).unwrap_or(&path);
                error!("could not read issue {}: {err}", shown.display());
                discovery.errors.push(err);
            }
        }
    }

    discovery
}

fn load_spec(path: &Path) -> Result<IssueSpec, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Unreadable {
        path: path.to_path_buf(),
        source,
    })?;

    IssueConfig::parse(path, &content)?.into_spec(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn write_issue(root: &Path, name: &str, body: &str) {
        let dir = root.join(".testset/issues").join(name);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("testset.config.json"), body).unwrap();
    }

    #[test]
    fn discovers_issues_in_sorted_order() {
        let dir = tempdir().unwrap();
        write_issue(dir.path(), "2-later", r#"{ "test": "exit 0" }"#);
        write_issue(dir.path(), "1-first", r#"{ "test": "exit 1", "timeout": 100 }"#);

        let discovery = discover_issues(dir.path());
        assert!(!discovery.has_errors());
        assert_eq!(discovery.specs.len(), 2);
        assert_eq!(discovery.specs[0].name, "1-first");
        assert_eq!(discovery.specs[0].timeout_ms, Some(100));
        assert_eq!(discovery.specs[1].name, "2-later");
    }

    #[test]
    fn empty_root_yields_nothing() {
        let dir = tempdir().unwrap();
        let discovery = discover_issues(dir.path());
        assert!(discovery.specs.is_empty());
        assert!(!discovery.has_errors());
    }

    #[test]
    fn invalid_config_is_skipped_and_reported() {
        let dir = tempdir().unwrap();
        write_issue(dir.path(), "1-good", r#"{ "test": "exit 0" }"#);
        write_issue(dir.path(), "2-broken", "not json at all");
        write_issue(dir.path(), "3-empty", r#"{ "test": "" }"#);

        let discovery = discover_issues(dir.path());
        assert_eq!(discovery.specs.len(), 1);
        assert_eq!(discovery.specs[0].name, "1-good");
        assert_eq!(discovery.errors.len(), 2);
        assert!(discovery.has_errors());
    }

    #[test]
    fn spec_dir_points_at_issue_directory() {
        let dir = tempdir().unwrap();
        write_issue(dir.path(), "5-wd", r#"{ "test": "pwd" }"#);

        let discovery = discover_issues(dir.path());
        let spec = &discovery.specs[0];
        assert!(spec.dir.ends_with(".testset/issues/5-wd"));
    }
}
