//! Per-issue configuration schema
//!
//! Each issue directory carries a `testset.config.json` describing how to
//! run it.

use serde::{Deserialize, Serialize};
use std::path::Path;

use super::ConfigError;
use crate::models::IssueSpec;

/// Schema of `testset.config.json`
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct IssueConfig {
    /// Shell command that exercises the issue
    pub test: String,

    /// Optional timeout in milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
}

impl IssueConfig {
    /// Parse a config document, naming `path` in any error
    pub fn parse(path: &Path, content: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(content).map_err(|source| ConfigError::Invalid {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Validate and convert into an executable [`IssueSpec`]
    ///
    /// The issue name and working directory are taken from the config file's
    /// parent directory.
    pub fn into_spec(self, config_path: &Path) -> Result<IssueSpec, ConfigError> {
        if self.test.trim().is_empty() {
            return Err(ConfigError::EmptyCommand {
                path: config_path.to_path_buf(),
            });
        }

        let dir = config_path
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .to_path_buf();
        let name = dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| dir.display().to_string());

        Ok(IssueSpec {
            name,
            command: self.test,
            dir,
            timeout_ms: self.timeout,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn parses_minimal_config() {
        let config =
            IssueConfig::parse(Path::new("x.json"), r#"{ "test": "cargo test" }"#).unwrap();
        assert_eq!(config.test, "cargo test");
        assert!(config.timeout.is_none());
    }

    #[test]
    fn parses_timeout() {
        let config =
            IssueConfig::parse(Path::new("x.json"), r#"{ "test": "exit 0", "timeout": 250 }"#)
                .unwrap();
        assert_eq!(config.timeout, Some(250));
    }

    #[test]
    fn rejects_missing_test_field() {
        let err = IssueConfig::parse(Path::new("x.json"), r#"{ "timeout": 250 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    #[test]
    fn rejects_empty_command() {
        let config = IssueConfig {
            test: "   ".to_string(),
            timeout: None,
        };
        let err = config
            .into_spec(Path::new("/work/.testset/issues/9-x/testset.config.json"))
            .unwrap_err();
        assert!(matches!(err, ConfigError::EmptyCommand { .. }));
    }

    #[test]
    fn spec_takes_name_and_dir_from_parent() {
        let config = IssueConfig {
            test: "exit 0".to_string(),
            timeout: Some(100),
        };
        let spec = config
            .into_spec(Path::new("/work/.testset/issues/9-x/testset.config.json"))
            .unwrap();

        assert_eq!(spec.name, "9-x");
        assert_eq!(spec.dir, PathBuf::from("/work/.testset/issues/9-x"));
        assert_eq!(spec.timeout_ms, Some(100));
    }
}
