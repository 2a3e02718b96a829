//! Issue scaffolding
//!
//! Creates a new issue directory under `.testset/issues/` from a declared
//! template.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Glob pattern for template metadata, relative to the project root
const TEMPLATE_GLOB: &str = ".testset/templates/*/testset.template.json";

/// Metadata file marking a directory as a template
const TEMPLATE_MARKER: &str = "testset.template.json";

/// Per-issue config file name
const ISSUE_CONFIG: &str = "testset.config.json";

/// Starter config written when a template ships none
const STARTER_CONFIG: &str = "{\n  \"test\": \"exit 1\"\n}\n";

/// Schema of `testset.template.json`
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TemplateConfig {
    pub name: String,
}

/// A discovered template directory
#[derive(Clone, Debug)]
pub struct Template {
    pub config: TemplateConfig,
    pub dir: PathBuf,
}

/// Parse the leading issue number from an issue name
///
/// Names must start with a positive number, e.g. `42-nullable-join`.
pub fn issue_number(name: &str) -> Option<u32> {
    let digits: String = name.chars().take_while(|c| c.is_ascii_digit()).collect();
    let number: u32 = digits.parse().ok()?;
    (number >= 1).then_some(number)
}

/// Discover declared templates under `root`
///
/// Unreadable or invalid template metadata is skipped.
pub fn discover_templates(root: &Path) -> Vec<Template> {
    let pattern = root.join(TEMPLATE_GLOB).to_string_lossy().into_owned();

    let Ok(paths) = glob::glob(&pattern) else {
        return Vec::new();
    };

    let mut templates = Vec::new();
    for path in paths.filter_map(Result::ok) {
        let Ok(content) = std::fs::read_to_string(&path) else {
            debug!("skipping unreadable template: {}", path.display());
            continue;
        };
        let Ok(config) = serde_json::from_str::<TemplateConfig>(&content) else {
            debug!("skipping invalid template: {}", path.display());
            continue;
        };
        let dir = path
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .to_path_buf();
        templates.push(Template { config, dir });
    }

    templates.sort_by(|a, b| a.config.name.cmp(&b.config.name));
    templates
}

/// Create a new issue directory from a template
///
/// Returns the path of the created issue directory. The copied template
/// loses its `testset.template.json` marker, and a starter
/// `testset.config.json` is written when the template provides none, so the
/// fresh issue is immediately discoverable.
pub fn create_issue(root: &Path, name: &str, template_name: Option<&str>) -> Result<PathBuf> {
    if issue_number(name).is_none() {
        bail!("invalid issue name '{name}' (it must start with the issue number)");
    }

    let templates = discover_templates(root);
    let template = select_template(&templates, template_name)?;

    let destination = root.join(".testset/issues").join(name);
    if destination.exists() {
        bail!("issue already exists: {}", destination.display());
    }

    copy_dir(&template.dir, &destination).with_context(|| {
        format!(
            "failed to copy template '{}' to {}",
            template.config.name,
            destination.display()
        )
    })?;

    let marker = destination.join(TEMPLATE_MARKER);
    if marker.exists() {
        std::fs::remove_file(&marker)
            .with_context(|| format!("failed to remove {}", marker.display()))?;
    }

    let config_path = destination.join(ISSUE_CONFIG);
    if !config_path.exists() {
        std::fs::write(&config_path, STARTER_CONFIG)
            .with_context(|| format!("failed to write {}", config_path.display()))?;
    }

    info!(
        "created issue {name} from template '{}'",
        template.config.name
    );
    Ok(destination)
}

fn select_template<'a>(templates: &'a [Template], want: Option<&str>) -> Result<&'a Template> {
    match want {
        Some(name) => templates
            .iter()
            .find(|t| t.config.name == name)
            .with_context(|| {
                format!(
                    "no template named '{name}' (available: {})",
                    template_names(templates)
                )
            }),
        None => match templates {
            [] => bail!("no templates found under .testset/templates/"),
            [only] => Ok(only),
            _ => bail!(
                "several templates available; pick one with --template (available: {})",
                template_names(templates)
            ),
        },
    }
}

fn template_names(templates: &[Template]) -> String {
    templates
        .iter()
        .map(|t| t.config.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

fn copy_dir(src: &Path, dst: &Path) -> std::io::Result<()> {
    std::fs::create_dir_all(dst)?;
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let target = dst.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_dir(&entry.path(), &target)?;
        } else {
            std::fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn write_template(root: &Path, dir_name: &str, display_name: &str) -> PathBuf {
        let dir = root.join(".testset/templates").join(dir_name);
        fs::create_dir_all(&dir).unwrap();
        fs::write(
            dir.join(TEMPLATE_MARKER),
            format!(r#"{{ "name": "{display_name}" }}"#),
        )
        .unwrap();
        dir
    }

    #[test]
    fn issue_numbers_parse() {
        assert_eq!(issue_number("42-nullable-join"), Some(42));
        assert_eq!(issue_number("1"), Some(1));
        assert_eq!(issue_number("0-zero"), None);
        assert_eq!(issue_number("fix-42"), None);
        assert_eq!(issue_number(""), None);
    }

    #[test]
    fn discovers_templates_by_name() {
        let root = tempdir().unwrap();
        write_template(root.path(), "b", "node");
        write_template(root.path(), "a", "deno");

        let templates = discover_templates(root.path());
        assert_eq!(templates.len(), 2);
        assert_eq!(templates[0].config.name, "deno");
        assert_eq!(templates[1].config.name, "node");
    }

    #[test]
    fn creates_issue_from_sole_template() {
        let root = tempdir().unwrap();
        let template_dir = write_template(root.path(), "default", "default");
        fs::write(template_dir.join("package.json"), "{}").unwrap();
        fs::create_dir_all(template_dir.join("src")).unwrap();
        fs::write(template_dir.join("src/index.js"), "// entry").unwrap();

        let created = create_issue(root.path(), "12-repro", None).unwrap();

        assert!(created.ends_with(".testset/issues/12-repro"));
        assert!(created.join("package.json").exists());
        assert!(created.join("src/index.js").exists());
        // Marker removed, starter config written.
        assert!(!created.join(TEMPLATE_MARKER).exists());
        assert!(created.join(ISSUE_CONFIG).exists());
    }

    #[test]
    fn template_config_survives_copy() {
        let root = tempdir().unwrap();
        let template_dir = write_template(root.path(), "default", "default");
        fs::write(template_dir.join(ISSUE_CONFIG), r#"{ "test": "npm test" }"#).unwrap();

        let created = create_issue(root.path(), "3-keeps-config", None).unwrap();
        let config = fs::read_to_string(created.join(ISSUE_CONFIG)).unwrap();
        assert!(config.contains("npm test"));
    }

    #[test]
    fn rejects_bad_issue_name() {
        let root = tempdir().unwrap();
        write_template(root.path(), "default", "default");

        let err = create_issue(root.path(), "no-number", None).unwrap_err();
        assert!(err.to_string().contains("issue number"));
    }

    #[test]
    fn ambiguous_template_requires_flag() {
        let root = tempdir().unwrap();
        write_template(root.path(), "a", "deno");
        write_template(root.path(), "b", "node");

        let err = create_issue(root.path(), "1-x", None).unwrap_err();
        assert!(err.to_string().contains("--template"));

        let created = create_issue(root.path(), "1-x", Some("node")).unwrap();
        assert!(created.exists());
    }

    #[test]
    fn refuses_to_overwrite_existing_issue() {
        let root = tempdir().unwrap();
        write_template(root.path(), "default", "default");

        create_issue(root.path(), "5-once", None).unwrap();
        let err = create_issue(root.path(), "5-once", None).unwrap_err();
        assert!(err.to_string().contains("already exists"));
    }
}
