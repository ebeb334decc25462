//! Source packaging: every source package must live under the project's group-id
//!
//! A project without source packages passes. Otherwise the group-id must be present
//! and each package name must start with it.

use super::EnforcerRule;
use crate::domain::project::ProjectModel;
use crate::domain::violations::{Severity, Violation, ViolationKind};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

pub const RULE_ID: &str = "correct-packaging";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PackagingOptions {
    pub severity: Severity,
}

impl Default for PackagingOptions {
    fn default() -> Self {
        Self { severity: Severity::Error }
    }
}

/// Checks that source packages are prefixed by the project group-id
#[derive(Debug, Clone)]
pub struct CorrectPackagingRule {
    severity: Severity,
}

impl CorrectPackagingRule {
    pub fn new(options: &PackagingOptions) -> Self {
        Self { severity: options.severity }
    }

    pub fn check(&self, project: &ProjectModel) -> Option<Violation> {
        if project.packages.is_empty() {
            return None;
        }

        let group_id = match project.group_id.as_deref().map(str::trim) {
            Some(group_id) if !group_id.is_empty() => group_id,
            _ => {
                return Some(self.violation(project, "Project groupId cannot be null or empty.".to_string()));
            }
        };

        let incorrect = incorrect_packages(project, group_id);
        if incorrect.is_empty() {
            tracing::debug!("All {} source packages of [{}] are within {}", project.packages.len(), project.gav(), group_id);
            return None;
        }

        let listing = incorrect
            .iter()
            .map(|(package, files)| {
                format!("{package}=[{}]", files.iter().copied().collect::<Vec<_>>().join(", "))
            })
            .collect::<Vec<_>>()
            .join(", ");

        Some(
            self.violation(
                project,
                format!(
                    "Incorrect packaging detected; required [{group_id}] but found package to file names: {{{listing}}}"
                ),
            )
            .with_suggestion(format!("Move the listed sources into packages under {group_id}")),
        )
    }

    fn violation(&self, project: &ProjectModel, message: String) -> Violation {
        Violation::new(RULE_ID, self.severity, ViolationKind::IncorrectPackaging, message)
            .with_project(project.gav())
    }
}

/// Offending package names mapped to their file names, both sorted
fn incorrect_packages<'a>(project: &'a ProjectModel, group_id: &str) -> BTreeMap<&'a str, BTreeSet<&'a str>> {
    let mut incorrect: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
    for package in project.packages.iter().filter(|p| !p.name.starts_with(group_id)) {
        incorrect
            .entry(package.name.as_str())
            .or_default()
            .extend(package.files.iter().map(String::as_str));
    }
    incorrect
}

impl EnforcerRule for CorrectPackagingRule {
    fn id(&self) -> &'static str {
        RULE_ID
    }

    fn short_description(&self) -> &'static str {
        "Topmost source package must be identical to project groupId."
    }

    fn severity(&self) -> Severity {
        self.severity
    }

    fn evaluate(&self, project: &ProjectModel) -> Vec<Violation> {
        self.check(project).into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::project::SourcePackage;

    fn rule() -> CorrectPackagingRule {
        CorrectPackagingRule::new(&PackagingOptions::default())
    }

    #[test]
    fn test_project_without_sources_passes() {
        let mut project = ProjectModel::new("com.example.foo", "foo-reactor", "pom");
        project.group_id = None;
        assert!(rule().check(&project).is_none());
    }

    #[test]
    fn test_packages_under_group_id_pass() {
        let project = ProjectModel::new("com.example.foo.api", "foo-api", "jar")
            .with_package(SourcePackage::new("com.example.foo.api", &["FooService.java"]))
            .with_package(SourcePackage::new("com.example.foo.api.model", &["Foo.kt"]));
        assert!(rule().check(&project).is_none());
    }

    #[test]
    fn test_foreign_packages_are_listed_with_files() {
        let project = ProjectModel::new("com.example.foo.api", "foo-api", "jar")
            .with_package(SourcePackage::new("com.example.foo.api", &["FooService.java"]))
            .with_package(SourcePackage::new("org.acme", &["Zed.java", "Alpha.java"]))
            .with_package(SourcePackage::new("com.example.bar", &["Bar.java"]))
            .with_package(SourcePackage::new("org.acme", &["Beta.kt"]));

        let violation = rule().check(&project).unwrap();
        assert_eq!(violation.rule_id, RULE_ID);
        assert_eq!(violation.kind, ViolationKind::IncorrectPackaging);
        assert_eq!(
            violation.message,
            "Incorrect packaging detected; required [com.example.foo.api] but found package to file names: \
             {com.example.bar=[Bar.java], org.acme=[Alpha.java, Beta.kt, Zed.java]}"
        );
        assert_eq!(violation.project.as_deref(), Some("com.example.foo.api:foo-api:jar"));
    }

    #[test]
    fn test_missing_or_blank_group_id_is_rejected() {
        let mut project = ProjectModel::new(" ", "foo-api", "jar")
            .with_package(SourcePackage::new("com.example.foo.api", &["FooService.java"]));
        let violation = rule().check(&project).unwrap();
        assert_eq!(violation.message, "Project groupId cannot be null or empty.");

        project.group_id = None;
        assert!(rule().check(&project).is_some());
    }

    #[test]
    fn test_severity_is_configurable() {
        let warning = CorrectPackagingRule::new(&PackagingOptions { severity: Severity::Warning });
        let project = ProjectModel::new("com.example.foo", "foo-api", "jar")
            .with_package(SourcePackage::new("org.acme", &["A.java"]));
        assert_eq!(warning.evaluate(&project)[0].severity, Severity::Warning);
        assert_eq!(warning.id(), "correct-packaging");
    }
}
