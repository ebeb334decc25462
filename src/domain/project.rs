//! Project and dependency coordinates as read from a build descriptor
//!
//! Architecture: Value Objects - Coordinates are immutable identifiers
//! - ProjectModel carries the structural context (dependencies, management, modules)
//!   that archetype predicates inspect
//! - Missing packaging/type falls back to `jar`, as Maven does

use serde::{Deserialize, Serialize};
use std::fmt;

/// Packaging assumed when a descriptor omits it
pub const DEFAULT_PACKAGING: &str = "jar";

/// (groupId, artifactId, packaging) identifying a project or a dependency
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coordinates {
    pub group_id: Option<String>,
    pub artifact_id: Option<String>,
    pub packaging: Option<String>,
}

impl Coordinates {
    pub fn new(group_id: Option<&str>, artifact_id: Option<&str>, packaging: Option<&str>) -> Self {
        Self {
            group_id: group_id.map(str::to_string),
            artifact_id: artifact_id.map(str::to_string),
            packaging: packaging.map(str::to_string),
        }
    }

    pub fn group_id(&self) -> Option<&str> {
        self.group_id.as_deref()
    }

    pub fn artifact_id(&self) -> Option<&str> {
        self.artifact_id.as_deref()
    }

    pub fn packaging(&self) -> Option<&str> {
        self.packaging.as_deref()
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}",
            self.group_id().unwrap_or("null"),
            self.artifact_id().unwrap_or("null"),
            self.packaging().unwrap_or("null")
        )
    }
}

/// A single dependency declaration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dependency {
    pub group_id: Option<String>,
    pub artifact_id: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default, rename = "type")]
    pub dependency_type: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
}

impl Dependency {
    pub fn new(group_id: &str, artifact_id: &str) -> Self {
        Self {
            group_id: Some(group_id.to_string()),
            artifact_id: Some(artifact_id.to_string()),
            ..Default::default()
        }
    }

    pub fn with_type(mut self, dependency_type: &str) -> Self {
        self.dependency_type = Some(dependency_type.to_string());
        self
    }

    pub fn with_scope(mut self, scope: &str) -> Self {
        self.scope = Some(scope.to_string());
        self
    }

    pub fn with_version(mut self, version: &str) -> Self {
        self.version = Some(version.to_string());
        self
    }

    /// Coordinates used for classification; the dependency type stands in for packaging
    pub fn coordinates(&self) -> Coordinates {
        Coordinates {
            group_id: self.group_id.clone(),
            artifact_id: self.artifact_id.clone(),
            packaging: Some(
                self.dependency_type.clone().unwrap_or_else(|| DEFAULT_PACKAGING.to_string()),
            ),
        }
    }

    fn scope_is(&self, expected: &str) -> bool {
        self.scope.as_deref().is_some_and(|scope| scope.trim().eq_ignore_ascii_case(expected))
    }

    pub fn is_test_scoped(&self) -> bool {
        self.scope_is("test")
    }

    pub fn is_import_scoped(&self) -> bool {
        self.scope_is("import")
    }

    /// No scope means compile scope
    pub fn is_compile_scoped(&self) -> bool {
        self.scope.is_none() || self.scope_is("compile")
    }
}

/// A project as read from its descriptor, including structural context
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectModel {
    pub group_id: Option<String>,
    pub artifact_id: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub packaging: Option<String>,
    #[serde(default)]
    pub modules: Vec<String>,
    #[serde(default)]
    pub dependencies: Vec<Dependency>,
    #[serde(default)]
    pub dependency_management: Vec<Dependency>,
    /// Source packages found under the compile source roots
    #[serde(default)]
    pub packages: Vec<SourcePackage>,
}

/// One source package and the file names declaring it
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourcePackage {
    pub name: String,
    #[serde(default)]
    pub files: Vec<String>,
}

impl SourcePackage {
    pub fn new(name: &str, files: &[&str]) -> Self {
        Self { name: name.to_string(), files: files.iter().map(|f| f.to_string()).collect() }
    }
}

impl ProjectModel {
    pub fn new(group_id: &str, artifact_id: &str, packaging: &str) -> Self {
        Self {
            group_id: Some(group_id.to_string()),
            artifact_id: Some(artifact_id.to_string()),
            packaging: Some(packaging.to_string()),
            ..Default::default()
        }
    }

    pub fn with_dependency(mut self, dependency: Dependency) -> Self {
        self.dependencies.push(dependency);
        self
    }

    pub fn with_managed_dependency(mut self, dependency: Dependency) -> Self {
        self.dependency_management.push(dependency);
        self
    }

    pub fn with_package(mut self, package: SourcePackage) -> Self {
        self.packages.push(package);
        self
    }

    pub fn with_module(mut self, module: &str) -> Self {
        self.modules.push(module.to_string());
        self
    }

    pub fn coordinates(&self) -> Coordinates {
        Coordinates {
            group_id: self.group_id.clone(),
            artifact_id: self.artifact_id.clone(),
            packaging: Some(
                self.packaging.clone().unwrap_or_else(|| DEFAULT_PACKAGING.to_string()),
            ),
        }
    }

    /// `groupId:artifactId:packaging`, used in messages and reports
    pub fn gav(&self) -> String {
        self.coordinates().to_string()
    }
}
