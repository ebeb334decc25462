//! pom-guardian - build-enforcement rules for project archetypes
//!
//! Architecture: Clean Architecture - Library interface serves as the application layer
//! - Archetype classification and dependency policy are pure domain logic
//! - Descriptor reading, configuration and reporting sit at the edges
//! - The functions below are the entry points for embedding the rules in other tools

pub mod archetypes;
pub mod classifier;
pub mod config;
pub mod descriptor;
pub mod domain;
pub mod patterns;
pub mod report;
pub mod rules;
pub mod validator;

// Re-export main types for convenient access
pub use domain::project::{Coordinates, Dependency, ProjectModel, SourcePackage};
pub use domain::violations::{
    EnforcerError, EnforcerResult, Severity, ValidationReport, ValidationSummary, Violation,
    ViolationKind,
};

pub use archetypes::{Archetype, ArchetypeDefinition, ArchetypeRegistry, PatternOverride};
pub use classifier::{Classification, Classifier};
pub use config::{ConfigBuilder, EnforcerConfig};
pub use patterns::{CoordinatePattern, GroupIdFilter};
pub use report::{OutputFormat, ReportFormatter, ReportOptions};
pub use rules::{
    ComplianceOptions, ComplianceRule, CorrectPackagingRule, DependencyCheckOptions, DependencyLegalityChecker,
    EnforcerRule, PackagingOptions,
};
pub use validator::{ValidationOptions, Validator};

use std::path::Path;

/// High-level validator pairing the rule engine with a report formatter
pub struct ProjectValidator {
    validator: Validator,
    report_formatter: ReportFormatter,
}

impl ProjectValidator {
    pub fn new_with_config(config: EnforcerConfig) -> EnforcerResult<Self> {
        Ok(Self { validator: Validator::new(config)?, report_formatter: ReportFormatter::default() })
    }

    /// Validator with the built-in configuration
    pub fn new() -> EnforcerResult<Self> {
        Self::new_with_config(EnforcerConfig::default())
    }

    pub fn from_config_file<P: AsRef<Path>>(path: P) -> EnforcerResult<Self> {
        Self::new_with_config(EnforcerConfig::load_from_file(path)?)
    }

    pub fn with_report_formatter(mut self, formatter: ReportFormatter) -> Self {
        self.report_formatter = formatter;
        self
    }

    pub fn validator(&self) -> &Validator {
        &self.validator
    }

    pub fn classify(&self, project: &ProjectModel) -> EnforcerResult<Classification> {
        self.validator.classify(project)
    }

    /// Check an in-memory project with every enabled rule
    pub fn validate_project(&self, project: &ProjectModel) -> EnforcerResult<ValidationReport> {
        let mut report = ValidationReport::new();
        for violation in self.validator.validate_project(project, None, &ValidationOptions::default())? {
            report.add_violation(violation);
        }
        report.set_projects_checked(1);
        report.set_config_fingerprint(self.validator.config_fingerprint());
        Ok(report)
    }

    /// Check a single descriptor file
    pub fn validate_file<P: AsRef<Path>>(&self, path: P) -> EnforcerResult<ValidationReport> {
        let mut report = ValidationReport::new();
        for violation in self.validator.validate_file(path, &ValidationOptions::default())? {
            report.add_violation(violation);
        }
        report.set_projects_checked(1);
        report.set_config_fingerprint(self.validator.config_fingerprint());
        Ok(report)
    }

    /// Check descriptor files and directory trees
    pub async fn validate_paths<P: AsRef<Path>>(
        &self,
        paths: &[P],
        options: &ValidationOptions,
    ) -> EnforcerResult<ValidationReport> {
        self.validator.validate_paths_async(paths, options).await
    }

    pub fn format_report(&self, report: &ValidationReport, format: OutputFormat) -> EnforcerResult<String> {
        self.report_formatter.format_report(report, format)
    }
}

/// Classify coordinates against the standard registry
pub fn classify(coordinates: &Coordinates) -> Classification {
    Classifier::new(&ArchetypeRegistry::standard()).classify_coordinates(coordinates)
}

/// Classify a project, ignoring dependencies the filter ignores in structural predicates
pub fn classify_project(project: &ProjectModel, filter: &GroupIdFilter) -> Classification {
    Classifier::new(&ArchetypeRegistry::standard()).classify_project(project, filter.ignore_patterns())
}

/// Check a project's dependencies against the archetype policy
pub fn check_dependency_legality(
    project: &ProjectModel,
    options: &DependencyCheckOptions,
) -> EnforcerResult<Vec<Violation>> {
    Ok(DependencyLegalityChecker::new(options)?.check(project))
}

/// Check that a project complies with one of the permitted archetypes
pub fn check_compliance(
    project: &ProjectModel,
    options: &ComplianceOptions,
) -> EnforcerResult<Option<Violation>> {
    Ok(ComplianceRule::new(options)?.check(project))
}

/// Check that every source package of a project lives under its group-id
pub fn check_packaging(project: &ProjectModel, options: &PackagingOptions) -> Option<Violation> {
    CorrectPackagingRule::new(options).check(project)
}

/// Validate paths with the default configuration, failing on blocking violations
pub async fn enforce<P: AsRef<Path>>(paths: &[P]) -> EnforcerResult<ValidationReport> {
    let validator = ProjectValidator::new()?;
    let report = validator.validate_paths(paths, &ValidationOptions::default()).await?;

    if report.has_errors() {
        let error_count = report.summary.violations_by_severity.error;
        return Err(EnforcerError::validation(format!(
            "Enforcement failed: {} blocking violation{} found",
            error_count,
            if error_count == 1 { "" } else { "s" }
        )));
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_classify_entry_points() {
        let api = Coordinates::new(Some("com.example.foo.api"), Some("foo-api"), Some("jar"));
        assert_eq!(classify(&api), Classification::Exact { archetype: Archetype::Api });

        let bom = ProjectModel::new("com.example.foo", "foo-bom", "pom")
            .with_dependency(Dependency::new("com.example.foo.generated.x", "foo-x"))
            .with_managed_dependency(Dependency::new("com.example.foo.api", "foo-api"));

        let no_ignores = GroupIdFilter::default();
        assert!(matches!(classify_project(&bom, &no_ignores), Classification::Inexact { .. }));

        let ignoring = GroupIdFilter::ignoring(&[r"^com\.example\..*\.generated\..*"]).unwrap();
        assert!(classify_project(&bom, &ignoring).is_exact());
    }

    #[test]
    fn test_check_entry_points() {
        let project = ProjectModel::new("com.example.foo.api", "foo-api", "jar")
            .with_dependency(Dependency::new("com.example.foo.impl.core", "foo-impl-core"));

        let violations = check_dependency_legality(&project, &DependencyCheckOptions::default()).unwrap();
        assert_eq!(violations.len(), 1);
        assert!(violations[0].message.contains("IMPLEMENTATION"));
        assert!(violations[0].message.contains("outside of application projects"));

        assert!(check_compliance(&project, &ComplianceOptions::default()).unwrap().is_none());

        let only_models = ComplianceOptions { permitted_archetypes: vec![Archetype::Model], ..Default::default() };
        assert!(check_compliance(&project, &only_models).unwrap().is_some());

        let misplaced = project.with_package(SourcePackage::new("org.acme", &["Stray.java"]));
        let violation = check_packaging(&misplaced, &PackagingOptions::default()).unwrap();
        assert_eq!(violation.kind, ViolationKind::IncorrectPackaging);
    }

    #[test]
    fn test_validate_project_and_format() {
        let validator = ProjectValidator::new().unwrap();
        let project = ProjectModel::new("com.example.foo", "foo-gadget", "jar");

        let report = validator.validate_project(&project).unwrap();
        // unclassifiable: non-compliant and a fatal dependency-check failure
        assert_eq!(report.violations.len(), 2);
        assert!(report.has_errors());

        let json = validator.format_report(&report, OutputFormat::Json).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(parsed["violations"].is_array());
    }

    #[test]
    fn test_validate_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("project.yaml");
        fs::write(&path, "groupId: com.example.foo\nartifactId: foo-parent\npackaging: pom\nmodules: [foo-api]\n")
            .unwrap();

        let validator = ProjectValidator::new().unwrap();
        let report = validator.validate_file(&path).unwrap();

        assert_eq!(report.summary.total_projects, 1);
        assert_eq!(report.violations.len(), 2);
        assert!(report.violations.iter().any(|v| v.kind == ViolationKind::StructuralViolation));
        assert!(report.violations.iter().all(|v| v.source.as_deref() == Some(path.as_path())));
    }

    #[tokio::test]
    async fn test_enforce() {
        let temp_dir = TempDir::new().unwrap();
        let clean = temp_dir.path().join("clean");
        let dirty = temp_dir.path().join("dirty");
        fs::create_dir_all(&clean).unwrap();
        fs::create_dir_all(&dirty).unwrap();

        fs::write(clean.join("project.yaml"), "groupId: com.example.foo.model\nartifactId: foo-model\n").unwrap();
        fs::write(
            dirty.join("project.yaml"),
            "groupId: com.example.foo.api\nartifactId: foo-api\ndependencies:\n  - groupId: com.example.foo.test.x\n    artifactId: foo-test\n",
        )
        .unwrap();

        assert!(enforce(&[&clean]).await.is_ok());
        assert!(enforce(&[&dirty]).await.is_err());
    }
}
