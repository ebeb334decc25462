//! Validation orchestrator for pom-guardian
//!
//! Architecture: Domain Services - Validator orchestrates descriptor discovery, loading and rules
//! - Coordinates descriptor filtering, rule evaluation and result aggregation
//! - Provides one interface for single projects, single files and directory trees
//! - Handles parallel evaluation and per-descriptor error recovery

use crate::archetypes::ArchetypeRegistry;
use crate::classifier::{Classification, Classifier};
use crate::config::EnforcerConfig;
use crate::descriptor::{load_descriptor, load_descriptor_async, DescriptorFilter};
use crate::domain::project::ProjectModel;
use crate::domain::violations::{EnforcerError, EnforcerResult, ValidationReport, Violation};
use crate::rules::{EnforcerRule, KNOWN_RULE_IDS};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

/// Options for customizing a validation run
#[derive(Debug, Clone)]
pub struct ValidationOptions {
    /// Evaluate descriptors on the rayon thread pool
    pub parallel: bool,
    /// Maximum number of descriptors to check
    pub max_projects: Option<usize>,
    /// Abort on the first unreadable descriptor instead of logging it
    pub fail_fast: bool,
    /// Additional exclude globs for this run
    pub exclude_patterns: Vec<String>,
    /// Restrict the run to these rule ids; empty means all enabled rules
    pub rules: Vec<String>,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            parallel: true,
            max_projects: None,
            fail_fast: false,
            exclude_patterns: Vec::new(),
            rules: Vec::new(),
        }
    }
}

/// Runs the configured rules over project descriptors
pub struct Validator {
    config: EnforcerConfig,
    registry: Arc<ArchetypeRegistry>,
    rules: Vec<Box<dyn EnforcerRule>>,
    filter: DescriptorFilter,
}

impl Validator {
    pub fn new(config: EnforcerConfig) -> EnforcerResult<Self> {
        config.validate()?;

        Ok(Self {
            registry: config.registry()?,
            rules: config.build_rules()?,
            filter: config.descriptor_filter()?,
            config,
        })
    }

    pub fn with_defaults() -> EnforcerResult<Self> {
        Self::new(EnforcerConfig::default())
    }

    pub fn config(&self) -> &EnforcerConfig {
        &self.config
    }

    pub fn registry(&self) -> &ArchetypeRegistry {
        &self.registry
    }

    pub fn config_fingerprint(&self) -> String {
        self.config.fingerprint()
    }

    /// Enabled rules, in evaluation order
    pub fn rules(&self) -> impl Iterator<Item = &dyn EnforcerRule> {
        self.rules.iter().map(|rule| rule.as_ref())
    }

    /// Classify a project with this validator's registry and ignore list
    pub fn classify(&self, project: &ProjectModel) -> EnforcerResult<Classification> {
        let filter = crate::patterns::GroupIdFilter::ignoring(&self.config.group_ids.ignore)?;
        Ok(Classifier::new(&self.registry).classify_project(project, filter.ignore_patterns()))
    }

    fn active_rules(&self, options: &ValidationOptions) -> EnforcerResult<Vec<&dyn EnforcerRule>> {
        if let Some(unknown) = options.rules.iter().find(|id| !KNOWN_RULE_IDS.contains(&id.as_str())) {
            return Err(EnforcerError::config(format!(
                "Unknown rule '{unknown}'. Known rules: {}",
                KNOWN_RULE_IDS.join(", ")
            )));
        }

        Ok(self
            .rules()
            .filter(|rule| options.rules.is_empty() || options.rules.iter().any(|id| id == rule.id()))
            .collect())
    }

    /// Evaluate every active rule against one project
    pub fn validate_project(
        &self,
        project: &ProjectModel,
        source: Option<&Path>,
        options: &ValidationOptions,
    ) -> EnforcerResult<Vec<Violation>> {
        Ok(evaluate(&self.active_rules(options)?, project, source))
    }

    /// Load and evaluate a single descriptor file
    pub fn validate_file<P: AsRef<Path>>(
        &self,
        path: P,
        options: &ValidationOptions,
    ) -> EnforcerResult<Vec<Violation>> {
        let path = path.as_ref();
        let project = load_descriptor(path)?;
        self.validate_project(&project, Some(path), options)
    }

    /// Expand files and directories into the descriptor files to check
    pub fn discover<P: AsRef<Path>>(
        &self,
        paths: &[P],
        options: &ValidationOptions,
    ) -> EnforcerResult<Vec<PathBuf>> {
        let mut filter = self.filter.clone();
        for pattern in &options.exclude_patterns {
            filter.add_pattern(pattern)?;
        }

        let mut files = Vec::new();
        for path in paths {
            let path = path.as_ref();

            if path.is_file() {
                if filter.should_check(path) {
                    files.push(path.to_path_buf());
                }
            } else if path.is_dir() {
                files.extend(filter.find_descriptors(path)?);
            } else {
                return Err(EnforcerError::validation(format!("Path does not exist: {}", path.display())));
            }
        }

        if let Some(max_projects) = options.max_projects {
            files.truncate(max_projects);
        }

        Ok(files)
    }

    /// Discover, load and evaluate descriptors, building a complete report
    pub fn validate_paths<P: AsRef<Path>>(
        &self,
        paths: &[P],
        options: &ValidationOptions,
    ) -> EnforcerResult<ValidationReport> {
        let start_time = Instant::now();
        let rules = self.active_rules(options)?;
        let files = self.discover(paths, options)?;

        let outcomes: Vec<(PathBuf, EnforcerResult<Vec<Violation>>)> = if options.parallel && files.len() > 1 {
            files
                .par_iter()
                .map(|file| (file.clone(), load_descriptor(file).map(|p| evaluate(&rules, &p, Some(file)))))
                .collect()
        } else {
            files
                .iter()
                .map(|file| (file.clone(), load_descriptor(file).map(|p| evaluate(&rules, &p, Some(file)))))
                .collect()
        };

        self.build_report(outcomes, options, start_time)
    }

    /// Like `validate_paths`, reading descriptors through tokio before evaluating them
    pub async fn validate_paths_async<P: AsRef<Path>>(
        &self,
        paths: &[P],
        options: &ValidationOptions,
    ) -> EnforcerResult<ValidationReport> {
        let start_time = Instant::now();
        let rules = self.active_rules(options)?;
        let files = self.discover(paths, options)?;

        let mut loaded = Vec::with_capacity(files.len());
        for file in files {
            let project = load_descriptor_async(&file).await;
            loaded.push((file, project));
        }

        let evaluate_loaded = |(file, project): (PathBuf, EnforcerResult<ProjectModel>)| {
            let violations = project.map(|p| evaluate(&rules, &p, Some(&file)));
            (file, violations)
        };

        let outcomes: Vec<_> = if options.parallel && loaded.len() > 1 {
            loaded.into_par_iter().map(evaluate_loaded).collect()
        } else {
            loaded.into_iter().map(evaluate_loaded).collect()
        };

        self.build_report(outcomes, options, start_time)
    }

    fn build_report(
        &self,
        outcomes: Vec<(PathBuf, EnforcerResult<Vec<Violation>>)>,
        options: &ValidationOptions,
        start_time: Instant,
    ) -> EnforcerResult<ValidationReport> {
        let mut report = ValidationReport::new();
        let mut checked = 0;

        for (file, outcome) in outcomes {
            match outcome {
                Ok(violations) => {
                    checked += 1;
                    for violation in violations {
                        report.add_violation(violation);
                    }
                }
                Err(e) if options.fail_fast => return Err(e),
                Err(e) => tracing::warn!("Failed to check {}: {}", file.display(), e),
            }
        }

        report.set_projects_checked(checked);
        report.set_execution_time(start_time.elapsed().as_millis() as u64);
        report.set_config_fingerprint(self.config_fingerprint());
        report.sort_violations();

        Ok(report)
    }
}

fn evaluate(rules: &[&dyn EnforcerRule], project: &ProjectModel, source: Option<&Path>) -> Vec<Violation> {
    rules
        .iter()
        .flat_map(|rule| rule.evaluate(project))
        .map(|violation| match source {
            Some(source) => violation.with_source(source),
            None => violation,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::violations::ViolationKind;
    use std::fs;
    use tempfile::TempDir;

    const API_WITH_IMPL: &str = "\
groupId: com.example.foo.api
artifactId: foo-api
packaging: jar
dependencies:
  - groupId: com.example.foo.impl.jdbc
    artifactId: foo-impl-jdbc
    version: 1.0.0
";

    const CLEAN_MODEL: &str = "groupId: com.example.foo.model\nartifactId: foo-model\n";

    fn write_tree(root: &Path) {
        fs::create_dir_all(root.join("foo-api")).unwrap();
        fs::create_dir_all(root.join("foo-model")).unwrap();
        fs::create_dir_all(root.join("foo-api/target")).unwrap();
        fs::write(root.join("foo-api/project.yaml"), API_WITH_IMPL).unwrap();
        fs::write(root.join("foo-model/project.yaml"), CLEAN_MODEL).unwrap();
        fs::write(root.join("foo-api/target/project.yaml"), "not: [valid").unwrap();
    }

    #[test]
    fn test_validator_creation() {
        let validator = Validator::with_defaults().unwrap();
        let ids: Vec<_> = validator.rules().map(|r| r.id()).collect();
        assert_eq!(ids, vec!["permitted-archetype", "correct-dependencies", "correct-packaging"]);
    }

    #[test]
    fn test_directory_validation() -> EnforcerResult<()> {
        let temp_dir = TempDir::new()?;
        write_tree(temp_dir.path());

        let validator = Validator::with_defaults()?;
        let report = validator.validate_paths(&[temp_dir.path()], &ValidationOptions::default())?;

        assert_eq!(report.summary.total_projects, 2);
        assert_eq!(report.violations.len(), 1);
        assert_eq!(report.violations[0].kind, ViolationKind::PolicyViolation);
        assert!(report.violations[0].source.as_ref().unwrap().ends_with("foo-api/project.yaml"));
        assert!(report.config_fingerprint.is_some());
        Ok(())
    }

    #[test]
    fn test_sequential_and_parallel_agree() -> EnforcerResult<()> {
        let temp_dir = TempDir::new()?;
        write_tree(temp_dir.path());
        let validator = Validator::with_defaults()?;

        let parallel = validator.validate_paths(&[temp_dir.path()], &ValidationOptions::default())?;
        let sequential = validator
            .validate_paths(&[temp_dir.path()], &ValidationOptions { parallel: false, ..Default::default() })?;

        let messages = |r: &ValidationReport| r.violations.iter().map(|v| v.message.clone()).collect::<Vec<_>>();
        assert_eq!(messages(&parallel), messages(&sequential));
        Ok(())
    }

    #[test]
    fn test_unreadable_descriptor_fails_fast_only_when_asked() -> EnforcerResult<()> {
        let temp_dir = TempDir::new()?;
        let broken = temp_dir.path().join("project.yaml");
        fs::write(&broken, "groupId: [unterminated")?;

        let validator = Validator::with_defaults()?;
        let lenient = validator.validate_paths(&[&broken], &ValidationOptions::default())?;
        assert_eq!(lenient.summary.total_projects, 0);

        let strict = validator.validate_paths(&[&broken], &ValidationOptions { fail_fast: true, ..Default::default() });
        assert!(matches!(strict, Err(EnforcerError::Descriptor { .. })));
        Ok(())
    }

    #[test]
    fn test_rule_selection() -> EnforcerResult<()> {
        let temp_dir = TempDir::new()?;
        write_tree(temp_dir.path());
        let validator = Validator::with_defaults()?;

        let only_compliance = ValidationOptions { rules: vec!["permitted-archetype".to_string()], ..Default::default() };
        let report = validator.validate_paths(&[temp_dir.path()], &only_compliance)?;
        assert!(!report.has_violations());

        let unknown = ValidationOptions { rules: vec!["no-such-rule".to_string()], ..Default::default() };
        assert!(validator.validate_paths(&[temp_dir.path()], &unknown).is_err());
        Ok(())
    }

    #[test]
    fn test_misplaced_sources_are_reported() -> EnforcerResult<()> {
        let temp_dir = TempDir::new()?;
        let descriptor = temp_dir.path().join("project.yaml");
        fs::write(
            &descriptor,
            "groupId: com.example.foo.model\nartifactId: foo-model\npackages:\n  - name: com.example.foo.model\n    files: [Foo.java]\n  - name: org.acme.model\n    files: [Stray.java]\n",
        )?;
        let validator = Validator::with_defaults()?;

        let report = validator.validate_paths(&[&descriptor], &ValidationOptions::default())?;
        assert_eq!(report.violations.len(), 1);
        assert_eq!(report.violations[0].rule_id, "correct-packaging");
        assert!(report.violations[0].message.contains("org.acme.model=[Stray.java]"));

        let without = ValidationOptions { rules: vec!["correct-dependencies".to_string()], ..Default::default() };
        assert!(!validator.validate_paths(&[&descriptor], &without)?.has_violations());
        Ok(())
    }

    #[test]
    fn test_extra_exclusions_and_limits() -> EnforcerResult<()> {
        let temp_dir = TempDir::new()?;
        write_tree(temp_dir.path());
        let validator = Validator::with_defaults()?;

        let options = ValidationOptions { exclude_patterns: vec!["foo-api/**".to_string()], ..Default::default() };
        let report = validator.validate_paths(&[temp_dir.path()], &options)?;
        assert_eq!(report.summary.total_projects, 1);
        assert!(!report.has_violations());

        let limited = ValidationOptions { max_projects: Some(1), ..Default::default() };
        assert_eq!(validator.discover(&[temp_dir.path()], &limited)?.len(), 1);
        Ok(())
    }

    #[test]
    fn test_missing_path_is_an_error() {
        let validator = Validator::with_defaults().unwrap();
        let result = validator.validate_paths(&["/no/such/descriptor.yaml"], &ValidationOptions::default());
        assert!(matches!(result, Err(EnforcerError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_async_validation_matches_sync() -> EnforcerResult<()> {
        let temp_dir = TempDir::new()?;
        write_tree(temp_dir.path());
        let validator = Validator::with_defaults()?;

        let sync = validator.validate_paths(&[temp_dir.path()], &ValidationOptions::default())?;
        let asynchronous = validator.validate_paths_async(&[temp_dir.path()], &ValidationOptions::default()).await?;

        assert_eq!(sync.summary.total_projects, asynchronous.summary.total_projects);
        assert_eq!(sync.violations.len(), asynchronous.violations.len());
        Ok(())
    }

    #[test]
    fn test_classify_uses_configured_ignores() -> EnforcerResult<()> {
        let validator = Validator::with_defaults()?;
        let bom = ProjectModel::new("com.example.foo", "foo-bom", "pom")
            .with_dependency(crate::domain::project::Dependency::new("com.example.foo.generated.x", "foo-x"))
            .with_managed_dependency(crate::domain::project::Dependency::new("com.example.foo.api", "foo-api"));

        assert!(validator.classify(&bom)?.is_exact());
        Ok(())
    }
}
