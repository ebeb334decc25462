//! Dependency legality: which archetypes a project may depend on
//!
//! The project is classified first. Zero or several matches are fatal and end the check.
//! Ignored archetypes and group-ids outside the evaluated namespace are then skipped;
//! a structurally inexact project that survives those gates is fatal too.
//! Every non-test dependency inside the namespace is then classified, and all
//! offending dependencies are reported rather than only the first.

use super::{to_strings, EnforcerRule, DEFAULT_EVALUATE_GROUP_IDS, DEFAULT_IGNORE_GROUP_IDS};
use crate::archetypes::{Archetype, ArchetypeRegistry};
use crate::classifier::{Classification, Classifier};
use crate::domain::project::{Dependency, ProjectModel};
use crate::domain::violations::{EnforcerResult, Severity, Violation, ViolationKind};
use crate::patterns::GroupIdFilter;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub const RULE_ID: &str = "correct-dependencies";

/// Project archetypes whose dependencies are never checked
pub const DEFAULT_IGNORED_ARCHETYPES: [Archetype; 9] = [
    Archetype::JeeApplication,
    Archetype::Parent,
    Archetype::Assembly,
    Archetype::Reactor,
    Archetype::ProofOfConcept,
    Archetype::Example,
    Archetype::Test,
    Archetype::JavaAgent,
    Archetype::StandaloneApplication,
];

/// Inputs of a dependency legality check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DependencyCheckOptions {
    pub evaluate_group_ids: Vec<String>,
    pub ignore_group_ids: Vec<String>,
    pub ignored_archetypes: Vec<Archetype>,
    /// SPI projects must depend on their component's API in compile scope
    pub require_spi_api_dependency: bool,
    pub severity: Severity,
}

impl Default for DependencyCheckOptions {
    fn default() -> Self {
        Self {
            evaluate_group_ids: to_strings(DEFAULT_EVALUATE_GROUP_IDS),
            ignore_group_ids: to_strings(DEFAULT_IGNORE_GROUP_IDS),
            ignored_archetypes: DEFAULT_IGNORED_ARCHETYPES.to_vec(),
            require_spi_api_dependency: false,
            severity: Severity::Error,
        }
    }
}

/// Checks the archetypes of a project's dependencies
#[derive(Debug, Clone)]
pub struct DependencyLegalityChecker {
    registry: Arc<ArchetypeRegistry>,
    filter: GroupIdFilter,
    ignored_archetypes: Vec<Archetype>,
    require_spi_api_dependency: bool,
    severity: Severity,
}

impl DependencyLegalityChecker {
    pub fn new(options: &DependencyCheckOptions) -> EnforcerResult<Self> {
        Self::with_registry(ArchetypeRegistry::standard(), options)
    }

    pub fn with_registry(
        registry: Arc<ArchetypeRegistry>,
        options: &DependencyCheckOptions,
    ) -> EnforcerResult<Self> {
        Ok(Self {
            registry,
            filter: GroupIdFilter::new(&options.evaluate_group_ids, &options.ignore_group_ids)?,
            ignored_archetypes: options.ignored_archetypes.clone(),
            require_spi_api_dependency: options.require_spi_api_dependency,
            severity: options.severity,
        })
    }

    /// Check the project, returning every violation found
    pub fn check(&self, project: &ProjectModel) -> Vec<Violation> {
        let classifier = Classifier::new(&self.registry);
        let gav = project.gav();

        let classification = classifier.classify_project(project, self.filter.ignore_patterns());
        if classification.is_failure() {
            let message = classification.failure_message().unwrap_or_default();
            return vec![self.violation(ViolationKind::ClassificationFailure, message, &gav)];
        }

        if let Classification::Exact { archetype } = &classification {
            if self.ignored_archetypes.contains(archetype) {
                tracing::debug!("Ignored [{}] since {} projects are not checked.", gav, archetype);
                return Vec::new();
            }
        }

        let group_id = project.group_id.as_deref();
        if self.filter.is_ignored(group_id) {
            tracing::debug!("Ignored [{}] since its groupId was excluded from enforcement.", gav);
            return Vec::new();
        }
        if !self.filter.is_evaluated(group_id) {
            tracing::debug!("Ignored [{}] since its groupId was not included in enforcement.", gav);
            return Vec::new();
        }

        let archetype = match classification {
            Classification::Inexact { best_guess, message } => {
                return vec![self
                    .violation(ViolationKind::StructuralViolation, message, &gav)
                    .with_suggestion(format!(
                        "Restructure the project to satisfy the {best_guess} rules, or rename it to match another archetype"
                    ))];
            }
            Classification::Exact { archetype } => archetype,
            Classification::Ambiguous { .. } | Classification::NoMatch { .. } => return Vec::new(),
        };

        let mut violations: Vec<Violation> = project
            .dependencies
            .iter()
            .filter(|dependency| !dependency.is_test_scoped())
            .filter(|dependency| self.filter.admits(dependency.group_id.as_deref()))
            .filter_map(|dependency| self.check_dependency(&classifier, dependency, &gav))
            .collect();

        if archetype == Archetype::Spi && self.require_spi_api_dependency {
            violations.extend(self.check_spi_api_dependency(&classifier, project, &gav));
        }

        violations
    }

    fn check_dependency(
        &self,
        classifier: &Classifier<'_>,
        dependency: &Dependency,
        gav: &str,
    ) -> Option<Violation> {
        let coordinates = dependency.coordinates();

        let archetype = match classifier.classify_coordinates(&coordinates) {
            Classification::Exact { archetype } => archetype,
            failure => {
                let message = failure.failure_message().unwrap_or_default();
                return Some(
                    self.violation(ViolationKind::ClassificationFailure, message, gav)
                        .with_offending(coordinates),
                );
            }
        };

        if archetype == Archetype::BillOfMaterials && dependency.is_import_scoped() {
            return None;
        }
        let (rule, suggestion) = forbidden_dependency_rule(archetype)?;

        Some(
            self.violation(
                ViolationKind::PolicyViolation,
                format!("Don't use {archetype} dependencies {rule}"),
                gav,
            )
            .with_offending(coordinates)
            .with_suggestion(suggestion),
        )
    }

    fn check_spi_api_dependency(
        &self,
        classifier: &Classifier<'_>,
        project: &ProjectModel,
        gav: &str,
    ) -> Option<Violation> {
        let component = component_of(project.group_id.as_deref().unwrap_or_default());

        let has_api = project
            .dependencies
            .iter()
            .filter(|dependency| dependency.is_compile_scoped())
            .filter(|dependency| {
                dependency.group_id.as_deref().map(component_of) == Some(component)
            })
            .any(|dependency| {
                classifier.classify_coordinates(&dependency.coordinates()).archetype()
                    == Some(Archetype::Api)
            });

        if has_api {
            return None;
        }

        Some(
            self.violation(
                ViolationKind::PolicyViolation,
                format!(
                    "SPI projects must depend on the API project of their component ({component}) in compile scope."
                ),
                gav,
            )
            .with_suggestion(format!("Add a dependency on the {component}.api project")),
        )
    }

    fn violation(&self, kind: ViolationKind, message: String, gav: &str) -> Violation {
        Violation::new(RULE_ID, self.severity, kind, message).with_project(gav)
    }
}

impl EnforcerRule for DependencyLegalityChecker {
    fn id(&self) -> &'static str {
        RULE_ID
    }

    fn short_description(&self) -> &'static str {
        "Incorrect Dependency found within project."
    }

    fn severity(&self) -> Severity {
        self.severity
    }

    fn evaluate(&self, project: &ProjectModel) -> Vec<Violation> {
        self.check(project)
    }
}

/// Rule text and suggested fix for dependencies on `archetype`, if such dependencies are forbidden.
/// Bill-of-materials dependencies are allowed in import scope.
pub fn forbidden_dependency_rule(archetype: Archetype) -> Option<(&'static str, &'static str)> {
    match archetype {
        Archetype::Implementation => Some((
            "outside of application projects.",
            "Depend on the API project instead; applications choose the implementation",
        )),
        Archetype::Test => Some((
            "in compile scope for non-test artifacts.",
            "Declare the dependency with <scope>test</scope>",
        )),
        Archetype::JeeApplication | Archetype::ProofOfConcept => {
            Some(("in bundles.", "Remove the dependency; deployables are not libraries"))
        }
        Archetype::BillOfMaterials => Some((
            "in Dependency block. (Use only as DependencyManagement import-scoped dependencies).",
            "Move the dependency to dependencyManagement with type pom and scope import",
        )),
        _ => None,
    }
}

/// Group-id prefix before the `.spi` / `.api` segment, e.g. `com.example.foo`
fn component_of(group_id: &str) -> &str {
    let group_id = group_id.trim();
    let mut offset = 0;

    for segment in group_id.split('.') {
        if offset > 0 && (segment.eq_ignore_ascii_case("spi") || segment.eq_ignore_ascii_case("api")) {
            return &group_id[..offset - 1];
        }
        offset += segment.len() + 1;
    }

    group_id
}
