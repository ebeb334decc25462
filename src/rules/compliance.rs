//! Permitted archetype compliance: the project must match one of a configured set

use super::{to_strings, EnforcerRule, DEFAULT_IGNORE_GROUP_IDS};
use crate::archetypes::{Archetype, ArchetypeRegistry};
use crate::domain::project::ProjectModel;
use crate::domain::violations::{EnforcerResult, Severity, Violation, ViolationKind};
use crate::patterns::CoordinatePattern;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

pub const RULE_ID: &str = "permitted-archetype";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComplianceOptions {
    /// Tested in order; the first compliant archetype wins
    pub permitted_archetypes: Vec<Archetype>,
    /// Dependencies with these group-ids are invisible to structural predicates
    pub ignore_group_ids: Vec<String>,
    pub severity: Severity,
}

impl Default for ComplianceOptions {
    fn default() -> Self {
        Self {
            permitted_archetypes: Archetype::ALL.to_vec(),
            ignore_group_ids: to_strings(DEFAULT_IGNORE_GROUP_IDS),
            severity: Severity::Error,
        }
    }
}

/// Checks that a project complies with at least one permitted archetype
#[derive(Debug, Clone)]
pub struct ComplianceRule {
    registry: Arc<ArchetypeRegistry>,
    ignore: Vec<CoordinatePattern>,
    permitted: Vec<Archetype>,
    severity: Severity,
}

impl ComplianceRule {
    pub fn new(options: &ComplianceOptions) -> EnforcerResult<Self> {
        Self::with_registry(ArchetypeRegistry::standard(), options)
    }

    pub fn with_registry(
        registry: Arc<ArchetypeRegistry>,
        options: &ComplianceOptions,
    ) -> EnforcerResult<Self> {
        Ok(Self {
            registry,
            ignore: CoordinatePattern::group_ids(&options.ignore_group_ids)?,
            permitted: options.permitted_archetypes.clone(),
            severity: options.severity,
        })
    }

    /// The first permitted archetype the project complies with
    pub fn first_compliant(&self, project: &ProjectModel) -> Option<Archetype> {
        self.permitted
            .iter()
            .copied()
            .find(|&archetype| self.registry.is_compliant_with(archetype, project, &self.ignore))
    }

    pub fn check(&self, project: &ProjectModel) -> Option<Violation> {
        let gav = format!("GAV [{}]", project.gav());

        if let Some(archetype) = self.first_compliant(project) {
            tracing::debug!("Found matching archetype [{}] for project {}", archetype, gav);
            return None;
        }

        Some(
            Violation::new(
                RULE_ID,
                self.severity,
                ViolationKind::NonCompliant,
                format!(
                    "None of the permitted archetypes matched {gav}. Permitted archetypes:\n{}",
                    self.permitted_listing()
                ),
            )
            .with_project(project.gav()),
        )
    }

    /// One ` [i/n]: NAME - patterns` line per permitted archetype
    pub fn permitted_listing(&self) -> String {
        let total = self.permitted.len();
        self.permitted
            .iter()
            .enumerate()
            .map(|(index, &archetype)| format!(" [{index}/{total}]: {}", self.registry.describe(archetype)))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl EnforcerRule for ComplianceRule {
    fn id(&self) -> &'static str {
        RULE_ID
    }

    fn short_description(&self) -> &'static str {
        "Project groupId, artifactId and packaging must comply with a permitted archetype."
    }

    fn severity(&self) -> Severity {
        self.severity
    }

    fn evaluate(&self, project: &ProjectModel) -> Vec<Violation> {
        self.check(project).into_iter().collect()
    }
}

impl fmt::Display for ComplianceRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ignoring = if self.ignore.is_empty() {
            "ignoring no artifacts.".to_string()
        } else {
            format!(
                "ignoring artifacts matching [{}] groupIds: [{}]",
                self.ignore.len(),
                self.ignore.iter().map(|p| p.as_str()).collect::<Vec<_>>().join(", ")
            )
        };

        write!(
            f,
            "ComplianceRule {ignoring}\n[{}] permitted archetypes:\n{}",
            self.permitted.len(),
            self.permitted_listing()
        )
    }
}
