//! Core domain models for archetype violations and validation results
//!
//! Architecture: Rich Domain Models - Violations are entities with behavior, not just data
//! - Violations know which rule raised them, what kind of failure they describe and
//!   which dependency (if any) triggered them
//! - ValidationReport acts as an aggregate root managing collections of violations

use crate::domain::project::Coordinates;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Severity levels for rule violations
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational messages and suggestions
    Info,
    /// Warnings that should be addressed but don't block builds
    Warning,
    /// Errors that fail the build
    Error,
}

impl Severity {
    /// Whether this severity level should cause validation to fail
    pub fn is_blocking(self) -> bool {
        matches!(self, Self::Error)
    }

    /// Convert to string for display
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

/// What kind of failure a violation describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    /// Coordinates matched zero or several archetypes
    ClassificationFailure,
    /// Coordinates matched one archetype, but its structural predicate failed
    StructuralViolation,
    /// A dependency's archetype is forbidden in the consuming project
    PolicyViolation,
    /// The project matched none of the permitted archetypes
    NonCompliant,
    /// Source packages outside the project's group-id, or no group-id at all
    IncorrectPackaging,
}

impl ViolationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ClassificationFailure => "classification_failure",
            Self::StructuralViolation => "structural_violation",
            Self::PolicyViolation => "policy_violation",
            Self::NonCompliant => "non_compliant",
            Self::IncorrectPackaging => "incorrect_packaging",
        }
    }
}

/// A rule violation detected while checking a project
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Violation {
    /// Identifier of the rule that raised this violation
    pub rule_id: String,
    /// Severity level of this violation
    pub severity: Severity,
    /// Kind of failure
    pub kind: ViolationKind,
    /// Human-readable description of the violation
    pub message: String,
    /// GAV of the project being checked, e.g. `com.example.foo:foo-api:jar`
    pub project: Option<String>,
    /// Coordinates of the dependency that triggered the violation
    pub offending: Option<Coordinates>,
    /// Descriptor file the project was read from
    pub source: Option<PathBuf>,
    /// Suggested fix for the violation (if available)
    pub suggested_fix: Option<String>,
    /// When this violation was detected
    pub detected_at: DateTime<Utc>,
}

impl Violation {
    /// Create a new violation
    pub fn new(
        rule_id: impl Into<String>,
        severity: Severity,
        kind: ViolationKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            rule_id: rule_id.into(),
            severity,
            kind,
            message: message.into(),
            project: None,
            offending: None,
            source: None,
            suggested_fix: None,
            detected_at: Utc::now(),
        }
    }

    /// Attach the GAV of the checked project
    pub fn with_project(mut self, project: impl Into<String>) -> Self {
        self.project = Some(project.into());
        self
    }

    /// Attach the dependency that triggered this violation
    pub fn with_offending(mut self, coordinates: Coordinates) -> Self {
        self.offending = Some(coordinates);
        self
    }

    /// Attach the descriptor file the project came from
    pub fn with_source(mut self, source: impl Into<PathBuf>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Add a suggested fix
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggested_fix = Some(suggestion.into());
        self
    }

    /// Whether this violation is blocking (fails the build)
    pub fn is_blocking(&self) -> bool {
        self.severity.is_blocking()
    }

    /// Format violation for display
    pub fn format_display(&self) -> String {
        let location = match (&self.source, &self.project) {
            (Some(source), Some(project)) => format!("{} ({project})", source.display()),
            (Some(source), None) => source.display().to_string(),
            (None, Some(project)) => project.clone(),
            (None, None) => "<unknown>".to_string(),
        };

        let offending = match &self.offending {
            Some(coordinates) => format!(" [dependency {coordinates}]"),
            None => String::new(),
        };

        format!(
            "{} [{}] {}{}",
            location,
            self.severity.as_str(),
            self.message,
            offending
        )
    }
}

/// Summary statistics for a validation report
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationSummary {
    /// Total number of projects checked
    pub total_projects: usize,
    /// Number of violations by severity level
    pub violations_by_severity: ViolationCounts,
    /// Total execution time in milliseconds
    pub execution_time_ms: u64,
    /// Timestamp when validation was performed
    pub validated_at: DateTime<Utc>,
}

/// Count of violations by severity level
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ViolationCounts {
    pub error: usize,
    pub warning: usize,
    pub info: usize,
}

impl ViolationCounts {
    /// Total number of violations across all severities
    pub fn total(&self) -> usize {
        self.error + self.warning + self.info
    }

    /// Whether there are any blocking violations
    pub fn has_blocking(&self) -> bool {
        self.error > 0
    }

    /// Add a violation to the counts
    pub fn add(&mut self, severity: Severity) {
        match severity {
            Severity::Error => self.error += 1,
            Severity::Warning => self.warning += 1,
            Severity::Info => self.info += 1,
        }
    }
}

/// Complete validation report containing all violations and metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    /// All violations found during validation
    pub violations: Vec<Violation>,
    /// Summary statistics
    pub summary: ValidationSummary,
    /// Configuration used for this validation
    pub config_fingerprint: Option<String>,
}

impl ValidationReport {
    /// Create a new empty validation report
    pub fn new() -> Self {
        Self {
            violations: Vec::new(),
            summary: ValidationSummary { validated_at: Utc::now(), ..Default::default() },
            config_fingerprint: None,
        }
    }

    /// Add a violation to the report
    pub fn add_violation(&mut self, violation: Violation) {
        self.summary.violations_by_severity.add(violation.severity);
        self.violations.push(violation);
    }

    /// Whether the report contains any violations
    pub fn has_violations(&self) -> bool {
        !self.violations.is_empty()
    }

    /// Whether the report contains blocking violations (errors)
    pub fn has_errors(&self) -> bool {
        self.summary.violations_by_severity.has_blocking()
    }

    /// Get violations of a specific severity
    pub fn violations_by_severity(&self, severity: Severity) -> impl Iterator<Item = &Violation> {
        self.violations.iter().filter(move |v| v.severity == severity)
    }

    /// Set the number of projects checked
    pub fn set_projects_checked(&mut self, count: usize) {
        self.summary.total_projects = count;
    }

    /// Set the execution time
    pub fn set_execution_time(&mut self, duration_ms: u64) {
        self.summary.execution_time_ms = duration_ms;
    }

    /// Set the configuration fingerprint
    pub fn set_config_fingerprint(&mut self, fingerprint: impl Into<String>) {
        self.config_fingerprint = Some(fingerprint.into());
    }

    /// Merge another report into this one
    pub fn merge(&mut self, other: ValidationReport) {
        for violation in other.violations {
            self.add_violation(violation);
        }
        self.summary.total_projects += other.summary.total_projects;
    }

    /// Sort violations by source, then rule and severity, for consistent output
    pub fn sort_violations(&mut self) {
        self.violations.sort_by(|a, b| {
            a.source
                .cmp(&b.source)
                .then_with(|| a.project.cmp(&b.project))
                .then_with(|| a.rule_id.cmp(&b.rule_id))
                .then_with(|| b.severity.cmp(&a.severity))
        });
    }
}

impl Default for ValidationReport {
    fn default() -> Self {
        Self::new()
    }
}

/// Error types that can occur while configuring or running the enforcer
#[derive(Debug, thiserror::Error)]
pub enum EnforcerError {
    /// Configuration could not be loaded, parsed or compiled
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// File could not be read or accessed
    #[error("IO error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// A project descriptor could not be read or parsed
    #[error("Descriptor error in {file}: {message}")]
    Descriptor { file: String, message: String },

    /// Validation operation failed
    #[error("Validation error: {message}")]
    Validation { message: String },
}

impl EnforcerError {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Configuration { message: message.into() }
    }

    /// Create a descriptor error
    pub fn descriptor(file: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Descriptor { file: file.into(), message: message.into() }
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation { message: message.into() }
    }
}

/// Result type for enforcer operations
pub type EnforcerResult<T> = Result<T, EnforcerError>;
