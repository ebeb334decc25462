//! Enforcer rules evaluated against a single project
//!
//! Architecture: Strategy Pattern - every rule turns one project into zero or more violations
//! - Rules are built once from options, compiling their patterns up front
//! - Evaluation is pure and may run on any thread

pub mod compliance;
pub mod dependencies;
pub mod packaging;

pub use compliance::{ComplianceOptions, ComplianceRule};
pub use dependencies::{DependencyCheckOptions, DependencyLegalityChecker};
pub use packaging::{CorrectPackagingRule, PackagingOptions};

use crate::domain::project::ProjectModel;
use crate::domain::violations::{Severity, Violation};

/// Group-ids evaluated by default (the organization namespace root)
pub const DEFAULT_EVALUATE_GROUP_IDS: &[&str] = &[r"^com\.example\..*"];

/// Group-ids excluded from evaluation by default
pub const DEFAULT_IGNORE_GROUP_IDS: &[&str] =
    &[r"^com\.example\..*\.generated\..*", r"^com\.example\.oss\.codestyle\..*"];

pub const KNOWN_RULE_IDS: &[&str] = &[compliance::RULE_ID, dependencies::RULE_ID, packaging::RULE_ID];

/// A rule checked against every project
pub trait EnforcerRule: Send + Sync {
    /// Stable identifier used in reports and `--rule` filters
    fn id(&self) -> &'static str;

    /// One-line summary shown when the rule fails
    fn short_description(&self) -> &'static str;

    fn severity(&self) -> Severity;

    /// Check the project; an empty result means it passed
    fn evaluate(&self, project: &ProjectModel) -> Vec<Violation>;
}

pub(crate) fn to_strings(patterns: &[&str]) -> Vec<String> {
    patterns.iter().map(|p| p.to_string()).collect()
}
