//! Report generation with multiple output formats
//!
//! Architecture: Anti-Corruption Layer - Formatters translate domain objects to external formats
//! - ValidationReport (domain) is converted to human, JSON, JUnit and GitHub representations
//! - Each formatter encapsulates the rules for its specific output format
//! - Colours are applied only when the `colors` feature is compiled in and enabled

use crate::domain::violations::{EnforcerError, EnforcerResult, Severity, ValidationReport, Violation};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use std::io::Write;
use std::str::FromStr;

/// Supported output formats for validation reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable format with optional colours
    Human,
    /// JSON format for programmatic consumption
    Json,
    /// JUnit XML format for CI/CD integration
    Junit,
    /// GitHub Actions workflow annotations
    GitHub,
}

impl OutputFormat {
    pub fn all_formats() -> &'static [&'static str] {
        &["human", "json", "junit", "github"]
    }
}

impl FromStr for OutputFormat {
    type Err = EnforcerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "human" => Ok(Self::Human),
            "json" => Ok(Self::Json),
            "junit" => Ok(Self::Junit),
            "github" => Ok(Self::GitHub),
            other => Err(EnforcerError::config(format!(
                "Unknown output format '{other}'. Available formats: {}",
                Self::all_formats().join(", ")
            ))),
        }
    }
}

/// Options for customizing report output
#[derive(Debug, Clone)]
pub struct ReportOptions {
    /// Whether to use coloured output (human format)
    pub use_colors: bool,
    /// Whether to show suggested fixes
    pub show_suggestions: bool,
    /// Maximum number of violations to include
    pub max_violations: Option<usize>,
    /// Minimum severity level to include
    pub min_severity: Option<Severity>,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self { use_colors: true, show_suggestions: true, max_violations: None, min_severity: None }
    }
}

#[derive(Debug, Clone, Copy)]
enum Tone {
    Error,
    Warning,
    Info,
    Success,
    Dim,
    Bold,
}

impl From<Severity> for Tone {
    fn from(severity: Severity) -> Self {
        match severity {
            Severity::Error => Tone::Error,
            Severity::Warning => Tone::Warning,
            Severity::Info => Tone::Info,
        }
    }
}

#[cfg(feature = "colors")]
fn paint(text: &str, tone: Tone, enabled: bool) -> String {
    use colored::Colorize;

    if !enabled {
        return text.to_string();
    }

    match tone {
        Tone::Error => text.red().to_string(),
        Tone::Warning => text.yellow().to_string(),
        Tone::Info => text.cyan().to_string(),
        Tone::Success => text.green().to_string(),
        Tone::Dim => text.dimmed().to_string(),
        Tone::Bold => text.bold().to_string(),
    }
}

#[cfg(not(feature = "colors"))]
fn paint(text: &str, _tone: Tone, _enabled: bool) -> String {
    text.to_string()
}

/// Main report formatter that dispatches to specific formatters
#[derive(Debug, Clone, Default)]
pub struct ReportFormatter {
    options: ReportOptions,
}

impl ReportFormatter {
    pub fn new(options: ReportOptions) -> Self {
        Self { options }
    }

    /// Format a validation report in the specified format
    pub fn format_report(&self, report: &ValidationReport, format: OutputFormat) -> EnforcerResult<String> {
        let violations = self.filter_violations(&report.violations);

        match format {
            OutputFormat::Human => Ok(self.format_human(report, &violations)),
            OutputFormat::Json => self.format_json(report, &violations),
            OutputFormat::Junit => Ok(self.format_junit(report, &violations)),
            OutputFormat::GitHub => Ok(self.format_github(&violations)),
        }
    }

    /// Write a formatted report to a writer
    pub fn write_report<W: Write>(
        &self,
        report: &ValidationReport,
        format: OutputFormat,
        mut writer: W,
    ) -> EnforcerResult<()> {
        let formatted = self.format_report(report, format)?;
        writer.write_all(formatted.as_bytes())?;
        Ok(())
    }

    fn filter_violations<'a>(&self, violations: &'a [Violation]) -> Vec<&'a Violation> {
        let mut filtered: Vec<&Violation> = violations
            .iter()
            .filter(|v| self.options.min_severity.map_or(true, |min| v.severity >= min))
            .collect();

        if let Some(max) = self.options.max_violations {
            filtered.truncate(max);
        }

        filtered
    }

    fn paint(&self, text: &str, tone: Tone) -> String {
        paint(text, tone, self.options.use_colors)
    }

    fn format_human(&self, report: &ValidationReport, violations: &[&Violation]) -> String {
        let mut output = String::new();

        if violations.is_empty() {
            output.push_str(&self.paint("No archetype violations found", Tone::Success));
            output.push('\n');
        } else {
            let tone = if report.has_errors() { Tone::Error } else { Tone::Warning };
            output.push_str(&self.paint("Archetype Violations Found", tone));
            output.push_str("\n\n");

            // Group by descriptor, falling back to the project GAV
            let mut by_location: BTreeMap<String, Vec<&Violation>> = BTreeMap::new();
            for violation in violations {
                by_location.entry(location_label(violation)).or_default().push(violation);
            }

            for (location, location_violations) in by_location {
                output.push_str(&self.paint(&location, Tone::Bold));
                output.push('\n');

                for violation in location_violations {
                    output.push_str(&format!(
                        "  {} [{}] {}\n",
                        self.paint(&violation.rule_id, Tone::Dim),
                        self.paint(violation.severity.as_str(), violation.severity.into()),
                        indent_continuation(&violation.message, 4)
                    ));

                    if let Some(offending) = &violation.offending {
                        output.push_str(&format!("    dependency: {offending}\n"));
                    }

                    if self.options.show_suggestions {
                        if let Some(suggestion) = &violation.suggested_fix {
                            output.push_str(&format!("    {}\n", self.paint(&format!("fix: {suggestion}"), Tone::Success)));
                        }
                    }

                    output.push('\n');
                }
            }
        }

        output.push_str(&self.format_summary(report));
        output
    }

    fn format_json(&self, report: &ValidationReport, violations: &[&Violation]) -> EnforcerResult<String> {
        let json_violations: Vec<JsonValue> = violations
            .iter()
            .map(|v| {
                serde_json::json!({
                    "rule_id": v.rule_id,
                    "severity": v.severity.as_str(),
                    "kind": v.kind.as_str(),
                    "message": v.message,
                    "project": v.project,
                    "offending": v.offending.as_ref().map(|c| c.to_string()),
                    "source": v.source.as_ref().map(|p| p.display().to_string()),
                    "suggested_fix": v.suggested_fix,
                    "detected_at": v.detected_at.to_rfc3339()
                })
            })
            .collect();

        let json_report = serde_json::json!({
            "violations": json_violations,
            "summary": {
                "total_projects": report.summary.total_projects,
                "violations_by_severity": {
                    "error": report.summary.violations_by_severity.error,
                    "warning": report.summary.violations_by_severity.warning,
                    "info": report.summary.violations_by_severity.info
                },
                "execution_time_ms": report.summary.execution_time_ms,
                "validated_at": report.summary.validated_at.to_rfc3339()
            },
            "config_fingerprint": report.config_fingerprint
        });

        serde_json::to_string_pretty(&json_report)
            .map_err(|e| EnforcerError::validation(format!("JSON serialization failed: {e}")))
    }

    fn format_junit(&self, report: &ValidationReport, violations: &[&Violation]) -> String {
        let mut xml = String::new();
        xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");

        let failures = violations.iter().filter(|v| v.severity.is_blocking()).count();
        let execution_time = (report.summary.execution_time_ms as f64) / 1000.0;

        xml.push_str(&format!(
            "<testsuite name=\"pom-guardian\" tests=\"{}\" failures=\"{}\" errors=\"0\" time=\"{:.3}\">\n",
            violations.len(),
            failures,
            execution_time
        ));

        for violation in violations {
            xml.push_str(&format!(
                "  <testcase classname=\"{}\" name=\"{}\">\n",
                escape_xml(&violation.rule_id),
                escape_xml(&location_label(violation))
            ));

            if violation.is_blocking() {
                xml.push_str(&format!("    <failure message=\"{}\">\n", escape_xml(&violation.message)));
                xml.push_str(&format!("      Kind: {}\n", violation.kind.as_str()));
                if let Some(offending) = &violation.offending {
                    xml.push_str(&format!("      Dependency: {}\n", escape_xml(&offending.to_string())));
                }
                xml.push_str("    </failure>\n");
            } else {
                xml.push_str(&format!("    <system-out>{}</system-out>\n", escape_xml(&violation.message)));
            }

            xml.push_str("  </testcase>\n");
        }

        xml.push_str("</testsuite>\n");
        xml
    }

    fn format_github(&self, violations: &[&Violation]) -> String {
        let mut output = String::new();

        for violation in violations {
            let level = match violation.severity {
                Severity::Error => "error",
                Severity::Warning => "warning",
                Severity::Info => "notice",
            };

            let file = match &violation.source {
                Some(source) => format!("file={},", source.display()),
                None => String::new(),
            };

            output.push_str(&format!(
                "::{} {}title={}::{}\n",
                level,
                file,
                violation.rule_id,
                escape_annotation(&violation.message)
            ));
        }

        output
    }

    fn format_summary(&self, report: &ValidationReport) -> String {
        let counts = &report.summary.violations_by_severity;
        let execution_time = (report.summary.execution_time_ms as f64) / 1000.0;
        let projects = report.summary.total_projects;

        let findings = if counts.total() == 0 {
            self.paint("0 violations", Tone::Success)
        } else {
            let mut parts = Vec::new();
            if counts.error > 0 {
                let text = format!("{} error{}", counts.error, plural(counts.error));
                parts.push(self.paint(&text, Tone::Error));
            }
            if counts.warning > 0 {
                let text = format!("{} warning{}", counts.warning, plural(counts.warning));
                parts.push(self.paint(&text, Tone::Warning));
            }
            if counts.info > 0 {
                parts.push(self.paint(&format!("{} info", counts.info), Tone::Info));
            }
            parts.join(", ")
        };

        format!(
            "{} {} in {} project{} ({:.1}s)\n",
            self.paint("Summary:", Tone::Bold),
            findings,
            projects,
            plural(projects),
            execution_time
        )
    }
}

fn plural(count: usize) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}

fn location_label(violation: &Violation) -> String {
    match (&violation.source, &violation.project) {
        (Some(source), _) => source.display().to_string(),
        (None, Some(project)) => project.clone(),
        (None, None) => "<unknown>".to_string(),
    }
}

/// Indent every line after the first, for multi-line messages
fn indent_continuation(message: &str, width: usize) -> String {
    message.replace('\n', &format!("\n{}", " ".repeat(width)))
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Workflow commands are line-based; newlines must be percent-encoded
fn escape_annotation(s: &str) -> String {
    s.replace('%', "%25").replace('\r', "%0D").replace('\n', "%0A")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::project::Coordinates;
    use crate::domain::violations::ViolationKind;

    fn create_test_report() -> ValidationReport {
        let mut report = ValidationReport::new();

        report.add_violation(
            Violation::new(
                "correct-dependencies",
                Severity::Error,
                ViolationKind::PolicyViolation,
                "Don't use IMPLEMENTATION dependencies outside of application projects.",
            )
            .with_project("com.example.foo.api:foo-api:jar")
            .with_source("foo-api/project.yaml")
            .with_offending(Coordinates::new(
                Some("com.example.foo.impl.jdbc"),
                Some("foo-impl-jdbc"),
                Some("jar"),
            ))
            .with_suggestion("Depend on the API project instead"),
        );

        report.set_projects_checked(4);
        report.set_execution_time(1200);
        report
    }

    fn plain() -> ReportFormatter {
        ReportFormatter::new(ReportOptions { use_colors: false, ..Default::default() })
    }

    #[test]
    fn test_human_format() {
        let output = plain().format_report(&create_test_report(), OutputFormat::Human).unwrap();

        assert!(output.contains("Archetype Violations Found"));
        assert!(output.contains("foo-api/project.yaml"));
        assert!(output.contains("  correct-dependencies [error] Don't use IMPLEMENTATION"));
        assert!(output.contains("dependency: com.example.foo.impl.jdbc:foo-impl-jdbc:jar"));
        assert!(output.contains("fix: Depend on the API project instead"));
        assert!(output.contains("Summary: 1 error in 4 projects (1.2s)"));
    }

    #[test]
    fn test_json_format() {
        let output = plain().format_report(&create_test_report(), OutputFormat::Json).unwrap();

        let json: JsonValue = serde_json::from_str(&output).unwrap();
        assert_eq!(json["violations"].as_array().unwrap().len(), 1);
        assert_eq!(json["violations"][0]["kind"], "policy_violation");
        assert_eq!(json["violations"][0]["offending"], "com.example.foo.impl.jdbc:foo-impl-jdbc:jar");
        assert_eq!(json["summary"]["total_projects"], 4);
    }

    #[test]
    fn test_junit_format() {
        let output = plain().format_report(&create_test_report(), OutputFormat::Junit).unwrap();

        assert!(output.contains("<?xml version=\"1.0\""));
        assert!(output.contains("<testsuite name=\"pom-guardian\" tests=\"1\" failures=\"1\""));
        assert!(output.contains("Don&#39;t use IMPLEMENTATION"));
        assert!(output.contains("<failure"));
    }

    #[test]
    fn test_github_format_escapes_newlines() {
        let mut report = create_test_report();
        report.add_violation(Violation::new(
            "permitted-archetype",
            Severity::Warning,
            ViolationKind::NonCompliant,
            "None matched.\n [0/1]: API",
        ));

        let output = plain().format_report(&report, OutputFormat::GitHub).unwrap();
        assert!(output.contains("::error file=foo-api/project.yaml,title=correct-dependencies::Don't use"));
        assert!(output.contains("::warning title=permitted-archetype::None matched.%0A [0/1]: API"));
        assert_eq!(output.lines().count(), 2);
    }

    #[test]
    fn test_empty_report() {
        let output = plain().format_report(&ValidationReport::new(), OutputFormat::Human).unwrap();
        assert!(output.contains("No archetype violations found"));
        assert!(output.contains("0 violations in 0 projects"));
    }

    #[test]
    fn test_severity_filtering_and_limit() {
        let mut report = create_test_report();
        report.add_violation(Violation::new("a", Severity::Info, ViolationKind::NonCompliant, "info"));
        report.add_violation(Violation::new("b", Severity::Error, ViolationKind::NonCompliant, "second"));

        let formatter = ReportFormatter::new(ReportOptions {
            min_severity: Some(Severity::Warning),
            max_violations: Some(1),
            ..Default::default()
        });
        let output = formatter.format_report(&report, OutputFormat::Json).unwrap();
        let json: JsonValue = serde_json::from_str(&output).unwrap();

        assert_eq!(json["violations"].as_array().unwrap().len(), 1);
        assert_eq!(json["violations"][0]["rule_id"], "correct-dependencies");
    }

    #[test]
    fn test_format_names() {
        assert_eq!("GitHub".parse::<OutputFormat>().unwrap(), OutputFormat::GitHub);
        assert!("sarif".parse::<OutputFormat>().is_err());
    }
}
