//! Immutable coordinate patterns bound to one archetype

use crate::domain::project::Coordinates;
use crate::domain::violations::EnforcerResult;
use crate::patterns::CoordinatePattern;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Three coordinate patterns plus the policy for absent values
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchetypeDefinition {
    group_id: CoordinatePattern,
    artifact_id: CoordinatePattern,
    packaging: CoordinatePattern,
    accept_nulls: bool,
}

/// Configuration-supplied replacement for some or all of a definition's fields
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PatternOverride {
    #[serde(default)]
    pub group_id: Option<String>,
    #[serde(default)]
    pub artifact_id: Option<String>,
    #[serde(default)]
    pub packaging: Option<String>,
    #[serde(default)]
    pub accept_nulls: Option<bool>,
}

impl ArchetypeDefinition {
    /// Compile a definition; absent patterns match anything
    pub fn new(
        group_id: Option<&str>,
        artifact_id: Option<&str>,
        packaging: Option<&str>,
        accept_nulls: bool,
    ) -> EnforcerResult<Self> {
        Ok(Self {
            group_id: CoordinatePattern::new(group_id)?,
            artifact_id: CoordinatePattern::new(artifact_id)?,
            packaging: CoordinatePattern::new(packaging)?,
            accept_nulls,
        })
    }

    /// Apply an override, recompiling only the replaced patterns
    pub fn with_override(&self, replacement: &PatternOverride) -> EnforcerResult<Self> {
        let pick = |field: &Option<String>, current: &CoordinatePattern| match field {
            Some(pattern) => CoordinatePattern::compile(pattern),
            None => Ok(current.clone()),
        };

        Ok(Self {
            group_id: pick(&replacement.group_id, &self.group_id)?,
            artifact_id: pick(&replacement.artifact_id, &self.artifact_id)?,
            packaging: pick(&replacement.packaging, &self.packaging)?,
            accept_nulls: replacement.accept_nulls.unwrap_or(self.accept_nulls),
        })
    }

    pub fn is_compliant_group_id(&self, group_id: Option<&str>) -> bool {
        self.group_id.matches(group_id, self.accept_nulls)
    }

    pub fn is_compliant_artifact_id(&self, artifact_id: Option<&str>) -> bool {
        self.artifact_id.matches(artifact_id, self.accept_nulls)
    }

    pub fn is_compliant_packaging(&self, packaging: Option<&str>) -> bool {
        self.packaging.matches(packaging, self.accept_nulls)
    }

    /// All three fields comply
    pub fn matches(&self, coordinates: &Coordinates) -> bool {
        self.is_compliant_group_id(coordinates.group_id())
            && self.is_compliant_artifact_id(coordinates.artifact_id())
            && self.is_compliant_packaging(coordinates.packaging())
    }

    pub fn group_id_pattern(&self) -> &CoordinatePattern {
        &self.group_id
    }

    pub fn artifact_id_pattern(&self) -> &CoordinatePattern {
        &self.artifact_id
    }

    pub fn packaging_pattern(&self) -> &CoordinatePattern {
        &self.packaging
    }

    pub fn accepts_nulls(&self) -> bool {
        self.accept_nulls
    }
}

impl fmt::Display for ArchetypeDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "GroupIdRegex: {}, ArtifactIdRegex: {}, PackagingRegex: {}",
            self.group_id, self.artifact_id, self.packaging
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_acceptance() {
        let accept_all = ArchetypeDefinition::new(None, None, None, true).unwrap();
        let accept_none = ArchetypeDefinition::new(None, None, None, false).unwrap();

        assert!(accept_all.is_compliant_artifact_id(None));
        assert!(accept_all.is_compliant_group_id(None));
        assert!(accept_all.is_compliant_packaging(None));

        assert!(!accept_none.is_compliant_artifact_id(None));
        assert!(!accept_none.is_compliant_group_id(None));
        assert!(!accept_none.is_compliant_packaging(None));
    }

    #[test]
    fn test_field_patterns() {
        let api = ArchetypeDefinition::new(Some(r".*\.api$"), Some(".*-api$"), Some("bundle|jar"), false)
            .unwrap();

        assert!(api.is_compliant_artifact_id(Some("foo-api")));
        assert!(!api.is_compliant_artifact_id(Some("foo-api-bah")));
        assert!(!api.is_compliant_artifact_id(None));

        assert!(api.is_compliant_group_id(Some("com.example.foo.api")));
        assert!(!api.is_compliant_group_id(Some("com.example.foo.api.bah")));

        assert!(api.is_compliant_packaging(Some("bundle")));
        assert!(api.is_compliant_packaging(Some("jar")));
        assert!(!api.is_compliant_packaging(Some("war")));
    }

    #[test]
    fn test_override_replaces_only_given_fields() {
        let parent = ArchetypeDefinition::new(None, Some(".*-parent$"), Some("pom"), false).unwrap();
        let replaced = parent
            .with_override(&PatternOverride {
                artifact_id: Some(".*-parent.*".to_string()),
                accept_nulls: Some(true),
                ..Default::default()
            })
            .unwrap();

        assert_eq!(replaced.artifact_id_pattern().as_str(), ".*-parent.*");
        assert_eq!(replaced.packaging_pattern().as_str(), "pom");
        assert!(replaced.accepts_nulls());
        assert!(replaced.is_compliant_artifact_id(Some("foo-parent-assembly")));
    }

    #[test]
    fn test_display_lists_all_patterns() {
        let definition = ArchetypeDefinition::new(None, Some(".*-bom$"), Some("pom"), false).unwrap();
        assert_eq!(
            definition.to_string(),
            "GroupIdRegex: .*, ArtifactIdRegex: .*-bom$, PackagingRegex: pom"
        );
    }
}
