//! The closed set of project archetypes and their registry
//!
//! Architecture: Domain Model - archetype identity is a plain enum, its match rules live
//! in immutable definitions held by a registry
//! - The standard registry is built once and shared
//! - Configured overrides produce a separate registry, compiled up front

pub mod definition;
pub mod structure;

pub use definition::{ArchetypeDefinition, PatternOverride};
pub use structure::{check_structure, has_structure_rules, structure_summary};

use crate::domain::project::{Coordinates, ProjectModel};
use crate::domain::violations::{EnforcerError, EnforcerResult};
use crate::patterns::CoordinatePattern;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// A known project archetype
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Archetype {
    Reactor,
    Parent,
    BillOfMaterials,
    Assembly,
    Aspect,
    Model,
    JeeApplication,
    StandaloneApplication,
    Microservice,
    Example,
    JavaAgent,
    Api,
    Spi,
    Implementation,
    Test,
    IntegrationTest,
    Codestyle,
    Plugin,
    ProofOfConcept,
}

/// Built-in patterns for one archetype: (groupId, artifactId, packaging, accept nulls)
type BuiltinPatterns = (Option<&'static str>, Option<&'static str>, Option<&'static str>, bool);

impl Archetype {
    /// Every archetype, in enumeration (and classification) order
    pub const ALL: [Archetype; 19] = [
        Archetype::Reactor,
        Archetype::Parent,
        Archetype::BillOfMaterials,
        Archetype::Assembly,
        Archetype::Aspect,
        Archetype::Model,
        Archetype::JeeApplication,
        Archetype::StandaloneApplication,
        Archetype::Microservice,
        Archetype::Example,
        Archetype::JavaAgent,
        Archetype::Api,
        Archetype::Spi,
        Archetype::Implementation,
        Archetype::Test,
        Archetype::IntegrationTest,
        Archetype::Codestyle,
        Archetype::Plugin,
        Archetype::ProofOfConcept,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Reactor => "REACTOR",
            Self::Parent => "PARENT",
            Self::BillOfMaterials => "BILL_OF_MATERIALS",
            Self::Assembly => "ASSEMBLY",
            Self::Aspect => "ASPECT",
            Self::Model => "MODEL",
            Self::JeeApplication => "JEE_APPLICATION",
            Self::StandaloneApplication => "STANDALONE_APPLICATION",
            Self::Microservice => "MICROSERVICE",
            Self::Example => "EXAMPLE",
            Self::JavaAgent => "JAVA_AGENT",
            Self::Api => "API",
            Self::Spi => "SPI",
            Self::Implementation => "IMPLEMENTATION",
            Self::Test => "TEST",
            Self::IntegrationTest => "INTEGRATION_TEST",
            Self::Codestyle => "CODESTYLE",
            Self::Plugin => "PLUGIN",
            Self::ProofOfConcept => "PROOF_OF_CONCEPT",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::Reactor => "Reactor project of type pom. May contain nothing except module definitions.",
            Self::Parent => "Parent pom defining dependencies and/or build life cycles. May not contain module definitions.",
            Self::BillOfMaterials => "Bill-of-Materials pom defining DependencyManagement entries only.",
            Self::Assembly => "Pom defining assemblies and/or aggregations. May not contain module definitions.",
            Self::Aspect => "Publicly available aspect implementations.",
            Self::Model => "Entity definitions. May have test-scope dependencies on test and proof-of-concept projects.",
            Self::JeeApplication => "JEE-deployable application. Implementation dependencies are permitted here.",
            Self::StandaloneApplication => "Runnable standalone application. Implementation dependencies are permitted here.",
            Self::Microservice => "Runnable (micro)service. Implementation dependencies are permitted here.",
            Self::Example => "Runnable example code showing typical usage of the component. No dependency rules.",
            Self::JavaAgent => "In-process JVM agent; an application entrypoint that may use implementation dependencies.",
            Self::Api => "Service interaction, abstract implementations and exceptions. May depend on model projects of the same component.",
            Self::Spi => "Service provider interfaces. Expected to depend on API projects of the same component.",
            Self::Implementation => "Implementation of an API or SPI, including 3rd party library dependencies.",
            Self::Test => "Test helper library facilitating testing within other projects. No dependency rules.",
            Self::IntegrationTest => "Automated integration tests spanning several projects. No dependency rules.",
            Self::Codestyle => "Build tooling helper, e.g. checkstyle configuration or custom enforcer rules. No dependency rules.",
            Self::Plugin => "Maven plugin project.",
            Self::ProofOfConcept => "Proof-of-concept implementations. No dependency rules.",
        }
    }

    /// Archetypes acting as application entrypoints
    pub fn is_application(self) -> bool {
        matches!(
            self,
            Self::JeeApplication | Self::StandaloneApplication | Self::Microservice | Self::JavaAgent
        )
    }

    fn builtin_patterns(self) -> BuiltinPatterns {
        match self {
            Self::Reactor => (None, Some(".*-reactor$"), Some("pom"), false),
            Self::Parent => (None, Some(".*-parent$"), Some("pom"), false),
            Self::BillOfMaterials => (None, Some(".*-bom$"), Some("pom"), false),
            Self::Assembly => (None, Some(".*-assembly$"), Some("pom"), true),
            Self::Aspect => (Some(r".*\.aspect$"), Some(".*-aspect$"), Some("bundle|jar"), false),
            Self::Model => (Some(r".*\.model$"), Some(".*-model$"), Some("bundle|jar"), true),
            Self::JeeApplication => (None, None, Some("war|ear|ejb"), false),
            Self::StandaloneApplication => {
                (Some(r".*\.application$"), Some(".*-application$"), Some("bundle|jar"), false)
            }
            Self::Microservice => (Some(r".*\.service$"), Some(".*-service$"), Some("bundle|jar"), false),
            Self::Example => (Some(r".*\.example$"), Some(".*-example$"), None, true),
            Self::JavaAgent => (Some(r".*\.agent$"), Some(".*-agent$"), Some("bundle|jar"), true),
            Self::Api => (Some(r".*\.api$"), Some(".*-api$"), Some("bundle|jar"), false),
            Self::Spi => (Some(r".*\.spi\.\w*$"), Some(r".*-spi-\w*$"), Some("bundle|jar"), false),
            Self::Implementation => {
                (Some(r".*\.impl\.\w*$"), Some(r".*-impl-\w*$"), Some("bundle|jar"), false)
            }
            Self::Test => (Some(r".*\.test\.\w*$"), Some(".*-test$"), None, true),
            Self::IntegrationTest => (Some(r".*\.it\.\w*$"), Some(".*-it$"), None, true),
            Self::Codestyle => (Some(r".*\.codestyle$"), Some(".*-codestyle$"), Some("jar|bundle"), true),
            Self::Plugin => (None, Some(".*-maven-plugin$"), Some("maven-plugin"), true),
            Self::ProofOfConcept => (Some(r".*\.poc\.\w*$"), Some(".*-poc$"), None, true),
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Archetype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Archetype {
    type Err = EnforcerError;

    /// Accepts `BILL_OF_MATERIALS`, `bill-of-materials`, `Bill_Of_Materials`...
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().replace('-', "_").to_ascii_uppercase();
        Self::ALL.into_iter().find(|a| a.name() == normalized).ok_or_else(|| {
            EnforcerError::config(format!(
                "Unknown archetype '{s}'. Known archetypes: {}",
                Self::ALL.map(|a| a.name()).join(", ")
            ))
        })
    }
}

lazy_static::lazy_static! {
    static ref STANDARD_REGISTRY: Arc<ArchetypeRegistry> = Arc::new(
        ArchetypeRegistry::with_overrides(&BTreeMap::new())
            .expect("built-in archetype patterns are valid regular expressions")
    );
}

/// Every archetype bound to exactly one definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchetypeRegistry {
    definitions: Vec<ArchetypeDefinition>,
}

impl ArchetypeRegistry {
    /// Shared registry with the built-in patterns
    pub fn standard() -> Arc<Self> {
        Arc::clone(&STANDARD_REGISTRY)
    }

    /// Build a registry with the built-in patterns, replacing the overridden fields
    pub fn with_overrides(overrides: &BTreeMap<Archetype, PatternOverride>) -> EnforcerResult<Self> {
        let definitions = Archetype::ALL
            .into_iter()
            .map(|archetype| {
                let (group_id, artifact_id, packaging, accept_nulls) = archetype.builtin_patterns();
                let builtin = ArchetypeDefinition::new(group_id, artifact_id, packaging, accept_nulls)?;

                match overrides.get(&archetype) {
                    Some(replacement) => builtin.with_override(replacement).map_err(|e| {
                        EnforcerError::config(format!("Invalid override for archetype {archetype}: {e}"))
                    }),
                    None => Ok(builtin),
                }
            })
            .collect::<EnforcerResult<Vec<_>>>()?;

        Ok(Self { definitions })
    }

    pub fn definition(&self, archetype: Archetype) -> &ArchetypeDefinition {
        &self.definitions[archetype.index()]
    }

    /// Archetypes with their definitions, in enumeration order
    pub fn iter(&self) -> impl Iterator<Item = (Archetype, &ArchetypeDefinition)> {
        Archetype::ALL.into_iter().zip(self.definitions.iter())
    }

    /// Archetypes whose three coordinate patterns all match
    pub fn matching(&self, coordinates: &Coordinates) -> Vec<Archetype> {
        self.iter()
            .filter(|(_, definition)| definition.matches(coordinates))
            .map(|(archetype, _)| archetype)
            .collect()
    }

    /// Coordinate match plus structural predicate
    pub fn is_compliant_with(
        &self,
        archetype: Archetype,
        project: &ProjectModel,
        ignore: &[CoordinatePattern],
    ) -> bool {
        self.definition(archetype).matches(&project.coordinates())
            && check_structure(archetype, project, ignore).is_ok()
    }

    /// `NAME - GroupIdRegex: ..., ArtifactIdRegex: ..., PackagingRegex: ...`
    pub fn describe(&self, archetype: Archetype) -> String {
        format!("{archetype} - {}", self.definition(archetype))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_is_in_discriminant_order() {
        for (position, archetype) in Archetype::ALL.into_iter().enumerate() {
            assert_eq!(archetype.index(), position);
        }
    }

    #[test]
    fn test_standard_registry_is_shared() {
        let first = ArchetypeRegistry::standard();
        let second = ArchetypeRegistry::standard();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.iter().count(), Archetype::ALL.len());
    }

    #[test]
    fn test_name_round_trip() {
        for archetype in Archetype::ALL {
            assert_eq!(archetype.name().parse::<Archetype>().unwrap(), archetype);
        }
        assert_eq!("bill-of-materials".parse::<Archetype>().unwrap(), Archetype::BillOfMaterials);
        assert!("gadget".parse::<Archetype>().is_err());
    }

    #[test]
    fn test_serde_uses_screaming_names() {
        let yaml = serde_yaml::to_string(&Archetype::ProofOfConcept).unwrap();
        assert_eq!(yaml.trim(), "PROOF_OF_CONCEPT");
        let parsed: Archetype = serde_yaml::from_str("JEE_APPLICATION").unwrap();
        assert_eq!(parsed, Archetype::JeeApplication);
    }

    #[test]
    fn test_matching_uses_all_three_fields() {
        let registry = ArchetypeRegistry::standard();
        let api = Coordinates::new(Some("com.example.foo.api"), Some("foo-api"), Some("jar"));
        assert_eq!(registry.matching(&api), vec![Archetype::Api]);

        let wrong_packaging = Coordinates::new(Some("com.example.foo.api"), Some("foo-api"), Some("pom"));
        assert!(registry.matching(&wrong_packaging).is_empty());
    }

    #[test]
    fn test_overrides_are_compiled_up_front() {
        let mut overrides = BTreeMap::new();
        overrides.insert(
            Archetype::Parent,
            PatternOverride { artifact_id: Some("(broken".to_string()), ..Default::default() },
        );
        let error = ArchetypeRegistry::with_overrides(&overrides).unwrap_err();
        assert!(error.to_string().contains("PARENT"));
    }

    #[test]
    fn test_describe() {
        let registry = ArchetypeRegistry::standard();
        assert_eq!(
            registry.describe(Archetype::Api),
            r"API - GroupIdRegex: .*\.api$, ArtifactIdRegex: .*-api$, PackagingRegex: bundle|jar"
        );
    }
}
