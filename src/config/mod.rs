//! Configuration loading and management for pom-guardian
//!
//! Architecture: Anti-Corruption Layer - Configuration translates external YAML formats
//! - Raw YAML structures are converted into compiled registries and rules
//! - Default group-id lists and archetype sets live in the rules, not here
//! - Every pattern is compiled during validation so bad input fails before any check runs

use crate::archetypes::{Archetype, ArchetypeRegistry, PatternOverride};
use crate::descriptor::DescriptorFilter;
use crate::domain::violations::{EnforcerError, EnforcerResult, Severity};
use crate::rules::dependencies::DEFAULT_IGNORED_ARCHETYPES;
use crate::rules::{
    to_strings, ComplianceOptions, ComplianceRule, CorrectPackagingRule, DependencyCheckOptions,
    DependencyLegalityChecker, EnforcerRule, PackagingOptions, DEFAULT_EVALUATE_GROUP_IDS,
    DEFAULT_IGNORE_GROUP_IDS,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// File names probed, in order, when no configuration path is given
pub const CONFIG_FILE_NAMES: &[&str] = &["pom_guardian.yaml", "pom_guardian.yml", ".pom_guardian.yaml"];

const SUPPORTED_VERSIONS: &[&str] = &["1.0"];

/// Main configuration structure for pom-guardian
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EnforcerConfig {
    /// Configuration format version
    pub version: String,
    #[serde(default)]
    pub group_ids: GroupIdConfig,
    #[serde(default)]
    pub rules: RulesConfig,
    /// Pattern overrides keyed by archetype name
    #[serde(default)]
    pub archetypes: BTreeMap<Archetype, PatternOverride>,
    #[serde(default)]
    pub paths: PathConfig,
}

/// Group-id patterns deciding which projects and dependencies are evaluated
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupIdConfig {
    pub evaluate: Vec<String>,
    pub ignore: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    pub correct_dependencies: CorrectDependenciesConfig,
    pub permitted_archetype: PermittedArchetypeConfig,
    pub correct_packaging: CorrectPackagingConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct CorrectDependenciesConfig {
    pub enabled: bool,
    pub severity: Severity,
    /// Project archetypes whose dependencies are not checked
    pub ignored_archetypes: Vec<Archetype>,
    pub require_spi_api_dependency: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct PermittedArchetypeConfig {
    pub enabled: bool,
    pub severity: Severity,
    /// Empty means every archetype in the registry
    pub permitted_archetypes: Vec<Archetype>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct CorrectPackagingConfig {
    pub enabled: bool,
    pub severity: Severity,
}

/// Descriptor discovery configuration
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct PathConfig {
    /// File names recognised as project descriptors
    pub descriptor_names: Vec<String>,
    /// Glob patterns excluded from discovery
    pub exclude: Vec<String>,
}

impl Default for GroupIdConfig {
    fn default() -> Self {
        Self {
            evaluate: to_strings(DEFAULT_EVALUATE_GROUP_IDS),
            ignore: to_strings(DEFAULT_IGNORE_GROUP_IDS),
        }
    }
}

impl Default for CorrectDependenciesConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            severity: Severity::Error,
            ignored_archetypes: DEFAULT_IGNORED_ARCHETYPES.to_vec(),
            require_spi_api_dependency: false,
        }
    }
}

impl Default for PermittedArchetypeConfig {
    fn default() -> Self {
        Self { enabled: true, severity: Severity::Error, permitted_archetypes: Vec::new() }
    }
}

impl Default for CorrectPackagingConfig {
    fn default() -> Self {
        Self { enabled: true, severity: Severity::Error }
    }
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            descriptor_names: to_strings(&["project.yaml", "project.yml", "project.json"]),
            exclude: to_strings(&["**/target/**", "**/node_modules/**", "**/.git/**"]),
        }
    }
}

impl EnforcerConfig {
    /// Load configuration from a YAML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> EnforcerResult<Self> {
        let contents = fs::read_to_string(&path).map_err(|e| {
            EnforcerError::config(format!(
                "Failed to read config file '{}': {}",
                path.as_ref().display(),
                e
            ))
        })?;

        let config: Self = serde_yaml::from_str(&contents).map_err(|e| {
            EnforcerError::config(format!(
                "Failed to parse config file '{}': {}",
                path.as_ref().display(),
                e
            ))
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from string content
    pub fn load_from_str(content: &str) -> EnforcerResult<Self> {
        let config: Self = serde_yaml::from_str(content)
            .map_err(|e| EnforcerError::config(format!("Failed to parse config: {e}")))?;

        config.validate()?;
        Ok(config)
    }

    /// First well-known configuration file present in `dir`
    pub fn discover<P: AsRef<Path>>(dir: P) -> Option<PathBuf> {
        CONFIG_FILE_NAMES.iter().map(|name| dir.as_ref().join(name)).find(|path| path.is_file())
    }

    pub fn with_defaults() -> Self {
        Self {
            version: "1.0".to_string(),
            group_ids: GroupIdConfig::default(),
            rules: RulesConfig::default(),
            archetypes: BTreeMap::new(),
            paths: PathConfig::default(),
        }
    }

    /// Validate the configuration by compiling everything it contains
    pub fn validate(&self) -> EnforcerResult<()> {
        if !SUPPORTED_VERSIONS.contains(&self.version.as_str()) {
            return Err(EnforcerError::config(format!(
                "Unsupported configuration version: {}. Supported versions: {}",
                self.version,
                SUPPORTED_VERSIONS.join(", ")
            )));
        }

        if self.paths.descriptor_names.is_empty() {
            return Err(EnforcerError::config("paths.descriptor_names may not be empty"));
        }

        self.descriptor_filter()?;
        self.build_rules()?;
        Ok(())
    }

    /// Discovery filter built from `paths`
    pub fn descriptor_filter(&self) -> EnforcerResult<DescriptorFilter> {
        DescriptorFilter::new(&self.paths.descriptor_names, &self.paths.exclude)
    }

    /// Registry with the configured overrides applied
    pub fn registry(&self) -> EnforcerResult<Arc<ArchetypeRegistry>> {
        if self.archetypes.is_empty() {
            Ok(ArchetypeRegistry::standard())
        } else {
            Ok(Arc::new(ArchetypeRegistry::with_overrides(&self.archetypes)?))
        }
    }

    pub fn dependency_options(&self) -> DependencyCheckOptions {
        let rule = &self.rules.correct_dependencies;
        DependencyCheckOptions {
            evaluate_group_ids: self.group_ids.evaluate.clone(),
            ignore_group_ids: self.group_ids.ignore.clone(),
            ignored_archetypes: rule.ignored_archetypes.clone(),
            require_spi_api_dependency: rule.require_spi_api_dependency,
            severity: rule.severity,
        }
    }

    pub fn compliance_options(&self) -> ComplianceOptions {
        let rule = &self.rules.permitted_archetype;
        let permitted_archetypes = if rule.permitted_archetypes.is_empty() {
            Archetype::ALL.to_vec()
        } else {
            rule.permitted_archetypes.clone()
        };

        ComplianceOptions {
            permitted_archetypes,
            ignore_group_ids: self.group_ids.ignore.clone(),
            severity: rule.severity,
        }
    }

    pub fn packaging_options(&self) -> PackagingOptions {
        PackagingOptions { severity: self.rules.correct_packaging.severity }
    }

    /// Compile every enabled rule against one shared registry
    pub fn build_rules(&self) -> EnforcerResult<Vec<Box<dyn EnforcerRule>>> {
        let registry = self.registry()?;
        let mut rules: Vec<Box<dyn EnforcerRule>> = Vec::new();

        if self.rules.permitted_archetype.enabled {
            rules.push(Box::new(ComplianceRule::with_registry(
                Arc::clone(&registry),
                &self.compliance_options(),
            )?));
        }

        if self.rules.correct_dependencies.enabled {
            rules.push(Box::new(DependencyLegalityChecker::with_registry(
                Arc::clone(&registry),
                &self.dependency_options(),
            )?));
        }

        if self.rules.correct_packaging.enabled {
            rules.push(Box::new(CorrectPackagingRule::new(&self.packaging_options())));
        }

        Ok(rules)
    }

    /// Convert to JSON for serialization
    pub fn to_json(&self) -> EnforcerResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| EnforcerError::config(format!("Failed to serialize config: {e}")))
    }

    /// Stable hash of the effective configuration, recorded in reports
    pub fn fingerprint(&self) -> String {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut hasher = DefaultHasher::new();
        self.hash(&mut hasher);
        format!("{:x}", hasher.finish())
    }
}

impl Default for EnforcerConfig {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Configuration builder for programmatic construction
pub struct ConfigBuilder {
    config: EnforcerConfig,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self { config: EnforcerConfig::default() }
    }

    /// Replace the evaluated group-id patterns
    pub fn evaluate_group_ids<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.group_ids.evaluate = patterns.into_iter().map(Into::into).collect();
        self
    }

    pub fn add_ignored_group_id(mut self, pattern: impl Into<String>) -> Self {
        self.config.group_ids.ignore.push(pattern.into());
        self
    }

    pub fn permitted_archetypes(mut self, archetypes: &[Archetype]) -> Self {
        self.config.rules.permitted_archetype.permitted_archetypes = archetypes.to_vec();
        self
    }

    pub fn ignored_archetypes(mut self, archetypes: &[Archetype]) -> Self {
        self.config.rules.correct_dependencies.ignored_archetypes = archetypes.to_vec();
        self
    }

    pub fn require_spi_api_dependency(mut self, required: bool) -> Self {
        self.config.rules.correct_dependencies.require_spi_api_dependency = required;
        self
    }

    pub fn override_archetype(mut self, archetype: Archetype, replacement: PatternOverride) -> Self {
        self.config.archetypes.insert(archetype, replacement);
        self
    }

    pub fn add_exclude_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.config.paths.exclude.push(pattern.into());
        self
    }

    /// Build the final configuration
    pub fn build(self) -> EnforcerResult<EnforcerConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
