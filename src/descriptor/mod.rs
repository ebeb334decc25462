//! Project descriptor loading
//!
//! Architecture: Anti-Corruption Layer - descriptors are read from neutral YAML or JSON
//! documents using Maven's camelCase keys and turned into `ProjectModel`s
//! - The format follows the file extension; unknown extensions are read as YAML
//! - Parse failures carry the file name so they can be reported per descriptor

pub mod discovery;

pub use discovery::DescriptorFilter;

use crate::domain::project::ProjectModel;
use crate::domain::violations::{EnforcerError, EnforcerResult};
use std::path::Path;

/// Serialization format of a descriptor file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DescriptorFormat {
    Yaml,
    Json,
}

impl DescriptorFormat {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Yaml,
        }
    }
}

/// Parse descriptor content; `origin` names the source in error messages
pub fn parse_descriptor(
    content: &str,
    format: DescriptorFormat,
    origin: &str,
) -> EnforcerResult<ProjectModel> {
    match format {
        DescriptorFormat::Yaml => serde_yaml::from_str(content)
            .map_err(|e| EnforcerError::descriptor(origin, format!("Invalid YAML descriptor: {e}"))),
        DescriptorFormat::Json => serde_json::from_str(content)
            .map_err(|e| EnforcerError::descriptor(origin, format!("Invalid JSON descriptor: {e}"))),
    }
}

/// Read and parse a descriptor file
pub fn load_descriptor<P: AsRef<Path>>(path: P) -> EnforcerResult<ProjectModel> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| {
        EnforcerError::descriptor(path.display().to_string(), format!("Failed to read file: {e}"))
    })?;

    parse_descriptor(&content, DescriptorFormat::from_path(path), &path.display().to_string())
}

/// Read and parse a descriptor file without blocking the runtime
pub async fn load_descriptor_async<P: AsRef<Path>>(path: P) -> EnforcerResult<ProjectModel> {
    let path = path.as_ref();
    let content = tokio::fs::read_to_string(path).await.map_err(|e| {
        EnforcerError::descriptor(path.display().to_string(), format!("Failed to read file: {e}"))
    })?;

    parse_descriptor(&content, DescriptorFormat::from_path(path), &path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(DescriptorFormat::from_path(Path::new("a/project.json")), DescriptorFormat::Json);
        assert_eq!(DescriptorFormat::from_path(Path::new("a/project.JSON")), DescriptorFormat::Json);
        assert_eq!(DescriptorFormat::from_path(Path::new("a/project.yml")), DescriptorFormat::Yaml);
        assert_eq!(DescriptorFormat::from_path(Path::new("a/descriptor")), DescriptorFormat::Yaml);
    }

    #[test]
    fn test_load_json_descriptor() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("project.json");
        fs::write(
            &path,
            r#"{
  "groupId": "com.example.foo",
  "artifactId": "foo-reactor",
  "packaging": "pom",
  "modules": ["foo-api", "foo-model"]
}"#,
        )
        .unwrap();

        let project = load_descriptor(&path).unwrap();
        assert_eq!(project.modules.len(), 2);
        assert_eq!(project.gav(), "com.example.foo:foo-reactor:pom");
    }

    #[test]
    fn test_invalid_descriptor_names_the_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("project.yaml");
        fs::write(&path, "dependencies: {not: [a, list]").unwrap();

        match load_descriptor(&path).unwrap_err() {
            EnforcerError::Descriptor { file, message } => {
                assert!(file.ends_with("project.yaml"));
                assert!(message.starts_with("Invalid YAML descriptor"));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_missing_file_is_descriptor_error() {
        let error = load_descriptor("/nonexistent/project.yaml").unwrap_err();
        assert!(matches!(error, EnforcerError::Descriptor { .. }));
    }

    #[tokio::test]
    async fn test_async_load_matches_sync_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("project.yaml");
        fs::write(
            &path,
            "groupId: com.example.foo.api\nartifactId: foo-api\ndependencies:\n  - groupId: com.example.foo.model\n    artifactId: foo-model\n    scope: compile\n",
        )
        .unwrap();

        let sync = load_descriptor(&path).unwrap();
        let asynchronous = load_descriptor_async(&path).await.unwrap();
        assert_eq!(sync, asynchronous);
        assert_eq!(asynchronous.coordinates().packaging(), Some("jar"));
    }
}
