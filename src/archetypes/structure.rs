//! Structural predicates for the pom-packaged archetypes
//!
//! Checked only after coordinates matched. Dependencies whose group-id matches one of
//! the ignore patterns do not count; a dependency without group-id always counts.

use super::Archetype;
use crate::domain::project::{Dependency, ProjectModel};
use crate::patterns::{any_matches, CoordinatePattern};

/// Check the archetype's structural predicate, returning the violation message on failure
pub fn check_structure(
    archetype: Archetype,
    project: &ProjectModel,
    ignore: &[CoordinatePattern],
) -> Result<(), String> {
    let name = archetype.name();

    match archetype {
        Archetype::Parent | Archetype::Assembly => {
            if !project.modules.is_empty() {
                return Err(format!(
                    "{name} projects may not contain module definitions. \
                     (Modules are reserved for reactor projects)."
                ));
            }
        }
        Archetype::BillOfMaterials => {
            if contains_non_ignored(&project.dependencies, ignore) {
                return Err(format!(
                    "{name} projects may not declare direct dependencies. \
                     (Dependencies should be defined within parent projects)."
                ));
            }
            if !contains_non_ignored(&project.dependency_management, ignore) {
                return Err(format!(
                    "{name} projects must declare at least one dependencyManagement entry."
                ));
            }
        }
        Archetype::Reactor => {
            if project.modules.is_empty() {
                return Err(format!("{name} projects must declare at least one module."));
            }
            if contains_non_ignored(&project.dependencies, ignore)
                || contains_non_ignored(&project.dependency_management, ignore)
            {
                return Err(format!(
                    "{name} projects may not contain dependency [incl. DependencyManagement] \
                     definitions. (Dependencies should be defined within parent projects)."
                ));
            }
        }
        _ => {}
    }

    Ok(())
}

/// Whether the archetype declares any structural predicate
pub fn has_structure_rules(archetype: Archetype) -> bool {
    structure_summary(archetype).is_some()
}

/// Plain-text summary of the structural predicate, for listings
pub fn structure_summary(archetype: Archetype) -> Option<&'static str> {
    match archetype {
        Archetype::Reactor => Some("at least one module; no dependencies or dependencyManagement entries"),
        Archetype::Parent | Archetype::Assembly => Some("no modules"),
        Archetype::BillOfMaterials => {
            Some("no direct dependencies; at least one dependencyManagement entry")
        }
        _ => None,
    }
}

fn contains_non_ignored(dependencies: &[Dependency], ignore: &[CoordinatePattern]) -> bool {
    dependencies.iter().any(|d| !any_matches(ignore, d.group_id.as_deref()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generated_ignore() -> Vec<CoordinatePattern> {
        CoordinatePattern::group_ids(&[r"^com\.example\..*\.generated\..*"]).unwrap()
    }

    #[test]
    fn test_parent_with_modules_fails() {
        let project = ProjectModel::new("com.example.foo", "foo-parent", "pom").with_module("foo-api");
        let message = check_structure(Archetype::Parent, &project, &[]).unwrap_err();
        assert!(message.starts_with("PARENT projects may not contain module definitions"));
    }

    #[test]
    fn test_bom_ignored_dependencies_do_not_count() {
        let project = ProjectModel::new("com.example.foo", "foo-bom", "pom")
            .with_dependency(Dependency::new("com.example.foo.generated.model", "foo-gen"))
            .with_managed_dependency(Dependency::new("com.example.foo.api", "foo-api"));

        assert!(check_structure(Archetype::BillOfMaterials, &project, &generated_ignore()).is_ok());
        assert!(check_structure(Archetype::BillOfMaterials, &project, &[]).is_err());
    }

    #[test]
    fn test_bom_requires_management_entries() {
        let project = ProjectModel::new("com.example.foo", "foo-bom", "pom");
        let message = check_structure(Archetype::BillOfMaterials, &project, &[]).unwrap_err();
        assert!(message.contains("at least one dependencyManagement entry"));
    }

    #[test]
    fn test_dependency_without_group_id_is_never_ignored() {
        let mut anonymous = Dependency::new("x", "y");
        anonymous.group_id = None;
        let project = ProjectModel::new("com.example", "foo-reactor", "pom")
            .with_module("foo-api")
            .with_dependency(anonymous);

        assert!(check_structure(Archetype::Reactor, &project, &generated_ignore()).is_err());
    }

    #[test]
    fn test_reactor_rules() {
        let empty = ProjectModel::new("com.example", "foo-reactor", "pom");
        assert!(check_structure(Archetype::Reactor, &empty, &[])
            .unwrap_err()
            .contains("at least one module"));

        let managed = ProjectModel::new("com.example", "foo-reactor", "pom")
            .with_module("foo-api")
            .with_managed_dependency(Dependency::new("com.example.foo.api", "foo-api"));
        assert!(check_structure(Archetype::Reactor, &managed, &[])
            .unwrap_err()
            .contains("[incl. DependencyManagement]"));

        let clean = ProjectModel::new("com.example", "foo-reactor", "pom").with_module("foo-api");
        assert!(check_structure(Archetype::Reactor, &clean, &[]).is_ok());
    }

    #[test]
    fn test_other_archetypes_have_no_predicates() {
        let project = ProjectModel::new("com.example.foo.api", "foo-api", "jar").with_module("odd");
        assert!(check_structure(Archetype::Api, &project, &[]).is_ok());
        assert!(!has_structure_rules(Archetype::Api));
        assert!(has_structure_rules(Archetype::Assembly));
    }
}
