//! Classification of projects and dependencies into exactly one archetype
//!
//! Architecture: Domain Service - the classifier never breaks ties
//! - Zero or several coordinate matches are failures carried in the result
//! - A single match with a failing structural predicate is an inexact result

use crate::archetypes::{check_structure, Archetype, ArchetypeRegistry};
use crate::domain::project::{Coordinates, ProjectModel};
use crate::patterns::CoordinatePattern;
use serde::Serialize;
use std::fmt;

/// Outcome of classifying one set of coordinates
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Classification {
    /// Exactly one archetype matched and its structure is valid
    Exact { archetype: Archetype },
    /// Exactly one archetype matched, but its structural predicate failed
    Inexact { best_guess: Archetype, message: String },
    /// Several archetypes matched
    Ambiguous { coordinates: Coordinates, matches: Vec<Archetype> },
    /// No archetype matched
    NoMatch { coordinates: Coordinates },
}

impl Classification {
    pub fn is_exact(&self) -> bool {
        matches!(self, Self::Exact { .. })
    }

    /// The authoritative archetype; only exact results have one
    pub fn archetype(&self) -> Option<Archetype> {
        match self {
            Self::Exact { archetype } => Some(*archetype),
            _ => None,
        }
    }

    /// Exact archetype or the best guess of an inexact result
    pub fn best_guess(&self) -> Option<Archetype> {
        match self {
            Self::Exact { archetype } => Some(*archetype),
            Self::Inexact { best_guess, .. } => Some(*best_guess),
            Self::Ambiguous { .. } | Self::NoMatch { .. } => None,
        }
    }

    /// Zero or several matches
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Ambiguous { .. } | Self::NoMatch { .. })
    }

    /// Diagnostic text for every non-exact outcome
    pub fn failure_message(&self) -> Option<String> {
        match self {
            Self::Exact { .. } => None,
            Self::Inexact { message, .. } => Some(message.clone()),
            Self::Ambiguous { coordinates, matches } => Some(format!(
                "Incorrect project type definition for [{coordinates}]: \
                 Matching several archetypes ({}).",
                matches.iter().map(|a| a.name()).collect::<Vec<_>>().join(", ")
            )),
            Self::NoMatch { coordinates } => Some(format!(
                "Incorrect project type definition for [{coordinates}]: Not matching any archetype."
            )),
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact { archetype } => write!(f, "{archetype}"),
            Self::Inexact { best_guess, message } => write!(f, "{best_guess} (inexact: {message})"),
            Self::Ambiguous { .. } | Self::NoMatch { .. } => {
                f.write_str(&self.failure_message().unwrap_or_default())
            }
        }
    }
}

/// Resolves coordinates against a registry
#[derive(Debug, Clone, Copy)]
pub struct Classifier<'a> {
    registry: &'a ArchetypeRegistry,
}

impl<'a> Classifier<'a> {
    pub fn new(registry: &'a ArchetypeRegistry) -> Self {
        Self { registry }
    }

    /// Classify by coordinates only; used for dependencies, never yields `Inexact`
    pub fn classify_coordinates(&self, coordinates: &Coordinates) -> Classification {
        let mut matches = self.registry.matching(coordinates);

        let classification = match matches.len() {
            0 => Classification::NoMatch { coordinates: coordinates.clone() },
            1 => Classification::Exact { archetype: matches.remove(0) },
            _ => Classification::Ambiguous { coordinates: coordinates.clone(), matches },
        };

        tracing::debug!("Classified {} as {}", coordinates, classification);
        classification
    }

    /// Classify a project, running the matched archetype's structural predicate
    pub fn classify_project(
        &self,
        project: &ProjectModel,
        ignore: &[CoordinatePattern],
    ) -> Classification {
        match self.classify_coordinates(&project.coordinates()) {
            Classification::Exact { archetype } => match check_structure(archetype, project, ignore) {
                Ok(()) => Classification::Exact { archetype },
                Err(message) => {
                    tracing::debug!(
                        "Project {} matched {} but failed its structure rules: {}",
                        project.gav(),
                        archetype,
                        message
                    );
                    Classification::Inexact { best_guess: archetype, message }
                }
            },
            other => other,
        }
    }
}
