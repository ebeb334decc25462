//! Domain layer for POM Guardian
//!
//! CDD Principle: Domain Model - Pure business logic for archetype enforcement
//! - Contains project coordinates, violations and validation reports
//! - Independent of descriptor formats, file systems and terminal output

pub mod project;
pub mod violations;

// Re-export main domain types for convenience
pub use project::*;
pub use violations::*;
