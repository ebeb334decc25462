//! Descriptor discovery in directory trees
//!
//! Architectural Principle: Service Layer - DescriptorFilter decides which files are descriptors
//! - A file qualifies when its name is one of the configured descriptor names
//! - Exclude globs are applied in order; a `!` prefix re-includes, like .gitignore
//! - Globs are matched against the path relative to the walk root and the full path

use crate::domain::violations::{EnforcerError, EnforcerResult};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Clone)]
pub struct DescriptorFilter {
    names: Vec<String>,
    patterns: Vec<FilterPattern>,
}

#[derive(Debug, Clone)]
struct FilterPattern {
    pattern: glob::Pattern,
    /// Pattern started with `!`
    is_include: bool,
}

impl FilterPattern {
    fn parse(raw: &str) -> EnforcerResult<Self> {
        let (is_include, source) = match raw.strip_prefix('!') {
            Some(stripped) => (true, stripped),
            None => (false, raw),
        };

        let pattern = glob::Pattern::new(source)
            .map_err(|e| EnforcerError::config(format!("Invalid exclude pattern '{source}': {e}")))?;

        Ok(Self { pattern, is_include })
    }
}

impl DescriptorFilter {
    pub fn new<S: AsRef<str>>(descriptor_names: &[S], exclude: &[S]) -> EnforcerResult<Self> {
        Ok(Self {
            names: descriptor_names.iter().map(|n| n.as_ref().to_string()).collect(),
            patterns: exclude.iter().map(|p| FilterPattern::parse(p.as_ref())).collect::<EnforcerResult<_>>()?,
        })
    }

    /// Add an exclude pattern after the configured ones
    pub fn add_pattern(&mut self, pattern: &str) -> EnforcerResult<()> {
        self.patterns.push(FilterPattern::parse(pattern)?);
        Ok(())
    }

    pub fn is_descriptor_name(&self, path: &Path) -> bool {
        path.file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| self.names.iter().any(|n| n == name))
    }

    /// Whether the exclude patterns, applied in order, leave the path excluded
    pub fn is_excluded(&self, path: &Path, root: Option<&Path>) -> bool {
        let full = path.to_string_lossy();
        let relative = root
            .and_then(|root| path.strip_prefix(root).ok())
            .map(|p| p.to_string_lossy().into_owned());

        let mut excluded = false;
        for filter in &self.patterns {
            let matches = filter.pattern.matches(&full)
                || relative.as_deref().is_some_and(|r| filter.pattern.matches(r));
            if matches {
                excluded = !filter.is_include;
            }
        }

        excluded
    }

    /// Whether an explicitly given file should be checked
    pub fn should_check(&self, path: &Path) -> bool {
        !self.is_excluded(path, None)
    }

    /// All descriptor files below `root`, sorted for stable output
    pub fn find_descriptors<P: AsRef<Path>>(&self, root: P) -> EnforcerResult<Vec<PathBuf>> {
        let root = root.as_ref();
        if !root.exists() {
            return Err(EnforcerError::validation(format!("Path does not exist: {}", root.display())));
        }

        let mut files: Vec<PathBuf> = WalkDir::new(root)
            .follow_links(false)
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    tracing::warn!("Skipping unreadable entry below {}: {}", root.display(), e);
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| entry.into_path())
            .filter(|path| self.is_descriptor_name(path) && !self.is_excluded(path, Some(root)))
            .collect();

        files.sort();
        tracing::debug!("Discovered {} descriptor(s) below {}", files.len(), root.display());
        Ok(files)
    }
}
