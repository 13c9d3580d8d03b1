use std::path::Path;

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PathFilterError {
    #[error("invalid ignore pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },
}

/// Skips files and directories whose base name matches any ignore pattern.
#[derive(Clone, Debug)]
pub struct PathFilter {
    patterns: GlobSet,
}

impl PathFilter {
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self, PathFilterError> {
        let mut builder = GlobSetBuilder::new();
        for pattern in patterns {
            let pattern = pattern.as_ref();
            // `*` must not cross a separator, matching shell-style name globs.
            let glob = GlobBuilder::new(pattern)
                .literal_separator(true)
                .build()
                .map_err(|source| PathFilterError::InvalidPattern {
                    pattern: pattern.to_string(),
                    source,
                })?;
            builder.add(glob);
        }
        let patterns = builder
            .build()
            .map_err(|source| PathFilterError::InvalidPattern {
                pattern: patterns
                    .iter()
                    .map(AsRef::as_ref)
                    .collect::<Vec<_>>()
                    .join(","),
                source,
            })?;
        Ok(Self { patterns })
    }

    #[must_use]
    pub fn allow_all() -> Self {
        Self {
            patterns: GlobSet::empty(),
        }
    }

    /// Paths without a base name, such as `.` or `/`, are never ignored.
    #[must_use]
    pub fn should_ignore(&self, path: &Path) -> bool {
        path.file_name()
            .is_some_and(|file_name| self.patterns.is_match(Path::new(file_name)))
    }
}

impl Default for PathFilter {
    fn default() -> Self {
        Self::allow_all()
    }
}
