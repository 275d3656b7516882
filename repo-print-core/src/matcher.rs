//! Include/exclude path selection over repository-relative paths.

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};

use crate::contract::SnapshotError;

/// Used when no include pattern is configured: every file with an extension.
pub const DEFAULT_MATCH_PATTERN: &str = "**/*.*";

/// Compiled include/exclude pattern sets.
///
/// A path is selected when it matches at least one include pattern and none of the
/// exclude patterns. `*` is loose and may cross `/`, except in [`DEFAULT_MATCH_PATTERN`],
/// whose `*.*` must match within the file name.
#[derive(Debug, Clone)]
pub struct PathMatcher {
    include: GlobSet,
    exclude: GlobSet,
}

impl PathMatcher {
    pub fn new(include: &[String], exclude: &[String]) -> Result<Self, SnapshotError> {
        let include = if include.is_empty() {
            build_set(&[DEFAULT_MATCH_PATTERN.to_string()])?
        } else {
            build_set(include)?
        };
        Ok(Self {
            include,
            exclude: build_set(exclude)?,
        })
    }

    pub fn matches(&self, path: &str) -> bool {
        self.include.is_match(path) && !self.exclude.is_match(path)
    }
}

fn build_set(patterns: &[String]) -> Result<GlobSet, SnapshotError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = GlobBuilder::new(&normalise_pattern(pattern))
            .literal_separator(pattern == DEFAULT_MATCH_PATTERN)
            .build()
            .map_err(|e| SnapshotError::InvalidPattern {
                pattern: pattern.clone(),
                message: e.to_string(),
            })?;
        builder.add(glob);
    }
    builder.build().map_err(|e| SnapshotError::InvalidPattern {
        pattern: patterns.join(", "),
        message: e.to_string(),
    })
}

/// Collapses a `**` that is not a whole path component (`lib/**.js`) into `*`.
fn normalise_pattern(pattern: &str) -> String {
    pattern
        .split('/')
        .map(|component| {
            let mut component = component.to_string();
            if component != "**" {
                while component.contains("**") {
                    component = component.replace("**", "*");
                }
            }
            component
        })
        .collect::<Vec<_>>()
        .join("/")
}
