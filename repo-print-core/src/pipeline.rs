//! File selection and rendering pipeline.
//!
//! For every candidate path, in enumeration order:
//!   1. path match (include/exclude),
//!   2. read as UTF-8 text,
//!   3. content filter,
//!   4. classify,
//!   5. render,
//!   6. append a [`FileRecord`].
//!
//! Each file ends in exactly one [`FileOutcome`]. A skipped file never aborts the run and is
//! never retried within it.

use tracing::{debug, info, warn};

use crate::classify::classify;
use crate::content_filter::ContentFilter;
use crate::contract::{CandidatePath, FileRecord, MatchFilterSpec, RepositorySource, SnapshotError};
use crate::matcher::PathMatcher;
use crate::render::{Renderer, RendererKind};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    PathMismatch,
    /// The file could not be read or decoded as UTF-8.
    Unreadable(String),
    ContentMismatch,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    Kept(FileRecord),
    Skipped { path: CandidatePath, reason: SkipReason },
}

pub struct PipelineRunner {
    matcher: PathMatcher,
    filter: ContentFilter,
    renderer: Box<dyn Renderer>,
    debug: bool,
}

impl PipelineRunner {
    /// Compiles the selection rules once; invalid patterns fail here, before any file is touched.
    pub fn new(
        spec: &MatchFilterSpec,
        renderer: Box<dyn Renderer>,
        debug: bool,
    ) -> Result<Self, SnapshotError> {
        Ok(Self {
            matcher: PathMatcher::new(&spec.include_patterns, &spec.exclude_patterns)?,
            filter: ContentFilter::new(&spec.content_predicates)?,
            renderer,
            debug,
        })
    }

    pub fn renderer_kind(&self) -> RendererKind {
        self.renderer.kind()
    }

    pub fn run<S>(&self, source: &S, candidates: &[CandidatePath]) -> Vec<FileRecord>
    where
        S: RepositorySource + ?Sized,
    {
        info!(
            candidates = candidates.len(),
            renderer = ?self.renderer.kind(),
            "Starting pipeline run"
        );
        let mut records = Vec::new();
        let mut skipped = 0usize;
        for path in candidates {
            match self.process_file(source, path) {
                FileOutcome::Kept(record) => records.push(record),
                FileOutcome::Skipped { .. } => skipped += 1,
            }
        }
        info!(matched = records.len(), skipped, "Pipeline run complete");
        records
    }

    pub fn process_file<S>(&self, source: &S, path: &str) -> FileOutcome
    where
        S: RepositorySource + ?Sized,
    {
        if self.debug {
            info!(path, "Processing file");
        }

        if !self.matcher.matches(path) {
            debug!(path, "Skipping file: path does not match");
            return skip(path, SkipReason::PathMismatch);
        }

        let content = match source.read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                if self.debug {
                    warn!(path, error = %e, "Skipping unreadable file");
                } else {
                    debug!(path, error = %e, "Skipping unreadable file");
                }
                return skip(path, SkipReason::Unreadable(e.to_string()));
            }
        };

        if !self.filter.accepts(&content) {
            debug!(path, "Skipping file: content filter rejected it");
            return skip(path, SkipReason::ContentMismatch);
        }

        let type_tag = classify(path);
        let rendered = self.renderer.render(&content, &type_tag);
        FileOutcome::Kept(FileRecord {
            path: path.to_string(),
            type_tag,
            raw_content: content,
            rendered: Some(rendered),
        })
    }
}

fn skip(path: &str, reason: SkipReason) -> FileOutcome {
    FileOutcome::Skipped {
        path: path.to_string(),
        reason,
    }
}
