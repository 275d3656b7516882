use std::path::PathBuf;

use tracing::{debug, info};

use crate::assemble::OutputKind;
use crate::contract::{ContentPredicate, MatchFilterSpec, SnapshotError};
use crate::matcher::DEFAULT_MATCH_PATTERN;
use crate::render::RendererKind;
use crate::source::SourceAction;

/// One snapshot run: what to fetch, where to write, and how to select and render.
#[derive(Debug, Clone)]
pub struct SnapshotConfig {
    pub source: SourceAction,
    pub output_dir: PathBuf,
    pub options: SnapshotOptions,
}

impl SnapshotConfig {
    pub fn trace_loaded(&self) {
        info!(
            source = ?self.source,
            output_dir = %self.output_dir.display(),
            "Loaded SnapshotConfig"
        );
        self.options.trace_loaded();
    }
}

#[derive(Debug, Clone)]
pub struct SnapshotOptions {
    pub match_patterns: Vec<String>,
    pub ignore: Vec<String>,
    pub content: Vec<ContentPredicate>,
    /// Output base name; the repository name when `None`.
    pub filename: Option<String>,
    pub debug: bool,
    pub output: OutputKind,
    pub renderer: RendererKind,
}

impl Default for SnapshotOptions {
    fn default() -> Self {
        SnapshotOptions {
            match_patterns: vec![DEFAULT_MATCH_PATTERN.to_string()],
            ignore: vec![],
            content: vec![],
            filename: None,
            debug: false,
            output: OutputKind::Records,
            renderer: RendererKind::Plain,
        }
    }
}

impl SnapshotOptions {
    /// Document output can only be built from annotated renderings.
    pub fn validate(&self) -> Result<(), SnapshotError> {
        if self.output == OutputKind::Document && self.renderer == RendererKind::Plain {
            return Err(SnapshotError::AssemblerMismatch);
        }
        Ok(())
    }

    pub fn match_filter_spec(&self) -> MatchFilterSpec {
        MatchFilterSpec {
            include_patterns: self.match_patterns.clone(),
            exclude_patterns: self.ignore.clone(),
            content_predicates: self.content.clone(),
        }
    }

    pub fn output_name(&self, repository: &str) -> String {
        self.filename
            .clone()
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| repository.to_string())
    }

    pub fn trace_loaded(&self) {
        info!(
            match_patterns = ?self.match_patterns,
            ignore = ?self.ignore,
            content_predicates = self.content.len(),
            output = ?self.output,
            renderer = ?self.renderer,
            debug = self.debug,
            "Loaded SnapshotOptions"
        );
        debug!(?self, "SnapshotOptions loaded (full debug)");
    }
}
