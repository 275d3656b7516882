//! # contract: shared data model and collaborator seams
//!
//! This module defines the plain data flowing through the snapshot pipeline
//! (`FileRecord`, `RenderedContent`, `MatchFilterSpec`, `PipelineResult`) and the two
//! traits the pipeline depends on but does not implement itself:
//!
//! - [`RepositorySource`]: enumerates candidate paths of a materialised working tree and reads them.
//! - [`Acquirer`]: materialises a declared source (git clone, local directory) and owns its teardown.
//!
//! ## Mocking & Testing
//! - Both traits are annotated for `mockall`, exported behind the `test-export-mocks` feature,
//!   so integration tests can simulate unreadable files and failed clones deterministically.
//!
//! ## Errors
//! - Every fallible operation in the crate returns [`SnapshotError`].
//! - Per-file read failures are NOT errors at this level: they surface as
//!   [`crate::pipeline::FileOutcome::Skipped`] and never abort a run.

use async_trait::async_trait;
use mockall::automock;
use regex::Regex;
use serde::Serialize;

use crate::source::{AcquiredRepository, SourceAction};

/// A repository-relative, `/`-separated file path as produced by enumeration.
pub type CandidatePath = String;

/// One retained file. Serialises as the record-list artifact `{path, extension, content}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileRecord {
    pub path: CandidatePath,
    #[serde(rename = "extension")]
    pub type_tag: String,
    #[serde(rename = "content")]
    pub raw_content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rendered: Option<RenderedContent>,
}

/// Final textual form of a file's content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum RenderedContent {
    /// The original text, untouched.
    Plain { text: String },
    /// Highlighted markup plus the type tag that selected the ruleset.
    Annotated { markup: String, type_tag: String },
}

impl RenderedContent {
    pub fn is_annotated(&self) -> bool {
        matches!(self, RenderedContent::Annotated { .. })
    }
}

/// A single content predicate: a literal with `*`/`**` wildcards, or a compiled pattern.
#[derive(Debug, Clone)]
pub enum ContentPredicate {
    Literal(String),
    Pattern(Regex),
}

impl ContentPredicate {
    /// Compiles a user supplied regular expression into a [`ContentPredicate::Pattern`].
    pub fn pattern(expression: &str) -> Result<Self, SnapshotError> {
        Regex::new(expression)
            .map(ContentPredicate::Pattern)
            .map_err(|e| SnapshotError::InvalidContentPattern {
                pattern: expression.to_string(),
                message: e.to_string(),
            })
    }
}

impl From<&str> for ContentPredicate {
    fn from(literal: &str) -> Self {
        ContentPredicate::Literal(literal.to_string())
    }
}

/// Selection rules for one pipeline run. Immutable for the run's duration.
#[derive(Debug, Clone, Default)]
pub struct MatchFilterSpec {
    pub include_patterns: Vec<String>,
    pub exclude_patterns: Vec<String>,
    pub content_predicates: Vec<ContentPredicate>,
}

/// Terminal output of a run; ownership moves to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineResult {
    Records(Vec<FileRecord>),
    Document {
        document: String,
        included_paths: Vec<CandidatePath>,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("invalid path pattern `{pattern}`: {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("invalid content pattern `{pattern}`: {message}")]
    InvalidContentPattern { pattern: String, message: String },

    #[error("failed to acquire repository {repository}: {message}")]
    Acquisition { repository: String, message: String },

    #[error("failed to enumerate files under {root}: {message}")]
    Enumeration { root: String, message: String },

    #[error("document output requires the annotated renderer, but the plain renderer was configured")]
    AssemblerMismatch,

    #[error("failed to write output {path}: {source}")]
    Output {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// A fully materialised, readable file tree.
///
/// Implementors own traversal; the pipeline only consumes the enumerated paths in order
/// and asks for their content one at a time.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
pub trait RepositorySource: Send + Sync {
    /// Ordered candidate paths selected by the include/exclude patterns.
    fn enumerate(
        &self,
        include: &[String],
        exclude: &[String],
    ) -> Result<Vec<CandidatePath>, SnapshotError>;

    /// Reads one candidate as UTF-8 text.
    fn read_to_string(&self, path: &str) -> std::io::Result<String>;
}

/// Materialises a declared source before the pipeline runs.
/// The returned [`AcquiredRepository`] removes any temporary tree it owns when cleaned up or dropped.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait Acquirer: Send + Sync {
    async fn acquire(&self, source: &SourceAction) -> Result<AcquiredRepository, SnapshotError>;
}
