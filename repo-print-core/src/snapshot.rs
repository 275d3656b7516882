//! High-level pipeline: orchestrates acquire → enumerate → select/render → assemble → write.
//!
//! This module provides the top-level orchestration for one snapshot of one repository:
//!   - Validates the options (patterns, renderer/assembler pairing) before any I/O happens
//!   - Acquires the source through an [`Acquirer`] (git clone or local directory)
//!   - Enumerates candidates and runs the [`PipelineRunner`] over them in order
//!   - Assembles the records into a [`PipelineResult`] and writes the artifact files
//!   - Removes temporary clones whether or not the later steps succeeded
//!
//! # Error Handling
//! Acquisition, enumeration and output failures are fatal and returned to the caller.
//! Per-file read failures are not: those files are skipped and the run continues.
//! Nothing is written unless the whole result was assembled.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{error, info};

use crate::config::{SnapshotConfig, SnapshotOptions};
use crate::contract::{Acquirer, CandidatePath, PipelineResult, RepositorySource, SnapshotError};
use crate::pipeline::PipelineRunner;

/// Summary of a finished snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotReport {
    pub repository: String,
    pub candidates: usize,
    pub matched: usize,
    pub artifacts: Vec<PathBuf>,
}

/// The in-memory result of processing one source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotOutput {
    pub candidates: Vec<CandidatePath>,
    pub result: PipelineResult,
}

impl SnapshotOutput {
    pub fn matched(&self) -> usize {
        match &self.result {
            PipelineResult::Records(records) => records.len(),
            PipelineResult::Document { included_paths, .. } => included_paths.len(),
        }
    }
}

/// Builds the runner for `options`; fails on configuration errors only.
pub fn prepare(options: &SnapshotOptions) -> Result<PipelineRunner, SnapshotError> {
    options.validate().map_err(|e| {
        error!(error = %e, "Rejected snapshot options");
        e
    })?;
    PipelineRunner::new(
        &options.match_filter_spec(),
        options.renderer.build(),
        options.debug,
    )
}

/// Enumerates, processes and assembles one already materialised source.
pub fn process_source<S>(
    source: &S,
    runner: &PipelineRunner,
    options: &SnapshotOptions,
) -> Result<SnapshotOutput, SnapshotError>
where
    S: RepositorySource + ?Sized,
{
    let candidates = source.enumerate(&options.match_patterns, &options.ignore)?;
    info!(total = candidates.len(), "Processing candidate files");
    let records = runner.run(source, &candidates);
    let result = options
        .output
        .assembler(candidates.clone())
        .assemble(records)?;
    Ok(SnapshotOutput { candidates, result })
}

/// Writes the artifact(s) for `result` into `output_dir`, named from `name`.
///
/// Records mode writes `<name>.json`; document mode writes `<name>.html` and the matched
/// paths as `<name>.json`. Both are serialised before anything is written, and the HTML is
/// removed again if the JSON cannot be written.
pub fn write_artifacts(
    output_dir: &Path,
    name: &str,
    result: &PipelineResult,
) -> Result<Vec<PathBuf>, SnapshotError> {
    fs::create_dir_all(output_dir).map_err(|e| output_error(output_dir, e))?;
    let json_path = output_dir.join(format!("{name}.json"));
    match result {
        PipelineResult::Records(records) => {
            write_file(&json_path, &serde_json::to_string_pretty(records)?)?;
            Ok(vec![json_path])
        }
        PipelineResult::Document {
            document,
            included_paths,
        } => {
            let html_path = output_dir.join(format!("{name}.html"));
            let paths_json = serde_json::to_string_pretty(included_paths)?;
            write_file(&html_path, document)?;
            if let Err(e) = write_file(&json_path, &paths_json) {
                if let Err(remove_err) = fs::remove_file(&html_path) {
                    error!(error = ?remove_err, path = %html_path.display(), "Failed to remove partial document");
                }
                return Err(e);
            }
            Ok(vec![html_path, json_path])
        }
    }
}

fn write_file(path: &Path, contents: &str) -> Result<(), SnapshotError> {
    fs::write(path, contents).map_err(|e| output_error(path, e))?;
    info!(path = %path.display(), bytes = contents.len(), "Wrote output artifact");
    Ok(())
}

fn output_error(path: &Path, source: std::io::Error) -> SnapshotError {
    error!(error = ?source, path = %path.display(), "Failed to write output");
    SnapshotError::Output {
        path: path.display().to_string(),
        source,
    }
}

/// Entrypoint: snapshot one repository according to `config`.
pub async fn snapshot<A>(config: &SnapshotConfig, acquirer: &A) -> Result<SnapshotReport, SnapshotError>
where
    A: Acquirer + ?Sized,
{
    info!(source = ?config.source, "[SNAPSHOT] Starting snapshot");
    let runner = prepare(&config.options)?;

    let repository = acquirer.acquire(&config.source).await.map_err(|e| {
        error!(error = %e, "[SNAPSHOT][ERROR] Acquisition failed");
        e
    })?;
    info!(name = %repository.name, root = %repository.root.display(), "[SNAPSHOT] Repository acquired");

    let name = config.options.output_name(&repository.name);
    let outcome = process_source(&repository.source(), &runner, &config.options).and_then(|output| {
        let artifacts = write_artifacts(&config.output_dir, &name, &output.result)?;
        Ok(SnapshotReport {
            repository: repository.name.clone(),
            candidates: output.candidates.len(),
            matched: output.matched(),
            artifacts,
        })
    });

    if let Err(e) = repository.cleanup() {
        error!(error = %e, "[SNAPSHOT] Failed to clean up acquired repository");
    }

    match &outcome {
        Ok(report) => info!(
            matched = report.matched,
            candidates = report.candidates,
            output_dir = %config.output_dir.display(),
            "[SNAPSHOT] Snapshot complete"
        ),
        Err(e) => error!(error = %e, "[SNAPSHOT][ERROR] Snapshot failed"),
    }
    outcome
}
