/// `load_config` module: Loads and adapts a static YAML config into the core `SnapshotConfig`.
///
/// This module is the only place where untrusted YAML is parsed and mapped to the strongly-typed
/// structs of `repo-print-core`.
///
/// # Responsibilities
/// - Parse user-supplied YAML configuration files into type-safe Rust structs
/// - Map loosely-typed YAML keys (a single `match` string or a list, literal or regex content
///   predicates) to core types
/// - Fill the output directory from `REPO_PRINT_OUTPUT_DIR` when the file does not set one
/// - Reject option combinations the pipeline cannot honour before anything is fetched or written
///
/// # Errors
/// All errors in this module use `anyhow::Error` for context-rich diagnostics, and are surfaced at the CLI boundary.
use anyhow::Result;
use repo_print_core::assemble::OutputKind;
use repo_print_core::config::{SnapshotConfig, SnapshotOptions};
use repo_print_core::contract::ContentPredicate;
use repo_print_core::matcher::DEFAULT_MATCH_PATTERN;
use repo_print_core::render::RendererKind;
use repo_print_core::source::SourceAction;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// Used when neither the config file nor the environment names an output directory.
pub const DEFAULT_OUTPUT_DIR: &str = "output";

/// Environment variable consulted when `output_dir` is absent from the file.
pub const OUTPUT_DIR_ENV: &str = "REPO_PRINT_OUTPUT_DIR";

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ContentEntry {
    Literal(String),
    Regex { regex: String },
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    source: SourceAction,
    #[serde(default)]
    output_dir: Option<PathBuf>,
    #[serde(default, rename = "match")]
    match_patterns: Option<OneOrMany>,
    #[serde(default)]
    ignore: Vec<String>,
    #[serde(default)]
    content: Vec<ContentEntry>,
    #[serde(default)]
    filename: Option<String>,
    #[serde(default)]
    debug: bool,
    #[serde(default)]
    output: OutputKind,
    #[serde(default)]
    renderer: Option<RendererKind>,
}

/// Loads a static YAML config file and returns a validated snapshot config.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<SnapshotConfig> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading configuration from file");

    let config_content = match fs::read_to_string(path_ref) {
        Ok(content) => {
            info!(config_path = ?path_ref, "Config file read successfully");
            content
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to read config file");
            return Err(anyhow::anyhow!(
                "Failed to read config file {:?}: {}",
                path_ref,
                e
            ));
        }
    };

    let raw: RawConfig = match serde_yaml::from_str(&config_content) {
        Ok(conf) => {
            info!(config_path = ?path_ref, "Parsed config YAML successfully");
            conf
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to parse config YAML");
            return Err(anyhow::anyhow!("Failed to parse config YAML: {e}"));
        }
    };

    let match_patterns = match raw.match_patterns {
        Some(OneOrMany::One(pattern)) => vec![pattern],
        Some(OneOrMany::Many(patterns)) if !patterns.is_empty() => patterns,
        _ => vec![DEFAULT_MATCH_PATTERN.to_string()],
    };

    let content = raw
        .content
        .into_iter()
        .map(|entry| match entry {
            ContentEntry::Literal(literal) => Ok(ContentPredicate::Literal(literal)),
            ContentEntry::Regex { regex } => ContentPredicate::pattern(&regex).map_err(|e| {
                error!(error = %e, "Invalid content regex in config");
                anyhow::anyhow!("Invalid content predicate: {e}")
            }),
        })
        .collect::<Result<Vec<_>>>()?;

    let renderer = raw.renderer.unwrap_or(match raw.output {
        OutputKind::Records => RendererKind::Plain,
        OutputKind::Document => RendererKind::Annotated,
    });

    let output_dir = match raw.output_dir {
        Some(dir) => dir,
        None => match std::env::var(OUTPUT_DIR_ENV) {
            Ok(dir) if !dir.is_empty() => {
                info!(output_dir = %dir, "Output directory taken from {}", OUTPUT_DIR_ENV);
                PathBuf::from(dir)
            }
            _ => PathBuf::from(DEFAULT_OUTPUT_DIR),
        },
    };

    let options = SnapshotOptions {
        match_patterns,
        ignore: raw.ignore,
        content,
        filename: raw.filename,
        debug: raw.debug,
        output: raw.output,
        renderer,
    };

    if let Err(e) = options.validate() {
        error!(error = %e, output = ?options.output, renderer = ?options.renderer, "Invalid output configuration");
        anyhow::bail!("Invalid output configuration: {e}");
    }

    let config = SnapshotConfig {
        source: raw.source,
        output_dir,
        options,
    };
    info!(
        output_dir = %config.output_dir.display(),
        "Config loaded and validated successfully"
    );
    Ok(config)
}
