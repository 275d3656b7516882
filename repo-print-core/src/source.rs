//! Repository sources: where the file tree comes from and how it is enumerated.
//!
//! - [`SourceAction`] declares a source (git repository or local directory).
//! - [`GitAcquirer`] materialises it: git sources are cloned into a fresh temporary
//!   directory, local directories are used in place.
//! - [`AcquiredRepository`] owns the materialised tree and removes temporary clones on cleanup.
//! - [`DirectorySource`] implements [`RepositorySource`] over any directory with walkdir.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tempfile::TempDir;
use tokio::process::Command;
use tracing::{debug, error, info};
use walkdir::{DirEntry, WalkDir};

use crate::contract::{Acquirer, CandidatePath, RepositorySource, SnapshotError};
use crate::matcher::PathMatcher;

/// Directories never descended into, in addition to hidden entries.
const SKIPPED_DIRS: &[&str] = &["node_modules", "target", "__pycache__"];

/// Selects the type of source to snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SourceAction {
    Git(GitSource),
    Local(LocalSource),
}

/// Describes a Git repository source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitSource {
    pub repo_url: String,
    /// Branch, tag or commit; the remote default branch when absent.
    #[serde(default)]
    pub reference: Option<String>,
}

/// Describes an already materialised directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalSource {
    pub path: PathBuf,
}

/// Repository identity used as the default output base name.
pub fn repository_name(source: &SourceAction) -> String {
    let name = match source {
        SourceAction::Git(git) => git
            .repo_url
            .trim_end_matches('/')
            .rsplit(&['/', ':'][..])
            .next()
            .unwrap_or_default()
            .trim_end_matches(".git")
            .to_string(),
        SourceAction::Local(local) => std::fs::canonicalize(&local.path)
            .unwrap_or_else(|_| local.path.clone())
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default(),
    };
    if name.is_empty() {
        "repo".to_string()
    } else {
        name
    }
}

/// A materialised working tree. Temporary clones are removed on [`cleanup`](Self::cleanup) or drop.
#[derive(Debug)]
pub struct AcquiredRepository {
    pub name: String,
    pub root: PathBuf,
    workspace: Option<TempDir>,
}

impl AcquiredRepository {
    /// A tree the caller owns; never deleted.
    pub fn in_place(name: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            root: root.into(),
            workspace: None,
        }
    }

    fn temporary(name: String, root: PathBuf, workspace: TempDir) -> Self {
        Self {
            name,
            root,
            workspace: Some(workspace),
        }
    }

    pub fn source(&self) -> DirectorySource {
        DirectorySource::new(&self.root)
    }

    pub fn cleanup(self) -> Result<(), SnapshotError> {
        if let Some(workspace) = self.workspace {
            let path = workspace.path().to_path_buf();
            workspace.close().map_err(|e| {
                error!(error = ?e, path = %path.display(), "Failed to remove cloned repository");
                SnapshotError::Io(e)
            })?;
            debug!(path = %path.display(), "Removed cloned repository");
        }
        Ok(())
    }
}

/// Clones git sources with the `git` binary into temporary directories.
#[derive(Debug, Clone, Default)]
pub struct GitAcquirer {
    /// Parent directory for temporary clones; the system temp dir when `None`.
    pub work_dir: Option<PathBuf>,
}

impl GitAcquirer {
    pub fn new(work_dir: Option<PathBuf>) -> Self {
        Self { work_dir }
    }

    async fn clone_repository(&self, git: &GitSource) -> Result<AcquiredRepository, SnapshotError> {
        let name = repository_name(&SourceAction::Git(git.clone()));
        let acquisition_error = |message: String| SnapshotError::Acquisition {
            repository: git.repo_url.clone(),
            message,
        };

        let mut builder = tempfile::Builder::new();
        builder.prefix("repo-print-");
        let workspace = match &self.work_dir {
            Some(dir) => {
                std::fs::create_dir_all(dir).map_err(|e| {
                    error!(error = ?e, path = %dir.display(), "Failed to create work directory");
                    acquisition_error(format!("cannot create work directory: {e}"))
                })?;
                builder.tempdir_in(dir)
            }
            None => builder.tempdir(),
        }
        .map_err(|e| acquisition_error(format!("cannot create temporary directory: {e}")))?;
        let clone_path = workspace.path().join(&name);

        // `git clone <repo_url> <clone_path>`
        let status = Command::new("git")
            .arg("clone")
            .arg("--quiet")
            .arg(&git.repo_url)
            .arg(&clone_path)
            .status()
            .await;

        match status {
            Ok(s) if s.success() => {
                info!(
                    repo_url = %git.repo_url,
                    path = %clone_path.display(),
                    "Successfully cloned git repository"
                );
            }
            Ok(s) => {
                error!(
                    repo_url = %git.repo_url,
                    path = %clone_path.display(),
                    "Git exited with non-zero code: {}", s
                );
                return Err(acquisition_error(format!("git clone exited with {s}")));
            }
            Err(e) => {
                error!(error = ?e, repo_url = %git.repo_url, "Failed to launch git process");
                return Err(acquisition_error(format!("failed to launch git: {e}")));
            }
        }

        if let Some(reference) = &git.reference {
            let checkout_status = Command::new("git")
                .arg("-C")
                .arg(&clone_path)
                .arg("checkout")
                .arg("--quiet")
                .arg(reference)
                .status()
                .await;

            match checkout_status {
                Ok(s) if s.success() => {
                    info!(repo_url = %git.repo_url, reference = %reference, "Checked out git reference");
                }
                Ok(s) => {
                    error!(
                        repo_url = %git.repo_url,
                        reference = %reference,
                        "Git checkout exited with non-zero code: {}", s
                    );
                    return Err(acquisition_error(format!(
                        "git checkout {reference} exited with {s}"
                    )));
                }
                Err(e) => {
                    error!(error = ?e, repo_url = %git.repo_url, "Failed to launch git checkout");
                    return Err(acquisition_error(format!("failed to launch git checkout: {e}")));
                }
            }
        }

        Ok(AcquiredRepository::temporary(name, clone_path, workspace))
    }
}

#[async_trait]
impl Acquirer for GitAcquirer {
    async fn acquire(&self, source: &SourceAction) -> Result<AcquiredRepository, SnapshotError> {
        match source {
            SourceAction::Git(git) => self.clone_repository(git).await,
            SourceAction::Local(local) => {
                if !local.path.is_dir() {
                    error!(path = %local.path.display(), "Local source is not a directory");
                    return Err(SnapshotError::Acquisition {
                        repository: local.path.display().to_string(),
                        message: "not a readable directory".to_string(),
                    });
                }
                info!(path = %local.path.display(), "Using local directory in place");
                Ok(AcquiredRepository::in_place(
                    repository_name(source),
                    local.path.clone(),
                ))
            }
        }
    }
}

/// Enumerates and reads files below a root directory.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

fn is_pruned(entry: &DirEntry) -> bool {
    let name = entry.file_name().to_string_lossy();
    name.starts_with('.') || (entry.file_type().is_dir() && SKIPPED_DIRS.contains(&name.as_ref()))
}

impl RepositorySource for DirectorySource {
    fn enumerate(
        &self,
        include: &[String],
        exclude: &[String],
    ) -> Result<Vec<CandidatePath>, SnapshotError> {
        let matcher = PathMatcher::new(include, exclude)?;
        if !self.root.is_dir() {
            return Err(SnapshotError::Enumeration {
                root: self.root.display().to_string(),
                message: "root is not a directory".to_string(),
            });
        }

        let mut candidates = Vec::new();
        let walker = WalkDir::new(&self.root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_pruned(e));
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    debug!(error = %e, "Skipping unreadable entry during enumeration");
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            let Ok(relative) = entry.path().strip_prefix(&self.root) else {
                continue;
            };
            let path = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            if matcher.matches(&path) {
                candidates.push(path);
            }
        }

        info!(
            root = %self.root.display(),
            count = candidates.len(),
            "Enumerated candidate files"
        );
        Ok(candidates)
    }

    fn read_to_string(&self, path: &str) -> std::io::Result<String> {
        std::fs::read_to_string(self.root.join(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repository_name_from_https_and_ssh_urls() {
        let https = SourceAction::Git(GitSource {
            repo_url: "https://github.com/expressjs/express.git".into(),
            reference: None,
        });
        let ssh = SourceAction::Git(GitSource {
            repo_url: "git@github.com:expressjs/express.git".into(),
            reference: Some("main".into()),
        });
        assert_eq!(repository_name(&https), "express");
        assert_eq!(repository_name(&ssh), "express");
    }

    #[test]
    fn repository_name_from_local_directory() {
        let local = SourceAction::Local(LocalSource {
            path: PathBuf::from("/tmp/projects/widget"),
        });
        assert_eq!(repository_name(&local), "widget");
    }

    #[test]
    fn repository_name_of_a_relative_directory_is_its_real_name() {
        let dir = tempfile::tempdir().unwrap();
        let repo = dir.path().join("widget");
        std::fs::create_dir_all(repo.join("lib")).unwrap();

        for relative in [".", "./", "lib/.."] {
            let local = SourceAction::Local(LocalSource {
                path: repo.join(relative),
            });
            assert_eq!(repository_name(&local), "widget", "for {relative:?}");
        }
    }

    #[test]
    fn repository_name_never_empty() {
        let git = SourceAction::Git(GitSource {
            repo_url: "https://example.com/".into(),
            reference: None,
        });
        assert_eq!(repository_name(&git), "example.com");
        let local = SourceAction::Local(LocalSource {
            path: PathBuf::from("/"),
        });
        assert_eq!(repository_name(&local), "repo");
    }

    #[test]
    fn in_place_cleanup_keeps_the_directory() {
        let dir = tempfile::tempdir().unwrap();
        let repo = AcquiredRepository::in_place("x", dir.path());
        repo.cleanup().unwrap();
        assert!(dir.path().exists());
    }
}
