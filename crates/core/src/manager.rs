//! High-level interface over a loaded document
//!
//! This module provides the [`YakeManager`] which serves as the primary interface
//! for the CLI. It encapsulates document loading, path selection, planning and
//! execution.
//!
//! ## Example
//!
//! ```rust,no_run
//! use yake_core::manager::{YakeManager, YakeManagerConfig};
//! use std::path::PathBuf;
//!
//! # fn example() -> yake_core::types::YakeResult<()> {
//! let manager = YakeManager::new(YakeManagerConfig {
//!     document_path: PathBuf::from("Yakefile"),
//!     shell: "bash".to_string(),
//! })?;
//!
//! // Show what `docker.postgres` would run
//! let plan = manager.plan("docker.postgres")?;
//!
//! // List the children of a group
//! let listing = manager.list(Some("docker3"))?;
//! # Ok(())
//! # }
//! ```

use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use tracing::debug;

use crate::configs::document::TargetType;
use crate::discovery::load_with_includes;
use crate::environment::AmbientEnv;
use crate::execution::command::ShellRunner;
use crate::execution::dependencies::dependency_graph;
use crate::execution::runner::TargetRunner;
use crate::planning::{check_document, list_children, plan_execution};
use crate::results::{DependencyGraphResult, ExecutionPlan, Selection, TargetListing};
use crate::tree::TargetTree;
use crate::types::{YakeError, YakeResult};

/// Configuration for initializing a manager
#[derive(Debug, Clone)]
pub struct YakeManagerConfig {
    pub document_path: PathBuf,
    pub shell: String,
}

/// A loaded document together with the ambient environment snapshot
pub struct YakeManager {
    tree: TargetTree,
    ambient: AmbientEnv,
    shell: String,
    working_dir: PathBuf,
}

impl YakeManager {
    /// Load the document (and its includes) and snapshot the process environment
    pub fn new(config: YakeManagerConfig) -> YakeResult<Self> {
        let document = load_with_includes(&config.document_path)?;
        let tree = TargetTree::from_config(document)?;
        debug!(path = %config.document_path.display(), "loaded document");

        Ok(Self {
            tree,
            ambient: AmbientEnv::capture(),
            shell: config.shell,
            working_dir: document_dir(&config.document_path),
        })
    }

    pub fn tree(&self) -> &TargetTree {
        &self.tree
    }

    /// Immediate children of a group, or of the document root when `path` is `None`
    pub fn list(&self, path: Option<&str>) -> YakeResult<TargetListing> {
        let id = self.tree.resolve_or_root(path)?;
        if self.tree.type_of(id) == TargetType::Callable {
            return Err(YakeError::config(
                self.tree.path_of(id),
                "callable targets have no targets to list",
            ));
        }
        list_children(&self.tree, id)
    }

    /// The rendered plan a run of `path` would execute
    pub fn plan(&self, path: &str) -> YakeResult<ExecutionPlan> {
        let id = self.tree.resolve(path)?;
        plan_execution(&self.tree, id, &self.ambient)
    }

    /// Run a callable, or list a group's children without running anything
    pub fn select(&self, path: Option<&str>, cancelled: Arc<AtomicBool>) -> YakeResult<Selection> {
        let id = self.tree.resolve_or_root(path)?;
        if self.tree.type_of(id) == TargetType::Group {
            return Ok(Selection::Listed(list_children(&self.tree, id)?));
        }

        let runner = ShellRunner::new(&self.shell).with_working_dir(&self.working_dir);
        let summary = TargetRunner::new(&self.tree, &self.ambient, runner)
            .with_cancellation(cancelled)
            .run(id)?;
        Ok(Selection::Ran(summary))
    }

    pub fn dependency_graph(&self) -> DependencyGraphResult {
        dependency_graph(&self.tree)
    }

    /// Validate every callable; returns how many were checked
    pub fn check(&self) -> YakeResult<usize> {
        check_document(&self.tree)
    }

    /// All callable paths, for suggestions when a selection does not resolve
    pub fn callable_paths(&self) -> Vec<String> {
        self.tree.callable_paths()
    }
}

fn document_dir(document_path: &Path) -> PathBuf {
    match document_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discovery::DOCUMENT_FILE_NAME;
    use crate::test_support::EXAMPLE_DOCUMENT;

    fn manager_in(dir: &Path, document: &str) -> YakeManager {
        let path = dir.join(DOCUMENT_FILE_NAME);
        std::fs::write(&path, document).unwrap();
        YakeManager::new(YakeManagerConfig {
            document_path: path,
            shell: "sh".to_string(),
        })
        .unwrap()
    }

    #[test]
    fn test_selecting_group_lists_children() {
        let dir = tempfile::tempdir().unwrap();
        let manager = manager_in(dir.path(), EXAMPLE_DOCUMENT);

        match manager
            .select(Some("docker3"), Arc::new(AtomicBool::new(false)))
            .unwrap()
        {
            Selection::Listed(listing) => {
                let names: Vec<_> = listing.children.iter().map(|c| c.name.as_str()).collect();
                assert_eq!(names, vec!["mysql", "mysql2"]);
                assert_eq!(listing.children[1].doc, "Nested mysql targets");
            }
            Selection::Ran(_) => panic!("a group must not run"),
        }
    }

    #[test]
    fn test_no_selection_lists_root() {
        let dir = tempfile::tempdir().unwrap();
        let manager = manager_in(dir.path(), EXAMPLE_DOCUMENT);
        let listing = manager.list(None).unwrap();
        assert_eq!(listing.children.len(), 4);
        assert!(manager.list(Some("base")).is_err());
    }

    #[test]
    fn test_unknown_selection_is_resolution_error() {
        let dir = tempfile::tempdir().unwrap();
        let manager = manager_in(dir.path(), EXAMPLE_DOCUMENT);
        let err = manager
            .select(Some("docker.mysql"), Arc::new(AtomicBool::new(false)))
            .unwrap_err();
        assert!(matches!(err, YakeError::Resolution { .. }));
        assert!(manager.callable_paths().contains(&"docker.postgres".to_string()));
    }

    #[cfg(unix)]
    #[test]
    fn test_selecting_callable_runs_in_document_dir() {
        let dir = tempfile::tempdir().unwrap();
        let manager = manager_in(
            dir.path(),
            r#"
meta: { doc: d, version: 3.1.4 }
targets:
  stamp:
    meta: { doc: s, type: callable }
    exec:
      - echo "{{meta.version}}" > stamp.txt
"#,
        );

        match manager
            .select(Some("stamp"), Arc::new(AtomicBool::new(false)))
            .unwrap()
        {
            Selection::Ran(summary) => assert_eq!(summary.steps_run, 1),
            Selection::Listed(_) => panic!("a callable must run"),
        }
        let stamp = std::fs::read_to_string(dir.path().join("stamp.txt")).unwrap();
        assert_eq!(stamp.trim(), "3.1.4");
    }

    #[test]
    fn test_check_and_graph() {
        let dir = tempfile::tempdir().unwrap();
        let manager = manager_in(dir.path(), EXAMPLE_DOCUMENT);
        assert_eq!(manager.check().unwrap(), 5);
        assert!(manager.dependency_graph().cycles.is_empty());
        assert_eq!(manager.plan("docker.postgres").unwrap().targets.len(), 4);
    }
}
