//! Document loading with recursive includes
//!
//! A root document with `meta.include_recursively: true` pulls in the top-level
//! targets of every `Yakefile` located exactly one directory below it.

use std::path::{Path, PathBuf};

use globset::{Glob, GlobSet, GlobSetBuilder};
use tracing::{debug, warn};

use crate::configs::document::{load_document, YakeFileConfig};
use crate::types::{YakeError, YakeResult};

/// File name of a yake document
pub const DOCUMENT_FILE_NAME: &str = "Yakefile";

const DEFAULT_EXCLUDE_GLOBS: &[&str] = &[".*", "target", "node_modules"];

fn exclude_set() -> YakeResult<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in DEFAULT_EXCLUDE_GLOBS {
        let glob = Glob::new(pattern).map_err(|e| YakeError::config(*pattern, e.to_string()))?;
        builder.add(glob);
    }
    builder
        .build()
        .map_err(|e| YakeError::config("<exclude globs>", e.to_string()))
}

/// Documents in the immediate subdirectories of `dir`, sorted by directory name
pub fn find_included_documents(dir: &Path) -> YakeResult<Vec<PathBuf>> {
    let excludes = exclude_set()?;
    let mut found = Vec::new();

    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_dir() || excludes.is_match(entry.file_name()) {
            continue;
        }

        let candidate = path.join(DOCUMENT_FILE_NAME);
        if candidate.is_file() {
            found.push(candidate);
        }
    }

    found.sort();
    Ok(found)
}

/// Merge the top-level targets of `included` into `config`; same-named targets
/// are replaced
pub fn merge_included(config: &mut YakeFileConfig, included: YakeFileConfig, source: &Path) {
    for (name, target) in included.targets {
        if config.targets.insert(name.clone(), target).is_some() {
            warn!(
                target_name = %name,
                source = %source.display(),
                "included document overrides target"
            );
        }
    }
}

/// Load the document at `path`, merging included documents when requested
pub fn load_with_includes(path: &Path) -> YakeResult<YakeFileConfig> {
    let mut config = load_document(path)?;
    if config.meta.include_recursively != Some(true) {
        return Ok(config);
    }

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };

    for included_path in find_included_documents(&dir)? {
        debug!(path = %included_path.display(), "including document");
        let included = load_document(&included_path)?;
        merge_included(&mut config, included, &included_path);
    }

    Ok(config)
}
