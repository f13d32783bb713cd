//! Ephemeral per-request scan workspaces
//!
//! A workspace is a temporary directory exclusively owned by one in-flight
//! scan request. Submitted content is written into it under sanitized
//! names; the original, caller-supplied names are retained in a mapping
//! table so results can be reported against them. The directory is removed
//! on every exit path: explicitly via [`Workspace::destroy`] on the happy
//! path, and by the `TempDir` drop guard everywhere else (errors, panics,
//! cancelled requests).

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};

use tempfile::TempDir;
use tracing::{debug, warn};

use crate::domain::errors::ScanError;

/// Factory for scan workspaces
#[derive(Debug, Clone)]
pub struct WorkspaceManager {
    /// Per-file size ceiling enforced on every write
    max_file_bytes: u64,
    /// Parent directory for workspaces; system temp when unset
    root: Option<PathBuf>,
}

impl WorkspaceManager {
    pub fn new(max_file_bytes: u64) -> Self {
        Self {
            max_file_bytes,
            root: None,
        }
    }

    /// Create workspaces under `root` instead of the system temp directory
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = Some(root.into());
        self
    }

    /// Create a fresh, empty workspace
    pub fn create(&self) -> Result<Workspace, ScanError> {
        let dir = match &self.root {
            Some(root) => TempDir::with_prefix_in("scan-", root),
            None => TempDir::with_prefix("scan-"),
        }
        .map_err(|e| ScanError::ResourceExhausted(format!("Failed to create workspace: {e}")))?;

        debug!(path = %dir.path().display(), "Workspace created");

        Ok(Workspace {
            dir,
            file_map: HashMap::new(),
            max_file_bytes: self.max_file_bytes,
        })
    }
}

/// An isolated temporary directory holding the files of one scan request
#[derive(Debug)]
pub struct Workspace {
    dir: TempDir,
    /// sanitized relative path -> original caller-supplied name
    file_map: HashMap<String, String>,
    max_file_bytes: u64,
}

impl Workspace {
    /// Directory the engine is pointed at
    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn file_count(&self) -> usize {
        self.file_map.len()
    }

    /// Write one submitted file into the workspace.
    ///
    /// The requested name is sanitized to a safe relative path first; a
    /// name that attempts to escape the workspace is rejected with
    /// `InvalidInput`, as is content over the per-file limit.
    pub async fn write(&mut self, requested: &str, content: &[u8]) -> Result<(), ScanError> {
        if content.len() as u64 > self.max_file_bytes {
            return Err(ScanError::InvalidInput(format!(
                "File '{}' exceeds the per-file limit of {} bytes",
                requested, self.max_file_bytes
            )));
        }

        let mut relative = sanitize_filename(requested)?;

        // Distinct requested names may sanitize to the same relative path;
        // suffix until unique so no submitted content is overwritten.
        if self.file_map.contains_key(&relative) {
            let mut n = 1;
            let candidate = loop {
                let candidate = dedup_name(&relative, n);
                if !self.file_map.contains_key(&candidate) {
                    break candidate;
                }
                n += 1;
            };
            relative = candidate;
        }

        let absolute = self.dir.path().join(&relative);
        if let Some(parent) = absolute.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| ScanError::ResourceExhausted(format!("Failed to create '{relative}': {e}")))?;
        }
        tokio::fs::write(&absolute, content)
            .await
            .map_err(|e| ScanError::ResourceExhausted(format!("Failed to write '{relative}': {e}")))?;

        self.file_map.insert(relative, requested.to_string());
        Ok(())
    }

    /// Translate an engine-reported path back to the caller-supplied name.
    ///
    /// The engine reports paths under the workspace root; anything it
    /// reports that we did not write (rule files, the root itself) falls
    /// back to the reported path.
    pub fn original_name(&self, reported: &str) -> Option<&str> {
        let path = Path::new(reported);
        let relative = path
            .strip_prefix(self.dir.path())
            .unwrap_or(path)
            .to_string_lossy();
        self.file_map.get(relative.as_ref()).map(String::as_str)
    }

    /// Remove the workspace, logging failures.
    ///
    /// Dropping a `Workspace` removes the directory as well; this explicit
    /// form exists so the happy path can surface removal problems in logs.
    pub fn destroy(self) {
        let path = self.dir.path().to_path_buf();
        match self.dir.close() {
            Ok(()) => debug!(path = %path.display(), "Workspace destroyed"),
            Err(e) => warn!(path = %path.display(), error = %e, "Failed to remove workspace"),
        }
    }
}

/// Reduce a caller-supplied filename to a safe path relative to the
/// workspace root.
///
/// Forward-slash subdirectories are preserved; parent-directory
/// components, absolute paths, drive prefixes, and NUL bytes are rejected.
fn sanitize_filename(requested: &str) -> Result<String, ScanError> {
    if requested.trim().is_empty() {
        return Err(ScanError::InvalidInput("Filename must not be empty".into()));
    }
    if requested.contains('\0') {
        return Err(ScanError::InvalidInput(format!(
            "Filename '{}' contains a NUL byte",
            requested.escape_default()
        )));
    }

    // Backslashes are treated as separators so Windows-style traversal
    // cannot hide from the component check below.
    let normalized = requested.replace('\\', "/");
    let path = Path::new(&normalized);

    let mut parts: Vec<&str> = Vec::new();
    for component in path.components() {
        match component {
            Component::Normal(part) => {
                let part = part.to_str().ok_or_else(|| {
                    ScanError::InvalidInput(format!("Filename '{requested}' is not valid UTF-8"))
                })?;
                parts.push(part);
            }
            Component::CurDir => continue,
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(ScanError::InvalidInput(format!(
                    "Filename '{requested}' escapes the workspace"
                )));
            }
        }
    }

    if parts.is_empty() {
        return Err(ScanError::InvalidInput(format!(
            "Filename '{requested}' has no usable components"
        )));
    }

    Ok(parts.join("/"))
}

/// `foo/bar.py` -> `foo/bar__2.py` style deduplication
fn dedup_name(relative: &str, n: usize) -> String {
    match relative.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => format!("{stem}__{n}.{ext}"),
        _ => format!("{relative}__{n}"),
    }
}
