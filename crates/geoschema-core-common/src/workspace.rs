//! Process-wide "current workspace" setting.
//!
//! Relative dataset references resolve against the current workspace. Report
//! export temporarily points the workspace at the dataset's directory; the
//! [`WorkspaceGuard`] returned by [`Workspace::enter`] restores the previous
//! value when dropped, on success and error paths alike.

use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use log::debug;

static GLOBAL_WORKSPACE: OnceLock<Arc<Workspace>> = OnceLock::new();

/// A settable base location for relative dataset references.
#[derive(Debug, Default)]
pub struct Workspace {
    current: RwLock<Option<PathBuf>>,
}

impl Workspace {
    /// Creates a workspace setting independent of the process-wide one.
    #[must_use]
    pub fn new(initial: Option<PathBuf>) -> Self {
        Self {
            current: RwLock::new(initial),
        }
    }

    /// Returns the process-wide workspace setting.
    #[must_use]
    pub fn global() -> Arc<Workspace> {
        GLOBAL_WORKSPACE
            .get_or_init(|| Arc::new(Workspace::default()))
            .clone()
    }

    /// Returns the current workspace, if one is set.
    #[must_use]
    pub fn current(&self) -> Option<PathBuf> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replaces the current workspace and returns the previous one.
    pub fn set(&self, workspace: Option<PathBuf>) -> Option<PathBuf> {
        let mut current = self
            .current
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *current, workspace)
    }

    /// Points the workspace at `path` until the returned guard is dropped.
    #[must_use = "the previous workspace is restored as soon as the guard is dropped"]
    pub fn enter(&self, path: impl Into<PathBuf>) -> WorkspaceGuard<'_> {
        let path = path.into();
        debug!("Entering workspace {}", path.display());
        let previous = self.set(Some(path));
        WorkspaceGuard {
            workspace: self,
            previous,
        }
    }

    /// Resolves a dataset reference against the current workspace.
    ///
    /// Absolute references, and every reference while no workspace is set, are
    /// returned unchanged.
    #[must_use]
    pub fn resolve(&self, reference: &str) -> PathBuf {
        let path = Path::new(reference);
        match self.current() {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }
}

/// Restores the previous workspace when dropped.
#[derive(Debug)]
pub struct WorkspaceGuard<'a> {
    workspace: &'a Workspace,
    previous: Option<PathBuf>,
}

impl Drop for WorkspaceGuard<'_> {
    fn drop(&mut self) {
        let previous = self.previous.take();
        debug!("Restoring workspace {previous:?}");
        self.workspace.set(previous);
    }
}
