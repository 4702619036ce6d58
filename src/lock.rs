//! Single-instance lock for a workspace.

use anyhow::{Result, anyhow};
use log::{debug, warn};
use std::path::{Path, PathBuf};

use crate::runtime::Runtime;

/// Lock file at the workspace root.
pub const LOCK_FILE: &str = ".modpack.lock";

/// Marks a workspace as busy while a command runs.
///
/// The file is created exclusively, so a second command against the same
/// workspace fails instead of racing on the ledgers. The owner hands the lock
/// back with [`WorkspaceLock::release`]; an interrupted process removes the
/// file with [`remove_lock_file`].
#[derive(Debug)]
pub struct WorkspaceLock {
    path: PathBuf,
}

impl WorkspaceLock {
    #[tracing::instrument(level = "debug", skip(runtime))]
    pub fn acquire<R: Runtime>(runtime: &R, path: &Path) -> Result<Self> {
        // The pid is informational only
        let pid = format!("{}\n", std::process::id());
        if !runtime.write_new(path, pid.as_bytes())? {
            return Err(anyhow!(
                "Another modpack command is running (remove {:?} if it is stale)",
                path
            ));
        }

        debug!("Acquired workspace lock {:?}", path);
        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    pub fn release<R: Runtime>(self, runtime: &R) {
        remove_lock_file(runtime, &self.path);
    }
}

/// Delete the lock file at `path`, logging instead of failing.
pub fn remove_lock_file<R: Runtime>(runtime: &R, path: &Path) {
    match runtime.remove_file(path) {
        Ok(()) => debug!("Released workspace lock {:?}", path),
        Err(e) => warn!("Failed to remove lock file {:?}: {:#}", path, e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::{MockRuntime, RealRuntime};
    use mockall::predicate::eq;
    use tempfile::tempdir;

    #[test]
    fn test_acquire_writes_pid_exclusively() {
        let mut runtime = MockRuntime::new();
        runtime
            .expect_write_new()
            .withf(|path, contents| {
                path == Path::new("/pack/.modpack.lock")
                    && String::from_utf8_lossy(contents).trim() == std::process::id().to_string()
            })
            .times(1)
            .returning(|_, _| Ok(true));
        runtime
            .expect_remove_file()
            .with(eq(PathBuf::from("/pack/.modpack.lock")))
            .times(1)
            .returning(|_| Ok(()));

        let lock = WorkspaceLock::acquire(&runtime, Path::new("/pack/.modpack.lock")).unwrap();
        lock.release(&runtime);
    }

    #[test]
    fn test_acquire_fails_when_lock_exists() {
        // Strict mock: a held lock must not be removed
        let mut runtime = MockRuntime::new();
        runtime.expect_write_new().returning(|_, _| Ok(false));

        let err = WorkspaceLock::acquire(&runtime, Path::new("/pack/.modpack.lock")).unwrap_err();
        assert!(err.to_string().contains("Another modpack command"));
    }

    #[test]
    fn test_remove_lock_file_ignores_errors() {
        let mut runtime = MockRuntime::new();
        runtime
            .expect_remove_file()
            .returning(|_| Err(anyhow!("gone")));

        remove_lock_file(&runtime, Path::new("/pack/.modpack.lock"));
    }

    #[test]
    fn test_second_acquire_fails_while_held() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(LOCK_FILE);
        let runtime = RealRuntime;

        let lock = WorkspaceLock::acquire(&runtime, &path).unwrap();
        assert!(path.exists());

        let err = WorkspaceLock::acquire(&runtime, &path).unwrap_err();
        assert!(err.to_string().contains("Another modpack command"));

        lock.release(&runtime);
        assert!(!path.exists());

        let again = WorkspaceLock::acquire(&runtime, &path).unwrap();
        again.release(&runtime);
    }

    #[test]
    fn test_acquire_in_missing_directory_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing").join(LOCK_FILE);
        assert!(WorkspaceLock::acquire(&RealRuntime, &path).is_err());
    }
}
