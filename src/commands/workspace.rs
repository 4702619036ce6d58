use anyhow::{Context, Result};
use log::{debug, info};
use std::path::{Path, PathBuf};

use crate::ledger;
use crate::lock::LOCK_FILE;
use crate::modpack::{InstalledMod, MODFILE_NAME};
use crate::registry::CATALOG_CACHE_FILE;
use crate::runtime::Runtime;
use crate::version::{VERSIONS_FILE, VersionSnapshot};

/// Template copied into a fresh modpack directory.
pub const TEMPLATE_DIR: &str = "default";
/// The modpack being worked on.
pub const MODPACK_DIR: &str = "current";

/// Directory layout of a modpack workspace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Use `root` when given, else the current working directory.
    #[tracing::instrument(level = "debug", skip(runtime))]
    pub fn resolve<R: Runtime>(runtime: &R, root: Option<PathBuf>) -> Result<Self> {
        let root = match root {
            Some(path) => path,
            None => runtime.current_dir()?,
        };
        info!("Using workspace: {}", root.display());
        Ok(Self::new(root))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn template_dir(&self) -> PathBuf {
        self.root.join(TEMPLATE_DIR)
    }

    pub fn modpack_dir(&self) -> PathBuf {
        self.root.join(MODPACK_DIR)
    }

    pub fn modfile_path(&self) -> PathBuf {
        self.modpack_dir().join(MODFILE_NAME)
    }

    pub fn versions_path(&self) -> PathBuf {
        self.root.join(VERSIONS_FILE)
    }

    pub fn catalog_cache_path(&self) -> PathBuf {
        self.root.join(CATALOG_CACHE_FILE)
    }

    pub fn lock_path(&self) -> PathBuf {
        self.root.join(LOCK_FILE)
    }

    /// Create the modpack directory and both ledgers when missing.
    ///
    /// A missing modpack directory is seeded from the template directory, or
    /// created empty when there is no template.
    #[tracing::instrument(level = "debug", skip(self, runtime))]
    pub fn prepare<R: Runtime>(&self, runtime: &R) -> Result<()> {
        let modpack_dir = self.modpack_dir();
        if !runtime.is_dir(&modpack_dir) {
            let template = self.template_dir();
            if runtime.is_dir(&template) {
                debug!("Seeding {:?} from {:?}", modpack_dir, template);
                copy_tree(runtime, &template, &modpack_dir)?;
            } else {
                debug!("Creating empty {:?}", modpack_dir);
                runtime.create_dir_all(&modpack_dir)?;
            }
        }

        let modfile = self.modfile_path();
        if !runtime.exists(&modfile) {
            debug!("Creating modfile {:?}", modfile);
            ledger::save::<_, InstalledMod>(runtime, &modfile, &[])?;
        }

        let versions = self.versions_path();
        if !runtime.exists(&versions) {
            debug!("Creating versions file {:?}", versions);
            ledger::save::<_, VersionSnapshot>(runtime, &versions, &[])?;
        }

        Ok(())
    }
}

/// Copy the directory tree at `from` to `to`.
fn copy_tree<R: Runtime>(runtime: &R, from: &Path, to: &Path) -> Result<()> {
    runtime.create_dir_all(to)?;
    for path in runtime.walk_dir(from)? {
        let relative = path
            .strip_prefix(from)
            .context("Walked outside of the template directory")?;
        let dest = to.join(relative);
        if runtime.is_dir(&path) {
            runtime.create_dir_all(&dest)?;
        } else {
            runtime.copy(&path, &dest)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::{MockRuntime, RealRuntime};
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_resolve_prefers_explicit_root() {
        let runtime = MockRuntime::new();
        let workspace = Workspace::resolve(&runtime, Some(PathBuf::from("/pack"))).unwrap();
        assert_eq!(workspace.root(), Path::new("/pack"));
        assert_eq!(workspace.modfile_path(), PathBuf::from("/pack/current/modfile.json"));
        assert_eq!(workspace.versions_path(), PathBuf::from("/pack/versions.json"));
        assert_eq!(
            workspace.catalog_cache_path(),
            PathBuf::from("/pack/full_modlist.json")
        );
        assert_eq!(workspace.lock_path(), PathBuf::from("/pack/.modpack.lock"));
    }

    #[test]
    fn test_resolve_falls_back_to_current_dir() {
        let mut runtime = MockRuntime::new();
        runtime
            .expect_current_dir()
            .returning(|| Ok(PathBuf::from("/work")));

        let workspace = Workspace::resolve(&runtime, None).unwrap();
        assert_eq!(workspace.root(), Path::new("/work"));
    }

    #[test]
    fn test_prepare_seeds_from_template() {
        let dir = tempdir().unwrap();
        let template = dir.path().join(TEMPLATE_DIR);
        fs::create_dir_all(template.join("BepInEx/core")).unwrap();
        fs::write(template.join("BepInEx/core/BepInEx.dll"), "core").unwrap();
        fs::write(template.join("winhttp.dll"), "proxy").unwrap();

        let workspace = Workspace::new(dir.path());
        workspace.prepare(&RealRuntime).unwrap();

        let current = dir.path().join(MODPACK_DIR);
        assert_eq!(
            fs::read_to_string(current.join("BepInEx/core/BepInEx.dll")).unwrap(),
            "core"
        );
        assert!(current.join("winhttp.dll").exists());
        assert_eq!(
            fs::read_to_string(current.join(MODFILE_NAME))
                .unwrap()
                .trim(),
            "[]"
        );
        assert!(dir.path().join(VERSIONS_FILE).exists());
        assert!(template.join("BepInEx/core/BepInEx.dll").exists());
    }

    #[test]
    fn test_prepare_without_template_creates_empty_modpack() {
        let dir = tempdir().unwrap();

        let workspace = Workspace::new(dir.path());
        workspace.prepare(&RealRuntime).unwrap();

        assert!(dir.path().join(MODPACK_DIR).is_dir());
        assert!(dir.path().join("current/modfile.json").exists());
    }

    #[test]
    fn test_prepare_keeps_existing_modpack() {
        let dir = tempdir().unwrap();
        let current = dir.path().join(MODPACK_DIR);
        fs::create_dir_all(&current).unwrap();
        fs::write(current.join(MODFILE_NAME), r#"[{"name": "kept"}]"#).unwrap();
        fs::create_dir_all(dir.path().join(TEMPLATE_DIR)).unwrap();
        fs::write(dir.path().join("default/extra.txt"), "x").unwrap();

        let workspace = Workspace::new(dir.path());
        workspace.prepare(&RealRuntime).unwrap();

        assert!(!current.join("extra.txt").exists());
        assert!(
            fs::read_to_string(current.join(MODFILE_NAME))
                .unwrap()
                .contains("kept")
        );
    }
}
