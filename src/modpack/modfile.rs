use anyhow::Result;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::ModError;
use crate::ledger;
use crate::runtime::Runtime;

/// Ledger file inside the modpack directory.
pub const MODFILE_NAME: &str = "modfile.json";

/// A mod recorded in the modpack ledger.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct InstalledMod {
    pub name: String,
    pub full_name: String,
    pub url: String,
    pub version: String,
    pub uuid4: String,
    /// Installed files relative to the modpack directory, in install order
    pub files: Vec<String>,
}

impl InstalledMod {
    /// Whether `identifier` names this mod by name, full name or URL.
    pub fn matches(&self, identifier: &str) -> bool {
        self.name == identifier || self.full_name == identifier || self.url == identifier
    }
}

/// The installed-mod ledger bound to its modpack directory.
#[derive(Debug, Clone)]
pub struct Modpack {
    dir: PathBuf,
    mods: Vec<InstalledMod>,
    changed: bool,
}

impl Modpack {
    /// An empty modpack rooted at `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            mods: Vec::new(),
            changed: false,
        }
    }

    /// Load the ledger of the modpack at `dir`.
    pub fn load<R: Runtime>(runtime: &R, dir: impl Into<PathBuf>) -> Result<Self> {
        let mut modpack = Self::new(dir);
        modpack.mods = ledger::load(runtime, &modpack.modfile_path())?;
        Ok(modpack)
    }

    /// Write the ledger back if it changed since it was loaded.
    pub fn save<R: Runtime>(&mut self, runtime: &R) -> Result<()> {
        if !self.changed {
            return Ok(());
        }
        ledger::save(runtime, &self.modfile_path(), &self.mods)?;
        self.changed = false;
        Ok(())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn modfile_path(&self) -> PathBuf {
        self.dir.join(MODFILE_NAME)
    }

    pub fn mods(&self) -> &[InstalledMod] {
        &self.mods
    }

    pub fn len(&self) -> usize {
        self.mods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mods.is_empty()
    }

    pub fn is_changed(&self) -> bool {
        self.changed
    }

    /// First mod whose name, full name or URL equals `identifier`.
    pub fn lookup(&self, identifier: &str) -> Option<&InstalledMod> {
        self.mods.iter().find(|m| m.matches(identifier))
    }

    /// Append a mod. Full names stay unique.
    pub fn insert(&mut self, installed: InstalledMod) -> Result<()> {
        if self.mods.iter().any(|m| m.full_name == installed.full_name) {
            return Err(ModError::AlreadyInstalled(installed.full_name).into());
        }
        self.mods.push(installed);
        self.changed = true;
        Ok(())
    }

    /// Swap the entry with `full_name` for `installed`, keeping its position.
    pub fn replace(&mut self, full_name: &str, installed: InstalledMod) -> Result<()> {
        match self.mods.iter_mut().find(|m| m.full_name == full_name) {
            Some(slot) => {
                *slot = installed;
                self.changed = true;
                Ok(())
            }
            None => Err(ModError::NotInstalled(full_name.to_string()).into()),
        }
    }

    /// Drop the entry with `full_name` from the ledger.
    pub fn remove(&mut self, full_name: &str) -> Option<InstalledMod> {
        let index = self.mods.iter().position(|m| m.full_name == full_name)?;
        self.changed = true;
        Some(self.mods.remove(index))
    }

    /// Delete every tracked file of `installed`, stopping at the first failure.
    pub(crate) fn delete_files<R: Runtime>(
        &self,
        runtime: &R,
        installed: &InstalledMod,
    ) -> Result<()> {
        for file in &installed.files {
            let path = self.dir.join(file);
            runtime.remove_file(&path).map_err(|e| {
                anyhow::Error::from(ModError::FileDeletionError {
                    path: path.clone(),
                    reason: format!("{:#}", e),
                })
            })?;
            debug!("Removed {}", file);
        }
        Ok(())
    }

    /// Delete the tracked files of a mod and drop it from the ledger.
    ///
    /// The entry stays when a file cannot be deleted.
    #[tracing::instrument(level = "debug", skip(self, runtime))]
    pub fn uninstall<R: Runtime>(
        &mut self,
        runtime: &R,
        identifier: &str,
    ) -> Result<InstalledMod> {
        let installed = self
            .lookup(identifier)
            .cloned()
            .ok_or_else(|| ModError::NotInstalled(identifier.to_string()))?;

        self.delete_files(runtime, &installed)?;
        self.remove(&installed.full_name);
        info!("{} was removed", installed.name);
        Ok(installed)
    }
}
