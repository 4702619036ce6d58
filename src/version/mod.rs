//! Version archiver - releases snapshots of the modpack directory as zip
//! files and keeps the version ledger.

use anyhow::{Context, Result};
use log::info;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::archive::write_directory;
use crate::config::Config;
use crate::error::ModError;
use crate::ledger;
use crate::runtime::Runtime;

/// Version ledger at the workspace root.
pub const VERSIONS_FILE: &str = "versions.json";

/// Date format of release entries, e.g. `07.03.2024`.
const DATE_FORMAT: &str = "%d.%m.%Y";

/// A released version of the modpack.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct VersionSnapshot {
    /// Path of the release archive
    pub file: String,
    pub name: String,
    pub date: String,
}

pub struct VersionArchiver<'a, R: Runtime> {
    runtime: &'a R,
    ledger_path: PathBuf,
    prefix: String,
    release_dir: PathBuf,
    versions: Vec<VersionSnapshot>,
    changed: bool,
}

impl<'a, R: Runtime> VersionArchiver<'a, R> {
    /// Load the version ledger at `ledger_path`.
    pub fn load(runtime: &'a R, ledger_path: impl Into<PathBuf>, config: &Config) -> Result<Self> {
        let ledger_path = ledger_path.into();
        let versions = ledger::load(runtime, &ledger_path)?;
        Ok(Self {
            runtime,
            ledger_path,
            prefix: config.prefix.clone(),
            release_dir: config.release_dir.clone(),
            versions,
            changed: false,
        })
    }

    pub fn list(&self) -> &[VersionSnapshot] {
        &self.versions
    }

    pub fn find(&self, name: &str) -> Option<&VersionSnapshot> {
        self.versions.iter().find(|v| v.name == name)
    }

    /// Archive file a release called `name` is written to.
    pub fn archive_path(&self, name: &str) -> PathBuf {
        self.release_dir.join(format!("{}-{}.zip", self.prefix, name))
    }

    /// Zip the whole of `source_dir` into the release directory and record it.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn release(&mut self, name: &str, source_dir: &Path) -> Result<&VersionSnapshot> {
        if self.find(name).is_some() {
            return Err(ModError::VersionExists(name.to_string()).into());
        }

        if !self.runtime.exists(&self.release_dir) {
            self.runtime.create_dir_all(&self.release_dir)?;
        }

        let archive = self.archive_path(name);
        write_directory(self.runtime, source_dir, &archive)
            .with_context(|| format!("Failed to release version {}", name))?;

        self.versions.push(VersionSnapshot {
            file: archive.to_string_lossy().into_owned(),
            name: name.to_string(),
            date: chrono::Local::now().format(DATE_FORMAT).to_string(),
        });
        self.changed = true;
        info!("Version {} was released to {:?}", name, archive);

        Ok(&self.versions[self.versions.len() - 1])
    }

    /// Reset the modpack directory to a released version.
    pub fn restore(&self, _name: &str) -> Result<()> {
        Err(ModError::NotImplemented("Restoring a version").into())
    }

    /// Write the ledger back if a version was released.
    pub fn save(&mut self) -> Result<()> {
        if !self.changed {
            return Ok(());
        }
        ledger::save(self.runtime, &self.ledger_path, &self.versions)?;
        self.changed = false;
        Ok(())
    }
}
