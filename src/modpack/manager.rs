//! Modpack manager - resolves names against the registry and installs,
//! removes and updates mods while keeping the ledger in step.

use anyhow::{Result, anyhow};
use futures_util::future::BoxFuture;
use log::{debug, info, warn};

use crate::error::{Candidate, ModError};
use crate::install::{Installer, install_version};
use crate::registry::{PackageListing, PackageVersion, Registry};
use crate::runtime::Runtime;

use super::{InstalledMod, Modpack, missing_dependencies};

/// Mod loader package that ships with the template and is never updated in bulk.
pub const BASE_FRAMEWORK: &str = "BepInEx-BepInExPack";

/// Outcome of updating a single mod.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateStatus {
    UpToDate { version: String },
    Updated { from: String, to: String },
}

/// Outcome of updating every mod of the pack.
#[derive(Debug, Default)]
pub struct UpdateSummary {
    pub updated: Vec<String>,
    pub up_to_date: Vec<String>,
    pub skipped: Vec<String>,
}

pub struct ModpackManager<'a, R: Runtime> {
    runtime: &'a R,
    registry: &'a dyn Registry,
    installer: &'a dyn Installer,
    modpack: Modpack,
    /// Full names whose installation is in progress further up the call chain
    installing: Vec<String>,
}

fn latest_version(listing: &PackageListing) -> Result<PackageVersion> {
    listing
        .latest()
        .cloned()
        .ok_or_else(|| anyhow!("{} has no published versions", listing.full_name))
}

impl<'a, R: Runtime> ModpackManager<'a, R> {
    pub fn new(
        runtime: &'a R,
        registry: &'a dyn Registry,
        installer: &'a dyn Installer,
        modpack: Modpack,
    ) -> Self {
        Self {
            runtime,
            registry,
            installer,
            modpack,
            installing: Vec::new(),
        }
    }

    pub fn modpack(&self) -> &Modpack {
        &self.modpack
    }

    pub fn into_modpack(self) -> Modpack {
        self.modpack
    }

    pub fn lookup(&self, identifier: &str) -> Option<&InstalledMod> {
        self.modpack.lookup(identifier)
    }

    pub fn list_mods(&self) -> &[InstalledMod] {
        self.modpack.mods()
    }

    /// Resolve `identifier` to exactly one registry package and install its
    /// latest version along with missing dependencies.
    pub fn add_mod<'s>(&'s mut self, identifier: &'s str) -> BoxFuture<'s, Result<()>> {
        Box::pin(async move {
            if let Some(existing) = self.modpack.lookup(identifier) {
                return Err(ModError::AlreadyInstalled(existing.full_name.clone()).into());
            }

            let catalog = self.registry.fetch_catalog().await?;
            let mut selection: Vec<PackageListing> = catalog
                .into_iter()
                .filter(|listing| listing.matches(identifier))
                .collect();
            for listing in &selection {
                debug!("Found {}", listing.full_name);
            }

            let listing = match selection.len() {
                0 => return Err(ModError::NotFound(identifier.to_string()).into()),
                1 => selection.remove(0),
                _ => {
                    return Err(ModError::AmbiguousName {
                        name: identifier.to_string(),
                        candidates: selection
                            .into_iter()
                            .map(|l| Candidate {
                                full_name: l.full_name,
                                package_url: l.package_url,
                            })
                            .collect(),
                    }
                    .into());
                }
            };

            if self.modpack.lookup(&listing.full_name).is_some() {
                return Err(ModError::AlreadyInstalled(listing.full_name).into());
            }

            let installed = self.install_listing(&listing).await?;
            self.modpack.insert(installed)?;
            info!("{} was installed", listing.name);
            Ok(())
        })
    }

    /// Install the latest version of `listing` and build its ledger record.
    /// The record is not added to the ledger.
    async fn install_listing(&mut self, listing: &PackageListing) -> Result<InstalledMod> {
        let version = latest_version(listing)?;

        self.installing.push(listing.full_name.clone());
        self.resolve_dependencies(&version.dependencies).await;
        let files = install_version(self.installer, &version).await;
        self.installing.pop();

        Ok(InstalledMod {
            name: listing.name.clone(),
            full_name: listing.full_name.clone(),
            url: listing.package_url.clone(),
            version: version.version_number.clone(),
            uuid4: listing.uuid4.clone(),
            files: files?,
        })
    }

    /// Install every dependency that is not in the ledger yet. Failures are
    /// logged and do not stop the dependent installation.
    async fn resolve_dependencies(&mut self, identifiers: &[String]) {
        for dependency in missing_dependencies(&self.modpack, identifiers) {
            if self.installing.contains(&dependency.full_name) {
                debug!("{} is already being installed", dependency.full_name);
                continue;
            }
            // An earlier dependency may have pulled this one in
            if self.modpack.lookup(&dependency.full_name).is_some() {
                continue;
            }

            info!(
                "Installing dependency {} (requested {})",
                dependency.full_name, dependency.version
            );
            if let Err(e) = self.add_mod(&dependency.full_name).await {
                warn!("Dependency {} was not installed: {}", dependency.full_name, e);
            }
        }
    }

    /// Delete the tracked files of a mod and drop it from the ledger.
    pub fn remove_mod(&mut self, identifier: &str) -> Result<InstalledMod> {
        self.modpack.uninstall(self.runtime, identifier)
    }

    /// Reinstall a mod when the registry has a newer version.
    ///
    /// Dependencies and the new archive are fetched before the old files are
    /// deleted, so a registry or download failure leaves the mod untouched.
    /// A failed extraction after the deletion leaves the mod uninstalled.
    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn update_mod(&mut self, identifier: &str) -> Result<UpdateStatus> {
        let installed = self
            .modpack
            .lookup(identifier)
            .cloned()
            .ok_or_else(|| ModError::NotInstalled(identifier.to_string()))?;

        let remote = self.registry.fetch_package(&installed.uuid4).await?;
        let latest = latest_version(&remote)?;

        if latest.version_number == installed.version {
            info!("{} is up to date", installed.full_name);
            return Ok(UpdateStatus::UpToDate {
                version: installed.version,
            });
        }

        info!(
            "{} has the new version {}",
            installed.full_name, latest.version_number
        );

        self.installing.push(installed.full_name.clone());
        self.resolve_dependencies(&latest.dependencies).await;
        let archive = self.installer.download(&latest.download_url).await;
        self.installing.pop();
        let archive = archive?;

        self.modpack.delete_files(self.runtime, &installed)?;
        let files = match self.installer.extract(&archive) {
            Ok(files) => files,
            Err(e) => {
                self.modpack.remove(&installed.full_name);
                return Err(e.context(format!(
                    "{} was removed but its new version could not be installed",
                    installed.full_name
                )));
            }
        };

        let updated = InstalledMod {
            name: remote.name.clone(),
            full_name: remote.full_name.clone(),
            url: remote.package_url.clone(),
            version: latest.version_number.clone(),
            uuid4: remote.uuid4.clone(),
            files,
        };
        self.modpack.replace(&installed.full_name, updated)?;

        Ok(UpdateStatus::Updated {
            from: installed.version,
            to: latest.version_number,
        })
    }

    /// Update every mod except the base framework. A failing mod is skipped.
    pub async fn update_all(&mut self) -> UpdateSummary {
        let mut summary = UpdateSummary::default();
        let full_names: Vec<String> = self
            .modpack
            .mods()
            .iter()
            .map(|m| m.full_name.clone())
            .collect();

        for full_name in full_names {
            if full_name == BASE_FRAMEWORK {
                continue;
            }
            match self.update_mod(&full_name).await {
                Ok(UpdateStatus::UpToDate { .. }) => summary.up_to_date.push(full_name),
                Ok(UpdateStatus::Updated { .. }) => summary.updated.push(full_name),
                Err(e) => {
                    warn!("{} was skipped: {:#}", full_name, e);
                    summary.skipped.push(full_name);
                }
            }
        }

        summary
    }
}
