//! Everything a command needs: runtime, workspace, configuration and the
//! workspace lock.

use anyhow::Result;
use std::path::PathBuf;
use tokio::task::JoinHandle;

use crate::config::Config;
use crate::http::{HttpClient, build_client};
use crate::install::ArchiveInstaller;
use crate::lock::{WorkspaceLock, remove_lock_file};
use crate::modpack::{ModpackManager, Modpack};
use crate::registry::ThunderstoreRegistry;
use crate::runtime::Runtime;
use crate::version::VersionArchiver;

use super::workspace::Workspace;

pub struct CommandContext<R: Runtime> {
    pub runtime: R,
    pub workspace: Workspace,
    pub config: Config,
    lock: Option<WorkspaceLock>,
}

impl<R: Runtime> CommandContext<R> {
    /// Resolve the workspace, read its configuration, take the lock and make
    /// sure the modpack directory and ledgers exist.
    #[tracing::instrument(level = "debug", skip(runtime))]
    pub fn open(runtime: R, root: Option<PathBuf>, api_url: Option<String>) -> Result<Self> {
        let workspace = Workspace::resolve(&runtime, root)?;
        let config = Config::load(&runtime, workspace.root())?.with_api_url(api_url);
        let lock = WorkspaceLock::acquire(&runtime, &workspace.lock_path())?;
        if let Err(e) = workspace.prepare(&runtime) {
            lock.release(&runtime);
            return Err(e);
        }

        Ok(Self {
            runtime,
            workspace,
            config,
            lock: Some(lock),
        })
    }

    pub fn http_client(&self) -> Result<HttpClient> {
        Ok(HttpClient::new(build_client(self.config.timeout())?))
    }

    pub fn registry(&self, http_client: HttpClient) -> ThunderstoreRegistry<'_, R> {
        ThunderstoreRegistry::new(&self.runtime, http_client, &self.config.api_url)
            .with_cache_file(self.workspace.catalog_cache_path())
    }

    pub fn installer(&self, http_client: HttpClient) -> ArchiveInstaller<'_, R> {
        ArchiveInstaller::new(&self.runtime, http_client, self.workspace.modpack_dir())
    }

    pub fn load_modpack(&self) -> Result<Modpack> {
        Modpack::load(&self.runtime, self.workspace.modpack_dir())
    }

    pub fn load_archiver(&self) -> Result<VersionArchiver<'_, R>> {
        VersionArchiver::load(&self.runtime, self.workspace.versions_path(), &self.config)
    }

    /// Persist the modpack ledger of a finished manager.
    pub fn save_modpack(&self, manager: ModpackManager<'_, R>) -> Result<()> {
        let mut modpack = manager.into_modpack();
        modpack.save(&self.runtime)
    }
}

impl<R: Runtime + Clone + 'static> CommandContext<R> {
    /// Remove the workspace lock and exit with 130 when Ctrl-C arrives.
    ///
    /// Abort the returned task once the command has finished.
    pub fn watch_interrupt(&self) -> JoinHandle<()> {
        let runtime = self.runtime.clone();
        let lock_path = self.workspace.lock_path();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                eprintln!("\nInterrupted, cleaning up...");
                remove_lock_file(&runtime, &lock_path);
                std::process::exit(130);
            }
        })
    }
}

impl<R: Runtime> Drop for CommandContext<R> {
    fn drop(&mut self) {
        if let Some(lock) = self.lock.take() {
            lock.release(&self.runtime);
        }
    }
}
