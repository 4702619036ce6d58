//! Archive installer: downloads a package version and extracts the parts the
//! plugin layout selects into the modpack directory.

use std::path::PathBuf;

use anyhow::Result;
use async_trait::async_trait;
use log::{debug, info};

use crate::archive::{PluginLayout, extract_routed};
use crate::error::ModError;
use crate::http::HttpClient;
use crate::registry::PackageVersion;
use crate::runtime::Runtime;

/// Download and extraction of package archives.
///
/// The two steps are separate so an update can fetch the new archive before
/// the old files are removed.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Installer: Send + Sync {
    /// Fetch a package archive into memory.
    async fn download(&self, url: &str) -> Result<Vec<u8>>;

    /// Extract an archive into the modpack, returning the installed file manifest.
    fn extract(&self, archive: &[u8]) -> Result<Vec<String>>;
}

/// Download `version` and install it, returning its file manifest.
///
/// A failed download leaves the modpack directory untouched.
#[tracing::instrument(
    level = "debug",
    skip(installer, version),
    fields(version = %version.version_number)
)]
pub async fn install_version(
    installer: &dyn Installer,
    version: &PackageVersion,
) -> Result<Vec<String>> {
    let archive = installer.download(&version.download_url).await?;
    installer.extract(&archive)
}

/// [`Installer`] writing into a modpack directory on disk.
pub struct ArchiveInstaller<'a, R: Runtime> {
    runtime: &'a R,
    http_client: HttpClient,
    target_dir: PathBuf,
    layout: PluginLayout,
}

impl<'a, R: Runtime> ArchiveInstaller<'a, R> {
    pub fn new(runtime: &'a R, http_client: HttpClient, target_dir: impl Into<PathBuf>) -> Self {
        Self {
            runtime,
            http_client,
            target_dir: target_dir.into(),
            layout: PluginLayout::default(),
        }
    }
}

#[async_trait]
impl<'a, R: Runtime> Installer for ArchiveInstaller<'a, R> {
    async fn download(&self, url: &str) -> Result<Vec<u8>> {
        info!("Downloading {}...", url);
        self.http_client.get_bytes(url).await.map_err(|e| {
            ModError::DownloadFailed {
                url: url.to_string(),
                reason: e.to_string(),
            }
            .into()
        })
    }

    fn extract(&self, archive: &[u8]) -> Result<Vec<String>> {
        let files = extract_routed(self.runtime, archive, &self.target_dir, &self.layout)?;
        debug!("Installed {} file(s) into {:?}", files.len(), self.target_dir);
        Ok(files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::zip::tests::build_zip;
    use crate::http::{DEFAULT_TIMEOUT_SECS, build_client};
    use crate::runtime::{MockRuntime, RealRuntime};
    use std::time::Duration;
    use tempfile::tempdir;

    fn http() -> HttpClient {
        HttpClient::new(build_client(Duration::from_secs(DEFAULT_TIMEOUT_SECS)).unwrap())
    }

    fn version(url: String) -> PackageVersion {
        PackageVersion {
            version_number: "1.0.0".into(),
            download_url: url,
            dependencies: vec![],
        }
    }

    #[tokio::test]
    async fn test_install_version_extracts_plugins() {
        let mut server = mockito::Server::new_async().await;
        let archive = build_zip(&[
            ("manifest.json", "{}"),
            ("Tool.dll", "plugin"),
            ("BepInEx/config/Tool.cfg", "cfg"),
        ]);
        let mock = server
            .mock("GET", "/download/Acme/Tool/1.0.0/")
            .with_status(200)
            .with_body(archive)
            .create_async()
            .await;

        let dir = tempdir().unwrap();
        let runtime = RealRuntime;
        let installer = ArchiveInstaller::new(&runtime, http(), dir.path());

        let files = install_version(
            &installer,
            &version(format!("{}/download/Acme/Tool/1.0.0/", server.url())),
        )
        .await
        .unwrap();

        mock.assert_async().await;
        assert_eq!(files, vec!["BepInEx/plugins/Tool.dll", "BepInEx/config/Tool.cfg"]);
        assert!(dir.path().join("BepInEx/plugins/Tool.dll").is_file());
        assert!(dir.path().join("BepInEx/config/Tool.cfg").is_file());
    }

    #[tokio::test]
    async fn test_install_version_download_failed_writes_nothing() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/download/missing/")
            .with_status(404)
            .create_async()
            .await;

        // Strict mock: extraction must never start
        let runtime = MockRuntime::new();
        let installer = ArchiveInstaller::new(&runtime, http(), "/modpack/current");

        let err = install_version(&installer, &version(format!("{}/download/missing/", server.url())))
            .await
            .unwrap_err();

        mock.assert_async().await;
        assert!(matches!(
            err.downcast_ref::<ModError>(),
            Some(ModError::DownloadFailed { .. })
        ));
    }

    #[tokio::test]
    async fn test_install_version_uses_installer_steps() {
        let mut installer = MockInstaller::new();
        installer
            .expect_download()
            .with(mockall::predicate::eq("https://example.com/dl/"))
            .times(1)
            .returning(|_| Ok(b"zip".to_vec()));
        installer
            .expect_extract()
            .times(1)
            .returning(|_| Ok(vec!["BepInEx/plugins/Tool.dll".to_string()]));

        let files = install_version(&installer, &version("https://example.com/dl/".into()))
            .await
            .unwrap();
        assert_eq!(files, vec!["BepInEx/plugins/Tool.dll"]);
    }
}
