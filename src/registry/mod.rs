//! Remote package registry.
//!
//! Listings are decoded fresh on every query and never persisted, apart from
//! the diagnostic catalog dump written by [`ThunderstoreRegistry`].

mod thunderstore;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub use thunderstore::{CATALOG_CACHE_FILE, DEFAULT_API_URL, ThunderstoreRegistry};

/// A catalog entry of the registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackageListing {
    pub name: String,
    /// Namespace-qualified unique key, e.g. `Acme-Tool`
    pub full_name: String,
    pub package_url: String,
    pub uuid4: String,
    /// Most recent first
    #[serde(default)]
    pub versions: Vec<PackageVersion>,
}

impl PackageListing {
    /// The most recent version, if the package has any.
    pub fn latest(&self) -> Option<&PackageVersion> {
        self.versions.first()
    }

    /// Whether `identifier` names this listing by display name, full name or URL.
    pub fn matches(&self, identifier: &str) -> bool {
        self.name == identifier || self.full_name == identifier || self.package_url == identifier
    }
}

/// One published version of a package.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackageVersion {
    pub version_number: String,
    pub download_url: String,
    /// Dependency identifiers, `<full_name>-<version_number>`
    #[serde(default)]
    pub dependencies: Vec<String>,
}

/// A dependency identifier split into package and version.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DependencyId {
    pub full_name: String,
    pub version: String,
}

impl fmt::Display for DependencyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.full_name, self.version)
    }
}

impl FromStr for DependencyId {
    type Err = anyhow::Error;

    /// The version is everything after the last dash; full names may contain dashes.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.rsplit_once('-') {
            Some((full_name, version)) if !full_name.is_empty() && !version.is_empty() => {
                Ok(DependencyId {
                    full_name: full_name.to_string(),
                    version: version.to_string(),
                })
            }
            _ => anyhow::bail!(
                "Invalid dependency identifier '{}'. Expected '<full_name>-<version>'.",
                s
            ),
        }
    }
}

/// Read access to a package registry.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Registry: Send + Sync {
    /// Fetch every listing of the registry.
    async fn fetch_catalog(&self) -> Result<Vec<PackageListing>>;

    /// Fetch a single listing by its stable identifier.
    async fn fetch_package(&self, uuid4: &str) -> Result<PackageListing>;
}
