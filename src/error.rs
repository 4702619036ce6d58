//! Failure kinds of the modpack engine.
//!
//! Operations return `anyhow::Result`; when a caller needs to react to a
//! specific kind it recovers it with `downcast_ref::<ModError>()`.

use std::fmt;
use std::path::PathBuf;

/// A registry entry offered to the user when a name matches several packages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub full_name: String,
    pub package_url: String,
}

#[derive(Debug)]
pub enum ModError {
    /// The registry answered with a non-success status or could not be reached
    RegistryUnavailable { url: String, reason: String },
    /// No registry entry matches the identifier
    NotFound(String),
    /// More than one registry entry matches the identifier
    AmbiguousName {
        name: String,
        candidates: Vec<Candidate>,
    },
    /// The mod is already part of the modpack
    AlreadyInstalled(String),
    /// The mod is not part of the modpack
    NotInstalled(String),
    /// A package archive could not be downloaded
    DownloadFailed { url: String, reason: String },
    /// A tracked file could not be deleted
    FileDeletionError { path: PathBuf, reason: String },
    /// A version snapshot with this name already exists
    VersionExists(String),
    /// The operation has no implementation
    NotImplemented(&'static str),
    /// A ledger file could not be decoded
    MalformedLedger { path: PathBuf, reason: String },
}

impl fmt::Display for ModError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModError::RegistryUnavailable { url, reason } => {
                write!(f, "Registry unavailable at {}: {}", url, reason)
            }
            ModError::NotFound(name) => write!(
                f,
                "No mod named \"{}\" was found. Names are case-sensitive.",
                name
            ),
            ModError::AmbiguousName { name, candidates } => write!(
                f,
                "There are {} mods named \"{}\"",
                candidates.len(),
                name
            ),
            ModError::AlreadyInstalled(name) => {
                write!(f, "{} is already part of the modpack", name)
            }
            ModError::NotInstalled(name) => write!(f, "{} is not part of the modpack", name),
            ModError::DownloadFailed { url, reason } => {
                write!(f, "Failed to download {}: {}", url, reason)
            }
            ModError::FileDeletionError { path, reason } => {
                write!(f, "Failed to delete {:?}: {}", path, reason)
            }
            ModError::VersionExists(name) => write!(f, "Version {} already exists", name),
            ModError::NotImplemented(what) => write!(f, "{} is not implemented yet", what),
            ModError::MalformedLedger { path, reason } => {
                write!(f, "Malformed ledger {:?}: {}", path, reason)
            }
        }
    }
}

impl std::error::Error for ModError {}

/// Returns the [`ModError`] carried by an `anyhow::Error`, if any.
pub fn kind_of(error: &anyhow::Error) -> Option<&ModError> {
    error.downcast_ref::<ModError>()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_not_found_mentions_case() {
        let err = ModError::NotFound("moreCompany".into());
        let msg = err.to_string();
        assert!(msg.contains("moreCompany"));
        assert!(msg.contains("case-sensitive"));
    }

    #[test]
    fn test_display_ambiguous_counts_candidates() {
        let err = ModError::AmbiguousName {
            name: "Tool".into(),
            candidates: vec![
                Candidate {
                    full_name: "Acme-Tool".into(),
                    package_url: "https://example.com/Acme/Tool/".into(),
                },
                Candidate {
                    full_name: "Other-Tool".into(),
                    package_url: "https://example.com/Other/Tool/".into(),
                },
            ],
        };
        assert_eq!(err.to_string(), "There are 2 mods named \"Tool\"");
    }

    #[test]
    fn test_kind_of_downcasts_through_anyhow() {
        let err = anyhow::Error::from(ModError::VersionExists("v1".into()));
        assert!(matches!(kind_of(&err), Some(ModError::VersionExists(n)) if n == "v1"));

        let other = anyhow::anyhow!("plain failure");
        assert!(kind_of(&other).is_none());
    }

    #[test]
    fn test_kind_of_survives_context() {
        use anyhow::Context;
        let result: anyhow::Result<()> = Err(ModError::NotInstalled("X".into()).into());
        let err = result.context("while removing").unwrap_err();
        assert!(matches!(kind_of(&err), Some(ModError::NotInstalled(_))));
    }
}
