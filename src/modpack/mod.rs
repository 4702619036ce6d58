//! The installed-mod ledger and the engine that keeps it in sync with the
//! registry and the modpack directory.

mod dependency;
mod manager;
mod modfile;

pub use dependency::missing_dependencies;
pub use manager::{BASE_FRAMEWORK, ModpackManager, UpdateStatus, UpdateSummary};
pub use modfile::{InstalledMod, MODFILE_NAME, Modpack};
