//! Command implementations behind the CLI.
//!
//! Every command runs against a [`CommandContext`], which resolves the
//! workspace, loads `config.json` and holds the workspace lock until the
//! command finishes.

mod context;
pub mod mods;
pub mod version;
mod workspace;

pub use context::CommandContext;
pub use workspace::{MODPACK_DIR, TEMPLATE_DIR, Workspace};
