pub mod archive;
pub mod commands;
pub mod config;
pub mod error;
pub mod http;
pub mod install;
pub mod ledger;
pub mod lock;
pub mod modpack;
pub mod registry;
pub mod runtime;
pub mod version;
