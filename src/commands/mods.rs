use anyhow::Result;
use log::info;

use crate::error::{ModError, kind_of};
use crate::modpack::{InstalledMod, ModpackManager};
use crate::runtime::Runtime;

use super::CommandContext;

/// Add a mod by name, full name or package URL.
#[tracing::instrument(level = "debug", skip(ctx))]
pub async fn add<R: Runtime>(ctx: &CommandContext<R>, name: &str) -> Result<()> {
    let http_client = ctx.http_client()?;
    let registry = ctx.registry(http_client.clone());
    let installer = ctx.installer(http_client);
    let mut manager = ModpackManager::new(&ctx.runtime, &registry, &installer, ctx.load_modpack()?);

    let result = manager.add_mod(name).await;
    ctx.save_modpack(manager)?;

    if let Err(e) = &result
        && let Some(ModError::AmbiguousName { candidates, .. }) = kind_of(e)
    {
        println!("The following mods were found:");
        for candidate in candidates {
            println!("{}, URL: {}", candidate.full_name, candidate.package_url);
        }
        println!("Please try again with one of the names above");
    }
    result
}

/// Remove a mod and its files.
#[tracing::instrument(level = "debug", skip(ctx))]
pub fn remove<R: Runtime>(ctx: &CommandContext<R>, name: &str) -> Result<()> {
    let mut modpack = ctx.load_modpack()?;
    let result = modpack.uninstall(&ctx.runtime, name).map(|_| ());
    modpack.save(&ctx.runtime)?;
    result
}

/// Update one mod, or every mod when `name` is `None`.
#[tracing::instrument(level = "debug", skip(ctx))]
pub async fn update<R: Runtime>(ctx: &CommandContext<R>, name: Option<&str>) -> Result<()> {
    let http_client = ctx.http_client()?;
    let registry = ctx.registry(http_client.clone());
    let installer = ctx.installer(http_client);
    let mut manager = ModpackManager::new(&ctx.runtime, &registry, &installer, ctx.load_modpack()?);

    let result = match name {
        Some(name) => manager.update_mod(name).await.map(|_| ()),
        None => {
            let summary = manager.update_all().await;
            info!(
                "{} updated, {} up to date, {} skipped",
                summary.updated.len(),
                summary.up_to_date.len(),
                summary.skipped.len()
            );
            Ok(())
        }
    };
    ctx.save_modpack(manager)?;
    result
}

/// Print the installed mods.
#[tracing::instrument(level = "debug", skip(ctx))]
pub fn list<R: Runtime>(ctx: &CommandContext<R>) -> Result<()> {
    let modpack = ctx.load_modpack()?;
    print_mods(modpack.mods());
    Ok(())
}

fn print_mods(mods: &[InstalledMod]) {
    println!("Installed mods:");
    for m in mods {
        println!("{}, Version: {}, Link: {}", m.name, m.version, m.url);
    }
    println!("{} mods in total", mods.len());
}
