use anyhow::Result;

use crate::runtime::Runtime;

use super::CommandContext;

/// Release the current modpack directory as version `name`.
#[tracing::instrument(level = "debug", skip(ctx))]
pub fn release<R: Runtime>(ctx: &CommandContext<R>, name: &str) -> Result<()> {
    let mut archiver = ctx.load_archiver()?;
    let result = archiver
        .release(name, &ctx.workspace.modpack_dir())
        .map(|snapshot| println!("Released {}", snapshot.file));
    archiver.save()?;
    result
}

/// Reset the modpack directory to version `name`.
#[tracing::instrument(level = "debug", skip(ctx))]
pub fn switch<R: Runtime>(ctx: &CommandContext<R>, name: &str) -> Result<()> {
    ctx.load_archiver()?.restore(name)
}

/// Print the released versions.
#[tracing::instrument(level = "debug", skip(ctx))]
pub fn list<R: Runtime>(ctx: &CommandContext<R>) -> Result<()> {
    let archiver = ctx.load_archiver()?;
    println!("Versions:");
    for v in archiver.list() {
        println!("Version {}, created {}, zip: {}", v.name, v.date, v.file);
    }
    Ok(())
}
