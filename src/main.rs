use anyhow::Result;
use clap::Parser;
use modpack::commands::{self, CommandContext};
use modpack::runtime::RealRuntime;
use std::path::PathBuf;

/// modpack - Thunderstore modpack manager
///
/// Add, remove and update BepInEx mods of a modpack and release snapshots of
/// it as zip files.
///
/// The workspace directory must contain a config.json:
///   {"prefix": "MyPack", "release_dir": "releases"}
///
/// Examples:
///   modpack mods add MoreCompany        # Install a mod and its dependencies
///   modpack mods update                 # Update every mod of the pack
///   modpack version release 1.0         # Zip the pack as MyPack-1.0.zip
#[derive(Parser, Debug)]
#[command(author, version = env!("MODPACK_VERSION"), about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Workspace directory (defaults to the current directory; also via MODPACK_ROOT)
    #[arg(
        long = "root",
        short = 'r',
        env = "MODPACK_ROOT",
        value_name = "PATH",
        global = true
    )]
    pub root: Option<PathBuf>,

    /// Registry API URL (overrides config.json)
    #[arg(long = "api-url", value_name = "URL", global = true)]
    pub api_url: Option<String>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Manage the mods of the current modpack
    #[command(subcommand)]
    Mods(ModsCommand),

    /// Manage released versions of the modpack
    #[command(subcommand)]
    Version(VersionCommand),
}

#[derive(clap::Subcommand, Debug)]
enum ModsCommand {
    /// Add a mod and its missing dependencies
    Add(NameArgs),

    /// Remove a mod and delete its files
    Remove(NameArgs),

    /// Update one mod, or all mods when no name is given
    Update(OptionalNameArgs),

    /// List installed mods
    List,
}

#[derive(clap::Subcommand, Debug)]
enum VersionCommand {
    /// Save the current modpack as a new version
    Release(VersionArgs),

    /// Reset the current modpack to a version
    Switch(VersionArgs),

    /// List released versions
    List,
}

#[derive(clap::Args, Debug)]
pub struct NameArgs {
    /// Mod name, full name (Namespace-Name) or package URL
    #[arg(value_name = "NAME")]
    pub name: String,
}

#[derive(clap::Args, Debug)]
pub struct OptionalNameArgs {
    /// Mod name, full name (Namespace-Name) or package URL
    #[arg(value_name = "NAME")]
    pub name: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct VersionArgs {
    /// Version name
    #[arg(value_name = "NAME")]
    pub name: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    let ctx = CommandContext::open(RealRuntime, cli.root, cli.api_url)?;

    let interrupt = ctx.watch_interrupt();
    let result = run(&ctx, cli.command).await;
    interrupt.abort();
    result
}

async fn run(ctx: &CommandContext<RealRuntime>, command: Commands) -> Result<()> {
    match command {
        Commands::Mods(ModsCommand::Add(args)) => commands::mods::add(ctx, &args.name).await,
        Commands::Mods(ModsCommand::Remove(args)) => commands::mods::remove(ctx, &args.name),
        Commands::Mods(ModsCommand::Update(args)) => {
            commands::mods::update(ctx, args.name.as_deref()).await
        }
        Commands::Mods(ModsCommand::List) => commands::mods::list(ctx),
        Commands::Version(VersionCommand::Release(args)) => {
            commands::version::release(ctx, &args.name)
        }
        Commands::Version(VersionCommand::Switch(args)) => {
            commands::version::switch(ctx, &args.name)
        }
        Commands::Version(VersionCommand::List) => commands::version::list(ctx),
    }
}
