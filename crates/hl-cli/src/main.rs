use std::io::Write;

use anyhow::{Context, Result};
use clap::Parser;
use hl_core::{Clock, FixedClock, SystemClock};
use tracing_subscriber::EnvFilter;

use hl_cli::commands::{claim, import, log, remove, settz, showlog, stats, tally, util, vs};
use hl_cli::{Cli, Commands, Config};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    let Some(command) = &cli.command else {
        // No subcommand, show help
        use clap::CommandFactory;
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    let config = Config::load_from(cli.config.as_deref()).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    // Held until main returns, covering load, mutation and save.
    let _lock = if command.is_mutating() {
        Some(util::lock_store(&config)?)
    } else {
        None
    };

    let fixed = config.now.map(FixedClock);
    let clock: &dyn Clock = match &fixed {
        Some(fixed) => fixed,
        None => &SystemClock,
    };
    let mut tracker = util::open_tracker(&config, clock)?;
    let user = || config.identity(cli.user.as_deref(), cli.name.as_deref());
    let mut out = std::io::stdout().lock();

    match command {
        Commands::SetTimezone(args) => settz::run(&mut out, &mut tracker, &user()?, args)?,
        Commands::Log(args) => log::run(&mut out, &mut tracker, &user()?, args)?,
        Commands::Remove(args) => remove::run(&mut out, &mut tracker, &user()?, args)?,
        Commands::ShowLog => showlog::run(&mut out, &tracker, &user()?)?,
        Commands::Tally => tally::run(&mut out, &tracker, &user()?)?,
        Commands::Stats(args) => stats::run(&mut out, &tracker, &user()?, args)?,
        Commands::Vs(args) => vs::run(&mut out, &tracker, &user()?, args)?,
        Commands::Import(args) => import::run(&mut out, &mut tracker, args)?,
        Commands::Claim => claim::run(&mut out, &mut tracker, &user()?)?,
    }

    out.flush()?;
    Ok(())
}
