//! srcfetch CLI - fetch and stage package sources
//!
//! Usage:
//!   srcfetch fetch <url> --name foo --version 1.0     Populate/update the cache
//!   srcfetch stage <url> --name foo --version 1.0     Fetch, then unpack here

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use levitate_fetch::{
    Config, DownloadStrategy, NoExtractArchiveStrategy, Origin, Pin, SystemRunner, config,
    strategy_for,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "srcfetch")]
#[command(about = "Fetch and stage package sources")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Cache directory for downloaded and checked-out sources
    #[arg(long, global = true, env = config::CACHE_ENV)]
    cache_root: Option<PathBuf>,

    /// Show external tool output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Download or update the cache entry for a source
    Fetch {
        #[command(flatten)]
        source: SourceArgs,
    },

    /// Fetch, then materialize a clean copy into a build directory
    Stage {
        #[command(flatten)]
        source: SourceArgs,

        /// Destination directory (current directory if not given)
        #[arg(long)]
        dest: Option<PathBuf>,
    },
}

#[derive(Args)]
struct SourceArgs {
    /// Origin URL (archive, git, svn, cvs, or hg)
    url: String,

    /// Package name (without it, cache entries are named by URL basename)
    #[arg(long, default_value = "unknown")]
    name: String,

    /// Package version
    #[arg(long, default_value = "0")]
    version: String,

    /// Check out this branch before staging
    #[arg(long)]
    branch: Option<String>,

    /// Check out this tag before staging
    #[arg(long)]
    tag: Option<String>,

    /// Export exactly this revision
    #[arg(long)]
    revision: Option<String>,

    /// Keep the downloaded file exactly as-is (no extraction)
    #[arg(long)]
    no_extract: bool,
}

impl SourceArgs {
    fn origin(&self) -> Origin {
        let mut origin = Origin::new(&self.url, &self.name, &self.version);
        if let Some(pin) = Pin::first_of(
            self.branch.clone(),
            self.tag.clone(),
            self.revision.clone(),
        ) {
            origin = origin.with_pin(pin);
        }
        origin
    }

    fn strategy<'a>(
        &self,
        config: &'a Config,
        runner: &'a SystemRunner,
    ) -> Box<dyn DownloadStrategy + 'a> {
        if self.no_extract {
            Box::new(NoExtractArchiveStrategy::new(self.origin(), config, runner))
        } else {
            strategy_for(self.origin(), config, runner)
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let cache_root = cli.cache_root.unwrap_or_else(Config::default_cache_root);
    let config = Config::new(cache_root, cli.verbose);
    let runner = SystemRunner::new(config.verbose);

    match cli.command {
        Commands::Fetch { source } => {
            let strategy = source.strategy(&config, &runner);
            let cached = strategy.fetch()?;
            println!("{}", cached.display());
        }
        Commands::Stage { source, dest } => {
            let dest = match dest {
                Some(dir) => dir,
                None => std::env::current_dir().context("cannot resolve current directory")?,
            };
            std::fs::create_dir_all(&dest)
                .with_context(|| format!("cannot create {}", dest.display()))?;

            let strategy = source.strategy(&config, &runner);
            strategy.fetch()?;
            strategy.stage(&dest)?;
        }
    }

    Ok(())
}
