//! pathfinder: discover forum listing structure and harvest threads.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use forum_pathfinder::{
    url_utils, AutoOperator, Config, ConsoleOperator, ExploreSettings, Explorer, HarvestSettings, Harvester,
    HttpFetcher, MemoryRepository, Operator, OriginCategory,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "pathfinder")]
#[command(about = "Selector-free structure discovery and harvesting for forum thread listings")]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config.json")]
    config: PathBuf,

    /// Record store snapshot, relative to the configured root path
    #[arg(short, long, default_value = "pathfinder-store.json")]
    store: PathBuf,

    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Discover and store the path profile of a forum
    Explore {
        /// First thread-listing page of the forum
        url: String,

        /// Listing pages to analyze
        #[arg(short, long)]
        pages: Option<usize>,

        /// Thread pages to sample
        #[arg(short, long)]
        threads: Option<usize>,

        /// Never route clearweb requests through the proxy list
        #[arg(long)]
        no_proxy: bool,

        /// Accept the discovered paths without prompting
        #[arg(short, long)]
        yes: bool,
    },

    /// Replay stored profiles and collect new threads
    Harvest {
        /// Harvest darkweb origins instead of clearweb ones
        #[arg(long)]
        dark: bool,

        /// Never route clearweb requests through the proxy list
        #[arg(long)]
        no_proxy: bool,
    },

    /// Write the default configuration file
    InitConfig,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Commands::InitConfig = cli.command {
        init_tracing(cli.verbose, false);
        Config::write_default(&cli.config)
            .with_context(|| format!("writing {}", cli.config.display()))?;
        info!(path = %cli.config.display(), "default configuration written");
        return Ok(());
    }

    let loaded = load_config(&cli.config)?;
    init_tracing(cli.verbose, loaded.as_ref().is_some_and(|c| c.web.default_verbose));
    if loaded.is_none() {
        warn!(path = %cli.config.display(), "no configuration file, using defaults");
    }
    let config = loaded.unwrap_or_default();
    let store_path = config.resolve(&cli.store);
    let repository = MemoryRepository::load(&store_path)
        .with_context(|| format!("loading store {}", store_path.display()))?;
    let fetcher = HttpFetcher::new(&config.fetch_settings()).context("building HTTP clients")?;
    let options = config.classifier_options();

    match cli.command {
        Commands::Explore {
            url,
            pages,
            threads,
            no_proxy,
            yes,
        } => {
            let start = url_utils::parse_url(&url)?;
            let mut settings = ExploreSettings::from_config(&config);
            if let Some(pages) = pages {
                settings.pages_to_analyze = pages.max(1);
            }
            if let Some(threads) = threads {
                settings.max_sample_threads = threads.max(1);
            }
            settings.use_proxy &= !no_proxy;

            let operator: Box<dyn Operator> = if yes {
                Box::new(AutoOperator)
            } else {
                Box::new(ConsoleOperator::stdio())
            };
            let explorer = Explorer::new(&fetcher, &repository, operator.as_ref(), &options, settings);
            let profile = explorer.explore(&start)?;
            println!("{}", serde_json::to_string_pretty(&profile)?);
        }
        Commands::Harvest { dark, no_proxy } => {
            let category = if dark {
                OriginCategory::Darkweb
            } else {
                OriginCategory::Clearweb
            };
            let mut settings = HarvestSettings::from_config(&config);
            settings.use_proxy &= !no_proxy;

            let report = Harvester::new(&fetcher, &repository, settings).run(category)?;
            println!(
                "visited {} origins ({} unreachable, {} without profile), {} listing pages, {} threads stored, {} skipped",
                report.origins_visited,
                report.origins_unreachable,
                report.origins_without_profile,
                report.listing_pages,
                report.threads_stored,
                report.threads_skipped
            );
        }
        Commands::InitConfig => {}
    }

    repository
        .save(&store_path)
        .with_context(|| format!("saving store {}", store_path.display()))?;
    Ok(())
}

/// `default_verbose` from the config raises the quiet default to debug.
fn init_tracing(verbose: u8, default_verbose: bool) {
    let default_level = match verbose {
        0 if default_verbose => "debug",
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();
}

/// `None` when there is no configuration file.
fn load_config(path: &Path) -> Result<Option<Config>> {
    if path.exists() {
        Config::load(path)
            .map(Some)
            .with_context(|| format!("loading {}", path.display()))
    } else {
        Ok(None)
    }
}
