//! CLI entry point for folio

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use folio::config::FetchTiming;

#[derive(Parser)]
#[command(name = "folio")]
#[command(version)]
#[command(about = "A portfolio and blog site rendered from Contentful entries", long_about = None)]
struct Cli {
    /// Set the base directory (defaults to current directory)
    #[arg(short, long, global = true)]
    cwd: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    /// Read content from a JSON fixture instead of Contentful
    #[arg(long, global = true)]
    fixtures: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the site server
    #[command(alias = "s")]
    Serve {
        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,

        /// IP address to bind to
        #[arg(short, long)]
        ip: Option<String>,

        /// When content is fetched relative to page delivery
        #[arg(short, long, value_enum)]
        timing: Option<FetchTiming>,
    },

    /// Render all pages into the public folder
    #[command(alias = "g")]
    Generate,

    /// List entries from the content store
    List {
        /// Type of content to list (works, posts)
        #[arg(default_value = "works")]
        r#type: String,
    },

    /// Remove the public folder
    Clean,

    /// Display version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "folio=debug,info"
    } else {
        "folio=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine base directory
    let base_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };
    let fixtures = cli.fixtures.as_deref();

    match cli.command {
        Commands::Serve { port, ip, timing } => {
            let site = folio::Folio::new(&base_dir)?;
            let server_config = &site.config.server;
            let timing = timing.unwrap_or(server_config.timing);
            let ip = ip.unwrap_or_else(|| server_config.ip.clone());
            let port = port.unwrap_or(server_config.port);

            let store = site.open_store(fixtures)?;
            let composer = Arc::new(site.composer(store)?);
            if timing == FetchTiming::Build {
                tracing::info!("Rendering pages before serving...");
            }
            let pages = folio::pages::for_timing(timing, composer.clone()).await?;

            let state = folio::server::ServerState::new(pages, composer, site.static_dir.clone());
            folio::server::start(state, &ip, port).await?;
        }

        Commands::Generate => {
            let site = folio::Folio::new(&base_dir)?;
            let store = site.open_store(fixtures)?;
            tracing::info!("Generating static files...");
            folio::commands::generate::run(&site, store).await?;
            println!("Generated successfully!");
        }

        Commands::List { r#type } => {
            let site = folio::Folio::new(&base_dir)?;
            let store = site.open_store(fixtures)?;
            folio::commands::list::run(store, &r#type).await?;
        }

        Commands::Clean => {
            let site = folio::Folio::new(&base_dir)?;
            tracing::info!("Cleaning public folder...");
            site.clean()?;
            println!("Cleaned successfully!");
        }

        Commands::Version => {
            println!("folio version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
