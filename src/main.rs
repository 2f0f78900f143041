//! Asset Pricing CLI Application
//!
//! A command-line interface for compiling pricing scripts, querying asset
//! prices and serving the REST API.

use asset_pricing::api::{create_router, ApiState};
use asset_pricing::asset::AssetRegistry;
use asset_pricing::cli::{self, ServerConfig, DEFAULT_ASSETS_FILE};
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "pricing")]
#[command(author = "Darshan")]
#[command(version = "0.1.0")]
#[command(about = "Scriptable multi-currency asset pricing", long_about = None)]
struct Cli {
    /// JSON file with the asset definitions
    #[arg(short, long, default_value = DEFAULT_ASSETS_FILE)]
    assets: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a pricing script (.asm) into a state config
    Compile {
        /// Script source file
        #[arg(short, long)]
        file: PathBuf,

        /// Output file (prints to stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Disassemble a compiled state config
    Disasm {
        /// State config JSON file
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Unit price of an asset in one currency
    Price {
        /// Asset id
        #[arg(long)]
        asset: u64,

        /// Index into the asset's currency list
        #[arg(short, long, default_value = "0")]
        currency: usize,

        /// Buyer address
        #[arg(short, long)]
        buyer: Option<String>,

        /// Requested units (decimal or 0x hex)
        #[arg(short, long, default_value = "1")]
        units: String,
    },

    /// Prices of an asset in every currency
    Cost {
        /// Asset id
        #[arg(long)]
        asset: u64,

        /// Buyer address
        #[arg(short, long)]
        buyer: Option<String>,

        /// Requested units (decimal or 0x hex)
        #[arg(short, long, default_value = "1")]
        units: String,
    },

    /// Payment required to buy units of an asset
    Quote {
        /// Asset id
        #[arg(long)]
        asset: u64,

        /// Index into the asset's currency list
        #[arg(short, long, default_value = "0")]
        currency: usize,

        /// Buyer address
        #[arg(short, long)]
        buyer: Option<String>,

        /// Requested units (decimal or 0x hex)
        #[arg(short, long, default_value = "1")]
        units: String,
    },

    /// Start the REST API server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Compile { file, output } => {
            cli::cmd_compile(&file, output.as_deref())?;
        }

        Commands::Disasm { file } => {
            cli::cmd_disasm(&file)?;
        }

        Commands::Price {
            asset,
            currency,
            buyer,
            units,
        } => {
            let registry = cli::load_registry(&cli.assets)?;
            let (buyer, units) = cli::parse_context(buyer.as_deref(), &units)?;
            cli::cmd_price(&registry, asset, currency, buyer, units)?;
        }

        Commands::Cost {
            asset,
            buyer,
            units,
        } => {
            let registry = cli::load_registry(&cli.assets)?;
            let (buyer, units) = cli::parse_context(buyer.as_deref(), &units)?;
            cli::cmd_cost(&registry, asset, buyer, units)?;
        }

        Commands::Quote {
            asset,
            currency,
            buyer,
            units,
        } => {
            let registry = cli::load_registry(&cli.assets)?;
            let (buyer, units) = cli::parse_context(buyer.as_deref(), &units)?;
            cli::cmd_quote(&registry, asset, currency, buyer, units)?;
        }

        Commands::Serve { port } => {
            let config = ServerConfig {
                port,
                assets_file: Some(cli.assets),
            };
            run_server(config)?;
        }
    }

    Ok(())
}

fn run_server(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Runtime::new()?;

    rt.block_on(async {
        // Load assets, or start empty when there is no file yet
        let registry = match &config.assets_file {
            Some(path) if path.exists() => {
                println!("📂 Loading assets from {:?}...", path);
                cli::load_registry(path)?
            }
            _ => {
                println!("🆕 Starting with an empty asset registry...");
                Arc::new(AssetRegistry::new())
            }
        };

        println!("   {} asset(s) registered", registry.count());

        let app = create_router(ApiState::new(registry));

        let addr = config.bind_address();
        println!(
            "🚀 REST API server starting on http://localhost:{}",
            config.port
        );

        let listener = tokio::net::TcpListener::bind(&addr).await?;
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                tokio::signal::ctrl_c().await.ok();
                println!("\n📴 Shutting down API server...");
            })
            .await?;

        Ok::<(), Box<dyn std::error::Error>>(())
    })?;

    Ok(())
}
