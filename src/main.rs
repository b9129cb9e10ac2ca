use clap::{Args, Parser, Subcommand};
use product_scraper::{
    amazon::Catalog,
    web::{build_app, AppState},
    Extractor, FetcherConfig, ProductStore,
};
use std::{net::SocketAddr, path::PathBuf, sync::Arc, time::Duration};
use tracing::{info, warn};
use tracing_error::ErrorLayer;
use tracing_subscriber::prelude::*;

#[derive(Debug, Parser)]
#[command(version, about = "Scrape retailer product pages into a local catalog")]
struct Cli {
    /// SQLite file holding the catalog
    #[arg(long, default_value = "products.db")]
    database: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Extract one product page
    Fetch {
        url: String,
        /// Print the record as JSON
        #[arg(long)]
        json: bool,
        /// Also store the record in the catalog
        #[arg(long)]
        save: bool,
        #[command(flatten)]
        fetcher: FetcherArgs,
    },
    /// Print every stored product
    List {
        #[arg(long)]
        json: bool,
    },
    /// Remove a stored product
    Delete { id: String },
    /// Serve the web catalog
    Serve {
        #[arg(long, default_value = "0.0.0.0:8080")]
        bind: SocketAddr,
        #[command(flatten)]
        fetcher: FetcherArgs,
    },
}

#[derive(Debug, Args)]
struct FetcherArgs {
    #[arg(long, default_value_t = 1000)]
    min_delay_ms: u64,
    #[arg(long, default_value_t = 3000)]
    max_delay_ms: u64,
    /// Request timeout; none when omitted
    #[arg(long)]
    timeout_secs: Option<u64>,
}

impl FetcherArgs {
    fn config(&self) -> FetcherConfig {
        FetcherConfig {
            min_delay: Duration::from_millis(self.min_delay_ms),
            max_delay: Duration::from_millis(self.max_delay_ms),
            timeout: self.timeout_secs.map(Duration::from_secs),
            ..FetcherConfig::default()
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for ctrl-c: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_env("LOG_LEVEL").unwrap_or_else(|_| {
                "debug,html5ever=error,selectors=error,hyper=warn,reqwest=info,sqlx=warn".into()
            }),
        )
        .with(ErrorLayer::default())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Fetch {
            url,
            json,
            save,
            fetcher,
        } => {
            let extractor = Extractor::amazon(&fetcher.config())?;
            let record = extractor
                .fetch_product(&url)
                .await
                .ok_or("extraction failed")?;

            if json {
                println!("{}", serde_json::to_string_pretty(&record)?);
            } else {
                print!("{}", record);
            }

            if save {
                let catalog = Catalog::new(&cli.database).await?;
                catalog.create(&record).await?;
                info!("Stored product {}", record.id);
            }
        }
        Command::List { json } => {
            let catalog = Catalog::new(&cli.database).await?;
            let products = catalog.list().await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&products)?);
            } else {
                for p in &products {
                    println!("{}", p);
                }
                info!("{} products", products.len());
            }
        }
        Command::Delete { id } => {
            let catalog = Catalog::new(&cli.database).await?;
            if catalog.delete(&id).await? {
                info!("Deleted product {}", id);
            } else {
                warn!("No product with id {}", id);
            }
        }
        Command::Serve { bind, fetcher } => {
            let state = AppState {
                catalog: Arc::new(Catalog::new(&cli.database).await?),
                extractor: Arc::new(Extractor::amazon(&fetcher.config())?),
            };

            let listener = tokio::net::TcpListener::bind(bind).await?;
            info!("Listening on {}", bind);
            axum::serve(listener, build_app(state))
                .with_graceful_shutdown(shutdown_signal())
                .await?;
        }
    }

    Ok(())
}
