use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use nutriscout_api::CatalogClient;
use nutriscout_core::{
    recommend, Config, FavoriteStore, Nutrient, Product, ProductRepository, ProteinScore,
    SearchSession, SearchStore,
};
use nutriscout_store::KvStore;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "nutriscout")]
#[command(version, about = "Look up food products and find higher-protein alternatives", long_about = None)]
struct Cli {
    /// Override the catalog host from the config file
    #[arg(long, global = true)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Look up a product by barcode
    Scan {
        /// Barcode (EAN-13 etc.)
        barcode: String,
        /// Print the raw product as JSON
        #[arg(long)]
        json: bool,
    },
    /// Search products by name
    Search {
        /// Search query
        query: String,
    },
    /// Manage favorite products
    Favorites {
        #[command(subcommand)]
        action: Option<FavoriteAction>,
    },
    /// Suggest higher-protein alternatives to a product
    Recommend {
        /// Barcode of the product to beat
        barcode: String,
        /// Search whose results are the candidate pool
        #[arg(short, long)]
        query: String,
    },
    /// Show the effective configuration
    Config {
        /// Write the defaults to the config file
        #[arg(long)]
        init: bool,
    },
}

#[derive(clap::Subcommand)]
enum FavoriteAction {
    /// List favorite barcodes
    List,
    /// Add a barcode
    Add { barcode: String },
    /// Remove a barcode
    Remove { barcode: String },
    /// Fetch every favorite from the catalog
    Show {
        /// Drop favorites the catalog no longer knows
        #[arg(long)]
        prune: bool,
    },
}

/// Everything built once at startup and handed around by reference
struct Services {
    repository: Arc<ProductRepository>,
    favorites: FavoriteStore,
    search: SearchStore,
}

impl Services {
    async fn build(config: &Config) -> anyhow::Result<Self> {
        let client = CatalogClient::new(config.catalog.base_url.clone())
            .context("Failed to create catalog client")?;
        let repository = Arc::new(ProductRepository::new(Arc::new(client)));

        let store_path = config.storage.resolve_path()?;
        let storage = KvStore::open(&store_path)
            .with_context(|| format!("Failed to open store at {}", store_path.display()))?;
        let favorites = FavoriteStore::new(Arc::new(storage));
        favorites.load().await;

        let search = SearchStore::new(
            Arc::clone(&repository),
            SearchSession::new(),
            config.search.settings(),
        );

        Ok(Self {
            repository,
            favorites,
            search,
        })
    }
}

fn print_product(product: &Product, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(product)?);
        return Ok(());
    }

    println!("{} ({})", product.display_name(), product.code);
    println!("Per {}:", product.portion);
    for nutrient in Nutrient::all() {
        // Not sent by the catalog, shown as 0 elsewhere
        let value = if product.declares(nutrient) {
            format!("{:.1}", product.value(nutrient))
        } else {
            "-".to_string()
        };
        println!("  {:<15} {:>8}", nutrient.key(), value);
    }
    if let Some(score) = ProteinScore::for_product(product) {
        println!("Protein score: {}", score.label());
    }
    Ok(())
}

fn print_list(products: &[Product]) {
    for product in products {
        println!(
            "{:<15} {:<40} {:>7.1} kcal {:>6.1} g protein",
            product.code,
            product.display_name(),
            product.calories,
            product.proteins
        );
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging - helps when things go sideways
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "nutriscout=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let mut config = Config::load()?;
    if let Some(base_url) = cli.base_url {
        config.catalog.base_url = base_url;
    }

    let command = match cli.command {
        Some(command) => command,
        None => {
            println!("No command specified. Try --help");
            return Ok(());
        }
    };

    if let Commands::Config { init } = command {
        if init {
            let path = config.save()?;
            println!("Wrote {}", path.display());
        }
        print!("{}", toml::to_string_pretty(&config)?);
        return Ok(());
    }

    let services = Services::build(&config).await?;

    match command {
        Commands::Scan { barcode, json } => {
            tracing::info!("Looking up barcode: {}", barcode);
            match services.repository.get_product_by_barcode(&barcode).await {
                Some(product) => {
                    print_product(&product, json)?;
                    if services.favorites.contains(&product.code) {
                        println!("★ In favorites");
                    }
                }
                None => println!("Product {} not found", barcode),
            }
        }
        Commands::Search { query } => {
            tracing::info!("Searching for: {}", query);
            let results = services.search.search_now(&query).await;
            if results.is_empty() {
                println!("No products found");
            } else {
                print_list(&results);
            }
        }
        Commands::Favorites { action } => match action.unwrap_or(FavoriteAction::List) {
            FavoriteAction::List => {
                for code in services.favorites.codes() {
                    println!("{}", code);
                }
            }
            FavoriteAction::Add { barcode } => {
                if services.favorites.add(&barcode).await {
                    println!("Added {}", barcode);
                } else {
                    println!("Could not save favorites");
                }
            }
            FavoriteAction::Remove { barcode } => {
                if services.favorites.remove(&barcode).await {
                    println!("Removed {}", barcode);
                } else {
                    println!("Could not save favorites");
                }
            }
            FavoriteAction::Show { prune } => {
                let hydration = services.favorites.hydrate(&services.repository).await;
                print_list(&hydration.products);
                for code in &hydration.missing {
                    println!("{:<15} (not found)", code);
                }
                if prune && services.favorites.prune_missing(&hydration).await {
                    println!("Pruned {} favorites", hydration.missing.len());
                }
            }
        },
        Commands::Recommend { barcode, query } => {
            let reference = match services.repository.get_product_by_barcode(&barcode).await {
                Some(product) => product,
                None => {
                    println!("Product {} not found", barcode);
                    return Ok(());
                }
            };

            services.search.search_now(&query).await;
            let candidates = services.search.session().last_successful();
            let picks = recommend(&reference, &candidates);

            println!("Higher protein alternatives to {}:", reference.display_name());
            if picks.is_empty() {
                println!("No recommendations found among {} candidates", candidates.len());
            } else {
                print_list(&picks);
            }
        }
        // Handled before the services were built
        Commands::Config { .. } => {}
    }

    Ok(())
}
