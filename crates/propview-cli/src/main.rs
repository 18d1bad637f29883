use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use propview_api::RecordClient;
use propview_core::sources::{
    MemoryListingSource, RemoteFavorites, RemoteListingSource, SqliteFavorites,
};
use propview_core::{
    fixtures, Config, DataMode, FavoritesBackend, FavoritesStore, Listing, ListingFilters,
    ListingSource, PropertyCatalog, PropertyType, SavedListings, SortKey,
};

#[derive(Parser)]
#[command(name = "propview")]
#[command(version, about = "Property-listing browser: search, favorites, saved view", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Search listings with filters
    Search {
        /// Keep listings priced at or above this
        #[arg(long)]
        min_price: Option<u64>,
        /// Keep listings priced at or below this
        #[arg(long)]
        max_price: Option<u64>,
        /// Minimum bedroom count ("2" means 2+)
        #[arg(long)]
        beds: Option<u32>,
        /// Minimum bathroom count; fractions like 1.5 are fine
        #[arg(long)]
        baths: Option<f32>,
        /// Property type, repeatable (House, Condo, Townhouse, Apartment)
        #[arg(long = "type")]
        property_types: Vec<PropertyType>,
        /// Substring match on the address, case-insensitive
        #[arg(long)]
        location: Option<String>,
        /// price-low | price-high | date-new | date-old | size-large | size-small
        #[arg(long)]
        sort: Option<SortKey>,
    },
    /// Show one listing in full
    Show { id: String },
    /// Favorite a listing
    Save { id: String },
    /// Remove a favorite
    Unsave { id: String },
    /// List saved listings, most recently saved first
    Saved,
    /// Remove every favorite
    ClearSaved,
}

struct Services {
    catalog: Arc<PropertyCatalog>,
    favorites: Arc<FavoritesStore>,
    saved: SavedListings,
}

/// Wire the services up from config - built once here, passed around by
/// reference, no globals
fn build_services(config: &Config) -> anyhow::Result<Services> {
    let (listing_source, favorites_backend): (Box<dyn ListingSource>, Box<dyn FavoritesBackend>) =
        match config.data.mode {
            DataMode::Memory => {
                let listings = fixtures::sample_listings()?;
                let db_path = config.favorites_db_path()?;
                (
                    Box::new(MemoryListingSource::new(listings)),
                    Box::new(SqliteFavorites::open(&db_path)?),
                )
            }
            DataMode::Remote => {
                let remote = config.remote.as_ref().ok_or_else(|| {
                    anyhow::anyhow!("data.mode is `remote` but [remote] is not configured")
                })?;
                let client = Arc::new(RecordClient::new(&remote.base_url, &remote.api_key));
                (
                    Box::new(RemoteListingSource::new(
                        client.clone(),
                        &remote.listings_table,
                    )),
                    Box::new(RemoteFavorites::new(client, &remote.favorites_table)),
                )
            }
        };

    let catalog = Arc::new(PropertyCatalog::new(listing_source));
    let favorites = Arc::new(FavoritesStore::new(favorites_backend));
    let saved = SavedListings::new(catalog.clone(), favorites.clone());

    Ok(Services {
        catalog,
        favorites,
        saved,
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging - helps when things go sideways
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "propview=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = Config::load()?;
    let services = build_services(&config)?;

    match cli.command {
        Commands::Search {
            min_price,
            max_price,
            beds,
            baths,
            property_types,
            location,
            sort,
        } => {
            let filters = ListingFilters {
                price_min: min_price,
                price_max: max_price,
                bedrooms: beds,
                bathrooms: baths,
                property_types,
                location,
                sort_by: sort,
            };

            // Prime the sync cache so rows can show a saved marker
            // without extra I/O per listing
            if let Err(err) = services.favorites.get_all().await {
                tracing::warn!("could not load favorites: {err}");
            }

            match services.catalog.query(&filters).await {
                Ok(listings) if listings.is_empty() => println!("No listings matched."),
                Ok(listings) => {
                    for listing in &listings {
                        print_row(listing, services.favorites.is_favorite_sync(&listing.id));
                    }
                    println!("{} listing(s)", listings.len());
                }
                Err(err) => {
                    // A failed fetch renders as an empty state, not a crash
                    tracing::warn!("search failed: {err}");
                    println!("No listings available right now.");
                }
            }
        }
        Commands::Show { id } => {
            let listing = services.catalog.get_by_id(&id).await?;
            print_detail(&listing, services.favorites.is_favorite(&id).await);
        }
        Commands::Save { id } => {
            // Make sure the listing exists before bookmarking it
            services.catalog.get_by_id(&id).await?;
            let entry = services.favorites.add(&id).await?;
            println!("Saved {} at {}", entry.property_id, entry.added_date);
        }
        Commands::Unsave { id } => {
            let entry = services.favorites.remove(&id).await?;
            println!("Removed {} from favorites", entry.property_id);
        }
        Commands::Saved => {
            let listings = services.saved.get_saved_listings().await?;
            if listings.is_empty() {
                println!("No saved listings yet. Try `propview save <id>`.");
            } else {
                for listing in &listings {
                    print_row(listing, true);
                }
                println!("{} saved listing(s)", listings.len());
            }
        }
        Commands::ClearSaved => {
            let cleared = services.saved.clear_all().await?;
            println!("Removed {cleared} favorite(s)");
        }
    }

    Ok(())
}

fn print_row(listing: &Listing, saved: bool) {
    let marker = if saved { "*" } else { " " };
    println!(
        "{marker} {:<10} ${:<9} {}bd/{}ba {:>5} sqft  {:<9} {}",
        listing.id,
        listing.price,
        listing.bedrooms,
        listing.bathrooms,
        listing.sqft,
        listing.property_type,
        listing.address
    );
}

fn print_detail(listing: &Listing, saved: bool) {
    println!("{} ({})", listing.title, listing.id);
    println!("{}", listing.address);
    println!(
        "${} | {}bd/{}ba | {} sqft | {} | listed {}",
        listing.price,
        listing.bedrooms,
        listing.bathrooms,
        listing.sqft,
        listing.property_type,
        listing.listing_date.format("%Y-%m-%d")
    );
    if let Some(coords) = listing.coordinates {
        println!("at {:.4}, {:.4}", coords.lat, coords.lng);
    }
    println!();
    println!("{}", listing.description);
    if !listing.features.is_empty() {
        println!("Features: {}", listing.features.join(", "));
    }
    if !listing.images.is_empty() {
        println!("Images:");
        for image in &listing.images {
            println!("  {image}");
        }
    }
    println!();
    println!("{}", if saved { "Saved to favorites" } else { "Not saved" });
}
