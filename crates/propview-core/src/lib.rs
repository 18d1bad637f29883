// Core business logic lives here - the brain of the operation
pub mod catalog;
pub mod config;
pub mod error;
pub mod favorites;
pub mod fixtures;
pub mod models;
pub mod saved;
pub mod sources;

pub use catalog::{ListingSource, PropertyCatalog};
pub use config::{Config, DataMode};
pub use error::Error;
pub use favorites::{FavoritesBackend, FavoritesStore};
pub use models::{
    Coordinates, FavoriteEntry, Listing, ListingDraft, ListingFilters, ListingPatch, PropertyType,
    SortKey,
};
pub use saved::SavedListings;

/// Result type alias because typing Result<T, Error> everywhere is tedious
pub type Result<T> = std::result::Result<T, Error>;
