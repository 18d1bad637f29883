// Saved-listings view - the join of favorites and the catalog
use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use tracing::debug;

use crate::catalog::PropertyCatalog;
use crate::favorites::FavoritesStore;
use crate::models::{Listing, ListingFilters};
use crate::Result;

/// Produces the ordered saved-properties view from favorites + catalog
pub struct SavedListings {
    catalog: Arc<PropertyCatalog>,
    favorites: Arc<FavoritesStore>,
}

impl SavedListings {
    pub fn new(catalog: Arc<PropertyCatalog>, favorites: Arc<FavoritesStore>) -> Self {
        Self { catalog, favorites }
    }

    /// Favorited listings, most recently favorited first
    ///
    /// Favorites with no matching listing are dropped silently. Either
    /// fetch failing propagates; no partial view is ever returned.
    pub async fn get_saved_listings(&self) -> Result<Vec<Listing>> {
        let favorites = self.favorites.get_all().await?;
        if favorites.is_empty() {
            // Nothing saved - skip the catalog fetch entirely
            return Ok(Vec::new());
        }

        let all = self.catalog.query(&ListingFilters::default()).await?;

        let added_dates: HashMap<&str, DateTime<Utc>> = favorites
            .iter()
            .map(|f| (f.property_id.as_str(), f.added_date))
            .collect();

        let mut saved: Vec<Listing> = all
            .into_iter()
            .filter(|listing| added_dates.contains_key(listing.id.as_str()))
            .collect();

        // Stable sort: listings favorited at the same instant keep their
        // catalog order
        saved.sort_by(|a, b| added_dates[b.id.as_str()].cmp(&added_dates[a.id.as_str()]));

        debug!(
            "reconciled {} saved listings from {} favorites",
            saved.len(),
            favorites.len()
        );
        Ok(saved)
    }

    /// Remove every favorite, issuing the removals concurrently and
    /// reporting only after all of them settle
    pub async fn clear_all(&self) -> Result<usize> {
        let favorites = self.favorites.get_all().await?;

        let removals = favorites
            .iter()
            .map(|f| self.favorites.remove(&f.property_id));
        let results = join_all(removals).await;

        let mut cleared = 0;
        for result in results {
            result?;
            cleared += 1;
        }
        Ok(cleared)
    }
}
