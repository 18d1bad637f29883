// In-memory sources - the mock-dataset path and test doubles
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::catalog::ListingSource;
use crate::favorites::FavoritesBackend;
use crate::models::{FavoriteEntry, Listing, ListingPatch};
use crate::{Error, Result};

/// Listing source over a plain in-memory collection
///
/// Seed it from the bundled fixture for demo mode, or from any listing
/// set in tests. Mutations stay within this process.
pub struct MemoryListingSource {
    listings: RwLock<Vec<Listing>>,
}

impl MemoryListingSource {
    pub fn new(listings: Vec<Listing>) -> Self {
        Self {
            listings: RwLock::new(listings),
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }
}

#[async_trait]
impl ListingSource for MemoryListingSource {
    async fn fetch_all(&self) -> Result<Vec<Listing>> {
        Ok(self.listings.read().await.clone())
    }

    async fn fetch_by_id(&self, id: &str) -> Result<Listing> {
        self.listings
            .read()
            .await
            .iter()
            .find(|l| l.id == id)
            .cloned()
            .ok_or_else(|| Error::NotFound(id.to_string()))
    }

    async fn insert(&self, listing: Listing) -> Result<Listing> {
        let mut listings = self.listings.write().await;
        listings.push(listing.clone());
        Ok(listing)
    }

    async fn update(&self, id: &str, patch: ListingPatch) -> Result<Listing> {
        let mut listings = self.listings.write().await;
        let slot = listings
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or_else(|| Error::NotFound(id.to_string()))?;

        patch.apply(slot);
        Ok(slot.clone())
    }

    async fn remove(&self, id: &str) -> Result<Listing> {
        let mut listings = self.listings.write().await;
        let position = listings
            .iter()
            .position(|l| l.id == id)
            .ok_or_else(|| Error::NotFound(id.to_string()))?;

        Ok(listings.remove(position))
    }
}

/// Favorites backend with no persistence - tests and throwaway sessions
#[derive(Default)]
pub struct MemoryFavorites {
    entries: RwLock<Vec<FavoriteEntry>>,
}

impl MemoryFavorites {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FavoritesBackend for MemoryFavorites {
    async fn load_all(&self) -> Result<Vec<FavoriteEntry>> {
        Ok(self.entries.read().await.clone())
    }

    async fn find(&self, property_id: &str) -> Result<Option<FavoriteEntry>> {
        Ok(self
            .entries
            .read()
            .await
            .iter()
            .find(|e| e.property_id == property_id)
            .cloned())
    }

    async fn insert(&self, entry: &FavoriteEntry) -> Result<()> {
        let mut entries = self.entries.write().await;
        if entries.iter().any(|e| e.property_id == entry.property_id) {
            return Err(Error::AlreadyFavorited(entry.property_id.clone()));
        }
        entries.push(entry.clone());
        Ok(())
    }

    async fn delete(&self, property_id: &str) -> Result<Option<FavoriteEntry>> {
        let mut entries = self.entries.write().await;
        let position = entries.iter().position(|e| e.property_id == property_id);
        Ok(position.map(|i| entries.remove(i)))
    }

    async fn set_added_date(
        &self,
        property_id: &str,
        added_date: DateTime<Utc>,
    ) -> Result<Option<FavoriteEntry>> {
        let mut entries = self.entries.write().await;
        match entries.iter_mut().find(|e| e.property_id == property_id) {
            Some(entry) => {
                entry.added_date = added_date;
                Ok(Some(entry.clone()))
            }
            None => Ok(None),
        }
    }
}
