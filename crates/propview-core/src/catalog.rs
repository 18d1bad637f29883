// Catalog service - filtered, sorted views over a listing source
use async_trait::async_trait;
use chrono::Utc;
#[cfg(test)]
use mockall::automock;
use tracing::{debug, warn};

use crate::models::{Listing, ListingDraft, ListingFilters, ListingPatch, SortKey};
use crate::Result;

/// Trait for listing data sources - fixture-backed or remote
///
/// This seam is what keeps the query semantics testable: the catalog
/// owns filtering and sorting, sources own storage.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ListingSource: Send + Sync {
    async fn fetch_all(&self) -> Result<Vec<Listing>>;

    /// Sources that can prefilter server-side override this. The catalog
    /// still applies every predicate and the sort locally afterwards, so
    /// query semantics never depend on the source being thorough.
    async fn fetch_filtered(&self, filters: &ListingFilters) -> Result<Vec<Listing>> {
        let _ = filters;
        self.fetch_all().await
    }

    async fn fetch_by_id(&self, id: &str) -> Result<Listing>;
    async fn insert(&self, listing: Listing) -> Result<Listing>;
    async fn update(&self, id: &str, patch: ListingPatch) -> Result<Listing>;
    async fn remove(&self, id: &str) -> Result<Listing>;
}

/// The catalog service answering filtered, sorted listing queries
///
/// Construct one at application start and pass it by reference; there is
/// no global instance hiding anywhere.
pub struct PropertyCatalog {
    source: Box<dyn ListingSource>,
}

impl PropertyCatalog {
    pub fn new(source: Box<dyn ListingSource>) -> Self {
        Self { source }
    }

    /// Filtered, sorted view of the catalog
    ///
    /// Returns a fresh sequence; the backing collection is never mutated.
    /// Empty filters return the full collection in its current order. A
    /// source failure comes back as `Error::DataSource` for the caller to
    /// render as an empty state.
    pub async fn query(&self, filters: &ListingFilters) -> Result<Vec<Listing>> {
        filters.validate()?;

        let fetched = match self.source.fetch_filtered(filters).await {
            Ok(listings) => listings,
            Err(err) => {
                warn!("listing fetch failed: {err}");
                return Err(err);
            }
        };

        let mut hits: Vec<Listing> = fetched
            .into_iter()
            .filter(|listing| filters.matches(listing))
            .collect();

        if let Some(key) = filters.sort_by {
            sort_listings(&mut hits, key);
        }

        debug!("query matched {} listings", hits.len());
        Ok(hits)
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Listing> {
        self.source.fetch_by_id(id).await
    }

    /// Create a listing, assigning a fresh id and a listing date of now
    /// when the draft doesn't carry them
    pub async fn create(&self, draft: ListingDraft) -> Result<Listing> {
        let listing = Listing {
            id: draft
                .id
                .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
            title: draft.title,
            address: draft.address,
            description: draft.description,
            price: draft.price,
            bedrooms: draft.bedrooms,
            bathrooms: draft.bathrooms,
            sqft: draft.sqft,
            property_type: draft.property_type,
            images: draft.images,
            features: draft.features,
            listing_date: draft.listing_date.unwrap_or_else(Utc::now),
            coordinates: draft.coordinates,
        };

        self.source.insert(listing).await
    }

    /// Merge-patch an existing listing; `NotFound` when the id is absent
    pub async fn update(&self, id: &str, patch: ListingPatch) -> Result<Listing> {
        self.source.update(id, patch).await
    }

    /// Delete a listing, returning the removed record
    pub async fn delete(&self, id: &str) -> Result<Listing> {
        self.source.remove(id).await
    }
}

/// Stable sort by the given key; ties keep their prior relative order
pub fn sort_listings(listings: &mut [Listing], key: SortKey) {
    match key {
        SortKey::PriceLow => listings.sort_by(|a, b| a.price.cmp(&b.price)),
        SortKey::PriceHigh => listings.sort_by(|a, b| b.price.cmp(&a.price)),
        SortKey::DateNew => listings.sort_by(|a, b| b.listing_date.cmp(&a.listing_date)),
        SortKey::DateOld => listings.sort_by(|a, b| a.listing_date.cmp(&b.listing_date)),
        SortKey::SizeLarge => listings.sort_by(|a, b| b.sqft.cmp(&a.sqft)),
        SortKey::SizeSmall => listings.sort_by(|a, b| a.sqft.cmp(&b.sqft)),
    }
}
