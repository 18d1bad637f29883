// End-to-end flow over the in-memory stack: search, favorite, reconcile
use std::sync::Arc;

use propview_core::sources::{MemoryFavorites, MemoryListingSource};
use propview_core::{
    fixtures, FavoritesStore, ListingFilters, PropertyCatalog, PropertyType, SavedListings,
    SortKey,
};

fn services() -> (Arc<PropertyCatalog>, Arc<FavoritesStore>, SavedListings) {
    let listings = fixtures::sample_listings().expect("fixture parses");
    let catalog = Arc::new(PropertyCatalog::new(Box::new(MemoryListingSource::new(
        listings,
    ))));
    let favorites = Arc::new(FavoritesStore::new(Box::new(MemoryFavorites::new())));
    let saved = SavedListings::new(catalog.clone(), favorites.clone());
    (catalog, favorites, saved)
}

#[tokio::test]
async fn search_then_save_then_reconcile() {
    let (catalog, favorites, saved) = services();

    // Find affordable condos, cheapest first
    let filters = ListingFilters {
        price_max: Some(550_000),
        property_types: vec![PropertyType::Condo],
        sort_by: Some(SortKey::PriceLow),
        ..Default::default()
    };
    let results = catalog.query(&filters).await.unwrap();

    assert!(!results.is_empty());
    assert!(results
        .windows(2)
        .all(|pair| pair[0].price <= pair[1].price));
    assert!(results
        .iter()
        .all(|l| l.property_type == PropertyType::Condo));

    // Save the two cheapest, cheapest one last
    favorites.add(&results[1].id).await.unwrap();
    favorites.add(&results[0].id).await.unwrap();
    assert!(favorites.is_favorite_sync(&results[0].id));

    // Most recently saved comes back first
    let saved_listings = saved.get_saved_listings().await.unwrap();
    let ids: Vec<_> = saved_listings.iter().map(|l| l.id.as_str()).collect();
    assert_eq!(ids, vec![results[0].id.as_str(), results[1].id.as_str()]);
}

#[tokio::test]
async fn deleting_a_listing_leaves_a_stale_favorite_the_view_hides() {
    let (catalog, favorites, saved) = services();

    let all = catalog.query(&ListingFilters::default()).await.unwrap();
    favorites.add(&all[0].id).await.unwrap();
    favorites.add(&all[1].id).await.unwrap();

    catalog.delete(&all[0].id).await.unwrap();

    // The favorite entry survives, the saved view drops it silently
    assert_eq!(favorites.get_all().await.unwrap().len(), 2);
    let visible = saved.get_saved_listings().await.unwrap();
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].id, all[1].id);
}

#[tokio::test]
async fn clear_all_empties_the_saved_view() {
    let (catalog, favorites, saved) = services();

    let all = catalog.query(&ListingFilters::default()).await.unwrap();
    for listing in all.iter().take(3) {
        favorites.add(&listing.id).await.unwrap();
    }

    assert_eq!(saved.clear_all().await.unwrap(), 3);
    assert!(saved.get_saved_listings().await.unwrap().is_empty());
    assert!(!favorites.is_favorite_sync(&all[0].id));
}
