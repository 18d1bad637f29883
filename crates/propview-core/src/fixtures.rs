// Bundled sample dataset - the offline/demo catalog
use crate::models::Listing;
use crate::Result;

const LISTINGS_JSON: &str = include_str!("../fixtures/listings.json");

/// The bundled demo listings, parsed fresh on every call so callers can
/// mutate their copy freely
pub fn sample_listings() -> Result<Vec<Listing>> {
    Ok(serde_json::from_str(LISTINGS_JSON)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_fixture_parses() {
        let listings = sample_listings().unwrap();
        assert!(!listings.is_empty());
    }

    #[test]
    fn test_fixture_ids_are_unique() {
        let listings = sample_listings().unwrap();
        let ids: HashSet<_> = listings.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids.len(), listings.len());
    }

    #[test]
    fn test_every_fixture_listing_has_a_cover_image() {
        for listing in sample_listings().unwrap() {
            assert!(!listing.images.is_empty(), "{} has no images", listing.id);
            assert!(listing.sqft > 0);
        }
    }
}
