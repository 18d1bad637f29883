use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Error;

/// A single real-estate listing - the star of the show
///
/// Listings are immutable once created; updates replace the record
/// wholesale through the catalog's explicit operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    /// Stable identifier, never reused within a session
    pub id: String,
    pub title: String,
    pub address: String,
    pub description: String,
    pub price: u64,
    pub bedrooms: u32,
    /// Fractional counts like 2.5 are real; compared numerically
    pub bathrooms: f32,
    pub sqft: u32,
    pub property_type: PropertyType,
    /// Ordered; the first entry is the cover image
    pub images: Vec<String>,
    pub features: Vec<String>,
    pub listing_date: DateTime<Utc>,
    /// Opaque to the core, carried through for map views
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

/// The fixed set of property kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PropertyType {
    House,
    Condo,
    Townhouse,
    Apartment,
}

impl PropertyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyType::House => "House",
            PropertyType::Condo => "Condo",
            PropertyType::Townhouse => "Townhouse",
            PropertyType::Apartment => "Apartment",
        }
    }

    pub fn all() -> Vec<PropertyType> {
        vec![
            PropertyType::House,
            PropertyType::Condo,
            PropertyType::Townhouse,
            PropertyType::Apartment,
        ]
    }
}

impl std::fmt::Display for PropertyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for PropertyType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "House" => Ok(PropertyType::House),
            "Condo" => Ok(PropertyType::Condo),
            "Townhouse" => Ok(PropertyType::Townhouse),
            "Apartment" => Ok(PropertyType::Apartment),
            other => Err(Error::Validation(format!("unknown property type: {other}"))),
        }
    }
}

/// How query results get ordered
///
/// Absent key = stable insertion order. Unknown names fail to parse at
/// the boundary, so the catalog never sees an invalid key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortKey {
    PriceLow,
    PriceHigh,
    DateNew,
    DateOld,
    SizeLarge,
    SizeSmall,
}

impl SortKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::PriceLow => "price-low",
            SortKey::PriceHigh => "price-high",
            SortKey::DateNew => "date-new",
            SortKey::DateOld => "date-old",
            SortKey::SizeLarge => "size-large",
            SortKey::SizeSmall => "size-small",
        }
    }
}

impl std::fmt::Display for SortKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for SortKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "price-low" => Ok(SortKey::PriceLow),
            "price-high" => Ok(SortKey::PriceHigh),
            "date-new" => Ok(SortKey::DateNew),
            "date-old" => Ok(SortKey::DateOld),
            "size-large" => Ok(SortKey::SizeLarge),
            "size-small" => Ok(SortKey::SizeSmall),
            other => Err(Error::Validation(format!("unknown sort key: {other}"))),
        }
    }
}

/// Filter configuration for catalog queries
///
/// Every field is optional; absent fields impose no constraint, and all
/// active fields compose with logical AND.
#[derive(Debug, Clone, Default)]
pub struct ListingFilters {
    /// Keep listings with price >= this
    pub price_min: Option<u64>,
    /// Keep listings with price <= this
    pub price_max: Option<u64>,
    /// Minimum count, not exact match ("2" means 2+)
    pub bedrooms: Option<u32>,
    /// Minimum count, same inclusive semantics as bedrooms
    pub bathrooms: Option<f32>,
    /// Empty means no filtering on this dimension
    pub property_types: Vec<PropertyType>,
    /// Case-insensitive substring match on the address
    pub location: Option<String>,
    pub sort_by: Option<SortKey>,
}

impl ListingFilters {
    /// Reject filter combinations that can never match sensibly
    pub fn validate(&self) -> crate::Result<()> {
        if let (Some(min), Some(max)) = (self.price_min, self.price_max) {
            if min > max {
                return Err(Error::Validation(format!(
                    "price range is inverted: {min} > {max}"
                )));
            }
        }
        if let Some(baths) = self.bathrooms {
            if baths < 0.0 {
                return Err(Error::Validation(format!(
                    "negative bathroom bound: {baths}"
                )));
            }
        }
        Ok(())
    }

    /// AND of every active predicate
    pub fn matches(&self, listing: &Listing) -> bool {
        if let Some(min) = self.price_min {
            if listing.price < min {
                return false;
            }
        }
        if let Some(max) = self.price_max {
            if listing.price > max {
                return false;
            }
        }
        if let Some(beds) = self.bedrooms {
            if listing.bedrooms < beds {
                return false;
            }
        }
        if let Some(baths) = self.bathrooms {
            if listing.bathrooms < baths {
                return false;
            }
        }
        if !self.property_types.is_empty()
            && !self.property_types.contains(&listing.property_type)
        {
            return false;
        }
        if let Some(ref needle) = self.location {
            if !listing
                .address
                .to_lowercase()
                .contains(&needle.to_lowercase())
            {
                return false;
            }
        }
        true
    }
}

/// Payload for creating a listing
///
/// The id and listing date are assigned by the catalog when absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingDraft {
    #[serde(default)]
    pub id: Option<String>,
    pub title: String,
    pub address: String,
    pub description: String,
    pub price: u64,
    pub bedrooms: u32,
    pub bathrooms: f32,
    pub sqft: u32,
    pub property_type: PropertyType,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub listing_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub coordinates: Option<Coordinates>,
}

/// Partial update; set fields replace, absent fields keep current values
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingPatch {
    pub title: Option<String>,
    pub address: Option<String>,
    pub description: Option<String>,
    pub price: Option<u64>,
    pub bedrooms: Option<u32>,
    pub bathrooms: Option<f32>,
    pub sqft: Option<u32>,
    pub property_type: Option<PropertyType>,
    pub images: Option<Vec<String>>,
    pub features: Option<Vec<String>>,
    pub listing_date: Option<DateTime<Utc>>,
    pub coordinates: Option<Coordinates>,
}

impl ListingPatch {
    /// Merge the patch into an existing listing
    pub fn apply(self, listing: &mut Listing) {
        if let Some(title) = self.title {
            listing.title = title;
        }
        if let Some(address) = self.address {
            listing.address = address;
        }
        if let Some(description) = self.description {
            listing.description = description;
        }
        if let Some(price) = self.price {
            listing.price = price;
        }
        if let Some(bedrooms) = self.bedrooms {
            listing.bedrooms = bedrooms;
        }
        if let Some(bathrooms) = self.bathrooms {
            listing.bathrooms = bathrooms;
        }
        if let Some(sqft) = self.sqft {
            listing.sqft = sqft;
        }
        if let Some(property_type) = self.property_type {
            listing.property_type = property_type;
        }
        if let Some(images) = self.images {
            listing.images = images;
        }
        if let Some(features) = self.features {
            listing.features = features;
        }
        if let Some(listing_date) = self.listing_date {
            listing.listing_date = listing_date;
        }
        if let Some(coordinates) = self.coordinates {
            listing.coordinates = Some(coordinates);
        }
    }
}

/// A user's bookmark of a listing: the id plus when it was saved
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteEntry {
    pub property_id: String,
    pub added_date: DateTime<Utc>,
}
