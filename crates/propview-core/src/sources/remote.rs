// Hosted record-service sources
//
// The service stores flat field maps: `images` and `features` travel as
// newline-delimited strings and `coordinates` as a JSON-encoded string.
// These adapters normalize wire records into core shapes and back.
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{json, Value};

use propview_api::{FilterOp, RecordClient, RecordFields, RecordQuery, SortDirection, TableRecord};

use crate::catalog::ListingSource;
use crate::favorites::FavoritesBackend;
use crate::models::{
    Coordinates, FavoriteEntry, Listing, ListingFilters, ListingPatch, SortKey,
};
use crate::{Error, Result};

/// Listing source backed by a record-service table
pub struct RemoteListingSource {
    client: Arc<RecordClient>,
    table: String,
}

impl RemoteListingSource {
    pub fn new(client: Arc<RecordClient>, table: &str) -> Self {
        Self {
            client,
            table: table.to_string(),
        }
    }
}

#[async_trait]
impl ListingSource for RemoteListingSource {
    async fn fetch_all(&self) -> Result<Vec<Listing>> {
        let records = self.client.query(&self.table, &RecordQuery::new()).await?;
        records.into_iter().map(record_to_listing).collect()
    }

    /// Push the filters down as a server-side prefilter; the catalog
    /// re-checks everything locally
    async fn fetch_filtered(&self, filters: &ListingFilters) -> Result<Vec<Listing>> {
        let records = self
            .client
            .query(&self.table, &filters_to_query(filters))
            .await?;
        records.into_iter().map(record_to_listing).collect()
    }

    async fn fetch_by_id(&self, id: &str) -> Result<Listing> {
        let record = self.client.get(&self.table, id).await?;
        record_to_listing(record)
    }

    async fn insert(&self, listing: Listing) -> Result<Listing> {
        // The service assigns the record id; it becomes the listing id
        let record = self
            .client
            .create(&self.table, listing_to_fields(&listing))
            .await?;
        record_to_listing(record)
    }

    async fn update(&self, id: &str, patch: ListingPatch) -> Result<Listing> {
        let record = self
            .client
            .update(&self.table, id, patch_to_fields(&patch))
            .await?;
        record_to_listing(record)
    }

    async fn remove(&self, id: &str) -> Result<Listing> {
        let record = self.client.delete(&self.table, id).await?;
        record_to_listing(record)
    }
}

/// Favorites backend over a record-service table with an indexed
/// `propertyId` field
pub struct RemoteFavorites {
    client: Arc<RecordClient>,
    table: String,
}

impl RemoteFavorites {
    pub fn new(client: Arc<RecordClient>, table: &str) -> Self {
        Self {
            client,
            table: table.to_string(),
        }
    }

    /// Exact-match lookup returning the raw record (we need its internal
    /// id for delete and update)
    async fn find_record(&self, property_id: &str) -> Result<Option<TableRecord>> {
        let query = RecordQuery::new().filter("propertyId", FilterOp::Eq, json!(property_id));
        let mut records = self.client.query(&self.table, &query).await?;
        Ok(if records.is_empty() {
            None
        } else {
            Some(records.remove(0))
        })
    }
}

#[async_trait]
impl FavoritesBackend for RemoteFavorites {
    async fn load_all(&self) -> Result<Vec<FavoriteEntry>> {
        let records = self.client.query(&self.table, &RecordQuery::new()).await?;
        records.into_iter().map(record_to_favorite).collect()
    }

    async fn find(&self, property_id: &str) -> Result<Option<FavoriteEntry>> {
        self.find_record(property_id)
            .await?
            .map(record_to_favorite)
            .transpose()
    }

    async fn insert(&self, entry: &FavoriteEntry) -> Result<()> {
        let mut fields = RecordFields::new();
        fields.insert("propertyId".to_string(), json!(entry.property_id));
        fields.insert(
            "addedDate".to_string(),
            json!(entry.added_date.to_rfc3339()),
        );

        self.client.create(&self.table, fields).await?;
        Ok(())
    }

    async fn delete(&self, property_id: &str) -> Result<Option<FavoriteEntry>> {
        let Some(record) = self.find_record(property_id).await? else {
            return Ok(None);
        };

        let deleted = self.client.delete(&self.table, &record.id).await?;
        Ok(Some(record_to_favorite(deleted)?))
    }

    async fn set_added_date(
        &self,
        property_id: &str,
        added_date: DateTime<Utc>,
    ) -> Result<Option<FavoriteEntry>> {
        let Some(record) = self.find_record(property_id).await? else {
            return Ok(None);
        };

        let mut fields = RecordFields::new();
        fields.insert("addedDate".to_string(), json!(added_date.to_rfc3339()));

        let updated = self.client.update(&self.table, &record.id, fields).await?;
        Ok(Some(record_to_favorite(updated)?))
    }
}

/// Translate core filters into the record-service query language
fn filters_to_query(filters: &ListingFilters) -> RecordQuery {
    let mut query = RecordQuery::new();

    if let Some(min) = filters.price_min {
        query = query.filter("price", FilterOp::Gte, json!(min));
    }
    if let Some(max) = filters.price_max {
        query = query.filter("price", FilterOp::Lte, json!(max));
    }
    if let Some(beds) = filters.bedrooms {
        query = query.filter("bedrooms", FilterOp::Gte, json!(beds));
    }
    if let Some(baths) = filters.bathrooms {
        query = query.filter("bathrooms", FilterOp::Gte, json!(baths));
    }
    if !filters.property_types.is_empty() {
        let names: Vec<&str> = filters.property_types.iter().map(|t| t.as_str()).collect();
        query = query.filter("propertyType", FilterOp::In, json!(names));
    }
    if let Some(ref location) = filters.location {
        query = query.filter("address", FilterOp::Contains, json!(location));
    }
    if let Some(key) = filters.sort_by {
        let (field, direction) = match key {
            SortKey::PriceLow => ("price", SortDirection::Asc),
            SortKey::PriceHigh => ("price", SortDirection::Desc),
            SortKey::DateNew => ("listingDate", SortDirection::Desc),
            SortKey::DateOld => ("listingDate", SortDirection::Asc),
            SortKey::SizeLarge => ("sqft", SortDirection::Desc),
            SortKey::SizeSmall => ("sqft", SortDirection::Asc),
        };
        query = query.order_by(field, direction);
    }

    query
}

/// Normalize a wire record into a Listing
fn record_to_listing(record: TableRecord) -> Result<Listing> {
    let fields = &record.fields;

    Ok(Listing {
        id: record.id.clone(),
        title: text_field(fields, "title")?,
        address: text_field(fields, "address")?,
        description: text_field(fields, "description").unwrap_or_default(),
        price: uint_field(fields, "price")?,
        bedrooms: uint_field(fields, "bedrooms")? as u32,
        bathrooms: float_field(fields, "bathrooms")? as f32,
        sqft: uint_field(fields, "sqft")? as u32,
        property_type: text_field(fields, "propertyType")?.parse()?,
        images: lines_field(fields, "images"),
        features: lines_field(fields, "features"),
        listing_date: date_field(fields, "listingDate")?,
        coordinates: coordinates_field(fields)?,
    })
}

/// Flatten a Listing back into wire fields (the id travels separately)
fn listing_to_fields(listing: &Listing) -> RecordFields {
    let mut fields = RecordFields::new();
    fields.insert("title".to_string(), json!(listing.title));
    fields.insert("address".to_string(), json!(listing.address));
    fields.insert("description".to_string(), json!(listing.description));
    fields.insert("price".to_string(), json!(listing.price));
    fields.insert("bedrooms".to_string(), json!(listing.bedrooms));
    fields.insert("bathrooms".to_string(), json!(listing.bathrooms));
    fields.insert("sqft".to_string(), json!(listing.sqft));
    fields.insert(
        "propertyType".to_string(),
        json!(listing.property_type.as_str()),
    );
    fields.insert("images".to_string(), json!(listing.images.join("\n")));
    fields.insert("features".to_string(), json!(listing.features.join("\n")));
    fields.insert(
        "listingDate".to_string(),
        json!(listing.listing_date.to_rfc3339()),
    );
    if let Some(coords) = listing.coordinates {
        fields.insert(
            "coordinates".to_string(),
            json!(json!(coords).to_string()),
        );
    }
    fields
}

/// Only the fields the patch actually sets go over the wire
fn patch_to_fields(patch: &ListingPatch) -> RecordFields {
    let mut fields = RecordFields::new();
    if let Some(ref title) = patch.title {
        fields.insert("title".to_string(), json!(title));
    }
    if let Some(ref address) = patch.address {
        fields.insert("address".to_string(), json!(address));
    }
    if let Some(ref description) = patch.description {
        fields.insert("description".to_string(), json!(description));
    }
    if let Some(price) = patch.price {
        fields.insert("price".to_string(), json!(price));
    }
    if let Some(bedrooms) = patch.bedrooms {
        fields.insert("bedrooms".to_string(), json!(bedrooms));
    }
    if let Some(bathrooms) = patch.bathrooms {
        fields.insert("bathrooms".to_string(), json!(bathrooms));
    }
    if let Some(sqft) = patch.sqft {
        fields.insert("sqft".to_string(), json!(sqft));
    }
    if let Some(property_type) = patch.property_type {
        fields.insert("propertyType".to_string(), json!(property_type.as_str()));
    }
    if let Some(ref images) = patch.images {
        fields.insert("images".to_string(), json!(images.join("\n")));
    }
    if let Some(ref features) = patch.features {
        fields.insert("features".to_string(), json!(features.join("\n")));
    }
    if let Some(listing_date) = patch.listing_date {
        fields.insert(
            "listingDate".to_string(),
            json!(listing_date.to_rfc3339()),
        );
    }
    if let Some(coords) = patch.coordinates {
        fields.insert(
            "coordinates".to_string(),
            json!(json!(coords).to_string()),
        );
    }
    fields
}

fn record_to_favorite(record: TableRecord) -> Result<FavoriteEntry> {
    Ok(FavoriteEntry {
        property_id: text_field(&record.fields, "propertyId")?,
        added_date: date_field(&record.fields, "addedDate")?,
    })
}

fn text_field(fields: &RecordFields, name: &str) -> Result<String> {
    fields
        .get(name)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| Error::DataSource(format!("record missing text field `{name}`")))
}

fn uint_field(fields: &RecordFields, name: &str) -> Result<u64> {
    fields
        .get(name)
        .and_then(Value::as_u64)
        .ok_or_else(|| Error::DataSource(format!("record missing numeric field `{name}`")))
}

fn float_field(fields: &RecordFields, name: &str) -> Result<f64> {
    fields
        .get(name)
        .and_then(Value::as_f64)
        .ok_or_else(|| Error::DataSource(format!("record missing numeric field `{name}`")))
}

/// Newline-delimited wire string -> ordered sequence; blank lines dropped
fn lines_field(fields: &RecordFields, name: &str) -> Vec<String> {
    fields
        .get(name)
        .and_then(Value::as_str)
        .map(|raw| {
            raw.lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn date_field(fields: &RecordFields, name: &str) -> Result<DateTime<Utc>> {
    let raw = text_field(fields, name)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|d| d.with_timezone(&Utc))
        .map_err(|_| Error::DataSource(format!("unreadable timestamp in field `{name}`: {raw}")))
}

/// The wire carries coordinates as a JSON-encoded string
fn coordinates_field(fields: &RecordFields) -> Result<Option<Coordinates>> {
    match fields.get("coordinates").and_then(Value::as_str) {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => Ok(Some(serde_json::from_str(raw)?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PropertyType;
    use chrono::TimeZone;

    fn sample_record() -> TableRecord {
        let raw = json!({
            "id": "rec_42",
            "fields": {
                "title": "Sunny corner condo",
                "address": "77 Harbor View, Seattle, WA",
                "description": "Top floor, water views",
                "price": 525_000,
                "bedrooms": 2,
                "bathrooms": 1.5,
                "sqft": 980,
                "propertyType": "Condo",
                "images": "img/harbor-1.jpg\nimg/harbor-2.jpg\n",
                "features": "Elevator\nRoof deck",
                "listingDate": "2024-04-02T09:00:00+00:00",
                "coordinates": "{\"lat\":47.6062,\"lng\":-122.3321}",
            }
        });
        serde_json::from_value(raw).unwrap()
    }

    #[test]
    fn test_record_to_listing_normalizes_wire_fields() {
        let listing = record_to_listing(sample_record()).unwrap();

        assert_eq!(listing.id, "rec_42");
        assert_eq!(listing.property_type, PropertyType::Condo);
        // Newline-delimited strings become ordered sequences
        assert_eq!(
            listing.images,
            vec!["img/harbor-1.jpg", "img/harbor-2.jpg"]
        );
        assert_eq!(listing.features, vec!["Elevator", "Roof deck"]);
        assert_eq!(
            listing.listing_date,
            Utc.with_ymd_and_hms(2024, 4, 2, 9, 0, 0).unwrap()
        );
        let coords = listing.coordinates.unwrap();
        assert!((coords.lat - 47.6062).abs() < 1e-9);
        assert!((coords.lng + 122.3321).abs() < 1e-9);
    }

    #[test]
    fn test_record_missing_required_field_is_data_source_error() {
        let mut record = sample_record();
        record.fields.remove("price");

        assert!(matches!(
            record_to_listing(record),
            Err(Error::DataSource(_))
        ));
    }

    #[test]
    fn test_absent_coordinates_are_tolerated() {
        let mut record = sample_record();
        record.fields.remove("coordinates");
        assert!(record_to_listing(record).unwrap().coordinates.is_none());

        let mut record = sample_record();
        record
            .fields
            .insert("coordinates".to_string(), json!(""));
        assert!(record_to_listing(record).unwrap().coordinates.is_none());
    }

    #[test]
    fn test_listing_round_trips_through_fields() {
        let original = record_to_listing(sample_record()).unwrap();

        let fields = listing_to_fields(&original);
        let back = record_to_listing(TableRecord {
            id: original.id.clone(),
            fields,
        })
        .unwrap();

        assert_eq!(back, original);
    }

    #[test]
    fn test_filters_to_query_covers_every_dimension() {
        let filters = ListingFilters {
            price_min: Some(150_000),
            price_max: Some(600_000),
            bedrooms: Some(2),
            bathrooms: Some(1.5),
            property_types: vec![PropertyType::House, PropertyType::Condo],
            location: Some("seattle".to_string()),
            sort_by: Some(SortKey::DateNew),
        };

        let query = filters_to_query(&filters);

        assert_eq!(query.filters.len(), 6);
        assert_eq!(
            serde_json::to_value(&query).unwrap()["orderBy"],
            json!({"field": "listingDate", "direction": "desc"})
        );
    }

    #[test]
    fn test_default_filters_produce_an_empty_query() {
        assert!(filters_to_query(&ListingFilters::default()).is_empty());
    }

    #[test]
    fn test_patch_to_fields_skips_unset_fields() {
        let patch = ListingPatch {
            price: Some(410_000),
            features: Some(vec!["Solar".to_string(), "EV charger".to_string()]),
            ..Default::default()
        };

        let fields = patch_to_fields(&patch);

        assert_eq!(fields.len(), 2);
        assert_eq!(fields["price"], json!(410_000));
        assert_eq!(fields["features"], json!("Solar\nEV charger"));
    }
}
