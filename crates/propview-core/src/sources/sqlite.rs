// SQLite favorites backend - the durable local store
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use propview_store::{FavoriteRow, FavoritesDb};

use crate::favorites::FavoritesBackend;
use crate::models::FavoriteEntry;
use crate::{Error, Result};

/// `FavoritesBackend` over the embedded SQLite database
pub struct SqliteFavorites {
    // rusqlite connections are not Sync; a mutex keeps the seam simple
    db: Mutex<FavoritesDb>,
}

impl SqliteFavorites {
    pub fn open(path: &Path) -> Result<Self> {
        Ok(Self {
            db: Mutex::new(FavoritesDb::open(path)?),
        })
    }

    pub fn open_in_memory() -> Result<Self> {
        Ok(Self {
            db: Mutex::new(FavoritesDb::open_in_memory()?),
        })
    }

    fn db(&self) -> Result<MutexGuard<'_, FavoritesDb>> {
        self.db
            .lock()
            .map_err(|_| Error::Store("favorites database mutex poisoned".to_string()))
    }
}

fn row_to_entry(row: FavoriteRow) -> FavoriteEntry {
    FavoriteEntry {
        property_id: row.property_id,
        added_date: row.added_date,
    }
}

#[async_trait]
impl FavoritesBackend for SqliteFavorites {
    async fn load_all(&self) -> Result<Vec<FavoriteEntry>> {
        Ok(self.db()?.all()?.into_iter().map(row_to_entry).collect())
    }

    async fn find(&self, property_id: &str) -> Result<Option<FavoriteEntry>> {
        Ok(self.db()?.find(property_id)?.map(row_to_entry))
    }

    async fn insert(&self, entry: &FavoriteEntry) -> Result<()> {
        self.db()?.insert(&entry.property_id, entry.added_date)?;
        Ok(())
    }

    async fn delete(&self, property_id: &str) -> Result<Option<FavoriteEntry>> {
        Ok(self.db()?.delete(property_id)?.map(row_to_entry))
    }

    async fn set_added_date(
        &self,
        property_id: &str,
        added_date: DateTime<Utc>,
    ) -> Result<Option<FavoriteEntry>> {
        Ok(self
            .db()?
            .set_added_date(property_id, added_date)?
            .map(row_to_entry))
    }
}
