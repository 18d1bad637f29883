// Favorites service - durable store plus a synchronous read-through cache
use std::collections::HashSet;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::models::FavoriteEntry;
use crate::{Error, Result};

/// Trait for durable favorite storage - SQLite, hosted records, or memory
#[async_trait]
pub trait FavoritesBackend: Send + Sync {
    async fn load_all(&self) -> Result<Vec<FavoriteEntry>>;
    async fn find(&self, property_id: &str) -> Result<Option<FavoriteEntry>>;
    async fn insert(&self, entry: &FavoriteEntry) -> Result<()>;
    /// Returns the removed entry, or `None` when nothing was stored
    async fn delete(&self, property_id: &str) -> Result<Option<FavoriteEntry>>;
    async fn set_added_date(
        &self,
        property_id: &str,
        added_date: DateTime<Utc>,
    ) -> Result<Option<FavoriteEntry>>;
}

/// Favorite bookkeeping with both authoritative and fast-path reads
///
/// The id cache mirrors the durable store so views can ask "is this
/// favorited?" without awaiting I/O. The cache is written only after the
/// durable write succeeded - it never claims state that didn't persist.
/// Until the first authoritative read primes it, the sync answer is a
/// best-effort `false`.
pub struct FavoritesStore {
    backend: Box<dyn FavoritesBackend>,
    cached_ids: RwLock<HashSet<String>>,
    // Serializes mutations so concurrent add/remove for one id admit
    // exactly one winner
    write_lock: Mutex<()>,
}

impl FavoritesStore {
    pub fn new(backend: Box<dyn FavoritesBackend>) -> Self {
        Self {
            backend,
            cached_ids: RwLock::new(HashSet::new()),
            write_lock: Mutex::new(()),
        }
    }

    /// All favorite entries from the durable store, refreshing the sync
    /// cache wholesale
    pub async fn get_all(&self) -> Result<Vec<FavoriteEntry>> {
        let entries = self.backend.load_all().await?;
        self.replace_cache(entries.iter().map(|e| e.property_id.clone()).collect());
        Ok(entries)
    }

    /// Favorite a listing; at most one entry per property id
    pub async fn add(&self, property_id: &str) -> Result<FavoriteEntry> {
        let _guard = self.write_lock.lock().await;

        if self.backend.find(property_id).await?.is_some() {
            return Err(Error::AlreadyFavorited(property_id.to_string()));
        }

        let entry = FavoriteEntry {
            property_id: property_id.to_string(),
            added_date: Utc::now(),
        };
        self.backend.insert(&entry).await?;
        self.cache_insert(property_id);

        debug!("favorited {property_id}");
        Ok(entry)
    }

    /// Remove a favorite, returning the removed entry
    pub async fn remove(&self, property_id: &str) -> Result<FavoriteEntry> {
        let _guard = self.write_lock.lock().await;

        let removed = self
            .backend
            .delete(property_id)
            .await?
            .ok_or_else(|| Error::NotFound(property_id.to_string()))?;
        self.cache_remove(property_id);

        debug!("unfavorited {property_id}");
        Ok(removed)
    }

    /// Refresh the timestamp of an existing favorite - the only mutation
    /// favorites support
    pub async fn update(
        &self,
        property_id: &str,
        added_date: DateTime<Utc>,
    ) -> Result<FavoriteEntry> {
        let _guard = self.write_lock.lock().await;

        self.backend
            .set_added_date(property_id, added_date)
            .await?
            .ok_or_else(|| Error::NotFound(property_id.to_string()))
    }

    /// Authoritative check; never errors - a backend failure logs a
    /// warning and reports `false`
    pub async fn is_favorite(&self, property_id: &str) -> bool {
        match self.get_all().await {
            Ok(entries) => entries.iter().any(|e| e.property_id == property_id),
            Err(err) => {
                warn!("favorite lookup failed for {property_id}: {err}");
                false
            }
        }
    }

    /// Cache-only check for immediate rendering, no I/O
    pub fn is_favorite_sync(&self, property_id: &str) -> bool {
        self.cached_ids
            .read()
            .map(|ids| ids.contains(property_id))
            .unwrap_or(false)
    }

    fn replace_cache(&self, ids: HashSet<String>) {
        if let Ok(mut cached) = self.cached_ids.write() {
            *cached = ids;
        }
    }

    fn cache_insert(&self, property_id: &str) {
        if let Ok(mut cached) = self.cached_ids.write() {
            cached.insert(property_id.to_string());
        }
    }

    fn cache_remove(&self, property_id: &str) {
        if let Ok(mut cached) = self.cached_ids.write() {
            cached.remove(property_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::MemoryFavorites;
    use chrono::TimeZone;

    fn store() -> FavoritesStore {
        FavoritesStore::new(Box::new(MemoryFavorites::new()))
    }

    #[tokio::test]
    async fn test_add_then_duplicate_add_fails() {
        let store = store();

        let entry = store.add("prop-1").await.unwrap();
        assert_eq!(entry.property_id, "prop-1");

        assert!(matches!(
            store.add("prop-1").await,
            Err(Error::AlreadyFavorited(id)) if id == "prop-1"
        ));
    }

    #[tokio::test]
    async fn test_remove_then_second_remove_fails() {
        let store = store();
        store.add("prop-1").await.unwrap();

        let removed = store.remove("prop-1").await.unwrap();
        assert_eq!(removed.property_id, "prop-1");

        assert!(matches!(
            store.remove("prop-1").await,
            Err(Error::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_sync_cache_tracks_mutations() {
        let store = store();
        assert!(!store.is_favorite_sync("prop-1"));

        store.add("prop-1").await.unwrap();
        assert!(store.is_favorite_sync("prop-1"));

        store.remove("prop-1").await.unwrap();
        assert!(!store.is_favorite_sync("prop-1"));
    }

    #[tokio::test]
    async fn test_cold_cache_primed_by_get_all() {
        let backend = MemoryFavorites::new();
        backend
            .insert(&FavoriteEntry {
                property_id: "prop-1".to_string(),
                added_date: Utc::now(),
            })
            .await
            .unwrap();
        let store = FavoritesStore::new(Box::new(backend));

        // Cold start: the entry exists durably but the cache is empty
        assert!(!store.is_favorite_sync("prop-1"));

        store.get_all().await.unwrap();
        assert!(store.is_favorite_sync("prop-1"));
    }

    #[tokio::test]
    async fn test_is_favorite_is_authoritative() {
        let backend = MemoryFavorites::new();
        backend
            .insert(&FavoriteEntry {
                property_id: "prop-9".to_string(),
                added_date: Utc::now(),
            })
            .await
            .unwrap();
        let store = FavoritesStore::new(Box::new(backend));

        assert!(store.is_favorite("prop-9").await);
        assert!(!store.is_favorite("prop-2").await);
        // The authoritative read primed the cache on the way through
        assert!(store.is_favorite_sync("prop-9"));
    }

    #[tokio::test]
    async fn test_update_refreshes_timestamp() {
        let store = store();
        store.add("prop-1").await.unwrap();

        let stamp = Utc.with_ymd_and_hms(2023, 6, 1, 8, 30, 0).unwrap();
        let updated = store.update("prop-1", stamp).await.unwrap();
        assert_eq!(updated.added_date, stamp);

        assert!(matches!(
            store.update("missing", stamp).await,
            Err(Error::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_concurrent_adds_admit_one_winner() {
        let store = std::sync::Arc::new(store());

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move { store.add("contested").await })
            })
            .collect();

        let mut wins = 0;
        let mut losses = 0;
        for task in tasks {
            match task.await.unwrap() {
                Ok(_) => wins += 1,
                Err(Error::AlreadyFavorited(_)) => losses += 1,
                Err(other) => panic!("unexpected error: {other}"),
            }
        }

        assert_eq!(wins, 1);
        assert_eq!(losses, 7);
        assert_eq!(store.get_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_removes_admit_one_winner() {
        let store = std::sync::Arc::new(store());
        store.add("contested").await.unwrap();

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move { store.remove("contested").await })
            })
            .collect();

        let mut wins = 0;
        let mut losses = 0;
        for task in tasks {
            match task.await.unwrap() {
                Ok(_) => wins += 1,
                Err(Error::NotFound(_)) => losses += 1,
                Err(other) => panic!("unexpected error: {other}"),
            }
        }

        assert_eq!(wins, 1);
        assert_eq!(losses, 7);
        assert!(store.get_all().await.unwrap().is_empty());
    }
}
