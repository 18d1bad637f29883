use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use thiserror::Error;
use tracing::debug;

/// Everything the favorites database can complain about
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("favorite already stored for property {0}")]
    Duplicate(String),

    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("unreadable timestamp in stored row: {0}")]
    BadTimestamp(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// One persisted favorite row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FavoriteRow {
    pub property_id: String,
    pub added_date: DateTime<Utc>,
}

/// Favorites database over an embedded SQLite file
///
/// SQLite was chosen because:
/// - Zero-config embedded database
/// - UNIQUE index gives us the one-favorite-per-property rule for free
/// - Doesn't require a separate process
pub struct FavoritesDb {
    conn: Connection,
}

impl FavoritesDb {
    /// Open (and initialize on first run) the database at the given path
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        Self::init_schema(&conn)?;
        debug!("favorites database open at {}", path.display());
        Ok(Self { conn })
    }

    /// In-memory database, used by tests and throwaway sessions
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init_schema(&conn)?;
        Ok(Self { conn })
    }

    fn init_schema(conn: &Connection) -> Result<()> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS favorites (
                id INTEGER PRIMARY KEY,
                property_id TEXT NOT NULL UNIQUE,
                added_date TEXT NOT NULL
            )",
            [],
        )?;
        Ok(())
    }

    /// Insert a favorite; a second insert for the same property is `Duplicate`
    pub fn insert(&self, property_id: &str, added_date: DateTime<Utc>) -> Result<()> {
        let result = self.conn.execute(
            "INSERT INTO favorites (property_id, added_date) VALUES (?1, ?2)",
            params![property_id, added_date.to_rfc3339()],
        );

        match result {
            Ok(_) => Ok(()),
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                Err(StoreError::Duplicate(property_id.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Delete a favorite, returning the removed row, or `None` if absent
    pub fn delete(&self, property_id: &str) -> Result<Option<FavoriteRow>> {
        let existing = self.find(property_id)?;
        if existing.is_some() {
            self.conn.execute(
                "DELETE FROM favorites WHERE property_id = ?1",
                params![property_id],
            )?;
        }
        Ok(existing)
    }

    /// Look up a single favorite by property id
    pub fn find(&self, property_id: &str) -> Result<Option<FavoriteRow>> {
        let row = self
            .conn
            .query_row(
                "SELECT property_id, added_date FROM favorites WHERE property_id = ?1",
                params![property_id],
                |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)),
            )
            .optional()?;

        row.map(|(property_id, added_date)| row_from_parts(property_id, &added_date))
            .transpose()
    }

    /// All favorites in insertion order
    pub fn all(&self) -> Result<Vec<FavoriteRow>> {
        let mut stmt = self
            .conn
            .prepare("SELECT property_id, added_date FROM favorites ORDER BY id")?;

        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut favorites = Vec::new();
        for row in rows {
            let (property_id, added_date) = row?;
            favorites.push(row_from_parts(property_id, &added_date)?);
        }
        Ok(favorites)
    }

    /// Overwrite the timestamp of an existing favorite
    pub fn set_added_date(
        &self,
        property_id: &str,
        added_date: DateTime<Utc>,
    ) -> Result<Option<FavoriteRow>> {
        let changed = self.conn.execute(
            "UPDATE favorites SET added_date = ?1 WHERE property_id = ?2",
            params![added_date.to_rfc3339(), property_id],
        )?;

        if changed == 0 {
            return Ok(None);
        }
        self.find(property_id)
    }
}

fn row_from_parts(property_id: String, added_date: &str) -> Result<FavoriteRow> {
    let added_date = DateTime::parse_from_rfc3339(added_date)
        .map_err(|_| StoreError::BadTimestamp(added_date.to_string()))?
        .with_timezone(&Utc);

    Ok(FavoriteRow {
        property_id,
        added_date,
    })
}
