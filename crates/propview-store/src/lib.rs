// SQLite-backed favorites persistence
// The durable store every in-memory favorite cache mirrors

pub mod favorites;

pub use favorites::{FavoriteRow, FavoritesDb, StoreError};
