// Data-source adapters: in-memory fixtures, embedded SQLite, and the
// hosted record service
pub mod memory;
pub mod remote;
pub mod sqlite;

pub use memory::{MemoryFavorites, MemoryListingSource};
pub use remote::{RemoteFavorites, RemoteListingSource};
pub use sqlite::SqliteFavorites;
