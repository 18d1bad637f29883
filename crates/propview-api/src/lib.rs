// HTTP client for the hosted table-record service
// The service is an opaque record store: tables of rows, each row an
// internal id plus a free-form field map

pub mod client;
pub mod query;
pub mod retry;

pub use client::{RecordClient, RecordError, RecordFields, TableRecord};
pub use query::{FieldFilter, FilterOp, OrderBy, RecordQuery, SortDirection};
pub use retry::RetryConfig;
