use thiserror::Error;

/// All the ways things can go wrong in PropView
///
/// We use thiserror here because it generates the boilerplate for us.
/// Id-targeted operations fail fast with the specific kind; bulk reads
/// surface `DataSource` and the caller renders an empty state from it.
#[derive(Error, Debug)]
pub enum Error {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("property {0} is already in favorites")]
    AlreadyFavorited(String),

    #[error("data source failure: {0}")]
    DataSource(String),

    #[error("invalid filter input: {0}")]
    Validation(String),

    #[error("favorites store failure: {0}")]
    Store(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<propview_api::RecordError> for Error {
    fn from(err: propview_api::RecordError) -> Self {
        match err {
            propview_api::RecordError::NotFound(subject) => Error::NotFound(subject),
            other => Error::DataSource(other.to_string()),
        }
    }
}

impl From<propview_store::StoreError> for Error {
    fn from(err: propview_store::StoreError) -> Self {
        match err {
            propview_store::StoreError::Duplicate(id) => Error::AlreadyFavorited(id),
            other => Error::Store(other.to_string()),
        }
    }
}
