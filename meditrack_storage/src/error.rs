use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("io failure for key {key}: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed json under key {key}: {source}")]
    Json {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid storage key {0:?}")]
    InvalidKey(String),
}
