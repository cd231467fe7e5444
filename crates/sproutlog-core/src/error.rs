use thiserror::Error;

/// Failures inside the persistence layer.
///
/// Nothing here reaches the public surface: the loader substitutes defaults
/// on `Decode`, the write scheduler skips the failing key on `Encode`/`Io`,
/// and both log what they absorbed.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("failed to encode '{key}': {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to decode '{key}': {source}")]
    Decode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("backing store i/o on '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },
}
