use thiserror::Error;

/// Errors that can arise while persisting or exporting economy state.
///
/// Affordability failures and missing save records are not errors: they are reported as
/// `false` / `Ok(false)` so callers can branch without unwinding.
#[derive(Debug, Error)]
pub enum EconomyError {
    /// Wrapper around IO errors (directory creation, atomic writes, reads).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A save record exists but could not be (de)serialized.
    #[error("serialization error in {record}: {source}")]
    Json {
        record: String,
        #[source]
        source: serde_json::Error,
    },

    /// Returned when an operation names an artifact that is not in the collection.
    #[error("artifact not found: {0}")]
    ArtifactNotFound(String),
}
