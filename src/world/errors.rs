use thiserror::Error;

use crate::world::types::EntityRef;

/// Errors that can arise while reading the on-disk world dataset.
#[derive(Debug, Error)]
pub enum WorldError {
    /// Wrapper around IO errors (directory listing, file reads).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A world file could not be parsed as JSON.
    #[error("failed to parse {context}: {source}")]
    Json {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// Returned when fetching an entity that is not present in the world.
    #[error("entity not found: {0}")]
    NotFound(EntityRef),

    /// The configured world root does not exist or is not a directory.
    #[error("world root not found: {0}")]
    MissingRoot(String),
}

impl WorldError {
    pub(crate) fn json(context: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Json {
            context: context.into(),
            source,
        }
    }
}
