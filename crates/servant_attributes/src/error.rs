//! # Attribute Error Types
//!
//! Errors raised inside the bridge. None of them crosses the
//! [`AttributeProvider`](crate::AttributeProvider) boundary: the provider
//! logs them and falls back to `0.0` or a no-op.

use std::path::PathBuf;

use servant_core::EntityId;
use thiserror::Error;

use crate::backend::BackendError;

/// Errors that can occur while bridging attributes.
#[derive(Error, Debug)]
pub enum AttributeError {
    /// The internal key has no mapping for this backend.
    #[error("attribute {key} has no {backend} mapping")]
    MappingMiss {
        /// Internal attribute key.
        key: String,
        /// Backend the lookup was for.
        backend: String,
    },

    /// The backend plugin is not loaded.
    #[error("attribute backend {0} is not loaded")]
    BackendUnavailable(String),

    /// A backend query or mutation failed.
    #[error("backend {operation} failed for entity {entity}: {source}")]
    BackendCall {
        /// The bridge operation that issued the call.
        operation: &'static str,
        /// Entity the call was for.
        entity: EntityId,
        /// What the backend reported.
        source: BackendError,
    },

    /// The stats configuration document is malformed.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The stats configuration file could not be read or written.
    #[error("configuration io error at {}: {source}", path.display())]
    Io {
        /// File that was being accessed.
        path: PathBuf,
        /// Underlying io failure.
        source: std::io::Error,
    },
}

impl AttributeError {
    /// Wraps a backend failure with the operation and entity it belongs to.
    #[must_use]
    pub fn backend_call(operation: &'static str, entity: EntityId, source: BackendError) -> Self {
        Self::BackendCall {
            operation,
            entity,
            source,
        }
    }
}

/// Result type for attribute bridge operations.
pub type AttributeResult<T> = Result<T, AttributeError>;
