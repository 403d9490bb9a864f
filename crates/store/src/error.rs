//! Error types for crypto store backends.

use cryptovote_types::ErrorCode;
use snafu::Snafu;

/// Result type alias for store operations.
pub type Result<T, E = StoreError> = std::result::Result<T, E>;

/// Errors that can occur while talking to the document store.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum StoreError {
    /// Failed to build a client for the configured endpoint.
    #[snafu(display("Failed to connect to {uri}: {source}"))]
    Connect {
        /// Connection string.
        uri: String,
        /// Driver error.
        source: mongodb::error::Error,
    },

    /// The database did not answer the startup ping.
    #[snafu(display("Database {database} did not respond to ping: {source}"))]
    Ping {
        /// Database name.
        database: String,
        /// Driver error.
        source: mongodb::error::Error,
    },

    /// A driver command failed.
    #[snafu(display("{operation} failed: {source}"))]
    Query {
        /// Collection operation that failed.
        operation: &'static str,
        /// Driver error.
        source: mongodb::error::Error,
    },

    /// A backend without a driver reported a failed command.
    #[snafu(display("{operation} failed: {message}"))]
    Backend {
        /// Collection operation that failed.
        operation: &'static str,
        /// Error description.
        message: String,
    },

    /// A stored document could not be deserialized.
    #[snafu(display("Could not decode document: {message}"))]
    Decode {
        /// Error description.
        message: String,
    },

    /// A stored document deserialized but violates the record invariants.
    #[snafu(display("Invalid document {id}: {reason}"))]
    InvalidDocument {
        /// Document `_id`, or `<missing>`.
        id: String,
        /// What was wrong with it.
        reason: String,
    },

    /// The store reported an inserted id that is not an ObjectId.
    #[snafu(display("Insert returned a non-ObjectId _id: {value}"))]
    UnexpectedInsertId {
        /// The reported id.
        value: String,
    },
}

impl StoreError {
    /// Error code reported to clients.
    #[must_use]
    pub fn code(&self) -> ErrorCode {
        match self {
            StoreError::Connect { .. } | StoreError::Ping { .. } => ErrorCode::StoreUnavailable,
            StoreError::Query { source, .. } if is_connectivity_error(source) => {
                ErrorCode::StoreUnavailable
            },
            StoreError::Query { .. } | StoreError::Backend { .. } => ErrorCode::StoreQuery,
            StoreError::Decode { .. } | StoreError::InvalidDocument { .. } => {
                ErrorCode::StoreDecode
            },
            StoreError::UnexpectedInsertId { .. } => ErrorCode::Internal,
        }
    }

    /// Classifies a driver error raised by `operation`.
    ///
    /// BSON deserialization failures become [`StoreError::Decode`]; everything
    /// else is a [`StoreError::Query`].
    pub(crate) fn from_driver(operation: &'static str, source: mongodb::error::Error) -> Self {
        if matches!(*source.kind, mongodb::error::ErrorKind::BsonDeserialization(_)) {
            return StoreError::Decode { message: source.to_string() };
        }
        StoreError::Query { operation, source }
    }
}

fn is_connectivity_error(err: &mongodb::error::Error) -> bool {
    matches!(
        *err.kind,
        mongodb::error::ErrorKind::Io(_)
            | mongodb::error::ErrorKind::ConnectionPoolCleared { .. }
            | mongodb::error::ErrorKind::ServerSelection { .. }
    )
}
