//! Error types for the crypto vote service using snafu.
//!
//! Defines the identifier parse error and the [`ErrorCode`] catalog: each
//! failure surfaced to clients maps to a unique numeric code with a
//! retryability classification and a suggested recovery action.

use core::fmt;

use snafu::Snafu;

/// Machine-readable error codes for programmatic error handling.
///
/// | Range       | Domain  | Examples                            |
/// |-------------|---------|-------------------------------------|
/// | 1000–1099   | Request | Malformed identifier                |
/// | 2000–2099   | Lookup  | Record not found                    |
/// | 3000–3099   | Store   | Connectivity, query, decode         |
/// | 3900–3999   | Server  | Internal                            |
///
/// # Wire Format
///
/// Codes are transmitted as the string form of their numeric value (e.g.
/// `"2000"`) inside `ErrorDetails` attached to the gRPC status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum ErrorCode {
    /// Identifier is not a valid 24-character hex string.
    InvalidCryptoId = 1000,
    /// No record matches the identifier.
    CryptoNotFound = 2000,
    /// The store could not be reached.
    StoreUnavailable = 3000,
    /// A store command failed.
    StoreQuery = 3001,
    /// A stored document could not be decoded.
    StoreDecode = 3002,
    /// Unexpected state or invariant violation.
    Internal = 3900,
}

impl ErrorCode {
    /// Returns the numeric code value.
    #[must_use]
    pub const fn as_u16(self) -> u16 {
        self as u16
    }

    /// Whether a retry may succeed without corrective action.
    #[must_use]
    pub const fn is_retryable(self) -> bool {
        matches!(self, Self::StoreUnavailable | Self::StoreDecode)
    }

    /// Suggested recovery action for this error code.
    #[must_use]
    pub const fn suggested_action(self) -> &'static str {
        match self {
            Self::InvalidCryptoId => {
                "Pass the 24-character hex id returned by CreateCrypto or ListCryptos."
            },
            Self::CryptoNotFound => {
                "Verify the crypto exists via ListCryptos; it may have been deleted."
            },
            Self::StoreUnavailable => "Retry with backoff. The database may be restarting.",
            Self::StoreQuery => "Check server logs for the failing database command.",
            Self::StoreDecode => {
                "Retry the listing. Persistent failures indicate a malformed stored document."
            },
            Self::Internal => {
                "Unexpected state or invariant violation. Collect context and report as an issue."
            },
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u16())
    }
}

/// Failure to parse a [`CryptoId`](crate::CryptoId) from its wire encoding.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum IdParseError {
    /// Input is not a 24-character hex string.
    #[snafu(display("invalid crypto id {input:?}: {source}"))]
    InvalidHex {
        /// Rejected input.
        input: String,
        /// Underlying ObjectId parse failure.
        source: bson::oid::Error,
    },
}

impl IdParseError {
    /// Error code reported to clients.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        ErrorCode::InvalidCryptoId
    }
}
