//! Error types for the licensing module.

use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;

/// Licensing-specific errors.
#[derive(Debug, Error)]
pub enum LicenseError {
    /// Token text does not decode into the expected five fields, or a field is unparseable.
    #[error("invalid license token format: {0}")]
    TokenFormat(String),

    /// Vendor signature does not match the token payload.
    #[error("license token signature invalid")]
    TokenSignature,

    /// License expiry is in the past.
    #[error("license expired on {expiry} (now: {})", .now.format("%Y-%m-%d"))]
    Expired {
        expiry: NaiveDate,
        now: DateTime<Utc>,
    },

    /// License expires within the hard block window.
    #[error("access blocked: license expires within 24 hours ({expiry}, {hours_remaining}h left)")]
    Blocked {
        expiry: NaiveDate,
        hours_remaining: i64,
    },

    /// Issuance input cannot be encoded into a token.
    #[error("invalid license claims: {0}")]
    InvalidClaims(String),

    /// The signing operation itself failed.
    #[error("signing failed: {0}")]
    Signing(String),
}

/// Result type for license operations.
pub type LicenseResult<T> = Result<T, LicenseError>;
