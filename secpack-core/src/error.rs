//! Unified error type for the pack/unpack workflows.

use std::path::{Path, PathBuf};

use secpack_archive::ArchiveError;
use secpack_crypto::CryptoError;
use secpack_license::LicenseError;
use serde::Serialize;
use thiserror::Error;

/// Result type for workflow operations.
pub type PackagerResult<T> = Result<T, PackagerError>;

/// Every way a pack, unpack or issue operation can fail.
///
/// All of these are fatal. License warnings are not errors; they are carried
/// in the returned [`secpack_license::LicenseReport`].
#[derive(Debug, Error)]
pub enum PackagerError {
    /// Missing or contradictory inputs, detected before any cryptographic work.
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error(transparent)]
    Crypto(#[from] CryptoError),

    #[error(transparent)]
    License(#[from] LicenseError),

    #[error(transparent)]
    Archive(#[from] ArchiveError),

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A cancellation request was observed at a checkpoint.
    #[error("operation cancelled during {0}")]
    Cancelled(&'static str),
}

/// Failure classes, one per distinct caller-visible condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Configuration,
    KeyFormat,
    ArchiveFormat,
    TokenFormat,
    TokenSignature,
    LicenseExpired,
    LicenseBlocked,
    Integrity,
    KeyUnwrap,
    MalformedKey,
    Crypto,
    Io,
    Cancelled,
}

impl ErrorKind {
    /// Process exit status for this class. Never zero.
    #[must_use]
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Configuration => 2,
            Self::KeyFormat => 3,
            Self::ArchiveFormat => 4,
            Self::TokenFormat => 5,
            Self::TokenSignature => 6,
            Self::LicenseExpired => 7,
            Self::LicenseBlocked => 8,
            Self::Integrity => 9,
            Self::KeyUnwrap => 10,
            Self::MalformedKey => 11,
            Self::Crypto => 12,
            Self::Io => 13,
            Self::Cancelled => 130,
        }
    }
}

fn crypto_kind(err: &CryptoError) -> ErrorKind {
    match err {
        CryptoError::KeyFormat(_) => ErrorKind::KeyFormat,
        CryptoError::Integrity(_) => ErrorKind::Integrity,
        CryptoError::KeyUnwrap(_) => ErrorKind::KeyUnwrap,
        CryptoError::MalformedKey(_) => ErrorKind::MalformedKey,
        CryptoError::Encryption(_) => ErrorKind::Crypto,
    }
}

impl PackagerError {
    /// Classifies this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Configuration(_) => ErrorKind::Configuration,
            Self::Crypto(e) => crypto_kind(e),
            Self::License(e) => match e {
                LicenseError::TokenFormat(_) => ErrorKind::TokenFormat,
                LicenseError::TokenSignature => ErrorKind::TokenSignature,
                LicenseError::Expired { .. } => ErrorKind::LicenseExpired,
                LicenseError::Blocked { .. } => ErrorKind::LicenseBlocked,
                LicenseError::InvalidClaims(_) => ErrorKind::Configuration,
                LicenseError::Signing(_) => ErrorKind::Crypto,
            },
            Self::Archive(ArchiveError::Io(_)) => ErrorKind::Io,
            Self::Archive(_) => ErrorKind::ArchiveFormat,
            Self::Io { .. } => ErrorKind::Io,
            Self::Cancelled(_) => ErrorKind::Cancelled,
        }
    }

    /// Process exit status for this error.
    #[must_use]
    pub fn exit_code(&self) -> u8 {
        self.kind().exit_code()
    }
}

/// Attaches `path` to an I/O error.
pub(crate) fn io_at(path: &Path) -> impl FnOnce(std::io::Error) -> PackagerError + '_ {
    move |source| PackagerError::Io {
        path: path.to_path_buf(),
        source,
    }
}
