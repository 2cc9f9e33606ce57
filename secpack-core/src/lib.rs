//! Secure file packaging.
//!
//! [`pack`] encrypts a directory for one recipient and optionally gates it
//! behind a vendor license. [`unpack`] reverses it: the archive is
//! extracted, the license (when in force) is verified and evaluated, the
//! package key is unwrapped with the recipient's private key, and every file
//! is authenticated and decrypted.
//!
//! # Package layout
//!
//! | entry               | contents                                   |
//! |---------------------|--------------------------------------------|
//! | `<name>.enc`        | encrypted payload file                     |
//! | `wrapped_key.bin`   | package key, RSA-OAEP wrapped              |
//! | `manifest.json`     | `{"license_required": true, ...}`, optional |
//! | `vendor_public.pem` | vendor verification key, optional          |

mod cancel;
mod commit;
mod config;
mod error;
mod issue;
mod pack;
mod unpack;

pub use cancel::CancelToken;
pub use config::{DEFAULT_DECRYPT_DIR, PackOptions, UnpackOptions};
pub use error::{ErrorKind, PackagerError, PackagerResult};
pub use issue::issue_token;
pub use pack::{pack, PackOutcome};
pub use unpack::{entry_names, unpack, UnpackOutcome, UnpackStage};

pub use secpack_license::{Clock, LicenseReport, LicenseStatus};
