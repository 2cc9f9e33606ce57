//! Secure package container.
//!
//! A package is a zip archive containing:
//! - `<file>.enc`: one encrypted payload per original file
//! - `wrapped_key.bin`: the package key, RSA-OAEP wrapped for the recipient
//! - `manifest.json`: optional; declares whether a license is required
//! - `vendor_public.pem`: optional; vendor key for verifying license tokens
//!
//! Extraction validates every entry name before writing anything, so a
//! crafted archive cannot place files outside the extraction directory.

mod archive;
mod error;
mod manifest;
pub mod names;
mod path;

pub use archive::{ArchiveBuilder, ArchiveReader, ExtractedArchive};
pub use error::{ArchiveError, ArchiveResult};
pub use manifest::Manifest;
pub use path::safe_entry_path;
