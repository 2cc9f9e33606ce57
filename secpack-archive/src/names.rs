//! Fixed entry names shared by the packer and the unpacker.

/// Suffix marking an entry as encrypted payload.
pub const CIPHERTEXT_SUFFIX: &str = ".enc";

/// Entry holding the OAEP-wrapped package key.
pub const WRAPPED_KEY_ENTRY: &str = "wrapped_key.bin";

/// Entry holding the licensing manifest.
pub const MANIFEST_ENTRY: &str = "manifest.json";

/// Entry holding the vendor public key (PEM).
pub const VENDOR_KEY_ENTRY: &str = "vendor_public.pem";

/// File name of the archive written by the packer.
pub const DEFAULT_ARCHIVE_NAME: &str = "encrypted_files.zip";

/// Entry name for the ciphertext of `original`.
pub fn ciphertext_name(original: &str) -> String {
    format!("{original}{CIPHERTEXT_SUFFIX}")
}

/// Original file name for a ciphertext entry, or `None` if `entry` is not one.
pub fn original_name(entry: &str) -> Option<&str> {
    entry
        .strip_suffix(CIPHERTEXT_SUFFIX)
        .filter(|name| !matches!(*name, "" | "." | ".."))
}
