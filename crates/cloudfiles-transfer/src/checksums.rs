//! MD5 checksums for segment integrity.
//!
//! Swift returns the hex MD5 of the stored bytes as the `ETag` of every
//! object PUT, and verifies an `ETag` request header against the body it
//! receives. Static manifests also carry each segment's ETag.

use md5::{Digest, Md5};

/// Compute the hex-encoded MD5 digest of `data`.
///
/// # Examples
///
/// ```
/// use cloudfiles_transfer::checksums::compute_md5;
///
/// assert_eq!(compute_md5(b"foo"), "acbd18db4cc2f85cedef654fccc4a4d8");
/// ```
#[must_use]
pub fn compute_md5(data: &[u8]) -> String {
    hex::encode(Md5::digest(data))
}

/// Compute the quoted MD5 of `data`, in the form stores return as `ETag`.
#[must_use]
pub fn compute_etag(data: &[u8]) -> String {
    format!("\"{}\"", compute_md5(data))
}

/// Strip surrounding quotes and lowercase an `ETag` value.
///
/// # Examples
///
/// ```
/// use cloudfiles_transfer::checksums::normalize_etag;
///
/// assert_eq!(normalize_etag("\"ACBD18DB\""), "acbd18db");
/// ```
#[must_use]
pub fn normalize_etag(etag: &str) -> String {
    etag.trim().trim_matches('"').to_ascii_lowercase()
}

/// Whether a returned `ETag` matches the expected hex digest.
#[must_use]
pub fn etag_matches(expected_md5: &str, returned: &str) -> bool {
    normalize_etag(returned) == normalize_etag(expected_md5)
}
