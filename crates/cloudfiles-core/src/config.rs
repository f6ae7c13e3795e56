//! Client configuration.
//!
//! Provides [`ClientConfig`], the defaults applied to every upload issued
//! through a container handle. Values are loaded from environment variables
//! and can be overridden per request.

use serde::{Deserialize, Serialize};
use tracing::warn;
use typed_builder::TypedBuilder;

use crate::types::ManifestKind;

/// Default segment size: 1 MiB.
const DEFAULT_PART_SIZE: u64 = 1024 * 1024;

/// Default number of segments in flight at once.
const DEFAULT_CONCURRENCY: usize = 3;

/// Client-side defaults for object-store uploads.
///
/// # Examples
///
/// ```
/// use cloudfiles_core::ClientConfig;
///
/// let config = ClientConfig::default();
/// assert_eq!(config.default_part_size, 1024 * 1024);
/// assert_eq!(config.default_concurrency, 3);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, TypedBuilder)]
#[serde(rename_all = "camelCase")]
pub struct ClientConfig {
    /// Base storage URL of the account, e.g. `https://storage.example.com/v1/AUTH_acct`.
    #[builder(default = String::from("http://localhost:8080/v1/AUTH_test"), setter(into))]
    pub storage_url: String,

    /// Segment size used when a request does not name one.
    #[builder(default = DEFAULT_PART_SIZE)]
    pub default_part_size: u64,

    /// Upload concurrency used when a request does not name one.
    #[builder(default = DEFAULT_CONCURRENCY)]
    pub default_concurrency: usize,

    /// Manifest flavour used when a request does not name one.
    #[builder(default)]
    pub default_manifest_kind: ManifestKind,

    /// Whether returned segment ETags are compared with the local MD5.
    #[builder(default = true)]
    pub verify_checksums: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            storage_url: String::from("http://localhost:8080/v1/AUTH_test"),
            default_part_size: DEFAULT_PART_SIZE,
            default_concurrency: DEFAULT_CONCURRENCY,
            default_manifest_kind: ManifestKind::Dynamic,
            verify_checksums: true,
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `CLOUDFILES_STORAGE_URL` | `http://localhost:8080/v1/AUTH_test` |
    /// | `CLOUDFILES_PART_SIZE` | `1048576` |
    /// | `CLOUDFILES_CONCURRENCY` | `3` |
    /// | `CLOUDFILES_MANIFEST_KIND` | `dynamic` |
    /// | `CLOUDFILES_VERIFY_CHECKSUMS` | `true` |
    ///
    /// Unparseable or zero numeric values are ignored with a warning.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(v) = std::env::var("CLOUDFILES_STORAGE_URL") {
            config.storage_url = v;
        }
        if let Ok(v) = std::env::var("CLOUDFILES_PART_SIZE") {
            match v.parse::<u64>() {
                Ok(n) if n > 0 => config.default_part_size = n,
                _ => warn!(value = %v, "ignoring invalid CLOUDFILES_PART_SIZE"),
            }
        }
        if let Ok(v) = std::env::var("CLOUDFILES_CONCURRENCY") {
            match v.parse::<usize>() {
                Ok(n) if n > 0 => config.default_concurrency = n,
                _ => warn!(value = %v, "ignoring invalid CLOUDFILES_CONCURRENCY"),
            }
        }
        if let Ok(v) = std::env::var("CLOUDFILES_MANIFEST_KIND") {
            match v.parse::<ManifestKind>() {
                Ok(kind) => config.default_manifest_kind = kind,
                Err(e) => warn!(error = %e, "ignoring invalid CLOUDFILES_MANIFEST_KIND"),
            }
        }
        if let Ok(v) = std::env::var("CLOUDFILES_VERIFY_CHECKSUMS") {
            config.verify_checksums = parse_bool(&v);
        }

        config
    }

    /// Storage URL with any trailing `/` removed.
    #[must_use]
    pub fn base_url(&self) -> &str {
        self.storage_url.trim_end_matches('/')
    }
}

/// Parse a string as a boolean, accepting `"1"` and `"true"` (case-insensitive).
fn parse_bool(value: &str) -> bool {
    value == "1" || value.eq_ignore_ascii_case("true")
}
