//! URL helpers.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

use cloudfiles_core::{ContainerName, ObjectName};

/// Characters escaped in object paths. Unreserved characters and `/` are
/// kept so pseudo-directories stay readable.
const PATH_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~')
    .remove(b'/');

/// Percent-encode an object path.
#[must_use]
pub fn encode_path(path: &str) -> String {
    utf8_percent_encode(path, PATH_ENCODE_SET).to_string()
}

/// URL of `object` in `container` under the storage account URL `base`.
///
/// # Examples
///
/// ```
/// use cloudfiles_core::{ContainerName, ObjectName};
/// use cloudfiles_transfer::utils::object_url;
///
/// let url = object_url(
///     "https://storage.example.com/v1/AUTH_acct",
///     &ContainerName::new("photos").unwrap(),
///     &ObjectName::new("2024/cat pic.jpg").unwrap(),
/// );
/// assert_eq!(url, "https://storage.example.com/v1/AUTH_acct/photos/2024/cat%20pic.jpg");
/// ```
#[must_use]
pub fn object_url(base: &str, container: &ContainerName, object: &ObjectName) -> String {
    segment_url(base, container, object.as_str())
}

/// URL of an object given as a raw name, used for segment names.
#[must_use]
pub fn segment_url(base: &str, container: &ContainerName, name: &str) -> String {
    format!(
        "{}/{}/{}",
        base.trim_end_matches('/'),
        encode_path(container.as_str()),
        encode_path(name)
    )
}
